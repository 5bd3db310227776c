// State Matrix: client runtime for a state-stepping smart contract
//
// SPDX-License-Identifier: Apache-2.0
//
// Copyright (C) 2024-2026 MintMatrix contributors. All rights reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not use this file except
// in compliance with the License. You may obtain a copy of the License at
//
//        http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software distributed under the License
// is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express
// or implied. See the License for the specific language governing permissions and limitations under
// the License.

use core::fmt::{self, Display, Formatter};
use core::str::FromStr;

use amplify::{ByteArray, Bytes32};
use sha2::{Digest, Sha256};

/// Hash of a parameterized script; doubles as the minting policy id of the
/// collateral token the script controls.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref, BorrowSlice, Hex, Index, RangeOps)]
pub struct ScriptHash(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

/// Address at which a parameterized script holds its outputs.
///
/// Derived from the script hash and the network tag, so the same logical
/// script deployed on different networks lives at different addresses.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref, BorrowSlice, Hex, Index, RangeOps)]
pub struct ScriptAddr(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

/// Transaction id: hash of the signed transaction body.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref, BorrowSlice, Hex, Index, RangeOps)]
pub struct Txid(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

/// Hash identifying the key authorized to spend a wallet's outputs.
#[derive(Wrapper, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, From)]
#[wrapper(Deref, BorrowSlice, Hex, Index, RangeOps)]
pub struct PaymentCredential(
    #[from]
    #[from([u8; 32])]
    Bytes32,
);

fn tagged_hash(tag: &str, chunks: &[&[u8]]) -> Bytes32 {
    let mut hasher = Sha256::new();
    hasher.update(tag.as_bytes());
    for chunk in chunks {
        hasher.update((chunk.len() as u64).to_be_bytes());
        hasher.update(chunk);
    }
    Bytes32::from_byte_array(<[u8; 32]>::from(hasher.finalize()))
}

impl ScriptHash {
    pub const TAG: &'static str = "mintmatrix:script#2025-01-15";

    /// Hashes a fully parameterized script body.
    pub fn with(script: &[u8]) -> Self { Self(tagged_hash(Self::TAG, &[script])) }
}

impl ScriptAddr {
    pub const TAG: &'static str = "mintmatrix:address#2025-01-15";

    pub fn with(hash: ScriptHash, network_tag: &str) -> Self {
        Self(tagged_hash(Self::TAG, &[network_tag.as_bytes(), hash.as_slice()]))
    }
}

impl Txid {
    pub const TAG: &'static str = "mintmatrix:txid#2025-01-15";

    pub fn with(body: &[u8]) -> Self { Self(tagged_hash(Self::TAG, &[body])) }
}

impl PaymentCredential {
    pub const TAG: &'static str = "mintmatrix:credential#2025-01-15";

    pub fn with(verifying_key: &[u8]) -> Self { Self(tagged_hash(Self::TAG, &[verifying_key])) }
}

mod _baid64 {
    use baid64::{Baid64ParseError, DisplayBaid64, FromBaid64Str};

    use super::*;

    macro_rules! impl_baid64 {
        ($ty:ident, $hri:literal) => {
            impl DisplayBaid64 for $ty {
                const HRI: &'static str = $hri;
                const CHUNKING: bool = true;
                const PREFIX: bool = false;
                const EMBED_CHECKSUM: bool = false;
                const MNEMONIC: bool = false;
                fn to_baid64_payload(&self) -> [u8; 32] { self.to_byte_array() }
            }
            impl FromBaid64Str for $ty {}
            impl FromStr for $ty {
                type Err = Baid64ParseError;
                fn from_str(s: &str) -> Result<Self, Self::Err> { Self::from_baid64_str(s) }
            }
            impl Display for $ty {
                fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { self.fmt_baid64(f) }
            }
        };
    }

    impl_baid64!(ScriptHash, "smp");
    impl_baid64!(ScriptAddr, "smx");
    impl_baid64!(Txid, "smt");
    impl_baid64!(PaymentCredential, "smc");
}

mod _serde {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::*;

    macro_rules! impl_serde_str {
        ($ty:ident) => {
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(&self.to_string())
                }
            }
            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let s = String::deserialize(deserializer)?;
                    Self::from_str(&s).map_err(D::Error::custom)
                }
            }
        };
    }

    impl_serde_str!(ScriptHash);
    impl_serde_str!(ScriptAddr);
    impl_serde_str!(Txid);
    impl_serde_str!(PaymentCredential);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_parse_roundtrip() {
        let addr = ScriptAddr::from([0xAD; 32]);
        let s = addr.to_string();
        assert_eq!(ScriptAddr::from_str(&s).unwrap(), addr);
    }

    #[test]
    fn addresses_are_filesystem_safe() {
        let addr = ScriptAddr::with(ScriptHash::with(b"script"), "preview");
        let s = addr.to_string();
        assert!(!s.contains('/') && !s.contains('\\') && !s.contains('\0'), "{s}");
    }

    #[test]
    fn derivation_is_tag_separated() {
        let hash = ScriptHash::with(b"script");
        let addr = ScriptAddr::with(hash, "preview");
        assert_ne!(hash.to_byte_array(), addr.to_byte_array());
        assert_ne!(ScriptAddr::with(hash, "mainnet"), addr);
    }
}
