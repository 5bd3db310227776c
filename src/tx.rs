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

//! Ledger-facing transaction model: unspent outputs, the transaction
//! builder, validity windows and signing.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use amplify::ByteArray;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::state::AssetClass;
use crate::wallet::Wallet;
use crate::{CodecError, Datum, Txid};

/// Reference to an unspent transaction output on the ledger.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct Outpoint {
    pub txid: Txid,
    pub vout: u32,
}

impl Display for Outpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.txid, self.vout)
    }
}

impl Outpoint {
    pub fn to_datum(&self) -> Datum {
        Datum::record(vec![
            Datum::Bytes(self.txid.to_byte_array().to_vec()),
            Datum::Int(self.vout as i128),
        ])
    }
}

/// Ledger-wide asset identifier: minting policy plus asset name.
///
/// Displays as the concatenated hex `unit` string under which ledger
/// gateways key asset quantities in output value maps.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug)]
pub struct AssetId {
    pub policy: Vec<u8>,
    pub name: Vec<u8>,
}

impl AssetId {
    pub fn unit(&self) -> String { format!("{}{}", hex::encode(&self.policy), hex::encode(&self.name)) }
}

impl From<&AssetClass> for AssetId {
    fn from(asset: &AssetClass) -> Self {
        AssetId { policy: asset.policy.clone(), name: asset.asset_name.clone() }
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result { f.write_str(&self.unit()) }
}

/// An unspent output as reported by the ledger gateway. Read-only: the
/// client consults these to locate the output carrying the contract's
/// locked asset, it never owns them.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct Utxo {
    #[serde(flatten)]
    pub outpoint: Outpoint,
    pub address: String,
    /// Native coin quantity, kept separate from the asset map the way the
    /// ledger reports it.
    pub coin: u64,
    /// Asset quantities keyed by unit string.
    #[serde(default)]
    pub assets: BTreeMap<String, i128>,
    /// Inline datum attached to the output, hex-encoded CBOR.
    #[serde(default)]
    pub datum: Option<String>,
}

impl Utxo {
    pub fn holds(&self, asset: &AssetId) -> bool { self.assets.contains_key(&asset.unit()) }
}

/// Transaction inclusion bounds, set on every transaction this client
/// builds.
///
/// The start is backdated one minute to tolerate clock skew between client
/// and ledger; the end bounds the pending lifetime to fifteen minutes. A
/// transaction rejected for an expired window must be rebuilt with a fresh
/// window, never resubmitted as-is.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct ValidityWindow {
    pub valid_from: i64,
    pub valid_to: i64,
}

impl ValidityWindow {
    pub const SKEW_MS: i64 = 60 * 1000;
    pub const TTL_MS: i64 = 15 * 60 * 1000;

    pub fn starting_now() -> Self {
        let valid_from = Utc::now().timestamp_millis() - Self::SKEW_MS;
        ValidityWindow { valid_from, valid_to: valid_from + Self::TTL_MS }
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct TxInput {
    #[serde(flatten)]
    pub outpoint: Outpoint,
    /// Hex-encoded CBOR redeemer; present on script-locked inputs only.
    pub redeemer: Option<String>,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct TxOutput {
    pub address: String,
    pub coin: u64,
    pub assets: BTreeMap<String, i128>,
    /// Hex-encoded inline datum.
    pub datum: Option<String>,
}

/// Unsigned transaction body. Field order is fixed; the canonical CBOR of
/// this record is what gets hashed and signed.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct TxBody {
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub mint: BTreeMap<String, i128>,
    /// Hex-encoded bodies of scripts attached for execution.
    pub scripts: Vec<String>,
    /// Payment credentials which must witness the transaction.
    pub signers: Vec<String>,
    pub validity: ValidityWindow,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct TxWitness {
    pub vkey: String,
    pub signature: String,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct SignedTx {
    pub body: TxBody,
    pub txid: Txid,
    pub witnesses: Vec<TxWitness>,
}

impl SignedTx {
    /// Canonical body serialization, identical to what was hashed and
    /// signed at build time.
    pub fn body_bytes(&self) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(&self.body, &mut buf)
            .map_err(|e| CodecError::SchemaMismatch(e.to_string()))?;
        Ok(buf)
    }
}

/// Assembles a ledger transaction, mirroring the chained calls the contract
/// operations require: collect inputs, pay to addresses with inline datums,
/// mint under attached policies, bound the validity window, sign.
#[derive(Clone, Debug)]
pub struct TxBuilder {
    body: TxBody,
}

impl TxBuilder {
    pub fn new(validity: ValidityWindow) -> Self {
        TxBuilder {
            body: TxBody {
                inputs: vec![],
                outputs: vec![],
                mint: BTreeMap::new(),
                scripts: vec![],
                signers: vec![],
                validity,
            },
        }
    }

    pub fn collect(mut self, outpoint: Outpoint, redeemer: Option<&Datum>) -> Result<Self, CodecError> {
        let redeemer = redeemer.map(Datum::to_cbor).transpose()?.map(hex::encode);
        self.body.inputs.push(TxInput { outpoint, redeemer });
        Ok(self)
    }

    pub fn pay(
        mut self,
        address: impl Display,
        coin: u64,
        assets: BTreeMap<String, i128>,
        datum: Option<&[u8]>,
    ) -> Self {
        self.body.outputs.push(TxOutput {
            address: address.to_string(),
            coin,
            assets,
            datum: datum.map(hex::encode),
        });
        self
    }

    pub fn mint(mut self, asset: &AssetId, quantity: i128) -> Self {
        *self.body.mint.entry(asset.unit()).or_insert(0) += quantity;
        self
    }

    pub fn attach_script(mut self, script_body: &[u8]) -> Self {
        self.body.scripts.push(hex::encode(script_body));
        self
    }

    pub fn add_signer(mut self, wallet: &Wallet) -> Self {
        self.body.signers.push(wallet.credential().to_string());
        self
    }

    /// Serializes the body canonically, hashes it into the transaction id
    /// and signs the body bytes with the wallet key.
    pub fn sign(self, wallet: &Wallet) -> Result<SignedTx, CodecError> {
        let mut body_bytes = Vec::new();
        ciborium::ser::into_writer(&self.body, &mut body_bytes)
            .map_err(|e| CodecError::SchemaMismatch(e.to_string()))?;
        let txid = Txid::with(&body_bytes);
        let witness = wallet.witness(&body_bytes);
        Ok(SignedTx { body: self.body, txid, witnesses: vec![witness] })
    }
}

/// Native minting policy for the auxiliary test token: any-of nothing,
/// all-of a key signature and a deadline, hashed into a policy id.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct MintPolicy {
    pub key_hash: Vec<u8>,
    pub before_ms: i64,
}

impl MintPolicy {
    pub fn sig_before(wallet: &Wallet, before_ms: i64) -> Self {
        MintPolicy { key_hash: wallet.credential().to_byte_array().to_vec(), before_ms }
    }

    pub fn policy_id(&self) -> Result<crate::ScriptHash, CodecError> {
        let datum = Datum::record(vec![
            Datum::Bytes(self.key_hash.clone()),
            Datum::Int(self.before_ms as i128),
        ]);
        Ok(crate::ScriptHash::with(&datum.to_cbor()?))
    }
}
