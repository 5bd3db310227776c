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

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::state::AssetClass;
use crate::tx::Outpoint;
use crate::{CodecError, ContractState, Datum, Network, RuntimeError, ScriptAddr, ScriptHash};

/// Compiled script artifact as shipped in the contract's JSON envelope.
///
/// The script body is opaque to this client: the validation rules it encodes
/// are enforced on-chain and never interpreted here.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct ScriptArtifact {
    #[serde(rename = "type")]
    pub script_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "cborHex")]
    pub cbor_hex: String,
}

impl ScriptArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let path = path.as_ref();
        let reading = |e: String| RuntimeError::Artifact(path.display().to_string(), e);
        let data = fs::read_to_string(path).map_err(|e| reading(e.to_string()))?;
        let artifact: ScriptArtifact =
            serde_json::from_str(&data).map_err(|e| reading(e.to_string()))?;
        // fail early on a damaged hex body
        artifact.script_bytes().map_err(|e| reading(e.to_string()))?;
        Ok(artifact)
    }

    pub fn script_bytes(&self) -> Result<Vec<u8>, hex::FromHexError> { hex::decode(&self.cbor_hex) }
}

/// Deployment parameters applied to the compiled script.
///
/// Includes the reference to the consumed user output, which makes every
/// deployment structurally distinct even when the logical parameters repeat.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ScriptParams {
    pub asset: AssetClass,
    pub consumed: Outpoint,
}

impl ScriptParams {
    fn to_datum(&self) -> Datum {
        Datum::record(vec![
            Datum::Bytes(self.asset.policy.clone()),
            Datum::Bytes(self.asset.asset_name.clone()),
            Datum::Int(self.asset.quantity),
            self.consumed.to_datum(),
        ])
    }
}

/// A script with its deployment parameters applied, together with the
/// identity derived from the parameterized body.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
pub struct ParamScript {
    #[serde(rename = "Validator")]
    pub validator: ScriptArtifact,
    pub hash: ScriptHash,
    pub address: ScriptAddr,
}

impl ParamScript {
    /// Applies deployment parameters to a compiled artifact and derives the
    /// script hash (minting policy id) and address from the result.
    pub fn parameterize(
        artifact: &ScriptArtifact,
        params: &ScriptParams,
        network: Network,
    ) -> Result<Self, CodecError> {
        let mut body = artifact
            .script_bytes()
            .map_err(|e| CodecError::SchemaMismatch(format!("invalid script body: {e}")))?;
        body.extend(params.to_datum().to_cbor()?);

        let hash = ScriptHash::with(&body);
        let address = ScriptAddr::with(hash, &network.to_string());
        Ok(ParamScript {
            validator: ScriptArtifact {
                script_type: artifact.script_type.clone(),
                description: artifact.description.clone(),
                cbor_hex: hex::encode(body),
            },
            hash,
            address,
        })
    }
}

/// Local mirror of a deployed contract: the immutable parameterized script
/// plus the latest state confirmed on-chain.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct DeployedContract {
    pub script: ParamScript,
    pub state: ContractState,
}

#[cfg(test)]
mod test {
    use amplify::ByteArray;

    use super::*;
    use crate::Txid;

    fn artifact() -> ScriptArtifact {
        ScriptArtifact {
            script_type: s!("PlutusV3"),
            description: s!("state matrix stepping validator"),
            cbor_hex: s!("59012345"),
        }
    }

    fn params(consumed: Outpoint) -> ScriptParams {
        ScriptParams {
            asset: AssetClass::from_label(vec![0xAB, 0xCD], "tok", 100),
            consumed,
        }
    }

    #[test]
    fn consumed_input_binds_identity() {
        let txid = Txid::from([3u8; 32]);
        let a = ParamScript::parameterize(&artifact(), &params(Outpoint { txid, vout: 0 }), Network::Preview)
            .unwrap();
        let b = ParamScript::parameterize(&artifact(), &params(Outpoint { txid, vout: 1 }), Network::Preview)
            .unwrap();
        assert_ne!(a.address, b.address);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn identical_parameters_reproduce_identity() {
        let consumed = Outpoint { txid: Txid::from([3u8; 32]), vout: 0 };
        let a = ParamScript::parameterize(&artifact(), &params(consumed), Network::Preview).unwrap();
        let b = ParamScript::parameterize(&artifact(), &params(consumed), Network::Preview).unwrap();
        assert_eq!(a.address, b.address);
    }

    #[test]
    fn hash_covers_parameterized_body() {
        let consumed = Outpoint { txid: Txid::from([3u8; 32]), vout: 0 };
        let script = ParamScript::parameterize(&artifact(), &params(consumed), Network::Preview).unwrap();
        let body = script.validator.script_bytes().unwrap();
        assert_eq!(script.hash.to_byte_array(), ScriptHash::with(&body).to_byte_array());
    }
}
