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

use serde::{Deserialize, Serialize};

use crate::PaymentCredential;

/// Integers in persisted records travel as decimal strings, so no reader can
/// silently truncate them to a fixed-width float or int. Deserialization also
/// accepts plain JSON numbers for hand-written datum files.
mod serde_int {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i128, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(i64),
            Str(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Num(n) => Ok(n as i128),
            Raw::Str(s) => s.parse::<i128>().map_err(D::Error::custom),
        }
    }
}

mod serde_hex {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(D::Error::custom)
    }
}

/// Identity and quantity of the asset locked under the contract.
///
/// Every field must stay byte-identical across each state transition; the
/// orchestrator carries these values forward from the stored state and never
/// from caller input.
#[derive(Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetClass {
    #[serde(with = "serde_hex")]
    pub policy: Vec<u8>,
    #[serde(with = "serde_hex")]
    pub asset_name: Vec<u8>,
    #[serde(with = "serde_int")]
    pub quantity: i128,
}

impl AssetClass {
    /// Canonical text-to-bytes transform for asset names, applied exactly
    /// once at initialization; thereafter the name is opaque bytes.
    pub fn from_label(policy: Vec<u8>, label: &str, quantity: i128) -> Self {
        AssetClass { policy, asset_name: label.as_bytes().to_vec(), quantity }
    }
}

/// Evolution parameters of the dynamical system, the contract owner, and the
/// locked asset.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StateParams {
    #[serde(with = "serde_int")]
    pub a: i128,
    #[serde(with = "serde_int")]
    pub b: i128,
    #[serde(with = "serde_int")]
    pub c: i128,
    pub owner: PaymentCredential,
    pub asset: AssetClass,
}

/// The authoritative on-chain datum attached to the contract's current
/// unspent output: position, velocity and the evolution parameters.
#[derive(Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractState {
    #[serde(with = "serde_int")]
    pub t_0: i128,
    #[serde(with = "serde_int")]
    pub x: i128,
    #[serde(with = "serde_int")]
    pub y: i128,
    #[serde(with = "serde_int")]
    pub z: i128,
    #[serde(with = "serde_int")]
    pub x_dot: i128,
    #[serde(with = "serde_int")]
    pub y_dot: i128,
    #[serde(with = "serde_int")]
    pub z_dot: i128,
    pub param: StateParams,
}

/// Base-asset description in an init datum file: the policy is already
/// on-chain bytes (hex), while the asset name is still a human-readable
/// label.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitAsset {
    #[serde(with = "serde_hex")]
    pub policy: Vec<u8>,
    pub asset_name: String,
    #[serde(with = "serde_int")]
    pub quantity: i128,
}

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitParams {
    #[serde(with = "serde_int")]
    pub a: i128,
    #[serde(with = "serde_int")]
    pub b: i128,
    #[serde(with = "serde_int")]
    pub c: i128,
    pub asset: InitAsset,
}

/// Operator-supplied initial state, loaded from a datum file at `init`.
///
/// Unlike [`ContractState`] it carries no owner credential and no epoch
/// marker; initialization injects both.
#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InitState {
    #[serde(with = "serde_int")]
    pub x: i128,
    #[serde(with = "serde_int")]
    pub y: i128,
    #[serde(with = "serde_int")]
    pub z: i128,
    #[serde(with = "serde_int")]
    pub x_dot: i128,
    #[serde(with = "serde_int")]
    pub y_dot: i128,
    #[serde(with = "serde_int")]
    pub z_dot: i128,
    pub param: InitParams,
}

impl InitState {
    /// The documented demo state: a point at rest with Lorenz-like
    /// parameters and a 100-unit test asset. Used by the CLI when the
    /// operator passes no datum file; always constructed explicitly, never
    /// read from module-level state.
    pub fn sample() -> Self {
        InitState {
            x: 0,
            y: 0,
            z: 0,
            x_dot: 0,
            y_dot: 0,
            z_dot: 0,
            param: InitParams {
                a: 10,
                b: 28,
                c: 3,
                asset: InitAsset {
                    policy: vec![0xAB, 0xCD],
                    asset_name: s!("tok"),
                    quantity: 100,
                },
            },
        }
    }
}

impl ContractState {
    /// Assembles the genesis contract state from an operator-supplied init
    /// state, the initializing wallet's credential and the transaction
    /// validity deadline used as the epoch marker.
    pub fn genesis(init: &InitState, owner: PaymentCredential, t_0: i128) -> Self {
        ContractState {
            t_0,
            x: init.x,
            y: init.y,
            z: init.z,
            x_dot: init.x_dot,
            y_dot: init.y_dot,
            z_dot: init.z_dot,
            param: StateParams {
                a: init.param.a,
                b: init.param.b,
                c: init.param.c,
                owner,
                asset: AssetClass::from_label(
                    init.param.asset.policy.clone(),
                    &init.param.asset.asset_name,
                    init.param.asset.quantity,
                ),
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn state() -> ContractState {
        ContractState::genesis(&InitState::sample(), PaymentCredential::from([7u8; 32]), 1000)
    }

    #[test]
    fn integers_persist_as_decimal_strings() {
        let json = serde_json::to_value(state()).unwrap();
        assert_eq!(json["x"], serde_json::json!("0"));
        assert_eq!(json["t_0"], serde_json::json!("1000"));
        assert_eq!(json["param"]["asset"]["quantity"], serde_json::json!("100"));
    }

    #[test]
    fn json_roundtrip() {
        let s = state();
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(serde_json::from_str::<ContractState>(&json).unwrap(), s);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut json = serde_json::to_value(state()).unwrap();
        json["w"] = serde_json::json!("1");
        assert!(serde_json::from_value::<ContractState>(json).is_err());
    }

    #[test]
    fn missing_fields_are_rejected() {
        let mut json = serde_json::to_value(state()).unwrap();
        json.as_object_mut().unwrap().remove("z_dot");
        assert!(serde_json::from_value::<ContractState>(json).is_err());
    }

    #[test]
    fn asset_name_label_transform() {
        let asset = AssetClass::from_label(vec![0xAB, 0xCD], "tok", 100);
        assert_eq!(asset.asset_name, b"tok".to_vec());
    }
}
