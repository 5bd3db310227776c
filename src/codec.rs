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

//! Conversion between [`ContractState`] and the on-chain binary datum.
//!
//! The wire format is CBOR with the ledger's constructor-tag convention:
//! a record with alternative `n` is a tagged array, tag `121 + n` for the
//! first 7 alternatives and `1280 + n - 7` up to 127; alternatives beyond
//! that never occur in this contract and are rejected. The contract state is
//! a single zero-alternative record of seven integers plus a nested
//! parameter record.

use amplify::ByteArray;
use ciborium::value::{Integer, Value};

use crate::{CodecError, ContractState, PaymentCredential, StateParams};
use crate::state::AssetClass;

/// A structured datum value as understood by the on-chain script.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Datum {
    Int(i128),
    Bytes(Vec<u8>),
    Constr(u64, Vec<Datum>),
}

impl Datum {
    /// Zero-alternative record, the most common constructor shape.
    pub fn record(fields: Vec<Datum>) -> Self { Datum::Constr(0, fields) }

    /// The unit redeemer `Constr 0 [Constr 0 []]` used by both the spend
    /// and the mint actions of the contract.
    pub fn unit_redeemer() -> Self {
        Datum::Constr(0, vec![Datum::Constr(0, vec![])])
    }

    fn to_value(&self) -> Result<Value, CodecError> {
        match self {
            Datum::Int(n) => Integer::try_from(*n)
                .map(Value::Integer)
                .map_err(|_| CodecError::SchemaMismatch(format!(
                    "integer {n} exceeds the representable range of the binary format"
                ))),
            Datum::Bytes(bytes) => Ok(Value::Bytes(bytes.clone())),
            Datum::Constr(alt, fields) => {
                let tag = match alt {
                    0..=6 => 121 + alt,
                    7..=127 => 1280 + alt - 7,
                    _ => {
                        return Err(CodecError::SchemaMismatch(format!(
                            "constructor alternative {alt} is out of range"
                        )))
                    }
                };
                let fields = fields.iter().map(Datum::to_value).collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Tag(tag, Box::new(Value::Array(fields))))
            }
        }
    }

    fn from_value(value: &Value) -> Result<Self, CodecError> {
        match value {
            Value::Integer(n) => Ok(Datum::Int(i128::from(*n))),
            Value::Bytes(bytes) => Ok(Datum::Bytes(bytes.clone())),
            Value::Tag(tag, inner) => {
                let alt = match *tag {
                    121..=127 => *tag - 121,
                    1280..=1400 => *tag - 1280 + 7,
                    other => {
                        return Err(CodecError::SchemaMismatch(format!(
                            "unexpected CBOR tag {other} in datum"
                        )))
                    }
                };
                let Value::Array(fields) = inner.as_ref() else {
                    return Err(CodecError::SchemaMismatch(s!(
                        "constructor tag does not wrap an array"
                    )));
                };
                let fields = fields.iter().map(Datum::from_value).collect::<Result<Vec<_>, _>>()?;
                Ok(Datum::Constr(alt, fields))
            }
            other => Err(CodecError::SchemaMismatch(format!(
                "datum contains an unsupported CBOR item {other:?}"
            ))),
        }
    }

    /// Deterministic binary serialization of the datum.
    pub fn to_cbor(&self) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(&self.to_value()?, &mut buf)
            .map_err(|e| CodecError::SchemaMismatch(e.to_string()))?;
        Ok(buf)
    }

    pub fn from_cbor(bytes: &[u8]) -> Result<Self, CodecError> {
        let value: Value = ciborium::de::from_reader(bytes)
            .map_err(|e| CodecError::SchemaMismatch(e.to_string()))?;
        Datum::from_value(&value)
    }
}

impl From<&ContractState> for Datum {
    fn from(state: &ContractState) -> Self {
        let asset = Datum::record(vec![
            Datum::Bytes(state.param.asset.policy.clone()),
            Datum::Bytes(state.param.asset.asset_name.clone()),
            Datum::Int(state.param.asset.quantity),
        ]);
        let param = Datum::record(vec![
            Datum::Int(state.param.a),
            Datum::Int(state.param.b),
            Datum::Int(state.param.c),
            Datum::Bytes(state.param.owner.to_byte_array().to_vec()),
            asset,
        ]);
        Datum::record(vec![
            Datum::Int(state.t_0),
            Datum::Int(state.x),
            Datum::Int(state.y),
            Datum::Int(state.z),
            Datum::Int(state.x_dot),
            Datum::Int(state.y_dot),
            Datum::Int(state.z_dot),
            param,
        ])
    }
}

fn expect_int(datum: &Datum, field: &str) -> Result<i128, CodecError> {
    match datum {
        Datum::Int(n) => Ok(*n),
        _ => Err(CodecError::SchemaMismatch(format!("field '{field}' is not an integer"))),
    }
}

fn expect_bytes(datum: &Datum, field: &str) -> Result<Vec<u8>, CodecError> {
    match datum {
        Datum::Bytes(bytes) => Ok(bytes.clone()),
        _ => Err(CodecError::SchemaMismatch(format!("field '{field}' is not a byte string"))),
    }
}

fn expect_record<'d>(
    datum: &'d Datum,
    arity: usize,
    what: &str,
) -> Result<&'d [Datum], CodecError> {
    match datum {
        Datum::Constr(0, fields) if fields.len() == arity => Ok(fields),
        Datum::Constr(0, fields) => Err(CodecError::SchemaMismatch(format!(
            "{what} has {} fields, expected {arity}",
            fields.len()
        ))),
        Datum::Constr(alt, _) => Err(CodecError::SchemaMismatch(format!(
            "{what} uses constructor alternative {alt}, expected 0"
        ))),
        _ => Err(CodecError::SchemaMismatch(format!("{what} is not a constructor record"))),
    }
}

impl TryFrom<&Datum> for ContractState {
    type Error = CodecError;

    fn try_from(datum: &Datum) -> Result<Self, CodecError> {
        let top = expect_record(datum, 8, "contract state")?;
        let param = expect_record(&top[7], 5, "param record")?;
        let asset = expect_record(&param[4], 3, "asset record")?;

        let owner = expect_bytes(&param[3], "owner")?;
        let owner = <[u8; 32]>::try_from(owner.as_slice()).map_err(|_| {
            CodecError::SchemaMismatch(format!("owner credential is {} bytes, expected 32", owner.len()))
        })?;

        Ok(ContractState {
            t_0: expect_int(&top[0], "t_0")?,
            x: expect_int(&top[1], "x")?,
            y: expect_int(&top[2], "y")?,
            z: expect_int(&top[3], "z")?,
            x_dot: expect_int(&top[4], "x_dot")?,
            y_dot: expect_int(&top[5], "y_dot")?,
            z_dot: expect_int(&top[6], "z_dot")?,
            param: StateParams {
                a: expect_int(&param[0], "a")?,
                b: expect_int(&param[1], "b")?,
                c: expect_int(&param[2], "c")?,
                owner: PaymentCredential::from(owner),
                asset: AssetClass {
                    policy: expect_bytes(&asset[0], "policy")?,
                    asset_name: expect_bytes(&asset[1], "asset_name")?,
                    quantity: expect_int(&asset[2], "quantity")?,
                },
            },
        })
    }
}

/// Encodes a contract state into its on-chain binary datum.
pub fn encode_state(state: &ContractState) -> Result<Vec<u8>, CodecError> {
    Datum::from(state).to_cbor()
}

/// Decodes an on-chain binary datum back into a contract state, rejecting
/// anything that does not match the schema exactly.
pub fn decode_state(bytes: &[u8]) -> Result<ContractState, CodecError> {
    ContractState::try_from(&Datum::from_cbor(bytes)?)
}

#[cfg(test)]
mod test {
    use rstest::rstest;

    use super::*;
    use crate::InitState;

    fn state(x: i128, quantity: i128) -> ContractState {
        let mut init = InitState::sample();
        init.x = x;
        init.param.asset.quantity = quantity;
        ContractState::genesis(&init, PaymentCredential::from([0x11; 32]), 1_721_000_000_000)
    }

    #[rstest]
    #[case(0, 100)]
    #[case(-42, 1)]
    #[case(i128::from(i64::MAX), 1_000_000_000)]
    #[case(-170_141_183_460_469, 7)]
    fn roundtrip(#[case] x: i128, #[case] quantity: i128) {
        let s = state(x, quantity);
        let bytes = encode_state(&s).unwrap();
        assert_eq!(decode_state(&bytes).unwrap(), s);
    }

    #[test]
    fn encoding_is_deterministic() {
        let s = state(5, 100);
        assert_eq!(encode_state(&s).unwrap(), encode_state(&s).unwrap());
    }

    #[test]
    fn out_of_range_integer_is_rejected() {
        let s = state(i128::MAX, 100);
        assert!(matches!(encode_state(&s), Err(CodecError::SchemaMismatch(_))));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let Datum::Constr(0, mut fields) = Datum::from(&state(0, 100)) else {
            unreachable!()
        };
        fields.pop();
        let truncated = Datum::Constr(0, fields).to_cbor().unwrap();
        assert!(matches!(decode_state(&truncated), Err(CodecError::SchemaMismatch(_))));
    }

    #[test]
    fn wrong_field_kind_is_rejected() {
        let Datum::Constr(0, mut fields) = Datum::from(&state(0, 100)) else {
            unreachable!()
        };
        fields[1] = Datum::Bytes(vec![0]);
        let mangled = Datum::Constr(0, fields).to_cbor().unwrap();
        assert!(matches!(decode_state(&mangled), Err(CodecError::SchemaMismatch(_))));
    }

    #[test]
    fn constructor_tags_follow_ledger_convention() {
        let bytes = Datum::Constr(0, vec![]).to_cbor().unwrap();
        // tag 121 = 0xd8 0x79, empty array = 0x80
        assert_eq!(bytes, vec![0xd8, 0x79, 0x80]);
    }

    #[test]
    fn unit_redeemer_shape() {
        let redeemer = Datum::unit_redeemer().to_cbor().unwrap();
        assert_eq!(Datum::from_cbor(&redeemer).unwrap(), Datum::unit_redeemer());
    }
}
