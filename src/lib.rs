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

//! Client runtime for the state-matrix stepping contract.
//!
//! The contract keeps a discretized dynamical system on-chain: a point with
//! position, velocity and evolution parameters, locked together with a fixed
//! quantity of a base asset. This library provides everything a client needs
//! to drive it: seed-phrase wallets, a file-backed mirror of deployed
//! contracts, the datum codec, and the transaction orchestration which
//! advances the on-chain state while keeping the locked asset untouched.

#[macro_use]
extern crate amplify;
#[macro_use]
extern crate log;

mod errors;
mod config;
mod ident;
mod state;
mod codec;
mod contract;
mod wallet;
mod tx;
mod store;
mod provider;
mod runtime;

pub use codec::{decode_state, encode_state, Datum};
pub use config::{
    Config, Network, CONFIRM_TIMEOUT_ENV, NETWORK_ENV, NODE_API_KEY_ENV, NODE_ENDPOINT_ENV,
};
pub use contract::{DeployedContract, ParamScript, ScriptArtifact, ScriptParams};
pub use errors::{CodecError, ConfigError, ProviderError, RuntimeError, StoreError, WalletError};
pub use ident::{PaymentCredential, ScriptAddr, ScriptHash, Txid};
pub use provider::{HttpProvider, LedgerProvider};
pub use runtime::{Runtime, TxInfo};
pub use state::{AssetClass, ContractState, InitState, StateParams};
pub use store::ContractStore;
pub use tx::{
    AssetId, MintPolicy, Outpoint, SignedTx, TxBody, TxBuilder, TxInput, TxOutput, TxWitness,
    Utxo, ValidityWindow,
};
pub use wallet::{Wallet, WalletStore};
