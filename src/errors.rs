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

use std::io;

use amplify::IoError;

/// Errors produced while reading the process environment at startup.
///
/// Raised before any network connection is attempted, so a missing endpoint
/// surfaces as a configuration problem and not as a deep transport failure.
#[derive(Debug, Display, Error)]
#[display(doc_comments)]
pub enum ConfigError {
    /// required environment variable ${0} is not set.
    Missing(&'static str),

    /// environment variable ${0} holds an invalid value: {1}.
    Invalid(&'static str, String),
}

#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum WalletError {
    #[from]
    #[from(io::Error)]
    #[display(inner)]
    File(IoError),

    /// wallet '{0}' already exists.
    AlreadyExists(String),

    /// wallet '{0}' is not known to the system.
    NotFound(String),

    /// '{0}' is not a valid wallet name; names must be non-empty and must
    /// not contain path separators.
    InvalidName(String),

    /// wallet record is damaged: {0}.
    Corrupt(String),

    /// seed phrase is invalid: {0}.
    Seed(String),
}

#[derive(Debug, Display, Error, From)]
#[display(doc_comments)]
pub enum StoreError {
    #[from]
    #[from(io::Error)]
    #[display(inner)]
    File(IoError),

    /// no contract mirror exists for address {0}.
    NotFound(String),

    /// contract record at {0} is damaged: {1}.
    Corrupt(String, String),
}

#[derive(Debug, Display, Error)]
#[display(doc_comments)]
pub enum CodecError {
    /// datum does not match the contract state schema: {0}.
    SchemaMismatch(String),
}

#[derive(Debug, Display, Error)]
#[display(doc_comments)]
pub enum ProviderError {
    /// network failure talking to the ledger node: {0}.
    Network(String),

    /// ledger node returned an unparseable response: {0}.
    Response(String),

    /// transaction was rejected by the ledger: {0}.
    Rejected(String),

    /// transaction {0} was not confirmed within {1} seconds. The
    /// submission itself may still settle; re-check before resubmitting.
    Timeout(String, u64),
}

/// Top-level error type of the orchestration runtime.
///
/// Every variant is terminal for the current command invocation: the command
/// aborts, reports the error, and leaves the on-disk mirror at the last
/// confirmed state.
#[derive(Debug, Display, Error, From)]
#[display(inner)]
pub enum RuntimeError {
    #[from]
    Config(ConfigError),

    #[from]
    Wallet(WalletError),

    #[from]
    Store(StoreError),

    #[from]
    Codec(CodecError),

    #[from]
    Provider(ProviderError),

    #[from]
    #[from(io::Error)]
    File(IoError),

    /// no unspent output carrying the base asset {asset} was found at
    /// {address}. The contract is either not initialized, fully withdrawn,
    /// or the local mirror points at a stale address.
    #[display(doc_comments)]
    AssetNotFound { address: String, asset: String },

    /// script artifact at '{0}' cannot be loaded: {1}.
    #[display(doc_comments)]
    Artifact(String, String),
}

impl RuntimeError {
    /// Stable per-taxonomy process exit code, used by the CLI.
    pub fn exit_code(&self) -> u8 {
        match self {
            RuntimeError::Config(_) => 2,
            RuntimeError::Wallet(WalletError::NotFound(_)) | RuntimeError::Store(StoreError::NotFound(_)) => 3,
            RuntimeError::Wallet(WalletError::AlreadyExists(_)) => 4,
            RuntimeError::AssetNotFound { .. } => 5,
            RuntimeError::Codec(_) => 6,
            RuntimeError::Provider(ProviderError::Timeout(..)) => 7,
            RuntimeError::Provider(_) => 8,
            _ => 1,
        }
    }
}
