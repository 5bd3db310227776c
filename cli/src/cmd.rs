// State Matrix: command-line client for a state-stepping smart contract
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

use std::fmt::{self, Display, Formatter};
use std::path::PathBuf;

use clap::{Parser, ValueHint};
use statematrix::ScriptAddr;

pub const STATEM_WALLET_ENV: &str = "STATEMATRIX_WALLET";

#[derive(Parser, Clone, Eq, PartialEq, Debug)]
pub enum Cmd {
    /// Generate a new wallet and print its address
    WalletNew {
        /// Name of the wallet
        name: String,
    },

    /// List all known wallets
    WalletList,

    /// Lock the base asset at a freshly derived contract address and mint a
    /// collateral token
    Init {
        /// Wallet to use
        #[clap(short, long, env = STATEM_WALLET_ENV)]
        wallet: String,

        /// Path to an initial-state datum file; a built-in demo state is
        /// used when absent
        #[clap(long, value_hint = ValueHint::FilePath)]
        datum: Option<PathBuf>,
    },

    /// Add an amount to the stored x coordinate
    Increment {
        /// Wallet to use
        #[clap(short, long, env = STATEM_WALLET_ENV)]
        wallet: String,

        /// Contract address
        #[clap(short, long)]
        address: ScriptAddr,

        /// Amount to add
        #[clap(short = 'm', long)]
        amount: i128,
    },

    /// Replace the dynamical state fields wholesale from a datum file
    Decrement {
        /// Wallet to use
        #[clap(short, long, env = STATEM_WALLET_ENV)]
        wallet: String,

        /// Contract address
        #[clap(short, long)]
        address: ScriptAddr,

        /// Path to the replacement state record
        #[clap(long, value_hint = ValueHint::FilePath)]
        datum: PathBuf,
    },

    /// Mint an auxiliary test token to the wallet's own address
    Mint {
        /// Wallet to use
        #[clap(short, long, env = STATEM_WALLET_ENV)]
        wallet: String,

        /// Amount to mint
        #[clap(short = 'm', long)]
        amount: i128,
    },
}

impl Display for Cmd {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Cmd::WalletNew { .. } => f.write_str("wallet-new"),
            Cmd::WalletList => f.write_str("wallet-list"),
            Cmd::Init { .. } => f.write_str("init"),
            Cmd::Increment { .. } => f.write_str("increment"),
            Cmd::Decrement { .. } => f.write_str("decrement"),
            Cmd::Mint { .. } => f.write_str("mint"),
        }
    }
}
