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

use std::fs;
use std::path::Path;

use statematrix::{
    CodecError, Config, ContractState, HttpProvider, InitState, Runtime, RuntimeError,
    ScriptArtifact, TxInfo, WalletStore,
};

use crate::{Args, Cmd};

fn read_json<T: for<'de> serde::Deserialize<'de>>(path: &Path) -> Result<T, RuntimeError> {
    let data = fs::read_to_string(path)?;
    serde_json::from_str(&data).map_err(|e| {
        CodecError::SchemaMismatch(format!("datum file {}: {e}", path.display())).into()
    })
}

impl Args {
    fn runtime(&self) -> Result<Runtime<HttpProvider>, RuntimeError> {
        let config = Config::from_env(self.data_dir.clone())?;
        Runtime::load(&config)
    }

    fn wallet_store(&self) -> Result<WalletStore, RuntimeError> {
        Ok(WalletStore::at(Config::wallet_dir_in(&self.data_dir))?)
    }

    pub fn exec(&self) -> Result<(), RuntimeError> {
        match &self.command {
            Cmd::WalletNew { name } => {
                let wallet = self.wallet_store()?.create(name)?;
                println!("Wallet {name} created successfully");
                println!("Seed phrase: {}", wallet.seed_phrase());
                println!("Address: {}", wallet.address());
            }

            Cmd::WalletList => {
                let names = self.wallet_store()?.list()?;
                if names.is_empty() {
                    eprintln!("No wallets found");
                } else {
                    println!("Available wallets:");
                    for name in names {
                        println!("- {name}");
                    }
                }
            }

            Cmd::Init { wallet, datum } => {
                let runtime = self.runtime()?;
                eprint!("Loading wallet ... ");
                let wallet = runtime.wallets().load(wallet)?;
                eprintln!("success");
                eprintln!("User address: {}", wallet.address());

                let init = match datum {
                    Some(path) => {
                        eprintln!("Loading datum from {}", path.display());
                        read_json::<InitState>(path)?
                    }
                    None => {
                        eprintln!("Using the built-in demo datum");
                        InitState::sample()
                    }
                };
                let artifact = ScriptArtifact::load(&self.script)?;

                let info = runtime.initialize(&wallet, &init, &artifact)?;
                println!("Contract successfully initialized");
                println!("Contract address: {}", info.address.map(|a| a.to_string()).unwrap_or_default());
                println!("Contract policy: {}", info.policy.map(|p| p.to_string()).unwrap_or_default());
                report_settled(&info);
            }

            Cmd::Increment { wallet, address, amount } => {
                let runtime = self.runtime()?;
                eprint!("Loading wallet ... ");
                let wallet = runtime.wallets().load(wallet)?;
                eprintln!("success");

                eprintln!("Contract address: {address}");
                let info = runtime.increment(&wallet, *address, *amount)?;
                report_settled(&info);
            }

            Cmd::Decrement { wallet, address, datum } => {
                let runtime = self.runtime()?;
                eprint!("Loading wallet ... ");
                let wallet = runtime.wallets().load(wallet)?;
                eprintln!("success");

                eprintln!("Contract address: {address}");
                let new_state = read_json::<ContractState>(datum)?;
                let info = runtime.update_state(&wallet, *address, &new_state)?;
                report_settled(&info);
            }

            Cmd::Mint { wallet, amount } => {
                let runtime = self.runtime()?;
                eprint!("Loading wallet ... ");
                let wallet = runtime.wallets().load(wallet)?;
                eprintln!("success");
                eprintln!("User address: {}", wallet.address());

                let info = runtime.mint_test_token(&wallet, *amount)?;
                println!("Minting policy: {}", info.policy.map(|p| p.to_string()).unwrap_or_default());
                report_settled(&info);
            }
        }
        Ok(())
    }
}

fn report_settled(info: &TxInfo) {
    println!("TX hash: {}", info.txid);
    println!("TX settled");
}
