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

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::ConfigError;

pub const NODE_ENDPOINT_ENV: &str = "STATEMATRIX_NODE_ENDPOINT";
pub const NODE_API_KEY_ENV: &str = "STATEMATRIX_NODE_API_KEY";
pub const NETWORK_ENV: &str = "STATEMATRIX_NETWORK";
pub const CONFIRM_TIMEOUT_ENV: &str = "STATEMATRIX_CONFIRM_TIMEOUT";

const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 90;

#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Debug, Default, Display)]
#[display(lowercase)]
pub enum Network {
    Mainnet,
    #[default]
    Preview,
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "preview" | "testnet" => Ok(Network::Preview),
            other => Err(format!("unknown network '{other}'")),
        }
    }
}

/// Runtime configuration, read from the process environment at startup.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Config {
    /// Base URL of the ledger node HTTP gateway.
    pub node_endpoint: String,
    /// Optional API key sent as a request header to the gateway.
    pub api_key: Option<String>,
    pub network: Network,
    /// Root of the on-disk wallet and contract stores.
    pub data_dir: PathBuf,
    /// Upper bound on waiting for transaction confirmation.
    pub confirm_timeout: Duration,
}

impl Config {
    /// Reads the configuration from the environment, failing fast on a
    /// missing or malformed variable instead of surfacing the problem later
    /// as a network-layer failure.
    pub fn from_env(data_dir: PathBuf) -> Result<Config, ConfigError> {
        let node_endpoint = env::var(NODE_ENDPOINT_ENV)
            .map_err(|_| ConfigError::Missing(NODE_ENDPOINT_ENV))?;
        if node_endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid(NODE_ENDPOINT_ENV, s!("empty endpoint URL")));
        }

        let api_key = env::var(NODE_API_KEY_ENV).ok().filter(|k| !k.is_empty());

        let network = match env::var(NETWORK_ENV) {
            Ok(name) => Network::from_str(&name).map_err(|e| ConfigError::Invalid(NETWORK_ENV, e))?,
            Err(_) => Network::default(),
        };

        let confirm_timeout = match env::var(CONFIRM_TIMEOUT_ENV) {
            Ok(secs) => {
                let secs = secs
                    .parse::<u64>()
                    .map_err(|e| ConfigError::Invalid(CONFIRM_TIMEOUT_ENV, e.to_string()))?;
                Duration::from_secs(secs)
            }
            Err(_) => Duration::from_secs(DEFAULT_CONFIRM_TIMEOUT_SECS),
        };

        Ok(Config { node_endpoint, api_key, network, data_dir, confirm_timeout })
    }

    /// Wallet store location inside a data directory. Callers which need no
    /// node configuration (pure wallet commands) use this directly.
    pub fn wallet_dir_in(data_dir: &Path) -> PathBuf { data_dir.join("wallets") }

    pub fn wallet_dir(&self) -> PathBuf { Self::wallet_dir_in(&self.data_dir) }

    pub fn contract_dir(&self) -> PathBuf { self.data_dir.join("data").join("contracts") }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn network_parsing() {
        assert_eq!(Network::from_str("Preview").unwrap(), Network::Preview);
        assert_eq!(Network::from_str("mainnet").unwrap(), Network::Mainnet);
        assert!(Network::from_str("devnet").is_err());
        assert_eq!(Network::Preview.to_string(), "preview");
    }

    #[test]
    fn wallet_dir_agrees_with_layout_helper() {
        let config = Config {
            node_endpoint: s!("http://localhost:9042"),
            api_key: None,
            network: Network::Preview,
            data_dir: PathBuf::from("/data"),
            confirm_timeout: Duration::from_secs(90),
        };
        assert_eq!(config.wallet_dir(), Config::wallet_dir_in(Path::new("/data")));
    }
}
