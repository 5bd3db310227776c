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

use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::tx::{SignedTx, Utxo};
use crate::{ProviderError, Txid};

/// Access to the ledger node: querying unspent outputs, submitting
/// transactions and waiting for their confirmation.
///
/// The runtime is generic over this trait; the HTTP gateway backend serves
/// production use and tests plug in an in-memory ledger.
pub trait LedgerProvider {
    /// All unspent outputs currently held at `address`.
    fn utxos_at(&self, address: &str) -> Result<Vec<Utxo>, ProviderError>;

    /// Submits a signed transaction; a ledger-side rejection (script
    /// validation, expired validity window) surfaces as
    /// [`ProviderError::Rejected`] verbatim.
    fn submit(&self, tx: &SignedTx) -> Result<Txid, ProviderError>;

    /// Whether the transaction has been included in the ledger.
    fn is_confirmed(&self, txid: Txid) -> Result<bool, ProviderError>;

    /// Polls for inclusion until `timeout` expires.
    ///
    /// On expiry returns [`ProviderError::Timeout`] without assuming the
    /// submission settled or failed; the caller must re-check before any
    /// resubmission.
    fn await_confirmation(&self, txid: Txid, timeout: Duration) -> Result<(), ProviderError> {
        const POLL_INTERVAL: Duration = Duration::from_secs(2);
        let deadline = Instant::now() + timeout;
        loop {
            if self.is_confirmed(txid)? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(ProviderError::Timeout(txid.to_string(), timeout.as_secs()));
            }
            thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
        }
    }
}

/// Blocking HTTP client for a ledger node gateway.
pub struct HttpProvider {
    base: String,
    api_key: Option<String>,
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct SubmitResponse {
    txid: Txid,
}

#[derive(Deserialize)]
struct TxStatus {
    confirmed: bool,
}

impl HttpProvider {
    pub fn new(endpoint: &str, api_key: Option<&str>) -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(HttpProvider {
            base: endpoint.trim_end_matches('/').to_owned(),
            api_key: api_key.map(str::to_owned),
            client,
        })
    }

    fn get(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        let req = self.client.get(format!("{}/{path}", self.base));
        match &self.api_key {
            Some(key) => req.header("x-api-key", key),
            None => req,
        }
    }

    fn post(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        let req = self.client.post(format!("{}/{path}", self.base));
        match &self.api_key {
            Some(key) => req.header("x-api-key", key),
            None => req,
        }
    }
}

impl LedgerProvider for HttpProvider {
    fn utxos_at(&self, address: &str) -> Result<Vec<Utxo>, ProviderError> {
        trace!("querying utxos at {address}");
        let resp = self
            .get(&format!("v1/utxos/{address}"))
            .send()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            return Err(ProviderError::Response(format!(
                "utxo query for {address} failed with status {}",
                resp.status()
            )));
        }
        resp.json().map_err(|e| ProviderError::Response(e.to_string()))
    }

    fn submit(&self, tx: &SignedTx) -> Result<Txid, ProviderError> {
        debug!("submitting transaction {}", tx.txid);
        let resp = self
            .post("v1/tx")
            .json(tx)
            .send()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let status = resp.status();
        if status.is_client_error() {
            let reason = resp.text().unwrap_or_else(|e| e.to_string());
            return Err(ProviderError::Rejected(reason));
        }
        if !status.is_success() {
            return Err(ProviderError::Response(format!(
                "submission failed with status {status}"
            )));
        }
        let resp: SubmitResponse = resp.json().map_err(|e| ProviderError::Response(e.to_string()))?;
        Ok(resp.txid)
    }

    fn is_confirmed(&self, txid: Txid) -> Result<bool, ProviderError> {
        let resp = self
            .get(&format!("v1/tx/{txid}"))
            .send()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !resp.status().is_success() {
            return Err(ProviderError::Response(format!(
                "tx status query failed with status {}",
                resp.status()
            )));
        }
        let status: TxStatus = resp.json().map_err(|e| ProviderError::Response(e.to_string()))?;
        Ok(status.confirmed)
    }
}
