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

//! Transaction orchestration: locating the contract's unspent output,
//! building and submitting state transitions, and keeping the local mirror
//! in sync with what the ledger accepted.

use std::collections::BTreeMap;
use std::time::Duration;

use amplify::ByteArray;
use chrono::Utc;

use crate::contract::ParamScript;
use crate::state::AssetClass;
use crate::tx::{AssetId, MintPolicy, TxBuilder, Utxo, ValidityWindow};
use crate::{
    encode_state, CodecError, Config, ContractState, ContractStore, Datum, DeployedContract,
    HttpProvider, InitState, LedgerProvider, Network, RuntimeError, ScriptAddr, ScriptArtifact,
    ScriptHash, ScriptParams, Txid, Wallet, WalletStore,
};

pub const COLLATERAL_TOKEN: &[u8] = b"CollateralToken";
pub const TEST_TOKEN: &[u8] = b"TestToken";

/// Outcome of a submitted operation.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct TxInfo {
    pub txid: Txid,
    pub address: Option<ScriptAddr>,
    pub policy: Option<ScriptHash>,
}

/// Client-side orchestrator tying together the wallet store, the contract
/// mirror and a ledger provider.
///
/// Every operation is a linear build-sign-submit sequence with no internal
/// retry: failures surface verbatim and leave the mirror untouched.
pub struct Runtime<P: LedgerProvider> {
    network: Network,
    confirm_timeout: Duration,
    wallets: WalletStore,
    contracts: ContractStore,
    provider: P,
}

impl Runtime<HttpProvider> {
    /// Stands up the runtime from environment configuration with the HTTP
    /// gateway backend.
    pub fn load(config: &Config) -> Result<Self, RuntimeError> {
        let provider = HttpProvider::new(&config.node_endpoint, config.api_key.as_deref())?;
        Runtime::with(config, provider)
    }
}

impl<P: LedgerProvider> Runtime<P> {
    pub fn with(config: &Config, provider: P) -> Result<Self, RuntimeError> {
        Ok(Runtime {
            network: config.network,
            confirm_timeout: config.confirm_timeout,
            wallets: WalletStore::at(config.wallet_dir())?,
            contracts: ContractStore::at(config.contract_dir())?,
            provider,
        })
    }

    pub fn wallets(&self) -> &WalletStore { &self.wallets }

    pub fn contracts(&self) -> &ContractStore { &self.contracts }

    fn find_asset_utxo(
        &self,
        address: &str,
        asset: &AssetId,
    ) -> Result<Utxo, RuntimeError> {
        let utxos = self.provider.utxos_at(address)?;
        utxos
            .into_iter()
            .find(|utxo| utxo.holds(asset))
            .ok_or_else(|| RuntimeError::AssetNotFound {
                address: address.to_owned(),
                asset: asset.to_string(),
            })
    }

    /// Locks the base asset at a freshly derived script address, mints one
    /// collateral unit and mirrors the deployed contract on disk.
    ///
    /// The consumed user output is bound into the script parameters, so a
    /// second initialization with identical logical parameters still yields
    /// a distinct deployment.
    pub fn initialize(
        &self,
        wallet: &Wallet,
        init: &InitState,
        artifact: &ScriptArtifact,
    ) -> Result<TxInfo, RuntimeError> {
        let window = ValidityWindow::starting_now();
        let asset = AssetClass::from_label(
            init.param.asset.policy.clone(),
            &init.param.asset.asset_name,
            init.param.asset.quantity,
        );
        let asset_id = AssetId::from(&asset);

        info!("initializing contract locking {} of {asset_id}", asset.quantity);
        let utxo = self.find_asset_utxo(&wallet.address(), &asset_id)?;
        debug!("consuming user output {}", utxo.outpoint);

        let params = ScriptParams { asset: asset.clone(), consumed: utxo.outpoint };
        let script = ParamScript::parameterize(artifact, &params, self.network)?;
        let script_body = script
            .validator
            .script_bytes()
            .map_err(|e| CodecError::SchemaMismatch(e.to_string()))?;

        let state = ContractState::genesis(init, wallet.credential(), window.valid_to as i128);
        let datum = encode_state(&state)?;

        let collateral = AssetId {
            policy: script.hash.to_byte_array().to_vec(),
            name: COLLATERAL_TOKEN.to_vec(),
        };

        let tx = TxBuilder::new(window)
            .collect(utxo.outpoint, None)?
            .pay(
                script.address,
                0,
                BTreeMap::from([(asset_id.unit(), asset.quantity)]),
                Some(&datum),
            )
            .mint(&collateral, 1)
            .pay(wallet.address(), 0, BTreeMap::from([(collateral.unit(), 1)]), None)
            .attach_script(&script_body)
            .add_signer(wallet)
            .sign(wallet)?;

        let txid = self.provider.submit(&tx)?;
        // ledger accepted the deployment; only now does the mirror exist
        self.contracts.save(script.address, &script, &state)?;
        info!("contract deployed at {} by transaction {txid}", script.address);

        self.provider.await_confirmation(txid, self.confirm_timeout)?;
        Ok(TxInfo { txid, address: Some(script.address), policy: Some(script.hash) })
    }

    /// Replaces the dynamical fields of the stored state with
    /// caller-supplied values and submits the transition.
    ///
    /// The parameter record — evolution constants, owner credential and the
    /// locked asset's identity and quantity — is always carried forward
    /// from the confirmed state; caller-supplied values for it are ignored.
    /// The mirror is rewritten only after the ledger accepts the
    /// transaction.
    pub fn update_state(
        &self,
        wallet: &Wallet,
        address: ScriptAddr,
        new_state: &ContractState,
    ) -> Result<TxInfo, RuntimeError> {
        let contract = self.contracts.load(address)?;
        let state = ContractState {
            t_0: new_state.t_0,
            x: new_state.x,
            y: new_state.y,
            z: new_state.z,
            x_dot: new_state.x_dot,
            y_dot: new_state.y_dot,
            z_dot: new_state.z_dot,
            param: contract.state.param.clone(),
        };

        let asset_id = AssetId::from(&state.param.asset);
        let utxo = self.find_asset_utxo(&address.to_string(), &asset_id)?;
        debug!("advancing contract state at output {}", utxo.outpoint);

        let window = ValidityWindow::starting_now();
        let datum = encode_state(&state)?;
        let script_body = contract
            .script
            .validator
            .script_bytes()
            .map_err(|e| CodecError::SchemaMismatch(e.to_string()))?;

        let tx = TxBuilder::new(window)
            .collect(utxo.outpoint, Some(&Datum::unit_redeemer()))?
            .pay(
                address,
                utxo.coin,
                BTreeMap::from([(asset_id.unit(), state.param.asset.quantity)]),
                Some(&datum),
            )
            .attach_script(&script_body)
            .add_signer(wallet)
            .sign(wallet)?;

        let txid = self.provider.submit(&tx)?;
        // persisted strictly after ledger acceptance
        self.contracts.update_state(address, &state)?;
        info!("state transition {txid} accepted at {address}");

        self.provider.await_confirmation(txid, self.confirm_timeout)?;
        Ok(TxInfo { txid, address: Some(address), policy: Some(contract.script.hash) })
    }

    /// Adds `amount` to the stored `x` coordinate and submits the result.
    pub fn increment(
        &self,
        wallet: &Wallet,
        address: ScriptAddr,
        amount: i128,
    ) -> Result<TxInfo, RuntimeError> {
        let contract = self.contracts.load(address)?;
        let mut state = contract.state;
        state.x = state.x.checked_add(amount).ok_or_else(|| {
            CodecError::SchemaMismatch(format!("incrementing x by {amount} overflows"))
        })?;
        self.update_state(wallet, address, &state)
    }

    /// Mints `amount` units of the auxiliary test token to the wallet's own
    /// address. Utility command outside the contract lifecycle.
    pub fn mint_test_token(&self, wallet: &Wallet, amount: i128) -> Result<TxInfo, RuntimeError> {
        let window = ValidityWindow::starting_now();
        let policy = MintPolicy::sig_before(wallet, Utc::now().timestamp_millis() + 1_000_000);
        let policy_id = policy.policy_id()?;
        let token = AssetId { policy: policy_id.to_byte_array().to_vec(), name: TEST_TOKEN.to_vec() };
        info!("minting {amount} of {token} under policy {policy_id}");

        let tx = TxBuilder::new(window)
            .mint(&token, amount)
            .pay(wallet.address(), 0, BTreeMap::from([(token.unit(), amount)]), None)
            .add_signer(wallet)
            .sign(wallet)?;

        let txid = self.provider.submit(&tx)?;
        self.provider.await_confirmation(txid, self.confirm_timeout)?;
        Ok(TxInfo { txid, address: None, policy: Some(policy_id) })
    }

    /// Read access to the mirrored contract, for reporting and for callers
    /// preparing a replacement state.
    pub fn contract(&self, address: ScriptAddr) -> Result<DeployedContract, RuntimeError> {
        Ok(self.contracts.load(address)?)
    }
}
