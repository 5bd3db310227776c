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

//! End-to-end contract lifecycle against an in-memory ledger: initialize,
//! step the state, and check that the local mirror only ever reflects what
//! the ledger accepted.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use amplify::ByteArray;
use rstest::rstest;
use statematrix::{
    Config, InitState, LedgerProvider, Network, Outpoint, ProviderError, Runtime, RuntimeError,
    ScriptArtifact, SignedTx, Txid, Utxo,
};

const BASE_UNIT: &str = "abcd746f6b"; // policy abcd + "tok"

/// Minimal in-memory ledger: tracks unspent outputs per address and applies
/// every accepted transaction to them, which is exactly the linearization
/// the real ledger provides by rejecting double-spends.
#[derive(Default)]
struct MockLedger {
    utxos: RefCell<BTreeMap<String, Vec<Utxo>>>,
    fail_submit: Cell<bool>,
    confirms: Cell<bool>,
    counter: Cell<u8>,
}

impl MockLedger {
    fn new() -> Self {
        let ledger = MockLedger::default();
        ledger.confirms.set(true);
        ledger
    }

    fn fund(&self, address: &str, unit: &str, quantity: i128) {
        let n = self.counter.get();
        self.counter.set(n + 1);
        self.utxos.borrow_mut().entry(address.to_owned()).or_default().push(Utxo {
            outpoint: Outpoint { txid: Txid::from([n; 32]), vout: 0 },
            address: address.to_owned(),
            coin: 10_000_000,
            assets: BTreeMap::from([(unit.to_owned(), quantity)]),
            datum: None,
        });
    }

    fn wipe(&self, address: &str) {
        self.utxos.borrow_mut().remove(address);
    }

    fn apply(&self, tx: &SignedTx) {
        let mut utxos = self.utxos.borrow_mut();
        for input in &tx.body.inputs {
            for list in utxos.values_mut() {
                list.retain(|utxo| utxo.outpoint != input.outpoint);
            }
        }
        for (vout, output) in tx.body.outputs.iter().enumerate() {
            utxos.entry(output.address.clone()).or_default().push(Utxo {
                outpoint: Outpoint { txid: tx.txid, vout: vout as u32 },
                address: output.address.clone(),
                coin: output.coin,
                assets: output.assets.clone(),
                datum: output.datum.clone(),
            });
        }
    }
}

impl LedgerProvider for MockLedger {
    fn utxos_at(&self, address: &str) -> Result<Vec<Utxo>, ProviderError> {
        Ok(self.utxos.borrow().get(address).cloned().unwrap_or_default())
    }

    fn submit(&self, tx: &SignedTx) -> Result<Txid, ProviderError> {
        if self.fail_submit.get() {
            return Err(ProviderError::Rejected("script validation failed".into()));
        }
        self.apply(tx);
        Ok(tx.txid)
    }

    fn is_confirmed(&self, _txid: Txid) -> Result<bool, ProviderError> { Ok(self.confirms.get()) }
}

// the runtime only borrows the ledger, leaving the tests free to inspect it
impl LedgerProvider for &MockLedger {
    fn utxos_at(&self, address: &str) -> Result<Vec<Utxo>, ProviderError> {
        (*self).utxos_at(address)
    }

    fn submit(&self, tx: &SignedTx) -> Result<Txid, ProviderError> { (*self).submit(tx) }

    fn is_confirmed(&self, txid: Txid) -> Result<bool, ProviderError> { (*self).is_confirmed(txid) }
}

fn config(data_dir: &Path) -> Config {
    Config {
        node_endpoint: "http://localhost:9042".to_owned(),
        api_key: None,
        network: Network::Preview,
        data_dir: data_dir.to_path_buf(),
        confirm_timeout: Duration::from_secs(0),
    }
}

fn artifact() -> ScriptArtifact {
    ScriptArtifact {
        script_type: "PlutusV3".to_owned(),
        description: "state matrix stepping validator".to_owned(),
        cbor_hex: "5876a54dca182530bb1d6d132cded6237b".to_owned(),
    }
}

struct Fixture {
    _dir: tempfile::TempDir,
    data_dir: std::path::PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_path_buf();
        Fixture { _dir: dir, data_dir }
    }

    fn runtime<'l>(&self, ledger: &'l MockLedger) -> Runtime<&'l MockLedger> {
        Runtime::with(&config(&self.data_dir), ledger).unwrap()
    }

    fn state_file(&self, address: &str) -> std::path::PathBuf {
        self.data_dir.join("data").join("contracts").join(address).join("state.json")
    }
}

fn initialized(fx: &Fixture, ledger: &MockLedger, init: &InitState) -> statematrix::ScriptAddr {
    let runtime = fx.runtime(ledger);
    let wallet = runtime.wallets().create("operator").unwrap();
    ledger.fund(&wallet.address(), BASE_UNIT, 100);
    let info = runtime.initialize(&wallet, init, &artifact()).unwrap();
    info.address.unwrap()
}

#[test]
fn init_persists_mirror_with_locked_asset() {
    let fx = Fixture::new();
    let ledger = MockLedger::new();
    let address = initialized(&fx, &ledger, &InitState::sample());

    let runtime = fx.runtime(&ledger);
    let contract = runtime.contract(address).unwrap();
    assert_eq!(contract.state.param.asset.quantity, 100);
    assert_eq!(contract.state.param.asset.policy, vec![0xAB, 0xCD]);
    assert_eq!(contract.state.param.asset.asset_name, b"tok".to_vec());
    assert_eq!(contract.state.x, 0);

    // the locked asset now sits at the script address
    let held = ledger.utxos_at(&address.to_string()).unwrap();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].assets.get(BASE_UNIT), Some(&100));
}

#[test]
fn distinct_consumed_inputs_give_distinct_addresses() {
    let fx1 = Fixture::new();
    let ledger1 = MockLedger::new();
    let addr1 = initialized(&fx1, &ledger1, &InitState::sample());

    let fx2 = Fixture::new();
    let ledger2 = MockLedger::new();
    ledger2.counter.set(42); // different consumed outpoint, same parameters
    let addr2 = initialized(&fx2, &ledger2, &InitState::sample());

    assert_ne!(addr1, addr2);
}

#[test]
fn init_without_base_asset_creates_nothing() {
    let fx = Fixture::new();
    let ledger = MockLedger::new();
    let runtime = fx.runtime(&ledger);
    let wallet = runtime.wallets().create("operator").unwrap();

    let err = runtime.initialize(&wallet, &InitState::sample(), &artifact()).unwrap_err();
    assert!(matches!(err, RuntimeError::AssetNotFound { .. }));
    assert!(!fx.data_dir.join("data").join("contracts").exists()
        || fs::read_dir(fx.data_dir.join("data").join("contracts")).unwrap().next().is_none());
}

#[rstest]
#[case(0, 5, 5)]
#[case(10, 5, 15)]
#[case(7, -9, -2)]
fn increment_steps_x_and_preserves_asset(#[case] x0: i128, #[case] amount: i128, #[case] expect: i128) {
    let fx = Fixture::new();
    let ledger = MockLedger::new();
    let mut init = InitState::sample();
    init.x = x0;
    let address = initialized(&fx, &ledger, &init);

    let runtime = fx.runtime(&ledger);
    let wallet = runtime.wallets().load("operator").unwrap();
    runtime.increment(&wallet, address, amount).unwrap();

    let contract = runtime.contract(address).unwrap();
    assert_eq!(contract.state.x, expect);
    assert_eq!(contract.state.param.asset.quantity, 100);
    assert_eq!(contract.state.param.asset.asset_name, b"tok".to_vec());
}

#[test]
fn wholesale_replacement_cannot_touch_the_locked_asset() {
    let fx = Fixture::new();
    let ledger = MockLedger::new();
    let address = initialized(&fx, &ledger, &InitState::sample());

    let runtime = fx.runtime(&ledger);
    let wallet = runtime.wallets().load("operator").unwrap();

    let mut replacement = runtime.contract(address).unwrap().state;
    replacement.x = -3;
    replacement.y = 14;
    replacement.param.asset.quantity = 999_999;
    replacement.param.a = 77;
    runtime.update_state(&wallet, address, &replacement).unwrap();

    let contract = runtime.contract(address).unwrap();
    assert_eq!(contract.state.x, -3);
    assert_eq!(contract.state.y, 14);
    // parameter record carried forward from the confirmed state
    assert_eq!(contract.state.param.asset.quantity, 100);
    assert_eq!(contract.state.param.a, 10);

    // and on-chain the new output still carries exactly the locked asset
    let held = ledger.utxos_at(&address.to_string()).unwrap();
    assert_eq!(held[0].assets.get(BASE_UNIT), Some(&100));
}

#[test]
fn repeated_steps_keep_asset_identity() {
    let fx = Fixture::new();
    let ledger = MockLedger::new();
    let address = initialized(&fx, &ledger, &InitState::sample());

    let runtime = fx.runtime(&ledger);
    let wallet = runtime.wallets().load("operator").unwrap();
    let genesis_asset = runtime.contract(address).unwrap().state.param.asset.clone();

    for amount in [5, -2, 100] {
        runtime.increment(&wallet, address, amount).unwrap();
        let asset = runtime.contract(address).unwrap().state.param.asset.clone();
        assert_eq!(asset, genesis_asset);
    }
}

#[test]
fn missing_script_output_is_a_hard_stop() {
    let fx = Fixture::new();
    let ledger = MockLedger::new();
    let address = initialized(&fx, &ledger, &InitState::sample());
    let before = fs::read(fx.state_file(&address.to_string())).unwrap();

    ledger.wipe(&address.to_string());
    let runtime = fx.runtime(&ledger);
    let wallet = runtime.wallets().load("operator").unwrap();

    let err = runtime.increment(&wallet, address, 5).unwrap_err();
    assert!(matches!(err, RuntimeError::AssetNotFound { .. }));
    assert_eq!(fs::read(fx.state_file(&address.to_string())).unwrap(), before);
}

#[test]
fn rejected_submission_leaves_mirror_untouched() {
    let fx = Fixture::new();
    let ledger = MockLedger::new();
    let address = initialized(&fx, &ledger, &InitState::sample());
    let before = fs::read(fx.state_file(&address.to_string())).unwrap();

    ledger.fail_submit.set(true);
    let runtime = fx.runtime(&ledger);
    let wallet = runtime.wallets().load("operator").unwrap();

    let err = runtime.increment(&wallet, address, 5).unwrap_err();
    assert!(matches!(err, RuntimeError::Provider(ProviderError::Rejected(_))));
    assert_eq!(fs::read(fx.state_file(&address.to_string())).unwrap(), before);
}

#[test]
fn confirmation_timeout_reports_after_acceptance() {
    let fx = Fixture::new();
    let ledger = MockLedger::new();
    let address = initialized(&fx, &ledger, &InitState::sample());

    // the ledger accepts the submission but inclusion never shows up
    ledger.confirms.set(false);
    let runtime = fx.runtime(&ledger);
    let wallet = runtime.wallets().load("operator").unwrap();

    let err = runtime.increment(&wallet, address, 5).unwrap_err();
    assert!(matches!(err, RuntimeError::Provider(ProviderError::Timeout(..))));
    // acceptance happened, so the mirror reflects the submitted state
    assert_eq!(runtime.contract(address).unwrap().state.x, 5);
}

#[test]
fn mint_pays_test_token_to_own_address() {
    let fx = Fixture::new();
    let ledger = MockLedger::new();
    let runtime = fx.runtime(&ledger);
    let wallet = runtime.wallets().create("minter").unwrap();

    let info = runtime.mint_test_token(&wallet, 1000).unwrap();
    let policy = info.policy.unwrap();

    let held = ledger.utxos_at(&wallet.address()).unwrap();
    let unit = format!("{}{}", hex::encode(policy.to_byte_array()), hex::encode("TestToken"));
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].assets.get(&unit), Some(&1000));
}
