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

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use bip39::{Language, Mnemonic, MnemonicType, Seed};
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

use crate::tx::{SignedTx, TxWitness};
use crate::{PaymentCredential, WalletError};

#[derive(Clone, Eq, PartialEq, Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WalletRecord {
    seed: String,
}

/// A named wallet: seed phrase plus the signing key derived from it.
///
/// Created once, never mutated; deletion is an out-of-band file operation.
pub struct Wallet {
    name: String,
    seed_phrase: String,
    signing_key: SigningKey,
    credential: PaymentCredential,
}

impl Wallet {
    fn from_seed(name: String, seed_phrase: String) -> Result<Self, WalletError> {
        let mnemonic = Mnemonic::from_phrase(&seed_phrase, Language::English)
            .map_err(|e| WalletError::Seed(e.to_string()))?;
        let seed = Seed::new(&mnemonic, "");
        let mut key = [0u8; 32];
        key.copy_from_slice(&seed.as_bytes()[..32]);
        let signing_key = SigningKey::from_bytes(&key);
        let credential = PaymentCredential::with(signing_key.verifying_key().as_bytes());
        Ok(Wallet { name, seed_phrase, signing_key, credential })
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn seed_phrase(&self) -> &str { &self.seed_phrase }

    /// Hash of the verifying key; identifies this wallet as a transaction
    /// signer and as the contract owner credential.
    pub fn credential(&self) -> PaymentCredential { self.credential }

    /// The wallet's receiving address on the ledger gateway.
    pub fn address(&self) -> String { self.credential.to_string() }

    pub(crate) fn witness(&self, body_bytes: &[u8]) -> TxWitness {
        let signature = self.signing_key.sign(body_bytes);
        TxWitness {
            vkey: hex::encode(self.signing_key.verifying_key().as_bytes()),
            signature: hex::encode(signature.to_bytes()),
        }
    }

    /// Checks every witness of a signed transaction against its canonical
    /// body bytes. Test and audit helper; the ledger performs the
    /// authoritative check.
    pub fn verify_witness(&self, tx: &SignedTx) -> bool {
        let Ok(body) = tx.body_bytes() else { return false };
        tx.witnesses.iter().all(|w| {
            let Ok(vkey) = hex::decode(&w.vkey) else { return false };
            let Ok(vkey) = <[u8; 32]>::try_from(vkey.as_slice()) else { return false };
            let Ok(vkey) = VerifyingKey::from_bytes(&vkey) else { return false };
            let Ok(sig) = hex::decode(&w.signature) else { return false };
            let Ok(sig) = Signature::from_slice(&sig) else { return false };
            vkey.verify(&body, &sig).is_ok()
        })
    }
}

/// On-disk seed storage, one JSON record per named wallet under a dedicated
/// directory. Creation takes a per-name advisory lock so two concurrent
/// invocations cannot both claim the same name.
pub struct WalletStore {
    dir: PathBuf,
}

impl WalletStore {
    pub fn at(dir: impl AsRef<Path>) -> Result<Self, WalletError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(WalletStore { dir })
    }

    fn record_path(&self, name: &str) -> PathBuf { self.dir.join(format!("{name}.json")) }

    fn check_name(name: &str) -> Result<(), WalletError> {
        if name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\', '\0'])
        {
            return Err(WalletError::InvalidName(name.to_owned()));
        }
        Ok(())
    }

    fn lock(&self, name: &str) -> Result<fd_lock::RwLock<File>, WalletError> {
        let lock_path = self.dir.join(format!(".{name}.lock"));
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(lock_path)?;
        Ok(fd_lock::RwLock::new(file))
    }

    /// Generates a fresh 24-word seed phrase and persists it under `name`.
    pub fn create(&self, name: &str) -> Result<Wallet, WalletError> {
        Self::check_name(name)?;
        let mut lock = self.lock(name)?;
        let _guard = lock.write()?;

        let path = self.record_path(name);
        if path.exists() {
            return Err(WalletError::AlreadyExists(name.to_owned()));
        }

        let mnemonic = Mnemonic::new(MnemonicType::Words24, Language::English);
        let record = WalletRecord { seed: mnemonic.phrase().to_owned() };
        let json = serde_json::to_vec_pretty(&record)
            .map_err(|e| WalletError::Corrupt(e.to_string()))?;
        fs::write(&path, json)?;
        debug!("created wallet '{name}' at {}", path.display());

        Wallet::from_seed(name.to_owned(), record.seed)
    }

    pub fn load(&self, name: &str) -> Result<Wallet, WalletError> {
        Self::check_name(name)?;
        let path = self.record_path(name);
        if !path.exists() {
            return Err(WalletError::NotFound(name.to_owned()));
        }
        let data = fs::read_to_string(&path)?;
        let record: WalletRecord =
            serde_json::from_str(&data).map_err(|e| WalletError::Corrupt(e.to_string()))?;
        Wallet::from_seed(name.to_owned(), record.seed)
    }

    pub fn list(&self) -> Result<Vec<String>, WalletError> {
        let mut names = Vec::new();
        for entry in self.dir.read_dir()? {
            let path = entry?.path();
            if path.extension() == Some("json".as_ref()) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_owned());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
