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

//! File-backed mirror of deployed contracts.
//!
//! One directory per script address holding two independent records: the
//! immutable parameterized script (`param_script.json`) and the latest
//! confirmed state (`state.json`). The mirror is written strictly after,
//! and only upon, ledger acceptance of a transaction; a failed submission
//! leaves it at the last confirmed state.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::contract::ParamScript;
use crate::{ContractState, DeployedContract, ScriptAddr, StoreError};

pub struct ContractStore {
    root: PathBuf,
}

impl ContractStore {
    const FILENAME_SCRIPT: &'static str = "param_script.json";
    const FILENAME_STATE: &'static str = "state.json";
    const FILENAME_LOCK: &'static str = ".lock";

    pub fn at(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)?;
        Ok(ContractStore { root })
    }

    pub fn contract_dir(&self, address: ScriptAddr) -> PathBuf {
        self.root.join(address.to_string())
    }

    fn lock(&self, dir: &Path) -> Result<fd_lock::RwLock<File>, StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(dir.join(Self::FILENAME_LOCK))?;
        Ok(fd_lock::RwLock::new(file))
    }

    fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(value)
            .map_err(|e| StoreError::Corrupt(path.display().to_string(), e.to_string()))?;
        fs::write(path, json)?;
        Ok(())
    }

    fn read_json<T: for<'de> serde::Deserialize<'de>>(path: &Path) -> Result<T, StoreError> {
        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|e| StoreError::Corrupt(path.display().to_string(), e.to_string()))
    }

    /// Persists a freshly deployed contract. Idempotent: a repeated save
    /// with identical arguments leaves the records byte-identical.
    ///
    /// The script record is immutable after its first write; the state
    /// record is overwritten each time.
    pub fn save(
        &self,
        address: ScriptAddr,
        script: &ParamScript,
        state: &ContractState,
    ) -> Result<(), StoreError> {
        let dir = self.contract_dir(address);
        fs::create_dir_all(&dir)?;
        let mut lock = self.lock(&dir)?;
        let _guard = lock.write()?;

        let script_path = dir.join(Self::FILENAME_SCRIPT);
        if !script_path.exists() {
            Self::write_json(&script_path, script)?;
        }
        Self::write_json(&dir.join(Self::FILENAME_STATE), state)?;
        debug!("contract mirror saved at {}", dir.display());
        Ok(())
    }

    /// Loads the mirror of the contract at `address`; fails with
    /// [`StoreError::NotFound`] when either record is missing.
    pub fn load(&self, address: ScriptAddr) -> Result<DeployedContract, StoreError> {
        let dir = self.contract_dir(address);
        let script_path = dir.join(Self::FILENAME_SCRIPT);
        let state_path = dir.join(Self::FILENAME_STATE);
        if !script_path.exists() || !state_path.exists() {
            return Err(StoreError::NotFound(address.to_string()));
        }
        Ok(DeployedContract {
            script: Self::read_json(&script_path)?,
            state: Self::read_json(&state_path)?,
        })
    }

    /// Overwrites the state record of an already-mirrored contract.
    ///
    /// Callers invoke this strictly after the ledger accepted the state
    /// transition; on any earlier failure the previous record stays intact.
    pub fn update_state(
        &self,
        address: ScriptAddr,
        state: &ContractState,
    ) -> Result<(), StoreError> {
        let dir = self.contract_dir(address);
        if !dir.join(Self::FILENAME_SCRIPT).exists() {
            return Err(StoreError::NotFound(address.to_string()));
        }
        let mut lock = self.lock(&dir)?;
        let _guard = lock.write()?;
        Self::write_json(&dir.join(Self::FILENAME_STATE), state)
    }
}
