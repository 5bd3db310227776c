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

use std::path::PathBuf;

use clap::{Parser, ValueHint};
use log::LevelFilter;

use crate::Cmd;

pub const STATEM_DATA_DIR_ENV: &str = "STATEMATRIX_DATA_DIR";
pub const STATEM_SCRIPT_ENV: &str = "STATEMATRIX_SCRIPT";

#[cfg(any(target_os = "linux", target_os = "freebsd", target_os = "openbsd", target_os = "netbsd"))]
pub const STATEM_DATA_DIR: &str = "~/.statematrix";
#[cfg(target_os = "macos")]
pub const STATEM_DATA_DIR: &str = "~/Library/Application Support/StateMatrix";
#[cfg(target_os = "windows")]
pub const STATEM_DATA_DIR: &str = "~\\AppData\\Local\\StateMatrix";

/// Command-line arguments
#[derive(Parser, Clone, Eq, PartialEq, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Set verbosity level; can be used multiple times to increase verbosity
    #[clap(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Location of the data directory
    #[clap(
        short,
        long,
        global = true,
        default_value = STATEM_DATA_DIR,
        env = STATEM_DATA_DIR_ENV,
        value_hint = ValueHint::DirPath
    )]
    pub data_dir: PathBuf,

    /// Path to the compiled contract artifact
    #[clap(
        long,
        global = true,
        default_value = "contract/statematrix.json",
        env = STATEM_SCRIPT_ENV,
        value_hint = ValueHint::FilePath
    )]
    pub script: PathBuf,

    /// Command to execute
    #[clap(subcommand)]
    pub command: Cmd,
}

impl Args {
    pub fn process(&mut self) {
        self.data_dir =
            PathBuf::from(shellexpand::tilde(&self.data_dir.display().to_string()).to_string());
    }

    pub fn init_logger(&self) {
        let level = match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        env_logger::Builder::from_default_env()
            .filter_level(level)
            .init();
    }
}

#[cfg(test)]
mod test {
    use clap::CommandFactory;
    use statematrix::ScriptAddr;

    use super::*;

    // catches duplicate flag names across global args and subcommands,
    // which clap only asserts at parse time
    #[test]
    fn command_line_is_consistent() { Args::command().debug_assert() }

    #[test]
    fn datum_flag_coexists_with_global_data_dir() {
        let address = ScriptAddr::from([0xAD; 32]).to_string();
        let args = Args::try_parse_from([
            "statem", "decrement", "--wallet", "w", "--address", &address, "--datum",
            "state.json", "-d", "/tmp/statem",
        ])
        .unwrap();
        assert_eq!(args.data_dir, PathBuf::from("/tmp/statem"));
        let Cmd::Decrement { datum, .. } = args.command else { panic!("wrong subcommand") };
        assert_eq!(datum, PathBuf::from("state.json"));
    }
}
