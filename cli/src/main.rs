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

#[macro_use]
extern crate log;

mod args;
mod cmd;
mod exec;

use std::process::ExitCode;

use clap::Parser;
use statematrix::RuntimeError;

pub use crate::args::Args;
pub use crate::cmd::Cmd;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run() -> Result<(), RuntimeError> {
    let mut args = Args::parse();
    args.process();
    args.init_logger();
    trace!("command-line arguments: {args:#?}");

    debug!("executing command: {}", args.command);
    args.exec()
}
