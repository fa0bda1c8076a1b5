// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod accounts;
pub mod alerts;
pub mod bills;
pub mod budgets;
pub mod categorize;
pub mod debts;
pub mod exporter;
pub mod goals;
pub mod investments;
pub mod recurring;
pub mod reports;
pub mod transactions;

use anyhow::{Result, anyhow};

/// A string argument clap was told is required.
pub fn arg<'a>(m: &'a clap::ArgMatches, name: &str) -> Result<&'a String> {
    m.get_one::<String>(name)
        .ok_or_else(|| anyhow!("missing required argument --{}", name))
}
