// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `gk inspect` - Print lock records rebuilt from a WAL

use crate::output::{self, OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use gk_core::LockRecord;
use gk_storage::LockTable;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

#[derive(Args)]
pub struct InspectArgs {
    /// WAL file written by `gk simulate --wal`
    #[arg(long)]
    pub wal: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

/// Lock records as a printable table
#[derive(Serialize)]
#[serde(transparent)]
pub struct RecordList(pub Vec<LockRecord>);

impl fmt::Display for RecordList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No lock records");
        }
        writeln!(f, "{:<24} {:<6} HOLDERS", "LOCK", "COUNT")?;
        for record in &self.0 {
            let holders: Vec<&str> = record.holders().collect();
            let holders = if holders.is_empty() {
                "-".to_string()
            } else {
                holders.join(",")
            };
            writeln!(
                f,
                "{:<24} {:<6} {}",
                record.lock_name, record.current_count, holders
            )?;
        }
        Ok(())
    }
}

pub fn inspect(args: InspectArgs) -> Result<()> {
    if !args.wal.exists() {
        anyhow::bail!("WAL not found: {}", args.wal.display());
    }
    let table = LockTable::replay(&args.wal)
        .with_context(|| format!("replaying {}", args.wal.display()))?;
    let records = RecordList(table.records().cloned().collect());
    output::print(&records, args.output)
}
