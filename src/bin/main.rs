// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use solid_ledger::{Bank, JournalEntry, LedgerError};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Solid Ledger - Replay bank command scripts
///
/// Reads account commands from a CSV file and writes the resulting account
/// states (or the transaction journal) to stdout.
#[derive(Parser, Debug)]
#[command(name = "solid-ledger")]
#[command(about = "Replays a CSV script of bank account commands", long_about = None)]
struct Args {
    /// Path to CSV file with commands
    ///
    /// Expected format: type,account,target,amount,actor
    /// Example: cargo run -- commands.csv > accounts.csv
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Write the transaction journal instead of the account summary
    #[arg(long)]
    journal: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let file = match File::open(&args.input) {
        Ok(f) => f,
        Err(e) => {
            tracing::error!("Error opening file '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let bank = match process_commands(BufReader::new(file)) {
        Ok(bank) => bank,
        Err(e) => {
            tracing::error!("Error processing commands: {}", e);
            process::exit(1);
        }
    };

    let written = if args.journal {
        write_journal(&bank, std::io::stdout())
    } else {
        write_accounts(&bank, std::io::stdout())
    };
    if let Err(e) = written {
        tracing::error!("Error writing output: {}", e);
        process::exit(1);
    }
}

/// Raw CSV record matching the input format.
///
/// Fields: `type, account, target, amount, actor`
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(rename = "type")]
    command: String,
    account: String,
    target: Option<String>,
    #[serde(deserialize_with = "csv::invalid_option")]
    amount: Option<Decimal>,
    actor: Option<String>,
}

/// One bank operation decoded from a script row.
#[derive(Debug, Clone, PartialEq)]
enum Command {
    OpenIndividual {
        account: String,
    },
    OpenJoint {
        account: String,
        owners: Vec<String>,
    },
    Deposit {
        account: String,
        amount: Decimal,
    },
    Withdraw {
        account: String,
        amount: Decimal,
        actor: Option<String>,
    },
    Transfer {
        account: String,
        target: String,
        amount: Decimal,
        actor: Option<String>,
    },
}

impl CsvRecord {
    /// Converts CSV record to a command.
    ///
    /// Returns `None` for unknown commands or missing required fields.
    fn into_command(self) -> Option<Command> {
        let account = self.account;
        let actor = self.actor.filter(|actor| !actor.is_empty());

        match self.command.to_lowercase().as_str() {
            "individual" => Some(Command::OpenIndividual { account }),
            "joint" => {
                let owners = actor?
                    .split('|')
                    .map(|owner| owner.trim().to_owned())
                    .collect();
                Some(Command::OpenJoint { account, owners })
            }
            "deposit" => Some(Command::Deposit {
                account,
                amount: self.amount?,
            }),
            "withdraw" | "withdrawal" => Some(Command::Withdraw {
                account,
                amount: self.amount?,
                actor,
            }),
            "transfer" => Some(Command::Transfer {
                account,
                target: self.target.filter(|target| !target.is_empty())?,
                amount: self.amount?,
                actor,
            }),
            _ => None,
        }
    }
}

fn apply(bank: &Bank, command: Command) -> Result<(), LedgerError> {
    match command {
        Command::OpenIndividual { account } => {
            bank.open_individual(&account)?;
        }
        Command::OpenJoint { account, owners } => {
            bank.open_joint(&account, owners)?;
        }
        Command::Deposit { account, amount } => {
            bank.deposit(&account, amount)?;
        }
        Command::Withdraw {
            account,
            amount,
            actor,
        } => {
            bank.withdraw(&account, amount, actor.as_deref())?;
        }
        Command::Transfer {
            account,
            target,
            amount,
            actor,
        } => {
            bank.transfer(&account, &target, amount, actor.as_deref())?;
        }
    }
    Ok(())
}

/// Replays commands from a CSV reader.
///
/// Rows are streamed, so scripts of any length are processed without loading
/// the whole file. Malformed rows and rejected commands are logged and
/// skipped.
///
/// # CSV Format
///
/// ```csv
/// type,account,target,amount,actor
/// individual,1238764590,,,
/// joint,1111008887,,,Annet|Bob
/// deposit,1111008887,,20000,
/// withdraw,1111008887,,15000,Annet
/// transfer,1111008887,1238764590,2000,Bob
/// ```
///
/// # Errors
///
/// Returns a CSV error if the reader fails.
pub fn process_commands<R: Read>(reader: R) -> Result<Bank, csv::Error> {
    let bank = Bank::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);

    for (row, result) in rdr.deserialize::<CsvRecord>().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(row, "Skipping malformed row: {}", e);
                continue;
            }
        };

        let Some(command) = record.into_command() else {
            tracing::warn!(row, "Skipping invalid command");
            continue;
        };

        if let Err(e) = apply(&bank, command) {
            tracing::warn!(row, "Skipping rejected command: {}", e);
        }
    }

    Ok(bank)
}

/// Writes one row per account, sorted by account number.
///
/// # CSV Format
///
/// ```csv
/// account,type,balance,transactions
/// 1111008887,joint,3000,4
/// 1238764590,individual,2000,1
/// ```
pub fn write_accounts<W: Write>(bank: &Bank, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for account in bank.accounts() {
        wtr.serialize(&*account)?;
    }

    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct JournalRow {
    sequence: u64,
    account: String,
    kind: String,
    amount: Decimal,
    timestamp: String,
    from: Option<String>,
    to: Option<String>,
}

impl From<JournalEntry> for JournalRow {
    fn from(entry: JournalEntry) -> Self {
        let tx = entry.transaction;
        Self {
            sequence: entry.sequence,
            account: tx.account().to_string(),
            kind: tx.kind().to_string(),
            amount: tx.amount(),
            timestamp: tx.timestamp().to_rfc3339(),
            from: tx.from().map(ToString::to_string),
            to: tx.to().map(ToString::to_string),
        }
    }
}

/// Drains the bank journal into CSV, in append order.
pub fn write_journal<W: Write>(bank: &Bank, writer: W) -> Result<(), csv::Error> {
    let mut wtr = Writer::from_writer(writer);

    for entry in bank.journal().drain() {
        wtr.serialize(JournalRow::from(entry))?;
    }

    wtr.flush()?;
    Ok(())
}
