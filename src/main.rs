//! Delegate Book - command line entry point
//!
//! Operates on the durable book named by the config's `state_path`, acting as
//! the configured owner.
//!
//! Usage:
//!   delegate-book --config delegate.toml create-rule <SENDER_TOKEN> <SIGNER_TOKEN> <SENDER_AMOUNT> <SIGNER_AMOUNT>
//!   delegate-book --config delegate.toml levels <SENDER_TOKEN> <SIGNER_TOKEN>

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use delegate_book::config::DelegateConfig;
use delegate_book::delegate::Delegate;
use delegate_book::logging::init_logging;
use delegate_book::types::{Address, RuleId};
use delegate_book::Result;

#[derive(Parser)]
#[command(name = "delegate-book")]
#[command(about = "Manage and quote a delegate's standing price rules")]
struct Cli {
    /// Path to the TOML configuration
    #[arg(short, long, default_value = "delegate.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Post a rule: give SENDER_AMOUNT of SENDER_TOKEN for SIGNER_AMOUNT of SIGNER_TOKEN
    CreateRule {
        sender_token: Address,
        signer_token: Address,
        sender_amount: u64,
        signer_amount: u64,
    },
    /// Withdraw an active rule
    DeleteRule { rule_id: RuleId },
    /// List a pair's rules, best rate first
    Levels {
        sender_token: Address,
        signer_token: Address,
    },
    /// Signer amount required for SENDER_AMOUNT
    QuoteSigner {
        sender_amount: u64,
        sender_token: Address,
        signer_token: Address,
    },
    /// Sender amount given for SIGNER_AMOUNT
    QuoteSender {
        signer_amount: u64,
        signer_token: Address,
        sender_token: Address,
    },
    /// SHA-256 of the encoded book
    StateRoot,
}

fn run(cli: Cli) -> Result<()> {
    let config = DelegateConfig::load(&cli.config)?;
    init_logging(&config.log);

    let owner = config.owner;
    let delegate = Delegate::open(config)?;

    match cli.command {
        Command::CreateRule {
            sender_token,
            signer_token,
            sender_amount,
            signer_amount,
        } => {
            let id =
                delegate.create_rule(owner, sender_token, signer_token, sender_amount, signer_amount)?;
            println!("created rule {id}");
        }
        Command::DeleteRule { rule_id } => {
            delegate.delete_rule(owner, rule_id)?;
            println!("deleted rule {rule_id}");
        }
        Command::Levels {
            sender_token,
            signer_token,
        } => {
            println!("{:>8} {:>20} {:>20} {:>16}", "rule", "sender", "signer", "price");
            for level in delegate.get_levels(sender_token, signer_token) {
                let price = level.price().map(|p| p.to_string()).unwrap_or_default();
                println!(
                    "{:>8} {:>20} {:>20} {:>16}",
                    level.rule_id, level.sender_amount, level.signer_amount, price
                );
            }
        }
        Command::QuoteSigner {
            sender_amount,
            sender_token,
            signer_token,
        } => {
            println!(
                "{}",
                delegate.get_signer_side_quote(sender_amount, sender_token, signer_token)
            );
        }
        Command::QuoteSender {
            signer_amount,
            signer_token,
            sender_token,
        } => {
            println!(
                "{}",
                delegate.get_sender_side_quote(signer_amount, signer_token, sender_token)
            );
        }
        Command::StateRoot => {
            println!("0x{}", delegate.state_root_hex()?);
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, category = ?err.category(), "command failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
