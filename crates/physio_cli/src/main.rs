//! Smoke-check CLI for `physio_core`.
//!
//! # Usage
//! - `physio_cli` prints ping and version.
//! - `physio_cli cpf <value>` checks and masks a CPF.
//! - `physio_cli email <value>` checks an email address.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[clap(author, version, about = "physio_core smoke check", long_about = None)]
struct CliArgs {
    #[clap(subcommand)]
    command: Option<ProbeCommand>,
}

#[derive(Subcommand, Debug, PartialEq, Eq, Clone)]
enum ProbeCommand {
    /// Check the CPF check digits and print the masked value
    Cpf { value: String },
    /// Check email syntax
    Email { value: String },
}

fn main() -> ExitCode {
    run(CliArgs::parse())
}

fn run(args: CliArgs) -> ExitCode {
    match args.command {
        None => {
            println!("physio_core ping={}", physio_core::ping());
            println!("physio_core version={}", physio_core::core_version());
            ExitCode::SUCCESS
        }
        Some(ProbeCommand::Cpf { value }) => {
            let valid = physio_core::is_valid_cpf(&value);
            println!("cpf={} valid={valid}", physio_core::format_cpf(&value));
            exit_for(valid)
        }
        Some(ProbeCommand::Email { value }) => {
            let valid = physio_core::is_valid_email(&value);
            println!("email valid={valid}");
            exit_for(valid)
        }
    }
}

fn exit_for(valid: bool) -> ExitCode {
    if valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
