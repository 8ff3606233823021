use std::{path::PathBuf, process::exit};

use clap::{Parser, Subcommand};
use cosmos_eip712::{
    eip712_hash_for_sign_doc, legacy_eip712_hash_for_sign_doc, legacy_typed_data_for_sign_doc,
    typed_data_for_sign_doc, FeeDelegationOptions, TypedData,
};

#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "Print the EIP-712 typed data derived from a cosmos amino JSON sign doc"
)]
struct Cli {
    /// Use verbose output
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct SignDocArgs {
    /// Path of the amino JSON sign doc.
    file: PathBuf,

    /// Use the legacy `Msg[]` schema.
    #[arg(long, default_value_t = false)]
    legacy: bool,

    /// Address of the account paying the fee.
    #[arg(long)]
    fee_payer: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the derived `types` object.
    Types(SignDocArgs),
    /// Print the whole typed data.
    TypedData(SignDocArgs),
    /// Print the EIP-712 sign hash.
    Hash(SignDocArgs),
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Trace
    } else {
        log::LevelFilter::Info
    };

    pretty_env_logger::formatted_timed_builder()
        .filter_level(level)
        .init();

    if let Err(err) = run(cli.command) {
        log::error!("cosmos-eip712 exit with error: {}", err);
        exit(1);
    }
}

fn typed_data(args: &SignDocArgs, sign_doc: &[u8]) -> cosmos_eip712::Result<TypedData> {
    let fee_delegation = args.fee_payer.clone().map(FeeDelegationOptions::new);

    if args.legacy {
        legacy_typed_data_for_sign_doc(sign_doc, fee_delegation.as_ref())
    } else {
        typed_data_for_sign_doc(sign_doc, fee_delegation.as_ref())
    }
}

fn run(command: Command) -> cosmos_eip712::Result<()> {
    match command {
        Command::Types(args) => {
            let sign_doc = std::fs::read(&args.file)?;

            let typed_data = typed_data(&args, &sign_doc)?;

            println!("{}", serde_json::to_string(&typed_data.types)?);
        }
        Command::TypedData(args) => {
            let sign_doc = std::fs::read(&args.file)?;

            let typed_data = typed_data(&args, &sign_doc)?;

            println!("{}", serde_json::to_string_pretty(&typed_data)?);
        }
        Command::Hash(args) => {
            let sign_doc = std::fs::read(&args.file)?;

            let fee_delegation = args.fee_payer.clone().map(FeeDelegationOptions::new);

            let hash = if args.legacy {
                legacy_eip712_hash_for_sign_doc(&sign_doc, fee_delegation.as_ref())?
            } else {
                eip712_hash_for_sign_doc(&sign_doc, fee_delegation.as_ref())?
            };

            println!("{}", hash);
        }
    }

    Ok(())
}
