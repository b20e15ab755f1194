use asset_transfer::{AssetService, JsonStore, Function, host};

use std::path::PathBuf;
use anyhow::Context;
use colored::Colorize;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, propagate_version = true)]
struct Cli {
    /// Path to the world state file to operate on
    #[arg(short, long, default_value = "state.json")]
    state: PathBuf,

    /// Action to perform
    #[command(subcommand)]
    action: Subcommands,
}

#[derive(Debug, Subcommand)]
enum Subcommands {
    /// Write the ten seed assets
    Init,
    /// Store a JSON asset under its ID
    Create {
        /// JSON object with a non-empty "ID" field
        payload: String
    },
    /// Print the stored asset
    Read { id: String },
    /// Replace an asset with new appraisal fields
    Update(Update),
    /// Remove an asset
    Delete { id: String },
    /// Check whether an asset exists
    Exists { id: String },
    /// Give an asset a new owner
    Transfer {
        id: String,
        new_owner: String
    },
    /// List every stored asset
    List {
        /// Print the raw JSON array instead of one line per asset
        #[arg(long)]
        json: bool
    },
    /// Call a function by name with positional string arguments
    Invoke {
        function: String,
        args: Vec<String>
    }
}

#[derive(Args, Debug)]
struct Update {
    id: String,

    #[arg(short = 'c', long)]
    color: String,

    #[arg(short = 's', long)]
    size: String,

    #[arg(short = 'o', long)]
    owner: String,

    #[arg(short = 'v', long)]
    appraised_value: String
}

impl Subcommands {
    fn into_call(self) -> anyhow::Result<(Function, Vec<String>)> {
        let call = match self {
            Self::Init => (Function::InitLedger, vec![]),
            Self::Create { payload } => (Function::CreateAsset, vec![payload]),
            Self::Read { id } => (Function::ReadAsset, vec![id]),
            Self::Update(update) => (Function::UpdateAsset, vec![
                update.id, update.color, update.size, update.owner, update.appraised_value
            ]),
            Self::Delete { id } => (Function::DeleteAsset, vec![id]),
            Self::Exists { id } => (Function::AssetExists, vec![id]),
            Self::Transfer { id, new_owner } => (Function::TransferAsset, vec![id, new_owner]),
            Self::List { .. } => (Function::GetAllAssets, vec![]),
            Self::Invoke { function, args } => (function.parse::<Function>()?, args)
        };
        Ok(call)
    }
}

fn print_assets(payload: &[u8]) -> anyhow::Result<()> {
    let entries: Vec<serde_json::Value> = serde_json::from_slice(payload)
        .with_context(|| "failed to parse asset listing")?;
    for entry in entries {
        let key = entry["Key"].as_str().unwrap_or_default();
        println!("{}: {}", key.bold(), entry["Record"]);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Cli::parse();

    let as_listing = matches!(args.action, Subcommands::List { json: false });
    let (function, call_args) = args.action.into_call()?;

    let store = JsonStore::new(&args.state);
    let mut state = store.read()
        .with_context(|| format!("failed to load {}", args.state.display()))?;

    let tx_id = format!("cli-{}", std::process::id());
    let outcome = host::invoke_and_persist(&AssetService::new(), &mut state, &tx_id, function, &call_args,
            |staged| store.save(staged))
        .with_context(|| format!("{} failed", function))?;

    if as_listing {
        print_assets(&outcome.payload)?;
    } else if !outcome.payload.is_empty() {
        println!("{}", String::from_utf8_lossy(&outcome.payload));
    } else {
        println!("{} {}", function, "ok".green());
    }
    Ok(())
}
