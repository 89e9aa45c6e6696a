use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "datacfg",
    about = "Inspect and maintain datacfg config-asset stores",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store root directory (overrides the config file)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// TOML store configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Key scheme of the store (overrides the config file)
    #[arg(long, global = true)]
    pub scheme: Option<SchemeArg>,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SchemeArg {
    Generated,
    Composite,
}

impl From<SchemeArg> for datacfg_sdk::KeyScheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Generated => Self::Generated,
            SchemeArg::Composite => Self::Composite,
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// List stored configs
    List(ListArgs),
    /// Show one config envelope
    Show(ShowArgs),
    /// Delete a config
    Delete(DeleteArgs),
    /// Give a config a new name
    Rename(RenameArgs),
    /// Rebuild the key index from a full scan
    Reindex(ReindexArgs),
    /// Move generated-key configs to composite keys
    Migrate(MigrateArgs),
    /// Copy every indexed config into another directory
    Export(ExportArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Only list configs of this type
    #[arg(long = "type", short = 't')]
    pub type_name: Option<String>,
}

#[derive(Args)]
pub struct ShowArgs {
    pub key: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub key: String,
}

#[derive(Args)]
pub struct RenameArgs {
    pub key: String,
    pub new_name: String,
}

#[derive(Args)]
pub struct ReindexArgs {}

#[derive(Args)]
pub struct MigrateArgs {}

#[derive(Args)]
pub struct ExportArgs {
    pub dest: PathBuf,
}
