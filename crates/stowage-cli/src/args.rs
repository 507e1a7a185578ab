use clap::{Parser, Subcommand, ValueEnum};
use stowage_cache::CleanMode;

#[derive(Parser, Debug)]
#[command(name = "stowage-cli")]
#[command(about = "Stowage CLI - Inspect and invalidate extension caches", long_about = None)]
pub struct Cli {
    /// Extension namespace; also the default cache group
    #[arg(short = 'n', long, global = true, default_value = "stowage")]
    pub namespace: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the cache settings read from the environment
    Status,
    /// Print the cache key for a type, identifier and parameters
    Key {
        /// Cache type tag (item, list, ...)
        cache_type: String,

        /// Entity identifier
        #[arg(short = 'i', long)]
        id: Option<String>,

        /// Parameter as name=value; values are parsed as JSON when possible
        #[arg(short = 'p', long = "param")]
        params: Vec<String>,
    },
    /// Print the lifetime of a cache type in minutes
    Lifetime {
        /// Cache type tag
        cache_type: String,
    },
    /// Remove one cache entry
    Remove {
        /// Full cache key
        key: String,

        /// Group holding the entry (defaults to `{namespace}.{type}` of the key)
        #[arg(short = 'g', long)]
        group: Option<String>,
    },
    /// Remove every entry in a group, or in all groups sharing a prefix
    Clean {
        /// Group or group prefix (defaults to every group of the namespace)
        #[arg(short = 'g', long)]
        group: Option<String>,

        /// How `--group` is matched
        #[arg(short = 'm', long, value_enum, default_value_t = ModeArg::Group)]
        mode: ModeArg,

        /// Skip the confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Exact group name
    Group,
    /// Every group starting with the given name
    Prefix,
}

impl From<ModeArg> for CleanMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Group => CleanMode::Group,
            ModeArg::Prefix => CleanMode::Prefix,
        }
    }
}
