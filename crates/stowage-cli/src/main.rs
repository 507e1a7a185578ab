use clap::Parser;
use dialoguer::Confirm;
use dotenvy::dotenv;
use stowage_cache::CleanMode;
use stowage_cli::{Cli, Commands, commands};
use stowage_config::CacheSettings;
use stowage_observability::init_basic_console_logging;
use tracing::info;

fn main() {
    dotenv().ok();
    init_basic_console_logging();

    let cli = Cli::parse();
    let settings = CacheSettings::from_env();

    if let Err(e) = run(cli, &settings) {
        eprintln!("❌ {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli, settings: &CacheSettings) -> anyhow::Result<()> {
    match cli.command {
        Commands::Status => {
            handle_status(settings);
            Ok(())
        }
        Commands::Key {
            cache_type,
            id,
            params,
        } => {
            let key = commands::build_key(
                settings,
                &cli.namespace,
                &cache_type,
                id.as_deref(),
                &params,
            )?;
            println!("{key}");
            Ok(())
        }
        Commands::Lifetime { cache_type } => {
            let minutes = commands::lifetime(settings, &cache_type);
            println!("{cache_type}: {minutes} min");
            Ok(())
        }
        Commands::Remove { key, group } => {
            handle_remove(settings, &cli.namespace, &key, group.as_deref())
        }
        Commands::Clean { group, mode, yes } => {
            handle_clean(settings, &cli.namespace, group.as_deref(), mode.into(), yes)
        }
    }
}

fn handle_status(settings: &CacheSettings) {
    println!("📦 Stowage cache settings");
    for (name, value) in commands::status(settings) {
        println!("  {name:<12} {value}");
    }
}

fn handle_remove(
    settings: &CacheSettings,
    namespace: &str,
    key: &str,
    group: Option<&str>,
) -> anyhow::Result<()> {
    if commands::remove(settings, namespace, key, group)? {
        println!("✅ Removed {key}");
    } else {
        println!("⚠️  Nothing removed for {key}");
    }
    Ok(())
}

fn handle_clean(
    settings: &CacheSettings,
    namespace: &str,
    group: Option<&str>,
    mode: CleanMode,
    yes: bool,
) -> anyhow::Result<()> {
    let (scope, mode) = match group {
        Some(group) => (group.to_string(), mode),
        None => (format!("{namespace}."), CleanMode::Prefix),
    };

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Clean all cache entries in '{scope}' ({mode} mode)?"))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Aborted.");
            return Ok(());
        }
    }

    info!(cache.group = %scope, cache.mode = %mode, "Cleaning cache");

    if commands::clean(settings, namespace, Some(&scope), mode) {
        println!("✅ Cleaned '{scope}'");
        Ok(())
    } else {
        anyhow::bail!("Failed to clean '{scope}'")
    }
}
