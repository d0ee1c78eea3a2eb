use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::{LevelFilter, info, warn};
use serde_json::{Map, Value};

use promptgate::client::{PromptHubClient, PromptQuery};
use promptgate::config::Config;
use promptgate::gateway::{self, GatewayState};

mod cli;

use cli::Cli;
use cli::commands::Commands;

/// Initialise env_logger before anything logs.
///
/// Returns true when `RUST_LOG` or `--verbose` fixed the level, so the
/// config file must not override it.
fn setup_logging(verbose: bool) -> bool {
    if std::env::var_os("RUST_LOG").is_some() {
        env_logger::Builder::from_default_env().init();
        return true;
    }
    // env_logger passes every record; the global max level does the filtering
    env_logger::Builder::new().filter_level(LevelFilter::Trace).init();
    log::set_max_level(if verbose { LevelFilter::Debug } else { LevelFilter::Info });
    verbose
}

/// Level from `log_level` in the config, unless the level is already fixed
fn config_log_level(level_fixed: bool, config: &Config) -> Option<LevelFilter> {
    if level_fixed {
        return None;
    }
    let raw = config.log_level.as_deref()?;
    match raw.parse() {
        Ok(level) => Some(level),
        Err(_) => {
            warn!("Ignoring invalid log_level '{}'", raw);
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let level_fixed = setup_logging(cli.is_verbose());

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(level) = config_log_level(level_fixed, &config) {
        log::set_max_level(level);
    }
    info!("Starting {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Serve { bind, catalog } => run_server(config, bind.clone(), catalog.clone()).await,
        Commands::GetPrompt {
            url,
            api_key,
            name,
            id,
            prompt_version,
            compile,
            vars,
            meta,
        } => {
            let mut query = match (name, id) {
                (Some(name), _) => PromptQuery::by_name(name),
                (None, Some(id)) => PromptQuery::by_id(id),
                (None, None) => return Err(eyre!("Provide --name or --id")),
            };
            if let Some(version) = prompt_version {
                query = query.version(version);
            }
            if *compile {
                query = query.compile();
            }
            for (key, raw) in vars {
                query = query.variable(key, parse_variable(raw));
            }
            if let Some(meta) = meta {
                let meta: Map<String, Value> =
                    serde_json::from_str(meta).context("--meta must be a JSON object")?;
                query = query.meta_properties(Value::Object(meta));
            }
            run_get_prompt(url.clone(), api_key.clone(), query).await
        }
    }
}

async fn run_server(
    mut config: Config,
    bind: Option<String>,
    catalog: Option<std::path::PathBuf>,
) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind_addr = bind;
    }
    if let Some(catalog) = catalog {
        config.compiler.catalog_path = Some(catalog);
    }
    config.validate().context("Invalid configuration")?;

    let state = GatewayState::from_config(&config).context("Failed to build gateway")?;
    println!(
        "{} listening on {}",
        "promptgate".green().bold(),
        config.server.bind_addr.cyan()
    );
    gateway::serve(&config, state).await.context("Gateway server failed")?;
    Ok(())
}

async fn run_get_prompt(url: Option<String>, api_key: Option<String>, query: PromptQuery) -> Result<()> {
    let client = PromptHubClient::from_env(url, api_key)?;
    info!("Fetching prompt from {}", client.endpoint());

    let result = client.get_prompt(&query).await?;
    match (&result.err, &result.res) {
        (Some(err), _) if result.is_failure() => {
            println!("{} {}", "Error:".red().bold(), err);
        }
        (_, Some(res)) => {
            println!("{}", serde_json::to_string_pretty(res)?);
        }
        _ => {
            println!("{}", "No prompt returned".yellow());
        }
    }
    Ok(())
}

/// Interpret a CLI variable as JSON, falling back to a plain string
fn parse_variable(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_level(level: Option<&str>) -> Config {
        Config {
            log_level: level.map(str::to_string),
            ..Config::default()
        }
    }

    #[test]
    fn test_config_log_level_applies_when_not_fixed() {
        assert_eq!(
            config_log_level(false, &config_with_level(Some("debug"))),
            Some(LevelFilter::Debug)
        );
        assert_eq!(config_log_level(false, &config_with_level(Some("WARN"))), Some(LevelFilter::Warn));
    }

    #[test]
    fn test_config_log_level_yields_to_env_and_verbose() {
        assert_eq!(config_log_level(true, &config_with_level(Some("error"))), None);
    }

    #[test]
    fn test_config_log_level_ignores_missing_or_invalid() {
        assert_eq!(config_log_level(false, &config_with_level(None)), None);
        assert_eq!(config_log_level(false, &config_with_level(Some("loud"))), None);
    }
}
