use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nyspma_core::config::ConfigFile;
use oauth_client::{Client, Error, OAuth2Cfg};
use serde_derive::Deserialize;
use std::path::PathBuf;

/// CLI tool to check NYSPMA OAuth settings against the identity provider
#[derive(Parser, Debug)]
#[command(
    name = "profile-check",
    about = "Check NYSPMA OAuth settings against the association database"
)]
struct Args {
    /// Path to a TOML config file with an [oauth] table
    #[arg(short, long, help = "Path to the OAuth config file")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, help = "Enable verbose logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the url users are redirected to for sign in
    AuthorizeUrl {
        #[arg(short, long)]
        state: Option<String>,
    },
    /// Fetch and normalize the profile behind an access token
    Profile {
        #[arg(short, long)]
        access_token: String,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    oauth: OAuth2Cfg,
}

impl ConfigFile for Config {
    type Error = nyspma_core::Error;
}

fn load_config(path: Option<&PathBuf>) -> Result<OAuth2Cfg> {
    let config = match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::default(),
    };
    config
        .oauth
        .with_env_overrides()
        .context("Invalid NYSPMA_BACKEND_* override")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let config = load_config(args.config.as_ref())?;
    log::debug!("Using user query url: {}", config.user_query_url());

    let client = Client::new(config).context("Failed to build OAuth client")?;

    match args.command {
        Command::AuthorizeUrl { state } => {
            println!("{}", client.authorize_url(state.as_deref()));
        }
        Command::Profile { access_token } => match client.user(&access_token).await {
            Ok(user) => {
                let output = serde_json::json!({
                    "uid": user.id,
                    "details": user.details,
                    "extra_data": user.extra_data,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            Err(Error::ProfileNotFound) => {
                anyhow::bail!("No profile found for the given access token");
            }
            Err(e) => return Err(e).context("Profile lookup failed"),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_profile_command() {
        let args = Args::parse_from(["profile-check", "-v", "profile", "--access-token", "tok"]);
        assert!(args.verbose);
        match args.command {
            Command::Profile { access_token } => assert_eq!(access_token, "tok"),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn config_reads_oauth_table() {
        let config = Config::from_raw(
            r#"
            [oauth]
            environment = "staging"
            client_id = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.oauth.client_id, "abc");
        assert_eq!(
            config.oauth.base_url(),
            "https://staging.associationdatabase.com"
        );
    }
}
