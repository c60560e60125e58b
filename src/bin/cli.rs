use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use tracing_subscriber::prelude::*;
use tracing_log::LogTracer;
use tracing::subscriber as tracing_subscriber_global;
use anyhow::{Result, Context};
use spotify_pkce_login as lib;
use lib::api::mock::MockPrompt;
use lib::api::pkce::{code_challenge_s256, PkcePair};
use lib::api::spotify_auth::{build_auth_request, ManualPrompt};
use lib::config::Config;
use lib::flow::LoginFlow;
use lib::session::SessionState;

#[derive(Parser)]
#[command(name = "spotify-pkce-login", version)]
struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with Spotify and show the welcome screen
    Login {
        /// Skip the browser and pretend the provider returned this code
        #[arg(long, value_name = "CODE")]
        mock_code: Option<String>,
    },
    /// Print a fresh authorization URL and the verifier paired with it
    AuthorizeUrl,
    /// Print the S256 challenge for a verifier
    Challenge {
        verifier: String,
    },
    /// Validate config file and exit
    ConfigValidate,
}

fn resolve_config(explicit: Option<&PathBuf>) -> Result<Config> {
    // Explicit --config wins; otherwise use the per-user config file when
    // present and fall back to built-in defaults.
    let path = match explicit {
        Some(p) => Some(p.clone()),
        None => dirs::config_dir()
            .map(|d| d.join("spotify-pkce-login").join("config.toml"))
            .filter(|p| p.exists()),
    };
    let cfg = match path {
        Some(p) => Config::from_path(&p)
            .with_context(|| format!("loading config from {}", p.display()))?,
        None => Config::default(),
    };
    Ok(cfg.apply_env_overrides())
}

fn init_logging(cfg: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let _ = LogTracer::init();

    // Honor RUST_LOG if set, otherwise default to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match &cfg.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "spotify-pkce-login.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            (Some(fmt::layer().with_ansi(false).with_writer(non_blocking)), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer);

    // LogTracer already bridges `log` records, so install the subscriber directly.
    if let Err(e) = tracing_subscriber_global::set_global_default(subscriber) {
        eprintln!("failed to set global tracing subscriber: {}", e);
    }
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = resolve_config(cli.config.as_ref())?;
    let _guard = init_logging(&cfg);

    match cli.command {
        Commands::Login { mock_code } => {
            cfg.validate().context("invalid config")?;
            let session = SessionState::mount()?;
            println!("{}", lib::view::render(&session));

            let session = match mock_code {
                Some(code) => LoginFlow::new(cfg, MockPrompt::approve(&code)).login(session).await?,
                None => LoginFlow::new(cfg, ManualPrompt::new()).login(session).await?,
            };
            println!("{}", lib::view::render(&session));
            if let SessionState::AuthFailed { .. } = session {
                std::process::exit(1);
            }
        }
        Commands::AuthorizeUrl => {
            cfg.validate().context("invalid config")?;
            let pkce = PkcePair::generate()?;
            let request = build_auth_request(&cfg, &pkce)?;
            println!("{}", request.url);
            println!("code_verifier: {}", pkce.verifier());
            println!("state: {}", request.state);
        }
        Commands::Challenge { verifier } => {
            println!("{}", code_challenge_s256(&verifier)?);
        }
        Commands::ConfigValidate => match cfg.validate() {
            Ok(()) => println!("OK"),
            Err(e) => {
                eprintln!("Config validation failed: {}", e);
                std::process::exit(2);
            }
        },
    }

    Ok(())
}
