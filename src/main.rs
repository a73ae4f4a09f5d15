//! AtTask command line client
//!
//! Opens a session (reusing a persisted cookie when the service still
//! accepts it), logs in otherwise, searches tasks and prints the current
//! user.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use attask::{Client, Params, Profile, Profiles, SessionConfig, DEFAULT_PROFILE};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "attask")]
#[command(about = "Query an AtTask instance through its REST API")]
struct Args {
    /// Versioned API URL (e.g. https://acme.attask-ondemand.com/attask/api/v4.0)
    #[arg(long, env = "ATTASK_URL")]
    url: Option<String>,

    /// Login user name
    #[arg(long, env = "ATTASK_USERNAME")]
    username: Option<String>,

    /// Login password
    #[arg(long, env = "ATTASK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Windows domain prepended to the user name
    #[arg(long, env = "ATTASK_DOMAIN")]
    domain: Option<String>,

    /// Pin connections to TLS 1.0
    #[arg(long, env = "ATTASK_FORCE_LEGACY_TLS")]
    force_legacy_tls: bool,

    /// Cookie jar file (defaults to ~/.attask_cookiejar)
    #[arg(long, env = "ATTASK_COOKIE_FILE")]
    cookie_file: Option<PathBuf>,

    /// TOML profile file
    #[arg(long, env = "ATTASK_CONFIG")]
    config: Option<PathBuf>,

    /// Profile section to read from the profile file
    #[arg(long, default_value = DEFAULT_PROFILE, env = "ATTASK_PROFILE")]
    profile: String,

    /// Task search filter (repeatable)
    #[arg(long = "filter", value_name = "KEY=VALUE", value_parser = parse_key_val, default_values = ["status=INP", "wbs=2"])]
    filters: Vec<(String, String)>,

    /// Enable verbose logging
    #[arg(short, long, env = "ATTASK_VERBOSE")]
    verbose: bool,
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {}", s))?;
    if key.is_empty() {
        return Err(format!("empty key in {}", s));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Effective settings: command line over profile.
#[derive(Debug)]
struct DriverConfig {
    session: SessionConfig,
    username: Option<String>,
    password: Option<String>,
    domain: Option<String>,
}

impl DriverConfig {
    fn from_args(args: &Args) -> Result<Self> {
        let profile = match &args.config {
            Some(path) => Profiles::load(path)
                .and_then(|profiles| profiles.get(&args.profile).cloned())
                .with_context(|| format!("loading profile {} from {}", args.profile, path.display()))?,
            None => Profile::default(),
        };

        let url = args
            .url
            .clone()
            .or_else(|| profile.url.clone())
            .ok_or_else(|| anyhow!("an API url is required (--url or a profile)"))?;

        let mut session = SessionConfig::new(url)
            .with_legacy_tls(args.force_legacy_tls || profile.force_legacy_tls);
        session.login_method = profile.login_method;
        if let Some(path) = &args.cookie_file {
            session.transport.cookie_file = Some(path.clone());
        }
        session.validate().context("invalid session configuration")?;

        Ok(Self {
            session,
            username: args.username.clone().or(profile.username),
            password: args.password.clone().or(profile.password),
            domain: args.domain.clone().or(profile.domain),
        })
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("attask={}", log_level))
        .json()
        .init();

    let config = DriverConfig::from_args(&args)?;
    info!(
        url = %config.session.url,
        login_method = %config.session.login_method,
        force_legacy_tls = config.session.transport.force_legacy_tls,
        "Configuration loaded"
    );

    let mut client = Client::new();
    let session = client
        .create_session(config.session.clone())
        .context("failed to create session")?;

    if session.is_authenticated().context("authentication probe failed")? {
        println!("Authenticated");
    } else {
        let (username, password) = match (&config.username, &config.password) {
            (Some(u), Some(p)) => (u.as_str(), p.as_str()),
            _ => return Err(anyhow!("not authenticated and no credentials were given")),
        };

        let logged_in = session
            .login(username, password, config.domain.as_deref())
            .context("login failed")?;
        println!("{}", logged_in);
        if session.is_authenticated()? {
            println!("Authenticated (after login)");
        } else {
            warn!(user = %username, "Session is still not authenticated");
        }
    }
    debug!(session = %session, "Session ready");

    let filters: Params = args.filters.iter().cloned().collect();
    let tasks = client
        .tasks()?
        .search(&filters, &Params::new())
        .context("task search failed")?;
    for task in &tasks {
        println!("{}", task);
    }

    let me = client.current_user().context("failed to fetch current user")?;
    println!("{}", me);

    Ok(())
}
