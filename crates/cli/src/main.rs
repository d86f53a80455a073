// ID Generator CLI
//
// Design Decision: Use clap derive for ergonomic argument parsing.
// Design Decision: Support text/json/yaml output formats for scripting.
// Design Decision: Each page of the web client is a subcommand; the session
// persists in a file between invocations.

mod commands;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use idgen_core::telemetry::{init_logging, LogConfig};
use idgen_core::{ClientConfig, EmailDomainPolicy, FileStorage, SessionStore, SocialProvider};

#[derive(Parser)]
#[command(name = "idgen")]
#[command(about = "ID Generator CLI - Sign in, register and reach your dashboard")]
#[command(version)]
pub struct Cli {
    /// API base URL (default: IDGEN_API_URL or http://localhost:5050)
    #[arg(long)]
    pub api_url: Option<String>,

    /// Session file (default: IDGEN_SESSION_FILE or the platform data dir)
    #[arg(long)]
    pub session_file: Option<PathBuf>,

    /// Redirect unverified accounts to email verification
    #[arg(long)]
    pub require_verified: bool,

    /// Output format
    #[arg(long, short, default_value = "text", value_parser = ["text", "json", "yaml"])]
    pub output: String,

    /// Suppress non-essential output
    #[arg(long, short)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in with email and password
    Login {
        /// Account email (defaults to the remembered email)
        #[arg(long, short)]
        email: Option<String>,

        /// Account password
        #[arg(long, short, env = "IDGEN_PASSWORD", hide_env_values = true)]
        password: String,

        /// Remember the email for the next login
        #[arg(long)]
        remember_me: bool,
    },

    /// Create a new account
    Register {
        /// Full name
        #[arg(long)]
        name: String,

        /// Email address
        #[arg(long)]
        email: String,

        /// Password
        #[arg(long, env = "IDGEN_PASSWORD", hide_env_values = true)]
        password: String,

        /// Password again
        #[arg(long)]
        confirm_password: String,

        /// Organization
        #[arg(long, default_value = "")]
        organization: String,

        /// Phone number
        #[arg(long, default_value = "")]
        phone: String,

        /// Accept the terms of service and privacy policy
        #[arg(long)]
        agree_terms: bool,

        /// Override the accepted email domains (comma-separated, `*` for any)
        #[arg(long)]
        allowed_domains: Option<String>,
    },

    /// Sign out and remove the stored session
    Logout,

    /// Sign in through a third-party provider
    SocialLogin {
        /// google or github
        provider: SocialProvider,
    },

    /// Request a password reset link
    ForgotPassword {
        /// Account email (defaults to the remembered email)
        #[arg(long, short)]
        email: Option<String>,
    },

    /// Show the stored session and what it grants
    Status,

    /// Check whether a path would render or redirect
    Open {
        /// Path such as /dashboard or /generate
        path: String,
    },

    /// Show the dashboard
    Dashboard,

    /// Generate an ID card
    Generate,

    /// Show the landing page
    Home,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_logging(LogConfig::from_env(), "warn");

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.is::<commands::AlreadyReported>() => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = ClientConfig::from_env();
    if let Some(api_url) = &cli.api_url {
        config = config.with_api_url(api_url);
    }
    if let Some(path) = &cli.session_file {
        config.session_file = path.clone();
    }
    if cli.require_verified {
        config.guard.require_verified = true;
    }

    tracing::debug!(
        api_url = %config.api_url,
        session_file = %config.session_file.display(),
        require_verified = config.guard.require_verified,
        "configuration loaded"
    );

    let store = SessionStore::new(Arc::new(FileStorage::new(config.session_file.clone())));
    let ctx = commands::Context {
        config,
        store,
        output: output::OutputFormat::from_str(&cli.output),
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Login {
            email,
            password,
            remember_me,
        } => commands::auth::login(&ctx, email, password, remember_me).await,
        Commands::Register {
            name,
            email,
            password,
            confirm_password,
            organization,
            phone,
            agree_terms,
            allowed_domains,
        } => {
            let domains = allowed_domains
                .as_deref()
                .map(EmailDomainPolicy::from_list)
                .unwrap_or_else(|| ctx.config.email_domains.clone());
            let request = idgen_core::RegistrationRequest {
                name,
                email,
                password,
                confirm_password,
                organization,
                phone,
                agreed_to_terms: agree_terms,
            };
            commands::auth::register(&ctx, request, &domains).await
        }
        Commands::Logout => commands::auth::logout(&ctx),
        Commands::SocialLogin { provider } => commands::auth::social_login(&ctx, provider),
        Commands::ForgotPassword { email } => commands::auth::forgot_password(&ctx, email),
        Commands::Status => commands::pages::status(&ctx),
        Commands::Open { path } => commands::pages::open(&ctx, &path),
        Commands::Dashboard => commands::pages::dashboard(&ctx),
        Commands::Generate => commands::pages::generate(&ctx),
        Commands::Home => commands::pages::home(&ctx),
    }
}
