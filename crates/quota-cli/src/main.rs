//! quota-query - LDAP filters and member lists for quota classes
//!
//! Builds the membership filter for the faculty, grad and ugrad quota
//! classes and optionally runs it against the configured directory.

mod commands;
mod logging;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use commands::CommandContext;
use quota_core::QuotaConfig;
use quota_ldap::QuotaClass;
use tracing::debug;

#[derive(Parser)]
#[command(name = "quota-query")]
#[command(author = "Quota Query Team")]
#[command(version = quota_core::VERSION)]
#[command(about = "LDAP filters for faculty, grad and ugrad quota classes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, env = "QUOTA_CONFIG")]
    config: Option<String>,

    /// LDAP server URL
    #[arg(long, global = true, env = "QUOTA_LDAP_URL")]
    url: Option<String>,

    /// Base DN for member searches
    #[arg(long, global = true, env = "QUOTA_SEARCH_BASE")]
    search_base: Option<String>,

    /// Bind DN (anonymous when unset)
    #[arg(long, global = true, env = "QUOTA_BIND_DN")]
    bind_dn: Option<String>,

    /// Bind password
    #[arg(long, global = true, env = "QUOTA_BIND_PASSWORD", hide_env_values = true)]
    bind_password: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "text")]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the LDAP filter for a quota class
    Filter {
        /// Quota class: faculty, grad or ugrad
        #[arg(value_parser = parse_class)]
        class: QuotaClass,
    },

    /// List the members of a quota class
    Members {
        /// Quota class: faculty, grad or ugrad
        #[arg(value_parser = parse_class)]
        class: QuotaClass,

        /// Attribute printed for each member (defaults to ldap.member_attribute)
        #[arg(long)]
        attr: Option<String>,
    },

    /// Show version information
    Version,
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

fn parse_class(s: &str) -> Result<QuotaClass, quota_core::Error> {
    s.parse()
}

/// Layer file (or defaults), `QUOTA_*` environment and flags, in that order
fn load_config(cli: &Cli) -> anyhow::Result<QuotaConfig> {
    let mut config = match &cli.config {
        Some(path) => QuotaConfig::from_file(path)?,
        None => QuotaConfig::default(),
    };
    config.apply_env(|key| std::env::var(key).ok());

    if let Some(url) = &cli.url {
        config.ldap.server_url = url.clone();
    }
    if let Some(base) = &cli.search_base {
        config.ldap.search_base = base.clone();
    }
    if let Some(dn) = &cli.bind_dn {
        config.ldap.bind_dn = dn.clone();
    }
    if let Some(password) = &cli.bind_password {
        config.ldap.bind_password = password.clone();
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format.as_str().to_string();
    }

    Ok(config)
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    logging::init_logging(&config.logging);
    debug!("Using LDAP server {}", config.ldap.server_url);

    let ctx = CommandContext {
        config,
        output_format: cli.output,
    };

    match cli.command {
        Commands::Filter { class } => commands::filter::execute(&ctx, class),
        Commands::Members { class, attr } => {
            commands::members::execute(&ctx, class, attr.as_deref()).await
        }
        Commands::Version => {
            println!("quota-query {}", quota_core::VERSION);
            Ok(())
        }
    }
}

/// Exit status 2 for bad input or configuration, 1 for directory failures
fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<quota_core::Error>() {
        Some(e) if e.is_client_error() => 2,
        _ => 1,
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        match e.downcast_ref::<quota_core::Error>() {
            Some(quota_err) => eprintln!(
                "{} [{}] {:#}",
                "error:".red().bold(),
                quota_err.code(),
                e
            ),
            None => eprintln!("{} {:#}", "error:".red().bold(), e),
        }
        std::process::exit(exit_code(&e));
    }
}
