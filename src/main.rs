use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use iww::cloud::auth::Credentials;
use iww::cloud::client::{CloudClient, Endpoints};
use iww::cloud::http::format_api_error;
use iww::commands::{self, RemoveOptions};
use iww::config::Config;
use iww::context::{GroupContext, Scope, Settings};
use iww::resource::pipeline::check_list_flags;
use iww::resource::Pipeline;
use std::io;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

/// World wide operations on existing IBM Cloud resources
#[derive(Parser, Debug)]
#[command(name = "iww", version, about, long_about = None)]
struct Cli {
    /// IBM Cloud API key
    #[arg(long, global = true, env = "IBMCLOUD_API_KEY", hide_env_values = true)]
    apikey: Option<String>,

    /// Pre-obtained IAM bearer token, instead of an API key
    #[arg(long, global = true, env = "IBMCLOUD_IAM_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Account id, resolved from the API key when omitted
    #[arg(long, global = true)]
    account: Option<String>,

    /// Log level for debugging
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List matching resources
    Ls {
        #[command(flatten)]
        filter: Filter,
        /// Skip the per-resource fetch
        #[arg(long)]
        fast: bool,
    },
    /// Destroy matching resources
    Rm {
        #[command(flatten)]
        filter: Filter,
        /// Only this resource address
        #[arg(long)]
        crn: Option<String>,
        /// Do not ask for confirmation
        #[arg(long)]
        force: bool,
    },
    /// Destroy matching resources without confirmation
    Test {
        #[command(flatten)]
        filter: Filter,
    },
    /// Store default region and resource group
    Config {
        #[arg(long)]
        region: Option<String>,
        #[arg(long)]
        group: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
struct Filter {
    /// Resource group name
    #[arg(long)]
    group: Option<String>,
    /// Region, e.g. us-south
    #[arg(long)]
    region: Option<String>,
    /// Only infrastructure resources of this VPC
    #[arg(long)]
    vpcid: Option<String>,
    /// Log progress at info level
    #[arg(long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

/// RUST_LOG directives when set and valid, otherwise just the level.
/// The writer still caps output at --log-level.
fn log_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::default().add_directive(level.into()))
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&PathBuf>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let (writer, guard) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            (
                BoxMakeWriter::new(non_blocking.with_max_level(tracing_level)),
                Some(guard),
            )
        }
        None => (BoxMakeWriter::new(io::stderr.with_max_level(tracing_level)), None),
    };

    let filter = log_filter(tracing_level, std::env::var("RUST_LOG").ok().as_deref());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .init();

    tracing::info!("iww started with log level: {:?}", level);
    Ok(guard)
}

fn scope_from(filter: &Filter, config: &Config) -> Scope {
    Scope {
        region: config.effective_region(filter.region.clone()),
        group_name: config.effective_group(filter.group.clone()),
        group_id: None,
        vpc_id: filter.vpcid.clone().filter(|v| !v.is_empty()),
    }
}

async fn connect(cli: &Cli, scope: Scope) -> Result<GroupContext> {
    let endpoints = Endpoints::default();
    let apikey = cli
        .apikey
        .clone()
        .or_else(|| std::env::var("APIKEY").ok())
        .filter(|k| !k.is_empty());
    let credentials = Credentials::new(apikey.as_deref(), cli.token.as_deref(), &endpoints.iam)?;
    let client = CloudClient::new(credentials, endpoints)?;
    let ctx = GroupContext::connect(client, cli.account.clone(), scope, Settings::default()).await?;
    Ok(ctx)
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load();
    let pipeline = Pipeline::default();
    let mut stdout = io::stdout();

    match &cli.command {
        Command::Ls { filter, fast } => {
            let scope = scope_from(filter, &config);
            check_list_flags(*fast, &scope)?;
            let ctx = connect(&cli, scope).await?;
            commands::ls(&ctx, &pipeline, *fast, &mut stdout).await?;
        }
        Command::Rm { filter, crn, force } => {
            let scope = scope_from(filter, &config);
            commands::require_removal_scope(&scope, crn.as_deref())?;
            let ctx = connect(&cli, scope).await?;
            let options = RemoveOptions {
                crn: crn.clone(),
                force: *force,
            };
            let mut input = io::stdin().lock();
            commands::rm(&ctx, &pipeline, &options, &mut input, &mut stdout).await?;
        }
        Command::Test { filter } => {
            let scope = scope_from(filter, &config);
            commands::require_removal_scope(&scope, None)?;
            let ctx = connect(&cli, scope).await?;
            let options = RemoveOptions {
                crn: None,
                force: true,
            };
            let mut input = io::empty();
            commands::rm(&ctx, &pipeline, &options, &mut input, &mut stdout).await?;
        }
        Command::Config { region, group } => {
            let mut updated = config;
            if region.is_some() {
                updated.region = region.clone();
            }
            if group.is_some() {
                updated.resource_group = group.clone();
            }
            updated.save()?;
            println!(
                "region: {} group: {}",
                updated.region.as_deref().unwrap_or("-"),
                updated.resource_group.as_deref().unwrap_or("-")
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Command::Ls { filter, .. } | Command::Rm { filter, .. } | Command::Test { filter } => {
            filter.verbose
        }
        Command::Config { .. } => false,
    };
    let level = if verbose {
        cli.log_level.max(LogLevel::Info)
    } else {
        cli.log_level
    };

    let _log_guard = match setup_logging(level, cli.log_file.as_ref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Failed to set up logging: {err:?}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<iww::Error>() {
            Some(e) => eprintln!("Error: {}", format_api_error(e)),
            None => eprintln!("Error: {err:?}"),
        }
        std::process::exit(1);
    }
}
