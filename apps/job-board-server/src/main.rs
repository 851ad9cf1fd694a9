use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use std::path::{Path, PathBuf};

use api_ingress::ApiIngress;
use job_board::config::JobBoardConfig;
use job_board::infra::storage::db;
use job_board::model::NewJob;
use job_board::JobBoardModule;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Job Board Server - server-rendered job board with accounts and sessions
#[derive(Parser)]
#[command(name = "job-board-server")]
#[command(about = "Job Board Server - server-rendered job board with accounts and sessions")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration (secrets masked) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
    /// Add a job posting to the database
    AddJob(AddJobArgs),
}

#[derive(Args)]
struct AddJobArgs {
    /// Job title (max 100 characters)
    title: String,
    /// Job description (max 1000 characters)
    description: String,
    /// Company name (max 100 characters)
    company: String,
    #[arg(long)]
    location: Option<String>,
    /// Yearly salary
    #[arg(long)]
    salary: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // `.env` values sit underneath real environment variables.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Load configuration (normalized home_dir is applied inside)
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Job Board Server starting");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(config),
        Commands::AddJob(job) => add_job(config, job).await,
    }
}

/// Connect to the configured database and bring the schema up to date.
async fn open_database(config: &AppConfig) -> Result<db::SqlitePool> {
    let db_config = config
        .database
        .as_ref()
        .context("Database URL not configured")?;
    let pool = db::connect(db_config, Path::new(&config.server.home_dir))
        .await
        .context("Failed to connect to database")?;
    db::migrate(&pool).await?;
    Ok(pool)
}

async fn run_server(config: AppConfig) -> Result<()> {
    config.validate()?;

    let pool = open_database(&config).await?;

    tracing::info!("Initializing modules...");
    let job_board = JobBoardModule::init(&config, pool.clone())?;
    match job_board.purge_expired_sessions().await {
        Ok(purged) => tracing::info!("Startup cleanup removed {} expired sessions", purged),
        Err(e) => tracing::warn!("Expired session cleanup failed: {:#}", e),
    }

    let ingress = ApiIngress::from_app_config(&config)?;
    let router = ingress.build_router(job_board.router());
    let addr = api_ingress::bind_addr(&config.server)?;

    ingress.serve(router, addr).await?;

    pool.close().await;
    tracing::info!("Job Board Server stopped");
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    config.validate()?;
    config.module_config::<JobBoardConfig>(job_board::module::MODULE_NAME)?;
    ApiIngress::from_app_config(&config)?;
    api_ingress::bind_addr(&config.server)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn add_job(config: AppConfig, job: AddJobArgs) -> Result<()> {
    config.validate()?;

    let pool = open_database(&config).await?;
    let job_board = JobBoardModule::init(&config, pool.clone())?;

    let created = job_board
        .jobs_api()
        .add_job(NewJob {
            title: job.title,
            description: job.description,
            company: job.company,
            location: job.location,
            salary: job.salary,
        })
        .await?;

    pool.close().await;
    println!("Created job {} ({})", created.id, created.title);
    Ok(())
}
