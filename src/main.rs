use anyhow::Result;
use clap::{Parser, Subcommand};
use db_auto_backup::config::{self, Config};
use db_auto_backup::managers::backup::BackupManager;
use db_auto_backup::managers::logging::{self, LogFormat};
use db_auto_backup::managers::notification::{resolve_hook_url, NotificationManager};
use db_auto_backup::providers::PROVIDERS;
use db_auto_backup::utils::cron;
use db_auto_backup::utils::docker_ops::RealDockerOps;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "db-auto-backup")]
#[command(about = "Back up databases running in Docker containers", long_about = None)]
#[command(version)]
struct Cli {
    /// Format of diagnostic output on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single backup pass now, ignoring SCHEDULE
    Run,

    /// Show which containers would be backed up, and where
    List,

    /// Validate configuration from the environment
    Validate,

    /// List supported database providers and their image patterns
    Providers,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_format);

    // Commands that don't touch the environment or docker
    if let Some(Commands::Providers) = cli.command {
        handle_providers();
        return Ok(());
    }

    let config = config::load_config_from_env()?;

    if let Some(Commands::Validate) = cli.command {
        handle_validate(&config);
        return Ok(());
    }

    let docker_path = config::ensure_docker_available()?;
    info!("Using docker CLI at {:?}", docker_path);

    let docker = RealDockerOps::new(config.docker_timeout);
    let notification_manager = NotificationManager::from_config(&config.notifications);
    let backup_manager = BackupManager::new(&config, docker, notification_manager);

    match cli.command {
        Some(Commands::List) => handle_list(&backup_manager),
        Some(Commands::Run) => run_once(&backup_manager),
        _ => match config.schedule {
            Some(ref schedule) => {
                info!("Running backups on schedule '{}'", schedule);
                cron::run_scheduled(schedule, || {
                    if let Err(e) = backup_manager.run_pass() {
                        error!("Backup pass failed: {:#}", e);
                    }
                });
                Ok(())
            }
            None => run_once(&backup_manager),
        },
    }
}

fn run_once(backup_manager: &BackupManager<'_, RealDockerOps>) -> Result<()> {
    if backup_manager.run_pass()?.is_none() {
        println!("Another backup pass is already running, skipped");
    }
    Ok(())
}

fn handle_list(backup_manager: &BackupManager<'_, RealDockerOps>) -> Result<()> {
    let plan = backup_manager.plan()?;

    println!("{:<30} {:<10} DESTINATION", "CONTAINER", "PROVIDER");
    for entry in &plan {
        let provider = entry.provider.map(|p| p.name()).unwrap_or("-");
        let destination = entry
            .destination
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{:<30} {:<10} {}", entry.container.name, provider, destination);
    }

    let matched = plan.iter().filter(|p| p.provider.is_some()).count();
    println!("\n{} of {} containers would be backed up", matched, plan.len());
    Ok(())
}

fn handle_validate(config: &Config) {
    println!("Configuration is valid\n");
    println!("  Backup directory: {}", config.backup_dir.display());
    match config.schedule {
        Some(ref schedule) => println!("  Schedule:         {}", schedule),
        None => println!("  Schedule:         (single run)"),
    }
    println!("  Compression:      {}", config.compression);
    println!("  Clean dumps:      {}", config.dump_options.clean);
    println!("  Docker timeout:   {}s", config.docker_timeout.as_secs());
    match resolve_hook_url(&config.notifications) {
        Some(url) => println!(
            "  Success hook:     {} ({})",
            url,
            if config.notifications.include_logs { "POST" } else { "GET" }
        ),
        None => println!("  Success hook:     (none)"),
    }
}

fn handle_providers() {
    for provider in PROVIDERS {
        println!(
            "{:<10} .{:<4} {}",
            provider.name(),
            provider.file_extension(),
            provider.patterns().join(", ")
        );
    }
}
