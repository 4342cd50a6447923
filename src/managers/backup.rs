//! Backup manager - orchestrates backup passes

use crate::config::Config;
use crate::managers::notification::NotificationManager;
use crate::providers::{resolve_provider, Provider};
use crate::utils::compression::{create_private_temp, Compression};
use crate::utils::docker::ContainerInfo;
use crate::utils::docker_ops::DockerOperations;
use crate::utils::locker::with_exclusive_lock;
use anyhow::{Context, Result};
use chrono::Local;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Timestamp prefixed to file names in cluster mode
const CLUSTER_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// How containers were discovered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiscoveryMode {
    /// All running containers of the local runtime
    #[default]
    Standalone,
    /// Swarm service tasks scheduled on the local node
    Cluster,
}

#[derive(Debug, Clone)]
pub struct Discovery {
    pub mode: DiscoveryMode,
    pub containers: Vec<ContainerInfo>,
}

/// Outcome of one pass
#[derive(Debug, Clone, Default)]
pub struct BackupReport {
    pub mode: DiscoveryMode,
    /// Containers found by discovery
    pub discovered: usize,
    /// Containers that matched a provider
    pub attempted: usize,
    /// Names of containers backed up, in processing order
    pub backed_up: Vec<String>,
    /// Containers whose backup failed, with the error
    pub failed: Vec<(String, String)>,
    /// Containers that matched no provider
    pub skipped: Vec<String>,
    pub elapsed: Duration,
}

impl BackupReport {
    pub fn summary(&self) -> String {
        format!(
            "Backed up {} of {} database containers ({} discovered, {} failed) in {:.2}s",
            self.backed_up.len(),
            self.attempted,
            self.discovered,
            self.failed.len(),
            self.elapsed.as_secs_f64()
        )
    }
}

/// What a pass would do with one container
#[derive(Debug, Clone)]
pub struct PlannedBackup {
    pub container: ContainerInfo,
    pub provider: Option<Provider>,
    pub destination: Option<PathBuf>,
}

pub struct BackupManager<'a, D: DockerOperations> {
    config: &'a Config,
    docker: D,
    notification_manager: Option<NotificationManager>,
}

impl<'a, D: DockerOperations> BackupManager<'a, D> {
    pub fn new(config: &'a Config, docker: D, notification_manager: Option<NotificationManager>) -> Self {
        Self {
            config,
            docker,
            notification_manager,
        }
    }

    /// Run one pass under the cross-process lock
    ///
    /// Returns `Ok(None)` if another pass is already running.
    pub fn run_pass(&self) -> Result<Option<BackupReport>> {
        with_exclusive_lock(&self.config.lock_file, || self.backup_all())?.transpose()
    }

    /// Back up every recognized database container, then notify
    ///
    /// Per-container failures are recorded in the report; only discovery
    /// failures are returned as errors.
    pub fn backup_all(&self) -> Result<BackupReport> {
        let start_time = Instant::now();

        fs::create_dir_all(&self.config.backup_dir).context(format!(
            "Failed to create backup directory: {:?}",
            self.config.backup_dir
        ))?;

        let discovery = self.discover()?;
        let total = discovery.containers.len();
        info!("Found {} running containers", total);

        let prefix = match discovery.mode {
            DiscoveryMode::Cluster => Some(Local::now().format(CLUSTER_TIMESTAMP_FORMAT).to_string()),
            DiscoveryMode::Standalone => None,
        };

        let mut report = BackupReport {
            mode: discovery.mode,
            discovered: total,
            ..BackupReport::default()
        };

        for (index, container) in discovery.containers.iter().enumerate() {
            let names = container.candidate_names();
            let Some(provider) = resolve_provider(&names) else {
                debug!("No provider for '{}' ({})", container.name, names.join(", "));
                report.skipped.push(container.name.clone());
                continue;
            };

            report.attempted += 1;
            println!("[{}/{}] {} ({})", index + 1, total, container.name, provider);

            match self.backup_container(container, provider, prefix.as_deref()) {
                Ok(path) => {
                    info!("Backed up '{}' to {:?}", container.name, path);
                    report.backed_up.push(container.name.clone());
                }
                Err(e) => {
                    let error_msg = format!("{:#}", e);
                    error!("Failed to back up '{}': {}", container.name, error_msg);
                    report.failed.push((container.name.clone(), error_msg));
                }
            }
        }

        report.elapsed = start_time.elapsed();

        info!("{}", report.summary());
        println!("{}", report.summary());

        self.notify(&report);

        Ok(report)
    }

    /// Show which provider and destination each container would get
    pub fn plan(&self) -> Result<Vec<PlannedBackup>> {
        let discovery = self.discover()?;
        let prefix = match discovery.mode {
            DiscoveryMode::Cluster => Some(Local::now().format(CLUSTER_TIMESTAMP_FORMAT).to_string()),
            DiscoveryMode::Standalone => None,
        };

        Ok(discovery
            .containers
            .into_iter()
            .map(|container| {
                let provider = resolve_provider(&container.candidate_names());
                let destination = provider.map(|p| {
                    self.config.backup_dir.join(backup_file_name(
                        &container.name,
                        p,
                        self.config.compression,
                        prefix.as_deref(),
                    ))
                });
                PlannedBackup {
                    container,
                    provider,
                    destination,
                }
            })
            .collect())
    }

    /// Find the containers to consider for this pass
    pub fn discover(&self) -> Result<Discovery> {
        match self.docker.swarm_node_id().context("Failed to query swarm state")? {
            Some(node_id) => {
                info!("Swarm mode active, backing up tasks on node {}", node_id);
                let containers = self
                    .docker
                    .list_node_task_containers(&node_id)
                    .context("Failed to list swarm tasks")?;
                Ok(Discovery {
                    mode: DiscoveryMode::Cluster,
                    containers,
                })
            }
            None => {
                let containers = self
                    .docker
                    .list_running_containers()
                    .context("Failed to list containers")?;
                Ok(Discovery {
                    mode: DiscoveryMode::Standalone,
                    containers,
                })
            }
        }
    }

    /// Dump one container into a temp file, then rename it into place
    ///
    /// The final path is only ever replaced by a complete dump.
    fn backup_container(
        &self,
        container: &ContainerInfo,
        provider: Provider,
        prefix: Option<&str>,
    ) -> Result<PathBuf> {
        let env = self
            .docker
            .container_env(&container.name)
            .context("Failed to read container environment")?;

        let command = provider.build_command(&env, &self.config.dump_options)?;

        let file_name = backup_file_name(&container.name, provider, self.config.compression, prefix);
        let destination = self.config.backup_dir.join(&file_name);

        let temp = create_private_temp(&self.config.backup_dir, &file_name)
            .context("Failed to create temporary file")?;
        // Dropping the path on error removes the partial file
        let (file, temp_path) = temp.into_parts();

        let mut sink = self.config.compression.sink(file);
        let bytes = self
            .docker
            .exec_streaming(&container.name, &command, &mut sink)
            .context("Dump command failed")?;

        let file = sink.finish().context("Failed to finish compressed output")?;
        file.sync_all().context("Failed to sync backup file")?;
        drop(file);

        temp_path
            .persist(&destination)
            .context(format!("Failed to move backup into place: {:?}", destination))?;

        debug!("Wrote {} bytes of dump output for '{}'", bytes, container.name);
        Ok(destination)
    }

    fn notify(&self, report: &BackupReport) {
        if let Some(ref manager) = self.notification_manager {
            if let Err(e) = manager.notify(report) {
                warn!("Failed to send success hook: {:#}", e);
            }
        }
    }
}

/// File name for a container's dump
///
/// `{name}.{extension}{compression suffix}`, prefixed with `{prefix}_` in
/// cluster mode.
pub fn backup_file_name(
    container_name: &str,
    provider: Provider,
    compression: Compression,
    prefix: Option<&str>,
) -> String {
    let base = format!(
        "{}.{}{}",
        container_name,
        provider.file_extension(),
        compression.file_suffix()
    );

    match prefix {
        Some(prefix) => format!("{}_{}", prefix, base),
        None => base,
    }
}
