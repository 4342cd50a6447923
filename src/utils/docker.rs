//! Docker CLI bindings for container discovery and exec

use super::executor::CommandExecutor;
use super::image;
use crate::providers::commands::parse_env;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;
use tracing::debug;

const DOCKER: &str = "docker";

/// A running container as reported by the runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,
    pub name: String,
    /// Image reference the container was started from (`Config.Image`)
    pub image: String,
    /// Tags of the container's image (`RepoTags`)
    pub image_tags: Vec<String>,
}

impl ContainerInfo {
    /// Short names used for provider matching
    pub fn candidate_names(&self) -> Vec<String> {
        image::container_names(&self.image_tags, &self.image, &self.name)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectContainer {
    id: String,
    name: String,
    image: String,
    #[serde(default)]
    config: Option<InspectConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InspectConfig {
    #[serde(default)]
    image: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct SwarmInfo {
    #[serde(rename = "NodeID", default)]
    node_id: String,
    #[serde(default)]
    local_node_state: String,
}

#[derive(Debug, Deserialize)]
struct TaskContainerStatus {
    #[serde(rename = "ContainerID", default)]
    container_id: String,
}

/// Node ID of this host if it is an active swarm member
pub fn swarm_node_id(executor: &dyn CommandExecutor, timeout: Duration) -> Result<Option<String>> {
    let output = executor
        .run_command_stdout(DOCKER, &["info", "--format", "{{json .Swarm}}"], Some(timeout))
        .context("Failed to query docker info")?;

    let swarm: SwarmInfo = match output.trim() {
        "" | "null" => SwarmInfo::default(),
        json => serde_json::from_str(json).context("Failed to parse swarm info")?,
    };

    if swarm.local_node_state == "active" && !swarm.node_id.is_empty() {
        Ok(Some(swarm.node_id))
    } else {
        Ok(None)
    }
}

/// List all running containers on this host
pub fn list_running_containers(
    executor: &dyn CommandExecutor,
    timeout: Duration,
) -> Result<Vec<ContainerInfo>> {
    let ids = executor
        .run_command_stdout(DOCKER, &["ps", "-q", "--no-trunc"], Some(timeout))
        .context("Failed to list running containers")?;

    Ok(inspect_existing(executor, &non_empty_lines(&ids), timeout))
}

/// List the containers of all service tasks scheduled on `node_id`
///
/// Tasks whose container no longer exists are skipped.
pub fn list_node_task_containers(
    executor: &dyn CommandExecutor,
    node_id: &str,
    timeout: Duration,
) -> Result<Vec<ContainerInfo>> {
    let services = executor
        .run_command_stdout(DOCKER, &["service", "ls", "-q"], Some(timeout))
        .context("Failed to list swarm services")?;

    let node_filter = format!("node={}", node_id);
    let mut container_ids = Vec::new();

    for service in non_empty_lines(&services) {
        let tasks = executor
            .run_command_stdout(
                DOCKER,
                &[
                    "service",
                    "ps",
                    &service,
                    "--filter",
                    &node_filter,
                    "--filter",
                    "desired-state=running",
                    "-q",
                    "--no-trunc",
                ],
                Some(timeout),
            )
            .context(format!("Failed to list tasks of service {}", service))?;

        for task in non_empty_lines(&tasks) {
            match task_container_id(executor, &task, timeout) {
                Some(id) => container_ids.push(id),
                None => debug!("Task {} has no container, skipping", task),
            }
        }
    }

    Ok(inspect_existing(executor, &container_ids, timeout))
}

/// Read the running environment of a container
pub fn container_env(
    executor: &dyn CommandExecutor,
    container: &str,
    timeout: Duration,
) -> Result<HashMap<String, String>> {
    let output = executor
        .run_command_stdout(DOCKER, &["exec", container, "env"], Some(timeout))
        .context(format!("Failed to read environment of {}", container))?;

    Ok(parse_env(&output))
}

/// Run a shell command in a container, streaming its stdout into `sink`
pub fn exec_streaming(
    executor: &dyn CommandExecutor,
    container: &str,
    command: &str,
    sink: &mut dyn Write,
) -> Result<u64> {
    executor.stream_command(DOCKER, &["exec", container, "sh", "-c", command], sink)
}

fn task_container_id(executor: &dyn CommandExecutor, task: &str, timeout: Duration) -> Option<String> {
    let output = executor
        .run_command_stdout(
            DOCKER,
            &["inspect", "--type", "task", "--format", "{{json .Status.ContainerStatus}}", task],
            Some(timeout),
        )
        .ok()?;

    let status: Option<TaskContainerStatus> = serde_json::from_str(output.trim()).ok()?;
    status
        .map(|s| s.container_id)
        .filter(|id| !id.is_empty())
}

/// Inspect containers one at a time, dropping any that have gone away
fn inspect_existing(
    executor: &dyn CommandExecutor,
    ids: &[String],
    timeout: Duration,
) -> Vec<ContainerInfo> {
    let mut tag_cache: HashMap<String, Vec<String>> = HashMap::new();
    let mut containers = Vec::new();

    for id in ids {
        let inspected = match inspect_container(executor, id, timeout) {
            Ok(container) => container,
            Err(e) => {
                debug!("Container {} could not be inspected, skipping: {:#}", id, e);
                continue;
            }
        };

        let image_tags = tag_cache
            .entry(inspected.image.clone())
            .or_insert_with(|| image_tags(executor, &inspected.image, timeout))
            .clone();

        containers.push(ContainerInfo {
            id: inspected.id,
            name: inspected.name.trim_start_matches('/').to_string(),
            image: inspected.config.map(|c| c.image).unwrap_or_default(),
            image_tags,
        });
    }

    containers
}

fn inspect_container(
    executor: &dyn CommandExecutor,
    id: &str,
    timeout: Duration,
) -> Result<InspectContainer> {
    let output = executor.run_command_stdout(
        DOCKER,
        &["inspect", "--type", "container", id],
        Some(timeout),
    )?;

    let mut parsed: Vec<InspectContainer> =
        serde_json::from_str(&output).context("Failed to parse container inspect output")?;

    parsed.pop().context("Empty inspect output")
}

/// Tags of an image; untagged or unknown images yield an empty list
fn image_tags(executor: &dyn CommandExecutor, image_id: &str, timeout: Duration) -> Vec<String> {
    let output = executor.run_command_stdout(
        DOCKER,
        &["image", "inspect", "--format", "{{json .RepoTags}}", image_id],
        Some(timeout),
    );

    match output {
        Ok(json) => serde_json::from_str::<Option<Vec<String>>>(json.trim())
            .ok()
            .flatten()
            .unwrap_or_default(),
        Err(e) => {
            debug!("Could not read tags of image {}: {:#}", image_id, e);
            Vec::new()
        }
    }
}

fn non_empty_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
