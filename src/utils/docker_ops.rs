//! Docker operations abstraction for testability
//!
//! This module provides a trait-based abstraction for Docker operations,
//! enabling dependency injection and mocking for tests.

use super::docker::{self, ContainerInfo};
use super::executor::{CommandExecutor, RealExecutor};
use anyhow::Result;
use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

/// Abstraction for Docker operations, enabling mocking in tests
pub trait DockerOperations: Send + Sync {
    /// Node ID of this host, if it is an active swarm member
    fn swarm_node_id(&self) -> Result<Option<String>>;

    /// List all running containers on this host
    fn list_running_containers(&self) -> Result<Vec<ContainerInfo>>;

    /// List the containers of swarm tasks scheduled on a node
    fn list_node_task_containers(&self, node_id: &str) -> Result<Vec<ContainerInfo>>;

    /// Read a container's running environment
    fn container_env(&self, container: &str) -> Result<HashMap<String, String>>;

    /// Run a shell command inside a container, streaming stdout into `sink`
    fn exec_streaming(&self, container: &str, command: &str, sink: &mut dyn Write) -> Result<u64>;
}

/// Default implementation using real Docker CLI calls
#[derive(Debug, Clone)]
pub struct RealDockerOps<E: CommandExecutor = RealExecutor> {
    executor: E,
    /// Timeout for inspection commands; dumps are not bounded
    timeout: Duration,
}

impl RealDockerOps<RealExecutor> {
    pub fn new(timeout: Duration) -> Self {
        Self::with_executor(RealExecutor::new(), timeout)
    }
}

impl<E: CommandExecutor> RealDockerOps<E> {
    pub fn with_executor(executor: E, timeout: Duration) -> Self {
        Self { executor, timeout }
    }
}

impl<E: CommandExecutor> DockerOperations for RealDockerOps<E> {
    fn swarm_node_id(&self) -> Result<Option<String>> {
        docker::swarm_node_id(&self.executor, self.timeout)
    }

    fn list_running_containers(&self) -> Result<Vec<ContainerInfo>> {
        docker::list_running_containers(&self.executor, self.timeout)
    }

    fn list_node_task_containers(&self, node_id: &str) -> Result<Vec<ContainerInfo>> {
        docker::list_node_task_containers(&self.executor, node_id, self.timeout)
    }

    fn container_env(&self, container: &str) -> Result<HashMap<String, String>> {
        docker::container_env(&self.executor, container, self.timeout)
    }

    fn exec_streaming(&self, container: &str, command: &str, sink: &mut dyn Write) -> Result<u64> {
        docker::exec_streaming(&self.executor, container, command, sink)
    }
}

/// Mock implementation for testing
/// Available for use in external test crates
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Recorded Docker operation call
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum DockerCall {
        SwarmNodeId,
        ListRunningContainers,
        ListNodeTaskContainers { node_id: String },
        ContainerEnv { container: String },
        Exec { container: String, command: String },
    }

    /// Scripted output of an exec call
    #[derive(Clone, Debug)]
    enum ExecScript {
        Output(Vec<u8>),
        /// Write the bytes, then fail as if the stream broke
        BrokenStream(Vec<u8>),
    }

    /// Mock Docker operations for testing
    #[derive(Clone, Default)]
    pub struct MockDockerOps {
        /// Recorded operation calls
        pub calls: Arc<Mutex<Vec<DockerCall>>>,
        /// Containers returned in standalone mode
        containers: Arc<Mutex<Vec<ContainerInfo>>>,
        /// Swarm node ID and the task containers on it
        swarm: Arc<Mutex<Option<(String, Vec<ContainerInfo>)>>>,
        /// Running environment per container name
        envs: Arc<Mutex<HashMap<String, HashMap<String, String>>>>,
        /// Exec output per container name
        exec_scripts: Arc<Mutex<HashMap<String, ExecScript>>>,
        /// Whether discovery should fail
        should_fail_list: Arc<Mutex<bool>>,
    }

    impl MockDockerOps {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a running container
        pub fn with_container(self, container: ContainerInfo) -> Self {
            self.containers.lock().unwrap().push(container);
            self
        }

        /// Report an active swarm with the given task containers on the node
        pub fn with_swarm(self, node_id: &str, tasks: Vec<ContainerInfo>) -> Self {
            *self.swarm.lock().unwrap() = Some((node_id.to_string(), tasks));
            self
        }

        /// Configure the running environment of a container
        pub fn with_env(self, container: &str, env: &[(&str, &str)]) -> Self {
            let env = env
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.envs.lock().unwrap().insert(container.to_string(), env);
            self
        }

        /// Configure the dump output of a container
        pub fn with_dump(self, container: &str, output: &[u8]) -> Self {
            self.exec_scripts
                .lock()
                .unwrap()
                .insert(container.to_string(), ExecScript::Output(output.to_vec()));
            self
        }

        /// Make a container's dump fail after writing `partial`
        pub fn with_broken_dump(self, container: &str, partial: &[u8]) -> Self {
            self.exec_scripts
                .lock()
                .unwrap()
                .insert(container.to_string(), ExecScript::BrokenStream(partial.to_vec()));
            self
        }

        /// Configure discovery to fail
        pub fn with_failing_list(self) -> Self {
            *self.should_fail_list.lock().unwrap() = true;
            self
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<DockerCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Commands executed in a container
        pub fn exec_calls_for(&self, container: &str) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter_map(|c| match c {
                    DockerCall::Exec { container: name, command } if name == container => {
                        Some(command.clone())
                    }
                    _ => None,
                })
                .collect()
        }

        fn record_call(&self, call: DockerCall) {
            self.calls.lock().unwrap().push(call);
        }

        fn check_list(&self) -> Result<()> {
            if *self.should_fail_list.lock().unwrap() {
                anyhow::bail!("Mock discovery failure");
            }
            Ok(())
        }
    }

    impl DockerOperations for MockDockerOps {
        fn swarm_node_id(&self) -> Result<Option<String>> {
            self.record_call(DockerCall::SwarmNodeId);
            self.check_list()?;
            Ok(self.swarm.lock().unwrap().as_ref().map(|(id, _)| id.clone()))
        }

        fn list_running_containers(&self) -> Result<Vec<ContainerInfo>> {
            self.record_call(DockerCall::ListRunningContainers);
            self.check_list()?;
            Ok(self.containers.lock().unwrap().clone())
        }

        fn list_node_task_containers(&self, node_id: &str) -> Result<Vec<ContainerInfo>> {
            self.record_call(DockerCall::ListNodeTaskContainers {
                node_id: node_id.to_string(),
            });
            self.check_list()?;
            Ok(self
                .swarm
                .lock()
                .unwrap()
                .as_ref()
                .filter(|(id, _)| id == node_id)
                .map(|(_, tasks)| tasks.clone())
                .unwrap_or_default())
        }

        fn container_env(&self, container: &str) -> Result<HashMap<String, String>> {
            self.record_call(DockerCall::ContainerEnv {
                container: container.to_string(),
            });
            Ok(self
                .envs
                .lock()
                .unwrap()
                .get(container)
                .cloned()
                .unwrap_or_default())
        }

        fn exec_streaming(&self, container: &str, command: &str, sink: &mut dyn Write) -> Result<u64> {
            self.record_call(DockerCall::Exec {
                container: container.to_string(),
                command: command.to_string(),
            });

            let script = self.exec_scripts.lock().unwrap().get(container).cloned();
            match script {
                Some(ExecScript::Output(bytes)) => {
                    sink.write_all(&bytes)?;
                    Ok(bytes.len() as u64)
                }
                Some(ExecScript::BrokenStream(bytes)) => {
                    sink.write_all(&bytes)?;
                    anyhow::bail!("Mock stream broke for container {}", container)
                }
                None => anyhow::bail!("No such container: {}", container),
            }
        }
    }
}
