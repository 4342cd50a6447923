//! Test fixtures and sample data
//!
//! Provides pre-built containers, mocked Docker hosts and environment lookups.

use db_auto_backup::utils::docker::ContainerInfo;
use db_auto_backup::utils::docker_ops::mock::MockDockerOps;
use parking_lot::Mutex;
use std::collections::HashMap;

pub const POSTGRES_DUMP: &[u8] = b"--\n-- PostgreSQL database cluster dump\n--\n";
pub const MYSQL_DUMP: &[u8] = b"-- MySQL dump 10.13  Distrib 8.0.36\n";
pub const MARIADB_DUMP: &[u8] = b"-- MariaDB dump 10.19  Distrib 10.11.6-MariaDB\n";
pub const REDIS_DUMP: &[u8] = b"REDIS0011\xfa\tredis-ver\x057.2.4";

/// Create a container whose image carries a single tag
pub fn container(name: &str, image: &str) -> ContainerInfo {
    ContainerInfo {
        id: format!("{:0>64}", name.len()),
        name: name.to_string(),
        image: image.to_string(),
        image_tags: vec![image.to_string()],
    }
}

/// Create a container whose image has no tags
pub fn untagged_container(name: &str, image: &str) -> ContainerInfo {
    ContainerInfo {
        image_tags: vec![],
        ..container(name, image)
    }
}

pub fn postgres_container(name: &str) -> ContainerInfo {
    container(name, "postgres:16-alpine")
}

pub fn mysql_container(name: &str) -> ContainerInfo {
    container(name, "mysql:8.0")
}

pub fn mariadb_container(name: &str) -> ContainerInfo {
    container(name, "mariadb:11")
}

pub fn redis_container(name: &str) -> ContainerInfo {
    container(name, "redis:7-alpine")
}

/// A Docker host running one container of each supported engine plus a web
/// server that must be skipped
pub fn standard_host() -> MockDockerOps {
    MockDockerOps::new()
        .with_container(postgres_container("psql-1"))
        .with_container(mysql_container("mysql-1"))
        .with_container(mariadb_container("mariadb-1"))
        .with_container(redis_container("redis-1"))
        .with_container(container("web-1", "nginx:1.25"))
        .with_env("psql-1", &[("POSTGRES_USER", "postgres")])
        .with_env("mysql-1", &[("MYSQL_ROOT_PASSWORD", "root-secret")])
        .with_env("mariadb-1", &[("MARIADB_ROOT_PASSWORD", "root-secret")])
        .with_dump("psql-1", POSTGRES_DUMP)
        .with_dump("mysql-1", MYSQL_DUMP)
        .with_dump("mariadb-1", MARIADB_DUMP)
        .with_dump("redis-1", REDIS_DUMP)
}

/// File names a pass over [`standard_host`] produces, sorted
pub fn standard_host_files(suffix: &str) -> Vec<String> {
    let mut names: Vec<String> = ["mariadb-1.sql", "mysql-1.sql", "psql-1.sql", "redis-1.rdb"]
        .iter()
        .map(|name| format!("{}{}", name, suffix))
        .collect();
    names.sort();
    names
}

/// `docker inspect --type container` output for one container
pub fn inspect_json(id: &str, name: &str, image_id: &str, image: &str) -> String {
    format!(
        r#"[{{"Id":"{}","Name":"/{}","Image":"{}","Config":{{"Image":"{}","Env":[]}}}}]"#,
        id, name, image_id, image
    )
}

/// Environment lookup backed by a map that records which keys were read
#[derive(Default)]
pub struct EnvLookup {
    vars: HashMap<String, String>,
    reads: Mutex<Vec<String>>,
}

impl EnvLookup {
    pub fn new(vars: &[(&str, &str)]) -> Self {
        Self {
            vars: vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            reads: Mutex::new(Vec::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.reads.lock().push(key.to_string());
        self.vars.get(key).cloned()
    }

    /// Keys that were looked up, in order
    pub fn reads(&self) -> Vec<String> {
        self.reads.lock().clone()
    }
}
