//! Tests for the 'run' command
//!
//! A run is a single backup pass over every running database container.

use test_utils::{
    container, mysql_container, postgres_container, redis_container, standard_host,
    standard_host_files, BackupManager, ConfigBuilder, DockerCall, MockDockerOps, TestContext,
    POSTGRES_DUMP, REDIS_DUMP,
};

#[test]
fn test_run_backs_up_every_database() {
    let ctx = TestContext::new();
    let manager = BackupManager::new(ctx.config(), standard_host(), None);

    let report = manager.run_pass().unwrap().unwrap();

    assert_eq!(report.discovered, 5);
    assert_eq!(report.attempted, 4);
    assert_eq!(report.backed_up.len(), 4);
    assert_eq!(report.skipped, vec!["web-1"]);
    assert_eq!(ctx.backup_files(), standard_host_files(""));
    assert_eq!(ctx.read_backup("psql-1.sql").unwrap(), POSTGRES_DUMP);
    assert_eq!(ctx.read_backup("redis-1.rdb").unwrap(), REDIS_DUMP);
}

#[cfg(unix)]
#[test]
fn test_run_writes_owner_only_files() {
    let ctx = TestContext::new();
    let manager = BackupManager::new(ctx.config(), standard_host(), None);

    manager.run_pass().unwrap();

    for name in ctx.backup_files() {
        assert_eq!(ctx.backup_mode(&name).unwrap(), 0o600, "{}", name);
    }
}

#[test]
fn test_run_twice_replaces_files() {
    let ctx = TestContext::new();

    BackupManager::new(ctx.config(), standard_host(), None)
        .run_pass()
        .unwrap();

    let second = MockDockerOps::new()
        .with_container(redis_container("redis-1"))
        .with_dump("redis-1", b"REDIS0012");
    BackupManager::new(ctx.config(), second, None).run_pass().unwrap();

    assert_eq!(ctx.backup_files(), standard_host_files(""));
    assert_eq!(ctx.read_backup("redis-1.rdb").unwrap(), b"REDIS0012");
}

#[test]
fn test_run_without_containers() {
    let ctx = TestContext::new();
    let manager = BackupManager::new(ctx.config(), MockDockerOps::new(), None);

    let report = manager.run_pass().unwrap().unwrap();

    assert_eq!(report.discovered, 0);
    assert!(report.backed_up.is_empty());
    assert!(ctx.backup_dir().exists());
}

#[test]
fn test_run_creates_missing_backup_dir() {
    let builder = ConfigBuilder::new();
    let nested = builder.temp_dir().join("deep/nested/backups");
    let ctx = TestContext::from_builder(builder.with_backup_dir(&nested));
    let docker = MockDockerOps::new()
        .with_container(postgres_container("db"))
        .with_dump("db", POSTGRES_DUMP);

    BackupManager::new(ctx.config(), docker, None).run_pass().unwrap();

    assert!(nested.join("db.sql").exists());
}

#[test]
fn test_run_with_clean_passes_flags() {
    let ctx = TestContext::from_builder(ConfigBuilder::new().with_clean());
    let docker = MockDockerOps::new()
        .with_container(postgres_container("pg"))
        .with_container(mysql_container("my"))
        .with_env("my", &[("MYSQL_ROOT_PASSWORD", "p")])
        .with_dump("pg", POSTGRES_DUMP)
        .with_dump("my", b"-- dump");

    BackupManager::new(ctx.config(), docker.clone(), None)
        .run_pass()
        .unwrap();

    assert!(docker.exec_calls_for("pg")[0].contains("--clean --if-exists"));
    let mysql = &docker.exec_calls_for("my")[0];
    assert!(mysql.contains("--add-drop-database"));
    assert!(mysql.contains("$MYSQL_ROOT_PASSWORD"));
}

#[test]
fn test_run_one_failure_does_not_stop_the_pass() {
    let ctx = TestContext::new();
    let docker = MockDockerOps::new()
        .with_container(postgres_container("first"))
        .with_container(redis_container("second"))
        .with_container(postgres_container("third"))
        .with_broken_dump("first", b"-- partial")
        .with_dump("second", REDIS_DUMP)
        .with_dump("third", POSTGRES_DUMP);

    let report = BackupManager::new(ctx.config(), docker, None)
        .run_pass()
        .unwrap()
        .unwrap();

    assert_eq!(report.backed_up, vec!["second", "third"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(ctx.backup_files(), vec!["second.rdb", "third.sql"]);
}

#[test]
fn test_run_in_swarm_uses_node_tasks() {
    let ctx = TestContext::new();
    let docker = MockDockerOps::new()
        .with_container(container("local-only", "redis:7"))
        .with_swarm("node-a", vec![redis_container("stack_cache.1.k2")])
        .with_dump("stack_cache.1.k2", REDIS_DUMP);

    let report = BackupManager::new(ctx.config(), docker.clone(), None)
        .run_pass()
        .unwrap()
        .unwrap();

    assert_eq!(report.backed_up, vec!["stack_cache.1.k2"]);
    assert!(docker.get_calls().contains(&DockerCall::ListNodeTaskContainers {
        node_id: "node-a".to_string()
    }));
    assert!(ctx.backup_files()[0].ends_with("_stack_cache.1.k2.rdb"));
}
