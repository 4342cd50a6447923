//! Database backup integration tests
//!
//! These tests start real database containers and run a full pass against the
//! local Docker host. Other containers on the host may be backed up too, so
//! assertions only look at the containers started here.

use crate::common::{is_docker_available, start_container, wait_until_ready};
use db_auto_backup::managers::backup::BackupManager;
use db_auto_backup::utils::docker_ops::RealDockerOps;
use std::fs;
use std::time::Duration;
use test_utils::{Compression, ConfigBuilder, TestContext};

const TIMEOUT: Duration = Duration::from_secs(30);

#[test]
#[ignore]
fn test_backup_postgres_mysql_mariadb_redis() {
    if !is_docker_available() {
        eprintln!("Docker not available, skipping");
        return;
    }

    let postgres = start_container(
        "dab-it-postgres",
        "postgres:16-alpine",
        &["POSTGRES_PASSWORD=testpass", "POSTGRES_USER=tester"],
    )
    .unwrap();
    let mysql = start_container(
        "dab-it-mysql",
        "mysql:8",
        &["MYSQL_ROOT_PASSWORD=rootpass"],
    )
    .unwrap();
    let mariadb = start_container(
        "dab-it-mariadb",
        "mariadb:11",
        &["MARIADB_ROOT_PASSWORD=rootpass"],
    )
    .unwrap();
    let redis = start_container("dab-it-redis", "redis:7-alpine", &[]).unwrap();

    wait_until_ready(postgres.name(), &["pg_isready", "-U", "tester"]).unwrap();
    wait_until_ready(
        mysql.name(),
        &["mysql", "-uroot", "-prootpass", "-e", "SELECT 1"],
    )
    .unwrap();
    wait_until_ready(
        mariadb.name(),
        &["mariadb-admin", "ping", "-uroot", "-prootpass", "--silent"],
    )
    .unwrap();
    wait_until_ready(redis.name(), &["redis-cli", "ping"]).unwrap();

    let ctx = TestContext::new();
    let manager = BackupManager::new(ctx.config(), RealDockerOps::new(TIMEOUT), None);

    let report = manager.run_pass().unwrap().unwrap();

    for name in [postgres.name(), mysql.name(), mariadb.name(), redis.name()] {
        assert!(
            report.backed_up.iter().any(|n| n == name),
            "{} missing from {:?}",
            name,
            report
        );
    }

    let pg_dump = fs::read_to_string(ctx.backup_path("dab-it-postgres.sql")).unwrap();
    assert!(pg_dump.contains("PostgreSQL database cluster dump"));

    let mysql_dump = fs::read_to_string(ctx.backup_path("dab-it-mysql.sql")).unwrap();
    assert!(mysql_dump.contains("MySQL dump"));

    let maria_dump = fs::read_to_string(ctx.backup_path("dab-it-mariadb.sql")).unwrap();
    assert!(maria_dump.contains("MariaDB dump"));

    let rdb = fs::read(ctx.backup_path("dab-it-redis.rdb")).unwrap();
    assert!(rdb.starts_with(b"REDIS"));

    assert!(ctx.backup_files().iter().all(|f| !f.ends_with(".tmp")));
}

#[test]
#[ignore]
fn test_backup_compressed_postgres() {
    if !is_docker_available() {
        eprintln!("Docker not available, skipping");
        return;
    }

    let postgres = start_container(
        "dab-it-postgres-xz",
        "postgres:16-alpine",
        &["POSTGRES_PASSWORD=testpass"],
    )
    .unwrap();
    wait_until_ready(postgres.name(), &["pg_isready", "-U", "postgres"]).unwrap();

    let ctx = TestContext::from_builder(ConfigBuilder::new().with_compression(Compression::Xz));
    let manager = BackupManager::new(ctx.config(), RealDockerOps::new(TIMEOUT), None);

    manager.run_pass().unwrap();

    let compressed = fs::read(ctx.backup_path("dab-it-postgres-xz.sql.xz")).unwrap();
    // xz magic
    assert!(compressed.starts_with(&[0xFD, b'7', b'z', b'X', b'Z', 0x00]));
}
