//! Unit tests for image name extraction and provider resolution

use db_auto_backup::providers::{resolve_provider, DumpOptions, Provider, PROVIDERS};
use db_auto_backup::utils::image::container_names;
use rstest::rstest;
use std::collections::HashMap;
use test_utils::{container, untagged_container};

#[rstest]
#[case("postgres:14-alpine", "postgres")]
#[case("docker.io/library/postgres:14", "postgres")]
#[case("ghcr.io/immich-app/postgres:14-vectorchord0.3.0", "immich-app/postgres")]
#[case("localhost:5000/mariadb:11@sha256:abcdef", "mariadb")]
#[case("tensorchord/pgvecto-rs:pg14-v0.2.0", "tensorchord/pgvecto-rs")]
#[case("lscr.io/linuxserver/mariadb:latest", "linuxserver/mariadb")]
fn test_image_name_extraction(#[case] image: &str, #[case] expected: &str) {
    let names = container_names(&[image.to_string()], image, "some-container");
    assert_eq!(names, vec![expected.to_string()]);
}

#[rstest]
#[case("postgres:16", Some(Provider::Postgres))]
#[case("pgvector/pgvector:pg16", Some(Provider::Postgres))]
#[case("timescale/timescaledb:latest-pg16", Some(Provider::Postgres))]
#[case("nextcloud/aio-postgresql:latest", Some(Provider::Postgres))]
#[case("pgautoupgrade/pgautoupgrade:16-alpine", Some(Provider::Postgres))]
#[case("ghcr.io/immich-app/postgres:14", Some(Provider::Postgres))]
#[case("mysql:8", Some(Provider::Mysql))]
#[case("mariadb:11", Some(Provider::Mysql))]
#[case("linuxserver/mariadb", Some(Provider::Mysql))]
#[case("redis:7", Some(Provider::Redis))]
#[case("nginx:latest", None)]
#[case("bitnami/postgresql:16", None)]
fn test_resolver_table(#[case] image: &str, #[case] expected: Option<Provider>) {
    let names = container("c", image).candidate_names();
    assert_eq!(resolve_provider(&names), expected);
}

#[test]
fn test_untagged_image_falls_back_to_raw_image() {
    let c = untagged_container("db", "postgres@sha256:0123456789abcdef");
    assert_eq!(resolve_provider(&c.candidate_names()), Some(Provider::Postgres));
}

#[test]
fn test_first_matching_tag_wins() {
    let c = test_utils::ContainerInfo {
        image_tags: vec!["my-registry.local/custom:1".to_string(), "redis:7".to_string()],
        ..container("cache", "custom")
    };
    assert_eq!(resolve_provider(&c.candidate_names()), Some(Provider::Redis));
}

#[test]
fn test_registry_order_and_extensions() {
    let names: Vec<&str> = PROVIDERS.iter().map(|p| p.name()).collect();
    assert_eq!(names, vec!["postgres", "mysql", "redis"]);

    assert_eq!(Provider::Postgres.file_extension(), "sql");
    assert_eq!(Provider::Mysql.file_extension(), "sql");
    assert_eq!(Provider::Redis.file_extension(), "rdb");
}

#[test]
fn test_clean_option_reaches_every_sql_dump() {
    let mut env = HashMap::new();
    env.insert("MYSQL_ROOT_PASSWORD".to_string(), "x".to_string());
    let options = DumpOptions { clean: true };

    let postgres = Provider::Postgres.build_command(&env, &options).unwrap();
    let mysql = Provider::Mysql.build_command(&env, &options).unwrap();
    let redis = Provider::Redis.build_command(&env, &options).unwrap();

    assert!(postgres.contains("--clean"));
    assert!(mysql.contains("--add-drop-database"));
    assert!(!redis.contains("--"));
}
