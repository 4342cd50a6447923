//! Command tests for db-auto-backup
//!
//! These tests verify the behavior behind each CLI command using mocked
//! Docker operations.

mod run;
mod validate;
