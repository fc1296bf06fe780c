//! Tests for serve, checksum, purge.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_serve() {
    match parse(&["chunkzip", "serve"]) {
        CliCommand::Serve { listen } => assert!(listen.is_none()),
        _ => panic!("expected Serve"),
    }
}

#[test]
fn cli_parse_serve_listen() {
    match parse(&["chunkzip", "serve", "--listen", "0.0.0.0:9000"]) {
        CliCommand::Serve { listen } => assert_eq!(listen.as_deref(), Some("0.0.0.0:9000")),
        _ => panic!("expected Serve with --listen"),
    }
}

#[test]
fn cli_parse_checksum() {
    match parse(&["chunkzip", "checksum", "downloads/akismet.zip"]) {
        CliCommand::Checksum { path } => {
            assert_eq!(path, Path::new("downloads/akismet.zip"));
        }
        _ => panic!("expected Checksum"),
    }
}

#[test]
fn cli_parse_purge() {
    match parse(&["chunkzip", "purge", "akismet"]) {
        CliCommand::Purge { slug } => assert_eq!(slug, "akismet"),
        _ => panic!("expected Purge"),
    }
}

#[test]
fn cli_rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["chunkzip", "status"]).is_err());
}

#[test]
fn serve_logs_as_worker_everything_else_as_client() {
    use chunkzip_core::logging::LogRole;
    assert_eq!(parse(&["chunkzip", "serve"]).log_role(), LogRole::Worker);
    assert_eq!(
        parse(&["chunkzip", "download", "demo"]).log_role(),
        LogRole::Client
    );
    assert_eq!(parse(&["chunkzip", "purge", "demo"]).log_role(), LogRole::Client);
}
