//! Tests for the download subcommand.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use std::path::Path;

#[test]
fn cli_parse_download_defaults() {
    match parse(&["chunkzip", "download", "akismet"]) {
        CliCommand::Download {
            slug,
            worker_url,
            output_dir,
        } => {
            assert_eq!(slug, "akismet");
            assert!(worker_url.is_none());
            assert!(output_dir.is_none());
        }
        _ => panic!("expected Download"),
    }
}

#[test]
fn cli_parse_download_short_worker_url() {
    match parse(&["chunkzip", "download", "akismet", "-w", "http://10.0.0.2:8787"]) {
        CliCommand::Download { worker_url, .. } => {
            assert_eq!(worker_url.as_deref(), Some("http://10.0.0.2:8787"));
        }
        _ => panic!("expected Download with -w"),
    }
}

#[test]
fn cli_parse_download_long_options() {
    match parse(&[
        "chunkzip",
        "download",
        "hello-dolly",
        "--worker-url",
        "http://w",
        "--output-dir",
        "/tmp/zips",
    ]) {
        CliCommand::Download {
            slug,
            worker_url,
            output_dir,
        } => {
            assert_eq!(slug, "hello-dolly");
            assert_eq!(worker_url.as_deref(), Some("http://w"));
            assert_eq!(output_dir.as_deref(), Some(Path::new("/tmp/zips")));
        }
        _ => panic!("expected Download with options"),
    }
}

#[test]
fn cli_download_requires_slug() {
    assert!(Cli::try_parse_from(["chunkzip", "download"]).is_err());
}
