//! CLI integration tests against settings, CSV candles and a store on disk.
//!
//! Tests cover:
//! - Argument parsing and settings loading
//! - `validate`, including stored strategy identifiers
//! - `calibrate update` writing the JSON store, then `strategies`
//! - `conditions` over CSV history
//! - Exit codes of the error classes

mod common;

use common::*;
use daytrader::cli::{self, Cli};
use clap::Parser;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;

fn exit_report(code: ExitCode) -> String {
    format!("{code:?}")
}

fn assert_exit(code: ExitCode, expected: u8) {
    assert_eq!(exit_report(code), exit_report(ExitCode::from(expected)));
}

fn write_settings(dir: &Path, extra: &str) -> PathBuf {
    let content = format!(
        "{SETTINGS_INI}\n[calibration]\ndata_dir = {}\nstore_path = {}\n{extra}",
        dir.join("data").display(),
        dir.join("store/strategies.json").display(),
    );
    let path = dir.join("daytrader.ini");
    fs::write(&path, content).unwrap();
    path
}

fn write_candles(dir: &Path) {
    let data = dir.join("data");
    fs::create_dir_all(&data).unwrap();
    let mut csv = String::from("timestamp,open,high,low,close,volume\n");
    for c in wavy_sessions(&[2, 3, 6]) {
        writeln!(
            csv,
            "{},{},{},{},{},{}",
            c.timestamp.format("%Y-%m-%d %H:%M:%S"),
            c.open,
            c.high,
            c.low,
            c.close,
            c.volume
        )
        .unwrap();
    }
    fs::write(data.join("OMXS30_1m.csv"), csv).unwrap();
}

fn run(args: &[&str]) -> ExitCode {
    let mut argv = vec!["daytrader"];
    argv.extend_from_slice(args);
    cli::run(Cli::try_parse_from(argv).unwrap())
}

mod settings_loading {
    use super::*;

    #[test]
    fn load_settings_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(dir.path(), "");
        let settings = cli::load_settings(&path).unwrap();
        assert_eq!(settings.instruments.bull, BULL);
        assert_eq!(settings.calibration.data_dir, dir.path().join("data"));
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let code = run(&["validate", "--config", "/nonexistent/daytrader.ini"]);
        assert_exit(code, 2);
    }

    #[test]
    fn invalid_value_is_a_config_error() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(dir.path(), "adjust_limit_hours = 0\n");
        assert_exit(run(&["validate", "-c", path.to_str().unwrap()]), 2);
    }
}

mod validate {
    use super::*;

    #[test]
    fn valid_settings_pass() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(dir.path(), "");
        assert_exit(run(&["validate", "-c", path.to_str().unwrap()]), 0);
    }

    #[test]
    fn broken_stored_identifier_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(dir.path(), "");
        fs::create_dir_all(dir.path().join("store")).unwrap();
        fs::write(
            dir.path().join("store/strategies.json"),
            r#"{"version": 1, "lists": {"use": [{"strategy": "(Trend PSAR", "points": 1, "profit": 101, "efficiency": 50}]}}"#,
        )
        .unwrap();
        assert_exit(run(&["validate", "-c", path.to_str().unwrap()]), 4);
    }

    #[test]
    fn unreadable_store_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(dir.path(), "");
        fs::create_dir_all(dir.path().join("store")).unwrap();
        fs::write(dir.path().join("store/strategies.json"), "not json").unwrap();
        assert_exit(run(&["validate", "-c", path.to_str().unwrap()]), 6);
    }
}

mod calibrate {
    use super::*;

    #[test]
    fn update_writes_the_store() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(dir.path(), "");
        write_candles(dir.path());

        assert_exit(run(&["calibrate", "-c", path.to_str().unwrap(), "update"]), 0);

        let raw: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("store/strategies.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(raw["version"], 1);
        assert!(raw["lists"]["30d"].is_array());

        assert_exit(run(&["strategies", "-c", path.to_str().unwrap()]), 0);
        assert_exit(
            run(&["strategies", "-c", path.to_str().unwrap(), "--label", "30d"]),
            0,
        );
    }

    #[test]
    fn missing_candles_are_a_market_data_error() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(dir.path(), "");
        assert_exit(run(&["calibrate", "-c", path.to_str().unwrap(), "test"]), 3);
    }
}

mod conditions {
    use super::*;

    #[test]
    fn lists_conditions_for_the_window() {
        let dir = TempDir::new().unwrap();
        let path = write_settings(dir.path(), "");
        write_candles(dir.path());
        assert_exit(
            run(&["conditions", "-c", path.to_str().unwrap(), "--lookback", "3d"]),
            0,
        );
    }
}
