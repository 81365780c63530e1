//! INI settings file adapter.
//!
//! Keys are case-insensitive. Booleans accept `true/false`, `yes/no`,
//! `on/off` and `1/0`.

use crate::domain::error::DayTraderError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, DayTraderError> {
        let path = path.as_ref();
        let mut config = Ini::new();
        config.load(path).map_err(|reason| DayTraderError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, DayTraderError> {
        let mut config = Ini::new();
        config
            .read(content.to_string())
            .map_err(|reason| DayTraderError::ConfigParse {
                file: "<inline>".to_string(),
                reason,
            })?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_ref()
            .and_then(|v| Self::parse_bool(v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    const SETTINGS: &str = r#"
[instruments]
monitoring = OMXS30
bull = 1001
bear = 1002
account = 42

[trading]
budget = 5000.0
poll_interval_secs = 30

[session]
day = 10:00

[calibration]
trade_limits = yes
"#;

    #[test]
    fn from_string_parses_config() {
        let adapter = FileConfigAdapter::from_string(SETTINGS).unwrap();
        assert_eq!(
            adapter.get_string("instruments", "monitoring"),
            Some("OMXS30".to_string())
        );
        assert_eq!(
            adapter.get_string("instruments", "bear"),
            Some("1002".to_string())
        );
    }

    #[test]
    fn time_values_keep_their_colon() {
        let adapter = FileConfigAdapter::from_string(SETTINGS).unwrap();
        assert_eq!(adapter.get_string("session", "day"), Some("10:00".to_string()));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string(SETTINGS).unwrap();
        assert_eq!(adapter.get_string("trading", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_value_or_default() {
        let adapter = FileConfigAdapter::from_string(SETTINGS).unwrap();
        assert_eq!(adapter.get_int("trading", "poll_interval_secs", 60), 30);
        assert_eq!(adapter.get_int("trading", "missing", 42), 42);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[retry]\nmax_attempts = abc\n").unwrap();
        assert_eq!(adapter.get_int("retry", "max_attempts", 3), 3);
    }

    #[test]
    fn get_double_returns_value_or_default() {
        let adapter = FileConfigAdapter::from_string(SETTINGS).unwrap();
        assert_eq!(adapter.get_double("trading", "budget", 0.0), 5000.0);
        assert_eq!(adapter.get_double("trading", "stop_loss", 0.98), 0.98);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[trading]\nbudget = plenty\n").unwrap();
        assert_eq!(adapter.get_double("trading", "budget", 99.9), 99.9);
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[calibration]\na = true\nb = no\nc = 1\nd = off\ne = On\n",
        )
        .unwrap();
        assert!(adapter.get_bool("calibration", "a", false));
        assert!(!adapter.get_bool("calibration", "b", true));
        assert!(adapter.get_bool("calibration", "c", false));
        assert!(!adapter.get_bool("calibration", "d", true));
        assert!(adapter.get_bool("calibration", "e", false));
        assert!(adapter.get_bool("calibration", "missing", true));

        let adapter = FileConfigAdapter::from_string(SETTINGS).unwrap();
        assert!(adapter.get_bool("calibration", "trade_limits", false));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[calibration]\nstore_path = /var/lib/dt/strategies.json\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("calibration", "store_path"),
            Some("/var/lib/dt/strategies.json".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/daytrader.ini");
        match result {
            Err(DayTraderError::ConfigParse { file, .. }) => {
                assert_eq!(file, "/nonexistent/path/daytrader.ini")
            }
            _ => panic!("expected a config parse error"),
        }
    }
}
