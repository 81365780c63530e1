//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_store_adapter::JsonStoreAdapter;
use crate::adapters::log_notifier::LogNotifier;
use crate::domain::calibration::{Calibration, Selected, short_list_message};
use crate::domain::candle::Lookback;
use crate::domain::error::DayTraderError;
use crate::domain::selector::{SHORT_LIST_LABEL, StrategyBook};
use crate::domain::settings::Settings;
use crate::domain::strategy::parse_id;
use crate::ports::notifier_port::NotifierPort;
use crate::ports::strategy_store_port::StrategyStorePort;

#[derive(Parser, Debug)]
#[command(name = "daytrader", about = "Intraday strategy calibration for BULL/BEAR certificates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CalibrationRun {
    /// Enumerate every strategy over the long lookback
    Update,
    /// Re-test the long list and pick the short-list
    Test,
    /// Re-rank the short-list over the last hours
    Adjust,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run one calibration step
    Calibrate {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(value_enum)]
        run: CalibrationRun,
    },
    /// Print persisted strategy lists
    Strategies {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        label: Option<String>,
    },
    /// Validate a settings file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the conditions available for a data window
    Conditions {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long, default_value = "1d")]
        lookback: Lookback,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Calibrate { config, run } => run_calibrate(&config, run),
        Command::Strategies { config, label } => run_strategies(&config, label.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Conditions { config, lookback } => run_conditions(&config, lookback),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

/// Load and validate settings, reporting failures on stderr.
pub fn load_settings(path: &PathBuf) -> Result<Settings, ExitCode> {
    let config = load_config(path)?;
    Settings::from_config(&config).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })
}

fn run_calibrate(config_path: &PathBuf, run: CalibrationRun) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let market = CsvAdapter::new(settings.calibration.data_dir.clone());
    let store = JsonStoreAdapter::new(settings.calibration.store_path.clone());
    let calibration = Calibration::new(&settings, &market, &store);

    let result = match run {
        CalibrationRun::Update => calibration.update(),
        CalibrationRun::Test => calibration.test(),
        CalibrationRun::Adjust => calibration.adjust(),
    };
    let selected = match result {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_selected(&selected);
    eprintln!("{} strategies stored in {}", selected.len(), store.path().display());

    if run == CalibrationRun::Test {
        LogNotifier.notify(&short_list_message(&selected));
    }
    ExitCode::SUCCESS
}

fn print_selected(selected: &[Selected]) {
    for (rank, entry) in selected.iter().enumerate() {
        println!("{:>4}. {}", rank + 1, entry);
    }
}

fn run_strategies(config_path: &PathBuf, label: Option<&str>) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let store = JsonStoreAdapter::new(settings.calibration.store_path.clone());
    let book = match store.load() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match label {
        Some(label) => {
            let list = book.list(label);
            if list.is_empty() {
                eprintln!("No strategies stored under '{}'", label);
            }
            for summary in list {
                println!("{}", summary);
            }
        }
        None => print_book(&book),
    }
    ExitCode::SUCCESS
}

fn print_book(book: &StrategyBook) {
    for label in book.labels() {
        println!("[{}]", label);
        for summary in book.list(label) {
            println!("  {}", summary);
        }
    }
    if !book.indicator_usage.is_empty() {
        println!("[indicator usage]");
        for usage in &book.indicator_usage {
            println!("  {}", usage);
        }
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating settings: {}", config_path.display());
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };

    eprintln!("  monitoring: {}", settings.instruments.monitoring);
    eprintln!(
        "  bull / bear: {} / {}",
        settings.instruments.bull, settings.instruments.bear
    );
    eprintln!("  budget: {}", settings.trading.budget);

    // The short-list is what a trading session would load.
    let store = JsonStoreAdapter::new(settings.calibration.store_path.clone());
    let book = match store.load() {
        Ok(b) => b,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    for id in book.ids(SHORT_LIST_LABEL) {
        if let Err(e) = parse_id(&id) {
            eprintln!("error: invalid stored strategy:\n{}", e.display_with_context(&id));
            return (&DayTraderError::from(e)).into();
        }
    }

    eprintln!("\nSettings are valid.");
    ExitCode::SUCCESS
}

fn run_conditions(config_path: &PathBuf, lookback: Lookback) -> ExitCode {
    let settings = match load_settings(config_path) {
        Ok(s) => s,
        Err(code) => return code,
    };
    let market = CsvAdapter::new(settings.calibration.data_dir.clone());
    let store = JsonStoreAdapter::new(settings.calibration.store_path.clone());
    let calibration = Calibration::new(&settings, &market, &store);

    let conditions = match calibration.conditions(lookback) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    for condition in conditions.iter() {
        println!("{}", condition);
    }
    eprintln!("{} conditions available over {}", conditions.len(), lookback);
    ExitCode::SUCCESS
}
