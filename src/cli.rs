//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::json_report::JsonReportAdapter;
use crate::adapters::linear_trend::{FileModelStore, LinearTrendModel};
use crate::adapters::text_report::TextReportAdapter;
use crate::adapters::typst_report::TypstReportAdapter;
use crate::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_INVESTMENT};
use crate::domain::error::StockcastError;
use crate::domain::forecast::DEFAULT_FORECAST_DAYS;
use crate::domain::moving_average::{DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use crate::domain::pipeline;
use crate::domain::report::{backtest_report, prediction_report};
use crate::domain::validation::{
    DEFAULT_SYMBOL, normalize_symbol, parse_days, parse_initial_investment,
    validate_backtest_config, validate_forecast_config,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::prediction_port::PredictionStore;
use crate::ports::report_port::ReportPort;

#[cfg(feature = "sqlite")]
use crate::adapters::sqlite_adapter::SqliteAdapter;

#[cfg(feature = "sqlite")]
const DEFAULT_SOURCE: &str = "sqlite";
#[cfg(not(feature = "sqlite"))]
const DEFAULT_SOURCE: &str = "csv";

#[derive(Parser, Debug)]
#[command(
    name = "stockcast",
    about = "Moving-average crossover backtests and trend forecasts"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
    Typst,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest the moving-average crossover strategy
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        initial_investment: Option<String>,
        #[arg(long)]
        short_window: Option<usize>,
        #[arg(long)]
        long_window: Option<usize>,
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Forecast future closes with the stored trend model
    Predict {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        days: Option<String>,
        #[arg(long, value_enum)]
        format: Option<ReportFormat>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Do not store the predictions
        #[arg(long)]
        no_persist: bool,
    },
    /// Fit and save a linear trend model
    Train {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Import a CSV price file into the database
    Import {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long)]
        csv: PathBuf,
    },
    /// Show data range for symbol(s)
    Info {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
    },
    /// List symbols with stored prices
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
    },
}

impl Command {
    pub fn config_path(&self) -> &Path {
        match self {
            Command::Backtest { config, .. }
            | Command::Predict { config, .. }
            | Command::Train { config, .. }
            | Command::Import { config, .. }
            | Command::Info { config, .. }
            | Command::ListSymbols { config } => config,
        }
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            initial_investment,
            short_window,
            long_window,
            format,
            output,
        } => run_backtest(
            &config,
            &BacktestOverrides {
                symbol,
                initial_investment,
                short_window,
                long_window,
            },
            format,
            output.as_deref(),
        ),
        Command::Predict {
            config,
            symbol,
            days,
            format,
            output,
            no_persist,
        } => run_predict(
            &config,
            symbol.as_deref(),
            days.as_deref(),
            format,
            output.as_deref(),
            no_persist,
        ),
        Command::Train { config, symbol } => run_train(&config, symbol.as_deref()),
        Command::Import {
            config,
            symbol,
            csv,
        } => run_import(&config, &symbol, &csv),
        Command::Info { config, symbol } => run_info(&config, symbol.as_deref()),
        Command::ListSymbols { config } => run_list_symbols(&config),
    }
}

/// Level from `--log-level`, else `[logging] level` in the command's config.
pub fn resolve_log_level(cli: &Cli) -> Option<String> {
    cli.log_level.clone().or_else(|| {
        FileConfigAdapter::from_file(cli.command.config_path())
            .ok()
            .and_then(|c| c.get_string("logging", "level"))
    })
}

/// Install the global logger. Without an explicit level `RUST_LOG` applies,
/// defaulting to info.
pub fn init_logging(level: Option<&str>) {
    let mut builder = match level {
        Some(level) => {
            let mut builder = env_logger::Builder::new();
            builder.filter_level(parse_level(level));
            builder
        }
        None => env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")),
    };
    builder.format_timestamp(None);
    let _ = builder.try_init();
}

fn parse_level(level: &str) -> log::LevelFilter {
    match level.trim().to_lowercase().as_str() {
        "off" => log::LevelFilter::Off,
        "error" => log::LevelFilter::Error,
        "warn" => log::LevelFilter::Warn,
        "debug" => log::LevelFilter::Debug,
        "trace" => log::LevelFilter::Trace,
        _ => log::LevelFilter::Info,
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = StockcastError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: &StockcastError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

/// Price storage selected by `[data] source`.
pub enum Storage {
    Csv(CsvAdapter),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteAdapter),
}

impl Storage {
    pub fn data_port(&self) -> &dyn DataPort {
        match self {
            Storage::Csv(adapter) => adapter,
            #[cfg(feature = "sqlite")]
            Storage::Sqlite(adapter) => adapter,
        }
    }

    /// CSV storage is read-only, so only the database can keep predictions.
    pub fn prediction_store(&self) -> Option<&dyn PredictionStore> {
        match self {
            Storage::Csv(_) => None,
            #[cfg(feature = "sqlite")]
            Storage::Sqlite(adapter) => Some(adapter),
        }
    }
}

pub fn open_storage(config: &dyn ConfigPort) -> Result<Storage, StockcastError> {
    let source = config
        .get_string("data", "source")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

    match source.as_str() {
        "csv" => {
            let directory = config
                .get_string("csv", "directory")
                .unwrap_or_else(|| "data".to_string());
            log::debug!("reading prices from CSV files in {}", directory);
            Ok(Storage::Csv(CsvAdapter::new(PathBuf::from(directory))))
        }
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Storage::Sqlite(SqliteAdapter::from_config(config)?)),
        other => Err(StockcastError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unsupported data source '{}'", other),
        }),
    }
}

/// Explicitly requested symbols: the override, else `[backtest] symbols`,
/// else `[backtest] symbol`. Empty when none are configured.
pub fn configured_symbols(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, StockcastError> {
    if let Some(s) = symbol_override {
        return Ok(vec![normalize_symbol(s)?]);
    }

    if let Some(symbols_str) = config.get_string("backtest", "symbols") {
        let symbols: Vec<String> = symbols_str
            .split(',')
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !symbols.is_empty() {
            return Ok(symbols);
        }
    }

    if let Some(symbol) = config.get_string("backtest", "symbol") {
        let symbol = symbol.trim().to_uppercase();
        if !symbol.is_empty() {
            return Ok(vec![symbol]);
        }
    }

    Ok(vec![])
}

/// Like [`configured_symbols`], falling back to the default symbol.
pub fn resolve_symbols(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, StockcastError> {
    let symbols = configured_symbols(symbol_override, config)?;
    if symbols.is_empty() {
        return Ok(vec![DEFAULT_SYMBOL.to_string()]);
    }
    Ok(symbols)
}

#[derive(Debug, Default)]
pub struct BacktestOverrides {
    pub symbol: Option<String>,
    pub initial_investment: Option<String>,
    pub short_window: Option<usize>,
    pub long_window: Option<usize>,
}

pub fn build_backtest_config(
    config: &dyn ConfigPort,
    overrides: &BacktestOverrides,
) -> Result<BacktestConfig, StockcastError> {
    let initial_investment = match overrides.initial_investment.as_deref() {
        Some(raw) => parse_initial_investment(raw)?,
        None => config.get_double("backtest", "initial_investment", DEFAULT_INITIAL_INVESTMENT),
    };
    let short_window = overrides.short_window.unwrap_or_else(|| {
        config.get_int("backtest", "short_window", DEFAULT_SHORT_WINDOW as i64) as usize
    });
    let long_window = overrides.long_window.unwrap_or_else(|| {
        config.get_int("backtest", "long_window", DEFAULT_LONG_WINDOW as i64) as usize
    });

    Ok(BacktestConfig {
        initial_investment,
        short_window,
        long_window,
    })
}

pub fn resolve_days(days_override: Option<&str>, config: &dyn ConfigPort) -> Result<i64, StockcastError> {
    match days_override {
        Some(raw) => parse_days(raw),
        None => match config.get_string("forecast", "days") {
            Some(raw) => parse_days(&raw),
            None => Ok(DEFAULT_FORECAST_DAYS),
        },
    }
}

pub fn resolve_format(
    flag: Option<ReportFormat>,
    config: &dyn ConfigPort,
) -> Result<ReportFormat, StockcastError> {
    if let Some(format) = flag {
        return Ok(format);
    }
    match config.get_string("report", "format") {
        Some(raw) => ReportFormat::from_str(raw.trim(), true).map_err(|_| {
            StockcastError::ConfigInvalid {
                section: "report".into(),
                key: "format".into(),
                reason: format!("unknown format '{}' (expected text, json or typst)", raw.trim()),
            }
        }),
        None => Ok(ReportFormat::Text),
    }
}

/// Output file for one symbol. With several symbols the symbol is appended
/// to the file stem so reports do not overwrite each other.
pub fn output_for(base: &Path, symbol: &str, multiple: bool) -> PathBuf {
    if !multiple {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    let name = match base.extension() {
        Some(ext) => format!("{}_{}.{}", stem, symbol, ext.to_string_lossy()),
        None => format!("{}_{}", stem, symbol),
    };
    base.with_file_name(name)
}

fn resolve_output(
    flag: Option<&Path>,
    config: &dyn ConfigPort,
    format: ReportFormat,
) -> Option<PathBuf> {
    flag.map(Path::to_path_buf)
        .or_else(|| config.get_string("report", "output").map(PathBuf::from))
        .or_else(|| (format == ReportFormat::Typst).then(|| PathBuf::from("report.typ")))
}

fn report_port(format: ReportFormat) -> &'static dyn ReportPort {
    match format {
        ReportFormat::Text => &TextReportAdapter,
        ReportFormat::Json => &JsonReportAdapter,
        ReportFormat::Typst => &TypstReportAdapter,
    }
}

/// Write to `output` through the format's adapter when given; otherwise JSON
/// goes to stdout and text to stderr.
fn emit(
    reporter: &dyn ReportPort,
    content: &str,
    format: ReportFormat,
    output: Option<&Path>,
) -> Result<(), StockcastError> {
    match output {
        Some(path) => {
            reporter.write(content, path)?;
            eprintln!("Report written to: {}", path.display());
        }
        None if format == ReportFormat::Json => println!("{}", content),
        None => eprint!("{}", content),
    }
    Ok(())
}

fn run_backtest(
    config_path: &Path,
    overrides: &BacktestOverrides,
    format_flag: Option<ReportFormat>,
    output_flag: Option<&Path>,
) -> ExitCode {
    // Stage 1: Load and validate config
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(e) = validate_backtest_config(&config) {
        return fail(&e);
    }

    // Stage 2: Resolve parameters; CLI flags override the config
    let bt_config = match build_backtest_config(&config, overrides) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let symbols = match resolve_symbols(overrides.symbol.as_deref(), &config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let format = match resolve_format(format_flag, &config) {
        Ok(f) => f,
        Err(e) => return fail(&e),
    };
    let output = resolve_output(output_flag, &config, format);
    let reporter = report_port(format);

    // Stage 3: Open storage
    let storage = match open_storage(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    // Stage 4: Backtest each symbol and emit its report
    let mut completed = 0usize;
    let mut first_missing: Option<StockcastError> = None;
    for symbol in &symbols {
        let result = match pipeline::backtest_symbol(storage.data_port(), symbol, &bt_config) {
            Ok(r) => r,
            Err(e) if e.is_data_not_found() && symbols.len() > 1 => {
                log::warn!("skipping {}: {}", symbol, e);
                first_missing.get_or_insert(e);
                continue;
            }
            Err(e) => return fail(&e),
        };

        let report = backtest_report(&result);
        let rendered = match reporter.render_backtest(&report, &result) {
            Ok(r) => r,
            Err(e) => return fail(&e),
        };
        let target = output
            .as_deref()
            .map(|base| output_for(base, symbol, symbols.len() > 1));
        if let Err(e) = emit(reporter, &rendered, format, target.as_deref()) {
            return fail(&e);
        }
        completed += 1;
    }

    match (completed, first_missing) {
        (0, Some(e)) => fail(&e),
        _ => ExitCode::SUCCESS,
    }
}

fn run_predict(
    config_path: &Path,
    symbol: Option<&str>,
    days: Option<&str>,
    format_flag: Option<ReportFormat>,
    output_flag: Option<&Path>,
    no_persist: bool,
) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(e) = validate_forecast_config(&config) {
        return fail(&e);
    }

    // The horizon is checked before anything touches storage or models
    let days = match resolve_days(days, &config) {
        Ok(d) => d,
        Err(e) => return fail(&e),
    };
    let symbols = match resolve_symbols(symbol, &config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let format = match resolve_format(format_flag, &config) {
        Ok(f) => f,
        Err(e) => return fail(&e),
    };
    let output = resolve_output(output_flag, &config, format);
    let reporter = report_port(format);
    let persist = !no_persist && config.get_bool("forecast", "persist", true);

    let storage = match open_storage(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let store = if persist {
        storage.prediction_store()
    } else {
        None
    };
    if persist && store.is_none() {
        log::info!("data source cannot store predictions; not persisting");
    }
    let models = FileModelStore::from_config(&config);

    let mut completed = 0usize;
    let mut first_missing: Option<StockcastError> = None;
    for symbol in &symbols {
        let forecast =
            match pipeline::forecast_symbol(storage.data_port(), &models, store, symbol, days) {
                Ok(f) => f,
                Err(e) if e.is_data_not_found() && symbols.len() > 1 => {
                    log::warn!("skipping {}: {}", symbol, e);
                    first_missing.get_or_insert(e);
                    continue;
                }
                Err(e) => return fail(&e),
            };

        let report = prediction_report(symbol, &forecast.predictions);
        let rendered =
            match reporter.render_prediction(&report, &forecast.series, &forecast.predictions) {
                Ok(r) => r,
                Err(e) => return fail(&e),
            };
        let target = output
            .as_deref()
            .map(|base| output_for(base, symbol, symbols.len() > 1));
        if let Err(e) = emit(reporter, &rendered, format, target.as_deref()) {
            return fail(&e);
        }
        completed += 1;
    }

    match (completed, first_missing) {
        (0, Some(e)) => fail(&e),
        _ => ExitCode::SUCCESS,
    }
}

fn run_train(config_path: &Path, symbol: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let symbols = match resolve_symbols(symbol, &config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let storage = match open_storage(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let models = FileModelStore::from_config(&config);

    let mut completed = 0usize;
    let mut first_missing: Option<StockcastError> = None;
    for symbol in &symbols {
        let trained = pipeline::load_series(storage.data_port(), symbol)
            .and_then(|series| LinearTrendModel::fit(&series))
            .and_then(|model| models.save(symbol, &model).map(|path| (model, path)));
        match trained {
            Ok((model, path)) => {
                eprintln!(
                    "{}: slope {:.4}, intercept {:.4} over {} points -> {}",
                    symbol,
                    model.slope,
                    model.intercept,
                    model.trained_points,
                    path.display()
                );
                completed += 1;
            }
            Err(e) if e.is_data_not_found() && symbols.len() > 1 => {
                log::warn!("skipping {}: {}", symbol, e);
                first_missing.get_or_insert(e);
            }
            Err(e) => return fail(&e),
        }
    }

    match (completed, first_missing) {
        (0, Some(e)) => fail(&e),
        _ => ExitCode::SUCCESS,
    }
}

fn run_import(config_path: &Path, symbol: &str, csv_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let symbol = match normalize_symbol(symbol) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    #[cfg(feature = "sqlite")]
    {
        let adapter = match SqliteAdapter::from_config(&config) {
            Ok(a) => a,
            Err(e) => return fail(&e),
        };
        let rows = match CsvAdapter::read_file(csv_path, &symbol) {
            Ok(r) => r,
            Err(e) => return fail(&e),
        };
        match adapter.insert_prices(&rows) {
            Ok(inserted) => {
                eprintln!(
                    "{}: {} rows read, {} new, {} already stored",
                    symbol,
                    rows.len(),
                    inserted,
                    rows.len() - inserted
                );
                ExitCode::SUCCESS
            }
            Err(e) => fail(&e),
        }
    }

    #[cfg(not(feature = "sqlite"))]
    {
        let _ = (config, symbol, csv_path);
        eprintln!("error: sqlite feature is required for import");
        ExitCode::from(1)
    }
}

fn run_info(config_path: &Path, symbol: Option<&str>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let storage = match open_storage(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };
    let data_port = storage.data_port();

    let symbols = match configured_symbols(symbol, &config) {
        Ok(s) if !s.is_empty() => s,
        Ok(_) => match data_port.list_symbols() {
            Ok(s) => s,
            Err(e) => return fail(&e),
        },
        Err(e) => return fail(&e),
    };

    for s in &symbols {
        match data_port.get_data_range(s) {
            Ok(Some((first, last, count))) => {
                println!("{}: {} rows, {} to {}", s, count, first, last);
            }
            Ok(None) => eprintln!("{}: no data found", s),
            Err(e) => eprintln!("error querying {}: {}", s, e),
        }
    }
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &Path) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let storage = match open_storage(&config) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    let symbols = match storage.data_port().list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        eprintln!("{} symbols found", symbols.len());
    }
    ExitCode::SUCCESS
}
