// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::PathBuf;

use asstools::app_config::{self, Config};
use asstools::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the batch jobs (default command)
    Run(RunArgs),

    /// Write a configuration file holding the default values
    InitConfig {
        /// Where to write the configuration
        #[arg(value_name = "PATH", default_value = "asstools.json")]
        path: PathBuf,

        /// Replace an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Generate shell completions for asstools
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone, Default)]
struct RunArgs {
    /// JSON configuration file; command line options override its values
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Input .ass files or directories [default: current directory]
    #[arg(short, long = "input", value_name = "PATH", num_args = 0..)]
    inputs: Option<Vec<PathBuf>>,

    /// Output directories, paired with inputs by position [default: <input>/new]
    #[arg(short, long = "output", value_name = "DIR", num_args = 0..)]
    outputs: Option<Vec<PathBuf>>,

    /// Send every input to the first output directory
    #[arg(long)]
    limited_output: bool,

    /// Export events to text files grouped by a field
    #[arg(short = 'e', long = "export", visible_alias = "exp-smp")]
    export: bool,

    /// Field used to group exported events [default: Style]
    #[arg(long, value_name = "FIELD_NAME")]
    field_name: Option<String>,

    /// First line of every exported file; pass an empty string for none
    #[arg(long = "custom-msg", value_name = "STRING")]
    custom_message: Option<String>,

    /// Field contents selecting exported events; give no value to export every value
    #[arg(long, value_name = "FIELD_CONTENT", num_args = 0..)]
    filter: Option<Vec<String>>,

    /// Output name tails paired with --filter; give no value to use the field contents
    #[arg(long, value_name = "STRING", num_args = 0..)]
    name_tails: Option<Vec<String>>,

    /// Also export every field but the text into "_t" files
    #[arg(long)]
    text_excluded: bool,

    /// Name exported files "E" + the first number of the input name
    #[arg(long)]
    rename_number: bool,

    /// Keep {...} override codes in exported text
    #[arg(long)]
    keep_override_code: bool,

    /// Write in the input's encoding (CRLF for exports) instead of UTF-8 with LF
    #[arg(long = "no-forced-encoding")]
    keep_source_encoding: bool,

    /// Delete sections from the input files
    #[arg(short = 'd', long = "delete", visible_alias = "del-sect")]
    delete: bool,

    /// Section names to delete, brackets included [default: "[Aegisub Project Garbage]"]
    #[arg(long = "sect-name", value_name = "SECTION_NAME", num_args = 1..)]
    sections: Option<Vec<String>>,

    /// Name tail of files written by --delete [default: _new]
    #[arg(long, value_name = "STRING")]
    name_tail: Option<String>,

    /// Let --delete overwrite the input files
    #[arg(long)]
    overwrite: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// asstools - batch processing for ASS subtitle files
#[derive(Parser, Debug)]
#[command(name = "asstools")]
#[command(version)]
#[command(about = "Batch processing for Advanced SubStation Alpha (ASS) subtitle files")]
#[command(long_about = "asstools exports ASS events to plain text files split by a field, and deletes sections from ASS files.

EXAMPLES:
    asstools -e -i subs/                              # Export Chinese/English styles to subs/new
    asstools -e --filter -i subs/                     # One file per distinct Style
    asstools -e --field-name Name --filter Alice Bob --name-tails _A _B
    asstools -d -i subs/ --overwrite                  # Remove [Aegisub Project Garbage] in place
    asstools -c asstools.json                         # Run with a configuration file
    asstools init-config asstools.json                # Write the default configuration
    asstools completions bash > asstools.bash         # Generate bash completions")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    run: RunArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

fn main() -> Result<()> {
    // Install the logger accepting everything; the effective level is set below
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "asstools", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::InitConfig { path, force }) => init_config(path, force),
        Some(Commands::Run(args)) => run(args),
        None => run(cli.run),
    }
}

fn init_config(path: PathBuf, force: bool) -> Result<()> {
    if path.exists() && !force {
        warn!("{} already exists, use --force to replace it", path.display());
        return Ok(());
    }
    Config::default().save(&path)?;
    info!("Default configuration written to {}", path.display());
    Ok(())
}

fn run(args: RunArgs) -> Result<()> {
    if let Some(level) = &args.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level_filter(&level));
    }

    let mut config = match &args.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Configuration loaded from {}", path.display());
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, args.clone());
    config.validate().context("Configuration validation failed")?;

    if args.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    let controller = Controller::with_config(config)?;
    let summary = controller.run()?;

    if summary.failed > 0 {
        warn!("{} file(s) could not be processed", summary.failed);
    }

    Ok(())
}

// Command line values win over the configuration file
fn apply_overrides(config: &mut Config, args: RunArgs) {
    if let Some(inputs) = args.inputs {
        config.inputs = if inputs.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            inputs
        };
    }
    if let Some(outputs) = args.outputs {
        config.outputs = outputs;
    }
    config.limited_output |= args.limited_output;

    config.export.enabled |= args.export;
    if let Some(field_name) = args.field_name {
        config.export.field_name = field_name;
    }
    if let Some(message) = args.custom_message {
        config.export.custom_message = Some(message);
    }
    if let Some(filter) = args.filter {
        config.export.filter = filter;
    }
    if let Some(name_tails) = args.name_tails {
        config.export.name_tails = name_tails;
    }
    config.export.text_excluded |= args.text_excluded;
    config.export.rename_number |= args.rename_number;
    config.export.keep_override_code |= args.keep_override_code;
    config.output.keep_source_encoding |= args.keep_source_encoding;

    config.delete.enabled |= args.delete;
    if let Some(sections) = args.sections {
        config.delete.sections = sections;
    }
    if let Some(name_tail) = args.name_tail {
        config.delete.name_tail = name_tail;
    }
    config.delete.overwrite |= args.overwrite;

    if let Some(level) = args.log_level {
        config.log_level = level.into();
    }
}
