use std::{fmt::Display, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use lumber::{Builder, Logger, Options, WriteMode};

mod emit;
mod metric;
mod pipe;
mod time;

#[derive(Subcommand, Debug)]
pub enum LumberCmd {
    /// Log a message at error level.
    Error(emit::Cmd),

    /// Log a message at info level.
    Info(emit::Cmd),

    /// Log a message at debug level.
    Debug(emit::Cmd),

    Pipe(pipe::Cmd),

    Mark(metric::MarkCmd),

    Gauge(metric::GaugeCmd),

    Duration(metric::DurationCmd),

    Time(time::Cmd),
}

impl Display for LumberCmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LumberCmd::Error(_) => write!(f, "error"),
            LumberCmd::Info(_) => write!(f, "info"),
            LumberCmd::Debug(_) => write!(f, "debug"),
            LumberCmd::Pipe(_) => write!(f, "pipe"),
            LumberCmd::Mark(cmd) => write!(f, "mark {}", cmd.name),
            LumberCmd::Gauge(cmd) => write!(f, "gauge {}", cmd.name),
            LumberCmd::Duration(cmd) => write!(f, "duration {}", cmd.name),
            LumberCmd::Time(cmd) => write!(f, "time {}", cmd.name),
        }
    }
}

#[derive(Parser)]
#[command(version, long_version = "")]
#[command(about = "Write leveled log lines and metric events to stdout or per-category files.", long_about = None, disable_help_subcommand = true)]
pub struct Lumber {
    #[arg(
        global = true,
        long,
        help = "Directory receiving error.log, info.log, debug.log and metrics.log. Logs go to stdout when omitted.",
        display_order = 0
    )]
    pub dir: Option<PathBuf>,

    #[arg(
        global = true,
        long,
        help = "Minimum level to keep: error, info or debug. Anything else disables filtering.",
        display_order = 0
    )]
    pub level: Option<String>,

    #[arg(
        global = true,
        long,
        help = "Process name written into every line. Defaults to the host name.",
        display_order = 0
    )]
    pub name: Option<String>,

    #[arg(global = true, long, help = "Disable colored console output.")]
    pub no_colors: bool,

    #[arg(global = true, long, help = "Drop metric events.")]
    pub no_metrics: bool,

    #[arg(global = true, long, help = "Write every line to disk before returning.")]
    pub sync: bool,

    #[arg(
        long,
        short = 'v',
        action = clap::ArgAction::Count,
        global = true,
        help = "Write verbose messages to stderr for debugging.",
        display_order = 999
    )]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: LumberCmd,
}

impl Lumber {
    fn diagnostics_level(&self) -> Option<tracing::Level> {
        match self.verbose {
            0 => None,
            1 => Some(tracing::Level::INFO),
            2 => Some(tracing::Level::DEBUG),
            3_u8..=u8::MAX => Some(tracing::Level::TRACE),
        }
    }

    fn setup_diagnostics(&self) -> eyre::Result<()> {
        let Some(level) = self.diagnostics_level() else {
            return Ok(());
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| eyre::eyre!(e.to_string()))
    }

    fn options(&self) -> Options {
        let mut options = Options::new()
            .colors(!self.no_colors)
            .metrics(!self.no_metrics);

        if let Some(dir) = &self.dir {
            options = options.dir(dir);
        }
        if let Some(level) = &self.level {
            options = options.level(level);
        }
        if let Some(name) = &self.name {
            options = options.name(name);
        }

        options
    }

    fn build_logger(&self) -> eyre::Result<Logger> {
        let mode = if self.sync {
            WriteMode::Synchronous
        } else {
            WriteMode::Asynchronous
        };

        Builder::new()
            .with_options(self.options())
            .with_mode(mode)
            .build()
    }

    pub fn run(self) -> eyre::Result<ExitCode> {
        self.setup_diagnostics()?;

        let logger = self.build_logger()?;
        tracing::info!(target: "lumber", "running command {}", &self.cmd);

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let result = runtime.block_on(async {
            let result = self.invoke_sub_command(&logger).await;
            logger.close().await;
            result
        });

        if let Err(msg) = &result {
            tracing::error!(target: "lumber", "failed running command {}, error={} cause={}", &self.cmd, msg, msg.root_cause());
        }

        result
    }

    async fn invoke_sub_command(&self, logger: &Logger) -> eyre::Result<ExitCode> {
        match &self.cmd {
            LumberCmd::Error(cmd) => cmd.run(logger, lumber::Level::Error),
            LumberCmd::Info(cmd) => cmd.run(logger, lumber::Level::Info),
            LumberCmd::Debug(cmd) => cmd.run(logger, lumber::Level::Debug),
            LumberCmd::Pipe(cmd) => cmd.run(logger).await,
            LumberCmd::Mark(cmd) => cmd.run(logger),
            LumberCmd::Gauge(cmd) => cmd.run(logger),
            LumberCmd::Duration(cmd) => cmd.run(logger),
            LumberCmd::Time(cmd) => cmd.run(logger).await,
        }
    }
}
