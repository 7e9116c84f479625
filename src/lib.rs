//! Process-local structured logging and metrics.
//!
//! Log lines and metric events are formatted, routed to stdout or to one
//! append-only file per category (`error.log`, `info.log`, `debug.log`,
//! `metrics.log`) and written either buffered or synchronously. `shutdown`
//! drains every open file before signalling completion; anything emitted
//! afterwards is appended synchronously so no event is dropped.
//!
//! ```no_run
//! use lumber::{Logger, Options};
//!
//! # fn main() -> eyre::Result<()> {
//! let logger = Logger::new()?;
//! logger.reconfigure(Options::new().dir("/tmp/x").level("info"))?;
//!
//! logger.debug("hidden")?;
//! logger.info("shown")?;
//! logger.mark("request")?;
//! logger.time(|timer| timer.done("op"))?;
//!
//! logger.close_blocking();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod level;
pub mod logging;

pub use config::{Config, Options};
pub use level::Level;
pub use logging::{
    Builder, Category, ConsoleSink, DefaultFormatter, LifecycleState, LogFormatter, LogSink,
    Logger, MetricKind, Target, Timer, WriteMode,
};
