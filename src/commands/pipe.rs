use std::process::ExitCode;

use clap::Args;
use eyre::Context;
use lumber::{Level, Logger};
use tokio::io::{AsyncBufReadExt, BufReader};

fn parse_level(level: &str) -> eyre::Result<Level> {
    level.parse()
}

/// Log every line read from stdin.
#[derive(Args, Debug)]
pub struct Cmd {
    #[arg(long = "as", value_parser = parse_level, default_value = "info", help = "Level used for every line: error, info or debug.")]
    pub as_level: Level,
}

impl Cmd {
    pub async fn run(&self, logger: &Logger) -> eyre::Result<ExitCode> {
        tracing::info!(target: "lumber", "piping stdin at {}", self.as_level);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        let mut count = 0;
        while let Some(line) = lines
            .next_line()
            .await
            .context("Failed reading from stdin")?
        {
            logger.log(self.as_level, &line)?;
            count += 1;
        }

        tracing::debug!(target: "lumber", "piped {} line(s)", count);
        Ok(ExitCode::SUCCESS)
    }
}
