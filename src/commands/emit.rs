use std::process::ExitCode;

use clap::Args;
use lumber::{Level, Logger};

#[derive(Args, Debug)]
pub struct Cmd {
    #[arg(index = 1, value_name = "MESSAGE", num_args = 0.., help = "Message to log. Multiple words are joined by spaces.")]
    pub message: Vec<String>,
}

impl Cmd {
    pub fn run(&self, logger: &Logger, level: Level) -> eyre::Result<ExitCode> {
        logger.log(level, &self.message.join(" "))?;
        Ok(ExitCode::SUCCESS)
    }
}
