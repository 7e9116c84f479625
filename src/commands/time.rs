use std::process::ExitCode;

use clap::Args;
use eyre::Context;
use lumber::Logger;

/// Run a program and emit a `time` metric for how long it took.
#[derive(Args, Debug)]
pub struct Cmd {
    #[arg(index = 1, help = "Metric name.")]
    pub name: String,

    #[arg(index = 2, last = true, required = true, value_name = "PROGRAM")]
    pub command: Vec<String>,
}

impl Cmd {
    pub async fn run(&self, logger: &Logger) -> eyre::Result<ExitCode> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or_else(|| eyre::eyre!("No program given to time"))?;

        let timer = logger.timer();
        let status = tokio::process::Command::new(program)
            .args(args)
            .status()
            .await
            .with_context(|| format!("Failed running {}", program))?;
        timer.done(&self.name)?;

        tracing::debug!(target: "lumber", "{} exited with {} after {:?}", program, status, timer.elapsed());

        // NOTE: signals have no exit code, report them as a generic failure.
        let code = status.code().unwrap_or(1);
        Ok(ExitCode::from(u8::try_from(code).unwrap_or(1)))
    }
}
