//! The `iris test-connection` command.

use clap::Args;
use iris_core::{Analyzer, Config, ConfigUpdate};

use super::types::ModeArg;

/// Arguments for the `test-connection` command.
#[derive(Args, Debug)]
pub struct TestConnectionArgs {
    /// Backend to check (defaults to the configured mode)
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,
}

/// Execute the test-connection command.
pub async fn execute(args: TestConnectionArgs, config: Config) -> anyhow::Result<()> {
    let analyzer = Analyzer::new(config)?;
    if let Some(mode) = args.mode {
        analyzer.update_config(&ConfigUpdate::mode(mode.into()))?;
    }

    let result = analyzer.test_connection().await;
    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.success {
        anyhow::bail!("{} backend is not reachable: {}", result.mode, result.message);
    }
    Ok(())
}
