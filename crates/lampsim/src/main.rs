mod cli;
mod paths;
mod run;
mod scene;

use anyhow::Result;
use cli::{Command, ConfigAction};

fn main() -> Result<()> {
    let cli = cli::parse();
    run::initialise_tracing();

    match cli.command {
        Command::Simulate(args) => run::simulate(args),
        Command::Resolve(args) => run::resolve(args),
        Command::Config(config) => match config.action {
            ConfigAction::Check { file } => run::config_check(&file),
            ConfigAction::Where => run::config_where(),
        },
    }
}
