use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "lampsim",
    author,
    version,
    about = "Magic lamp minimize effect simulator"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Animate one window of a scene and print every frame.
    Simulate(SimulateArgs),
    /// Print direction, bump distance and shape factor for every window.
    Resolve(ResolveArgs),
    /// Inspect configuration files.
    Config(ConfigCommand),
}

#[derive(Parser, Debug)]
pub struct SceneArgs {
    /// Scene TOML describing screens, docks and windows.
    #[arg(long, value_name = "FILE")]
    pub scene: PathBuf,

    /// Effect configuration; defaults to the discovered config file when present.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    /// Window to animate; defaults to the first non-dock window in the scene.
    #[arg(long, value_name = "ID")]
    pub window: Option<u64>,

    #[arg(long, value_enum, default_value_t = Kind::Minimize)]
    pub kind: Kind,

    /// Frames per second driving the animation.
    #[arg(long, value_name = "FPS", default_value_t = 60.0, value_parser = parse_fps)]
    pub fps: f64,

    /// Trigger the opposite animation after this many milliseconds.
    #[arg(long, value_name = "MILLISECONDS")]
    pub reverse_after: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub scene: SceneArgs,
}

#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Parse and validate a configuration file.
    Check {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the configuration directory and file that would be loaded.
    Where,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Kind {
    Minimize,
    Unminimize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    /// One JSON object per line.
    Json,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_fps(value: &str) -> Result<f64, String> {
    let fps: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid frame rate '{value}'"))?;
    if !fps.is_finite() || fps <= 0.0 {
        return Err(format!("frame rate must be positive, got {fps}"));
    }
    if fps > 1000.0 {
        return Err(format!("frame rate must not exceed 1000, got {fps}"));
    }
    Ok(fps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn fps_must_be_positive() {
        assert_eq!(parse_fps("60"), Ok(60.0));
        assert_eq!(parse_fps(" 29.97 "), Ok(29.97));
        assert!(parse_fps("0").is_err());
        assert!(parse_fps("-5").is_err());
        assert!(parse_fps("inf").is_err());
        assert!(parse_fps("fast").is_err());
        assert!(parse_fps("5000").is_err());
    }

    #[test]
    fn simulate_defaults() {
        let cli = Cli::try_parse_from(["lampsim", "simulate", "--scene", "scene.toml"]).unwrap();
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.kind, Kind::Minimize);
        assert_eq!(args.fps, 60.0);
        assert_eq!(args.scene.format, OutputFormat::Text);
        assert!(args.scene.config.is_none());
        assert!(args.reverse_after.is_none());
    }
}
