use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::engine::{Fidelity, SituationInput};

/// Fourth-down decision engine: go for it, kick or punt
#[derive(Parser, Debug, Clone)]
#[command(name = "fourth-down", version, about)]
pub struct Config {
    /// Directory holding the empirical CSV tables
    #[arg(long, env = "DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory holding the trained model JSON files (defaults to the data dir)
    #[arg(long, env = "MODELS_DIR")]
    pub models_dir: Option<PathBuf>,

    /// Punt and field-goal model variant
    #[arg(long, env = "FIDELITY", value_enum, default_value_t = Fidelity::Full)]
    pub fidelity: Fidelity,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Evaluate one situation and print the result as JSON
    Evaluate(SituationArgs),
    /// Serve the HTTP API
    Serve {
        /// API listen address
        #[arg(long, env = "API_ADDR", default_value = "0.0.0.0:5000")]
        addr: String,
    },
}

#[derive(Args, Debug, Clone)]
pub struct SituationArgs {
    /// Yard line, 1 to 50, on the side given by --side
    #[arg(long)]
    pub yardline: i64,

    /// Which half of the field the ball is in: own or opponent
    #[arg(long, default_value = "own")]
    pub side: String,

    /// Yards to gain for a first down
    #[arg(long)]
    pub distance: i64,

    /// Quarter: 1-4 or 1st-4th
    #[arg(long, default_value = "4th")]
    pub quarter: String,

    /// Time left in the quarter, MM:SS or seconds
    #[arg(long, default_value = "0:00")]
    pub clock: String,

    /// Possession team's score minus the opponent's
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub score_diff: i32,

    /// Longest field goal the kicker attempts, in yards
    #[arg(long, default_value = "50")]
    pub kicker_range: u32,

    /// Punter's typical gross distance, in yards
    #[arg(long, default_value = "45")]
    pub punter_range: u32,
}

impl From<SituationArgs> for SituationInput {
    fn from(args: SituationArgs) -> Self {
        SituationInput {
            yardline: args.yardline,
            side: args.side,
            distance_to_gain: args.distance,
            quarter: args.quarter,
            clock: args.clock,
            score_differential: args.score_diff,
            kicker_range_yards: args.kicker_range,
            punter_range_yards: args.punter_range,
        }
    }
}

impl Config {
    pub fn models_dir(&self) -> &Path {
        self.models_dir.as_deref().unwrap_or(&self.data_dir)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.data_dir.is_dir() {
            anyhow::bail!("DATA_DIR {} is not a directory", self.data_dir.display());
        }
        if let Some(dir) = &self.models_dir {
            if !dir.is_dir() {
                anyhow::bail!("MODELS_DIR {} is not a directory", dir.display());
            }
        }
        if let Command::Serve { addr } = &self.command {
            if addr.parse::<SocketAddr>().is_err() {
                anyhow::bail!("API_ADDR must be a socket address like 0.0.0.0:5000, got {}", addr);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(dir: &Path, args: &[&str]) -> Config {
        let mut argv = vec!["fourth-down", "--data-dir", dir.to_str().unwrap()];
        argv.extend_from_slice(args);
        Config::try_parse_from(argv).unwrap()
    }

    #[test]
    fn evaluate_arguments_map_to_situation() {
        let dir = TempDir::new().unwrap();
        let config = parse(
            dir.path(),
            &["evaluate", "--yardline", "40", "--distance", "3", "--clock", "4:00", "--score-diff", "-4"],
        );
        config.validate().unwrap();
        assert_eq!(config.fidelity, Fidelity::Full);
        assert_eq!(config.models_dir(), dir.path());
        let Command::Evaluate(args) = config.command else {
            panic!("evaluate expected");
        };
        let input = SituationInput::from(args);
        assert_eq!(input.yardline, 40);
        assert_eq!(input.side, "own");
        assert_eq!(input.score_differential, -4);
        assert_eq!(input.quarter, "4th");
        assert_eq!(input.kicker_range_yards, 50);
    }

    #[test]
    fn serve_validates_address() {
        let dir = TempDir::new().unwrap();
        let config = parse(dir.path(), &["--fidelity", "simplified", "serve", "--addr", "127.0.0.1:5001"]);
        assert_eq!(config.fidelity, Fidelity::Simplified);
        config.validate().unwrap();

        let config = parse(dir.path(), &["serve", "--addr", "localhost"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_data_dir_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = parse(&dir.path().join("nope"), &["serve", "--addr", "127.0.0.1:5000"]);
        assert!(config.validate().is_err());
    }
}
