mod app;
mod engine;
mod issues;
mod logging;
mod util;

use std::path::PathBuf;

use clap::Parser;
use tracing::warn;

use engine::{DEFAULT_CURTAIN_EPSILON, DEFAULT_SIMILARITY_PERCENT, SessionConfig};
use logging::{LogConfig, LogFormat};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Issue graph JSON with `issues`, `links` and optional `similar` arrays.
    #[arg(default_value = "issues.json")]
    path: PathBuf,

    /// Minimum similarity score in percent for the similarity overlay.
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_PERCENT, value_parser = clap::value_parser!(u8).range(1..=100))]
    similarity_threshold: u8,

    /// How far (in px) a status row may reach into a curtain and still count as covered.
    #[arg(long, default_value_t = DEFAULT_CURTAIN_EPSILON)]
    curtain_epsilon: f32,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[arg(long, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

fn main() -> eframe::Result<()> {
    let args = Args::parse();

    let log_config = LogConfig::from_verbosity(args.verbose).with_format(args.log_format);
    if let Err(error) = logging::init_logging(&log_config) {
        eprintln!("logging unavailable: {error}");
    }

    if !args.curtain_epsilon.is_finite() {
        warn!(epsilon = args.curtain_epsilon, "curtain epsilon is not finite, using the default");
    } else if args.curtain_epsilon < 0.0 {
        warn!(epsilon = args.curtain_epsilon, "negative curtain epsilon clamped to zero");
    }
    let config = SessionConfig {
        curtain_epsilon: args.curtain_epsilon,
        similarity_percent: args.similarity_threshold,
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "issue-lens",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::IssueLensApp::new(
                cc,
                args.path.clone(),
                config,
            )))
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn defaults_match_the_session_defaults() {
        let args = Args::try_parse_from(["issue-lens"]).unwrap();
        assert_eq!(args.path, PathBuf::from("issues.json"));
        assert_eq!(args.similarity_threshold, DEFAULT_SIMILARITY_PERCENT);
        assert_eq!(args.curtain_epsilon, DEFAULT_CURTAIN_EPSILON);
        assert_eq!(args.log_format, LogFormat::Pretty);
    }

    #[test]
    fn similarity_threshold_is_range_checked() {
        assert!(Args::try_parse_from(["issue-lens", "--similarity-threshold", "0"]).is_err());
        let args =
            Args::try_parse_from(["issue-lens", "board.json", "--similarity-threshold", "35", "-vv"])
                .unwrap();
        assert_eq!(args.similarity_threshold, 35);
        assert_eq!(args.verbose, 2);
    }
}
