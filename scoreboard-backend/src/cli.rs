use clap::Parser;

/// Parsed command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "scoreboard-backend", version, about = "Quiz leaderboard HTTP server")]
pub struct CliArgs {
    /// Path to configuration file (TOML, YAML or JSON)
    #[arg(short = 'c', long = "config-path", env = "SCOREBOARD_CONFIG_PATH")]
    pub config_path: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        let args = CliArgs::try_parse_from(["scoreboard-backend", "-c", "a.toml"]).unwrap();
        assert_eq!(args.config_path.as_deref(), Some("a.toml"));

        let args =
            CliArgs::try_parse_from(["scoreboard-backend", "--config-path=b.yaml"]).unwrap();
        assert_eq!(args.config_path.as_deref(), Some("b.yaml"));
    }

    #[test]
    fn definition_is_consistent() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }
}
