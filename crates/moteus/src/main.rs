mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "moteus", version, about = "moteus CAN-FD frame encoder and decoder")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        env = "MOTEUS_LOG_LEVEL",
        default_value = "warn",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_position_subcommand() {
        let cli = Cli::try_parse_from([
            "moteus",
            "position",
            "--position",
            "-0.5",
            "--resolutions",
            "float,float,float,ignore,int8,int8,ignore,ignore",
        ])
        .expect("position args should parse");

        match cli.command {
            Command::Position(args) => {
                assert_eq!(args.position, -0.5);
                assert_eq!(args.resolutions.map(|r| r.len()), Some(8));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_resolution() {
        let err = Cli::try_parse_from(["moteus", "query", "--resolutions", "int64"])
            .expect_err("unknown resolution should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from(["moteus", "--format", "json", "decode", "2101000a"])
            .expect("decode args should parse");
        assert!(matches!(cli.command, Command::Decode(_)));
        assert!(matches!(cli.format, Some(OutputFormat::Json)));
    }
}
