use clap::{Args, Subcommand, ValueEnum};
use moteus_protocol::Resolution;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode a stop command.
    Stop(StopArgs),
    /// Encode a position-mode command.
    Position(PositionArgs),
    /// Encode a stay-within-bounds command.
    Within(WithinArgs),
    /// Encode a status query.
    Query(QueryArgs),
    /// Decode a reply payload into controller status.
    Decode(DecodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Stop(args) => encode::run_stop(args, format),
        Command::Position(args) => encode::run_position(args, format),
        Command::Within(args) => encode::run_within(args, format),
        Command::Query(args) => encode::run_query(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Wire resolution as accepted on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ResolutionArg {
    Int8,
    Int16,
    Int32,
    Float,
    Ignore,
}

impl From<ResolutionArg> for Resolution {
    fn from(arg: ResolutionArg) -> Self {
        match arg {
            ResolutionArg::Int8 => Resolution::Int8,
            ResolutionArg::Int16 => Resolution::Int16,
            ResolutionArg::Int32 => Resolution::Int32,
            ResolutionArg::Float => Resolution::Float,
            ResolutionArg::Ignore => Resolution::Ignore,
        }
    }
}

#[derive(Args, Debug)]
pub struct StopArgs {
    /// Append the default status query.
    #[arg(long)]
    pub query: bool,
}

#[derive(Args, Debug)]
pub struct PositionArgs {
    /// Target position (revolutions).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub position: f64,
    /// Target velocity (revolutions/s).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub velocity: f64,
    /// Feedforward torque (Nm).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub feedforward_torque: f64,
    /// Proportional gain scale.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub kp_scale: f64,
    /// Derivative gain scale.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub kd_scale: f64,
    /// Maximum torque (Nm).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub maximum_torque: f64,
    /// Position to stop at (revolutions). Default: none.
    #[arg(long, allow_negative_numbers = true)]
    pub stop_position: Option<f64>,
    /// Watchdog timeout (s).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub watchdog_timeout: f64,
    /// Eight comma-separated resolutions, one per field in order.
    #[arg(long, value_delimiter = ',')]
    pub resolutions: Option<Vec<ResolutionArg>>,
    /// Append the default status query.
    #[arg(long)]
    pub query: bool,
}

#[derive(Args, Debug)]
pub struct WithinArgs {
    /// Lower bound (revolutions).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub bounds_min: f64,
    /// Upper bound (revolutions).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub bounds_max: f64,
    /// Feedforward torque (Nm).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub feedforward_torque: f64,
    /// Proportional gain scale.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub kp_scale: f64,
    /// Derivative gain scale.
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub kd_scale: f64,
    /// Maximum torque (Nm).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub maximum_torque: f64,
    /// Position to stop at (revolutions). Default: none.
    #[arg(long, allow_negative_numbers = true)]
    pub stop_position: Option<f64>,
    /// Watchdog timeout (s).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub watchdog_timeout: f64,
    /// Eight comma-separated resolutions, one per field in order.
    #[arg(long, value_delimiter = ',')]
    pub resolutions: Option<Vec<ResolutionArg>>,
    /// Append the default status query.
    #[arg(long)]
    pub query: bool,
}

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Ten comma-separated resolutions: mode, position, velocity, torque,
    /// q_current, d_current, rezero_state, voltage, temperature, fault.
    #[arg(long, value_delimiter = ',')]
    pub resolutions: Option<Vec<ResolutionArg>>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Reply payload as hex; may be split across several arguments.
    #[arg(required = true)]
    pub hex: Vec<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
