use moteus_protocol::{
    emit_position_command, emit_query_command, emit_stop_command, emit_within_command, CanFrame,
    FrameWriter, PositionCommand, PositionResolution, QueryCommand, Resolution, WithinCommand,
    WithinResolution,
};

use crate::cmd::{PositionArgs, QueryArgs, ResolutionArg, StopArgs, WithinArgs};
use crate::exit::{protocol_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_frame, OutputFormat};

pub fn run_stop(args: StopArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = encode(args.query, |writer| emit_stop_command(writer))?;
    print_frame("stop", &frame, format);
    Ok(SUCCESS)
}

pub fn run_position(args: PositionArgs, format: OutputFormat) -> CliResult<i32> {
    let command = PositionCommand {
        position: args.position,
        velocity: args.velocity,
        feedforward_torque: args.feedforward_torque,
        kp_scale: args.kp_scale,
        kd_scale: args.kd_scale,
        maximum_torque: args.maximum_torque,
        stop_position: args.stop_position.unwrap_or(f64::NAN),
        watchdog_timeout: args.watchdog_timeout,
    };
    let resolution = match args.resolutions.as_deref() {
        Some(list) => {
            let [position, velocity, feedforward_torque, kp_scale, kd_scale, maximum_torque, stop_position, watchdog_timeout] =
                resolutions::<8>(list)?;
            PositionResolution {
                position,
                velocity,
                feedforward_torque,
                kp_scale,
                kd_scale,
                maximum_torque,
                stop_position,
                watchdog_timeout,
            }
        }
        None => PositionResolution::default(),
    };

    let frame = encode(args.query, |writer| {
        emit_position_command(writer, &command, &resolution)
    })?;
    print_frame("position", &frame, format);
    Ok(SUCCESS)
}

pub fn run_within(args: WithinArgs, format: OutputFormat) -> CliResult<i32> {
    let command = WithinCommand {
        bounds_min: args.bounds_min,
        bounds_max: args.bounds_max,
        feedforward_torque: args.feedforward_torque,
        kp_scale: args.kp_scale,
        kd_scale: args.kd_scale,
        maximum_torque: args.maximum_torque,
        stop_position: args.stop_position.unwrap_or(f64::NAN),
        watchdog_timeout: args.watchdog_timeout,
    };
    let resolution = match args.resolutions.as_deref() {
        Some(list) => {
            let [bounds_min, bounds_max, feedforward_torque, kp_scale, kd_scale, maximum_torque, stop_position, watchdog_timeout] =
                resolutions::<8>(list)?;
            WithinResolution {
                bounds_min,
                bounds_max,
                feedforward_torque,
                kp_scale,
                kd_scale,
                maximum_torque,
                stop_position,
                watchdog_timeout,
            }
        }
        None => WithinResolution::default(),
    };

    let frame = encode(args.query, |writer| {
        emit_within_command(writer, &command, &resolution)
    })?;
    print_frame("within", &frame, format);
    Ok(SUCCESS)
}

pub fn run_query(args: QueryArgs, format: OutputFormat) -> CliResult<i32> {
    let command = match args.resolutions.as_deref() {
        Some(list) => {
            let [mode, position, velocity, torque, q_current, d_current, rezero_state, voltage, temperature, fault] =
                resolutions::<10>(list)?;
            QueryCommand {
                mode,
                position,
                velocity,
                torque,
                q_current,
                d_current,
                rezero_state,
                voltage,
                temperature,
                fault,
            }
        }
        None => QueryCommand::default(),
    };
    if !command.any_set() {
        tracing::warn!("query requests no registers; frame will be empty");
    }

    let mut frame = CanFrame::new();
    emit_query_command(&mut FrameWriter::new(&mut frame), &command)
        .map_err(|err| protocol_error("encode failed", err))?;
    print_frame("query", &frame, format);
    Ok(SUCCESS)
}

/// Build one frame, optionally followed by the default status query.
fn encode(
    with_query: bool,
    build: impl FnOnce(&mut FrameWriter<'_>) -> moteus_protocol::Result<()>,
) -> CliResult<CanFrame> {
    let mut frame = CanFrame::new();
    {
        let mut writer = FrameWriter::new(&mut frame);
        build(&mut writer).map_err(|err| protocol_error("encode failed", err))?;
        if with_query {
            emit_query_command(&mut writer, &QueryCommand::default())
                .map_err(|err| protocol_error("encode failed", err))?;
        }
    }
    Ok(frame)
}

fn resolutions<const N: usize>(list: &[ResolutionArg]) -> CliResult<[Resolution; N]> {
    if list.len() != N {
        return Err(CliError::new(
            USAGE,
            format!("expected {N} resolutions, got {}", list.len()),
        ));
    }
    Ok(std::array::from_fn(|i| list[i].into()))
}
