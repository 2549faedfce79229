//! Command builders: stop, position mode and stay-within-bounds.
//!
//! Every command starts by writing the `MODE` register, then writes a block
//! of consecutive command registers through a [`WriteCombiner`]. The field
//! order of each block is fixed by a static descriptor table.

use crate::combiner::WriteCombiner;
use crate::error::Result;
use crate::multiplex::{Resolution, WRITE_BASE, WRITE_INT8};
use crate::register::{self, Mode};
use crate::scaling::{self, Scale};
use crate::writer::FrameWriter;

/// Describes one field of a register block: how to fetch its value and
/// resolution, and which scale it travels at.
pub struct FieldDescriptor<C, R> {
    pub name: &'static str,
    pub value: fn(&C) -> f64,
    pub resolution: fn(&R) -> Resolution,
    pub scale: Scale,
}

/// Write the three-byte prefix that switches the controller to `mode`.
pub fn emit_mode(writer: &mut FrameWriter<'_>, mode: Mode) -> Result<()> {
    writer.write(WRITE_INT8 | 0x01)?;
    writer.write(register::MODE as u8)?;
    writer.write(mode.as_wire())
}

/// Write `fields` of `command` as one combined block starting at
/// `start_register`.
pub fn emit_fields<C, R, const N: usize>(
    writer: &mut FrameWriter<'_>,
    base_command: u8,
    start_register: u16,
    command: &C,
    resolution: &R,
    fields: &[FieldDescriptor<C, R>; N],
) -> Result<()> {
    let resolutions: [Resolution; N] = std::array::from_fn(|i| (fields[i].resolution)(resolution));
    let mut combiner = WriteCombiner::new(base_command, start_register, &resolutions);
    for (field, &res) in fields.iter().zip(resolutions.iter()) {
        if combiner.maybe_write(writer)? {
            writer.write_mapped((field.value)(command), field.scale, res)?;
        }
    }
    combiner.finish()
}

/// Time and temperature values pass through single precision first.
fn single(value: f64) -> f64 {
    f64::from(value as f32)
}

/// Stop the controller. Takes no parameters and always writes the same
/// three bytes.
pub fn emit_stop_command(writer: &mut FrameWriter<'_>) -> Result<()> {
    emit_mode(writer, Mode::Stopped)
}

/// Position-mode command values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionCommand {
    pub position: f64,
    pub velocity: f64,
    pub feedforward_torque: f64,
    pub kp_scale: f64,
    pub kd_scale: f64,
    pub maximum_torque: f64,
    pub stop_position: f64,
    pub watchdog_timeout: f64,
}

impl Default for PositionCommand {
    fn default() -> Self {
        Self {
            position: 0.0,
            velocity: 0.0,
            feedforward_torque: 0.0,
            kp_scale: 1.0,
            kd_scale: 1.0,
            maximum_torque: 0.0,
            stop_position: f64::NAN,
            watchdog_timeout: 0.0,
        }
    }
}

/// Wire resolution for each [`PositionCommand`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionResolution {
    pub position: Resolution,
    pub velocity: Resolution,
    pub feedforward_torque: Resolution,
    pub kp_scale: Resolution,
    pub kd_scale: Resolution,
    pub maximum_torque: Resolution,
    pub stop_position: Resolution,
    pub watchdog_timeout: Resolution,
}

impl Default for PositionResolution {
    fn default() -> Self {
        Self {
            position: Resolution::Float,
            velocity: Resolution::Float,
            feedforward_torque: Resolution::Float,
            kp_scale: Resolution::Float,
            kd_scale: Resolution::Float,
            maximum_torque: Resolution::Ignore,
            stop_position: Resolution::Float,
            watchdog_timeout: Resolution::Float,
        }
    }
}

/// Register order of a position command, starting at `COMMAND_POSITION`.
///
/// kp/kd scales use the PWM scale table.
pub static POSITION_FIELDS: [FieldDescriptor<PositionCommand, PositionResolution>; 8] = [
    FieldDescriptor {
        name: "position",
        value: |c| c.position,
        resolution: |r| r.position,
        scale: scaling::POSITION,
    },
    FieldDescriptor {
        name: "velocity",
        value: |c| c.velocity,
        resolution: |r| r.velocity,
        scale: scaling::VELOCITY,
    },
    FieldDescriptor {
        name: "feedforward_torque",
        value: |c| c.feedforward_torque,
        resolution: |r| r.feedforward_torque,
        scale: scaling::TORQUE,
    },
    FieldDescriptor {
        name: "kp_scale",
        value: |c| c.kp_scale,
        resolution: |r| r.kp_scale,
        scale: scaling::PWM,
    },
    FieldDescriptor {
        name: "kd_scale",
        value: |c| c.kd_scale,
        resolution: |r| r.kd_scale,
        scale: scaling::PWM,
    },
    FieldDescriptor {
        name: "maximum_torque",
        value: |c| c.maximum_torque,
        resolution: |r| r.maximum_torque,
        scale: scaling::TORQUE,
    },
    FieldDescriptor {
        name: "stop_position",
        value: |c| c.stop_position,
        resolution: |r| r.stop_position,
        scale: scaling::POSITION,
    },
    FieldDescriptor {
        name: "watchdog_timeout",
        value: |c| single(c.watchdog_timeout),
        resolution: |r| r.watchdog_timeout,
        scale: scaling::TIME,
    },
];

/// Switch to position mode and write the position command block.
pub fn emit_position_command(
    writer: &mut FrameWriter<'_>,
    command: &PositionCommand,
    resolution: &PositionResolution,
) -> Result<()> {
    emit_mode(writer, Mode::Position)?;
    emit_fields(
        writer,
        WRITE_BASE,
        register::COMMAND_POSITION,
        command,
        resolution,
        &POSITION_FIELDS,
    )
}

/// Stay-within-bounds command values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WithinCommand {
    pub bounds_min: f64,
    pub bounds_max: f64,
    pub feedforward_torque: f64,
    pub kp_scale: f64,
    pub kd_scale: f64,
    pub maximum_torque: f64,
    pub stop_position: f64,
    pub watchdog_timeout: f64,
}

impl Default for WithinCommand {
    fn default() -> Self {
        Self {
            bounds_min: 0.0,
            bounds_max: 0.0,
            feedforward_torque: 0.0,
            kp_scale: 1.0,
            kd_scale: 1.0,
            maximum_torque: 0.0,
            stop_position: f64::NAN,
            watchdog_timeout: 0.0,
        }
    }
}

/// Wire resolution for each [`WithinCommand`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithinResolution {
    pub bounds_min: Resolution,
    pub bounds_max: Resolution,
    pub feedforward_torque: Resolution,
    pub kp_scale: Resolution,
    pub kd_scale: Resolution,
    pub maximum_torque: Resolution,
    pub stop_position: Resolution,
    pub watchdog_timeout: Resolution,
}

impl Default for WithinResolution {
    fn default() -> Self {
        Self {
            bounds_min: Resolution::Float,
            bounds_max: Resolution::Float,
            feedforward_torque: Resolution::Float,
            kp_scale: Resolution::Float,
            kd_scale: Resolution::Float,
            maximum_torque: Resolution::Float,
            stop_position: Resolution::Float,
            watchdog_timeout: Resolution::Float,
        }
    }
}

/// Register order of a stay-within command, starting at
/// `STAY_WITHIN_LOWER`.
///
/// Bounds travel at the time scale and in single precision, as the
/// controller expects.
pub static WITHIN_FIELDS: [FieldDescriptor<WithinCommand, WithinResolution>; 8] = [
    FieldDescriptor {
        name: "bounds_min",
        value: |c| single(c.bounds_min),
        resolution: |r| r.bounds_min,
        scale: scaling::TIME,
    },
    FieldDescriptor {
        name: "bounds_max",
        value: |c| single(c.bounds_max),
        resolution: |r| r.bounds_max,
        scale: scaling::TIME,
    },
    FieldDescriptor {
        name: "feedforward_torque",
        value: |c| c.feedforward_torque,
        resolution: |r| r.feedforward_torque,
        scale: scaling::TORQUE,
    },
    FieldDescriptor {
        name: "kp_scale",
        value: |c| c.kp_scale,
        resolution: |r| r.kp_scale,
        scale: scaling::PWM,
    },
    FieldDescriptor {
        name: "kd_scale",
        value: |c| c.kd_scale,
        resolution: |r| r.kd_scale,
        scale: scaling::PWM,
    },
    FieldDescriptor {
        name: "maximum_torque",
        value: |c| c.maximum_torque,
        resolution: |r| r.maximum_torque,
        scale: scaling::TORQUE,
    },
    FieldDescriptor {
        name: "stop_position",
        value: |c| c.stop_position,
        resolution: |r| r.stop_position,
        scale: scaling::POSITION,
    },
    FieldDescriptor {
        name: "watchdog_timeout",
        value: |c| single(c.watchdog_timeout),
        resolution: |r| r.watchdog_timeout,
        scale: scaling::TIME,
    },
];

/// Switch to stay-within-bounds mode and write the bounds command block.
pub fn emit_within_command(
    writer: &mut FrameWriter<'_>,
    command: &WithinCommand,
    resolution: &WithinResolution,
) -> Result<()> {
    emit_mode(writer, Mode::StayWithinBounds)?;
    emit_fields(
        writer,
        WRITE_BASE,
        register::STAY_WITHIN_LOWER,
        command,
        resolution,
        &WITHIN_FIELDS,
    )
}
