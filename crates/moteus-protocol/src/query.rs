//! Query command builder and reply decoder.

use tracing::{trace, warn};

use crate::combiner::WriteCombiner;
use crate::error::Result;
use crate::multiplex::{Resolution, READ_BASE};
use crate::parser::MultiplexParser;
use crate::register::{self, Mode};
use crate::writer::FrameWriter;

/// Which status registers to request, and at what resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryCommand {
    pub mode: Resolution,
    pub position: Resolution,
    pub velocity: Resolution,
    pub torque: Resolution,
    pub q_current: Resolution,
    pub d_current: Resolution,
    pub rezero_state: Resolution,
    pub voltage: Resolution,
    pub temperature: Resolution,
    pub fault: Resolution,
}

impl Default for QueryCommand {
    fn default() -> Self {
        Self {
            mode: Resolution::Int16,
            position: Resolution::Int16,
            velocity: Resolution::Int16,
            torque: Resolution::Int16,
            q_current: Resolution::Int16,
            d_current: Resolution::Int16,
            rezero_state: Resolution::Int16,
            voltage: Resolution::Int8,
            temperature: Resolution::Int8,
            fault: Resolution::Int8,
        }
    }
}

impl QueryCommand {
    /// A query that requests nothing.
    pub fn none() -> Self {
        Self {
            mode: Resolution::Ignore,
            position: Resolution::Ignore,
            velocity: Resolution::Ignore,
            torque: Resolution::Ignore,
            q_current: Resolution::Ignore,
            d_current: Resolution::Ignore,
            rezero_state: Resolution::Ignore,
            voltage: Resolution::Ignore,
            temperature: Resolution::Ignore,
            fault: Resolution::Ignore,
        }
    }

    /// Registers `MODE` through `D_CURRENT`.
    fn status_block(&self) -> [Resolution; 6] {
        [
            self.mode,
            self.position,
            self.velocity,
            self.torque,
            self.q_current,
            self.d_current,
        ]
    }

    /// Registers `REZERO_STATE` through `FAULT`.
    fn health_block(&self) -> [Resolution; 4] {
        [self.rezero_state, self.voltage, self.temperature, self.fault]
    }

    /// Returns true if at least one register is requested.
    pub fn any_set(&self) -> bool {
        self.status_block()
            .iter()
            .chain(self.health_block().iter())
            .any(|&res| res != Resolution::Ignore)
    }
}

/// Append the read requests for `command`.
///
/// The two register blocks are not contiguous, so each gets its own
/// combiner. A query with every field ignored writes nothing.
pub fn emit_query_command(writer: &mut FrameWriter<'_>, command: &QueryCommand) -> Result<()> {
    emit_read_block(writer, register::MODE, &command.status_block())?;
    emit_read_block(writer, register::REZERO_STATE, &command.health_block())
}

fn emit_read_block(
    writer: &mut FrameWriter<'_>,
    start_register: u16,
    resolutions: &[Resolution],
) -> Result<()> {
    let mut combiner = WriteCombiner::new(READ_BASE, start_register, resolutions);
    for _ in resolutions {
        combiner.maybe_write(writer)?;
    }
    combiner.finish()
}

/// Decoded controller status.
///
/// Numeric fields the reply did not carry stay NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryResult {
    pub mode: Mode,
    pub position: f64,
    pub velocity: f64,
    pub torque: f64,
    pub q_current: f64,
    pub d_current: f64,
    pub rezero_state: bool,
    pub voltage: f64,
    pub temperature: f64,
    pub fault: i32,
}

impl Default for QueryResult {
    fn default() -> Self {
        Self {
            mode: Mode::Stopped,
            position: f64::NAN,
            velocity: f64::NAN,
            torque: f64::NAN,
            q_current: f64::NAN,
            d_current: f64::NAN,
            rezero_state: false,
            voltage: f64::NAN,
            temperature: f64::NAN,
            fault: 0,
        }
    }
}

/// Decode a reply payload. Never fails: unknown registers are skipped and a
/// truncated or garbled payload just yields fewer fields.
pub fn parse_query_result(data: &[u8]) -> QueryResult {
    let mut parser = MultiplexParser::new(data);
    let mut result = QueryResult::default();

    while let Some(field) = parser.next_field() {
        if let Err(err) = decode_field(&mut parser, field.register, field.resolution, &mut result) {
            warn!(register = field.register, error = %err, "stopping reply decode");
            break;
        }
    }

    result
}

fn decode_field(
    parser: &mut MultiplexParser<'_>,
    id: u16,
    res: Resolution,
    result: &mut QueryResult,
) -> Result<()> {
    match id {
        register::MODE => {
            let raw = parser.read_int(res)?;
            match Mode::from_wire(raw) {
                Some(mode) => result.mode = mode,
                None => warn!(raw, "reply carried an unknown mode"),
            }
        }
        register::POSITION => result.position = parser.read_position(res)?,
        register::VELOCITY => result.velocity = parser.read_velocity(res)?,
        register::TORQUE => result.torque = parser.read_torque(res)?,
        register::Q_CURRENT => result.q_current = parser.read_current(res)?,
        register::D_CURRENT => result.d_current = parser.read_current(res)?,
        register::REZERO_STATE => result.rezero_state = parser.read_int(res)? != 0,
        register::VOLTAGE => result.voltage = parser.read_voltage(res)?,
        register::TEMPERATURE => result.temperature = parser.read_temperature(res)?,
        register::FAULT => result.fault = parser.read_int(res)?,
        _ => {
            trace!(register = id, "skipping unrecognized register");
            parser.ignore(res);
        }
    }
    Ok(())
}
