use tracing::trace;

use crate::error::{ProtocolError, Result};
use crate::frame::{CanFrame, WireValue};
use crate::multiplex::Resolution;
use crate::scaling::{self, saturate, Scale};

/// Appends typed values to a [`CanFrame`].
///
/// The writer holds the only mutable borrow of its frame for as long as it
/// lives, so one encode sequence owns the buffer from start to finish.
pub struct FrameWriter<'a> {
    frame: &'a mut CanFrame,
}

impl<'a> FrameWriter<'a> {
    /// Create a writer appending to `frame`.
    pub fn new(frame: &'a mut CanFrame) -> Self {
        Self { frame }
    }

    /// Append one little-endian value.
    pub fn write<T: WireValue>(&mut self, value: T) -> Result<()> {
        self.frame.put(value)
    }

    /// Append `value` in the wire format selected by `resolution`.
    ///
    /// Fixed-point resolutions divide by the matching entry of `scale` and
    /// saturate; floats are sent as-is. `Ignore` is rejected.
    pub fn write_mapped(&mut self, value: f64, scale: Scale, resolution: Resolution) -> Result<()> {
        match resolution {
            Resolution::Int8 => self.write(saturate::<i8>(value, scale.int8)),
            Resolution::Int16 => self.write(saturate::<i16>(value, scale.int16)),
            Resolution::Int32 => self.write(saturate::<i32>(value, scale.int32)),
            Resolution::Float => self.write(value as f32),
            Resolution::Ignore => {
                trace!("refusing to write a field with ignored resolution");
                Err(ProtocolError::IgnoredResolution)
            }
        }
    }

    pub fn write_position(&mut self, value: f64, resolution: Resolution) -> Result<()> {
        self.write_mapped(value, scaling::POSITION, resolution)
    }

    pub fn write_velocity(&mut self, value: f64, resolution: Resolution) -> Result<()> {
        self.write_mapped(value, scaling::VELOCITY, resolution)
    }

    pub fn write_torque(&mut self, value: f64, resolution: Resolution) -> Result<()> {
        self.write_mapped(value, scaling::TORQUE, resolution)
    }

    pub fn write_pwm(&mut self, value: f64, resolution: Resolution) -> Result<()> {
        self.write_mapped(value, scaling::PWM, resolution)
    }

    pub fn write_voltage(&mut self, value: f64, resolution: Resolution) -> Result<()> {
        self.write_mapped(value, scaling::VOLTAGE, resolution)
    }

    pub fn write_temperature(&mut self, value: f64, resolution: Resolution) -> Result<()> {
        self.write_mapped(value, scaling::TEMPERATURE, resolution)
    }

    pub fn write_time(&mut self, value: f64, resolution: Resolution) -> Result<()> {
        self.write_mapped(value, scaling::TIME, resolution)
    }

    /// Bytes written to the frame so far.
    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    /// Borrow the frame being written.
    pub fn frame(&self) -> &CanFrame {
        self.frame
    }
}
