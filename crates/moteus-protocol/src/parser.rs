use bytes::Buf;
use tracing::trace;

use crate::error::{ProtocolError, Result};
use crate::frame::WireValue;
use crate::multiplex::{is_reply, Resolution, NOP};
use crate::scaling::{self, nanify, Scale};

/// One register present in a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub register: u16,
    pub resolution: Resolution,
}

/// Walks the reply runs of a multiplex payload.
///
/// Call [`next_field`](Self::next_field) to learn which register comes next,
/// then consume its value with one of the `read_*` methods or
/// [`ignore`](Self::ignore). Parsing is lenient: a truncated payload or an
/// opcode that is not a reply simply ends the sequence.
#[derive(Debug)]
pub struct MultiplexParser<'a> {
    data: &'a [u8],
    offset: usize,
    remaining: usize,
    current_resolution: Resolution,
    current_register: u16,
}

impl<'a> MultiplexParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            remaining: 0,
            current_resolution: Resolution::Ignore,
            current_register: 0,
        }
    }

    /// The next register in the reply, or `None` once no complete field
    /// remains.
    pub fn next_field(&mut self) -> Option<Field> {
        if self.offset >= self.data.len() {
            return None;
        }

        if self.remaining > 0 {
            self.remaining -= 1;
            let register = self.current_register;
            self.current_register += 1;
            if !self.has_bytes(self.current_resolution.wire_size()) {
                trace!(register, "reply truncated mid-run");
                return None;
            }
            return Some(Field {
                register,
                resolution: self.current_resolution,
            });
        }

        while self.offset < self.data.len() {
            let cmd = self.data[self.offset];
            self.offset += 1;
            if cmd == NOP {
                continue;
            }

            // Every reply header needs at least one more byte.
            if self.offset >= self.data.len() {
                break;
            }

            if !is_reply(cmd) {
                trace!(opcode = cmd, "stopping at non-reply opcode");
                self.offset = self.data.len();
                break;
            }

            self.current_resolution = Resolution::from_id(cmd >> 2);
            let mut count = usize::from(cmd & 0x03);
            if count == 0 {
                count = usize::from(self.data[self.offset]);
                self.offset += 1;
                if self.offset >= self.data.len() {
                    break;
                }
            }

            if count == 0 {
                continue;
            }

            self.current_register = u16::from(self.data[self.offset]);
            self.offset += 1;
            self.remaining = count - 1;

            if !self.has_bytes(self.current_resolution.wire_size()) {
                return None;
            }

            let register = self.current_register;
            self.current_register += 1;
            return Some(Field {
                register,
                resolution: self.current_resolution,
            });
        }
        None
    }

    /// Read one little-endian value.
    pub fn read<T: WireValue>(&mut self) -> Result<T> {
        if !self.has_bytes(T::SIZE) {
            return Err(ProtocolError::Overrun {
                needed: T::SIZE,
                available: self.data.len() - self.offset.min(self.data.len()),
            });
        }
        let mut src = &self.data[self.offset..];
        let value = T::get(&mut src);
        self.offset += T::SIZE;
        Ok(value)
    }

    /// Read a value at `resolution`, scaling fixed-point fields and mapping
    /// the sentinel to NaN.
    pub fn read_mapped(&mut self, resolution: Resolution, scale: Scale) -> Result<f64> {
        match resolution {
            Resolution::Int8 => Ok(nanify(self.read::<i8>()?) * scale.int8),
            Resolution::Int16 => Ok(nanify(self.read::<i16>()?) * scale.int16),
            Resolution::Int32 => Ok(nanify(self.read::<i32>()?) * scale.int32),
            Resolution::Float => Ok(f64::from(self.read::<f32>()?)),
            Resolution::Ignore => Err(ProtocolError::IgnoredResolution),
        }
    }

    /// Read an unscaled integer field. A NaN sentinel reads as zero.
    pub fn read_int(&mut self, resolution: Resolution) -> Result<i32> {
        Ok(self.read_mapped(resolution, scaling::INT)? as i32)
    }

    pub fn read_position(&mut self, resolution: Resolution) -> Result<f64> {
        self.read_mapped(resolution, scaling::POSITION)
    }

    pub fn read_velocity(&mut self, resolution: Resolution) -> Result<f64> {
        self.read_mapped(resolution, scaling::VELOCITY)
    }

    pub fn read_torque(&mut self, resolution: Resolution) -> Result<f64> {
        self.read_mapped(resolution, scaling::TORQUE)
    }

    pub fn read_pwm(&mut self, resolution: Resolution) -> Result<f64> {
        self.read_mapped(resolution, scaling::PWM)
    }

    pub fn read_voltage(&mut self, resolution: Resolution) -> Result<f64> {
        self.read_mapped(resolution, scaling::VOLTAGE)
    }

    pub fn read_temperature(&mut self, resolution: Resolution) -> Result<f64> {
        self.read_mapped(resolution, scaling::TEMPERATURE)
    }

    pub fn read_time(&mut self, resolution: Resolution) -> Result<f64> {
        self.read_mapped(resolution, scaling::TIME)
    }

    pub fn read_current(&mut self, resolution: Resolution) -> Result<f64> {
        self.read_mapped(resolution, scaling::CURRENT)
    }

    /// Skip over one value at `resolution`.
    pub fn ignore(&mut self, resolution: Resolution) {
        self.offset = (self.offset + resolution.wire_size()).min(self.data.len());
    }

    /// Bytes not yet consumed.
    pub fn remaining_bytes(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    fn has_bytes(&self, len: usize) -> bool {
        self.offset + len <= self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::frame::CanFrame;
    use crate::multiplex::{REPLY_FLOAT, REPLY_INT16, REPLY_INT8, WRITE_ERROR};
    use crate::writer::FrameWriter;

    fn fields(data: &[u8]) -> Vec<Field> {
        let mut parser = MultiplexParser::new(data);
        let mut out = Vec::new();
        while let Some(field) = parser.next_field() {
            parser.ignore(field.resolution);
            out.push(field);
        }
        out
    }

    fn field(register: u16, resolution: Resolution) -> Field {
        Field {
            register,
            resolution,
        }
    }

    #[test]
    fn short_form_run_auto_increments() {
        let data = [REPLY_INT8 + 3, 0x00, 10, 20, 30];
        assert_eq!(
            fields(&data),
            vec![
                field(0, Resolution::Int8),
                field(1, Resolution::Int8),
                field(2, Resolution::Int8)
            ]
        );
    }

    #[test]
    fn long_form_count_byte() {
        let mut data = vec![REPLY_INT16, 4, 0x01];
        data.extend_from_slice(&[0u8; 8]);
        let parsed = fields(&data);
        assert_eq!(parsed.len(), 4);
        assert_eq!(parsed[3], field(4, Resolution::Int16));
    }

    #[test]
    fn nops_are_skipped() {
        let data = [NOP, NOP, REPLY_INT8 + 1, 0x0d, 48, NOP, NOP];
        assert_eq!(fields(&data), vec![field(0x0d, Resolution::Int8)]);
    }

    #[test]
    fn zero_count_run_is_skipped() {
        let data = [REPLY_INT8, 0, REPLY_INT8 + 1, 0x0f, 3];
        assert_eq!(fields(&data), vec![field(0x0f, Resolution::Int8)]);
    }

    #[test]
    fn truncated_run_yields_complete_fields_only() {
        // Three int16 registers announced, only one and a half present.
        let data = [REPLY_INT16 + 3, 0x01, 0x10, 0x00, 0x20];
        assert_eq!(fields(&data), vec![field(1, Resolution::Int16)]);
    }

    #[test]
    fn truncated_header_yields_nothing() {
        assert!(fields(&[REPLY_FLOAT + 1]).is_empty());
        assert!(fields(&[REPLY_FLOAT, 2]).is_empty());
        assert!(fields(&[REPLY_FLOAT + 1, 0x01, 0x00, 0x00]).is_empty());
        assert!(fields(&[]).is_empty());
    }

    #[test]
    fn unknown_opcode_stops_parsing() {
        let data = [REPLY_INT8 + 1, 0x00, 10, WRITE_ERROR, 0x00, REPLY_INT8 + 1, 0x01, 5];
        assert_eq!(fields(&data), vec![field(0, Resolution::Int8)]);
    }

    #[test]
    fn read_past_end_is_overrun() {
        let data = [0x01];
        let mut parser = MultiplexParser::new(&data);
        assert_eq!(
            parser.read::<i16>(),
            Err(ProtocolError::Overrun {
                needed: 2,
                available: 1
            })
        );
    }

    #[test]
    fn sentinel_reads_as_nan() {
        let data = [REPLY_INT16 + 1, 0x01, 0x00, 0x80];
        let mut parser = MultiplexParser::new(&data);
        let field = parser.next_field().unwrap();
        assert!(parser.read_position(field.resolution).unwrap().is_nan());
    }

    #[test]
    fn float_nan_reads_as_nan() {
        let mut data = vec![REPLY_FLOAT + 1, 0x02];
        data.extend_from_slice(&f32::NAN.to_le_bytes());
        let mut parser = MultiplexParser::new(&data);
        let field = parser.next_field().unwrap();
        assert!(parser.read_velocity(field.resolution).unwrap().is_nan());
    }

    #[test]
    fn read_int_maps_sentinel_to_zero() {
        let data = [0x80];
        let mut parser = MultiplexParser::new(&data);
        assert_eq!(parser.read_int(Resolution::Int8).unwrap(), 0);
    }

    #[test]
    fn reader_helpers_mirror_writer_scales() {
        let mut frame = CanFrame::new();
        let mut writer = FrameWriter::new(&mut frame);
        writer.write_pwm(0.5, Resolution::Int16).unwrap();
        writer.write_time(0.125, Resolution::Int32).unwrap();
        writer.write_temperature(40.0, Resolution::Int8).unwrap();

        let mut parser = MultiplexParser::new(frame.as_bytes());
        assert!((parser.read_pwm(Resolution::Int16).unwrap() - 0.5).abs() < 1.0 / 32767.0);
        assert!((parser.read_time(Resolution::Int32).unwrap() - 0.125).abs() < 1e-6);
        assert_eq!(parser.read_temperature(Resolution::Int8).unwrap(), 40.0);
        assert_eq!(parser.remaining_bytes(), 0);
    }

    proptest! {
        #[test]
        fn arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..64)) {
            let mut parser = MultiplexParser::new(&data);
            let mut steps = 0;
            while let Some(field) = parser.next_field() {
                prop_assert!(parser.read_mapped(field.resolution, scaling::INT).is_ok());
                steps += 1;
                prop_assert!(steps <= data.len());
            }
        }

        #[test]
        fn resolutions_roundtrip(value in -1.0f64..1.0) {
            for resolution in [Resolution::Int8, Resolution::Int16, Resolution::Int32, Resolution::Float] {
                let mut frame = CanFrame::new();
                FrameWriter::new(&mut frame).write_velocity(value, resolution).unwrap();
                let mut parser = MultiplexParser::new(frame.as_bytes());
                let decoded = parser.read_velocity(resolution).unwrap();
                let lsb = scaling::VELOCITY.for_resolution(resolution).unwrap();
                let tolerance = if resolution == Resolution::Float { 1e-6 } else { lsb * (1.0 + 1e-9) };
                prop_assert!((decoded - value).abs() <= tolerance);
            }
        }

        #[test]
        fn non_finite_roundtrips_to_nan(resolution in prop_oneof![
            Just(Resolution::Int8), Just(Resolution::Int16), Just(Resolution::Int32), Just(Resolution::Float)
        ], value in prop_oneof![Just(f64::NAN), Just(f64::INFINITY), Just(f64::NEG_INFINITY)]) {
            let mut frame = CanFrame::new();
            FrameWriter::new(&mut frame).write_torque(value, resolution).unwrap();
            let decoded = MultiplexParser::new(frame.as_bytes()).read_torque(resolution).unwrap();
            if resolution == Resolution::Float {
                prop_assert!(decoded.is_nan() || decoded == value);
            } else {
                prop_assert!(decoded.is_nan());
            }
        }
    }
}
