//! Grouping of consecutive same-resolution registers under one header.

use tracing::trace;

use crate::error::{ProtocolError, Result};
use crate::multiplex::{Resolution, MAX_HEADER_REGISTER, MAX_INLINE_COUNT};
use crate::writer::FrameWriter;

/// Emits the multiplex headers for a block of consecutive registers.
///
/// The combiner is driven once per field, in register order. Each call to
/// [`maybe_write`](Self::maybe_write) emits a header when a new run of
/// equal resolutions starts, and reports whether the caller should now
/// write the field's value. Runs of `Ignore` emit nothing but still break
/// the surrounding runs apart.
///
/// Call [`finish`](Self::finish) once every field has been visited.
#[derive(Debug)]
pub struct WriteCombiner<'r> {
    base_command: u8,
    start_register: u16,
    resolutions: &'r [Resolution],
    current_resolution: Resolution,
    offset: usize,
}

impl<'r> WriteCombiner<'r> {
    /// Create a combiner for `resolutions.len()` registers starting at
    /// `start_register`, using the opcode family at `base_command`.
    pub fn new(base_command: u8, start_register: u16, resolutions: &'r [Resolution]) -> Self {
        Self {
            base_command,
            start_register,
            resolutions,
            current_resolution: Resolution::Ignore,
            offset: 0,
        }
    }

    /// Visit the next field, emitting a header into `writer` if it starts a
    /// new run. Returns true if the field's value must be written next.
    pub fn maybe_write(&mut self, writer: &mut FrameWriter<'_>) -> Result<bool> {
        let this_offset = self.offset;
        let Some(&new_resolution) = self.resolutions.get(this_offset) else {
            return Err(ProtocolError::CombinerOverrun {
                expected: self.resolutions.len(),
            });
        };
        self.offset += 1;

        if new_resolution == self.current_resolution {
            return Ok(new_resolution != Resolution::Ignore);
        }
        self.current_resolution = new_resolution;

        let Some(opcode_offset) = new_resolution.opcode_offset() else {
            return Ok(false);
        };

        let count = 1 + self.resolutions[this_offset + 1..]
            .iter()
            .take_while(|&&res| res == new_resolution)
            .count();

        let register = u32::from(self.start_register) + this_offset as u32;
        if register > MAX_HEADER_REGISTER {
            return Err(ProtocolError::RegisterOutOfRange(register));
        }

        let opcode = self.base_command + opcode_offset;
        if count <= MAX_INLINE_COUNT {
            writer.write(opcode + count as u8)?;
        } else {
            writer.write(opcode)?;
            writer.write(count as u8)?;
        }
        writer.write(register as u8)?;
        trace!(opcode, count, register, resolution = %new_resolution, "multiplex header");
        Ok(true)
    }

    /// Fields not yet visited.
    pub fn remaining(&self) -> usize {
        self.resolutions.len() - self.offset
    }

    /// Check that every field was visited exactly once.
    pub fn finish(self) -> Result<()> {
        if self.offset != self.resolutions.len() {
            return Err(ProtocolError::CombinerIncomplete {
                expected: self.resolutions.len(),
                driven: self.offset,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::frame::CanFrame;
    use crate::multiplex::{READ_BASE, WRITE_BASE, WRITE_FLOAT, WRITE_INT16, WRITE_INT8};

    use Resolution::{Float, Ignore, Int16, Int32, Int8};

    fn drive(base: u8, start: u16, resolutions: &[Resolution]) -> (Vec<u8>, Vec<bool>) {
        let mut frame = CanFrame::new();
        let mut writer = FrameWriter::new(&mut frame);
        let mut combiner = WriteCombiner::new(base, start, resolutions);
        let mut wants = Vec::new();
        for _ in resolutions {
            wants.push(combiner.maybe_write(&mut writer).unwrap());
        }
        combiner.finish().unwrap();
        (frame.as_bytes().to_vec(), wants)
    }

    #[test]
    fn groups_runs_and_skips_ignored() {
        let (bytes, wants) = drive(WRITE_BASE, 0x20, &[Float, Float, Float, Ignore, Int8, Int8]);
        assert_eq!(bytes, vec![WRITE_FLOAT + 3, 0x20, WRITE_INT8 + 2, 0x24]);
        assert_eq!(wants, vec![true, true, true, false, true, true]);
    }

    #[test]
    fn long_form_above_three() {
        let (bytes, _) = drive(WRITE_BASE, 0x20, &[Int16; 5]);
        assert_eq!(bytes, vec![WRITE_INT16, 5, 0x20]);
    }

    #[test]
    fn exactly_three_uses_short_form() {
        let (bytes, _) = drive(READ_BASE, 0x00, &[Int32; 3]);
        assert_eq!(bytes, vec![0x18 + 3, 0x00]);
    }

    #[test]
    fn all_ignored_emits_nothing() {
        let (bytes, wants) = drive(READ_BASE, 0x00, &[Ignore; 4]);
        assert!(bytes.is_empty());
        assert!(wants.iter().all(|w| !w));
    }

    #[test]
    fn alternating_resolutions_each_get_a_header() {
        let (bytes, _) = drive(WRITE_BASE, 0x10, &[Int8, Int16, Int8]);
        assert_eq!(bytes, vec![0x01, 0x10, 0x05, 0x11, 0x01, 0x12]);
    }

    #[test]
    fn register_past_seven_bits_rejected() {
        let mut frame = CanFrame::new();
        let mut writer = FrameWriter::new(&mut frame);
        let resolutions = [Int8, Int8];
        let mut combiner = WriteCombiner::new(WRITE_BASE, 0x100, &resolutions);
        assert_eq!(
            combiner.maybe_write(&mut writer),
            Err(ProtocolError::RegisterOutOfRange(0x100))
        );
    }

    #[test]
    fn finish_before_all_fields_is_an_error() {
        let mut frame = CanFrame::new();
        let mut writer = FrameWriter::new(&mut frame);
        let resolutions = [Int8, Int8, Int8];
        let mut combiner = WriteCombiner::new(WRITE_BASE, 0, &resolutions);
        combiner.maybe_write(&mut writer).unwrap();
        assert_eq!(combiner.remaining(), 2);
        assert_eq!(
            combiner.finish(),
            Err(ProtocolError::CombinerIncomplete {
                expected: 3,
                driven: 1
            })
        );
    }

    #[test]
    fn driving_past_the_end_is_an_error() {
        let mut frame = CanFrame::new();
        let mut writer = FrameWriter::new(&mut frame);
        let resolutions = [Float];
        let mut combiner = WriteCombiner::new(WRITE_BASE, 0, &resolutions);
        assert!(combiner.maybe_write(&mut writer).unwrap());
        assert_eq!(
            combiner.maybe_write(&mut writer),
            Err(ProtocolError::CombinerOverrun { expected: 1 })
        );
    }

    fn resolution() -> impl Strategy<Value = Resolution> {
        prop_oneof![Just(Int8), Just(Int16), Just(Int32), Just(Float), Just(Ignore)]
    }

    proptest! {
        #[test]
        fn one_header_per_maximal_run(resolutions in prop::collection::vec(resolution(), 0..24)) {
            let (bytes, wants) = drive(WRITE_BASE, 0x20, &resolutions);

            let mut expected_len = 0;
            let mut i = 0;
            while i < resolutions.len() {
                let run = resolutions[i..].iter().take_while(|&&r| r == resolutions[i]).count();
                if resolutions[i] != Ignore {
                    expected_len += if run <= 3 { 2 } else { 3 };
                }
                i += run;
            }
            prop_assert_eq!(bytes.len(), expected_len);

            let expected_wants: Vec<bool> = resolutions.iter().map(|&r| r != Ignore).collect();
            prop_assert_eq!(wants, expected_wants);
        }
    }
}
