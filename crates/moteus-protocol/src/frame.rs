use bytes::{Buf, BufMut};

use crate::error::{ProtocolError, Result};

/// CAN-FD payload limit in bytes.
pub const MAX_FRAME_SIZE: usize = 64;

/// One CAN-FD payload: a fixed 64-byte buffer plus the number of bytes used.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct CanFrame {
    data: [u8; MAX_FRAME_SIZE],
    size: u8,
}

impl CanFrame {
    /// Create an empty frame.
    pub const fn new() -> Self {
        Self {
            data: [0; MAX_FRAME_SIZE],
            size: 0,
        }
    }

    /// Copy a received payload into a frame.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let mut frame = Self::new();
        frame.extend(bytes)?;
        Ok(frame)
    }

    /// The used portion of the payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    pub fn len(&self) -> usize {
        usize::from(self.size)
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Bytes still available before the frame is full.
    pub fn remaining(&self) -> usize {
        MAX_FRAME_SIZE - self.len()
    }

    pub fn clear(&mut self) {
        self.data = [0; MAX_FRAME_SIZE];
        self.size = 0;
    }

    /// Append raw bytes, failing without modification if they do not fit.
    pub fn extend(&mut self, bytes: &[u8]) -> Result<()> {
        let mut dst = self.reserve(bytes.len())?;
        dst.put_slice(bytes);
        Ok(())
    }

    /// Append one little-endian value.
    pub(crate) fn put<T: WireValue>(&mut self, value: T) -> Result<()> {
        let mut dst = self.reserve(T::SIZE)?;
        value.put(&mut dst);
        Ok(())
    }

    fn reserve(&mut self, len: usize) -> Result<&mut [u8]> {
        let start = self.len();
        let needed = start + len;
        if needed > MAX_FRAME_SIZE {
            return Err(ProtocolError::Overflow {
                needed,
                capacity: MAX_FRAME_SIZE,
            });
        }
        // needed <= 64 so it always fits the u8 size field.
        self.size = needed as u8;
        Ok(&mut self.data[start..needed])
    }
}

impl Default for CanFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for CanFrame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Debug for CanFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CanFrame[")?;
        for (i, byte) in self.as_bytes().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02x}")?;
        }
        write!(f, "]")
    }
}

/// A fixed-width value with a little-endian wire encoding.
pub trait WireValue: Copy {
    const SIZE: usize;

    fn put(self, dst: &mut impl BufMut);

    fn get(src: &mut impl Buf) -> Self;
}

macro_rules! impl_wire_value {
    ($ty:ty, $put:ident, $get:ident) => {
        impl WireValue for $ty {
            const SIZE: usize = std::mem::size_of::<$ty>();

            fn put(self, dst: &mut impl BufMut) {
                dst.$put(self);
            }

            fn get(src: &mut impl Buf) -> Self {
                src.$get()
            }
        }
    };
}

impl_wire_value!(u8, put_u8, get_u8);
impl_wire_value!(i8, put_i8, get_i8);
impl_wire_value!(i16, put_i16_le, get_i16_le);
impl_wire_value!(i32, put_i32_le, get_i32_le);
impl_wire_value!(f32, put_f32_le, get_f32_le);
