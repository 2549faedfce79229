use moteus_protocol::CanFrame;

use crate::error::Result;

/// Moves whole frames between one session and one device.
///
/// Implementations own addressing, arbitration and timeouts.
pub trait FrameTransport {
    /// Send one completed frame.
    fn transmit(&mut self, frame: &CanFrame) -> Result<()>;

    /// Receive one reply frame, or `None` if the device did not answer.
    fn receive(&mut self) -> Result<Option<CanFrame>>;
}

impl<T: FrameTransport + ?Sized> FrameTransport for &mut T {
    fn transmit(&mut self, frame: &CanFrame) -> Result<()> {
        (**self).transmit(frame)
    }

    fn receive(&mut self) -> Result<Option<CanFrame>> {
        (**self).receive()
    }
}

impl<T: FrameTransport + ?Sized> FrameTransport for Box<T> {
    fn transmit(&mut self, frame: &CanFrame) -> Result<()> {
        (**self).transmit(frame)
    }

    fn receive(&mut self) -> Result<Option<CanFrame>> {
        (**self).receive()
    }
}
