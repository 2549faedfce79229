use std::collections::VecDeque;

use moteus_protocol::CanFrame;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::traits::FrameTransport;

type Responder = Box<dyn FnMut(&CanFrame) -> Option<CanFrame> + Send>;

/// In-memory transport.
///
/// Transmitted frames are recorded. Replies come from frames queued with
/// [`queue_reply`](Self::queue_reply), or from a responder closure that
/// plays the device and answers each transmitted frame.
#[derive(Default)]
pub struct LoopbackTransport {
    sent: Vec<CanFrame>,
    replies: VecDeque<CanFrame>,
    responder: Option<Responder>,
    closed: bool,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport whose device answers each frame with `responder`.
    pub fn with_responder(
        responder: impl FnMut(&CanFrame) -> Option<CanFrame> + Send + 'static,
    ) -> Self {
        Self {
            responder: Some(Box::new(responder)),
            ..Self::default()
        }
    }

    /// Queue a reply to be returned by the next `receive`.
    pub fn queue_reply(&mut self, frame: CanFrame) {
        self.replies.push_back(frame);
    }

    /// Frames transmitted so far, oldest first.
    pub fn sent(&self) -> &[CanFrame] {
        &self.sent
    }

    /// Replies not yet received.
    pub fn pending_replies(&self) -> usize {
        self.replies.len()
    }

    /// Shut the transport down; later calls fail with `Closed`.
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl FrameTransport for LoopbackTransport {
    fn transmit(&mut self, frame: &CanFrame) -> Result<()> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        debug!(len = frame.len(), "loopback transmit");
        self.sent.push(*frame);
        if let Some(responder) = self.responder.as_mut() {
            if let Some(reply) = responder(frame) {
                self.replies.push_back(reply);
            }
        }
        Ok(())
    }

    fn receive(&mut self) -> Result<Option<CanFrame>> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let reply = self.replies.pop_front();
        debug!(received = reply.is_some(), "loopback receive");
        Ok(reply)
    }
}

impl std::fmt::Debug for LoopbackTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackTransport")
            .field("sent", &self.sent.len())
            .field("replies", &self.replies.len())
            .field("responder", &self.responder.is_some())
            .field("closed", &self.closed)
            .finish()
    }
}
