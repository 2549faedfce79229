use moteus_protocol::{
    emit_position_command, emit_query_command, emit_stop_command, emit_within_command,
    parse_query_result, CanFrame, FrameWriter, PositionCommand, PositionResolution, QueryCommand,
    QueryResult, WithinCommand, WithinResolution,
};
use moteus_transport::FrameTransport;
use tracing::{debug, warn};

use crate::error::{Result, SessionError};

/// Configuration for a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    /// Registers requested by `query` and appended to commands.
    pub query: QueryCommand,
    /// Resolutions used by `set_position`.
    pub position_resolution: PositionResolution,
    /// Resolutions used by `set_within`.
    pub within_resolution: WithinResolution,
    /// Append the query to every command and wait for the reply.
    pub reply_required: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            query: QueryCommand::default(),
            position_resolution: PositionResolution::default(),
            within_resolution: WithinResolution::default(),
            reply_required: true,
        }
    }
}

/// Command session with a single controller.
///
/// Each operation builds a complete frame before anything is sent, so an
/// encode failure never reaches the transport.
pub struct Session<T> {
    id: u8,
    transport: T,
    config: SessionConfig,
}

impl<T: FrameTransport> Session<T> {
    /// Create a session with default configuration.
    pub fn new(id: u8, transport: T) -> Self {
        Self::with_config(id, transport, SessionConfig::default())
    }

    /// Create a session with explicit configuration.
    pub fn with_config(id: u8, transport: T, config: SessionConfig) -> Self {
        Self {
            id,
            transport,
            config,
        }
    }

    /// Device id this session talks to.
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Stop the controller.
    pub fn set_stop(&mut self) -> Result<Option<QueryResult>> {
        self.execute(|writer| emit_stop_command(writer))
    }

    /// Command a position using the configured resolutions.
    pub fn set_position(&mut self, command: &PositionCommand) -> Result<Option<QueryResult>> {
        let resolution = self.config.position_resolution;
        self.set_position_with(command, &resolution)
    }

    /// Command a position with explicit resolutions.
    pub fn set_position_with(
        &mut self,
        command: &PositionCommand,
        resolution: &PositionResolution,
    ) -> Result<Option<QueryResult>> {
        self.execute(|writer| emit_position_command(writer, command, resolution))
    }

    /// Hold the output within bounds using the configured resolutions.
    pub fn set_within(&mut self, command: &WithinCommand) -> Result<Option<QueryResult>> {
        let resolution = self.config.within_resolution;
        self.set_within_with(command, &resolution)
    }

    /// Hold the output within bounds with explicit resolutions.
    pub fn set_within_with(
        &mut self,
        command: &WithinCommand,
        resolution: &WithinResolution,
    ) -> Result<Option<QueryResult>> {
        self.execute(|writer| emit_within_command(writer, command, resolution))
    }

    /// Query the configured status registers.
    pub fn query(&mut self) -> Result<QueryResult> {
        if !self.config.query.any_set() {
            return Err(SessionError::NothingToQuery);
        }
        let query = self.config.query;
        let mut frame = CanFrame::new();
        emit_query_command(&mut FrameWriter::new(&mut frame), &query)?;
        self.transmit_frame(&frame)?;
        self.receive_reply()
    }

    /// Send one already-encoded frame.
    pub fn transmit_frame(&mut self, frame: &CanFrame) -> Result<()> {
        debug!(device = self.id, len = frame.len(), "transmit frame");
        self.transport.transmit(frame)?;
        Ok(())
    }

    /// Receive one raw frame from the device, if it sent one.
    pub fn receive_frame(&mut self) -> Result<Option<CanFrame>> {
        let frame = self.transport.receive()?;
        if let Some(frame) = &frame {
            debug!(device = self.id, len = frame.len(), "received frame");
        }
        Ok(frame)
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the session and return the transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Current session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Replace the configuration for subsequent commands.
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    fn execute(
        &mut self,
        build: impl FnOnce(&mut FrameWriter<'_>) -> moteus_protocol::Result<()>,
    ) -> Result<Option<QueryResult>> {
        let expects_reply = self.config.reply_required && self.config.query.any_set();

        let mut frame = CanFrame::new();
        {
            let mut writer = FrameWriter::new(&mut frame);
            build(&mut writer)?;
            if expects_reply {
                emit_query_command(&mut writer, &self.config.query)?;
            }
        }

        self.transmit_frame(&frame)?;
        if !expects_reply {
            return Ok(None);
        }
        self.receive_reply().map(Some)
    }

    fn receive_reply(&mut self) -> Result<QueryResult> {
        match self.receive_frame()? {
            Some(reply) => Ok(parse_query_result(reply.as_bytes())),
            None => {
                warn!(device = self.id, "no reply");
                Err(SessionError::NoReply(self.id))
            }
        }
    }
}

impl<T> std::fmt::Debug for Session<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use moteus_protocol::multiplex::{REPLY_INT16, REPLY_INT8};
    use moteus_protocol::{Mode, ProtocolError, Resolution};
    use moteus_transport::LoopbackTransport;

    use super::*;

    fn status_reply() -> CanFrame {
        let mut bytes = vec![REPLY_INT16 + 2, 0x00];
        bytes.extend_from_slice(&10i16.to_le_bytes());
        bytes.extend_from_slice(&2500i16.to_le_bytes());
        bytes.extend_from_slice(&[REPLY_INT8 + 1, 0x0d, 48]);
        CanFrame::from_slice(&bytes).unwrap()
    }

    fn answering_session() -> Session<LoopbackTransport> {
        Session::new(1, LoopbackTransport::with_responder(|_| Some(status_reply())))
    }

    #[test]
    fn stop_appends_query_and_decodes_reply() {
        let mut session = answering_session();
        let result = session.set_stop().unwrap().expect("reply expected");

        assert_eq!(result.mode, Mode::Position);
        assert!((result.position - 0.25).abs() < 1e-12);
        assert_eq!(result.voltage, 24.0);

        let sent = session.get_ref().sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(&sent[0].as_bytes()[..3], &[0x01, 0x00, 0x00]);
        assert_eq!(sent[0].len(), 3 + 7);
    }

    #[test]
    fn fire_and_forget_when_reply_not_required() {
        let config = SessionConfig {
            reply_required: false,
            ..SessionConfig::default()
        };
        let mut session = Session::with_config(2, LoopbackTransport::new(), config);

        assert!(session.set_stop().unwrap().is_none());
        assert_eq!(session.get_ref().sent()[0].as_bytes(), &[0x01, 0x00, 0x00]);
    }

    #[test]
    fn position_uses_configured_resolution() {
        let mut session = answering_session();
        session.set_config(SessionConfig {
            position_resolution: PositionResolution {
                position: Resolution::Int16,
                velocity: Resolution::Ignore,
                feedforward_torque: Resolution::Ignore,
                kp_scale: Resolution::Ignore,
                kd_scale: Resolution::Ignore,
                maximum_torque: Resolution::Ignore,
                stop_position: Resolution::Ignore,
                watchdog_timeout: Resolution::Ignore,
            },
            reply_required: false,
            ..SessionConfig::default()
        });

        let command = PositionCommand {
            position: 0.5,
            ..PositionCommand::default()
        };
        session.set_position(&command).unwrap();
        assert_eq!(
            session.get_ref().sent()[0].as_bytes(),
            &[0x01, 0x00, 0x0a, 0x05, 0x20, 0x88, 0x13]
        );
    }

    #[test]
    fn within_command_is_sent() {
        let mut session = answering_session();
        let result = session.set_within(&WithinCommand::default()).unwrap();
        assert!(result.is_some());
        assert_eq!(session.get_ref().sent()[0].as_bytes()[2], 0x0d);
    }

    #[test]
    fn missing_reply_is_an_error() {
        let mut session = Session::new(3, LoopbackTransport::new());
        assert!(matches!(session.query(), Err(SessionError::NoReply(3))));
    }

    #[test]
    fn empty_query_is_rejected_before_sending() {
        let config = SessionConfig {
            query: QueryCommand::none(),
            ..SessionConfig::default()
        };
        let mut session = Session::with_config(4, LoopbackTransport::new(), config);
        assert!(matches!(session.query(), Err(SessionError::NothingToQuery)));
        assert!(session.get_ref().sent().is_empty());

        // Commands still go out, without expecting a reply.
        assert!(session.set_stop().unwrap().is_none());
    }

    #[test]
    fn encode_failure_sends_nothing() {
        let mut session = answering_session();
        let err = session
            .execute(|writer| {
                for _ in 0..17 {
                    writer.write(0.0f32)?;
                }
                Ok(())
            })
            .unwrap_err();
        assert!(matches!(err, SessionError::Protocol(ProtocolError::Overflow { .. })));
        assert!(session.get_ref().sent().is_empty());
    }

    #[test]
    fn raw_frames_pass_through() {
        let mut transport = LoopbackTransport::new();
        transport.queue_reply(CanFrame::from_slice(&[0x50]).unwrap());
        let mut session = Session::new(5, transport);

        session
            .transmit_frame(&CanFrame::from_slice(&[0x50, 0x50]).unwrap())
            .unwrap();
        assert_eq!(session.receive_frame().unwrap().unwrap().as_bytes(), &[0x50]);
        assert!(session.receive_frame().unwrap().is_none());
        assert_eq!(session.into_inner().sent().len(), 1);
    }
}
