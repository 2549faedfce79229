use moteus_transport::FrameTransport;
use tracing::{info, warn};

use crate::error::{Result, SessionError};
use crate::session::{Session, SessionConfig};

/// Several independent sessions, one per device id.
///
/// The set only constructs and looks up sessions; it does not schedule or
/// arbitrate between them.
#[derive(Debug)]
pub struct DeviceSet<T> {
    sessions: Vec<Session<T>>,
}

impl<T: FrameTransport> DeviceSet<T> {
    /// Create one session per `(id, transport)` pair with default
    /// configuration.
    pub fn new(devices: impl IntoIterator<Item = (u8, T)>) -> Result<Self> {
        Self::with_config(devices, SessionConfig::default())
    }

    /// Create one session per `(id, transport)` pair sharing `config`.
    pub fn with_config(
        devices: impl IntoIterator<Item = (u8, T)>,
        config: SessionConfig,
    ) -> Result<Self> {
        let mut sessions: Vec<Session<T>> = Vec::new();
        for (id, transport) in devices {
            if sessions.iter().any(|session| session.id() == id) {
                return Err(SessionError::DuplicateDevice(id));
            }
            sessions.push(Session::with_config(id, transport, config));
        }
        info!(devices = sessions.len(), "device set ready");
        Ok(Self { sessions })
    }

    /// Pair parallel lists of ids and transports.
    pub fn from_parts(ids: Vec<u8>, transports: Vec<T>) -> Result<Self> {
        if ids.len() != transports.len() {
            return Err(SessionError::LengthMismatch {
                ids: ids.len(),
                transports: transports.len(),
            });
        }
        Self::new(ids.into_iter().zip(transports))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Device ids in construction order.
    pub fn ids(&self) -> impl Iterator<Item = u8> + '_ {
        self.sessions.iter().map(Session::id)
    }

    pub fn session(&self, id: u8) -> Result<&Session<T>> {
        self.sessions
            .iter()
            .find(|session| session.id() == id)
            .ok_or(SessionError::UnknownDevice(id))
    }

    pub fn session_mut(&mut self, id: u8) -> Result<&mut Session<T>> {
        self.sessions
            .iter_mut()
            .find(|session| session.id() == id)
            .ok_or(SessionError::UnknownDevice(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Session<T>> {
        self.sessions.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Session<T>> {
        self.sessions.iter_mut()
    }

    /// Send a stop command to every device.
    ///
    /// Every device is tried; the first failure is returned afterwards.
    pub fn stop_all(&mut self) -> Result<()> {
        let mut first_error = None;
        for session in &mut self.sessions {
            if let Err(err) = session.set_stop() {
                warn!(device = session.id(), error = %err, "stop failed");
                first_error.get_or_insert(err);
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Consume the set and return its sessions.
    pub fn into_sessions(self) -> Vec<Session<T>> {
        self.sessions
    }
}

#[cfg(test)]
mod tests {
    use moteus_protocol::CanFrame;
    use moteus_transport::LoopbackTransport;

    use super::*;

    fn quiet() -> SessionConfig {
        SessionConfig {
            reply_required: false,
            ..SessionConfig::default()
        }
    }

    #[test]
    fn builds_one_session_per_device() {
        let set = DeviceSet::with_config(
            [(1, LoopbackTransport::new()), (2, LoopbackTransport::new())],
            quiet(),
        )
        .unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.ids().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(set.session(2).unwrap().id(), 2);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let err = DeviceSet::new([(1, LoopbackTransport::new()), (1, LoopbackTransport::new())])
            .unwrap_err();
        assert!(matches!(err, SessionError::DuplicateDevice(1)));
    }

    #[test]
    fn mismatched_parts_rejected() {
        let err = DeviceSet::from_parts(vec![1, 2, 3], vec![LoopbackTransport::new()]).unwrap_err();
        assert!(matches!(
            err,
            SessionError::LengthMismatch {
                ids: 3,
                transports: 1
            }
        ));
    }

    #[test]
    fn unknown_device_lookup_fails() {
        let mut set = DeviceSet::new([(7, LoopbackTransport::new())]).unwrap();
        assert!(matches!(set.session(8), Err(SessionError::UnknownDevice(8))));
        assert!(matches!(set.session_mut(9), Err(SessionError::UnknownDevice(9))));
    }

    #[test]
    fn stop_all_reaches_every_device() {
        let mut set = DeviceSet::with_config(
            [(1, LoopbackTransport::new()), (2, LoopbackTransport::new())],
            quiet(),
        )
        .unwrap();
        set.stop_all().unwrap();

        for session in set.iter() {
            assert_eq!(session.get_ref().sent()[0].as_bytes(), &[0x01, 0x00, 0x00]);
        }
    }

    #[test]
    fn stop_all_continues_past_failures() {
        let mut broken = LoopbackTransport::new();
        broken.close();
        let mut set =
            DeviceSet::with_config([(1, broken), (2, LoopbackTransport::new())], quiet()).unwrap();

        assert!(set.stop_all().is_err());
        assert_eq!(set.session(2).unwrap().get_ref().sent().len(), 1);
    }

    #[test]
    fn sessions_are_independent() {
        let mut set = DeviceSet::from_parts(
            vec![1, 2],
            vec![LoopbackTransport::new(), LoopbackTransport::new()],
        )
        .unwrap();
        set.session_mut(1)
            .unwrap()
            .get_mut()
            .queue_reply(CanFrame::from_slice(&[0x50]).unwrap());

        assert_eq!(set.session(1).unwrap().get_ref().pending_replies(), 1);
        assert_eq!(set.session(2).unwrap().get_ref().pending_replies(), 0);
        assert_eq!(set.iter_mut().count(), 2);
        assert_eq!(set.into_sessions().len(), 2);
    }
}
