//! Client side of the Bolt version negotiation.

use bytes::{BufMut, BytesMut};

use super::{BoltVersion, HandshakeError, BOLT_MAGIC, HANDSHAKE_SIZE};

/// What a plain HTTP server sends back: the ASCII bytes `HTTP`.
const HTTP_REPLY: u32 = 0x4854_5450;

/// Builds the opening bytes and interprets the server's choice.
#[derive(Debug, Clone)]
pub struct ClientHandshake {
    proposals: [u32; 4],
}

impl ClientHandshake {
    /// Propose every version in [`BoltVersion::ALL`].
    pub fn new() -> Self {
        Self::with_versions(&BoltVersion::ALL)
    }

    /// Propose up to four versions in preference order.
    pub fn with_versions(versions: &[BoltVersion]) -> Self {
        let mut proposals = [0u32; 4];
        for (slot, version) in proposals.iter_mut().zip(versions) {
            *slot = version.as_u32();
        }
        Self { proposals }
    }

    /// The proposals as sent, zero padded.
    pub fn proposals(&self) -> [u32; 4] {
        self.proposals
    }

    /// Magic preamble followed by the four proposals.
    pub fn request(&self) -> [u8; HANDSHAKE_SIZE] {
        let mut buf = BytesMut::with_capacity(HANDSHAKE_SIZE);
        buf.put_slice(&BOLT_MAGIC);
        for proposal in self.proposals {
            buf.put_u32(proposal);
        }
        let mut out = [0u8; HANDSHAKE_SIZE];
        out.copy_from_slice(&buf);
        out
    }

    /// Interpret the server's four-byte reply.
    pub fn accept(&self, reply: [u8; 4]) -> Result<BoltVersion, HandshakeError> {
        match u32::from_be_bytes(reply) {
            0 => Err(HandshakeError::NoCompatibleVersion),
            HTTP_REPLY => Err(HandshakeError::InvalidData(
                "server responded HTTP; make sure you are not connecting to the http endpoint"
                    .into(),
            )),
            raw if !self.proposals.contains(&raw) => Err(HandshakeError::UnexpectedVersion(raw)),
            raw => BoltVersion::from_u32(raw).ok_or(HandshakeError::UnexpectedVersion(raw)),
        }
    }
}

impl Default for ClientHandshake {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_layout() {
        let request = ClientHandshake::new().request();
        assert_eq!(&request[..4], &BOLT_MAGIC);
        assert_eq!(
            &request[4..],
            &[0, 0, 0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_accept_v1() {
        let hs = ClientHandshake::new();
        assert_eq!(hs.accept([0, 0, 0, 1]), Ok(BoltVersion::V1));
    }

    #[test]
    fn test_accept_rejections() {
        let hs = ClientHandshake::new();
        assert_eq!(hs.accept([0, 0, 0, 0]), Err(HandshakeError::NoCompatibleVersion));
        assert_eq!(
            hs.accept([0, 0, 0, 2]),
            Err(HandshakeError::UnexpectedVersion(2))
        );
        assert!(matches!(hs.accept(*b"HTTP"), Err(HandshakeError::InvalidData(_))));
    }

    #[test]
    fn test_empty_proposal_list() {
        let hs = ClientHandshake::with_versions(&[]);
        assert_eq!(hs.proposals(), [0, 0, 0, 0]);
        // padding slots never count as a proposal
        assert_eq!(hs.accept([0, 0, 0, 1]), Err(HandshakeError::UnexpectedVersion(1)));
    }
}
