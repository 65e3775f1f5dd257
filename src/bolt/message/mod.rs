//! Bolt v1 message types.
//!
//! Every message is a PackStream structure whose signature byte names the
//! message and whose fields follow a fixed layout. The `Display` impls
//! render the canonical one-line form used in message traces, e.g.
//! `[RUN "RETURN 1" {}]` or `[FAILURE Neo.ClientError.Statement.SyntaxError "..."]`.

pub mod request;
pub mod response;

pub use request::*;
pub use response::*;

use crate::bolt::packstream::{PackStreamError, PackStreamStructure};

/// Bolt v1 message signatures.
pub mod tag {
    /// INIT (0x01)
    pub const INIT: u8 = 0x01;
    /// ACK_FAILURE (0x0E)
    pub const ACK_FAILURE: u8 = 0x0E;
    /// RESET (0x0F)
    pub const RESET: u8 = 0x0F;
    /// RUN (0x10)
    pub const RUN: u8 = 0x10;
    /// DISCARD_ALL (0x2F)
    pub const DISCARD_ALL: u8 = 0x2F;
    /// PULL_ALL (0x3F)
    pub const PULL_ALL: u8 = 0x3F;

    /// SUCCESS (0x70)
    pub const SUCCESS: u8 = 0x70;
    /// RECORD (0x71)
    pub const RECORD: u8 = 0x71;
    /// IGNORED (0x7E)
    pub const IGNORED: u8 = 0x7E;
    /// FAILURE (0x7F)
    pub const FAILURE: u8 = 0x7F;
}

/// Reject a structure whose field count differs from the message layout.
pub(crate) fn expect_arity(
    s: &PackStreamStructure,
    name: &str,
    allowed: &[usize],
) -> Result<(), PackStreamError> {
    if allowed.contains(&s.fields.len()) {
        Ok(())
    } else {
        Err(PackStreamError::InvalidStructure(format!(
            "{} expects {} field(s), got {}",
            name,
            allowed
                .iter()
                .map(|n| n.to_string())
                .collect::<Vec<_>>()
                .join(" or "),
            s.fields.len()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_and_response_tags_are_distinct() {
        let requests = [
            tag::INIT,
            tag::ACK_FAILURE,
            tag::RESET,
            tag::RUN,
            tag::DISCARD_ALL,
            tag::PULL_ALL,
        ];
        let responses = [tag::SUCCESS, tag::RECORD, tag::IGNORED, tag::FAILURE];
        for r in requests {
            assert!(!responses.contains(&r));
        }
    }

    #[test]
    fn test_expect_arity_message() {
        let s = PackStreamStructure::new(tag::IGNORED, vec![]);
        assert!(expect_arity(&s, "IGNORED", &[0, 1]).is_ok());

        let err = expect_arity(&s, "RUN", &[2]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid structure: RUN expects 2 field(s), got 0"
        );
    }
}
