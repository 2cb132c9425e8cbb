use thiserror::Error;

/// Recoverable problems found while framing the incoming byte stream.
///
/// All of them are handled the same way by the engine: the error is
/// recorded, any payload owned by the message in flight is released and
/// framing restarts from idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FramingError {
    #[error("timed out waiting for the next byte of an incoming message")]
    IncomingTimeout,
    #[error("expected second sync char 0x62, got {0:#04x}")]
    BadSync(u8),
    #[error("declared payload length {len} exceeds the {max} byte limit")]
    PayloadTooLarge { len: usize, max: usize },
    #[error("not valid packet's checksum, expect {expect:x}, got {got:x}")]
    InvalidChecksum { expect: u16, got: u16 },
    #[error("invalid packet ({class:#04x}/{id:#04x}) length, expect at least {expect}, got {got}")]
    InvalidPacketLen {
        class: u8,
        id: u8,
        expect: usize,
        got: usize,
    },
    #[error("sentence not terminated by <CR><LF>")]
    MissingLineFeed,
    #[error("sentence exceeds {0} bytes without <CR>")]
    SentenceTooLong(usize),
}

impl FramingError {
    /// Stable numeric code, suitable for an error register or a counter index.
    pub const fn code(&self) -> u8 {
        match self {
            FramingError::IncomingTimeout => 1,
            FramingError::BadSync(_) => 2,
            FramingError::PayloadTooLarge { .. } => 3,
            FramingError::InvalidChecksum { .. } => 4,
            FramingError::InvalidPacketLen { .. } => 5,
            FramingError::MissingLineFeed => 6,
            FramingError::SentenceTooLong(_) => 7,
        }
    }
}

/// Engine-level failures.
///
/// [`crate::Engine::poll`] returns only `UnknownClass`; `LedgerFull` comes
/// from [`crate::Ledger::register`] when a request cannot be tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Returned by `poll`: the receiver sent a frame of a class this engine
    /// has no table entry for. The engine is back in idle, but the protocol
    /// tables need fixing.
    #[error("received frame of unknown class {class:#04x} (id {id:#04x})")]
    UnknownClass { class: u8, id: u8 },
    /// Returned by `Ledger::register`
    #[error("request ledger is full, cannot track {class:#04x}/{id:#04x}")]
    LedgerFull { class: u8, id: u8 },
}

/// Error that possible while building and queueing an outbound frame
#[derive(Debug, PartialEq, Eq, Error)]
pub enum SendError<E> {
    #[error("payload of {len} bytes exceeds the {max} byte frame limit")]
    PayloadTooLarge { len: usize, max: usize },
    #[error("request ledger is full, cannot track {class:#04x}/{id:#04x}")]
    LedgerFull { class: u8, id: u8 },
    #[error("transport failed to queue frame: {0:?}")]
    Transport(E),
}

/// Outcome of a failed sentence field extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("sentence has no such field")]
    Missing,
    /// The output holds the leading part of the field.
    #[error("field longer than the extraction limit")]
    Truncated,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framing_codes_are_distinct() {
        let errors = [
            FramingError::IncomingTimeout,
            FramingError::BadSync(0),
            FramingError::PayloadTooLarge { len: 0, max: 0 },
            FramingError::InvalidChecksum { expect: 0, got: 0 },
            FramingError::InvalidPacketLen {
                class: 0,
                id: 0,
                expect: 0,
                got: 0,
            },
            FramingError::MissingLineFeed,
            FramingError::SentenceTooLong(0),
        ];
        for (i, a) in errors.iter().enumerate() {
            for b in &errors[i + 1..] {
                assert_ne!(a.code(), b.code(), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn checksum_message_matches_parser_wording() {
        let err = FramingError::InvalidChecksum {
            expect: 0x380f,
            got: 0x3c13,
        };
        assert_eq!(
            err.to_string(),
            "not valid packet's checksum, expect 380f, got 3c13"
        );
    }
}
