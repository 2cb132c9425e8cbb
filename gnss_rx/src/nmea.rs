//! Comma-delimited sentence protocol: `$ADDR,f1,...,fN*HH<CR><LF>`.

mod decode;
mod numeric;

pub(crate) use decode::{process, Processed};

use crate::{
    constants::{
        MAX_FIELD_LEN, NMEA_CHECKSUM_CHAR, NMEA_END_CHAR_1, NMEA_END_CHAR_2,
        NMEA_FIELD_SEPARATOR, NMEA_SYNC_CHAR,
    },
    error::FieldError,
    intake::ByteView,
};

/// Output buffer for [`Sentence::extract_field`].
pub type Field = heapless::Vec<u8, MAX_FIELD_LEN>;

/// The four sentence kinds the decoder understands. The order matches the
/// address order in [`crate::SentenceTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SentenceKind {
    /// time, latitude, longitude, satellites used, altitude (GGA)
    Position,
    /// 2D/3D fix mode (GSA)
    FixQuality,
    /// course and ground speed (VTG)
    SpeedHeading,
    /// one part of a satellites-in-view series (GSV)
    SatellitesInView,
}

impl SentenceKind {
    pub const ALL: [SentenceKind; 4] = [
        SentenceKind::Position,
        SentenceKind::FixQuality,
        SentenceKind::SpeedHeading,
        SentenceKind::SatellitesInView,
    ];
}

/// A complete sentence span, starting at `$`.
pub struct Sentence<'v, V: ?Sized> {
    bytes: &'v V,
    field_limit: usize,
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        _ => None,
    }
}

const fn ends_field(byte: u8) -> bool {
    matches!(
        byte,
        NMEA_FIELD_SEPARATOR | NMEA_CHECKSUM_CHAR | NMEA_END_CHAR_1 | NMEA_END_CHAR_2
    )
}

impl<'v, V: ByteView + ?Sized> Sentence<'v, V> {
    pub fn new(bytes: &'v V) -> Self {
        Self {
            bytes,
            field_limit: MAX_FIELD_LEN,
        }
    }

    /// Caps extracted fields at `limit` bytes (never more than [`MAX_FIELD_LEN`]).
    pub fn with_field_limit(mut self, limit: usize) -> Self {
        self.field_limit = limit.min(MAX_FIELD_LEN);
        self
    }

    /// Checks the leading `$` and the XOR checksum over everything between
    /// `$` and `*`. Anything after the two hex digits must be `<CR>`.
    pub fn verify(&self) -> bool {
        let bytes = self.bytes;
        if bytes.is_empty() || bytes.byte_at(0) != NMEA_SYNC_CHAR {
            return false;
        }

        let mut sum = 0u8;
        let mut pos = 1;
        loop {
            if pos >= bytes.len() {
                return false;
            }
            match bytes.byte_at(pos) {
                NMEA_CHECKSUM_CHAR => break,
                NMEA_SYNC_CHAR | NMEA_END_CHAR_1 | NMEA_END_CHAR_2 => return false,
                byte => sum ^= byte,
            }
            pos += 1;
        }

        if pos + 2 >= bytes.len() {
            return false;
        }
        let (Some(hi), Some(lo)) = (
            hex_value(bytes.byte_at(pos + 1)),
            hex_value(bytes.byte_at(pos + 2)),
        ) else {
            return false;
        };
        if pos + 3 < bytes.len() && bytes.byte_at(pos + 3) != NMEA_END_CHAR_1 {
            return false;
        }
        ((hi << 4) | lo) == sum
    }

    /// Copies field `n` into `out`. Field 0 is the address. Fields are
    /// separated by `,` and the last one ends at `*`.
    ///
    /// The sentence is only read, so calls can be repeated in any order.
    /// An empty field is `Ok` with `out` empty.
    pub fn extract_field(&self, n: usize, out: &mut Field) -> Result<(), FieldError> {
        let bytes = self.bytes;
        out.clear();

        // transient cursor, starts after the `$`
        let mut cursor = 1;
        let mut index = 0;
        while index < n {
            if cursor >= bytes.len() {
                return Err(FieldError::Missing);
            }
            match bytes.byte_at(cursor) {
                NMEA_FIELD_SEPARATOR => index += 1,
                NMEA_CHECKSUM_CHAR | NMEA_END_CHAR_1 | NMEA_END_CHAR_2 => {
                    return Err(FieldError::Missing)
                },
                _ => {},
            }
            cursor += 1;
        }

        let mut truncated = false;
        while cursor < bytes.len() {
            let byte = bytes.byte_at(cursor);
            if ends_field(byte) {
                break;
            }
            if out.len() < self.field_limit {
                // field_limit never exceeds the capacity of `out`
                let _ = out.push(byte);
            } else {
                truncated = true;
            }
            cursor += 1;
        }

        if truncated {
            Err(FieldError::Truncated)
        } else {
            Ok(())
        }
    }

    /// Field `n` when present, complete and non-empty.
    pub(crate) fn field(&self, n: usize) -> Option<Field> {
        let mut out = Field::new();
        match self.extract_field(n, &mut out) {
            Ok(()) if !out.is_empty() => Some(out),
            Ok(()) | Err(FieldError::Missing) => None,
            Err(FieldError::Truncated) => {
                log::debug!("field {n} truncated to {} bytes", out.len());
                None
            },
        }
    }
}

/// Builds `$body*HH<CR><LF>` with the correct checksum.
#[cfg(test)]
pub(crate) fn with_checksum(body: &str) -> std::string::String {
    let sum = body.bytes().fold(0u8, |acc, b| acc ^ b);
    format!("${body}*{sum:02X}\r\n")
}
