use crate::{
    constants::{MAX_FIELD_LEN, NMEA_MAX_SENTENCE_LENGTH},
    nmea::SentenceKind,
};

/// Sentence addresses (`GPGGA`, ...) in [`SentenceKind::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentenceTable([&'static str; 4]);

impl SentenceTable {
    /// `addresses[i]` identifies `SentenceKind::ALL[i]`.
    pub const fn new(addresses: [&'static str; 4]) -> Self {
        Self(addresses)
    }

    pub fn kind_of(&self, address: &[u8]) -> Option<SentenceKind> {
        self.0
            .iter()
            .position(|known| known.as_bytes() == address)
            .map(|i| SentenceKind::ALL[i])
    }

    pub fn address_of(&self, kind: SentenceKind) -> &'static str {
        let index = SentenceKind::ALL
            .iter()
            .position(|k| *k == kind)
            .unwrap_or_default();
        self.0[index]
    }
}

impl Default for SentenceTable {
    fn default() -> Self {
        Self::new(["GPGGA", "GPGSA", "GPVTG", "GPGSV"])
    }
}

/// Engine tuning. Times are in milliseconds of the caller's tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Longest sentence field kept; longer fields are treated as unusable.
    /// Capped at [`MAX_FIELD_LEN`].
    pub max_field_len: usize,

    /// Longest sentence, `$` through `<LF>`. A sentence that cannot end
    /// within this many bytes is dropped as garbage.
    pub max_sentence_len: usize,

    /// Longest gap between two bytes of one message
    pub incoming_timeout_ms: u32,

    /// How long a request may wait for its acknowledgement
    pub response_timeout_ms: u32,

    /// Period of the fix summary written to the log; `None` disables it
    pub report_interval_ms: Option<u32>,

    pub sentence_addresses: SentenceTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_field_len: MAX_FIELD_LEN,
            max_sentence_len: NMEA_MAX_SENTENCE_LENGTH,
            incoming_timeout_ms: 250,
            response_timeout_ms: 3_000,
            report_interval_ms: None,
            sentence_addresses: SentenceTable::default(),
        }
    }
}

impl Config {
    pub fn with_max_field_len(mut self, len: usize) -> Self {
        self.max_field_len = len.min(MAX_FIELD_LEN);
        self
    }

    pub fn with_max_sentence_len(mut self, len: usize) -> Self {
        self.max_sentence_len = len;
        self
    }

    pub fn with_incoming_timeout(mut self, ms: u32) -> Self {
        self.incoming_timeout_ms = ms;
        self
    }

    pub fn with_response_timeout(mut self, ms: u32) -> Self {
        self.response_timeout_ms = ms;
        self
    }

    pub fn with_report_interval(mut self, ms: Option<u32>) -> Self {
        self.report_interval_ms = ms;
        self
    }

    pub fn with_sentence_addresses(mut self, table: SentenceTable) -> Self {
        self.sentence_addresses = table;
        self
    }
}
