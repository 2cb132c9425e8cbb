pub const UBX_SYNC_CHAR_1: u8 = 0xb5;
pub const UBX_SYNC_CHAR_2: u8 = 0x62;
pub(crate) const UBX_SYNC_SIZE: usize = 2;
/// class (1) + msg id (1) + length (2)
pub(crate) const UBX_HEADER_FIELDS_LEN: usize = 4;
pub(crate) const UBX_CHECKSUM_LEN: usize = 2;
/// Bytes a UBX frame carries on top of its payload
pub const UBX_FRAME_OVERHEAD: usize = UBX_SYNC_SIZE + UBX_HEADER_FIELDS_LEN + UBX_CHECKSUM_LEN;

/// Largest inbound or outbound UBX payload this engine will hold.
pub const UBX_MAX_PAYLOAD_LEN: usize = 256;
pub const UBX_MAX_FRAME_LEN: usize = UBX_MAX_PAYLOAD_LEN + UBX_FRAME_OVERHEAD;

pub const NMEA_SYNC_CHAR: u8 = b'$';
pub const NMEA_CHECKSUM_CHAR: u8 = b'*';
pub const NMEA_FIELD_SEPARATOR: u8 = b',';
pub const NMEA_END_CHAR_1: u8 = b'\r';
pub const NMEA_END_CHAR_2: u8 = b'\n';
pub(crate) const NMEA_MAX_SENTENCE_LENGTH: usize = 82; // including <CR><LF>

/// Capacity of a single extracted sentence field
pub const MAX_FIELD_LEN: usize = 16;
/// Capacity of the display strings in [`crate::FixRecord`]
pub const TEXT_LEN: usize = 24;
/// Number of (id, signal) slots in one satellite table
pub const SV_TABLE_LEN: usize = 16;
/// Records carried by one satellites-in-view sentence
pub(crate) const SV_PER_SENTENCE: usize = 4;

/// Outstanding requests and unread failures the ledger can hold
pub const LEDGER_CAPACITY: usize = 8;
