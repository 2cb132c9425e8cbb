use crate::error::FramingError;

/// Running UBX checksum: `CK_A += byte; CK_B += CK_A`, both mod 256.
///
/// Covers class, message id, length and payload, never the sync chars.
/// The engine feeds it one byte per header/payload step and compares it
/// with the two trailing bytes; [`ubx_checksum`] does the same for a
/// frame being built.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UbxChecksumCalc {
    ck_a: u8,
    ck_b: u8,
}

impl UbxChecksumCalc {
    pub const fn new() -> Self {
        Self { ck_a: 0, ck_b: 0 }
    }

    /// Adds a run of bytes
    pub const fn update(&mut self, bytes: &[u8]) {
        let mut i = 0;
        while i < bytes.len() {
            self.update_byte(bytes[i]);
            i += 1;
        }
    }

    /// Adds one byte as it comes off the intake
    pub const fn update_byte(&mut self, byte: u8) {
        self.ck_a = self.ck_a.wrapping_add(byte);
        self.ck_b = self.ck_b.wrapping_add(self.ck_a);
    }

    /// `(CK_A, CK_B)` so far
    pub const fn result(self) -> (u8, u8) {
        (self.ck_a, self.ck_b)
    }

    /// Checks the two bytes that ended the frame. On mismatch, `expect` is
    /// what the frame carried and `got` what was computed, both little-endian.
    pub const fn validate_result(
        self,
        received_ck_a: u8,
        received_ck_b: u8,
    ) -> Result<(), FramingError> {
        if self.is_valid(received_ck_a, received_ck_b) {
            Ok(())
        } else {
            Err(FramingError::InvalidChecksum {
                expect: u16::from_le_bytes([received_ck_a, received_ck_b]),
                got: u16::from_le_bytes([self.ck_a, self.ck_b]),
            })
        }
    }

    const fn is_valid(&self, received_ck_a: u8, received_ck_b: u8) -> bool {
        self.ck_a == received_ck_a && self.ck_b == received_ck_b
    }
}

/// Checksum of `data` in one go, as `(CK_A, CK_B)`.
pub const fn ubx_checksum(data: &[u8]) -> (u8, u8) {
    let mut calc = UbxChecksumCalc::new();
    calc.update(data);
    calc.result()
}
