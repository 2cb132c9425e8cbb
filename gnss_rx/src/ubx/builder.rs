use super::checksum::ubx_checksum;
use crate::{
    constants::{
        UBX_MAX_FRAME_LEN, UBX_MAX_PAYLOAD_LEN, UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2, UBX_SYNC_SIZE,
    },
    error::SendError,
};

/// Scratch space for one outbound frame
pub type Frame = heapless::Vec<u8, UBX_MAX_FRAME_LEN>;

/// Where finished outbound frames go, usually the serial port's transmit
/// queue. The engine never waits for the bytes to leave the wire.
pub trait Transport {
    type Error: core::fmt::Debug;

    /// Queues a complete frame, sync chars through checksum.
    fn queue(&mut self, frame: &[u8]) -> Result<(), Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    type Error = T::Error;

    fn queue(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        (**self).queue(frame)
    }
}

#[cfg(feature = "std")]
impl Transport for std::vec::Vec<u8> {
    type Error = core::convert::Infallible;

    fn queue(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        self.extend_from_slice(frame);
        Ok(())
    }
}

/// Returned by the `heapless::Vec` transport when the frame does not fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull;

impl<const N: usize> Transport for heapless::Vec<u8, N> {
    type Error = QueueFull;

    fn queue(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        if self.capacity() - self.len() < frame.len() {
            return Err(QueueFull);
        }
        self.extend_from_slice(frame).map_err(|_| QueueFull)
    }
}

/// Lays out `sync1 sync2 class id len_lo len_hi payload ck_a ck_b`.
///
/// The checksum runs over class through the end of the payload.
pub fn build_frame<E>(class: u8, id: u8, payload: &[u8]) -> Result<Frame, SendError<E>> {
    let len = u16::try_from(payload.len())
        .ok()
        .filter(|&len| usize::from(len) <= UBX_MAX_PAYLOAD_LEN)
        .ok_or(SendError::PayloadTooLarge {
            len: payload.len(),
            max: UBX_MAX_PAYLOAD_LEN,
        })?;

    let mut frame = Frame::new();
    let [len_lo, len_hi] = len.to_le_bytes();
    let overflow = |_| SendError::PayloadTooLarge {
        len: payload.len(),
        max: UBX_MAX_PAYLOAD_LEN,
    };
    frame
        .extend_from_slice(&[UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2, class, id, len_lo, len_hi])
        .map_err(overflow)?;
    frame.extend_from_slice(payload).map_err(overflow)?;
    let (ck_a, ck_b) = ubx_checksum(&frame[UBX_SYNC_SIZE..]);
    frame.extend_from_slice(&[ck_a, ck_b]).map_err(overflow)?;
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ubx::{class, mon, UbxChecksumCalc};
    use core::convert::Infallible;

    #[test]
    fn mon_ver_poll_frame() {
        let frame = build_frame::<Infallible>(class::MON, mon::VER, &[]).unwrap();
        assert_eq!(&frame[..], &[0xb5, 0x62, 0x0a, 0x04, 0x00, 0x00, 0x0e, 0x34]);
    }

    #[test]
    fn built_frame_rechecks() {
        let payload = [0x01, 0x02, 0x03, 0xfe, 0xff];
        let frame = build_frame::<Infallible>(class::CFG, 0x01, &payload).unwrap();
        assert_eq!(frame.len(), payload.len() + 8);
        assert_eq!(frame[4], payload.len() as u8);
        assert_eq!(frame[5], 0);

        let n = frame.len();
        let mut calc = UbxChecksumCalc::new();
        calc.update(&frame[2..n - 2]);
        assert_eq!(calc.validate_result(frame[n - 2], frame[n - 1]), Ok(()));
    }

    #[test]
    fn oversized_payload_is_rejected() {
        let payload = [0u8; UBX_MAX_PAYLOAD_LEN + 1];
        assert_eq!(
            build_frame::<Infallible>(class::CFG, 0x01, &payload),
            Err(SendError::PayloadTooLarge {
                len: UBX_MAX_PAYLOAD_LEN + 1,
                max: UBX_MAX_PAYLOAD_LEN
            })
        );
        assert!(build_frame::<Infallible>(class::CFG, 0x01, &[0u8; UBX_MAX_PAYLOAD_LEN]).is_ok());
    }

    #[test]
    fn heapless_transport_refuses_partial_frames() {
        let mut out = heapless::Vec::<u8, 12>::new();
        out.queue(&[1; 8]).unwrap();
        assert_eq!(out.queue(&[2; 8]), Err(QueueFull));
        assert_eq!(out.len(), 8);
    }
}
