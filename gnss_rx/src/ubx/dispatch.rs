use log::{debug, error, info, trace, warn};

use super::{
    ack, class, inf, mon, FrameRef, ReceiverVersion, MON_VER_EXT_LEN, MON_VER_HW_LEN,
    MON_VER_MAX_EXTENSIONS, MON_VER_SW_LEN,
};
use crate::{
    error::FramingError,
    ledger::{FailureReason, Ledger},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DispatchError {
    /// Frame passed the checksum but its payload is unusable
    Malformed(FramingError),
    UnknownClass,
}

fn need(frame: &FrameRef<'_>, expect: usize) -> Result<(), DispatchError> {
    if frame.payload.len() < expect {
        Err(DispatchError::Malformed(FramingError::InvalidPacketLen {
            class: frame.class,
            id: frame.id,
            expect,
            got: frame.payload.len(),
        }))
    } else {
        Ok(())
    }
}

/// Routes a verified frame by class, then id.
pub(crate) fn dispatch(
    frame: FrameRef<'_>,
    ledger: &mut Ledger,
    version: &mut Option<ReceiverVersion>,
) -> Result<(), DispatchError> {
    match (frame.class, frame.id) {
        (class::ACK, ack::ACK) => {
            need(&frame, 2)?;
            let (class, id) = (frame.payload[0], frame.payload[1]);
            let resolved = ledger.resolve(class, id);
            trace!("ACK-ACK for {class:#04x}/{id:#04x}, {resolved} pending cleared");
        },
        (class::ACK, ack::NAK) => {
            need(&frame, 2)?;
            let (class, id) = (frame.payload[0], frame.payload[1]);
            warn!("receiver rejected {class:#04x}/{id:#04x}");
            ledger.fail(class, id, FailureReason::Nak);
            ledger.resolve(class, id);
        },
        (class::MON, mon::VER) => {
            need(&frame, MON_VER_SW_LEN + MON_VER_HW_LEN)?;
            let parsed = parse_mon_ver(frame.payload);
            debug!(
                "receiver sw {:?}, hw {:?}",
                parsed.software_version, parsed.hardware_version
            );
            *version = Some(parsed);
            ledger.resolve(class::MON, mon::VER);
        },
        (class::INF, id) => forward_inf(id, frame.payload),
        (class, id) if class::KNOWN.contains(&class) => {
            debug!("ignoring frame {class:#04x}/{id:#04x}");
        },
        _ => return Err(DispatchError::UnknownClass),
    }
    Ok(())
}

/// Zero-terminated text from a fixed-width field; non-ASCII becomes `?`.
fn fixed_str<const N: usize>(bytes: &[u8]) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for &b in bytes.iter().take(N).take_while(|&&b| b != 0) {
        let ch = if b.is_ascii() && !b.is_ascii_control() {
            char::from(b)
        } else {
            '?'
        };
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

fn parse_mon_ver(payload: &[u8]) -> ReceiverVersion {
    let (software, rest) = payload.split_at(MON_VER_SW_LEN);
    let (hardware, extensions) = rest.split_at(MON_VER_HW_LEN);
    let mut version = ReceiverVersion {
        software_version: fixed_str(software),
        hardware_version: fixed_str(hardware),
        extensions: heapless::Vec::new(),
    };
    for chunk in extensions
        .chunks_exact(MON_VER_EXT_LEN)
        .take(MON_VER_MAX_EXTENSIONS)
    {
        // `take` keeps this within capacity
        let _ = version.extensions.push(fixed_str(chunk));
    }
    version
}

fn forward_inf(id: u8, payload: &[u8]) {
    let text = core::str::from_utf8(payload).unwrap_or("<non-utf8 text>");
    let text = text.trim_end_matches(['\0', '\r', '\n']);
    match id {
        inf::ERROR => error!("receiver: {text}"),
        inf::WARNING => warn!("receiver: {text}"),
        inf::NOTICE => info!("receiver: {text}"),
        inf::TEST | inf::DEBUG => debug!("receiver: {text}"),
        _ => debug!("ignoring INF id {id:#04x}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(class: u8, id: u8, payload: &[u8]) -> FrameRef<'_> {
        FrameRef { class, id, payload }
    }

    fn mon_ver_payload(sw: &str, hw: &str, extensions: &[&str]) -> std::vec::Vec<u8> {
        let mut payload = vec![0u8; 40 + 30 * extensions.len()];
        payload[..sw.len()].copy_from_slice(sw.as_bytes());
        payload[30..30 + hw.len()].copy_from_slice(hw.as_bytes());
        for (i, ext) in extensions.iter().enumerate() {
            let at = 40 + 30 * i;
            payload[at..at + ext.len()].copy_from_slice(ext.as_bytes());
        }
        payload
    }

    #[test]
    fn ack_resolves_acknowledged_request() {
        let mut ledger = Ledger::new();
        let mut version = None;
        ledger.register(class::CFG, 0x01, 0).unwrap();
        dispatch(frame(class::ACK, ack::ACK, &[0x06, 0x01]), &mut ledger, &mut version).unwrap();
        assert!(ledger.pending().is_empty());
        assert!(ledger.failures().is_empty());
    }

    #[test]
    fn nak_records_failure_and_resolves() {
        let mut ledger = Ledger::new();
        let mut version = None;
        ledger.register(class::CFG, 0x24, 0).unwrap();
        dispatch(frame(class::ACK, ack::NAK, &[0x06, 0x24]), &mut ledger, &mut version).unwrap();
        assert!(!ledger.is_pending(class::CFG, 0x24));
        assert_eq!(
            ledger.take_failure(class::CFG, 0x24).map(|f| f.reason),
            Some(FailureReason::Nak)
        );
    }

    #[test]
    fn short_ack_is_malformed() {
        let mut ledger = Ledger::new();
        assert_eq!(
            dispatch(frame(class::ACK, ack::ACK, &[0x06]), &mut ledger, &mut None),
            Err(DispatchError::Malformed(FramingError::InvalidPacketLen {
                class: class::ACK,
                id: ack::ACK,
                expect: 2,
                got: 1
            }))
        );
    }

    #[test]
    fn mon_ver_is_stored() {
        let mut ledger = Ledger::new();
        let mut version = None;
        ledger.register(class::MON, mon::VER, 0).unwrap();
        let payload = mon_ver_payload(
            "ROM CORE 3.01 (107888)",
            "00080000",
            &["FWVER=SPG 3.01", "PROTVER=18.00", "GPS;GLO;GAL;BDS", "SBAS;IMES;QZSS", "extra"],
        );
        dispatch(frame(class::MON, mon::VER, &payload), &mut ledger, &mut version).unwrap();

        let version = version.unwrap();
        assert_eq!(version.software_version, "ROM CORE 3.01 (107888)");
        assert_eq!(version.hardware_version, "00080000");
        assert_eq!(version.extensions.len(), MON_VER_MAX_EXTENSIONS);
        assert_eq!(version.extensions[1], "PROTVER=18.00");
        assert!(ledger.pending().is_empty());
    }

    #[test]
    fn mon_ver_without_terminators() {
        let mut payload = [b'A'; 40];
        payload[3] = 0xff;
        let version = parse_mon_ver(&payload);
        assert_eq!(version.software_version.len(), 30);
        assert_eq!(&version.software_version[..5], "AAA?A");
        assert_eq!(version.hardware_version, "AAAAAAAAAA");
        assert!(version.extensions.is_empty());
    }

    #[test]
    fn short_mon_ver_is_malformed() {
        let mut version = None;
        let result = dispatch(frame(class::MON, mon::VER, &[0; 39]), &mut Ledger::new(), &mut version);
        assert!(matches!(
            result,
            Err(DispatchError::Malformed(FramingError::InvalidPacketLen { expect: 40, got: 39, .. }))
        ));
        assert!(version.is_none());
    }

    #[test]
    fn unknown_id_in_known_class_is_tolerated() {
        let mut ledger = Ledger::new();
        ledger.register(class::CFG, 0x01, 0).unwrap();
        for (class, id) in [(class::CFG, 0x01), (class::NAV, 0x07), (class::MON, 0x09), (class::ACK, 0x02)] {
            assert_eq!(dispatch(frame(class, id, &[]), &mut ledger, &mut None), Ok(()));
        }
        assert!(ledger.is_pending(class::CFG, 0x01));
    }

    #[test]
    fn inf_text_is_accepted() {
        for id in 0..=5 {
            assert_eq!(dispatch(frame(class::INF, id, b"antenna open\0"), &mut Ledger::new(), &mut None), Ok(()));
        }
        assert_eq!(dispatch(frame(class::INF, inf::ERROR, &[0xff, 0xfe]), &mut Ledger::new(), &mut None), Ok(()));
    }

    #[test]
    fn unknown_class_is_an_error() {
        assert_eq!(
            dispatch(frame(0x42, 0x01, &[]), &mut Ledger::new(), &mut None),
            Err(DispatchError::UnknownClass)
        );
    }
}
