//! Binary protocol: checksum, outbound frames and inbound dispatch.

mod builder;
mod checksum;
mod dispatch;

pub use builder::{build_frame, Frame, QueueFull, Transport};
pub use checksum::{ubx_checksum, UbxChecksumCalc};
pub(crate) use dispatch::{dispatch, DispatchError};

/// Message classes the receiver may send. Frames of any other class are
/// rejected by the dispatcher.
pub mod class {
    pub const NAV: u8 = 0x01;
    pub const RXM: u8 = 0x02;
    pub const INF: u8 = 0x04;
    pub const ACK: u8 = 0x05;
    pub const CFG: u8 = 0x06;
    pub const UPD: u8 = 0x09;
    pub const MON: u8 = 0x0a;
    pub const AID: u8 = 0x0b;
    pub const TIM: u8 = 0x0d;
    pub const ESF: u8 = 0x10;
    pub const MGA: u8 = 0x13;
    pub const LOG: u8 = 0x21;
    pub const SEC: u8 = 0x27;
    pub const HNR: u8 = 0x28;

    pub(crate) const KNOWN: [u8; 14] = [
        NAV, RXM, INF, ACK, CFG, UPD, MON, AID, TIM, ESF, MGA, LOG, SEC, HNR,
    ];
}

/// Message ids of [`class::ACK`]
pub mod ack {
    pub const NAK: u8 = 0x00;
    pub const ACK: u8 = 0x01;
}

/// Message ids of [`class::MON`]
pub mod mon {
    pub const VER: u8 = 0x04;
}

/// Message ids of [`class::INF`]
pub mod inf {
    pub const ERROR: u8 = 0x00;
    pub const WARNING: u8 = 0x01;
    pub const NOTICE: u8 = 0x02;
    pub const TEST: u8 = 0x03;
    pub const DEBUG: u8 = 0x04;
}

pub(crate) const MON_VER_SW_LEN: usize = 30;
pub(crate) const MON_VER_HW_LEN: usize = 10;
pub(crate) const MON_VER_EXT_LEN: usize = 30;
/// Extension strings kept from MON-VER; the rest are dropped.
pub const MON_VER_MAX_EXTENSIONS: usize = 4;

/// A verified inbound frame, sync chars and checksum stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRef<'a> {
    pub class: u8,
    pub id: u8,
    pub payload: &'a [u8],
}

/// Receiver/Software Version, as reported by MON-VER
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReceiverVersion {
    pub software_version: heapless::String<MON_VER_SW_LEN>,
    pub hardware_version: heapless::String<MON_VER_HW_LEN>,
    /// Extended software information strings, e.g. `PROTVER=18.00`
    pub extensions: heapless::Vec<heapless::String<MON_VER_EXT_LEN>, MON_VER_MAX_EXTENSIONS>,
}
