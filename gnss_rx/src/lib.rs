//! # gnss_rx
//!
//! Receive-side protocol engine for u-blox style GNSS modules that share one
//! serial line between NMEA sentences and binary UBX frames.
//!
//! Bytes go into an [`Intake`] ring from the UART interrupt; the [`Engine`]
//! drains it from the main loop, telling the two protocols apart by their
//! lead byte, verifying checksums and publishing the decoded fix. Outbound
//! UBX commands are framed by [`Engine::send`], and those that expect an
//! acknowledgement are tracked in a [`Ledger`] until ACK, NAK or timeout.
//!
//! Receiving
//! =========
//!
//! ```
//! use gnss_rx::{Config, Engine, Fresh, Intake};
//!
//! let mut intake = Intake::<256>::new();
//! let (mut producer, consumer) = intake.split();
//! let mut engine = Engine::new(consumer, Config::default());
//!
//! // From your serial port
//! producer.push_slice(b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n");
//!
//! engine.poll(0).unwrap();
//! if engine.take_fresh(Fresh::LOCATION).contains(Fresh::LOCATION) {
//!     assert_eq!(engine.fix().latitude_text, "48.117300 N");
//!     assert_eq!(engine.fix().altitude, 545);
//! }
//! ```
//!
//! Sending
//! =======
//!
//! Any [`Transport`] can take the outgoing frames; with `std` a `Vec<u8>` works:
//! ```
//! # #[cfg(feature = "std")] {
//! use gnss_rx::{ubx, Config, Engine, Intake};
//!
//! let mut intake = Intake::<256>::new();
//! let (_producer, consumer) = intake.split();
//! let mut engine = Engine::new(consumer, Config::default());
//!
//! let mut tx = Vec::new();
//! engine.send(&mut tx, 0, ubx::class::MON, ubx::mon::VER, &[], true).unwrap();
//! assert_eq!(tx, [0xb5, 0x62, 0x0a, 0x04, 0x00, 0x00, 0x0e, 0x34]);
//! assert!(engine.ledger().is_pending(ubx::class::MON, ubx::mon::VER));
//! # }
//! ```
//!
//! no_std Support
//! ==============
//!
//! Without the default `std` feature the crate is `no_std` and allocation
//! free: every buffer is a fixed-capacity `heapless` container and the
//! intake size is a const generic.

#![cfg_attr(not(any(feature = "std", test)), no_std)]

extern crate core;
#[cfg(feature = "serde")]
extern crate serde;

pub use crate::{
    config::{Config, SentenceTable},
    engine::{Engine, State, Stats},
    error::{EngineError, FieldError, FramingError, SendError},
    fix::{FixFlags, FixQuality, FixRecord, Fresh, NavData, SatelliteTables, SvRecord, Text},
    intake::{ByteView, Consumer, Intake, Producer, Span},
    ledger::{Failure, FailureReason, Failures, Ledger, PendingRequest},
    nmea::{Field, Sentence, SentenceKind},
    ubx::{build_frame, ubx_checksum, FrameRef, ReceiverVersion, Transport, UbxChecksumCalc},
};

pub mod constants;
mod config;
mod engine;
mod error;
mod fix;
mod intake;
mod ledger;
mod nmea;
pub mod ubx;
