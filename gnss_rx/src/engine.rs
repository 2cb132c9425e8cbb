//! Byte-by-byte framing of the shared sentence/UBX stream.

use log::{debug, info, trace, warn};

use crate::{
    config::Config,
    constants::{
        NMEA_END_CHAR_1, NMEA_END_CHAR_2, NMEA_SYNC_CHAR, UBX_HEADER_FIELDS_LEN,
        UBX_MAX_PAYLOAD_LEN, UBX_SYNC_CHAR_1, UBX_SYNC_CHAR_2,
    },
    error::{EngineError, FramingError, SendError},
    fix::{FixRecord, Fresh, NavData, SatelliteTables},
    intake::Consumer,
    ledger::{Failures, Ledger},
    nmea::{self, Processed, Sentence},
    ubx::{build_frame, dispatch, DispatchError, FrameRef, ReceiverVersion, Transport, UbxChecksumCalc},
};

/// Where the framing state machine is in the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Between messages, classifying the lead byte
    Idle,
    /// Inside a sentence, waiting for `<CR>`
    SentenceWait,
    /// Got `<CR>`, waiting for `<LF>`
    SentenceLfWait,
    /// Got the first UBX sync char
    BinarySyncWait,
    BinaryHeaderWait { received: u8 },
    BinaryPayloadWait { remaining: u16 },
    BinaryChecksumWait { received: u8 },
    /// Recovering; handled on the next step
    Error(FramingError),
}

/// Running counters, mostly for diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    /// Sentences applied to the fix record
    pub sentences: u32,
    /// UBX frames that passed the checksum and were dispatched
    pub frames: u32,
    /// Valid sentences with an address the engine does not decode
    pub unrecognized_sentences: u32,
    pub bad_checksums: u32,
    pub framing_errors: u32,
    pub last_error: Option<FramingError>,
}

/// Payload of the UBX frame being assembled. Exists from the end of the
/// header until the frame is dispatched or dropped.
#[derive(Debug)]
struct InboundFrame {
    class: u8,
    id: u8,
    payload: heapless::Vec<u8, UBX_MAX_PAYLOAD_LEN>,
}

/// The receive engine.
///
/// Owns the consumer end of the intake, the decoded navigation data and
/// the request ledger. Call [`Engine::poll`] from the main loop with a
/// millisecond tick; it processes every byte available and returns.
pub struct Engine<'a, const N: usize> {
    rx: Consumer<'a, N>,
    config: Config,
    state: State,
    last_byte_at: u32,
    last_report_at: u32,

    header: [u8; UBX_HEADER_FIELDS_LEN],
    checksum: UbxChecksumCalc,
    received_ck_a: u8,
    frame: Option<InboundFrame>,

    nav: NavData,
    ledger: Ledger,
    version: Option<ReceiverVersion>,
    stats: Stats,
}

impl<'a, const N: usize> Engine<'a, N> {
    /// `config.max_sentence_len` is capped at `N - 1`, the most the intake
    /// can hold of one message.
    pub fn new(rx: Consumer<'a, N>, mut config: Config) -> Self {
        config.max_sentence_len = config.max_sentence_len.min(N - 1);
        Self {
            rx,
            config,
            state: State::Idle,
            last_byte_at: 0,
            last_report_at: 0,
            header: [0; UBX_HEADER_FIELDS_LEN],
            checksum: UbxChecksumCalc::new(),
            received_ck_a: 0,
            frame: None,
            nav: NavData::default(),
            ledger: Ledger::new(),
            version: None,
            stats: Stats::default(),
        }
    }

    /// Runs the state machine until it needs more bytes.
    ///
    /// The ledger sweep and the periodic fix report run once per call: the
    /// first time the machine is in [`State::Idle`], or before returning
    /// when it never got there. Framing problems are recovered internally;
    /// only an unknown UBX class is returned, after the engine is back in
    /// idle. Bytes after the offending frame are handled by the next call.
    pub fn poll(&mut self, now: u32) -> Result<(), EngineError> {
        let mut housekeeping_done = false;
        let result = loop {
            if !housekeeping_done && self.state == State::Idle {
                self.housekeeping(now);
                housekeeping_done = true;
            }
            match self.step(now) {
                Ok(true) => {},
                Ok(false) => break Ok(()),
                Err(err) => break Err(err),
            }
        };
        if !housekeeping_done {
            // line busy for the whole call
            self.housekeeping(now);
        }
        result
    }

    fn housekeeping(&mut self, now: u32) {
        self.ledger.sweep(now, self.config.response_timeout_ms);

        if let Some(interval) = self.config.report_interval_ms {
            if now.wrapping_sub(self.last_report_at) >= interval {
                self.last_report_at = now;
                info!("{}", self.nav.fix);
            }
        }
    }

    /// One transition. Returns `false` when there is nothing to do until
    /// more bytes arrive.
    fn step(&mut self, now: u32) -> Result<bool, EngineError> {
        let next = match self.state {
            State::Error(err) => {
                self.recover(err);
                State::Idle
            },
            State::Idle => {
                let Some(byte) = self.rx.peek() else {
                    return Ok(false);
                };
                self.last_byte_at = now;
                self.idle(byte)
            },
            _ => match self.rx.peek() {
                Some(byte) => {
                    self.last_byte_at = now;
                    self.receive(byte)?
                },
                None if now.wrapping_sub(self.last_byte_at) > self.config.incoming_timeout_ms => {
                    State::Error(FramingError::IncomingTimeout)
                },
                None => return Ok(false),
            },
        };
        self.transition(next);
        Ok(true)
    }

    fn transition(&mut self, next: State) {
        if next != self.state {
            trace!("{:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }

    /// Classifies the lead byte of a message.
    fn idle(&mut self, byte: u8) -> State {
        match byte {
            NMEA_SYNC_CHAR => {
                // message-start stays on the `$` so the sentence can be reread
                self.rx.advance_scan();
                State::SentenceWait
            },
            UBX_SYNC_CHAR_1 => {
                self.consume();
                State::BinarySyncWait
            },
            _ => {
                self.consume();
                State::Idle
            },
        }
    }

    /// Handles `byte` in one of the in-message states.
    fn receive(&mut self, byte: u8) -> Result<State, EngineError> {
        let next = match self.state {
            State::SentenceWait => {
                self.rx.advance_scan();
                if byte == NMEA_END_CHAR_1 {
                    State::SentenceLfWait
                } else if self.rx.pending_len() + 2 > self.config.max_sentence_len {
                    State::Error(FramingError::SentenceTooLong(self.config.max_sentence_len))
                } else {
                    State::SentenceWait
                }
            },
            State::SentenceLfWait => {
                if byte == NMEA_END_CHAR_2 {
                    self.rx.advance_scan();
                    self.finish_sentence();
                    State::Idle
                } else {
                    // left unread, it may start the next message
                    State::Error(FramingError::MissingLineFeed)
                }
            },
            State::BinarySyncWait => {
                if byte == UBX_SYNC_CHAR_2 {
                    self.consume();
                    self.checksum = UbxChecksumCalc::new();
                    State::BinaryHeaderWait { received: 0 }
                } else {
                    State::Error(FramingError::BadSync(byte))
                }
            },
            State::BinaryHeaderWait { received } => {
                self.consume();
                self.checksum.update_byte(byte);
                let index = usize::from(received);
                self.header[index] = byte;
                if index + 1 < UBX_HEADER_FIELDS_LEN {
                    State::BinaryHeaderWait {
                        received: received + 1,
                    }
                } else {
                    self.start_frame()
                }
            },
            State::BinaryPayloadWait { remaining } => {
                self.consume();
                self.checksum.update_byte(byte);
                if let Some(frame) = self.frame.as_mut() {
                    // length was checked against the capacity in start_frame
                    let _ = frame.payload.push(byte);
                }
                match remaining - 1 {
                    0 => State::BinaryChecksumWait { received: 0 },
                    remaining => State::BinaryPayloadWait { remaining },
                }
            },
            State::BinaryChecksumWait { received: 0 } => {
                self.consume();
                self.received_ck_a = byte;
                State::BinaryChecksumWait { received: 1 }
            },
            State::BinaryChecksumWait { .. } => {
                self.consume();
                match self.checksum.validate_result(self.received_ck_a, byte) {
                    Ok(()) => return self.finish_frame(),
                    Err(err) => State::Error(err),
                }
            },
            State::Idle | State::Error(_) => self.state,
        };
        Ok(next)
    }

    /// advance-scan plus advance-message-start over one byte.
    fn consume(&mut self) {
        self.rx.advance_scan();
        self.rx.commit();
    }

    fn finish_sentence(&mut self) {
        let span = self.rx.span();
        let sentence = Sentence::new(&span).with_field_limit(self.config.max_field_len);
        match nmea::process(&sentence, &self.config.sentence_addresses, &mut self.nav) {
            Processed::Applied(kind) => {
                trace!("applied {kind:?}");
                self.stats.sentences += 1;
            },
            Processed::Unrecognized => {
                debug!("ignoring sentence with unknown address");
                self.stats.unrecognized_sentences += 1;
            },
            Processed::InvalidChecksum => {
                warn!("dropping sentence with bad checksum");
                self.stats.bad_checksums += 1;
            },
        }
        self.rx.commit();
    }

    /// Header complete: sizes the payload and allocates the frame.
    fn start_frame(&mut self) -> State {
        let [class, id, len_lo, len_hi] = self.header;
        let len = u16::from_le_bytes([len_lo, len_hi]);
        if usize::from(len) > UBX_MAX_PAYLOAD_LEN {
            return State::Error(FramingError::PayloadTooLarge {
                len: usize::from(len),
                max: UBX_MAX_PAYLOAD_LEN,
            });
        }
        self.frame = Some(InboundFrame {
            class,
            id,
            payload: heapless::Vec::new(),
        });
        if len == 0 {
            State::BinaryChecksumWait { received: 0 }
        } else {
            State::BinaryPayloadWait { remaining: len }
        }
    }

    /// Dispatches the verified frame and releases it.
    fn finish_frame(&mut self) -> Result<State, EngineError> {
        let Some(frame) = self.frame.take() else {
            return Ok(State::Idle);
        };
        self.stats.frames += 1;
        let result = dispatch(
            FrameRef {
                class: frame.class,
                id: frame.id,
                payload: &frame.payload,
            },
            &mut self.ledger,
            &mut self.version,
        );
        match result {
            Ok(()) => Ok(State::Idle),
            Err(DispatchError::Malformed(err)) => Ok(State::Error(err)),
            Err(DispatchError::UnknownClass) => {
                self.transition(State::Idle);
                Err(EngineError::UnknownClass {
                    class: frame.class,
                    id: frame.id,
                })
            },
        }
    }

    /// Error state: record, release, resynchronize.
    fn recover(&mut self, err: FramingError) {
        warn!("framing error {}: {err}", err.code());
        self.stats.framing_errors += 1;
        self.stats.last_error = Some(err);
        self.frame = None;
        self.rx.commit();
    }

    /// Builds a UBX frame and queues it on `transport`. With
    /// `expect_response` the request is registered in the ledger, stamped
    /// with `now`, so that a missing ACK shows up as a failure.
    ///
    /// Nothing is queued when the ledger has no room for the request.
    pub fn send<T: Transport>(
        &mut self,
        transport: &mut T,
        now: u32,
        class: u8,
        id: u8,
        payload: &[u8],
        expect_response: bool,
    ) -> Result<(), SendError<T::Error>> {
        if expect_response && self.ledger.is_full() {
            return Err(SendError::LedgerFull { class, id });
        }
        let frame = build_frame(class, id, payload)?;
        transport.queue(&frame).map_err(SendError::Transport)?;
        if expect_response {
            self.ledger
                .register(class, id, now)
                .map_err(|_| SendError::LedgerFull { class, id })?;
        }
        Ok(())
    }

    /// The module lost power: nothing it reported before is valid.
    pub fn power_removed(&mut self) {
        debug!("receiver powered down, clearing navigation data");
        self.nav.clear();
        self.version = None;
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// True while a UBX payload is held for an incomplete frame.
    pub fn is_receiving_frame(&self) -> bool {
        self.frame.is_some()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn nav(&self) -> &NavData {
        &self.nav
    }

    pub fn fix(&self) -> &FixRecord {
        &self.nav.fix
    }

    pub fn satellites(&self) -> &SatelliteTables {
        &self.nav.satellites
    }

    /// See [`NavData::take_fresh`].
    pub fn take_fresh(&mut self, which: Fresh) -> Fresh {
        self.nav.take_fresh(which)
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut Ledger {
        &mut self.ledger
    }

    pub fn drain_failures(&mut self) -> Failures {
        self.ledger.drain_failures()
    }

    /// Last MON-VER reply, if any.
    pub fn version(&self) -> Option<&ReceiverVersion> {
        self.version.as_ref()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}
