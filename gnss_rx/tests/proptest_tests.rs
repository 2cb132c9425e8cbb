//! Property tests for framing and checksums.

use gnss_rx::{
    build_frame, ubx::class, Config, Engine, Field, FieldError, Intake, Sentence, State,
    UbxChecksumCalc,
};
use proptest::prelude::*;

const GGA: &[u8] = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n";

/// Printable sentence text without the framing characters
fn body_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{5}(,[0-9A-Za-z. -]{0,10}){0,12}"
}

fn with_checksum(body: &str) -> Vec<u8> {
    let sum = body.bytes().fold(0u8, |acc, b| acc ^ b);
    format!("${body}*{sum:02X}\r\n").into_bytes()
}

proptest! {
    #[test]
    fn test_noise_without_lead_bytes_stays_idle(
        noise in prop::collection::vec(any::<u8>().prop_filter("lead byte", |b| *b != b'$' && *b != 0xb5), 0..400)
    ) {
        let mut intake = Intake::<512>::new();
        let (mut tx, rx) = intake.split();
        let mut engine = Engine::new(rx, Config::default());

        tx.push_slice(&noise);
        engine.poll(0).unwrap();
        prop_assert_eq!(engine.state(), State::Idle);
        prop_assert!(!engine.is_receiving_frame());
        prop_assert_eq!(engine.stats().framing_errors, 0);
    }

    #[test]
    fn test_recovers_from_any_noise(noise in prop::collection::vec(any::<u8>(), 0..300)) {
        let mut intake = Intake::<512>::new();
        let (mut tx, rx) = intake.split();
        let mut engine = Engine::new(rx, Config::default().with_incoming_timeout(250));

        tx.push_slice(&noise);
        let _ = engine.poll(0);
        let _ = engine.poll(1_000);
        prop_assert_eq!(engine.state(), State::Idle);
        prop_assert!(!engine.is_receiving_frame());

        let before = engine.stats().sentences;
        tx.push_slice(GGA);
        engine.poll(1_001).unwrap();
        prop_assert_eq!(engine.stats().sentences, before + 1);
        prop_assert_eq!(engine.fix().altitude, 545);
    }

    #[test]
    fn test_frame_survives_any_split(
        payload in prop::collection::vec(any::<u8>(), 0..64),
        split in any::<prop::sample::Index>(),
    ) {
        let frame = build_frame::<()>(class::NAV, 0x07, &payload).unwrap();
        let at = split.index(frame.len());

        let mut intake = Intake::<128>::new();
        let (mut tx, rx) = intake.split();
        let mut engine = Engine::new(rx, Config::default());
        tx.push_slice(&frame[..at]);
        engine.poll(0).unwrap();
        tx.push_slice(&frame[at..]);
        engine.poll(1).unwrap();
        prop_assert_eq!(engine.stats().frames, 1);
        prop_assert_eq!(engine.stats().framing_errors, 0);
    }

    #[test]
    fn test_built_frame_checksums(
        class in any::<u8>(),
        id in any::<u8>(),
        mut payload in prop::collection::vec(any::<u8>(), 1..256),
        last in 1u8..=255,
    ) {
        *payload.last_mut().unwrap() = last;
        let frame = build_frame::<()>(class, id, &payload).unwrap();
        let n = frame.len();
        let (ck_a, ck_b) = (frame[n - 2], frame[n - 1]);

        let mut calc = UbxChecksumCalc::new();
        calc.update(&frame[2..n - 2]);
        prop_assert!(calc.validate_result(ck_a, ck_b).is_ok());

        // one payload byte short
        let mut calc = UbxChecksumCalc::new();
        calc.update(&frame[2..n - 3]);
        prop_assert!(calc.validate_result(ck_a, ck_b).is_err());
    }

    #[test]
    fn test_sentence_checksum_round_trip(body in body_strategy(), flip in any::<prop::sample::Index>()) {
        let bytes = with_checksum(&body);
        prop_assert!(Sentence::new(&bytes[..]).verify());

        // change one byte between `$` and `*` to another printable one
        let mut bad = bytes.clone();
        let at = 1 + flip.index(body.len());
        bad[at] = if bad[at] == b'Z' { b'Y' } else { b'Z' };
        prop_assert!(!Sentence::new(&bad[..]).verify());
    }

    #[test]
    fn test_field_extraction_is_repeatable(body in body_strategy()) {
        let bytes = with_checksum(&body);
        let sentence = Sentence::new(&bytes[..]);
        let expected: Vec<&str> = body.split(',').collect();

        for _ in 0..2 {
            for (n, want) in expected.iter().enumerate().rev() {
                let mut out = Field::new();
                sentence.extract_field(n, &mut out).unwrap();
                prop_assert_eq!(&out[..], want.as_bytes());
            }
            let mut out = Field::new();
            prop_assert_eq!(sentence.extract_field(expected.len(), &mut out), Err(FieldError::Missing));
        }
    }
}
