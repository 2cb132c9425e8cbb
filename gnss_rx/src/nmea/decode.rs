use log::debug;

use super::{
    numeric::{
        parse_integer_part, parse_scaled, parse_time, parse_u8, text_with_suffix, Coordinate,
    },
    Sentence, SentenceKind,
};
use crate::{
    config::SentenceTable,
    constants::{SV_PER_SENTENCE, SV_TABLE_LEN},
    fix::{FixFlags, Fresh, NavData, SvRecord, Text},
    intake::ByteView,
};

/// What [`process`] did with a sentence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Processed {
    Applied(SentenceKind),
    /// Valid sentence with an address not in the table
    Unrecognized,
    InvalidChecksum,
}

/// Verifies `sentence` and applies the fields it carries to `nav`.
///
/// Nothing is written unless the checksum matches.
pub(crate) fn process<V: ByteView + ?Sized>(
    sentence: &Sentence<'_, V>,
    table: &SentenceTable,
    nav: &mut NavData,
) -> Processed {
    if !sentence.verify() {
        return Processed::InvalidChecksum;
    }
    let Some(kind) = sentence.field(0).and_then(|address| table.kind_of(&address)) else {
        return Processed::Unrecognized;
    };

    match kind {
        SentenceKind::Position => apply_position(sentence, nav),
        SentenceKind::FixQuality => apply_fix_quality(sentence, nav),
        SentenceKind::SpeedHeading => apply_speed_heading(sentence, nav),
        SentenceKind::SatellitesInView => apply_satellites(sentence, nav),
    }
    Processed::Applied(kind)
}

fn coordinate<V: ByteView + ?Sized>(
    sentence: &Sentence<'_, V>,
    value_field: usize,
    hemisphere_field: usize,
    hemispheres: [u8; 2],
    max_degrees: u32,
) -> Option<(i32, Text)> {
    let hemisphere = *sentence.field(hemisphere_field)?.first()?;
    let negative = match hemisphere {
        h if h == hemispheres[0] => false,
        h if h == hemispheres[1] => true,
        _ => return None,
    };
    let coordinate = Coordinate::parse(&sentence.field(value_field)?, max_degrees)?;
    Some((coordinate.to_fixed(negative), coordinate.to_text(hemisphere)?))
}

fn apply_position<V: ByteView + ?Sized>(sentence: &Sentence<'_, V>, nav: &mut NavData) {
    let fix = &mut nav.fix;
    let mut located = false;

    if let Some(time) = sentence.field(1).and_then(|f| parse_time(&f)) {
        fix.time = Some(time);
    }
    if let Some((value, text)) = coordinate(sentence, 2, 3, [b'N', b'S'], 90) {
        fix.latitude = value;
        fix.latitude_text = text;
        located = true;
    }
    if let Some((value, text)) = coordinate(sentence, 4, 5, [b'E', b'W'], 180) {
        fix.longitude = value;
        fix.longitude_text = text;
        located = true;
    }
    if let Some(used) = sentence.field(7) {
        if let Some(text) = parse_u8(&used).and_then(|_| text_with_suffix(&used, "")) {
            fix.satellites_used = text;
            nav.fresh |= Fresh::SATELLITES;
        }
    }
    if let Some(altitude) = sentence.field(9) {
        let unit = sentence
            .field(10)
            .and_then(|f| f.first().copied())
            .unwrap_or(b'M');
        let text = text_with_suffix(&altitude, " ").and_then(|mut text| {
            text.push(char::from(unit)).ok()?;
            Some(text)
        });
        if let (Some(value), Some(text)) = (parse_integer_part(&altitude), text) {
            fix.altitude = value;
            fix.altitude_text = text;
            located = true;
        }
    }

    if located {
        nav.fresh |= Fresh::LOCATION;
    }
}

fn apply_fix_quality<V: ByteView + ?Sized>(sentence: &Sentence<'_, V>, nav: &mut NavData) {
    nav.fix.quality = match sentence.field(2).as_deref() {
        Some(b"2") => FixFlags::FIX_2D,
        Some(b"3") => FixFlags::FIX_3D,
        _ => FixFlags::empty(),
    };
    nav.fresh |= Fresh::FIX;
}

fn apply_speed_heading<V: ByteView + ?Sized>(sentence: &Sentence<'_, V>, nav: &mut NavData) {
    let fix = &mut nav.fix;
    let mut updated = false;

    if let Some(heading) = sentence.field(1) {
        if let (Some(value), Some(text)) =
            (parse_scaled(&heading, 2), text_with_suffix(&heading, " deg"))
        {
            fix.heading = value;
            fix.heading_text = text;
            updated = true;
        }
    }
    if let Some(speed) = sentence.field(7) {
        if let (Some(value), Some(text)) =
            (parse_scaled(&speed, 3), text_with_suffix(&speed, " km/h"))
        {
            fix.speed = value;
            fix.speed_text = text;
            updated = true;
        }
    }

    if updated {
        nav.fresh |= Fresh::SPEED;
    }
}

fn apply_satellites<V: ByteView + ?Sized>(sentence: &Sentence<'_, V>, nav: &mut NavData) {
    let total = sentence.field(1).and_then(|f| parse_u8(&f));
    let position = sentence.field(2).and_then(|f| parse_u8(&f));
    let (Some(total), Some(position)) = (total, position) else {
        debug!("satellites-in-view sentence without series numbering");
        return;
    };
    if position == 0 {
        return;
    }

    if position == 1 {
        nav.satellites.start_series(total);
        debug!("satellite series of {total} opened, tables swapped");
    } else if nav.satellites.series_total() != Some(total) {
        debug!(
            "satellite part {position}/{total} does not belong to the open series {:?}",
            nav.satellites.series_total()
        );
        return;
    }

    if let Some(tracked) = sentence.field(3) {
        if let Some(text) = parse_u8(&tracked).and_then(|_| text_with_suffix(&tracked, "")) {
            nav.fix.satellites_tracked = text;
        }
    }

    let offset = usize::from(position - 1) * SV_PER_SENTENCE;
    let incoming = nav.satellites.incoming_mut();
    for k in 0..SV_PER_SENTENCE {
        let slot = offset + k;
        if slot >= SV_TABLE_LEN {
            break;
        }
        let base = 4 + k * 4;
        let Some(id) = sentence.field(base).and_then(|f| parse_u8(&f)) else {
            continue;
        };
        let snr = sentence.field(base + 3).and_then(|f| parse_u8(&f)).unwrap_or(0);
        incoming[slot] = SvRecord { id, snr };
    }
    nav.fresh |= Fresh::SATELLITES;
}
