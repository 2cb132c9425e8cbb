use core::fmt;

use bitflags::bitflags;
use chrono::NaiveTime;

use crate::constants::{SV_TABLE_LEN, TEXT_LEN};

/// Bounded display string used throughout the fix record.
pub type Text = heapless::String<TEXT_LEN>;

bitflags! {
    /// Fix-quality flags; both clear means no fix.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct FixFlags: u8 {
        const FIX_2D = 0x01;
        const FIX_3D = 0x02;
    }
}

bitflags! {
    /// "New data available" indicators, one per field category.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Fresh: u8 {
        const LOCATION = 0x01;
        const FIX = 0x02;
        const SPEED = 0x04;
        const SATELLITES = 0x08;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FixQuality {
    NoFix,
    Fix2D,
    Fix3D,
}

impl From<FixFlags> for FixQuality {
    fn from(flags: FixFlags) -> Self {
        if flags.contains(FixFlags::FIX_3D) {
            FixQuality::Fix3D
        } else if flags.contains(FixFlags::FIX_2D) {
            FixQuality::Fix2D
        } else {
            FixQuality::NoFix
        }
    }
}

impl fmt::Display for FixQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FixQuality::NoFix => f.write_str("no fix"),
            FixQuality::Fix2D => f.write_str("2D"),
            FixQuality::Fix3D => f.write_str("3D"),
        }
    }
}

/// Most recent fix, as decoded from the sentence stream.
///
/// Every field is updated on its own and only from a sentence that passed
/// its checksum; a field the sentence left empty keeps its old value.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixRecord {
    /// UTC time of the position solution
    pub time: Option<NaiveTime>,

    /// Latitude, degrees scaled by 2^31/180 (south negative)
    pub latitude: i32,
    pub latitude_text: Text,

    /// Longitude, degrees scaled by 2^31/180 (west negative)
    pub longitude: i32,
    pub longitude_text: Text,

    /// Altitude above mean sea level, whole meters
    pub altitude: i32,
    pub altitude_text: Text,

    pub quality: FixFlags,
    pub satellites_tracked: Text,
    pub satellites_used: Text,

    /// Ground speed, km/h * 1000
    pub speed: u32,
    pub speed_text: Text,

    /// Course over ground, degrees * 100
    pub heading: u32,
    pub heading_text: Text,
}

impl FixRecord {
    pub fn fix_quality(&self) -> FixQuality {
        self.quality.into()
    }
}

impl fmt::Display for FixRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat {} lon {} alt {} fix {} sats {}/{} speed {} heading {}",
            self.latitude_text,
            self.longitude_text,
            self.altitude_text,
            self.fix_quality(),
            self.satellites_used,
            self.satellites_tracked,
            self.speed_text,
            self.heading_text,
        )
    }
}

/// One satellite-in-view entry. An id of zero marks an empty slot.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SvRecord {
    pub id: u8,
    /// Carrier to noise ratio, dB-Hz. Zero when not tracking.
    pub snr: u8,
}

/// Two satellite tables used in turns.
///
/// Callers only ever see the "current" table, which always holds one
/// complete report series. A new series is written into the "incoming"
/// table; when the next series opens, the roles are swapped.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SatelliteTables {
    tables: [[SvRecord; SV_TABLE_LEN]; 2],
    current: usize,
    series_total: Option<u8>,
}

impl Default for SatelliteTables {
    fn default() -> Self {
        Self {
            tables: [[SvRecord::default(); SV_TABLE_LEN]; 2],
            current: 0,
            series_total: None,
        }
    }
}

impl SatelliteTables {
    pub fn current(&self) -> &[SvRecord; SV_TABLE_LEN] {
        &self.tables[self.current]
    }

    /// Satellites in the current table that hold an id.
    pub fn iter(&self) -> impl Iterator<Item = &SvRecord> {
        self.current().iter().filter(|sv| sv.id != 0)
    }

    #[cfg(test)]
    pub(crate) fn current_slot(&self) -> usize {
        self.current
    }

    #[cfg(test)]
    pub(crate) fn incoming(&self) -> &[SvRecord; SV_TABLE_LEN] {
        &self.tables[self.current ^ 1]
    }

    pub(crate) fn incoming_mut(&mut self) -> &mut [SvRecord; SV_TABLE_LEN] {
        &mut self.tables[self.current ^ 1]
    }

    /// Opens a new series: swaps roles, then clears the new incoming table.
    pub(crate) fn start_series(&mut self, total: u8) {
        self.current ^= 1;
        self.incoming_mut().fill(SvRecord::default());
        self.series_total = Some(total);
    }

    pub(crate) fn series_total(&self) -> Option<u8> {
        self.series_total
    }
}

/// Everything the sentence decoder publishes.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavData {
    pub fix: FixRecord,
    pub satellites: SatelliteTables,
    pub(crate) fresh: Fresh,
}

impl NavData {
    /// Pending "new data" indicators, without clearing them.
    pub fn fresh(&self) -> Fresh {
        self.fresh
    }

    /// Returns which of `which` were set, and clears them.
    pub fn take_fresh(&mut self, which: Fresh) -> Fresh {
        let set = self.fresh & which;
        self.fresh.remove(which);
        set
    }

    /// Zeroes all published data; a module without power has no fix.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_from_flags() {
        assert_eq!(FixQuality::from(FixFlags::empty()), FixQuality::NoFix);
        assert_eq!(FixQuality::from(FixFlags::FIX_2D), FixQuality::Fix2D);
        assert_eq!(FixQuality::from(FixFlags::FIX_3D), FixQuality::Fix3D);
    }

    #[test]
    fn start_series_swaps_and_clears() {
        let mut tables = SatelliteTables::default();
        tables.incoming_mut()[0] = SvRecord { id: 7, snr: 40 };
        let before = tables.current_slot();
        tables.start_series(3);
        assert_ne!(before, tables.current_slot());
        assert_eq!(tables.current()[0], SvRecord { id: 7, snr: 40 });
        assert!(tables.incoming().iter().all(|sv| *sv == SvRecord::default()));
        assert_eq!(tables.series_total(), Some(3));
    }

    #[test]
    fn take_fresh_clears_only_requested() {
        let mut nav = NavData {
            fresh: Fresh::LOCATION | Fresh::SPEED,
            ..NavData::default()
        };
        assert_eq!(nav.take_fresh(Fresh::LOCATION), Fresh::LOCATION);
        assert_eq!(nav.fresh(), Fresh::SPEED);
        assert_eq!(nav.take_fresh(Fresh::FIX), Fresh::empty());
    }
}
