//! Wall-clock keeping and clock-face math.
//!
//! The phone pushes the current date and time over the companion link;
//! afterwards the watch runs the clock from its own uptime counter.
//! Hand angles are in tenths of a degree, the unit the image-rotation
//! setters take.

use crate::icons::Digit;

/// Calendar date and time of day.
///
/// `month` is 0-based (January = 0), matching the companion library.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DateTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl DateTime {
    /// 1970-01-01 00:00:00, shown until the phone syncs.
    pub const EPOCH: DateTime = DateTime {
        year: 1970,
        month: 0,
        day: 1,
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// 1..=12 hour for 12-hour mode.
    pub fn hour12(&self) -> u8 {
        match self.hour % 12 {
            0 => 12,
            h => h,
        }
    }

    pub fn is_pm(&self) -> bool {
        self.hour >= 12
    }

    /// Whether every field is inside its calendar range.
    pub fn is_valid(&self) -> bool {
        self.month < 12
            && self.day >= 1
            && self.day <= days_in_month(self.year, self.month)
            && self.hour < 24
            && self.minute < 60
            && self.second < 60
    }

    /// Advance by `secs` seconds, rolling over into days, months and years.
    pub fn add_seconds(mut self, secs: u64) -> Self {
        let total = self.second as u64 + secs;
        self.second = (total % 60) as u8;
        let total = self.minute as u64 + total / 60;
        self.minute = (total % 60) as u8;
        let total = self.hour as u64 + total / 60;
        self.hour = (total % 24) as u8;

        let mut days = total / 24;
        while days > 0 {
            let left_in_month =
                days_in_month(self.year, self.month).saturating_sub(self.day) as u64;
            if days <= left_in_month {
                self.day += days as u8;
                break;
            }
            days -= left_in_month + 1;
            self.day = 1;
            if self.month >= 11 {
                self.month = 0;
                self.year += 1;
            } else {
                self.month += 1;
            }
        }
        self
    }
}

pub fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Days in a 0-based month.
pub fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        1 if is_leap_year(year) => 29,
        1 => 28,
        3 | 5 | 8 | 10 => 30,
        _ => 31,
    }
}

/// Day of the week for a 0-based month, 0 = Sunday.
pub fn weekday(year: u16, month: u8, day: u8) -> u8 {
    const OFFSETS: [u32; 12] = [0, 3, 2, 5, 0, 3, 5, 1, 4, 6, 2, 4];
    let month = (month % 12) as usize;
    let y = if month < 2 { year as u32 - 1 } else { year as u32 };
    ((y + y / 4 - y / 100 + y / 400 + OFFSETS[month] + day as u32) % 7) as u8
}

/// Clock driven by uptime, anchored on the last sync from the phone.
#[derive(Clone, Copy, Debug)]
pub struct WallClock {
    anchor: DateTime,
    anchor_ms: u64,
}

impl WallClock {
    pub const fn new() -> Self {
        Self {
            anchor: DateTime::EPOCH,
            anchor_ms: 0,
        }
    }

    /// Record that it is `time` at uptime `now_ms`.
    pub fn set(&mut self, time: DateTime, now_ms: u64) {
        self.anchor = time;
        self.anchor_ms = now_ms;
    }

    /// Current date and time at uptime `now_ms`.
    pub fn now(&self, now_ms: u64) -> DateTime {
        let elapsed = now_ms.saturating_sub(self.anchor_ms) / 1000;
        self.anchor.add_seconds(elapsed)
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Rotation in tenths of a degree.
///
/// Values are kept exactly as computed (an hour hand past noon exceeds
/// 3600); renderers call `normalized` before drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Angle(pub u16);

impl Angle {
    pub const FULL_TURN: u16 = 3600;

    pub fn normalized(self) -> u16 {
        self.0 % Self::FULL_TURN
    }

    /// Angle in radians, clockwise from 12 o'clock.
    pub fn radians(self) -> f32 {
        self.normalized() as f32 * core::f32::consts::PI / 1800.0
    }
}

/// Second hand angle: six degrees per second.
pub fn second_angle(second: u8) -> Angle {
    Angle(second as u16 * 60)
}

/// Everything the clock faces show for a given hour and minute.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockFace {
    pub hour_tens: Digit,
    pub hour_ones: Digit,
    pub minute_tens: Digit,
    pub minute_ones: Digit,
    pub minute_angle: Angle,
    pub hour_angle: Angle,
}

impl ClockFace {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self {
            hour_tens: Digit::new(hour / 10),
            hour_ones: Digit::new(hour % 10),
            minute_tens: Digit::new(minute / 10),
            minute_ones: Digit::new(minute % 10),
            minute_angle: Angle(minute as u16 * 60),
            hour_angle: Angle(hour as u16 * 300 + minute as u16 * 5),
        }
    }
}
