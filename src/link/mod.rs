//! Watch-communication interface.
//!
//! The companion phone app talks to the watch through a BLE link that
//! owns pairing, framing and command decoding.  The UI glue only sees
//! the surface defined here:
//!
//! 1. **Events** - connection changes, notifications, incoming calls and
//!    "configuration saved" signals, drained once per frame.
//! 2. **Accessors** - time, weather, battery and hour-mode state the link
//!    keeps up to date.
//! 3. **Commands** - music control, volume and battery level sent back to
//!    the phone.

pub mod state;

pub use state::StateLink;

use crate::clock::DateTime;
use heapless::String;

/// Maximum length of a notification's source app name.
pub const APP_NAME_LEN: usize = 32;
/// Maximum length of a notification body (longer bodies are truncated).
pub const MESSAGE_LEN: usize = 128;
/// Maximum length of a notification timestamp string.
pub const TIMESTAMP_LEN: usize = 24;
/// Maximum length of an incoming caller's name or number.
pub const CALLER_LEN: usize = 32;
/// Maximum length of the weather city name.
pub const CITY_LEN: usize = 32;

/// A notification mirrored from the phone.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Notification {
    /// Source application name.
    pub app: String<APP_NAME_LEN>,
    /// Message body.
    pub message: String<MESSAGE_LEN>,
    /// Protocol category code (see `icons::notification_icon_index`).
    pub icon: u8,
    /// Time the phone received it, as sent by the phone.
    pub time: String<TIMESTAMP_LEN>,
}

impl Notification {
    /// Build a notification, truncating each field to its capacity.
    pub fn new(app: &str, message: &str, icon: u8, time: &str) -> Self {
        Self {
            app: truncated(app),
            message: truncated(message),
            icon,
            time: truncated(time),
        }
    }
}

/// Which piece of state a configuration event refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigKind {
    /// Date and time were set.
    Time,
    /// Weather forecast (`a`) and/or city name (`b`) were saved.
    Weather,
    /// Any other setting the link handles internally.
    Other(u8),
}

/// `Config { kind: Weather, a, .. }` value meaning high/low are present.
pub const WEATHER_COMPLETE: u32 = 2;
/// `Config { kind: Weather, a, .. }` value meaning only temperatures arrived.
pub const WEATHER_PARTIAL: u32 = 1;

/// Events the link publishes for the UI loop.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkEvent {
    /// The phone connected (`true`) or disconnected (`false`).
    Connection(bool),
    /// A new notification arrived.
    Notification(Notification),
    /// Incoming call started (`ringing`) or was dismissed.
    Ringer {
        caller: String<CALLER_LEN>,
        ringing: bool,
    },
    /// A setting was saved; `a` and `b` are kind-specific parameters.
    Config { kind: ConfigKind, a: u32, b: u32 },
}

/// One forecast entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Weather {
    /// Current temperature (degrees).
    pub temp: i16,
    pub high: i16,
    pub low: i16,
    /// Protocol condition code (see `icons::weather_icon_index`).
    pub icon: u8,
}

/// Media controls the watch can ask the phone to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MusicAction {
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
    VolumeUp,
    VolumeDown,
}

/// Commands queued for the phone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkCommand {
    Music(MusicAction),
    /// Set media volume (0-100).
    Volume(u8),
    /// Report battery level (%) and charging state.
    Battery { level: u8, charging: bool },
}

/// The watch-communication library as seen by the UI glue.
pub trait CompanionLink {
    /// Start advertising and accepting the companion app.
    fn begin(&mut self);

    /// Run pending link work; called once per frame with the current uptime.
    fn process(&mut self, now_ms: u64);

    /// Take the next pending event, oldest first.
    fn next_event(&mut self) -> Option<LinkEvent>;

    fn is_connected(&self) -> bool;

    /// Current date and time as of the last `process`.
    fn time(&self) -> DateTime;

    fn is_24_hour(&self) -> bool;

    fn set_24_hour(&mut self, enabled: bool);

    /// Hour to show on clock faces, honouring the 12/24-hour setting.
    fn clock_hour(&self) -> u8 {
        let time = self.time();
        if self.is_24_hour() {
            time.hour
        } else {
            time.hour12()
        }
    }

    fn minute(&self) -> u8 {
        self.time().minute
    }

    fn second(&self) -> u8 {
        self.time().second
    }

    /// Forecast entry `index` (0 = today), if the phone sent one.
    fn weather_at(&self, index: usize) -> Option<Weather>;

    fn weather_city(&self) -> &str;

    /// Battery level (%) last reported to the phone.
    fn battery(&self) -> u8;

    fn set_battery(&mut self, level: u8);

    fn music_control(&mut self, action: MusicAction);

    fn set_volume(&mut self, level: u8);

    /// Forget stored notifications.
    fn clear_notifications(&mut self);
}

/// Copy `s` into a bounded string, dropping whatever does not fit.
pub fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
