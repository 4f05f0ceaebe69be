//! User interface subsystem - touch LCD widgets.
//!
//! The app glue drives the UI through [`WidgetSurface`], a small retained
//! widget API (labels, images, rotating hands, panels, a calendar and a
//! volume slider).  [`scene::Scene`] implements it and renders with
//! embedded-graphics; touches come back out as [`UiEvent`]s.
//!
//! ## Components
//!
//! - **Flush**: band-sized draw buffer pushed to the panel driver
//! - **Input**: touch read, rotation mapping and press/move/release edges
//! - **Scene**: widget store, animations, drawing and hit testing

pub mod flush;
pub mod input;
pub mod scene;

use crate::clock::Angle;
use crate::icons::{Digit, NotificationIcon, WeatherIcon};

/// Top-level screens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Screen {
    /// Digital + analog time with the swipeable info panel.
    Home,
    /// Full-size analog face.
    Clock,
}

impl Screen {
    pub fn other(self) -> Screen {
        match self {
            Screen::Home => Screen::Clock,
            Screen::Clock => Screen::Home,
        }
    }
}

/// Every widget the glue code addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WidgetId {
    // Home screen clock
    Hour1,
    Hour2,
    Minute1,
    Minute2,
    HourHand,
    MinuteHand,
    SecondHand,
    // Clock screen
    ClockPanel,
    HourHand1,
    MinuteHand1,
    SecondHand1,
    // Info panel pages
    InfoPanel,
    WeatherTemperature,
    WeatherRange,
    WeatherCondition,
    WeatherIcon,
    WeatherCity,
    Calendar,
    MusicPrevious,
    MusicPlay,
    MusicNext,
    VolumeSlider,
    // Overlays
    AlertPanel,
    AlertIcon,
    AlertTitle,
    AlertText,
    CallPanel,
    CallIcon,
    CallText,
    CallerName,
}

pub const WIDGET_COUNT: usize = 30;

impl WidgetId {
    pub const ALL: [WidgetId; WIDGET_COUNT] = [
        WidgetId::Hour1,
        WidgetId::Hour2,
        WidgetId::Minute1,
        WidgetId::Minute2,
        WidgetId::HourHand,
        WidgetId::MinuteHand,
        WidgetId::SecondHand,
        WidgetId::ClockPanel,
        WidgetId::HourHand1,
        WidgetId::MinuteHand1,
        WidgetId::SecondHand1,
        WidgetId::InfoPanel,
        WidgetId::WeatherTemperature,
        WidgetId::WeatherRange,
        WidgetId::WeatherCondition,
        WidgetId::WeatherIcon,
        WidgetId::WeatherCity,
        WidgetId::Calendar,
        WidgetId::MusicPrevious,
        WidgetId::MusicPlay,
        WidgetId::MusicNext,
        WidgetId::VolumeSlider,
        WidgetId::AlertPanel,
        WidgetId::AlertIcon,
        WidgetId::AlertTitle,
        WidgetId::AlertText,
        WidgetId::CallPanel,
        WidgetId::CallIcon,
        WidgetId::CallText,
        WidgetId::CallerName,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Image sources a widget can show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Image {
    Digit(Digit),
    Notification(NotificationIcon),
    Weather(WeatherIcon),
    /// Handset glyph on the call overlay.
    Call,
}

/// Built-in widget animations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Animation {
    /// Continuous rotation, one turn per minute.
    ClockWise,
    /// Grow/shrink pulse.
    PulseCall,
    /// Vertical bob.
    TextUpDown,
    /// Horizontal sway.
    TextSide,
}

/// User actions reported by the UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UiEvent {
    ScreenLoaded(Screen),
    MusicPrevious,
    MusicToggle,
    MusicNext,
    VolumeChanged,
}

/// The GUI engine as seen by the app glue.
pub trait WidgetSurface {
    fn set_text(&mut self, id: WidgetId, text: &str);

    fn set_image(&mut self, id: WidgetId, image: Image);

    /// Rotate an image widget (tenths of a degree).
    fn set_angle(&mut self, id: WidgetId, angle: Angle);

    fn set_hidden(&mut self, id: WidgetId, hidden: bool);

    /// Move a top-level widget onto `screen`.
    fn set_parent(&mut self, id: WidgetId, screen: Screen);

    /// Make a scrollable panel snap to whole pages.
    fn set_scroll_snap(&mut self, id: WidgetId, snap: bool);

    fn start_animation(&mut self, id: WidgetId, animation: Animation);

    /// Stop every animation running on `id`.
    fn stop_animations(&mut self, id: WidgetId);

    fn stop_all_animations(&mut self);

    /// `month` is 1-based.
    fn set_calendar_today(&mut self, year: u16, month: u8, day: u8);

    fn set_calendar_shown(&mut self, year: u16, month: u8);

    fn slider_value(&self, id: WidgetId) -> i32;

    /// Run timers and animations up to uptime `now_ms`.
    fn advance(&mut self, now_ms: u64);
}
