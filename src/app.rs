//! Glue between the companion link and the widget surface.
//!
//! `WatchApp` owns both collaborators plus the alert timer and runs the
//! cooperative frame:
//!
//! 1. GUI work (`WidgetSurface::advance`)
//! 2. link work, then every pending link event
//! 3. clock digits and hands
//! 4. alert auto-dismiss

use core::fmt::Write;

use embedded_graphics::pixelcolor::Rgb565;
use heapless::String;

use crate::alert::AlertTimer;
use crate::clock::{second_angle, ClockFace};
use crate::config::{DEFAULT_24_HOUR, INITIAL_BATTERY_PCT, SCREEN_WIDTH};
use crate::error::Result;
use crate::icons::{weather_condition, NotificationIcon, WeatherIcon};
use crate::link::{
    CompanionLink, ConfigKind, LinkEvent, MusicAction, Notification, WEATHER_COMPLETE,
};
use crate::ui::flush::{DisplayDriver, DrawBuffer};
use crate::ui::{Animation, Image, Screen, UiEvent, WidgetId, WidgetSurface};

/// Wrap the GUI draw buffer and bring up the panel.
///
/// Fails without touching the panel when `storage` is unusable; the caller
/// then stays non-functional.
pub fn prepare_display<'a, D: DisplayDriver>(
    driver: &mut D,
    storage: &'a mut [Rgb565],
) -> Result<DrawBuffer<'a>> {
    let buffer = DrawBuffer::new(storage, SCREEN_WIDTH).map_err(|e| {
        error!("GUI draw buffer allocation failed");
        e
    })?;
    driver.init()?;
    info!("Draw buffer: {} lines", buffer.lines());
    Ok(buffer)
}

/// Current temperature label, e.g. `21°`.
pub fn temperature_text(temp: i16) -> String<16> {
    let mut s = String::new();
    let _ = write!(s, "{}°", temp);
    s
}

/// High/low label, e.g. `H:25°  L:12°`.
pub fn range_text(high: i16, low: i16) -> String<32> {
    let mut s = String::new();
    let _ = write!(s, "H:{}°  L:{}°", high, low);
    s
}

pub struct WatchApp<L, S> {
    link: L,
    ui: S,
    alert: AlertTimer,
}

impl<L: CompanionLink, S: WidgetSurface> WatchApp<L, S> {
    pub fn new(link: L, ui: S) -> Self {
        Self {
            link,
            ui,
            alert: AlertTimer::new(),
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn ui(&self) -> &S {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut S {
        &mut self.ui
    }

    pub fn alert(&self) -> &AlertTimer {
        &self.alert
    }

    /// UI and link start-up, once the display is registered.
    pub fn setup(&mut self) {
        self.ui.set_scroll_snap(WidgetId::InfoPanel, true);
        self.ui.set_scroll_snap(WidgetId::ClockPanel, true);

        self.link.begin();
        self.link.set_battery(INITIAL_BATTERY_PCT);
        self.link.clear_notifications();
        self.link.set_24_hour(DEFAULT_24_HOUR);

        info!("Setup done");
    }

    /// One pass of the main loop at uptime `now_ms`.
    pub fn run_frame(&mut self, now_ms: u64) {
        self.ui.advance(now_ms);

        self.link.process(now_ms);
        while let Some(event) = self.link.next_event() {
            self.handle_link_event(event, now_ms);
        }

        self.tick();
        self.poll_alert(now_ms);
    }

    /// Refresh the time-derived widgets.
    pub fn tick(&mut self) {
        let face = ClockFace::new(self.link.clock_hour(), self.link.minute());

        self.ui.set_image(WidgetId::Hour1, Image::Digit(face.hour_tens));
        self.ui.set_image(WidgetId::Hour2, Image::Digit(face.hour_ones));
        self.ui.set_image(WidgetId::Minute1, Image::Digit(face.minute_tens));
        self.ui.set_image(WidgetId::Minute2, Image::Digit(face.minute_ones));

        self.ui.set_angle(WidgetId::MinuteHand, face.minute_angle);
        self.ui.set_angle(WidgetId::HourHand, face.hour_angle);
        self.ui.set_angle(WidgetId::MinuteHand1, face.minute_angle);
        self.ui.set_angle(WidgetId::HourHand1, face.hour_angle);
    }

    /// Hide the alert panel once its timer runs out.
    pub fn poll_alert(&mut self, now_ms: u64) {
        if self.alert.poll(now_ms) {
            self.ui.set_hidden(WidgetId::AlertPanel, true);
        }
    }

    pub fn handle_link_event(&mut self, event: LinkEvent, now_ms: u64) {
        match event {
            LinkEvent::Connection(connected) => {
                if connected {
                    info!("Connection state: Connected");
                } else {
                    info!("Connection state: Disconnected");
                }
            }
            LinkEvent::Notification(notification) => self.on_notification(&notification, now_ms),
            LinkEvent::Ringer { caller, ringing } => self.on_ringer(caller.as_str(), ringing),
            LinkEvent::Config { kind, a, b } => self.on_config(kind, a, b),
        }
    }

    fn on_notification(&mut self, notification: &Notification, now_ms: u64) {
        info!(
            "Notification from {} (icon {}) at {}",
            notification.app.as_str(),
            notification.icon,
            notification.time.as_str()
        );
        self.ui
            .set_text(WidgetId::AlertTitle, notification.app.as_str());
        self.ui
            .set_text(WidgetId::AlertText, notification.message.as_str());
        self.ui.set_image(
            WidgetId::AlertIcon,
            Image::Notification(NotificationIcon::from_code(notification.icon)),
        );
        self.alert.start(now_ms);
        self.ui.set_hidden(WidgetId::AlertPanel, false);
    }

    fn on_ringer(&mut self, caller: &str, ringing: bool) {
        if ringing {
            info!("Ringer: Incoming call from {}", caller);
            self.ui.set_text(WidgetId::CallerName, caller);
            self.ui
                .start_animation(WidgetId::CallIcon, Animation::PulseCall);
            self.ui
                .start_animation(WidgetId::CallText, Animation::TextUpDown);
            self.ui
                .start_animation(WidgetId::CallerName, Animation::TextSide);
            self.ui.set_hidden(WidgetId::CallPanel, false);
        } else {
            info!("Ringer dismissed");
            self.ui.set_hidden(WidgetId::CallPanel, true);
            self.ui.stop_animations(WidgetId::CallerName);
            self.ui.stop_animations(WidgetId::CallIcon);
            self.ui.stop_animations(WidgetId::CallText);
        }
    }

    fn on_config(&mut self, kind: ConfigKind, a: u32, b: u32) {
        match kind {
            ConfigKind::Time => self.on_time_set(),
            ConfigKind::Weather => self.on_weather(a, b),
            ConfigKind::Other(code) => debug!("Config {} saved ({}, {})", code, a, b),
        }
    }

    fn on_time_set(&mut self) {
        let t = self.link.time();
        info!(
            "The time has been set: {}-{}-{} {}:{}:{}",
            t.year,
            t.month + 1,
            t.day,
            t.hour,
            t.minute,
            t.second
        );

        self.ui.stop_all_animations();
        let angle = second_angle(self.link.second());
        self.ui.set_angle(WidgetId::SecondHand, angle);
        self.ui.set_angle(WidgetId::SecondHand1, angle);
        self.ui
            .start_animation(WidgetId::SecondHand, Animation::ClockWise);
        self.ui
            .start_animation(WidgetId::SecondHand1, Animation::ClockWise);

        self.ui.set_calendar_today(t.year, t.month + 1, t.day);
        self.ui.set_calendar_shown(t.year, t.month + 1);
    }

    fn on_weather(&mut self, a: u32, b: u32) {
        info!("Weather received");
        // a == 1: high/low may not be synced yet
        if a == WEATHER_COMPLETE {
            if let Some(today) = self.link.weather_at(0) {
                self.ui.set_text(
                    WidgetId::WeatherTemperature,
                    temperature_text(today.temp).as_str(),
                );
                self.ui.set_text(
                    WidgetId::WeatherRange,
                    range_text(today.high, today.low).as_str(),
                );
                self.ui
                    .set_text(WidgetId::WeatherCondition, weather_condition(today.icon));
                self.ui.set_image(
                    WidgetId::WeatherIcon,
                    Image::Weather(WeatherIcon::from_code(today.icon)),
                );
            }
        }
        if b != 0 {
            let city = self.link.weather_city();
            info!("City name: {}", city);
            self.ui.set_text(WidgetId::WeatherCity, city);
        }
    }

    pub fn handle_ui_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::ScreenLoaded(screen) => self.on_screen_loaded(screen),
            UiEvent::MusicPrevious => self.link.music_control(MusicAction::Previous),
            UiEvent::MusicToggle => self.link.music_control(MusicAction::Toggle),
            UiEvent::MusicNext => self.link.music_control(MusicAction::Next),
            UiEvent::VolumeChanged => {
                let value = self.ui.slider_value(WidgetId::VolumeSlider);
                self.link.set_volume(value.clamp(0, u8::MAX as i32) as u8);
            }
        }
    }

    fn on_screen_loaded(&mut self, screen: Screen) {
        self.ui.set_parent(WidgetId::AlertPanel, screen);
        self.ui.set_parent(WidgetId::CallPanel, screen);

        self.ui.stop_all_animations();
        let hand = match screen {
            Screen::Home => WidgetId::SecondHand,
            Screen::Clock => WidgetId::SecondHand1,
        };
        self.ui.set_angle(hand, second_angle(self.link.second()));
        self.ui.start_animation(hand, Animation::ClockWise);
    }
}
