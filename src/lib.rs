//! Library interface for standby-watch.
//!
//! Everything that does not touch the nRF52840 peripherals lives here so
//! it can be exercised on the host: lookup tables, clock math, the alert
//! timer, the companion-link state, the widget scene and the glue that
//! ties them together.
//!
//! Usage: `cargo test` (host) or `cargo run --release --features embedded`
//! (target, via probe-rs).
//!
//! Note: The embedded binary uses main.rs with #![no_std] and #![no_main]
//! and links this library for everything above the board drivers.

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod alert;
pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod icons;
pub mod link;
pub mod ui;

// Internal module paths for the actual implementations
#[path = "ble/adv.rs"]
mod ble_adv_impl;

pub mod ble {
    pub mod adv {
        pub use crate::ble_adv_impl::{
            build_advertisement, extract_device_name, is_discoverable, ADV_MAX_LEN,
        };
    }
}

pub use app::WatchApp;
pub use error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests - glue behaviour against the real link state and scene
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::clock::{Angle, DateTime};
    use super::icons::{Digit, NotificationIcon, WeatherIcon};
    use super::link::{
        CompanionLink, ConfigKind, LinkCommand, LinkEvent, MusicAction, Notification, StateLink,
        Weather, WEATHER_COMPLETE, WEATHER_PARTIAL,
    };
    use super::ui::scene::Scene;
    use super::ui::{Animation, Image, Screen, UiEvent, WidgetId};
    use super::WatchApp;

    fn app() -> WatchApp<StateLink, Scene> {
        let mut app = WatchApp::new(StateLink::new(), Scene::new());
        app.setup();
        while app.link_mut().take_command().is_some() {}
        app
    }

    fn time(hour: u8, minute: u8, second: u8) -> DateTime {
        DateTime {
            year: 2024,
            month: 4,
            day: 17,
            hour,
            minute,
            second,
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // Setup
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn setup_starts_link_with_defaults() {
        let mut app = WatchApp::new(StateLink::new(), Scene::new());
        app.setup();

        assert!(app.link().is_started());
        assert!(app.link().is_24_hour());
        assert_eq!(app.link().battery(), 50);
        assert_eq!(app.link().notification_count(), 0);
        assert!(app.ui().scroll_snap(WidgetId::InfoPanel));
        assert!(app.ui().scroll_snap(WidgetId::ClockPanel));
        assert_eq!(
            app.link_mut().take_command(),
            Some(LinkCommand::Battery {
                level: 50,
                charging: false
            })
        );
    }

    // ════════════════════════════════════════════════════════════════════════
    // Notifications & alert timer
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn notification_fills_and_shows_alert() {
        let mut app = app();
        let n = Notification::new("Telegram", "Lunch at noon?", 0x18, "12:01");
        app.handle_link_event(LinkEvent::Notification(n), 1_000);

        let ui = app.ui();
        assert_eq!(ui.text(WidgetId::AlertTitle), "Telegram");
        assert_eq!(ui.text(WidgetId::AlertText), "Lunch at noon?");
        assert_eq!(
            ui.image(WidgetId::AlertIcon),
            Some(Image::Notification(NotificationIcon::Telegram))
        );
        assert!(!ui.is_hidden(WidgetId::AlertPanel));
        assert_eq!(app.alert().deadline(), Some(6_000));
    }

    #[test]
    fn unknown_notification_code_uses_first_icon() {
        let mut app = app();
        let n = Notification::new("Bank", "Card used", 0x42, "");
        app.handle_link_event(LinkEvent::Notification(n), 0);
        assert_eq!(
            app.ui().image(WidgetId::AlertIcon),
            Some(Image::Notification(NotificationIcon::Sms))
        );
    }

    #[test]
    fn alert_hides_exactly_at_deadline() {
        let mut app = app();
        let n = Notification::new("Mail", "hi", 0x04, "");
        app.handle_link_event(LinkEvent::Notification(n), 10_000);

        app.poll_alert(14_999);
        assert!(!app.ui().is_hidden(WidgetId::AlertPanel));
        app.poll_alert(15_000);
        assert!(app.ui().is_hidden(WidgetId::AlertPanel));
        assert!(!app.alert().is_active());
    }

    #[test]
    fn second_notification_extends_alert() {
        let mut app = app();
        app.handle_link_event(
            LinkEvent::Notification(Notification::new("A", "1", 0x03, "")),
            0,
        );
        app.handle_link_event(
            LinkEvent::Notification(Notification::new("B", "2", 0x03, "")),
            3_000,
        );
        app.poll_alert(5_000);
        assert!(!app.ui().is_hidden(WidgetId::AlertPanel));
        assert_eq!(app.ui().text(WidgetId::AlertTitle), "B");
        app.poll_alert(8_000);
        assert!(app.ui().is_hidden(WidgetId::AlertPanel));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Calls
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn ringing_shows_call_panel_with_animations() {
        let mut app = app();
        app.link_mut().on_ringer("Grace Hopper", true).unwrap();
        app.run_frame(100);

        let ui = app.ui();
        assert!(!ui.is_hidden(WidgetId::CallPanel));
        assert_eq!(ui.text(WidgetId::CallerName), "Grace Hopper");
        assert!(ui.is_animating(WidgetId::CallIcon, Animation::PulseCall));
        assert!(ui.is_animating(WidgetId::CallText, Animation::TextUpDown));
        assert!(ui.is_animating(WidgetId::CallerName, Animation::TextSide));
    }

    #[test]
    fn dismissed_call_hides_panel_and_stops_only_call_animations() {
        let mut app = app();
        app.link_mut().sync_time(time(8, 0, 0), 0).unwrap();
        app.link_mut().on_ringer("Grace", true).unwrap();
        app.run_frame(0);

        app.handle_link_event(
            LinkEvent::Ringer {
                caller: Default::default(),
                ringing: false,
            },
            500,
        );
        let ui = app.ui();
        assert!(ui.is_hidden(WidgetId::CallPanel));
        assert!(!ui.is_animating(WidgetId::CallIcon, Animation::PulseCall));
        assert!(!ui.is_animating(WidgetId::CallText, Animation::TextUpDown));
        assert!(!ui.is_animating(WidgetId::CallerName, Animation::TextSide));
        assert!(ui.is_animating(WidgetId::SecondHand, Animation::ClockWise));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Configuration events
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn time_sync_sets_second_hands_and_calendar() {
        let mut app = app();
        app.link_mut().sync_time(time(13, 45, 15), 0).unwrap();
        app.run_frame(0);

        let ui = app.ui();
        assert_eq!(ui.angle(WidgetId::SecondHand), Angle(900));
        assert_eq!(ui.angle(WidgetId::SecondHand1), Angle(900));
        assert!(ui.is_animating(WidgetId::SecondHand, Animation::ClockWise));
        assert!(ui.is_animating(WidgetId::SecondHand1, Animation::ClockWise));
        assert_eq!(ui.calendar_today(), (2024, 5, 17));
        assert_eq!(ui.calendar_shown(), (2024, 5));
    }

    #[test]
    fn time_sync_clears_running_animations() {
        let mut app = app();
        app.link_mut().on_ringer("Bob", true).unwrap();
        app.run_frame(0);
        app.link_mut().sync_time(time(9, 0, 0), 10).unwrap();
        app.run_frame(10);
        assert!(!app
            .ui()
            .is_animating(WidgetId::CallIcon, Animation::PulseCall));
        assert_eq!(app.ui().animation_count(), 2);
    }

    #[test]
    fn complete_weather_updates_labels() {
        let mut app = app();
        let today = Weather {
            temp: 21,
            high: 25,
            low: 12,
            icon: 1,
        };
        app.link_mut().sync_weather(&[today], true).unwrap();
        app.run_frame(0);

        let ui = app.ui();
        assert_eq!(ui.text(WidgetId::WeatherTemperature), "21°");
        assert_eq!(ui.text(WidgetId::WeatherRange), "H:25°  L:12°");
        assert_eq!(ui.text(WidgetId::WeatherCondition), "Sunny");
        assert_eq!(
            ui.image(WidgetId::WeatherIcon),
            Some(Image::Weather(WeatherIcon::Sunny))
        );
    }

    #[test]
    fn partial_weather_leaves_labels_alone() {
        let mut app = app();
        let before = std::string::String::from(app.ui().text(WidgetId::WeatherTemperature));
        app.link_mut()
            .sync_weather(&[Weather::default()], false)
            .unwrap();
        app.run_frame(0);
        assert_eq!(app.ui().text(WidgetId::WeatherTemperature), before);
    }

    #[test]
    fn out_of_range_weather_code_falls_back() {
        let mut app = app();
        let today = Weather {
            temp: 3,
            high: 5,
            low: -2,
            icon: 42,
        };
        app.link_mut().sync_weather(&[today], true).unwrap();
        app.run_frame(0);
        assert_eq!(app.ui().text(WidgetId::WeatherCondition), "Partial Clouds");
        assert_eq!(app.ui().text(WidgetId::WeatherRange), "H:5°  L:-2°");
    }

    #[test]
    fn weather_config_parameters_select_updates() {
        let mut app = app();
        app.link_mut()
            .sync_weather(
                &[Weather {
                    temp: 30,
                    high: 31,
                    low: 20,
                    icon: 3,
                }],
                true,
            )
            .unwrap();
        app.link_mut().sync_weather_city("Lisbon").unwrap();
        while app.link_mut().next_event().is_some() {}

        // b only: city changes, temperatures stay
        app.handle_link_event(
            LinkEvent::Config {
                kind: ConfigKind::Weather,
                a: 0,
                b: 1,
            },
            0,
        );
        assert_eq!(app.ui().text(WidgetId::WeatherCity), "Lisbon");
        assert_ne!(app.ui().text(WidgetId::WeatherTemperature), "30°");

        app.handle_link_event(
            LinkEvent::Config {
                kind: ConfigKind::Weather,
                a: WEATHER_PARTIAL,
                b: 0,
            },
            0,
        );
        assert_ne!(app.ui().text(WidgetId::WeatherTemperature), "30°");

        app.handle_link_event(
            LinkEvent::Config {
                kind: ConfigKind::Weather,
                a: WEATHER_COMPLETE,
                b: 0,
            },
            0,
        );
        assert_eq!(app.ui().text(WidgetId::WeatherTemperature), "30°");
        assert_eq!(app.ui().text(WidgetId::WeatherCondition), "Rain");
    }

    #[test]
    fn other_config_changes_nothing_visible() {
        let mut app = app();
        app.link_mut().on_config(0x07, 1, 2).unwrap();
        app.run_frame(0);
        assert!(app.ui().is_hidden(WidgetId::AlertPanel));
        assert_eq!(app.ui().animation_count(), 0);
    }

    // ════════════════════════════════════════════════════════════════════════
    // Frame tick
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn tick_sets_digits_and_hands() {
        let mut app = app();
        app.link_mut().sync_time(time(9, 41, 0), 0).unwrap();
        app.run_frame(0);

        let ui = app.ui();
        assert_eq!(ui.image(WidgetId::Hour1), Some(Image::Digit(Digit::new(0))));
        assert_eq!(ui.image(WidgetId::Hour2), Some(Image::Digit(Digit::new(9))));
        assert_eq!(ui.image(WidgetId::Minute1), Some(Image::Digit(Digit::new(4))));
        assert_eq!(ui.image(WidgetId::Minute2), Some(Image::Digit(Digit::new(1))));
        assert_eq!(ui.angle(WidgetId::MinuteHand), Angle(2460));
        assert_eq!(ui.angle(WidgetId::HourHand), Angle(2905));
        assert_eq!(ui.angle(WidgetId::MinuteHand1), Angle(2460));
        assert_eq!(ui.angle(WidgetId::HourHand1), Angle(2905));
    }

    #[test]
    fn tick_uses_twelve_hour_setting() {
        let mut app = app();
        app.link_mut().sync_time(time(21, 5, 0), 0).unwrap();
        app.link_mut().set_24_hour(false);
        app.run_frame(0);
        assert_eq!(app.ui().image(WidgetId::Hour1), Some(Image::Digit(Digit::new(0))));
        assert_eq!(app.ui().image(WidgetId::Hour2), Some(Image::Digit(Digit::new(9))));
    }

    #[test]
    fn clock_advances_between_frames() {
        let mut app = app();
        app.link_mut().sync_time(time(10, 59, 30), 0).unwrap();
        app.run_frame(0);
        app.run_frame(31_000);
        assert_eq!(app.ui().image(WidgetId::Hour2), Some(Image::Digit(Digit::new(1))));
        assert_eq!(app.ui().image(WidgetId::Minute1), Some(Image::Digit(Digit::new(0))));
        assert_eq!(app.ui().angle(WidgetId::HourHand), Angle(11 * 300));
    }

    // ════════════════════════════════════════════════════════════════════════
    // UI events
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn screen_load_moves_overlays_and_restarts_second_hand() {
        let mut app = app();
        app.link_mut().sync_time(time(7, 30, 20), 0).unwrap();
        app.run_frame(0);

        let event = app.ui_mut().load_screen(Screen::Clock);
        app.handle_ui_event(event);

        let ui = app.ui();
        assert_eq!(ui.screen_of(WidgetId::AlertPanel), Screen::Clock);
        assert_eq!(ui.screen_of(WidgetId::CallPanel), Screen::Clock);
        assert_eq!(ui.angle(WidgetId::SecondHand1), Angle(1200));
        assert!(ui.is_animating(WidgetId::SecondHand1, Animation::ClockWise));
        assert!(!ui.is_animating(WidgetId::SecondHand, Animation::ClockWise));
        assert_eq!(ui.animation_count(), 1);
    }

    #[test]
    fn music_events_become_link_commands() {
        let mut app = app();
        app.handle_ui_event(UiEvent::MusicPrevious);
        app.handle_ui_event(UiEvent::MusicToggle);
        app.handle_ui_event(UiEvent::MusicNext);

        let link = app.link_mut();
        assert_eq!(
            link.take_command(),
            Some(LinkCommand::Music(MusicAction::Previous))
        );
        assert_eq!(
            link.take_command(),
            Some(LinkCommand::Music(MusicAction::Toggle))
        );
        assert_eq!(
            link.take_command(),
            Some(LinkCommand::Music(MusicAction::Next))
        );
    }

    #[test]
    fn volume_follows_slider() {
        let mut app = app();
        app.ui_mut().set_slider_value(WidgetId::VolumeSlider, 73);
        app.handle_ui_event(UiEvent::VolumeChanged);
        assert_eq!(app.link_mut().take_command(), Some(LinkCommand::Volume(73)));
    }

    #[test]
    fn connection_events_only_log() {
        let mut app = app();
        app.link_mut().on_connection(true).unwrap();
        app.run_frame(0);
        assert!(app.link().is_connected());
        assert!(app.ui().is_hidden(WidgetId::AlertPanel));
        assert!(app.ui().is_hidden(WidgetId::CallPanel));
    }
}
