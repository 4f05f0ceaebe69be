//! Integration tests for standby-watch host-testable logic.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;

use standby_watch::ble::adv::{build_advertisement, extract_device_name, is_discoverable};
use standby_watch::clock::DateTime;
use standby_watch::config::{
    DEVICE_NAME, DRAW_BUFFER_LINES, PANEL_WIDTH, SCREEN_HEIGHT, SCREEN_WIDTH,
};
use standby_watch::link::{
    CompanionLink, LinkCommand, MusicAction, Notification, StateLink, Weather,
};
use standby_watch::ui::flush::{refresh, DisplayDriver, DrawBuffer};
use standby_watch::ui::input::{read_touch, to_screen, PointerEvent, TouchState, TouchTracker};
use standby_watch::ui::scene::Scene;
use standby_watch::ui::{Screen, UiEvent, WidgetId};
use standby_watch::{app::prepare_display, Result, WatchApp};

/// Panel stand-in: records pushed rectangles and replays scripted touches.
#[derive(Default)]
struct FakePanel {
    initialised: bool,
    pushes: Vec<(u16, u16, u16, u16)>,
    touch: Option<(u16, u16)>,
}

impl DisplayDriver for FakePanel {
    fn init(&mut self) -> Result<()> {
        self.initialised = true;
        Ok(())
    }

    fn push_image(&mut self, x: u16, y: u16, w: u16, h: u16, pixels: &[Rgb565]) -> Result<()> {
        assert_eq!(pixels.len(), w as usize * h as usize);
        self.pushes.push((x, y, w, h));
        Ok(())
    }

    fn get_touch(&mut self) -> Option<(u16, u16)> {
        self.touch
    }
}

fn synced_app() -> WatchApp<StateLink, Scene> {
    let mut app = WatchApp::new(StateLink::new(), Scene::new());
    app.setup();
    let now = DateTime {
        year: 2024,
        month: 11,
        day: 31,
        hour: 23,
        minute: 59,
        second: 50,
    };
    app.link_mut().sync_time(now, 0).unwrap();
    app.run_frame(0);
    app
}

/// Raw panel coordinate that lands on screen point `p`.
#[cfg(not(feature = "portrait"))]
fn raw_for(p: Point) -> (u16, u16) {
    (PANEL_WIDTH - 1 - p.y as u16, p.x as u16)
}

#[cfg(feature = "portrait")]
fn raw_for(p: Point) -> (u16, u16) {
    (p.x as u16, p.y as u16)
}

/// Poll the panel once and dispatch whatever the touch produced.
fn poll_touch(
    app: &mut WatchApp<StateLink, Scene>,
    panel: &mut FakePanel,
    tracker: &mut TouchTracker,
) -> Option<UiEvent> {
    let pointer = tracker.update(read_touch(panel))?;
    let event = app.ui_mut().handle_pointer(pointer)?;
    app.handle_ui_event(event);
    Some(event)
}

#[test]
fn first_refresh_covers_the_whole_screen_in_bands() {
    let mut panel = FakePanel::default();
    let mut storage = vec![Rgb565::BLACK; SCREEN_WIDTH as usize * DRAW_BUFFER_LINES as usize];
    let mut buffer = prepare_display(&mut panel, &mut storage).unwrap();
    assert!(panel.initialised);

    let mut app = synced_app();
    let bands = refresh(app.ui_mut(), &mut buffer, &mut panel).unwrap();

    let expected = (SCREEN_HEIGHT as usize).div_ceil(DRAW_BUFFER_LINES as usize);
    assert_eq!(bands, expected);
    assert_eq!(panel.pushes.first(), Some(&(0, 0, SCREEN_WIDTH, DRAW_BUFFER_LINES)));
    let covered: u32 = panel.pushes.iter().map(|p| p.3 as u32).sum();
    assert_eq!(covered, SCREEN_HEIGHT as u32);

    // Nothing changed: nothing to flush.
    assert_eq!(refresh(app.ui_mut(), &mut buffer, &mut panel).unwrap(), 0);
}

#[test]
fn notification_redraws_only_the_alert_rows() {
    let mut panel = FakePanel::default();
    let mut storage = vec![Rgb565::BLACK; SCREEN_WIDTH as usize * DRAW_BUFFER_LINES as usize];
    let mut buffer = DrawBuffer::new(&mut storage, SCREEN_WIDTH).unwrap();
    let mut app = synced_app();
    refresh(app.ui_mut(), &mut buffer, &mut panel).unwrap();
    panel.pushes.clear();

    app.link_mut()
        .on_notification(Notification::new("WhatsApp", "On my way", 0x0A, "18:02"))
        .unwrap();
    app.run_frame(20);
    let bands = refresh(app.ui_mut(), &mut buffer, &mut panel).unwrap();

    // Alert rows plus the ticking second hand, not the whole screen.
    let alert = app.ui().bounds(WidgetId::AlertPanel);
    let first = panel.pushes[0];
    let last = panel.pushes[panel.pushes.len() - 1];
    assert_eq!(panel.pushes.len(), bands);
    assert!(i32::from(first.1) <= alert.top_left.y);
    assert!(i32::from(last.1 + last.3) >= alert.top_left.y + alert.size.height as i32);
    assert!(bands < (SCREEN_HEIGHT / DRAW_BUFFER_LINES) as usize);

    app.run_frame(5_020);
    assert!(app.ui().is_hidden(WidgetId::AlertPanel));
}

#[test]
fn year_rolls_over_on_the_clock_face() {
    let mut app = synced_app();
    app.run_frame(10_000);
    let now = app.link().time();
    assert_eq!((now.year, now.month, now.day), (2025, 0, 1));
    assert_eq!((now.hour, now.minute, now.second), (0, 0, 0));
}

#[test]
fn swipe_loads_clock_screen_and_moves_overlays() {
    let mut app = synced_app();
    let mut panel = FakePanel::default();
    let mut tracker = TouchTracker::new();

    panel.touch = Some(raw_for(Point::new(SCREEN_WIDTH as i32 - 40, 40)));
    assert_eq!(poll_touch(&mut app, &mut panel, &mut tracker), None);
    panel.touch = Some(raw_for(Point::new(40, 50)));
    assert_eq!(poll_touch(&mut app, &mut panel, &mut tracker), None);
    panel.touch = None;
    assert_eq!(
        poll_touch(&mut app, &mut panel, &mut tracker),
        Some(UiEvent::ScreenLoaded(Screen::Clock))
    );

    assert_eq!(app.ui().active_screen(), Screen::Clock);
    assert_eq!(app.ui().screen_of(WidgetId::AlertPanel), Screen::Clock);
    assert_eq!(app.ui().screen_of(WidgetId::CallPanel), Screen::Clock);

    // A notification now shows on the clock screen.
    app.link_mut()
        .on_notification(Notification::new("Mail", "Invoice", 0x04, ""))
        .unwrap();
    app.run_frame(100);
    assert!(app.ui().is_visible(WidgetId::AlertTitle));
}

#[test]
fn tapping_music_controls_reaches_the_phone() {
    let mut app = synced_app();
    while app.link_mut().take_command().is_some() {}
    let mut panel = FakePanel::default();
    let mut tracker = TouchTracker::new();

    // Page the info panel to the music controls with two upward swipes.
    let info = app.ui().bounds(WidgetId::InfoPanel).center();
    for _ in 0..2 {
        panel.touch = Some(raw_for(info + Point::new(0, 70)));
        poll_touch(&mut app, &mut panel, &mut tracker);
        panel.touch = Some(raw_for(info - Point::new(0, 70)));
        poll_touch(&mut app, &mut panel, &mut tracker);
        panel.touch = None;
        poll_touch(&mut app, &mut panel, &mut tracker);
    }
    assert!(app.ui().is_visible(WidgetId::MusicNext));

    let next = app.ui().bounds(WidgetId::MusicNext).center();
    panel.touch = Some(raw_for(next));
    poll_touch(&mut app, &mut panel, &mut tracker);
    panel.touch = None;
    assert_eq!(
        poll_touch(&mut app, &mut panel, &mut tracker),
        Some(UiEvent::MusicNext)
    );
    assert_eq!(
        app.link_mut().take_command(),
        Some(LinkCommand::Music(MusicAction::Next))
    );

    let slider = app.ui().bounds(WidgetId::VolumeSlider);
    let right = Point::new(slider.top_left.x + slider.size.width as i32 - 1, slider.center().y);
    panel.touch = Some(raw_for(right));
    assert_eq!(
        poll_touch(&mut app, &mut panel, &mut tracker),
        Some(UiEvent::VolumeChanged)
    );
    assert!(matches!(
        app.link_mut().take_command(),
        Some(LinkCommand::Volume(v)) if v >= 99
    ));
}

#[test]
fn incoming_call_blocks_touch_until_dismissed() {
    let mut app = synced_app();
    let mut panel = FakePanel::default();
    let mut tracker = TouchTracker::new();

    app.link_mut().on_ringer("+44 20 7946 0018", true).unwrap();
    app.run_frame(50);
    assert!(app.ui().is_visible(WidgetId::CallerName));

    panel.touch = Some(raw_for(Point::new(SCREEN_WIDTH as i32 - 40, 40)));
    poll_touch(&mut app, &mut panel, &mut tracker);
    panel.touch = Some(raw_for(Point::new(40, 40)));
    poll_touch(&mut app, &mut panel, &mut tracker);
    panel.touch = None;
    assert_eq!(poll_touch(&mut app, &mut panel, &mut tracker), None);
    assert_eq!(app.ui().active_screen(), Screen::Home);

    app.link_mut().on_ringer("", false).unwrap();
    app.run_frame(100);
    assert!(!app.ui().is_visible(WidgetId::CallPanel));
}

#[test]
fn weather_sync_reaches_the_info_panel() {
    let mut app = synced_app();
    let forecast = [
        Weather {
            temp: -3,
            high: 1,
            low: -7,
            icon: 2,
        },
        Weather {
            temp: 0,
            high: 2,
            low: -5,
            icon: 4,
        },
    ];
    app.link_mut().sync_weather(&forecast, true).unwrap();
    app.link_mut().sync_weather_city("Tromsø").unwrap();
    app.run_frame(20);

    assert_eq!(app.ui().text(WidgetId::WeatherTemperature), "-3°");
    assert_eq!(app.ui().text(WidgetId::WeatherRange), "H:1°  L:-7°");
    assert_eq!(app.ui().text(WidgetId::WeatherCondition), "Snow");
    assert_eq!(app.ui().text(WidgetId::WeatherCity), "Tromsø");
    assert_eq!(app.link().weather_at(1).map(|w| w.icon), Some(4));
}

#[test]
fn touch_is_rotated_into_screen_space() {
    let p = Point::new(123, 45);
    assert_eq!(to_screen(raw_for(p)), (123, 45));
}

#[test]
fn idle_touch_is_released() {
    let mut panel = FakePanel::default();
    assert_eq!(read_touch(&mut panel), TouchState::Released);
    let mut tracker = TouchTracker::new();
    assert_eq!(tracker.update(TouchState::Released), None);
    assert!(matches!(
        tracker.update(TouchState::Pressed { x: 1, y: 2 }),
        Some(PointerEvent::Pressed(_))
    ));
}

#[test]
fn advertisement_carries_device_name() {
    let adv = build_advertisement(DEVICE_NAME).unwrap();
    assert!(is_discoverable(&adv));
    assert_eq!(extract_device_name(&adv).as_deref(), Some(DEVICE_NAME));
}
