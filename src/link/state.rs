//! State-holding companion link.
//!
//! `StateLink` keeps everything the phone has synced (clock, forecast,
//! city, notifications) and queues events for the UI loop and commands
//! for the phone.  The radio side calls the `on_*` / `sync_*` methods as
//! data arrives; the UI side uses it through `CompanionLink`.

use heapless::{Deque, String, Vec};

use super::{
    truncated, CompanionLink, ConfigKind, LinkCommand, LinkEvent, MusicAction, Notification,
    Weather, CALLER_LEN, CITY_LEN, WEATHER_COMPLETE, WEATHER_PARTIAL,
};
use crate::clock::{DateTime, WallClock};
use crate::config::{DEFAULT_24_HOUR, LINK_QUEUE_DEPTH, WEATHER_SLOTS};
use crate::error::{Error, Result};

/// Number of recent notifications kept for the history list.
pub const NOTIFICATION_HISTORY: usize = 4;

pub struct StateLink {
    started: bool,
    connected: bool,
    clock: WallClock,
    now: DateTime,
    hour_24: bool,
    battery: u8,
    charging: bool,
    weather: Vec<Weather, WEATHER_SLOTS>,
    city: String<CITY_LEN>,
    notifications: Deque<Notification, NOTIFICATION_HISTORY>,
    events: Deque<LinkEvent, LINK_QUEUE_DEPTH>,
    commands: Deque<LinkCommand, LINK_QUEUE_DEPTH>,
}

impl StateLink {
    pub const fn new() -> Self {
        Self {
            started: false,
            connected: false,
            clock: WallClock::new(),
            now: DateTime::EPOCH,
            hour_24: DEFAULT_24_HOUR,
            battery: 0,
            charging: false,
            weather: Vec::new(),
            city: String::new(),
            notifications: Deque::new(),
            events: Deque::new(),
            commands: Deque::new(),
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    // Radio side

    /// The phone connected or disconnected.
    pub fn on_connection(&mut self, connected: bool) -> Result<()> {
        self.connected = connected;
        self.push_event(LinkEvent::Connection(connected))
    }

    /// The phone pushed a notification.
    pub fn on_notification(&mut self, notification: Notification) -> Result<()> {
        if self.notifications.is_full() {
            self.notifications.pop_front();
        }
        let _ = self.notifications.push_back(notification.clone());
        self.push_event(LinkEvent::Notification(notification))
    }

    /// An incoming call started or ended.
    pub fn on_ringer(&mut self, caller: &str, ringing: bool) -> Result<()> {
        let caller: String<CALLER_LEN> = truncated(caller);
        self.push_event(LinkEvent::Ringer { caller, ringing })
    }

    /// The phone set the date and time.
    ///
    /// Out-of-range fields are rejected and the clock keeps running
    /// from its previous setting.
    pub fn sync_time(&mut self, time: DateTime, now_ms: u64) -> Result<()> {
        if !time.is_valid() {
            warn!("Rejected time sync {}-{}-{}", time.year, time.month + 1, time.day);
            return Err(Error::InvalidDateTime);
        }
        self.clock.set(time, now_ms);
        self.now = time;
        self.push_event(LinkEvent::Config {
            kind: ConfigKind::Time,
            a: 0,
            b: 0,
        })
    }

    /// The phone sent forecast entries (index 0 = today).
    ///
    /// `complete` is false when only the current temperatures arrived and
    /// high/low values are still pending.
    pub fn sync_weather(&mut self, entries: &[Weather], complete: bool) -> Result<()> {
        self.weather.clear();
        for entry in entries.iter().take(WEATHER_SLOTS) {
            let _ = self.weather.push(*entry);
        }
        let a = if complete {
            WEATHER_COMPLETE
        } else {
            WEATHER_PARTIAL
        };
        self.push_event(LinkEvent::Config {
            kind: ConfigKind::Weather,
            a,
            b: 0,
        })
    }

    /// The phone sent the forecast's city name.
    pub fn sync_weather_city(&mut self, city: &str) -> Result<()> {
        self.city = truncated(city);
        self.push_event(LinkEvent::Config {
            kind: ConfigKind::Weather,
            a: 0,
            b: 1,
        })
    }

    /// Any other setting the link stores itself.
    pub fn on_config(&mut self, code: u8, a: u32, b: u32) -> Result<()> {
        self.push_event(LinkEvent::Config {
            kind: ConfigKind::Other(code),
            a,
            b,
        })
    }

    /// Next command to send to the phone.
    pub fn take_command(&mut self) -> Option<LinkCommand> {
        self.commands.pop_front()
    }

    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.iter()
    }

    pub fn notification_count(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_charging(&self) -> bool {
        self.charging
    }

    pub fn set_charging(&mut self, charging: bool) {
        self.charging = charging;
        self.queue_command(LinkCommand::Battery {
            level: self.battery,
            charging,
        });
    }

    fn push_event(&mut self, event: LinkEvent) -> Result<()> {
        self.events.push_back(event).map_err(|_| {
            warn!("Link event queue full - dropping event");
            Error::QueueFull
        })
    }

    fn queue_command(&mut self, command: LinkCommand) {
        if self.commands.push_back(command).is_err() {
            warn!("Link command queue full - dropping command");
        }
    }
}

impl Default for StateLink {
    fn default() -> Self {
        Self::new()
    }
}

impl CompanionLink for StateLink {
    fn begin(&mut self) {
        self.started = true;
        info!("Companion link started");
    }

    fn process(&mut self, now_ms: u64) {
        self.now = self.clock.now(now_ms);
    }

    fn next_event(&mut self) -> Option<LinkEvent> {
        self.events.pop_front()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn time(&self) -> DateTime {
        self.now
    }

    fn is_24_hour(&self) -> bool {
        self.hour_24
    }

    fn set_24_hour(&mut self, enabled: bool) {
        self.hour_24 = enabled;
    }

    fn weather_at(&self, index: usize) -> Option<Weather> {
        self.weather.get(index).copied()
    }

    fn weather_city(&self) -> &str {
        self.city.as_str()
    }

    fn battery(&self) -> u8 {
        self.battery
    }

    fn set_battery(&mut self, level: u8) {
        self.battery = level.min(100);
        self.queue_command(LinkCommand::Battery {
            level: self.battery,
            charging: self.charging,
        });
    }

    fn music_control(&mut self, action: MusicAction) {
        self.queue_command(LinkCommand::Music(action));
    }

    fn set_volume(&mut self, level: u8) {
        self.queue_command(LinkCommand::Volume(level.min(100)));
    }

    fn clear_notifications(&mut self) {
        self.notifications.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_time() -> DateTime {
        DateTime {
            year: 2024,
            month: 2,
            day: 14,
            hour: 21,
            minute: 5,
            second: 30,
        }
    }

    #[test]
    fn events_drain_in_arrival_order() {
        let mut link = StateLink::new();
        link.on_connection(true).unwrap();
        link.on_ringer("Alice", true).unwrap();

        assert_eq!(link.next_event(), Some(LinkEvent::Connection(true)));
        assert!(matches!(
            link.next_event(),
            Some(LinkEvent::Ringer { ringing: true, .. })
        ));
        assert_eq!(link.next_event(), None);
        assert!(link.is_connected());
    }

    #[test]
    fn full_event_queue_reports_error() {
        let mut link = StateLink::new();
        for _ in 0..LINK_QUEUE_DEPTH {
            link.on_connection(true).unwrap();
        }
        assert_eq!(link.on_connection(false), Err(Error::QueueFull));
    }

    #[test]
    fn time_sync_runs_clock_forward() {
        let mut link = StateLink::new();
        link.sync_time(sample_time(), 1_000).unwrap();
        assert_eq!(
            link.next_event(),
            Some(LinkEvent::Config {
                kind: ConfigKind::Time,
                a: 0,
                b: 0
            })
        );

        link.process(61_000);
        assert_eq!(link.minute(), 6);
        assert_eq!(link.second(), 30);
        assert_eq!(link.clock_hour(), 21);
    }

    #[test]
    fn out_of_range_time_is_rejected() {
        let mut link = StateLink::new();
        let bad = [
            // 31 April
            DateTime { month: 3, day: 31, hour: 23, minute: 59, second: 59, ..sample_time() },
            DateTime { month: 12, ..sample_time() },
            DateTime { day: 0, ..sample_time() },
            DateTime { hour: 24, ..sample_time() },
        ];
        for time in bad {
            assert_eq!(link.sync_time(time, 0), Err(Error::InvalidDateTime));
        }
        assert_eq!(link.next_event(), None);

        link.process(2_000);
        assert_eq!(link.clock_hour(), 0);
        assert_eq!(link.second(), 2);

        link.sync_time(sample_time(), 0).unwrap();
        assert_eq!(link.clock_hour(), 21);
    }

    #[test]
    fn twelve_hour_mode_changes_clock_hour() {
        let mut link = StateLink::new();
        link.sync_time(sample_time(), 0).unwrap();
        link.set_24_hour(false);
        assert_eq!(link.clock_hour(), 9);
    }

    #[test]
    fn weather_sync_flags_completeness() {
        let mut link = StateLink::new();
        let today = Weather {
            temp: 21,
            high: 25,
            low: 12,
            icon: 1,
        };
        link.sync_weather(&[today], true).unwrap();
        link.sync_weather_city("Nairobi").unwrap();

        assert_eq!(
            link.next_event(),
            Some(LinkEvent::Config {
                kind: ConfigKind::Weather,
                a: WEATHER_COMPLETE,
                b: 0
            })
        );
        assert_eq!(
            link.next_event(),
            Some(LinkEvent::Config {
                kind: ConfigKind::Weather,
                a: 0,
                b: 1
            })
        );
        assert_eq!(link.weather_at(0), Some(today));
        assert_eq!(link.weather_at(1), None);
        assert_eq!(link.weather_city(), "Nairobi");
    }

    #[test]
    fn weather_sync_keeps_at_most_slots() {
        let mut link = StateLink::new();
        let entries = [Weather::default(); WEATHER_SLOTS + 3];
        link.sync_weather(&entries, false).unwrap();
        assert!(link.weather_at(WEATHER_SLOTS - 1).is_some());
        assert!(link.weather_at(WEATHER_SLOTS).is_none());
    }

    #[test]
    fn notification_history_evicts_oldest() {
        let mut link = StateLink::new();
        for i in 0..(NOTIFICATION_HISTORY as u8 + 1) {
            let n = Notification::new("Mail", "hi", i, "");
            link.on_notification(n).unwrap();
            link.next_event();
        }
        assert_eq!(link.notification_count(), NOTIFICATION_HISTORY);
        assert_eq!(link.notifications().next().map(|n| n.icon), Some(1));

        link.clear_notifications();
        assert_eq!(link.notification_count(), 0);
    }

    #[test]
    fn outbound_commands_are_queued() {
        let mut link = StateLink::new();
        link.set_battery(150);
        link.music_control(MusicAction::Next);
        link.set_volume(42);

        assert_eq!(
            link.take_command(),
            Some(LinkCommand::Battery {
                level: 100,
                charging: false
            })
        );
        assert_eq!(
            link.take_command(),
            Some(LinkCommand::Music(MusicAction::Next))
        );
        assert_eq!(link.take_command(), Some(LinkCommand::Volume(42)));
        assert_eq!(link.take_command(), None);
        assert_eq!(link.battery(), 100);
    }

    #[test]
    fn charging_flag_rides_on_battery_report() {
        let mut link = StateLink::new();
        link.set_battery(80);
        link.take_command();

        link.set_charging(true);
        assert!(link.is_charging());
        assert_eq!(
            link.take_command(),
            Some(LinkCommand::Battery {
                level: 80,
                charging: true
            })
        );

        link.set_battery(81);
        assert_eq!(
            link.take_command(),
            Some(LinkCommand::Battery {
                level: 81,
                charging: true
            })
        );
    }
}
