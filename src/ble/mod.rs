//! Bluetooth Low Energy subsystem.
//!
//! This module drives the Nordic SoftDevice S140 in **Peripheral** role
//! so the companion phone app can find and connect to the watch:
//!
//! 1. **Advertiser** - connectable advertising carrying the device name.
//! 2. **Connection watch** - reports connect/disconnect to the UI task.
//! 3. **Command sink** - drains the commands the UI queued for the phone.
//!
//! Communication with the UI task is done via the Embassy channels below.

pub mod companion;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use standby_watch::link::LinkCommand;

/// Depth of the BLE → UI event channel.
pub const EVENT_DEPTH: usize = 4;
/// Depth of the UI → BLE command channel.
pub const COMMAND_DEPTH: usize = 8;

/// Events the BLE task publishes for the UI loop.
#[derive(Clone, Copy, defmt::Format)]
pub enum BleEvent {
    /// The phone connected.
    Connected,
    /// Connection lost or closed by the phone.
    Disconnected,
}

pub static BLE_EVENTS: Channel<CriticalSectionRawMutex, BleEvent, EVENT_DEPTH> = Channel::new();

pub static BLE_COMMANDS: Channel<CriticalSectionRawMutex, LinkCommand, COMMAND_DEPTH> =
    Channel::new();
