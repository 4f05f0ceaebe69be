//! Application-wide constants and compile-time configuration.
//!
//! All hardware pin assignments, timing parameters, and protocol
//! constants live here so they can be tuned in one place.

// Display

/// Native panel size of the ST7796 (portrait).
pub const PANEL_WIDTH: u16 = 320;
pub const PANEL_HEIGHT: u16 = 480;

/// Logical screen size after rotation.
#[cfg(feature = "portrait")]
pub const SCREEN_WIDTH: u16 = PANEL_WIDTH;
#[cfg(feature = "portrait")]
pub const SCREEN_HEIGHT: u16 = PANEL_HEIGHT;
#[cfg(not(feature = "portrait"))]
pub const SCREEN_WIDTH: u16 = PANEL_HEIGHT;
#[cfg(not(feature = "portrait"))]
pub const SCREEN_HEIGHT: u16 = PANEL_WIDTH;

/// Number of screen lines held by one draw buffer.
///
/// The full frame (480×320×2 bytes) does not fit in RAM next to the
/// SoftDevice, so the scene is rendered in horizontal bands.
pub const DRAW_BUFFER_LINES: u16 = 8;

/// Pixels in one draw buffer band.
pub const DRAW_BUFFER_PIXELS: usize = SCREEN_WIDTH as usize * DRAW_BUFFER_LINES as usize;

/// SPI clock for pixel writes. SPIM3 tops out at 32 MHz.
pub const DISPLAY_SPI_FREQ_HZ: u32 = 32_000_000;

/// Panel colour inversion (the SPI variant of the module is not inverted).
pub const DISPLAY_INVERT: bool = false;

/// Backlight PWM top value and default brightness.
pub const BACKLIGHT_MAX_DUTY: u16 = 1024;
pub const BACKLIGHT_DEFAULT_PCT: u8 = 80;

// Touch (FT5x06 capacitive controller)

/// FT5x06 I²C address.
pub const TOUCH_I2C_ADDRESS: u8 = 0x38;

/// Raw coordinate range reported by the touch controller (portrait).
pub const TOUCH_X_MAX: u16 = PANEL_WIDTH - 1;
pub const TOUCH_Y_MAX: u16 = PANEL_HEIGHT - 1;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `board/mod.rs`.  Adjust for your custom PCB.
//
//   LCD SCK        → P1.15
//   LCD MOSI       → P1.13
//   LCD D/C        → P1.12
//   LCD CS         → P1.11
//   LCD RST        → P1.10
//   LCD backlight  → P1.14
//   Touch SDA      → P0.26
//   Touch SCL      → P0.27
//   Touch INT      → P0.02

// UI loop

/// Frame period of the cooperative UI loop (ms).
pub const FRAME_PERIOD_MS: u64 = 20;

/// How long a notification alert stays on screen (ms).
pub const ALERT_DURATION_MS: u64 = 5_000;

// Companion link

/// Advertised device name.
pub const DEVICE_NAME: &str = "Standby";

/// Battery level reported to the phone at start-up (%).
pub const INITIAL_BATTERY_PCT: u8 = 50;

/// Use the 24-hour clock at start-up.
pub const DEFAULT_24_HOUR: bool = true;

/// Number of forecast entries the companion app may push.
pub const WEATHER_SLOTS: usize = 7;

/// Capacity of pending link events / outbound commands.
pub const LINK_QUEUE_DEPTH: usize = 8;

/// BLE advertising interval (in 0.625 ms units). 400 = 250 ms.
pub const BLE_ADV_INTERVAL: u32 = 400;

/// How often the companion task re-checks that the phone is still connected (ms).
pub const BLE_LINK_CHECK_MS: u64 = 500;
