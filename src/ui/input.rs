//! Touch input: panel read-out, rotation and press/move/release edges.

use embedded_graphics::prelude::Point;

use super::flush::DisplayDriver;
use crate::config::{PANEL_HEIGHT, PANEL_WIDTH, TOUCH_X_MAX, TOUCH_Y_MAX};

/// Touch state as the GUI expects it each poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TouchState {
    Released,
    Pressed { x: u16, y: u16 },
}

/// Touch read callback: ask the driver for a coordinate.
///
/// The driver reports raw panel coordinates; they are rotated into
/// screen space here.
pub fn read_touch<D: DisplayDriver>(driver: &mut D) -> TouchState {
    match driver.get_touch() {
        Some(raw) => {
            let (x, y) = to_screen(raw);
            TouchState::Pressed { x, y }
        }
        None => TouchState::Released,
    }
}

/// Map a raw (portrait) panel coordinate into screen coordinates.
///
/// Both axes are clamped to the panel first.
#[cfg(not(feature = "portrait"))]
pub fn to_screen((raw_x, raw_y): (u16, u16)) -> (u16, u16) {
    let (raw_x, raw_y) = clamp_raw(raw_x, raw_y);
    (raw_y, PANEL_WIDTH - 1 - raw_x)
}

#[cfg(feature = "portrait")]
pub fn to_screen((raw_x, raw_y): (u16, u16)) -> (u16, u16) {
    clamp_raw(raw_x, raw_y)
}

fn clamp_raw(raw_x: u16, raw_y: u16) -> (u16, u16) {
    (raw_x.min(PANEL_WIDTH - 1), raw_y.min(PANEL_HEIGHT - 1))
}

/// First FT5x06 register of a touch read-out (`TD_STATUS`).
pub const TOUCH_STATUS_REG: u8 = 0x02;
/// Bytes read from `TOUCH_STATUS_REG`: status plus the first touch point.
pub const TOUCH_FRAME_LEN: usize = 5;

/// Decode an FT5x06 read-out into a raw panel coordinate.
///
/// Layout: `[TD_STATUS, P1_XH, P1_XL, P1_YH, P1_YL]`.  The low nibble of
/// `TD_STATUS` counts touch points; `XH`/`YH` carry the event flag in
/// bits 7:6 and the coordinate MSBs in bits 3:0.
pub fn decode_touch(frame: &[u8; TOUCH_FRAME_LEN]) -> Option<(u16, u16)> {
    let points = frame[0] & 0x0F;
    // 0x0F is the controller's "not ready" value
    if points == 0 || points > 5 {
        return None;
    }
    // Event 1 = lift-up
    if frame[1] >> 6 == 1 {
        return None;
    }
    let x = (((frame[1] & 0x0F) as u16) << 8) | frame[2] as u16;
    let y = (((frame[3] & 0x0F) as u16) << 8) | frame[4] as u16;
    Some((x.min(TOUCH_X_MAX), y.min(TOUCH_Y_MAX)))
}

/// Pointer edge fed to the scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    Pressed(Point),
    Moved(Point),
    Released(Point),
}

/// Turns polled touch states into pointer edges.
///
/// A release is reported at the last pressed position, since the panel
/// stops reporting coordinates once the finger lifts.
#[derive(Default)]
pub struct TouchTracker {
    last: Option<Point>,
}

impl TouchTracker {
    pub const fn new() -> Self {
        Self { last: None }
    }

    pub fn is_pressed(&self) -> bool {
        self.last.is_some()
    }

    pub fn update(&mut self, state: TouchState) -> Option<PointerEvent> {
        match (state, self.last) {
            (TouchState::Pressed { x, y }, None) => {
                let p = Point::new(x as i32, y as i32);
                self.last = Some(p);
                Some(PointerEvent::Pressed(p))
            }
            (TouchState::Pressed { x, y }, Some(prev)) => {
                let p = Point::new(x as i32, y as i32);
                if p == prev {
                    return None;
                }
                self.last = Some(p);
                Some(PointerEvent::Moved(p))
            }
            (TouchState::Released, Some(prev)) => {
                self.last = None;
                Some(PointerEvent::Released(prev))
            }
            (TouchState::Released, None) => None,
        }
    }
}
