//! standby-watch firmware entry point.
//!
//! Task layout:
//! - `softdevice_task`: runs the SoftDevice event loop
//! - `companion_task`: advertises and watches the phone connection
//! - main: the cooperative UI loop (touch, link events, widgets, flush)

#![no_std]
#![no_main]

mod ble;
mod board;

use defmt::{error, info, unwrap, warn};
use embassy_executor::Spawner;
use embassy_time::{Duration, Instant, Timer};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use nrf_softdevice::Softdevice;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use standby_watch::app::prepare_display;
use standby_watch::config::{DRAW_BUFFER_PIXELS, FRAME_PERIOD_MS};
use standby_watch::link::StateLink;
use standby_watch::ui::flush::refresh;
use standby_watch::ui::input::{read_touch, TouchTracker};
use standby_watch::ui::scene::Scene;
use standby_watch::WatchApp;

use crate::ble::companion::{companion_task, softdevice_config, softdevice_task};
use crate::ble::{BleEvent, BLE_COMMANDS, BLE_EVENTS};

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("standby-watch starting");

    let p = embassy_nrf::init(board::embassy_config());
    let mut screen = match board::init(p) {
        Ok(screen) => screen,
        Err(e) => {
            error!("Board bring-up failed: {}", e);
            park().await
        }
    };

    static DRAW_BUFFER: StaticCell<[Rgb565; DRAW_BUFFER_PIXELS]> = StaticCell::new();
    let storage = DRAW_BUFFER.init([Rgb565::BLACK; DRAW_BUFFER_PIXELS]);
    let mut buffer = match prepare_display(&mut screen, storage) {
        Ok(buffer) => buffer,
        Err(e) => {
            error!("Display setup failed: {}", e);
            park().await
        }
    };

    let sd = Softdevice::enable(&softdevice_config());
    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(companion_task(sd)));

    let mut app = WatchApp::new(StateLink::new(), Scene::new());
    app.setup();
    let mut touch = TouchTracker::new();

    loop {
        while let Ok(event) = BLE_EVENTS.try_receive() {
            let connected = matches!(event, BleEvent::Connected);
            if let Err(e) = app.link_mut().on_connection(connected) {
                warn!("Link event dropped: {}", e);
            }
        }

        if let Some(pointer) = touch.update(read_touch(&mut screen)) {
            if let Some(event) = app.ui_mut().handle_pointer(pointer) {
                app.handle_ui_event(event);
            }
        }

        app.run_frame(Instant::now().as_millis());

        while let Some(command) = app.link_mut().take_command() {
            if BLE_COMMANDS.try_send(command).is_err() {
                warn!("Command channel full - dropping {}", command);
            }
        }

        if let Err(e) = refresh(app.ui_mut(), &mut buffer, &mut screen) {
            warn!("Display flush failed: {}", e);
        }

        Timer::after(Duration::from_millis(FRAME_PERIOD_MS)).await;
    }
}

/// Stay alive but idle after a fatal start-up error.
async fn park() -> ! {
    loop {
        Timer::after(Duration::from_secs(3600)).await;
    }
}
