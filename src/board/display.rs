//! ST7796 panel + backlight + touch, exposed as one `DisplayDriver`.

use embassy_nrf::gpio::Output;
use embassy_nrf::peripherals::{PWM0, SPI3, TWISPI0};
use embassy_nrf::pwm::SimplePwm;
use embassy_nrf::spim::Spim;
use embassy_nrf::twim::Twim;
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_hal_bus::spi::{ExclusiveDevice, NoDelay};
use mipidsi::interface::SpiInterface;
use mipidsi::models::ST7796;
use mipidsi::Display;

use standby_watch::config::BACKLIGHT_MAX_DUTY;
use standby_watch::ui::flush::DisplayDriver;
use standby_watch::{Error, Result};

use super::touch::Ft5x06;

type PanelSpi = ExclusiveDevice<Spim<'static, SPI3>, Output<'static>, NoDelay>;

/// Concrete mipidsi driver for the panel.
pub type Panel = Display<SpiInterface<'static, PanelSpi, Output<'static>>, ST7796, Output<'static>>;

/// PWM-dimmed LED backlight.
pub struct Backlight {
    pwm: SimplePwm<'static, PWM0>,
}

impl Backlight {
    pub fn new(pwm: SimplePwm<'static, PWM0>) -> Self {
        Self { pwm }
    }

    /// Brightness in percent (clamped to 100).
    pub fn set_brightness(&mut self, pct: u8) {
        let duty = BACKLIGHT_MAX_DUTY as u32 * pct.min(100) as u32 / 100;
        // nRF PWM: duty 0 is fully lit
        self.pwm.set_duty(0, BACKLIGHT_MAX_DUTY - duty as u16);
    }
}

pub struct Screen {
    panel: Panel,
    backlight: Backlight,
    touch: Ft5x06<Twim<'static, TWISPI0>>,
    brightness: u8,
    /// Touch read failures are reported once until the next success.
    touch_fault: bool,
}

impl Screen {
    pub fn new(
        panel: Panel,
        backlight: Backlight,
        touch: Ft5x06<Twim<'static, TWISPI0>>,
        brightness: u8,
    ) -> Self {
        Self {
            panel,
            backlight,
            touch,
            brightness,
            touch_fault: false,
        }
    }
}

impl DisplayDriver for Screen {
    fn init(&mut self) -> Result<()> {
        self.panel
            .clear(Rgb565::BLACK)
            .map_err(|_| Error::Display)?;
        self.backlight.set_brightness(self.brightness);
        if let Err(e) = self.touch.init() {
            defmt::warn!("Touch controller init failed: {}", e);
        }
        Ok(())
    }

    fn push_image(&mut self, x: u16, y: u16, w: u16, h: u16, pixels: &[Rgb565]) -> Result<()> {
        if w == 0 || h == 0 {
            return Ok(());
        }
        self.panel
            .set_pixels(x, y, x + w - 1, y + h - 1, pixels.iter().copied())
            .map_err(|_| Error::Display)
    }

    fn get_touch(&mut self) -> Option<(u16, u16)> {
        match self.touch.read() {
            Ok(point) => {
                self.touch_fault = false;
                point
            }
            Err(e) => {
                if !self.touch_fault {
                    defmt::warn!("Touch read failed: {}", e);
                    self.touch_fault = true;
                }
                None
            }
        }
    }
}
