//! Board bring-up for the nRF52840 + 3.5" ST7796 touch module.
//!
//! Pin assignments follow the table in `config.rs`.  Interrupt
//! priorities are kept clear of the levels the SoftDevice reserves
//! (P0, P1 and P4).

pub mod display;
pub mod touch;

use embassy_nrf::gpio::{Level, Output, OutputDrive};
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::pwm::{self, SimplePwm};
use embassy_nrf::{bind_interrupts, peripherals, spim, twim, Peripherals};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use mipidsi::interface::SpiInterface;
use mipidsi::models::ST7796;
use mipidsi::options::{ColorInversion, ColorOrder, Orientation, Rotation};
use mipidsi::Builder;
use static_cell::StaticCell;

use standby_watch::config::{
    BACKLIGHT_DEFAULT_PCT, BACKLIGHT_MAX_DUTY, DISPLAY_INVERT, PANEL_HEIGHT, PANEL_WIDTH,
    TOUCH_I2C_ADDRESS,
};
use standby_watch::{Error, Result};

use self::display::{Backlight, Screen};
use self::touch::Ft5x06;

bind_interrupts!(struct Irqs {
    SPIM3 => spim::InterruptHandler<peripherals::SPI3>;
    TWISPI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

/// Embassy HAL configuration compatible with the SoftDevice.
pub fn embassy_config() -> embassy_nrf::config::Config {
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    config
}

#[cfg(not(feature = "portrait"))]
const ROTATION: Rotation = Rotation::Deg90;
#[cfg(feature = "portrait")]
const ROTATION: Rotation = Rotation::Deg0;

/// Bring up the panel, backlight and touch controller.
pub fn init(p: Peripherals) -> Result<Screen> {
    interrupt::SPIM3.set_priority(Priority::P3);
    interrupt::TWISPI0.set_priority(Priority::P3);

    let mut spi_config = spim::Config::default();
    spi_config.frequency = spim::Frequency::M32;
    spi_config.mode = spim::MODE_0;
    let spi = spim::Spim::new_txonly(p.SPI3, Irqs, p.P1_15, p.P1_13, spi_config);

    let cs = Output::new(p.P1_11, Level::High, OutputDrive::HighDrive);
    let dc = Output::new(p.P1_12, Level::Low, OutputDrive::HighDrive);
    let rst = Output::new(p.P1_10, Level::High, OutputDrive::Standard);

    let device = ExclusiveDevice::new_no_delay(spi, cs).map_err(|_| Error::Display)?;

    static SPI_BUFFER: StaticCell<[u8; 512]> = StaticCell::new();
    let buffer = SPI_BUFFER.init([0; 512]);
    let interface = SpiInterface::new(device, dc, buffer);

    let inversion = if DISPLAY_INVERT {
        ColorInversion::Inverted
    } else {
        ColorInversion::Normal
    };
    let panel = Builder::new(ST7796, interface)
        .display_size(PANEL_WIDTH, PANEL_HEIGHT)
        .orientation(Orientation::new().rotate(ROTATION))
        .color_order(ColorOrder::Bgr)
        .invert_colors(inversion)
        .reset_pin(rst)
        .init(&mut Delay)
        .map_err(|_| {
            defmt::error!("ST7796 init sequence failed");
            Error::Display
        })?;

    let mut pwm = SimplePwm::new_1ch(p.PWM0, p.P1_14);
    pwm.set_prescaler(pwm::Prescaler::Div128);
    pwm.set_max_duty(BACKLIGHT_MAX_DUTY);
    let mut backlight = Backlight::new(pwm);
    backlight.set_brightness(0);

    let mut i2c_config = twim::Config::default();
    i2c_config.frequency = twim::Frequency::K400;
    let i2c = twim::Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, i2c_config);
    let touch = Ft5x06::new(TOUCH_I2C_ADDRESS, i2c);

    defmt::info!("Board ready");
    Ok(Screen::new(panel, backlight, touch, BACKLIGHT_DEFAULT_PCT))
}
