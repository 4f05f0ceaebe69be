//! Display flushing: draw buffer bands and the panel driver interface.
//!
//! The scene never sees the whole frame at once.  A [`DrawBuffer`] holds a
//! few screen lines; each dirty band is drawn into it and handed to
//! [`flush`], which pushes the rectangle to the panel.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

use crate::config::SCREEN_HEIGHT;
use crate::error::{Error, Result};
use crate::ui::scene::Scene;

/// Panel + touch driver as used by the flush and touch callbacks.
pub trait DisplayDriver {
    fn init(&mut self) -> Result<()>;

    /// Begin a bus transaction.
    fn start_write(&mut self) {}

    fn end_write(&mut self) {}

    /// Write a `w`×`h` block of pixels with its top-left corner at (`x`, `y`).
    fn push_image(&mut self, x: u16, y: u16, w: u16, h: u16, pixels: &[Rgb565]) -> Result<()>;

    /// Raw touch coordinate, if the panel is being touched.
    fn get_touch(&mut self) -> Option<(u16, u16)>;
}

/// Inclusive screen rectangle, corner to corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Area {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl Area {
    pub const fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn is_valid(&self) -> bool {
        self.x2 >= self.x1 && self.y2 >= self.y1
    }

    pub fn width(&self) -> u16 {
        self.x2 - self.x1 + 1
    }

    pub fn height(&self) -> u16 {
        self.y2 - self.y1 + 1
    }

    pub fn pixel_count(&self) -> usize {
        self.width() as usize * self.height() as usize
    }

    pub fn rectangle(&self) -> Rectangle {
        Rectangle::new(
            Point::new(self.x1 as i32, self.y1 as i32),
            Size::new(self.width() as u32, self.height() as u32),
        )
    }
}

/// Push `pixels` (row-major, exactly covering `area`) to the panel.
pub fn flush<D: DisplayDriver>(driver: &mut D, area: Area, pixels: &[Rgb565]) -> Result<()> {
    if !area.is_valid() || pixels.len() < area.pixel_count() {
        return Err(Error::InvalidArea);
    }
    driver.start_write();
    let result = driver.push_image(
        area.x1,
        area.y1,
        area.width(),
        area.height(),
        &pixels[..area.pixel_count()],
    );
    driver.end_write();
    result
}

/// Band-sized render target.
pub struct DrawBuffer<'a> {
    pixels: &'a mut [Rgb565],
    width: u16,
    lines: u16,
    band: Area,
}

impl<'a> DrawBuffer<'a> {
    /// Wrap `storage` as a buffer for `width`-pixel lines.
    ///
    /// Fails when the storage cannot hold a single line.
    pub fn new(storage: &'a mut [Rgb565], width: u16) -> Result<Self> {
        if width == 0 || storage.len() < width as usize {
            return Err(Error::DrawBufferUnavailable);
        }
        let lines = (storage.len() / width as usize).min(u16::MAX as usize) as u16;
        Ok(Self {
            pixels: storage,
            width,
            lines,
            band: Area::new(0, 0, width - 1, 0),
        })
    }

    /// Lines per band.
    pub fn lines(&self) -> u16 {
        self.lines
    }

    /// Start drawing the band beginning at row `y`, cleared to `background`.
    ///
    /// The band is cut short at the bottom of the screen.
    pub fn begin_band(&mut self, y: u16, background: Rgb565) -> Area {
        let last = (y as u32 + self.lines as u32 - 1).min(SCREEN_HEIGHT as u32 - 1) as u16;
        self.band = Area::new(0, y, self.width - 1, last);
        let used = self.band.pixel_count();
        self.pixels[..used].fill(background);
        self.band
    }

    pub fn area(&self) -> Area {
        self.band
    }

    /// Pixels of the current band.
    pub fn pixels(&self) -> &[Rgb565] {
        &self.pixels[..self.band.pixel_count()]
    }
}

impl Dimensions for DrawBuffer<'_> {
    fn bounding_box(&self) -> Rectangle {
        self.band.rectangle()
    }
}

impl DrawTarget for DrawBuffer<'_> {
    type Color = Rgb565;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> core::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let x_max = self.band.x2 as i32;
        let (y_min, y_max) = (self.band.y1 as i32, self.band.y2 as i32);
        let width = self.width as usize;
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.x > x_max || point.y < y_min || point.y > y_max {
                continue;
            }
            let index = (point.y - y_min) as usize * width + point.x as usize;
            self.pixels[index] = color;
        }
        Ok(())
    }
}

/// Redraw whatever the scene marked dirty, band by band.
///
/// Returns the number of bands flushed.
pub fn refresh<D: DisplayDriver>(
    scene: &mut Scene,
    buffer: &mut DrawBuffer<'_>,
    driver: &mut D,
) -> Result<usize> {
    let Some((top, bottom)) = scene.take_dirty_rows() else {
        return Ok(0);
    };
    let background = scene.background();
    let mut bands = 0;
    let mut y = top - top % buffer.lines();
    while y <= bottom && y < SCREEN_HEIGHT {
        let area = buffer.begin_band(y, background);
        // Infallible
        let _ = scene.draw(buffer);
        flush(driver, area, buffer.pixels())?;
        bands += 1;
        y = area.y2 + 1;
    }
    trace!("Refreshed rows {}..={} in {} bands", top, bottom, bands);
    Ok(bands)
}
