//! Retained widget scene rendered with embedded-graphics.
//!
//! Widgets live in a fixed table indexed by [`WidgetId`].  Each has a
//! static layout (bounds, kind, owner) and mutable state (text, image,
//! angle, visibility, animation effects).  Changes mark the affected
//! rows dirty; `ui::flush::refresh` redraws only those rows.

use core::fmt::Write;

use embedded_graphics::mono_font::iso_8859_1::{
    FONT_10X20, FONT_6X10, FONT_7X13, FONT_8X13, FONT_9X15, FONT_9X15_BOLD,
};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Circle, Line, PrimitiveStyle, Rectangle, RoundedRectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use heapless::{String, Vec};

use super::input::PointerEvent;
use super::{Animation, Image, Screen, UiEvent, WidgetId, WidgetSurface, WIDGET_COUNT};
use crate::clock::{days_in_month, weekday, Angle};
use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use crate::icons::{Digit, WeatherIcon};
use crate::link::MESSAGE_LEN;

/// Longest text a widget stores.
pub const TEXT_LEN: usize = MESSAGE_LEN;

/// Animations that can run at the same time.
pub const MAX_ANIMATIONS: usize = 8;

/// Minimum finger travel (px) for a swipe.
pub const SWIPE_MIN: i32 = 60;

const BACKGROUND: Rgb565 = Rgb565::BLACK;
const TEXT: Rgb565 = Rgb565::WHITE;
const ACCENT: Rgb565 = Rgb565::new(0, 50, 31);
const DIM: Rgb565 = Rgb565::new(6, 12, 6);
const PANEL: Rgb565 = Rgb565::new(3, 7, 5);
const CALL_PANEL: Rgb565 = Rgb565::new(1, 4, 3);
const SECOND_HAND: Rgb565 = Rgb565::new(31, 10, 4);

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

// Layout

/// Side of the square content box placed in each half of the screen.
const BOX: i32 = 240;
const W: i32 = SCREEN_WIDTH as i32;
const H: i32 = SCREEN_HEIGHT as i32;

/// Top-left corner of the content box in screen half `n` (0 or 1).
///
/// Landscape splits left/right, portrait splits top/bottom.
const fn half(n: i32) -> Point {
    if W >= H {
        Point::new(n * W / 2 + (W / 2 - BOX) / 2, (H - BOX) / 2)
    } else {
        Point::new((W - BOX) / 2, n * H / 2 + (H / 2 - BOX) / 2)
    }
}

const fn rect(origin: Point, x: i32, y: i32, w: u32, h: u32) -> Rectangle {
    Rectangle::new(Point::new(origin.x + x, origin.y + y), Size::new(w, h))
}

const HOME_DIAL: Rectangle = rect(half(0), 48, 92, 144, 144);
const CLOCK_DIAL_SIZE: u32 = if W < H { W as u32 - 20 } else { H as u32 - 20 };
const CLOCK_DIAL: Rectangle = Rectangle::new(
    Point::new((W - CLOCK_DIAL_SIZE as i32) / 2, (H - CLOCK_DIAL_SIZE as i32) / 2),
    Size::new(CLOCK_DIAL_SIZE, CLOCK_DIAL_SIZE),
);
const ALERT_PANEL: Rectangle = Rectangle::new(
    Point::new(20, H / 2 - 80),
    Size::new(W as u32 - 40, 160),
);
const FULL_SCREEN: Rectangle = Rectangle::new(Point::zero(), Size::new(W as u32, H as u32));

#[derive(Clone, Copy)]
enum Kind {
    /// Seven-segment digit image.
    Digit,
    /// Round badge image.
    Icon,
    Hand { length: u32, width: u32, color: Rgb565 },
    Label {
        font: &'static MonoFont<'static>,
        color: Rgb565,
        align: Alignment,
        wrap: bool,
    },
    Panel { color: Rgb565 },
    /// Vertically paged container.
    Pages { count: u8 },
    Dial,
    Calendar,
    Button { label: &'static str },
    Slider,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Owner {
    Screen(Screen),
    Widget(WidgetId),
    Page { panel: WidgetId, page: u8 },
}

struct Layout {
    bounds: Rectangle,
    kind: Kind,
    owner: Owner,
    hidden: bool,
}

const fn label(font: &'static MonoFont<'static>, align: Alignment) -> Kind {
    Kind::Label {
        font,
        color: TEXT,
        align,
        wrap: false,
    }
}

fn layout(id: WidgetId) -> Layout {
    use WidgetId::*;
    let home = Owner::Screen(Screen::Home);
    let info = half(1);
    let page = |page| Owner::Page {
        panel: InfoPanel,
        page,
    };
    let hand = |length, width, color| Kind::Hand {
        length,
        width,
        color,
    };
    let clock_r = CLOCK_DIAL_SIZE / 2;
    let (bounds, kind, owner) = match id {
        Hour1 => (rect(half(0), 8, 8, 50, 76), Kind::Digit, home),
        Hour2 => (rect(half(0), 62, 8, 50, 76), Kind::Digit, home),
        Minute1 => (rect(half(0), 128, 8, 50, 76), Kind::Digit, home),
        Minute2 => (rect(half(0), 182, 8, 50, 76), Kind::Digit, home),
        HourHand => (HOME_DIAL, hand(38, 5, TEXT), home),
        MinuteHand => (HOME_DIAL, hand(56, 3, TEXT), home),
        SecondHand => (HOME_DIAL, hand(64, 1, SECOND_HAND), home),
        ClockPanel => (CLOCK_DIAL, Kind::Dial, Owner::Screen(Screen::Clock)),
        HourHand1 => (
            CLOCK_DIAL,
            hand(clock_r * 55 / 100, 7, TEXT),
            Owner::Widget(ClockPanel),
        ),
        MinuteHand1 => (
            CLOCK_DIAL,
            hand(clock_r * 80 / 100, 5, TEXT),
            Owner::Widget(ClockPanel),
        ),
        SecondHand1 => (
            CLOCK_DIAL,
            hand(clock_r * 90 / 100, 2, SECOND_HAND),
            Owner::Widget(ClockPanel),
        ),
        InfoPanel => (rect(info, 0, 0, 240, 240), Kind::Pages { count: 3 }, home),
        WeatherIcon => (rect(info, 90, 8, 60, 60), Kind::Icon, page(0)),
        WeatherTemperature => (
            rect(info, 0, 78, 240, 24),
            label(&FONT_10X20, Alignment::Center),
            page(0),
        ),
        WeatherRange => (
            rect(info, 0, 108, 240, 20),
            label(&FONT_9X15, Alignment::Center),
            page(0),
        ),
        WeatherCondition => (
            rect(info, 0, 134, 240, 20),
            label(&FONT_9X15, Alignment::Center),
            page(0),
        ),
        WeatherCity => (
            rect(info, 0, 166, 240, 20),
            label(&FONT_9X15_BOLD, Alignment::Center),
            page(0),
        ),
        Calendar => (rect(info, 10, 8, 220, 210), Kind::Calendar, page(1)),
        MusicPrevious => (
            rect(info, 10, 60, 64, 64),
            Kind::Button { label: "<<" },
            page(2),
        ),
        MusicPlay => (
            rect(info, 88, 60, 64, 64),
            Kind::Button { label: ">||" },
            page(2),
        ),
        MusicNext => (
            rect(info, 166, 60, 64, 64),
            Kind::Button { label: ">>" },
            page(2),
        ),
        VolumeSlider => (rect(info, 20, 160, 200, 24), Kind::Slider, page(2)),
        AlertPanel => (ALERT_PANEL, Kind::Panel { color: PANEL }, home),
        AlertIcon => (
            rect(ALERT_PANEL.top_left, 16, 16, 56, 56),
            Kind::Icon,
            Owner::Widget(AlertPanel),
        ),
        AlertTitle => (
            rect(ALERT_PANEL.top_left, 84, 20, ALERT_PANEL.size.width - 100, 24),
            label(&FONT_10X20, Alignment::Left),
            Owner::Widget(AlertPanel),
        ),
        AlertText => (
            rect(ALERT_PANEL.top_left, 16, 80, ALERT_PANEL.size.width - 32, 68),
            Kind::Label {
                font: &FONT_8X13,
                color: TEXT,
                align: Alignment::Left,
                wrap: true,
            },
            Owner::Widget(AlertPanel),
        ),
        CallPanel => (FULL_SCREEN, Kind::Panel { color: CALL_PANEL }, home),
        CallIcon => (
            Rectangle::with_center(Point::new(W / 2, H / 2 - 60), Size::new(80, 80)),
            Kind::Icon,
            Owner::Widget(CallPanel),
        ),
        CallText => (
            rect(Point::zero(), 0, H / 2 + 10, W as u32, 24),
            Kind::Label {
                font: &FONT_9X15,
                color: ACCENT,
                align: Alignment::Center,
                wrap: false,
            },
            Owner::Widget(CallPanel),
        ),
        CallerName => (
            rect(Point::zero(), 0, H / 2 + 50, W as u32, 24),
            label(&FONT_10X20, Alignment::Center),
            Owner::Widget(CallPanel),
        ),
    };
    Layout {
        bounds,
        kind,
        owner,
        hidden: matches!(id, AlertPanel | CallPanel),
    }
}

fn initial_text(id: WidgetId) -> &'static str {
    match id {
        WidgetId::WeatherTemperature => "--°",
        WidgetId::WeatherRange => "H:--°  L:--°",
        WidgetId::WeatherCondition => "No forecast",
        WidgetId::WeatherCity => "--",
        WidgetId::CallText => "Incoming Call",
        _ => "",
    }
}

fn initial_image(id: WidgetId) -> Option<Image> {
    match id {
        WidgetId::Hour1 | WidgetId::Hour2 | WidgetId::Minute1 | WidgetId::Minute2 => {
            Some(Image::Digit(Digit::new(0)))
        }
        WidgetId::WeatherIcon => Some(Image::Weather(WeatherIcon::default())),
        WidgetId::CallIcon => Some(Image::Call),
        _ => None,
    }
}

struct WidgetState {
    text: String<TEXT_LEN>,
    image: Option<Image>,
    angle: Angle,
    hidden: bool,
    /// Screen set through `set_parent`, for top-level widgets.
    screen: Option<Screen>,
    value: i32,
    page: u8,
    snap: bool,
    /// Animation displacement.
    offset: Point,
    /// Animation scale in percent.
    scale: u16,
}

#[derive(Clone, Copy)]
struct Running {
    id: WidgetId,
    animation: Animation,
    started_ms: u64,
    base: Angle,
}

#[derive(Clone, Copy)]
struct Press {
    start: Point,
    target: Option<WidgetId>,
    /// A modal overlay swallowed the press.
    blocked: bool,
}

pub struct Scene {
    widgets: [WidgetState; WIDGET_COUNT],
    animations: Vec<Running, MAX_ANIMATIONS>,
    active: Screen,
    now_ms: u64,
    dirty: Option<Rectangle>,
    press: Option<Press>,
    calendar_today: (u16, u8, u8),
    calendar_shown: (u16, u8),
}

impl Scene {
    pub fn new() -> Self {
        let widgets = core::array::from_fn(|i| {
            let id = WidgetId::ALL[i];
            WidgetState {
                text: crate::link::truncated(initial_text(id)),
                image: initial_image(id),
                angle: Angle(0),
                hidden: layout(id).hidden,
                screen: None,
                value: 50,
                page: 0,
                snap: false,
                offset: Point::zero(),
                scale: 100,
            }
        });
        Self {
            widgets,
            animations: Vec::new(),
            active: Screen::Home,
            now_ms: 0,
            dirty: Some(FULL_SCREEN),
            press: None,
            calendar_today: (1970, 1, 1),
            calendar_shown: (1970, 1),
        }
    }

    pub fn background(&self) -> Rgb565 {
        BACKGROUND
    }

    pub fn active_screen(&self) -> Screen {
        self.active
    }

    /// Switch screens; the caller handles the resulting `ScreenLoaded`.
    pub fn load_screen(&mut self, screen: Screen) -> UiEvent {
        if self.active != screen {
            self.active = screen;
            self.invalidate_rect(FULL_SCREEN);
            debug!("Screen loaded: {}", screen);
        }
        UiEvent::ScreenLoaded(screen)
    }

    // Inspection

    pub fn text(&self, id: WidgetId) -> &str {
        self.widgets[id.index()].text.as_str()
    }

    pub fn image(&self, id: WidgetId) -> Option<Image> {
        self.widgets[id.index()].image
    }

    pub fn angle(&self, id: WidgetId) -> Angle {
        self.widgets[id.index()].angle
    }

    pub fn is_hidden(&self, id: WidgetId) -> bool {
        self.widgets[id.index()].hidden
    }

    /// Screen a widget currently belongs to.
    pub fn screen_of(&self, id: WidgetId) -> Screen {
        match layout(id).owner {
            Owner::Screen(screen) => self.widgets[id.index()].screen.unwrap_or(screen),
            Owner::Widget(parent) | Owner::Page { panel: parent, .. } => self.screen_of(parent),
        }
    }

    /// Whether the widget would be drawn on the active screen.
    pub fn is_visible(&self, id: WidgetId) -> bool {
        if self.widgets[id.index()].hidden {
            return false;
        }
        match layout(id).owner {
            Owner::Screen(_) => self.screen_of(id) == self.active,
            Owner::Widget(parent) => self.is_visible(parent),
            Owner::Page { panel, page } => {
                self.is_visible(panel) && self.widgets[panel.index()].page == page
            }
        }
    }

    pub fn is_animating(&self, id: WidgetId, animation: Animation) -> bool {
        self.animations
            .iter()
            .any(|r| r.id == id && r.animation == animation)
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    pub fn page(&self, id: WidgetId) -> u8 {
        self.widgets[id.index()].page
    }

    pub fn scroll_snap(&self, id: WidgetId) -> bool {
        self.widgets[id.index()].snap
    }

    pub fn calendar_today(&self) -> (u16, u8, u8) {
        self.calendar_today
    }

    pub fn calendar_shown(&self) -> (u16, u8) {
        self.calendar_shown
    }

    pub fn bounds(&self, id: WidgetId) -> Rectangle {
        layout(id).bounds
    }

    pub fn set_slider_value(&mut self, id: WidgetId, value: i32) -> bool {
        let value = value.clamp(0, 100);
        let state = &mut self.widgets[id.index()];
        if state.value == value {
            return false;
        }
        state.value = value;
        self.invalidate(id);
        true
    }

    // Dirty tracking

    fn invalidate(&mut self, id: WidgetId) {
        self.invalidate_rect(extent(id));
    }

    fn invalidate_rect(&mut self, rect: Rectangle) {
        let rect = rect.intersection(&FULL_SCREEN);
        if rect.is_zero_sized() {
            return;
        }
        self.dirty = Some(match self.dirty {
            Some(dirty) => union(&dirty, &rect),
            None => rect,
        });
    }

    /// Take the dirty row span (inclusive), clearing it.
    pub fn take_dirty_rows(&mut self) -> Option<(u16, u16)> {
        let dirty = self.dirty.take()?;
        let bottom = dirty.bottom_right()?;
        Some((dirty.top_left.y as u16, bottom.y as u16))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    // Input

    /// Feed a pointer edge; returns the UI event it triggers, if any.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<UiEvent> {
        match event {
            PointerEvent::Pressed(p) => {
                let blocked = self.is_visible(WidgetId::CallPanel);
                let target = if blocked { None } else { self.interactive_at(p) };
                self.press = Some(Press {
                    start: p,
                    target,
                    blocked,
                });
                self.drag_slider(target, p)
            }
            PointerEvent::Moved(p) => {
                let target = self.press.and_then(|press| press.target);
                self.drag_slider(target, p)
            }
            PointerEvent::Released(p) => {
                let press = self.press.take()?;
                if press.blocked {
                    return None;
                }
                match press.target {
                    Some(id) if self.bounds(id).contains(p) => button_event(id),
                    Some(_) => None,
                    None => self.swipe(press.start, p),
                }
            }
        }
    }

    fn interactive_at(&self, p: Point) -> Option<WidgetId> {
        WidgetId::ALL.iter().rev().copied().find(|&id| {
            matches!(layout(id).kind, Kind::Button { .. } | Kind::Slider)
                && self.is_visible(id)
                && self.bounds(id).contains(p)
        })
    }

    fn drag_slider(&mut self, target: Option<WidgetId>, p: Point) -> Option<UiEvent> {
        let id = target?;
        if !matches!(layout(id).kind, Kind::Slider) {
            return None;
        }
        let bounds = self.bounds(id);
        let span = bounds.size.width.max(1) as i32;
        let value = (p.x - bounds.top_left.x) * 100 / span;
        self.set_slider_value(id, value)
            .then_some(UiEvent::VolumeChanged)
    }

    fn swipe(&mut self, start: Point, end: Point) -> Option<UiEvent> {
        let (dx, dy) = (end.x - start.x, end.y - start.y);
        if dx.abs() >= SWIPE_MIN && dx.abs() > dy.abs() {
            return Some(self.load_screen(self.active.other()));
        }
        if dy.abs() >= SWIPE_MIN && self.is_visible(WidgetId::InfoPanel) {
            let panel = self.bounds(WidgetId::InfoPanel);
            if panel.contains(start) {
                self.scroll_pages(WidgetId::InfoPanel, dy, panel.size.height as i32);
            }
        }
        None
    }

    /// Scroll a paged panel after a vertical swipe of `dy` pixels.
    ///
    /// With snapping any swipe settles on the neighbouring page; without
    /// it the panel only moves for swipes at least one page tall.
    fn scroll_pages(&mut self, id: WidgetId, dy: i32, page_height: i32) {
        let Kind::Pages { count } = layout(id).kind else {
            return;
        };
        let state = &self.widgets[id.index()];
        let steps = if state.snap {
            dy.signum()
        } else {
            dy / page_height.max(1)
        };
        let page = (state.page as i32 - steps).clamp(0, count as i32 - 1) as u8;
        if page != state.page {
            self.widgets[id.index()].page = page;
            self.invalidate(id);
            trace!("Info panel page {}", page);
        }
    }

    // Drawing

    /// Draw everything that intersects the target's bounding box.
    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let clip = target.bounding_box();
        if self.active == Screen::Home && overlaps(&HOME_DIAL, &clip) {
            draw_dial(target, HOME_DIAL, DIM)?;
        }
        if self.active == Screen::Home && overlaps(&layout(WidgetId::Hour1).bounds, &clip) {
            draw_colon(target)?;
        }
        for id in WidgetId::ALL {
            if self.is_visible(id) && overlaps(&extent(id), &clip) {
                self.draw_widget(target, id)?;
            }
        }
        Ok(())
    }

    fn draw_widget<D>(&self, target: &mut D, id: WidgetId) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let Layout { bounds, kind, .. } = layout(id);
        let state = &self.widgets[id.index()];
        let bounds = bounds.translate(state.offset);
        match kind {
            Kind::Digit => {
                if let Some(Image::Digit(digit)) = state.image {
                    draw_digit(target, bounds, digit)?;
                }
            }
            Kind::Icon => {
                if let Some(image) = state.image {
                    draw_icon(target, bounds, image, state.scale)?;
                }
            }
            Kind::Hand {
                length,
                width,
                color,
            } => draw_hand(target, bounds.center(), state.angle, length, width, color)?,
            Kind::Label {
                font,
                color,
                align,
                wrap,
            } => {
                let mut clipped = target.clipped(&extent(id));
                if wrap {
                    draw_wrapped(&mut clipped, bounds, state.text.as_str(), font, color)?;
                } else {
                    draw_label(&mut clipped, bounds, state.text.as_str(), font, color, align)?;
                }
            }
            Kind::Panel { color } => {
                RoundedRectangle::with_equal_corners(bounds, Size::new(12, 12))
                    .into_styled(PrimitiveStyle::with_fill(color))
                    .draw(target)?;
            }
            Kind::Pages { count } => draw_page_dots(target, bounds, count, state.page)?,
            Kind::Dial => draw_dial(target, bounds, TEXT)?,
            Kind::Calendar => self.draw_calendar(target, bounds)?,
            Kind::Button { label } => {
                let pressed = self.press.and_then(|p| p.target) == Some(id);
                let fill = if pressed { ACCENT } else { PANEL };
                RoundedRectangle::with_equal_corners(bounds, Size::new(10, 10))
                    .into_styled(PrimitiveStyle::with_fill(fill))
                    .draw(target)?;
                draw_label(target, bounds, label, &FONT_10X20, TEXT, Alignment::Center)?;
            }
            Kind::Slider => draw_slider(target, bounds, state.value)?,
        }
        Ok(())
    }

    fn draw_calendar<D>(&self, target: &mut D, bounds: Rectangle) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let (year, month) = self.calendar_shown;
        let month0 = month.clamp(1, 12) - 1;

        let mut title: String<24> = String::new();
        let _ = write!(title, "{} {}", MONTH_NAMES[month0 as usize], year);
        let header = Rectangle::new(bounds.top_left, Size::new(bounds.size.width, 20));
        draw_label(target, header, title.as_str(), &FONT_9X15_BOLD, TEXT, Alignment::Center)?;

        let cell_w = bounds.size.width as i32 / 7;
        let names = Rectangle::new(
            bounds.top_left + Point::new(0, 22),
            Size::new(bounds.size.width, 14),
        );
        for (col, name) in ["S", "M", "T", "W", "T", "F", "S"].iter().enumerate() {
            let cell = Rectangle::new(
                names.top_left + Point::new(col as i32 * cell_w, 0),
                Size::new(cell_w as u32, 14),
            );
            draw_label(target, cell, name, &FONT_6X10, DIM, Alignment::Center)?;
        }

        let grid_top = bounds.top_left.y + 40;
        let first = weekday(year, month0, 1) as i32;
        let (today_y, today_m, today_d) = self.calendar_today;
        let mut number: String<2> = String::new();
        for day in 1..=days_in_month(year, month0) {
            let slot = first + day as i32 - 1;
            let cell = Rectangle::new(
                Point::new(bounds.top_left.x + (slot % 7) * cell_w, grid_top + (slot / 7) * 28),
                Size::new(cell_w as u32, 28),
            );
            let is_today = (today_y, today_m, today_d) == (year, month, day);
            if is_today {
                Circle::with_center(cell.center(), 24)
                    .into_styled(PrimitiveStyle::with_fill(ACCENT))
                    .draw(target)?;
            }
            number.clear();
            let _ = write!(number, "{}", day);
            draw_label(target, cell, number.as_str(), &FONT_7X13, TEXT, Alignment::Center)?;
        }
        Ok(())
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetSurface for Scene {
    fn set_text(&mut self, id: WidgetId, text: &str) {
        let state = &mut self.widgets[id.index()];
        if state.text.as_str() != text {
            state.text = crate::link::truncated(text);
            self.invalidate(id);
        }
    }

    fn set_image(&mut self, id: WidgetId, image: Image) {
        let state = &mut self.widgets[id.index()];
        if state.image != Some(image) {
            state.image = Some(image);
            self.invalidate(id);
        }
    }

    fn set_angle(&mut self, id: WidgetId, angle: Angle) {
        let state = &mut self.widgets[id.index()];
        if state.angle != angle {
            state.angle = angle;
            self.invalidate(id);
        }
    }

    fn set_hidden(&mut self, id: WidgetId, hidden: bool) {
        let state = &mut self.widgets[id.index()];
        if state.hidden != hidden {
            state.hidden = hidden;
            self.invalidate(id);
        }
    }

    fn set_parent(&mut self, id: WidgetId, screen: Screen) {
        if !matches!(layout(id).owner, Owner::Screen(_)) {
            warn!("Only top-level widgets can change screens");
            return;
        }
        if self.screen_of(id) != screen {
            self.widgets[id.index()].screen = Some(screen);
            self.invalidate(id);
        }
    }

    fn set_scroll_snap(&mut self, id: WidgetId, snap: bool) {
        self.widgets[id.index()].snap = snap;
    }

    fn start_animation(&mut self, id: WidgetId, animation: Animation) {
        self.animations
            .retain(|r| !(r.id == id && r.animation == animation));
        let running = Running {
            id,
            animation,
            started_ms: self.now_ms,
            base: self.widgets[id.index()].angle,
        };
        if self.animations.push(running).is_err() {
            warn!("Animation table full - {} not started", animation);
        }
    }

    fn stop_animations(&mut self, id: WidgetId) {
        self.animations.retain(|r| r.id != id);
        let state = &mut self.widgets[id.index()];
        if state.offset != Point::zero() || state.scale != 100 {
            state.offset = Point::zero();
            state.scale = 100;
            self.invalidate(id);
        }
    }

    fn stop_all_animations(&mut self) {
        let ids: Vec<WidgetId, MAX_ANIMATIONS> = self.animations.iter().map(|r| r.id).collect();
        for id in ids {
            self.stop_animations(id);
        }
    }

    fn set_calendar_today(&mut self, year: u16, month: u8, day: u8) {
        if self.calendar_today != (year, month, day) {
            self.calendar_today = (year, month, day);
            self.invalidate(WidgetId::Calendar);
        }
    }

    fn set_calendar_shown(&mut self, year: u16, month: u8) {
        if self.calendar_shown != (year, month) {
            self.calendar_shown = (year, month);
            self.invalidate(WidgetId::Calendar);
        }
    }

    fn slider_value(&self, id: WidgetId) -> i32 {
        self.widgets[id.index()].value
    }

    fn advance(&mut self, now_ms: u64) {
        self.now_ms = now_ms;
        for i in 0..self.animations.len() {
            let running = self.animations[i];
            let elapsed = now_ms.saturating_sub(running.started_ms);
            let state = &mut self.widgets[running.id.index()];
            let changed = match running.animation {
                Animation::ClockWise => {
                    let turned = (elapsed * Angle::FULL_TURN as u64 / 60_000) as u32;
                    let angle =
                        Angle(((running.base.normalized() as u32 + turned) % 3600) as u16);
                    core::mem::replace(&mut state.angle, angle) != angle
                }
                Animation::PulseCall => {
                    let scale = 100 + (triangle(elapsed, 1_000) * 25 / 1_000) as u16;
                    core::mem::replace(&mut state.scale, scale) != scale
                }
                Animation::TextUpDown => {
                    let y = triangle(elapsed, 1_000) as i32 * 12 / 1_000 - 6;
                    let offset = Point::new(0, y);
                    core::mem::replace(&mut state.offset, offset) != offset
                }
                Animation::TextSide => {
                    let x = triangle(elapsed, 3_000) as i32 * 40 / 1_000 - 20;
                    let offset = Point::new(x, 0);
                    core::mem::replace(&mut state.offset, offset) != offset
                }
            };
            if changed {
                self.invalidate(running.id);
            }
        }
    }
}

fn button_event(id: WidgetId) -> Option<UiEvent> {
    match id {
        WidgetId::MusicPrevious => Some(UiEvent::MusicPrevious),
        WidgetId::MusicPlay => Some(UiEvent::MusicToggle),
        WidgetId::MusicNext => Some(UiEvent::MusicNext),
        _ => None,
    }
}

/// 0..=1000 and back over `period_ms`.
fn triangle(elapsed_ms: u64, period_ms: u64) -> u64 {
    let phase = elapsed_ms % period_ms;
    let half = period_ms / 2;
    if phase < half {
        phase * 1_000 / half
    } else {
        (period_ms - phase) * 1_000 / half
    }
}

/// Area a widget may paint, including animation travel.
fn extent(id: WidgetId) -> Rectangle {
    let Layout { bounds, kind, .. } = layout(id);
    match kind {
        Kind::Label { .. } => Rectangle::new(
            bounds.top_left - Point::new(24, 8),
            bounds.size + Size::new(48, 16),
        ),
        Kind::Icon => bounds.offset(bounds.size.width as i32 / 8 + 1),
        _ => bounds,
    }
}

fn overlaps(a: &Rectangle, b: &Rectangle) -> bool {
    !a.intersection(b).is_zero_sized()
}

fn union(a: &Rectangle, b: &Rectangle) -> Rectangle {
    let (Some(a_br), Some(b_br)) = (a.bottom_right(), b.bottom_right()) else {
        return if a.is_zero_sized() { *b } else { *a };
    };
    let top_left = Point::new(a.top_left.x.min(b.top_left.x), a.top_left.y.min(b.top_left.y));
    let bottom_right = Point::new(a_br.x.max(b_br.x), a_br.y.max(b_br.y));
    Rectangle::with_corners(top_left, bottom_right)
}

fn rgb(tint: (u8, u8, u8)) -> Rgb565 {
    Rgb565::new(tint.0 >> 3, tint.1 >> 2, tint.2 >> 3)
}

fn draw_label<D>(
    target: &mut D,
    bounds: Rectangle,
    text: &str,
    font: &'static MonoFont<'static>,
    color: Rgb565,
    align: Alignment,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    if text.is_empty() {
        return Ok(());
    }
    let y = bounds.center().y;
    let x = match align {
        Alignment::Left => bounds.top_left.x,
        Alignment::Center => bounds.center().x,
        Alignment::Right => bounds.top_left.x + bounds.size.width as i32 - 1,
    };
    let style = TextStyleBuilder::new()
        .alignment(align)
        .baseline(Baseline::Middle)
        .build();
    Text::with_text_style(text, Point::new(x, y), MonoTextStyle::new(font, color), style)
        .draw(target)?;
    Ok(())
}

/// Left-aligned text broken into lines at spaces where possible.
fn draw_wrapped<D>(
    target: &mut D,
    bounds: Rectangle,
    text: &str,
    font: &'static MonoFont<'static>,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let per_line = (bounds.size.width / font.character_size.width).max(1) as usize;
    let line_h = font.character_size.height as i32 + 2;
    let style = MonoTextStyle::new(font, color);
    let mut rest = text.trim_start();
    let mut y = bounds.top_left.y;
    while !rest.is_empty() && y + line_h <= bounds.top_left.y + bounds.size.height as i32 {
        let (line, next) = split_line(rest, per_line);
        Text::with_baseline(line, Point::new(bounds.top_left.x, y), style, Baseline::Top)
            .draw(target)?;
        rest = next.trim_start();
        y += line_h;
    }
    Ok(())
}

/// Split off at most `max_chars` characters, preferring the last space.
fn split_line(text: &str, max_chars: usize) -> (&str, &str) {
    let cut = match text.char_indices().nth(max_chars) {
        Some((index, _)) => index,
        None => return (text, ""),
    };
    match text[..cut].rfind(' ') {
        Some(space) if space > 0 => (&text[..space], &text[space..]),
        _ => (&text[..cut], &text[cut..]),
    }
}

/// Segment bits a..g (bit 0 = top, clockwise, bit 6 = middle).
const SEGMENTS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];

fn draw_digit<D>(target: &mut D, bounds: Rectangle, digit: Digit) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let Size { width, height } = bounds.size;
    let (w, h) = (width as i32, height as i32);
    let t = (w / 6).max(2);
    let half = h / 2;
    let o = bounds.top_left;
    let horizontal =
        |y: i32| Rectangle::new(o + Point::new(t, y), Size::new((w - 2 * t) as u32, t as u32));
    let vertical = |x: i32, y: i32| {
        Rectangle::new(o + Point::new(x, y), Size::new(t as u32, (half - t) as u32))
    };
    let segments = [
        horizontal(0),
        vertical(w - t, t / 2),
        vertical(w - t, half + t / 2),
        horizontal(h - t),
        vertical(0, half + t / 2),
        vertical(0, t / 2),
        horizontal(half - t / 2),
    ];
    let bits = SEGMENTS[digit.value() as usize];
    for (i, segment) in segments.into_iter().enumerate() {
        let color = if bits & (1 << i) != 0 { ACCENT } else { PANEL };
        segment
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(target)?;
    }
    Ok(())
}

fn draw_colon<D>(target: &mut D) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let digit = layout(WidgetId::Hour2).bounds;
    let x = digit.top_left.x + digit.size.width as i32 + 4;
    let mid = digit.center().y;
    for y in [mid - 16, mid + 10] {
        Rectangle::new(Point::new(x, y), Size::new(6, 6))
            .into_styled(PrimitiveStyle::with_fill(ACCENT))
            .draw(target)?;
    }
    Ok(())
}

fn draw_icon<D>(target: &mut D, bounds: Rectangle, image: Image, scale: u16) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let diameter = bounds.size.width.min(bounds.size.height) * scale as u32 / 100;
    let center = bounds.center();
    let (fill, text) = match image {
        Image::Notification(icon) => (rgb(icon.tint()), icon.label()),
        Image::Weather(icon) => weather_badge(icon),
        Image::Call => (Rgb565::new(4, 52, 10), "CALL"),
        Image::Digit(digit) => return draw_digit(target, bounds, digit),
    };
    Circle::with_center(center, diameter)
        .into_styled(PrimitiveStyle::with_fill(fill))
        .draw(target)?;
    let badge = Rectangle::with_center(center, Size::new(diameter, diameter));
    draw_label(target, badge, text, &FONT_9X15_BOLD, TEXT, Alignment::Center)
}

fn weather_badge(icon: WeatherIcon) -> (Rgb565, &'static str) {
    match icon {
        WeatherIcon::PartialClouds => (Rgb565::new(20, 40, 24), "P.CL"),
        WeatherIcon::Sunny => (Rgb565::new(31, 50, 0), "SUN"),
        WeatherIcon::Snow => (Rgb565::new(26, 54, 31), "SNW"),
        WeatherIcon::Rain => (Rgb565::new(4, 24, 28), "RN"),
        WeatherIcon::Cloudy => (Rgb565::new(14, 28, 16), "CLD"),
        WeatherIcon::Tornado => (Rgb565::new(12, 20, 12), "TRN"),
        WeatherIcon::Windy => (Rgb565::new(10, 40, 26), "WND"),
        WeatherIcon::Haze => (Rgb565::new(18, 36, 18), "HZ"),
    }
}

fn draw_hand<D>(
    target: &mut D,
    center: Point,
    angle: Angle,
    length: u32,
    width: u32,
    color: Rgb565,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let (sin, cos) = (libm::sinf(angle.radians()), libm::cosf(angle.radians()));
    let at = |r: f32| {
        Point::new(
            center.x + libm::roundf(r * sin) as i32,
            center.y - libm::roundf(r * cos) as i32,
        )
    };
    let tail = -(length as f32) * 0.15;
    Line::new(at(tail), at(length as f32))
        .into_styled(PrimitiveStyle::with_stroke(color, width))
        .draw(target)?;
    Circle::with_center(center, width + 6)
        .into_styled(PrimitiveStyle::with_fill(color))
        .draw(target)
}

fn draw_dial<D>(target: &mut D, bounds: Rectangle, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let center = bounds.center();
    let radius = bounds.size.width.min(bounds.size.height) as f32 / 2.0;
    Circle::with_center(center, bounds.size.width.min(bounds.size.height))
        .into_styled(PrimitiveStyle::with_stroke(DIM, 2))
        .draw(target)?;
    for hour in 0..12u16 {
        let a = Angle(hour * 300).radians();
        let (sin, cos) = (libm::sinf(a), libm::cosf(a));
        let inner = if hour % 3 == 0 { 0.80 } else { 0.88 };
        let at = |r: f32| {
            Point::new(
                center.x + libm::roundf(r * sin) as i32,
                center.y - libm::roundf(r * cos) as i32,
            )
        };
        Line::new(at(radius * inner), at(radius * 0.96))
            .into_styled(PrimitiveStyle::with_stroke(color, 2))
            .draw(target)?;
    }
    Ok(())
}

fn draw_page_dots<D>(target: &mut D, bounds: Rectangle, count: u8, page: u8) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let x = bounds.top_left.x + bounds.size.width as i32 - 8;
    let top = bounds.center().y - (count as i32 - 1) * 7;
    for i in 0..count {
        let color = if i == page { TEXT } else { DIM };
        Circle::with_center(Point::new(x, top + i as i32 * 14), 6)
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(target)?;
    }
    Ok(())
}

fn draw_slider<D>(target: &mut D, bounds: Rectangle, value: i32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let y = bounds.center().y;
    let left = bounds.top_left.x;
    let right = left + bounds.size.width as i32 - 1;
    let knob_x = left + (bounds.size.width as i32 - 1) * value.clamp(0, 100) / 100;
    Line::new(Point::new(left, y), Point::new(right, y))
        .into_styled(PrimitiveStyle::with_stroke(DIM, 6))
        .draw(target)?;
    Line::new(Point::new(left, y), Point::new(knob_x, y))
        .into_styled(PrimitiveStyle::with_stroke(ACCENT, 6))
        .draw(target)?;
    Circle::with_center(Point::new(knob_x, y), bounds.size.height)
        .into_styled(PrimitiveStyle::with_fill(TEXT))
        .draw(target)
}
