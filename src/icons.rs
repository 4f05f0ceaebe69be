//! Icon lookup tables for notifications, weather and clock digits.
//!
//! The companion app tags every notification with a category code and
//! every forecast entry with a condition code.  These tables turn the
//! protocol codes into indices of the image tables the UI draws from.
//! Unknown codes fall back to index 0.

/// Notification source icons, in image-table order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum NotificationIcon {
    #[default]
    Sms = 0,
    Mail = 1,
    Penguin = 2,
    Skype = 3,
    WhatsApp = 4,
    Mail2 = 5,
    Line = 6,
    Twitter = 7,
    Facebook = 8,
    Messenger = 9,
    Instagram = 10,
    Weibo = 11,
    Kakao = 12,
    Viber = 13,
    Vkontakte = 14,
    Telegram = 15,
    WeChat = 16,
}

/// Number of entries in the notification image table.
pub const NOTIFICATION_ICON_COUNT: usize = 17;

/// Image table order, indexable by `notification_icon_index`.
pub const NOTIFICATION_ICONS: [NotificationIcon; NOTIFICATION_ICON_COUNT] = [
    NotificationIcon::Sms,
    NotificationIcon::Mail,
    NotificationIcon::Penguin,
    NotificationIcon::Skype,
    NotificationIcon::WhatsApp,
    NotificationIcon::Mail2,
    NotificationIcon::Line,
    NotificationIcon::Twitter,
    NotificationIcon::Facebook,
    NotificationIcon::Messenger,
    NotificationIcon::Instagram,
    NotificationIcon::Weibo,
    NotificationIcon::Kakao,
    NotificationIcon::Viber,
    NotificationIcon::Vkontakte,
    NotificationIcon::Telegram,
    NotificationIcon::WeChat,
];

/// Map a companion-protocol notification category to an icon index.
pub fn notification_icon_index(code: u8) -> usize {
    match code {
        0x03 => 0,
        0x04 => 1,
        0x07 => 2,
        0x08 => 3,
        0x0A => 4,
        0x0B => 5,
        0x0E => 6,
        0x0F => 7,
        0x10 => 8,
        0x11 => 9,
        0x12 => 10,
        0x13 => 11,
        0x14 => 12,
        0x16 => 13,
        0x17 => 14,
        0x18 => 15,
        0x09 => 16,
        _ => 0,
    }
}

impl NotificationIcon {
    /// Icon for a protocol category code.
    pub fn from_code(code: u8) -> Self {
        NOTIFICATION_ICONS[notification_icon_index(code)]
    }

    /// Short badge text drawn in place of a bitmap.
    pub fn label(self) -> &'static str {
        match self {
            NotificationIcon::Sms => "SMS",
            NotificationIcon::Mail | NotificationIcon::Mail2 => "@",
            NotificationIcon::Penguin => "QQ",
            NotificationIcon::Skype => "S",
            NotificationIcon::WhatsApp => "WA",
            NotificationIcon::Line => "LN",
            NotificationIcon::Twitter => "X",
            NotificationIcon::Facebook => "f",
            NotificationIcon::Messenger => "M",
            NotificationIcon::Instagram => "IG",
            NotificationIcon::Weibo => "WB",
            NotificationIcon::Kakao => "K",
            NotificationIcon::Viber => "V",
            NotificationIcon::Vkontakte => "VK",
            NotificationIcon::Telegram => "TG",
            NotificationIcon::WeChat => "WC",
        }
    }

    /// Badge colour as RGB888.
    pub fn tint(self) -> (u8, u8, u8) {
        match self {
            NotificationIcon::Sms => (0x34, 0xC7, 0x59),
            NotificationIcon::Mail | NotificationIcon::Mail2 => (0x1E, 0x90, 0xFF),
            NotificationIcon::Penguin => (0x12, 0xB7, 0xF5),
            NotificationIcon::Skype => (0x00, 0xAF, 0xF0),
            NotificationIcon::WhatsApp => (0x25, 0xD3, 0x66),
            NotificationIcon::Line => (0x06, 0xC7, 0x55),
            NotificationIcon::Twitter => (0x1D, 0xA1, 0xF2),
            NotificationIcon::Facebook => (0x18, 0x77, 0xF2),
            NotificationIcon::Messenger => (0x00, 0x84, 0xFF),
            NotificationIcon::Instagram => (0xE1, 0x30, 0x6C),
            NotificationIcon::Weibo => (0xE6, 0x16, 0x2D),
            NotificationIcon::Kakao => (0xFE, 0xE5, 0x00),
            NotificationIcon::Viber => (0x73, 0x60, 0xF2),
            NotificationIcon::Vkontakte => (0x45, 0x76, 0xA8),
            NotificationIcon::Telegram => (0x26, 0xA5, 0xE4),
            NotificationIcon::WeChat => (0x07, 0xC1, 0x60),
        }
    }
}

/// Weather condition icons, in image-table order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum WeatherIcon {
    #[default]
    PartialClouds = 0,
    Sunny = 1,
    Snow = 2,
    Rain = 3,
    Cloudy = 4,
    Tornado = 5,
    Windy = 6,
    Haze = 7,
}

/// Number of entries in the weather image table.
pub const WEATHER_ICON_COUNT: usize = 8;

pub const WEATHER_ICONS: [WeatherIcon; WEATHER_ICON_COUNT] = [
    WeatherIcon::PartialClouds,
    WeatherIcon::Sunny,
    WeatherIcon::Snow,
    WeatherIcon::Rain,
    WeatherIcon::Cloudy,
    WeatherIcon::Tornado,
    WeatherIcon::Windy,
    WeatherIcon::Haze,
];

/// Human-readable condition text, indexed like `WEATHER_ICONS`.
pub const WEATHER_CONDITIONS: [&str; WEATHER_ICON_COUNT] = [
    "Partial Clouds",
    "Sunny",
    "Snow",
    "Rain",
    "Cloudy",
    "Tornado",
    "Windy",
    "Haze",
];

/// Map a companion-protocol weather code to an icon index.
pub fn weather_icon_index(code: u8) -> usize {
    match code {
        0..=7 => code as usize,
        _ => 0,
    }
}

/// Condition text for a weather code.
pub fn weather_condition(code: u8) -> &'static str {
    WEATHER_CONDITIONS[weather_icon_index(code)]
}

impl WeatherIcon {
    pub fn from_code(code: u8) -> Self {
        WEATHER_ICONS[weather_icon_index(code)]
    }

    /// Short text label for fallback display.
    pub fn label(self) -> &'static str {
        WEATHER_CONDITIONS[self as usize]
    }
}

/// Large clock digit image, 0-9.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Digit(u8);

impl Digit {
    /// Digit image for `value % 10`.
    pub const fn new(value: u8) -> Self {
        Self(value % 10)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    pub fn glyph(self) -> char {
        (b'0' + self.0) as char
    }
}
