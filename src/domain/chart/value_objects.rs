use serde::{Deserialize, Serialize};

/// Value Object - visible window of the host chart.
///
/// Time is epoch seconds along x, price grows upward along y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    pub start_time: f64,
    pub end_time: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            start_time: 0.0,
            end_time: 0.0,
            min_price: 0.0,
            max_price: 100.0,
            width: 800.0,
            height: 600.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height, ..Default::default() }
    }

    pub fn time_range(&self) -> f64 {
        self.end_time - self.start_time
    }

    pub fn price_range(&self) -> f64 {
        self.max_price - self.min_price
    }

    /// A viewport maps coordinates only when every extent is finite and positive.
    pub fn is_valid(&self) -> bool {
        let fields =
            [self.start_time, self.end_time, self.min_price, self.max_price, self.width, self.height];
        fields.iter().all(|v| v.is_finite())
            && self.time_range() > 0.0
            && self.price_range() > 0.0
            && self.width > 0.0
            && self.height > 0.0
    }

    /// Convert a timestamp to a screen X coordinate
    pub fn time_to_x(&self, time: f64) -> f64 {
        (time - self.start_time) * (self.width / self.time_range())
    }

    /// Convert a price to a screen Y coordinate (inverted)
    pub fn price_to_y(&self, price: f64) -> f64 {
        (self.max_price - price) * (self.height / self.price_range())
    }

    /// Convert a screen X coordinate back to time
    pub fn x_to_time(&self, x: f64) -> f64 {
        self.start_time + x * (self.time_range() / self.width)
    }

    /// Convert a screen Y coordinate back to price
    pub fn y_to_price(&self, y: f64) -> f64 {
        self.max_price - y * (self.price_range() / self.height)
    }
}

/// Value Object - domain-space anchor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Epoch seconds.
    pub time: f64,
    pub price: f64,
}

impl Point {
    pub fn new(time: f64, price: f64) -> Self {
        Self { time, price }
    }

    pub fn is_finite(&self) -> bool {
        self.time.is_finite() && self.price.is_finite()
    }

    pub fn translated(&self, dt: f64, dp: f64) -> Self {
        Self::new(self.time + dt, self.price + dp)
    }
}

/// Value Object - canvas pixel position
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PixelPos {
    pub x: f64,
    pub y: f64,
}

impl PixelPos {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: PixelPos) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Value Object - normalized pixel rectangle (left <= right, top <= bottom)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PixelRect {
    /// Build from two corners given in any order.
    pub fn from_corners(a: PixelPos, b: PixelPos) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Inclusive point-in-rectangle test.
    pub fn contains(&self, pos: PixelPos) -> bool {
        pos.x >= self.left && pos.x <= self.right && pos.y >= self.top && pos.y <= self.bottom
    }
}

/// Value Object - Color
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self::rgb(r, g, b)
    }

    pub fn to_hex(&self) -> u32 {
        let [r, g, b] = self.channels();
        ((r as u32) << 16) | ((g as u32) << 8) | b as u32
    }

    pub fn with_alpha(&self, alpha: f32) -> Self {
        Self { a: alpha, ..*self }
    }

    /// CSS color string understood by the 2D canvas.
    pub fn to_css(&self) -> String {
        let [r, g, b] = self.channels();
        format!("rgba({r}, {g}, {b}, {})", self.a)
    }

    fn channels(&self) -> [u8; 3] {
        [self.r, self.g, self.b].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    /// Accepts `#rrggbb` or `#rrggbbaa`.
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let digits = value.trim().trim_start_matches('#');
        let parsed = u32::from_str_radix(digits, 16).map_err(|_| format!("invalid color '{value}'"));
        match digits.len() {
            6 => Ok(Self::from_hex(parsed?)),
            8 => {
                let rgba = parsed?;
                Ok(Self::from_hex(rgba >> 8).with_alpha((rgba & 0xFF) as f32 / 255.0))
            }
            _ => Err(format!("invalid color '{value}'")),
        }
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        if color.a >= 1.0 {
            format!("#{:06x}", color.to_hex())
        } else {
            let alpha = (color.a.clamp(0.0, 1.0) * 255.0).round() as u32;
            format!("#{:06x}{alpha:02x}", color.to_hex())
        }
    }
}
