//! Packed geometry and drawing attribute types
//!
//! The OSD stores coordinates as 12-bit fields packed in pairs into three
//! bytes:
//!
//! ```text
//!  byte 0          byte 1                  byte 2
//! ┌──────────────┬───────────┬───────────┬──────────────┐
//! │ x[7:0]       │ y[3:0]    │ x[11:8]   │ y[11:4]      │
//! └──────────────┴───────────┴───────────┴──────────────┘
//!                  high nibble  low nibble
//! ```
//!
//! Values wider than 12 bits are truncated, matching the device's
//! bit-field semantics.

/// Largest value a 12-bit coordinate can hold
pub const COORD_MAX: u16 = 0x0FFF;

/// Packed size of a coordinate pair
pub const PAIR_LEN: usize = 3;

/// Pack two 12-bit values, `low` in the low bits
pub const fn pack_pair(low: u16, high: u16) -> [u8; PAIR_LEN] {
    let low = low & COORD_MAX;
    let high = high & COORD_MAX;
    [
        low as u8,
        ((low >> 8) as u8 & 0x0F) | ((high as u8 & 0x0F) << 4),
        (high >> 4) as u8,
    ]
}

/// Inverse of [`pack_pair`]
pub const fn unpack_pair(bytes: [u8; PAIR_LEN]) -> (u16, u16) {
    let low = bytes[0] as u16 | ((bytes[1] as u16 & 0x0F) << 8);
    let high = (bytes[1] as u16 >> 4) | ((bytes[2] as u16) << 4);
    (low, high)
}

/// A pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Wire representation
    pub const fn pack(&self) -> [u8; PAIR_LEN] {
        pack_pair(self.x, self.y)
    }

    pub const fn unpack(bytes: [u8; PAIR_LEN]) -> Self {
        let (x, y) = unpack_pair(bytes);
        Self { x, y }
    }
}

/// A width/height pair in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Size {
    pub width: u16,
    pub height: u16,
}

impl Size {
    pub const fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }

    /// Wire representation
    pub const fn pack(&self) -> [u8; PAIR_LEN] {
        pack_pair(self.width, self.height)
    }

    pub const fn unpack(bytes: [u8; PAIR_LEN]) -> Self {
        let (width, height) = unpack_pair(bytes);
        Self { width, height }
    }
}

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Wire representation: origin then size
    pub const fn pack(&self) -> [u8; 2 * PAIR_LEN] {
        let o = self.origin.pack();
        let s = self.size.pack();
        [o[0], o[1], o[2], s[0], s[1], s[2]]
    }
}

/// Three vertices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Triangle {
    pub p1: Point,
    pub p2: Point,
    pub p3: Point,
}

impl Triangle {
    pub const fn new(p1: Point, p2: Point, p3: Point) -> Self {
        Self { p1, p2, p3 }
    }

    /// Wire representation: vertices in order
    pub const fn pack(&self) -> [u8; 3 * PAIR_LEN] {
        let a = self.p1.pack();
        let b = self.p2.pack();
        let c = self.p3.pack();
        [a[0], a[1], a[2], b[0], b[1], b[2], c[0], c[1], c[2]]
    }
}

/// Pixel colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Color {
    #[default]
    Black = 0,
    Transparent = 1,
    White = 2,
    Grey = 3,
}

impl Color {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Color::Black),
            1 => Some(Color::Transparent),
            2 => Some(Color::White),
            3 => Some(Color::Grey),
            _ => None,
        }
    }
}

/// Which sides of a stroked line get an outline
///
/// Combine sides with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Outline(u8);

impl Outline {
    pub const NONE: Outline = Outline(0);
    pub const TOP: Outline = Outline(1 << 0);
    pub const RIGHT: Outline = Outline(1 << 1);
    pub const BOTTOM: Outline = Outline(1 << 2);
    pub const LEFT: Outline = Outline(1 << 3);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Outline) -> bool {
        self.0 & other.0 == other.0
    }
}

impl core::ops::BitOr for Outline {
    type Output = Outline;

    fn bitor(self, rhs: Outline) -> Outline {
        Outline(self.0 | rhs.0)
    }
}

/// Opaque bitmap/character drawing options, passed through verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BitmapOptions(pub u8);

/// Video standard reported by the OSD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TvStandard {
    Ntsc = 1,
    Pal = 2,
}

impl TvStandard {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(TvStandard::Ntsc),
            2 => Some(TvStandard::Pal),
            _ => None,
        }
    }
}
