//! 8-bit RGB color type
//!
//! `Rgb` is the exchange type between screen captures, decoded images and the
//! matcher. It is hashable and totally ordered so it can key maps and drive
//! sort orders.

use std::fmt;

/// A gamma-encoded sRGB color with 8 bits per channel.
///
/// Ordering is lexicographic over `(r, g, b)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rgb {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
}

impl Rgb {
    /// Create a color from channel values.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a byte array [R, G, B].
    ///
    /// # Example
    /// ```
    /// use swatch_match::Rgb;
    /// let red = Rgb::from_bytes([255, 0, 0]);
    /// assert_eq!(red.r, 255);
    /// ```
    #[inline]
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }

    /// Convert to a byte array [R, G, B].
    #[inline]
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Build a color from float channels, rounding and clamping to 0..=255.
    #[inline]
    pub fn from_f32_rounded(channels: [f32; 3]) -> Self {
        let q = |v: f32| v.round().clamp(0.0, 255.0) as u8;
        Self::new(q(channels[0]), q(channels[1]), q(channels[2]))
    }

    /// Channels as floats in 0.0..=255.0.
    #[inline]
    pub fn to_f32(self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }
}

impl From<[u8; 3]> for Rgb {
    fn from(bytes: [u8; 3]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<Rgb> for [u8; 3] {
    fn from(color: Rgb) -> Self {
        color.to_bytes()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
