use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const GRAY: Self = Self::rgb(0.5, 0.5, 0.5);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Components clamped to `[0, 1]`.
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    pub fn components(&self) -> [f64; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Packs the color as `0xAARRGGBB`, the layout of ground texture pixels.
    pub fn to_packed(self) -> u32 {
        let c = self.clamped();
        let channel = |v: f64| (v * 255.0).round() as u32;
        (channel(c.a) << 24) | (channel(c.r) << 16) | (channel(c.g) << 8) | channel(c.b)
    }

    pub fn from_packed(pixel: u32) -> Self {
        let channel = |shift: u32| ((pixel >> shift) & 0xFF) as f64 / 255.0;
        Self::new(channel(16), channel(8), channel(0), channel(24))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_roundtrip() {
        let color = Color::new(0.2, 0.4, 0.6, 1.0);
        let unpacked = Color::from_packed(color.to_packed());

        for (a, b) in color.components().iter().zip(unpacked.components()) {
            assert!((a - b).abs() < 1.0 / 255.0);
        }
    }

    #[test]
    fn packed_layout() {
        assert_eq!(Color::RED.to_packed(), 0xFFFF0000);
        assert_eq!(Color::new(0.0, 0.0, 1.0, 0.0).to_packed(), 0x000000FF);
    }
}
