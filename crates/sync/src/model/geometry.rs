use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::color::Color;

/// Colors painted along the sides of a part, one entry per side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Texture(pub Vec<Color>);

impl Texture {
    pub fn uniform(color: Color, sides: usize) -> Self {
        Self(vec![color; sides])
    }
}

/// An extruded polygon; a hull is an ordered list of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub shape: Vec<DVec2>,
    pub height: f64,
    pub textures: Vec<Texture>,
}

impl Part {
    pub fn new(shape: Vec<DVec2>, height: f64) -> Self {
        Self {
            shape,
            height,
            textures: Vec::new(),
        }
    }

    pub fn textured(shape: Vec<DVec2>, height: f64, textures: Vec<Texture>) -> Self {
        Self {
            shape,
            height,
            textures,
        }
    }

    /// Axis-aligned rectangle centered on `center`.
    pub fn rectangle(center: DVec2, size: DVec2, height: f64) -> Self {
        let half = size * 0.5;
        Self::new(
            vec![
                center + DVec2::new(-half.x, -half.y),
                center + DVec2::new(half.x, -half.y),
                center + DVec2::new(half.x, half.y),
                center + DVec2::new(-half.x, half.y),
            ],
            height,
        )
    }

    pub fn is_textured(&self) -> bool {
        !self.textures.is_empty()
    }

    /// Shoelace area of the polygon, positive for counter-clockwise winding.
    pub fn area(&self) -> f64 {
        let n = self.shape.len();
        if n < 3 {
            return 0.0;
        }
        let twice: f64 = (0..n)
            .map(|i| self.shape[i].perp_dot(self.shape[(i + 1) % n]))
            .sum();
        twice * 0.5
    }
}

pub type Hull = Vec<Part>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Cylinder { radius: f64, height: f64, mass: f64 },
    Hull { parts: Hull, mass: f64 },
}

impl Default for Shape {
    fn default() -> Self {
        Self::Cylinder {
            radius: 1.0,
            height: 1.0,
            mass: 1.0,
        }
    }
}

impl Shape {
    pub fn is_cylindric(&self) -> bool {
        matches!(self, Self::Cylinder { .. })
    }

    pub fn mass(&self) -> f64 {
        match self {
            Self::Cylinder { mass, .. } | Self::Hull { mass, .. } => *mass,
        }
    }

    pub fn hull(&self) -> Option<&[Part]> {
        match self {
            Self::Hull { parts, .. } => Some(parts),
            Self::Cylinder { .. } => None,
        }
    }

    /// Radius of the smallest origin-centered circle enclosing the shape.
    pub fn bounding_radius(&self) -> f64 {
        match self {
            Self::Cylinder { radius, .. } => *radius,
            Self::Hull { parts, .. } => parts
                .iter()
                .flat_map(|part| part.shape.iter())
                .map(|p| p.length())
                .fold(0.0, f64::max),
        }
    }
}
