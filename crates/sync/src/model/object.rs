use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::color::Color;
use super::geometry::{Part, Shape};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PhysicalObject {
    pub id: u32,
    pub position: DVec2,
    pub angle: f64,
    pub color: Color,
    pub shape: Shape,
}

impl PhysicalObject {
    pub fn cylinder(radius: f64, height: f64, mass: f64) -> Self {
        Self {
            shape: Shape::Cylinder {
                radius,
                height,
                mass,
            },
            ..Default::default()
        }
    }

    pub fn with_hull(parts: Vec<Part>, mass: f64) -> Self {
        Self {
            shape: Shape::Hull { parts, mass },
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn at(mut self, position: DVec2, angle: f64) -> Self {
        self.position = position;
        self.angle = angle;
        self
    }

    pub fn heading(&self) -> DVec2 {
        DVec2::from_angle(self.angle)
    }
}

/// A differential-drive robot: a physical body plus wheel speeds.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Robot {
    pub body: PhysicalObject,
    pub left_speed: f64,
    pub right_speed: f64,
}

impl Robot {
    pub fn new(body: PhysicalObject) -> Self {
        Self {
            body,
            left_speed: 0.0,
            right_speed: 0.0,
        }
    }

    pub fn epuck() -> Self {
        Self::new(PhysicalObject::cylinder(3.7, 4.7, 152.0).with_color(Color::rgb(0.7, 0.7, 0.7)))
    }

    pub fn sbot() -> Self {
        Self::new(PhysicalObject::cylinder(6.0, 15.0, 660.0).with_color(Color::GRAY))
    }

    pub fn marxbot() -> Self {
        Self::new(PhysicalObject::cylinder(8.5, 10.0, 1000.0).with_color(Color::GRAY))
    }

    pub fn khepera() -> Self {
        Self::new(PhysicalObject::cylinder(2.6, 5.0, 80.0).with_color(Color::rgb(0.0, 0.7, 0.0)))
    }

    pub fn set_speeds(&mut self, left: f64, right: f64) {
        self.left_speed = left;
        self.right_speed = right;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thymio2 {
    pub robot: Robot,
    pub leds: [Color; Thymio2::LED_COUNT],
}

impl Default for Thymio2 {
    fn default() -> Self {
        Self::new()
    }
}

impl Thymio2 {
    pub const LED_COUNT: usize = 24;

    pub const LED_TOP: usize = 0;
    pub const LED_BOTTOM_LEFT: usize = 1;
    pub const LED_BOTTOM_RIGHT: usize = 2;
    /// First of the eight ring LEDs around the top buttons.
    pub const LED_RING: usize = 7;

    pub fn new() -> Self {
        let front = [
            DVec2::new(-5.5, -5.6),
            DVec2::new(3.0, -5.6),
            DVec2::new(5.2, -3.4),
            DVec2::new(6.0, 0.0),
            DVec2::new(5.2, 3.4),
            DVec2::new(3.0, 5.6),
            DVec2::new(-5.5, 5.6),
        ];
        let body = PhysicalObject::with_hull(vec![Part::new(front.to_vec(), 5.3)], 200.0)
            .with_color(Color::WHITE);

        Self {
            robot: Robot::new(body),
            leds: [Color::new(0.0, 0.0, 0.0, 1.0); Self::LED_COUNT],
        }
    }

    pub fn body(&self) -> &PhysicalObject {
        &self.robot.body
    }

    pub fn body_mut(&mut self) -> &mut PhysicalObject {
        &mut self.robot.body
    }

    pub fn set_led(&mut self, index: usize, color: Color) {
        if let Some(led) = self.leds.get_mut(index) {
            *led = color;
        }
    }

    pub fn led(&self, index: usize) -> Option<Color> {
        self.leds.get(index).copied()
    }
}
