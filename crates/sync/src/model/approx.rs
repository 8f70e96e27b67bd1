use glam::DVec2;

use super::color::Color;
use super::entity::Entity;
use super::geometry::{Part, Shape, Texture};
use super::object::{PhysicalObject, Robot, Thymio2};
use super::world::{Walls, World};

/// Equality within an absolute tolerance, used to compare values that went
/// through fixed-precision encoding.
pub trait ApproxEq {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool;
}

impl ApproxEq for f64 {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        // Rounding can land a hair past the tolerance in binary.
        (self - other).abs() <= tolerance + f64::EPSILON * self.abs().max(other.abs()).max(1.0)
    }
}

impl ApproxEq for DVec2 {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.x.approx_eq(&other.x, tolerance) && self.y.approx_eq(&other.y, tolerance)
    }
}

impl ApproxEq for Color {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.components()
            .iter()
            .zip(other.components().iter())
            .all(|(a, b)| a.approx_eq(b, tolerance))
    }
}

impl<T: ApproxEq> ApproxEq for [T] {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|(a, b)| a.approx_eq(b, tolerance))
    }
}

impl<T: ApproxEq> ApproxEq for Vec<T> {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.as_slice().approx_eq(other.as_slice(), tolerance)
    }
}

impl ApproxEq for Texture {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.0.approx_eq(&other.0, tolerance)
    }
}

impl ApproxEq for Part {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.shape.approx_eq(&other.shape, tolerance)
            && self.height.approx_eq(&other.height, tolerance)
            && self.textures.approx_eq(&other.textures, tolerance)
    }
}

impl ApproxEq for Shape {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        match (self, other) {
            (
                Shape::Cylinder {
                    radius: r1,
                    height: h1,
                    mass: m1,
                },
                Shape::Cylinder {
                    radius: r2,
                    height: h2,
                    mass: m2,
                },
            ) => {
                r1.approx_eq(r2, tolerance)
                    && h1.approx_eq(h2, tolerance)
                    && m1.approx_eq(m2, tolerance)
            }
            (Shape::Hull { parts: p1, mass: m1 }, Shape::Hull { parts: p2, mass: m2 }) => {
                p1.approx_eq(p2, tolerance) && m1.approx_eq(m2, tolerance)
            }
            _ => false,
        }
    }
}

impl ApproxEq for PhysicalObject {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.id == other.id
            && self.position.approx_eq(&other.position, tolerance)
            && self.angle.approx_eq(&other.angle, tolerance)
            && self.color.approx_eq(&other.color, tolerance)
            && self.shape.approx_eq(&other.shape, tolerance)
    }
}

impl ApproxEq for Robot {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.body.approx_eq(&other.body, tolerance)
            && self.left_speed.approx_eq(&other.left_speed, tolerance)
            && self.right_speed.approx_eq(&other.right_speed, tolerance)
    }
}

impl ApproxEq for Thymio2 {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.robot.approx_eq(&other.robot, tolerance)
            && self.leds[..].approx_eq(&other.leds[..], tolerance)
    }
}

impl ApproxEq for Entity {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        match (self, other) {
            (Entity::PhysicalObject(a), Entity::PhysicalObject(b)) => a.approx_eq(b, tolerance),
            (Entity::Thymio2(a), Entity::Thymio2(b)) => a.approx_eq(b, tolerance),
            (Entity::EPuck(a), Entity::EPuck(b))
            | (Entity::Sbot(a), Entity::Sbot(b))
            | (Entity::Marxbot(a), Entity::Marxbot(b))
            | (Entity::Khepera(a), Entity::Khepera(b)) => a.approx_eq(b, tolerance),
            _ => false,
        }
    }
}

impl ApproxEq for Walls {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        match (self, other) {
            (
                Walls::Square {
                    width: w1,
                    height: h1,
                },
                Walls::Square {
                    width: w2,
                    height: h2,
                },
            ) => w1.approx_eq(w2, tolerance) && h1.approx_eq(h2, tolerance),
            (Walls::Circular { radius: r1 }, Walls::Circular { radius: r2 }) => {
                r1.approx_eq(r2, tolerance)
            }
            (Walls::None, Walls::None) => true,
            _ => false,
        }
    }
}

impl ApproxEq for World {
    fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        self.walls.approx_eq(&other.walls, tolerance)
            && self.color.approx_eq(&other.color, tolerance)
            && self.ground_texture == other.ground_texture
            && self.object_count() == other.object_count()
            && self.objects().all(|mine| {
                other
                    .get(mine.id())
                    .is_some_and(|theirs| mine.approx_eq(theirs, tolerance))
            })
    }
}
