mod approx;
mod color;
mod entity;
mod geometry;
mod object;
mod world;

pub use approx::ApproxEq;
pub use color::Color;
pub use entity::{Entity, EntityType};
pub use geometry::{Hull, Part, Shape, Texture};
pub use object::{PhysicalObject, Robot, Thymio2};
pub use world::{GroundTexture, GroundTextureError, Walls, World};
