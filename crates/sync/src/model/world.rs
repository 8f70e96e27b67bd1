use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::color::Color;
use super::entity::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Walls {
    Square { width: f64, height: f64 },
    Circular { radius: f64 },
    None,
}

impl Walls {
    pub const SQUARE_TAG: u8 = 0;
    pub const CIRCULAR_TAG: u8 = 1;
    pub const NONE_TAG: u8 = 2;

    pub fn tag(&self) -> u8 {
        match self {
            Self::Square { .. } => Self::SQUARE_TAG,
            Self::Circular { .. } => Self::CIRCULAR_TAG,
            Self::None => Self::NONE_TAG,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("ground texture is {width}x{height} but carries {len} pixels")]
pub struct GroundTextureError {
    pub width: u32,
    pub height: u32,
    pub len: usize,
}

/// Packed `0xAARRGGBB` pixels, row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTexture {
    width: u32,
    height: u32,
    data: Vec<u32>,
}

impl GroundTexture {
    pub fn new(width: u32, height: u32, data: Vec<u32>) -> Result<Self, GroundTextureError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(GroundTextureError {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            data: vec![color.to_packed(); width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u32] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y as usize * self.width as usize + x as usize).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct World {
    pub walls: Walls,
    pub color: Color,
    pub ground_texture: GroundTexture,
    objects: BTreeMap<u32, Entity>,
    /// One past the highest id ever held; reaches `u32::MAX + 1` once the
    /// top id is taken.
    next_object_id: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new(Walls::None, Color::GRAY, GroundTexture::default())
    }
}

impl World {
    pub fn new(walls: Walls, color: Color, ground_texture: GroundTexture) -> Self {
        Self {
            walls,
            color,
            ground_texture,
            objects: BTreeMap::new(),
            next_object_id: 0,
        }
    }

    pub fn square(width: f64, height: f64, color: Color) -> Self {
        Self::new(Walls::Square { width, height }, color, GroundTexture::default())
    }

    pub fn circular(radius: f64, color: Color) -> Self {
        Self::new(Walls::Circular { radius }, color, GroundTexture::default())
    }

    /// Adds `entity` under a freshly allocated id and returns that id.
    ///
    /// Ids count up from the highest one ever held. Once `u32::MAX` is
    /// taken the lowest id not in the World is used instead, and `None` is
    /// returned only when every `u32` id is occupied.
    pub fn add_object(&mut self, entity: impl Into<Entity>) -> Option<u32> {
        let mut entity = entity.into();
        let id = self.allocate_id()?;
        entity.set_id(id);
        self.objects.insert(id, entity);
        Some(id)
    }

    /// Inserts `entity` under its own id, returning any object it displaced.
    pub fn insert_object(&mut self, entity: Entity) -> Option<Entity> {
        let id = entity.id();
        self.next_object_id = self.next_object_id.max(u64::from(id) + 1);
        self.objects.insert(id, entity)
    }

    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Entity> {
        self.objects.get_mut(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.objects.contains_key(&id)
    }

    /// Objects in ascending id order.
    pub fn objects(&self) -> impl Iterator<Item = &Entity> {
        self.objects.values()
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.objects.values_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.objects.keys().copied()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Replaces walls, color and ground texture, keeping every object.
    pub fn set_header(&mut self, walls: Walls, color: Color, ground_texture: GroundTexture) {
        self.walls = walls;
        self.color = color;
        self.ground_texture = ground_texture;
    }

    fn allocate_id(&mut self) -> Option<u32> {
        if let Ok(id) = u32::try_from(self.next_object_id) {
            self.next_object_id += 1;
            return Some(id);
        }
        let taken = self.objects.keys().copied();
        (0..=u32::MAX)
            .zip(taken)
            .find(|(free, held)| free != held)
            .map(|(free, _)| free)
    }
}
