//! Closed mapping from wire tags to entity constructors.
//!
//! Both ends of a connection resolve tags through [`REGISTRY`]; it is the only
//! place a tag is bound to a variant.

use crate::model::{Entity, EntityType, PhysicalObject, Robot, Thymio2};

#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub tag: u8,
    pub entity_type: EntityType,
    construct: fn() -> Entity,
}

impl Registration {
    const fn new(entity_type: EntityType, construct: fn() -> Entity) -> Self {
        Self {
            tag: entity_type as u8,
            entity_type,
            construct,
        }
    }
}

pub const REGISTRY: [Registration; 6] = [
    Registration::new(EntityType::PhysicalObject, physical_object),
    Registration::new(EntityType::Thymio2, thymio2),
    Registration::new(EntityType::EPuck, epuck),
    Registration::new(EntityType::Sbot, sbot),
    Registration::new(EntityType::Marxbot, marxbot),
    Registration::new(EntityType::Khepera, khepera),
];

fn physical_object() -> Entity {
    Entity::PhysicalObject(PhysicalObject::default())
}

fn thymio2() -> Entity {
    Entity::Thymio2(Thymio2::new())
}

fn epuck() -> Entity {
    Entity::EPuck(Robot::epuck())
}

fn sbot() -> Entity {
    Entity::Sbot(Robot::sbot())
}

fn marxbot() -> Entity {
    Entity::Marxbot(Robot::marxbot())
}

fn khepera() -> Entity {
    Entity::Khepera(Robot::khepera())
}

/// Resolves a wire tag, or `None` if it lies outside the closed set.
pub fn resolve(tag: u32) -> Option<EntityType> {
    REGISTRY
        .iter()
        .find(|registration| u32::from(registration.tag) == tag)
        .map(|registration| registration.entity_type)
}

/// Builds a stock instance of `entity_type` with id 0.
pub fn create(entity_type: EntityType) -> Entity {
    let registration = &REGISTRY[entity_type as usize];
    debug_assert_eq!(registration.entity_type, entity_type);
    (registration.construct)()
}
