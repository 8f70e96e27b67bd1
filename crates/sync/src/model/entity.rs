use std::fmt;

use serde::{Deserialize, Serialize};

use super::object::{PhysicalObject, Robot, Thymio2};

/// Closed set of simulated object variants. The discriminant is the wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum EntityType {
    PhysicalObject = 0,
    Thymio2 = 1,
    EPuck = 2,
    Sbot = 3,
    Marxbot = 4,
    Khepera = 5,
}

impl EntityType {
    pub const ALL: [EntityType; 6] = [
        Self::PhysicalObject,
        Self::Thymio2,
        Self::EPuck,
        Self::Sbot,
        Self::Marxbot,
        Self::Khepera,
    ];

    pub fn tag(self) -> u8 {
        self as u8
    }

    pub fn is_robot(self) -> bool {
        !matches!(self, Self::PhysicalObject)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::PhysicalObject => "PhysicalObject",
            Self::Thymio2 => "Thymio2",
            Self::EPuck => "EPuck",
            Self::Sbot => "Sbot",
            Self::Marxbot => "Marxbot",
            Self::Khepera => "Khepera",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    PhysicalObject(PhysicalObject),
    Thymio2(Thymio2),
    EPuck(Robot),
    Sbot(Robot),
    Marxbot(Robot),
    Khepera(Robot),
}

impl Entity {
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::PhysicalObject(_) => EntityType::PhysicalObject,
            Self::Thymio2(_) => EntityType::Thymio2,
            Self::EPuck(_) => EntityType::EPuck,
            Self::Sbot(_) => EntityType::Sbot,
            Self::Marxbot(_) => EntityType::Marxbot,
            Self::Khepera(_) => EntityType::Khepera,
        }
    }

    pub fn id(&self) -> u32 {
        self.body().id
    }

    pub(crate) fn set_id(&mut self, id: u32) {
        self.body_mut().id = id;
    }

    pub fn body(&self) -> &PhysicalObject {
        match self {
            Self::PhysicalObject(object) => object,
            Self::Thymio2(thymio) => thymio.body(),
            Self::EPuck(robot) | Self::Sbot(robot) | Self::Marxbot(robot) | Self::Khepera(robot) => {
                &robot.body
            }
        }
    }

    pub fn body_mut(&mut self) -> &mut PhysicalObject {
        match self {
            Self::PhysicalObject(object) => object,
            Self::Thymio2(thymio) => thymio.body_mut(),
            Self::EPuck(robot) | Self::Sbot(robot) | Self::Marxbot(robot) | Self::Khepera(robot) => {
                &mut robot.body
            }
        }
    }

    pub fn robot(&self) -> Option<&Robot> {
        match self {
            Self::PhysicalObject(_) => None,
            Self::Thymio2(thymio) => Some(&thymio.robot),
            Self::EPuck(robot) | Self::Sbot(robot) | Self::Marxbot(robot) | Self::Khepera(robot) => {
                Some(robot)
            }
        }
    }

    pub fn robot_mut(&mut self) -> Option<&mut Robot> {
        match self {
            Self::PhysicalObject(_) => None,
            Self::Thymio2(thymio) => Some(&mut thymio.robot),
            Self::EPuck(robot) | Self::Sbot(robot) | Self::Marxbot(robot) | Self::Khepera(robot) => {
                Some(robot)
            }
        }
    }

    pub fn as_thymio(&self) -> Option<&Thymio2> {
        match self {
            Self::Thymio2(thymio) => Some(thymio),
            _ => None,
        }
    }

    pub fn as_thymio_mut(&mut self) -> Option<&mut Thymio2> {
        match self {
            Self::Thymio2(thymio) => Some(thymio),
            _ => None,
        }
    }
}

impl From<PhysicalObject> for Entity {
    fn from(object: PhysicalObject) -> Self {
        Self::PhysicalObject(object)
    }
}

impl From<Thymio2> for Entity {
    fn from(thymio: Thymio2) -> Self {
        Self::Thymio2(thymio)
    }
}
