//! Ordered field lists of every entity variant.
//!
//! Snapshot records carry the creation fields followed by the mutable
//! fields; delta records carry the mutable fields only.
//!
//! | variant                   | creation                     | mutable                   |
//! |---------------------------|------------------------------|---------------------------|
//! | PhysicalObject            | color, shape                 | x, y, angle               |
//! | EPuck, Marxbot, Khepera   | color, shape, left, right    | x, y, angle               |
//! | Sbot                      | color, shape, left, right    | x, y, angle, color        |
//! | Thymio2                   | color, shape, left, right    | x, y, angle, 24 LEDs      |

use glam::DVec2;

use crate::error::FieldError;
use crate::model::{Color, Entity, EntityType, Shape, Thymio2};

use super::tokens::{TokenReader, TokenWriter};
use super::wire::Wire;

pub(crate) fn ser_creation(entity: &Entity, writer: &mut TokenWriter) {
    let body = entity.body();
    body.color.ser(writer);
    body.shape.ser(writer);
    if let Some(robot) = entity.robot() {
        writer.float(robot.left_speed);
        writer.float(robot.right_speed);
    }
}

pub(crate) fn de_creation(
    entity: &mut Entity,
    reader: &mut TokenReader<'_>,
) -> Result<(), FieldError> {
    let color = Color::de(reader)?;
    let shape = Shape::de(reader)?;
    let speeds = if entity.entity_type().is_robot() {
        Some((reader.float()?, reader.float()?))
    } else {
        None
    };

    let body = entity.body_mut();
    body.color = color;
    body.shape = shape;
    if let (Some(robot), Some((left, right))) = (entity.robot_mut(), speeds) {
        robot.set_speeds(left, right);
    }
    Ok(())
}

/// The per-tick fields of one object.
#[derive(Debug, Clone, PartialEq)]
pub struct MutableState {
    pub position: DVec2,
    pub angle: f64,
    pub leds: Option<[Color; Thymio2::LED_COUNT]>,
    pub color: Option<Color>,
}

impl MutableState {
    pub fn of(entity: &Entity) -> Self {
        let body = entity.body();
        Self {
            position: body.position,
            angle: body.angle,
            leds: entity.as_thymio().map(|thymio| thymio.leds),
            color: matches!(entity, Entity::Sbot(_)).then_some(body.color),
        }
    }

    pub fn ser(&self, writer: &mut TokenWriter) {
        self.position.ser(writer);
        writer.float(self.angle);
        if let Some(leds) = &self.leds {
            writer.count(leds.len());
            for led in leds {
                led.ser(writer);
            }
        }
        if let Some(color) = &self.color {
            color.ser(writer);
        }
    }

    pub fn de(entity_type: EntityType, reader: &mut TokenReader<'_>) -> Result<Self, FieldError> {
        let position = DVec2::de(reader)?;
        let angle = reader.float()?;

        let leds = match entity_type {
            EntityType::Thymio2 => Some(de_leds(reader)?),
            _ => None,
        };
        let color = match entity_type {
            EntityType::Sbot => Some(Color::de(reader)?),
            _ => None,
        };

        Ok(Self {
            position,
            angle,
            leds,
            color,
        })
    }

    pub fn apply(self, entity: &mut Entity) {
        let body = entity.body_mut();
        body.position = self.position;
        body.angle = self.angle;
        if let Some(color) = self.color {
            body.color = color;
        }
        if let (Some(leds), Some(thymio)) = (self.leds, entity.as_thymio_mut()) {
            thymio.leds = leds;
        }
    }
}

fn de_leds(reader: &mut TokenReader<'_>) -> Result<[Color; Thymio2::LED_COUNT], FieldError> {
    let count_field = reader.field();
    let count = reader.count(Color::MIN_TOKENS)?;
    if count != Thymio2::LED_COUNT {
        return Err(FieldError::Malformed {
            field: count_field,
            expected: "a Thymio2 LED count of 24",
            token: count.to_string(),
        });
    }

    let mut leds = [Color::default(); Thymio2::LED_COUNT];
    for led in &mut leds {
        *led = Color::de(reader)?;
    }
    Ok(leds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Robot;

    fn mutable_tokens(entity: &Entity) -> String {
        let mut writer = TokenWriter::new(2);
        MutableState::of(entity).ser(&mut writer);
        writer.into_string()
    }

    #[test]
    fn plain_robot_sends_pose_only() {
        let mut robot = Robot::epuck();
        robot.body.position = DVec2::new(1.0, 2.0);
        robot.body.angle = 0.5;

        assert_eq!(mutable_tokens(&Entity::EPuck(robot)), "1.00;2.00;0.50;");
    }

    #[test]
    fn sbot_sends_color() {
        let mut robot = Robot::sbot();
        robot.body.color = Color::BLUE;

        assert_eq!(
            mutable_tokens(&Entity::Sbot(robot)),
            "0.00;0.00;0.00;0.00;0.00;1.00;1.00;"
        );
    }

    #[test]
    fn marxbot_color_stays_creation_only() {
        let robot = Robot::marxbot();
        assert_eq!(mutable_tokens(&Entity::Marxbot(robot)), "0.00;0.00;0.00;");
    }

    #[test]
    fn thymio_led_count_enforced() {
        let mut tokens = String::from("0.00;0.00;0.00;23;");
        for _ in 0..23 {
            tokens.push_str("0.00;0.00;0.00;1.00;");
        }
        let mut reader = TokenReader::new(&tokens);
        let err = MutableState::de(EntityType::Thymio2, &mut reader).unwrap_err();

        assert!(matches!(err, FieldError::Malformed { field: 3, .. }));
    }

    #[test]
    fn apply_leaves_creation_fields() {
        let mut entity = Entity::Thymio2(Thymio2::new());
        let shape_before = entity.body().shape.clone();

        let mut state = MutableState::of(&entity);
        state.position = DVec2::new(4.0, 5.0);
        if let Some(leds) = state.leds.as_mut() {
            leds[0] = Color::RED;
        }
        state.apply(&mut entity);

        assert_eq!(entity.body().position, DVec2::new(4.0, 5.0));
        assert_eq!(entity.as_thymio().unwrap().leds[0], Color::RED);
        assert_eq!(entity.body().shape, shape_before);
    }
}
