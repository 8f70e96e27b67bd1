use crate::error::FieldError;
use crate::model::{Color, GroundTexture, Walls, World};

use super::tokens::{TokenReader, TokenWriter};
use super::wire::Wire;

/// World-level fields leading a snapshot frame.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldHeader {
    pub walls: Walls,
    pub color: Color,
    pub ground_texture: GroundTexture,
}

impl WorldHeader {
    pub fn of(world: &World) -> Self {
        Self {
            walls: world.walls,
            color: world.color,
            ground_texture: world.ground_texture.clone(),
        }
    }

    pub fn into_world(self) -> World {
        World::new(self.walls, self.color, self.ground_texture)
    }
}

/// Header layout shared by [`WorldHeader`] and worlds written in place.
pub(crate) fn write_fields(
    walls: &Walls,
    color: &Color,
    ground_texture: &GroundTexture,
    writer: &mut TokenWriter,
) {
    walls.ser(writer);
    color.ser(writer);
    ground_texture.ser(writer);
}

impl Wire for Walls {
    const MIN_TOKENS: usize = 1;

    fn ser(&self, writer: &mut TokenWriter) {
        writer.uint(self.tag());
        match self {
            Walls::Square { width, height } => {
                writer.float(*width);
                writer.float(*height);
            }
            Walls::Circular { radius } => writer.float(*radius),
            Walls::None => {}
        }
    }

    fn de(reader: &mut TokenReader<'_>) -> Result<Self, FieldError> {
        let field = reader.field();
        let tag: u8 = reader.parse("a walls type")?;
        match tag {
            Walls::SQUARE_TAG => Ok(Walls::Square {
                width: reader.float()?,
                height: reader.float()?,
            }),
            Walls::CIRCULAR_TAG => Ok(Walls::Circular {
                radius: reader.float()?,
            }),
            Walls::NONE_TAG => Ok(Walls::None),
            other => Err(FieldError::Malformed {
                field,
                expected: "a walls type",
                token: other.to_string(),
            }),
        }
    }
}

impl Wire for WorldHeader {
    const MIN_TOKENS: usize = Walls::MIN_TOKENS + Color::MIN_TOKENS + GroundTexture::MIN_TOKENS;

    fn ser(&self, writer: &mut TokenWriter) {
        write_fields(&self.walls, &self.color, &self.ground_texture, writer);
    }

    fn de(reader: &mut TokenReader<'_>) -> Result<Self, FieldError> {
        Ok(Self {
            walls: Walls::de(reader)?,
            color: Color::de(reader)?,
            ground_texture: GroundTexture::de(reader)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_header_layout() {
        let world = World::square(100.0, 50.0, Color::new(0.2, 0.2, 0.6, 1.0));
        let mut writer = TokenWriter::new(2);
        WorldHeader::of(&world).ser(&mut writer);

        assert_eq!(
            writer.as_str(),
            "0;100.00;50.00;0.20;0.20;0.60;1.00;0;0;0;"
        );
    }

    #[test]
    fn circular_header_has_radius_only() {
        let world = World::circular(30.0, Color::WHITE);
        let mut writer = TokenWriter::new(2);
        WorldHeader::of(&world).ser(&mut writer);

        assert!(writer.as_str().starts_with("1;30.00;1.00;"));
    }

    #[test]
    fn world_and_header_write_identical_fields() {
        let mut world = World::circular(12.5, Color::new(0.1, 0.2, 0.3, 0.4));
        world.ground_texture = GroundTexture::new(2, 1, vec![7, 9]).unwrap();
        let mut from_header = TokenWriter::new(2);
        WorldHeader::of(&world).ser(&mut from_header);
        let mut in_place = TokenWriter::new(2);
        write_fields(&world.walls, &world.color, &world.ground_texture, &mut in_place);

        assert_eq!(from_header.as_str(), in_place.as_str());
    }

    #[test]
    fn unknown_walls_type_rejected() {
        let mut reader = TokenReader::new("9;1.00;1.00;1.00;1.00;0;0;0;");
        let err = WorldHeader::de(&mut reader).unwrap_err();

        assert!(matches!(err, FieldError::Malformed { field: 0, .. }));
    }
}
