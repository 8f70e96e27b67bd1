use glam::DVec2;

use crate::error::FieldError;
use crate::model::{Color, GroundTexture, Part, Shape, Texture};

use super::tokens::{TokenReader, TokenWriter};

/// A value with a fixed, self-delimiting token layout.
pub trait Wire: Sized {
    /// Fewest tokens any encoding of this value occupies.
    const MIN_TOKENS: usize;

    fn ser(&self, writer: &mut TokenWriter);
    fn de(reader: &mut TokenReader<'_>) -> Result<Self, FieldError>;
}

/// Writes `items` behind their count.
pub fn ser_seq<T: Wire>(items: &[T], writer: &mut TokenWriter) {
    writer.count(items.len());
    for item in items {
        item.ser(writer);
    }
}

/// Reads a count followed by exactly that many items.
pub fn de_seq<T: Wire>(reader: &mut TokenReader<'_>) -> Result<Vec<T>, FieldError> {
    let count = reader.count(T::MIN_TOKENS)?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(T::de(reader)?);
    }
    Ok(items)
}

impl Wire for DVec2 {
    const MIN_TOKENS: usize = 2;

    fn ser(&self, writer: &mut TokenWriter) {
        writer.float(self.x);
        writer.float(self.y);
    }

    fn de(reader: &mut TokenReader<'_>) -> Result<Self, FieldError> {
        Ok(DVec2::new(reader.float()?, reader.float()?))
    }
}

impl Wire for Color {
    const MIN_TOKENS: usize = 4;

    fn ser(&self, writer: &mut TokenWriter) {
        for component in self.components() {
            writer.float(component);
        }
    }

    fn de(reader: &mut TokenReader<'_>) -> Result<Self, FieldError> {
        Ok(Color::new(
            reader.float()?,
            reader.float()?,
            reader.float()?,
            reader.float()?,
        ))
    }
}

impl Wire for Texture {
    const MIN_TOKENS: usize = 1;

    fn ser(&self, writer: &mut TokenWriter) {
        ser_seq(&self.0, writer);
    }

    fn de(reader: &mut TokenReader<'_>) -> Result<Self, FieldError> {
        de_seq(reader).map(Texture)
    }
}

// vertex count, vertices, height, texture count, textures
impl Wire for Part {
    const MIN_TOKENS: usize = 3;

    fn ser(&self, writer: &mut TokenWriter) {
        ser_seq(&self.shape, writer);
        writer.float(self.height);
        ser_seq(&self.textures, writer);
    }

    fn de(reader: &mut TokenReader<'_>) -> Result<Self, FieldError> {
        let shape = de_seq(reader)?;
        let height = reader.float()?;
        let textures = de_seq(reader)?;
        Ok(Part::textured(shape, height, textures))
    }
}

// 1;radius;height;mass; or 0;<parts>;mass;
impl Wire for Shape {
    const MIN_TOKENS: usize = 3;

    fn ser(&self, writer: &mut TokenWriter) {
        match self {
            Shape::Cylinder {
                radius,
                height,
                mass,
            } => {
                writer.flag(true);
                writer.float(*radius);
                writer.float(*height);
                writer.float(*mass);
            }
            Shape::Hull { parts, mass } => {
                writer.flag(false);
                ser_seq(parts, writer);
                writer.float(*mass);
            }
        }
    }

    fn de(reader: &mut TokenReader<'_>) -> Result<Self, FieldError> {
        if reader.flag()? {
            Ok(Shape::Cylinder {
                radius: reader.float()?,
                height: reader.float()?,
                mass: reader.float()?,
            })
        } else {
            let parts = de_seq(reader)?;
            let mass = reader.float()?;
            Ok(Shape::Hull { parts, mass })
        }
    }
}

impl Wire for GroundTexture {
    const MIN_TOKENS: usize = 3;

    fn ser(&self, writer: &mut TokenWriter) {
        writer.uint(self.width());
        writer.uint(self.height());
        writer.count(self.data().len());
        for pixel in self.data() {
            writer.uint(*pixel);
        }
    }

    fn de(reader: &mut TokenReader<'_>) -> Result<Self, FieldError> {
        let width = reader.u32()?;
        let height = reader.u32()?;
        let count_field = reader.field();
        let count = reader.count(1)?;
        let expected = (width as usize).saturating_mul(height as usize);
        if count != expected {
            return Err(FieldError::Malformed {
                field: count_field,
                expected: "a pixel count of width * height",
                token: count.to_string(),
            });
        }

        let mut data = Vec::with_capacity(count);
        for _ in 0..count {
            data.push(reader.parse::<u32>("a packed pixel")?);
        }
        GroundTexture::new(width, height, data).map_err(|_| FieldError::Malformed {
            field: count_field,
            expected: "a pixel count of width * height",
            token: count.to_string(),
        })
    }
}
