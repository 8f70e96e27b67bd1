//! Text codec mapping entities to FIELD/RECORD-delimited token streams.

mod fields;
mod header;
mod tokens;
mod wire;

pub use fields::MutableState;
pub use header::WorldHeader;
pub use tokens::{
    FIELD_SEPARATOR, RECORD_SEPARATOR, RawRecord, Records, TokenReader, TokenWriter,
};
pub use wire::{Wire, de_seq, ser_seq};

use crate::config::CodecConfig;
use crate::error::{DecodeError, FieldError};
use crate::model::{Entity, EntityType, World};
use crate::registry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Creation-time fields followed by mutable fields.
    Snapshot,
    /// Mutable per-tick fields only.
    Delta,
}

impl Mode {
    pub fn is_snapshot(self) -> bool {
        matches!(self, Self::Snapshot)
    }
}

impl From<bool> for Mode {
    fn from(snapshot: bool) -> Self {
        if snapshot { Self::Snapshot } else { Self::Delta }
    }
}

/// The `tag;id;` prefix every object record starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordPrefix {
    pub entity_type: EntityType,
    pub id: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Largest difference a value may pick up from one encode/decode trip.
    pub fn tolerance(&self) -> f64 {
        self.config.tolerance()
    }

    pub fn writer(&self) -> TokenWriter {
        TokenWriter::new(self.config.precision)
    }

    /// Appends one RECORD-terminated object record.
    pub fn write_entity(&self, entity: &Entity, mode: Mode, writer: &mut TokenWriter) {
        writer.uint(entity.entity_type().tag());
        writer.uint(entity.id());
        if mode.is_snapshot() {
            fields::ser_creation(entity, writer);
        }
        MutableState::of(entity).ser(writer);
        writer.end_record();
    }

    pub fn encode_entity(&self, entity: &Entity, mode: Mode) -> String {
        let mut writer = self.writer();
        self.write_entity(entity, mode, &mut writer);
        writer.into_string()
    }

    /// Appends the RECORD-terminated world header of a snapshot frame.
    pub fn write_header(&self, world: &World, writer: &mut TokenWriter) {
        header::write_fields(&world.walls, &world.color, &world.ground_texture, writer);
        writer.end_record();
    }

    pub fn decode_header(&self, record: &RawRecord<'_>) -> Result<WorldHeader, DecodeError> {
        let mut reader = open(record)?;
        let header = WorldHeader::de(&mut reader).map_err(|e| e.at_record(record.index))?;
        reader.finish().map_err(|e| e.at_record(record.index))?;
        Ok(header)
    }

    /// Parses the `tag;id;` prefix, rejecting tags outside the registry.
    pub fn read_prefix(
        &self,
        record: &RawRecord<'_>,
        reader: &mut TokenReader<'_>,
    ) -> Result<RecordPrefix, DecodeError> {
        let tag: i64 = reader
            .parse("a type tag")
            .map_err(|e| e.at_record(record.index))?;
        let id = reader.u32().map_err(|e| e.at_record(record.index))?;
        let entity_type = u32::try_from(tag)
            .ok()
            .and_then(registry::resolve)
            .ok_or(DecodeError::UnknownTypeTag {
                record: record.index,
                tag,
            })?;
        Ok(RecordPrefix { entity_type, id })
    }

    /// Builds a new entity from a snapshot-mode record.
    pub fn decode_entity(&self, record: &RawRecord<'_>) -> Result<Entity, DecodeError> {
        let mut reader = open(record)?;
        let prefix = self.read_prefix(record, &mut reader)?;

        let mut entity = registry::create(prefix.entity_type);
        entity.set_id(prefix.id);
        decode_fields(&mut entity, &mut reader).map_err(|e| e.at_record(record.index))?;
        Ok(entity)
    }

    /// Decodes a delta-mode record without touching any entity.
    pub fn decode_mutable(
        &self,
        record: &RawRecord<'_>,
    ) -> Result<(RecordPrefix, MutableState), DecodeError> {
        let mut reader = open(record)?;
        let prefix = self.read_prefix(record, &mut reader)?;
        let state = MutableState::de(prefix.entity_type, &mut reader)
            .and_then(|state| reader.finish().map(|()| state))
            .map_err(|e| e.at_record(record.index))?;
        Ok((prefix, state))
    }
}

fn open<'a>(record: &RawRecord<'a>) -> Result<TokenReader<'a>, DecodeError> {
    if !record.terminated {
        return Err(DecodeError::TruncatedRecord {
            record: record.index,
            field: record.truncation_field(),
        });
    }
    Ok(record.reader())
}

fn decode_fields(entity: &mut Entity, reader: &mut TokenReader<'_>) -> Result<(), FieldError> {
    fields::de_creation(entity, reader)?;
    MutableState::de(entity.entity_type(), reader)?.apply(entity);
    reader.finish()
}
