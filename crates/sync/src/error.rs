use crate::model::EntityType;

/// Where and why a single record failed to decode.
///
/// `record` counts records from the start of the frame; in a snapshot frame
/// the header is record 0. `field` counts tokens from the start of the record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("record {record}, field {field}: expected {expected}, found {token:?}")]
    MalformedField {
        record: usize,
        field: usize,
        expected: &'static str,
        token: String,
    },
    #[error("record {record} truncated at field {field}")]
    TruncatedRecord { record: usize, field: usize },
    #[error("record {record}: unknown type tag {tag}")]
    UnknownTypeTag { record: usize, tag: i64 },
    #[error("record {record}: no object with id {id}")]
    UnknownObjectId { record: usize, id: u32 },
    #[error("record {record}: object {id} is a {expected}, record describes a {found}")]
    TypeMismatch {
        record: usize,
        id: u32,
        expected: EntityType,
        found: EntityType,
    },
    #[error("record {record}: object {id} already defined in this frame")]
    DuplicateObjectId { record: usize, id: u32 },
    #[error("frame is not ASCII text")]
    InvalidEncoding,
}

impl DecodeError {
    pub fn record(&self) -> Option<usize> {
        match self {
            Self::MalformedField { record, .. }
            | Self::TruncatedRecord { record, .. }
            | Self::UnknownTypeTag { record, .. }
            | Self::UnknownObjectId { record, .. }
            | Self::TypeMismatch { record, .. }
            | Self::DuplicateObjectId { record, .. } => Some(*record),
            Self::InvalidEncoding => None,
        }
    }

    pub fn field(&self) -> Option<usize> {
        match self {
            Self::MalformedField { field, .. } | Self::TruncatedRecord { field, .. } => {
                Some(*field)
            }
            _ => None,
        }
    }
}

/// Token-level failure inside one record, before the record index is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    Malformed {
        field: usize,
        expected: &'static str,
        token: String,
    },
    Truncated {
        field: usize,
    },
}

impl FieldError {
    pub fn at_record(self, record: usize) -> DecodeError {
        match self {
            Self::Malformed {
                field,
                expected,
                token,
            } => DecodeError::MalformedField {
                record,
                field,
                expected,
                token,
            },
            Self::Truncated { field } => DecodeError::TruncatedRecord { record, field },
        }
    }
}
