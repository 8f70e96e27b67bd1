pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod registry;
pub mod session;
pub mod sync;

pub use codec::{Codec, Mode, MutableState, RecordPrefix, WorldHeader};
pub use config::{CodecConfig, SyncConfig, UnknownIdPolicy};
pub use error::DecodeError;
pub use model::{
    ApproxEq, Color, Entity, EntityType, GroundTexture, Hull, Part, PhysicalObject, Robot, Shape,
    Texture, Thymio2, Walls, World,
};
pub use session::{Frame, FrameKind, FrameReader, SessionError, SnapshotSchedule, write_frame};
pub use sync::{SyncReport, WorldSync};
