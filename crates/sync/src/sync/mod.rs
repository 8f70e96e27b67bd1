//! Snapshot/delta encoding of whole Worlds and reconciliation of incoming
//! frames against a target World.

mod pending;
mod report;

pub use report::SyncReport;

use std::collections::BTreeSet;

use crate::codec::{Codec, Mode, RawRecord, Records};
use crate::config::{SyncConfig, UnknownIdPolicy};
use crate::error::DecodeError;
use crate::model::World;

use pending::{PendingDelta, PendingDeltas};

#[derive(Debug, Clone)]
pub struct WorldSync {
    codec: Codec,
    policy: UnknownIdPolicy,
    pending: PendingDeltas,
}

impl Default for WorldSync {
    fn default() -> Self {
        Self::new(SyncConfig::default())
    }
}

impl WorldSync {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            codec: Codec::new(config.codec()),
            policy: config.unknown_id_policy,
            pending: PendingDeltas::new(config.pending_capacity),
        }
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn policy(&self) -> UnknownIdPolicy {
        self.policy
    }

    /// Delta records currently held for ids the receiver has not seen.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    /// World header followed by one full record per object.
    pub fn encode_snapshot(&self, world: &World) -> String {
        let mut writer = self.codec.writer();
        self.codec.write_header(world, &mut writer);
        for entity in world.objects() {
            self.codec.write_entity(entity, Mode::Snapshot, &mut writer);
        }
        writer.into_string()
    }

    /// One mutable-fields record per object, no header.
    pub fn encode_delta(&self, world: &World) -> String {
        let mut writer = self.codec.writer();
        for entity in world.objects() {
            self.codec.write_entity(entity, Mode::Delta, &mut writer);
        }
        writer.into_string()
    }

    /// Builds a new World from a snapshot frame.
    ///
    /// Only a header that cannot be decoded fails the frame; object records
    /// that fail are reported and skipped.
    pub fn apply_snapshot(&mut self, frame: &[u8]) -> Result<(World, SyncReport), DecodeError> {
        let text = as_text(frame)?;
        let mut records = Records::new(text);
        let header = self.codec.decode_header(&first_record(&mut records)?)?;

        let mut world = header.into_world();
        let mut report = SyncReport::default();
        for record in records {
            match self.codec.decode_entity(&record) {
                Ok(entity) if world.contains(entity.id()) => {
                    report.reject(DecodeError::DuplicateObjectId {
                        record: record.index,
                        id: entity.id(),
                    });
                }
                Ok(entity) => {
                    log::trace!("created {} {}", entity.entity_type(), entity.id());
                    world.insert_object(entity);
                    report.created += 1;
                }
                Err(err) => report.reject(err),
            }
        }

        let defined: BTreeSet<u32> = world.ids().collect();
        self.replay_pending(&mut world, &defined, &mut report);
        log::debug!(
            "snapshot applied: {} objects, {} errors",
            world.object_count(),
            report.errors.len()
        );
        Ok((world, report))
    }

    /// Reconciles a snapshot frame against an existing World.
    ///
    /// Known ids are overwritten in place, new ids are created, and ids the
    /// frame does not mention are left alone and listed as unreferenced.
    pub fn resync(&mut self, world: &mut World, frame: &[u8]) -> Result<SyncReport, DecodeError> {
        let text = as_text(frame)?;
        let mut records = Records::new(text);
        let header = self.codec.decode_header(&first_record(&mut records)?)?;
        world.set_header(header.walls, header.color, header.ground_texture);

        let mut report = SyncReport::default();
        let mut seen = BTreeSet::new();
        for record in records {
            let entity = match self.codec.decode_entity(&record) {
                Ok(entity) => entity,
                Err(err) => {
                    report.reject(err);
                    continue;
                }
            };
            let id = entity.id();
            if !seen.insert(id) {
                report.reject(DecodeError::DuplicateObjectId {
                    record: record.index,
                    id,
                });
                continue;
            }

            match world.get_mut(id) {
                Some(existing) if existing.entity_type() == entity.entity_type() => {
                    *existing = entity;
                    report.applied += 1;
                }
                Some(existing) => {
                    let expected = existing.entity_type();
                    report.reject(DecodeError::TypeMismatch {
                        record: record.index,
                        id,
                        expected,
                        found: entity.entity_type(),
                    });
                }
                None => {
                    world.insert_object(entity);
                    report.created += 1;
                }
            }
        }

        report.unreferenced = world.ids().filter(|id| !seen.contains(id)).collect();
        self.replay_pending(world, &seen, &mut report);
        log::debug!(
            "snapshot resynced: {} updated, {} created, {} unreferenced",
            report.applied,
            report.created,
            report.unreferenced.len()
        );
        Ok(report)
    }

    /// Applies a delta frame to `world` in place.
    pub fn apply_delta(&mut self, world: &mut World, frame: &[u8]) -> SyncReport {
        let mut report = SyncReport::default();
        let text = match as_text(frame) {
            Ok(text) => text,
            Err(err) => {
                report.reject(err);
                return report;
            }
        };

        for record in Records::new(text) {
            self.apply_delta_record(world, &record, &mut report);
        }
        log::debug!(
            "delta applied: {} updated, {} buffered, {} errors",
            report.applied,
            report.buffered,
            report.errors.len()
        );
        report
    }

    fn apply_delta_record(
        &mut self,
        world: &mut World,
        record: &RawRecord<'_>,
        report: &mut SyncReport,
    ) {
        let (prefix, state) = match self.codec.decode_mutable(record) {
            Ok(decoded) => decoded,
            Err(err) => {
                report.reject(err);
                return;
            }
        };
        let delta = PendingDelta {
            record: record.index,
            prefix,
            state,
        };

        match self.policy {
            UnknownIdPolicy::Buffer if !world.contains(prefix.id) => {
                log::debug!("buffering delta for unknown object {}", prefix.id);
                self.pending.push(delta);
                report.buffered += 1;
            }
            _ => apply_pending(world, delta, report),
        }
    }

    /// Held deltas are older than the snapshot that just arrived, so any
    /// delta for an id the snapshot defined is discarded.
    fn replay_pending(
        &mut self,
        world: &mut World,
        defined: &BTreeSet<u32>,
        report: &mut SyncReport,
    ) {
        for delta in self.pending.drain() {
            if defined.contains(&delta.prefix.id) {
                log::trace!("delta for object {} superseded by snapshot", delta.prefix.id);
                report.superseded += 1;
                continue;
            }
            apply_pending(world, delta, report);
        }
    }
}

fn apply_pending(world: &mut World, delta: PendingDelta, report: &mut SyncReport) {
    let PendingDelta {
        record,
        prefix,
        state,
    } = delta;

    match world.get_mut(prefix.id) {
        Some(entity) if entity.entity_type() == prefix.entity_type => {
            state.apply(entity);
            report.applied += 1;
        }
        Some(entity) => {
            let expected = entity.entity_type();
            report.reject(DecodeError::TypeMismatch {
                record,
                id: prefix.id,
                expected,
                found: prefix.entity_type,
            });
        }
        None => report.reject(DecodeError::UnknownObjectId {
            record,
            id: prefix.id,
        }),
    }
}

fn as_text(frame: &[u8]) -> Result<&str, DecodeError> {
    if !frame.is_ascii() {
        return Err(DecodeError::InvalidEncoding);
    }
    std::str::from_utf8(frame).map_err(|_| DecodeError::InvalidEncoding)
}

fn first_record<'a>(records: &mut Records<'a>) -> Result<RawRecord<'a>, DecodeError> {
    records
        .next()
        .ok_or(DecodeError::TruncatedRecord { record: 0, field: 0 })
}
