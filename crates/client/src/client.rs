use std::io::BufRead;

use anyhow::Result;

use enkinet::{
    DecodeError, EntityType, Frame, FrameReader, SyncConfig, SyncReport, UnknownIdPolicy, World,
    WorldSync,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientStats {
    pub snapshots: u64,
    pub deltas: u64,
    pub skipped_deltas: u64,
    pub record_errors: u64,
    pub failed_frames: u64,
}

/// Keeps a local World in step with the frames a server streams.
pub struct MirrorClient {
    sync: WorldSync,
    world: Option<World>,
    stats: ClientStats,
}

impl MirrorClient {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            sync: WorldSync::new(config),
            world: None,
            stats: ClientStats::default(),
        }
    }

    /// `None` until the first snapshot arrives.
    pub fn world(&self) -> Option<&World> {
        self.world.as_ref()
    }

    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }

    pub fn handle_frame(&mut self, frame: &Frame) -> Result<SyncReport, DecodeError> {
        let result = if frame.is_snapshot() {
            self.stats.snapshots += 1;
            self.apply_snapshot(&frame.payload)
        } else {
            self.stats.deltas += 1;
            Ok(self.apply_delta(&frame.payload))
        };

        match &result {
            Ok(report) => {
                self.stats.record_errors += report.errors.len() as u64;
                if !report.unreferenced.is_empty() {
                    log::info!(
                        "server no longer mentions objects {:?}",
                        report.unreferenced
                    );
                }
            }
            Err(e) => {
                self.stats.failed_frames += 1;
                log::error!("frame rejected: {}", e);
            }
        }
        result
    }

    fn apply_snapshot(&mut self, payload: &[u8]) -> Result<SyncReport, DecodeError> {
        match &mut self.world {
            Some(world) => self.sync.resync(world, payload),
            None => {
                let (world, report) = self.sync.apply_snapshot(payload)?;
                log::info!("received first snapshot with {} objects", world.object_count());
                self.world = Some(world);
                Ok(report)
            }
        }
    }

    fn apply_delta(&mut self, payload: &[u8]) -> SyncReport {
        if let Some(world) = &mut self.world {
            return self.sync.apply_delta(world, payload);
        }
        if self.sync.policy() == UnknownIdPolicy::Ignore {
            self.stats.skipped_deltas += 1;
            return SyncReport::default();
        }
        // Every id is unknown here, so the records all land in the buffer.
        self.sync.apply_delta(&mut World::default(), payload)
    }

    /// Reads and applies frames until the stream ends or `max_frames` frames
    /// have been handled, logging a summary every `summary_every` frames.
    pub fn run<R: BufRead>(
        &mut self,
        reader: &mut FrameReader<R>,
        max_frames: Option<u64>,
        summary_every: u64,
    ) -> Result<()> {
        let mut handled = 0u64;
        while let Some(frame) = reader.next_frame()? {
            let _ = self.handle_frame(&frame);
            handled += 1;
            if summary_every > 0 && handled % summary_every == 0 {
                self.log_summary();
            }
            if max_frames.is_some_and(|max| handled >= max) {
                break;
            }
        }
        self.log_summary();
        Ok(())
    }

    pub fn log_summary(&self) {
        let Some(world) = &self.world else {
            log::info!(
                "no snapshot received yet ({} deltas skipped)",
                self.stats.skipped_deltas
            );
            return;
        };

        let counts: Vec<String> = EntityType::ALL
            .into_iter()
            .filter_map(|entity_type| {
                let count = world
                    .objects()
                    .filter(|e| e.entity_type() == entity_type)
                    .count();
                (count > 0).then(|| format!("{} {}", count, entity_type))
            })
            .collect();

        log::info!(
            "world {:?}: {} objects [{}], {} snapshots, {} deltas, {} record errors",
            world.walls,
            world.object_count(),
            counts.join(", "),
            self.stats.snapshots,
            self.stats.deltas,
            self.stats.record_errors
        );
    }
}
