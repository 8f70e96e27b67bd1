use std::collections::VecDeque;

use crate::codec::{MutableState, RecordPrefix};

#[derive(Debug, Clone)]
pub(crate) struct PendingDelta {
    pub record: usize,
    pub prefix: RecordPrefix,
    pub state: MutableState,
}

/// Bounded FIFO of decoded delta records waiting for their object to exist.
#[derive(Debug, Clone)]
pub(crate) struct PendingDeltas {
    entries: VecDeque<PendingDelta>,
    capacity: usize,
}

impl PendingDeltas {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    pub fn push(&mut self, delta: PendingDelta) {
        if self.capacity == 0 {
            log::warn!(
                "pending delta buffer disabled, discarding object {}",
                delta.prefix.id
            );
            return;
        }
        if self.entries.len() == self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                log::warn!(
                    "pending delta buffer full, evicting object {}",
                    evicted.prefix.id
                );
            }
        }
        self.entries.push_back(delta);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = PendingDelta> + '_ {
        self.entries.drain(..)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::model::EntityType;

    fn delta(id: u32) -> PendingDelta {
        PendingDelta {
            record: 0,
            prefix: RecordPrefix {
                entity_type: EntityType::EPuck,
                id,
            },
            state: MutableState {
                position: DVec2::ZERO,
                angle: 0.0,
                leds: None,
                color: None,
            },
        }
    }

    #[test]
    fn oldest_evicted_at_capacity() {
        let mut pending = PendingDeltas::new(2);
        pending.push(delta(1));
        pending.push(delta(2));
        pending.push(delta(3));

        let ids: Vec<u32> = pending.drain().map(|d| d.prefix.id).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(pending.len(), 0);
    }

    #[test]
    fn zero_capacity_holds_nothing() {
        let mut pending = PendingDeltas::new(0);
        pending.push(delta(1));
        assert_eq!(pending.len(), 0);
    }
}
