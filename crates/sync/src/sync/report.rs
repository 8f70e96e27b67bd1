use crate::error::DecodeError;

/// Outcome of applying one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Existing objects updated in place.
    pub applied: usize,
    /// Objects instantiated through the registry.
    pub created: usize,
    /// Delta records held back for the next snapshot.
    pub buffered: usize,
    /// Held delta records discarded because a snapshot redefined their id.
    pub superseded: usize,
    /// Ids present in the target World that a snapshot did not mention.
    pub unreferenced: Vec<u32>,
    pub errors: Vec<DecodeError>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub(crate) fn reject(&mut self, error: DecodeError) {
        log::warn!("dropping record: {error}");
        self.errors.push(error);
    }
}
