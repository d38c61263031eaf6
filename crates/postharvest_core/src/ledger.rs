use std::collections::HashSet;

/// Set of post identifiers seen during one harvest run.
///
/// Grows monotonically; there is no eviction. A run's feed is assumed small
/// enough that an unbounded set is acceptable.
#[derive(Debug, Default)]
pub struct SeenLedger {
    ids: HashSet<String>,
}

impl SeenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true the first time an id is presented, false afterwards.
    /// Recording is a side effect of the first sighting.
    pub fn is_novel(&mut self, id: &str) -> bool {
        self.ids.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
