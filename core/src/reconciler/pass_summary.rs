use std::fmt;

/// Key-level outcome of one successful pass
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Entities classified as entering, duplicates included
    pub entered: usize,
    /// Entities whose key was already in the snapshot
    pub persisted: usize,
    /// Keys that disappeared
    pub exited: usize,
    /// Absent slots in the input
    pub skipped: usize,
}

impl PassSummary {
    /// True when the pass neither added nor removed a key
    pub fn is_stable(&self) -> bool {
        self.entered == 0 && self.exited == 0
    }
}

impl fmt::Display for PassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entered={} persisted={} exited={} skipped={}",
            self.entered, self.persisted, self.exited, self.skipped
        )
    }
}
