use std::path::PathBuf;

use exposure_timeline::QueryRow;

#[derive(Debug)]
pub struct CumulativeOutcome {
    pub rows: Vec<QueryRow<String>>,
    /// Messages for queries left out under `--skip-invalid`.
    pub rejected: Vec<String>,
    /// Set when rows went to a file rather than stdout.
    pub output: Option<PathBuf>,
    pub event_count: usize,
    pub entity_count: usize,
}

impl CumulativeOutcome {
    pub fn has_errors(&self) -> bool {
        !self.rejected.is_empty()
    }
}
