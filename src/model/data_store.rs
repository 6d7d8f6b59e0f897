//! @ai:module:intent Registry of run identities shared by all experiments
//! @ai:module:layer domain
//! @ai:module:public_api DataStore
//! @ai:module:stateless false

use crate::model::run_id::RunId;
use std::collections::HashSet;
use std::sync::Arc;

/// @ai:intent Interns runs so equal runs from different experiments are one object
#[derive(Debug, Default)]
pub struct DataStore {
    runs: HashSet<Arc<RunId>>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// @ai:intent Return the registered run equal to `run`, registering it if new
    /// @ai:effects state:write
    pub fn create_run_id(&mut self, run: RunId) -> Arc<RunId> {
        if let Some(existing) = self.runs.get(&run) {
            return Arc::clone(existing);
        }

        let shared = Arc::new(run);
        self.runs.insert(Arc::clone(&shared));
        shared
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
