//! Cross-session memory

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Who was present at the end of the previous summary, used to announce arrivals
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySnapshot {
    pub known_people_present: BTreeSet<String>,
}

impl MemorySnapshot {
    /// Names in `current` that were not present last time, in order
    pub fn arrivals<'a>(&self, current: &'a BTreeSet<String>) -> Vec<&'a str> {
        current
            .iter()
            .filter(|name| !self.known_people_present.contains(*name))
            .map(String::as_str)
            .collect()
    }

    pub fn replace_people(&mut self, current: BTreeSet<String>) {
        self.known_people_present = current;
    }
}
