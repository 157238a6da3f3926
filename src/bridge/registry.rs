use std::collections::HashMap;

use super::request::ActionMap;

/// Identifies one `notify` submission for a given identifier
pub type Generation = u64;

/// Identifiers believed active in the OS service, and their action maps.
///
/// Every key of `actions` is also in `tracked`.
#[derive(Debug, Default)]
pub struct Registry {
    tracked: HashMap<String, Generation>,
    actions: HashMap<String, ActionMap>,
    next_generation: Generation,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking `identifier`, replacing any action map it had.
    ///
    /// Returns the generation of this submission.
    pub fn track(&mut self, identifier: &str, actions: Option<ActionMap>) -> Generation {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.tracked.insert(identifier.to_string(), generation);
        match actions {
            Some(map) => {
                self.actions.insert(identifier.to_string(), map);
            }
            None => {
                self.actions.remove(identifier);
            }
        }
        generation
    }

    /// Forget `identifier`; returns whether it was tracked
    pub fn untrack(&mut self, identifier: &str) -> bool {
        self.actions.remove(identifier);
        self.tracked.remove(identifier).is_some()
    }

    /// Forget `identifier` only if `generation` is still its latest submission
    pub fn untrack_generation(&mut self, identifier: &str, generation: Generation) -> bool {
        if self.tracked.get(identifier) == Some(&generation) {
            self.untrack(identifier)
        } else {
            false
        }
    }

    /// Remove and return the action map, leaving tracking untouched
    pub fn take_actions(&mut self, identifier: &str) -> Option<ActionMap> {
        self.actions.remove(identifier)
    }

    pub fn is_tracked(&self, identifier: &str) -> bool {
        self.tracked.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }
}
