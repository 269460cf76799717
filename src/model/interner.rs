use std::collections::HashMap;

/// Bidirectional, append-only mapping between string keys and dense ids.
///
/// Ids are handed out in insertion order starting at zero and are never
/// reused or reassigned for the lifetime of the interner.
#[derive(Debug, Clone, Default)]
pub struct IdInterner {
    keys: Vec<String>,
    ids: HashMap<String, u32>,
}

impl IdInterner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the id for `key`, allocating the next one if it is new.
    pub fn intern(&mut self, key: &str) -> u32 {
        if let Some(&id) = self.ids.get(key) {
            return id;
        }
        let id = self.keys.len() as u32;
        self.keys.push(key.to_string());
        self.ids.insert(key.to_string(), id);
        id
    }

    /// Look up an existing id without allocating
    pub fn get(&self, key: &str) -> Option<u32> {
        self.ids.get(key).copied()
    }

    /// Reverse lookup: the key an id was allocated for
    pub fn key(&self, id: u32) -> Option<&str> {
        self.keys.get(id as usize).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
