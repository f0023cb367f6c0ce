//! Interned statement ids and the static bitset

use std::collections::HashMap;

/// Dense statement id
pub type StatementId = u32;

/// String → id interner. Ids are assigned in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct StatementArena {
    ids: HashMap<String, StatementId>,
    names: Vec<String>,
}

impl StatementArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, statement: &str) -> StatementId {
        if let Some(&id) = self.ids.get(statement) {
            return id;
        }
        let id = self.names.len() as StatementId;
        self.names.push(statement.to_string());
        self.ids.insert(statement.to_string(), id);
        id
    }

    pub fn get(&self, statement: &str) -> Option<StatementId> {
        self.ids.get(statement).copied()
    }

    pub fn resolve(&self, id: StatementId) -> Option<&str> {
        self.names.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Growable bitset over statement ids
#[derive(Debug, Clone, Default)]
pub struct StaticSet {
    words: Vec<u64>,
}

impl StaticSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: StatementId) {
        let (word, bit) = Self::locate(id);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        self.words[word] |= 1u64 << bit;
    }

    pub fn contains(&self, id: StatementId) -> bool {
        let (word, bit) = Self::locate(id);
        self.words.get(word).is_some_and(|w| w & (1u64 << bit) != 0)
    }

    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    fn locate(id: StatementId) -> (usize, u32) {
        ((id / 64) as usize, id % 64)
    }
}
