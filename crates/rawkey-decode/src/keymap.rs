//! Caller-supplied code → value tables.
//!
//! A [`KeyMap`] turns the decoder into a filter: codes present in the map
//! come out as the mapped value, codes absent from it are dropped without
//! a trace. The map is owned by the caller and only borrowed by
//! [`Decoder::mapped`](crate::decoder::Decoder::mapped), so it stays
//! read-only for the whole session.

use std::collections::HashMap;

use crate::code::Code;

/// Table from composite code to an arbitrary value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap<T> {
    entries: HashMap<Code, T>,
}

impl<T> KeyMap<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Map `code` to `value`, returning the value it replaced.
    pub fn insert(&mut self, code: impl Into<Code>, value: T) -> Option<T> {
        self.entries.insert(code.into(), value)
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, code: impl Into<Code>, value: T) -> Self {
        self.insert(code, value);
        self
    }

    #[must_use]
    pub fn get(&self, code: Code) -> Option<&T> {
        self.entries.get(&code)
    }

    #[must_use]
    pub fn contains(&self, code: Code) -> bool {
        self.entries.contains_key(&code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All mapped codes, in no particular order.
    pub fn codes(&self) -> impl Iterator<Item = Code> + '_ {
        self.entries.keys().copied()
    }
}

impl<T> Default for KeyMap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(Code, T)> for KeyMap<T> {
    fn from_iter<I: IntoIterator<Item = (Code, T)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<T> Extend<(Code, T)> for KeyMap<T> {
    fn extend<I: IntoIterator<Item = (Code, T)>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}
