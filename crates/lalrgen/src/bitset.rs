//! Fixed-universe sets of terminal symbols.

use crate::{
    grammar::{Grammar, TerminalID},
    util::display_fn,
};
use bit_vec::BitVec;
use std::fmt;

/// A set of terminals over a fixed universe, used for FIRST, FOLLOW and
/// lookahead sets.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TerminalSet {
    inner: BitVec,
}

impl TerminalSet {
    /// Create an empty set able to hold `universe` terminals.
    pub fn new(universe: usize) -> Self {
        Self {
            inner: BitVec::from_elem(universe, false),
        }
    }

    pub fn contains(&self, id: TerminalID) -> bool {
        self.inner.get(id.index()).unwrap_or(false)
    }

    /// Add a terminal, returning whether it was newly inserted.
    pub fn insert(&mut self, id: TerminalID) -> bool {
        let added = !self.contains(id);
        self.inner.set(id.index(), true);
        added
    }

    /// Remove a terminal, returning whether it was present.
    pub fn remove(&mut self, id: TerminalID) -> bool {
        let removed = self.contains(id);
        if removed {
            self.inner.set(id.index(), false);
        }
        removed
    }

    /// Union `other` into this set, returning whether any bit changed.
    pub fn union_with(&mut self, other: &Self) -> bool {
        self.inner.or(&other.inner)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.inner.none()
    }

    /// Iterate over the members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = TerminalID> + '_ {
        self.inner
            .iter()
            .enumerate()
            .filter(|(_, bit)| *bit)
            .map(|(raw, _)| TerminalID::from_raw(raw as u16))
    }

    // `"a b c "`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for id in self.iter() {
                write!(f, "{} ", g.terminal(id))?;
            }
            Ok(())
        })
    }
}
