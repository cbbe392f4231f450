//! States of the LALR(1) automaton.

use crate::{
    action::{Conflict, Reduce},
    grammar::{NonterminalID, ProductionID, SymbolID, TerminalID},
    item::Item,
};
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateID(u32);

impl fmt::Debug for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S#{:03}", self.0)
    }
}

impl fmt::Display for StateID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl StateID {
    /// The initial state. It keeps this number after reordering.
    pub const START: Self = Self::from_raw(0);

    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn into_raw(self) -> u32 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Identifier of a lookahead set.
///
/// Items of one state reached through the same left context share a single
/// lookahead set, so a union into one of them is observed by all of them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LookID(u32);

impl LookID {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

/// An element of the item set of a state.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StateItem {
    /// The nonterminal whose closure introduced this item, `None` for items
    /// shifted from a kernel item and for epsilon items.
    pub left: Option<NonterminalID>,
    pub look: LookID,
    pub item: Item,
}

/// A shift (terminal) or goto (nonterminal) transition.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    pub symbol: SymbolID,
    pub target: StateID,
}

#[derive(Debug, Clone)]
pub struct State {
    pub(crate) number: StateID,
    pub(crate) through: Option<SymbolID>,
    pub(crate) items: Vec<StateItem>,
    pub(crate) kernel_len: usize,
    pub(crate) shifts: Vec<Edge>,
    pub(crate) reduces: Vec<Reduce>,
    pub(crate) conflicts: Vec<Conflict>,
}

impl State {
    pub(crate) fn new(
        number: StateID,
        through: Option<SymbolID>,
        items: Vec<StateItem>,
        kernel_len: usize,
    ) -> Self {
        Self {
            number,
            through,
            items,
            kernel_len,
            shifts: vec![],
            reduces: vec![],
            conflicts: vec![],
        }
    }

    pub fn number(&self) -> StateID {
        self.number
    }

    /// The symbol whose transition enters this state, `None` for the initial state.
    pub fn through(&self) -> Option<SymbolID> {
        self.through
    }

    /// The kernel items followed by the epsilon items added by closure.
    pub fn items(&self) -> &[StateItem] {
        &self.items[..]
    }

    /// The items that identify this state among the states entered through
    /// the same symbol.
    pub fn kernel(&self) -> &[StateItem] {
        &self.items[..self.kernel_len]
    }

    /// Shift and goto edges, ordered by symbol.
    pub fn shifts(&self) -> &[Edge] {
        &self.shifts[..]
    }

    /// Reduce entries ordered by terminal, with the default entry last.
    pub fn reduces(&self) -> &[Reduce] {
        &self.reduces[..]
    }

    /// The explicit reduce entries without the trailing default entry.
    pub fn explicit_reduces(&self) -> &[Reduce] {
        match self.reduces.split_last() {
            Some((last, rest)) if last.is_default() => rest,
            _ => &self.reduces[..],
        }
    }

    /// The production reduced when no other action matches, `None` for an error.
    pub fn default_reduce(&self) -> Option<ProductionID> {
        self.reduces
            .last()
            .filter(|r| r.is_default())
            .and_then(|r| r.production)
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts[..]
    }

    pub fn shift(&self, symbol: SymbolID) -> Option<StateID> {
        self.shifts
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.target)
    }

    /// The explicit reduce entry on `symbol`, if any.
    pub fn reduce_on(&self, symbol: TerminalID) -> Option<&Reduce> {
        self.explicit_reduces()
            .iter()
            .find(|r| r.symbol == Some(symbol))
    }

    /// Whether this state does nothing but perform its default reduction.
    pub fn is_reduce_only(&self) -> bool {
        self.shifts.is_empty() && self.explicit_reduces().is_empty()
    }

    /// The number of actions keyed on terminals: shifts plus explicit reduces.
    pub fn terminal_actions(&self) -> usize {
        self.shifts.iter().filter(|e| e.symbol.is_terminal()).count()
            + self.explicit_reduces().len()
    }

    /// The number of all actions: shifts, gotos and explicit reduces.
    pub fn total_actions(&self) -> usize {
        self.shifts.len() + self.explicit_reduces().len()
    }
}
