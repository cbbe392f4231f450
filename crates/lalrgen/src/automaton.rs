//! The finished LALR(1) automaton.

use crate::{
    action::Conflict,
    bitset::TerminalSet,
    grammar::{Grammar, ProductionID, SymbolID},
    state::{Edge, LookID, State, StateID},
    util::display_fn,
};
use std::fmt;

#[derive(Debug)]
pub struct Automaton {
    pub(crate) states: Vec<State>,
    pub(crate) lookaheads: Vec<TerminalSet>,
    pub(crate) non_leaf_states: usize,
    pub(crate) statistics: Statistics,
    pub(crate) never_reduced: Vec<ProductionID>,
}

impl Automaton {
    /// The states in their final order. The index of each state equals its number.
    pub fn states(&self) -> &[State] {
        &self.states[..]
    }

    pub fn state(&self, id: StateID) -> &State {
        &self.states[id.index()]
    }

    pub fn lookahead(&self, id: LookID) -> &TerminalSet {
        &self.lookaheads[id.index()]
    }

    /// One past the last state that has a transition or an explicit reduce entry.
    pub fn non_leaf_states(&self) -> usize {
        self.non_leaf_states
    }

    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Productions that no state ever reduces.
    pub fn never_reduced(&self) -> &[ProductionID] {
        &self.never_reduced[..]
    }

    /// All conflict records paired with the state that reported them.
    pub fn conflicts(&self) -> impl Iterator<Item = (StateID, &Conflict)> + '_ {
        self.states
            .iter()
            .flat_map(|state| state.conflicts().iter().map(move |c| (state.number(), c)))
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            for state in &self.states {
                self.fmt_state(state, g, f)?;
            }
            Ok(())
        })
    }

    fn fmt_state(&self, state: &State, g: &Grammar, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "state {}", state.number())?;
        for conflict in state.conflicts() {
            writeln!(f, "{}", conflict.display(state.number(), g))?;
        }
        for x in state.items() {
            writeln!(f, "\t{}", x.item.display(g))?;
        }
        writeln!(f)?;

        let mut shifts = state.shifts().iter().peekable();
        let mut reduces = state.reduces().iter().peekable();
        loop {
            let shift_first = match (shifts.peek(), reduces.peek()) {
                (None, None) => break,
                (Some(..), None) => true,
                (None, Some(..)) => false,
                (Some(shift), Some(reduce)) => match reduce.symbol {
                    Some(t) => shift.symbol < SymbolID::T(t),
                    None => true,
                },
            };
            if shift_first {
                if let Some(edge) = shifts.next() {
                    self.fmt_shift(edge, g, f)?;
                }
            } else if let Some(reduce) = reduces.next() {
                writeln!(f, "{}", reduce.display(g))?;
            }
        }
        writeln!(f)
    }

    fn fmt_shift(&self, edge: &Edge, g: &Grammar, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_label(&edge.symbol.display(g).to_string(), f)?;
        let verb = if edge.symbol.is_terminal() {
            "shift"
        } else {
            "goto"
        };
        write!(f, "{} {}", verb, edge.target)?;
        let target = self.state(edge.target);
        if target.is_reduce_only() {
            f.write_str(" and reduce (")?;
            fmt_production(target.default_reduce(), f)?;
            f.write_str(")")?;
        }
        writeln!(f)
    }
}

pub(crate) fn fmt_label(name: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if name.len() < 8 {
        write!(f, "\t{}\t\t", name)
    } else {
        write!(f, "\t{}\t", name)
    }
}

fn fmt_production(production: Option<ProductionID>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match production {
        Some(p) => write!(f, "{}", p),
        None => f.write_str("-1"),
    }
}

/// Size counters collected while generating an automaton.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[non_exhaustive]
pub struct Statistics {
    pub terminals: usize,
    pub nonterminals: usize,
    pub productions: usize,
    pub states: usize,
    pub non_leaf_states: usize,
    pub shift_reduce_conflicts: usize,
    pub reduce_reduce_conflicts: usize,
    /// Lookahead sets allocated, including the ones shared among items.
    pub lookahead_sets: usize,
    /// Shift and goto edges recorded during kernel construction.
    pub shift_actions: usize,
    /// Reduce entries, the default ones included.
    pub reduce_actions: usize,
}

impl Statistics {
    pub fn display<'a>(&'a self, label: &'a str) -> impl fmt::Display + 'a {
        display_fn(move |f| {
            writeln!(f, "Statistics for {}:", label)?;
            writeln!(f, "\t{} terminal symbols", self.terminals)?;
            writeln!(f, "\t{} nonterminal symbols", self.nonterminals)?;
            writeln!(f, "\t{} productions", self.productions)?;
            writeln!(f, "\t{} states", self.states)?;
            writeln!(f, "\t{} non leaf states", self.non_leaf_states)?;
            writeln!(
                f,
                "\t{} shift/reduce, {} reduce/reduce conflicts",
                self.shift_reduce_conflicts, self.reduce_reduce_conflicts
            )?;
            writeln!(f, "\t{} lookahead sets used", self.lookahead_sets)?;
            writeln!(
                f,
                "\t{}+{}={} action entries",
                self.shift_actions,
                self.reduce_actions,
                self.shift_actions + self.reduce_actions
            )
        })
    }
}
