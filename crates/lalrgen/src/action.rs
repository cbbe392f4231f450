//! Reduce entries and conflict records.

use crate::{
    automaton::fmt_label,
    grammar::{Grammar, ProductionID, TerminalID},
    state::StateID,
    util::display_fn,
};
use std::fmt;

/// A reduce entry of a state.
///
/// `production` is `None` for an explicit error action and
/// `Some(ProductionID::ACCEPT)` for acceptance. The derived ordering of
/// `Option` agrees with the numeric encoding `-1 < 0 < k`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Reduce {
    /// The triggering terminal, `None` for the default entry.
    pub symbol: Option<TerminalID>,
    pub production: Option<ProductionID>,
}

impl Reduce {
    pub const fn new(symbol: Option<TerminalID>, production: Option<ProductionID>) -> Self {
        Self { symbol, production }
    }

    pub fn is_default(&self) -> bool {
        self.symbol.is_none()
    }

    pub fn is_accept(&self) -> bool {
        self.production == Some(ProductionID::ACCEPT)
    }

    pub fn is_error(&self) -> bool {
        self.production.is_none()
    }

    // `"\ta\t\treduce (2)"`, `"\t.\t\terror"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            match self.symbol {
                Some(t) => fmt_label(g.terminal(t).name(), f)?,
                None => fmt_label(".", f)?,
            }
            match self.production {
                None => f.write_str("error"),
                Some(..) if self.is_accept() => f.write_str("accept"),
                Some(p) => write!(f, "reduce ({})", p),
            }
        })
    }
}

/// A conflict detected while filling the reduce entries of a state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Conflict {
    /// The shift was kept over the reduction.
    ShiftReduce {
        shift: StateID,
        production: ProductionID,
        symbol: TerminalID,
    },
    /// The lower numbered production was kept.
    ReduceReduce {
        first: Option<ProductionID>,
        second: ProductionID,
        symbol: TerminalID,
    },
}

impl Conflict {
    pub fn symbol(&self) -> TerminalID {
        match self {
            Self::ShiftReduce { symbol, .. } | Self::ReduceReduce { symbol, .. } => *symbol,
        }
    }

    pub fn is_shift_reduce(&self) -> bool {
        matches!(self, Self::ShiftReduce { .. })
    }

    pub(crate) fn renumber(&mut self, new_ids: &[StateID]) {
        if let Self::ShiftReduce { shift, .. } = self {
            *shift = new_ids[shift.index()];
        }
    }

    // `"3: shift/reduce conflict (shift 5, reduce 2) on '+'"`
    pub fn display<'g>(&'g self, state: StateID, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| match self {
            Self::ShiftReduce {
                shift,
                production,
                symbol,
            } => write!(
                f,
                "{}: shift/reduce conflict (shift {}, reduce {}) on {}",
                state,
                shift,
                production,
                g.terminal(*symbol)
            ),
            Self::ReduceReduce {
                first,
                second,
                symbol,
            } => {
                write!(f, "{}: reduce/reduce conflict (reduce ", state)?;
                match first {
                    Some(first) => write!(f, "{}", first)?,
                    None => f.write_str("-1")?,
                }
                write!(f, ", reduce {}) on {}", second, g.terminal(*symbol))
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolID::*;

    #[test]
    fn reduce_entry_lines() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let a = g.terminal("a", None)?;
            let long = g.terminal("LONG_NAME", None)?;
            let s = g.nonterminal("S")?;
            let p = g.rule(s, [T(a)], None)?;
            ids = Some((a, long, p));
            Ok(())
        })
        .unwrap();
        let (a, long, p) = ids.unwrap();

        let reduce = Reduce::new(Some(a), Some(p));
        assert!(!reduce.is_accept() && !reduce.is_error() && !reduce.is_default());
        assert_eq!(reduce.display(&grammar).to_string(), "\ta\t\treduce (1)");

        let accept = Reduce::new(Some(TerminalID::EOI), Some(ProductionID::ACCEPT));
        assert!(accept.is_accept());
        assert_eq!(
            accept.display(&grammar).to_string(),
            format!("\t{}\t\taccept", grammar.terminal(TerminalID::EOI))
        );

        let error = Reduce::new(Some(long), None);
        assert!(error.is_error());
        assert_eq!(error.display(&grammar).to_string(), "\tLONG_NAME\terror");

        let default = Reduce::new(None, Some(p));
        assert!(default.is_default());
        assert_eq!(default.display(&grammar).to_string(), "\t.\t\treduce (1)");
    }
}
