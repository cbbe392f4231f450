//! Calculation of nullable symbols and first sets.

use crate::{
    bitset::TerminalSet,
    grammar::{Grammar, NonterminalID, SymbolID},
    util::{display_fn, get_two_mut},
};
use bit_set::BitSet;
use std::fmt;

#[derive(Debug)]
pub struct FirstSets {
    /// Nonterminals deriving the empty string.
    nullables: BitSet,
    /// Nonterminals from which an epsilon production is reachable through
    /// the leftmost symbols. Drives the epsilon-closure of states.
    empties: BitSet,
    first: Vec<TerminalSet>,
}

impl FirstSets {
    #[tracing::instrument(skip_all)]
    pub fn new(g: &Grammar) -> Self {
        let mut sets = Self {
            nullables: BitSet::with_capacity(g.nonterminals.len()),
            empties: BitSet::with_capacity(g.nonterminals.len()),
            first: vec![TerminalSet::new(g.terminals.len()); g.nonterminals.len()],
        };

        let mut passes = 0;
        while sets.propagate_empties(g) {
            passes += 1;
        }
        while sets.propagate_first(g) {
            passes += 1;
        }
        tracing::trace!("first sets converged after {} passes", passes);

        sets
    }

    /// Run one pass of the epsilon-closure flag propagation, returning
    /// whether any flag was newly set.
    pub fn propagate_empties(&mut self, g: &Grammar) -> bool {
        let mut changed = false;
        for production in g.productions.values() {
            let left = production.left().index();
            let marked = match production.right().first() {
                None => true,
                Some(SymbolID::N(n)) => self.empties.contains(n.index()),
                Some(SymbolID::T(..)) => false,
            };
            if marked && self.empties.insert(left) {
                changed = true;
            }
        }
        changed
    }

    /// Run one pass over all productions updating the nullable flags and
    /// the first sets, returning whether anything grew.
    pub fn propagate_first(&mut self, g: &Grammar) -> bool {
        let mut changed = false;
        'productions: for production in g.productions.values() {
            let h = production.left().index();
            for symbol in production.right() {
                match *symbol {
                    SymbolID::T(t) => {
                        changed |= self.first[h].insert(t);
                        continue 'productions;
                    }
                    SymbolID::N(n) => {
                        if n.index() != h {
                            let (first_h, first_n) = get_two_mut(&mut self.first, h, n.index());
                            changed |= first_h.union_with(first_n);
                        }
                        if !self.nullables.contains(n.index()) {
                            continue 'productions;
                        }
                    }
                }
            }
            changed |= self.nullables.insert(h);
        }
        changed
    }

    pub fn is_nullable(&self, n: NonterminalID) -> bool {
        self.nullables.contains(n.index())
    }

    /// Whether the epsilon-closure of an item before `n` adds epsilon items.
    pub fn has_empty(&self, n: NonterminalID) -> bool {
        self.empties.contains(n.index())
    }

    pub fn first(&self, n: NonterminalID) -> &TerminalSet {
        &self.first[n.index()]
    }

    /// Add `First(symbols)` into `set`.
    pub fn first_of(&self, symbols: &[SymbolID], set: &mut TerminalSet) {
        for symbol in symbols {
            match *symbol {
                SymbolID::T(t) => {
                    set.insert(t);
                    return;
                }
                SymbolID::N(n) => {
                    set.union_with(self.first(n));
                    if !self.is_nullable(n) {
                        return;
                    }
                }
            }
        }
    }

    /// Whether every symbol of `symbols` derives the empty string.
    pub fn is_nullable_seq(&self, symbols: &[SymbolID]) -> bool {
        symbols
            .iter()
            .all(|symbol| matches!(symbol, SymbolID::N(n) if self.is_nullable(*n)))
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            write!(f, "EMPTY nonterminals:")?;
            for nonterminal in g.nonterminals.values() {
                if self.has_empty(nonterminal.id()) {
                    write!(f, " {}", nonterminal)?;
                }
            }
            writeln!(f)?;

            writeln!(f, "First:")?;
            for nonterminal in g.nonterminals.values() {
                write!(f, "{}\t[ ", nonterminal)?;
                write!(f, "{}", self.first(nonterminal.id()).display(g))?;
                if self.is_nullable(nonterminal.id()) {
                    write!(f, "@ ")?;
                }
                writeln!(f, "]")?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{SymbolID::*, TerminalID};

    #[test]
    fn nullable_and_first() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let a = g.terminal("a", None)?;
            let b = g.terminal("b", None)?;
            let c = g.terminal("c", None)?;
            let s = g.nonterminal("S")?;
            let x = g.nonterminal("X")?;
            let y = g.nonterminal("Y")?;
            g.start_symbol(s)?;
            g.rule(s, [N(x), N(y), T(c)], None)?;
            g.rule(x, [T(a), N(x)], None)?;
            g.rule(x, [], None)?;
            g.rule(y, [T(b)], None)?;
            g.rule(y, [N(x)], None)?;
            ids = Some((a, b, c, s, x, y));
            Ok(())
        })
        .unwrap();
        let (a, b, c, s, x, y) = ids.unwrap();

        let sets = FirstSets::new(&grammar);
        eprintln!("{}", sets.display(&grammar));

        assert!(sets.is_nullable(x));
        assert!(sets.is_nullable(y));
        assert!(!sets.is_nullable(s));
        assert!(!sets.is_nullable(NonterminalID::START));

        assert!(sets.has_empty(x));
        assert!(sets.has_empty(y));
        // S -> X Y c: X is the leftmost symbol and reaches an epsilon production.
        assert!(sets.has_empty(s));

        assert_eq!(sets.first(x).iter().collect::<Vec<_>>(), vec![a]);
        assert_eq!(sets.first(y).iter().collect::<Vec<_>>(), vec![a, b]);
        assert_eq!(sets.first(s).iter().collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(
            sets.first(NonterminalID::START).iter().collect::<Vec<_>>(),
            vec![a, b, c]
        );

        let mut set = TerminalSet::new(grammar.terminals.len());
        sets.first_of(&[N(x), N(y)], &mut set);
        assert!(!set.contains(TerminalID::EOI));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![a, b]);
        assert!(sets.is_nullable_seq(&[N(x), N(y)]));
        assert!(!sets.is_nullable_seq(&[N(x), T(c)]));
        assert!(sets.is_nullable_seq(&[]));
    }

    #[test]
    fn fixpoint_is_idempotent() {
        let grammar = Grammar::define(|g| {
            let lparen = g.terminal("LPAREN", None)?;
            let rparen = g.terminal("RPAREN", None)?;
            let s = g.nonterminal("S")?;
            let l = g.nonterminal("L")?;
            g.rule(s, [T(lparen), N(l), T(rparen)], None)?;
            g.rule(l, [N(l), N(s)], None)?;
            g.rule(l, [], None)?;
            Ok(())
        })
        .unwrap();

        let mut sets = FirstSets::new(&grammar);
        assert!(!sets.propagate_empties(&grammar));
        assert!(!sets.propagate_first(&grammar));
    }
}
