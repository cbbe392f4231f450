//! LR(0) items.

use crate::{
    grammar::{Grammar, ProductionID, SymbolID},
    util::display_fn,
};
use std::fmt;

/// A production with a marker position, a.k.a. LR item core.
///
/// `index` counts the right-hand side symbols in front of the marker.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub production: ProductionID,
    pub index: u16,
}

impl Item {
    pub const fn new(production: ProductionID, index: u16) -> Self {
        Self { production, index }
    }

    /// Move the marker over the next symbol.
    pub fn advance(self) -> Self {
        Self {
            index: self.index + 1,
            ..self
        }
    }

    /// The symbols following the marker.
    pub fn rest<'g>(&self, g: &'g Grammar) -> &'g [SymbolID] {
        let right = g.production(self.production).right();
        right.get(self.index as usize..).unwrap_or(&[])
    }

    /// The symbol to be shifted next, if any.
    pub fn symbol_at(&self, g: &Grammar) -> Option<SymbolID> {
        self.rest(g).first().copied()
    }

    /// The symbol that the marker has just been moved over, if any.
    pub fn symbol_before(&self, g: &Grammar) -> Option<SymbolID> {
        let index = (self.index as usize).checked_sub(1)?;
        g.production(self.production).right().get(index).copied()
    }

    /// Whether the marker is at the beginning of the production.
    pub fn is_head(&self) -> bool {
        self.index == 0
    }

    /// Whether the marker has reached the end of the production.
    pub fn is_tail(&self, g: &Grammar) -> bool {
        self.index as usize >= g.production(self.production).right().len()
    }

    // `"E -> E . '+' E"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| {
            let production = g.production(self.production);
            write!(f, "{} ->", g.nonterminal(production.left()))?;
            for (i, symbol) in production.right().iter().enumerate() {
                if i == self.index as usize {
                    f.write_str(" .")?;
                }
                write!(f, " {}", symbol.display(g))?;
            }
            if self.is_tail(g) {
                f.write_str(" .")?;
            }
            write!(f, "  ({})", production.id())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolID::*;

    #[test]
    fn marker_accessors() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let plus = g.terminal("'+'", None)?;
            let e = g.nonterminal("E")?;
            let p = g.rule(e, [N(e), T(plus), N(e)], None)?;
            let empty = g.rule(e, [], None)?;
            ids = Some((plus, e, p, empty));
            Ok(())
        })
        .unwrap();
        let (plus, e, p, empty) = ids.unwrap();

        let head = Item::new(p, 0);
        assert!(head.is_head());
        assert!(!head.is_tail(&grammar));
        assert_eq!(head.symbol_at(&grammar), Some(N(e)));
        assert_eq!(head.symbol_before(&grammar), None);

        let middle = head.advance();
        assert_eq!(middle.symbol_at(&grammar), Some(T(plus)));
        assert_eq!(middle.symbol_before(&grammar), Some(N(e)));
        assert_eq!(middle.display(&grammar).to_string(), "E -> E . '+' E  (1)");

        let tail = middle.advance().advance();
        assert!(tail.is_tail(&grammar));
        assert_eq!(tail.symbol_at(&grammar), None);
        assert!(tail.rest(&grammar).is_empty());
        assert_eq!(tail.display(&grammar).to_string(), "E -> E '+' E .  (1)");

        let epsilon = Item::new(empty, 0);
        assert!(epsilon.is_head() && epsilon.is_tail(&grammar));
        assert_eq!(epsilon.display(&grammar).to_string(), "E -> .  (2)");

        assert_eq!(Item::new(p, 1), middle);
        assert_ne!(Item::new(p, 2), middle);
    }
}
