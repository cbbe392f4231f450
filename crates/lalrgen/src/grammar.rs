//! Grammar types.

use crate::{types::Map, util::display_fn};
use std::{borrow::Cow, fmt};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TerminalID {
    raw: u16,
}

impl TerminalID {
    /// Reserved symbol used as a terminal symbol that means the end of input.
    pub const EOI: Self = Self::from_raw(0);

    /// Reserved symbol used as an error token.
    pub const ERROR: Self = Self::from_raw(1);

    const OFFSET: u16 = 2;

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.raw
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.raw as usize
    }
}

#[derive(Debug)]
pub struct Terminal {
    id: TerminalID,
    name: Cow<'static, str>,
    precedence: Option<Precedence>,
}

impl Terminal {
    pub fn id(&self) -> TerminalID {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn precedence(&self) -> Option<Precedence> {
        self.precedence
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NonterminalID {
    raw: u16,
}

impl NonterminalID {
    /// Reserved symbol used as the left-hand side of the augmented production.
    pub const START: Self = Self::from_raw(0);

    const OFFSET: u16 = 1;

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.raw
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.raw as usize
    }
}

#[derive(Debug)]
pub struct Nonterminal {
    id: NonterminalID,
    name: Cow<'static, str>,
    productions: Vec<ProductionID>,
}

impl Nonterminal {
    pub fn id(&self) -> NonterminalID {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The productions whose left-hand side is this symbol, in definition order.
    pub fn productions(&self) -> &[ProductionID] {
        &self.productions[..]
    }
}

impl fmt::Display for Nonterminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A grammar symbol.
///
/// The derived ordering places every terminal before every nonterminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolID {
    T(TerminalID),
    N(NonterminalID),
}

impl SymbolID {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::T(..))
    }

    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(move |f| match self {
            SymbolID::T(t) => write!(f, "{}", g.terminal(*t)),
            SymbolID::N(n) => write!(f, "{}", g.nonterminal(*n)),
        })
    }
}

impl From<TerminalID> for SymbolID {
    fn from(id: TerminalID) -> Self {
        Self::T(id)
    }
}

impl From<NonterminalID> for SymbolID {
    fn from(id: NonterminalID) -> Self {
        Self::N(id)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProductionID {
    raw: u16,
}

impl ProductionID {
    /// The augmented production `$start -> S`. Reducing it accepts the input.
    pub const ACCEPT: Self = Self::from_raw(0);

    const OFFSET: u16 = 1;

    #[inline]
    pub const fn from_raw(raw: u16) -> Self {
        Self { raw }
    }

    #[inline]
    pub const fn into_raw(self) -> u16 {
        self.raw
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.raw as usize
    }
}

impl fmt::Display for ProductionID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// The type that represents a production rule in grammar.
#[derive(Debug)]
pub struct Production {
    id: ProductionID,
    left: NonterminalID,
    right: Vec<SymbolID>,
    precedence: Option<Precedence>,
}

impl Production {
    pub fn id(&self) -> ProductionID {
        self.id
    }

    /// Return the left-hand side of this production.
    pub fn left(&self) -> NonterminalID {
        self.left
    }

    /// Return the right-hand side of this production.
    pub fn right(&self) -> &[SymbolID] {
        &self.right[..]
    }

    /// Whether this is an epsilon production.
    pub fn is_empty(&self) -> bool {
        self.right.is_empty()
    }

    /// The precedence used for resolving shift/reduce conflicts, either the
    /// explicit one or the one inherited from the last terminal.
    pub fn precedence(&self) -> Option<Precedence> {
        self.precedence
    }

    // `"LHS -> R1 R2 R3"`
    pub fn display<'g>(&'g self, g: &'g Grammar) -> impl fmt::Display + 'g {
        display_fn(|f| {
            write!(f, "{} ->", g.nonterminal(self.left))?;
            if self.right.is_empty() {
                return f.write_str(" ε");
            }
            for symbol in &self.right {
                write!(f, " {}", symbol.display(g))?;
            }
            Ok(())
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Precedence {
    pub priority: u16,
    pub assoc: Assoc,
}

impl Precedence {
    pub const fn new(priority: u16, assoc: Assoc) -> Self {
        Self { priority, assoc }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Assoc {
    Left,
    Right,
    Nonassoc,
    /// A precedence level without associativity (`%precedence`).
    ///
    /// Two actions on the same level cannot be ordered.
    Precedence,
}

impl fmt::Display for Assoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
            Self::Nonassoc => write!(f, "nonassoc"),
            Self::Precedence => write!(f, "precedence"),
        }
    }
}

/// The grammar definition used to derive the parser tables.
#[derive(Debug)]
#[non_exhaustive]
pub struct Grammar {
    pub terminals: Map<TerminalID, Terminal>,
    pub nonterminals: Map<NonterminalID, Nonterminal>,
    pub productions: Map<ProductionID, Production>,
    pub start_symbol: NonterminalID,
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "## terminals:")?;
        for terminal in self.terminals.values() {
            write!(f, "{}", terminal)?;
            if let Some(prec) = terminal.precedence() {
                write!(f, " (priority={}, assoc={})", prec.priority, prec.assoc)?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## nonterminals:")?;
        for nonterminal in self.nonterminals.values() {
            write!(f, "{}", nonterminal)?;
            if nonterminal.id() == self.start_symbol {
                write!(f, " (start)")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "\n## productions:")?;
        for production in self.productions.values() {
            write!(f, "({}) {}", production.id(), production.display(self))?;
            if let Some(prec) = production.precedence() {
                write!(f, " (priority={}, assoc={})", prec.priority, prec.assoc)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

impl Grammar {
    /// Define a grammar using the specified function.
    pub fn define<F>(f: F) -> Result<Self, GrammarDefError>
    where
        F: FnOnce(&mut GrammarDef) -> Result<(), GrammarDefError>,
    {
        let mut def = GrammarDef {
            terminals: Map::default(),
            nonterminals: Map::default(),
            productions: vec![],
            start: None,
            next_terminal_id: TerminalID::OFFSET,
            next_nonterminal_id: NonterminalID::OFFSET,
        };

        def.terminals.insert(
            TerminalID::EOI,
            Terminal {
                id: TerminalID::EOI,
                name: "$end".into(),
                precedence: None,
            },
        );
        def.terminals.insert(
            TerminalID::ERROR,
            Terminal {
                id: TerminalID::ERROR,
                name: "error".into(),
                precedence: None,
            },
        );

        def.nonterminals.insert(
            NonterminalID::START,
            Nonterminal {
                id: NonterminalID::START,
                name: "$start".into(),
                productions: vec![],
            },
        );

        f(&mut def)?;

        def.end()
    }

    pub fn terminal(&self, id: TerminalID) -> &Terminal {
        &self.terminals[id.index()]
    }

    pub fn nonterminal(&self, id: NonterminalID) -> &Nonterminal {
        &self.nonterminals[id.index()]
    }

    pub fn production(&self, id: ProductionID) -> &Production {
        &self.productions[id.index()]
    }
}

/// The contextural values for building a `Grammar`.
#[derive(Debug)]
pub struct GrammarDef {
    terminals: Map<TerminalID, Terminal>,
    nonterminals: Map<NonterminalID, Nonterminal>,
    productions: Vec<Production>,
    start: Option<NonterminalID>,
    next_terminal_id: u16,
    next_nonterminal_id: u16,
}

impl GrammarDef {
    /// Declare a terminal symbol used in this grammar.
    pub fn terminal(
        &mut self,
        name: &str,
        precedence: Option<Precedence>,
    ) -> Result<TerminalID, GrammarDefError> {
        if self.terminals.values().any(|t| t.name() == name) {
            return Err(GrammarDefError::DuplicateTerminal { name: name.into() });
        }

        let id = TerminalID::from_raw(self.next_terminal_id);
        self.next_terminal_id = next_raw_id(self.next_terminal_id, "terminals")?;

        self.terminals.insert(
            id,
            Terminal {
                id,
                name: name.to_owned().into(),
                precedence,
            },
        );

        Ok(id)
    }

    /// Declare a nonterminal symbol used in this grammar.
    pub fn nonterminal(&mut self, name: &str) -> Result<NonterminalID, GrammarDefError> {
        if self.nonterminals.values().any(|n| n.name() == name) {
            return Err(GrammarDefError::DuplicateNonterminal { name: name.into() });
        }

        let id = NonterminalID::from_raw(self.next_nonterminal_id);
        self.next_nonterminal_id = next_raw_id(self.next_nonterminal_id, "nonterminals")?;

        self.nonterminals.insert(
            id,
            Nonterminal {
                id,
                name: name.to_owned().into(),
                productions: vec![],
            },
        );

        Ok(id)
    }

    /// Specify a production rule into this grammer.
    ///
    /// Without an explicit precedence, the production takes the precedence
    /// of the last terminal in its right-hand side.
    pub fn rule<I>(
        &mut self,
        left: NonterminalID,
        right: I,
        precedence: Option<Precedence>,
    ) -> Result<ProductionID, GrammarDefError>
    where
        I: IntoIterator<Item = SymbolID>,
    {
        let right: Vec<SymbolID> = right.into_iter().collect();

        if left == NonterminalID::START || !self.nonterminals.contains_key(&left) {
            return Err(GrammarDefError::UnknownSymbol);
        }
        for symbol in &right {
            let known = match symbol {
                SymbolID::T(t) => self.terminals.contains_key(t),
                SymbolID::N(n) => *n != NonterminalID::START && self.nonterminals.contains_key(n),
            };
            if !known {
                return Err(GrammarDefError::UnknownSymbol);
            }
        }

        if self
            .productions
            .iter()
            .any(|p| p.left == left && p.right == right)
        {
            return Err(GrammarDefError::DuplicateRule {
                left: self.nonterminals[&left].name().to_owned(),
            });
        }

        let precedence = precedence.or_else(|| {
            right.iter().rev().find_map(|symbol| match symbol {
                SymbolID::T(t) => Some(self.terminals[t].precedence()),
                SymbolID::N(..) => None,
            })?
        });

        let id = production_id(self.productions.len())?;
        self.productions.push(Production {
            id,
            left,
            right,
            precedence,
        });

        Ok(id)
    }

    /// Specify the start symbol for this grammar.
    pub fn start_symbol(&mut self, symbol: NonterminalID) -> Result<(), GrammarDefError> {
        if symbol == NonterminalID::START || !self.nonterminals.contains_key(&symbol) {
            return Err(GrammarDefError::UnknownSymbol);
        }
        self.start.replace(symbol);
        Ok(())
    }

    fn end(mut self) -> Result<Grammar, GrammarDefError> {
        // Fall back to the first declared nonterminal.
        let start = match self.start.take() {
            Some(start) => start,
            None => self
                .nonterminals
                .keys()
                .find(|id| **id != NonterminalID::START)
                .copied()
                .ok_or_else(|| GrammarDefError::from("empty nonterminal symbols"))?,
        };

        let mut productions = Map::default();
        productions.insert(
            ProductionID::ACCEPT,
            Production {
                id: ProductionID::ACCEPT,
                left: NonterminalID::START,
                right: vec![SymbolID::N(start)],
                precedence: None,
            },
        );
        for production in self.productions {
            productions.insert(production.id, production);
        }

        for production in productions.values() {
            self.nonterminals[&production.left]
                .productions
                .push(production.id);
        }
        if let Some(empty) = self.nonterminals.values().find(|n| n.productions.is_empty()) {
            return Err(GrammarDefError::NoProductions {
                name: empty.name().to_owned(),
            });
        }

        Ok(Grammar {
            terminals: self.terminals,
            nonterminals: self.nonterminals,
            productions,
            start_symbol: start,
        })
    }
}

/// The successor of an allocated raw id.
fn next_raw_id(raw: u16, what: &'static str) -> Result<u16, GrammarDefError> {
    raw.checked_add(1).ok_or(GrammarDefError::TooManySymbols { what })
}

/// The id of the production defined after `defined` user productions.
fn production_id(defined: usize) -> Result<ProductionID, GrammarDefError> {
    u16::try_from(defined)
        .ok()
        .and_then(|n| n.checked_add(ProductionID::OFFSET))
        .map(ProductionID::from_raw)
        .ok_or(GrammarDefError::TooManySymbols {
            what: "productions",
        })
}

#[derive(Debug, thiserror::Error)]
pub enum GrammarDefError {
    #[error("the terminal `{name}' has already been declared")]
    DuplicateTerminal { name: String },

    #[error("the nonterminal `{name}' has already been declared")]
    DuplicateNonterminal { name: String },

    #[error("duplicate production rule detected for `{left}'")]
    DuplicateRule { left: String },

    #[error("the nonterminal `{name}' has no production rule")]
    NoProductions { name: String },

    #[error("the symbol is not declared in this grammar")]
    UnknownSymbol,

    #[error("too many {what} to number with 16-bit identifiers")]
    TooManySymbols { what: &'static str },

    #[error("Other error: {}", msg)]
    Other { msg: String },
}

impl From<&str> for GrammarDefError {
    fn from(msg: &str) -> Self {
        Self::Other { msg: msg.into() }
    }
}

impl From<String> for GrammarDefError {
    fn from(msg: String) -> Self {
        Self::Other { msg }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::SymbolID::*;

    #[test]
    fn define_assigns_dense_ids() {
        let grammar = Grammar::define(|g| {
            let plus = g.terminal("PLUS", Some(Precedence::new(1, Assoc::Left)))?;
            let num = g.terminal("NUM", None)?;
            let expr = g.nonterminal("EXPR")?;
            let p1 = g.rule(expr, [N(expr), T(plus), N(expr)], None)?;
            let p2 = g.rule(expr, [T(num)], None)?;
            assert_eq!(p1, ProductionID::from_raw(1));
            assert_eq!(p2, ProductionID::from_raw(2));
            Ok(())
        })
        .unwrap();
        eprintln!("{}", grammar);

        assert_eq!(grammar.terminals.len(), 4);
        assert_eq!(grammar.nonterminals.len(), 2);
        assert_eq!(grammar.productions.len(), 3);

        let accept = grammar.production(ProductionID::ACCEPT);
        assert_eq!(accept.left(), NonterminalID::START);
        assert_eq!(accept.right(), &[N(grammar.start_symbol)]);

        let start = grammar.nonterminal(grammar.start_symbol);
        assert_eq!(
            start.productions(),
            &[ProductionID::from_raw(1), ProductionID::from_raw(2)]
        );
    }

    #[test]
    fn production_inherits_last_terminal_precedence() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let plus = g.terminal("PLUS", Some(Precedence::new(1, Assoc::Left)))?;
            let star = g.terminal("STAR", Some(Precedence::new(2, Assoc::Left)))?;
            let uminus = Precedence::new(3, Assoc::Right);
            let e = g.nonterminal("E")?;
            let p1 = g.rule(e, [N(e), T(plus), N(e), T(star), N(e)], None)?;
            let p2 = g.rule(e, [T(plus), N(e)], Some(uminus))?;
            let p3 = g.rule(e, [N(e)], None)?;
            ids = Some((p1, p2, p3));
            Ok(())
        })
        .unwrap();
        let (p1, p2, p3) = ids.unwrap();

        assert_eq!(
            grammar.production(p1).precedence(),
            Some(Precedence::new(2, Assoc::Left))
        );
        assert_eq!(
            grammar.production(p2).precedence(),
            Some(Precedence::new(3, Assoc::Right))
        );
        assert_eq!(grammar.production(p3).precedence(), None);
    }

    #[test]
    fn rejects_malformed_definitions() {
        let err = Grammar::define(|g| {
            g.terminal("A", None)?;
            g.terminal("A", None)?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::DuplicateTerminal { .. }));

        let err = Grammar::define(|g| {
            let a = g.terminal("A", None)?;
            let s = g.nonterminal("S")?;
            g.rule(s, [T(a)], None)?;
            g.rule(s, [T(a)], None)?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::DuplicateRule { .. }));

        let err = Grammar::define(|g| {
            let a = g.terminal("A", None)?;
            let s = g.nonterminal("S")?;
            let _unused = g.nonterminal("U")?;
            g.rule(s, [T(a)], None)?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::NoProductions { name } if name == "U"));

        let err = Grammar::define(|g| {
            let s = g.nonterminal("S")?;
            g.rule(s, [T(TerminalID::from_raw(42))], None)?;
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, GrammarDefError::UnknownSymbol));

        let err = Grammar::define(|_| Ok(())).unwrap_err();
        assert!(matches!(err, GrammarDefError::Other { .. }));
    }

    #[test]
    fn identifiers_never_wrap_around() {
        assert_eq!(production_id(0).unwrap(), ProductionID::from_raw(1));
        assert_eq!(
            production_id(usize::from(u16::MAX) - 1).unwrap(),
            ProductionID::from_raw(u16::MAX)
        );
        assert!(matches!(
            production_id(usize::from(u16::MAX)),
            Err(GrammarDefError::TooManySymbols { what: "productions" })
        ));
        assert!(matches!(
            production_id(usize::from(u16::MAX) + 1),
            Err(GrammarDefError::TooManySymbols { .. })
        ));

        assert_eq!(next_raw_id(2, "terminals").unwrap(), 3);
        assert!(matches!(
            next_raw_id(u16::MAX, "terminals"),
            Err(GrammarDefError::TooManySymbols { what: "terminals" })
        ));
    }
}
