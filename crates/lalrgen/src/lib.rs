//! An LALR(1) parser table generator.
//!
//! ```
//! use lalrgen::grammar::{Grammar, SymbolID::*};
//!
//! let grammar = Grammar::define(|g| {
//!     let a = g.terminal("a", None)?;
//!     let b = g.terminal("b", None)?;
//!     let s = g.nonterminal("S")?;
//!     g.rule(s, [T(a), N(s), T(b)], None)?;
//!     g.rule(s, [], None)?;
//!     Ok(())
//! })
//! .unwrap();
//!
//! let automaton = lalrgen::generate(&grammar).unwrap();
//! println!("{}", automaton.display(&grammar));
//! ```

pub mod action;
pub mod automaton;
pub mod bitset;
pub mod first_sets;
pub mod generator;
pub mod grammar;
pub mod item;
pub mod recognize;
pub mod state;
pub mod types;
pub mod util;

pub use crate::{
    automaton::Automaton,
    generator::{generate, Config, GenerateError, Generator},
    grammar::Grammar,
};
