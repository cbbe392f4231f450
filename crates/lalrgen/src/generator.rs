//! The LALR(1) table generator.
//!
//! The pipeline runs in the following order:
//!
//! 1. nullable flags and first sets ([`FirstSets`])
//! 2. LR(0) kernels with state merging and epsilon-closure
//! 3. LALR(1) lookahead propagation
//! 4. reduce entries with conflict resolution, then the final state order

mod kernel;
mod lookahead;
mod reduce;

use crate::{
    automaton::{Automaton, Statistics},
    bitset::TerminalSet,
    first_sets::FirstSets,
    grammar::{Grammar, ProductionID, SymbolID},
    item::Item,
    state::{LookID, State, StateID},
    types::Map,
};
use std::{borrow::Cow, fmt};

/// Options for generating an automaton.
#[derive(Debug, Clone)]
pub struct Config {
    expected_conflicts: usize,
    label: Cow<'static, str>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            expected_conflicts: 0,
            label: "grammar".into(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of shift/reduce conflicts the grammar is known to have.
    ///
    /// The conflict summary is omitted when the actual count matches and
    /// there is no reduce/reduce conflict.
    pub fn expect_conflicts(mut self, n: usize) -> Self {
        self.expected_conflicts = n;
        self
    }

    /// Set the name used to refer to the grammar in diagnostics.
    pub fn label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(
        "production ({production}) and terminal `{terminal}' share a precedence level without associativity"
    )]
    Associativity {
        production: ProductionID,
        terminal: String,
    },

    #[error("{state:?} has no transition on `{symbol}'")]
    MissingTransition { state: StateID, symbol: String },

    #[error("{state:?} has no item `{item}'")]
    MissingItem { state: StateID, item: String },

    #[error("failed to write to the debug sink")]
    Debug(
        #[from]
        #[source]
        fmt::Error,
    ),
}

/// Generate the automaton of the specified grammar with the default options.
pub fn generate(g: &Grammar) -> Result<Automaton, GenerateError> {
    Generator::new(g, &Config::default()).generate()
}

pub struct Generator<'g, 'w> {
    grammar: &'g Grammar,
    config: &'g Config,
    sink: Option<&'w mut dyn fmt::Write>,
}

impl fmt::Debug for Generator<'_, '_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("config", &self.config)
            .field("sink", &self.sink.is_some())
            .finish_non_exhaustive()
    }
}

impl<'g, 'w> Generator<'g, 'w> {
    pub fn new(grammar: &'g Grammar, config: &'g Config) -> Self {
        Self {
            grammar,
            config,
            sink: None,
        }
    }

    /// Write the intermediate dumps, the state listing, the conflict summary
    /// and the statistics into `sink`.
    pub fn debug_sink(mut self, sink: &'w mut dyn fmt::Write) -> Self {
        self.sink = Some(sink);
        self
    }

    #[tracing::instrument(skip_all, fields(label = %self.config.label))]
    pub fn generate(self) -> Result<Automaton, GenerateError> {
        let Self {
            grammar: g,
            config,
            sink,
        } = self;
        let mut sink = DebugSink(sink);

        let first_sets = FirstSets::new(g);
        write!(sink, "{}", first_sets.display(g))?;

        let mut tables = Tables::new(g, first_sets);
        tables.compute_kernels();
        tables.compute_lookaheads(&mut sink)?;
        let never_reduced = tables.fill_reduce(&mut sink)?;
        let non_leaf_states = tables.reorder_states();

        let statistics = Statistics {
            terminals: g.terminals.len(),
            nonterminals: g.nonterminals.len(),
            productions: g.productions.len(),
            states: tables.states.len(),
            non_leaf_states,
            shift_reduce_conflicts: tables.shift_reduce_conflicts,
            reduce_reduce_conflicts: tables.reduce_reduce_conflicts,
            lookahead_sets: tables.looks.len(),
            shift_actions: tables.shift_actions,
            reduce_actions: tables.reduce_actions,
        };
        tracing::debug!(
            "{} states, {} lookahead sets",
            statistics.states,
            statistics.lookahead_sets
        );

        let automaton = Automaton {
            states: tables.states,
            lookaheads: tables.looks,
            non_leaf_states,
            statistics,
            never_reduced,
        };

        write!(sink, "{}", automaton.display(g))?;
        report_conflicts(config, &automaton.statistics, &mut sink)?;
        write!(sink, "\n{}", automaton.statistics.display(&config.label))?;

        Ok(automaton)
    }
}

fn report_conflicts(config: &Config, stats: &Statistics, sink: &mut DebugSink<'_>) -> fmt::Result {
    let sr = stats.shift_reduce_conflicts;
    let rr = stats.reduce_reduce_conflicts;
    if sr == config.expected_conflicts && rr == 0 {
        return Ok(());
    }

    let mut summary = format!("{}: there are", config.label);
    if sr != config.expected_conflicts {
        summary += &format!(" {} shift/reduce", sr);
        if rr != 0 {
            summary += " and";
        }
    }
    if rr != 0 {
        summary += &format!(" {} reduce/reduce", rr);
    }
    summary += " conflicts";

    tracing::warn!("{}", summary);
    writeln!(sink, "{}", summary)
}

/// Optional destination of the human readable dumps.
struct DebugSink<'w>(Option<&'w mut dyn fmt::Write>);

impl DebugSink<'_> {
    fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        match self.0 {
            Some(ref mut w) => w.write_fmt(args),
            None => Ok(()),
        }
    }
}

/// Working data shared by the phases of the generator.
struct Tables<'g> {
    g: &'g Grammar,
    first_sets: FirstSets,
    states: Vec<State>,
    looks: Vec<TerminalSet>,
    /// Kernel sequences of the states entered through each symbol.
    states_through: Map<Option<SymbolID>, Map<Vec<Item>, StateID>>,
    /// State-local FOLLOW sets indexed by nonterminal.
    follow: Vec<TerminalSet>,
    shift_actions: usize,
    reduce_actions: usize,
    shift_reduce_conflicts: usize,
    reduce_reduce_conflicts: usize,
}

impl<'g> Tables<'g> {
    fn new(g: &'g Grammar, first_sets: FirstSets) -> Self {
        Self {
            g,
            first_sets,
            states: vec![],
            looks: vec![],
            states_through: Map::default(),
            follow: vec![TerminalSet::new(g.terminals.len()); g.nonterminals.len()],
            shift_actions: 0,
            reduce_actions: 0,
            shift_reduce_conflicts: 0,
            reduce_reduce_conflicts: 0,
        }
    }

    fn new_look(&mut self) -> LookID {
        let id = LookID::from_raw(self.looks.len() as u32);
        self.looks.push(TerminalSet::new(self.g.terminals.len()));
        id
    }
}
