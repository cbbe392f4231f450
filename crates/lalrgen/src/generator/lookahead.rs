//! LALR(1) lookahead propagation.

use super::{DebugSink, GenerateError, Tables};
use crate::{
    bitset::TerminalSet,
    first_sets::FirstSets,
    grammar::{Grammar, SymbolID, TerminalID},
    state::{LookID, State, StateID},
    util::get_two_mut,
};

impl Tables<'_> {
    /// Propagate lookaheads over the whole automaton until no set grows.
    #[tracing::instrument(skip_all)]
    pub(super) fn compute_lookaheads(
        &mut self,
        sink: &mut DebugSink<'_>,
    ) -> Result<(), GenerateError> {
        let Self {
            g,
            first_sets,
            states,
            looks,
            follow,
            ..
        } = self;
        let g = *g;
        let states: &[State] = states;

        let accept = states[StateID::START.index()].items()[0].look;
        looks[accept.index()].insert(TerminalID::EOI);

        let mut passes = 0;
        loop {
            passes += 1;
            let mut changed = false;
            for (p, state) in states.iter().enumerate() {
                compute_follow(g, first_sets, states, looks, follow, state);

                // Shift the lookaheads along with the items.
                for x in state.items() {
                    let Some(symbol) = x.item.symbol_at(g) else {
                        continue;
                    };
                    let target = state.shift(symbol).ok_or_else(|| {
                        GenerateError::MissingTransition {
                            state: StateID::from_raw(p as u32),
                            symbol: symbol.display(g).to_string(),
                        }
                    })?;
                    let advanced = x.item.advance();
                    let y = states[target.index()]
                        .items()
                        .iter()
                        .find(|y| y.item == advanced)
                        .ok_or_else(|| GenerateError::MissingItem {
                            state: target,
                            item: advanced.display(g).to_string(),
                        })?;
                    changed |= union_looks(looks, y.look, x.look);
                }

                // Kernel items introduced by closure inherit the FOLLOW of their left context.
                for edge in state.shifts() {
                    for y in states[edge.target.index()].items() {
                        if let Some(left) = y.left {
                            changed |= looks[y.look.index()].union_with(&follow[left.index()]);
                        }
                    }
                }

                for x in state.items() {
                    if x.item.is_head() && x.item.is_tail(g) {
                        let left = g.production(x.item.production).left();
                        looks[x.look.index()].union_with(&follow[left.index()]);
                    }
                }
            }
            if !changed {
                break;
            }
        }
        tracing::trace!("lookaheads converged after {} passes", passes);

        for (p, state) in states.iter().enumerate() {
            writeln!(sink, "lookaheads of {:?}:", StateID::from_raw(p as u32))?;
            for x in state.items() {
                writeln!(sink, "\t{}", x.item.display(g))?;
                writeln!(sink, "\t\t[ {}]", looks[x.look.index()].display(g))?;
            }
        }

        Ok(())
    }
}

fn union_looks(looks: &mut [TerminalSet], dst: LookID, src: LookID) -> bool {
    if dst == src {
        return false;
    }
    let (dst, src) = get_two_mut(looks, dst.index(), src.index());
    dst.union_with(src)
}

/// Compute the FOLLOW sets of the nonterminals `state` has gotos on, as seen
/// from within `state`.
fn compute_follow(
    g: &Grammar,
    first_sets: &FirstSets,
    states: &[State],
    looks: &[TerminalSet],
    follow: &mut [TerminalSet],
    state: &State,
) {
    let gotos = move || {
        state.shifts().iter().filter_map(move |edge| match edge.symbol {
            SymbolID::N(n) => Some((n, &states[edge.target.index()])),
            SymbolID::T(..) => None,
        })
    };

    for (n, target) in gotos() {
        let set = &mut follow[n.index()];
        set.clear();
        for y in target.kernel() {
            first_sets.first_of(y.item.rest(g), set);
        }
    }

    for x in state.items() {
        let rest = x.item.rest(g);
        if let Some((&SymbolID::N(n), after)) = rest.split_first() {
            if first_sets.is_nullable_seq(after) {
                follow[n.index()].union_with(&looks[x.look.index()]);
            }
        }
    }

    loop {
        let mut changed = false;
        for (n, target) in gotos() {
            for y in target.kernel() {
                let Some(left) = y.left else {
                    continue;
                };
                if left != n && first_sets.is_nullable_seq(y.item.rest(g)) {
                    let (dst, src) = get_two_mut(follow, n.index(), left.index());
                    changed |= dst.union_with(src);
                }
            }
        }
        if !changed {
            break;
        }
    }
}
