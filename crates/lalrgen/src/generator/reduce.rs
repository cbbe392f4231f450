//! Reduce entries, conflict resolution and the final state order.

use super::{DebugSink, GenerateError, Tables};
use crate::{
    action::{Conflict, Reduce},
    grammar::{Assoc, Grammar, ProductionID, SymbolID, TerminalID},
    state::{State, StateID},
};
use bit_set::BitSet;
use std::cmp::{Ordering, Reverse};

/// The outcome of comparing a reduction against a shift on one terminal.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    Shift,
    Reduce,
    /// Neither action, the terminal becomes an explicit error.
    Error,
    /// No precedence decides. The shift is kept and a conflict is recorded.
    Conflict,
}

/// Decide between reducing `production` and shifting `terminal`.
pub(crate) fn compare_precedence(
    g: &Grammar,
    production: ProductionID,
    terminal: TerminalID,
) -> Result<Resolution, GenerateError> {
    let reduce_prec = g.production(production).precedence();
    let shift_prec = g.terminal(terminal).precedence();
    let (Some(reduce_prec), Some(shift_prec)) = (reduce_prec, shift_prec) else {
        return Ok(Resolution::Conflict);
    };

    match Ord::cmp(&shift_prec.priority, &reduce_prec.priority) {
        Ordering::Greater => Ok(Resolution::Shift),
        Ordering::Less => Ok(Resolution::Reduce),
        Ordering::Equal => match reduce_prec.assoc {
            Assoc::Left => Ok(Resolution::Reduce),
            Assoc::Right => Ok(Resolution::Shift),
            Assoc::Nonassoc => Ok(Resolution::Error),
            Assoc::Precedence => Err(GenerateError::Associativity {
                production,
                terminal: g.terminal(terminal).name().to_owned(),
            }),
        },
    }
}

/// Choose the production reduced by default: the one with the longest run
/// of entries, the earliest run winning ties. Accept and error entries never
/// become the default.
///
/// `entries` is left sorted by production number descending, then terminal.
pub(crate) fn select_default(entries: &mut [Reduce]) -> Option<ProductionID> {
    entries.sort_by(|x, y| {
        Ord::cmp(&y.production, &x.production).then_with(|| Ord::cmp(&x.symbol, &y.symbol))
    });

    let mut default = None;
    let mut longest = 0;
    let mut rest = &entries[..];
    while let Some(head) = rest.first() {
        let len = rest
            .iter()
            .take_while(|r| r.production == head.production)
            .count();
        if len > longest && head.production > Some(ProductionID::ACCEPT) {
            longest = len;
            default = head.production;
        }
        rest = &rest[len..];
    }
    default
}

impl Tables<'_> {
    /// Fill the reduce entries of every state, returning the productions
    /// that are never reduced.
    #[tracing::instrument(skip_all)]
    pub(super) fn fill_reduce(
        &mut self,
        sink: &mut DebugSink<'_>,
    ) -> Result<Vec<ProductionID>, GenerateError> {
        let g = self.g;
        let mut used = BitSet::with_capacity(g.productions.len());

        for p in 0..self.states.len() {
            let state = &self.states[p];
            let shifts_error = state
                .shifts()
                .iter()
                .any(|edge| edge.symbol == SymbolID::T(TerminalID::ERROR));

            let mut entries: Vec<Reduce> = vec![];
            let mut conflicts = vec![];
            let mut removed = vec![false; state.shifts().len()];

            for x in state.items() {
                if !x.item.is_tail(g) {
                    continue;
                }
                let production = x.item.production;
                let mut alook = self.looks[x.look.index()].clone();

                for (m, edge) in state.shifts().iter().enumerate() {
                    let SymbolID::T(t) = edge.symbol else {
                        break;
                    };
                    if removed[m] || !alook.contains(t) {
                        continue;
                    }
                    match compare_precedence(g, production, t)? {
                        Resolution::Shift => {
                            alook.remove(t);
                        }
                        Resolution::Reduce => {
                            removed[m] = true;
                        }
                        Resolution::Error => {
                            alook.remove(t);
                            removed[m] = true;
                            entries.push(Reduce::new(Some(t), None));
                        }
                        Resolution::Conflict => {
                            alook.remove(t);
                            self.shift_reduce_conflicts += 1;
                            conflicts.push(Conflict::ShiftReduce {
                                shift: edge.target,
                                production,
                                symbol: t,
                            });
                        }
                    }
                }

                for entry in &mut entries {
                    let Some(t) = entry.symbol else {
                        continue;
                    };
                    if alook.remove(t) {
                        self.reduce_reduce_conflicts += 1;
                        conflicts.push(Conflict::ReduceReduce {
                            first: entry.production,
                            second: production,
                            symbol: t,
                        });
                        if Some(production) < entry.production {
                            entry.production = Some(production);
                        }
                    }
                }

                entries.extend(alook.iter().map(|t| Reduce::new(Some(t), Some(production))));
            }

            let default = if shifts_error {
                None
            } else {
                select_default(&mut entries)
            };
            entries.retain(|r| r.production != default);
            entries.sort_by_key(|r| (r.symbol, r.production));
            entries.push(Reduce::new(None, default));

            for entry in &entries {
                if let Some(production) = entry.production {
                    used.insert(production.index());
                }
            }
            for conflict in &conflicts {
                tracing::warn!("{:?}: {:?}", state.number(), conflict);
            }
            self.reduce_actions += entries.len();

            let state = &mut self.states[p];
            let mut m = 0;
            state.shifts.retain(|_| {
                m += 1;
                !removed[m - 1]
            });
            state.reduces = entries;
            state.conflicts = conflicts;
        }

        let never_reduced: Vec<_> = g
            .productions
            .keys()
            .copied()
            .filter(|p| !used.contains(p.index()))
            .collect();
        for &p in &never_reduced {
            tracing::warn!("never reduced: {}", g.production(p).display(g));
            writeln!(sink, "Never reduced: {}", g.production(p).display(g))?;
        }
        if !never_reduced.is_empty() {
            writeln!(sink, "{} rule(s) never reduced", never_reduced.len())?;
        }

        Ok(never_reduced)
    }

    /// Sort all states except the initial one by descending weight and
    /// renumber them, returning the number of non-leaf states.
    ///
    /// The weight of a state is its count of terminal actions, then its
    /// count of all actions. States of equal weight keep their order.
    #[tracing::instrument(skip_all)]
    pub(super) fn reorder_states(&mut self) -> usize {
        if let Some((_, rest)) = self.states.split_first_mut() {
            rest.sort_by_key(|state| Reverse((state.terminal_actions(), state.total_actions())));
        }

        let mut new_ids = vec![StateID::START; self.states.len()];
        for (i, state) in self.states.iter().enumerate() {
            new_ids[state.number().index()] = StateID::from_raw(i as u32);
        }

        let mut non_leaf_states = 0;
        for (i, state) in self.states.iter_mut().enumerate() {
            renumber(state, &new_ids);
            if !state.shifts().is_empty() || !state.explicit_reduces().is_empty() {
                non_leaf_states = i + 1;
            }
        }
        non_leaf_states
    }
}

fn renumber(state: &mut State, new_ids: &[StateID]) {
    state.number = new_ids[state.number.index()];
    for edge in &mut state.shifts {
        edge.target = new_ids[edge.target.index()];
    }
    for conflict in &mut state.conflicts {
        conflict.renumber(new_ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        first_sets::FirstSets,
        generator::generate,
        grammar::{Precedence, SymbolID::*},
        state::Edge,
    };

    fn t(raw: u16) -> TerminalID {
        TerminalID::from_raw(raw)
    }

    fn p(raw: u16) -> ProductionID {
        ProductionID::from_raw(raw)
    }

    #[test]
    fn default_is_the_longest_run() {
        let mut entries = vec![
            Reduce::new(Some(t(2)), Some(p(1))),
            Reduce::new(Some(t(3)), Some(p(2))),
            Reduce::new(Some(t(4)), Some(p(2))),
            Reduce::new(Some(t(5)), None),
            Reduce::new(Some(t(6)), None),
            Reduce::new(Some(t(7)), None),
        ];
        assert_eq!(select_default(&mut entries), Some(p(2)));
    }

    #[test]
    fn default_tie_favors_the_higher_production() {
        let mut entries = vec![
            Reduce::new(Some(t(2)), Some(p(1))),
            Reduce::new(Some(t(3)), Some(p(3))),
        ];
        assert_eq!(select_default(&mut entries), Some(p(3)));
        assert_eq!(entries[0].production, Some(p(3)));
    }

    #[test]
    fn accept_never_becomes_default() {
        let mut entries = vec![Reduce::new(Some(TerminalID::EOI), Some(ProductionID::ACCEPT))];
        assert_eq!(select_default(&mut entries), None);
    }

    #[test]
    fn precedence_comparison() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let plus = g.terminal("'+'", Some(Precedence::new(1, Assoc::Left)))?;
            let pow = g.terminal("'^'", Some(Precedence::new(2, Assoc::Right)))?;
            let eq = g.terminal("'='", Some(Precedence::new(0, Assoc::Nonassoc)))?;
            let num = g.terminal("num", None)?;
            let e = g.nonterminal("E")?;
            let p_plus = g.rule(e, [N(e), T(plus), N(e)], None)?;
            let p_pow = g.rule(e, [N(e), T(pow), N(e)], None)?;
            let p_eq = g.rule(e, [N(e), T(eq), N(e)], None)?;
            let p_num = g.rule(e, [T(num)], None)?;
            ids = Some((plus, pow, eq, num, p_plus, p_pow, p_eq, p_num));
            Ok(())
        })
        .unwrap();
        let (plus, pow, eq, num, p_plus, p_pow, p_eq, p_num) = ids.unwrap();

        let cmp = |p, t| compare_precedence(&grammar, p, t).unwrap();
        assert_eq!(cmp(p_plus, plus), Resolution::Reduce);
        assert_eq!(cmp(p_plus, pow), Resolution::Shift);
        assert_eq!(cmp(p_pow, pow), Resolution::Shift);
        assert_eq!(cmp(p_pow, plus), Resolution::Reduce);
        assert_eq!(cmp(p_eq, eq), Resolution::Error);
        assert_eq!(cmp(p_plus, num), Resolution::Conflict);
        assert_eq!(cmp(p_num, plus), Resolution::Conflict);
    }

    #[test]
    fn nonassoc_becomes_an_explicit_error() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let lt = g.terminal("'<'", Some(Precedence::new(1, Assoc::Nonassoc)))?;
            let num = g.terminal("num", None)?;
            let e = g.nonterminal("E")?;
            let p_lt = g.rule(e, [N(e), T(lt), N(e)], None)?;
            g.rule(e, [T(num)], None)?;
            ids = Some((lt, p_lt));
            Ok(())
        })
        .unwrap();
        let (lt, p_lt) = ids.unwrap();

        let automaton = generate(&grammar).unwrap();
        eprintln!("{}", automaton.display(&grammar));
        assert_eq!(automaton.statistics().shift_reduce_conflicts, 0);

        let reduces_lt = |s: &&State| {
            s.items()
                .iter()
                .any(|x| x.item.production == p_lt && x.item.is_tail(&grammar))
        };
        let state = automaton.states().iter().find(reduces_lt).unwrap();
        assert_eq!(state.shift(T(lt)), None);
        assert_eq!(state.reduce_on(lt), Some(&Reduce::new(Some(lt), None)));
        assert_eq!(state.default_reduce(), Some(p_lt));
    }

    #[test]
    fn reduce_reduce_keeps_the_lower_production() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let a = g.terminal("a", None)?;
            let s = g.nonterminal("S")?;
            let x = g.nonterminal("X")?;
            let y = g.nonterminal("Y")?;
            g.rule(s, [N(x)], None)?;
            g.rule(s, [N(y)], None)?;
            let px = g.rule(x, [T(a)], None)?;
            let py = g.rule(y, [T(a)], None)?;
            ids = Some((a, px, py));
            Ok(())
        })
        .unwrap();
        let (a, px, py) = ids.unwrap();

        let automaton = generate(&grammar).unwrap();
        eprintln!("{}", automaton.display(&grammar));
        assert_eq!(automaton.statistics().reduce_reduce_conflicts, 1);

        let state = automaton.state(automaton.states()[0].shift(T(a)).unwrap());
        assert_eq!(
            state.conflicts(),
            &[Conflict::ReduceReduce {
                first: Some(px),
                second: py,
                symbol: TerminalID::EOI,
            }]
        );
        assert_eq!(state.default_reduce(), Some(px));
        assert!(state.explicit_reduces().is_empty());
        assert!(automaton.never_reduced().contains(&py));
    }

    #[test]
    fn shifting_error_disables_default_reduction() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let a = g.terminal("a", None)?;
            let s = g.nonterminal("S")?;
            g.rule(s, [T(a)], None)?;
            g.rule(s, [T(TerminalID::ERROR)], None)?;
            let empty = g.rule(s, [], None)?;
            ids = Some(empty);
            Ok(())
        })
        .unwrap();
        let empty = ids.unwrap();

        let automaton = generate(&grammar).unwrap();
        eprintln!("{}", automaton.display(&grammar));

        let initial = &automaton.states()[0];
        assert!(initial.shift(T(TerminalID::ERROR)).is_some());
        assert_eq!(initial.default_reduce(), None);
        assert_eq!(
            initial.reduce_on(TerminalID::EOI),
            Some(&Reduce::new(Some(TerminalID::EOI), Some(empty)))
        );
    }

    #[test]
    fn reordering_keeps_construction_order_among_equal_weights() {
        let grammar = Grammar::define(|g| {
            let a = g.terminal("a", None)?;
            let b = g.terminal("b", None)?;
            let s = g.nonterminal("S")?;
            g.rule(s, [T(a), T(b)], None)?;
            Ok(())
        })
        .unwrap();
        let terminals = [T(t(2)), T(t(3))];
        let goto = N(grammar.start_symbol);

        // each state is tagged through its construction index
        let tag = |i: usize| (i > 0).then(|| T(t(i as u16)));

        // (terminal shifts, has goto) in construction order
        let shapes = [
            (0, false),
            (1, false),
            (2, false),
            (1, false),
            (2, false),
            (1, false),
            (1, true),
        ];
        let mut tables = Tables::new(&grammar, FirstSets::new(&grammar));
        for (i, &(width, has_goto)) in shapes.iter().enumerate() {
            let mut state = State::new(StateID::from_raw(i as u32), tag(i), vec![], 0);
            state.shifts = terminals[..width]
                .iter()
                .copied()
                .chain(has_goto.then_some(goto))
                .map(|symbol| Edge {
                    symbol,
                    target: StateID::from_raw(i as u32),
                })
                .collect();
            state.reduces = vec![Reduce::new(None, None)];
            tables.states.push(state);
        }

        let non_leaf_states = tables.reorder_states();
        assert_eq!(non_leaf_states, shapes.len());

        let order: Vec<_> = tables.states.iter().map(|state| state.through()).collect();
        let expected: Vec<_> = [0, 2, 4, 6, 1, 3, 5].into_iter().map(tag).collect();
        assert_eq!(order, expected);

        for (i, state) in tables.states.iter().enumerate() {
            assert_eq!(state.number(), StateID::from_raw(i as u32));
            // self loops follow their state to its new number
            for edge in state.shifts() {
                assert_eq!(edge.target, state.number());
            }
        }
    }
}
