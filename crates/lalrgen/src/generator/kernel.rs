//! LR(0) kernels, state merging and epsilon-closure.

use super::Tables;
use crate::{
    grammar::{NonterminalID, ProductionID, SymbolID},
    item::Item,
    state::{Edge, State, StateID, StateItem},
};
use bit_set::BitSet;

/// An item about to be moved into a successor state.
#[derive(Debug, Copy, Clone)]
struct Candidate {
    /// The symbol the marker has just been moved over.
    through: SymbolID,
    left: Option<NonterminalID>,
    item: Item,
}

impl Tables<'_> {
    /// Build every state reachable from `$start -> . S`, recording the
    /// shift/goto edges of each state in symbol order.
    #[tracing::instrument(skip_all)]
    pub(super) fn compute_kernels(&mut self) {
        let g = self.g;

        let initial = Item::new(ProductionID::ACCEPT, 0);
        let items = self.make_state(&[(None, initial)]);
        self.register_state(None, items);

        let mut candidates = vec![];
        let mut visited = BitSet::with_capacity(g.nonterminals.len());

        // States appended during the loop are processed as well.
        let mut current = 0;
        while current < self.states.len() {
            candidates.clear();
            for x in self.states[current].items() {
                if let Some(through) = x.item.symbol_at(g) {
                    candidates.push(Candidate {
                        through,
                        left: None,
                        item: x.item.advance(),
                    });
                }
            }

            // Items of nonterminals derived at the leftmost position are moved
            // over their first symbol without being materialized.
            visited.clear();
            let mut i = 0;
            while i < candidates.len() {
                if let SymbolID::N(n) = candidates[i].through {
                    if visited.insert(n.index()) {
                        for &p in g.nonterminal(n).productions() {
                            if let Some(&first) = g.production(p).right().first() {
                                candidates.push(Candidate {
                                    through: first,
                                    left: Some(n),
                                    item: Item::new(p, 1),
                                });
                            }
                        }
                    }
                }
                i += 1;
            }

            candidates.sort_by_key(|c| (c.through, c.item.production, c.item.index));

            let mut shifts = vec![];
            let mut rest = &candidates[..];
            while let Some(head) = rest.first() {
                let len = rest
                    .iter()
                    .take_while(|c| c.through == head.through)
                    .count();
                let (run, tail) = rest.split_at(len);
                let target = self.find_or_create_state(head.through, run);
                shifts.push(Edge {
                    symbol: head.through,
                    target,
                });
                rest = tail;
            }

            self.shift_actions += shifts.len();
            self.states[current].shifts = shifts;
            current += 1;
        }

        tracing::trace!(
            "{} states, {} lookahead sets",
            self.states.len(),
            self.looks.len()
        );
    }

    fn find_or_create_state(&mut self, through: SymbolID, run: &[Candidate]) -> StateID {
        let kernel: Vec<Item> = run.iter().map(|c| c.item).collect();
        if let Some(&id) = self
            .states_through
            .get(&Some(through))
            .and_then(|states| states.get(&kernel))
        {
            return id;
        }

        let run: Vec<_> = run.iter().map(|c| (c.left, c.item)).collect();
        let items = self.make_state(&run);
        self.register_state(Some(through), items)
    }

    fn register_state(
        &mut self,
        through: Option<SymbolID>,
        (items, kernel_len): (Vec<StateItem>, usize),
    ) -> StateID {
        let id = StateID::from_raw(self.states.len() as u32);
        let kernel = items[..kernel_len].iter().map(|x| x.item).collect();
        self.states_through
            .entry(through)
            .or_default()
            .insert(kernel, id);
        self.states.push(State::new(id, through, items, kernel_len));
        id
    }

    /// Assign lookahead sets to the kernel and append the epsilon items
    /// reachable from it.
    ///
    /// Kernel items sharing a `left` nonterminal share one lookahead set.
    fn make_state(
        &mut self,
        kernel: &[(Option<NonterminalID>, Item)],
    ) -> (Vec<StateItem>, usize) {
        let mut items: Vec<StateItem> = Vec::with_capacity(kernel.len());
        for &(left, item) in kernel {
            let shared = left.and_then(|left| {
                items
                    .iter()
                    .find(|x| x.left == Some(left))
                    .map(|x| x.look)
            });
            let look = match shared {
                Some(look) => look,
                None => self.new_look(),
            };
            items.push(StateItem { left, look, item });
        }

        let kernel_len = items.len();
        let mut visited = BitSet::with_capacity(self.g.nonterminals.len());
        for i in 0..kernel_len {
            if let Some(SymbolID::N(n)) = items[i].item.symbol_at(self.g) {
                self.find_empty(n, &mut visited, &mut items);
            }
        }

        (items, kernel_len)
    }

    fn find_empty(&mut self, n: NonterminalID, visited: &mut BitSet, items: &mut Vec<StateItem>) {
        if !self.first_sets.has_empty(n) || !visited.insert(n.index()) {
            return;
        }
        let g = self.g;
        for &p in g.nonterminal(n).productions() {
            match g.production(p).right().first() {
                None => {
                    let look = self.new_look();
                    items.push(StateItem {
                        left: None,
                        look,
                        item: Item::new(p, 0),
                    });
                }
                Some(&SymbolID::N(m)) => self.find_empty(m, visited, items),
                Some(SymbolID::T(..)) => (),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        generator::generate,
        grammar::{Grammar, SymbolID::*},
        item::Item,
    };

    #[test]
    fn shared_left_context_shares_lookahead() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let a = g.terminal("a", None)?;
            let b = g.terminal("b", None)?;
            let c = g.terminal("c", None)?;
            let s = g.nonterminal("S")?;
            let x = g.nonterminal("X")?;
            g.rule(s, [N(x), T(c)], None)?;
            let p1 = g.rule(x, [T(a), T(b)], None)?;
            let p2 = g.rule(x, [T(a)], None)?;
            ids = Some((a, x, p1, p2));
            Ok(())
        })
        .unwrap();
        let (a, x, p1, p2) = ids.unwrap();

        let automaton = generate(&grammar).unwrap();
        eprintln!("{}", automaton.display(&grammar));

        let target = automaton.states()[0].shift(T(a)).unwrap();
        let state = automaton.state(target);
        let kernel = state.kernel();
        assert_eq!(kernel.len(), 2);
        assert_eq!(kernel[0].item, Item::new(p1, 1));
        assert_eq!(kernel[1].item, Item::new(p2, 1));
        assert_eq!(kernel[0].left, Some(x));
        assert_eq!(kernel[0].left, kernel[1].left);
        assert_eq!(kernel[0].look, kernel[1].look);
    }

    #[test]
    fn epsilon_items_follow_the_kernel() {
        let mut ids = None;
        let grammar = Grammar::define(|g| {
            let a = g.terminal("a", None)?;
            let s = g.nonterminal("S")?;
            let x = g.nonterminal("X")?;
            let y = g.nonterminal("Y")?;
            g.rule(s, [N(x), T(a)], None)?;
            g.rule(x, [N(y)], None)?;
            let y_empty = g.rule(y, [], None)?;
            ids = Some(y_empty);
            Ok(())
        })
        .unwrap();
        let y_empty = ids.unwrap();

        let automaton = generate(&grammar).unwrap();
        eprintln!("{}", automaton.display(&grammar));

        let initial = &automaton.states()[0];
        assert_eq!(initial.kernel().len(), 1);
        assert!(initial.kernel()[0].item.is_head());
        let epsilon: Vec<_> = initial.items()[1..].iter().map(|x| x.item).collect();
        assert_eq!(epsilon, vec![Item::new(y_empty, 0)]);
        assert!(initial.items()[1].left.is_none());
        assert_ne!(initial.items()[0].look, initial.items()[1].look);
    }
}
