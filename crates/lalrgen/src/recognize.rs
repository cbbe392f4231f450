//! A table-driven recognizer over a generated automaton.

use crate::{
    action::Reduce,
    automaton::Automaton,
    grammar::{Grammar, NonterminalID, ProductionID, SymbolID, TerminalID},
    state::StateID,
};

#[derive(Debug, thiserror::Error)]
pub enum RecognizeError {
    #[error("unexpected token {token:?} in {state:?}")]
    UnexpectedToken { state: StateID, token: TerminalID },

    #[error("{state:?} has no goto on {symbol:?}")]
    MissingGoto {
        state: StateID,
        symbol: NonterminalID,
    },

    #[error("the state stack is exhausted while reducing ({production})")]
    StackUnderflow { production: ProductionID },
}

impl Automaton {
    /// Run the LR(1) driver on `tokens`, followed by the end of input.
    ///
    /// On each step the driver shifts on a matching terminal edge, otherwise
    /// takes the explicit reduce entry of the lookahead, otherwise the default
    /// entry.
    pub fn recognize<I>(&self, g: &Grammar, tokens: I) -> Result<(), RecognizeError>
    where
        I: IntoIterator<Item = TerminalID>,
    {
        let mut tokens = tokens.into_iter().chain(Some(TerminalID::EOI));
        let mut lookahead = tokens.next().unwrap_or(TerminalID::EOI);
        let mut stack = vec![StateID::START];

        loop {
            let current = *stack
                .last()
                .ok_or(RecognizeError::StackUnderflow {
                    production: ProductionID::ACCEPT,
                })?;
            let state = self.state(current);

            if let Some(next) = state.shift(SymbolID::T(lookahead)) {
                tracing::trace!("shift {:?} -> {:?}", lookahead, next);
                stack.push(next);
                lookahead = tokens.next().unwrap_or(TerminalID::EOI);
                continue;
            }

            let reduce = match state.reduce_on(lookahead) {
                Some(reduce) => *reduce,
                None => Reduce::new(None, state.default_reduce()),
            };
            if reduce.is_accept() && lookahead == TerminalID::EOI {
                tracing::trace!("accepted");
                return Ok(());
            }
            let production = match reduce.production {
                Some(production) if !reduce.is_error() && !reduce.is_accept() => production,
                _ => {
                    return Err(RecognizeError::UnexpectedToken {
                        state: current,
                        token: lookahead,
                    })
                }
            };

            let production = g.production(production);
            let n = production.right().len();
            if n >= stack.len() {
                return Err(RecognizeError::StackUnderflow {
                    production: production.id(),
                });
            }
            stack.truncate(stack.len() - n);
            tracing::trace!("reduce ({})", production.id());

            let top = *stack.last().ok_or(RecognizeError::StackUnderflow {
                production: production.id(),
            })?;
            let left = production.left();
            let next = self
                .state(top)
                .shift(SymbolID::N(left))
                .ok_or(RecognizeError::MissingGoto {
                    state: top,
                    symbol: left,
                })?;
            stack.push(next);
        }
    }
}
