use std::collections::{HashMap, HashSet};

use tracing::{debug, trace};

use crate::error::{DefinitionError, RunError};

mod compile;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct State<'a>(pub &'a str);

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize), serde(transparent))]
pub struct Symbol<'a>(pub &'a str);

/// A lookup key of the transition table. `letter` is `None` for epsilon
/// transitions, `top` is `None` for the empty stack sentinel.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TransitionFrom<'a> {
    pub state: State<'a>,
    pub letter: Option<char>,
    pub top: Option<Symbol<'a>>,
}

/// The replacement for a popped stack top. `push` is ordered deepest first,
/// so its last element ends up as the new top.
#[derive(Debug, PartialEq, Eq, Clone, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct TransitionTo<'a> {
    pub state: State<'a>,
    pub push: Vec<Symbol<'a>>,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", serde_with::serde_as)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Dpda<'a> {
    initial_state: State<'a>,
    initial_stack: Symbol<'a>,
    states: HashSet<State<'a>>,
    stack_symbols: HashSet<Symbol<'a>>,
    alphabet: HashSet<char>,
    final_states: HashSet<State<'a>>,

    #[cfg(feature = "serde")]
    #[serde_as(as = "serde_with::Seq<(_, _)>")]
    transitions: HashMap<TransitionFrom<'a>, TransitionTo<'a>>,

    #[cfg(not(feature = "serde"))]
    transitions: HashMap<TransitionFrom<'a>, TransitionTo<'a>>,
}

impl<'a> Dpda<'a> {
    pub fn new(
        states: HashSet<State<'a>>,
        alphabet: HashSet<char>,
        stack_symbols: HashSet<Symbol<'a>>,
        transitions: HashMap<TransitionFrom<'a>, TransitionTo<'a>>,
        initial_state: State<'a>,
        initial_stack: Symbol<'a>,
        final_states: HashSet<State<'a>>,
    ) -> Result<Self, DefinitionError> {
        if !states.contains(&initial_state) {
            return Err(DefinitionError::UndefinedInitialState(
                initial_state.0.to_owned(),
            ));
        }
        if !stack_symbols.contains(&initial_stack) {
            return Err(DefinitionError::UndefinedInitialStack(
                initial_stack.0.to_owned(),
            ));
        }
        for state in &final_states {
            if !states.contains(state) {
                return Err(DefinitionError::UndefinedFinalState(state.0.to_owned()));
            }
        }

        Ok(Self {
            initial_state,
            initial_stack,
            states,
            stack_symbols,
            alphabet,
            final_states,
            transitions,
        })
    }

    pub fn initial_state(&self) -> State<'a> {
        self.initial_state
    }

    pub fn initial_stack(&self) -> Symbol<'a> {
        self.initial_stack
    }

    pub fn states(&self) -> &HashSet<State<'a>> {
        &self.states
    }

    pub fn stack_symbols(&self) -> &HashSet<Symbol<'a>> {
        &self.stack_symbols
    }

    pub fn alphabet(&self) -> &HashSet<char> {
        &self.alphabet
    }

    pub fn is_final(&self, state: State<'a>) -> bool {
        self.final_states.contains(&state)
    }

    pub fn transition(
        &self,
        state: State<'a>,
        letter: Option<char>,
        top: Option<Symbol<'a>>,
    ) -> Option<&TransitionTo<'a>> {
        self.transitions.get(&TransitionFrom { state, letter, top })
    }

    /// Runs `input` against the machine and reports whether it is accepted.
    ///
    /// A string containing a letter outside the input alphabet is a
    /// malformed query and never yields a verdict, even when a missing
    /// transition would have ended the run before the letter is reached.
    pub fn process(&self, input: &str) -> Result<bool, RunError> {
        if let Some(letter) = input.chars().find(|letter| !self.alphabet.contains(letter)) {
            return Err(RunError::InvalidLetter(letter));
        }

        let mut simulator = Simulator::begin(self, input);
        loop {
            match simulator.step() {
                StepResult::Pending => {}
                StepResult::Accept => {
                    debug!(input, state = simulator.state().0, "accepted");
                    return Ok(true);
                }
                StepResult::Reject => {
                    debug!(input, state = simulator.state().0, "rejected");
                    return Ok(false);
                }
                StepResult::InvalidLetter(letter) => return Err(RunError::InvalidLetter(letter)),
            }
        }
    }
}

/// A single deterministic run. The configuration lives here, never in the
/// table, so one `Dpda` can back any number of concurrent runs.
pub struct Simulator<'a, 'b> {
    table: &'b Dpda<'a>,
    input: &'b str,
    position: usize,
    state: State<'a>,
    stack: Vec<Symbol<'a>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult {
    Pending,
    Accept,
    Reject,
    InvalidLetter(char),
}

impl<'a, 'b> Simulator<'a, 'b> {
    pub fn begin(table: &'b Dpda<'a>, input: &'b str) -> Self {
        Self {
            input,
            position: 0,
            state: table.initial_state,
            stack: vec![table.initial_stack],
            table,
        }
    }

    pub fn state(&self) -> State<'a> {
        self.state
    }

    pub fn stack(&self) -> &[Symbol<'a>] {
        &self.stack
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Consumes one input letter, or performs the single trailing epsilon
    /// step once the input is exhausted and returns the verdict.
    ///
    /// Every lookup pops the stack top first, and the pop sticks even when
    /// no transition matches. Calling `step` again after a verdict repeats
    /// the trailing epsilon step; drivers are expected to stop.
    pub fn step(&mut self) -> StepResult {
        let Some(letter) = self
            .input
            .get(self.position..)
            .and_then(|rest| rest.chars().next())
        else {
            let top = self.stack.pop();
            if let Some(to) = self.table.transition(self.state, None, top) {
                trace!(
                    state = self.state.0,
                    next = to.state.0,
                    "trailing epsilon step"
                );
                self.state = to.state;
                self.stack.extend_from_slice(&to.push);
            }
            return if self.table.is_final(self.state) {
                StepResult::Accept
            } else {
                StepResult::Reject
            };
        };

        if !self.table.alphabet.contains(&letter) {
            return StepResult::InvalidLetter(letter);
        }

        let top = self.stack.pop();
        let Some(to) = self.table.transition(self.state, Some(letter), top) else {
            // strict table lookup, no epsilon fallback mid string
            return StepResult::Reject;
        };
        trace!(
            state = self.state.0,
            %letter,
            next = to.state.0,
            depth = self.stack.len(),
            "step"
        );
        self.state = to.state;
        self.stack.extend_from_slice(&to.push);
        self.position += letter.len_utf8();
        StepResult::Pending
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parts() -> (
        HashSet<State<'static>>,
        HashSet<char>,
        HashSet<Symbol<'static>>,
    ) {
        (
            HashSet::from([State("X"), State("Y")]),
            HashSet::from(['a']),
            HashSet::from([Symbol("Z")]),
        )
    }

    #[test]
    fn initial_state_must_be_declared() {
        let (states, alphabet, symbols) = parts();
        let err = Dpda::new(
            states,
            alphabet,
            symbols,
            HashMap::new(),
            State("Q"),
            Symbol("Z"),
            HashSet::new(),
        )
        .unwrap_err();
        assert_eq!(err, DefinitionError::UndefinedInitialState("Q".into()));
    }

    #[test]
    fn initial_stack_symbol_must_be_declared() {
        let (states, alphabet, symbols) = parts();
        let err = Dpda::new(
            states,
            alphabet,
            symbols,
            HashMap::new(),
            State("X"),
            Symbol("W"),
            HashSet::new(),
        )
        .unwrap_err();
        assert_eq!(err, DefinitionError::UndefinedInitialStack("W".into()));
    }

    #[test]
    fn final_states_must_be_declared() {
        let (states, alphabet, symbols) = parts();
        let err = Dpda::new(
            states,
            alphabet,
            symbols,
            HashMap::new(),
            State("X"),
            Symbol("Z"),
            HashSet::from([State("Q")]),
        )
        .unwrap_err();
        assert_eq!(err, DefinitionError::UndefinedFinalState("Q".into()));
    }

    #[test]
    fn transition_lookup_distinguishes_the_empty_stack_sentinel() {
        let (states, alphabet, symbols) = parts();
        let transitions = HashMap::from([(
            TransitionFrom {
                state: State("X"),
                letter: None,
                top: None,
            },
            TransitionTo {
                state: State("Y"),
                push: Vec::new(),
            },
        )]);
        let machine = Dpda::new(
            states,
            alphabet,
            symbols,
            transitions,
            State("X"),
            Symbol("Z"),
            HashSet::new(),
        )
        .unwrap();

        assert!(machine.transition(State("X"), None, None).is_some());
        assert!(machine.transition(State("X"), None, Some(Symbol("Z"))).is_none());
    }
}
