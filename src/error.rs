use thiserror::Error;

/// A seven-tuple that does not describe a machine. The engine must not be
/// constructed from one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("initial state {0:?} is not in the set of states")]
    UndefinedInitialState(String),
    #[error("initial stack symbol {0:?} is not in the stack alphabet")]
    UndefinedInitialStack(String),
    #[error("final state {0:?} is not in the set of states")]
    UndefinedFinalState(String),
}

/// A malformed query, as opposed to a well formed string the machine
/// rejects. Rejection is a verdict, not an error.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunError {
    #[error("letter {0:?} is not in the input alphabet")]
    InvalidLetter(char),
}
