use crate::{
    dpda::Dpda,
    loader::log::{LogEntry, LogSink},
};

pub mod ast;
pub mod lexer;
pub mod log;
pub mod parser;

#[macro_export]
macro_rules! maker {
    (pat: $($pat:pat),*) => {
      $($pat)|*
    };
}

#[macro_export]
macro_rules! epsilon {
    ($ident: ident) => {
      $crate::maker!($ident: "epsilon", "Ɛ", "ε", "ϵ", "ɛ")
    };
}

pub const EPSILON_LOWER: &str = "ε";
pub const DELTA_LOWER: &str = "δ";
pub const SIGMA_UPPER: &str = "Σ";
pub const GAMMA_UPPER: &str = "Γ";

pub const INITIAL_STATE: &str = "q0";
pub const INITIAL_STACK: &str = "z0";

#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span(pub usize, pub usize);
impl Span {
    pub fn join(&self, end: Span) -> Span {
        Span(self.0, end.1)
    }
}

#[derive(Clone, Copy, Hash, PartialEq, Eq, Debug)]
pub struct Spanned<T>(pub T, pub Span);
impl<T> Spanned<T> {
    pub fn map<R>(self, map: impl Fn(T) -> R) -> Spanned<R> {
        Spanned(map(self.0), self.1)
    }

    pub fn as_ref(&self) -> Spanned<&T> {
        Spanned(&self.0, self.1)
    }
}

pub struct Context<'a> {
    logs: log::Logs,
    src: &'a str,
}

impl<'a> LogSink for Context<'a> {
    fn emit(&mut self, entry: log::LogEntry) -> &mut LogEntry {
        self.logs.emit(entry)
    }
}

impl<'a> Context<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            logs: log::Logs::new(),
            src,
        }
    }

    pub fn src(&self) -> &'a str {
        self.src
    }

    pub fn logs(&self) -> &log::Logs {
        &self.logs
    }

    pub fn logs_display(&self) -> impl Iterator<Item = log::LogEntryDisplay<'_>> {
        self.logs.displayable_with(self.src)
    }

    pub fn eof(&self) -> Span {
        Span(self.src.len(), self.src.len())
    }

    pub fn contains_errors(&self) -> bool {
        self.logs.contains_errors()
    }

    pub fn into_logs(self) -> log::Logs {
        self.logs
    }
}

/// Parses and compiles a machine description. `None` means the logs held by
/// the context contain at least one error.
pub fn load<'a>(ctx: &mut Context<'a>) -> Option<Dpda<'a>> {
    let items = parser::Parser::new(ctx).collect::<Vec<_>>();
    if ctx.contains_errors() {
        return None;
    }
    Dpda::compile(items.into_iter(), ctx)
}
