use std::fmt::Display;

use crate::loader::Span;

pub struct Logs {
    logs: Vec<LogEntry>,
    has_error: bool,
}

pub trait LogSink {
    fn emit(&mut self, entry: LogEntry) -> &mut LogEntry;

    fn emit_error(&mut self, msg: impl Into<String>, span: Span) -> &mut LogEntry {
        self.emit(LogEntry {
            message: msg.into(),
            span: Some(span),
            level: LogLevel::Error,
            child: None,
        })
    }

    fn emit_error_locless(&mut self, msg: impl Into<String>) -> &mut LogEntry {
        self.emit(LogEntry {
            message: msg.into(),
            span: None,
            level: LogLevel::Error,
            child: None,
        })
    }

    fn emit_warning(&mut self, msg: impl Into<String>, span: Span) -> &mut LogEntry {
        self.emit(LogEntry {
            message: msg.into(),
            span: Some(span),
            level: LogLevel::Warning,
            child: None,
        })
    }

    fn emit_warning_locless(&mut self, msg: impl Into<String>) -> &mut LogEntry {
        self.emit(LogEntry {
            message: msg.into(),
            span: None,
            level: LogLevel::Warning,
            child: None,
        })
    }

    fn emit_help_locless(&mut self, msg: impl Into<String>) -> &mut LogEntry {
        self.emit(LogEntry {
            message: msg.into(),
            span: None,
            level: LogLevel::Help,
            child: None,
        })
    }
}

impl LogSink for Logs {
    fn emit(&mut self, entry: LogEntry) -> &mut LogEntry {
        self.has_error |= matches!(entry.level, LogLevel::Error);
        self.logs.push(entry);
        self.logs.last_mut().unwrap()
    }
}

impl Logs {
    pub fn new() -> Self {
        Self {
            logs: Vec::new(),
            has_error: false,
        }
    }

    pub fn contains_errors(&self) -> bool {
        self.has_error
    }

    pub fn displayable_with<'a>(
        &'a self,
        src: &'a str,
    ) -> impl Iterator<Item = LogEntryDisplay<'a>> {
        self.logs.iter().map(|entry| LogEntryDisplay { src, entry })
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn into_entries(self) -> impl Iterator<Item = LogEntry> {
        self.logs.into_iter()
    }
}

impl Default for Logs {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Warning,
    Error,
    Help,
}

pub struct LogEntry {
    pub message: String,
    pub span: Option<Span>,
    pub level: LogLevel,
    pub child: Option<Box<LogEntry>>,
}

impl LogSink for LogEntry {
    fn emit(&mut self, entry: LogEntry) -> &mut LogEntry {
        self.child = Some(Box::new(entry));
        self.child.as_mut().unwrap()
    }
}

pub struct LogEntryDisplay<'a> {
    src: &'a str,
    entry: &'a LogEntry,
}

impl<'a> Display for LogEntryDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        pub const RESET: &str = "\x1b[0;22m";
        pub const BOLD: &str = "\x1b[1m";
        pub const RED: &str = "\x1b[31m";
        pub const GREEN: &str = "\x1b[32m";
        pub const YELLOW: &str = "\x1b[33m";

        let mut next_entry = Some(self.entry);

        while let Some(entry) = next_entry {
            match entry.level {
                LogLevel::Help => write!(f, "{BOLD}{GREEN}help{RESET}{BOLD}: ")?,
                LogLevel::Warning => write!(f, "{BOLD}{YELLOW}warning{RESET}{BOLD}: ")?,
                LogLevel::Error => write!(f, "{BOLD}{RED}error{RESET}{BOLD}: ")?,
            }
            writeln!(f, "{}{RESET}", entry.message)?;

            if let Some(Span(start, end)) = entry.span {
                // only the line the span starts on is shown
                let start = start.min(self.src.len());
                let line_start = self.src[..start].rfind('\n').map(|v| v + 1).unwrap_or(0);
                let line_end = self.src[line_start..]
                    .find('\n')
                    .map(|v| v + line_start)
                    .unwrap_or(self.src.len());
                let number = self.src[..line_start].lines().count() + 1;
                let line = &self.src[line_start..line_end];

                writeln!(f, "{BOLD}{number:>4}: {RESET}{line}")?;
                write!(f, "      ")?;
                let mut index = line_start;
                for char in line.chars() {
                    if (start..end.max(start + 1)).contains(&index) {
                        write!(f, "{BOLD}{RED}~{RESET}")?;
                    } else {
                        write!(f, " ")?;
                    }
                    index += char.len_utf8();
                }
                writeln!(f)?;
            }
            next_entry = entry.child.as_deref()
        }

        Ok(())
    }
}
