//! Diagnostic reporting.
//!
//! Every stage reports failures through a [`Handler`], built fluently with
//! [`DiagnosticBuilder`]. The handler is a plain `RefCell`-backed struct,
//! not a `Mutex`-guarded one — the compiler never has more than one thread
//! touching it at a time (see the concurrency model).

use std::cell::RefCell;
use std::fmt;

use crate::span::SourceMap;
use crate::Span;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// The four diagnostic categories named by the error-handling design:
/// lexical, syntactic, scope, and type errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    Lexical,
    Syntax,
    Scope,
    Type,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticCode::Lexical => "Lexical",
            DiagnosticCode::Syntax => "Syntax",
            DiagnosticCode::Scope => "Scope",
            DiagnosticCode::Type => "Type",
        };
        f.write_str(s)
    }
}

/// A single compiler diagnostic: a severity, a category, a message, the
/// source position it refers to, and an optional "did you mean" hint.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub level: Level,
    pub code: Option<DiagnosticCode>,
    pub message: String,
    pub span: Span,
    pub suggestion: Option<String>,
}

impl Diagnostic {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            code: None,
            message: message.into(),
            span: Span::DUMMY,
            suggestion: None,
        }
    }

    /// Renders this diagnostic the way every user-facing error is meant to
    /// reach the terminal (§4.7/§7): a category tag, the message, a
    /// caret-line under the offending source span, and the "did you mean"
    /// hint when one was computed.
    pub fn render(&self, source_map: &SourceMap) -> String {
        let mut out = match self.code {
            Some(code) => format!("{}[{}]: {}\n", self.level, code, self.message),
            None => format!("{}: {}\n", self.level, self.message),
        };

        if let Some(line) = source_map.line_text(self.span) {
            let gutter = format!("{} | ", self.span.line);
            out.push_str(&gutter);
            out.push_str(line);
            out.push('\n');

            let col = self.span.column.saturating_sub(1) as usize;
            let width = self.span.len().max(1);
            out.push_str(&" ".repeat(gutter.len() + col));
            out.push_str(&"^".repeat(width));
            out.push('\n');
        }

        if let Some(hint) = &self.suggestion {
            out.push_str(&format!("hint: did you mean `{}`?\n", hint));
        }

        out
    }
}

/// Fluent constructor for a [`Diagnostic`].
pub struct DiagnosticBuilder {
    diagnostic: Diagnostic,
}

impl DiagnosticBuilder {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            diagnostic: Diagnostic::new(Level::Error, message),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            diagnostic: Diagnostic::new(Level::Warning, message),
        }
    }

    pub fn span(mut self, span: Span) -> Self {
        self.diagnostic.span = span;
        self
    }

    pub fn code(mut self, code: DiagnosticCode) -> Self {
        self.diagnostic.code = Some(code);
        self
    }

    pub fn suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.diagnostic.suggestion = Some(suggestion.into());
        self
    }

    pub fn build(self) -> Diagnostic {
        self.diagnostic
    }

    pub fn emit(self, handler: &Handler) {
        handler.emit_diagnostic(self.diagnostic);
    }
}

/// Collects diagnostics for a single compile. Stops nothing on its own —
/// callers check [`Handler::has_errors`] after each stage and abort the
/// pipeline themselves, matching the "first error aborts" propagation
/// rule.
#[derive(Default)]
pub struct Handler {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl Handler {
    pub fn new() -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
        }
    }

    pub fn emit_diagnostic(&self, diagnostic: Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.level == Level::Error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .borrow()
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// The first emitted error, if any. Mini-C reports only the first
    /// error per compile, so callers generally only need this one.
    pub fn first_error(&self) -> Option<Diagnostic> {
        self.diagnostics
            .borrow()
            .iter()
            .find(|d| d.level == Level::Error)
            .cloned()
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

/// Finds the closest in-scope name to `target` by Levenshtein distance,
/// within the threshold the diagnostics design calls for: 2 for names of
/// 5 characters or fewer, 3 otherwise. Returns `None` if nothing is close
/// enough to be a useful "did you mean" hint.
pub fn suggest_closest<'a>(target: &str, candidates: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let threshold = if target.len() <= 5 { 2 } else { 3 };
    let mut best: Option<(&str, usize)> = None;
    for candidate in candidates {
        let dist = levenshtein(target, candidate);
        if dist <= threshold {
            match best {
                Some((_, best_dist)) if best_dist <= dist => {}
                _ => best = Some((candidate, dist)),
            }
        }
    }
    best.map(|(s, _)| s)
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
