//! Diagnostic reporting for the calcline expression engine.
//!
//! A [`Diagnostic`] is deliberately small: a message plus a byte span within
//! the *expression text* of a line (the text after the `|` sigil). The line
//! driver translates that span into a full-line offset before handing
//! diagnostics to a host.

use std::fmt;

use calcline_ir::Span;

/// Severity of a diagnostic.
///
/// The engine itself only ever emits [`Severity::Error`] — parsing and
/// evaluation failures are hard errors, there is no warning tier in this
/// language — but the type is kept open so a host embedding can attach its
/// own advisory diagnostics (e.g. "this line looks like it should be
/// annotated but isn't") without inventing a second type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A single diagnostic anchored to a byte range.
///
/// `start`/`end` are inclusive-start, exclusive-end byte offsets within the
/// expression text of one line (see [`Span`]).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    pub message: String,
    pub start: u32,
    pub end: u32,
    pub severity: Severity,
}

#[cfg(feature = "serde")]
impl serde::Serialize for Severity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "note" => Ok(Severity::Note),
            other => Err(serde::de::Error::custom(format!(
                "unknown diagnostic severity: {other}"
            ))),
        }
    }
}

impl Diagnostic {
    #[must_use]
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Diagnostic {
            message: message.into(),
            start: span.start,
            end: span.end,
            severity: Severity::Error,
        }
    }

    #[must_use]
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    /// Shift this diagnostic's offsets so they are relative to the start of
    /// the full source line rather than the expression text that begins
    /// after the `|` sigil.
    #[must_use]
    pub fn offset_by(mut self, amount: u32) -> Self {
        self.start += amount;
        self.end += amount;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} ({}..{})",
            self.severity, self.message, self.start, self.end
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Diagnostic, Severity};
    use calcline_ir::Span;

    #[test]
    fn offset_by_shifts_both_ends() {
        let d = Diagnostic::new("bad", Span::new(2, 5)).offset_by(10);
        assert_eq!(d.start, 12);
        assert_eq!(d.end, 15);
    }

    #[test]
    fn new_defaults_to_error_severity() {
        let d = Diagnostic::new("bad", Span::new(0, 1));
        assert_eq!(d.severity, Severity::Error);
    }
}
