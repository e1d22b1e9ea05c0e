//! Diagnostics collected while scanning class files.
//!
//! A scan never aborts because one class is broken. Instead every skipped class, unresolved
//! cross reference, name collision and unsupported input is recorded here and handed back to
//! the caller next to the (possibly partial) graph.
//!
//! # Architecture
//!
//! The diagnostics container is shared by every stage of a scan:
//! - **Scan workers**: report unreadable sources, format errors and unsupported inputs
//! - **Registry**: reports name collisions (first registration wins)
//! - **Graph finalization**: reports references to classes that were never scanned
//!
//! The [`crate::metadata::diagnostics::Diagnostics`] container uses `boxcar::Vec` for
//! thread-safe, lock-free append operations, so workers report without synchronizing with
//! each other.
//!
//! # Usage Examples
//!
//! ```rust
//! use jvmscope::metadata::diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics};
//!
//! let diagnostics = Diagnostics::new();
//!
//! diagnostics.push(
//!     Diagnostic::new(DiagnosticSeverity::Error, DiagnosticCategory::Format, "Invalid magic 0xDEADBEEF")
//!         .with_source("lib/Broken.class"),
//! );
//! diagnostics.warning(DiagnosticCategory::Reference, "superclass of a.B refers to missing a.C");
//!
//! assert!(diagnostics.has_errors());
//! assert_eq!(diagnostics.by_category(DiagnosticCategory::Format).len(), 1);
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are [`Send`] and [`Sync`].

use std::fmt::{self, Write};

use strum::Display;

/// Severity level of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Informational message, not indicating a problem.
    ///
    /// Used for valid inputs the scanner deliberately does not model, such as module
    /// descriptors.
    Info,

    /// The graph is usable, but some relationship or class is missing or was dropped.
    Warning,

    /// A class could not be decoded and is absent from the graph.
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// Category indicating the source or type of diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum DiagnosticCategory {
    /// The byte stream is not a valid class file.
    ///
    /// Examples: bad magic, unsupported version, truncated constant pool, malformed
    /// generic signature, invalid type path.
    Format,

    /// A cross reference names a class that is not part of the scan.
    Reference,

    /// Two sources produced a class with the same fully-qualified name.
    Collision,

    /// A byte source could not be read.
    Io,

    /// A valid input that the scanner does not model.
    Unsupported,

    /// Problems with pooled scan resources.
    Resource,

    /// General issues not fitting other categories.
    General,
}

/// A single diagnostic entry with context information.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level of this diagnostic.
    pub severity: DiagnosticSeverity,

    /// Category indicating the source of this diagnostic.
    pub category: DiagnosticCategory,

    /// Human-readable description of the issue.
    pub message: String,

    /// Identifier of the byte source the issue was found in.
    pub source: Option<String>,

    /// Fully-qualified name of the class concerned, if known.
    pub class_name: Option<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic entry.
    ///
    /// # Arguments
    ///
    /// * `severity` - Severity level of the diagnostic
    /// * `category` - Category of the diagnostic source
    /// * `message` - Human-readable description
    pub fn new(
        severity: DiagnosticSeverity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            source: None,
            class_name: None,
        }
    }

    /// Adds the source identifier to the diagnostic.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Adds the class name to the diagnostic.
    #[must_use]
    pub fn with_class(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = Some(class_name.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;

        if let Some(class_name) = &self.class_name {
            write!(f, " (class: {class_name})")?;
        }

        if let Some(source) = &self.source {
            write!(f, " (source: {source})")?;
        }

        Ok(())
    }
}

/// Thread-safe container for collecting diagnostic entries.
///
/// Uses `boxcar::Vec` internally for lock-free concurrent append operations.
#[derive(Debug)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Creates a new empty diagnostics container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Adds an informational diagnostic.
    pub fn info(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, category, message));
    }

    /// Adds a warning diagnostic.
    pub fn warning(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Warning,
            category,
            message,
        ));
    }

    /// Adds an error diagnostic.
    pub fn error(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Error,
            category,
            message,
        ));
    }

    /// Adds a diagnostic entry directly.
    ///
    /// Use this for diagnostics carrying a source identifier or class name.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Returns true if any diagnostics have been collected.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// Returns true if any error-level diagnostics have been collected.
    pub fn has_errors(&self) -> bool {
        self.count_severity(DiagnosticSeverity::Error) > 0
    }

    /// Returns true if any warning-level diagnostics have been collected.
    pub fn has_warnings(&self) -> bool {
        self.count_severity(DiagnosticSeverity::Warning) > 0
    }

    /// Returns the total number of diagnostics.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Returns the number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.count_severity(DiagnosticSeverity::Error)
    }

    /// Returns the number of warning-level diagnostics.
    pub fn warning_count(&self) -> usize {
        self.count_severity(DiagnosticSeverity::Warning)
    }

    /// Returns the number of info-level diagnostics.
    pub fn info_count(&self) -> usize {
        self.count_severity(DiagnosticSeverity::Info)
    }

    fn count_severity(&self, severity: DiagnosticSeverity) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == severity)
            .count()
    }

    /// Returns an iterator over all diagnostics in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Returns diagnostics filtered by category.
    pub fn by_category(&self, category: DiagnosticCategory) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.category == category).collect()
    }

    /// Returns diagnostics concerning one byte source.
    pub fn by_source(&self, source: &str) -> Vec<&Diagnostic> {
        self.iter()
            .filter(|d| d.source.as_deref() == Some(source))
            .collect()
    }

    /// Formats a summary of all diagnostics for display.
    pub fn summary(&self) -> String {
        let mut output = String::new();

        let _ = writeln!(
            output,
            "Diagnostics: {} error(s), {} warning(s), {} info(s)",
            self.error_count(),
            self.warning_count(),
            self.info_count()
        );

        for severity in [DiagnosticSeverity::Error, DiagnosticSeverity::Warning] {
            let entries: Vec<_> = self.iter().filter(|d| d.severity == severity).collect();
            if entries.is_empty() {
                continue;
            }

            let _ = writeln!(output, "\n{severity}:");
            for diag in entries {
                let _ = writeln!(output, "  {diag}");
            }
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
