//! Scan configuration.

use crate::metadata::descriptor::{DecodeOptions, DEFAULT_MAX_MAJOR_VERSION};

/// Configuration of a [`crate::Scanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    /// Number of worker threads; 0 uses rayon's default (one per logical CPU)
    pub worker_threads: usize,

    /// Decode `RuntimeInvisible*Annotations` (CLASS retention) in addition to the
    /// runtime-visible ones
    pub include_invisible_annotations: bool,

    /// Newest class file major version accepted (default: 70, Java 26)
    pub max_major_version: u16,

    /// Record a `Reference` diagnostic for every supertype, annotation and nesting
    /// reference that names a class outside the scan
    pub report_unresolved_references: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            worker_threads: 0,
            include_invisible_annotations: true,
            max_major_version: DEFAULT_MAX_MAJOR_VERSION,
            report_unresolved_references: true,
        }
    }
}

impl ScanConfig {
    /// Default configuration on a single worker thread, for deterministic collision handling
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            worker_threads: 1,
            ..Self::default()
        }
    }

    /// Only what reflection can observe: runtime-visible annotations, with every
    /// unresolved reference reported
    #[must_use]
    pub fn strict() -> Self {
        Self {
            include_invisible_annotations: false,
            report_unresolved_references: true,
            ..Self::default()
        }
    }

    /// The per-class subset handed to each decoder
    #[must_use]
    pub fn decode_options(&self) -> DecodeOptions {
        DecodeOptions {
            include_invisible_annotations: self.include_invisible_annotations,
            max_major_version: self.max_major_version,
        }
    }
}
