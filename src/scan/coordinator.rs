//! Parallel scan coordinator.

use rayon::{prelude::*, ThreadPoolBuilder};

use crate::{
    file::ByteSource,
    metadata::{
        descriptor::{ClassDecoder, DecodeOptions},
        diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics},
        graph::{DescriptorRegistry, Registration},
    },
    scan::{Recyclable, Recycler, ScanConfig, ScanResult},
    utils::synchronization::CancellationToken,
    Error, Result,
};

impl Recyclable for ClassDecoder {
    fn reset(&mut self) {
        ClassDecoder::reset(self);
    }

    fn close(&mut self) {
        self.release_buffers();
    }
}

/// Decodes many class byte streams in parallel into one [`crate::metadata::graph::ClassGraph`].
///
/// Each source becomes one task on a dedicated rayon pool. A task reads the bytes, decodes
/// them with a pooled [`ClassDecoder`] and registers the descriptor; any failure specific to
/// that source becomes a diagnostic and the scan moves on. Only a violated pool invariant
/// aborts the scan.
///
/// # Examples
///
/// ```rust,no_run
/// use jvmscope::{file::physical::ClassPathEntry, ScanConfig, Scanner};
///
/// let sources = vec![
///     ClassPathEntry::new("target/classes/com/example/App.class"),
///     ClassPathEntry::new("target/classes/com/example/Service.class"),
/// ];
///
/// let result = Scanner::new(ScanConfig::default()).scan(sources)?;
/// println!("{} classes", result.graph().len());
/// for diagnostic in result.diagnostics().iter() {
///     println!("{diagnostic}");
/// }
/// # Ok::<(), jvmscope::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    config: ScanConfig,
    cancellation: CancellationToken,
}

impl Scanner {
    /// Create a scanner with its own cancellation token
    #[must_use]
    pub fn new(config: ScanConfig) -> Self {
        Scanner {
            config,
            cancellation: CancellationToken::new(),
        }
    }

    /// Observe an externally owned cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The token that stops this scanner between two classes
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan `sources` and build the class graph.
    ///
    /// Sources are numbered in iteration order; that number is recorded as
    /// `source_index` and orders the graph. The result is returned even if some or all
    /// sources failed, and is marked as cancelled if the token fired during the scan.
    ///
    /// # Errors
    /// Returns [`crate::Error::ThreadPool`] if the worker pool cannot be built and
    /// [`crate::Error::ConcurrencyInvariant`] if the decoder pool was misused.
    pub fn scan<I, S>(&self, sources: I) -> Result<ScanResult>
    where
        I: IntoIterator<Item = S>,
        S: ByteSource,
    {
        let sources: Vec<S> = sources.into_iter().collect();
        let diagnostics = Diagnostics::new();
        let registry = DescriptorRegistry::new();
        let recycler = Recycler::new(|| Ok(ClassDecoder::new()));
        let options = self.config.decode_options();

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.config.worker_threads)
            .thread_name(|index| format!("jvmscope-worker-{index}"))
            .build()
            .map_err(|error| Error::ThreadPool(error.to_string()))?;

        let outcome = pool.install(|| {
            sources
                .par_iter()
                .enumerate()
                .try_for_each(|(index, source)| {
                    if self.cancellation.is_cancelled() {
                        return Ok(());
                    }
                    self.process(index, source, &options, &recycler, &registry, &diagnostics)
                })
        });

        if let Err(error) = outcome {
            let reclaimed = recycler.force_close();
            tracing::warn!(
                "scan aborted with {} decoders checked out: {}",
                reclaimed,
                error
            );
            return Err(error);
        }

        let outstanding = recycler.checked_out_count();
        if outstanding > 0 {
            diagnostics.warning(
                DiagnosticCategory::Resource,
                format!("{outstanding} decoders were not returned to the pool"),
            );
        }

        let cancelled = self.cancellation.is_cancelled();
        let registered = registry.len();
        let graph = registry.into_graph(&diagnostics, self.config.report_unresolved_references);

        tracing::info!(
            "scanned {} sources: {} classes, {} errors, {} warnings{}",
            sources.len(),
            registered,
            diagnostics.error_count(),
            diagnostics.warning_count(),
            if cancelled { " (cancelled)" } else { "" }
        );

        Ok(ScanResult::new(graph, diagnostics, recycler, cancelled))
    }

    /// Decode and register one source; only pool misuse is returned as an error
    fn process<S: ByteSource>(
        &self,
        index: usize,
        source: &S,
        options: &DecodeOptions,
        recycler: &Recycler<ClassDecoder>,
        registry: &DescriptorRegistry,
        diagnostics: &Diagnostics,
    ) -> Result<()> {
        let identifier = source.identifier();
        let report = |severity, category, message: String| {
            diagnostics.push(Diagnostic::new(severity, category, message).with_source(identifier));
        };

        let bytes = match source.read_bytes() {
            Ok(bytes) => bytes,
            Err(error) => {
                tracing::debug!("skipping unreadable source {}: {}", identifier, error);
                report(
                    DiagnosticSeverity::Error,
                    DiagnosticCategory::Io,
                    format!("Failed to read class bytes: {error}"),
                );
                return Ok(());
            }
        };

        let decoder = recycler.acquire()?;
        let decoded = decoder.lock().decode(identifier, index, &bytes, options);
        recycler.release(decoder)?;

        match decoded {
            Ok(descriptor) => match registry.register(descriptor) {
                Registration::Inserted(descriptor) => {
                    tracing::trace!("registered {} from {}", descriptor.name, identifier);
                }
                Registration::Collision {
                    existing,
                    rejected_source,
                } => {
                    tracing::warn!(
                        "duplicate class {}: keeping {}, skipping {}",
                        existing.name,
                        existing.source,
                        rejected_source
                    );
                    diagnostics.push(
                        Diagnostic::new(
                            DiagnosticSeverity::Warning,
                            DiagnosticCategory::Collision,
                            format!(
                                "Duplicate class {} already registered from {}",
                                existing.name, existing.source
                            ),
                        )
                        .with_source(rejected_source)
                        .with_class(existing.name.as_str()),
                    );
                }
            },
            Err(Error::NotSupported(what)) => {
                tracing::debug!("skipping {}: unsupported {}", identifier, what);
                report(
                    DiagnosticSeverity::Info,
                    DiagnosticCategory::Unsupported,
                    format!("Skipped unsupported {what}"),
                );
            }
            Err(error) if error.is_format_error() => {
                tracing::debug!("skipping malformed class {}: {}", identifier, error);
                report(
                    DiagnosticSeverity::Error,
                    DiagnosticCategory::Format,
                    error.to_string(),
                );
            }
            Err(error @ Error::ConcurrencyInvariant(_)) => return Err(error),
            Err(error) => {
                tracing::debug!("skipping {}: {}", identifier, error);
                report(
                    DiagnosticSeverity::Error,
                    DiagnosticCategory::General,
                    error.to_string(),
                );
            }
        }

        Ok(())
    }
}
