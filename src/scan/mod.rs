//! Parallel scanning of many class byte streams.
//!
//! # Key Components
//!
//! - [`Scanner`] - Fans sources out across a worker pool and builds the graph
//! - [`ScanConfig`] - Worker count and decoding options
//! - [`ScanResult`] - The finished graph, its diagnostics and the decoder pool
//! - [`Recycler`] - Lock-free pool of reusable decoders
//!
//! # Examples
//!
//! ```rust
//! use jvmscope::{ScanConfig, Scanner};
//!
//! let sources = vec![("Broken.class".to_string(), vec![0xCA, 0xFE])];
//! let result = Scanner::new(ScanConfig::sequential()).scan(sources)?;
//!
//! assert!(result.graph().is_empty());
//! assert_eq!(result.diagnostics().error_count(), 1);
//! result.close();
//! # Ok::<(), jvmscope::Error>(())
//! ```

mod config;
mod coordinator;
mod recycler;

use std::sync::Arc;

pub use config::ScanConfig;
pub use coordinator::Scanner;
pub use recycler::{Recyclable, Recycled, Recycler};

use crate::metadata::{descriptor::ClassDecoder, diagnostics::Diagnostics, graph::ClassGraph};

/// Outcome of [`Scanner::scan`]: a possibly partial graph and everything that went wrong.
///
/// The result owns the decoder pool of its scan; [`ScanResult::close`] (or dropping the
/// result) releases it.
#[derive(Debug)]
pub struct ScanResult {
    graph: ClassGraph,
    diagnostics: Arc<Diagnostics>,
    recycler: Recycler<ClassDecoder>,
    cancelled: bool,
}

impl ScanResult {
    pub(crate) fn new(
        graph: ClassGraph,
        diagnostics: Diagnostics,
        recycler: Recycler<ClassDecoder>,
        cancelled: bool,
    ) -> Self {
        ScanResult {
            graph,
            diagnostics: Arc::new(diagnostics),
            recycler,
            cancelled,
        }
    }

    /// The class graph
    #[must_use]
    pub fn graph(&self) -> &ClassGraph {
        &self.graph
    }

    /// Diagnostics recorded during the scan
    #[must_use]
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Shared handle to the diagnostics, usable after the result is closed
    #[must_use]
    pub fn shared_diagnostics(&self) -> Arc<Diagnostics> {
        self.diagnostics.clone()
    }

    /// Returns `true` if the scan stopped early because its token was cancelled
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Number of decoders the scan created
    #[must_use]
    pub fn decoders_created(&self) -> u64 {
        self.recycler.created()
    }

    /// Close the decoder pool and keep only the graph
    #[must_use]
    pub fn into_graph(self) -> ClassGraph {
        self.recycler.force_close();
        self.graph
    }

    /// Release every pooled resource of the scan
    pub fn close(self) {
        self.recycler.force_close();
    }
}
