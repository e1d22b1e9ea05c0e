use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The variants fall into three families which the scanner treats differently:
///
/// ## Format errors
/// - [`Error::Malformed`] - Corrupted or invalid class file structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of the byte stream
/// - [`Error::RecursionLimit`] - Signature nesting exceeded the parser's depth limit
///
/// A format error is fatal for the one class being decoded and never for the scan; see
/// [`Error::is_format_error`].
///
/// ## Reference errors
/// - [`Error::ReferenceNotFound`] - A class name could not be resolved in the graph
///
/// ## Scan-fatal errors
/// - [`Error::ConcurrencyInvariant`] - The decoder pool was misused (double release,
///   release of an instance it never handed out)
/// - [`Error::ThreadPool`] - The worker pool could not be created
///
/// # Examples
///
/// ```rust
/// use jvmscope::{metadata::descriptor::ClassDecoder, Error};
///
/// let mut decoder = ClassDecoder::new();
/// match decoder.decode("broken.class", 0, &[0xCA, 0xFE], &Default::default()) {
///     Ok(_) => unreachable!(),
///     Err(e) => assert!(e.is_format_error()),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The class file is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected for
    /// debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the byte stream.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Recursion limit reached while parsing a nested structure.
    ///
    /// The associated value shows the recursion limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// This input is valid but not something the scanner models (e.g. `module-info`).
    #[error("This class file type is not supported - {0}")]
    NotSupported(String),

    /// A byte source could not be read.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// A class name could not be resolved in the graph.
    #[error("Failed to resolve class reference - {0}")]
    ReferenceNotFound(String),

    /// The decoder recycler was misused.
    ///
    /// Double release or release of an untracked instance means the pool bookkeeping is
    /// corrupt; the coordinator aborts as soon as this is observed.
    #[error("Concurrency invariant violated - {0}")]
    ConcurrencyInvariant(String),

    /// The worker pool could not be constructed.
    #[error("Failed to build worker pool - {0}")]
    ThreadPool(String),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),
}

impl Error {
    /// Returns `true` for errors caused by malformed bytes of the class being decoded.
    #[must_use]
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            Error::Malformed { .. } | Error::OutOfBounds | Error::RecursionLimit(_)
        )
    }
}
