use std::io;

use thiserror::Error;

use crate::ProcessorId;

/// Errors that can occur when working with processor topology and thread
/// affinity.
///
/// All failures are local to the operation that returned them: nothing in
/// this crate retries, and no operation leaves internal state partially
/// updated on failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Topology discovery produced zero processors, so there is nothing to
    /// operate on. Queryable up front via
    /// [`AffinityManager::has_cpus()`][crate::AffinityManager::has_cpus].
    #[error("no processor topology has been loaded")]
    NotLoaded,

    /// An affinity system call failed. The operating system error is
    /// propagated verbatim; the call is not retried.
    #[error("affinity system call failed: {source}")]
    AffinityCall {
        /// The underlying operating system error.
        #[source]
        source: io::Error,
    },

    /// The operating system reported a processor that topology discovery
    /// never produced. This can only happen if the topology changed after
    /// discovery (e.g. processor hot-plug), which this crate does not
    /// support.
    #[error(
        "the operating system reported processor {id}, which is not part of the discovered topology"
    )]
    UnknownProcessor {
        /// The unrecognized native processor identifier.
        id: ProcessorId,
    },

    /// While probing a single-processor binding, the native affinity read
    /// did not observe exactly one identifier. Typical in restricted or
    /// sandboxed execution environments where affinity changes do not take
    /// effect.
    #[error(
        "probing a single-processor binding observed {observed} native identifiers where exactly one was expected"
    )]
    ProbeInconclusive {
        /// How many identifiers the native read reported.
        observed: usize,
    },

    /// [`AffinityStack::pop_affinity()`][crate::AffinityStack::pop_affinity]
    /// was called with no snapshot on the stack.
    #[error("the affinity stack has no snapshot to restore")]
    StackEmpty,

    /// A string could not be parsed as a `socket,core,processing_unit`
    /// triple.
    #[error("invalid processor specification: '{invalid_value}' is not a socket,core,processing_unit triple")]
    InvalidSpecFormat {
        /// The value that failed to parse.
        invalid_value: String,
    },
}

/// A specialized `Result` type for topology and affinity operations,
/// returning the crate's [`Error`] type as the error value.
pub type Result<T> = std::result::Result<T, Error>;
