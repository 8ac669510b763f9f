use std::fmt::Debug;
use std::io;

use crate::pal::DiscoveredCpu;
use crate::{ProcessorId, RawProcessorId};

/// The capability surface a platform must provide: one-shot topology
/// discovery plus get/set of the calling thread's affinity.
///
/// Affinity calls act on the calling thread only and are atomic at the
/// operating system level - a failed call leaves the previous affinity in
/// place. Failures are surfaced verbatim and never retried in this layer.
#[cfg_attr(test, mockall::automock)]
pub(crate) trait Platform: Debug + Send + Sync + 'static {
    /// Enumerates every enabled logical processor, already re-indexed to
    /// dense zero-based socket/core/processing-unit coordinates.
    ///
    /// An empty result means discovery failed. This is non-fatal and is
    /// surfaced by the affinity manager as a "not loaded" state.
    fn discover_cpus(&self) -> Vec<DiscoveredCpu>;

    /// Reads the set of native processor identifiers the calling thread may
    /// currently run on.
    fn current_thread_affinity(&self) -> io::Result<Vec<ProcessorId>>;

    /// Replaces the set of native processor identifiers the calling thread
    /// may run on.
    fn set_current_thread_affinity(&self, ids: &[ProcessorId]) -> io::Result<()>;

    /// Reads the calling thread's affinity in the raw bit-position
    /// representation of the native affinity mask.
    ///
    /// This representation need not match the identifiers returned by
    /// [`current_thread_affinity`][Self::current_thread_affinity]; the
    /// native CPU mapper exists to bridge the two empirically.
    fn current_thread_raw_affinity(&self) -> io::Result<Vec<RawProcessorId>>;
}
