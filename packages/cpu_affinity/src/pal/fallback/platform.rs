use std::cell::RefCell;
use std::io;
use std::num::NonZeroUsize;
use std::sync::OnceLock;

use crate::pal::{DiscoveredCpu, Platform};
use crate::{CpuSpec, ProcessorId, RawProcessorId};

thread_local! {
    /// The simulated affinity of the current thread.
    ///
    /// On unsupported platforms no real pinning takes place; we track the
    /// requested state per thread so that get-after-set and save/restore
    /// contracts still hold observationally.
    static THREAD_AFFINITY: RefCell<Option<Vec<ProcessorId>>> = const { RefCell::new(None) };
}

/// Fallback platform for operating systems without native support.
///
/// Topology is synthesized from `std::thread::available_parallelism()`:
/// every logical processor is presented as its own single-threaded core on
/// socket 0, with no NUMA information. Affinity changes are recorded per
/// thread but never applied to the OS scheduler.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform;

static PROCESSOR_COUNT: OnceLock<usize> = OnceLock::new();

/// Singleton instance of `BuildTargetPlatform`, used by public API types to
/// hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform = BuildTargetPlatform;

impl BuildTargetPlatform {
    #[expect(clippy::unused_self, reason = "matches the other platform implementations")]
    fn processor_count(&self) -> usize {
        *PROCESSOR_COUNT.get_or_init(|| {
            std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1)
        })
    }

    fn all_ids(&self) -> Vec<ProcessorId> {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "unrealistic to have more than u32::MAX processors"
        )]
        let count = self.processor_count() as u32;

        (0..count).collect()
    }
}

impl Platform for BuildTargetPlatform {
    fn discover_cpus(&self) -> Vec<DiscoveredCpu> {
        self.all_ids()
            .into_iter()
            .map(|id| {
                #[expect(
                    clippy::cast_possible_wrap,
                    reason = "processor counts stay far below i32::MAX"
                )]
                let core = id as i32;

                DiscoveredCpu {
                    spec: CpuSpec::new(0, core, 0),
                    id,
                    numa_node: -1,
                }
            })
            .collect()
    }

    fn current_thread_affinity(&self) -> io::Result<Vec<ProcessorId>> {
        Ok(THREAD_AFFINITY.with_borrow(|affinity| {
            affinity.clone().unwrap_or_else(|| self.all_ids())
        }))
    }

    fn set_current_thread_affinity(&self, ids: &[ProcessorId]) -> io::Result<()> {
        // An empty affinity set is rejected, matching real platforms.
        if ids.is_empty() {
            return Err(io::Error::from(io::ErrorKind::InvalidInput));
        }

        THREAD_AFFINITY.with_borrow_mut(|affinity| *affinity = Some(ids.to_vec()));
        Ok(())
    }

    fn current_thread_raw_affinity(&self) -> io::Result<Vec<RawProcessorId>> {
        self.current_thread_affinity()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn has_at_least_one_processor() {
        assert!(BUILD_TARGET_PLATFORM.processor_count() >= 1);
        assert!(!BUILD_TARGET_PLATFORM.discover_cpus().is_empty());
    }

    #[test]
    fn synthesized_topology_is_dense_and_flat() {
        let platform = BuildTargetPlatform;

        for (index, cpu) in platform.discover_cpus().iter().enumerate() {
            assert_eq!(cpu.spec.socket(), 0);
            assert_eq!(cpu.spec.processing_unit(), 0);
            assert_eq!(cpu.spec.core() as usize, index);
            assert_eq!(cpu.numa_node, -1);
        }
    }

    #[test]
    fn unpinned_thread_may_run_anywhere() {
        // Thread-local state: use a scratch thread to stay isolated.
        std::thread::spawn(|| {
            let platform = BuildTargetPlatform;

            let affinity = platform.current_thread_affinity().unwrap();

            assert_eq!(affinity, platform.all_ids());
        })
        .join()
        .unwrap();
    }

    #[test]
    fn simulated_pinning_round_trips() {
        std::thread::spawn(|| {
            let platform = BuildTargetPlatform;

            platform.set_current_thread_affinity(&[0]).unwrap();

            assert_eq!(platform.current_thread_affinity().unwrap(), vec![0]);
            assert_eq!(platform.current_thread_raw_affinity().unwrap(), vec![0]);
        })
        .join()
        .unwrap();
    }

    #[test]
    fn empty_affinity_set_is_rejected() {
        let platform = BuildTargetPlatform;

        platform.set_current_thread_affinity(&[]).unwrap_err();
    }
}
