use std::collections::BTreeMap;

use foldhash::{HashMap, HashMapExt};

use crate::pal::Platform;
use crate::{AffinityManager, Cpu, CpuSpec, Error, RawProcessorId, Result};

/// A bijection between processors and the raw bit positions of the native
/// affinity mask, built by empirically probing every processor.
///
/// The identifiers a discovery backend assigns to processors need not match
/// the bit ordering the operating system uses in affinity masks. This mapper
/// bridges the two: it pins the calling thread to each processor in turn,
/// reads back the raw mask, and records which bit lit up.
///
/// Construction rebinds the calling thread and is therefore inherently
/// serial: run it once, during initialization, and never concurrently with
/// other affinity operations on the same thread. The thread's original
/// affinity is restored before construction returns, whether it succeeds or
/// fails.
///
/// # Example
///
/// ```no_run
/// use cpu_affinity::{AffinityManager, NativeCpuMapper};
///
/// let manager = AffinityManager::new();
/// let mapper = NativeCpuMapper::new(&manager).unwrap();
///
/// for cpu in manager.cpus() {
///     let raw = mapper.native_from_cpu(cpu).unwrap();
///     println!("{cpu} occupies affinity bit {raw}");
/// }
/// ```
#[derive(Debug)]
pub struct NativeCpuMapper {
    cpu_by_raw: HashMap<RawProcessorId, Cpu>,
    raw_by_spec: BTreeMap<CpuSpec, RawProcessorId>,
}

impl NativeCpuMapper {
    /// Probes every processor known to the manager and builds the mapping.
    ///
    /// No partial mapping is ever published: any failure discards everything
    /// recorded so far.
    ///
    /// # Errors
    ///
    /// [`Error::NotLoaded`] when the manager holds no topology;
    /// [`Error::AffinityCall`] when saving, probing or reading affinity
    /// fails; [`Error::ProbeInconclusive`] when a single-processor binding
    /// is not observable as a single raw identifier (typical of sandboxed
    /// environments). In every case the thread's original affinity has been
    /// restored, where the initial save succeeded.
    pub fn new(manager: &AffinityManager) -> Result<Self> {
        if !manager.has_cpus() {
            return Err(Error::NotLoaded);
        }

        let original = manager.affinity()?;

        // The probe rebinds the thread; put the saved affinity back on every
        // exit path, success included. The restore result is deliberately
        // discarded - there is no better recovery available here.
        let _restore = scopeguard::guard(original, |original| {
            manager.set_affinity(&original).ok();
        });

        let mut cpu_by_raw = HashMap::new();
        let mut raw_by_spec = BTreeMap::new();

        for cpu in manager.cpus() {
            manager.pin(*cpu)?;

            let raw_ids = manager
                .platform()
                .current_thread_raw_affinity()
                .map_err(|source| Error::AffinityCall { source })?;

            if raw_ids.len() != 1 {
                return Err(Error::ProbeInconclusive {
                    observed: raw_ids.len(),
                });
            }

            cpu_by_raw.insert(raw_ids[0], *cpu);
            raw_by_spec.insert(cpu.spec(), raw_ids[0]);
        }

        Ok(Self {
            cpu_by_raw,
            raw_by_spec,
        })
    }

    /// The processor whose affinity bit is `raw_id`, if the probe observed
    /// one.
    #[must_use]
    pub fn cpu_from_native(&self, raw_id: RawProcessorId) -> Option<Cpu> {
        self.cpu_by_raw.get(&raw_id).copied()
    }

    /// The affinity bit occupied by `cpu`, if the probe observed one.
    #[must_use]
    pub fn native_from_cpu(&self, cpu: &Cpu) -> Option<RawProcessorId> {
        self.raw_by_spec.get(&cpu.spec()).copied()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io;
    use std::sync::Arc;

    use super::*;
    use crate::pal::{FakePlatform, MockPlatform, PlatformFacade, RawAffinityMode, discovered};

    #[test]
    fn builds_a_bijection() {
        // Raw identifiers diverge from native identifiers by a fixed shift.
        let fake = FakePlatform::dual_socket().with_raw_mode(RawAffinityMode::Offset(16));
        let manager = AffinityManager::with_platform(PlatformFacade::from_fake(fake));

        let mapper = NativeCpuMapper::new(&manager).unwrap();

        for cpu in manager.cpus() {
            let raw = mapper.native_from_cpu(cpu).unwrap();
            assert_eq!(raw, cpu.id() + 16);
            assert_eq!(mapper.cpu_from_native(raw), Some(*cpu));
        }
    }

    #[test]
    fn unknown_identifiers_are_not_mapped() {
        let manager = AffinityManager::with_platform(PlatformFacade::from_fake(
            FakePlatform::dual_socket(),
        ));

        let mapper = NativeCpuMapper::new(&manager).unwrap();

        assert_eq!(mapper.cpu_from_native(999), None);
    }

    #[test]
    fn restores_affinity_after_success() {
        let fake = Arc::new(FakePlatform::dual_socket().with_initial_affinity(vec![1, 5]));
        let manager = AffinityManager::with_platform(PlatformFacade::from(Arc::clone(&fake)));

        let before = manager.affinity().unwrap();
        NativeCpuMapper::new(&manager).unwrap();

        assert_eq!(manager.affinity().unwrap(), before);
    }

    #[test]
    fn inconclusive_probe_aborts_and_restores() {
        let fake = FakePlatform::dual_socket()
            .with_initial_affinity(vec![1, 5])
            .with_raw_mode(RawAffinityMode::FullMask);
        let manager = AffinityManager::with_platform(PlatformFacade::from_fake(fake));

        let before = manager.affinity().unwrap();
        let result = NativeCpuMapper::new(&manager);

        assert!(matches!(
            result,
            Err(Error::ProbeInconclusive { observed: 8 })
        ));
        assert_eq!(manager.affinity().unwrap(), before);
    }

    #[test]
    fn not_loaded_is_an_error() {
        let manager =
            AffinityManager::with_platform(PlatformFacade::from_fake(FakePlatform::new(vec![])));

        assert!(matches!(
            NativeCpuMapper::new(&manager),
            Err(Error::NotLoaded)
        ));
    }

    #[test]
    fn failed_save_aborts_before_probing() {
        let mut mock = MockPlatform::new();
        mock.expect_discover_cpus()
            .returning(|| vec![discovered(0, 0, 0, 0, -1)]);
        mock.expect_current_thread_affinity()
            .returning(|| Err(io::Error::from(io::ErrorKind::PermissionDenied)));
        // No set_current_thread_affinity expectation: probing must not start.

        let manager = AffinityManager::with_platform(PlatformFacade::from_mock(mock));

        assert!(matches!(
            NativeCpuMapper::new(&manager),
            Err(Error::AffinityCall { .. })
        ));
    }

    #[test]
    fn failed_probe_pin_aborts_and_restores() {
        let mut mock = MockPlatform::new();
        mock.expect_discover_cpus()
            .returning(|| vec![discovered(0, 0, 0, 0, -1)]);
        mock.expect_current_thread_affinity().returning(|| Ok(vec![0]));

        // The singleton pin fails; the restore that follows must succeed.
        let mut sequence = mockall::Sequence::new();
        mock.expect_set_current_thread_affinity()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Err(io::Error::from(io::ErrorKind::PermissionDenied)));
        mock.expect_set_current_thread_affinity()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|_| Ok(()));

        let manager = AffinityManager::with_platform(PlatformFacade::from_mock(mock));

        assert!(matches!(
            NativeCpuMapper::new(&manager),
            Err(Error::AffinityCall { .. })
        ));
    }
}
