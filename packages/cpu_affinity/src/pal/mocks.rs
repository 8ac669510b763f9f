use std::io;
use std::sync::Mutex;

use crate::pal::{DiscoveredCpu, Platform};
use crate::{CpuSpec, NumaNodeId, ProcessorId, RawProcessorId};

/// How [`FakePlatform`] reports the raw native-affinity representation.
#[derive(Clone, Copy, Debug)]
pub(crate) enum RawAffinityMode {
    /// Raw identifiers are the native identifiers shifted by a fixed offset,
    /// simulating a backend whose own numbering diverges from the bit order
    /// of the OS affinity mask.
    Offset(u32),

    /// Raw reads always report every discovered processor regardless of the
    /// current affinity, simulating a restricted environment where affinity
    /// changes do not take effect.
    FullMask,
}

/// A stateful in-memory platform: a scripted topology plus a simulated
/// current affinity.
///
/// Unlike the thread-local state of the fallback platform, the simulated
/// affinity here is a plain field, so tests can exercise save/restore logic
/// without spawning threads. Use `MockPlatform` instead when a test needs to
/// script failures of individual calls.
#[derive(Debug)]
pub(crate) struct FakePlatform {
    cpus: Vec<DiscoveredCpu>,
    affinity: Mutex<Vec<ProcessorId>>,
    raw_mode: RawAffinityMode,
}

impl FakePlatform {
    pub(crate) fn new(cpus: Vec<DiscoveredCpu>) -> Self {
        let affinity = cpus.iter().map(|cpu| cpu.id).collect();

        Self {
            cpus,
            affinity: Mutex::new(affinity),
            raw_mode: RawAffinityMode::Offset(0),
        }
    }

    /// Two sockets with two two-way-SMT cores each, one NUMA node per
    /// socket, with native identifiers interleaved the way x86 systems
    /// number hyperthread siblings.
    pub(crate) fn dual_socket() -> Self {
        Self::new(vec![
            discovered(0, 0, 0, 0, 0),
            discovered(0, 0, 1, 4, 0),
            discovered(0, 1, 0, 1, 0),
            discovered(0, 1, 1, 5, 0),
            discovered(1, 0, 0, 2, 1),
            discovered(1, 0, 1, 6, 1),
            discovered(1, 1, 0, 3, 1),
            discovered(1, 1, 1, 7, 1),
        ])
    }

    pub(crate) fn with_raw_mode(mut self, raw_mode: RawAffinityMode) -> Self {
        self.raw_mode = raw_mode;
        self
    }

    pub(crate) fn with_initial_affinity(self, ids: Vec<ProcessorId>) -> Self {
        *self.affinity.lock().unwrap() = ids;
        self
    }
}

impl Platform for FakePlatform {
    fn discover_cpus(&self) -> Vec<DiscoveredCpu> {
        self.cpus.clone()
    }

    fn current_thread_affinity(&self) -> io::Result<Vec<ProcessorId>> {
        Ok(self.affinity.lock().unwrap().clone())
    }

    fn set_current_thread_affinity(&self, ids: &[ProcessorId]) -> io::Result<()> {
        if ids.is_empty() {
            return Err(io::Error::from(io::ErrorKind::InvalidInput));
        }

        *self.affinity.lock().unwrap() = ids.to_vec();
        Ok(())
    }

    fn current_thread_raw_affinity(&self) -> io::Result<Vec<RawProcessorId>> {
        match self.raw_mode {
            RawAffinityMode::Offset(offset) => Ok(self
                .affinity
                .lock()
                .unwrap()
                .iter()
                .map(|id| id + offset)
                .collect()),
            RawAffinityMode::FullMask => Ok(self.cpus.iter().map(|cpu| cpu.id).collect()),
        }
    }
}

/// Shorthand for building one scripted topology tuple.
pub(crate) fn discovered(
    socket: i32,
    core: i32,
    processing_unit: i32,
    id: ProcessorId,
    numa_node: NumaNodeId,
) -> DiscoveredCpu {
    DiscoveredCpu {
        spec: CpuSpec::new(socket, core, processing_unit),
        id,
        numa_node,
    }
}
