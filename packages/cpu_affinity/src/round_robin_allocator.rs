use std::collections::{BTreeMap, VecDeque};

use crate::{Cpu, CpuSet, ProcessingUnitId};

/// A deterministic rotating dispenser of processors.
///
/// The input set is arranged so that consecutive allocations land on
/// distinct physical cores wherever possible: all processors with
/// processing unit index 0 (the first hardware thread of each core) come
/// before any with index 1, and so on, each group in spec order. Allocation
/// then cycles through that arrangement forever with a period equal to the
/// input set's size.
///
/// # Example
///
/// ```
/// use cpu_affinity::{AffinityManager, RoundRobinAllocator};
///
/// let manager = AffinityManager::new();
/// let mut allocator = RoundRobinAllocator::new(manager.cpus());
///
/// // Hand out a processor per worker; SMT siblings are used last.
/// for worker in 0..4 {
///     if let Some(cpu) = allocator.allocate() {
///         println!("worker {worker} -> {cpu}");
///     }
/// }
/// ```
#[derive(Clone, Debug)]
pub struct RoundRobinAllocator {
    queue: VecDeque<Cpu>,
}

impl RoundRobinAllocator {
    /// Arranges the given processors for allocation.
    ///
    /// An empty input set is permitted and yields an allocator that never
    /// dispenses anything.
    #[must_use]
    pub fn new(cpus: &CpuSet) -> Self {
        let mut by_processing_unit: BTreeMap<ProcessingUnitId, Vec<Cpu>> = BTreeMap::new();

        // CpuSet iterates in spec order, so each group arrives pre-sorted.
        for cpu in cpus {
            by_processing_unit
                .entry(cpu.processing_unit())
                .or_default()
                .push(*cpu);
        }

        Self {
            queue: by_processing_unit.into_values().flatten().collect(),
        }
    }

    /// The next processor in the rotation, or `None` when the allocator was
    /// built from an empty set.
    pub fn allocate(&mut self) -> Option<Cpu> {
        let cpu = self.queue.pop_front()?;
        self.queue.push_back(cpu);
        Some(cpu)
    }

    /// Collects the next `count` rotations into a set.
    ///
    /// Because the result de-duplicates by spec, asking for more processors
    /// than the rotation holds saturates at the full set - callers must
    /// tolerate receiving fewer than requested.
    pub fn allocate_set(&mut self, count: usize) -> CpuSet {
        (0..count).filter_map(|_| self.allocate()).collect()
    }

    /// The number of processors in the rotation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the rotation holds no processors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
