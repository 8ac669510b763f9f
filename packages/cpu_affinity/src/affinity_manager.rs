use std::collections::BTreeMap;

use foldhash::{HashMap, HashMapExt};

use crate::pal::{Platform, PlatformFacade};
use crate::{
    CoreId, Cpu, CpuSet, CpuSpec, Error, NumaNodeId, ProcessingUnitId, ProcessorId, Result,
    SocketId,
};

/// The collection of all processors discovered on the system, with lookup
/// indices for every topology axis and get/set of the calling thread's
/// affinity.
///
/// Discovery runs exactly once, at construction time. The resulting indices
/// are immutable for the lifetime of the manager - there is no re-scan, and
/// processor hot-plug is unsupported. Because the indices never change after
/// construction, a manager may be shared freely across threads; affinity
/// calls always act on whichever thread makes them.
///
/// Discovery failure is non-fatal: the manager simply reports
/// [`has_cpus()`][Self::has_cpus] as `false` and every lookup comes back
/// empty.
///
/// # Example
///
/// ```
/// use cpu_affinity::AffinityManager;
///
/// let manager = AffinityManager::new();
///
/// for cpu in manager.cpus() {
///     println!("{cpu}");
/// }
/// ```
#[derive(Debug)]
pub struct AffinityManager {
    platform: PlatformFacade,

    cpus: CpuSet,
    cpu_by_id: HashMap<ProcessorId, Cpu>,
    cpu_by_spec: BTreeMap<CpuSpec, Cpu>,
    cpu_by_index: Vec<Cpu>,
    cpus_by_numa: BTreeMap<NumaNodeId, CpuSet>,
    cpus_by_socket: BTreeMap<SocketId, CpuSet>,
    cpus_by_core: BTreeMap<CoreId, CpuSet>,
    cpus_by_processing_unit: BTreeMap<ProcessingUnitId, CpuSet>,
    cpus_by_socket_and_core: BTreeMap<(SocketId, CoreId), CpuSet>,

    loaded: bool,
}

impl AffinityManager {
    /// Discovers the processor topology of the current system and builds all
    /// lookup indices.
    #[must_use]
    pub fn new() -> Self {
        Self::with_platform(PlatformFacade::target())
    }

    pub(crate) fn with_platform(platform: PlatformFacade) -> Self {
        let discovered = platform.discover_cpus();

        let mut manager = Self {
            platform,
            cpus: CpuSet::new(),
            cpu_by_id: HashMap::new(),
            cpu_by_spec: BTreeMap::new(),
            cpu_by_index: Vec::new(),
            cpus_by_numa: BTreeMap::new(),
            cpus_by_socket: BTreeMap::new(),
            cpus_by_core: BTreeMap::new(),
            cpus_by_processing_unit: BTreeMap::new(),
            cpus_by_socket_and_core: BTreeMap::new(),
            loaded: false,
        };

        for entry in discovered {
            let cpu = Cpu::new(entry.spec, entry.id, entry.numa_node);

            manager.cpus.insert(cpu);
            manager.cpu_by_id.insert(cpu.id(), cpu);
            manager.cpu_by_spec.insert(cpu.spec(), cpu);
            manager
                .cpus_by_numa
                .entry(cpu.numa_node())
                .or_default()
                .insert(cpu);
            manager
                .cpus_by_socket
                .entry(cpu.socket())
                .or_default()
                .insert(cpu);
            manager
                .cpus_by_core
                .entry(cpu.core())
                .or_default()
                .insert(cpu);
            manager
                .cpus_by_processing_unit
                .entry(cpu.processing_unit())
                .or_default()
                .insert(cpu);
            manager
                .cpus_by_socket_and_core
                .entry((cpu.socket(), cpu.core()))
                .or_default()
                .insert(cpu);
        }

        manager.cpu_by_index = manager.cpus.iter().copied().collect();
        manager.loaded = !manager.cpus.is_empty();

        manager
    }

    pub(crate) fn platform(&self) -> &PlatformFacade {
        &self.platform
    }

    /// Whether topology discovery produced at least one processor.
    ///
    /// When this is `false`, every lookup deterministically comes back empty
    /// and affinity operations return [`Error::NotLoaded`].
    #[must_use]
    pub fn has_cpus(&self) -> bool {
        self.loaded
    }

    /// The processor with the given native identifier, if known.
    #[must_use]
    pub fn cpu_from_id(&self, id: ProcessorId) -> Option<Cpu> {
        self.cpu_by_id.get(&id).copied()
    }

    /// The processor at the given topology address, if known.
    #[must_use]
    pub fn cpu_from_spec(&self, spec: CpuSpec) -> Option<Cpu> {
        self.cpu_by_spec.get(&spec).copied()
    }

    /// The processor at the given position in the stable enumeration order
    /// (spec order), if in range.
    #[must_use]
    pub fn cpu_from_index(&self, index: usize) -> Option<Cpu> {
        self.cpu_by_index.get(index).copied()
    }

    /// All discovered processors, in spec order. Empty when discovery
    /// failed.
    #[must_use]
    pub fn cpus(&self) -> &CpuSet {
        &self.cpus
    }

    /// The processors on the given NUMA node. Empty when the node is
    /// unknown.
    #[must_use]
    pub fn cpus_by_numa(&self, numa_node: NumaNodeId) -> CpuSet {
        self.cpus_by_numa
            .get(&numa_node)
            .cloned()
            .unwrap_or_default()
    }

    /// The processors on the given socket. Empty when the socket is unknown.
    #[must_use]
    pub fn cpus_by_socket(&self, socket: SocketId) -> CpuSet {
        self.cpus_by_socket.get(&socket).cloned().unwrap_or_default()
    }

    /// The processors whose zero-based core index equals `core`, aggregated
    /// across all sockets: "core k" means every socket's k-th core.
    #[must_use]
    pub fn cpus_by_core(&self, core: CoreId) -> CpuSet {
        self.cpus_by_core.get(&core).cloned().unwrap_or_default()
    }

    /// The processors whose zero-based processing unit index equals
    /// `processing_unit`, aggregated across all cores. Index 0 selects the
    /// first hardware thread of every core.
    #[must_use]
    pub fn cpus_by_processing_unit(&self, processing_unit: ProcessingUnitId) -> CpuSet {
        self.cpus_by_processing_unit
            .get(&processing_unit)
            .cloned()
            .unwrap_or_default()
    }

    /// The processors on one specific core of one specific socket.
    #[must_use]
    pub fn cpus_by_socket_and_core(&self, socket: SocketId, core: CoreId) -> CpuSet {
        self.cpus_by_socket_and_core
            .get(&(socket, core))
            .cloned()
            .unwrap_or_default()
    }

    /// Reads the set of processors the calling thread may currently run on.
    ///
    /// # Errors
    ///
    /// [`Error::NotLoaded`] when discovery produced no processors;
    /// [`Error::AffinityCall`] when the OS read fails;
    /// [`Error::UnknownProcessor`] when the OS reports a processor that
    /// discovery never produced, which can only happen if the topology
    /// changed after discovery.
    pub fn affinity(&self) -> Result<CpuSet> {
        if !self.loaded {
            return Err(Error::NotLoaded);
        }

        let ids = self
            .platform
            .current_thread_affinity()
            .map_err(|source| Error::AffinityCall { source })?;

        let mut cpus = CpuSet::new();

        for id in ids {
            let cpu = self
                .cpu_from_id(id)
                .ok_or(Error::UnknownProcessor { id })?;
            cpus.insert(cpu);
        }

        Ok(cpus)
    }

    /// Replaces the set of processors the calling thread may run on.
    ///
    /// The whole set is applied in one OS call; there is no partial
    /// application. The result is propagated verbatim and the call is not
    /// retried.
    ///
    /// # Errors
    ///
    /// [`Error::AffinityCall`] when the OS rejects the change (including for
    /// an empty set).
    pub fn set_affinity(&self, cpus: &CpuSet) -> Result<()> {
        let ids: Vec<ProcessorId> = cpus.iter().map(Cpu::id).collect();

        self.platform
            .set_current_thread_affinity(&ids)
            .map_err(|source| Error::AffinityCall { source })
    }

    /// Restricts the calling thread to a single processor.
    ///
    /// # Errors
    ///
    /// [`Error::AffinityCall`] when the OS rejects the change.
    pub fn pin(&self, cpu: Cpu) -> Result<()> {
        self.set_affinity(&[cpu].into_iter().collect())
    }
}

impl Default for AffinityManager {
    fn default() -> Self {
        Self::new()
    }
}
