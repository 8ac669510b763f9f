use std::{io, mem};

use foldhash::{HashMap, HashMapExt};
use libc::cpu_set_t;

use crate::pal::linux::{Bindings, BindingsFacade, Filesystem, FilesystemFacade, cpulist};
use crate::pal::{DiscoveredCpu, Platform};
use crate::{CoreId, CpuSpec, NumaNodeId, ProcessingUnitId, ProcessorId, RawProcessorId, SocketId};

/// Singleton instance of `BuildTargetPlatform`, used by public API types to
/// hook up to the correct PAL implementation.
pub(crate) static BUILD_TARGET_PLATFORM: BuildTargetPlatform =
    BuildTargetPlatform::new(FilesystemFacade::target(), BindingsFacade::target());

/// The platform that matches the crate's build target: topology from the
/// `/sys` virtual filesystem, affinity via the scheduler system calls.
#[derive(Debug)]
pub(crate) struct BuildTargetPlatform {
    filesystem: FilesystemFacade,
    bindings: BindingsFacade,
}

/// One logical processor as the OS describes it, before re-indexing. The
/// package and core identifiers here use raw OS numbering, which is not
/// guaranteed dense or zero-based.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct RawCpu {
    id: ProcessorId,
    numa_node: NumaNodeId,
    package_id: i32,
    core_id: i32,
}

impl BuildTargetPlatform {
    pub(crate) const fn new(filesystem: FilesystemFacade, bindings: BindingsFacade) -> Self {
        Self {
            filesystem,
            bindings,
        }
    }

    /// Enumerates processors NUMA-node-first, falling back to a flat walk of
    /// all possible processors when the system exposes no NUMA information.
    fn read_raw_topology(&self) -> Vec<RawCpu> {
        let mut raw = Vec::new();

        let nodes = read_listing(self.filesystem.get_numa_nodes_with_cpus_contents());

        if nodes.is_empty() {
            for id in read_listing(self.filesystem.get_possible_cpus_contents()) {
                self.read_raw_cpu(&mut raw, id, -1);
            }
        } else {
            for node in nodes {
                let cpus = read_listing(self.filesystem.get_numa_node_cpulist_contents(node));

                for id in cpus {
                    self.read_raw_cpu(&mut raw, id, NumaNodeId::try_from(node).unwrap_or(-1));
                }
            }
        }

        raw
    }

    fn read_raw_cpu(&self, raw: &mut Vec<RawCpu>, id: ProcessorId, numa_node: NumaNodeId) {
        let package_id = read_scalar(self.filesystem.get_cpu_package_id_contents(id));
        let core_id = read_scalar(self.filesystem.get_cpu_core_id_contents(id));

        // A processor whose socket or core the OS does not expose (or exposes
        // as a negative placeholder) cannot be placed in the topology.
        if let (Some(package_id @ 0..), Some(core_id @ 0..)) = (package_id, core_id) {
            raw.push(RawCpu {
                id,
                numa_node,
                package_id,
                core_id,
            });
        }
    }
}

impl Platform for BuildTargetPlatform {
    fn discover_cpus(&self) -> Vec<DiscoveredCpu> {
        reindex(&self.read_raw_topology())
    }

    fn current_thread_affinity(&self) -> io::Result<Vec<ProcessorId>> {
        let cpuset = self.bindings.sched_getaffinity_current()?;
        Ok(cpu_set_to_ids(&cpuset))
    }

    fn set_current_thread_affinity(&self, ids: &[ProcessorId]) -> io::Result<()> {
        self.bindings
            .sched_setaffinity_current(&ids_to_cpu_set(ids))
    }

    fn current_thread_raw_affinity(&self) -> io::Result<Vec<RawProcessorId>> {
        // On this platform the raw mask bits and the scheduler identifiers
        // coincide; the distinction matters to backends with their own
        // processor numbering.
        self.current_thread_affinity()
    }
}

/// Re-indexes raw OS numbering into dense zero-based coordinates: sockets and
/// each socket's cores are numbered in first-seen order, and processing units
/// are numbered in first-seen order within each (socket, core) pair.
fn reindex(raw: &[RawCpu]) -> Vec<DiscoveredCpu> {
    let mut sockets: HashMap<i32, SocketId> = HashMap::new();
    let mut cores: HashMap<(SocketId, i32), CoreId> = HashMap::new();
    let mut cores_per_socket: HashMap<SocketId, CoreId> = HashMap::new();
    let mut units: HashMap<(SocketId, CoreId), ProcessingUnitId> = HashMap::new();

    raw.iter()
        .map(|cpu| {
            #[expect(
                clippy::cast_possible_truncation,
                clippy::cast_possible_wrap,
                reason = "socket count cannot approach i32::MAX"
            )]
            let next_socket = sockets.len() as SocketId;
            let socket = *sockets.entry(cpu.package_id).or_insert(next_socket);

            let core = match cores.get(&(socket, cpu.core_id)) {
                Some(core) => *core,
                None => {
                    let next = cores_per_socket.entry(socket).or_insert(0);
                    let core = *next;
                    *next += 1;
                    cores.insert((socket, cpu.core_id), core);
                    core
                }
            };

            let unit = units.entry((socket, core)).or_insert(0);
            let processing_unit = *unit;
            *unit += 1;

            DiscoveredCpu {
                spec: CpuSpec::new(socket, core, processing_unit),
                id: cpu.id,
                numa_node: cpu.numa_node,
            }
        })
        .collect()
}

fn read_listing(contents: Option<String>) -> Vec<u32> {
    contents
        .and_then(|contents| cpulist::parse(&contents).ok())
        .unwrap_or_default()
}

fn read_scalar(contents: Option<String>) -> Option<i32> {
    contents?.trim().parse().ok()
}

fn cpu_set_to_ids(cpuset: &cpu_set_t) -> Vec<ProcessorId> {
    #[expect(
        clippy::cast_sign_loss,
        reason = "CPU_SETSIZE is a positive libc constant"
    )]
    let set_size = libc::CPU_SETSIZE as usize;

    (0..set_size)
        .filter(|&index| {
            // SAFETY: No safety requirements beyond passing a valid set.
            unsafe { libc::CPU_ISSET(index, cpuset) }
        })
        .map(|index| {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "bounded by CPU_SETSIZE, which fits in u32"
            )]
            let id = index as ProcessorId;
            id
        })
        .collect()
}

fn ids_to_cpu_set(ids: &[ProcessorId]) -> cpu_set_t {
    // SAFETY: All zeroes is a valid cpu_set_t.
    let mut cpuset: cpu_set_t = unsafe { mem::zeroed() };

    for &id in ids {
        // SAFETY: No safety requirements beyond passing a valid set;
        // out-of-range identifiers are ignored by the libc implementation.
        unsafe { libc::CPU_SET(id as usize, &mut cpuset) };
    }

    cpuset
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::pal::linux::{MockBindings, MockFilesystem};

    fn platform_with_filesystem(filesystem: MockFilesystem) -> BuildTargetPlatform {
        BuildTargetPlatform::new(
            FilesystemFacade::from_mock(filesystem),
            BindingsFacade::from_mock(MockBindings::new()),
        )
    }

    fn raw(id: u32, numa_node: i32, package_id: i32, core_id: i32) -> RawCpu {
        RawCpu {
            id,
            numa_node,
            package_id,
            core_id,
        }
    }

    #[test]
    fn discovers_numa_topology() {
        let mut filesystem = MockFilesystem::new();

        filesystem
            .expect_get_numa_nodes_with_cpus_contents()
            .return_const(Some("0-1\n".to_string()));
        filesystem
            .expect_get_numa_node_cpulist_contents()
            .returning(|node| match node {
                0 => Some("0-1\n".to_string()),
                1 => Some("2-3\n".to_string()),
                _ => None,
            });
        filesystem
            .expect_get_cpu_package_id_contents()
            .returning(|cpu| Some(format!("{}\n", cpu / 2)));
        filesystem
            .expect_get_cpu_core_id_contents()
            .returning(|cpu| Some(format!("{}\n", cpu % 2)));

        let cpus = platform_with_filesystem(filesystem).discover_cpus();

        assert_eq!(cpus.len(), 4);

        // Two sockets, two single-thread cores each, one node per socket.
        assert_eq!(cpus[0].spec, CpuSpec::new(0, 0, 0));
        assert_eq!(cpus[1].spec, CpuSpec::new(0, 1, 0));
        assert_eq!(cpus[2].spec, CpuSpec::new(1, 0, 0));
        assert_eq!(cpus[3].spec, CpuSpec::new(1, 1, 0));

        assert_eq!(cpus[0].numa_node, 0);
        assert_eq!(cpus[3].numa_node, 1);
        assert_eq!(cpus[3].id, 3);
    }

    #[test]
    fn falls_back_to_flat_enumeration_without_numa() {
        let mut filesystem = MockFilesystem::new();

        filesystem
            .expect_get_numa_nodes_with_cpus_contents()
            .return_const(None);
        filesystem
            .expect_get_possible_cpus_contents()
            .return_const(Some("0-1\n".to_string()));
        filesystem
            .expect_get_cpu_package_id_contents()
            .returning(|_| Some("0\n".to_string()));
        filesystem
            .expect_get_cpu_core_id_contents()
            .returning(|cpu| Some(format!("{cpu}\n")));

        let cpus = platform_with_filesystem(filesystem).discover_cpus();

        assert_eq!(cpus.len(), 2);
        assert!(cpus.iter().all(|cpu| cpu.numa_node == -1));
    }

    #[test]
    fn skips_processors_with_unreadable_topology() {
        let mut filesystem = MockFilesystem::new();

        filesystem
            .expect_get_numa_nodes_with_cpus_contents()
            .return_const(Some("0".to_string()));
        filesystem
            .expect_get_numa_node_cpulist_contents()
            .return_const(Some("0-2".to_string()));
        filesystem
            .expect_get_cpu_package_id_contents()
            .returning(|cpu| match cpu {
                // Processor 1 exposes no socket, processor 2 a placeholder.
                1 => None,
                2 => Some("-1\n".to_string()),
                _ => Some("0\n".to_string()),
            });
        filesystem
            .expect_get_cpu_core_id_contents()
            .returning(|_| Some("0\n".to_string()));

        let cpus = platform_with_filesystem(filesystem).discover_cpus();

        assert_eq!(cpus.len(), 1);
        assert_eq!(cpus[0].id, 0);
    }

    #[test]
    fn discovery_failure_is_empty_result() {
        let mut filesystem = MockFilesystem::new();

        filesystem
            .expect_get_numa_nodes_with_cpus_contents()
            .return_const(None);
        filesystem
            .expect_get_possible_cpus_contents()
            .return_const(None);

        assert!(platform_with_filesystem(filesystem).discover_cpus().is_empty());
    }

    #[test]
    fn reindex_produces_dense_zero_based_coordinates() {
        // OS numbering with gaps: packages 3 and 7, cores 10 and 20, and
        // hyperthread siblings interleaved the way x86 systems report them.
        let cpus = reindex(&[
            raw(0, 0, 3, 10),
            raw(1, 0, 3, 20),
            raw(2, 0, 7, 10),
            raw(3, 0, 7, 20),
            raw(4, 0, 3, 10),
            raw(5, 0, 3, 20),
            raw(6, 0, 7, 10),
            raw(7, 0, 7, 20),
        ]);

        let specs: Vec<_> = cpus.iter().map(|cpu| cpu.spec).collect();
        assert_eq!(
            specs,
            vec![
                CpuSpec::new(0, 0, 0),
                CpuSpec::new(0, 1, 0),
                CpuSpec::new(1, 0, 0),
                CpuSpec::new(1, 1, 0),
                CpuSpec::new(0, 0, 1),
                CpuSpec::new(0, 1, 1),
                CpuSpec::new(1, 0, 1),
                CpuSpec::new(1, 1, 1),
            ]
        );
    }

    #[test]
    fn reindex_assigns_core_indexes_per_socket_in_first_seen_order() {
        let cpus = reindex(&[raw(0, -1, 0, 5), raw(1, -1, 0, 2), raw(2, -1, 1, 9)]);

        // Core 5 was seen first on socket 0, so it becomes core 0 there;
        // core 9 is the first core of socket 1.
        assert_eq!(cpus[0].spec, CpuSpec::new(0, 0, 0));
        assert_eq!(cpus[1].spec, CpuSpec::new(0, 1, 0));
        assert_eq!(cpus[2].spec, CpuSpec::new(1, 0, 0));
    }

    #[test]
    fn reindex_of_nothing_is_nothing() {
        assert!(reindex(&[]).is_empty());
    }

    #[test]
    fn cpu_set_round_trip() {
        let ids = vec![0, 3, 64];

        assert_eq!(cpu_set_to_ids(&ids_to_cpu_set(&ids)), ids);
    }
}
