use crate::{CpuSpec, NumaNodeId, ProcessorId};

/// One topology tuple emitted by platform discovery: dense zero-based
/// socket/core/processing-unit coordinates, the native identifier used in
/// affinity system calls, and the NUMA node (-1 when unknown).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct DiscoveredCpu {
    pub(crate) spec: CpuSpec,
    pub(crate) id: ProcessorId,
    pub(crate) numa_node: NumaNodeId,
}
