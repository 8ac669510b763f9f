mod discovered_cpu;
pub(crate) use discovered_cpu::*;

mod platform;
pub(crate) use platform::*;
