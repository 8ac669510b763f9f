mod bindings;
pub(crate) use bindings::*;

mod cpulist;

mod filesystem;
pub(crate) use filesystem::*;

mod platform;
pub(crate) use platform::*;
