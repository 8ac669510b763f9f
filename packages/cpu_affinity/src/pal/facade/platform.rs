use std::fmt::Debug;
use std::io;
#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use crate::pal::{FakePlatform, MockPlatform};
use crate::pal::{BUILD_TARGET_PLATFORM, BuildTargetPlatform, DiscoveredCpu, Platform};
use crate::{ProcessorId, RawProcessorId};

/// Enum to hide the different platform implementations behind a single
/// wrapper type.
#[derive(Clone)]
pub(crate) enum PlatformFacade {
    Target(&'static BuildTargetPlatform),

    #[cfg(test)]
    Fake(Arc<FakePlatform>),

    #[cfg(test)]
    Mock(Arc<MockPlatform>),
}

impl PlatformFacade {
    pub(crate) fn target() -> Self {
        Self::Target(&BUILD_TARGET_PLATFORM)
    }

    #[cfg(test)]
    pub(crate) fn from_fake(fake: FakePlatform) -> Self {
        Self::Fake(Arc::new(fake))
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Platform for PlatformFacade {
    fn discover_cpus(&self) -> Vec<DiscoveredCpu> {
        match self {
            Self::Target(platform) => platform.discover_cpus(),
            #[cfg(test)]
            Self::Fake(fake) => fake.discover_cpus(),
            #[cfg(test)]
            Self::Mock(mock) => mock.discover_cpus(),
        }
    }

    fn current_thread_affinity(&self) -> io::Result<Vec<ProcessorId>> {
        match self {
            Self::Target(platform) => platform.current_thread_affinity(),
            #[cfg(test)]
            Self::Fake(fake) => fake.current_thread_affinity(),
            #[cfg(test)]
            Self::Mock(mock) => mock.current_thread_affinity(),
        }
    }

    fn set_current_thread_affinity(&self, ids: &[ProcessorId]) -> io::Result<()> {
        match self {
            Self::Target(platform) => platform.set_current_thread_affinity(ids),
            #[cfg(test)]
            Self::Fake(fake) => fake.set_current_thread_affinity(ids),
            #[cfg(test)]
            Self::Mock(mock) => mock.set_current_thread_affinity(ids),
        }
    }

    fn current_thread_raw_affinity(&self) -> io::Result<Vec<RawProcessorId>> {
        match self {
            Self::Target(platform) => platform.current_thread_raw_affinity(),
            #[cfg(test)]
            Self::Fake(fake) => fake.current_thread_raw_affinity(),
            #[cfg(test)]
            Self::Mock(mock) => mock.current_thread_raw_affinity(),
        }
    }
}

impl From<&'static BuildTargetPlatform> for PlatformFacade {
    fn from(platform: &'static BuildTargetPlatform) -> Self {
        Self::Target(platform)
    }
}

#[cfg(test)]
impl From<Arc<FakePlatform>> for PlatformFacade {
    fn from(fake: Arc<FakePlatform>) -> Self {
        Self::Fake(fake)
    }
}

#[cfg(test)]
impl From<MockPlatform> for PlatformFacade {
    fn from(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Debug for PlatformFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Fake(inner) => inner.fmt(f),
            #[cfg(test)]
            Self::Mock(inner) => inner.fmt(f),
        }
    }
}
