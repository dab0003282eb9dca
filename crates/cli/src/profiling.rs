//! CPU profiling for the lifetime of the process, written as a flamegraph.

use anyhow::Context;
use std::path::PathBuf;
use tracing::{info, warn};

pub struct CpuProfile {
    path: PathBuf,
    #[cfg(unix)]
    guard: pprof::ProfilerGuard<'static>,
}

impl CpuProfile {
    #[cfg(unix)]
    pub fn start(path: &str) -> anyhow::Result<Self> {
        let guard = pprof::ProfilerGuardBuilder::default()
            .frequency(100)
            .blocklist(&["libc", "libgcc", "pthread", "vdso"])
            .build()
            .context("Failed to start CPU profiler")?;

        info!(path = %path, "CPU profiling started");
        Ok(Self {
            path: PathBuf::from(path),
            guard,
        })
    }

    #[cfg(not(unix))]
    pub fn start(path: &str) -> anyhow::Result<Self> {
        warn!(path = %path, "CPU profiling is not supported on this platform");
        Ok(Self {
            path: PathBuf::from(path),
        })
    }

    /// Writes the flamegraph. Failures are logged; the exit status is not
    /// affected.
    pub fn finish(self) {
        #[cfg(unix)]
        {
            let written = self
                .guard
                .report()
                .build()
                .context("Failed to build CPU profile")
                .and_then(|report| {
                    let file = std::fs::File::create(&self.path)
                        .with_context(|| format!("Failed to create {}", self.path.display()))?;
                    report
                        .flamegraph(file)
                        .context("Failed to write flamegraph")
                });

            match written {
                Ok(()) => info!(path = %self.path.display(), "CPU profile written"),
                Err(e) => warn!(path = %self.path.display(), error = %e, "CPU profile lost"),
            }
        }
        #[cfg(not(unix))]
        let _ = self.path;
    }
}
