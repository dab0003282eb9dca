use crate::ports::HostDnsConfigurator;
use dns_proxy_domain::{DomainError, LifecycleState, ShutdownTrigger, StartupFailure, Subsystem};
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

pub type SubsystemFuture = Pin<Box<dyn Future<Output = Result<(), StartupFailure>> + Send>>;

/// Top-level coordinator: `Starting -> Running -> ShuttingDown -> Terminated`.
///
/// The state lock doubles as the critical section for host DNS changes:
/// the override runs while holding it and only in `Starting`/`Running`,
/// and shutdown takes it to move to `ShuttingDown` before restoring. An
/// override and a restore therefore never overlap, the override happens at
/// most once, and the restore exactly once.
pub struct ServiceLifecycle {
    state: Mutex<LifecycleInner>,
    host_dns: Arc<dyn HostDnsConfigurator>,
}

struct LifecycleInner {
    state: LifecycleState,
    override_attempted: bool,
}

impl ServiceLifecycle {
    pub fn new(host_dns: Arc<dyn HostDnsConfigurator>) -> Self {
        Self {
            state: Mutex::new(LifecycleInner {
                state: LifecycleState::Starting,
                override_attempted: false,
            }),
            host_dns,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.lock().state
    }

    fn lock(&self) -> MutexGuard<'_, LifecycleInner> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transition(inner: &mut LifecycleInner, next: LifecycleState) -> bool {
        if !inner.state.can_transition_to(next) {
            return false;
        }
        debug!(from = %inner.state, to = %next, "Lifecycle transition");
        inner.state = next;
        true
    }

    pub fn mark_running(&self) -> bool {
        Self::transition(&mut self.lock(), LifecycleState::Running)
    }

    /// Points the host resolver at the proxy. Blocking.
    ///
    /// Returns `Ok(false)` without touching the host when the override was
    /// already attempted or shutdown has begun.
    pub fn override_host_dns(&self) -> Result<bool, DomainError> {
        let mut inner = self.lock();

        if !inner.state.accepts_override() {
            warn!(state = %inner.state, "Host DNS override refused, shutdown in progress");
            return Ok(false);
        }
        if inner.override_attempted {
            debug!("Host DNS override already attempted");
            return Ok(false);
        }
        inner.override_attempted = true;

        self.host_dns.apply()?;
        info!("Host DNS now points at the proxy");
        Ok(true)
    }

    /// Subsystem future running [`ServiceLifecycle::override_host_dns`] on
    /// the blocking pool. Failures are fatal.
    pub fn host_override_task(self: &Arc<Self>) -> SubsystemFuture {
        let lifecycle = Arc::clone(self);
        Box::pin(async move {
            let applied = tokio::task::spawn_blocking(move || lifecycle.override_host_dns())
                .await
                .map_err(|e| StartupFailure::new(Subsystem::HostDnsOverride, e.to_string()))?;

            match applied {
                Ok(_) => Ok(()),
                Err(e) => Err(StartupFailure::new(Subsystem::HostDnsOverride, e.to_string())),
            }
        })
    }

    /// Restores the host resolver and terminates. Blocking; [`Self::run`]
    /// calls it on the blocking pool.
    ///
    /// Only the first call does anything; it returns `true`. The restore is
    /// attempted whether or not the override ever ran or succeeded, and a
    /// failed restore is only logged.
    pub fn shutdown(&self, trigger: &ShutdownTrigger) -> bool {
        let mut inner = self.lock();

        if !Self::transition(&mut inner, LifecycleState::ShuttingDown) {
            debug!(state = %inner.state, "Shutdown already performed");
            return false;
        }

        info!(trigger = %trigger, "Restoring host DNS configuration");
        match self.host_dns.restore() {
            Ok(()) => info!("Host DNS configuration restored"),
            Err(e) => warn!(error = %e, "Failed to restore host DNS configuration"),
        }

        Self::transition(&mut inner, LifecycleState::Terminated);
        warn!(trigger = %trigger, "Exiting");
        true
    }

    /// Launches every subsystem, waits for `termination` or the first fatal
    /// subsystem failure, then shuts down.
    ///
    /// Subsystems whose [`Subsystem::exit_status`] is `None` may fail
    /// without stopping the process. A panicking subsystem counts as a
    /// failure of that subsystem.
    pub async fn run<F>(
        self: &Arc<Self>,
        subsystems: Vec<(Subsystem, SubsystemFuture)>,
        termination: F,
    ) -> ShutdownTrigger
    where
        F: Future<Output = String>,
    {
        let mut tasks = JoinSet::new();
        for (subsystem, future) in subsystems {
            debug!(subsystem = %subsystem, "Starting subsystem");
            tasks.spawn(async move {
                let result = AssertUnwindSafe(future).catch_unwind().await;
                let result = result.unwrap_or_else(|_| {
                    Err(StartupFailure::new(subsystem, "subsystem task panicked"))
                });
                (subsystem, result)
            });
        }

        self.mark_running();
        info!("Listening for termination signals");

        tokio::pin!(termination);

        let trigger = loop {
            tokio::select! {
                signal = &mut termination => break ShutdownTrigger::Signal(signal),
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => match joined {
                    Ok((subsystem, Ok(()))) => {
                        debug!(subsystem = %subsystem, "Subsystem completed");
                    }
                    Ok((subsystem, Err(failure))) => {
                        if subsystem.exit_status().is_some() {
                            error!(
                                subsystem = %subsystem,
                                error = %failure.reason,
                                exit_code = failure.exit_status().code(),
                                "Fatal subsystem failure"
                            );
                            break ShutdownTrigger::Fatal(failure);
                        }
                        warn!(subsystem = %subsystem, error = %failure.reason, "Subsystem stopped");
                    }
                    Err(e) => {
                        error!(error = %e, "Subsystem task aborted");
                    }
                },
            }
        };

        let lifecycle = Arc::clone(self);
        let restore_trigger = trigger.clone();
        if let Err(e) =
            tokio::task::spawn_blocking(move || lifecycle.shutdown(&restore_trigger)).await
        {
            error!(error = %e, "Shutdown task aborted");
        }
        tasks.abort_all();
        trigger
    }
}
