use {
    super::Monitor,
    model::pool::LastActionKind,
    std::{
        future::Future,
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        time::Duration,
    },
    tokio::sync::watch,
    tracing::Instrument,
};

#[derive(Debug, thiserror::Error)]
#[error("a liquidity check is already running")]
pub struct TickInProgress;

/// Runs monitor ticks one after another. The next tick is scheduled only
/// once the previous one settled, so ticks never overlap.
pub struct Scheduler {
    monitor: Arc<Monitor>,
    interval: Duration,
    in_progress: AtomicBool,
}

type Guard<'a> = scopeguard::ScopeGuard<&'a AtomicBool, fn(&'a AtomicBool)>;

fn release(flag: &AtomicBool) {
    flag.store(false, Ordering::Release);
}

impl Scheduler {
    pub fn new(monitor: Arc<Monitor>, interval: Duration) -> Self {
        Self {
            monitor,
            interval,
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn monitor(&self) -> &Monitor {
        &self.monitor
    }

    fn begin(&self) -> Result<Guard<'_>, TickInProgress> {
        self.in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TickInProgress)?;
        Ok(scopeguard::guard(&self.in_progress, release as fn(&AtomicBool)))
    }

    /// Runs one tick now unless another one is running.
    pub async fn refresh(&self, auto_manage: bool) -> Result<(), TickInProgress> {
        let _guard = self.begin()?;
        self.monitor
            .tick(auto_manage)
            .instrument(tracing::info_span!("liquidity_tick", auto_manage))
            .await;
        Ok(())
    }

    /// Ticks once immediately and then every `interval` after the previous
    /// tick finished. Stops when `auto_manage` turns false or `shutdown`
    /// resolves. With auto-manage disabled from the start this is a single
    /// observation tick.
    pub async fn run(&self, mut auto_manage: watch::Receiver<bool>, shutdown: impl Future<Output = ()>) {
        tokio::pin!(shutdown);
        if *auto_manage.borrow() {
            self.monitor
                .record_action(LastActionKind::Info, "Auto-management enabled");
        }
        loop {
            let enabled = *auto_manage.borrow_and_update();
            if let Err(err) = self.refresh(enabled).await {
                tracing::debug!(%err, "skipping scheduled tick");
            }
            if !enabled {
                tracing::debug!("auto-manage disabled, monitor stopped");
                return;
            }

            let sleep = tokio::time::sleep(self.interval);
            tokio::pin!(sleep);
            loop {
                tokio::select! {
                    () = &mut sleep => break,
                    changed = auto_manage.changed() => {
                        if changed.is_err() || !*auto_manage.borrow() {
                            tracing::info!("auto-manage disabled, monitor stopped");
                            return;
                        }
                    }
                    () = &mut shutdown => {
                        tracing::info!("shutting down liquidity monitor");
                        return;
                    }
                }
            }
        }
    }
}
