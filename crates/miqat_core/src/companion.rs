//! The coordinator a host owns: one location, one published snapshot,
//! one pending refresh.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use futures::FutureExt;
use futures::future::BoxFuture;
use miqat_network::{AladhanSource, HttpFetch, PrayerTimeSource, ReqwestFetcher};
use miqat_types::{MiqatError, PrayerSnapshot};

use crate::clock::{Clock, SystemClock};
use crate::config::CompanionConfig;
use crate::resolver::DailyResolver;
use crate::scheduler::{RETRY_DELAY_SECS, RefreshScheduler, ScheduledTrigger, SchedulerState, UPDATE_INTERVAL_SECS};

/// Capabilities a companion runs against.
#[derive(Clone)]
pub struct Dependencies {
    pub clock: Arc<dyn Clock>,
    pub standard: Arc<dyn PrayerTimeSource>,
    pub http: Arc<dyn HttpFetch>,
}

impl Dependencies {
    /// System clock, reqwest client and the Aladhan calculator, configured
    /// from `config`.
    pub fn production(config: &CompanionConfig) -> Result<Self, MiqatError> {
        let http: Arc<dyn HttpFetch> = Arc::new(ReqwestFetcher::new(config.http_timeout())?);
        let standard = Arc::new(AladhanSource::with_base_url(
            http.clone(),
            config.endpoints.aladhan_base_url.clone(),
        ));
        Ok(Self {
            clock: Arc::new(SystemClock),
            standard,
            http,
        })
    }
}

struct Inner {
    deps: Dependencies,
    config: RwLock<CompanionConfig>,
    resolver: RwLock<Arc<DailyResolver>>,
    data: RwLock<Option<Arc<PrayerSnapshot>>>,
    cycle: tokio::sync::Mutex<()>,
    scheduler: RefreshScheduler,
    closed: AtomicBool,
}

/// Keeps prayer times for one location fresh.
///
/// Cheap to clone; clones share state. Cycles never overlap. The last good
/// snapshot stays published while later cycles fail.
#[derive(Clone)]
pub struct PrayerCompanion {
    inner: Arc<Inner>,
}

impl PrayerCompanion {
    /// # Errors
    /// `Configuration` when the location or time zone is invalid.
    pub fn new(config: CompanionConfig, deps: Dependencies) -> Result<Self, MiqatError> {
        config.validate()?;
        let resolver = DailyResolver::new(&config, deps.standard.clone(), deps.http.clone())?;
        Ok(Self {
            inner: Arc::new(Inner {
                scheduler: RefreshScheduler::new(deps.clock.clone()),
                deps,
                config: RwLock::new(config),
                resolver: RwLock::new(Arc::new(resolver)),
                data: RwLock::new(None),
                cycle: tokio::sync::Mutex::new(()),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// First refresh, and the hourly refresh from here on. On failure the
    /// retry is already armed when this returns.
    pub async fn start(&self) -> Result<Arc<PrayerSnapshot>, MiqatError> {
        let config = self.config();
        tracing::info!(
            location = %self.resolver().location(),
            method = %config.calculation_method,
            "Starting prayer companion"
        );
        if !self.is_closed() {
            let companion = Arc::downgrade(&self.inner);
            self.inner.scheduler.start_periodic(
                std::time::Duration::from_secs(UPDATE_INTERVAL_SECS),
                move || companion.upgrade().map(|inner| PrayerCompanion { inner }.refresh_task()),
            );
        }
        self.request_refresh().await
    }

    /// Runs one cycle, publishes its snapshot and arms the next refresh.
    ///
    /// # Errors
    /// `CalculationFailure` when the standard calculation failed; a retry is
    /// armed and the previous snapshot is kept.
    pub async fn request_refresh(&self) -> Result<Arc<PrayerSnapshot>, MiqatError> {
        let _cycle = self.inner.cycle.lock().await;
        let resolver = self.resolver();
        let now = self.inner.deps.clock.now();

        match resolver.resolve(now).await {
            Ok(resolution) => {
                let snapshot = Arc::new(resolution.snapshot);
                *self.inner.data.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
                if !self.is_closed() {
                    self.inner
                        .scheduler
                        .schedule_next(resolution.midnight, resolver.time_zone(), self.refresh_task());
                }
                Ok(snapshot)
            }
            Err(e) => {
                tracing::warn!(error = %e, retry_in_secs = RETRY_DELAY_SECS, "Prayer time update failed");
                if !self.is_closed() {
                    self.inner.scheduler.schedule_retry(self.refresh_task());
                }
                Err(e)
            }
        }
    }

    /// Last successfully resolved snapshot.
    pub fn data(&self) -> Option<Arc<PrayerSnapshot>> {
        self.inner.data.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn pending_trigger(&self) -> Option<ScheduledTrigger> {
        self.inner.scheduler.pending()
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.inner.scheduler.state()
    }

    pub fn config(&self) -> CompanionConfig {
        self.inner.config.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Applies new options and refreshes with them.
    ///
    /// The injected standard source keeps its own endpoint; only the
    /// alternate sources pick up endpoint changes.
    ///
    /// # Errors
    /// `Configuration` leaves the current options in place; otherwise as
    /// [`PrayerCompanion::request_refresh`].
    pub async fn update_config(&self, config: CompanionConfig) -> Result<Arc<PrayerSnapshot>, MiqatError> {
        config.validate()?;
        let resolver = DailyResolver::new(&config, self.inner.deps.standard.clone(), self.inner.deps.http.clone())?;

        self.inner.scheduler.cancel();
        *self.inner.resolver.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(resolver);
        *self.inner.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        tracing::info!("Options updated, refreshing prayer times");

        self.request_refresh().await
    }

    /// Cancels the pending refresh and the hourly refresh. No refresh is
    /// armed afterwards.
    pub fn teardown(&self) {
        if !self.inner.closed.swap(true, Ordering::SeqCst) {
            tracing::info!("Prayer companion shutting down");
        }
        self.inner.scheduler.stop_periodic();
        self.inner.scheduler.cancel();
    }

    fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::SeqCst)
    }

    fn resolver(&self) -> Arc<DailyResolver> {
        self.inner.resolver.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn refresh_task(&self) -> BoxFuture<'static, ()> {
        let companion = self.clone();
        async move {
            // Failures are logged and re-armed inside the cycle.
            let _ = companion.request_refresh().await;
        }
        .boxed()
    }
}
