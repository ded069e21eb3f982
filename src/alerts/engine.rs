use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::alerts::store::AlertStore;
use crate::alerts::types::{Alert, UserId};
use crate::constants::MAX_LOGGED_FETCH_FAILURES;
use crate::errors::{AlertError, Result};
use crate::notify::Notifier;
use crate::rates::{CurrencyPair, RateSource};
use crate::utils::formatting::alert_triggered_message;
use crate::utils::Validator;

/// Lifecycle of one scheduled evaluation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    Armed,
    Firing,
    Cancelled,
}

/// A recurring evaluation bound to one scheduled alert. Carries only the
/// (user, pair) reference plus timing; the alert record in the store
/// stays the single source of truth for the threshold.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    pub user: UserId,
    pub pair: CurrencyPair,
    pub first_delay: Duration,
    pub interval: Duration,
}

struct JobEntry {
    pair: CurrencyPair,
    state: Arc<RwLock<JobState>>,
    cancel: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

enum TickOutcome {
    Triggered,
    NoTrigger,
    /// The backing alert vanished from the store: a contract violation,
    /// the job stops itself.
    Orphaned,
}

/// The scheduler/evaluator. One independent tokio task per scheduled
/// alert; a slow fetch for one user never delays ticks for another, and a
/// job's own ticks never overlap.
#[derive(Clone)]
pub struct AlertEngine {
    store: Arc<AlertStore>,
    rates: Arc<dyn RateSource>,
    notifier: Arc<dyn Notifier>,
    jobs: Arc<RwLock<HashMap<UserId, JobEntry>>>,
    first_delay: Duration,
    interval: Duration,
}

impl AlertEngine {
    pub fn new(
        store: Arc<AlertStore>,
        rates: Arc<dyn RateSource>,
        notifier: Arc<dyn Notifier>,
        first_delay: Duration,
        interval: Duration,
    ) -> Self {
        info!(
            "⏰ Alert engine ready (first check after {:?}, then every {:?})",
            first_delay, interval
        );

        Self {
            store,
            rates,
            notifier,
            jobs: Arc::new(RwLock::new(HashMap::new())),
            first_delay,
            interval,
        }
    }

    /// Parse and install an alert for the user, replacing any previous
    /// one. A superseded armed job is cancelled and fully drained before
    /// the new record lands, so no stale timer can fire afterwards.
    pub async fn set_alert(
        &self,
        user: UserId,
        pair_str: &str,
        threshold_str: &str,
    ) -> Result<Alert> {
        let pair = Validator::validate_pair(pair_str)?;
        let threshold = Validator::validate_threshold(threshold_str)?;

        self.cancel_job(user, None).await;

        let alert = self.store.set_alert(user, pair, threshold).await?;
        info!(
            "🔔 Alert set: user={} pair={} threshold={}",
            user, alert.pair, alert.threshold
        );

        Ok(alert)
    }

    /// Begin periodic evaluation of the user's current alert.
    pub async fn start_monitoring(&self, user: UserId) -> Result<ScheduledJob> {
        let alert = self
            .store
            .active_alert(user)
            .await
            .ok_or(AlertError::NoActiveAlert)?;

        self.schedule(&alert, self.first_delay, self.interval).await
    }

    /// Stop monitoring and retire the user's current alert. Idempotent.
    pub async fn cancel_monitoring(&self, user: UserId) {
        let had_job = self.cancel_job(user, None).await;

        if let Some(alert) = self.store.active_alert(user).await {
            self.store.mark_cancelled(user, &alert.pair).await;
        }

        if had_job {
            info!("🔔 Monitoring cancelled for user {}", user);
        }
    }

    /// Start a recurring evaluation job for the given alert. The first
    /// evaluation runs after `first_delay`, subsequent ones every
    /// `interval`.
    pub async fn schedule(
        &self,
        alert: &Alert,
        first_delay: Duration,
        interval: Duration,
    ) -> Result<ScheduledJob> {
        let current = self.store.active_alert(alert.user).await;
        if current.as_ref().map(|a| &a.pair) != Some(&alert.pair) {
            debug_assert!(false, "scheduling a job for an alert missing from the store");
            error!(
                "⏰ Invariant violation: no store record for user={} pair={}",
                alert.user, alert.pair
            );
            return Err(AlertError::NoActiveAlert.into());
        }

        let job = ScheduledJob {
            user: alert.user,
            pair: alert.pair.clone(),
            first_delay,
            interval,
        };

        {
            let mut jobs = self.jobs.write().await;
            if let Some(existing) = jobs.get(&alert.user) {
                if !existing.handle.is_finished() {
                    return Err(AlertError::AlreadyScheduled {
                        pair: existing.pair.to_string(),
                    }
                    .into());
                }
                jobs.remove(&alert.user);
            }

            let state = Arc::new(RwLock::new(JobState::Idle));
            let (cancel_tx, cancel_rx) = watch::channel(false);
            let handle = tokio::spawn(Self::run_job(
                self.clone(),
                job.clone(),
                state.clone(),
                cancel_rx,
            ));

            jobs.insert(
                alert.user,
                JobEntry {
                    pair: alert.pair.clone(),
                    state,
                    cancel: cancel_tx,
                    handle,
                },
            );
        }

        self.store.mark_scheduled(alert.user, &alert.pair).await;
        info!(
            "⏰ Monitoring scheduled: user={} pair={} every {:?}",
            alert.user, alert.pair, interval
        );

        Ok(job)
    }

    /// Stop the job for (user, pair). Safe on unknown or already-finished
    /// jobs; when it returns, no further tick of that job can be observed.
    pub async fn cancel(&self, user: UserId, pair: &CurrencyPair) {
        self.cancel_job(user, Some(pair)).await;
    }

    /// Current job state, if a job exists for the user.
    pub async fn job_state(&self, user: UserId) -> Option<JobState> {
        let jobs = self.jobs.read().await;
        let entry = jobs.get(&user)?;
        let state = *entry.state.read().await;
        Some(state)
    }

    /// Remove and drain the user's job. With `expected_pair` set, only a
    /// job for that pair is cancelled. Returns whether a job was stopped.
    async fn cancel_job(&self, user: UserId, expected_pair: Option<&CurrencyPair>) -> bool {
        let entry = {
            let mut jobs = self.jobs.write().await;
            match jobs.get(&user) {
                Some(e) if expected_pair.is_none() || expected_pair == Some(&e.pair) => {
                    jobs.remove(&user)
                }
                _ => None,
            }
        };

        let Some(entry) = entry else {
            return false;
        };

        let _ = entry.cancel.send(true);
        *entry.state.write().await = JobState::Cancelled;

        // Join the task so an in-flight tick is fully drained before this
        // returns; the tick is abandoned at its next suspension point and
        // can no longer produce a notification.
        if let Err(e) = entry.handle.await {
            if e.is_panic() {
                error!("⏰ Evaluation task for user {} panicked: {}", user, e);
            }
        }

        debug!("⏰ Job cancelled: user={} pair={}", user, entry.pair);
        true
    }

    async fn run_job(
        engine: AlertEngine,
        job: ScheduledJob,
        state: Arc<RwLock<JobState>>,
        mut cancel: watch::Receiver<bool>,
    ) {
        let mut ticker = interval_at(Instant::now() + job.first_delay, job.interval);
        // An evaluation that overruns the next nominal fire time defers
        // it; a job never runs concurrently with itself.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        *state.write().await = JobState::Armed;
        let mut fetch_failures: u32 = 0;

        loop {
            tokio::select! {
                _ = cancel.changed() => return,
                _ = ticker.tick() => {}
            }

            tokio::select! {
                _ = cancel.changed() => return,
                outcome = engine.evaluate_tick(&job, &state, &mut fetch_failures) => {
                    match outcome {
                        TickOutcome::NoTrigger => {}
                        TickOutcome::Triggered | TickOutcome::Orphaned => break,
                    }
                }
            }
        }

        engine.jobs.write().await.remove(&job.user);
    }

    /// One evaluation cycle: fetch, compare, and on trigger notify and
    /// retire the alert. Fetch failures and missing pairs are no-trigger
    /// outcomes; the job stays armed and retries on the next tick.
    async fn evaluate_tick(
        &self,
        job: &ScheduledJob,
        state: &Arc<RwLock<JobState>>,
        fetch_failures: &mut u32,
    ) -> TickOutcome {
        let Some(alert) = self
            .store
            .active_alert(job.user)
            .await
            .filter(|a| a.pair == job.pair)
        else {
            debug_assert!(false, "armed job without a matching store alert");
            error!(
                "⏰ Invariant violation: armed job for user={} pair={} has no store record",
                job.user, job.pair
            );
            return TickOutcome::Orphaned;
        };

        let snapshot = match self.rates.fetch().await {
            Ok(snapshot) => {
                if *fetch_failures > 0 {
                    info!(
                        "💱 Rate fetch recovered for user {} after {} failures",
                        job.user, fetch_failures
                    );
                    *fetch_failures = 0;
                }
                snapshot
            }
            Err(e) => {
                *fetch_failures += 1;
                if *fetch_failures <= MAX_LOGGED_FETCH_FAILURES {
                    warn!(
                        "💱 Rate fetch failed (streak {}), retrying next tick: {}",
                        fetch_failures, e
                    );
                } else {
                    debug!("💱 Rate fetch failed (streak {}): {}", fetch_failures, e);
                }
                return TickOutcome::NoTrigger;
            }
        };

        let Some(rate) = snapshot.rate(&job.pair) else {
            warn!(
                "💱 Snapshot is missing {}, treating tick as no-trigger",
                job.pair
            );
            return TickOutcome::NoTrigger;
        };

        // Non-strict comparison; a threshold already satisfied on the
        // very first tick fires immediately.
        if rate < alert.threshold {
            debug!(
                "🔔 No trigger for user {}: {} at {} < {}",
                job.user, job.pair, rate, alert.threshold
            );
            return TickOutcome::NoTrigger;
        }

        *state.write().await = JobState::Firing;
        info!(
            "🔔 Alert triggered: user={} pair={} rate={} threshold={}",
            job.user, job.pair, rate, alert.threshold
        );

        // Best-effort, at-most-once delivery: a failure is logged but the
        // alert still retires.
        let message = alert_triggered_message(&job.pair, rate, alert.threshold);
        if let Err(e) = self.notifier.send(job.user, &message).await {
            warn!(
                "🔔 Notification delivery failed for user {}: {}",
                job.user, e
            );
        }

        self.store.mark_triggered(job.user, &job.pair).await;
        TickOutcome::Triggered
    }
}
