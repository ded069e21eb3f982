use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::time::sleep;

use fx_rate_bot::alerts::{AlertEngine, AlertStatus, AlertStore, UserId};
use fx_rate_bot::errors::{AlertError, BotError, NotifyError, RateError};
use fx_rate_bot::notify::Notifier;
use fx_rate_bot::rates::{CurrencyPair, RateSnapshot, RateSource};

const USER: UserId = UserId(42);
const FIRST_DELAY: Duration = Duration::from_secs(10);
const INTERVAL: Duration = Duration::from_secs(3600);

fn pair(s: &str) -> CurrencyPair {
    s.parse().unwrap()
}

fn snap(rate: f64) -> Result<RateSnapshot, RateError> {
    Ok(RateSnapshot::new(
        HashMap::from([(pair("USD/NGN"), rate)]),
        Utc::now(),
    ))
}

fn empty_snap() -> Result<RateSnapshot, RateError> {
    Ok(RateSnapshot::new(HashMap::new(), Utc::now()))
}

fn fetch_error() -> Result<RateSnapshot, RateError> {
    Err(RateError::Unavailable("connection refused".to_string()))
}

/// Rate source that replays a scripted sequence of responses, one per
/// tick, then keeps failing once the script runs out.
struct ScriptedRates {
    responses: Mutex<VecDeque<Result<RateSnapshot, RateError>>>,
}

impl ScriptedRates {
    fn new(responses: Vec<Result<RateSnapshot, RateError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl RateSource for ScriptedRates {
    async fn fetch(&self) -> Result<RateSnapshot, RateError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(fetch_error)
    }
}

/// Notifier that records every delivery attempt and can fail the next one.
#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(UserId, String)>>,
    fail_next: AtomicBool,
}

impl RecordingNotifier {
    fn sent(&self) -> Vec<(UserId, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, user: UserId, text: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push((user, text.to_string()));
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(NotifyError::Rejected("chat blocked".to_string()));
        }
        Ok(())
    }
}

fn build(
    responses: Vec<Result<RateSnapshot, RateError>>,
) -> (Arc<AlertEngine>, Arc<RecordingNotifier>, Arc<AlertStore>) {
    let store = Arc::new(AlertStore::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let engine = Arc::new(AlertEngine::new(
        store.clone(),
        Arc::new(ScriptedRates::new(responses)),
        notifier.clone(),
        FIRST_DELAY,
        INTERVAL,
    ));
    (engine, notifier, store)
}

#[tokio::test(start_paused = true)]
async fn fires_exactly_once_on_first_satisfying_tick() {
    let (engine, notifier, store) = build(vec![snap(820.0), snap(840.0), snap(850.0)]);

    engine.set_alert(USER, "USD/NGN", "850").await.unwrap();
    engine.start_monitoring(USER).await.unwrap();

    sleep(Duration::from_secs(11)).await;
    assert!(notifier.sent().is_empty(), "820 < 850 must not fire");

    sleep(INTERVAL).await;
    assert!(notifier.sent().is_empty(), "840 < 850 must not fire");

    sleep(INTERVAL).await;
    let sent = notifier.sent();
    assert_eq!(sent.len(), 1, "exact equality triggers");
    assert_eq!(sent[0].0, USER);
    assert_eq!(
        sent[0].1,
        "Alert! USD/NGN has hit 850.00, crossing your threshold of 850.00."
    );

    // Single-shot: the job is gone and nothing fires again.
    sleep(INTERVAL * 3).await;
    assert_eq!(notifier.sent().len(), 1);
    assert!(store.active_alert(USER).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn fires_immediately_when_threshold_already_satisfied() {
    let (engine, notifier, _store) = build(vec![snap(860.0), snap(870.0)]);

    engine.set_alert(USER, "USD/NGN", "850").await.unwrap();
    engine.start_monitoring(USER).await.unwrap();

    sleep(Duration::from_secs(11)).await;
    assert_eq!(notifier.sent().len(), 1, "first tick must fire");

    sleep(INTERVAL * 2).await;
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn fetch_failure_retries_on_next_tick() {
    let (engine, notifier, store) = build(vec![fetch_error(), snap(900.0)]);

    engine.set_alert(USER, "USD/NGN", "850").await.unwrap();
    engine.start_monitoring(USER).await.unwrap();

    sleep(Duration::from_secs(11)).await;
    assert!(notifier.sent().is_empty());

    // The failed tick must not surface in the user-visible alert state.
    let alert = store.active_alert(USER).await.unwrap();
    assert_eq!(alert.status, AlertStatus::Scheduled);

    sleep(INTERVAL).await;
    assert_eq!(notifier.sent().len(), 1);
    assert!(store.active_alert(USER).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn missing_pair_is_a_no_trigger_tick() {
    let (engine, notifier, _store) = build(vec![empty_snap(), snap(900.0)]);

    engine.set_alert(USER, "USD/NGN", "850").await.unwrap();
    engine.start_monitoring(USER).await.unwrap();

    sleep(Duration::from_secs(11)).await;
    assert!(notifier.sent().is_empty());

    sleep(INTERVAL).await;
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn invalid_threshold_creates_no_alert() {
    let (engine, _notifier, store) = build(vec![]);

    let err = engine.set_alert(USER, "USD/NGN", "-5").await.unwrap_err();
    assert!(matches!(err, BotError::InvalidInput(_)));

    let err = engine.set_alert(USER, "USD/NGN", "eight").await.unwrap_err();
    assert!(matches!(err, BotError::InvalidInput(_)));

    let err = engine.set_alert(USER, "USDNGN", "850").await.unwrap_err();
    assert!(matches!(err, BotError::InvalidInput(_)));

    assert!(store.active_alert(USER).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn start_monitoring_without_alert_creates_no_job() {
    let (engine, notifier, _store) = build(vec![snap(900.0)]);

    let err = engine.start_monitoring(USER).await.unwrap_err();
    assert!(matches!(err, BotError::Alert(AlertError::NoActiveAlert)));

    sleep(INTERVAL * 2).await;
    assert!(notifier.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn double_start_reports_already_scheduled() {
    let (engine, _notifier, _store) = build(vec![snap(100.0)]);

    engine.set_alert(USER, "USD/NGN", "850").await.unwrap();
    engine.start_monitoring(USER).await.unwrap();

    let err = engine.start_monitoring(USER).await.unwrap_err();
    assert!(matches!(
        err,
        BotError::Alert(AlertError::AlreadyScheduled { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn cancel_is_idempotent_and_stops_ticks() {
    let (engine, notifier, store) = build(vec![snap(900.0), snap(900.0)]);

    engine.set_alert(USER, "USD/NGN", "850").await.unwrap();
    engine.start_monitoring(USER).await.unwrap();

    engine.cancel_monitoring(USER).await;
    engine.cancel_monitoring(USER).await;

    assert!(store.active_alert(USER).await.is_none());
    assert!(engine.job_state(USER).await.is_none());

    // A cancelled job observes zero further ticks.
    sleep(INTERVAL * 3).await;
    assert!(notifier.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn pair_scoped_cancel_ignores_other_pairs() {
    let (engine, notifier, _store) = build(vec![snap(900.0)]);

    engine.set_alert(USER, "USD/NGN", "850").await.unwrap();
    engine.start_monitoring(USER).await.unwrap();

    // Wrong pair: no-op, the job keeps running and fires.
    engine.cancel(USER, &pair("EUR/NGN")).await;
    sleep(Duration::from_secs(11)).await;
    assert_eq!(notifier.sent().len(), 1);

    // Cancelling an already-finished job is a no-op too.
    engine.cancel(USER, &pair("USD/NGN")).await;
    engine.cancel(USER, &pair("USD/NGN")).await;
}

#[tokio::test(start_paused = true)]
async fn replacing_an_armed_alert_produces_no_stale_ticks() {
    let (engine, notifier, store) = build(vec![snap(900.0), snap(900.0), snap(900.0)]);

    engine.set_alert(USER, "USD/NGN", "850").await.unwrap();
    engine.start_monitoring(USER).await.unwrap();

    sleep(Duration::from_secs(5)).await;

    // Replace before the first tick; the superseded job is drained and
    // the old 850 threshold must never fire.
    engine.set_alert(USER, "USD/NGN", "99999").await.unwrap();
    engine.start_monitoring(USER).await.unwrap();

    sleep(INTERVAL * 2).await;
    assert!(notifier.sent().is_empty());

    let alert = store.active_alert(USER).await.unwrap();
    assert_eq!(alert.threshold, 99999.0);
    assert_eq!(alert.status, AlertStatus::Scheduled);
}

#[tokio::test(start_paused = true)]
async fn delivery_failure_still_retires_the_alert() {
    let (engine, notifier, store) = build(vec![snap(900.0), snap(900.0)]);
    notifier.fail_next.store(true, Ordering::SeqCst);

    engine.set_alert(USER, "USD/NGN", "850").await.unwrap();
    engine.start_monitoring(USER).await.unwrap();

    sleep(Duration::from_secs(11)).await;

    // Exactly one attempt, no retry, alert retired anyway.
    assert_eq!(notifier.sent().len(), 1);
    assert!(store.active_alert(USER).await.is_none());

    sleep(INTERVAL * 2).await;
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn set_alert_round_trips_normalized_fields() {
    let (engine, _notifier, store) = build(vec![]);

    let alert = engine.set_alert(USER, "usd/ngn", "850").await.unwrap();
    assert_eq!(alert.user, USER);
    assert_eq!(alert.pair.to_string(), "USD/NGN");
    assert_eq!(alert.threshold, 850.0);

    let read_back = store.active_alert(USER).await.unwrap();
    assert_eq!(read_back.user, alert.user);
    assert_eq!(read_back.pair, alert.pair);
    assert_eq!(read_back.threshold, alert.threshold);
}

#[tokio::test(start_paused = true)]
async fn jobs_for_different_users_run_independently() {
    let other = UserId(7);
    let (engine, notifier, _store) = build(vec![snap(900.0), snap(900.0)]);

    engine.set_alert(USER, "USD/NGN", "850").await.unwrap();
    engine.set_alert(other, "USD/NGN", "850").await.unwrap();
    engine.start_monitoring(USER).await.unwrap();
    engine.start_monitoring(other).await.unwrap();

    sleep(Duration::from_secs(11)).await;

    let mut users: Vec<UserId> = notifier.sent().into_iter().map(|(u, _)| u).collect();
    users.sort_by_key(|u| u.0);
    assert_eq!(users, vec![other, USER]);
}
