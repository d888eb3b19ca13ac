//! Wallet Polling
//!
//! Repeatedly asks the backend for a user's wallet until one has been
//! provisioned or polling is stopped.
//!
//! ## Session lifecycle
//!
//! - `start` makes one attempt immediately, then one per interval
//! - A wallet in the response ends the session and fires `on_success` once
//! - A failed attempt fires `on_error` and the session keeps polling
//! - `stop` ends the session; a request already in flight is allowed to
//!   finish but its outcome is discarded
//!
//! At most one session is armed per poller. Starting again replaces the
//! current session.

use crate::client::{ApiResult, BackendClient, WalletInfo};
use async_trait::async_trait;
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::time::MissedTickBehavior;

/// Default interval between poll attempts
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Anything that can look up a user's wallet
#[async_trait]
pub trait WalletSource: Send + Sync + 'static {
    async fn fetch_wallet(&self, user_id: &str) -> ApiResult<WalletInfo>;
}

#[async_trait]
impl WalletSource for BackendClient {
    async fn fetch_wallet(&self, user_id: &str) -> ApiResult<WalletInfo> {
        BackendClient::fetch_wallet(self, user_id).await
    }
}

/// Polling state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Inactive,
    Active,
}

/// Outcome delivered by [`WalletPoller::start_channel`]
#[derive(Debug, Clone, PartialEq)]
pub enum PollEvent {
    /// Wallet provisioned; always the last event of a session
    Found(WalletInfo),
    /// A single attempt failed; polling continues
    Error(String),
}

/// Handle to the armed session
struct Session {
    id: u64,
    active: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl Session {
    fn cancel(self) {
        self.active.store(false, Ordering::SeqCst);
        // Stores a permit if the loop is mid-attempt rather than waiting
        self.wake.notify_one();
    }
}

type SessionSlot = Arc<Mutex<Option<Session>>>;

fn lock(slot: &SessionSlot) -> MutexGuard<'_, Option<Session>> {
    slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Polls a [`WalletSource`] until a wallet appears
pub struct WalletPoller {
    source: Arc<dyn WalletSource>,
    slot: SessionSlot,
    next_id: AtomicU64,
}

impl WalletPoller {
    /// Create a poller over any wallet source
    pub fn new(source: Arc<dyn WalletSource>) -> Self {
        Self {
            source,
            slot: Arc::new(Mutex::new(None)),
            next_id: AtomicU64::new(0),
        }
    }

    /// Create a poller backed by a [`BackendClient`]
    pub fn for_client(client: BackendClient) -> Self {
        Self::new(Arc::new(client))
    }

    /// Current state
    pub fn state(&self) -> PollState {
        if lock(&self.slot).is_some() {
            PollState::Active
        } else {
            PollState::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        self.state() == PollState::Active
    }

    /// Id of the armed session's timer, if any
    pub fn timer_id(&self) -> Option<u64> {
        lock(&self.slot).as_ref().map(|s| s.id)
    }

    /// Start polling for `user_id`, stopping any session already running.
    ///
    /// Must be called from within a tokio runtime. Returns the new
    /// session's timer id.
    pub fn start<S, E>(
        &self,
        user_id: impl Into<String>,
        on_success: S,
        on_error: E,
        interval: Duration,
    ) -> u64
    where
        S: FnOnce(WalletInfo) + Send + 'static,
        E: Fn(String) + Send + Sync + 'static,
    {
        let user_id = user_id.into();
        let mut slot = lock(&self.slot);

        if let Some(previous) = slot.take() {
            tracing::info!(
                timer_id = previous.id,
                "Polling already active, stopping previous session"
            );
            previous.cancel();
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let active = Arc::new(AtomicBool::new(true));
        let wake = Arc::new(Notify::new());

        tracing::info!(
            user_id = %user_id,
            interval_ms = interval.as_millis() as u64,
            timer_id = id,
            "Starting wallet polling"
        );

        let run = SessionRun {
            id,
            user_id,
            interval: interval.max(Duration::from_millis(1)),
            source: Arc::clone(&self.source),
            slot: Arc::clone(&self.slot),
            active: Arc::clone(&active),
            wake: Arc::clone(&wake),
        };
        tokio::spawn(run.run(Box::new(on_success), Box::new(on_error)));

        *slot = Some(Session { id, active, wake });
        id
    }

    /// Start polling at [`DEFAULT_POLL_INTERVAL`]
    pub fn start_default<S, E>(&self, user_id: impl Into<String>, on_success: S, on_error: E) -> u64
    where
        S: FnOnce(WalletInfo) + Send + 'static,
        E: Fn(String) + Send + Sync + 'static,
    {
        self.start(user_id, on_success, on_error, DEFAULT_POLL_INTERVAL)
    }

    /// Start polling and receive outcomes on a channel.
    ///
    /// The channel yields any number of [`PollEvent::Error`] and at most one
    /// [`PollEvent::Found`], and closes when the session ends.
    pub fn start_channel(
        &self,
        user_id: impl Into<String>,
        interval: Duration,
    ) -> (u64, mpsc::UnboundedReceiver<PollEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let error_tx = tx.clone();

        let id = self.start(
            user_id,
            move |info| {
                let _ = tx.send(PollEvent::Found(info));
            },
            move |message| {
                let _ = error_tx.send(PollEvent::Error(message));
            },
            interval,
        );

        (id, rx)
    }

    /// Stop polling. Does nothing when no session is armed.
    ///
    /// Once this returns, the stopped session will not call `on_success`.
    pub fn stop(&self) {
        self.cancel_session();
    }

    /// Cancel the armed session, returning whether there was one
    fn cancel_session(&self) -> bool {
        let mut slot = lock(&self.slot);
        match slot.take() {
            Some(session) => {
                tracing::info!(timer_id = session.id, "Wallet polling stopped");
                session.cancel();
                true
            }
            None => false,
        }
    }
}

impl Drop for WalletPoller {
    fn drop(&mut self) {
        self.stop();
    }
}

/// State owned by a running session task
struct SessionRun {
    id: u64,
    user_id: String,
    interval: Duration,
    source: Arc<dyn WalletSource>,
    slot: SessionSlot,
    active: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl SessionRun {
    async fn run(
        self,
        on_success: Box<dyn FnOnce(WalletInfo) + Send>,
        on_error: Box<dyn Fn(String) + Send + Sync>,
    ) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            // First tick completes immediately
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.wake.notified() => break,
            }

            if !self.is_active() {
                break;
            }

            let source = Arc::clone(&self.source);
            let user_id = self.user_id.clone();
            let attempt =
                tokio::spawn(async move { source.fetch_wallet(&user_id).await }).await;

            if !self.is_active() {
                tracing::debug!(timer_id = self.id, "Discarding poll result from stopped session");
                break;
            }

            match attempt {
                Ok(ApiResult::Success(info)) if info.has_wallet() => {
                    if self.finish() {
                        tracing::info!(timer_id = self.id, "Wallet found, stopping polling");
                        on_success(info);
                    } else {
                        tracing::debug!(timer_id = self.id, "Wallet found after session stopped");
                    }
                    break;
                }
                Ok(ApiResult::Success(_)) => {
                    tracing::debug!(timer_id = self.id, "No wallet found, continuing to poll");
                }
                Ok(ApiResult::Failure(message)) => {
                    tracing::warn!(timer_id = self.id, error = %message, "Polling error");
                    on_error(message);
                }
                Err(join_error) => {
                    let message = if join_error.is_panic() {
                        panic_message(join_error.into_panic())
                    } else {
                        join_error.to_string()
                    };
                    tracing::error!(timer_id = self.id, error = %message, "Polling exception");
                    on_error(message);
                }
            }
        }
    }

    fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Claim the session for a successful finish and release the poller's slot.
    ///
    /// Returns false when `stop` or a restart got there first. Both sides
    /// take the slot lock, so exactly one of them wins.
    fn finish(&self) -> bool {
        let mut slot = lock(&self.slot);
        if !slot.as_ref().is_some_and(|s| s.id == self.id) {
            return false;
        }
        *slot = None;
        self.active
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "wallet poll attempt panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::AtomicUsize;

    enum Step {
        Pending,
        Found(&'static str),
        Fail(&'static str),
        Panic(&'static str),
        Slow(Duration, &'static str),
    }

    /// Replays a fixed script, then reports "no wallet yet" forever
    struct ScriptedSource {
        steps: Mutex<VecDeque<Step>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(steps: Vec<Step>) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.into()),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WalletSource for ScriptedSource {
        async fn fetch_wallet(&self, _user_id: &str) -> ApiResult<WalletInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.steps.lock().unwrap().pop_front().unwrap_or(Step::Pending);
            match step {
                Step::Pending => ApiResult::Success(WalletInfo::pending()),
                Step::Found(address) => ApiResult::Success(WalletInfo::assigned(address)),
                Step::Fail(message) => ApiResult::Failure(message.to_string()),
                Step::Panic(message) => panic!("{}", message),
                Step::Slow(delay, address) => {
                    tokio::time::sleep(delay).await;
                    ApiResult::Success(WalletInfo::assigned(address))
                }
            }
        }
    }

    #[derive(Default)]
    struct Recorder {
        found: Mutex<Vec<WalletInfo>>,
        errors: Mutex<Vec<String>>,
    }

    fn start_recorded(
        poller: &WalletPoller,
        recorder: &Arc<Recorder>,
        interval: Duration,
    ) -> u64 {
        let found = Arc::clone(recorder);
        let errors = Arc::clone(recorder);
        poller.start(
            "42",
            move |info| found.found.lock().unwrap().push(info),
            move |message| errors.errors.lock().unwrap().push(message),
            interval,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_before_start_is_noop() {
        let poller = WalletPoller::new(ScriptedSource::new(vec![]));
        poller.stop();
        assert_eq!(poller.state(), PollState::Inactive);
        assert_eq!(poller.timer_id(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_is_immediate() {
        let source = ScriptedSource::new(vec![]);
        let poller = WalletPoller::new(source.clone());
        let recorder = Arc::new(Recorder::default());

        start_recorded(&poller, &recorder, DEFAULT_POLL_INTERVAL);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(source.calls(), 1);
        assert!(poller.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_leaves_one_timer() {
        let source = ScriptedSource::new(vec![]);
        let poller = WalletPoller::new(source.clone());
        let recorder = Arc::new(Recorder::default());

        let first = start_recorded(&poller, &recorder, DEFAULT_POLL_INTERVAL);
        let second = start_recorded(&poller, &recorder, DEFAULT_POLL_INTERVAL);

        assert_ne!(first, second);
        assert_eq!(poller.timer_id(), Some(second));

        // Only the second session polls: t=0, 5s, 10s
        tokio::time::sleep(Duration::from_millis(10_050)).await;
        assert_eq!(source.calls(), 3);
        assert_eq!(poller.timer_id(), Some(second));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wallet_found_ends_session() {
        let source = ScriptedSource::new(vec![Step::Pending, Step::Found("7xKXtg2CW87d97TXJSDp")]);
        let poller = WalletPoller::new(source.clone());
        let recorder = Arc::new(Recorder::default());

        start_recorded(&poller, &recorder, DEFAULT_POLL_INTERVAL);
        tokio::time::sleep(Duration::from_millis(5_050)).await;

        let found = recorder.found.lock().unwrap().clone();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].wallet(), Some("7xKXtg2CW87d97TXJSDp"));
        assert_eq!(poller.state(), PollState::Inactive);
        assert_eq!(poller.timer_id(), None);

        // No further ticks
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(recorder.found.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_polling() {
        let source = ScriptedSource::new(vec![Step::Fail("HTTP 500: Internal Server Error")]);
        let poller = WalletPoller::new(source.clone());
        let recorder = Arc::new(Recorder::default());

        start_recorded(&poller, &recorder, DEFAULT_POLL_INTERVAL);
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(
            *recorder.errors.lock().unwrap(),
            vec!["HTTP 500: Internal Server Error".to_string()]
        );
        assert_eq!(poller.state(), PollState::Active);

        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert_eq!(source.calls(), 2);
        assert_eq!(recorder.errors.lock().unwrap().len(), 1);
        assert!(recorder.found.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_attempt_reports_error() {
        let source = ScriptedSource::new(vec![
            Step::Panic("backend exploded"),
            Step::Found("WALLETADDR"),
        ]);
        let poller = WalletPoller::new(source.clone());
        let recorder = Arc::new(Recorder::default());

        start_recorded(&poller, &recorder, Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(*recorder.errors.lock().unwrap(), vec!["backend exploded".to_string()]);
        assert_eq!(recorder.found.lock().unwrap().len(), 1);
        assert_eq!(poller.state(), PollState::Inactive);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_discards_in_flight_result() {
        let source = ScriptedSource::new(vec![Step::Slow(Duration::from_secs(1), "LATEWALLET")]);
        let poller = WalletPoller::new(source.clone());
        let recorder = Arc::new(Recorder::default());

        start_recorded(&poller, &recorder, DEFAULT_POLL_INTERVAL);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(source.calls(), 1);

        poller.stop();
        assert_eq!(poller.state(), PollState::Inactive);

        tokio::time::sleep(Duration::from_secs(20)).await;
        assert!(recorder.found.lock().unwrap().is_empty());
        assert!(recorder.errors.lock().unwrap().is_empty());
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_attempts_do_not_overlap() {
        let source = ScriptedSource::new(vec![
            Step::Slow(Duration::from_millis(250), ""),
            Step::Slow(Duration::from_millis(250), ""),
        ]);
        let poller = WalletPoller::new(source.clone());
        let recorder = Arc::new(Recorder::default());

        // Interval shorter than the request: attempts still run one at a time
        start_recorded(&poller, &recorder, Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(source.calls(), 2);
        assert!(recorder.found.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_channel_events() {
        let source = ScriptedSource::new(vec![
            Step::Fail("timeout"),
            Step::Pending,
            Step::Found("ABCDEFGHIJKL"),
        ]);
        let poller = WalletPoller::new(source);

        let (_, mut events) = poller.start_channel("42", Duration::from_millis(100));

        assert_eq!(events.recv().await, Some(PollEvent::Error("timeout".into())));
        assert_eq!(
            events.recv().await,
            Some(PollEvent::Found(WalletInfo::assigned("ABCDEFGHIJKL")))
        );
        assert_eq!(events.recv().await, None);
        assert!(!poller.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_channel_closes_on_stop() {
        let poller = WalletPoller::new(ScriptedSource::new(vec![]));
        let (_, mut events) = poller.start_channel("42", Duration::from_millis(100));

        tokio::time::sleep(Duration::from_millis(250)).await;
        poller.stop();

        assert_eq!(events.recv().await, None);
    }

    /// Finds a wallet on every attempt
    struct InstantSource;

    #[async_trait]
    impl WalletSource for InstantSource {
        async fn fetch_wallet(&self, _user_id: &str) -> ApiResult<WalletInfo> {
            ApiResult::Success(WalletInfo::assigned("INSTANTWALLET"))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_stop_and_success_are_exclusive() {
        let poller = WalletPoller::new(Arc::new(InstantSource));

        for round in 0..2_000 {
            let (_, mut events) = poller.start_channel("42", Duration::from_millis(1));
            if round % 2 == 0 {
                tokio::task::yield_now().await;
            }
            let cancelled = poller.cancel_session();

            let mut found = 0;
            let drained = tokio::time::timeout(Duration::from_secs(5), async {
                while let Some(event) = events.recv().await {
                    assert!(matches!(event, PollEvent::Found(_)), "round {}", round);
                    found += 1;
                }
            })
            .await;
            assert!(drained.is_ok(), "session did not end in round {}", round);

            // A cancelled session never reports; one that finished first reports once
            let expected = if cancelled { 0 } else { 1 };
            assert_eq!(found, expected, "round {} cancelled={}", round, cancelled);
            assert!(!poller.is_active());
        }
    }
}
