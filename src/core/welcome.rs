//! First-load welcome splash gating.
//!
//! The gate decides from session-scoped storage whether the splash is shown,
//! and releases it once data has settled and the minimum display time has
//! passed, whichever comes later.

use crate::domain::ports::{ConfigProvider, SessionStore};
use serde::Serialize;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

pub const WELCOME_SHOWN_KEY: &str = "portfolio.welcome_shown";
pub const WELCOME_MOUNTS_KEY: &str = "portfolio.welcome_mounts";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WelcomeState {
    NotShown,
    Showing,
    Dismissed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WelcomeTimings {
    /// Floor for the first splash of a session.
    pub first_visit: Duration,
    /// Floor when the splash is mounted again in a session that has not
    /// completed it yet: a reload mid-splash, or a reset before completion.
    /// Completing clears the count, so complete-then-reset gets `first_visit`.
    pub returning: Duration,
}

impl WelcomeTimings {
    pub fn from_config<C: ConfigProvider + ?Sized>(config: &C) -> Self {
        Self {
            first_visit: config.welcome_first_visit(),
            returning: config.welcome_returning(),
        }
    }
}

impl Default for WelcomeTimings {
    fn default() -> Self {
        Self {
            first_visit: Duration::from_millis(2_500),
            returning: Duration::from_millis(1_200),
        }
    }
}

struct GateClock {
    mounted_at: Instant,
    minimum_display: Duration,
    pending: Option<JoinHandle<()>>,
}

struct GateShared<S: SessionStore> {
    session: Arc<S>,
    state: watch::Sender<WelcomeState>,
    clock: Mutex<GateClock>,
}

impl<S: SessionStore> GateShared<S> {
    fn clock(&self) -> MutexGuard<'_, GateClock> {
        // The clock holds plain data; a poisoned lock still has a usable value.
        self.clock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn complete(&self) {
        self.session.set(WELCOME_SHOWN_KEY, "true");
        self.session.remove(WELCOME_MOUNTS_KEY);
        if self.state.send_replace(WelcomeState::Dismissed) != WelcomeState::Dismissed {
            tracing::debug!("👋 Welcome splash dismissed");
        }
    }
}

pub struct WelcomeGate<S: SessionStore + 'static> {
    shared: Arc<GateShared<S>>,
    timings: WelcomeTimings,
}

impl<S: SessionStore + 'static> WelcomeGate<S> {
    /// Reads the session flag and decides whether the splash is shown.
    pub fn mount(session: Arc<S>, timings: WelcomeTimings) -> Self {
        let (state, _) = watch::channel(WelcomeState::NotShown);
        let shared = Arc::new(GateShared {
            session,
            state,
            clock: Mutex::new(GateClock {
                mounted_at: Instant::now(),
                minimum_display: Duration::ZERO,
                pending: None,
            }),
        });

        let gate = Self { shared, timings };
        if gate.flag_is_set() {
            gate.shared.state.send_replace(WelcomeState::Dismissed);
            tracing::debug!("Welcome already shown this session, skipping splash");
        } else {
            gate.begin_showing();
        }
        gate
    }

    fn flag_is_set(&self) -> bool {
        self.shared.session.get(WELCOME_SHOWN_KEY).as_deref() == Some("true")
    }

    fn begin_showing(&self) {
        let previous_mounts = self
            .shared
            .session
            .get(WELCOME_MOUNTS_KEY)
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(0);
        self.shared
            .session
            .set(WELCOME_MOUNTS_KEY, &(previous_mounts + 1).to_string());

        let minimum_display = if previous_mounts == 0 {
            self.timings.first_visit
        } else {
            self.timings.returning
        };

        {
            let mut clock = self.shared.clock();
            clock.mounted_at = Instant::now();
            clock.minimum_display = minimum_display;
        }
        self.shared.state.send_replace(WelcomeState::Showing);
        tracing::debug!("Showing welcome splash for at least {:?}", minimum_display);
    }

    pub fn state(&self) -> WelcomeState {
        *self.shared.state.borrow()
    }

    pub fn show_welcome(&self) -> bool {
        self.state() == WelcomeState::Showing
    }

    pub fn subscribe(&self) -> watch::Receiver<WelcomeState> {
        self.shared.state.subscribe()
    }

    pub fn minimum_display(&self) -> Duration {
        self.shared.clock().minimum_display
    }

    pub fn elapsed(&self) -> Duration {
        self.shared.clock().mounted_at.elapsed()
    }

    /// Dismisses once `settled` resolves and the minimum display time since
    /// mount has passed. No-op unless the splash is showing.
    pub fn release_after<F>(&self, settled: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.release_after_load(async move {
            settled.await;
            None
        });
    }

    /// Like [`release_after`](Self::release_after), with `settled` yielding
    /// when loading started. The minimum display then counts from the later
    /// of mount and load start.
    pub fn release_after_load<F>(&self, settled: F)
    where
        F: Future<Output = Option<Instant>> + Send + 'static,
    {
        if !self.show_welcome() {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            let load_started_at = settled.await;
            let remaining = {
                let clock = shared.clock();
                let shown_since = load_started_at
                    .map_or(clock.mounted_at, |started| started.max(clock.mounted_at));
                clock.minimum_display.saturating_sub(shown_since.elapsed())
            };
            if !remaining.is_zero() {
                tokio::time::sleep(remaining).await;
            }
            shared.complete();
        });

        if let Some(previous) = self.shared.clock().pending.replace(task) {
            previous.abort();
        }
    }

    /// Marks the splash as completed for the rest of the session.
    pub fn complete(&self) {
        self.cancel_pending();
        self.shared.complete();
    }

    /// Clears the session flag and shows the splash again.
    pub fn reset(&self) {
        self.cancel_pending();
        self.shared.session.remove(WELCOME_SHOWN_KEY);
        tracing::info!("🔁 Welcome splash reset");
        self.begin_showing();
    }

    pub async fn wait_dismissed(&self) {
        let mut state = self.subscribe();
        let _ = state
            .wait_for(|state| *state == WelcomeState::Dismissed)
            .await;
    }

    /// Cancels pending timers. The session flag is left as is.
    pub fn unmount(&self) {
        self.cancel_pending();
    }

    fn cancel_pending(&self) {
        if let Some(task) = self.shared.clock().pending.take() {
            task.abort();
        }
    }
}

impl<S: SessionStore + 'static> Drop for WelcomeGate<S> {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::session::MemorySessionStore;
    use tokio::time::sleep;

    fn timings() -> WelcomeTimings {
        WelcomeTimings {
            first_visit: Duration::from_millis(2_500),
            returning: Duration::from_millis(1_000),
        }
    }

    fn settles_after(ms: u64) -> impl Future<Output = ()> + Send + 'static {
        sleep(Duration::from_millis(ms))
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_session_shows_then_skips_after_complete() {
        let session = Arc::new(MemorySessionStore::new());

        let first = WelcomeGate::mount(Arc::clone(&session), timings());
        assert!(first.show_welcome());
        first.complete();
        assert!(!first.show_welcome());
        drop(first);

        let second = WelcomeGate::mount(Arc::clone(&session), timings());
        assert!(!second.show_welcome());
        assert_eq!(second.state(), WelcomeState::Dismissed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_restores_splash() {
        let session = Arc::new(MemorySessionStore::new());
        let gate = WelcomeGate::mount(Arc::clone(&session), timings());
        gate.complete();

        gate.reset();
        assert!(gate.show_welcome());
        assert_eq!(session.get(WELCOME_SHOWN_KEY), None);
        assert_eq!(gate.minimum_display(), Duration::from_millis(2_500));

        gate.reset();
        assert_eq!(gate.minimum_display(), Duration::from_millis(1_000));

        let remount = WelcomeGate::mount(Arc::clone(&session), timings());
        assert!(remount.show_welcome());
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_session_shows_splash_again() {
        let gate = WelcomeGate::mount(Arc::new(MemorySessionStore::new()), timings());
        gate.complete();

        let other_session = WelcomeGate::mount(Arc::new(MemorySessionStore::new()), timings());
        assert!(other_session.show_welcome());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_data_is_held_until_minimum_display() {
        let session = Arc::new(MemorySessionStore::new());
        let gate = WelcomeGate::mount(Arc::clone(&session), timings());
        let started = Instant::now();

        gate.release_after(settles_after(5));

        sleep(Duration::from_millis(2_400)).await;
        assert!(gate.show_welcome());

        gate.wait_dismissed().await;
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(2_500));
        assert!(elapsed < Duration::from_millis(2_510));
        assert_eq!(session.get(WELCOME_SHOWN_KEY).as_deref(), Some("true"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_data_dismisses_at_settlement() {
        let gate = WelcomeGate::mount(Arc::new(MemorySessionStore::new()), timings());
        let started = Instant::now();

        gate.release_after(settles_after(3_000));
        gate.wait_dismissed().await;

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(3_000));
        assert!(elapsed < Duration::from_millis(3_010));
    }

    #[tokio::test(start_paused = true)]
    async fn test_remount_before_completion_uses_returning_floor() {
        let session = Arc::new(MemorySessionStore::new());

        let first = WelcomeGate::mount(Arc::clone(&session), timings());
        assert_eq!(first.minimum_display(), Duration::from_millis(2_500));
        first.unmount();
        drop(first);

        let reload = WelcomeGate::mount(Arc::clone(&session), timings());
        assert!(reload.show_welcome());
        assert_eq!(reload.minimum_display(), Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_floor_counts_from_load_start_when_later_than_mount() {
        let gate = WelcomeGate::mount(Arc::new(MemorySessionStore::new()), timings());
        let mounted = Instant::now();

        sleep(Duration::from_millis(1_000)).await;
        let load_started = Instant::now();
        gate.release_after_load(async move {
            sleep(Duration::from_millis(500)).await;
            Some(load_started)
        });
        gate.wait_dismissed().await;

        let elapsed = mounted.elapsed();
        assert!(elapsed >= Duration::from_millis(3_500));
        assert!(elapsed < Duration::from_millis(3_510));
    }

    #[tokio::test(start_paused = true)]
    async fn test_earlier_load_start_does_not_shorten_floor() {
        let load_started = Instant::now();
        sleep(Duration::from_millis(2_000)).await;

        let gate = WelcomeGate::mount(Arc::new(MemorySessionStore::new()), timings());
        let mounted = Instant::now();
        gate.release_after_load(async move { Some(load_started) });
        gate.wait_dismissed().await;

        assert!(mounted.elapsed() >= Duration::from_millis(2_500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmount_cancels_pending_release() {
        let session = Arc::new(MemorySessionStore::new());
        let gate = WelcomeGate::mount(Arc::clone(&session), timings());

        gate.release_after(settles_after(5));
        sleep(Duration::from_millis(100)).await;
        gate.unmount();

        sleep(Duration::from_secs(10)).await;
        assert!(gate.show_welcome());
        assert_eq!(session.get(WELCOME_SHOWN_KEY), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_release_is_noop_when_already_dismissed() {
        let session = Arc::new(MemorySessionStore::new());
        session.set(WELCOME_SHOWN_KEY, "true");

        let gate = WelcomeGate::mount(Arc::clone(&session), timings());
        gate.release_after(std::future::pending());
        assert_eq!(gate.state(), WelcomeState::Dismissed);
        gate.wait_dismissed().await;
    }
}
