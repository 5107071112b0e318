use crate::core::store::{AppState, ContentStore, LoadSettings};
use crate::core::welcome::{WelcomeGate, WelcomeTimings};
use crate::domain::ports::{ConfigProvider, ContentApi, SessionStore};
use std::sync::Arc;

/// One mounted application: the content store plus the welcome gate that
/// waits on it. Views get the store through [`PortfolioApp::store`].
pub struct PortfolioApp<S: SessionStore + 'static> {
    store: Arc<ContentStore>,
    gate: WelcomeGate<S>,
}

impl<S: SessionStore + 'static> PortfolioApp<S> {
    pub fn mount<C: ConfigProvider + ?Sized>(
        api: Arc<dyn ContentApi>,
        config: &C,
        session: Arc<S>,
    ) -> Self {
        let store = Arc::new(ContentStore::new(api, LoadSettings::from_config(config)));
        let gate = WelcomeGate::mount(session, WelcomeTimings::from_config(config));
        Self::new(store, gate)
    }

    pub fn new(store: Arc<ContentStore>, gate: WelcomeGate<S>) -> Self {
        Self { store, gate }
    }

    pub fn store(&self) -> &Arc<ContentStore> {
        &self.store
    }

    pub fn show_welcome(&self) -> bool {
        self.gate.show_welcome()
    }

    pub fn gate(&self) -> &WelcomeGate<S> {
        &self.gate
    }

    /// Arms the splash release and loads every content domain.
    pub async fn start(&self) {
        self.arm_gate();
        self.store.load_all().await;
    }

    fn arm_gate(&self) {
        let store = Arc::clone(&self.store);
        let settled = self.store.settled();
        self.gate.release_after_load(async move {
            settled.await;
            store.load_started_at().await
        });
    }

    /// Waits until data has settled and the splash is gone, then returns the
    /// state views should render.
    pub async fn ready(&self) -> AppState {
        self.store.settled().await;
        self.gate.wait_dismissed().await;
        self.store.snapshot().await
    }

    pub fn on_welcome_complete(&self) {
        self.gate.complete();
    }

    pub fn reset_welcome(&self) {
        self.gate.reset();
        self.arm_gate();
    }

    pub fn teardown(&self) {
        self.gate.unmount();
    }
}
