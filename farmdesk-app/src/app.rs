//! `FarmApp`: the stores, the session and the replication scheduler,
//! wired together with an explicit lifecycle.

use crate::auth::AuthGate;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use chrono::{DateTime, Utc};
use farmdesk_assistant::{ask_or_apologize, Assistant, ChatTurn, GeminiAssistant, CONNECTION_ERROR};
use farmdesk_storage::{
    FarmRecord, FarmStore, KeyValueStore, SessionFlag, SqliteKvStore, StorageError,
    SyncConfigStore,
};
use farmdesk_sync::{
    CheckOutcome, HttpTransport, ReplicationScheduler, ReplicationTransport, SchedulerHandle,
};
use farmdesk_types::summary::{FarmTotals, PeriodReport};
use farmdesk_types::{FarmSnapshot, Period, RecordId, SyncConfig, SyncConfigPatch};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::{info, warn};

/// The farm ledger application.
///
/// Owns the Record Store and Sync Configuration, and the replication
/// scheduler while a session is active. The scheduler starts on login
/// (or [`FarmApp::resume_session`]) and stops on logout, when the endpoint
/// is cleared, or when the app is dropped.
pub struct FarmApp {
    config: AppConfig,
    store: Arc<RwLock<FarmStore>>,
    sync_config: Arc<Mutex<SyncConfigStore>>,
    auth: AuthGate,
    transport: Arc<dyn ReplicationTransport>,
    assistant: Option<Arc<dyn Assistant>>,
    scheduler: Option<SchedulerHandle>,
}

impl FarmApp {
    /// Opens the SQLite file named in `config` with the HTTP transport and,
    /// when an API key is configured, the Gemini assistant.
    pub fn open(config: AppConfig) -> AppResult<Self> {
        let kv: Arc<dyn KeyValueStore> = Arc::new(SqliteKvStore::open(&config.data_path)?);
        let transport: Arc<dyn ReplicationTransport> =
            Arc::new(HttpTransport::new(&config.transport)?);
        let assistant: Option<Arc<dyn Assistant>> =
            match GeminiAssistant::new(config.assistant.clone()) {
                Ok(gemini) => Some(Arc::new(gemini)),
                Err(e) => {
                    info!(reason = %e, "assistant unavailable");
                    None
                }
            };
        Ok(Self::with_parts(config, kv, transport, assistant))
    }

    /// Builds the app over explicit backends.
    pub fn with_parts(
        config: AppConfig,
        kv: Arc<dyn KeyValueStore>,
        transport: Arc<dyn ReplicationTransport>,
        assistant: Option<Arc<dyn Assistant>>,
    ) -> Self {
        let store = FarmStore::open(Arc::clone(&kv));
        let sync_config = SyncConfigStore::open(Arc::clone(&kv));
        let auth = AuthGate::new(config.access_pin.clone(), SessionFlag::new(kv));
        Self {
            config,
            store: Arc::new(RwLock::new(store)),
            sync_config: Arc::new(Mutex::new(sync_config)),
            auth,
            transport,
            assistant,
            scheduler: None,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // ── Session ─────────────────────────────────────────────────

    pub fn is_logged_in(&self) -> bool {
        self.auth.is_logged_in()
    }

    /// Checks `pin`, persists the session and starts replication.
    pub fn login(&mut self, pin: &str) -> AppResult<()> {
        self.auth.login(pin)?;
        self.start_scheduler();
        Ok(())
    }

    /// Starts replication for a session persisted by an earlier run.
    /// Returns whether the scheduler is running afterwards.
    pub fn resume_session(&mut self) -> bool {
        if self.auth.is_logged_in() {
            self.start_scheduler();
        }
        self.is_replicating()
    }

    /// Stops replication and forgets the session.
    pub async fn logout(&mut self) -> AppResult<()> {
        self.stop_scheduler().await;
        self.auth.logout()?;
        Ok(())
    }

    /// Stops the scheduler, letting an attempt in flight finish.
    pub async fn shutdown(mut self) {
        self.stop_scheduler().await;
    }

    // ── Replication ─────────────────────────────────────────────

    pub fn is_replicating(&self) -> bool {
        self.scheduler.as_ref().is_some_and(SchedulerHandle::is_running)
    }

    /// Outcomes of the running scheduler's checks.
    pub fn replication_outcomes(&self) -> Option<watch::Receiver<Option<CheckOutcome>>> {
        self.scheduler.as_ref().map(SchedulerHandle::outcomes)
    }

    pub fn sync_config(&self) -> SyncConfig {
        self.lock_sync_config().get().clone()
    }

    /// Sets or clears the replication endpoint. Clearing it stops the
    /// scheduler; setting one while logged in starts it if needed. A new
    /// endpoint is picked up by the next check.
    pub async fn set_endpoint(&mut self, url: Option<&str>) -> AppResult<SyncConfig> {
        let patch = match url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => SyncConfigPatch::endpoint(url),
            None => SyncConfigPatch::clear_endpoint(),
        };
        let config = self.lock_sync_config().set(patch)?.clone();

        if config.endpoint().is_none() {
            self.stop_scheduler().await;
        } else if self.auth.is_logged_in() {
            self.start_scheduler();
        }
        Ok(config)
    }

    /// Pushes the current snapshot immediately.
    pub async fn sync_now(&self) -> AppResult<DateTime<Utc>> {
        Ok(self.scheduler().sync_now().await?)
    }

    fn scheduler(&self) -> ReplicationScheduler {
        ReplicationScheduler::new(
            self.store.clone(),
            self.sync_config.clone(),
            Arc::clone(&self.transport),
            self.config.schedule,
        )
    }

    fn start_scheduler(&mut self) {
        if self.is_replicating() {
            return;
        }
        if self.sync_config().endpoint().is_none() {
            info!("no replication endpoint, scheduler not started");
            return;
        }
        if tokio::runtime::Handle::try_current().is_err() {
            warn!("no async runtime, scheduler not started");
            return;
        }
        self.scheduler = Some(self.scheduler().spawn());
    }

    async fn stop_scheduler(&mut self) {
        if let Some(handle) = self.scheduler.take() {
            handle.shutdown().await;
        }
    }

    fn lock_sync_config(&self) -> std::sync::MutexGuard<'_, SyncConfigStore> {
        self.sync_config.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Records ─────────────────────────────────────────────────

    /// Runs `f` with read access to the store.
    pub fn read<R>(&self, f: impl FnOnce(&FarmStore) -> R) -> R {
        let store = self.store.read().unwrap_or_else(PoisonError::into_inner);
        f(&*store)
    }

    fn write<R>(&self, f: impl FnOnce(&mut FarmStore) -> R) -> R {
        let mut store = self.store.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut *store)
    }

    /// Adds a record built by one of the `farmdesk_types::forms`. A record
    /// that breaks the record invariants is refused with
    /// [`AppError::Validation`].
    pub fn add<T: FarmRecord>(&self, record: T) -> AppResult<T> {
        self.write(|store| store.collection_mut::<T>().add(record)).map_err(record_error)
    }

    /// Merges `patch` into a record. A patch that would leave the record
    /// invalid is refused with [`AppError::Validation`] and changes nothing.
    pub fn update<T: FarmRecord>(&self, id: &RecordId, patch: T::Patch) -> AppResult<bool> {
        self.write(|store| store.collection_mut::<T>().update(id, patch)).map_err(record_error)
    }

    pub fn remove<T: FarmRecord>(&self, id: &RecordId) -> AppResult<bool> {
        Ok(self.write(|store| store.collection_mut::<T>().remove(id))?)
    }

    /// Copies of the records matching `predicate`, most recent first.
    pub fn list<T: FarmRecord>(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.read(|store| store.collection::<T>().list(predicate).cloned().collect())
    }

    pub fn snapshot(&self) -> FarmSnapshot {
        self.read(FarmStore::snapshot)
    }

    pub fn totals(&self) -> FarmTotals {
        FarmTotals::from_snapshot(&self.snapshot())
    }

    pub fn report(&self, period: Period) -> PeriodReport {
        self.read(|store| {
            PeriodReport::compute(store.orders().items(), store.expenses().items(), period)
        })
    }

    // ── Assistant ───────────────────────────────────────────────

    /// Asks the assistant about the current data. Always returns text to
    /// show, falling back to the connection-error message.
    pub async fn ask(&self, history: &[ChatTurn], question: &str) -> String {
        let Some(assistant) = &self.assistant else {
            warn!("assistant asked but none is configured");
            return CONNECTION_ERROR.to_string();
        };
        let snapshot = self.snapshot();
        ask_or_apologize(assistant.as_ref(), &snapshot, history, question).await
    }
}

fn record_error(err: StorageError) -> AppError {
    match err {
        StorageError::Invalid(invalid) => AppError::Validation(invalid),
        other => AppError::Storage(other),
    }
}
