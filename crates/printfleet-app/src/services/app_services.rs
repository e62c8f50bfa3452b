// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer: wires the queue client, snapshot store, view model,
// preference store and dashboard layout together and hands the UI cheap,
// cloneable access to them.
//
// The view model is behind a tokio mutex; page actions go through
// `QueueViewModel::perform`, which releases it while backend calls run.
// Everything else is quick and sits behind std mutexes.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use printfleet_core::AppConfig;
use printfleet_core::error::Result;
use printfleet_core::permissions::AllowAll;
use printfleet_prefs::{
    DashboardLayout, LayoutState, MemoryPreferenceStore, PreferenceStore, Preferences,
    SqlitePreferenceStore, WidgetManifest, WidgetSize, WidgetSpec,
};
use printfleet_queue::{
    Dispatcher, HttpQueueClient, QueuePoller, QueueSnapshot, QueueStore, QueueView,
    QueueViewModel,
};
use tokio::sync::watch;
use tracing::{error, info, warn};

use super::data_dir;
use super::toasts::{self, ToastReceiver};

const CONFIG_FILE: &str = "config.json";
const PREFS_FILE: &str = "preferences.db";

/// Preference key holding the dashboard layout.
pub const DASHBOARD_LAYOUT_KEY: &str = "dashboard.layout";

/// Widgets the dashboard can show.
pub fn dashboard_manifest() -> WidgetManifest {
    WidgetManifest::new(vec![
        WidgetSpec::new("stats", "Queue at a glance", WidgetSize::Full),
        WidgetSpec::new("active", "Printing now", WidgetSize::Half),
        WidgetSpec::new("next", "Up next", WidgetSize::Half),
        WidgetSpec::new("printers", "Printers", WidgetSize::Half),
        WidgetSpec::new("recent", "Recently finished", WidgetSize::Half),
        WidgetSpec::new("failures", "Recent failures", WidgetSize::Quarter).hidden_by_default(),
    ])
}

/// Shared services, provided to every component via
/// `use_context::<AppServices>()`.
#[derive(Clone)]
pub struct AppServices {
    queue: Arc<tokio::sync::Mutex<QueueViewModel>>,
    store: Arc<QueueStore>,
    layout: Arc<Mutex<DashboardLayout>>,
    toasts: ToastReceiver,
    poller: Arc<Mutex<Option<QueuePoller>>>,
    data_dir: PathBuf,
    config: Arc<Mutex<AppConfig>>,
}

/// Two handles are equal when they share the same services.
impl PartialEq for AppServices {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.queue, &other.queue)
    }
}

impl AppServices {
    /// Persistent services, else the in-memory fallback. Fails only when
    /// neither can be built.
    pub fn start() -> Result<Self> {
        Self::start_with(Self::init, Self::fallback)
    }

    fn start_with(
        primary: impl FnOnce() -> Result<Self>,
        fallback: impl FnOnce() -> Result<Self>,
    ) -> Result<Self> {
        primary().or_else(|e| {
            error!(error = %e, "persistent storage failed, using in-memory fallback");
            fallback()
        })
    }

    /// Open the data directory, config file and preference database.
    pub fn init() -> Result<Self> {
        let dir = data_dir::data_dir()?;
        info!(path = %dir.display(), "initialising app services");

        let config = load_config(&dir).unwrap_or_default();
        let prefs = SqlitePreferenceStore::open(dir.join(PREFS_FILE))?;
        Self::build(dir, config, Arc::new(prefs))
    }

    /// Default config and in-memory preferences. Used when the data
    /// directory or database cannot be opened.
    pub fn fallback() -> Result<Self> {
        Self::build(
            std::env::temp_dir(),
            AppConfig::default(),
            Arc::new(MemoryPreferenceStore::new()),
        )
    }

    fn build(dir: PathBuf, config: AppConfig, prefs: Arc<dyn PreferenceStore>) -> Result<Self> {
        let client = HttpQueueClient::new(&config.api_base_url, config.request_timeout())?;
        let store = Arc::new(QueueStore::new(Arc::new(client)));

        let (sink, toasts) = toasts::channel();
        let dispatcher = Dispatcher::new(Arc::clone(&store), Arc::new(sink));
        let view_model = QueueViewModel::new(
            dispatcher,
            Preferences::load(Arc::clone(&prefs)),
            Arc::new(AllowAll),
            config.placeholder_horizon(),
        );
        let layout = DashboardLayout::load(prefs, DASHBOARD_LAYOUT_KEY, dashboard_manifest());

        info!(api = %config.api_base_url, "app services initialised");
        Ok(Self {
            queue: Arc::new(tokio::sync::Mutex::new(view_model)),
            store,
            layout: Arc::new(Mutex::new(layout)),
            toasts,
            poller: Arc::new(Mutex::new(None)),
            data_dir: dir,
            config: Arc::new(Mutex::new(config)),
        })
    }

    // -- Queue ---------------------------------------------------------------

    /// Start background polling if it is not already running. Must be
    /// called from within the tokio runtime.
    pub fn start_polling(&self) {
        let mut guard = self.poller.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.as_ref().is_some_and(QueuePoller::is_running) {
            return;
        }
        let interval = self.config().poll_interval();
        *guard = Some(QueuePoller::spawn(Arc::clone(&self.store), interval));
    }

    pub fn stop_polling(&self) {
        self.poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_polling(&self) -> bool {
        self.poller
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(QueuePoller::is_running)
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<QueueSnapshot>> {
        self.store.subscribe()
    }

    /// Fetch now. Failures are logged by the store.
    pub async fn refresh(&self) {
        self.store.invalidate().await;
    }

    /// The queue view model, for actions.
    pub fn queue(&self) -> Arc<tokio::sync::Mutex<QueueViewModel>> {
        Arc::clone(&self.queue)
    }

    /// Build the queue view as of now.
    pub async fn queue_view(&self) -> QueueView {
        self.queue.lock().await.view(Utc::now())
    }

    pub fn toasts(&self) -> ToastReceiver {
        Arc::clone(&self.toasts)
    }

    // -- Dashboard layout ----------------------------------------------------

    pub fn layout_state(&self) -> LayoutState {
        self.with_layout(|layout| layout.state().clone())
    }

    pub fn widget_title(&self, id: &str) -> String {
        self.with_layout(|layout| {
            layout
                .manifest()
                .get(id)
                .map(|w| w.title.clone())
                .unwrap_or_else(|| id.to_string())
        })
    }

    /// Move widget `active` into the slot held by `over`.
    pub fn move_widget(&self, active: &str, over: &str) -> Result<LayoutState> {
        self.with_layout(|layout| {
            layout.move_widget(active, over)?;
            Ok(layout.state().clone())
        })
    }

    pub fn toggle_widget(&self, id: &str) -> Result<LayoutState> {
        self.with_layout(|layout| {
            layout.toggle_visibility(id)?;
            Ok(layout.state().clone())
        })
    }

    pub fn cycle_widget_size(&self, id: &str) -> Result<LayoutState> {
        self.with_layout(|layout| {
            layout.cycle_size(id)?;
            Ok(layout.state().clone())
        })
    }

    pub fn reset_layout(&self) -> Result<LayoutState> {
        self.with_layout(|layout| {
            layout.reset()?;
            Ok(layout.state().clone())
        })
    }

    fn with_layout<R>(&self, f: impl FnOnce(&mut DashboardLayout) -> R) -> R {
        let mut guard = self.layout.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    // -- Config persistence --------------------------------------------------

    pub fn config(&self) -> AppConfig {
        self.config
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Update and persist the config. The API address and timeouts apply on
    /// next launch; the poll interval applies immediately.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        let previous = std::mem::replace(
            &mut *self.config.lock().unwrap_or_else(PoisonError::into_inner),
            config.clone(),
        );
        persist_config(&self.data_dir, config)?;
        if previous.poll_interval() != config.poll_interval() && self.is_polling() {
            self.stop_polling();
            self.start_polling();
        }
        Ok(())
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

// -- Config file persistence -------------------------------------------------

fn load_config(dir: &Path) -> Option<AppConfig> {
    let path = dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&data) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "config file is invalid, using defaults");
            None
        }
    }
}

fn persist_config(dir: &Path, config: &AppConfig) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(dir.join(CONFIG_FILE), json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use printfleet_core::error::FleetError;

    fn services_in(dir: &Path) -> AppServices {
        AppServices::build(
            dir.to_path_buf(),
            AppConfig::default(),
            Arc::new(MemoryPreferenceStore::new()),
        )
        .expect("services")
    }

    #[test]
    fn config_round_trips_through_the_data_dir() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let svc = services_in(tmp.path());
        let config = AppConfig {
            api_base_url: "http://fleet.lan:8000/api/v1".into(),
            poll_interval_secs: 10,
            ..AppConfig::default()
        };
        svc.save_config(&config).expect("save");
        assert_eq!(svc.config(), config);
        assert_eq!(load_config(tmp.path()), Some(config));
    }

    #[test]
    fn invalid_config_file_is_ignored() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::write(tmp.path().join(CONFIG_FILE), "{ not json").expect("write");
        assert_eq!(load_config(tmp.path()), None);
        assert_eq!(load_config(&tmp.path().join("missing")), None);
    }

    #[test]
    fn bad_api_address_fails_init() {
        let result = AppServices::build(
            std::env::temp_dir(),
            AppConfig {
                api_base_url: "fleet".into(),
                ..AppConfig::default()
            },
            Arc::new(MemoryPreferenceStore::new()),
        );
        assert!(result.is_err());
    }

    #[test]
    fn start_falls_back_to_memory_services() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let svc = AppServices::start_with(
            || Err(FleetError::Database("unable to open database file".into())),
            || Ok(services_in(tmp.path())),
        )
        .expect("fallback services");
        assert_eq!(svc.data_dir, tmp.path());
    }

    #[test]
    fn start_fails_when_the_fallback_fails_too() {
        let result = AppServices::start_with(
            || Err(FleetError::Database("unable to open database file".into())),
            || Err(FleetError::Http("TLS backend unavailable".into())),
        );
        assert!(matches!(result, Err(FleetError::Http(_))));
    }

    #[test]
    fn dashboard_layout_changes_are_kept() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let svc = services_in(tmp.path());

        let state = svc.layout_state();
        assert!(state.is_hidden("failures"));
        assert_eq!(state.order.first().map(String::as_str), Some("stats"));

        let state = svc.move_widget("recent", "stats").expect("move");
        assert_eq!(state.order.first().map(String::as_str), Some("recent"));

        let state = svc.toggle_widget("failures").expect("toggle");
        assert!(!state.is_hidden("failures"));

        let state = svc.cycle_widget_size("stats").expect("cycle");
        assert_eq!(state.size_of("stats"), WidgetSize::Quarter);

        let state = svc.reset_layout().expect("reset");
        assert_eq!(state, LayoutState::defaults(&dashboard_manifest()));
        assert_eq!(svc.widget_title("next"), "Up next");
    }

    #[tokio::test]
    async fn polling_starts_once_and_stops() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let svc = services_in(tmp.path());
        assert!(!svc.is_polling());
        svc.start_polling();
        svc.start_polling();
        assert!(svc.is_polling());
        svc.stop_polling();
        assert!(!svc.is_polling());
    }
}
