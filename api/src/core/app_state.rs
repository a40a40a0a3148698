use std::{path::PathBuf, sync::Arc};

use ai_llm_service::{LlmProvider, LlmService, health_service::HealthService};
use interview::{CodeRunner, CodingCoach, QuizMaster, SessionStore};
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::{
    core::{
        app_settings::AppSettings,
        startup::{StartupState, check_llm},
    },
    error_handler::{AppError, AppResult},
};

/// Timeout for the startup probe and `/health`.
const HEALTH_TIMEOUT_SECS: u64 = 10;

/// LLM-backed components. Present only when the startup check passed.
pub struct LlmBackend {
    pub llm: Arc<LlmService>,
    pub coding: CodingCoach,
    pub quiz: QuizMaster,
}

impl LlmBackend {
    pub fn new(llm: Arc<LlmService>) -> Self {
        Self {
            coding: CodingCoach::new(llm.clone()),
            quiz: QuizMaster::new(llm.clone()),
            llm,
        }
    }
}

/// Settings in effect and the outcome of the LLM check they produced.
///
/// Replaced as a whole; handlers work on an `Arc` snapshot.
pub struct LlmRuntime {
    /// Keys filled from env.
    pub settings: AppSettings,
    pub startup: StartupState,
    pub backend: Option<Arc<LlmBackend>>,
    pub runner: CodeRunner,
}

impl LlmRuntime {
    pub fn new(settings: AppSettings, startup: StartupState, llm: Option<Arc<LlmService>>) -> Self {
        Self {
            runner: CodeRunner::new(settings.enable_code_execution),
            backend: llm.map(|l| Arc::new(LlmBackend::new(l))),
            settings,
            startup,
        }
    }

    pub fn provider(&self) -> Option<LlmProvider> {
        self.settings.provider().ok()
    }

    /// The LLM backend, or `LLM_UNAVAILABLE` when the check failed.
    pub fn backend(&self) -> AppResult<Arc<LlmBackend>> {
        match (&self.startup, &self.backend) {
            (StartupState::Ready, Some(b)) => Ok(b.clone()),
            (state, _) => Err(AppError::LlmUnavailable(
                state
                    .failure()
                    .unwrap_or("LLM service has not been initialized")
                    .to_string(),
            )),
        }
    }
}

/// Shared state for all HTTP handlers.
pub struct AppState {
    runtime: RwLock<Arc<LlmRuntime>>,
    /// Serializes re-checks so concurrent page loads run one check.
    recheck: Mutex<()>,
    /// Read on re-check; written by `PUT /api/settings`.
    pub settings_path: PathBuf,
    pub sessions: SessionStore,
    pub health: HealthService,
}

impl AppState {
    /// Runs the startup check and wires every component.
    ///
    /// A failed check is not an error: the state is built without a backend
    /// and the UI shows the failure banner.
    pub async fn initialize(settings: AppSettings, settings_path: PathBuf) -> AppResult<Self> {
        let health = HealthService::new(Some(HEALTH_TIMEOUT_SECS))?;
        let (startup, llm) = check_llm(&settings, &health).await;
        Ok(Self::assemble(
            LlmRuntime::new(settings, startup, llm),
            settings_path,
            health,
        ))
    }

    /// Builds the state from an already-checked runtime.
    pub fn assemble(runtime: LlmRuntime, settings_path: PathBuf, health: HealthService) -> Self {
        Self {
            runtime: RwLock::new(Arc::new(runtime)),
            recheck: Mutex::new(()),
            settings_path,
            sessions: SessionStore::new(),
            health,
        }
    }

    /// Current snapshot.
    pub async fn runtime(&self) -> Arc<LlmRuntime> {
        self.runtime.read().await.clone()
    }

    pub async fn backend(&self) -> AppResult<Arc<LlmBackend>> {
        self.runtime().await.backend()
    }

    /// Re-reads the settings file and repeats the check when the last one
    /// failed. A ready runtime is returned untouched.
    pub async fn retry_if_failed(&self) -> Arc<LlmRuntime> {
        let current = self.runtime().await;
        if current.startup.failure().is_none() {
            return current;
        }

        let _guard = self.recheck.lock().await;
        let current = self.runtime().await;
        if current.startup.failure().is_none() {
            return current;
        }

        let settings = match AppSettings::load(&self.settings_path).await {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, path = %self.settings_path.display(), "re-check keeps previous settings");
                current.settings.clone()
            }
        };
        let (startup, llm) = check_llm(&settings, &self.health).await;
        if startup.is_ready() {
            info!(provider = %settings.llm_provider, "LLM service recovered");
        }
        let next = Arc::new(LlmRuntime::new(settings, startup, llm));
        *self.runtime.write().await = next.clone();
        next
    }
}
