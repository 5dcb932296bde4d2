use cloudready::backend::BackendClient;
use cloudready::config::AppConfig;
use cloudready::error::AppError;
use cloudready::settings::FileTokenStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Shared dependencies for one-shot commands.
pub(crate) struct Context {
    pub(crate) config: AppConfig,
    pub(crate) client: Arc<BackendClient>,
    pub(crate) tokens: FileTokenStore,
}

impl Context {
    pub(crate) fn new(config: AppConfig) -> Result<Self, AppError> {
        let client = backend_client(&config)?;
        let tokens = FileTokenStore::new(config.settings.token_file.clone());
        Ok(Self {
            config,
            client,
            tokens,
        })
    }
}

pub(crate) fn backend_client(config: &AppConfig) -> Result<Arc<BackendClient>, AppError> {
    Ok(Arc::new(BackendClient::new(&config.backend)?))
}

/// Load configuration and apply a `--backend-url` override.
pub(crate) fn load_config(backend_url: Option<String>) -> Result<AppConfig, AppError> {
    let mut config = AppConfig::load()?;
    if let Some(url) = backend_url {
        config.backend.base_url = url;
    }
    Ok(config)
}
