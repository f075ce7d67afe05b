//! Recognition Orchestrator
//!
//! Owns the recognition client, submits bundled images for recognition and
//! turns each outcome into a new result record on the shared state store.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::assets::{AssetLibrary, BundledImage};
use crate::config::AppConfig;
use crate::shared::{ResultRecord, StateStore};
use crate::vision::{
    normalize, HttpRecognizer, NormalizeOptions, RecognitionError, RecognizedText,
    RecognizerBackend, ScriptedRecognizer, TextRecognizer,
};

/// Creates the recognition client on first use
pub type RecognizerFactory =
    Box<dyn Fn() -> Result<Arc<dyn TextRecognizer>, RecognitionError> + Send + Sync>;

/// Mediates between the UI and the recognition service
pub struct RecognitionOrchestrator {
    /// Shared result state
    store: Arc<StateStore>,
    /// Bundled image source
    assets: AssetLibrary,
    /// Client constructor, called at most once successfully
    factory: RecognizerFactory,
    /// Lazily configured client
    recognizer: OnceCell<Arc<dyn TextRecognizer>>,
    options: NormalizeOptions,
    timeout: Option<Duration>,
    failure_prefix: String,
}

impl RecognitionOrchestrator {
    /// Create an orchestrator with default normalizer options and no deadline
    pub fn new(store: Arc<StateStore>, assets: AssetLibrary, factory: RecognizerFactory) -> Self {
        Self {
            store,
            assets,
            factory,
            recognizer: OnceCell::new(),
            options: NormalizeOptions::default(),
            timeout: None,
            failure_prefix: "Recognition failed: ".to_string(),
        }
    }

    /// Create an orchestrator wired as described by the configuration
    pub fn from_config(config: &AppConfig, store: Arc<StateStore>) -> Self {
        let settings = config.recognition.clone();
        let factory: RecognizerFactory = Box::new(move || match settings.backend {
            RecognizerBackend::Http => {
                let recognizer = HttpRecognizer::new(settings.endpoint.clone())?;
                Ok(Arc::new(recognizer) as Arc<dyn TextRecognizer>)
            }
            RecognizerBackend::Fixture => {
                let path = settings.fixture.as_ref().ok_or_else(|| {
                    RecognitionError::client_init("fixture backend requires recognition.fixture")
                })?;
                let recognizer = ScriptedRecognizer::from_fixture(path)?;
                Ok(Arc::new(recognizer) as Arc<dyn TextRecognizer>)
            }
        });

        Self::new(store, AssetLibrary::from_settings(&config.assets), factory)
            .with_normalize_options(config.normalize_options())
            .with_timeout(config.recognition.timeout())
            .with_failure_prefix(config.display.failure_prefix.clone())
    }

    pub fn with_normalize_options(mut self, options: NormalizeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_failure_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.failure_prefix = prefix.into();
        self
    }

    /// Shared result state
    pub fn store(&self) -> &Arc<StateStore> {
        &self.store
    }

    /// Whether the recognition client has been configured
    pub fn is_configured(&self) -> bool {
        self.recognizer.initialized()
    }

    /// Clear results and re-enable processing
    pub fn reset(&self) {
        info!("Resetting recognition results");
        self.store.reset(true);
    }

    /// Get the recognition client, configuring it exactly once.
    ///
    /// A failed configuration is not cached; the next request retries it.
    async fn recognizer(&self) -> Result<Arc<dyn TextRecognizer>, RecognitionError> {
        let recognizer = self
            .recognizer
            .get_or_try_init(|| async {
                let recognizer = (self.factory)()?;
                info!("Text recognizer '{}' configured", recognizer.name());
                Ok::<_, RecognitionError>(recognizer)
            })
            .await?;
        Ok(Arc::clone(recognizer))
    }

    /// Recognize the text in one of the bundled images.
    ///
    /// Processing is disabled on the store before anything else happens. On
    /// completion the store holds either the normalized result or a failure
    /// message, and processing is enabled again. Returns `Busy` without
    /// touching the store when another request is in flight.
    pub async fn recognize_text_in_image(
        &self,
        image: BundledImage,
    ) -> Result<ResultRecord, RecognitionError> {
        if !self.store.begin_processing() {
            warn!("Ignoring request for {}: recognition already in progress", image);
            return Err(RecognitionError::Busy);
        }

        info!("Recognizing text in {}", image);

        match self.run(image).await {
            Ok(text) => {
                let record = normalize(&text, &self.options);
                info!(
                    "Recognized {} elements in {} (total confidence {})",
                    record.element_confidence.len(),
                    image,
                    record.total_confidence
                );
                self.store.apply(record.clone());
                Ok(record)
            }
            Err(e) => {
                error!("Text recognition in {} failed: {}", image, e);
                self.store
                    .apply(ResultRecord::message(format!("{}{}", self.failure_prefix, e)));
                Err(e)
            }
        }
    }

    async fn run(&self, image: BundledImage) -> Result<RecognizedText, RecognitionError> {
        let decoded = self.assets.load_async(image).await?;
        let recognizer = self.recognizer().await?;

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, recognizer.process(&decoded))
                .await
                .map_err(|_| RecognitionError::Timeout {
                    after_ms: limit.as_millis() as u64,
                })?,
            None => recognizer.process(&decoded).await,
        }
    }

    /// Run a recognition on the tokio runtime without waiting for it
    pub fn spawn_recognition(
        self: &Arc<Self>,
        image: BundledImage,
    ) -> JoinHandle<Result<ResultRecord, RecognitionError>> {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move { orchestrator.recognize_text_in_image(image).await })
    }
}
