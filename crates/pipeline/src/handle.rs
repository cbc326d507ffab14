//! Lazily built, process-wide pipeline.

use crate::build::build_pipeline;
use crate::runner::SynthesisPipeline;
use crate::small_talk::SmallTalkInterceptor;
use baseera_core::{AppConfig, AppError, AppResult};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OnceCell;

type Builder = Arc<dyn Fn() -> BoxFuture<'static, AppResult<SynthesisPipeline>> + Send + Sync>;

/// Builds the pipeline on first use and shares it afterwards.
///
/// Concurrent first callers wait on one construction. A failed construction is
/// not stored, so the next call tries again.
pub struct PipelineHandle {
    cell: OnceCell<Arc<SynthesisPipeline>>,
    builder: Builder,
}

impl PipelineHandle {
    pub fn new<F, Fut>(builder: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AppResult<SynthesisPipeline>> + Send + 'static,
    {
        Self {
            cell: OnceCell::new(),
            builder: Arc::new(move || builder().boxed()),
        }
    }

    /// Handle whose builder reads everything from `config`.
    pub fn from_config(config: Arc<AppConfig>) -> Self {
        Self::new(move || {
            let config = config.clone();
            async move { build_pipeline(&config).await }
        })
    }

    /// The pipeline, building it if this is the first successful call.
    pub async fn get(&self) -> AppResult<Arc<SynthesisPipeline>> {
        self.cell
            .get_or_try_init(|| async {
                tracing::info!("Initializing synthesis pipeline");
                let pipeline = (self.builder)().await?;
                Ok::<_, AppError>(Arc::new(pipeline))
            })
            .await
            .cloned()
    }

    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }
}

/// Process-wide state handed to request handlers.
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub pipeline: PipelineHandle,
    pub small_talk: SmallTalkInterceptor,
}

impl AppContext {
    pub fn new(config: Arc<AppConfig>, pipeline: PipelineHandle) -> Self {
        Self {
            config,
            pipeline,
            small_talk: SmallTalkInterceptor::new(),
        }
    }

    /// Context with a pipeline built lazily from `config`.
    pub fn from_config(config: AppConfig) -> Self {
        let config = Arc::new(config);
        Self::new(config.clone(), PipelineHandle::from_config(config))
    }
}
