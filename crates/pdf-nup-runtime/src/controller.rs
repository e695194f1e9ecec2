//! Cancellable preview generation

use crate::cancel::CancelFlag;
use crate::rasterizer::{Rasterizer, RenderableDocument};
use crate::{GenerationId, PreviewPage, PreviewResult, PreviewUpdate};
use pdf_nup::constants::{PREVIEW_RENDER_SCALE, PREVIEW_SHEET_LIMIT};
use pdf_nup::{NupError, NupOptions, Result, WorkingDocument, compose_bytes};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Why a preview could not be produced
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreviewFailure {
    #[error("Failed to load PDF renderer. Please retry.")]
    RendererUnavailable,
    #[error("Invalid or password-protected PDF")]
    InvalidDocument,
    #[error("Failed to generate preview. Please try again.")]
    Generic,
}

impl PreviewFailure {
    /// Only renderer setup can be retried without a new document
    pub fn is_retryable(&self) -> bool {
        matches!(self, PreviewFailure::RendererUnavailable)
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    fn classify(error: &NupError) -> Self {
        match error {
            NupError::RendererInit(_) => PreviewFailure::RendererUnavailable,
            NupError::Pdf(_)
            | NupError::Parse { .. }
            | NupError::Encrypted
            | NupError::NoPages
            | NupError::InvalidPageGeometry { .. } => PreviewFailure::InvalidDocument,
            _ => PreviewFailure::Generic,
        }
    }
}

/// Snapshot of the controller's state machine
#[derive(Debug, Clone, Default)]
pub enum PreviewState {
    #[default]
    Idle,
    Generating(GenerationId),
    Ready(Arc<PreviewResult>),
    Failed(PreviewFailure),
}

struct Inner {
    generation: u64,
    cancel: CancelFlag,
    state: PreviewState,
}

struct Shared {
    inner: Mutex<Inner>,
    updates: mpsc::UnboundedSender<PreviewUpdate>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record a terminal transition unless the generation was superseded.
    ///
    /// The flag is checked under the same lock a new request takes to
    /// replace it, so a stale generation can never publish after a newer
    /// one has announced itself.
    fn publish(&self, generation: GenerationId, cancel: &CancelFlag, outcome: Result<PreviewResult>) {
        let mut inner = self.lock();
        if cancel.is_cancelled() {
            log::debug!("Discarding superseded preview {:?}", generation);
            return;
        }

        let update = match outcome {
            Ok(result) => {
                log::info!(
                    "Preview {:?} ready: {} of {} sheet(s) rendered",
                    generation,
                    result.pages.len(),
                    result.total_sheets
                );
                let result = Arc::new(result);
                inner.state = PreviewState::Ready(Arc::clone(&result));
                PreviewUpdate::Ready { generation, result }
            }
            Err(NupError::Cancelled) => return,
            Err(e) => {
                log::warn!("Preview {:?} failed: {}", generation, e);
                let failure = PreviewFailure::classify(&e);
                inner.state = PreviewState::Failed(failure.clone());
                PreviewUpdate::Failed {
                    generation,
                    failure,
                }
            }
        };

        let _ = self.updates.send(update);
    }
}

/// Drives preview generations for the current working document.
///
/// Every [`request`](Self::request) cancels the generation in flight. Only
/// the latest request ever reaches `Ready` or `Failed`.
pub struct PreviewController<R: Rasterizer> {
    config: R::Config,
    renderer: Mutex<std::result::Result<Arc<R>, String>>,
    /// Held by whoever is inside the rasterizer: a generation's render stage
    /// or renderer setup. A superseded generation keeps it until its next
    /// checkpoint.
    render_gate: Arc<Mutex<()>>,
    shared: Arc<Shared>,
}

impl<R: Rasterizer> PreviewController<R> {
    /// Initialize the rasterizer and return the controller with its update
    /// channel. A failed initialization is kept and reported by each request
    /// until [`retry_renderer`](Self::retry_renderer) succeeds.
    pub fn new(config: R::Config) -> (Self, mpsc::UnboundedReceiver<PreviewUpdate>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        let render_gate = Arc::new(Mutex::new(()));
        let renderer = init_renderer::<R>(&config, &render_gate);

        let controller = Self {
            config,
            renderer: Mutex::new(renderer),
            render_gate,
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    generation: 0,
                    cancel: CancelFlag::new(),
                    state: PreviewState::Idle,
                }),
                updates: update_tx,
            }),
        };
        (controller, update_rx)
    }

    pub fn state(&self) -> PreviewState {
        self.shared.lock().state.clone()
    }

    pub fn renderer_available(&self) -> bool {
        self.lock_renderer().is_ok()
    }

    /// Retry rasterizer setup after a `RendererUnavailable` failure
    pub fn retry_renderer(&self) -> bool {
        let mut renderer = self.lock_renderer();
        if renderer.is_err() {
            *renderer = init_renderer::<R>(&self.config, &self.render_gate);
        }
        renderer.is_ok()
    }

    /// Start a new generation for `document`, superseding any in flight
    pub fn request(&self, document: &WorkingDocument, options: NupOptions) -> JoinHandle<()> {
        let renderer = self.lock_renderer().clone();
        let cancel = CancelFlag::new();

        let generation = {
            let mut inner = self.shared.lock();
            inner.cancel.cancel();
            inner.cancel = cancel.clone();
            inner.generation += 1;

            let generation = GenerationId(inner.generation);
            inner.state = PreviewState::Generating(generation);
            let _ = self.shared.updates.send(PreviewUpdate::Generating { generation });
            generation
        };
        log::debug!(
            "Preview {:?} requested for {} ({})",
            generation,
            document.file_name,
            options.layout
        );

        let shared = Arc::clone(&self.shared);
        let render_gate = Arc::clone(&self.render_gate);
        let bytes = Arc::clone(&document.bytes);

        tokio::spawn(async move {
            let outcome = match renderer {
                Err(message) => Err(NupError::RendererInit(message)),
                Ok(renderer) => {
                    let cancel = cancel.clone();
                    tokio::task::spawn_blocking(move || {
                        generate(renderer.as_ref(), &render_gate, &bytes, &options, &cancel)
                    })
                    .await
                    .unwrap_or_else(|e| Err(NupError::TaskJoin(e)))
                }
            };

            shared.publish(generation, &cancel, outcome);
        })
    }

    /// Cancel the generation in flight and return to `Idle`
    pub fn shutdown(&self) {
        let mut inner = self.shared.lock();
        inner.cancel.cancel();
        if matches!(inner.state, PreviewState::Generating(_)) {
            inner.state = PreviewState::Idle;
        }
    }

    fn lock_renderer(&self) -> MutexGuard<'_, std::result::Result<Arc<R>, String>> {
        self.renderer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R: Rasterizer> Drop for PreviewController<R> {
    fn drop(&mut self) {
        self.shared.lock().cancel.cancel();
    }
}

fn init_renderer<R: Rasterizer>(
    config: &R::Config,
    render_gate: &Mutex<()>,
) -> std::result::Result<Arc<R>, String> {
    let _gate = render_gate.lock().unwrap_or_else(PoisonError::into_inner);
    R::initialize(config).map(Arc::new).map_err(|e| {
        log::warn!("Renderer initialization failed: {}", e);
        e.to_string()
    })
}

/// Compose, then rasterize the leading sheets of the result.
///
/// Composition runs unguarded; only one generation at a time is inside the
/// rasterizer.
fn generate<R: Rasterizer>(
    renderer: &R,
    render_gate: &Mutex<()>,
    source: &[u8],
    options: &NupOptions,
    cancel: &CancelFlag,
) -> Result<PreviewResult> {
    let composed = compose_bytes(source, options)?;
    cancel.checkpoint()?;

    let _gate = render_gate.lock().unwrap_or_else(PoisonError::into_inner);
    cancel.checkpoint()?;

    let mut result = None;
    renderer.with_document(&composed, &mut |document: &mut dyn RenderableDocument| {
        cancel.checkpoint()?;
        let total_sheets = document.page_count();
        let mut pages = Vec::new();

        for index in 0..total_sheets.min(PREVIEW_SHEET_LIMIT) {
            match document.render_page(index, PREVIEW_RENDER_SCALE) {
                Ok(image) => pages.push(PreviewPage::Rendered { index, image }),
                Err(e) => {
                    log::warn!("Failed to render preview sheet {}: {}", index + 1, e);
                    pages.push(PreviewPage::Failed {
                        index,
                        message: e.user_message(),
                    });
                }
            }
            cancel.checkpoint()?;
        }

        result = Some(PreviewResult {
            pages,
            total_sheets,
        });
        Ok(())
    })?;

    result.ok_or_else(|| NupError::Render {
        page: None,
        message: "rasterizer did not open the document".to_string(),
    })
}
