//! Message dispatcher: drains inbound batches once per tick and applies
//! them to the stores.
//!
//! A [`GetRenderRequestMessage`] acts as a barrier. Messages up to and
//! including it are applied in one tick; everything after it waits until
//! the capture has been read back, encoded and answered, so the image
//! shows exactly the state the server had sent before asking.
//!
//! [`GetRenderRequestMessage`]: crate::protocol::transfer::GetRenderRequestMessage

mod apply;
/// Render capture state and the background encoder.
pub mod capture;

use std::collections::VecDeque;

use serde_bytes::ByteBuf;

pub use self::capture::{CaptureEncoder, CaptureState, CapturedFrame};
use crate::camera::{CameraControls, CameraSync, OrbitCamera};
use crate::error::ClientError;
use crate::gui::GuiStore;
use crate::input::PointerState;
use crate::protocol::transfer::GetRenderResponseMessage;
use crate::protocol::Message;
use crate::scene::backend::SceneBackend;
use crate::scene::SceneGraph;
use crate::transfer::{DownloadSink, Downloads};

/// Mutable view of every store a message can touch.
pub struct DispatchContext<'a, C = OrbitCamera> {
    /// Scene node table.
    pub scene: &'a mut SceneGraph,
    /// GUI components, notifications and chrome.
    pub gui: &'a mut GuiStore,
    /// Camera and telemetry bookkeeping.
    pub camera: &'a mut CameraSync<C>,
    /// Pointer gestures and scene pointer mode.
    pub pointer: &'a mut PointerState,
    /// Inbound transfers.
    pub downloads: &'a mut Downloads,
    /// Destination of completed downloads.
    pub sink: &'a mut dyn DownloadSink,
    /// Messages to send back to the server.
    pub outbox: &'a mut Vec<Message>,
}

/// FIFO of undelivered messages plus the render capture state machine.
pub struct MessageDispatcher {
    queue: VecDeque<Message>,
    capture: CaptureState,
    encoder: CaptureEncoder,
}

impl MessageDispatcher {
    /// Empty queue, capture ready.
    ///
    /// # Errors
    ///
    /// [`ClientError::ThreadSpawn`] if the encoder thread cannot start.
    pub fn new() -> Result<Self, ClientError> {
        Ok(Self {
            queue: VecDeque::new(),
            capture: CaptureState::Ready,
            encoder: CaptureEncoder::new().map_err(ClientError::ThreadSpawn)?,
        })
    }

    /// Append one delivered batch.
    pub fn push_batch(&mut self, batch: impl IntoIterator<Item = Message>) {
        self.queue.extend(batch);
    }

    /// Messages waiting to be applied.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Current capture phase.
    #[must_use]
    pub fn capture_state(&self) -> &CaptureState {
        &self.capture
    }

    /// Drop queued messages and abandon any capture in flight. Used when a
    /// fresh connection is about to replay the full state.
    pub fn reset(&mut self) {
        if !self.queue.is_empty() {
            log::debug!("dropping {} stale queued messages", self.queue.len());
        }
        self.queue.clear();
        if !self.capture.is_ready() {
            log::warn!("abandoning render capture in flight");
        }
        self.capture = CaptureState::Ready;
    }

    /// Run one tick: advance the capture state machine, then, if no
    /// capture is pending, apply queued messages up to and including the
    /// first render request.
    pub fn tick<B, C>(&mut self, ctx: &mut DispatchContext<'_, C>, backend: &mut B)
    where
        B: SceneBackend,
        C: CameraControls,
    {
        self.advance_capture(ctx.outbox, backend);
        if !self.capture.is_ready() {
            return;
        }

        let take = self
            .queue
            .iter()
            .position(Message::is_render_request)
            .map_or(self.queue.len(), |i| i + 1);
        let batch: Vec<Message> = self.queue.drain(..take).collect();
        for message in batch {
            match message {
                Message::GetRenderRequest(request) => {
                    log::debug!(
                        "render capture requested: {}x{} {:?}",
                        request.width,
                        request.height,
                        request.format
                    );
                    self.capture = CaptureState::Triggered(request);
                }
                other => apply::apply(other, ctx),
            }
        }
    }

    fn advance_capture<B: SceneBackend>(&mut self, outbox: &mut Vec<Message>, backend: &mut B) {
        self.capture = match std::mem::replace(&mut self.capture, CaptureState::Ready) {
            CaptureState::Ready => CaptureState::Ready,
            CaptureState::Triggered(request) => CaptureState::Pause(request),
            CaptureState::Pause(request) => match backend.read_frame() {
                Some(frame) => match self.encoder.submit(frame, request) {
                    Ok(job) => CaptureState::InProgress(job),
                    Err(e) => {
                        log::error!("render capture failed: {e}");
                        CaptureState::Ready
                    }
                },
                None => {
                    log::error!("render capture failed: backend has no frame to read back");
                    CaptureState::Ready
                }
            },
            CaptureState::InProgress(job) => match self.encoder.try_recv() {
                None => CaptureState::InProgress(job),
                Some((done, _)) if done != job => {
                    log::debug!("discarding result of abandoned capture {done}");
                    CaptureState::InProgress(job)
                }
                Some((_, Ok(payload))) => {
                    log::debug!("render capture done: {} bytes", payload.len());
                    outbox.push(Message::GetRenderResponse(GetRenderResponseMessage {
                        payload: ByteBuf::from(payload),
                    }));
                    CaptureState::Ready
                }
                Some((_, Err(e))) => {
                    log::error!("render capture failed: {e}");
                    CaptureState::Ready
                }
            },
        };
    }
}
