//! [`SceneClient`]: the stores, the dispatcher and the connection, driven
//! one tick at a time.

mod accessors;
mod outbound;

use glam::Vec2;
use web_time::Instant;

use crate::camera::{CameraSync, TelemetryDue};
use crate::coords::{Ray, Viewport};
use crate::dispatch::{DispatchContext, MessageDispatcher};
use crate::error::ClientError;
use crate::gui::GuiStore;
use crate::input::PointerState;
use crate::options::ClientOptions;
use crate::protocol::Message;
use crate::scene::backend::SceneBackend;
use crate::scene::mirror::SceneMirror;
use crate::scene::SceneGraph;
use crate::transfer::{DirectorySink, DownloadSink, Downloads};
use crate::transport::{Transport, TransportEvent};
use crate::util::{KeyedThrottle, Throttle};

/// Rate limiters for every throttled outbound stream.
struct Throttles {
    camera: Throttle<Message>,
    clicks: Throttle<Message>,
    gui: KeyedThrottle<String, Message>,
    transforms: KeyedThrottle<String, Message>,
}

impl Throttles {
    fn new(options: &ClientOptions) -> Self {
        let interaction = &options.interaction;
        Self {
            camera: Throttle::new(interaction.camera_send_interval()),
            clicks: Throttle::new(interaction.click_send_interval()),
            gui: KeyedThrottle::new(interaction.gui_send_interval()),
            transforms: KeyedThrottle::new(interaction.transform_send_interval()),
        }
    }

    fn poll(&mut self, now: Instant, outbox: &mut Vec<Message>) {
        outbox.extend(self.camera.poll(now));
        outbox.extend(self.clicks.poll(now));
        outbox.extend(self.gui.poll(now));
        outbox.extend(self.transforms.poll(now));
    }

    fn clear(&mut self) {
        self.camera.clear();
        self.clicks.clear();
        self.gui.clear();
        self.transforms.clear();
    }
}

/// The scene-sync client: every store, the dispatcher, and the connection.
///
/// # Tick
///
/// Call [`tick`](Self::tick) once per rendered frame. A tick:
///
/// 1. drains connection events and queues delivered batches,
/// 2. runs the dispatcher (capture state machine, then message
///    application),
/// 3. reconciles the scene onto the backend, pose writes first, then runs
///    per-frame callbacks,
/// 4. builds due camera telemetry and releases throttled messages,
/// 5. sends everything queued for the server.
///
/// Local interactions (pointer events, GUI edits, gizmo drags) may be fed
/// in between ticks; they mutate the stores immediately and queue their
/// outbound messages for the next flush.
pub struct SceneClient<T, B: SceneBackend> {
    transport: T,
    backend: B,
    options: ClientOptions,

    scene: SceneGraph,
    mirror: SceneMirror<B::Handle>,
    gui: GuiStore,
    camera: CameraSync,
    pointer: PointerState,
    downloads: Downloads,
    sink: Box<dyn DownloadSink>,
    dispatcher: MessageDispatcher,

    throttles: Throttles,
    outbox: Vec<Message>,
    viewport: Viewport,
    connected: bool,
    /// A `closed` has been seen since the last `connected`.
    stale: bool,
}

impl<T: Transport, B: SceneBackend> SceneClient<T, B> {
    /// Client over `transport`, building renderables through `backend`.
    /// Downloads go to the configured download directory.
    ///
    /// # Errors
    ///
    /// [`ClientError::ThreadSpawn`] if the capture encoder cannot start.
    pub fn new(transport: T, backend: B, options: ClientOptions) -> Result<Self, ClientError> {
        let sink = Box::new(DirectorySink::new(options.transfer.download_dir.clone()));
        let throttles = Throttles::new(&options);
        let viewport = Viewport {
            width: 1280,
            height: 720,
        };
        let mut camera = CameraSync::default();
        camera.set_aspect(viewport.aspect());
        Ok(Self {
            transport,
            backend,
            options,
            scene: SceneGraph::new(),
            mirror: SceneMirror::new(),
            gui: GuiStore::new(),
            camera,
            pointer: PointerState::new(),
            downloads: Downloads::new(),
            sink,
            dispatcher: MessageDispatcher::new()?,
            throttles,
            outbox: Vec::new(),
            viewport,
            connected: false,
            stale: false,
        })
    }

    /// Replace the download destination.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn DownloadSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Connect, or reconnect, to `url`.
    ///
    /// # Errors
    ///
    /// [`ClientError::TransportClosed`] if the transport has shut down.
    pub fn connect(&mut self, url: &str) -> Result<(), ClientError> {
        self.transport.set_server(url)
    }

    /// Run one tick. See the type docs for the order of work.
    pub fn tick(&mut self) {
        self.drain_transport();

        let mut ctx = DispatchContext {
            scene: &mut self.scene,
            gui: &mut self.gui,
            camera: &mut self.camera,
            pointer: &mut self.pointer,
            downloads: &mut self.downloads,
            sink: self.sink.as_mut(),
            outbox: &mut self.outbox,
        };
        self.dispatcher.tick(&mut ctx, &mut self.backend);

        self.mirror.reconcile(&mut self.scene, &mut self.backend);
        self.mirror.run_frame_callbacks(&mut self.backend);

        let now = Instant::now();
        self.queue_camera_telemetry(now);
        self.throttles.poll(now, &mut self.outbox);
        self.flush();
    }

    /// Resize the drawing surface. The camera aspect follows.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Viewport {
            width: width.max(1),
            height: height.max(1),
        };
        self.camera.set_aspect(self.viewport.aspect());
    }

    /// Close the connection and dispose every renderable.
    pub fn shutdown(&mut self) {
        self.transport.shutdown();
        self.mirror.dispose_all(&mut self.backend);
    }

    fn drain_transport(&mut self) {
        while let Some(event) = self.transport.poll_event() {
            match event {
                TransportEvent::Connected => self.on_connected(),
                TransportEvent::Closed => self.on_closed(),
                TransportEvent::Batch(batch) => self.dispatcher.push_batch(batch),
            }
        }
    }

    fn on_connected(&mut self) {
        log::info!("server connection open");
        if self.stale {
            // The server replays its full state on every connection.
            self.dispatcher.reset();
            self.scene.reset();
            self.pointer.retain_live(&self.scene);
            self.downloads.clear();
            self.stale = false;
        }
        self.connected = true;
        self.gui.set_connected(true);
        self.camera.mark_changed();
    }

    fn on_closed(&mut self) {
        if self.connected {
            log::info!("server connection closed");
        }
        self.connected = false;
        self.stale = true;
        self.gui.reset();
        self.gui.set_connected(false);
        self.throttles.clear();
    }

    fn queue_camera_telemetry(&mut self, now: Instant) {
        let Some(due) = self.camera.take_due() else {
            return;
        };
        let message = Message::ViewerCamera(self.camera.telemetry(&self.scene.world_transform()));
        match due {
            TelemetryDue::Immediate => {
                self.outbox.push(self.throttles.camera.force(message, now));
            }
            TelemetryDue::Throttled => self.outbox.extend(self.throttles.camera.offer(message, now)),
        }
    }

    fn flush(&mut self) {
        if self.outbox.is_empty() {
            return;
        }
        if !self.connected {
            log::warn!("dropping {} outbound messages: not connected", self.outbox.len());
            self.outbox.clear();
            return;
        }
        for message in self.outbox.drain(..) {
            if let Err(e) = self.transport.send(&message) {
                log::warn!("send failed: {e}");
            }
        }
    }

    fn pixel_ray(&self, pixel: Vec2) -> Ray {
        self.camera.controls().camera.pick_ray(pixel, self.viewport)
    }
}

impl<T, B: SceneBackend> Drop for SceneClient<T, B> {
    fn drop(&mut self) {
        self.mirror.dispose_all(&mut self.backend);
    }
}
