use web_time::Instant;

use super::SceneClient;
use crate::camera::CameraSync;
use crate::coords::Viewport;
use crate::dispatch::CaptureState;
use crate::gui::GuiStore;
use crate::input::PointerState;
use crate::options::ClientOptions;
use crate::scene::backend::SceneBackend;
use crate::scene::watch::ChildWatch;
use crate::scene::SceneGraph;
use crate::transport::Transport;

impl<T: Transport, B: SceneBackend> SceneClient<T, B> {
    // ── Stores ──

    /// The scene tree as the server last described it.
    #[must_use]
    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    /// Control-panel state.
    #[must_use]
    pub fn gui(&self) -> &GuiStore {
        &self.gui
    }

    /// Camera and its telemetry state.
    #[must_use]
    pub fn camera(&self) -> &CameraSync {
        &self.camera
    }

    /// Click tracking and scene pointer mode.
    #[must_use]
    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    // ── Backend ──

    /// The render backend.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable render backend, for frame capture and resize handling.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    // ── Session ──

    /// Options the client was built with.
    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Whether the server connection is currently open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Inbound messages queued but not yet applied.
    #[must_use]
    pub fn pending_messages(&self) -> usize {
        self.dispatcher.pending()
    }

    /// Where the render-capture state machine stands.
    #[must_use]
    pub fn capture_state(&self) -> &CaptureState {
        self.dispatcher.capture_state()
    }

    /// Current drawing surface size.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    // ── Child watches ──

    /// Start watching the children of `name`.
    #[must_use]
    pub fn watch_children(&self, name: &str) -> ChildWatch {
        ChildWatch::new(&self.scene, name)
    }

    /// The new child list of a watched node, once it has settled.
    pub fn poll_watch(&self, watch: &mut ChildWatch) -> Option<Vec<String>> {
        watch
            .poll(&self.scene, &self.options.scene, Instant::now())
            .map(<[String]>::to_vec)
    }
}
