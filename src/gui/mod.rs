//! GUI state store: components, modals, theme, panel label, notifications,
//! uploads in progress, and the share URL.
//!
//! The store is mutated only from the main context, by the dispatcher and
//! by local value changes. Components are kept in insertion order; each
//! container lists its children by `order`, ties broken by insertion.

/// Typed components and prop merging.
pub mod component;
/// Toast notifications.
pub mod notification;

pub use component::GuiComponent;
use indexmap::IndexMap;
pub use notification::Notification;
use rustc_hash::FxHashMap;
use serde_json::{Map, Value};

use crate::error::ClientError;
use crate::protocol::gui::{
    GuiModalMessage, GuiUpdateMessage, NotificationMessage, NotificationMode,
    ThemeConfigurationMessage,
};

/// Progress of one upload, keyed by the upload button that started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    /// Bytes the server has acknowledged.
    pub uploaded_bytes: u64,
    /// Total bytes to send.
    pub total_bytes: u64,
    /// Name of the file being sent.
    pub filename: String,
    /// Transfer id.
    pub transfer_uuid: String,
}

/// Everything the control panel shows.
#[derive(Debug, Default)]
pub struct GuiStore {
    components: IndexMap<String, GuiComponent>,
    modals: Vec<GuiModalMessage>,
    theme: Option<ThemeConfigurationMessage>,
    label: Option<String>,
    share_url: Option<String>,
    notifications: IndexMap<String, Notification>,
    uploads: FxHashMap<String, UploadProgress>,
    connected: bool,
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

impl GuiStore {
    /// An empty, disconnected store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component. Adding an id that already exists replaces its
    /// props in place.
    pub fn add_component(&mut self, component: GuiComponent) {
        let id = component.id().to_owned();
        log::debug!("gui add {id:?}");
        drop(self.components.insert(id, component));
    }

    /// Look up a component.
    #[must_use]
    pub fn component(&self, id: &str) -> Option<&GuiComponent> {
        self.components.get(id)
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether there are no components.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Children of a container, by `order` then insertion.
    #[must_use]
    pub fn children_of(&self, container_id: &str) -> Vec<&GuiComponent> {
        let mut children: Vec<&GuiComponent> = self
            .components
            .values()
            .filter(|c| c.container_id() == container_id)
            .collect();
        children.sort_by(|a, b| a.order().total_cmp(&b.order()));
        children
    }

    /// Merge a partial prop update. Unknown ids are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::GuiUpdate`] when the props do not fit the
    /// component; the component is left unchanged.
    pub fn update_component(
        &mut self,
        id: &str,
        updates: &Map<String, Value>,
    ) -> Result<bool, ClientError> {
        let Some(component) = self.components.get_mut(id) else {
            log::debug!("gui update for unknown component {id:?}");
            return Ok(false);
        };
        component.apply_updates(updates)?;
        Ok(true)
    }

    /// Change a component's value locally and build the message that
    /// reports it to the server. `None` for unknown ids.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::GuiUpdate`] when the value has the wrong type.
    pub fn set_value(
        &mut self,
        id: &str,
        value: Value,
    ) -> Result<Option<GuiUpdateMessage>, ClientError> {
        let mut updates = Map::new();
        drop(updates.insert("value".to_owned(), value));
        if !self.update_component(id, &updates)? {
            return Ok(None);
        }
        Ok(Some(GuiUpdateMessage {
            id: id.to_owned(),
            updates,
        }))
    }

    /// Remove a component and everything inside the containers it owns.
    pub fn remove_component(&mut self, id: &str) {
        let Some(component) = self.components.shift_remove(id) else {
            log::debug!("gui remove of unknown component {id:?}");
            return;
        };
        let owned: Vec<String> =
            component.owned_containers().into_iter().map(str::to_owned).collect();
        for container in owned {
            self.clear_container(&container);
        }
        drop(self.uploads.remove(id));
    }

    fn clear_container(&mut self, container_id: &str) {
        let inside: Vec<String> = self
            .components
            .values()
            .filter(|c| c.container_id() == container_id)
            .map(|c| c.id().to_owned())
            .collect();
        for id in inside {
            self.remove_component(&id);
        }
    }

    // -- Modals --

    /// Open a modal.
    pub fn open_modal(&mut self, modal: GuiModalMessage) {
        self.modals.retain(|m| m.id != modal.id);
        self.modals.push(modal);
    }

    /// Close a modal and drop the components inside it.
    pub fn close_modal(&mut self, id: &str) {
        self.modals.retain(|m| m.id != id);
        self.clear_container(id);
    }

    /// Open modals, oldest first.
    #[must_use]
    pub fn modals(&self) -> &[GuiModalMessage] {
        &self.modals
    }
}

// ---------------------------------------------------------------------------
// Panel chrome, notifications, uploads, connection
// ---------------------------------------------------------------------------

impl GuiStore {
    /// Replace the theme.
    pub fn set_theme(&mut self, theme: ThemeConfigurationMessage) {
        self.theme = Some(theme);
    }

    /// Current theme, if the server sent one.
    #[must_use]
    pub fn theme(&self) -> Option<&ThemeConfigurationMessage> {
        self.theme.as_ref()
    }

    /// Set or clear the panel label.
    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    /// Panel label.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Set or clear the share URL.
    pub fn set_share_url(&mut self, url: Option<String>) {
        self.share_url = url;
    }

    /// Share URL, if sharing is active.
    #[must_use]
    pub fn share_url(&self) -> Option<&str> {
        self.share_url.as_deref()
    }

    /// Apply a show/update notification message. Updates of unknown ids
    /// are ignored.
    pub fn apply_notification(&mut self, msg: NotificationMessage) {
        match msg.mode {
            NotificationMode::Show => self.upsert_notification(msg.into()),
            NotificationMode::Update => {
                let Some(existing) = self.notifications.get_mut(&msg.id) else {
                    log::debug!("update of unknown notification {:?}", msg.id);
                    return;
                };
                let progress = existing.progress;
                *existing = Notification {
                    progress,
                    ..msg.into()
                };
            }
        }
    }

    /// Insert or replace a notification.
    pub fn upsert_notification(&mut self, notification: Notification) {
        drop(self.notifications.insert(notification.id.clone(), notification));
    }

    /// Dismiss a notification.
    pub fn remove_notification(&mut self, id: &str) {
        drop(self.notifications.shift_remove(id));
    }

    /// Look up a notification.
    #[must_use]
    pub fn notification(&self, id: &str) -> Option<&Notification> {
        self.notifications.get(id)
    }

    /// Notifications in the order they were first shown.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.notifications.values()
    }

    /// Start tracking an upload from a component.
    pub fn start_upload(&mut self, component_id: &str, progress: UploadProgress) {
        self.upsert_notification(Notification::for_upload(&progress));
        drop(self.uploads.insert(component_id.to_owned(), progress));
    }

    /// Record a server acknowledgement. Tracking ends once everything is
    /// acknowledged.
    pub fn record_upload_ack(&mut self, component_id: &str, transferred: u64, total: u64) {
        let Some(upload) = self.uploads.get_mut(component_id) else {
            log::debug!("ack for untracked upload from {component_id:?}");
            return;
        };
        upload.uploaded_bytes = transferred;
        upload.total_bytes = total;
        let toast = Notification::for_upload(upload);
        drop(self.notifications.insert(toast.id.clone(), toast));
        if transferred >= total {
            log::debug!("upload of {:?} complete", upload.filename);
            drop(self.uploads.remove(component_id));
        }
    }

    /// Upload in progress from a component.
    #[must_use]
    pub fn upload(&self, component_id: &str) -> Option<&UploadProgress> {
        self.uploads.get(component_id)
    }

    /// Whether the socket is open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Record the socket state.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Drop every component, modal, upload and the share URL. The theme,
    /// panel label and notifications are kept.
    pub fn reset(&mut self) {
        self.components.clear();
        self.modals.clear();
        self.uploads.clear();
        self.share_url = None;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::protocol::gui::{
        AutoClose, GuiAddCheckboxMessage, GuiAddFolderMessage,
    };

    fn folder(id: &str, container: &str, order: f64) -> GuiComponent {
        GuiComponent::Folder(GuiAddFolderMessage {
            order,
            id: id.to_owned(),
            label: id.to_owned(),
            container_id: container.to_owned(),
            expand_by_default: true,
            visible: true,
        })
    }

    fn checkbox(id: &str, container: &str, order: f64) -> GuiComponent {
        GuiComponent::Checkbox(GuiAddCheckboxMessage {
            order,
            id: id.to_owned(),
            label: id.to_owned(),
            container_id: container.to_owned(),
            hint: None,
            value: false,
            visible: true,
            disabled: false,
        })
    }

    fn notification(mode: NotificationMode, title: &str) -> NotificationMessage {
        NotificationMessage {
            mode,
            id: "n".to_owned(),
            title: title.to_owned(),
            body: String::new(),
            loading: false,
            with_close_button: true,
            auto_close: AutoClose::Never(false),
            color: None,
        }
    }

    #[test]
    fn children_sort_by_order_then_insertion() {
        let mut gui = GuiStore::new();
        gui.add_component(checkbox("b", "root", 2.0));
        gui.add_component(checkbox("a", "root", 1.0));
        gui.add_component(checkbox("c", "root", 2.0));
        gui.add_component(checkbox("x", "elsewhere", 0.0));
        let ids: Vec<&str> = gui.children_of("root").iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn re_adding_an_id_replaces_in_place() {
        let mut gui = GuiStore::new();
        gui.add_component(checkbox("a", "root", 1.0));
        gui.add_component(checkbox("b", "root", 1.0));
        gui.add_component(checkbox("a", "root", 1.0));
        assert_eq!(gui.len(), 2);
        let ids: Vec<&str> = gui.children_of("root").iter().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn remove_is_recursive_over_owned_containers() {
        let mut gui = GuiStore::new();
        gui.add_component(folder("outer", "root", 0.0));
        gui.add_component(folder("inner", "outer", 0.0));
        gui.add_component(checkbox("deep", "inner", 0.0));
        gui.add_component(checkbox("keep", "root", 1.0));
        gui.remove_component("outer");
        assert_eq!(gui.len(), 1);
        assert!(gui.component("keep").is_some());
    }

    #[test]
    fn local_value_change_builds_update_message() {
        let mut gui = GuiStore::new();
        gui.add_component(checkbox("c", "root", 0.0));
        let msg = gui.set_value("c", json!(true)).unwrap().unwrap();
        assert_eq!(msg.id, "c");
        assert_eq!(msg.updates.get("value"), Some(&json!(true)));
        assert_eq!(gui.component("c").unwrap().value(), Some(json!(true)));
        assert!(gui.set_value("missing", json!(true)).unwrap().is_none());
        assert!(gui.set_value("c", json!("yes")).is_err());
    }

    #[test]
    fn reset_keeps_theme_and_label() {
        let mut gui = GuiStore::new();
        gui.add_component(checkbox("c", "root", 0.0));
        gui.set_label(Some("Panel".to_owned()));
        gui.set_share_url(Some("https://share".to_owned()));
        gui.open_modal(GuiModalMessage {
            order: 0.0,
            id: "m".to_owned(),
            title: "Hi".to_owned(),
        });
        gui.reset();
        assert!(gui.is_empty());
        assert!(gui.modals().is_empty());
        assert!(gui.share_url().is_none());
        assert_eq!(gui.label(), Some("Panel"));
    }

    #[test]
    fn closing_a_modal_drops_its_contents() {
        let mut gui = GuiStore::new();
        gui.open_modal(GuiModalMessage {
            order: 0.0,
            id: "m".to_owned(),
            title: "Confirm".to_owned(),
        });
        gui.add_component(checkbox("ok", "m", 0.0));
        gui.close_modal("m");
        assert!(gui.modals().is_empty());
        assert!(gui.is_empty());
    }

    #[test]
    fn notification_update_requires_existing_entry() {
        let mut gui = GuiStore::new();
        gui.apply_notification(notification(NotificationMode::Update, "late"));
        assert!(gui.notification("n").is_none());
        gui.apply_notification(notification(NotificationMode::Show, "first"));
        gui.apply_notification(notification(NotificationMode::Update, "second"));
        assert_eq!(gui.notification("n").unwrap().title, "second");
        gui.remove_notification("n");
        assert_eq!(gui.notifications().count(), 0);
    }

    #[test]
    fn upload_tracking_ends_at_total() {
        let mut gui = GuiStore::new();
        gui.start_upload(
            "up",
            UploadProgress {
                uploaded_bytes: 0,
                total_bytes: 10,
                filename: "a.bin".to_owned(),
                transfer_uuid: "t".to_owned(),
            },
        );
        gui.record_upload_ack("up", 4, 10);
        assert_eq!(gui.upload("up").unwrap().uploaded_bytes, 4);
        let toast = gui.notification("upload-t").unwrap();
        assert_eq!(toast.title, "Uploading a.bin (10.0B)");
        assert_eq!(toast.progress, Some(40.0));
        gui.record_upload_ack("up", 10, 10);
        assert!(gui.upload("up").is_none());
        assert!(!gui.notification("upload-t").unwrap().loading);
    }
}
