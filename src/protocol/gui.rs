//! GUI, modal, theme, and notification message shapes.
//!
//! Field names mirror the wire schema one-to-one.
#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Collapsible folder containing other components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddFolderMessage {
    pub order: f64,
    pub id: String,
    pub label: String,
    pub container_id: String,
    pub expand_by_default: bool,
    pub visible: bool,
}

/// Rendered markdown block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddMarkdownMessage {
    pub order: f64,
    pub id: String,
    pub markdown: String,
    pub container_id: String,
    pub visible: bool,
}

/// Progress bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddProgressBarMessage {
    pub order: f64,
    pub id: String,
    pub value: f64,
    pub animated: bool,
    pub color: Option<String>,
    pub container_id: String,
    pub visible: bool,
}

/// Embedded plotly figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddPlotlyMessage {
    pub order: f64,
    pub id: String,
    pub plotly_json_str: String,
    pub aspect: f64,
    pub container_id: String,
    pub visible: bool,
}

/// Tab group; each tab owns one child container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddTabGroupMessage {
    pub order: f64,
    pub id: String,
    pub container_id: String,
    pub tab_labels: Vec<String>,
    pub tab_icons_html: Vec<Option<String>>,
    pub tab_container_ids: Vec<String>,
    pub visible: bool,
}

/// Push button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddButtonMessage {
    pub order: f64,
    pub id: String,
    pub label: String,
    pub container_id: String,
    pub hint: Option<String>,
    pub value: bool,
    pub visible: bool,
    pub disabled: bool,
    pub color: Option<String>,
    pub icon_html: Option<String>,
}

/// Button that starts a file upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddUploadButtonMessage {
    pub order: f64,
    pub id: String,
    pub label: String,
    pub container_id: String,
    pub hint: Option<String>,
    pub value: Value,
    pub visible: bool,
    pub disabled: bool,
    pub color: Option<String>,
    pub icon_html: Option<String>,
    pub mime_type: String,
}

/// Labelled tick on a slider track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliderMark {
    pub value: f64,
    pub label: Option<String>,
}

/// Single-value slider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddSliderMessage {
    pub order: f64,
    pub id: String,
    pub label: String,
    pub container_id: String,
    pub hint: Option<String>,
    pub value: f64,
    pub visible: bool,
    pub disabled: bool,
    pub min: f64,
    pub max: f64,
    pub step: Option<f64>,
    pub precision: u32,
    pub marks: Option<Vec<SliderMark>>,
}

/// Slider with several handles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddMultiSliderMessage {
    pub order: f64,
    pub id: String,
    pub label: String,
    pub container_id: String,
    pub hint: Option<String>,
    pub value: Value,
    pub visible: bool,
    pub disabled: bool,
    pub min: f64,
    pub max: f64,
    pub step: Option<f64>,
    pub min_range: Option<f64>,
    pub precision: u32,
    pub fixed_endpoints: bool,
    pub marks: Option<Vec<SliderMark>>,
}

/// Numeric input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddNumberMessage {
    pub order: f64,
    pub id: String,
    pub label: String,
    pub container_id: String,
    pub hint: Option<String>,
    pub value: f64,
    pub visible: bool,
    pub disabled: bool,
    pub precision: u32,
    pub step: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// RGB color picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddRgbMessage {
    pub order: f64,
    pub id: String,
    pub label: String,
    pub container_id: String,
    pub hint: Option<String>,
    pub value: [u8; 3],
    pub visible: bool,
    pub disabled: bool,
}

/// RGBA color picker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddRgbaMessage {
    pub order: f64,
    pub id: String,
    pub label: String,
    pub container_id: String,
    pub hint: Option<String>,
    pub value: [u8; 4],
    pub visible: bool,
    pub disabled: bool,
}

/// Checkbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddCheckboxMessage {
    pub order: f64,
    pub id: String,
    pub label: String,
    pub container_id: String,
    pub hint: Option<String>,
    pub value: bool,
    pub visible: bool,
    pub disabled: bool,
}

/// Two-component numeric input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddVector2Message {
    pub order: f64,
    pub id: String,
    pub label: String,
    pub container_id: String,
    pub hint: Option<String>,
    pub value: [f64; 2],
    pub visible: bool,
    pub disabled: bool,
    pub min: Option<[f64; 2]>,
    pub max: Option<[f64; 2]>,
    pub step: f64,
    pub precision: u32,
}

/// Three-component numeric input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddVector3Message {
    pub order: f64,
    pub id: String,
    pub label: String,
    pub container_id: String,
    pub hint: Option<String>,
    pub value: [f64; 3],
    pub visible: bool,
    pub disabled: bool,
    pub min: Option<[f64; 3]>,
    pub max: Option<[f64; 3]>,
    pub step: f64,
    pub precision: u32,
}

/// Single-line text input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddTextMessage {
    pub order: f64,
    pub id: String,
    pub label: String,
    pub container_id: String,
    pub hint: Option<String>,
    pub value: String,
    pub visible: bool,
    pub disabled: bool,
}

/// Dropdown selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddDropdownMessage {
    pub order: f64,
    pub id: String,
    pub label: String,
    pub container_id: String,
    pub hint: Option<String>,
    pub value: String,
    pub visible: bool,
    pub disabled: bool,
    pub options: Vec<String>,
}

/// Row of mutually exclusive buttons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiAddButtonGroupMessage {
    pub order: f64,
    pub id: String,
    pub label: String,
    pub container_id: String,
    pub hint: Option<String>,
    pub value: String,
    pub visible: bool,
    pub disabled: bool,
    pub options: Vec<String>,
}

/// Open a modal; its id doubles as its container id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiModalMessage {
    pub order: f64,
    pub id: String,
    pub title: String,
}

/// Close a modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuiCloseModalMessage {
    pub id: String,
}

/// Remove a GUI component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuiRemoveMessage {
    pub id: String,
}

/// Partial prop update for a GUI component, in either direction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuiUpdateMessage {
    pub id: String,
    pub updates: Map<String, Value>,
}

/// Titlebar link button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeButton {
    pub text: Option<String>,
    pub icon: Option<String>,
    pub href: Option<String>,
}

/// Titlebar logo image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeImage {
    pub image_url_light: String,
    pub image_url_dark: Option<String>,
    pub image_alt: String,
    pub href: Option<String>,
}

/// Titlebar contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitlebarContent {
    pub buttons: Option<Vec<ThemeButton>>,
    pub image: Option<ThemeImage>,
}

/// Panel layout and palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfigurationMessage {
    pub titlebar_content: Option<TitlebarContent>,
    pub control_layout: String,
    pub control_width: String,
    pub show_logo: bool,
    pub show_share_button: bool,
    pub dark_mode: bool,
    pub colors: Option<Vec<String>>,
}

/// Title of the control panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetGuiPanelLabelMessage {
    pub label: Option<String>,
}

/// Whether a notification message creates or amends an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationMode {
    Show,
    Update,
}

/// `number | false` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AutoClose {
    /// Close after this many milliseconds.
    After(f64),
    /// `false`: stay open.
    Never(bool),
}

/// Show or update a toast notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub mode: NotificationMode,
    pub id: String,
    pub title: String,
    pub body: String,
    pub loading: bool,
    pub with_close_button: bool,
    pub auto_close: AutoClose,
    pub color: Option<String>,
}

/// Dismiss a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveNotificationMessage {
    pub id: String,
}

/// Share link changed (or was revoked).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareUrlUpdated {
    pub share_url: Option<String>,
}

/// Script to evaluate in a browser client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunJavascriptMessage {
    pub source: String,
}
