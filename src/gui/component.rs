//! Typed GUI components and partial prop merging.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ClientError;
use crate::protocol::gui::{
    GuiAddButtonGroupMessage, GuiAddButtonMessage, GuiAddCheckboxMessage,
    GuiAddDropdownMessage, GuiAddFolderMessage, GuiAddMarkdownMessage,
    GuiAddMultiSliderMessage, GuiAddNumberMessage, GuiAddPlotlyMessage,
    GuiAddProgressBarMessage, GuiAddRgbMessage, GuiAddRgbaMessage,
    GuiAddSliderMessage, GuiAddTabGroupMessage, GuiAddTextMessage,
    GuiAddUploadButtonMessage, GuiAddVector2Message, GuiAddVector3Message,
};

/// One GUI component with its current props.
#[derive(Debug, Clone, PartialEq)]
pub enum GuiComponent {
    // ── Layout ──
    /// Folder.
    Folder(GuiAddFolderMessage),
    /// Tab group.
    TabGroup(GuiAddTabGroupMessage),
    // ── Display ──
    /// Markdown block.
    Markdown(GuiAddMarkdownMessage),
    /// Progress bar.
    ProgressBar(GuiAddProgressBarMessage),
    /// Plotly figure.
    Plotly(GuiAddPlotlyMessage),
    // ── Inputs ──
    /// Button.
    Button(GuiAddButtonMessage),
    /// Upload button.
    UploadButton(GuiAddUploadButtonMessage),
    /// Slider.
    Slider(GuiAddSliderMessage),
    /// Multi-handle slider.
    MultiSlider(GuiAddMultiSliderMessage),
    /// Number input.
    Number(GuiAddNumberMessage),
    /// RGB picker.
    Rgb(GuiAddRgbMessage),
    /// RGBA picker.
    Rgba(GuiAddRgbaMessage),
    /// Checkbox.
    Checkbox(GuiAddCheckboxMessage),
    /// 2-vector input.
    Vector2(GuiAddVector2Message),
    /// 3-vector input.
    Vector3(GuiAddVector3Message),
    /// Text input.
    Text(GuiAddTextMessage),
    /// Dropdown.
    Dropdown(GuiAddDropdownMessage),
    /// Button group.
    ButtonGroup(GuiAddButtonGroupMessage),
}

/// Expand `$body` once per variant with `$c` bound to the inner message.
macro_rules! each_component {
    ($value:expr, $c:ident => $body:expr) => {
        match $value {
            GuiComponent::Folder($c) => $body,
            GuiComponent::TabGroup($c) => $body,
            GuiComponent::Markdown($c) => $body,
            GuiComponent::ProgressBar($c) => $body,
            GuiComponent::Plotly($c) => $body,
            GuiComponent::Button($c) => $body,
            GuiComponent::UploadButton($c) => $body,
            GuiComponent::Slider($c) => $body,
            GuiComponent::MultiSlider($c) => $body,
            GuiComponent::Number($c) => $body,
            GuiComponent::Rgb($c) => $body,
            GuiComponent::Rgba($c) => $body,
            GuiComponent::Checkbox($c) => $body,
            GuiComponent::Vector2($c) => $body,
            GuiComponent::Vector3($c) => $body,
            GuiComponent::Text($c) => $body,
            GuiComponent::Dropdown($c) => $body,
            GuiComponent::ButtonGroup($c) => $body,
        }
    };
}

impl GuiComponent {
    /// Component id.
    #[must_use]
    pub fn id(&self) -> &str {
        each_component!(self, c => &c.id)
    }

    /// Id of the container this component sits in.
    #[must_use]
    pub fn container_id(&self) -> &str {
        each_component!(self, c => &c.container_id)
    }

    /// Sort key within the container.
    #[must_use]
    pub fn order(&self) -> f64 {
        each_component!(self, c => c.order)
    }

    /// Whether the component is shown.
    #[must_use]
    pub fn visible(&self) -> bool {
        each_component!(self, c => c.visible)
    }

    /// Container ids owned by this component: a folder owns its own id, a
    /// tab group owns one container per tab.
    #[must_use]
    pub fn owned_containers(&self) -> Vec<&str> {
        match self {
            Self::Folder(folder) => vec![folder.id.as_str()],
            Self::TabGroup(tabs) => {
                tabs.tab_container_ids.iter().map(String::as_str).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Current value of an input component, as JSON.
    #[must_use]
    pub fn value(&self) -> Option<Value> {
        let value = match self {
            Self::Folder(_)
            | Self::TabGroup(_)
            | Self::Markdown(_)
            | Self::Plotly(_) => return None,
            Self::ProgressBar(c) => serde_json::to_value(c.value),
            Self::Button(c) => serde_json::to_value(c.value),
            Self::UploadButton(c) => Ok(c.value.clone()),
            Self::Slider(c) => serde_json::to_value(c.value),
            Self::MultiSlider(c) => Ok(c.value.clone()),
            Self::Number(c) => serde_json::to_value(c.value),
            Self::Rgb(c) => serde_json::to_value(c.value),
            Self::Rgba(c) => serde_json::to_value(c.value),
            Self::Checkbox(c) => serde_json::to_value(c.value),
            Self::Vector2(c) => serde_json::to_value(c.value),
            Self::Vector3(c) => serde_json::to_value(c.value),
            Self::Text(c) => serde_json::to_value(&c.value),
            Self::Dropdown(c) => serde_json::to_value(&c.value),
            Self::ButtonGroup(c) => serde_json::to_value(&c.value),
        };
        value.ok()
    }

    /// Merge partial props into the component. Keys the component does not
    /// have are ignored. The component is left unchanged if the merged props
    /// do not fit its shape.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::GuiUpdate`] when a value has the wrong type.
    pub fn apply_updates(
        &mut self,
        updates: &Map<String, Value>,
    ) -> Result<(), ClientError> {
        each_component!(self, c => merge_props(c, updates))
    }
}

fn merge_props<T>(target: &mut T, updates: &Map<String, Value>) -> Result<(), ClientError>
where
    T: Serialize + DeserializeOwned,
{
    let mut props = serde_json::to_value(&*target)?;
    if let Value::Object(fields) = &mut props {
        for (key, value) in updates {
            if key != "id" {
                drop(fields.insert(key.clone(), value.clone()));
            }
        }
    }
    *target = serde_json::from_value(props)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn slider() -> GuiComponent {
        GuiComponent::Slider(GuiAddSliderMessage {
            order: 1.0,
            id: "s".to_owned(),
            label: "Size".to_owned(),
            container_id: "root".to_owned(),
            hint: None,
            value: 0.5,
            visible: true,
            disabled: false,
            min: 0.0,
            max: 1.0,
            step: Some(0.1),
            precision: 1,
            marks: None,
        })
    }

    fn updates(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn partial_update_merges_known_props() {
        let mut component = slider();
        component
            .apply_updates(&updates(json!({"value": 0.8, "label": "Radius", "bogus": 1})))
            .unwrap();
        assert_eq!(component.value(), Some(json!(0.8)));
        let GuiComponent::Slider(inner) = &component else {
            unreachable!()
        };
        assert_eq!(inner.label, "Radius");
        assert_eq!(inner.max, 1.0);
    }

    #[test]
    fn ill_typed_update_leaves_component_unchanged() {
        let mut component = slider();
        let before = component.clone();
        assert!(component
            .apply_updates(&updates(json!({"value": "not a number"})))
            .is_err());
        assert_eq!(component, before);
    }

    #[test]
    fn id_is_not_updatable() {
        let mut component = slider();
        component.apply_updates(&updates(json!({"id": "other"}))).unwrap();
        assert_eq!(component.id(), "s");
    }

    #[test]
    fn layout_components_own_containers() {
        let tabs = GuiComponent::TabGroup(GuiAddTabGroupMessage {
            order: 0.0,
            id: "tabs".to_owned(),
            container_id: "root".to_owned(),
            tab_labels: vec!["a".to_owned(), "b".to_owned()],
            tab_icons_html: vec![None, None],
            tab_container_ids: vec!["ta".to_owned(), "tb".to_owned()],
            visible: true,
        });
        assert_eq!(tabs.owned_containers(), vec!["ta", "tb"]);
        assert!(tabs.value().is_none());
        assert!(slider().owned_containers().is_empty());
    }
}
