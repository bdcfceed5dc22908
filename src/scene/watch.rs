//! Throttled observation of a node's child list.
//!
//! A [`ChildWatch`] is the subscription handle a consumer of the tree (for
//! example a renderer re-traversing a subtree) holds for one node. Polling
//! it yields the latest child list once a change has been pending for the
//! fan-out dependent delay from [`SceneOptions::child_list_delay`]. Updates
//! are only ever delayed, never dropped: the delivered list is always the
//! newest state. Dropping the handle ends the subscription.

use web_time::Instant;

use super::SceneGraph;
use crate::options::SceneOptions;

/// Subscription to one node's child list.
#[derive(Debug, Clone)]
pub struct ChildWatch {
    name: String,
    delivered: Vec<String>,
    pending_since: Option<Instant>,
}

impl ChildWatch {
    /// Watch `name`, treating its current children as already delivered.
    #[must_use]
    pub fn new(scene: &SceneGraph, name: &str) -> Self {
        Self {
            name: name.to_owned(),
            delivered: scene.children(name).map(str::to_owned).collect(),
            pending_since: None,
        }
    }

    /// Watched node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Last delivered child list.
    #[must_use]
    pub fn children(&self) -> &[String] {
        &self.delivered
    }

    /// Whether a change is waiting for its delay to elapse.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Deliver the current child list if it changed and its delay elapsed.
    pub fn poll(
        &mut self,
        scene: &SceneGraph,
        options: &SceneOptions,
        now: Instant,
    ) -> Option<&[String]> {
        let current: Vec<&str> = scene.children(&self.name).collect();
        if current.iter().copied().eq(self.delivered.iter().map(String::as_str))
        {
            self.pending_since = None;
            return None;
        }
        let since = *self.pending_since.get_or_insert(now);
        if now.duration_since(since) < options.child_list_delay(current.len()) {
            return None;
        }
        self.delivered = current.into_iter().map(str::to_owned).collect();
        self.pending_since = None;
        Some(&self.delivered)
    }
}

#[cfg(test)]
mod tests {
    use web_time::Duration;

    use super::*;
    use crate::scene::{NodePayload, ROOT};

    fn add_many(scene: &mut SceneGraph, count: usize) {
        for i in 0..count {
            let _ = scene.add_node(&format!("/n{i}"), NodePayload::Group);
        }
    }

    #[test]
    fn small_fan_out_is_delivered_immediately() {
        let mut scene = SceneGraph::new();
        let mut watch = ChildWatch::new(&scene, ROOT);
        add_many(&mut scene, 3);
        let now = Instant::now();
        assert_eq!(watch.poll(&scene, &SceneOptions::default(), now).unwrap().len(), 3);
        assert!(watch.poll(&scene, &SceneOptions::default(), now).is_none());
    }

    #[test]
    fn large_fan_out_is_delayed_but_not_dropped() {
        let options = SceneOptions::default();
        let mut scene = SceneGraph::new();
        let mut watch = ChildWatch::new(&scene, ROOT);
        add_many(&mut scene, 40);
        let start = Instant::now();
        assert!(watch.poll(&scene, &options, start).is_none());
        assert!(watch.is_pending());

        // More children arrive while the first change is still pending.
        add_many(&mut scene, 60);
        let later = start + Duration::from_millis(20);
        assert!(watch.poll(&scene, &options, later).is_none());

        let due = start + Duration::from_millis(50);
        assert_eq!(watch.poll(&scene, &options, due).unwrap().len(), 60);
        assert_eq!(watch.children().len(), 60);
        assert!(!watch.is_pending());
    }

    #[test]
    fn reverting_a_change_clears_the_pending_delivery() {
        let options = SceneOptions::default();
        let mut scene = SceneGraph::new();
        add_many(&mut scene, 20);
        let mut watch = ChildWatch::new(&scene, ROOT);
        let _ = scene.add_node("/extra", NodePayload::Group);
        let now = Instant::now();
        assert!(watch.poll(&scene, &options, now).is_none());
        let _ = scene.remove_node("/extra");
        assert!(watch.poll(&scene, &options, now).is_none());
        assert!(!watch.is_pending());
    }
}
