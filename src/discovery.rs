//! Finds hue/brightness widget groups in a document and attaches one
//! [`GroupSynchronizer`] per group.
//!
//! A group is anchored on its hue slider: an `input.hue-slider` whose
//! `data-color-input` attribute names the id of the color control. The
//! brightness slider is the `input.brightness-slider` carrying the same
//! attribute value. Groups are recorded by key, so scanning the same part of
//! the document any number of times wires each group once. A group whose
//! elements were removed and rendered again under the same key is wired anew.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::constants;
use crate::document::{Document, NodeId};
use crate::selector::Selector;
use crate::sync::{GroupElements, GroupSynchronizer};

/// Selector for hue sliders that name a color control.
pub fn hue_slider_selector() -> Selector {
    Selector::tag(constants::INPUT_TAG)
        .class(constants::HUE_SLIDER_CLASS)
        .has_attr(constants::COLOR_INPUT_ATTR)
}

/// Selector for the brightness slider bound to the color control `key`.
pub fn brightness_slider_selector(key: &str) -> Selector {
    Selector::tag(constants::INPUT_TAG)
        .class(constants::BRIGHTNESS_SLIDER_CLASS)
        .attr_eq(constants::COLOR_INPUT_ATTR, key)
}

/// A recorded group is stale once its elements left the document or the key
/// now names a different color control.
fn is_stale(doc: &Document, existing: &GroupSynchronizer, color: NodeId) -> bool {
    let elements = existing.elements();
    elements.color != color
        || !doc.is_connected(elements.color)
        || !doc.is_connected(elements.hue)
}

#[derive(Default)]
struct Registry {
    groups: HashMap<String, GroupSynchronizer>,
}

/// Attaches synchronizers to every group in a document, now and as new
/// elements are inserted.
#[derive(Clone, Default)]
pub struct Discovery {
    registry: Rc<RefCell<Registry>>,
}

impl std::fmt::Debug for Discovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registry = self.registry.borrow();
        let mut keys: Vec<&String> = registry.groups.keys().collect();
        keys.sort();
        f.debug_struct("Discovery").field("groups", &keys).finish()
    }
}

impl Discovery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan the whole document, then follow every later insertion.
    pub fn start(doc: &Document) -> Self {
        let discovery = Self::new();
        discovery.scan(doc, doc.body());

        let observer = discovery.clone();
        doc.observe_insertions(move |doc, inserted| {
            for &root in inserted {
                observer.scan(doc, root);
            }
        });
        discovery
    }

    /// Scan the whole document again.
    pub fn rescan(&self, doc: &Document) -> usize {
        self.scan(doc, doc.body())
    }

    /// Attach every complete, not yet attached group anchored in `root`'s
    /// subtree (`root` included). Returns how many were attached.
    pub fn scan(&self, doc: &Document, root: NodeId) -> usize {
        let selector = hue_slider_selector();
        let mut candidates = Vec::new();
        if doc.matches(root, &selector) {
            candidates.push(root);
        }
        candidates.extend(doc.query_selector_all(root, &selector));

        candidates
            .into_iter()
            .filter(|&hue| self.attach_candidate(doc, hue).is_some())
            .count()
    }

    /// Resolve and attach the group anchored on `hue`. Returns `None` when the
    /// group is incomplete or already attached to these elements.
    fn attach_candidate(&self, doc: &Document, hue: NodeId) -> Option<GroupSynchronizer> {
        let key = doc
            .attribute(hue, constants::COLOR_INPUT_ATTR)
            .filter(|k| !k.is_empty())?;
        let Some(color) = doc.get_element_by_id(&key) else {
            trace!(group = %key, "color control not found");
            return None;
        };
        if let Some(existing) = self.group(&key) {
            if !is_stale(doc, &existing, color) {
                trace!(group = %key, "already attached");
                return None;
            }
            debug!(group = %key, "group elements replaced, attaching again");
        }
        let brightness_selector = brightness_slider_selector(&key);
        let Some(brightness) = doc.query_selector(&brightness_selector) else {
            trace!(group = %key, selector = %brightness_selector, "brightness slider not found");
            return None;
        };

        // Attaching runs the initial sync, which may dispatch into listeners
        // that scan again; hold no registry borrow across it.
        let sync = GroupSynchronizer::attach(
            doc,
            key.clone(),
            GroupElements {
                color,
                hue,
                brightness,
            },
        );
        self.registry
            .borrow_mut()
            .groups
            .insert(key.clone(), sync.clone());
        debug!(group = %key, "discovered widget group");
        Some(sync)
    }

    /// The synchronizer attached for `key`, if any.
    pub fn group(&self, key: &str) -> Option<GroupSynchronizer> {
        self.registry.borrow().groups.get(key).cloned()
    }

    /// Keys of all attached groups, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.registry.borrow().groups.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.registry.borrow().groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.borrow().groups.is_empty()
    }
}
