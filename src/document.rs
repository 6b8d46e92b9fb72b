//! In-memory UI tree the synchronizers operate on.
//!
//! A [`Document`] is a cheap, clonable handle to a tree of elements. Each
//! element has a tag, attributes (`id` and `class` included), a reactive
//! `value`, a style property map, and event listeners. Two queues model the
//! host's asynchrony and are drained by [`Document::run_pending`]:
//!
//! - insertion records: every element appended under a connected parent is
//!   reported, in batches, to the observers registered with
//!   [`Document::observe_insertions`];
//! - frame callbacks: one-shot closures registered with
//!   [`Document::request_frame`], run after the insertion batch.
//!
//! No `RefCell` borrow is held while user callbacks run, so listeners,
//! observers and frame callbacks may read and write the document freely.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use floem::reactive::{RwSignal, SignalGet, SignalUpdate};
use tracing::trace;

use crate::selector::Selector;

/// Handle to one element of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Notifications an element can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The value is being edited (every keystroke or drag step).
    Input,
    /// The edit was committed.
    Change,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Input => f.write_str("input"),
            EventKind::Change => f.write_str("change"),
        }
    }
}

/// A dispatched notification. Bubbles from `target` up to the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub kind: EventKind,
    pub target: NodeId,
}

type Listener = Rc<dyn Fn(&Document, &Event)>;
type InsertionObserver = Rc<dyn Fn(&Document, &[NodeId])>;
type FrameCallback = Box<dyn FnOnce(&Document)>;

/// Description of an element to create.
#[derive(Debug, Clone, Default)]
pub struct ElementSpec {
    tag: String,
    attributes: BTreeMap<String, String>,
    value: String,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Add a class to the element's `class` attribute.
    pub fn class(mut self, class: impl AsRef<str>) -> Self {
        let entry = self.attributes.entry("class".to_string()).or_default();
        if !entry.is_empty() {
            entry.push(' ');
        }
        entry.push_str(class.as_ref());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }
}

struct Node {
    tag: String,
    attributes: BTreeMap<String, String>,
    value: RwSignal<String>,
    style: BTreeMap<String, String>,
    listeners: Vec<(EventKind, Listener)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn classes(&self) -> impl Iterator<Item = &str> + Clone {
        self.attributes
            .get("class")
            .map(String::as_str)
            .unwrap_or("")
            .split_whitespace()
    }

    fn matches(&self, selector: &Selector) -> bool {
        selector.matches(&self.tag, self.classes(), |name| {
            self.attributes.get(name).map(String::as_str)
        })
    }
}

struct Tree {
    nodes: Vec<Node>,
    root: NodeId,
    pending_insertions: Vec<NodeId>,
    frames: Vec<FrameCallback>,
    observers: Vec<InsertionObserver>,
}

impl Tree {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == self.root {
                return true;
            }
            current = self.node(node_id).and_then(|n| n.parent);
        }
        false
    }

    fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == ancestor {
                return true;
            }
            current = self.node(node_id).and_then(|n| n.parent);
        }
        false
    }

    /// `start` and its descendants, in document order.
    fn subtree(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if let Some(node) = self.node(id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }
}

/// Shared handle to an element tree.
#[derive(Clone)]
pub struct Document {
    tree: Rc<RefCell<Tree>>,
}

/// Non-owning handle to a [`Document`].
#[derive(Clone)]
pub struct WeakDocument {
    tree: Weak<RefCell<Tree>>,
}

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.tree.upgrade().map(|tree| Document { tree })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tree = self.tree.borrow();
        f.debug_struct("Document")
            .field("nodes", &tree.nodes.len())
            .field("pending_insertions", &tree.pending_insertions.len())
            .field("frames", &tree.frames.len())
            .finish()
    }
}

impl Document {
    /// Create an empty document with a `body` root.
    pub fn new() -> Self {
        let root = Node {
            tag: "body".to_string(),
            attributes: BTreeMap::new(),
            value: RwSignal::new(String::new()),
            style: BTreeMap::new(),
            listeners: Vec::new(),
            parent: None,
            children: Vec::new(),
        };
        Self {
            tree: Rc::new(RefCell::new(Tree {
                nodes: vec![root],
                root: NodeId(0),
                pending_insertions: Vec::new(),
                frames: Vec::new(),
                observers: Vec::new(),
            })),
        }
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            tree: Rc::downgrade(&self.tree),
        }
    }

    /// The root element. Elements are connected when they descend from it.
    pub fn body(&self) -> NodeId {
        self.tree.borrow().root
    }

    /// Create a detached element.
    pub fn create_element(&self, spec: ElementSpec) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        let id = NodeId(tree.nodes.len());
        tree.nodes.push(Node {
            tag: spec.tag,
            attributes: spec.attributes,
            value: RwSignal::new(spec.value),
            style: BTreeMap::new(),
            listeners: Vec::new(),
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Move `child` (with its subtree) to the end of `parent`'s children.
    ///
    /// Returns `false` if either handle is unknown or the move would create a
    /// cycle. When `parent` is connected, `child` is queued as an insertion.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> bool {
        let mut tree = self.tree.borrow_mut();
        if tree.node(parent).is_none() || tree.node(child).is_none() {
            return false;
        }
        if tree.is_ancestor(child, parent) {
            return false;
        }
        if let Some(old_parent) = tree.node(child).and_then(|n| n.parent) {
            if let Some(old) = tree.node_mut(old_parent) {
                old.children.retain(|&c| c != child);
            }
        }
        if let Some(node) = tree.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = tree.node_mut(parent) {
            node.children.push(child);
        }
        if tree.is_connected(parent) {
            tree.pending_insertions.push(child);
        }
        true
    }

    /// Create an element and append it in one step.
    pub fn append_new(&self, parent: NodeId, spec: ElementSpec) -> NodeId {
        let id = self.create_element(spec);
        self.append_child(parent, id);
        id
    }

    /// Detach `node` from its parent. Its listeners stay registered.
    pub fn remove(&self, node: NodeId) {
        let mut tree = self.tree.borrow_mut();
        if node == tree.root {
            return;
        }
        let Some(parent) = tree.node(node).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = tree.node_mut(parent) {
            p.children.retain(|&c| c != node);
        }
        if let Some(n) = tree.node_mut(node) {
            n.parent = None;
        }
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.tree.borrow().is_connected(node)
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.tree.borrow().node(node).map(|n| n.tag.clone())
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().node(node).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .node(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree
            .borrow()
            .node(node)
            .and_then(|n| n.attributes.get(name).cloned())
    }

    pub fn set_attribute(&self, node: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.attributes.insert(name.into(), value.into());
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.tree
            .borrow()
            .node(node)
            .is_some_and(|n| n.classes().any(|c| c == class))
    }

    /// Current `value` of an element (empty for unknown handles).
    pub fn value(&self, node: NodeId) -> String {
        match self.value_signal(node) {
            Some(signal) => signal.get_untracked(),
            None => String::new(),
        }
    }

    /// Programmatic write: updates the value without emitting events.
    pub fn set_value(&self, node: NodeId, value: impl Into<String>) {
        // Setting the signal runs dependent effects, which may touch the tree.
        if let Some(signal) = self.value_signal(node) {
            signal.set(value.into());
        }
    }

    /// The reactive cell behind an element's `value`, for views to track.
    pub fn value_signal(&self, node: NodeId) -> Option<RwSignal<String>> {
        self.tree.borrow().node(node).map(|n| n.value)
    }

    pub fn style_property(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree
            .borrow()
            .node(node)
            .and_then(|n| n.style.get(name).cloned())
    }

    pub fn set_style_property(&self, node: NodeId, name: impl Into<String>, value: impl Into<String>) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.style.insert(name.into(), value.into());
        }
    }

    /// Connected element whose `id` attribute equals `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree.borrow();
        tree.subtree(tree.root).into_iter().find(|&n| {
            tree.node(n)
                .and_then(|node| node.attributes.get("id"))
                .is_some_and(|value| value == id)
        })
    }

    /// First connected element matching `selector`, in document order.
    pub fn query_selector(&self, selector: &Selector) -> Option<NodeId> {
        let root = self.body();
        self.query_selector_all(root, selector).into_iter().next()
    }

    /// Descendants of `root` (excluding `root`) matching `selector`.
    pub fn query_selector_all(&self, root: NodeId, selector: &Selector) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        tree.subtree(root)
            .into_iter()
            .skip(1)
            .filter(|&n| tree.node(n).is_some_and(|node| node.matches(selector)))
            .collect()
    }

    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        self.tree
            .borrow()
            .node(node)
            .is_some_and(|n| n.matches(selector))
    }

    pub fn add_event_listener(
        &self,
        node: NodeId,
        kind: EventKind,
        listener: impl Fn(&Document, &Event) + 'static,
    ) {
        if let Some(n) = self.tree.borrow_mut().node_mut(node) {
            n.listeners.push((kind, Rc::new(listener)));
        }
    }

    /// Emit `kind` on `target`, then on each ancestor. Runs synchronously.
    pub fn dispatch(&self, target: NodeId, kind: EventKind) {
        let event = Event { kind, target };
        let listeners: Vec<Listener> = {
            let tree = self.tree.borrow();
            let mut out = Vec::new();
            let mut current = Some(target);
            while let Some(id) = current {
                let Some(node) = tree.node(id) else { break };
                out.extend(
                    node.listeners
                        .iter()
                        .filter(|(k, _)| *k == kind)
                        .map(|(_, l)| l.clone()),
                );
                current = node.parent;
            }
            out
        };
        trace!(node = ?target, %kind, listeners = listeners.len(), "dispatch");
        for listener in listeners {
            listener(self, &event);
        }
    }

    /// A user edit in progress: set the value, then emit `input`.
    pub fn user_input(&self, node: NodeId, value: impl Into<String>) {
        self.set_value(node, value);
        self.dispatch(node, EventKind::Input);
    }

    /// A committed user edit: set the value, then emit `input` and `change`.
    pub fn user_commit(&self, node: NodeId, value: impl Into<String>) {
        self.set_value(node, value);
        self.dispatch(node, EventKind::Input);
        self.dispatch(node, EventKind::Change);
    }

    /// Register for batches of newly inserted subtree roots.
    pub fn observe_insertions(&self, observer: impl Fn(&Document, &[NodeId]) + 'static) {
        self.tree.borrow_mut().observers.push(Rc::new(observer));
    }

    /// Run `callback` once, at the next [`Document::run_pending`].
    pub fn request_frame(&self, callback: impl FnOnce(&Document) + 'static) {
        self.tree.borrow_mut().frames.push(Box::new(callback));
    }

    /// Deliver queued insertions, then run queued frame callbacks.
    ///
    /// Work queued by the callbacks themselves waits for the next call.
    /// Returns `true` if anything ran.
    pub fn run_pending(&self) -> bool {
        let (insertions, observers, frames) = {
            let mut tree = self.tree.borrow_mut();
            let insertions = std::mem::take(&mut tree.pending_insertions);
            let observers = if insertions.is_empty() {
                Vec::new()
            } else {
                tree.observers.clone()
            };
            let frames = std::mem::take(&mut tree.frames);
            (insertions, observers, frames)
        };
        let ran = !insertions.is_empty() || !frames.is_empty();
        if !insertions.is_empty() {
            trace!(count = insertions.len(), "delivering insertions");
            for observer in &observers {
                observer(self, &insertions);
            }
        }
        for frame in frames {
            frame(self);
        }
        ran
    }

    /// Whether [`Document::run_pending`] has queued work.
    pub fn has_pending(&self) -> bool {
        let tree = self.tree.borrow();
        !tree.pending_insertions.is_empty() || !tree.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[test]
    fn appended_elements_are_found_by_id() {
        let doc = Document::new();
        let detached = doc.create_element(ElementSpec::new("input").id("c1"));
        assert_eq!(doc.get_element_by_id("c1"), None);

        doc.append_child(doc.body(), detached);
        assert_eq!(doc.get_element_by_id("c1"), Some(detached));

        doc.remove(detached);
        assert_eq!(doc.get_element_by_id("c1"), None);
    }

    #[test]
    fn append_rejects_cycles() {
        let doc = Document::new();
        let outer = doc.append_new(doc.body(), ElementSpec::new("div"));
        let inner = doc.append_new(outer, ElementSpec::new("div"));
        assert!(!doc.append_child(inner, outer));
        assert!(!doc.append_child(outer, outer));
        assert_eq!(doc.parent(outer), Some(doc.body()));
    }

    #[test]
    fn query_selector_all_skips_root_and_keeps_order() {
        let doc = Document::new();
        let section = doc.append_new(doc.body(), ElementSpec::new("div").class("slider"));
        let a = doc.append_new(section, ElementSpec::new("input").class("slider"));
        let b = doc.append_new(section, ElementSpec::new("input").class("slider"));
        let sel = Selector::any().class("slider");
        assert_eq!(doc.query_selector_all(section, &sel), vec![a, b]);
        assert_eq!(doc.query_selector(&sel), Some(section));
        assert!(doc.matches(section, &sel));
    }

    #[test]
    fn events_bubble_to_ancestors() {
        let doc = Document::new();
        let form = doc.append_new(doc.body(), ElementSpec::new("form"));
        let input = doc.append_new(form, ElementSpec::new("input"));
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = seen.clone();
        doc.add_event_listener(form, EventKind::Change, move |doc, e| {
            log.borrow_mut().push((e.target, doc.value(e.target)));
        });

        doc.user_input(input, "a");
        assert!(seen.borrow().is_empty());
        doc.user_commit(input, "b");
        assert_eq!(*seen.borrow(), vec![(input, "b".to_string())]);
    }

    #[test]
    fn listeners_may_write_the_document() {
        let doc = Document::new();
        let input = doc.append_new(doc.body(), ElementSpec::new("input"));
        let mirror = doc.append_new(doc.body(), ElementSpec::new("input"));
        doc.add_event_listener(input, EventKind::Input, move |doc, e| {
            let value = doc.value(e.target);
            doc.set_value(mirror, value);
            doc.set_style_property(mirror, "color", "red");
        });
        doc.user_input(input, "#123456");
        assert_eq!(doc.value(mirror), "#123456");
        assert_eq!(doc.style_property(mirror, "color").as_deref(), Some("red"));
    }

    #[test]
    fn insertions_are_batched_until_run_pending() {
        let doc = Document::new();
        let batches = Rc::new(RefCell::new(Vec::new()));
        let log = batches.clone();
        doc.observe_insertions(move |_, nodes| log.borrow_mut().push(nodes.to_vec()));

        let section = doc.create_element(ElementSpec::new("div"));
        let child = doc.append_new(section, ElementSpec::new("input"));
        assert!(!doc.has_pending());

        doc.append_child(doc.body(), section);
        let extra = doc.append_new(section, ElementSpec::new("input"));
        assert!(batches.borrow().is_empty());

        assert!(doc.run_pending());
        assert_eq!(*batches.borrow(), vec![vec![section, extra]]);
        assert_eq!(doc.children(section), vec![child, extra]);
        assert!(!doc.run_pending());
    }

    #[test]
    fn frame_callbacks_run_once() {
        let doc = Document::new();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        doc.request_frame(move |doc| {
            c.set(c.get() + 1);
            let again = c.clone();
            doc.request_frame(move |_| again.set(again.get() + 10));
        });

        doc.run_pending();
        assert_eq!(count.get(), 1);
        doc.run_pending();
        assert_eq!(count.get(), 11);
        doc.run_pending();
        assert_eq!(count.get(), 11);
    }

    #[test]
    fn weak_handle_does_not_keep_document_alive() {
        let doc = Document::new();
        let weak = doc.downgrade();
        assert!(weak.upgrade().is_some());
        drop(doc);
        assert!(weak.upgrade().is_none());
    }
}
