//! Headless element tree.
//!
//! A minimal stand-in for the browser DOM: elements carry a tag, classes,
//! attributes, own text and children, and dispatch `click`, `input`,
//! `submit` and `keydown` events that bubble from the target to the root.
//!
//! [`Element`] is a cheap, cloneable handle; clones share the same node.
//! Each operation locks its node only for the duration of the call, and
//! listeners run with no lock held, so a listener may freely mutate the
//! tree it was fired from.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use thiserror::Error;

/// Errors raised while building views
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewError {
    /// A required element is missing from a container or template
    #[error("missing required element `.{class}`")]
    MissingElement {
        /// Class that was looked up
        class: String,
    },
}

/// Kinds of events an element can dispatch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    /// Pointer click
    Click,
    /// Input value change
    Input,
    /// Form submission
    Submit,
    /// Key press
    KeyDown,
}

/// An event travelling through the tree
#[derive(Debug)]
pub struct DomEvent {
    kind: EventKind,
    target: Element,
    key: Option<String>,
    stopped: bool,
}

impl DomEvent {
    /// Kind of event
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// Element the event was dispatched on
    #[must_use]
    pub const fn target(&self) -> &Element {
        &self.target
    }

    /// Key name for [`EventKind::KeyDown`]
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Stops the event from reaching ancestors
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }
}

type Listener = Arc<dyn Fn(&mut DomEvent) + Send + Sync>;

struct Node {
    tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    children: Vec<Element>,
    parent: Weak<Mutex<Node>>,
    listeners: Vec<(EventKind, Listener)>,
}

/// Handle to a node of the element tree
#[derive(Clone)]
pub struct Element {
    node: Arc<Mutex<Node>>,
}

impl Element {
    /// Creates a detached element
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            node: Arc::new(Mutex::new(Node {
                tag: tag.to_string(),
                classes: Vec::new(),
                attributes: BTreeMap::new(),
                text: String::new(),
                children: Vec::new(),
                parent: Weak::new(),
                listeners: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Node> {
        self.node.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========== Builders ==========

    /// Adds classes (space separated), builder style
    #[must_use]
    pub fn class(self, classes: &str) -> Self {
        for class in classes.split_whitespace() {
            self.add_class(class);
        }
        self
    }

    /// Sets an attribute, builder style
    #[must_use]
    pub fn attr(self, name: &str, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Sets own text, builder style
    #[must_use]
    pub fn text(self, text: &str) -> Self {
        self.set_text(text);
        self
    }

    /// Appends children, builder style
    #[must_use]
    pub fn child(self, child: Self) -> Self {
        self.append(child);
        self
    }

    // ========== Classes ==========

    /// Tag name
    #[must_use]
    pub fn tag(&self) -> String {
        self.lock().tag.clone()
    }

    /// Adds a class if absent
    pub fn add_class(&self, class: &str) {
        let mut node = self.lock();
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
    }

    /// Removes a class if present
    pub fn remove_class(&self, class: &str) {
        self.lock().classes.retain(|c| c != class);
    }

    /// Adds or removes a class
    pub fn toggle_class(&self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    /// Whether the element has a class
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.lock().classes.iter().any(|c| c == class)
    }

    /// All classes, in insertion order
    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.lock().classes.clone()
    }

    // ========== Attributes & text ==========

    /// Sets an attribute
    pub fn set_attribute(&self, name: &str, value: &str) {
        self.lock()
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    /// Removes an attribute
    pub fn remove_attribute(&self, name: &str) {
        self.lock().attributes.remove(name);
    }

    /// Reads an attribute
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.lock().attributes.get(name).cloned()
    }

    /// Sets or clears the `disabled` attribute
    pub fn set_disabled(&self, disabled: bool) {
        if disabled {
            self.set_attribute("disabled", "disabled");
        } else {
            self.remove_attribute("disabled");
        }
    }

    /// Whether the `disabled` attribute is set
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.lock().attributes.contains_key("disabled")
    }

    /// Current `value` attribute, empty when unset
    #[must_use]
    pub fn value(&self) -> String {
        self.attribute("value").unwrap_or_default()
    }

    /// Replaces own text; children are dropped, like `textContent`
    pub fn set_text(&self, text: &str) {
        let children = {
            let mut node = self.lock();
            node.text = text.to_string();
            std::mem::take(&mut node.children)
        };
        for child in children {
            child.lock().parent = Weak::new();
        }
    }

    /// Own text plus the text of all descendants
    #[must_use]
    pub fn text_content(&self) -> String {
        let (mut text, children) = {
            let node = self.lock();
            (node.text.clone(), node.children.clone())
        };
        for child in children {
            text.push_str(&child.text_content());
        }
        text
    }

    // ========== Tree ==========

    /// Appends a child, detaching it from any previous parent
    pub fn append(&self, child: Self) {
        child.detach();
        child.lock().parent = Arc::downgrade(&self.node);
        self.lock().children.push(child);
    }

    /// Replaces all children
    pub fn replace_children(&self, children: Vec<Self>) {
        for old in self.children() {
            old.lock().parent = Weak::new();
        }
        self.lock().children.clear();
        for child in children {
            self.append(child);
        }
    }

    /// Replaces this element with `replacements` in its parent
    pub fn replace_with(&self, replacements: Vec<Self>) {
        let Some(parent) = self.parent() else {
            return;
        };
        let siblings = parent.children();
        let mut next = Vec::with_capacity(siblings.len() + replacements.len());
        let mut replacements = Some(replacements);
        for sibling in siblings {
            if sibling.ptr_eq(self) {
                next.extend(replacements.take().unwrap_or_default());
            } else {
                next.push(sibling);
            }
        }
        parent.replace_children(next);
    }

    /// Removes this element from its parent
    pub fn detach(&self) {
        if let Some(parent) = self.parent() {
            parent.lock().children.retain(|c| !c.ptr_eq(self));
        }
        self.lock().parent = Weak::new();
    }

    /// Direct children
    #[must_use]
    pub fn children(&self) -> Vec<Self> {
        self.lock().children.clone()
    }

    /// Parent element, if attached
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.lock().parent.upgrade().map(|node| Self { node })
    }

    /// Whether both handles refer to the same node
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.node, &other.node)
    }

    /// Whether `other` is this element or one of its descendants
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        let mut current = Some(other.clone());
        while let Some(element) = current {
            if element.ptr_eq(self) {
                return true;
            }
            current = element.parent();
        }
        false
    }

    /// First descendant (depth first, document order) with `class`
    #[must_use]
    pub fn query(&self, class: &str) -> Option<Self> {
        for child in self.children() {
            if child.has_class(class) {
                return Some(child);
            }
            if let Some(found) = child.query(class) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with `class`, in document order
    #[must_use]
    pub fn query_all(&self, class: &str) -> Vec<Self> {
        let mut found = Vec::new();
        for child in self.children() {
            if child.has_class(class) {
                found.push(child.clone());
            }
            found.extend(child.query_all(class));
        }
        found
    }

    /// First descendant with `class`, or [`ViewError::MissingElement`]
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::MissingElement`] when no descendant matches.
    pub fn ensure(&self, class: &str) -> Result<Self, ViewError> {
        self.query(class).ok_or_else(|| ViewError::MissingElement {
            class: class.to_string(),
        })
    }

    /// Deep copy without listeners, detached
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        let (tag, classes, attributes, text, children) = {
            let node = self.lock();
            (
                node.tag.clone(),
                node.classes.clone(),
                node.attributes.clone(),
                node.text.clone(),
                node.children.clone(),
            )
        };
        let copy = Self::new(&tag);
        {
            let mut node = copy.lock();
            node.classes = classes;
            node.attributes = attributes;
            node.text = text;
        }
        for child in children {
            copy.append(child.deep_clone());
        }
        copy
    }

    // ========== Events ==========

    /// Registers a listener
    pub fn on<F>(&self, kind: EventKind, listener: F)
    where
        F: Fn(&mut DomEvent) + Send + Sync + 'static,
    {
        self.lock().listeners.push((kind, Arc::new(listener)));
    }

    /// Dispatches an event on this element and bubbles it to the root
    pub fn dispatch(&self, kind: EventKind, key: Option<&str>) {
        let mut event = DomEvent {
            kind,
            target: self.clone(),
            key: key.map(str::to_string),
            stopped: false,
        };
        let mut current = Some(self.clone());
        while let Some(element) = current {
            let listeners: Vec<Listener> = element
                .lock()
                .listeners
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, listener)| Arc::clone(listener))
                .collect();
            for listener in listeners {
                listener(&mut event);
            }
            if event.stopped {
                break;
            }
            current = element.parent();
        }
    }

    /// Clicks the element; disabled elements ignore clicks
    pub fn click(&self) {
        if !self.is_disabled() {
            self.dispatch(EventKind::Click, None);
        }
    }

    /// Sets the `value` attribute and dispatches `input`
    pub fn input(&self, value: &str) {
        self.set_attribute("value", value);
        self.dispatch(EventKind::Input, None);
    }

    /// Dispatches `submit`
    pub fn submit(&self) {
        self.dispatch(EventKind::Submit, None);
    }

    /// Dispatches `keydown` for `key`
    pub fn press_key(&self, key: &str) {
        self.dispatch(EventKind::KeyDown, Some(key));
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let node = self.lock();
        f.debug_struct("Element")
            .field("tag", &node.tag)
            .field("classes", &node.classes)
            .field("children", &node.children.len())
            .finish_non_exhaustive()
    }
}

/// A reusable fragment, instantiated by deep cloning
#[derive(Clone, Debug)]
pub struct Template {
    id: String,
    content: Element,
}

impl Template {
    /// Wraps `content` as the template `id`
    #[must_use]
    pub fn new(id: &str, content: Element) -> Self {
        Self {
            id: id.to_string(),
            content,
        }
    }

    /// Template id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// A fresh, detached copy of the template content
    #[must_use]
    pub fn instantiate(&self) -> Element {
        self.content.deep_clone()
    }
}
