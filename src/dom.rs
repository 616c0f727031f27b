//! Minimal in-memory document tree.
//!
//! Elements live in an arena and are addressed by [`NodeId`]. Only what the
//! carousel needs is modelled: ids, class tokens, attributes, inline styles,
//! click listeners and HTML serialisation.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Click,
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    style: Vec<(String, String)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    listeners: Vec<EventKind>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            attributes: Vec::new(),
            style: Vec::new(),
            parent: None,
            children: Vec::new(),
            listeners: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Element::new("body")],
            body: NodeId(0),
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Element::new(tag));
        id
    }

    /// Finds an element attached to the body by its id.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .find(|node| self.nodes[node.index()].id.as_deref() == Some(id))
    }

    pub fn set_id(&mut self, node: NodeId, id: &str) {
        self.nodes[node.index()].id = Some(id.to_string());
    }

    pub fn tag(&self, node: NodeId) -> &str {
        &self.nodes[node.index()].tag
    }

    /// Replaces the class list with the whitespace-separated tokens of `class_name`.
    pub fn set_class_name(&mut self, node: NodeId, class_name: &str) {
        self.nodes[node.index()].classes = class_name
            .split_whitespace()
            .map(str::to_string)
            .collect();
    }

    pub fn class_name(&self, node: NodeId) -> String {
        self.nodes[node.index()].classes.join(" ")
    }

    /// Exact token match, so `pause` never matches `paused`.
    pub fn has_class(&self, node: NodeId, token: &str) -> bool {
        self.nodes[node.index()].classes.iter().any(|c| c == token)
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        set_pair(&mut self.nodes[node.index()].attributes, name, value);
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        get_pair(&self.nodes[node.index()].attributes, name)
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) {
        set_pair(&mut self.nodes[node.index()].style, property, value);
    }

    pub fn style(&self, node: NodeId, property: &str) -> Option<&str> {
        get_pair(&self.nodes[node.index()].style, property)
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.index()].children
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
    }

    /// Inserts `child` just inside `parent`, before its first child.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.insert(0, child);
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(old) = self.nodes[child.index()].parent.take() {
            self.nodes[old.index()].children.retain(|c| *c != child);
        }
    }

    /// True if `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub fn add_event_listener(&mut self, node: NodeId, kind: EventKind) {
        self.nodes[node.index()].listeners.push(kind);
    }

    pub fn listeners(&self, node: NodeId) -> &[EventKind] {
        &self.nodes[node.index()].listeners
    }

    /// Walks up from `target` to the nearest element listening for `kind`.
    pub fn listener_for(&self, target: NodeId, kind: EventKind) -> Option<NodeId> {
        let mut cursor = Some(target);
        while let Some(current) = cursor {
            if self.listeners(current).contains(&kind) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    /// Depth-first, document order, excluding `root` itself.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev());
        }
        out
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let el = &self.nodes[node.index()];
        let _ = write!(out, "<{}", el.tag);
        if let Some(id) = &el.id {
            let _ = write!(out, " id=\"{}\"", escape(id));
        }
        if !el.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&el.classes.join(" ")));
        }
        for (name, value) in &el.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape(value));
        }
        if !el.style.is_empty() {
            let css: Vec<String> = el.style.iter().map(|(k, v)| format!("{k}: {v};")).collect();
            let _ = write!(out, " style=\"{}\"", escape(&css.join(" ")));
        }
        out.push('>');
        if is_void(&el.tag) {
            return;
        }
        for child in &el.children {
            self.write_html(*child, out);
        }
        let _ = write!(out, "</{}>", el.tag);
    }
}

fn set_pair(pairs: &mut Vec<(String, String)>, name: &str, value: &str) {
    match pairs.iter_mut().find(|(k, _)| k == name) {
        Some((_, v)) => *v = value.to_string(),
        None => pairs.push((name.to_string(), value.to_string())),
    }
}

fn get_pair<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.as_str())
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "img" | "br" | "hr" | "input" | "meta" | "link")
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
