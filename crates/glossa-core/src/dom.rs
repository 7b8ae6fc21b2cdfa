//! In-memory document tree.
//!
//! Stands in for the host page's DOM: elements with ordered attributes and
//! text nodes, stored in a generational arena so handles to removed nodes
//! never alias live ones. Layout is not computed here; hosts record element
//! rects with [`Document::set_rect`] and a [`crate::geometry::Layout`] reads
//! them back.

use glossa_types::{NodeId, Rect};

#[derive(Debug, Clone)]
pub enum NodeData {
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
pub struct ElementData {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
}

#[derive(Debug)]
struct NodeEntry {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    rect: Option<Rect>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<NodeEntry>,
}

#[derive(Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    html: NodeId,
    head: NodeId,
    body: NodeId,
    focused: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty document with `html`, `head` and `body`
    pub fn new() -> Self {
        let mut doc = Self {
            slots: Vec::new(),
            free: Vec::new(),
            html: NodeId {
                index: 0,
                generation: 0,
            },
            head: NodeId {
                index: 0,
                generation: 0,
            },
            body: NodeId {
                index: 0,
                generation: 0,
            },
            focused: None,
        };

        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.append_child(html, head);
        doc.append_child(html, body);
        doc.html = html;
        doc.head = head;
        doc.body = body;
        doc
    }

    pub fn html(&self) -> NodeId {
        self.html
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let entry = NodeEntry {
            data,
            parent: None,
            children: Vec::new(),
            rect: None,
        };

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = Some(entry);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                entry: Some(entry),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    fn entry(&self, id: NodeId) -> Option<&NodeEntry> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn entry_mut(&mut self, id: NodeId) -> Option<&mut NodeEntry> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.entry_mut(id).map(|e| &mut e.data) {
            Some(NodeData::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.alloc(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.alloc(NodeData::Text(text.to_string()))
    }

    /// The node has not been removed
    pub fn contains(&self, id: NodeId) -> bool {
        self.entry(id).is_some()
    }

    /// The node is reachable from the document root
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.html {
                return true;
            }
            current = self.entry(node).and_then(|e| e.parent);
        }
        false
    }

    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.entry(id).map(|e| &e.data)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.data(id), Some(NodeData::Element(_)))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.data(id), Some(NodeData::Text(_)))
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            Some(NodeData::Element(el)) => Some(el.tag.as_str()),
            _ => None,
        }
    }

    /// Contents of a text node
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id) {
            Some(NodeData::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: &str) {
        if let Some(NodeEntry {
            data: NodeData::Text(text),
            ..
        }) = self.entry_mut(id)
        {
            *text = value.to_string();
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.entry(id).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    /// `id` and its ancestors, innermost first
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.contains(id).then_some(id),
        }
    }

    /// Innermost element among `id` and its ancestors accepted by `predicate`
    pub fn closest(&self, id: NodeId, mut predicate: impl FnMut(NodeId) -> bool) -> Option<NodeId> {
        self.ancestors(id)
            .filter(|node| self.is_element(*node))
            .find(|node| predicate(*node))
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.data(id) {
            Some(NodeData::Element(el)) => el
                .attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            match el.attrs.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => el.attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let value = match self.attr(id, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        self.set_attr(id, "class", &value);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(existing) = self.attr(id, "class") else {
            return;
        };
        let value = existing
            .split_whitespace()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "class", &value);
    }

    fn detach(&mut self, child: NodeId) {
        if let Some(parent) = self.parent(child) {
            if let Some(entry) = self.entry_mut(parent) {
                entry.children.retain(|c| *c != child);
            }
            if let Some(entry) = self.entry_mut(child) {
                entry.parent = None;
            }
        }
    }

    /// Appends `child` to `parent`, moving it if it already has a parent
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if !self.contains(parent) || !self.contains(child) || parent == child {
            return;
        }
        self.detach(child);
        if let Some(entry) = self.entry_mut(parent) {
            entry.children.push(child);
        }
        if let Some(entry) = self.entry_mut(child) {
            entry.parent = Some(parent);
        }
    }

    /// Inserts `child` right before `reference` under the same parent
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        if !self.contains(child) || child == reference {
            return;
        }
        self.detach(child);
        if let Some(entry) = self.entry_mut(parent) {
            let pos = entry
                .children
                .iter()
                .position(|c| *c == reference)
                .unwrap_or(entry.children.len());
            entry.children.insert(pos, child);
        }
        if let Some(entry) = self.entry_mut(child) {
            entry.parent = Some(parent);
        }
    }

    /// Removes `id` and its subtree. Returns `false` when it was already gone.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if !self.contains(id) || id == self.html {
            return false;
        }
        self.detach(id);
        self.destroy(id);
        true
    }

    fn destroy(&mut self, id: NodeId) {
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let Some(slot) = self.slots.get_mut(node.index as usize) else {
                continue;
            };
            if slot.generation != node.generation {
                continue;
            }
            if let Some(entry) = slot.entry.take() {
                stack.extend(entry.children);
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(node.index);
            }
            if self.focused == Some(node) {
                self.focused = None;
            }
        }
    }

    /// Puts `replacements` where `old` was, then removes `old`
    pub fn replace_with(&mut self, old: NodeId, replacements: &[NodeId]) {
        if self.parent(old).is_none() {
            return;
        }
        for node in replacements {
            self.insert_before(old, *node);
        }
        self.remove(old);
    }

    /// Replaces an element with its own children
    pub fn unwrap(&mut self, element: NodeId) {
        if self.parent(element).is_none() {
            return;
        }
        let children = self.children(element).to_vec();
        for child in children {
            self.insert_before(element, child);
        }
        self.remove(element);
    }

    /// Merges adjacent text nodes below `id` and drops empty ones
    pub fn normalize(&mut self, id: NodeId) {
        let children = self.children(id).to_vec();
        let mut previous_text: Option<NodeId> = None;

        for child in children {
            match self.text(child).map(str::to_string) {
                Some(text) if text.is_empty() => {
                    self.remove(child);
                }
                Some(text) => match previous_text {
                    Some(prev) => {
                        let merged = format!("{}{}", self.text(prev).unwrap_or_default(), text);
                        self.set_text(prev, &merged);
                        self.remove(child);
                    }
                    None => previous_text = Some(child),
                },
                None => {
                    previous_text = None;
                    self.normalize(child);
                }
            }
        }
    }

    /// Concatenated text below `id`
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(text) = self.text(node) {
                out.push_str(text);
            }
        }
        out
    }

    /// `id` and everything below it, in document order
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.contains(id) {
            return out;
        }
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn text_nodes(&self, id: NodeId) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| self.is_text(*n))
            .collect()
    }

    pub fn elements_with_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|n| self.has_class(*n, class))
            .collect()
    }

    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.html)
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(id))
    }

    pub fn set_rect(&mut self, id: NodeId, rect: Rect) {
        if let Some(entry) = self.entry_mut(id) {
            entry.rect = Some(rect);
        }
    }

    pub fn rect(&self, id: NodeId) -> Option<Rect> {
        self.entry(id).and_then(|e| e.rect)
    }

    pub fn focus(&mut self, id: NodeId) {
        if self.contains(id) {
            self.focused = Some(id);
        }
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused.filter(|id| self.contains(*id))
    }

    /// Serialized markup of `id` and its subtree
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match self.data(id) {
            Some(NodeData::Text(text)) => {
                // style bodies are raw text
                if self.parent(id).and_then(|p| self.tag(p)) == Some("style") {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            Some(NodeData::Element(el)) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if el.tag == "img" {
                    return;
                }
                for child in self.children(id) {
                    self.write_html(*child, out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
            None => {}
        }
    }
}

pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.parent(current);
        Some(current)
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
