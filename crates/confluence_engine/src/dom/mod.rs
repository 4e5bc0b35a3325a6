//! Mutable HTML document model.
//!
//! Pages are parsed once with `scraper` (html5ever underneath) and copied into
//! an `ego_tree` arena of owned [`Node`] values. Every cleaning pass works on
//! [`NodeId`] handles; detached subtrees stay in the arena but are no longer
//! reachable from the root, so they drop out of queries and serialization.
mod node;
mod serialize;

use std::collections::VecDeque;

use ego_tree::Tree;
use scraper::Html;

pub use ego_tree::NodeId;
pub use node::{AttrValue, Element, Node};

#[derive(Debug, Clone)]
pub struct Document {
    tree: Tree<Node>,
}

impl Document {
    /// Parses a complete HTML document. html5ever repairs malformed markup, so
    /// this never fails; the result always has a root `Document` node.
    pub fn parse(html: &str) -> Self {
        let source = Html::parse_document(html);
        let mut tree = Tree::new(Node::Document);
        let root_id = tree.root().id();

        let mut queue = VecDeque::new();
        queue.push_back((source.tree.root(), root_id));
        while let Some((src, dest)) = queue.pop_front() {
            for child in src.children() {
                let Some(node) = convert_node(child.value()) else {
                    continue;
                };
                let Some(mut parent) = tree.get_mut(dest) else {
                    continue;
                };
                let id = parent.append(node).id();
                queue.push_back((child, id));
            }
        }
        Self { tree }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root().id()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.tree.get(id).map(|node| node.value())
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.node(id).and_then(Node::as_element)
    }

    /// Runs `f` against the element at `id`; `None` when `id` is not an element.
    pub fn update_element<R>(&mut self, id: NodeId, f: impl FnOnce(&mut Element) -> R) -> Option<R> {
        let mut node = self.tree.get_mut(id)?;
        node.value().as_element_mut().map(f)
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.node(id).and_then(Node::as_text)
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(mut node) = self.tree.get_mut(id) {
            if let Node::Text(current) = node.value() {
                *current = text.into();
            }
        }
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        let root = self.root();
        if id == root {
            return true;
        }
        self.tree
            .get(id)
            .is_some_and(|node| node.ancestors().any(|ancestor| ancestor.id() == root))
    }

    /// Attached elements matching `pred`, in document order.
    pub fn find_all(&self, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.find_within(self.root(), pred)
    }

    pub fn find_first(&self, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.find_first_within(self.root(), pred)
    }

    /// Descendant elements of `scope` (excluding `scope`) matching `pred`.
    pub fn find_within(&self, scope: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        let Some(scope_ref) = self.tree.get(scope) else {
            return Vec::new();
        };
        scope_ref
            .descendants()
            .skip(1)
            .filter(|node| node.value().as_element().is_some_and(&pred))
            .map(|node| node.id())
            .collect()
    }

    pub fn find_first_within(
        &self,
        scope: NodeId,
        pred: impl Fn(&Element) -> bool,
    ) -> Option<NodeId> {
        let scope_ref = self.tree.get(scope)?;
        scope_ref
            .descendants()
            .skip(1)
            .find(|node| node.value().as_element().is_some_and(&pred))
            .map(|node| node.id())
    }

    /// All attached nodes of the document in document order.
    pub fn descendants(&self) -> Vec<NodeId> {
        self.tree.root().descendants().map(|node| node.id()).collect()
    }

    /// Text nodes below `scope`, in document order.
    pub fn text_nodes_within(&self, scope: NodeId) -> Vec<NodeId> {
        self.nodes_within(scope, |node| matches!(node, Node::Text(_)))
    }

    /// Attached comment nodes, in document order.
    pub fn comments(&self) -> Vec<NodeId> {
        self.nodes_within(self.root(), |node| matches!(node, Node::Comment(_)))
    }

    fn nodes_within(&self, scope: NodeId, pred: impl Fn(&Node) -> bool) -> Vec<NodeId> {
        let Some(scope_ref) = self.tree.get(scope) else {
            return Vec::new();
        };
        scope_ref
            .descendants()
            .skip(1)
            .filter(|node| pred(node.value()))
            .map(|node| node.id())
            .collect()
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.tree
            .get(id)
            .map(|node| node.children().map(|child| child.id()).collect())
            .unwrap_or_default()
    }

    pub fn child_elements(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.children(id)
            .into_iter()
            .filter(|child| self.element(*child).is_some_and(&pred))
            .collect()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id)?.parent().map(|parent| parent.id())
    }

    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id)?.prev_sibling().map(|node| node.id())
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.tree.get(id)?.next_sibling().map(|node| node.id())
    }

    /// True when any ancestor element of `id` satisfies `pred`.
    pub fn has_ancestor(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> bool {
        self.tree.get(id).is_some_and(|node| {
            node.ancestors()
                .any(|ancestor| ancestor.value().as_element().is_some_and(&pred))
        })
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        let Some(node) = self.tree.get(id) else {
            return String::new();
        };
        node.descendants()
            .filter_map(|node| node.value().as_text())
            .collect()
    }

    /// Creates a detached element; attach it with one of the insertion methods.
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.tree.orphan(Node::Element(element)).id()
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.tree.orphan(Node::Text(text.into())).id()
    }

    /// Moves `child` (detaching it first) to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child {
            return;
        }
        if let Some(mut parent) = self.tree.get_mut(parent) {
            parent.append_id(child);
        }
    }

    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child {
            return;
        }
        if let Some(mut parent) = self.tree.get_mut(parent) {
            parent.prepend_id(child);
        }
    }

    /// Moves `node` directly before `reference`. No-op when `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeId, node: NodeId) {
        if reference == node || self.parent(reference).is_none() {
            return;
        }
        if let Some(mut reference) = self.tree.get_mut(reference) {
            reference.insert_id_before(node);
        }
    }

    /// Detaches `id` and its subtree from the document.
    pub fn remove(&mut self, id: NodeId) {
        if let Some(mut node) = self.tree.get_mut(id) {
            node.detach();
        }
    }

    /// Replaces `id` by its children, in order.
    pub fn unwrap(&mut self, id: NodeId) {
        if self.parent(id).is_none() {
            return;
        }
        for child in self.children(id) {
            self.insert_before(id, child);
        }
        self.remove(id);
    }

    pub fn replace(&mut self, old: NodeId, new: NodeId) {
        if self.parent(old).is_none() {
            return;
        }
        self.insert_before(old, new);
        self.remove(old);
    }

    /// Moves every child of `from` to the end of `to`.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        for child in self.children(from) {
            self.append_child(to, child);
        }
    }

    pub fn html_element(&self) -> Option<NodeId> {
        self.child_elements(self.root(), |element| element.is("html"))
            .into_iter()
            .next()
    }

    pub fn head(&self) -> Option<NodeId> {
        self.find_first(|element| element.is("head"))
    }

    pub fn body(&self) -> Option<NodeId> {
        self.find_first(|element| element.is("body"))
    }

    pub fn ensure_html(&mut self) -> NodeId {
        if let Some(html) = self.html_element() {
            return html;
        }
        let html = self.create_element(Element::new("html"));
        let root = self.root();
        self.append_child(root, html);
        html
    }

    /// Returns the `<head>` element, creating it as the first child of `<html>` if needed.
    pub fn ensure_head(&mut self) -> NodeId {
        if let Some(head) = self.head() {
            return head;
        }
        let html = self.ensure_html();
        let head = self.create_element(Element::new("head"));
        self.prepend_child(html, head);
        head
    }
}

fn convert_node(node: &scraper::Node) -> Option<Node> {
    match node {
        scraper::Node::Document | scraper::Node::Fragment => None,
        scraper::Node::Doctype(doctype) => Some(Node::Doctype(doctype.name().to_string())),
        scraper::Node::Comment(comment) => Some(Node::Comment((**comment).to_owned())),
        scraper::Node::Text(text) => Some(Node::Text((**text).to_owned())),
        scraper::Node::Element(source) => {
            let mut element = Element::new(source.name());
            for (name, value) in source.attrs() {
                element.set_attr(name, value);
            }
            Some(Node::Element(element))
        }
        scraper::Node::ProcessingInstruction(_) => None,
    }
}
