//! A generic tree node usable as input or expected structure

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use super::{compare_structure, AuditList, AuditState, ExpectedStructure, InputStructure, Structure};
use crate::audit::{Audit, AuditRef};
use crate::engine::Session;
use crate::error::Result;
use crate::report::{Context, ContextRef, Prettifier};
use crate::statistics::{counters, Statistics};

/// Where a node sits in its tree
#[derive(Debug)]
pub struct NodeContext {
    label: String,
    rendered: String,
    parent: Option<Weak<NodeContext>>,
}

impl NodeContext {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The node's value as rendered when the node was built
    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn parent(&self) -> Option<Arc<NodeContext>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Labels from the root down to this node, joined by `/`
    pub fn path(&self) -> String {
        let mut labels = vec![self.label.clone()];
        let mut current = self.parent();
        while let Some(ctx) = current {
            labels.push(ctx.label.clone());
            current = ctx.parent();
        }
        labels.reverse();
        labels.join("/")
    }
}

impl Context for NodeContext {
    fn context_to_string(&self, prettifier: Option<&dyn Prettifier>) -> String {
        let path = self.path();
        match prettifier {
            Some(p) => format!("{}: {}", p.prettify_key(&path), p.prettify_value(&self.rendered)),
            None => format!("{}: {}", path, self.rendered),
        }
    }

    fn add_context_to_stats(&self, statistics: &mut Statistics) {
        statistics.increment(counters::NODES);
    }
}

/// Labelled value with children, audits and a comparison outcome
///
/// As an expected structure its audits describe the matching input node.
/// Children are compared against input children with the same label.
pub struct Node<T> {
    context: Arc<NodeContext>,
    value: T,
    children: Vec<Node<T>>,
    audits: AuditList,
    use_global_audits: bool,
    state: AuditState,
}

impl<T: fmt::Debug> Node<T> {
    /// A root node labelled `root`
    pub fn new(value: T) -> Self {
        Self::labelled("root", value)
    }

    pub fn labelled(label: impl Into<String>, value: T) -> Self {
        let context = Arc::new(NodeContext {
            label: label.into(),
            rendered: format!("{:?}", value),
            parent: None,
        });
        Self {
            context,
            value,
            children: Vec::new(),
            audits: AuditList::new(),
            use_global_audits: true,
            state: AuditState::new(),
        }
    }

    pub fn with_audit(mut self, audit: impl Audit + 'static) -> Self {
        self.audits.add(Arc::new(audit));
        self
    }

    pub fn with_audits(mut self, audits: impl IntoIterator<Item = AuditRef>) -> Self {
        self.audits.extend(audits);
        self
    }

    /// Skip the engine's global audits for this node
    pub fn without_global_audits(mut self) -> Self {
        self.use_global_audits = false;
        self
    }

    pub fn with_child(mut self, child: Node<T>) -> Self {
        self.add_child(child);
        self
    }

    pub fn add_child(&mut self, mut child: Node<T>) {
        child.reparent(Some(Arc::downgrade(&self.context)));
        self.children.push(child);
    }

    fn reparent(&mut self, parent: Option<Weak<NodeContext>>) {
        self.context = Arc::new(NodeContext {
            label: self.context.label.clone(),
            rendered: self.context.rendered.clone(),
            parent,
        });
        let link = Arc::downgrade(&self.context);
        for child in &mut self.children {
            child.reparent(Some(link.clone()));
        }
    }
}

impl<T> Node<T> {
    pub fn label(&self) -> &str {
        &self.context.label
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn children(&self) -> &[Node<T>] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut [Node<T>] {
        &mut self.children
    }

    pub fn child(&self, label: &str) -> Option<&Node<T>> {
        self.children.iter().find(|child| child.label() == label)
    }

    pub fn audits_mut(&mut self) -> &mut AuditList {
        &mut self.audits
    }

    pub fn node_context(&self) -> &Arc<NodeContext> {
        &self.context
    }
}

impl<T: fmt::Debug> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("label", &self.context.label)
            .field("value", &self.value)
            .field("children", &self.children)
            .field("audits", &self.audits.len())
            .field("passed", &self.state.passed())
            .finish()
    }
}

impl<T: 'static> Structure for Node<T> {
    fn context(&self) -> ContextRef {
        self.context.clone()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T: 'static> InputStructure for Node<T> {
    fn parent(&self) -> Option<ContextRef> {
        self.context.parent().map(|ctx| ctx as ContextRef)
    }

    fn audit_state(&self) -> &AuditState {
        &self.state
    }

    fn audit_state_mut(&mut self) -> &mut AuditState {
        &mut self.state
    }
}

impl<T: 'static> ExpectedStructure for Node<T> {
    fn audits(&self) -> &AuditList {
        &self.audits
    }

    fn use_global_audits(&self) -> bool {
        self.use_global_audits
    }

    fn compare(&self, session: &mut Session<'_>, input: &mut dyn InputStructure) -> Result<bool> {
        let mut passed = compare_structure(session, input, self)?;

        if self.children.is_empty() {
            return Ok(passed);
        }
        let Some(node) = input.as_any_mut().downcast_mut::<Node<T>>() else {
            return Ok(passed);
        };

        for expected in &self.children {
            if let Some(actual) = node.children.iter_mut().find(|child| child.label() == expected.label()) {
                passed &= expected.compare(session, actual)?;
            }
        }
        Ok(passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl Prettifier for Upper {
        fn prettify(&self, raw: &str) -> String {
            raw.to_uppercase()
        }
    }

    #[test]
    fn test_context_path_follows_parents() {
        let tree = Node::labelled("doc", 0).with_child(Node::labelled("a", 1).with_child(Node::labelled("b", 2)));

        let leaf = &tree.children()[0].children()[0];
        assert_eq!(leaf.node_context().path(), "doc/a/b");
        assert_eq!(leaf.context().context_to_string(None), "doc/a/b: 2");
        assert_eq!(
            leaf.parent().map(|ctx| ctx.context_to_string(None)),
            Some("doc/a: 1".to_string())
        );
        assert!(tree.parent().is_none());
    }

    #[test]
    fn test_context_prettified() {
        let node = Node::labelled("name", "x");
        assert_eq!(node.context().context_to_string(Some(&Upper)), "NAME: \"X\"");
    }

    #[test]
    fn test_context_counts_nodes() {
        let mut stats = Statistics::new();
        Node::new(1).context().add_context_to_stats(&mut stats);
        assert_eq!(stats.get(counters::NODES), 1);
    }

    #[test]
    fn test_child_lookup() {
        let tree = Node::new(0).with_child(Node::labelled("left", 1)).with_child(Node::labelled("right", 2));
        assert_eq!(tree.child("right").map(|n| *n.value()), Some(2));
        assert!(tree.child("middle").is_none());
    }
}
