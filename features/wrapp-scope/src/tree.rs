//! Tree scoped implicit context
//!
//! A [Node] is a position in a component hierarchy. Values provided at a node are visible to every
//! node built below it and shadow values provided further up for the same [Slot].
//! Nodes are persistent, providing a value never changes an existing node but yields a new child.

use std::{
    any::Any,
    fmt::Debug,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

/// Identity of one propagation channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot(u64);
impl Slot {
    /// Allocates a slot distinct from every other slot of this process
    pub fn unique() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Slot(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A position in the hierarchy
#[derive(Clone)]
pub struct Node(Rc<NodeInner>);
struct NodeInner {
    parent: Option<Node>,
    provided: Option<(Slot, Rc<dyn Any>)>,
    depth: usize,
}
impl Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Node")
            .field("depth", &self.0.depth)
            .field("provides", &self.0.provided.as_ref().map(|(slot, _)| slot))
            .finish()
    }
}

impl Node {
    pub fn root() -> Self {
        Node(Rc::new(NodeInner {
            parent: None,
            provided: None,
            depth: 0,
        }))
    }

    /// Creates a plain child node
    pub fn child(&self) -> Node {
        self.make_child(None)
    }

    /// Creates a child node which provides `value` on `slot` to its subtree
    pub fn provide(&self, slot: Slot, value: Rc<dyn Any>) -> Node {
        self.make_child(Some((slot, value)))
    }

    /// Returns the value provided on `slot` by this node or its nearest ancestor
    pub fn nearest(&self, slot: Slot) -> Option<Rc<dyn Any>> {
        let mut current = Some(self);
        while let Some(node) = current {
            if let Some((provided_slot, value)) = &node.0.provided {
                if *provided_slot == slot {
                    return Some(value.clone());
                }
            }
            current = node.0.parent.as_ref();
        }
        None
    }

    /// Distance to the root, the root has depth 0
    pub fn depth(&self) -> usize {
        self.0.depth
    }

    fn make_child(&self, provided: Option<(Slot, Rc<dyn Any>)>) -> Node {
        Node(Rc::new(NodeInner {
            parent: Some(self.clone()),
            provided,
            depth: self.0.depth + 1,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(node: &Node, slot: Slot) -> Option<u32> {
        node.nearest(slot)
            .and_then(|v| v.downcast::<u32>().ok())
            .map(|v| *v)
    }

    #[test]
    fn slots_are_unique() {
        assert_ne!(Slot::unique(), Slot::unique());
    }

    #[test]
    fn root_provides_nothing() {
        let root = Node::root();
        assert_eq!(root.depth(), 0);
        assert!(root.nearest(Slot::unique()).is_none());
    }

    #[test]
    fn descendants_read_nearest_ancestor() {
        let slot = Slot::unique();
        let root = Node::root();
        let outer = root.provide(slot, Rc::new(1_u32));
        let inner = outer.child().child().provide(slot, Rc::new(2_u32));
        let sibling = outer.child();

        assert_eq!(read(&root, slot), None);
        assert_eq!(read(&outer, slot), Some(1));
        assert_eq!(read(&inner.child(), slot), Some(2));
        assert_eq!(read(&sibling, slot), Some(1));
        assert_eq!(inner.depth(), 4);
    }

    #[test]
    fn other_slots_are_skipped() {
        let ours = Slot::unique();
        let theirs = Slot::unique();
        let node = Node::root()
            .provide(ours, Rc::new(1_u32))
            .provide(theirs, Rc::new(2_u32))
            .child();

        assert_eq!(read(&node, ours), Some(1));
        assert_eq!(read(&node, theirs), Some(2));
    }
}
