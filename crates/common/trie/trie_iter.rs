use std::{fmt, sync::Arc};

use crate::{
    Trie, TrieError,
    bit_path::BitPath,
    db::TrieStore,
    node::{Node, NodeRef},
};

/// A node visited during iteration, along with the full key leading to it.
#[derive(Debug, Clone)]
pub struct IterationElement {
    pub node_key: BitPath,
    pub node: Arc<Node>,
}

impl fmt::Display for IterationElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node.value() {
            Some(value) => write!(f, "{} -> 0x{}", self.node_key, hex::encode(value)),
            None if self.node.has_long_value() => {
                write!(f, "{} -> <long value>", self.node_key)
            }
            None => write!(f, "{} -> <no value>", self.node_key),
        }
    }
}

#[derive(Clone, Copy)]
enum Order {
    Pre,
    In,
    Post,
}

enum Visit {
    /// Resolve the referenced node and schedule it and its children.
    /// Holds the parent's key and the bit leading to the node, or `None` for the root.
    Expand(Option<(BitPath, u8)>, NodeRef),
    /// Yield an already expanded node.
    Emit(IterationElement),
}

/// Depth-first walk shared by the three iteration orders.
///
/// The stack is popped from the back, so visits are pushed in reverse of the order
/// they must happen in.
struct TrieWalker {
    store: Arc<dyn TrieStore>,
    stack: Vec<Visit>,
    order: Order,
}

impl TrieWalker {
    fn new(trie: &Trie, order: Order) -> Self {
        let mut stack = Vec::new();
        let root = trie.root_node();
        if !root.is_empty_trie() {
            stack.push(Visit::Expand(None, NodeRef::Node(root.clone())));
        }
        Self {
            store: trie.store().clone(),
            stack,
            order,
        }
    }

    fn expand(
        &mut self,
        parent: Option<(BitPath, u8)>,
        node_ref: NodeRef,
    ) -> Result<Option<IterationElement>, TrieError> {
        let Some(node) = node_ref.get_node(self.store.as_ref())? else {
            return Ok(None);
        };
        let node_key = match parent {
            Some((parent_key, bit)) => parent_key.rebuild_shared_path(bit, node.shared_path()),
            None => node.shared_path().clone(),
        };
        let left = child_visit(&node_key, 0, node.left());
        let right = child_visit(&node_key, 1, node.right());
        let element = IterationElement { node_key, node };

        match self.order {
            Order::Pre => {
                self.stack.extend(right);
                self.stack.extend(left);
                Ok(Some(element))
            }
            Order::In => {
                self.stack.extend(right);
                self.stack.push(Visit::Emit(element));
                self.stack.extend(left);
                Ok(None)
            }
            Order::Post => {
                self.stack.push(Visit::Emit(element));
                self.stack.extend(right);
                self.stack.extend(left);
                Ok(None)
            }
        }
    }

    fn next_element(&mut self) -> Option<Result<IterationElement, TrieError>> {
        while let Some(visit) = self.stack.pop() {
            match visit {
                Visit::Emit(element) => return Some(Ok(element)),
                Visit::Expand(parent, node_ref) => match self.expand(parent, node_ref) {
                    Ok(Some(element)) => return Some(Ok(element)),
                    Ok(None) => continue,
                    Err(err) => {
                        // A broken store ends the iteration
                        self.stack.clear();
                        return Some(Err(err));
                    }
                },
            }
        }
        None
    }
}

fn child_visit(parent_key: &BitPath, bit: u8, child: &NodeRef) -> Option<Visit> {
    (!child.is_empty()).then(|| Visit::Expand(Some((parent_key.clone(), bit)), child.clone()))
}

/// Visits each node before its children, left subtree first.
pub struct PreOrderIter(TrieWalker);

/// Visits the left subtree, then the node, then the right subtree.
/// Yields keys in lexicographic order.
pub struct InOrderIter(TrieWalker);

/// Visits each node after both of its subtrees.
pub struct PostOrderIter(TrieWalker);

impl PreOrderIter {
    pub(crate) fn new(trie: &Trie) -> Self {
        Self(TrieWalker::new(trie, Order::Pre))
    }
}

impl InOrderIter {
    pub(crate) fn new(trie: &Trie) -> Self {
        Self(TrieWalker::new(trie, Order::In))
    }
}

impl PostOrderIter {
    pub(crate) fn new(trie: &Trie) -> Self {
        Self(TrieWalker::new(trie, Order::Post))
    }
}

impl Iterator for PreOrderIter {
    type Item = Result<IterationElement, TrieError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next_element()
    }
}

impl Iterator for InOrderIter {
    type Item = Result<IterationElement, TrieError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next_element()
    }
}

impl Iterator for PostOrderIter {
    type Item = Result<IterationElement, TrieError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next_element()
    }
}
