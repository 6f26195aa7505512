//! Tree nodes.
//!
//! A [`Node`] is either a [`Leaf`] holding entries or a [`NonLeaf`] holding
//! child nodes. Nodes are immutable: `add` and `delete` build replacement
//! nodes along the path they touch and share every untouched child through
//! its `Arc` with the previous version of the tree.

use std::sync::Arc;

use log::trace;
use smallvec::{smallvec, SmallVec};

use crate::context::Context;
use crate::entry::Entry;
use crate::geometry::{mbr_of, Geometry, HasGeometry, Rectangle};
use crate::splitter::split_items;

/// Result of inserting into a node: the replacement node, or the two halves
/// of a split.
pub(crate) type Replacement<V, G> = SmallVec<[Arc<Node<V, G>>; 2]>;

#[derive(Clone, Debug)]
pub enum Node<V, G> {
    Leaf(Leaf<V, G>),
    NonLeaf(NonLeaf<V, G>),
}

/// A bottom-level node holding entries.
#[derive(Clone, Debug)]
pub struct Leaf<V, G> {
    entries: Vec<Entry<V, G>>,
    mbr: Rectangle,
}

/// An inner node holding child nodes.
#[derive(Clone, Debug)]
pub struct NonLeaf<V, G> {
    children: Vec<Arc<Node<V, G>>>,
    mbr: Rectangle,
}

/// Outcome of a delete below some node.
///
/// `node` is the node's replacement, the very same `Arc` when nothing was
/// deleted, or `None` when the node dissolved. `entries` are orphans that the
/// tree must re-add, and `count_deleted` counts the removed entries.
pub(crate) struct NodeAndEntries<V, G> {
    pub(crate) node: Option<Arc<Node<V, G>>>,
    pub(crate) entries: Vec<Entry<V, G>>,
    pub(crate) count_deleted: usize,
}

impl<V, G> NodeAndEntries<V, G> {
    fn unchanged(node: &Arc<Node<V, G>>) -> Self {
        NodeAndEntries {
            node: Some(Arc::clone(node)),
            entries: Vec::new(),
            count_deleted: 0,
        }
    }
}

impl<V, G> Node<V, G> {
    /// The cached minimum bounding rectangle of this node.
    pub fn mbr(&self) -> Rectangle {
        match self {
            Node::Leaf(leaf) => leaf.mbr,
            Node::NonLeaf(non_leaf) => non_leaf.mbr,
        }
    }

    /// Number of direct items: entries of a leaf, children of a non-leaf.
    pub fn count(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.entries.len(),
            Node::NonLeaf(non_leaf) => non_leaf.children.len(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }
}

impl<V, G> Node<V, G>
where
    V: Clone + PartialEq,
    G: Geometry + Clone + PartialEq,
{
    pub(crate) fn add(&self, entry: Entry<V, G>, context: &Context<V, G>) -> Replacement<V, G> {
        match self {
            Node::Leaf(leaf) => leaf.add(entry, context),
            Node::NonLeaf(non_leaf) => non_leaf.add(entry, context),
        }
    }

    pub(crate) fn delete(
        self: &Arc<Self>,
        entry: &Entry<V, G>,
        all: bool,
        context: &Context<V, G>,
    ) -> NodeAndEntries<V, G> {
        match &**self {
            Node::Leaf(leaf) => leaf.delete(self, entry, all, context),
            Node::NonLeaf(non_leaf) => non_leaf.delete(self, entry, all, context),
        }
    }
}

impl<V, G> HasGeometry for Node<V, G> {
    fn mbr(&self) -> Rectangle {
        Node::mbr(self)
    }
}

impl<V, G: Geometry> Leaf<V, G> {
    pub fn new(entries: Vec<Entry<V, G>>) -> Self {
        let mbr = mbr_of(&entries);
        Leaf { entries, mbr }
    }
}

impl<V, G> Leaf<V, G> {
    pub fn entries(&self) -> &[Entry<V, G>] {
        &self.entries
    }

    pub fn mbr(&self) -> Rectangle {
        self.mbr
    }
}

impl<V, G> Leaf<V, G>
where
    V: Clone + PartialEq,
    G: Geometry + Clone + PartialEq,
{
    fn add(&self, entry: Entry<V, G>, context: &Context<V, G>) -> Replacement<V, G> {
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.extend(self.entries.iter().cloned());
        entries.push(entry);

        let factory = context.factory();
        if entries.len() <= context.max_children() {
            return smallvec![Arc::new(factory.create_leaf(entries))];
        }

        trace!("Splitting leaf of {} entries", entries.len());
        let (group1, group2) =
            split_items(context.splitter(), entries, context.min_children()).into_groups();
        smallvec![
            Arc::new(factory.create_leaf(group1)),
            Arc::new(factory.create_leaf(group2)),
        ]
    }

    fn delete(
        &self,
        this: &Arc<Node<V, G>>,
        entry: &Entry<V, G>,
        all: bool,
        context: &Context<V, G>,
    ) -> NodeAndEntries<V, G> {
        if !self.entries.contains(entry) {
            return NodeAndEntries::unchanged(this);
        }

        let mut remaining = Vec::with_capacity(self.entries.len());
        let mut count_deleted = 0;
        for candidate in &self.entries {
            if candidate == entry && (all || count_deleted == 0) {
                count_deleted += 1;
            } else {
                remaining.push(candidate.clone());
            }
        }

        if remaining.len() >= context.min_children() {
            NodeAndEntries {
                node: Some(Arc::new(context.factory().create_leaf(remaining))),
                entries: Vec::new(),
                count_deleted,
            }
        } else {
            NodeAndEntries {
                node: None,
                entries: remaining,
                count_deleted,
            }
        }
    }
}

impl<V, G> NonLeaf<V, G> {
    /// Creates a non-leaf over `children`, which must not be empty.
    pub fn new(children: Vec<Arc<Node<V, G>>>) -> Self {
        debug_assert!(!children.is_empty(), "a non-leaf node needs children");
        let mbr = mbr_of(&children);
        NonLeaf { children, mbr }
    }

    pub fn children(&self) -> &[Arc<Node<V, G>>] {
        &self.children
    }

    pub fn mbr(&self) -> Rectangle {
        self.mbr
    }
}

impl<V, G> NonLeaf<V, G>
where
    V: Clone + PartialEq,
    G: Geometry + Clone + PartialEq,
{
    fn add(&self, entry: Entry<V, G>, context: &Context<V, G>) -> Replacement<V, G> {
        let last = self.children.len() - 1;
        let selected = context.selector().select(&entry.mbr(), &self.children);
        debug_assert!(
            selected <= last,
            "{:?} selected child {} of {}",
            context.selector(),
            selected,
            self.children.len()
        );
        let index = selected.min(last);

        let replacement = self.children[index].add(entry, context);
        let mut children = Vec::with_capacity(self.children.len() + 1);
        children.extend(self.children[..index].iter().cloned());
        children.extend(replacement);
        children.extend(self.children[index + 1..].iter().cloned());

        let factory = context.factory();
        if children.len() <= context.max_children() {
            return smallvec![Arc::new(factory.create_non_leaf(children))];
        }

        trace!("Splitting non-leaf of {} children", children.len());
        let (group1, group2) =
            split_items(context.splitter(), children, context.min_children()).into_groups();
        smallvec![
            Arc::new(factory.create_non_leaf(group1)),
            Arc::new(factory.create_non_leaf(group2)),
        ]
    }

    fn delete(
        &self,
        this: &Arc<Node<V, G>>,
        entry: &Entry<V, G>,
        all: bool,
        context: &Context<V, G>,
    ) -> NodeAndEntries<V, G> {
        let entry_mbr = entry.mbr();
        let mut children = Vec::with_capacity(self.children.len());
        let mut orphans = Vec::new();
        let mut count_deleted = 0;
        let mut changed = false;

        for child in &self.children {
            // an entry only lives under children whose MBR covers it
            let descend = (all || !changed) && child.mbr().intersects(&entry_mbr);
            if !descend {
                children.push(Arc::clone(child));
                continue;
            }

            let result = child.delete(entry, all, context);
            match result.node {
                Some(node) if Arc::ptr_eq(&node, child) => children.push(node),
                Some(node) => {
                    changed = true;
                    children.push(node);
                }
                None => changed = true,
            }
            orphans.extend(result.entries);
            count_deleted += result.count_deleted;
        }

        if !changed {
            return NodeAndEntries::unchanged(this);
        }

        let node = if children.is_empty() {
            None
        } else {
            Some(Arc::new(context.factory().create_non_leaf(children)))
        };
        NodeAndEntries {
            node,
            entries: orphans,
            count_deleted,
        }
    }
}
