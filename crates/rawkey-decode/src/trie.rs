//! The sequence trie — which byte prefixes are escape sequences in progress.
//!
//! This is not a general trie with payloads. It answers one question per
//! byte: "does this byte continue a tracked prefix?" Nodes live in an
//! arena and are addressed by [`NodeId`]. Children are created only by
//! [`KeyTrie::insert`], once, while the trie is being built; the decoder
//! uses the read-only [`KeyTrie::child`] lookup.
//!
//! Some nodes carry an [`Anchor`] tag. Crossing a tagged node is what
//! bumps the decoder's depth counter. The standard trie has two:
//!
//! ```text
//! root ─ESC─▶ · ─[─▶ Escape ─1─▶ · ─;─▶ · ─2─▶ Modifier
//! ```
//!
//! The first node tagged with each kind is remembered in [`Anchors`], so
//! callers can get the standard handles back without re-walking a path.
//! Further anchor paths (SS3 arrows, `ESC O`, say) are added through
//! [`KeyTrie::builder`].

use std::collections::BTreeMap;

use crate::keys::{ESCAPE_PREFIX, MODIFIER_PREFIX};

/// Opaque handle to a trie node. Handles compare by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// Tag marking a sequence boundary the decoder counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Reached after `ESC [` — the start of every CSI key.
    Escape,
    /// Reached after `ESC [ 1 ; 2` — the shift-modified CSI prefix.
    Modifier,
}

/// Handles of the anchor nodes, captured when they are tagged.
///
/// Each slot holds the first node tagged with that kind. Adding another
/// path with the same tag leaves the slot alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Anchors {
    pub escape: Option<NodeId>,
    pub modifier: Option<NodeId>,
}

impl Anchors {
    #[must_use]
    pub const fn get(&self, anchor: Anchor) -> Option<NodeId> {
        match anchor {
            Anchor::Escape => self.escape,
            Anchor::Modifier => self.modifier,
        }
    }

    const fn slot(&mut self, anchor: Anchor) -> &mut Option<NodeId> {
        match anchor {
            Anchor::Escape => &mut self.escape,
            Anchor::Modifier => &mut self.modifier,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    children: BTreeMap<u8, NodeId>,
    anchor: Option<Anchor>,
}

/// Arena-backed prefix tree over byte sequences.
#[derive(Debug, Clone)]
pub struct KeyTrie {
    nodes: Vec<Node>,
    anchors: Anchors,
}

impl KeyTrie {
    const ROOT: NodeId = NodeId(0);

    /// An empty trie: just the root, so every byte finalizes at depth 0.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            anchors: Anchors::default(),
        }
    }

    /// The trie the decoder uses by default: arrow keys and shift-arrows.
    #[must_use]
    pub fn standard() -> Self {
        Self::builder()
            .anchor(ESCAPE_PREFIX, Anchor::Escape)
            .anchor(MODIFIER_PREFIX, Anchor::Modifier)
            .build()
    }

    /// Start building a trie from an empty root.
    ///
    /// ```
    /// use rawkey_decode::{Anchor, KeyTrie};
    /// use rawkey_decode::keys::{ESCAPE_PREFIX, MODIFIER_PREFIX};
    ///
    /// let trie = KeyTrie::builder()
    ///     .anchor(ESCAPE_PREFIX, Anchor::Escape)
    ///     .anchor(MODIFIER_PREFIX, Anchor::Modifier)
    ///     .anchor(b"\x1bO", Anchor::Escape)
    ///     .build();
    /// assert!(trie.find(b"\x1bO").is_some());
    /// ```
    #[must_use]
    pub fn builder() -> KeyTrieBuilder {
        KeyTrieBuilder { trie: Self::new() }
    }

    /// The root node, where every sequence starts.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        Self::ROOT
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Walk `path` from the root, creating missing nodes, and return the
    /// node at its end.
    ///
    /// Idempotent: inserting a path that already exists returns the same
    /// handle and creates nothing.
    pub fn insert(&mut self, path: &[u8]) -> NodeId {
        let mut node = Self::ROOT;
        for &byte in path {
            node = match self.nodes[node.0].children.get(&byte) {
                Some(&next) => next,
                None => {
                    let next = NodeId(self.nodes.len());
                    self.nodes.push(Node::default());
                    self.nodes[node.0].children.insert(byte, next);
                    next
                }
            };
        }
        node
    }

    /// Insert `path` and tag its end node with `anchor`.
    pub fn insert_anchor(&mut self, path: &[u8], anchor: Anchor) -> NodeId {
        let node = self.insert(path);
        self.mark(node, anchor);
        node
    }

    /// Tag an existing node. A later tag replaces an earlier one.
    ///
    /// A handle this trie never handed out is ignored.
    pub fn mark(&mut self, node: NodeId, anchor: Anchor) {
        let Some(entry) = self.nodes.get_mut(node.0) else {
            tracing::debug!(message = "mark on unknown trie node ignored", node = node.0);
            return;
        };
        let previous = entry.anchor.replace(anchor);

        if let Some(old) = previous.filter(|&old| old != anchor) {
            if self.anchors.get(old) == Some(node) {
                let next = self.scan(old);
                *self.anchors.slot(old) = next;
            }
        }
        self.anchors.slot(anchor).get_or_insert(node);
    }

    /// The child of `node` reached by `byte`, if that path was inserted.
    ///
    /// Never creates anything.
    #[must_use]
    pub fn child(&self, node: NodeId, byte: u8) -> Option<NodeId> {
        self.nodes.get(node.0)?.children.get(&byte).copied()
    }

    /// The anchor tag on `node`, if any.
    #[must_use]
    pub fn anchor(&self, node: NodeId) -> Option<Anchor> {
        self.nodes.get(node.0)?.anchor
    }

    /// Follow `path` from the root without creating nodes.
    #[must_use]
    pub fn find(&self, path: &[u8]) -> Option<NodeId> {
        path.iter()
            .try_fold(Self::ROOT, |node, &byte| self.child(node, byte))
    }

    /// The captured node for `anchor`, if one was tagged.
    #[must_use]
    pub const fn anchor_node(&self, anchor: Anchor) -> Option<NodeId> {
        self.anchors.get(anchor)
    }

    /// Every captured anchor handle.
    #[must_use]
    pub const fn anchors(&self) -> Anchors {
        self.anchors
    }

    fn scan(&self, anchor: Anchor) -> Option<NodeId> {
        self.nodes
            .iter()
            .position(|n| n.anchor == Some(anchor))
            .map(NodeId)
    }
}

/// Builder returned by [`KeyTrie::builder`].
#[derive(Debug, Clone)]
#[must_use]
pub struct KeyTrieBuilder {
    trie: KeyTrie,
}

impl KeyTrieBuilder {
    /// Add an untagged path.
    pub fn path(mut self, path: &[u8]) -> Self {
        self.trie.insert(path);
        self
    }

    /// Add a path whose end node carries `anchor`.
    pub fn anchor(mut self, path: &[u8], anchor: Anchor) -> Self {
        self.trie.insert_anchor(path, anchor);
        self
    }

    pub fn build(self) -> KeyTrie {
        self.trie
    }
}

impl Default for KeyTrie {
    fn default() -> Self {
        Self::standard()
    }
}
