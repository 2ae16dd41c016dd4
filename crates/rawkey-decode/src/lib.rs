//! # rawkey-decode — Key sequence decoding for rawkey
//!
//! Turns the raw bytes a terminal produces in raw mode into one value per
//! physical key-press:
//!
//! - **[`code`]** — `Code`, the composite integer a byte sequence collapses to
//! - **[`trie`]** — `KeyTrie`, the prefix tree of tracked escape sequences
//! - **[`decoder`]** — `Decoder`, the byte-by-byte state machine
//! - **[`keymap`]** — `KeyMap`, the caller's code → value filter/remap table
//! - **[`keys`]** — byte constants, `Direction`, and human-readable key names
//! - **[`probe`]** — diagnostic echo of decoded codes with idle-gap breaks
//!
//! Bytes come from any [`rawkey_term::ByteSource`].

pub mod code;
pub mod decoder;
pub mod keymap;
pub mod keys;
pub mod probe;
pub mod trie;

pub use code::Code;
pub use decoder::{Decoder, Mapped};
pub use keymap::KeyMap;
pub use keys::Direction;
pub use probe::Probe;
pub use trie::{Anchor, Anchors, KeyTrie, KeyTrieBuilder, NodeId};
