//! The decoder state machine.
//!
//! The decoder walks the [`KeyTrie`] one byte at a time with a cursor of
//! `(node, depth)`, starting at `(root, 0)`:
//!
//! 1. Look up the child of `node` for byte `b`.
//! 2. If the child carries an [`Anchor`](crate::trie::Anchor) tag,
//!    `depth += 1`.
//! 3. If the child exists, move the cursor onto it and wait for the next
//!    byte. Nothing is emitted.
//! 4. Otherwise the sequence is over: emit `b << (8 * depth)` and reset
//!    the cursor to `(root, 0)`.
//!
//! A byte with no child at the root (almost every printable key) comes
//! straight out as itself. A sequence that starts down a tracked prefix
//! and then diverges finalizes on the diverging byte with whatever depth
//! it had reached. Terminals that send sequences outside the tracked set
//! can therefore alias with other codes. That is accepted, not reported.
//!
//! There is no timeout: a lone `ESC` waits for the next byte. The decoded
//! stream ends only when the byte source does.

use rawkey_term::ByteSource;

use crate::code::Code;
use crate::keymap::KeyMap;
use crate::trie::{KeyTrie, NodeId};

/// Pull-based key decoder over a [`ByteSource`].
///
/// Iterating yields every finalized [`Code`] (pass-through mode). Call
/// [`mapped`](Self::mapped) to filter and remap through a [`KeyMap`]
/// instead.
///
/// # Example
///
/// ```
/// use rawkey_decode::{Code, Decoder};
/// use rawkey_term::ScriptedSource;
///
/// let bytes = ScriptedSource::new(*b"q\x1b[A");
/// let codes: Vec<Code> = Decoder::new(bytes).collect();
/// assert_eq!(codes, vec![Code::from(b'q'), Code::new(b'A', 1)]);
/// ```
#[derive(Debug)]
pub struct Decoder<S> {
    source: S,
    trie: KeyTrie,
    /// Current trie node; the root when idle.
    node: NodeId,
    /// Anchors crossed since the last reset.
    depth: u8,
}

impl<S> Decoder<S> {
    /// A decoder over `source` using [`KeyTrie::standard`].
    pub fn new(source: S) -> Self {
        Self::with_trie(source, KeyTrie::standard())
    }

    /// A decoder over `source` using a custom trie.
    pub fn with_trie(source: S, trie: KeyTrie) -> Self {
        let node = trie.root();
        Self {
            source,
            trie,
            node,
            depth: 0,
        }
    }

    /// Advance the state machine by one byte.
    ///
    /// Returns the finalized code when `byte` ends a sequence, `None`
    /// while a sequence is still in progress.
    pub fn feed(&mut self, byte: u8) -> Option<Code> {
        if let Some(next) = self.trie.child(self.node, byte) {
            if self.trie.anchor(next).is_some() {
                self.depth = self.depth.saturating_add(1);
            }
            self.node = next;
            return None;
        }

        let code = Code::new(byte, self.depth);
        self.reset();
        Some(code)
    }

    /// Drop any partial sequence and return to `(root, 0)`.
    pub fn reset(&mut self) {
        self.node = self.trie.root();
        self.depth = 0;
    }

    /// Whether no sequence is in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.node == self.trie.root()
    }

    /// Anchors crossed by the sequence in progress.
    #[must_use]
    pub const fn depth(&self) -> u8 {
        self.depth
    }

    #[must_use]
    pub const fn trie(&self) -> &KeyTrie {
        &self.trie
    }

    /// Give the byte source back. Any partial sequence is lost.
    pub fn into_source(self) -> S {
        self.source
    }
}

impl<S: ByteSource> Decoder<S> {
    /// Block until the next code is finalized.
    ///
    /// Returns `None` when the source ends; a sequence cut off by the end
    /// of the source is discarded.
    pub fn next_code(&mut self) -> Option<Code> {
        while let Some(byte) = self.source.next_byte() {
            if let Some(code) = self.feed(byte) {
                tracing::trace!(message = "decoded", %code);
                return Some(code);
            }
        }

        if !self.is_idle() {
            tracing::debug!(
                message = "source ended mid-sequence",
                depth = self.depth
            );
            self.reset();
        }
        None
    }

    /// Filter and remap decoded codes through `map`.
    ///
    /// Codes present in `map` come out as `&value`; all others are
    /// silently dropped.
    pub fn mapped<T>(self, map: &KeyMap<T>) -> Mapped<'_, S, T> {
        Mapped { decoder: self, map }
    }
}

impl<S: ByteSource> Iterator for Decoder<S> {
    type Item = Code;

    fn next(&mut self) -> Option<Code> {
        self.next_code()
    }
}

/// Decoder in filter-and-remap mode. See [`Decoder::mapped`].
#[derive(Debug)]
pub struct Mapped<'m, S, T> {
    decoder: Decoder<S>,
    map: &'m KeyMap<T>,
}

impl<S, T> Mapped<'_, S, T> {
    /// Back to pass-through mode.
    pub fn into_inner(self) -> Decoder<S> {
        self.decoder
    }
}

impl<'m, S: ByteSource, T> Iterator for Mapped<'m, S, T> {
    type Item = &'m T;

    fn next(&mut self) -> Option<&'m T> {
        loop {
            let code = self.decoder.next_code()?;
            if let Some(value) = self.map.get(code) {
                return Some(value);
            }
            tracing::trace!(message = "unmapped code dropped", %code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{DOWN, ESC, L_BRACKET, LEFT, ONE, RIGHT, SEMI, TWO, UP};
    use crate::keys::Direction;
    use crate::trie::Anchor;
    use pretty_assertions::assert_eq;
    use rawkey_term::{CancelToken, IsolatedSource, ScriptedSource};
    use test_case::test_case;

    /// Helper: decode a whole byte string in pass-through mode.
    fn decode(bytes: &[u8]) -> Vec<u32> {
        Decoder::new(ScriptedSource::new(bytes))
            .map(Code::value)
            .collect()
    }

    fn arrow(x: u8) -> Vec<u8> {
        vec![ESC, L_BRACKET, x]
    }

    fn shift_arrow(x: u8) -> Vec<u8> {
        vec![ESC, L_BRACKET, ONE, SEMI, TWO, x]
    }

    /// One letter followed by all four arrows.
    fn interleaved() -> Vec<u8> {
        let mut bytes = vec![b'a'];
        for x in [UP, DOWN, RIGHT, LEFT] {
            bytes.extend(arrow(x));
        }
        bytes
    }

    // ── Plain bytes ─────────────────────────────────────────────────────

    #[test]
    fn every_untracked_byte_is_itself() {
        for b in (0..=u8::MAX).filter(|&b| b != ESC) {
            assert_eq!(decode(&[b]), vec![u32::from(b)], "byte {b:#x}");
        }
    }

    #[test]
    fn consecutive_plain_bytes() {
        assert_eq!(decode(b"abc"), vec![0x61, 0x62, 0x63]);
    }

    // ── Tracked sequences ───────────────────────────────────────────────

    #[test_case(UP ; "up")]
    #[test_case(DOWN ; "down")]
    #[test_case(RIGHT ; "right")]
    #[test_case(LEFT ; "left")]
    fn arrow_is_final_byte_shifted_once(x: u8) {
        assert_eq!(decode(&arrow(x)), vec![u32::from(x) << 8]);
    }

    #[test_case(UP ; "up")]
    #[test_case(DOWN ; "down")]
    #[test_case(RIGHT ; "right")]
    #[test_case(LEFT ; "left")]
    fn shift_arrow_is_final_byte_shifted_twice(x: u8) {
        assert_eq!(decode(&shift_arrow(x)), vec![u32::from(x) << 16]);
    }

    #[test]
    fn arrow_codes_are_distinct() {
        let mut codes: Vec<u32> = [UP, DOWN, RIGHT, LEFT]
            .into_iter()
            .flat_map(|x| decode(&arrow(x)))
            .collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 4);
    }

    #[test]
    fn other_csi_finals_shift_once() {
        assert_eq!(decode(b"\x1b[Z"), vec![u32::from(b'Z') << 8]);
        assert_eq!(decode(b"\x1b[H"), vec![u32::from(b'H') << 8]);
    }

    // ── Divergence ──────────────────────────────────────────────────────

    #[test]
    fn escape_then_non_bracket_finalizes_at_depth_zero() {
        // ESC is swallowed; the diverging byte comes out unshifted.
        assert_eq!(decode(b"\x1bx"), vec![u32::from(b'x')]);
    }

    #[test]
    fn escape_escape_finalizes_on_second_escape() {
        assert_eq!(decode(&[ESC, ESC]), vec![u32::from(ESC)]);
    }

    #[test]
    fn divergence_after_first_anchor_keeps_depth() {
        // ESC [ 1 x: crossed Escape, not Modifier.
        assert_eq!(decode(b"\x1b[1x"), vec![u32::from(b'x') << 8]);
        // ESC [ 1 ; 5 A is Ctrl-Up on xterm, outside the tracked set.
        assert_eq!(decode(b"\x1b[1;5A"), vec![u32::from(b'5') << 8, 0x41]);
    }

    #[test]
    fn divergence_after_second_anchor_keeps_depth() {
        assert_eq!(decode(b"\x1b[1;2;"), vec![u32::from(SEMI) << 16]);
    }

    #[test]
    fn next_sequence_starts_at_root() {
        let mut bytes = arrow(UP);
        bytes.extend(b"z");
        bytes.extend(shift_arrow(LEFT));
        assert_eq!(
            decode(&bytes),
            vec![u32::from(UP) << 8, u32::from(b'z'), u32::from(LEFT) << 16]
        );
    }

    #[test]
    fn lone_escape_waits() {
        let mut decoder = Decoder::new(ScriptedSource::default());
        assert_eq!(decoder.feed(ESC), None);
        assert!(!decoder.is_idle());
        assert_eq!(decoder.feed(L_BRACKET), None);
        assert_eq!(decoder.depth(), 1);
        assert_eq!(decoder.feed(UP), Some(Code::new(UP, 1)));
        assert!(decoder.is_idle());
        assert_eq!(decoder.depth(), 0);
    }

    #[test]
    fn truncated_sequence_is_discarded_at_end_of_source() {
        assert_eq!(decode(b"a\x1b["), vec![0x61]);
    }

    // ── Sessions ────────────────────────────────────────────────────────

    #[test]
    fn fresh_session_does_not_inherit_partial_state() {
        let mut first = Decoder::new(ScriptedSource::new(vec![ESC, L_BRACKET, ONE]));
        assert_eq!(first.next_code(), None);
        drop(first);

        let mut second = Decoder::new(ScriptedSource::new(*b"A"));
        assert_eq!(second.next_code(), Some(Code::from(b'A')));
    }

    #[test]
    fn reset_drops_partial_sequence() {
        let mut decoder = Decoder::new(ScriptedSource::default());
        decoder.feed(ESC);
        decoder.feed(L_BRACKET);
        decoder.reset();
        assert!(decoder.is_idle());
        assert_eq!(decoder.feed(UP), Some(Code::from(UP)));
    }

    // ── Mapping ─────────────────────────────────────────────────────────

    #[test]
    fn pass_through_emits_everything() {
        assert_eq!(
            decode(&interleaved()),
            vec![0x61, 0x4100, 0x4200, 0x4300, 0x4400]
        );
    }

    #[test]
    fn mapped_drops_unmapped_and_keeps_order() {
        let map = Direction::arrows();
        let dirs: Vec<Direction> = Decoder::new(ScriptedSource::new(interleaved()))
            .mapped(&map)
            .copied()
            .collect();
        assert_eq!(
            dirs,
            vec![
                Direction::Up,
                Direction::Down,
                Direction::Right,
                Direction::Left
            ]
        );
    }

    #[test]
    fn mapped_with_plain_keys() {
        let map = KeyMap::new().with(b'q', "quit").with(Code::new(UP, 2), "max");
        let out: Vec<&str> = Decoder::new(ScriptedSource::new(b"xq\x1b[A\x1b[1;2A".to_vec()))
            .mapped(&map)
            .copied()
            .collect();
        assert_eq!(out, vec!["quit", "max"]);
    }

    #[test]
    fn empty_map_drops_everything() {
        let map: KeyMap<()> = KeyMap::new();
        let count = Decoder::new(ScriptedSource::new(interleaved()))
            .mapped(&map)
            .count();
        assert_eq!(count, 0);
    }

    #[test]
    fn into_inner_returns_to_pass_through() {
        let map = Direction::arrows();
        let mut mapped = Decoder::new(ScriptedSource::new(interleaved())).mapped(&map);
        assert_eq!(mapped.next(), Some(&Direction::Up));
        let rest: Vec<u32> = mapped.into_inner().map(Code::value).collect();
        assert_eq!(rest, vec![0x4200, 0x4300, 0x4400]);
    }

    // ── Custom tries ────────────────────────────────────────────────────

    #[test]
    fn empty_trie_passes_escape_through() {
        let decoder = Decoder::with_trie(ScriptedSource::new(arrow(UP)), KeyTrie::new());
        let codes: Vec<u32> = decoder.map(Code::value).collect();
        assert_eq!(codes, vec![u32::from(ESC), u32::from(L_BRACKET), u32::from(UP)]);
    }

    #[test]
    fn extra_anchor_counts() {
        // SS3 arrows: ESC O A.
        let mut trie = KeyTrie::standard();
        trie.insert_anchor(b"\x1bO", Anchor::Escape);
        let codes: Vec<u32> = Decoder::with_trie(ScriptedSource::new(*b"\x1bOA"), trie)
            .map(Code::value)
            .collect();
        assert_eq!(codes, vec![0x4100]);
    }

    // ── Isolated source end-to-end ──────────────────────────────────────

    #[test]
    fn decodes_through_isolated_source() {
        let cancel = CancelToken::new();
        let source = IsolatedSource::spawn(ScriptedSource::new(interleaved()), cancel).unwrap();
        let codes: Vec<u32> = Decoder::new(source).map(Code::value).collect();
        assert_eq!(codes, vec![0x61, 0x4100, 0x4200, 0x4300, 0x4400]);
    }
}
