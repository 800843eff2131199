//! Token-aware, UTF-8 safe chunking.
//!
//! Content is cut into units (lines, or runs ending at a structural
//! separator), then units are packed into chunks under two budgets:
//! estimated tokens and characters. Consecutive chunks share an
//! overlap tail of whole units. A unit that alone exceeds a budget
//! is re-split character by character.
//!
//! Chunks are produced lazily by the [`Chunks`] iterator, so a
//! caller can stop between chunks (for example on cancellation)
//! without paying for the rest of the file.
//!
//! # Example
//!
//! ```
//! use tessera::core::indexer::TokenAwareChunker;
//! use tessera::core::types::{ChunkPolicy, SplitMode};
//!
//! let chunker = TokenAwareChunker::new();
//! let policy = ChunkPolicy::new(512, 64, 4000, SplitMode::LineBased);
//! let chunks: Vec<_> = chunker.chunks("fn main() {}\n", policy).collect();
//!
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].text, "fn main() {}\n");
//! ```

use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::ops::Range;

use crate::core::indexer::tokens::{ApproxTokenCounter, TokenCounter};
use crate::core::types::{ChunkPolicy, SplitMode};

/// Characters that end a unit in [`SplitMode::SeparatorBased`]
pub const STRUCTURAL_SEPARATORS: &[char] = &[
    '\n', '\t', ',', ';', ':', '|', '=', '.', '{', '}', '(', ')', '[', ']', '-',
];

/// One emitted chunk.
///
/// Offsets are byte offsets into the line-ending-normalized content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// The chunk text
    pub text: String,

    /// Byte offset where the chunk starts
    pub start_offset: usize,

    /// Byte offset where the chunk ends (exclusive)
    pub end_offset: usize,

    /// Length in bytes of the leading text repeated from the
    /// previous chunk
    pub overlap_bytes: usize,
}

impl TextChunk {
    /// The part of the chunk not shared with the previous chunk
    pub fn fresh_text(&self) -> &str {
        &self.text[self.overlap_bytes..]
    }
}

/// Replace `\r\n` and lone `\r` with `\n`
pub fn normalize_line_endings(content: &str) -> String {
    if !content.contains('\r') {
        return content.to_string();
    }
    content.replace("\r\n", "\n").replace('\r', "\n")
}

/// Splits content into budgeted chunks
#[derive(Debug, Clone, Default)]
pub struct TokenAwareChunker<C: TokenCounter = ApproxTokenCounter> {
    counter: C,
}

impl TokenAwareChunker<ApproxTokenCounter> {
    /// Create a chunker with the default token estimator
    pub fn new() -> Self {
        Self {
            counter: ApproxTokenCounter,
        }
    }
}

impl<C: TokenCounter> TokenAwareChunker<C> {
    pub fn with_counter(counter: C) -> Self {
        Self { counter }
    }

    /// Lazily chunk `content` under `policy`.
    ///
    /// Empty or whitespace-only content yields no chunks.
    pub fn chunks(&self, content: &str, policy: ChunkPolicy) -> Chunks<'_, C> {
        let text = normalize_line_endings(content);
        let finished = text.trim().is_empty();

        Chunks {
            counter: &self.counter,
            policy: policy.clamped(),
            text,
            pos: 0,
            acc: VecDeque::new(),
            acc_tokens: 0,
            acc_chars: 0,
            acc_overlap_bytes: 0,
            pending: None,
            oversized: None,
            finished,
        }
    }
}

#[derive(Debug, Clone)]
struct Unit {
    start: usize,
    end: usize,
    tokens: usize,
    chars: usize,
}

/// Lazy chunk sequence returned by [`TokenAwareChunker::chunks`]
pub struct Chunks<'a, C: TokenCounter> {
    counter: &'a C,
    policy: ChunkPolicy,
    text: String,

    /// Start of the next unit to read
    pos: usize,

    acc: VecDeque<Unit>,
    acc_tokens: usize,
    acc_chars: usize,
    acc_overlap_bytes: usize,

    /// Accumulator flushed ahead of an oversized unit
    pending: Option<TextChunk>,

    /// Remainder of an oversized unit still being re-split
    oversized: Option<Range<usize>>,

    finished: bool,
}

impl<C: TokenCounter> Chunks<'_, C> {
    /// The policy in effect after clamping
    pub fn policy(&self) -> ChunkPolicy {
        self.policy
    }

    fn next_unit(&mut self) -> Option<Unit> {
        if self.pos >= self.text.len() {
            return None;
        }

        let start = self.pos;
        let rest = &self.text[start..];
        let end = match self.policy.mode {
            SplitMode::LineBased => rest.find('\n').map(|i| start + i + 1),
            SplitMode::SeparatorBased => rest
                .find(STRUCTURAL_SEPARATORS)
                .map(|i| start + i + rest[i..].chars().next().map_or(1, char::len_utf8)),
        }
        .unwrap_or(self.text.len());

        self.pos = end;
        let slice = &self.text[start..end];
        Some(Unit {
            start,
            end,
            tokens: self.counter.count(slice),
            chars: slice.chars().count(),
        })
    }

    fn push_unit(&mut self, unit: Unit) {
        self.acc_tokens += unit.tokens;
        self.acc_chars += unit.chars;
        self.acc.push_back(unit);
    }

    fn accumulated(&self) -> Option<TextChunk> {
        let (first, last) = (self.acc.front()?, self.acc.back()?);
        Some(TextChunk {
            text: self.text[first.start..last.end].to_string(),
            start_offset: first.start,
            end_offset: last.end,
            overlap_bytes: self.acc_overlap_bytes,
        })
    }

    fn clear_accumulator(&mut self) {
        self.acc.clear();
        self.acc_tokens = 0;
        self.acc_chars = 0;
        self.acc_overlap_bytes = 0;
    }

    /// Emit the accumulator and keep its overlap tail.
    ///
    /// The tail is the longest run of trailing units whose tokens fit
    /// in `overlap_tokens`, never the whole accumulator, and trimmed
    /// so that tail plus `incoming` still fits both budgets.
    fn emit_with_overlap(&mut self, incoming: &Unit) -> Option<TextChunk> {
        let emitted = self.accumulated()?;

        let mut keep = 0;
        let mut tail_tokens = 0;
        let mut tail_chars = 0;
        if self.policy.overlap_tokens > 0 {
            for unit in self.acc.iter().skip(1).rev() {
                let tokens = tail_tokens + unit.tokens;
                let chars = tail_chars + unit.chars;
                if tokens > self.policy.overlap_tokens
                    || tokens + incoming.tokens > self.policy.max_tokens
                    || chars + incoming.chars > self.policy.hard_max_chars
                {
                    break;
                }
                tail_tokens = tokens;
                tail_chars = chars;
                keep += 1;
            }
        }

        let stale = self.acc.len() - keep;
        self.acc.drain(..stale);
        self.acc_tokens = tail_tokens;
        self.acc_chars = tail_chars;
        self.acc_overlap_bytes = match (self.acc.front(), self.acc.back()) {
            (Some(first), Some(last)) => last.end - first.start,
            _ => 0,
        };

        Some(emitted)
    }

    /// Cut the next piece off an oversized unit
    fn split_oversized(&mut self, range: Range<usize>) -> TextChunk {
        let slice = &self.text[range.clone()];

        // Byte end of each prefix of 1..=limit characters
        let ends: Vec<usize> = slice
            .char_indices()
            .skip(1)
            .map(|(i, _)| i)
            .chain(std::iter::once(slice.len()))
            .take(self.policy.hard_max_chars)
            .collect();

        // Token counts are monotonic, so the largest fitting prefix
        // can be found by binary search
        let fits = |n: usize| self.counter.count(&slice[..ends[n - 1]]) <= self.policy.max_tokens;
        let (mut lo, mut hi) = (1, ends.len());
        while lo < hi {
            let mid = lo + (hi - lo).div_ceil(2);
            if fits(mid) {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }

        let cut = range.start + ends[lo - 1];
        if cut < range.end {
            self.oversized = Some(cut..range.end);
        }

        TextChunk {
            text: self.text[range.start..cut].to_string(),
            start_offset: range.start,
            end_offset: cut,
            overlap_bytes: 0,
        }
    }
}

impl<C: TokenCounter> Iterator for Chunks<'_, C> {
    type Item = TextChunk;

    fn next(&mut self) -> Option<TextChunk> {
        loop {
            if let Some(chunk) = self.pending.take() {
                return Some(chunk);
            }

            if let Some(range) = self.oversized.take() {
                return Some(self.split_oversized(range));
            }

            if self.finished {
                return None;
            }

            let Some(unit) = self.next_unit() else {
                self.finished = true;
                let last = self.accumulated();
                self.clear_accumulator();
                return last;
            };

            if unit.tokens > self.policy.max_tokens || unit.chars > self.policy.hard_max_chars {
                self.pending = self.accumulated();
                self.clear_accumulator();
                self.oversized = Some(unit.start..unit.end);
                continue;
            }

            let over_budget = self.acc_tokens + unit.tokens > self.policy.max_tokens
                || self.acc_chars + unit.chars > self.policy.hard_max_chars;

            if over_budget && !self.acc.is_empty() {
                let emitted = self.emit_with_overlap(&unit);
                self.push_unit(unit);
                if emitted.is_some() {
                    return emitted;
                }
                continue;
            }

            self.push_unit(unit);
        }
    }
}

impl<C: TokenCounter> FusedIterator for Chunks<'_, C> {}
