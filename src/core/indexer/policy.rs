//! Chunk policy selection.
//!
//! Picks a [`ChunkPolicy`] from a file's path and a sample of its
//! content. Dense formats (solution files, JSON, GUID-laden
//! manifests) tokenize far more tightly than prose or code, so they
//! get a small separator-based budget. License and notice files get
//! a small line-based budget. Everything else uses the configured
//! defaults.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::indexer::language;
use crate::core::indexer::tokens::{ApproxTokenCounter, TokenCounter};
use crate::core::types::{ChunkPolicy, SplitMode};

/// GUID-shaped substrings needed to call content structured
pub const GUID_DENSITY_THRESHOLD: usize = 3;

/// Punctuation/symbol share of the sample that marks dense content
pub const PUNCTUATION_RATIO_THRESHOLD: f64 = 0.18;

/// Estimated tokens per character that marks dense content
pub const TOKENS_PER_CHAR_THRESHOLD: f64 = 0.55;

/// Default sample length in characters
pub const DEFAULT_SAMPLE_CHARS: usize = 8000;

const LICENSE_POLICY: ChunkPolicy = ChunkPolicy {
    max_tokens: 256,
    overlap_tokens: 16,
    hard_max_chars: 2000,
    mode: SplitMode::LineBased,
};

const DENSE_POLICY: ChunkPolicy = ChunkPolicy {
    max_tokens: 128,
    overlap_tokens: 8,
    hard_max_chars: 1400,
    mode: SplitMode::SeparatorBased,
};

static GUID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}")
        .unwrap()
});

/// Signals computed on a content sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContentSignals {
    pub structured_extension: bool,
    pub guid_count: usize,
    pub punctuation_ratio: f64,
    pub tokens_per_char: f64,
}

impl ContentSignals {
    /// True if any structured or punctuation-heavy signal fires
    pub fn is_dense(&self) -> bool {
        self.structured_extension
            || self.guid_count >= GUID_DENSITY_THRESHOLD
            || self.punctuation_ratio >= PUNCTUATION_RATIO_THRESHOLD
            || self.tokens_per_char >= TOKENS_PER_CHAR_THRESHOLD
    }
}

/// Chooses chunk policies from configured defaults
#[derive(Debug, Clone)]
pub struct ChunkSpecSelector<C: TokenCounter = ApproxTokenCounter> {
    defaults: ChunkPolicy,
    sample_chars: usize,
    counter: C,
}

impl ChunkSpecSelector<ApproxTokenCounter> {
    /// Create a selector with the default token estimator
    pub fn new(max_tokens: usize, overlap_tokens: usize, hard_max_chars: usize) -> Self {
        Self::with_counter(
            max_tokens,
            overlap_tokens,
            hard_max_chars,
            ApproxTokenCounter,
        )
    }
}

impl<C: TokenCounter> ChunkSpecSelector<C> {
    pub fn with_counter(
        max_tokens: usize,
        overlap_tokens: usize,
        hard_max_chars: usize,
        counter: C,
    ) -> Self {
        Self {
            defaults: ChunkPolicy::new(
                max_tokens,
                overlap_tokens,
                hard_max_chars,
                SplitMode::LineBased,
            ),
            sample_chars: DEFAULT_SAMPLE_CHARS,
            counter,
        }
    }

    /// Override how many leading characters are inspected
    pub fn with_sample_chars(mut self, sample_chars: usize) -> Self {
        self.sample_chars = sample_chars.max(1);
        self
    }

    /// Defaults after clamping
    pub fn defaults(&self) -> ChunkPolicy {
        self.defaults
    }

    /// The leading slice of `content` that signals are computed on
    pub fn sample<'a>(&self, content: &'a str) -> &'a str {
        match content.char_indices().nth(self.sample_chars) {
            Some((idx, _)) => &content[..idx],
            None => content,
        }
    }

    /// Compute classification signals on the content sample
    pub fn signals(&self, extension: Option<&str>, content: &str) -> ContentSignals {
        let sample = self.sample(content);
        let total_chars = sample.chars().count();

        let structured_extension = extension
            .map(language::is_structured_extension)
            .unwrap_or(false);

        let guid_count = GUID_PATTERN.find_iter(sample).count();

        let (punctuation_ratio, tokens_per_char) = if total_chars == 0 {
            (0.0, 0.0)
        } else {
            let symbols = sample
                .chars()
                .filter(|c| c.is_ascii_punctuation() && *c != '_')
                .count();
            let tokens = self.counter.count(sample);
            (
                symbols as f64 / total_chars as f64,
                tokens as f64 / total_chars as f64,
            )
        };

        ContentSignals {
            structured_extension,
            guid_count,
            punctuation_ratio,
            tokens_per_char,
        }
    }

    /// Select a policy for a file.
    ///
    /// Pure: the same path, extension and content always produce the
    /// same policy.
    pub fn select(&self, path: &str, extension: Option<&str>, content: &str) -> ChunkPolicy {
        if language::is_license_file(path) {
            return self.shrink_to(LICENSE_POLICY);
        }

        let signals = self.signals(extension, content);
        if signals.is_dense() {
            tracing::debug!(
                "Dense content in {} (guids={}, punct={:.2}, tpc={:.2}, structured={})",
                path,
                signals.guid_count,
                signals.punctuation_ratio,
                signals.tokens_per_char,
                signals.structured_extension
            );
            return self.shrink_to(DENSE_POLICY);
        }

        self.defaults
    }

    /// Cap the defaults at a forced policy's budgets and take its mode
    fn shrink_to(&self, cap: ChunkPolicy) -> ChunkPolicy {
        ChunkPolicy::new(
            self.defaults.max_tokens.min(cap.max_tokens),
            self.defaults.overlap_tokens.min(cap.overlap_tokens),
            self.defaults.hard_max_chars.min(cap.hard_max_chars),
            cap.mode,
        )
    }
}
