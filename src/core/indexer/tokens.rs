//! Token estimation.
//!
//! The chunker and policy selector only need an estimate that is
//! deterministic and monotonic: appending text never lowers the
//! count. Swap in a real tokenizer by implementing [`TokenCounter`].

/// Counts tokens in a string
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// Heuristic counter tuned for source code.
///
/// - ASCII alphanumeric runs (including `_`) cost one token per four
///   characters, rounded up
/// - every other non-whitespace character costs one token
/// - whitespace is free
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTokenCounter;

const CHARS_PER_WORD_TOKEN: usize = 4;

impl TokenCounter for ApproxTokenCounter {
    fn count(&self, text: &str) -> usize {
        let mut tokens = 0usize;
        let mut run = 0usize;

        for ch in text.chars() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                run += 1;
                continue;
            }
            tokens += run.div_ceil(CHARS_PER_WORD_TOKEN);
            run = 0;
            if !ch.is_whitespace() {
                tokens += 1;
            }
        }

        tokens + run.div_ceil(CHARS_PER_WORD_TOKEN)
    }
}

/// One token per character. Handy for exact budgets in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenCounter;

impl TokenCounter for CharTokenCounter {
    fn count(&self, text: &str) -> usize {
        text.chars().count()
    }
}
