/// Item reader and writer abstractions used by the streaming adapters.
pub mod item;

/// Character streams consumed by the tokenizer.
pub mod stream;
