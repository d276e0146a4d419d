//! Stand-ins for the model runtime.
//!
//! Nothing here loads or runs a model. Each function only reports, through
//! `tracing`, what the real runtime would do, so the front end can be driven
//! end to end.

use std::time::Duration;

/// A model handle returned by [`load_model`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockModel {
    /// Model name derived from its path.
    pub name: String,
    /// Context window in tokens.
    pub context_len: usize,
}

/// Default context window of a mock model.
pub const DEFAULT_CONTEXT_LEN: usize = 4096;

/// "Loads" the model at `path`.
pub fn load_model(path: &str) -> MockModel {
    let name = path
        .rsplit('/')
        .next()
        .and_then(|file| file.split('.').next())
        .filter(|name| !name.is_empty())
        .unwrap_or("mock")
        .to_string();
    tracing::info!(model = %name, context_len = DEFAULT_CONTEXT_LEN, "model loaded (mock)");
    MockModel {
        name,
        context_len: DEFAULT_CONTEXT_LEN,
    }
}

/// "Generates" a completion for `prompt`.
pub fn generate(model: &MockModel, prompt: &str) -> String {
    let tokens = prompt.split_whitespace().count();
    tracing::debug!(model = %model.name, tokens, "prompt tokenized (mock)");
    if tokens > model.context_len {
        tracing::warn!(tokens, limit = model.context_len, "prompt exceeds context window");
    }
    format!("[{}] mock completion for: {prompt}", model.name)
}

/// A fixed amount of busy work, standing in for a compute benchmark.
pub fn compute_workload(iterations: u64) -> (u64, Duration) {
    let start = std::time::Instant::now();
    let checksum = (0..iterations).fold(0u64, |acc, i| acc.wrapping_mul(31).wrapping_add(i));
    (checksum, start.elapsed())
}
