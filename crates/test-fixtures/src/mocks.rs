//! In-process stand-ins for the AI and mail capabilities.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use storesync_core::errors::{
    EmbeddingError, GenerationError, StoreSyncResult, TransportError,
};
use storesync_core::traits::{IMailTransport, ITextCompleter, ITextEmbedder, OutboundEmail};

/// Returns queued responses in order, then repeats the fallback response.
/// Records every prompt pair it receives.
pub struct ScriptedCompleter {
    responses: Mutex<VecDeque<String>>,
    fallback: String,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedCompleter {
    pub fn new(fallback: &str) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            fallback: fallback.to_string(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_responses(fallback: &str, responses: &[&str]) -> Self {
        let completer = Self::new(fallback);
        completer
            .responses
            .lock()
            .unwrap()
            .extend(responses.iter().map(|r| r.to_string()));
        completer
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// All `(system, user)` prompt pairs received so far.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_user_prompt(&self) -> Option<String> {
        self.calls.lock().unwrap().last().map(|(_, user)| user.clone())
    }
}

impl ITextCompleter for ScriptedCompleter {
    fn complete(&self, system_prompt: &str, user_prompt: &str) -> StoreSyncResult<String> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| self.fallback.clone()))
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Configured, but every call fails.
pub struct FailingCompleter {
    calls: AtomicUsize,
}

impl FailingCompleter {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FailingCompleter {
    fn default() -> Self {
        Self::new()
    }
}

impl ITextCompleter for FailingCompleter {
    fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> StoreSyncResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(GenerationError::CompletionFailed {
            provider: "failing".to_string(),
            reason: "simulated outage".to_string(),
        }
        .into())
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Hash-derived unit vectors: identical text always yields the identical vector.
pub struct DeterministicEmbedder {
    dimensions: usize,
    calls: AtomicUsize,
}

impl DeterministicEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// The vector [`DeterministicEmbedder`] produces for `text`.
pub fn deterministic_vector(text: &str, dimensions: usize) -> Vec<f32> {
    let mut reader = blake3::Hasher::new().update(text.as_bytes()).finalize_xof();
    let mut bytes = vec![0u8; dimensions * 4];
    reader.fill(&mut bytes);
    let raw: Vec<f32> = bytes
        .chunks_exact(4)
        .map(|c| {
            let bits = u32::from_le_bytes([c[0], c[1], c[2], c[3]]);
            (bits as f64 / u32::MAX as f64 * 2.0 - 1.0) as f32
        })
        .collect();
    let norm = raw.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm == 0.0 {
        return raw;
    }
    raw.into_iter().map(|v| v / norm).collect()
}

impl ITextEmbedder for DeterministicEmbedder {
    fn embed(&self, text: &str) -> StoreSyncResult<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(deterministic_vector(text, self.dimensions))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "deterministic"
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Always returns the same vector regardless of input.
pub struct FixedEmbedder {
    vector: Vec<f32>,
}

impl FixedEmbedder {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

impl ITextEmbedder for FixedEmbedder {
    fn embed(&self, _text: &str) -> StoreSyncResult<Vec<f32>> {
        Ok(self.vector.clone())
    }

    fn dimensions(&self) -> usize {
        self.vector.len()
    }

    fn name(&self) -> &str {
        "fixed"
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Configured, but every call fails.
pub struct FailingEmbedder {
    dimensions: usize,
}

impl FailingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }
}

impl ITextEmbedder for FailingEmbedder {
    fn embed(&self, _text: &str) -> StoreSyncResult<Vec<f32>> {
        Err(EmbeddingError::InferenceFailed {
            reason: "simulated outage".to_string(),
        }
        .into())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "failing"
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Records every message; fails delivery to addresses in the reject set.
#[derive(Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<OutboundEmail>>,
    reject: HashSet<String>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(addresses: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject: addresses.iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn sent(&self) -> Vec<OutboundEmail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl IMailTransport for RecordingTransport {
    fn send(&self, email: &OutboundEmail) -> StoreSyncResult<()> {
        if self.reject.contains(&email.to) {
            return Err(TransportError::DeliveryFailed {
                recipient: email.to.clone(),
                reason: "mailbox unavailable".to_string(),
            }
            .into());
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
