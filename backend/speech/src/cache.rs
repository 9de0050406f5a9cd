//! Bounded speech-output cache.
//!
//! Memoizes rendered audio per (voice, text) pair. Eviction is strict
//! FIFO over an explicit insertion-order queue paired with the map, so
//! the "oldest entry goes first" invariant does not depend on map
//! iteration order. Provider failures propagate unchanged: the caller
//! layer decides how to apologize, the cache never substitutes audio.
//!
//! The render happens outside the lock; two simultaneous first-time
//! misses may both render, which is harmless, and the queue/map
//! bookkeeping stays consistent because all mutation happens under one
//! lock.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use anyhow::Result;
use bytes::Bytes;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::synth::{TtsProvider, TtsRequest};

/// Distinct (voice, text) pairs held at once.
pub const MAX_CACHE_ENTRIES: usize = 100;

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, Bytes>,
    /// Insertion order, oldest at the front.
    order: VecDeque<String>,
}

/// Shared FIFO cache over a TTS provider.
#[derive(Clone)]
pub struct SpeechCache {
    inner: Arc<Mutex<CacheInner>>,
    max_entries: usize,
}

impl SpeechCache {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CACHE_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(CacheInner::default())),
            max_entries,
        }
    }

    fn key(voice: &str, text: &str) -> String {
        format!("{voice}|{}", text.trim())
    }

    /// Return the cached audio for (voice, text), rendering on a miss.
    pub async fn get_or_render(
        &self,
        text: &str,
        voice: Option<&str>,
        provider: &dyn TtsProvider,
    ) -> Result<Bytes> {
        let voice = voice.unwrap_or_else(|| provider.default_voice()).to_string();
        let key = Self::key(&voice, text);

        {
            let inner = self.inner.lock().await;
            if let Some(audio) = inner.entries.get(&key) {
                debug!(key = %key, "speech cache hit");
                return Ok(audio.clone());
            }
        }

        let audio = provider
            .synthesize(TtsRequest {
                text: text.trim().to_string(),
                voice: Some(voice),
            })
            .await?;

        let mut inner = self.inner.lock().await;
        if inner.entries.insert(key.clone(), audio.clone()).is_none() {
            inner.order.push_back(key);
        }
        while inner.entries.len() > self.max_entries {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                    debug!(key = %oldest, "evicted oldest speech cache entry");
                }
                None => break,
            }
        }
        Ok(audio)
    }

    /// Best-effort cache warm-up for frequently spoken phrases. Failures
    /// are logged and skipped so startup never blocks on the synthesizer.
    pub async fn prewarm(&self, phrases: &[&str], provider: &dyn TtsProvider) {
        let mut warmed = 0usize;
        for phrase in phrases {
            match self.get_or_render(phrase, None, provider).await {
                Ok(_) => warmed += 1,
                Err(e) => warn!(error = %e, "prewarm synthesis failed"),
            }
        }
        info!(warmed, total = phrases.len(), "speech cache prewarm done");
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.entries.is_empty()
    }
}

impl Default for SpeechCache {
    fn default() -> Self {
        Self::new()
    }
}
