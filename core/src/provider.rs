//! Suggestion provider boundary.
//!
//! The session never talks to a network itself. It hands an accumulated
//! prompt to a `SuggestionProvider` and receives ranked words back.

use crate::error::ProviderError;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Source of ranked next-word suggestions.
pub trait SuggestionProvider {
    /// Return up to three ranked continuations for `prompt`, best first.
    fn fetch_candidates(&self, prompt: &str) -> Result<Vec<String>, ProviderError>;
}

impl<P: SuggestionProvider + ?Sized> SuggestionProvider for &P {
    fn fetch_candidates(&self, prompt: &str) -> Result<Vec<String>, ProviderError> {
        (**self).fetch_candidates(prompt)
    }
}

impl<P: SuggestionProvider + ?Sized> SuggestionProvider for Box<P> {
    fn fetch_candidates(&self, prompt: &str) -> Result<Vec<String>, ProviderError> {
        (**self).fetch_candidates(prompt)
    }
}

/// Offline provider cycling through a fixed vocabulary.
///
/// Each call returns the next `per_fetch` words, wrapping around, so
/// consecutive anchors see different suggestions.
#[derive(Debug)]
pub struct StaticProvider {
    vocabulary: Vec<String>,
    per_fetch: usize,
    cursor: AtomicUsize,
}

impl StaticProvider {
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            vocabulary: vocabulary.into_iter().map(Into::into).collect(),
            per_fetch: 3,
            cursor: AtomicUsize::new(0),
        }
    }

    pub fn with_per_fetch(mut self, per_fetch: usize) -> Self {
        self.per_fetch = per_fetch;
        self
    }
}

impl Default for StaticProvider {
    fn default() -> Self {
        Self::new([
            "light", "break", "glow", "river", "stone", "hollow", "ember", "drift", "silence",
            "north", "quiet", "salt",
        ])
    }
}

impl SuggestionProvider for StaticProvider {
    fn fetch_candidates(&self, _prompt: &str) -> Result<Vec<String>, ProviderError> {
        if self.vocabulary.is_empty() {
            return Ok(vec![]);
        }
        let start = self.cursor.fetch_add(self.per_fetch, Ordering::Relaxed);
        Ok((start..start + self.per_fetch)
            .map(|i| self.vocabulary[i % self.vocabulary.len()].clone())
            .collect())
    }
}

/// Provider that replays queued outcomes and records every prompt it saw.
///
/// Once the queue runs dry it fails with `ProviderError::NotConfigured`.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    outcomes: Mutex<VecDeque<Result<Vec<String>, ProviderError>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn push_words<I, S>(&self, words: I) -> &Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let words = words.into_iter().map(Into::into).collect();
        self.lock_outcomes().push_back(Ok(words));
        self
    }

    /// Queue a failure.
    pub fn push_error(&self, error: ProviderError) -> &Self {
        self.lock_outcomes().push_back(Err(error));
        self
    }

    /// Prompts received so far, oldest first.
    pub fn prompts(&self) -> Vec<String> {
        match self.prompts.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn lock_outcomes(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<Vec<String>, ProviderError>>> {
        match self.outcomes.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl SuggestionProvider for ScriptedProvider {
    fn fetch_candidates(&self, prompt: &str) -> Result<Vec<String>, ProviderError> {
        match self.prompts.lock() {
            Ok(mut guard) => guard.push(prompt.to_string()),
            Err(poisoned) => poisoned.into_inner().push(prompt.to_string()),
        }
        self.lock_outcomes()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::NotConfigured("no scripted response left".into())))
    }
}
