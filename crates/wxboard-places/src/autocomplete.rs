//! Suggestion sequencing for the add form.
//!
//! Each input change supersedes the previous one: its scheduled or in-flight
//! fetch is cancelled, and any result that still arrives carries an old
//! generation and is dropped. Fetches start only after the debounce delay
//! and results are cached per exact query for the session.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use wxboard_weather::{GeocodingClient, Suggestion};

use crate::view::Intent;

/// What the dropdown should show after an input event.
#[derive(Debug, Clone, PartialEq)]
pub enum SuggestionUpdate {
    Hide,
    Show(Vec<Suggestion>),
    /// A fetch is scheduled; leave the dropdown as it is.
    Pending,
}

impl SuggestionUpdate {
    fn from_items(items: &[Suggestion]) -> Self {
        if items.is_empty() {
            Self::Hide
        } else {
            Self::Show(items.to_vec())
        }
    }
}

pub struct Autocomplete {
    geocoder: GeocodingClient,
    tx: UnboundedSender<Intent>,
    debounce: Duration,
    limit: u32,
    generation: u64,
    cancel: Option<CancellationToken>,
    cache: HashMap<String, Vec<Suggestion>>,
    text: String,
    shown: Vec<Suggestion>,
    pick: Option<Suggestion>,
}

impl Autocomplete {
    /// Results are delivered as `Intent::SuggestionsReady` on `tx`.
    pub fn new(
        geocoder: GeocodingClient,
        tx: UnboundedSender<Intent>,
        debounce: Duration,
        limit: u32,
    ) -> Self {
        Self {
            geocoder,
            tx,
            debounce,
            limit,
            generation: 0,
            cancel: None,
            cache: HashMap::new(),
            text: String::new(),
            shown: Vec::new(),
            pick: None,
        }
    }

    /// Current input text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Suggestion chosen since the last keystroke, if any
    pub fn pick(&self) -> Option<&Suggestion> {
        self.pick.as_ref()
    }

    pub fn shown(&self) -> &[Suggestion] {
        &self.shown
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Handle a keystroke. Must be called from within a tokio runtime.
    pub fn input_changed(&mut self, text: &str) -> SuggestionUpdate {
        self.supersede();
        self.text = text.to_string();
        self.pick = None;

        let query = text.trim();
        if query.is_empty() {
            self.shown.clear();
            return SuggestionUpdate::Hide;
        }

        if let Some(cached) = self.cache.get(query) {
            tracing::debug!("Suggestions for {:?} served from cache", query);
            self.shown = cached.clone();
            return SuggestionUpdate::from_items(&self.shown);
        }

        let token = CancellationToken::new();
        self.cancel = Some(token.clone());

        let generation = self.generation;
        let query = query.to_string();
        let geocoder = self.geocoder.clone();
        let tx = self.tx.clone();
        let debounce = self.debounce;
        let limit = self.limit;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => return,
                _ = tokio::time::sleep(debounce) => {}
            }

            let result = tokio::select! {
                _ = token.cancelled() => return,
                result = geocoder.search(&query, limit) => result.map_err(|e| e.to_string()),
            };

            // The receiver only goes away on shutdown
            let _ = tx.send(Intent::SuggestionsReady {
                generation,
                query,
                result,
            });
        });

        SuggestionUpdate::Pending
    }

    /// Accept a fetch result. Returns `None` when the result is stale.
    pub fn deliver(
        &mut self,
        generation: u64,
        query: String,
        result: Result<Vec<Suggestion>, String>,
    ) -> Option<SuggestionUpdate> {
        if let Ok(items) = &result {
            self.cache.insert(query.clone(), items.clone());
        }

        if generation != self.generation {
            tracing::debug!(
                "Dropping stale suggestions for {:?} (generation {} < {})",
                query,
                generation,
                self.generation
            );
            return None;
        }
        self.cancel = None;

        match result {
            Ok(items) => {
                self.shown = items;
                Some(SuggestionUpdate::from_items(&self.shown))
            }
            Err(e) => {
                tracing::warn!("Suggestion fetch for {:?} failed: {}", query, e);
                self.shown.clear();
                Some(SuggestionUpdate::Hide)
            }
        }
    }

    /// Choose a shown suggestion: it becomes the pending pick and the input
    /// text, and the dropdown closes.
    pub fn select(&mut self, index: usize) -> Option<Suggestion> {
        let chosen = self.shown.get(index)?.clone();
        self.supersede();
        self.text = chosen.display_name();
        self.pick = Some(chosen.clone());
        self.shown.clear();
        Some(chosen)
    }

    /// Close the dropdown without changing the input.
    pub fn dismiss(&mut self) {
        self.supersede();
        self.shown.clear();
    }

    /// Reset the form after a successful add.
    pub fn clear_input(&mut self) {
        self.supersede();
        self.text.clear();
        self.pick = None;
        self.shown.clear();
    }

    fn supersede(&mut self) {
        self.generation += 1;
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }
}
