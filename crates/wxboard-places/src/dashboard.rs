//! Controller that owns the place list and the add form.
//!
//! Intents are processed one at a time on the caller's task. Errors never
//! leave this module: they end up as form messages or card states.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::autocomplete::{Autocomplete, SuggestionUpdate};
use crate::manager::PlaceListManager;
use crate::view::Intent;

pub type IntentSender = UnboundedSender<Intent>;
pub type IntentReceiver = UnboundedReceiver<Intent>;

/// Channel a front-end uses to drive a `Dashboard`.
pub fn intent_channel() -> (IntentSender, IntentReceiver) {
    mpsc::unbounded_channel()
}

pub struct Dashboard {
    manager: PlaceListManager,
    autocomplete: Autocomplete,
    detect_on_startup: bool,
}

impl Dashboard {
    pub fn new(manager: PlaceListManager, autocomplete: Autocomplete) -> Self {
        Self {
            manager,
            autocomplete,
            detect_on_startup: true,
        }
    }

    /// Whether `startup` looks up the device position.
    pub fn with_startup_detection(mut self, enabled: bool) -> Self {
        self.detect_on_startup = enabled;
        self
    }

    pub fn manager(&self) -> &PlaceListManager {
        &self.manager
    }

    pub fn autocomplete(&self) -> &Autocomplete {
        &self.autocomplete
    }

    /// Render the saved list, place the geo entry, then load the remaining
    /// forecasts in list order.
    pub async fn startup(&mut self) {
        self.manager.render_all();

        let geo_id = if self.detect_on_startup {
            // Startup detection never shows errors
            self.manager.upsert_geo(false).await.ok().flatten()
        } else {
            None
        };

        self.manager.refresh_except(geo_id.as_deref()).await;
        tracing::info!("Dashboard ready with {} places", self.manager.places().len());
    }

    /// Process intents until `Shutdown` or until every sender is gone.
    pub async fn run(&mut self, mut rx: IntentReceiver) {
        while let Some(intent) = rx.recv().await {
            if !self.handle(intent).await {
                break;
            }
        }
        tracing::info!("Dashboard stopped");
    }

    /// Apply one intent. Returns false once the dashboard should stop.
    pub async fn handle(&mut self, intent: Intent) -> bool {
        match intent {
            Intent::InputChanged(text) => {
                self.manager.view().form_error(None);
                let update = self.autocomplete.input_changed(&text);
                self.show(update);
            }
            Intent::Add => self.add().await,
            Intent::SelectSuggestion(index) => {
                let Some(chosen) = self.autocomplete.select(index) else {
                    tracing::debug!("No suggestion at index {}", index);
                    return true;
                };
                let view = self.manager.view();
                view.input_text(&chosen.display_name());
                view.suggestions(&[]);
                self.add().await;
            }
            Intent::DismissSuggestions => {
                self.autocomplete.dismiss();
                self.manager.view().suggestions(&[]);
            }
            Intent::Remove(id) => {
                self.manager.remove(&id);
            }
            Intent::Refresh => self.manager.refresh_all().await,
            Intent::Locate => {
                self.manager.view().form_error(None);
                if let Err(e) = self.manager.upsert_geo(true).await {
                    self.manager.view().form_error(Some(e.user_message()));
                }
            }
            Intent::SuggestionsReady {
                generation,
                query,
                result,
            } => {
                if let Some(update) = self.autocomplete.deliver(generation, query, result) {
                    self.show(update);
                }
            }
            Intent::Shutdown => return false,
        }
        true
    }

    async fn add(&mut self) {
        let input = self.autocomplete.text().to_string();
        let pick = self.autocomplete.pick().cloned();

        match self.manager.add_from_pick(&input, pick.as_ref()).await {
            Ok(_) => {
                self.autocomplete.clear_input();
                let view = self.manager.view();
                view.input_text("");
                view.suggestions(&[]);
                view.form_error(None);
            }
            Err(e) => {
                tracing::info!("Add {:?} rejected: {}", input, e);
                self.manager.view().form_error(Some(e.user_message()));
            }
        }
    }

    fn show(&mut self, update: SuggestionUpdate) {
        match update {
            SuggestionUpdate::Hide => self.manager.view().suggestions(&[]),
            SuggestionUpdate::Show(items) => self.manager.view().suggestions(&items),
            SuggestionUpdate::Pending => {}
        }
    }
}
