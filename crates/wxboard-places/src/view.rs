//! Boundary between the dashboard core and whatever renders it.
//!
//! The core pushes state changes into a `PlaceView`; the front-end sends
//! `Intent`s back over a channel.

use wxboard_weather::Suggestion;

use crate::format::ForecastLine;
use crate::place::Place;

/// Presentation state of one place's forecast card.
#[derive(Debug, Clone, PartialEq)]
pub enum CardState {
    Loading,
    Rendered(Vec<ForecastLine>),
    Errored(String),
}

/// Rendering side of the dashboard. Implementations only display; they never
/// call back into the core directly.
pub trait PlaceView: Send {
    /// A place was inserted at `index`.
    fn place_added(&mut self, place: &Place, index: usize);

    /// A place's labels or coordinates changed.
    fn place_updated(&mut self, place: &Place);

    fn place_removed(&mut self, id: &str);

    fn card_state(&mut self, id: &str, state: &CardState);

    /// Header showing the current location; `None` clears it.
    fn location_header(&mut self, label: Option<&str>);

    /// Inline message next to the add form; `None` clears it.
    fn form_error(&mut self, message: Option<&str>);

    /// Replace the suggestion dropdown; an empty slice hides it.
    fn suggestions(&mut self, items: &[Suggestion]);

    /// Replace the text of the add form's input.
    fn input_text(&mut self, _text: &str) {}
}

/// User actions sent by a front-end.
#[derive(Debug)]
pub enum Intent {
    /// The add-form input changed.
    InputChanged(String),

    /// Add button or enter key.
    Add,

    /// A suggestion from the current dropdown was chosen.
    SelectSuggestion(usize),

    /// Click outside the input and dropdown.
    DismissSuggestions,

    Remove(String),

    Refresh,

    Locate,

    Shutdown,

    /// Result of a scheduled suggestion fetch.
    SuggestionsReady {
        generation: u64,
        query: String,
        result: Result<Vec<Suggestion>, String>,
    },
}
