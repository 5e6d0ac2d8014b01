//! Place list, forecast cards and add-form sequencing for wxboard
//!
//! The core is UI-agnostic: state changes are pushed into a `PlaceView` and
//! user actions arrive as `Intent`s.

pub mod autocomplete;
pub mod dashboard;
pub mod error_mapping;
pub mod format;
pub mod manager;
pub mod place;
pub mod store;
pub mod view;

pub use autocomplete::{Autocomplete, SuggestionUpdate};
pub use dashboard::{intent_channel, Dashboard, IntentReceiver, IntentSender};
pub use format::{ForecastLine, DAY_LABELS, UNKNOWN_CONDITION};
pub use manager::PlaceListManager;
pub use place::{Place, COORD_TOLERANCE, CURRENT_LOCATION_LABEL};
pub use store::{PlaceStore, StorageBackend};
pub use view::{CardState, Intent, PlaceView};
