//! Application state and actions

mod action;
mod effect;
mod form;
mod input;
mod picker;
mod state;

pub use action::Action;
pub use effect::{Effect, Fetch, FetchOutcome, LabelKind, Mutation};
pub use form::{FormField, FormKind, RobotForm};
pub use input::{format_instant, parse_instant};
pub use picker::{PickerKind, PickerState};
pub use state::{AppState, InputMode, RefreshIntervals, Screen, UiState};
