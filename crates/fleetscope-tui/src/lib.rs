//! TUI components for fleetscope
//!
//! This crate provides the terminal user interface for fleetscope,
//! including state management, keybindings, event handling, and UI components.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{
    Action, AppState, Effect, Fetch, FetchOutcome, FormField, FormKind, InputMode, LabelKind,
    Mutation, PickerKind, PickerState, RefreshIntervals, RobotForm, Screen, UiState,
};
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{FormDialog, HelpOverlay, Picker, StatusBar, TabBar};
pub use ui::screens::{LogsScreen, MetricsScreen, RobotsScreen};
pub use ui::{Layout, Theme};
