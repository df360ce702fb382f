mod form_dialog;
mod help_overlay;
mod picker;
mod status_bar;
mod tab_bar;

pub use form_dialog::FormDialog;
pub use help_overlay::HelpOverlay;
pub use picker::Picker;
pub use status_bar::{StatusBar, global_hints};
pub use tab_bar::TabBar;
