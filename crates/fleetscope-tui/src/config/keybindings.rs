use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::app::{Action, Screen};

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    Robots,
    Logs,
    Metrics,
    TextInput,
    Form,
    Picker,
}

impl From<Screen> for KeyContext {
    fn from(screen: Screen) -> Self {
        match screen {
            Screen::Robots => Self::Robots,
            Screen::Logs => Self::Logs,
            Screen::Metrics => Self::Metrics,
        }
    }
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::shift(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::Esc), Action::DismissError);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('r')), Action::Refresh);
        global.insert(
            KeyBinding::new(KeyCode::Char('1')),
            Action::Navigate(Screen::Robots),
        );
        global.insert(
            KeyBinding::new(KeyCode::Char('2')),
            Action::Navigate(Screen::Logs),
        );
        global.insert(
            KeyBinding::new(KeyCode::Char('3')),
            Action::Navigate(Screen::Metrics),
        );
        global.insert(KeyBinding::new(KeyCode::Tab), Action::NextScreen);
        global.insert(KeyBinding::new(KeyCode::BackTab), Action::PrevScreen);
        global.insert(KeyBinding::shift(KeyCode::BackTab), Action::PrevScreen);
        // Shared navigation
        global.insert(KeyBinding::new(KeyCode::Char('j')), Action::ListDown);
        global.insert(KeyBinding::new(KeyCode::Down), Action::ListDown);
        global.insert(KeyBinding::new(KeyCode::Char('k')), Action::ListUp);
        global.insert(KeyBinding::new(KeyCode::Up), Action::ListUp);
        global.insert(KeyBinding::new(KeyCode::Char('g')), Action::ScrollToTop);
        global.insert(KeyBinding::shift(KeyCode::Char('G')), Action::ScrollToBottom);
        global.insert(KeyBinding::new(KeyCode::Home), Action::ScrollToTop);
        global.insert(KeyBinding::new(KeyCode::End), Action::ScrollToBottom);
        global.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        global.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        global.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::PageDown);
        global.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PageUp);
        bindings.insert(KeyContext::Global, global);

        // Robots screen
        let mut robots = HashMap::new();
        robots.insert(KeyBinding::new(KeyCode::Char('a')), Action::OpenAddForm);
        robots.insert(KeyBinding::new(KeyCode::Char('u')), Action::OpenUpdateForm);
        bindings.insert(KeyContext::Robots, robots);

        // Logs screen
        let mut logs = HashMap::new();
        logs.insert(KeyBinding::new(KeyCode::Char('/')), Action::OpenSearch);
        logs.insert(KeyBinding::new(KeyCode::Char('l')), Action::CycleLevel);
        logs.insert(KeyBinding::shift(KeyCode::Char('L')), Action::CycleLevelBack);
        logs.insert(KeyBinding::new(KeyCode::Char('s')), Action::PickService);
        logs.insert(KeyBinding::new(KeyCode::Char('p')), Action::PickPod);
        logs.insert(KeyBinding::shift(KeyCode::Char('S')), Action::EditStart);
        logs.insert(KeyBinding::shift(KeyCode::Char('E')), Action::EditEnd);
        logs.insert(KeyBinding::new(KeyCode::Char('x')), Action::ClearFilters);
        bindings.insert(KeyContext::Logs, logs);

        // Metrics screen
        let mut metrics = HashMap::new();
        metrics.insert(KeyBinding::new(KeyCode::Char('m')), Action::PickMetric);
        metrics.insert(KeyBinding::new(KeyCode::Char('w')), Action::CycleWindow);
        metrics.insert(KeyBinding::shift(KeyCode::Char('W')), Action::CycleWindowBack);
        bindings.insert(KeyContext::Metrics, metrics);

        // Single-line text input (search, start, end)
        let mut text_input = HashMap::new();
        text_input.insert(KeyBinding::new(KeyCode::Enter), Action::InputSubmit);
        text_input.insert(KeyBinding::new(KeyCode::Esc), Action::InputCancel);
        text_input.insert(KeyBinding::new(KeyCode::Backspace), Action::InputBackspace);
        text_input.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::InputClear);
        text_input.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::InputCancel);
        bindings.insert(KeyContext::TextInput, text_input);

        // Robot form
        let mut form = HashMap::new();
        form.insert(KeyBinding::new(KeyCode::Tab), Action::FormNextField);
        form.insert(KeyBinding::new(KeyCode::Down), Action::FormNextField);
        form.insert(KeyBinding::new(KeyCode::BackTab), Action::FormPrevField);
        form.insert(KeyBinding::shift(KeyCode::BackTab), Action::FormPrevField);
        form.insert(KeyBinding::new(KeyCode::Up), Action::FormPrevField);
        form.insert(KeyBinding::new(KeyCode::Right), Action::FormCycleNext);
        form.insert(KeyBinding::new(KeyCode::Left), Action::FormCyclePrev);
        form.insert(KeyBinding::new(KeyCode::Enter), Action::FormSubmit);
        form.insert(KeyBinding::new(KeyCode::Esc), Action::FormCancel);
        form.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::FormCancel);
        form.insert(KeyBinding::new(KeyCode::Backspace), Action::FormBackspace);
        form.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::FormClear);
        bindings.insert(KeyContext::Form, form);

        // Picker popup
        let mut picker = HashMap::new();
        picker.insert(KeyBinding::new(KeyCode::Up), Action::PickerUp);
        picker.insert(KeyBinding::new(KeyCode::Down), Action::PickerDown);
        picker.insert(KeyBinding::ctrl(KeyCode::Char('p')), Action::PickerUp);
        picker.insert(KeyBinding::ctrl(KeyCode::Char('n')), Action::PickerDown);
        picker.insert(KeyBinding::new(KeyCode::Enter), Action::PickerSelect);
        picker.insert(KeyBinding::new(KeyCode::Esc), Action::PickerClose);
        picker.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::PickerClose);
        picker.insert(KeyBinding::new(KeyCode::Backspace), Action::PickerBackspace);
        bindings.insert(KeyContext::Picker, picker);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self.lookup(context, &binding) {
            return Some(action);
        }

        // Text-capturing contexts never fall back to global bindings
        match context {
            KeyContext::TextInput => typed_char(key).map(Action::InputChar),
            KeyContext::Form => typed_char(key).map(Action::FormInput),
            KeyContext::Picker => typed_char(key).map(Action::PickerInput),
            _ => self.lookup(KeyContext::Global, &binding),
        }
    }

    fn lookup(&self, context: KeyContext, binding: &KeyBinding) -> Option<Action> {
        self.bindings.get(&context)?.get(binding).cloned()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

/// Printable character from an unmodified or shifted key press
fn typed_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT => {
            Some(c)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn shifted(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT)
    }

    #[test]
    fn test_screen_bindings_fall_back_to_global() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(KeyContext::Logs, &key(KeyCode::Char('/'))),
            Some(Action::OpenSearch)
        );
        assert_eq!(
            kb.get_action(KeyContext::Logs, &key(KeyCode::Char('3'))),
            Some(Action::Navigate(Screen::Metrics))
        );
        assert_eq!(
            kb.get_action(KeyContext::Robots, &key(KeyCode::Char('q'))),
            Some(Action::Quit)
        );
        // Screen-specific keys don't leak into other screens
        assert_eq!(kb.get_action(KeyContext::Robots, &key(KeyCode::Char('m'))), None);
    }

    #[test]
    fn test_shifted_bindings() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(KeyContext::Logs, &shifted('S')),
            Some(Action::EditStart)
        );
        assert_eq!(
            kb.get_action(KeyContext::Metrics, &shifted('W')),
            Some(Action::CycleWindowBack)
        );
    }

    #[test]
    fn test_text_input_captures_characters() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(KeyContext::TextInput, &key(KeyCode::Char('q'))),
            Some(Action::InputChar('q'))
        );
        assert_eq!(
            kb.get_action(KeyContext::TextInput, &shifted('Q')),
            Some(Action::InputChar('Q'))
        );
        assert_eq!(
            kb.get_action(KeyContext::TextInput, &key(KeyCode::Enter)),
            Some(Action::InputSubmit)
        );
        assert_eq!(kb.get_action(KeyContext::TextInput, &key(KeyCode::Tab)), None);
    }

    #[test]
    fn test_form_and_picker_contexts() {
        let kb = KeyBindings::new();
        assert_eq!(
            kb.get_action(KeyContext::Form, &key(KeyCode::Tab)),
            Some(Action::FormNextField)
        );
        assert_eq!(
            kb.get_action(KeyContext::Form, &key(KeyCode::Char('1'))),
            Some(Action::FormInput('1'))
        );
        assert_eq!(
            kb.get_action(KeyContext::Picker, &key(KeyCode::Char('j'))),
            Some(Action::PickerInput('j'))
        );
        assert_eq!(
            kb.get_action(KeyContext::Picker, &KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL)),
            Some(Action::PickerDown)
        );
    }
}
