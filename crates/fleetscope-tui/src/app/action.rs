use crate::app::Screen;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    // Navigation
    Navigate(Screen),
    NextScreen,
    PrevScreen,
    Quit,

    // UI toggles
    ToggleHelp,
    DismissError,

    // List and scroll navigation
    ListUp,
    ListDown,
    PageUp,
    PageDown,
    ScrollToTop,
    ScrollToBottom,

    // Re-run every query owned by the current screen
    Refresh,

    // Robot forms
    OpenAddForm,
    OpenUpdateForm,
    FormNextField,
    FormPrevField,
    FormInput(char),
    FormBackspace,
    FormClear,
    FormCycleNext,
    FormCyclePrev,
    FormSubmit,
    FormCancel,

    // Log filters
    OpenSearch,
    EditStart,
    EditEnd,
    CycleLevel,
    CycleLevelBack,
    PickService,
    PickPod,
    ClearFilters,

    // Single-line text input (search, start, end)
    InputChar(char),
    InputBackspace,
    InputClear,
    InputSubmit,
    InputCancel,

    // Metrics
    PickMetric,
    CycleWindow,
    CycleWindowBack,

    // Picker popup
    PickerUp,
    PickerDown,
    PickerInput(char),
    PickerBackspace,
    PickerSelect,
    PickerClose,
}
