use ratatui::widgets::ListState;

/// What a picker selection is applied to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PickerKind {
    Service,
    Pod,
    Metric,
}

impl PickerKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Service => " Service ",
            Self::Pod => " Pod ",
            Self::Metric => " Metric ",
        }
    }

    /// Label pickers offer an explicit "no filter" entry
    fn allows_none(&self) -> bool {
        !matches!(self, Self::Metric)
    }
}

/// Type-to-filter selection popup
#[derive(Clone, Debug)]
pub struct PickerState {
    pub kind: PickerKind,
    pub search_input: String,
    pub list_state: ListState,
    pub filtered_indices: Vec<usize>,
    /// Empty string stands for "None"
    items: Vec<String>,
}

impl PickerState {
    /// Open over `values`, preselecting `current` when it is present
    pub fn open(kind: PickerKind, values: &[String], current: &str) -> Self {
        let mut items = Vec::with_capacity(values.len() + 1);
        if kind.allows_none() {
            items.push(String::new());
        }
        items.extend(values.iter().filter(|v| !v.is_empty()).cloned());

        let mut picker = Self {
            kind,
            search_input: String::new(),
            list_state: ListState::default(),
            filtered_indices: Vec::new(),
            items,
        };
        picker.update_filtered();
        if let Some(pos) = picker.items.iter().position(|v| v == current) {
            picker.list_state.select(Some(pos));
        }
        picker
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    /// Display text for an item
    pub fn display(value: &str) -> &str {
        if value.is_empty() { "None" } else { value }
    }

    pub fn update_filtered(&mut self) {
        let query = self.search_input.to_lowercase();
        self.filtered_indices = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                query.is_empty() || Self::display(item).to_lowercase().contains(&query)
            })
            .map(|(i, _)| i)
            .collect();

        // Reset selection if out of bounds
        if self.filtered_indices.is_empty() {
            self.list_state.select(None);
        } else {
            let current = self.list_state.selected().unwrap_or(0);
            if current >= self.filtered_indices.len() {
                self.list_state.select(Some(0));
            } else {
                self.list_state.select(Some(current));
            }
        }
    }

    pub fn move_up(&mut self) {
        if self.filtered_indices.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(0) | None => self.filtered_indices.len() - 1,
            Some(i) => i - 1,
        };
        self.list_state.select(Some(i));
    }

    pub fn move_down(&mut self) {
        if self.filtered_indices.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < self.filtered_indices.len() => i + 1,
            _ => 0,
        };
        self.list_state.select(Some(i));
    }

    /// Currently highlighted value; `Some("")` means "None"
    pub fn selected_value(&self) -> Option<&str> {
        let selected = self.list_state.selected()?;
        let idx = self.filtered_indices.get(selected)?;
        self.items.get(*idx).map(String::as_str)
    }

    pub fn input_char(&mut self, c: char) {
        self.search_input.push(c);
        self.list_state.select(Some(0));
        self.update_filtered();
    }

    pub fn input_backspace(&mut self) {
        self.search_input.pop();
        self.update_filtered();
    }
}
