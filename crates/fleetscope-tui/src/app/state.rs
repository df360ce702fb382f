use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use ratatui::widgets::TableState;

use fleetscope_query::{LogFilter, MetricRangeQuery, QuerySlot, RefreshSchedule, SearchHighlighter};
use fleetscope_types::{LogEntry, LogLevel, MetricTable, Robot, TimeWindow};

use super::{
    Action, Effect, Fetch, FetchOutcome, LabelKind, PickerKind, PickerState, RobotForm,
    format_instant, parse_instant,
};

/// Screen enumeration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Screen {
    Robots,
    Logs,
    Metrics,
}

impl Screen {
    pub const ALL: [Screen; 3] = [Self::Robots, Self::Logs, Self::Metrics];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Robots => "Robots",
            Self::Logs => "Logs",
            Self::Metrics => "Metrics",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Self::Robots => 0,
            Self::Logs => 1,
            Self::Metrics => 2,
        }
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Which single-line input is capturing keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Start,
    End,
}

/// Automatic refresh periods
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshIntervals {
    pub logs: Duration,
    pub metrics: Duration,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            logs: Duration::from_secs(5),
            metrics: Duration::from_secs(30),
        }
    }
}

/// UI-specific transient state
pub struct UiState {
    /// Is help overlay visible?
    pub help_visible: bool,

    /// Error message to display (if any)
    pub error_message: Option<String>,

    pub input_mode: InputMode,

    /// Text being edited for a start/end bound
    pub input: String,

    /// Parse or range error for the bound being edited
    pub input_error: Option<String>,

    /// Selection in the robots table
    pub robot_table: TableState,

    /// Scroll position in log viewer
    pub log_scroll: usize,

    /// Scroll position in the metric table
    pub metric_scroll: usize,

    /// Rows per page, updated by the renderer
    pub page_size: usize,

    pub picker: Option<PickerState>,

    pub form: Option<RobotForm>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            help_visible: false,
            error_message: None,
            input_mode: InputMode::Normal,
            input: String::new(),
            input_error: None,
            robot_table: TableState::default(),
            log_scroll: 0,
            metric_scroll: 0,
            page_size: 10,
            picker: None,
            form: None,
        }
    }
}

/// Global application state.
///
/// Every backend query owns a [`QuerySlot`]. State changes never perform I/O;
/// they queue [`Effect`]s that the runtime drains with [`AppState::take_effects`]
/// and answers through [`AppState::apply_fetch`] and [`AppState::apply_mutation`].
pub struct AppState {
    /// Current screen being displayed
    pub current_screen: Screen,

    /// Whether app should quit
    pub should_quit: bool,

    /// UI state
    pub ui_state: UiState,

    pub robots: QuerySlot<Vec<Robot>>,
    pub log_labels: QuerySlot<Vec<String>>,
    pub services: QuerySlot<Vec<String>>,
    pub pods: QuerySlot<Vec<String>>,
    pub logs: QuerySlot<Vec<LogEntry>>,
    pub metric_names: QuerySlot<Vec<String>>,
    pub metric_table: QuerySlot<MetricTable>,

    pub log_filter: LogFilter,

    /// Compiled search text, used to highlight matches
    pub highlighter: Option<SearchHighlighter>,

    pub selected_metric: Option<String>,
    pub time_window: TimeWindow,

    log_refresh: RefreshSchedule,
    metric_refresh: RefreshSchedule,

    form_generation: u64,
    effects: Vec<Effect>,
}

impl AppState {
    pub fn new(intervals: RefreshIntervals) -> Self {
        Self {
            current_screen: Screen::Robots,
            should_quit: false,
            ui_state: UiState::default(),
            robots: QuerySlot::new(),
            log_labels: QuerySlot::new(),
            services: QuerySlot::new(),
            pods: QuerySlot::new(),
            logs: QuerySlot::new(),
            metric_names: QuerySlot::new(),
            metric_table: QuerySlot::new(),
            log_filter: LogFilter::default(),
            highlighter: None,
            selected_metric: None,
            time_window: TimeWindow::default(),
            log_refresh: RefreshSchedule::new(intervals.logs),
            metric_refresh: RefreshSchedule::new(intervals.metrics),
            form_generation: 0,
            effects: Vec::new(),
        }
    }

    /// Queue the startup queries
    pub fn start(&mut self) {
        self.fetch_robots();
        self.fetch_log_labels();
        self.fetch_metric_names();
    }

    /// Drain queued effects
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    pub fn dispatch(&mut self, action: Action, now: Instant) {
        match action {
            Action::Navigate(screen) => self.navigate_to(screen, now),
            Action::NextScreen => self.navigate_to(self.current_screen.next(), now),
            Action::PrevScreen => self.navigate_to(self.current_screen.prev(), now),
            Action::Quit => self.should_quit = true,

            Action::ToggleHelp => self.ui_state.help_visible = !self.ui_state.help_visible,
            Action::DismissError => {
                if self.ui_state.help_visible {
                    self.ui_state.help_visible = false;
                } else {
                    self.dismiss_error();
                }
            }

            Action::ListUp => self.scroll_up(1),
            Action::ListDown => self.scroll_down(1),
            Action::PageUp => self.scroll_up(self.ui_state.page_size),
            Action::PageDown => self.scroll_down(self.ui_state.page_size),
            Action::ScrollToTop => self.scroll_up(usize::MAX),
            Action::ScrollToBottom => self.scroll_down(usize::MAX),

            Action::Refresh => self.refresh(now),

            Action::OpenAddForm => {
                if self.current_screen == Screen::Robots {
                    self.open_form(RobotForm::add());
                }
            }
            Action::OpenUpdateForm => {
                if self.current_screen == Screen::Robots {
                    let id = self.selected_robot().map(|r| r.id.clone());
                    self.open_form(RobotForm::update(id.as_deref()));
                }
            }
            Action::FormNextField => self.with_form(RobotForm::next_field),
            Action::FormPrevField => self.with_form(RobotForm::prev_field),
            Action::FormInput(c) => self.with_form(|f| f.input_char(c)),
            Action::FormBackspace => self.with_form(RobotForm::backspace),
            Action::FormClear => self.with_form(RobotForm::clear),
            Action::FormCycleNext => self.with_form(|f| f.cycle_status(true)),
            Action::FormCyclePrev => self.with_form(|f| f.cycle_status(false)),
            Action::FormSubmit => self.submit_form(),
            Action::FormCancel => self.ui_state.form = None,

            Action::OpenSearch => self.begin_input(InputMode::Search),
            Action::EditStart => self.begin_input(InputMode::Start),
            Action::EditEnd => self.begin_input(InputMode::End),
            Action::CycleLevel => {
                self.update_filter(now, |f| f.level = LogLevel::next_filter(f.level))
            }
            Action::CycleLevelBack => {
                self.update_filter(now, |f| f.level = LogLevel::prev_filter(f.level))
            }
            Action::PickService => self.open_picker(PickerKind::Service),
            Action::PickPod => self.open_picker(PickerKind::Pod),
            Action::ClearFilters => {
                self.update_filter(now, |f| *f = LogFilter::default());
                self.highlighter = None;
            }

            Action::InputChar(c) => self.edit_input(now, |s| s.push(c)),
            Action::InputBackspace => self.edit_input(now, |s| {
                s.pop();
            }),
            Action::InputClear => self.edit_input(now, String::clear),
            Action::InputSubmit => self.submit_input(now),
            Action::InputCancel => self.end_input(),

            Action::PickMetric => self.open_picker(PickerKind::Metric),
            Action::CycleWindow => self.set_time_window(self.time_window.next(), now),
            Action::CycleWindowBack => self.set_time_window(self.time_window.prev(), now),

            Action::PickerUp => self.with_picker(PickerState::move_up),
            Action::PickerDown => self.with_picker(PickerState::move_down),
            Action::PickerInput(c) => self.with_picker(|p| p.input_char(c)),
            Action::PickerBackspace => self.with_picker(PickerState::input_backspace),
            Action::PickerSelect => self.apply_picker(now),
            Action::PickerClose => self.ui_state.picker = None,
        }
    }

    /// Run whatever automatic refresh is due on the active screen
    pub fn on_tick(&mut self, now: Instant) {
        match self.current_screen {
            Screen::Logs if self.log_refresh.is_due(now) => self.fetch_logs(now),
            Screen::Metrics if self.metric_refresh.is_due(now) => self.fetch_metrics(now),
            _ => {}
        }
    }

    /// Switch screens; the target screen's data is refetched on entry
    pub fn navigate_to(&mut self, screen: Screen, now: Instant) {
        if self.current_screen == screen {
            return;
        }
        self.current_screen = screen;
        self.ui_state.picker = None;
        self.end_input();

        match screen {
            Screen::Robots => self.fetch_robots(),
            Screen::Logs => self.fetch_logs(now),
            Screen::Metrics => self.fetch_metrics(now),
        }
    }

    /// Explicit refresh of everything the current screen shows
    pub fn refresh(&mut self, now: Instant) {
        match self.current_screen {
            Screen::Robots => self.fetch_robots(),
            Screen::Logs => {
                self.fetch_logs(now);
                self.fetch_log_labels();
            }
            Screen::Metrics => {
                self.fetch_metric_names();
                self.fetch_metrics(now);
            }
        }
    }

    /// Change the metric window; refetches only when a metric is selected
    pub fn set_time_window(&mut self, window: TimeWindow, now: Instant) {
        if self.time_window == window {
            return;
        }
        self.time_window = window;
        if self.selected_metric.is_some() {
            self.metric_table.reset();
            self.ui_state.metric_scroll = 0;
            self.fetch_metrics(now);
        }
    }

    pub fn select_metric(&mut self, metric: String, now: Instant) {
        if self.selected_metric.as_deref() == Some(metric.as_str()) {
            return;
        }
        tracing::debug!(%metric, "metric selected");
        self.selected_metric = Some(metric);
        self.metric_table.reset();
        self.ui_state.metric_scroll = 0;
        self.fetch_metrics(now);
    }

    // ------------------------------------------------------------------
    // Outcomes
    // ------------------------------------------------------------------

    /// Apply a fetch outcome; stale generations are dropped by the slot
    pub fn apply_fetch(&mut self, generation: u64, outcome: FetchOutcome, at: DateTime<Utc>) {
        match outcome {
            FetchOutcome::Robots(result) => {
                if self.robots.resolve(generation, result, at) {
                    self.clamp_robot_selection();
                }
            }
            FetchOutcome::LogLabels(result) => {
                let ok = result.is_ok();
                if self.log_labels.resolve(generation, result, at) && ok {
                    self.discover_label_values();
                }
            }
            FetchOutcome::LabelValues(kind, result) => {
                self.label_slot(kind).resolve(generation, result, at);
            }
            FetchOutcome::Logs(result) => {
                self.logs.resolve(generation, result, at);
            }
            FetchOutcome::MetricNames(result) => {
                self.metric_names.resolve(generation, result, at);
            }
            FetchOutcome::MetricRange(result) => {
                self.metric_table.resolve(generation, result, at);
            }
        }
    }

    /// Apply the result of a robot mutation submitted by form `form`.
    ///
    /// Only that form is closed or annotated; a form opened after it was
    /// cancelled is left alone.
    pub fn apply_mutation(&mut self, form: u64, result: Result<Robot, String>) {
        let owner = self
            .ui_state
            .form
            .as_ref()
            .is_some_and(|f| f.generation == form);

        match result {
            Ok(robot) => {
                tracing::info!(id = %robot.id, name = %robot.name, "robot saved");
                if owner {
                    self.ui_state.form = None;
                }
                self.fetch_robots();
            }
            Err(e) => match self.ui_state.form.as_mut().filter(|_| owner) {
                Some(current) => {
                    current.submitting = false;
                    current.error = Some(e);
                }
                None => self.show_error(e),
            },
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    fn issue(&mut self, generation: u64, fetch: Fetch) {
        self.effects.push(Effect::Fetch { generation, fetch });
    }

    fn fetch_robots(&mut self) {
        let generation = self.robots.begin();
        self.issue(generation, Fetch::Robots);
    }

    fn fetch_log_labels(&mut self) {
        let generation = self.log_labels.begin();
        self.issue(generation, Fetch::LogLabels);
    }

    fn fetch_metric_names(&mut self) {
        let generation = self.metric_names.begin();
        self.issue(generation, Fetch::MetricNames);
    }

    fn fetch_logs(&mut self, now: Instant) {
        let generation = self.logs.begin();
        self.issue(generation, Fetch::Logs(self.log_filter.to_query()));
        self.log_refresh.mark(now);
    }

    /// No-op until a metric is selected
    fn fetch_metrics(&mut self, now: Instant) {
        let Some(metric) = self.selected_metric.as_deref() else {
            return;
        };
        let query = MetricRangeQuery::new(metric, self.time_window, Utc::now());
        let generation = self.metric_table.begin();
        self.issue(generation, Fetch::MetricRange(query));
        self.metric_refresh.mark(now);
    }

    fn label_slot(&mut self, kind: LabelKind) -> &mut QuerySlot<Vec<String>> {
        match kind {
            LabelKind::Service => &mut self.services,
            LabelKind::Pod => &mut self.pods,
        }
    }

    /// Fetch values for the picker labels the log store actually has
    fn discover_label_values(&mut self) {
        let present: Vec<LabelKind> = [LabelKind::Service, LabelKind::Pod]
            .into_iter()
            .filter(|kind| {
                self.log_labels
                    .data()
                    .is_some_and(|labels| labels.iter().any(|l| l == kind.label()))
            })
            .collect();

        for kind in present {
            let generation = self.label_slot(kind).begin();
            self.issue(generation, Fetch::LabelValues(kind));
        }
    }

    /// Mutate the log filter and refetch if anything changed
    fn update_filter(&mut self, now: Instant, f: impl FnOnce(&mut LogFilter)) {
        let before = self.log_filter.clone();
        f(&mut self.log_filter);
        if self.log_filter != before {
            self.ui_state.log_scroll = 0;
            self.fetch_logs(now);
        }
    }

    // ------------------------------------------------------------------
    // Text input
    // ------------------------------------------------------------------

    fn begin_input(&mut self, mode: InputMode) {
        if self.current_screen != Screen::Logs {
            return;
        }
        self.ui_state.input_mode = mode;
        self.ui_state.input_error = None;
        self.ui_state.input = match mode {
            InputMode::Start => self.log_filter.start().map(format_instant).unwrap_or_default(),
            InputMode::End => self.log_filter.end().map(format_instant).unwrap_or_default(),
            InputMode::Search | InputMode::Normal => String::new(),
        };
    }

    fn end_input(&mut self) {
        self.ui_state.input_mode = InputMode::Normal;
        self.ui_state.input.clear();
        self.ui_state.input_error = None;
    }

    /// Search edits apply on every keystroke; bound edits wait for submit
    fn edit_input(&mut self, now: Instant, edit: impl FnOnce(&mut String)) {
        match self.ui_state.input_mode {
            InputMode::Search => {
                let mut search = self.log_filter.search.clone();
                edit(&mut search);
                self.highlighter = if search.is_empty() {
                    None
                } else {
                    SearchHighlighter::new(&search).ok()
                };
                self.update_filter(now, |f| f.search = search);
            }
            InputMode::Start | InputMode::End => {
                edit(&mut self.ui_state.input);
                self.ui_state.input_error = None;
            }
            InputMode::Normal => {}
        }
    }

    fn submit_input(&mut self, now: Instant) {
        let mode = self.ui_state.input_mode;
        if !matches!(mode, InputMode::Start | InputMode::End) {
            self.end_input();
            return;
        }

        let instant = match parse_instant(&self.ui_state.input) {
            Ok(instant) => instant,
            Err(e) => {
                self.ui_state.input_error = Some(e);
                return;
            }
        };

        let mut filter = self.log_filter.clone();
        let result = match mode {
            InputMode::Start => filter.set_start(instant),
            _ => filter.set_end(instant),
        };
        match result {
            Ok(()) => {
                self.end_input();
                self.update_filter(now, |f| *f = filter);
            }
            Err(e) => self.ui_state.input_error = Some(e.to_string()),
        }
    }

    // ------------------------------------------------------------------
    // Pickers and forms
    // ------------------------------------------------------------------

    fn open_picker(&mut self, kind: PickerKind) {
        let (screen, values, current) = match kind {
            PickerKind::Service => (Screen::Logs, self.services.data(), self.log_filter.service.as_str()),
            PickerKind::Pod => (Screen::Logs, self.pods.data(), self.log_filter.pod.as_str()),
            PickerKind::Metric => (
                Screen::Metrics,
                self.metric_names.data(),
                self.selected_metric.as_deref().unwrap_or(""),
            ),
        };
        if self.current_screen != screen {
            return;
        }
        let values = values.map(Vec::as_slice).unwrap_or(&[]);
        self.ui_state.picker = Some(PickerState::open(kind, values, current));
    }

    fn with_picker(&mut self, f: impl FnOnce(&mut PickerState)) {
        if let Some(picker) = self.ui_state.picker.as_mut() {
            f(picker);
        }
    }

    fn apply_picker(&mut self, now: Instant) {
        let Some(picker) = self.ui_state.picker.take() else {
            return;
        };
        let Some(value) = picker.selected_value().map(str::to_string) else {
            return;
        };

        match picker.kind {
            PickerKind::Service => self.update_filter(now, |f| f.service = value),
            PickerKind::Pod => self.update_filter(now, |f| f.pod = value),
            PickerKind::Metric => self.select_metric(value, now),
        }
    }

    fn with_form(&mut self, f: impl FnOnce(&mut RobotForm)) {
        if let Some(form) = self.ui_state.form.as_mut() {
            f(form);
        }
    }

    fn open_form(&mut self, mut form: RobotForm) {
        self.form_generation += 1;
        form.generation = self.form_generation;
        self.ui_state.form = Some(form);
    }

    /// Queue the form's mutation; an incomplete form is ignored
    fn submit_form(&mut self) {
        let Some(form) = self.ui_state.form.as_mut() else {
            return;
        };
        if form.submitting {
            return;
        }
        match form.to_mutation() {
            Ok(mutation) => {
                form.submitting = true;
                form.error = None;
                self.effects.push(Effect::Mutate {
                    form: form.generation,
                    mutation,
                });
            }
            Err(e) => tracing::debug!(error = %e, "robot form incomplete"),
        }
    }

    // ------------------------------------------------------------------
    // Selection and scrolling
    // ------------------------------------------------------------------

    pub fn selected_robot(&self) -> Option<&Robot> {
        let robots = self.robots.data()?;
        robots.get(self.ui_state.robot_table.selected()?)
    }

    fn robot_count(&self) -> usize {
        self.robots.data().map_or(0, Vec::len)
    }

    fn clamp_robot_selection(&mut self) {
        let len = self.robot_count();
        let selected = match self.ui_state.robot_table.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.ui_state.robot_table.select(selected);
    }

    /// Move up; the robots table wraps like a list, log and metric views clamp
    fn scroll_up(&mut self, amount: usize) {
        match self.current_screen {
            Screen::Robots => {
                let len = self.robot_count();
                if len == 0 {
                    return;
                }
                let i = match self.ui_state.robot_table.selected() {
                    _ if amount == usize::MAX => 0,
                    Some(0) if amount == 1 => len - 1,
                    Some(i) => i.saturating_sub(amount),
                    None => 0,
                };
                self.ui_state.robot_table.select(Some(i));
            }
            Screen::Logs => {
                self.ui_state.log_scroll = self.ui_state.log_scroll.saturating_sub(amount);
            }
            Screen::Metrics => {
                self.ui_state.metric_scroll = self.ui_state.metric_scroll.saturating_sub(amount);
            }
        }
    }

    /// Move down; renderers clamp log and metric offsets to the content
    fn scroll_down(&mut self, amount: usize) {
        match self.current_screen {
            Screen::Robots => {
                let len = self.robot_count();
                if len == 0 {
                    return;
                }
                let i = match self.ui_state.robot_table.selected() {
                    _ if amount == usize::MAX => len - 1,
                    Some(i) if amount == 1 && i >= len - 1 => 0,
                    Some(i) => i.saturating_add(amount).min(len - 1),
                    None => 0,
                };
                self.ui_state.robot_table.select(Some(i));
            }
            Screen::Logs => {
                let len = self.logs.data().map_or(0, Vec::len);
                self.ui_state.log_scroll = self
                    .ui_state
                    .log_scroll
                    .saturating_add(amount)
                    .min(len.saturating_sub(1));
            }
            Screen::Metrics => {
                let len = self.metric_table.data().map_or(0, |t| t.rows.len());
                self.ui_state.metric_scroll = self
                    .ui_state
                    .metric_scroll
                    .saturating_add(amount)
                    .min(len.saturating_sub(1));
            }
        }
    }

    /// Show an error message
    pub fn show_error(&mut self, msg: String) {
        self.ui_state.error_message = Some(msg);
    }

    /// Dismiss the error message
    pub fn dismiss_error(&mut self) {
        self.ui_state.error_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Mutation;
    use fleetscope_types::RobotStatus;

    fn state() -> (AppState, Instant) {
        (AppState::new(RefreshIntervals::default()), Instant::now())
    }

    fn fetches(state: &mut AppState) -> Vec<(u64, Fetch)> {
        state
            .take_effects()
            .into_iter()
            .filter_map(|e| match e {
                Effect::Fetch { generation, fetch } => Some((generation, fetch)),
                Effect::Mutate { .. } => None,
            })
            .collect()
    }

    fn metric_ranges(state: &mut AppState) -> Vec<MetricRangeQuery> {
        fetches(state)
            .into_iter()
            .filter_map(|(_, f)| match f {
                Fetch::MetricRange(q) => Some(q),
                _ => None,
            })
            .collect()
    }

    fn log_queries(state: &mut AppState) -> Vec<(u64, fleetscope_query::LogQuery)> {
        fetches(state)
            .into_iter()
            .filter_map(|(g, f)| match f {
                Fetch::Logs(q) => Some((g, q)),
                _ => None,
            })
            .collect()
    }

    fn robot(id: &str) -> Robot {
        Robot {
            id: id.to_string(),
            name: format!("robot-{id}"),
            kind: "arm".to_string(),
            status: "idle".to_string(),
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_startup_queries() {
        let (mut state, _) = state();
        state.start();
        let issued: Vec<Fetch> = fetches(&mut state).into_iter().map(|(_, f)| f).collect();
        assert_eq!(
            issued,
            vec![Fetch::Robots, Fetch::LogLabels, Fetch::MetricNames]
        );
    }

    #[test]
    fn test_metrics_without_selection_never_query() {
        let (mut state, now) = state();
        state.navigate_to(Screen::Metrics, now);
        state.set_time_window(TimeWindow::Last1h, now);
        state.dispatch(Action::CycleWindow, now);
        state.dispatch(Action::Refresh, now);
        state.on_tick(now + Duration::from_secs(120));
        assert!(metric_ranges(&mut state).is_empty());
    }

    #[test]
    fn test_selecting_metric_issues_one_range_query() {
        let (mut state, now) = state();
        state.navigate_to(Screen::Metrics, now);
        state.take_effects();

        state.select_metric("robots_added_total".to_string(), now);
        let ranges = metric_ranges(&mut state);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].query, "robots_added_total");
        assert_eq!(ranges[0].step, 300);
        assert_eq!(ranges[0].end - ranges[0].start, 3600);

        // Not due again until the metrics interval elapses
        state.on_tick(now + Duration::from_secs(10));
        assert!(metric_ranges(&mut state).is_empty());
        state.on_tick(now + Duration::from_secs(30));
        assert_eq!(metric_ranges(&mut state).len(), 1);
    }

    #[test]
    fn test_metric_picker_selection() {
        let (mut state, now) = state();
        state.start();
        let names_gen = fetches(&mut state)
            .into_iter()
            .find(|(_, f)| *f == Fetch::MetricNames)
            .map(|(g, _)| g)
            .unwrap();
        state.apply_fetch(
            names_gen,
            FetchOutcome::MetricNames(Ok(strings(&["up", "cpu_seconds"]))),
            Utc::now(),
        );

        state.dispatch(Action::Navigate(Screen::Metrics), now);
        state.dispatch(Action::PickMetric, now);
        for c in "cpu".chars() {
            state.dispatch(Action::PickerInput(c), now);
        }
        state.dispatch(Action::PickerSelect, now);

        assert!(state.ui_state.picker.is_none());
        assert_eq!(state.selected_metric.as_deref(), Some("cpu_seconds"));
        assert_eq!(metric_ranges(&mut state).len(), 1);
    }

    #[test]
    fn test_window_change_refetches_selected_metric() {
        let (mut state, now) = state();
        state.navigate_to(Screen::Metrics, now);
        state.select_metric("up".to_string(), now);
        state.take_effects();

        state.dispatch(Action::CycleWindow, now);
        assert_eq!(state.time_window, TimeWindow::Last3h);
        let ranges = metric_ranges(&mut state);
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].end - ranges[0].start, 3 * 3600);
    }

    #[test]
    fn test_stale_metric_response_dropped() {
        let (mut state, now) = state();
        state.navigate_to(Screen::Metrics, now);
        state.select_metric("a".to_string(), now);
        let first = fetches(&mut state)[0].0;
        state.select_metric("b".to_string(), now);
        let second = fetches(&mut state)[0].0;

        let newer = MetricTable {
            columns: vec!["value".to_string()],
            rows: Vec::new(),
        };
        state.apply_fetch(second, FetchOutcome::MetricRange(Ok(newer.clone())), Utc::now());
        state.apply_fetch(first, FetchOutcome::MetricRange(Ok(MetricTable::default())), Utc::now());
        assert_eq!(state.metric_table.data(), Some(&newer));
    }

    #[test]
    fn test_logs_refresh_only_on_logs_screen() {
        let (mut state, now) = state();
        state.on_tick(now);
        assert!(log_queries(&mut state).is_empty());

        state.navigate_to(Screen::Logs, now);
        assert_eq!(log_queries(&mut state).len(), 1);

        state.on_tick(now + Duration::from_secs(4));
        assert!(log_queries(&mut state).is_empty());
        state.on_tick(now + Duration::from_secs(5));
        assert_eq!(log_queries(&mut state).len(), 1);

        state.navigate_to(Screen::Robots, now);
        state.take_effects();
        state.on_tick(now + Duration::from_secs(60));
        assert!(log_queries(&mut state).is_empty());
    }

    #[test]
    fn test_live_search_supersedes_previous_query() {
        let (mut state, now) = state();
        state.navigate_to(Screen::Logs, now);
        state.take_effects();

        state.dispatch(Action::OpenSearch, now);
        state.dispatch(Action::InputChar('e'), now);
        state.dispatch(Action::InputChar('r'), now);
        let queries = log_queries(&mut state);
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[1].1.expr(), r#"{} |~ "er""#);
        assert!(state.highlighter.is_some());

        // Only the latest generation lands
        let (first, _) = queries[0].clone();
        let (second, _) = queries[1].clone();
        let entry = LogEntry::new("1".to_string(), "error".to_string());
        state.apply_fetch(second, FetchOutcome::Logs(Ok(vec![entry.clone()])), Utc::now());
        state.apply_fetch(first, FetchOutcome::Logs(Ok(Vec::new())), Utc::now());
        assert_eq!(state.logs.data(), Some(&vec![entry]));

        state.dispatch(Action::InputSubmit, now);
        assert_eq!(state.ui_state.input_mode, InputMode::Normal);
        assert_eq!(state.log_filter.search, "er");
    }

    #[test]
    fn test_level_cycle_and_clear() {
        let (mut state, now) = state();
        state.navigate_to(Screen::Logs, now);
        state.take_effects();

        state.dispatch(Action::CycleLevel, now);
        assert_eq!(state.log_filter.level, Some(LogLevel::Error));
        let queries = log_queries(&mut state);
        assert_eq!(queries[0].1.expr(), r#"{} |~ "error""#);

        state.dispatch(Action::ClearFilters, now);
        assert!(state.log_filter.is_empty());
        assert_eq!(log_queries(&mut state).len(), 1);

        // Clearing an already empty filter is not a change
        state.dispatch(Action::ClearFilters, now);
        assert!(log_queries(&mut state).is_empty());
    }

    #[test]
    fn test_time_bounds_from_input() {
        let (mut state, now) = state();
        state.navigate_to(Screen::Logs, now);
        state.take_effects();

        state.dispatch(Action::EditStart, now);
        for c in "2024-01-01T00:00:00Z".chars() {
            state.dispatch(Action::InputChar(c), now);
        }
        // Bound edits don't query until submitted
        assert!(log_queries(&mut state).is_empty());
        state.dispatch(Action::InputSubmit, now);
        let queries = log_queries(&mut state);
        assert_eq!(queries[0].1.start_nanos, Some(1_704_067_200_000_000_000));

        // An end before the start is rejected and editing continues
        state.dispatch(Action::EditEnd, now);
        for c in "2023-12-31T00:00:00Z".chars() {
            state.dispatch(Action::InputChar(c), now);
        }
        state.dispatch(Action::InputSubmit, now);
        assert_eq!(state.ui_state.input_mode, InputMode::End);
        assert!(state.ui_state.input_error.is_some());
        assert!(log_queries(&mut state).is_empty());

        state.dispatch(Action::InputCancel, now);
        assert_eq!(state.ui_state.input_mode, InputMode::Normal);
        assert_eq!(state.log_filter.end(), None);
    }

    #[test]
    fn test_invalid_time_input_kept_open() {
        let (mut state, now) = state();
        state.navigate_to(Screen::Logs, now);
        state.dispatch(Action::EditEnd, now);
        for c in "soon".chars() {
            state.dispatch(Action::InputChar(c), now);
        }
        state.dispatch(Action::InputSubmit, now);
        assert_eq!(state.ui_state.input_mode, InputMode::End);
        assert!(state.ui_state.input_error.is_some());
    }

    #[test]
    fn test_out_of_range_time_rejected_inline() {
        let (mut state, now) = state();
        state.navigate_to(Screen::Logs, now);
        state.take_effects();

        state.dispatch(Action::EditStart, now);
        for c in "3000-01-01 00:00".chars() {
            state.dispatch(Action::InputChar(c), now);
        }
        state.dispatch(Action::InputSubmit, now);
        assert_eq!(state.ui_state.input_mode, InputMode::Start);
        assert!(state.ui_state.input_error.is_some());
        assert_eq!(state.log_filter.start(), None);
        assert!(log_queries(&mut state).is_empty());
    }

    #[test]
    fn test_label_discovery() {
        let (mut state, _) = state();
        state.start();
        let labels_gen = fetches(&mut state)
            .into_iter()
            .find(|(_, f)| *f == Fetch::LogLabels)
            .map(|(g, _)| g)
            .unwrap();

        state.apply_fetch(
            labels_gen,
            FetchOutcome::LogLabels(Ok(strings(&["app", "job"]))),
            Utc::now(),
        );
        let issued: Vec<Fetch> = fetches(&mut state).into_iter().map(|(_, f)| f).collect();
        assert_eq!(issued, vec![Fetch::LabelValues(LabelKind::Service)]);
    }

    #[test]
    fn test_service_picker_sets_filter() {
        let (mut state, now) = state();
        state.navigate_to(Screen::Logs, now);
        let generation = state.services.begin();
        state.apply_fetch(
            generation,
            FetchOutcome::LabelValues(LabelKind::Service, Ok(strings(&["svc-a"]))),
            Utc::now(),
        );
        state.take_effects();

        state.dispatch(Action::PickService, now);
        state.dispatch(Action::PickerDown, now);
        state.dispatch(Action::PickerSelect, now);
        assert_eq!(state.log_filter.service, "svc-a");
        assert_eq!(log_queries(&mut state)[0].1.label_selector, r#"{app="svc-a"}"#);

        // Picking "None" clears it again
        state.dispatch(Action::PickService, now);
        state.dispatch(Action::PickerUp, now);
        state.dispatch(Action::PickerSelect, now);
        assert_eq!(state.log_filter.service, "");
    }

    #[test]
    fn test_add_robot_flow() {
        let (mut state, now) = state();
        state.dispatch(Action::OpenAddForm, now);

        // Incomplete form queues nothing
        state.dispatch(Action::FormSubmit, now);
        assert!(state.take_effects().is_empty());

        for c in "robot1".chars() {
            state.dispatch(Action::FormInput(c), now);
        }
        state.dispatch(Action::FormNextField, now);
        for c in "arm".chars() {
            state.dispatch(Action::FormInput(c), now);
        }
        state.dispatch(Action::FormNextField, now);
        state.dispatch(Action::FormCycleNext, now);
        state.dispatch(Action::FormSubmit, now);

        let effects = state.take_effects();
        assert_eq!(effects.len(), 1);
        match &effects[0] {
            Effect::Mutate {
                mutation: Mutation::AddRobot(req),
                ..
            } => {
                assert_eq!(req.name, "robot1");
                assert_eq!(req.status, Some(RobotStatus::Idle));
            }
            other => panic!("unexpected {other:?}"),
        }

        // Double submit while in flight is ignored
        state.dispatch(Action::FormSubmit, now);
        assert!(state.take_effects().is_empty());

        // Success closes the form and invalidates the robot list
        let generation = state.ui_state.form.as_ref().unwrap().generation;
        state.apply_mutation(generation, Ok(robot("1")));
        assert!(state.ui_state.form.is_none());
        let issued: Vec<Fetch> = fetches(&mut state).into_iter().map(|(_, f)| f).collect();
        assert_eq!(issued, vec![Fetch::Robots]);
    }

    #[test]
    fn test_failed_mutation_keeps_form() {
        let (mut state, now) = state();
        state.dispatch(Action::OpenUpdateForm, now);
        for c in "9".chars() {
            state.dispatch(Action::FormInput(c), now);
        }
        state.dispatch(Action::FormSubmit, now);
        state.take_effects();

        let generation = state.ui_state.form.as_ref().unwrap().generation;
        state.apply_mutation(generation, Err("404 Not Found".to_string()));
        let form = state.ui_state.form.as_ref().unwrap();
        assert_eq!(form.error.as_deref(), Some("404 Not Found"));
        assert!(!form.submitting);
        assert!(state.take_effects().is_empty());
    }

    #[test]
    fn test_cancelled_form_outcome_leaves_new_form() {
        let (mut state, now) = state();
        state.dispatch(Action::OpenUpdateForm, now);
        state.dispatch(Action::FormInput('9'), now);
        state.dispatch(Action::FormSubmit, now);
        let first = match state.take_effects().as_slice() {
            [Effect::Mutate { form, .. }] => *form,
            other => panic!("unexpected {other:?}"),
        };

        // Cancel while in flight, then start another form
        state.dispatch(Action::FormCancel, now);
        state.dispatch(Action::OpenAddForm, now);
        let second = state.ui_state.form.as_ref().unwrap().generation;
        assert_ne!(first, second);

        state.apply_mutation(first, Err("404 Not Found".to_string()));
        let form = state.ui_state.form.as_ref().unwrap();
        assert_eq!(form.generation, second);
        assert_eq!(form.error, None);
        assert_eq!(state.ui_state.error_message.as_deref(), Some("404 Not Found"));

        // A late success still refreshes the list but keeps the new form open
        state.apply_mutation(first, Ok(robot("9")));
        assert!(state.ui_state.form.is_some());
        let issued: Vec<Fetch> = fetches(&mut state).into_iter().map(|(_, f)| f).collect();
        assert_eq!(issued, vec![Fetch::Robots]);
    }

    #[test]
    fn test_update_form_prefills_selected_robot() {
        let (mut state, now) = state();
        let generation = state.robots.begin();
        state.apply_fetch(
            generation,
            FetchOutcome::Robots(Ok(vec![robot("1"), robot("2")])),
            Utc::now(),
        );
        assert_eq!(state.selected_robot().map(|r| r.id.as_str()), Some("1"));

        state.dispatch(Action::ListDown, now);
        state.dispatch(Action::OpenUpdateForm, now);
        assert_eq!(state.ui_state.form.as_ref().unwrap().id, "2");

        state.dispatch(Action::FormCancel, now);
        state.dispatch(Action::ListDown, now);
        assert_eq!(state.selected_robot().map(|r| r.id.as_str()), Some("1"));
    }

    #[test]
    fn test_robot_fetch_error_keeps_previous_list() {
        let (mut state, _) = state();
        let first = state.robots.begin();
        state.apply_fetch(first, FetchOutcome::Robots(Ok(vec![robot("1")])), Utc::now());
        let second = state.robots.begin();
        state.apply_fetch(
            second,
            FetchOutcome::Robots(Err("connection refused".to_string())),
            Utc::now(),
        );
        assert_eq!(state.robots.data().map(Vec::len), Some(1));
        assert_eq!(state.robots.error(), Some("connection refused"));
    }

    #[test]
    fn test_screen_cycle() {
        let (mut state, now) = state();
        state.dispatch(Action::NextScreen, now);
        assert_eq!(state.current_screen, Screen::Logs);
        state.dispatch(Action::PrevScreen, now);
        state.dispatch(Action::PrevScreen, now);
        assert_eq!(state.current_screen, Screen::Metrics);
    }
}
