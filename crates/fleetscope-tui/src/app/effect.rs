use fleetscope_query::{LogQuery, MetricRangeQuery};
use fleetscope_types::{AddRobotRequest, LogEntry, MetricTable, Robot, UpdateRobotRequest};

/// Log labels that feed the service and pod pickers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LabelKind {
    Service,
    Pod,
}

impl LabelKind {
    /// Label name in the log store
    pub fn label(&self) -> &'static str {
        match self {
            Self::Service => "app",
            Self::Pod => "pod",
        }
    }
}

/// A read request against one of the backends
#[derive(Clone, Debug, PartialEq)]
pub enum Fetch {
    Robots,
    LogLabels,
    LabelValues(LabelKind),
    Logs(LogQuery),
    MetricNames,
    MetricRange(MetricRangeQuery),
}

/// A write request against the robot registry
#[derive(Clone, Debug, PartialEq)]
pub enum Mutation {
    AddRobot(AddRobotRequest),
    UpdateRobot {
        id: String,
        request: UpdateRobotRequest,
    },
}

/// Work requested by the state machine; the runtime executes it off the UI task
#[derive(Clone, Debug, PartialEq)]
pub enum Effect {
    Fetch { generation: u64, fetch: Fetch },
    /// `form` is the generation of the form that submitted it
    Mutate { form: u64, mutation: Mutation },
}

/// Result of a [`Fetch`], already reshaped for display
#[derive(Clone, Debug)]
pub enum FetchOutcome {
    Robots(Result<Vec<Robot>, String>),
    LogLabels(Result<Vec<String>, String>),
    LabelValues(LabelKind, Result<Vec<String>, String>),
    Logs(Result<Vec<LogEntry>, String>),
    MetricNames(Result<Vec<String>, String>),
    MetricRange(Result<MetricTable, String>),
}
