use fleetscope_types::{
    AddRobotRequest, RobotStatus, UpdateRobotRequest, ValidationError, robot_id,
};

use super::Mutation;

/// Which robot form is open
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormKind {
    Add,
    Update,
}

impl FormKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Add => " Add Robot ",
            Self::Update => " Update Robot ",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Id,
    Name,
    Type,
    Status,
}

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Id => "Robot ID",
            Self::Name => "Name",
            Self::Type => "Type",
            Self::Status => "Status",
        }
    }
}

const ADD_FIELDS: &[FormField] = &[FormField::Name, FormField::Type, FormField::Status];
const UPDATE_FIELDS: &[FormField] = &[
    FormField::Id,
    FormField::Name,
    FormField::Type,
    FormField::Status,
];

/// Add/update robot dialog state
#[derive(Clone, Debug)]
pub struct RobotForm {
    pub kind: FormKind,
    pub id: String,
    pub name: String,
    pub robot_type: String,
    pub status: Option<RobotStatus>,
    /// Index into [`RobotForm::fields`]
    pub focus: usize,
    /// Message from the last failed submission
    pub error: Option<String>,
    pub submitting: bool,
    /// Assigned when the form is opened; tags its mutation
    pub generation: u64,
}

impl RobotForm {
    fn empty(kind: FormKind) -> Self {
        Self {
            kind,
            id: String::new(),
            name: String::new(),
            robot_type: String::new(),
            status: None,
            focus: 0,
            error: None,
            submitting: false,
            generation: 0,
        }
    }

    pub fn add() -> Self {
        Self::empty(FormKind::Add)
    }

    /// Update form with the robot id prefilled; focus starts on the first
    /// field that still needs input
    pub fn update(id: Option<&str>) -> Self {
        let mut form = Self::empty(FormKind::Update);
        if let Some(id) = id {
            form.id = id.to_string();
            form.focus = 1;
        }
        form
    }

    pub fn fields(&self) -> &'static [FormField] {
        match self.kind {
            FormKind::Add => ADD_FIELDS,
            FormKind::Update => UPDATE_FIELDS,
        }
    }

    pub fn focused(&self) -> FormField {
        self.fields()[self.focus.min(self.fields().len() - 1)]
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % self.fields().len();
    }

    pub fn prev_field(&mut self) {
        let len = self.fields().len();
        self.focus = (self.focus + len - 1) % len;
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focused() {
            FormField::Id => Some(&mut self.id),
            FormField::Name => Some(&mut self.name),
            FormField::Type => Some(&mut self.robot_type),
            FormField::Status => None,
        }
    }

    /// Type into the focused text field; on the status field any key cycles
    pub fn input_char(&mut self, c: char) {
        match self.focused_text() {
            Some(text) => text.push(c),
            None if c == ' ' => self.cycle_status(true),
            None => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focused_text() {
            Some(text) => {
                text.pop();
            }
            None => self.status = None,
        }
    }

    pub fn clear(&mut self) {
        match self.focused_text() {
            Some(text) => text.clear(),
            None => self.status = None,
        }
    }

    /// Cycle the status selector through None and every known status
    pub fn cycle_status(&mut self, forward: bool) {
        self.status = if forward {
            RobotStatus::cycle(self.status)
        } else {
            RobotStatus::cycle_back(self.status)
        };
    }

    fn status_text(&self) -> &'static str {
        self.status.map(|s| s.as_str()).unwrap_or("")
    }

    /// Build the request this form would send
    pub fn to_mutation(&self) -> Result<Mutation, ValidationError> {
        match self.kind {
            FormKind::Add => Ok(Mutation::AddRobot(AddRobotRequest::new(
                &self.name,
                &self.robot_type,
                self.status_text(),
            )?)),
            FormKind::Update => Ok(Mutation::UpdateRobot {
                id: robot_id(&self.id)?,
                request: UpdateRobotRequest::new(&self.name, &self.robot_type, self.status_text())?,
            }),
        }
    }

    /// Submit stays disabled until required fields are filled
    pub fn can_submit(&self) -> bool {
        !self.submitting && self.to_mutation().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_requires_name_and_type() {
        let mut form = RobotForm::add();
        assert!(!form.can_submit());

        "robot1".chars().for_each(|c| form.input_char(c));
        assert!(!form.can_submit());

        form.next_field();
        "arm".chars().for_each(|c| form.input_char(c));
        assert!(form.can_submit());

        match form.to_mutation().unwrap() {
            Mutation::AddRobot(req) => {
                assert_eq!(req.name, "robot1");
                assert_eq!(req.kind, "arm");
                assert_eq!(req.status, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_whitespace_name_is_blank() {
        let mut form = RobotForm::add();
        form.name = "   ".to_string();
        form.robot_type = "arm".to_string();
        assert!(matches!(
            form.to_mutation(),
            Err(ValidationError::MissingName)
        ));
    }

    #[test]
    fn test_update_needs_only_id() {
        let form = RobotForm::update(Some("42"));
        assert_eq!(form.focused(), FormField::Name);
        match form.to_mutation().unwrap() {
            Mutation::UpdateRobot { id, request } => {
                assert_eq!(id, "42");
                assert!(request.is_empty());
            }
            other => panic!("unexpected {other:?}"),
        }

        let blank = RobotForm::update(None);
        assert_eq!(blank.focused(), FormField::Id);
        assert!(!blank.can_submit());
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = RobotForm::add();
        form.prev_field();
        assert_eq!(form.focused(), FormField::Status);
        form.next_field();
        assert_eq!(form.focused(), FormField::Name);
    }

    #[test]
    fn test_status_selector() {
        let mut form = RobotForm::update(Some("7"));
        form.focus = 3;
        form.input_char('x');
        assert_eq!(form.status, None);

        form.cycle_status(true);
        assert_eq!(form.status, Some(RobotStatus::Idle));
        form.cycle_status(false);
        assert_eq!(form.status, None);
        form.cycle_status(false);
        assert_eq!(form.status, Some(RobotStatus::Error));

        match form.to_mutation().unwrap() {
            Mutation::UpdateRobot { request, .. } => {
                assert_eq!(request.status, Some(RobotStatus::Error));
                assert_eq!(request.name, None);
            }
            other => panic!("unexpected {other:?}"),
        }

        form.backspace();
        assert_eq!(form.status, None);
    }
}
