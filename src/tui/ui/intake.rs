//! Risk assessment intake form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{CategoricalField, PatientInput, PatientSubmission};
use crate::tui::styles::MedicalTheme;
use crate::StrokeRiskError;

const PLACEHOLDER: &str = "Select option";

/// Value editor behind one form row.
#[derive(Debug, Clone)]
pub enum FieldInput {
    /// Free text, parsed on submit
    Number { value: String, hint: &'static str },
    /// Index into the field's label table; `None` is the placeholder
    Choice {
        field: CategoricalField,
        selected: Option<usize>,
    },
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub input: FieldInput,
}

impl FormField {
    fn number(label: &'static str, hint: &'static str) -> Self {
        Self {
            label,
            input: FieldInput::Number {
                value: String::new(),
                hint,
            },
        }
    }

    fn choice(label: &'static str, field: CategoricalField) -> Self {
        Self {
            label,
            input: FieldInput::Choice {
                field,
                selected: None,
            },
        }
    }

    fn display(&self) -> (String, bool) {
        match &self.input {
            FieldInput::Number { value, hint } if value.is_empty() => ((*hint).to_owned(), false),
            FieldInput::Number { value, .. } => (value.clone(), true),
            FieldInput::Choice {
                selected: None, ..
            } => (PLACEHOLDER.to_owned(), false),
            FieldInput::Choice {
                field,
                selected: Some(i),
            } => (format!("◀ {} ▶", field.labels()[*i]), true),
        }
    }

    fn chosen(&self) -> Option<String> {
        match &self.input {
            FieldInput::Choice {
                field,
                selected: Some(i),
            } => field.labels().get(*i).map(|s| (*s).to_owned()),
            _ => None,
        }
    }
}

/// Form rows, in display order
const AGE: usize = 0;
const GENDER: usize = 1;
const EVER_MARRIED: usize = 2;
const WORK_TYPE: usize = 3;
const HYPERTENSION: usize = 4;
const HEART_DISEASE: usize = 5;
const GLUCOSE: usize = 6;
const SMOKING: usize = 7;

/// Intake form state
pub struct IntakeFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub consent: bool,
    pub error_message: Option<String>,
}

impl Default for IntakeFormState {
    fn default() -> Self {
        Self {
            fields: vec![
                FormField::number("Age", "years (18-100)"),
                FormField::choice("Gender", CategoricalField::Gender),
                FormField::choice("Ever Married?", CategoricalField::EverMarried),
                FormField::choice("Work Type", CategoricalField::WorkType),
                FormField::choice("Hypertension?", CategoricalField::Hypertension),
                FormField::choice("Heart Disease?", CategoricalField::HeartDisease),
                FormField::number("Avg Glucose Level", "mg/dL (55.0-300.0)"),
                FormField::choice("Smoking Status", CategoricalField::SmokingStatus),
            ],
            selected_field: 0,
            consent: false,
            error_message: None,
        }
    }
}

impl IntakeFormState {
    /// Pre-fill the form from a previous submission.
    #[must_use]
    pub fn from_input(input: &PatientInput) -> Self {
        let mut state = Self::default();
        let submission = PatientSubmission::from(input);
        state.set_number(AGE, submission.age.map(|v| v.to_string()));
        state.set_number(GLUCOSE, submission.avg_glucose_level.map(|v| v.to_string()));
        state.set_choice(GENDER, submission.gender.as_deref());
        state.set_choice(EVER_MARRIED, submission.ever_married.as_deref());
        state.set_choice(WORK_TYPE, submission.work_type.as_deref());
        state.set_choice(HYPERTENSION, submission.hypertension.as_deref());
        state.set_choice(HEART_DISEASE, submission.heart_disease.as_deref());
        state.set_choice(SMOKING, submission.smoking_status.as_deref());
        state
    }

    fn set_number(&mut self, index: usize, text: Option<String>) {
        if let FieldInput::Number { value, .. } = &mut self.fields[index].input {
            *value = text.unwrap_or_default();
        }
    }

    fn set_choice(&mut self, index: usize, label: Option<&str>) {
        if let FieldInput::Choice { field, selected } = &mut self.fields[index].input {
            *selected = label.and_then(|l| field.labels().iter().position(|c| *c == l));
        }
    }

    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Cycle the selected choice forwards or backwards, passing through
    /// the placeholder.
    pub fn cycle_choice(&mut self, forward: bool) {
        if let FieldInput::Choice { field, selected } = &mut self.fields[self.selected_field].input {
            let n = field.labels().len();
            *selected = match (*selected, forward) {
                (None, true) => Some(0),
                (None, false) => Some(n - 1),
                (Some(i), true) if i + 1 < n => Some(i + 1),
                (Some(i), false) if i > 0 => Some(i - 1),
                (Some(_), _) => None,
            };
            self.error_message = None;
        }
    }

    pub fn input_char(&mut self, c: char) {
        if let FieldInput::Number { value, .. } = &mut self.fields[self.selected_field].input {
            if c.is_ascii_digit() || c == '.' {
                value.push(c);
                self.error_message = None;
            }
        }
    }

    pub fn delete_char(&mut self) {
        if let FieldInput::Number { value, .. } = &mut self.fields[self.selected_field].input {
            value.pop();
        }
    }

    /// Clear the current field back to empty or the placeholder.
    pub fn clear_field(&mut self) {
        match &mut self.fields[self.selected_field].input {
            FieldInput::Number { value, .. } => value.clear(),
            FieldInput::Choice { selected, .. } => *selected = None,
        }
    }

    pub fn toggle_consent(&mut self) {
        self.consent = !self.consent;
        self.error_message = None;
    }

    fn number(&self, index: usize) -> Option<&str> {
        match &self.fields[index].input {
            FieldInput::Number { value, .. } if !value.is_empty() => Some(value.as_str()),
            _ => None,
        }
    }

    /// Collect the raw form values. Empty fields and placeholders stay `None`.
    ///
    /// # Errors
    /// Returns a message if a numeric field does not parse.
    pub fn to_submission(&self) -> Result<PatientSubmission, String> {
        let age = self
            .number(AGE)
            .map(|v| v.parse::<u32>().map_err(|_| "Age: Invalid whole number".to_string()))
            .transpose()?;
        let avg_glucose_level = self
            .number(GLUCOSE)
            .map(|v| v.parse::<f64>().map_err(|_| "Avg Glucose Level: Invalid number".to_string()))
            .transpose()?;

        Ok(PatientSubmission {
            age,
            avg_glucose_level,
            gender: self.fields[GENDER].chosen(),
            ever_married: self.fields[EVER_MARRIED].chosen(),
            work_type: self.fields[WORK_TYPE].chosen(),
            hypertension: self.fields[HYPERTENSION].chosen(),
            heart_disease: self.fields[HEART_DISEASE].chosen(),
            smoking_status: self.fields[SMOKING].chosen(),
        })
    }

    /// Check consent, then resolve the form into a complete input.
    ///
    /// # Errors
    /// Returns the message to show under the form.
    pub fn resolve(&self) -> Result<PatientInput, String> {
        if !self.consent {
            return Err("You must agree to the terms before proceeding!".into());
        }
        let submission = self.to_submission()?;
        submission.resolve().map_err(|e| match e {
            StrokeRiskError::UserInputIncomplete(missing) => format!(
                "Please complete all fields with valid values before submitting ({})",
                missing.join(", ")
            ),
            other => other.to_string(),
        })
    }

    /// Load the reference patient used in the docs.
    pub fn load_sample_data(&mut self) {
        self.set_number(AGE, Some("45".into()));
        self.set_number(GLUCOSE, Some("110.0".into()));
        self.set_choice(GENDER, Some("Female"));
        self.set_choice(EVER_MARRIED, Some("Yes"));
        self.set_choice(WORK_TYPE, Some("Private"));
        self.set_choice(HYPERTENSION, Some("No"));
        self.set_choice(HEART_DISEASE, Some("No"));
        self.set_choice(SMOKING, Some("never smoked"));
        self.error_message = None;
    }
}

/// Render the intake form
pub fn render_intake_form(f: &mut Frame, area: Rect, state: &IntakeFormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(5), // Consent
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0]);
    render_form_fields(f, chunks[1], state);
    render_consent(f, chunks[2], state.consent);
    render_form_footer(f, chunks[3], state);
}

fn render_form_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Risk Assessment", MedicalTheme::title()),
        Span::styled(
            " │ Personal and Health Information",
            MedicalTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &IntakeFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    // Personal information left, health information right.
    let mid = HYPERTENSION;
    render_field_column(f, columns[0], &state.fields[..mid], 0, state.selected_field);
    render_field_column(
        f,
        columns[1],
        &state.fields[mid..],
        mid,
        state.selected_field,
    );
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    fields: &[FormField],
    offset: usize,
    selected: usize,
) {
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let (border_style, title_style) = if is_selected {
            (MedicalTheme::border_focused(), MedicalTheme::focused())
        } else {
            (MedicalTheme::border(), MedicalTheme::text_secondary())
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let (text, filled) = field.display();
        let value_style = if filled {
            MedicalTheme::text()
        } else {
            MedicalTheme::text_muted()
        };

        let cursor = match field.input {
            FieldInput::Number { .. } if is_selected => Span::styled("▌", MedicalTheme::focused()),
            _ => Span::raw(""),
        };

        let content = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            Span::styled(text, value_style),
            cursor,
        ]))
        .block(block);

        f.render_widget(content, chunks[i]);
    }
}

fn render_consent(f: &mut Frame, area: Rect, consent: bool) {
    let (mark, style) = if consent {
        ("[x]", MedicalTheme::success())
    } else {
        ("[ ]", MedicalTheme::text_secondary())
    };

    let text = vec![
        Line::from(Span::styled(
            "This tool provides an estimate of stroke risk based on the information you provide. \
             It is not a diagnostic tool and should not replace professional medical advice.",
            MedicalTheme::text_muted(),
        )),
        Line::from(vec![
            Span::styled(format!("{mark} "), style),
            Span::styled("I agree to the terms and allow risk estimation", MedicalTheme::text()),
        ]),
    ];

    let block = Block::default()
        .title(Span::styled(" Consent and Disclaimer ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(Paragraph::new(text).block(block).wrap(Wrap { trim: true }), area);
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &IntakeFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", MedicalTheme::danger()),
            Span::styled(err.clone(), MedicalTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", MedicalTheme::key_hint()),
            Span::styled("Navigate ", MedicalTheme::key_desc()),
            Span::styled("[←→] ", MedicalTheme::key_hint()),
            Span::styled("Choose ", MedicalTheme::key_desc()),
            Span::styled("[Space] ", MedicalTheme::key_hint()),
            Span::styled("Consent ", MedicalTheme::key_desc()),
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Calculate ", MedicalTheme::key_desc()),
            Span::styled("[S] ", MedicalTheme::key_hint()),
            Span::styled("Sample ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Back", MedicalTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
