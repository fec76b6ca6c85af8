//! Patient data input form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::domain::{ChestPainType, PatientFeatures, RestingEcg, Sex, StSlope};
use crate::tui::styles::ClinicTheme;

/// One form field: free numeric entry or a cycling categorical choice.
#[derive(Debug, Clone)]
pub enum FormField {
    Numeric {
        label: &'static str,
        hint: &'static str,
        value: String,
        min: f64,
        max: f64,
    },
    Choice {
        label: &'static str,
        options: &'static [&'static str],
        selected: usize,
    },
}

impl FormField {
    fn label(&self) -> &'static str {
        match self {
            Self::Numeric { label, .. } | Self::Choice { label, .. } => label,
        }
    }
}

// Field positions, matching the training feature order.
const AGE: usize = 0;
const SEX: usize = 1;
const CHEST_PAIN: usize = 2;
const RESTING_BP: usize = 3;
const CHOLESTEROL: usize = 4;
const FASTING_BS: usize = 5;
const RESTING_ECG: usize = 6;
const MAX_HR: usize = 7;
const EXERCISE_ANGINA: usize = 8;
const OLDPEAK: usize = 9;
const ST_SLOPE: usize = 10;

const YES_NO: &[&str] = &["No", "Yes"];

/// Patient form state.
pub struct PatientFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for PatientFormState {
    fn default() -> Self {
        Self {
            fields: vec![
                FormField::Numeric {
                    label: "Age",
                    hint: "years (20-100)",
                    value: String::new(),
                    min: 20.0,
                    max: 100.0,
                },
                FormField::Choice {
                    label: "Sex",
                    options: &Sex::LABELS,
                    selected: Sex::Male.index(),
                },
                FormField::Choice {
                    label: "Chest Pain Type",
                    options: &ChestPainType::LABELS,
                    selected: 0,
                },
                FormField::Numeric {
                    label: "Resting BP",
                    hint: "mmHg (90-200)",
                    value: String::new(),
                    min: 90.0,
                    max: 200.0,
                },
                FormField::Numeric {
                    label: "Cholesterol",
                    hint: "mg/dl (100-600)",
                    value: String::new(),
                    min: 100.0,
                    max: 600.0,
                },
                FormField::Choice {
                    label: "Fasting Blood Sugar > 120",
                    options: YES_NO,
                    selected: 0,
                },
                FormField::Choice {
                    label: "Resting ECG",
                    options: &RestingEcg::LABELS,
                    selected: 0,
                },
                FormField::Numeric {
                    label: "Max Heart Rate",
                    hint: "bpm (70-220)",
                    value: String::new(),
                    min: 70.0,
                    max: 220.0,
                },
                FormField::Choice {
                    label: "Exercise Induced Angina",
                    options: YES_NO,
                    selected: 0,
                },
                FormField::Numeric {
                    label: "ST Depression",
                    hint: "oldpeak (0.0-6.2)",
                    value: String::new(),
                    min: 0.0,
                    max: 6.2,
                },
                FormField::Choice {
                    label: "ST Segment Slope",
                    options: &StSlope::LABELS,
                    selected: StSlope::Flat.index(),
                },
            ],
            selected_field: 0,
            error_message: None,
        }
    }
}

impl PatientFormState {
    /// Move to the next field
    pub fn next_field(&mut self) {
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Add a character to the current numeric field
    pub fn input_char(&mut self, c: char) {
        if let FormField::Numeric { value, .. } = &mut self.fields[self.selected_field] {
            if c.is_ascii_digit() || c == '.' {
                value.push(c);
                self.error_message = None;
            }
        }
    }

    /// Delete the last character of the current numeric field
    pub fn delete_char(&mut self) {
        if let FormField::Numeric { value, .. } = &mut self.fields[self.selected_field] {
            value.pop();
        }
    }

    /// Clear the current numeric field
    pub fn clear_field(&mut self) {
        if let FormField::Numeric { value, .. } = &mut self.fields[self.selected_field] {
            value.clear();
        }
    }

    /// Cycle the current choice field forward
    pub fn cycle_next(&mut self) {
        if let FormField::Choice {
            options, selected, ..
        } = &mut self.fields[self.selected_field]
        {
            *selected = (*selected + 1) % options.len();
            self.error_message = None;
        }
    }

    /// Cycle the current choice field backward
    pub fn cycle_prev(&mut self) {
        if let FormField::Choice {
            options, selected, ..
        } = &mut self.fields[self.selected_field]
        {
            *selected = (*selected + options.len() - 1) % options.len();
            self.error_message = None;
        }
    }

    fn numeric(&self, index: usize) -> Result<f64, String> {
        match &self.fields[index] {
            FormField::Numeric {
                label,
                value,
                min,
                max,
                ..
            } => {
                let parsed: f64 = value
                    .parse()
                    .map_err(|_| format!("{label}: Invalid number"))?;
                if parsed < *min || parsed > *max {
                    return Err(format!("{label}: Value must be between {min} and {max}"));
                }
                Ok(parsed)
            }
            FormField::Choice { label, .. } => Err(format!("{label}: Expected numeric field")),
        }
    }

    fn choice(&self, index: usize) -> usize {
        match &self.fields[index] {
            FormField::Choice { selected, .. } => *selected,
            FormField::Numeric { .. } => 0,
        }
    }

    /// Validate and convert to `PatientFeatures`.
    ///
    /// # Errors
    /// Returns the first user-visible validation message.
    pub fn to_patient_features(&self) -> Result<PatientFeatures, String> {
        Ok(PatientFeatures {
            age: self.numeric(AGE)?,
            sex: Sex::from_index(self.choice(SEX)).ok_or_else(|| "Sex: Invalid option".to_string())?,
            chest_pain_type: ChestPainType::from_index(self.choice(CHEST_PAIN))
                .ok_or_else(|| "Chest Pain Type: Invalid option".to_string())?,
            resting_bp_s: self.numeric(RESTING_BP)?,
            cholesterol: self.numeric(CHOLESTEROL)?,
            fasting_blood_sugar: self.choice(FASTING_BS) == 1,
            resting_ecg: RestingEcg::from_index(self.choice(RESTING_ECG))
                .ok_or_else(|| "Resting ECG: Invalid option".to_string())?,
            max_heart_rate: self.numeric(MAX_HR)?,
            exercise_angina: self.choice(EXERCISE_ANGINA) == 1,
            oldpeak: self.numeric(OLDPEAK)?,
            st_slope: StSlope::from_index(self.choice(ST_SLOPE))
                .ok_or_else(|| "ST Segment Slope: Invalid option".to_string())?,
        })
    }

    /// Load the sample record used in the form defaults.
    pub fn load_sample_data(&mut self) {
        let numeric = [
            (AGE, "50"),
            (RESTING_BP, "120"),
            (CHOLESTEROL, "200"),
            (MAX_HR, "150"),
            (OLDPEAK, "1.0"),
        ];
        for (index, sample) in numeric {
            if let FormField::Numeric { value, .. } = &mut self.fields[index] {
                *value = sample.to_string();
            }
        }

        let choices = [
            (SEX, Sex::Male.index()),
            (CHEST_PAIN, ChestPainType::Asymptomatic.index()),
            (FASTING_BS, 0),
            (RESTING_ECG, RestingEcg::Normal.index()),
            (EXERCISE_ANGINA, 0),
            (ST_SLOPE, StSlope::Flat.index()),
        ];
        for (index, sample) in choices {
            if let FormField::Choice { selected, .. } = &mut self.fields[index] {
                *selected = sample;
            }
        }
    }
}

/// Render the patient data input form
pub fn render_patient_form(f: &mut Frame, area: Rect, state: &PatientFormState, username: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer/error
        ])
        .split(area);

    render_form_header(f, chunks[0], username);
    render_form_fields(f, chunks[1], state);
    render_form_footer(f, chunks[2], state);
}

fn render_form_header(f: &mut Frame, area: Rect, username: &str) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicTheme::text()),
        Span::styled("Patient Information", ClinicTheme::title()),
        Span::styled(
            format!(" │ Logged in as: {username}"),
            ClinicTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_form_fields(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .margin(1)
        .split(area);

    let mid = (state.fields.len() + 1) / 2;

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
    let field_height = 3;
    let constraints: Vec<Constraint> = fields
        .iter()
        .map(|_| Constraint::Length(field_height))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_selected = offset + i == selected;
        let border_style = if is_selected {
            ClinicTheme::border_focused()
        } else {
            ClinicTheme::border()
        };
        let title_style = if is_selected {
            ClinicTheme::focused()
        } else {
            ClinicTheme::text_secondary()
        };

        let block = Block::default()
            .title(Span::styled(format!(" {} ", field.label()), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let content = match field {
            FormField::Numeric { value, hint, .. } => {
                let value_display = if value.is_empty() {
                    Span::styled(*hint, ClinicTheme::text_muted())
                } else {
                    Span::styled(value.as_str(), ClinicTheme::text())
                };
                Paragraph::new(Line::from(vec![
                    Span::raw(" "),
                    value_display,
                    if is_selected {
                        Span::styled("▌", ClinicTheme::cursor())
                    } else {
                        Span::raw("")
                    },
                ]))
            }
            FormField::Choice {
                options, selected, ..
            } => Paragraph::new(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    if is_selected { "‹ " } else { "  " },
                    ClinicTheme::key_hint(),
                ),
                Span::styled(options[*selected], ClinicTheme::text()),
                Span::styled(
                    if is_selected { " ›" } else { "  " },
                    ClinicTheme::key_hint(),
                ),
            ])),
        }
        .block(block);

        f.render_widget(content, chunks[i]);
    }
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &PatientFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", ClinicTheme::danger()),
            Span::styled(err.clone(), ClinicTheme::danger()),
        ])
    } else {
        Line::from(vec![
            Span::styled("[↑↓] ", ClinicTheme::key_hint()),
            Span::styled("Navigate ", ClinicTheme::key_desc()),
            Span::styled("[←→] ", ClinicTheme::key_hint()),
            Span::styled("Change option ", ClinicTheme::key_desc()),
            Span::styled("[Enter] ", ClinicTheme::key_hint()),
            Span::styled("Predict Risk ", ClinicTheme::key_desc()),
            Span::styled("[S] ", ClinicTheme::key_hint()),
            Span::styled("Sample Data ", ClinicTheme::key_desc()),
            Span::styled("[Ctrl+L] ", ClinicTheme::key_hint()),
            Span::styled("Logout", ClinicTheme::key_desc()),
        ])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicTheme::border()),
    );

    f.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_data_converts_to_features() {
        let mut state = PatientFormState::default();
        state.load_sample_data();

        let features = state.to_patient_features().expect("sample should convert");
        assert!((features.age - 50.0).abs() < f64::EPSILON);
        assert_eq!(features.sex, Sex::Male);
        assert_eq!(features.chest_pain_type, ChestPainType::Asymptomatic);
        assert!(!features.fasting_blood_sugar);
        assert_eq!(features.st_slope, StSlope::Flat);
        assert!(features.validate().is_ok());
    }

    #[test]
    fn test_empty_numeric_field_is_an_error() {
        let state = PatientFormState::default();
        let result = state.to_patient_features();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Age"));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut state = PatientFormState::default();
        state.load_sample_data();
        if let FormField::Numeric { value, .. } = &mut state.fields[CHOLESTEROL] {
            *value = "700".to_string();
        }

        let err = state.to_patient_features().expect_err("should reject");
        assert!(err.contains("Cholesterol"));
    }

    #[test]
    fn test_choice_cycles_wrap() {
        let mut state = PatientFormState::default();
        state.selected_field = ST_SLOPE;
        assert_eq!(state.choice(ST_SLOPE), StSlope::Flat.index());

        state.cycle_next();
        state.cycle_next();
        assert_eq!(state.choice(ST_SLOPE), StSlope::Upsloping.index());

        state.cycle_prev();
        assert_eq!(state.choice(ST_SLOPE), StSlope::Downsloping.index());
    }

    #[test]
    fn test_numeric_input_ignores_letters() {
        let mut state = PatientFormState::default();
        state.selected_field = AGE;
        state.input_char('5');
        state.input_char('x');
        state.input_char('7');

        if let FormField::Numeric { value, .. } = &state.fields[AGE] {
            assert_eq!(value, "57");
        } else {
            panic!("age should be numeric");
        }
    }
}
