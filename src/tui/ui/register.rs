//! Registration form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{render_auth_fields, AuthField};
use crate::tui::styles::{ClinicTheme, APP_NAME};

const USERNAME: usize = 0;
const EMAIL: usize = 1;
const PASSWORD: usize = 2;
const CONFIRM: usize = 3;

/// Registration form state.
pub struct RegisterState {
    pub fields: Vec<AuthField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
    pub info_message: Option<String>,
}

impl Default for RegisterState {
    fn default() -> Self {
        Self {
            fields: vec![
                AuthField::new("Username", false),
                AuthField::new("Email", false),
                AuthField::new("Password", true),
                AuthField::new("Confirm Password", true),
            ],
            selected_field: 0,
            error_message: None,
            info_message: None,
        }
    }
}

impl RegisterState {
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

    pub fn input_char(&mut self, c: char) {
        if !c.is_control() {
            self.fields[self.selected_field].value.push(c);
            self.error_message = None;
        }
    }

    pub fn delete_char(&mut self) {
        self.fields[self.selected_field].value.pop();
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.fields[USERNAME].value
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.fields[EMAIL].value
    }

    #[must_use]
    pub fn password(&self) -> &str {
        &self.fields[PASSWORD].value
    }

    #[must_use]
    pub fn confirm(&self) -> &str {
        &self.fields[CONFIRM].value
    }

    /// Wipe both password buffers.
    pub fn wipe_passwords(&mut self) {
        self.fields[PASSWORD].wipe();
        self.fields[CONFIRM].wipe();
    }
}

/// Render the registration screen.
pub fn render_register(f: &mut Frame, area: Rect, state: &RegisterState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Form
            Constraint::Length(3), // Footer / messages
        ])
        .split(area);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicTheme::text()),
        Span::styled("Register", ClinicTheme::title()),
        Span::styled(
            format!(" │ {APP_NAME} Heart Disease Risk Predictor"),
            ClinicTheme::text_secondary(),
        ),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicTheme::border()),
    );
    f.render_widget(header, chunks[0]);

    let form_area = centered_form(chunks[1]);
    render_auth_fields(f, form_area, &state.fields, state.selected_field);

    render_footer(f, chunks[2], state);
}

fn centered_form(area: Rect) -> Rect {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(area);
    columns[1]
}

fn render_footer(f: &mut Frame, area: Rect, state: &RegisterState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", ClinicTheme::danger()),
            Span::styled(err.clone(), ClinicTheme::danger()),
        ])
    } else if let Some(info) = &state.info_message {
        Line::from(vec![Span::styled(info.clone(), ClinicTheme::success())])
    } else {
        Line::from(vec![
            Span::styled("[Tab] ", ClinicTheme::key_hint()),
            Span::styled("Next field ", ClinicTheme::key_desc()),
            Span::styled("[Enter] ", ClinicTheme::key_hint()),
            Span::styled("Register ", ClinicTheme::key_desc()),
            Span::styled("[Ctrl+L] ", ClinicTheme::key_hint()),
            Span::styled("Go to Login ", ClinicTheme::key_desc()),
            Span::styled("[Ctrl+Q] ", ClinicTheme::key_hint()),
            Span::styled("Quit", ClinicTheme::key_desc()),
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
    fn test_field_navigation_wraps() {
        let mut state = RegisterState::default();
        assert_eq!(state.selected_field, 0);
        state.prev_field();
        assert_eq!(state.selected_field, 3);
        state.next_field();
        assert_eq!(state.selected_field, 0);
    }

    #[test]
    fn test_password_fields_masked_and_wiped() {
        let mut state = RegisterState::default();
        state.selected_field = 2;
        for c in "secret".chars() {
            state.input_char(c);
        }

        assert_eq!(state.password(), "secret");
        assert_eq!(state.fields[2].display_value(), "••••••");

        state.wipe_passwords();
        assert!(state.password().is_empty());
        assert!(state.confirm().is_empty());
    }
}
