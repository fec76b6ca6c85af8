//! Login form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{render_auth_fields, AuthField};
use crate::tui::styles::{ClinicTheme, APP_NAME};

const USERNAME: usize = 0;
const PASSWORD: usize = 1;

/// Login form state.
pub struct LoginState {
    pub fields: Vec<AuthField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
    pub info_message: Option<String>,
}

impl Default for LoginState {
    fn default() -> Self {
        Self {
            fields: vec![
                AuthField::new("Username", false),
                AuthField::new("Password", true),
            ],
            selected_field: 0,
            error_message: None,
            info_message: None,
        }
    }
}

impl LoginState {
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
    pub fn password(&self) -> &str {
        &self.fields[PASSWORD].value
    }

    /// Wipe the password buffer.
    pub fn wipe_password(&mut self) {
        self.fields[PASSWORD].wipe();
    }
}

/// Render the login screen.
pub fn render_login(f: &mut Frame, area: Rect, state: &LoginState) {
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
        Span::styled("Login", ClinicTheme::title()),
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

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(chunks[1]);
    render_auth_fields(f, columns[1], &state.fields, state.selected_field);

    render_footer(f, chunks[2], state);
}

fn render_footer(f: &mut Frame, area: Rect, state: &LoginState) {
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
            Span::styled("Login ", ClinicTheme::key_desc()),
            Span::styled("[Ctrl+R] ", ClinicTheme::key_hint()),
            Span::styled("Go to Registration ", ClinicTheme::key_desc()),
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
    fn test_input_and_wipe() {
        let mut state = LoginState::default();
        for c in "ana".chars() {
            state.input_char(c);
        }
        state.next_field();
        for c in "pw".chars() {
            state.input_char(c);
        }

        assert_eq!(state.username(), "ana");
        assert_eq!(state.password(), "pw");

        state.wipe_password();
        assert!(state.password().is_empty());
        assert_eq!(state.username(), "ana");
    }
}
