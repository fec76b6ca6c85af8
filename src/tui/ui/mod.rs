//! UI module: View components for the TUI.

pub mod assessment;
pub mod login;
pub mod patient;
pub mod register;

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use zeroize::Zeroize;

use crate::tui::styles::ClinicTheme;

/// A single-line text input for the auth forms.
#[derive(Debug, Clone)]
pub struct AuthField {
    pub label: &'static str,
    pub value: String,
    /// Render the value as dots (passwords).
    pub masked: bool,
}

impl AuthField {
    #[must_use]
    pub fn new(label: &'static str, masked: bool) -> Self {
        Self {
            label,
            value: String::new(),
            masked,
        }
    }

    /// Value as shown on screen.
    #[must_use]
    pub fn display_value(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    /// Wipe the buffer (used for password fields after submission).
    pub fn wipe(&mut self) {
        self.value.zeroize();
        self.value.clear();
    }
}

/// Render a column of auth input fields with the selected one highlighted.
pub(crate) fn render_auth_fields(f: &mut Frame, area: Rect, fields: &[AuthField], selected: usize) {
    use ratatui::layout::{Constraint, Direction, Layout};

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
        let is_selected = i == selected;
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
            .title(Span::styled(format!(" {} ", field.label), title_style))
            .borders(Borders::ALL)
            .border_style(border_style);

        let content = Paragraph::new(Line::from(vec![
            Span::raw(" "),
            Span::styled(field.display_value(), ClinicTheme::text()),
            if is_selected {
                Span::styled("▌", ClinicTheme::cursor())
            } else {
                Span::raw("")
            },
        ]))
        .block(block);

        f.render_widget(content, chunks[i]);
    }
}

/// Render the bottom disclaimer bar shown on every screen.
pub fn render_disclaimer(f: &mut Frame, area: Rect) {
    let text = vec![Line::from(vec![Span::styled(
        "DISCLAIMER: This tool provides indicative estimates and does not replace professional medical evaluation.",
        ClinicTheme::text_muted(),
    )])];

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(ClinicTheme::border());

    let p = Paragraph::new(text).block(block).wrap(Wrap { trim: true });

    f.render_widget(p, area);
}
