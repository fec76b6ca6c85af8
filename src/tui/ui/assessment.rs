//! Assessment progress and result view.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::domain::Assessment;
use crate::tui::styles::ClinicTheme;

/// Assessment screen state
#[derive(Debug, Clone, Default)]
pub enum AssessmentState {
    /// Not started
    #[default]
    Idle,
    /// Scaling the input row
    Scaling { progress: f64 },
    /// Running the classifier and explainer
    Predicting { progress: f64 },
    /// Waiting on the chat model
    Explaining { progress: f64 },
    /// Completed with result
    Complete { assessment: Assessment },
    /// Error occurred
    Error { message: String },
}

/// Render the assessment view
pub fn render_assessment(f: &mut Frame, area: Rect, state: &AssessmentState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0]);
    render_content(f, chunks[1], state);
    render_footer(f, chunks[2], state);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", ClinicTheme::text()),
        Span::styled("Risk Assessment", ClinicTheme::title()),
        Span::styled(" │ Prediction & Attribution", ClinicTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(ClinicTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_content(f: &mut Frame, area: Rect, state: &AssessmentState) {
    match state {
        AssessmentState::Idle => render_idle(f, area),
        AssessmentState::Scaling { progress } => {
            render_progress(f, area, "Scaling", *progress, "Scaling patient data...")
        }
        AssessmentState::Predicting { progress } => render_progress(
            f,
            area,
            "Predicting",
            *progress,
            "Running classifier and attribution explainer...",
        ),
        AssessmentState::Explaining { progress } => render_progress(
            f,
            area,
            "Explaining",
            *progress,
            "Generating medical explanation... It may take a minute...",
        ),
        AssessmentState::Complete { assessment } => render_result(f, area, assessment),
        AssessmentState::Error { message } => render_error(f, area, message),
    }
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Ready to assess heart-disease risk",
            ClinicTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter patient data to begin",
            ClinicTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(ClinicTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_progress(f: &mut Frame, area: Rect, stage: &str, progress: f64, description: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .margin(2)
        .split(area);

    let stage_text = Paragraph::new(Line::from(vec![
        Span::styled("Stage: ", ClinicTheme::text_secondary()),
        Span::styled(stage, ClinicTheme::focused()),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(stage_text, chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(ClinicTheme::border()),
        )
        .gauge_style(ClinicTheme::info())
        .percent((progress * 100.0) as u16)
        .label(format!("{:.0}%", progress * 100.0));
    f.render_widget(gauge, chunks[1]);

    let desc = Paragraph::new(Line::from(Span::styled(
        description,
        ClinicTheme::text_muted(),
    )))
    .alignment(Alignment::Center);
    f.render_widget(desc, chunks[2]);
}

fn render_result(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let block = Block::default()
        .title(Span::styled(" Results ", ClinicTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(ClinicTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                                       // Label
            Constraint::Length(3),                                       // Probability
            Constraint::Length(assessment.top_features.len() as u16 + 2), // Factors
            Constraint::Min(3),                                          // Explanation
        ])
        .margin(1)
        .split(inner);

    // Risk label
    let label_style = ClinicTheme::risk_label(assessment.label);
    let label_display = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("Prediction: {}", assessment.label),
            label_style.add_modifier(ratatui::style::Modifier::BOLD),
        )),
        Line::from(Span::styled(
            assessment.label.description(),
            ClinicTheme::text_secondary(),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(label_display, chunks[0]);

    // Probability bar
    let prob_gauge = Gauge::default()
        .block(
            Block::default()
                .title(Span::styled(" Risk Probability ", ClinicTheme::text_secondary()))
                .borders(Borders::ALL)
                .border_style(ClinicTheme::border()),
        )
        .gauge_style(label_style)
        .percent((assessment.output.probability * 100.0) as u16)
        .label(format!("{:.1}%", assessment.output.probability * 100.0));
    f.render_widget(prob_gauge, chunks[1]);

    render_top_factors(f, chunks[2], assessment);
    render_explanation(f, chunks[3], assessment);
}

/// Horizontal bars standing in for the attribution force plot.
fn render_top_factors(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let max_magnitude = assessment
        .top_features
        .iter()
        .map(|a| a.value.abs())
        .fold(f64::EPSILON, f64::max);

    let bar_width = 20usize;
    let lines: Vec<Line> = assessment
        .top_features
        .iter()
        .map(|attribution| {
            let filled =
                ((attribution.value.abs() / max_magnitude) * bar_width as f64).round() as usize;
            let bar: String = "█".repeat(filled.max(1));
            let style = if attribution.is_risk_increasing() {
                ClinicTheme::danger()
            } else {
                ClinicTheme::success()
            };
            Line::from(vec![
                Span::styled(format!(" {:<22}", attribution.feature), ClinicTheme::text()),
                Span::styled(format!("{bar:<bar_width$} "), style),
                Span::styled(
                    format!("{:.3} ({})", attribution.value.abs(), attribution.direction_label()),
                    ClinicTheme::text_secondary(),
                ),
            ])
        })
        .collect();

    let factors = Paragraph::new(lines).block(
        Block::default()
            .title(Span::styled(
                " Key Contributing Factors ",
                ClinicTheme::text_secondary(),
            ))
            .borders(Borders::ALL)
            .border_style(ClinicTheme::border()),
    );
    f.render_widget(factors, area);
}

fn render_explanation(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let content = match &assessment.explanation {
        Some(text) => Paragraph::new(text.as_str())
            .style(ClinicTheme::text())
            .wrap(Wrap { trim: true }),
        None => Paragraph::new("Explanation unavailable (chat model unreachable).")
            .style(ClinicTheme::text_muted()),
    };

    let explanation = content.block(
        Block::default()
            .title(Span::styled(
                " Medical Explanation ",
                ClinicTheme::text_secondary(),
            ))
            .borders(Borders::ALL)
            .border_style(ClinicTheme::border()),
    );
    f.render_widget(explanation, area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Error", ClinicTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, ClinicTheme::text())),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(ClinicTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_footer(f: &mut Frame, area: Rect, state: &AssessmentState) {
    let content = match state {
        AssessmentState::Complete { .. } => Line::from(vec![
            Span::styled("[N] ", ClinicTheme::key_hint()),
            Span::styled("New Assessment ", ClinicTheme::key_desc()),
            Span::styled("[Esc] ", ClinicTheme::key_hint()),
            Span::styled("Back to Form ", ClinicTheme::key_desc()),
            Span::styled("[Ctrl+L] ", ClinicTheme::key_hint()),
            Span::styled("Logout", ClinicTheme::key_desc()),
        ]),
        AssessmentState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", ClinicTheme::key_hint()),
            Span::styled("Back to Form ", ClinicTheme::key_desc()),
            Span::styled("[Ctrl+L] ", ClinicTheme::key_hint()),
            Span::styled("Logout", ClinicTheme::key_desc()),
        ]),
        _ => Line::from(vec![Span::styled(
            "Analyzing patient data...",
            ClinicTheme::text_muted(),
        )]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(ClinicTheme::border()),
    );

    f.render_widget(footer, area);
}
