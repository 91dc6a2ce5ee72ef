//! Results view: risk gauge and per-feature contribution chart.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Gauge, Paragraph, Wrap},
    Frame,
};

use crate::domain::{Assessment, RiskBand};
use crate::tui::styles::MedicalTheme;

/// Results screen state
#[derive(Debug, Clone, Default)]
pub enum ResultsState {
    /// Nothing submitted yet
    #[default]
    Idle,
    /// Encoding and standardizing
    Preparing { progress: f64 },
    /// Running the classifier
    Predicting { progress: f64 },
    /// Computing attributions
    Explaining { progress: f64 },
    /// Completed with result
    Complete { assessment: Box<Assessment> },
    /// Error occurred
    Error { message: String },
}

impl ResultsState {
    /// Progress of a running assessment, if one is running.
    #[must_use]
    pub fn progress(&self) -> Option<f64> {
        match self {
            Self::Preparing { progress }
            | Self::Predicting { progress }
            | Self::Explaining { progress } => Some(*progress),
            _ => None,
        }
    }
}

/// Render the results view
pub fn render_results(f: &mut Frame, area: Rect, state: &ResultsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_results_header(f, chunks[0]);
    render_results_content(f, chunks[1], state);
    render_results_footer(f, chunks[2], state);
}

fn render_results_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Results", MedicalTheme::title()),
        Span::styled(" │ Stroke Risk and Feature Contributions", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_results_content(f: &mut Frame, area: Rect, state: &ResultsState) {
    match state {
        ResultsState::Idle => render_idle(f, area),
        ResultsState::Preparing { progress } => {
            render_progress(f, area, "Preparing", *progress, "Encoding and standardizing inputs...")
        }
        ResultsState::Predicting { progress } => {
            render_progress(f, area, "Predicting", *progress, "Running the stroke risk model...")
        }
        ResultsState::Explaining { progress } => {
            render_progress(f, area, "Explaining", *progress, "Computing feature contributions...")
        }
        ResultsState::Complete { assessment } => render_assessment(f, area, assessment),
        ResultsState::Error { message } => render_error(f, area, message),
    }
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No results yet",
            MedicalTheme::text_secondary(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Complete the risk assessment first",
            MedicalTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
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
        Span::styled("Stage: ", MedicalTheme::text_secondary()),
        Span::styled(stage, MedicalTheme::focused()),
    ]))
    .alignment(Alignment::Center);
    f.render_widget(stage_text, chunks[0]);

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(MedicalTheme::border()),
        )
        .gauge_style(MedicalTheme::info())
        .ratio(progress.clamp(0.0, 1.0))
        .label(format!("{:.0}%", progress * 100.0));
    f.render_widget(gauge, chunks[1]);

    let desc = Paragraph::new(Line::from(Span::styled(
        description,
        MedicalTheme::text_muted(),
    )))
    .alignment(Alignment::Center);
    f.render_widget(desc, chunks[2]);
}

fn render_assessment(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_risk_panel(f, columns[0], assessment);
    render_contributions(f, columns[1], assessment);
}

fn render_risk_panel(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let block = Block::default()
        .title(Span::styled(" Overall Stroke Risk ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border_focused());

    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Band
            Constraint::Length(3), // Gauge
            Constraint::Min(0),    // Details
        ])
        .margin(1)
        .split(inner);

    let band = assessment.band;
    let risk_style = MedicalTheme::risk_band(band);
    let icon = match band {
        RiskBand::Zero | RiskBand::Low => "OK",
        RiskBand::Moderate | RiskBand::High => "!",
    };

    let band_display = Paragraph::new(vec![
        Line::from(Span::styled(
            format!("{icon} {band} RISK"),
            risk_style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(band.description(), MedicalTheme::text_secondary())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    f.render_widget(band_display, chunks[0]);

    let probability = assessment.result.probability;
    let gauge = Gauge::default()
        .gauge_style(MedicalTheme::gauge(probability))
        .ratio(probability.clamp(0.0, 1.0))
        .label(format!("{:.2}%", assessment.result.percent()));
    f.render_widget(gauge, chunks[1]);

    let mut details = vec![Line::from(vec![
        Span::styled("Model: ", MedicalTheme::text_secondary()),
        Span::styled(assessment.model_id.clone(), MedicalTheme::text()),
    ])];
    details.push(Line::from(vec![
        Span::styled("Assessed: ", MedicalTheme::text_secondary()),
        Span::styled(
            assessment.created_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            MedicalTheme::text(),
        ),
    ]));
    if let Some(top) = assessment.result.dominant() {
        if top.share > 0.0 {
            details.push(Line::from(vec![
                Span::styled("Largest factor: ", MedicalTheme::text_secondary()),
                Span::styled(top.feature().label(), MedicalTheme::focused()),
            ]));
        }
    }
    f.render_widget(Paragraph::new(details), chunks[2]);
}

fn render_contributions(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let block = Block::default()
        .title(Span::styled(
            " Contribution to Risk (%) ",
            MedicalTheme::subtitle(),
        ))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    // Hundredths of a percent so small shares still get a visible value.
    let bars: Vec<Bar> = assessment
        .result
        .contributions
        .iter()
        .map(|c| {
            let percent = c.percent();
            Bar::default()
                .label(Line::from(c.feature().label()))
                .value((percent * 100.0).round().max(0.0) as u64)
                .text_value(format!("{percent:.2}%"))
                .style(MedicalTheme::bar())
                .value_style(MedicalTheme::text())
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(1)
        .max(10_000)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Error", MedicalTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, MedicalTheme::text())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(MedicalTheme::danger()),
    );

    f.render_widget(content, area);
}

fn render_results_footer(f: &mut Frame, area: Rect, state: &ResultsState) {
    let content = match state {
        ResultsState::Complete { .. } => Line::from(vec![
            Span::styled("[C] ", MedicalTheme::key_hint()),
            Span::styled("Recommendations ", MedicalTheme::key_desc()),
            Span::styled("[A] ", MedicalTheme::key_hint()),
            Span::styled("Edit Answers ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Home", MedicalTheme::key_desc()),
        ]),
        ResultsState::Error { .. } => Line::from(vec![
            Span::styled("[Enter] ", MedicalTheme::key_hint()),
            Span::styled("Back to Form ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Home", MedicalTheme::key_desc()),
        ]),
        ResultsState::Idle => Line::from(vec![
            Span::styled("[A] ", MedicalTheme::key_hint()),
            Span::styled("Start Assessment ", MedicalTheme::key_desc()),
            Span::styled("[Esc] ", MedicalTheme::key_hint()),
            Span::styled("Home", MedicalTheme::key_desc()),
        ]),
        _ => Line::from(vec![Span::styled(
            "Processing...",
            MedicalTheme::text_muted(),
        )]),
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
