//! Recommendations view: band-specific advice plus general prevention tips.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::{Assessment, Recommendation, GENERAL_TIPS};
use crate::tui::styles::MedicalTheme;

/// Render recommendations for the latest assessment, if any.
pub fn render_recommendations(f: &mut Frame, area: Rect, latest: Option<&Assessment>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer
        ])
        .split(area);

    render_header(f, chunks[0]);
    match latest {
        Some(assessment) => render_content(f, chunks[1], assessment),
        None => render_empty(f, chunks[1]),
    }
    render_footer(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Recommendations", MedicalTheme::title()),
        Span::styled(" │ Personalised Next Steps", MedicalTheme::text_secondary()),
    ]))
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(header, area);
}

fn render_empty(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "No risk assessment available",
            MedicalTheme::warning(),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Please complete the Risk Assessment first",
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

fn render_content(f: &mut Frame, area: Rect, assessment: &Assessment) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4), // Headline
            Constraint::Min(0),    // Actions + tips
        ])
        .margin(1)
        .split(area);

    let band = assessment.band;
    let advice = Recommendation::for_band(band);

    let headline = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("Your estimated stroke risk is ", MedicalTheme::text()),
            Span::styled(
                format!("{:.2}%", assessment.result.percent()),
                MedicalTheme::risk_band(band),
            ),
        ]),
        Line::from(Span::styled(advice.headline, MedicalTheme::risk_band(band))),
    ])
    .wrap(Wrap { trim: true });
    f.render_widget(headline, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[1]);

    f.render_widget(bullet_panel(" Recommended Actions ", advice.actions), columns[0]);
    f.render_widget(bullet_panel(" General Prevention Tips ", GENERAL_TIPS), columns[1]);
}

fn bullet_panel<'a>(title: &'a str, items: &'a [&'a str]) -> Paragraph<'a> {
    let lines: Vec<Line> = items
        .iter()
        .map(|item| {
            Line::from(vec![
                Span::styled("• ", MedicalTheme::focused()),
                Span::styled(*item, MedicalTheme::text()),
            ])
        })
        .collect();

    Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .title(Span::styled(title, MedicalTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(MedicalTheme::border()),
    )
}

fn render_footer(f: &mut Frame, area: Rect) {
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("[R] ", MedicalTheme::key_hint()),
        Span::styled("Results ", MedicalTheme::key_desc()),
        Span::styled("[A] ", MedicalTheme::key_hint()),
        Span::styled("Assessment ", MedicalTheme::key_desc()),
        Span::styled("[Esc] ", MedicalTheme::key_hint()),
        Span::styled("Home", MedicalTheme::key_desc()),
    ]))
    .block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(MedicalTheme::border()),
    );

    f.render_widget(footer, area);
}
