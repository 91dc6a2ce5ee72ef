//! Home view: session status and stroke education.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::RiskBand;
use crate::tui::styles::{MedicalTheme, LOGO};

/// What the home screen shows about the current session.
#[derive(Debug, Clone, Default)]
pub struct HomeState {
    pub model_id: String,
    pub submissions: usize,
    pub latest_band: Option<RiskBand>,
}

/// (heading, bullet points)
const STROKE_FACTS: &[(&str, &[&str])] = &[
    (
        "Types of Stroke",
        &[
            "Ischemic: Blockage in brain arteries.",
            "Hemorrhagic: Burst blood vessels in the brain.",
            "TIA: Temporary blockage (mini-stroke).",
        ],
    ),
    (
        "Common Causes",
        &[
            "High blood pressure",
            "Heart disease",
            "Diabetes",
            "Smoking",
            "Obesity and cholesterol",
        ],
    ),
    (
        "Prevention",
        &[
            "Control blood pressure and sugar",
            "Exercise regularly",
            "Eat a healthy diet",
            "Stop smoking",
        ],
    ),
    (
        "Symptoms",
        &[
            "Sudden numbness or weakness (face, arm, leg)",
            "Confusion, speech trouble",
            "Vision problems",
        ],
    ),
];

const FAST: &[(&str, &str)] = &[
    ("F", "Face drooping"),
    ("A", "Arm weakness"),
    ("S", "Speech difficulty"),
    ("T", "Time to call emergency services"),
];

/// Render the home view.
pub fn render_home(f: &mut Frame, area: Rect, state: &HomeState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    render_header(f, chunks[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[1]);

    render_status_panels(f, columns[0], state);
    render_learn(f, columns[1]);
}

fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(" ", MedicalTheme::text()),
        Span::styled("Strokesense", MedicalTheme::title()),
        Span::styled(" │ ", MedicalTheme::text_muted()),
        Span::styled(
            "Empowering you to take control of your brain health",
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

fn render_status_panels(f: &mut Frame, area: Rect, state: &HomeState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Logo
            Constraint::Length(5), // Session status
            Constraint::Min(0),    // Quick actions
        ])
        .margin(1)
        .split(area);

    let logo = Paragraph::new(LOGO.trim_matches('\n'))
        .style(MedicalTheme::focused())
        .alignment(Alignment::Center);
    f.render_widget(logo, chunks[0]);

    let latest = match state.latest_band {
        Some(band) => Span::styled(band.to_string(), MedicalTheme::risk_band(band)),
        None => Span::styled("none yet", MedicalTheme::text_muted()),
    };
    let status = vec![
        Line::from(vec![
            Span::styled("  OK ", MedicalTheme::success()),
            Span::styled(format!("Model {}", state.model_id), MedicalTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Submissions: ", MedicalTheme::text_secondary()),
            Span::styled(state.submissions.to_string(), MedicalTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("  Latest band: ", MedicalTheme::text_secondary()),
            latest,
        ]),
    ];

    let status_block = Block::default()
        .title(Span::styled(" Session ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());
    f.render_widget(Paragraph::new(status).block(status_block), chunks[1]);

    let actions = vec![
        Line::from(vec![
            Span::styled("[A] ", MedicalTheme::key_hint()),
            Span::styled("Start Risk Assessment", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[R] ", MedicalTheme::key_hint()),
            Span::styled("Results", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[C] ", MedicalTheme::key_hint()),
            Span::styled("Recommendations", MedicalTheme::key_desc()),
        ]),
        Line::from(vec![
            Span::styled("[Q] ", MedicalTheme::key_hint()),
            Span::styled("Quit", MedicalTheme::key_desc()),
        ]),
    ];

    let actions_block = Block::default()
        .title(Span::styled(" Quick Actions ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());
    f.render_widget(Paragraph::new(actions).block(actions_block), chunks[2]);
}

fn render_learn(f: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            "A stroke happens when the blood supply to part of your brain is interrupted \
             or reduced, preventing brain tissue from getting oxygen and nutrients. \
             Early detection can save lives.",
            MedicalTheme::text(),
        )),
        Line::from(""),
    ];

    for (heading, points) in STROKE_FACTS {
        lines.push(Line::from(Span::styled(*heading, MedicalTheme::focused())));
        lines.extend(points.iter().map(|p| {
            Line::from(vec![
                Span::styled("  • ", MedicalTheme::text_muted()),
                Span::styled(*p, MedicalTheme::text_secondary()),
            ])
        }));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "Act F.A.S.T.",
        MedicalTheme::danger(),
    )));
    lines.extend(FAST.iter().map(|(letter, meaning)| {
        Line::from(vec![
            Span::styled(format!("  {letter} "), MedicalTheme::key_hint()),
            Span::styled(*meaning, MedicalTheme::text_secondary()),
        ])
    }));

    let block = Block::default()
        .title(Span::styled(" Learn About Stroke ", MedicalTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(MedicalTheme::border());

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
