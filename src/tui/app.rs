//! Main TUI application state machine.
//!
//! Handles:
//! - Screen navigation
//! - Input event handling
//! - Service integration
//! - Background assessment via worker thread

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::GbmAdapter;
use crate::application::{AssessmentService, Session};
use crate::config::Settings;
use crate::domain::PatientInput;

use super::ui::{
    home::{render_home, HomeState},
    intake::{render_intake_form, IntakeFormState},
    recommendations::render_recommendations,
    render_disclaimer,
    results::{render_results, ResultsState},
};
use super::worker::{AssessmentProgress, AssessmentWorker, AssessmentWorkerHandle};

/// Current screen/view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Intake,
    Results,
    Recommendations,
}

/// Main application state
pub struct App {
    screen: Screen,
    should_quit: bool,

    /// Pipeline over the loaded model, shared with workers
    service: Arc<AssessmentService<GbmAdapter>>,

    /// Latest submission; dropped with the app
    session: Session,

    intake_state: IntakeFormState,
    results_state: ResultsState,

    /// Pending assessment worker (if running)
    pending_worker: Option<AssessmentWorkerHandle>,

    /// Input submitted to the pending worker
    pending_input: Option<PatientInput>,

    /// Current stage (for UI animation)
    phase: Option<Phase>,

    /// When the current stage started (for UI animation)
    phase_started_at: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Preparing,
    Predicting,
    Explaining,
}

impl Phase {
    /// (floor, target, time constant in seconds)
    fn curve(self) -> (f64, f64, f64) {
        match self {
            Self::Preparing => (0.02, 0.25, 0.3),
            Self::Predicting => (0.25, 0.55, 0.4),
            Self::Explaining => (0.55, 0.98, 0.8),
        }
    }

    fn state(self, progress: f64) -> ResultsState {
        match self {
            Self::Preparing => ResultsState::Preparing { progress },
            Self::Predicting => ResultsState::Predicting { progress },
            Self::Explaining => ResultsState::Explaining { progress },
        }
    }
}

impl App {
    /// Load the model named by `settings` and build the application.
    ///
    /// # Errors
    /// Returns error if the model artifact cannot be loaded or verified.
    pub fn new(settings: &Settings) -> Result<Self> {
        let model_path = &settings.model_path;
        if !model_path.exists() {
            return Err(anyhow!(
                "Model path not found at {:?}. Set STROKESENSE_MODEL_PATH to a directory containing stroke_gbm.json.",
                model_path
            ));
        }

        // Refuse to start without a verified model.
        let classifier = GbmAdapter::load(model_path, settings.allow_unverified_model)
            .map_err(|e| anyhow!("Failed to load model from {:?}: {}", model_path, e))?;

        Ok(Self::with_service(Arc::new(AssessmentService::new(Arc::new(
            classifier,
        )))))
    }

    /// Create the application around an already-built service.
    #[must_use]
    pub fn with_service(service: Arc<AssessmentService<GbmAdapter>>) -> Self {
        Self {
            screen: Screen::Home,
            should_quit: false,
            service,
            session: Session::new(),
            intake_state: IntakeFormState::default(),
            results_state: ResultsState::default(),
            pending_worker: None,
            pending_input: None,
            phase: None,
            phase_started_at: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        self.session.clear();
        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            self.poll_worker();
            self.tick_progress();

            terminal.draw(|f| {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(f.area());

                let content_area = chunks[0];
                let disclaimer_area = chunks[1];

                match self.screen {
                    Screen::Home => render_home(f, content_area, &self.home_state()),
                    Screen::Intake => render_intake_form(f, content_area, &self.intake_state),
                    Screen::Results => render_results(f, content_area, &self.results_state),
                    Screen::Recommendations => render_recommendations(
                        f,
                        content_area,
                        self.session.latest().map(|r| &r.assessment),
                    ),
                }

                render_disclaimer(f, disclaimer_area);
            })?;

            // Short poll to stay responsive
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn home_state(&self) -> HomeState {
        HomeState {
            model_id: self.service.model_id().to_owned(),
            submissions: self.session.submissions(),
            latest_band: self.session.latest().map(|r| r.assessment.band),
        }
    }

    /// Drain progress updates from the background worker.
    fn poll_worker(&mut self) {
        loop {
            // Don't hold a borrow of `pending_worker` while mutating `self`.
            let Some(progress) = self.pending_worker.as_ref().and_then(|w| w.try_recv()) else {
                break;
            };

            match progress {
                AssessmentProgress::Preparing => self.set_phase(Phase::Preparing),
                AssessmentProgress::Predicting => self.set_phase(Phase::Predicting),
                AssessmentProgress::Explaining => self.set_phase(Phase::Explaining),
                AssessmentProgress::Complete(assessment) => {
                    if let Some(input) = self.pending_input.take() {
                        self.session.record(input, (*assessment).clone());
                    }
                    self.results_state = ResultsState::Complete { assessment };
                    self.finish_worker();
                    break;
                }
                AssessmentProgress::Error(message) => {
                    self.results_state = ResultsState::Error { message };
                    self.finish_worker();
                    break;
                }
            }
        }
    }

    fn finish_worker(&mut self) {
        self.pending_worker = None;
        self.pending_input = None;
        self.phase = None;
        self.phase_started_at = None;
    }

    fn set_phase(&mut self, phase: Phase) {
        let (floor, _, _) = phase.curve();
        let progress = self.results_state.progress().unwrap_or(0.0).max(floor);

        self.phase = Some(phase);
        self.phase_started_at = Some(Instant::now());
        self.results_state = phase.state(progress);
    }

    fn tick_progress(&mut self) {
        if self.pending_worker.is_none() {
            return;
        }
        let (Some(phase), Some(started_at)) = (self.phase, self.phase_started_at) else {
            return;
        };
        let Some(current) = self.results_state.progress() else {
            return;
        };

        let elapsed = Instant::now().saturating_duration_since(started_at).as_secs_f64();
        let (floor, target, tau) = phase.curve();

        // Monotonic, approaching the stage target asymptotically.
        let k = 1.0 - (-elapsed / tau).exp();
        let desired = floor + (target - floor) * k;
        self.results_state = phase.state(desired.max(current).min(target));
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Home => self.handle_home_key(key),
            Screen::Intake => self.handle_intake_key(key),
            Screen::Results => self.handle_results_key(key),
            Screen::Recommendations => self.handle_recommendations_key(key),
        }
    }

    fn handle_home_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('a' | 'A') => self.open_intake(),
            KeyCode::Char('r' | 'R') => self.open_results(),
            KeyCode::Char('c' | 'C') => self.screen = Screen::Recommendations,
            KeyCode::Char('q' | 'Q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_intake_key(&mut self, key: KeyCode) {
        let form = &mut self.intake_state;
        match key {
            KeyCode::Esc => self.screen = Screen::Home,
            KeyCode::Up | KeyCode::BackTab => form.prev_field(),
            KeyCode::Down | KeyCode::Tab => form.next_field(),
            KeyCode::Left => form.cycle_choice(false),
            KeyCode::Right => form.cycle_choice(true),
            KeyCode::Char(' ') => form.toggle_consent(),
            KeyCode::Char('s' | 'S') => form.load_sample_data(),
            KeyCode::Char(c) => form.input_char(c),
            KeyCode::Backspace => form.delete_char(),
            KeyCode::Delete => form.clear_field(),
            KeyCode::Enter => self.submit_intake_form(),
            _ => {}
        }
    }

    fn handle_results_key(&mut self, key: KeyCode) {
        match &self.results_state {
            ResultsState::Complete { .. } => match key {
                KeyCode::Char('c' | 'C') => self.screen = Screen::Recommendations,
                KeyCode::Char('a' | 'A') => self.open_intake(),
                KeyCode::Esc => self.screen = Screen::Home,
                _ => {}
            },
            ResultsState::Error { .. } => match key {
                KeyCode::Enter => self.screen = Screen::Intake,
                KeyCode::Esc => self.screen = Screen::Home,
                _ => {}
            },
            ResultsState::Idle => match key {
                KeyCode::Char('a' | 'A') => self.open_intake(),
                KeyCode::Esc => self.screen = Screen::Home,
                _ => {}
            },
            _ => {}
        }
    }

    fn handle_recommendations_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('r' | 'R') => self.open_results(),
            KeyCode::Char('a' | 'A') => self.open_intake(),
            KeyCode::Esc => self.screen = Screen::Home,
            _ => {}
        }
    }

    /// Show the form, pre-filled from the latest submission if there is one.
    fn open_intake(&mut self) {
        self.intake_state = match self.session.latest() {
            Some(record) => IntakeFormState::from_input(&record.input),
            None => IntakeFormState::default(),
        };
        self.screen = Screen::Intake;
    }

    fn open_results(&mut self) {
        if self.pending_worker.is_none() {
            self.results_state = match self.session.latest() {
                Some(record) => ResultsState::Complete {
                    assessment: Box::new(record.assessment.clone()),
                },
                None => ResultsState::Idle,
            };
        }
        self.screen = Screen::Results;
    }

    fn submit_intake_form(&mut self) {
        if self.pending_worker.is_some() {
            return;
        }

        match self.intake_state.resolve() {
            Ok(input) => {
                self.screen = Screen::Results;
                self.results_state = ResultsState::Preparing { progress: 0.0 };
                self.phase = Some(Phase::Preparing);
                self.phase_started_at = Some(Instant::now());

                let worker = AssessmentWorker::spawn(Arc::clone(&self.service), input.clone());
                self.pending_worker = Some(worker);
                self.pending_input = Some(input);
            }
            Err(message) => {
                self.intake_state.error_message = Some(message);
            }
        }
    }
}
