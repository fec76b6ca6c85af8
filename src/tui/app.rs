//! Main TUI application state machine.
//!
//! Handles:
//! - Screen routing gated on the session's authenticated flag
//! - Input event handling
//! - Service integration
//! - Background assessment via a worker thread

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Terminal,
};

use crate::adapters::{ModelArtifacts, OllamaClient};
use crate::application::{AssessmentService, SessionService};
use crate::domain::PatientData;

use super::ui::{
    assessment::{render_assessment, AssessmentState},
    login::{render_login, LoginState},
    patient::{render_patient_form, PatientFormState},
    register::{render_register, RegisterState},
    render_disclaimer,
};
use super::worker::{AssessmentProgress, AssessmentWorker, AssessmentWorkerHandle};

type Service = AssessmentService<ModelArtifacts, ModelArtifacts, OllamaClient>;

/// Current screen/view in the application.
///
/// `PatientForm` and `Assessment` are reachable only while the session is
/// authenticated; the router falls back to `Login` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Register,
    Login,
    PatientForm,
    Assessment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Scaling,
    Predicting,
    Explaining,
}

/// Main application state
pub struct App {
    /// Current screen
    screen: Screen,

    /// Whether the app should quit
    should_quit: bool,

    /// Session state and user directory
    session: SessionService,

    /// Assessment service (shared with worker threads)
    service: Arc<Service>,

    /// Registration form state
    register_state: RegisterState,

    /// Login form state
    login_state: LoginState,

    /// Patient form state
    patient_form_state: PatientFormState,

    /// Assessment screen state
    assessment_state: AssessmentState,

    /// Pending assessment worker (if running)
    pending_worker: Option<AssessmentWorkerHandle>,

    /// Current pipeline phase (for UI animation)
    phase: Option<Phase>,

    /// When the current phase started (for UI animation)
    phase_started_at: Option<Instant>,
}

impl App {
    /// Create a new application instance using default adapters.
    ///
    /// Loads the model artifacts from `CARDIOLENS_MODEL_PATH` (default:
    /// `models`) and configures the Ollama client from the environment.
    ///
    /// # Errors
    /// Returns error if the model artifacts cannot be loaded.
    pub fn new() -> Result<Self> {
        let model_path =
            std::env::var("CARDIOLENS_MODEL_PATH").unwrap_or_else(|_| "models".to_string());
        let model_dir = std::path::Path::new(&model_path);

        if !model_dir.exists() {
            return Err(anyhow!(
                "Model path not found at {:?}. Set CARDIOLENS_MODEL_PATH to a directory containing classifier.json, scaler.json, and explainer.json.",
                model_dir
            ));
        }

        // Refuse to start without valid artifacts; every prediction needs them.
        let artifacts = Arc::new(
            ModelArtifacts::load(model_dir)
                .map_err(|e| anyhow!("Failed to load model artifacts from {:?}: {}", model_dir, e))?,
        );
        let language = Arc::new(OllamaClient::from_env());

        let service = Arc::new(AssessmentService::new(
            artifacts.clone(),
            artifacts,
            language,
        ));

        Ok(Self::with_dependencies(service))
    }

    /// Create application with an injected service (Composition Root pattern).
    #[must_use]
    pub fn with_dependencies(service: Arc<Service>) -> Self {
        Self {
            screen: Screen::Register,
            should_quit: false,
            session: SessionService::new(),
            service,
            register_state: RegisterState::default(),
            login_state: LoginState::default(),
            patient_form_state: PatientFormState::default(),
            assessment_state: AssessmentState::default(),
            pending_worker: None,
            phase: None,
            phase_started_at: None,
        }
    }

    /// Run the main application loop.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        // Setup terminal
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

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            // Poll pending worker for progress updates
            self.poll_worker();

            // Animate assessment progress
            self.tick_progress();

            // The prediction flow is gated behind authentication.
            if !self.session.is_authenticated()
                && matches!(self.screen, Screen::PatientForm | Screen::Assessment)
            {
                self.screen = Screen::Login;
            }

            // Draw current screen
            terminal.draw(|f| {
                let area = f.area();
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Min(0), Constraint::Length(3)])
                    .split(area);

                let content_area = chunks[0];
                let disclaimer_area = chunks[1];

                match self.screen {
                    Screen::Register => render_register(f, content_area, &self.register_state),
                    Screen::Login => render_login(f, content_area, &self.login_state),
                    Screen::PatientForm => render_patient_form(
                        f,
                        content_area,
                        &self.patient_form_state,
                        self.session.username().unwrap_or("?"),
                    ),
                    Screen::Assessment => {
                        render_assessment(f, content_area, &self.assessment_state)
                    }
                }

                render_disclaimer(f, disclaimer_area);
            })?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key.code, key.modifiers);
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Poll the background worker for progress updates.
    fn poll_worker(&mut self) {
        if self.pending_worker.is_none() {
            return;
        }

        // Process all available progress messages.
        loop {
            let progress = match self
                .pending_worker
                .as_ref()
                .and_then(AssessmentWorkerHandle::try_recv)
            {
                Some(p) => p,
                None => break,
            };

            match progress {
                AssessmentProgress::Scaling => self.set_phase(Phase::Scaling),
                AssessmentProgress::Predicting => self.set_phase(Phase::Predicting),
                AssessmentProgress::Explaining => self.set_phase(Phase::Explaining),
                AssessmentProgress::Complete(assessment) => {
                    self.assessment_state = AssessmentState::Complete { assessment };
                    self.pending_worker = None;
                    self.phase = None;
                    self.phase_started_at = None;
                    break;
                }
                AssessmentProgress::Error(message) => {
                    self.assessment_state = AssessmentState::Error { message };
                    self.pending_worker = None;
                    self.phase = None;
                    self.phase_started_at = None;
                    break;
                }
            }
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        let current_progress = match &self.assessment_state {
            AssessmentState::Scaling { progress }
            | AssessmentState::Predicting { progress }
            | AssessmentState::Explaining { progress } => *progress,
            _ => 0.0,
        };

        let min_start = match phase {
            Phase::Scaling => 0.0,
            Phase::Predicting => 0.15,
            Phase::Explaining => 0.35,
        };
        let progress = current_progress.max(min_start);

        self.phase = Some(phase);
        self.phase_started_at = Some(Instant::now());

        self.assessment_state = match phase {
            Phase::Scaling => AssessmentState::Scaling { progress },
            Phase::Predicting => AssessmentState::Predicting { progress },
            Phase::Explaining => AssessmentState::Explaining { progress },
        };
    }

    fn tick_progress(&mut self) {
        // Only animate while a worker is running and we're in a progress state.
        if self.pending_worker.is_none() {
            return;
        }

        let Some(phase) = self.phase else {
            return;
        };
        let Some(started_at) = self.phase_started_at else {
            return;
        };

        let elapsed = Instant::now()
            .saturating_duration_since(started_at)
            .as_secs_f64();

        let (start_floor, target, tau) = match phase {
            Phase::Scaling => (0.02, 0.15, 0.5),
            Phase::Predicting => (0.15, 0.35, 0.8),
            Phase::Explaining => (0.35, 0.95, 8.0),
        };

        let current_progress = match &self.assessment_state {
            AssessmentState::Scaling { progress }
            | AssessmentState::Predicting { progress }
            | AssessmentState::Explaining { progress } => *progress,
            _ => return,
        };

        // Smooth, monotonic progress: asymptotically approaches the phase target.
        let k = if tau <= 0.0 {
            1.0
        } else {
            1.0 - (-elapsed / tau).exp()
        };
        let desired = (start_floor + (target - start_floor) * k).clamp(0.0, target);
        let new_progress = desired.max(current_progress).min(target);

        self.assessment_state = match phase {
            Phase::Scaling => AssessmentState::Scaling {
                progress: new_progress,
            },
            Phase::Predicting => AssessmentState::Predicting {
                progress: new_progress,
            },
            Phase::Explaining => AssessmentState::Explaining {
                progress: new_progress,
            },
        };
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.screen {
            Screen::Register => self.handle_register_key(key, modifiers),
            Screen::Login => self.handle_login_key(key, modifiers),
            Screen::PatientForm => self.handle_patient_form_key(key, modifiers),
            Screen::Assessment => self.handle_assessment_key(key, modifiers),
        }
    }

    fn handle_register_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('l') && modifiers.contains(KeyModifiers::CONTROL) {
            self.login_state = LoginState::default();
            self.screen = Screen::Login;
            return;
        }

        match key {
            KeyCode::Up => self.register_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.register_state.next_field(),
            KeyCode::Backspace => self.register_state.delete_char(),
            KeyCode::Char(c) => self.register_state.input_char(c),
            KeyCode::Enter => self.submit_registration(),
            _ => {}
        }
    }

    fn submit_registration(&mut self) {
        let username = self.register_state.username().to_string();
        let email = self.register_state.email().to_string();
        let password = self.register_state.password().to_string();
        let confirm = self.register_state.confirm().to_string();

        let result = self.session.register(&username, &email, &password, &confirm);

        match result {
            Ok(()) => {
                self.register_state.wipe_passwords();
                self.login_state = LoginState::default();
                self.login_state.info_message =
                    Some("Registration successful! Please log in.".to_string());
                self.screen = Screen::Login;
            }
            Err(e) => {
                self.register_state.error_message = Some(e.to_string());
            }
        }
    }

    fn handle_login_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('r') && modifiers.contains(KeyModifiers::CONTROL) {
            self.register_state = RegisterState::default();
            self.screen = Screen::Register;
            return;
        }

        match key {
            KeyCode::Up => self.login_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.login_state.next_field(),
            KeyCode::Backspace => self.login_state.delete_char(),
            KeyCode::Char(c) => self.login_state.input_char(c),
            KeyCode::Enter => self.submit_login(),
            _ => {}
        }
    }

    fn submit_login(&mut self) {
        let username = self.login_state.username().to_string();
        let password = self.login_state.password().to_string();

        match self.session.login(&username, &password) {
            Ok(()) => {
                self.login_state.wipe_password();
                self.patient_form_state = PatientFormState::default();
                self.screen = Screen::PatientForm;
            }
            Err(e) => {
                self.login_state.wipe_password();
                self.login_state.error_message = Some(e.to_string());
            }
        }
    }

    fn handle_patient_form_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('l') && modifiers.contains(KeyModifiers::CONTROL) {
            self.logout();
            return;
        }

        match key {
            KeyCode::Up => self.patient_form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.patient_form_state.next_field(),
            KeyCode::Left => self.patient_form_state.cycle_prev(),
            KeyCode::Right => self.patient_form_state.cycle_next(),
            KeyCode::Char('s') | KeyCode::Char('S') => self.patient_form_state.load_sample_data(),
            KeyCode::Char(c) => self.patient_form_state.input_char(c),
            KeyCode::Backspace => self.patient_form_state.delete_char(),
            KeyCode::Delete => self.patient_form_state.clear_field(),
            KeyCode::Enter => self.submit_patient_form(),
            _ => {}
        }
    }

    fn handle_assessment_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        if key == KeyCode::Char('l') && modifiers.contains(KeyModifiers::CONTROL) {
            self.logout();
            return;
        }

        match &self.assessment_state {
            AssessmentState::Complete { .. } => match key {
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.patient_form_state = PatientFormState::default();
                    self.screen = Screen::PatientForm;
                }
                _ => {}
            },
            AssessmentState::Error { .. } => match key {
                KeyCode::Enter | KeyCode::Esc => {
                    self.screen = Screen::PatientForm;
                }
                _ => {}
            },
            // Pipeline running; ignore input until it settles.
            _ => {}
        }
    }

    fn submit_patient_form(&mut self) {
        match self.patient_form_state.to_patient_features() {
            Ok(features) => {
                if let Err(errors) = features.validate() {
                    self.patient_form_state.error_message = Some(errors.join(", "));
                    return;
                }

                let patient = PatientData::new(features);

                // Switch to the assessment screen with initial state
                self.screen = Screen::Assessment;
                self.assessment_state = AssessmentState::Scaling { progress: 0.0 };
                self.phase = Some(Phase::Scaling);
                self.phase_started_at = Some(Instant::now());

                // Spawn background worker for the blocking pipeline
                let worker = AssessmentWorker::spawn(self.service.clone(), patient);
                self.pending_worker = Some(worker);
            }
            Err(e) => {
                self.patient_form_state.error_message = Some(e);
            }
        }
    }

    fn logout(&mut self) {
        self.session.logout();
        self.pending_worker = None;
        self.assessment_state = AssessmentState::default();
        self.login_state = LoginState::default();
        self.screen = Screen::Login;
    }
}
