//! Application state and logic

use std::sync::Arc;
use std::time::Instant;

use learnops_core::catalog::{session_offers, SessionOffer};
use learnops_core::diagnostics::{initial_results, TestResult};
use learnops_core::models::ProfileUpdate;
use learnops_core::validation::{validate_name, validate_sign_in, validate_sign_up};
use learnops_core::{
    ApiClient, ApiError, AuthSession, Config, Diagnostics, LaunchStage, Launcher, Profile, ProfileService,
    RoomService, RoomView, SessionBundle, Storage, User,
};
use tokio::sync::mpsc;

/// Application result for main loop
pub enum AppResult {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    About,
    Auth,
    Services,
    Profile,
    Room,
    Diagnostics,
}

/// UI input mode (vim-style)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing into a form field or the chat box
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthField {
    Name,
    Email,
    Password,
    Confirm,
}

/// Sign-in / sign-up form
#[derive(Debug, Clone)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub focus: AuthField,
    pub error: Option<String>,
}

impl Default for AuthForm {
    fn default() -> Self {
        Self {
            mode: AuthMode::SignIn,
            name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm: String::new(),
            focus: AuthField::Email,
            error: None,
        }
    }
}

impl AuthForm {
    pub fn fields(&self) -> &'static [AuthField] {
        match self.mode {
            AuthMode::SignIn => &[AuthField::Email, AuthField::Password],
            AuthMode::SignUp => &[AuthField::Name, AuthField::Email, AuthField::Password, AuthField::Confirm],
        }
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        self.focus = self.fields()[0];
        self.error = None;
    }

    pub fn focus_next(&mut self) {
        self.shift_focus(1);
    }

    pub fn focus_prev(&mut self) {
        self.shift_focus(self.fields().len() - 1);
    }

    fn shift_focus(&mut self, by: usize) {
        let fields = self.fields();
        let current = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(current + by) % fields.len()];
    }

    pub fn field_mut(&mut self, field: AuthField) -> &mut String {
        match field {
            AuthField::Name => &mut self.name,
            AuthField::Email => &mut self.email,
            AuthField::Password => &mut self.password,
            AuthField::Confirm => &mut self.confirm,
        }
    }

    pub fn field(&self, field: AuthField) -> &str {
        match field {
            AuthField::Name => &self.name,
            AuthField::Email => &self.email,
            AuthField::Password => &self.password,
            AuthField::Confirm => &self.confirm,
        }
    }

    /// First validation error for the current mode
    pub fn validate(&self) -> Result<(), String> {
        match self.mode {
            AuthMode::SignIn => validate_sign_in(&self.email, &self.password),
            AuthMode::SignUp => validate_sign_up(&self.name, &self.email, &self.password, &self.confirm),
        }
    }
}

/// Which room panel receives keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomFocus {
    Chat,
    Whiteboard,
}

/// Results of background tasks, drained on every tick
pub enum AppEvent {
    Authenticated(Result<User, ApiError>),
    SignedOut,
    LaunchProgress(LaunchStage),
    Launched(Result<SessionBundle, ApiError>),
    ProfileLoaded(Result<Profile, ApiError>),
    ProfileSaved(Result<Profile, ApiError>),
    TransportHealth(Result<(), ApiError>),
    Diagnostics(Vec<TestResult>),
    DiagnosticsDone,
}

/// Main application struct
pub struct App {
    /// Configuration
    pub config: Config,

    // Core services
    pub storage: Arc<Storage>,
    pub session: Arc<AuthSession>,
    rooms: Arc<RoomService>,
    profiles: Arc<ProfileService>,
    launcher: Arc<Launcher>,
    diagnostics: Arc<Diagnostics>,

    // UI state
    pub screen: Screen,
    pub input_mode: InputMode,
    pub status_message: Option<(String, StatusLevel)>,
    pub user: Option<User>,

    // Auth screen
    pub auth_form: AuthForm,
    pub auth_pending: bool,

    // Services screen
    pub offers: Vec<SessionOffer>,
    pub offer_cursor: usize,
    pub launch_stage: Option<LaunchStage>,
    pub launch_error: Option<String>,

    // Profile screen
    pub profile: Option<Profile>,
    pub profile_loading: bool,
    pub name_input: String,

    // Room screen
    pub room: Option<RoomView>,
    pub room_focus: RoomFocus,
    pub chat_input: String,

    // Diagnostics screen
    pub test_results: Vec<TestResult>,
    pub diagnostics_running: bool,

    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let storage = Arc::new(match config.storage_path() {
            Some(path) => Storage::open(path),
            None => Storage::in_memory(),
        });

        let api = Arc::new(ApiClient::new(&config.api, Arc::clone(&storage)));
        let session = AuthSession::new(Arc::clone(&api));
        let rooms = Arc::new(RoomService::new(Arc::clone(&api), config.api.livekit_url.clone()));
        let profiles = Arc::new(ProfileService::new(Arc::clone(&api)));
        let launcher = Arc::new(Launcher::new(
            Arc::clone(&session),
            Arc::clone(&rooms),
            Arc::clone(&storage),
        ));
        let diagnostics = Arc::new(Diagnostics::new(api));
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            config,
            storage,
            session,
            rooms,
            profiles,
            launcher,
            diagnostics,
            screen: Screen::Home,
            input_mode: InputMode::Normal,
            status_message: None,
            user: None,
            auth_form: AuthForm::default(),
            auth_pending: false,
            offers: session_offers(),
            offer_cursor: 0,
            launch_stage: None,
            launch_error: None,
            profile: None,
            profile_loading: false,
            name_input: String::new(),
            room: None,
            room_focus: RoomFocus::Chat,
            chat_input: String::new(),
            test_results: initial_results(),
            diagnostics_running: false,
            events_tx,
            events_rx,
        }
    }

    /// Silent auth check before the first frame
    pub async fn initialize(&mut self) {
        self.session.initialize().await;
        self.user = self.session.current_user().await;

        if let Some(user) = &self.user {
            self.set_status(format!("Welcome back, {}", user.name), StatusLevel::Success);
        }
    }

    /// Process async operations
    pub async fn tick(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }

        // A 401 anywhere may have signed the user out behind our back
        self.user = self.session.current_user().await;

        if let Some(room) = self.room.as_mut() {
            room.chat.poll_replies(Instant::now());
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>, level: StatusLevel) {
        self.status_message = Some((message.into(), level));
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    pub fn is_busy(&self) -> bool {
        self.auth_pending || self.launch_stage.is_some() || self.session.is_loading()
    }

    pub fn go_to(&mut self, screen: Screen) {
        self.screen = screen;
        self.input_mode = InputMode::Normal;

        match screen {
            Screen::Auth => {
                self.auth_form.error = None;
                self.input_mode = InputMode::Editing;
            }
            Screen::Profile => self.load_profile(),
            Screen::Room => self.open_room(),
            _ => {}
        }
    }

    // Auth

    pub fn submit_auth(&mut self) {
        if self.auth_pending {
            return;
        }
        if let Err(message) = self.auth_form.validate() {
            self.auth_form.error = Some(message);
            return;
        }

        self.auth_form.error = None;
        self.auth_pending = true;

        let form = self.auth_form.clone();
        let session = Arc::clone(&self.session);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = match form.mode {
                AuthMode::SignIn => session.sign_in(&form.email, &form.password).await,
                AuthMode::SignUp => session.sign_up(&form.email, &form.password, &form.name).await,
            };
            let _ = tx.send(AppEvent::Authenticated(result));
        });
    }

    pub fn sign_out(&mut self) {
        if self.user.is_none() {
            self.set_status("Not signed in", StatusLevel::Info);
            return;
        }

        let session = Arc::clone(&self.session);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            session.sign_out().await;
            let _ = tx.send(AppEvent::SignedOut);
        });
    }

    // Services

    pub fn offer_down(&mut self) {
        if self.offer_cursor + 1 < self.offers.len() {
            self.offer_cursor += 1;
        }
    }

    pub fn offer_up(&mut self) {
        self.offer_cursor = self.offer_cursor.saturating_sub(1);
    }

    pub fn launch_selected(&mut self) {
        if self.launch_stage.is_some() {
            return;
        }
        if self.user.is_none() {
            self.set_status(ApiError::AuthRequired.to_string(), StatusLevel::Warning);
            self.go_to(Screen::Auth);
            return;
        }
        let Some(offer) = self.offers.get(self.offer_cursor).cloned() else {
            return;
        };

        self.launch_error = None;
        self.launch_stage = Some(LaunchStage::Initializing);

        let launcher = Arc::clone(&self.launcher);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let progress = tx.clone();
            let result = launcher
                .launch(&offer, |stage| {
                    let _ = progress.send(AppEvent::LaunchProgress(stage.clone()));
                })
                .await;
            let _ = tx.send(AppEvent::Launched(result));
        });
    }

    pub fn check_transport(&mut self) {
        self.set_status("Checking video service...", StatusLevel::Info);

        let rooms = Arc::clone(&self.rooms);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = rooms.check_health().await.map(|_| ());
            let _ = tx.send(AppEvent::TransportHealth(result));
        });
    }

    // Profile

    pub fn load_profile(&mut self) {
        if self.user.is_none() || self.profile_loading {
            return;
        }
        self.profile_loading = true;

        let profiles = Arc::clone(&self.profiles);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::ProfileLoaded(profiles.get_profile().await));
        });
    }

    pub fn start_name_edit(&mut self) {
        let Some(profile) = &self.profile else {
            return;
        };
        self.name_input = profile.full_name.clone().unwrap_or_default();
        self.input_mode = InputMode::Editing;
    }

    pub fn save_name(&mut self) {
        self.input_mode = InputMode::Normal;
        let name = self.name_input.trim().to_string();
        if !validate_name(&name) {
            self.set_status("Name must be at least 2 characters long", StatusLevel::Error);
            return;
        }

        let update = ProfileUpdate { full_name: Some(name) };
        let profiles = Arc::clone(&self.profiles);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(AppEvent::ProfileSaved(profiles.update_profile(&update).await));
        });
    }

    // Room

    fn open_room(&mut self) {
        let mut room = RoomView::open(Arc::clone(&self.storage));
        // Media rendering lives in the hosted transport; a valid bundle counts as joined
        room.on_connected();

        self.room = Some(room);
        self.room_focus = RoomFocus::Chat;
        self.chat_input.clear();
    }

    pub fn send_chat(&mut self) {
        let text = std::mem::take(&mut self.chat_input);
        if let Some(room) = self.room.as_mut() {
            room.chat.send(&text, Instant::now());
        }
    }

    pub fn leave_room(&mut self) {
        if let Some(room) = self.room.as_mut() {
            room.leave();
        }
        self.room = None;
        self.set_status("Left session", StatusLevel::Info);
        self.go_to(Screen::Services);
    }

    /// From the session error screen back to the catalog
    pub fn start_new_session(&mut self) {
        if let Some(room) = self.room.as_mut() {
            room.start_new_session();
        }
        self.room = None;
        self.go_to(Screen::Services);
    }

    // Diagnostics

    pub fn run_diagnostics(&mut self) {
        if self.diagnostics_running {
            return;
        }
        self.diagnostics_running = true;

        let diagnostics = Arc::clone(&self.diagnostics);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let progress = tx.clone();
            diagnostics
                .run_all(|results| {
                    let _ = progress.send(AppEvent::Diagnostics(results.to_vec()));
                })
                .await;
            let _ = tx.send(AppEvent::DiagnosticsDone);
        });
    }

    // Private helpers

    fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Authenticated(result) => {
                self.auth_pending = false;
                match result {
                    Ok(user) => {
                        self.set_status(format!("Signed in as {}", user.name), StatusLevel::Success);
                        self.user = Some(user);
                        self.auth_form = AuthForm::default();
                        self.go_to(Screen::Services);
                    }
                    Err(e) => self.auth_form.error = Some(e.to_string()),
                }
            }
            AppEvent::SignedOut => {
                self.user = None;
                self.profile = None;
                self.set_status("Signed out", StatusLevel::Info);
                self.go_to(Screen::Home);
            }
            AppEvent::LaunchProgress(stage) => self.launch_stage = Some(stage),
            AppEvent::Launched(result) => {
                self.launch_stage = None;
                match result {
                    Ok(bundle) => {
                        tracing::info!("Launched session in {}", bundle.room.room_name);
                        self.go_to(Screen::Room);
                    }
                    Err(e) => {
                        tracing::error!("Session launch failed: {}", e);
                        self.launch_error = Some(e.to_string());
                    }
                }
            }
            AppEvent::ProfileLoaded(result) => {
                self.profile_loading = false;
                match result {
                    Ok(profile) => self.profile = Some(profile),
                    Err(e) => self.set_status(format!("Failed to load profile: {}", e), StatusLevel::Error),
                }
            }
            AppEvent::ProfileSaved(result) => match result {
                Ok(profile) => {
                    self.profile = Some(profile);
                    self.set_status("Profile updated", StatusLevel::Success);
                }
                Err(e) => self.set_status(e.to_string(), StatusLevel::Error),
            },
            AppEvent::TransportHealth(result) => match result {
                Ok(()) => self.set_status("Video service is up", StatusLevel::Success),
                Err(e) => self.set_status(format!("Video service unavailable: {}", e), StatusLevel::Error),
            },
            AppEvent::Diagnostics(results) => self.test_results = results,
            AppEvent::DiagnosticsDone => {
                self.diagnostics_running = false;
                self.set_status("Diagnostics finished", StatusLevel::Info);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_form_focus_cycles_per_mode() {
        let mut form = AuthForm::default();
        assert_eq!(form.focus, AuthField::Email);
        form.focus_next();
        assert_eq!(form.focus, AuthField::Password);
        form.focus_next();
        assert_eq!(form.focus, AuthField::Email);

        form.toggle_mode();
        assert_eq!(form.mode, AuthMode::SignUp);
        assert_eq!(form.focus, AuthField::Name);
        form.focus_prev();
        assert_eq!(form.focus, AuthField::Confirm);
    }

    #[test]
    fn test_auth_form_validation() {
        let mut form = AuthForm::default();
        assert!(form.validate().is_err());

        form.email = "ada@example.com".to_string();
        form.password = "longenough1".to_string();
        assert!(form.validate().is_ok());

        form.toggle_mode();
        form.name = "Ada".to_string();
        form.confirm = "different1".to_string();
        assert_eq!(form.validate().unwrap_err(), "Passwords do not match");
    }
}
