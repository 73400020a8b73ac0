use crate::{
    Alert, AppCommand, AppResult, AuthSession, Router,
    app_command::HELP_TEXT,
    config::Config,
    input::{SharedInput, next_line},
    prompt_permission::permission_service,
    router::{HOME_ROUTE, SIGN_IN_ROUTE},
};

use voice_memos_core::{
    CpalCapture, CpalPlayback, FileKeyValueStore, RecordingSession, SessionError,
    SessionServices, SessionState,
    platform::{PlaybackEvent, PlaybackEventReceiver, committer_for},
};

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

/// Whether the command loop keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Terminal front end for one recording session.
///
/// Owns the session and the receiving end of its playback events so the
/// `select!` loop can wait on stdin and playback completion together.
pub struct App {
    session: RecordingSession,
    events: PlaybackEventReceiver,
    input: SharedInput,
    auth: AuthSession,
    router: Router,
}

impl App {
    /// Wire the cpal devices, the store and the committer from `config`.
    pub fn new(config: &Config, input: SharedInput) -> Self {
        let services = SessionServices {
            permissions: permission_service(config.permission.mode, Arc::clone(&input)),
            capture: Box::new(CpalCapture::with_system_temp(
                config.audio.selected_device.clone(),
            )),
            playback: Box::new(CpalPlayback::new()),
            committer: committer_for(
                config.platform.kind,
                config.storage.recordings_dir(),
                config.downloads_dir(),
            ),
            store: Box::new(FileKeyValueStore::new(config.storage.store_path())),
        };

        let (session, events) = RecordingSession::new(services, config.audio.quality);

        Self::from_parts(session, events, input)
    }

    /// Build around an existing session and its playback event receiver.
    pub(crate) fn from_parts(
        session: RecordingSession,
        events: PlaybackEventReceiver,
        input: SharedInput,
    ) -> Self {
        Self {
            session,
            events,
            input,
            auth: AuthSession::local(),
            router: Router::new(),
        }
    }

    /// Run the command loop until `quit` or end of input.
    #[instrument(skip(self))]
    pub async fn run(mut self) -> AppResult<()> {
        info!(user = ?self.auth.user(), "Voice Memos starting");

        let count = self.session.load_persisted_list().await.len();
        info!(count, "Recording list loaded");
        self.print_list();
        println!("Type `help` for commands.");

        loop {
            tokio::select! {
                line = next_line(&self.input) => {
                    let Some(line) = line else {
                        info!("Input closed, shutting down");
                        break;
                    };
                    if self.handle_line(&line).await == Flow::Quit {
                        info!("Quit requested");
                        break;
                    }
                }

                Some(event) = self.events.recv() => {
                    self.handle_playback_event(event).await;
                }
            }
        }

        self.shutdown().await;
        info!("Voice Memos shut down successfully");

        Ok(())
    }

    async fn handle_line(&mut self, line: &str) -> Flow {
        if line.trim().is_empty() {
            return Flow::Continue;
        }

        let command = match line.parse::<AppCommand>() {
            Ok(command) => command,
            Err(e) => {
                warn!(error = %e, "Rejected input");
                println!("{}", Alert::unknown_command(line));
                println!("{HELP_TEXT}");
                return Flow::Continue;
            }
        };

        if !self.auth.is_signed_in() && !command.allowed_signed_out() {
            println!("{}", Alert::signed_out());
            return Flow::Continue;
        }

        self.dispatch(command).await
    }

    #[instrument(skip(self))]
    async fn dispatch(&mut self, command: AppCommand) -> Flow {
        match command {
            AppCommand::Record => match self.session.start_recording().await {
                Ok(session_id) => {
                    info!(session_id = %session_id, "Recording started");
                    println!("Recording... type `stop` to finish.");
                }
                Err(e) => self.report(e),
            },
            AppCommand::Stop => match self.session.stop_recording().await {
                Ok(locator) => println!("{}", Alert::recording_saved(&locator)),
                Err(e) => self.report(e),
            },
            AppCommand::Play { number } => self.play(number).await,
            AppCommand::List => self.print_list(),
            AppCommand::SignOut => self.sign_out().await,
            AppCommand::SignIn => self.sign_in(),
            AppCommand::Help => println!("{HELP_TEXT}"),
            AppCommand::Quit => return Flow::Quit,
        }

        Flow::Continue
    }

    async fn play(&mut self, number: usize) {
        let Some(locator) = self.session.recordings().get(number - 1).cloned() else {
            println!("{}", Alert::no_such_recording(number));
            return;
        };

        match self.session.play_sound(&locator).await {
            Ok(id) => {
                info!(playback = %id, locator = %locator, "Playback started");
                println!("Playing #{number}...");
            }
            Err(e) => self.report(e),
        }
    }

    async fn handle_playback_event(&mut self, event: PlaybackEvent) {
        match self.session.handle_event(event).await {
            Ok(Some(id)) => {
                info!(playback = %id, "Playback finished");
                println!("Playback finished.");
            }
            Ok(None) => {}
            Err(e) => self.report(e),
        }
    }

    /// Leave the memo screen. The sign-out call's outcome is not inspected.
    async fn sign_out(&mut self) {
        self.session.release_playback().await;
        self.auth.sign_out();
        self.router.replace(SIGN_IN_ROUTE);
        println!("Signed out. Now at {}.", self.router.current());
    }

    fn sign_in(&mut self) {
        if self.auth.is_signed_in() {
            println!("Already signed in.");
            return;
        }
        self.auth = AuthSession::local();
        self.router.replace(HOME_ROUTE);
        println!("Signed in. Now at {}.", self.router.current());
    }

    fn print_list(&self) {
        let recordings = self.session.recordings();
        if recordings.is_empty() {
            println!("No recordings yet.");
            return;
        }
        for (i, locator) in recordings.iter().enumerate() {
            println!("{:>3}. {}", i + 1, locator);
        }
    }

    fn report(&self, error: SessionError) {
        match Alert::for_error(&error) {
            Some(alert) => {
                error!(error = ?error, "Session operation failed");
                println!("{alert}");
            }
            None => info!(error = %error, "Nothing to do"),
        }
    }

    /// Save an in-flight recording and release the playback instance.
    ///
    /// Failures are shown as alerts like any other command; the returned
    /// alert is the one printed for the in-flight recording, if any.
    #[instrument(skip(self))]
    pub(crate) async fn shutdown(&mut self) -> Option<Alert> {
        if let Some(id) = self.session.release_playback().await {
            info!(playback = %id, "Playback released at shutdown");
        }

        if !matches!(self.session.state(), SessionState::Recording { .. }) {
            return None;
        }

        info!("Saving recording in progress before exit");
        match self.session.stop_recording().await {
            Ok(locator) => {
                let alert = Alert::recording_saved(&locator);
                println!("{alert}");
                Some(alert)
            }
            Err(e) => {
                let alert = Alert::for_error(&e);
                self.report(e);
                alert
            }
        }
    }

    /// Session driven by this front end.
    #[cfg(test)]
    pub(crate) fn session(&self) -> &RecordingSession {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut RecordingSession {
        &mut self.session
    }
}
