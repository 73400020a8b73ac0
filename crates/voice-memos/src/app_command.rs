use crate::AppError;

use std::{panic::Location, str::FromStr};

use error_location::ErrorLocation;

/// Commands typed on stdin, one per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppCommand {
    /// Start a new recording.
    Record,
    /// Stop the active recording and save it.
    Stop,
    /// Play a saved recording.
    Play {
        /// 1-based position in the recording list.
        number: usize,
    },
    /// Print the recording list.
    List,
    /// Sign out and return to the sign-in route.
    SignOut,
    /// Sign back in from the sign-in route.
    SignIn,
    /// Print the command summary.
    Help,
    /// Leave the application.
    Quit,
}

impl AppCommand {
    /// Whether the command is available while signed out.
    pub fn allowed_signed_out(self) -> bool {
        matches!(self, AppCommand::SignIn | AppCommand::Help | AppCommand::Quit)
    }
}

impl FromStr for AppCommand {
    type Err = AppError;

    #[track_caller]
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let caller = Location::caller();
        let invalid = |reason: &str| AppError::InvalidCommand {
            input: input.to_string(),
            reason: reason.to_string(),
            location: ErrorLocation::from(caller),
        };

        let mut words = input.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(invalid("empty command"));
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "record" | "r" => AppCommand::Record,
            "stop" | "s" => AppCommand::Stop,
            "play" | "p" => {
                let number = words
                    .next()
                    .ok_or_else(|| invalid("play needs a recording number"))?
                    .parse::<usize>()
                    .map_err(|_| invalid("recording number must be a positive integer"))?;
                if number == 0 {
                    return Err(invalid("recording numbers start at 1"));
                }
                AppCommand::Play { number }
            }
            "list" | "ls" => AppCommand::List,
            "sign-out" | "signout" => AppCommand::SignOut,
            "sign-in" | "signin" => AppCommand::SignIn,
            "help" | "?" => AppCommand::Help,
            "quit" | "exit" | "q" => AppCommand::Quit,
            _ => return Err(invalid("unknown command")),
        };

        if words.next().is_some() {
            return Err(invalid("unexpected arguments"));
        }

        Ok(command)
    }
}

/// Printed for `help` and after an unknown command.
pub const HELP_TEXT: &str = "\
Commands:
  record      start recording
  stop        stop and save the recording
  play <n>    play recording number n
  list        list saved recordings
  sign-out    sign out
  sign-in     sign back in
  quit        exit";
