//! Console commands.

use std::path::PathBuf;
use std::str::FromStr;

/// Help text printed by `help` and at start-up.
pub const HELP: &str = "\
Commands:
  places              list the regions of the first fetch
  place [text]        filter by place substring; no text clears the place filter
  since <yyyy-MM-dd>  show events from this date until today
  today               show today's events only
  clear               remove all filters
  export [path]       write the current table to CSV
  refresh             refresh now
  status              show filter and refresh state
  help                show this text
  quit                exit";

/// One line of console input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List the known regions.
    Places,
    /// Set the place filter; `None` clears it.
    Place(Option<String>),
    /// Raw date input, validated by the console.
    Since(String),
    /// Restrict to today's events.
    Today,
    /// Remove both filters.
    Clear,
    /// Export to the given path or the configured default.
    Export(Option<PathBuf>),
    /// Refresh without waiting for the timer.
    Refresh,
    /// Print filter and refresh state.
    Status,
    /// Print the command list.
    Help,
    /// Leave the console.
    Quit,
}

/// Why a line is not a command.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    /// Blank line.
    #[error("empty input")]
    Empty,
    /// First word is not a known command.
    #[error("unknown command '{0}', type 'help' for a list")]
    Unknown(String),
    /// The command requires an argument that was not given.
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let argument = (!rest.is_empty()).then(|| rest.to_string());

        match word.to_lowercase().as_str() {
            "" => Err(ParseCommandError::Empty),
            "places" => Ok(Self::Places),
            "place" => Ok(Self::Place(argument)),
            "since" => argument
                .map(Self::Since)
                .ok_or(ParseCommandError::MissingArgument("since")),
            "today" => Ok(Self::Today),
            "clear" => Ok(Self::Clear),
            "export" => Ok(Self::Export(argument.map(PathBuf::from))),
            "refresh" => Ok(Self::Refresh),
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            other => Err(ParseCommandError::Unknown(other.to_string())),
        }
    }
}
