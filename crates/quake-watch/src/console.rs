//! Line-oriented terminal front-end.
//!
//! The console owns no feed logic. It turns commands into filter changes and
//! export requests, and prints the snapshots and failures the refresh loop
//! publishes.

use crate::commands::{Command, HELP};
use crate::refresh::{RefreshStatus, Snapshot};
use crate::state::FilterHandle;
use crate::view::{render_chart, render_table};
use chrono::NaiveDate;
use quake_common::{today, validate_range_start, FilterState, PlaceSet, DATE_FORMAT};
use quake_config::{Config, DisplayConfig};
use quake_feed::export_to_csv;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// The one-line status shown after every action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    /// Nothing chosen yet.
    Initial,
    /// Last action succeeded without a place filter.
    Normal,
    /// A place filter is active.
    FilteredBy(String),
    /// The date entered was rejected.
    DateRejected,
    /// An operation failed with this message.
    Attention(String),
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "Status: Choose any option"),
            Self::Normal => write!(f, "Status: All works normal."),
            Self::FilteredBy(place) => write!(f, "Status: Filtered by {place}."),
            Self::DateRejected => write!(f, "Status: Date was not accepted."),
            Self::Attention(message) => write!(f, "Attention: {message}."),
        }
    }
}

/// What the caller should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading commands.
    Continue,
    /// Stop the session.
    Quit,
}

/// Front-end state plus the writer it prints to.
pub struct Console<W: Write> {
    out: W,
    filter: Arc<FilterHandle>,
    display: DisplayConfig,
    export_path: PathBuf,
    baseline: NaiveDate,
    places: PlaceSet,
    status: StatusLine,
    refresh_status: RefreshStatus,
    latest: Option<Arc<Snapshot>>,
}

impl<W: Write> Console<W> {
    /// Creates a console printing to `out` and steering `filter`.
    pub fn new(out: W, filter: Arc<FilterHandle>, config: &Config) -> Self {
        Self {
            out,
            filter,
            display: config.display.clone(),
            export_path: PathBuf::from(&config.export.path),
            baseline: config.feed.start_date,
            places: PlaceSet::new(),
            status: StatusLine::Initial,
            refresh_status: RefreshStatus::Idle,
            latest: None,
        }
    }

    /// Regions offered by `places`.
    pub fn set_places(&mut self, places: PlaceSet) {
        self.places = places;
    }

    /// Status line currently shown.
    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    /// Snapshot currently on screen.
    pub fn latest(&self) -> Option<&Arc<Snapshot>> {
        self.latest.as_ref()
    }

    /// Gives back the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Prints the greeting and command list.
    pub fn greet(&mut self) -> io::Result<()> {
        writeln!(
            self.out,
            "quakewatch: USGS earthquakes since {}",
            self.baseline.format(DATE_FORMAT)
        )?;
        writeln!(self.out, "{HELP}")?;
        self.print_status()
    }

    /// Reports an operation failure on the status line.
    pub fn report_failure(&mut self, message: impl Into<String>) -> io::Result<()> {
        self.status = StatusLine::Attention(message.into());
        self.print_status()
    }

    /// Prints a line that is not a command.
    pub fn report_input_error(&mut self, error: &impl fmt::Display) -> io::Result<()> {
        writeln!(self.out, "{error}")?;
        self.out.flush()
    }

    /// Shows a freshly published snapshot.
    pub fn show_snapshot(&mut self, snapshot: Arc<Snapshot>) -> io::Result<()> {
        writeln!(self.out)?;
        write!(self.out, "{}", render_table(&snapshot.events, &self.display))?;
        writeln!(self.out)?;
        write!(self.out, "{}", render_chart(&snapshot.daily_max, &self.display))?;
        writeln!(
            self.out,
            "Refreshed at {} ({})",
            snapshot.refreshed_at.format("%H:%M:%S"),
            snapshot.filter
        )?;
        self.latest = Some(snapshot);
        self.print_status()
    }

    /// Follows the refresh loop's status. Only failures are printed.
    pub fn observe_status(&mut self, status: RefreshStatus) -> io::Result<()> {
        self.refresh_status = status.clone();
        match status {
            RefreshStatus::Failed { message } => self.report_failure(message),
            _ => Ok(()),
        }
    }

    /// Executes one command.
    pub fn handle(&mut self, command: Command) -> io::Result<Flow> {
        match command {
            Command::Places => self.print_places()?,
            Command::Place(place) => self.apply_place(place.as_deref()),
            Command::Since(input) => self.apply_since(&input)?,
            Command::Today => {
                self.filter.update(|f| f.with_date_range_start(Some(today())));
                self.status = StatusLine::Normal;
            }
            Command::Clear => {
                self.filter.set(FilterState::unfiltered());
                self.status = StatusLine::Normal;
            }
            Command::Export(path) => self.export(path)?,
            Command::Refresh => self.filter.wake(),
            Command::Status => {
                writeln!(self.out, "Filter: {}", self.filter.current())?;
                writeln!(self.out, "Refresh: {}", self.refresh_status)?;
            }
            Command::Help => writeln!(self.out, "{HELP}")?,
            Command::Quit => return Ok(Flow::Quit),
        }

        self.print_status()?;
        Ok(Flow::Continue)
    }

    fn print_places(&mut self) -> io::Result<()> {
        if self.places.is_empty() {
            return writeln!(self.out, "No places known yet");
        }
        for place in &self.places {
            writeln!(self.out, "  {place}")?;
        }
        Ok(())
    }

    fn apply_place(&mut self, place: Option<&str>) {
        let filter = self.filter.update(|f| f.with_place(place));
        self.status = match filter.active_place() {
            Some(place) => StatusLine::FilteredBy(place.to_string()),
            None => StatusLine::Normal,
        };
    }

    fn apply_since(&mut self, input: &str) -> io::Result<()> {
        let baseline = self.baseline.format(DATE_FORMAT);
        match validate_range_start(input, self.baseline) {
            Ok(start) => {
                self.filter.update(|f| f.with_date_range_start(Some(start)));
                self.status = StatusLine::Normal;
                writeln!(self.out, "Date is ok.")
            }
            Err(e) => {
                info!(input, error = %e, "Rejected date filter");
                self.status = StatusLine::DateRejected;
                writeln!(self.out, "Date was not accepted, must be after {baseline}")
            }
        }
    }

    fn export(&mut self, path: Option<PathBuf>) -> io::Result<()> {
        let path = path.unwrap_or_else(|| self.export_path.clone());
        let events = self.latest.as_ref().map_or(&[][..], |s| s.events.as_slice());

        match export_to_csv(&path, events) {
            Ok(rows) => {
                self.status = StatusLine::Normal;
                writeln!(self.out, "Exported {rows} rows to {}", path.display())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Export failed");
                self.status = StatusLine::Attention(e.to_string());
                Ok(())
            }
        }
    }

    fn print_status(&mut self) -> io::Result<()> {
        writeln!(self.out, "{}", self.status)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quake_common::test_utils::date;

    fn console() -> Console<Vec<u8>> {
        Console::new(Vec::new(), Arc::new(FilterHandle::default()), &Config::default())
    }

    fn output(console: Console<Vec<u8>>) -> String {
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(StatusLine::Normal.to_string(), "Status: All works normal.");
        assert_eq!(
            StatusLine::FilteredBy("Alaska".to_string()).to_string(),
            "Status: Filtered by Alaska."
        );
        assert_eq!(StatusLine::DateRejected.to_string(), "Status: Date was not accepted.");
        assert_eq!(
            StatusLine::Attention("Request timeout".to_string()).to_string(),
            "Attention: Request timeout."
        );
    }

    #[test]
    fn test_place_sets_and_clears_filter() {
        let mut console = console();
        console.handle(Command::Place(Some("Alaska".to_string()))).unwrap();
        assert_eq!(console.status(), &StatusLine::FilteredBy("Alaska".to_string()));
        assert_eq!(console.filter.current().active_place(), Some("Alaska"));

        console.handle(Command::Place(None)).unwrap();
        assert_eq!(console.status(), &StatusLine::Normal);
        assert!(console.filter.current().is_unfiltered());
    }

    #[test]
    fn test_since_validates_against_baseline() {
        let mut console = console();

        console.handle(Command::Since("2023-11-22".to_string())).unwrap();
        assert_eq!(console.status(), &StatusLine::DateRejected);
        assert_eq!(console.filter.current().date_range_start, None);

        console.handle(Command::Since("2023-11-23".to_string())).unwrap();
        assert_eq!(console.status(), &StatusLine::Normal);
        assert_eq!(console.filter.current().date_range_start, Some(date(2023, 11, 23)));

        // A rejected date leaves the accepted one in place
        console.handle(Command::Since("23-11-2023".to_string())).unwrap();
        assert_eq!(console.filter.current().date_range_start, Some(date(2023, 11, 23)));

        let text = output(console);
        assert!(text.contains("Date was not accepted, must be after 2023-11-22"));
        assert!(text.contains("Date is ok."));
    }

    #[test]
    fn test_clear_keeps_nothing() {
        let mut console = console();
        console.handle(Command::Place(Some("Tonga".to_string()))).unwrap();
        console.handle(Command::Today).unwrap();
        assert_eq!(console.filter.current().date_range_start, Some(today()));

        console.handle(Command::Clear).unwrap();
        assert!(console.filter.current().is_unfiltered());
    }

    #[test]
    fn test_export_failure_is_reported_not_raised() {
        let mut console = console();
        let flow = console
            .handle(Command::Export(Some(PathBuf::from("/nonexistent-dir/out.csv"))))
            .unwrap();

        assert_eq!(flow, Flow::Continue);
        assert!(matches!(console.status(), StatusLine::Attention(_)));
        assert!(output(console).contains("Attention: "));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_export_confirmation_write_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut console =
            Console::new(BrokenPipe, Arc::new(FilterHandle::default()), &Config::default());

        let err = console.handle(Command::Export(Some(path.clone()))).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(console.status(), &StatusLine::Normal);
        assert!(path.exists());
    }

    #[test]
    fn test_refresh_failure_shown_as_attention() {
        let mut console = console();
        console
            .observe_status(RefreshStatus::Failed {
                message: "Connection error".to_string(),
            })
            .unwrap();
        assert!(output(console).ends_with("Attention: Connection error.\n"));
    }

    #[test]
    fn test_places_listed() {
        let mut console = console();
        console.set_places(["Hawaii".to_string(), "Tonga".to_string()].into_iter().collect());
        console.handle(Command::Places).unwrap();

        let text = output(console);
        assert!(text.contains("  Hawaii\n  Tonga\n"));
    }

    #[test]
    fn test_quit() {
        assert_eq!(console().handle(Command::Quit).unwrap(), Flow::Quit);
    }
}
