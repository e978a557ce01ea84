//! Parser for `apt-get --just-print upgrade` output
//!
//! Only install lines are of interest. They look like:
//!
//! ```text
//! Inst libssl1.1 [1.1.1f-1ubuntu2.16] (1.1.1f-1ubuntu2.17 Ubuntu:20.04/focal-security [amd64])
//! ```
//!
//! Each line is scanned left to right by a small state machine. A missing
//! delimiter leaves the scanner stuck in its current state, so the fields after
//! it stay empty. Scanning never fails.

use skyline_api::UpdateRecord;

/// Marker that starts every install line
pub const INSTALL_MARKER: &str = "Inst";

/// Install lines this short or shorter are treated as truncated
const MIN_LINE_LEN: usize = 7;

/// Check whether a line announces a pending installation
#[must_use]
pub fn is_install_line(line: &str) -> bool {
    line.starts_with(INSTALL_MARKER)
}

/// Keep only install lines longer than the truncation guard, in order
pub fn filter_install_lines<'a, I>(lines: I) -> impl Iterator<Item = &'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .filter(|line| is_install_line(line) && line.len() > MIN_LINE_LEN)
}

/// Parse every install line of a simulated upgrade
pub fn parse_simulation(output: &str) -> impl Iterator<Item = UpdateRecord> + '_ {
    filter_install_lines(output.lines()).map(parse_install_line)
}

/// Record field a scanned character is appended to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    PackageName,
    CurrentVersion,
    NewVersion,
    Repository,
}

/// Scanner position within an install line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Dropping the `Inst` marker up to the first space
    SkipMarker,
    /// Collecting the package name up to the next space
    PackageName,
    /// Dropping annotation text up to `[`
    SeekOpenBracket,
    /// Collecting the installed version up to `]`
    CurrentVersion,
    /// Dropping text up to `(`
    SeekOpenParen,
    /// Collecting the candidate version up to a space
    NewVersion,
    /// Collecting the repository label up to `)`
    Repository,
    /// Ignoring the rest of the line
    Done,
}

impl ScanState {
    /// Transition on one character
    ///
    /// Returns the next state and the field the character belongs to, if any.
    /// Delimiters are consumed without being recorded.
    #[must_use]
    pub fn step(self, c: char) -> (ScanState, Option<Field>) {
        use ScanState::*;

        match (self, c) {
            (SkipMarker, ' ') => (PackageName, None),
            (SkipMarker, _) => (SkipMarker, None),

            (PackageName, ' ') => (SeekOpenBracket, None),
            (PackageName, _) => (PackageName, Some(Field::PackageName)),

            (SeekOpenBracket, '[') => (CurrentVersion, None),
            (SeekOpenBracket, _) => (SeekOpenBracket, None),

            (CurrentVersion, ']') => (SeekOpenParen, None),
            (CurrentVersion, _) => (CurrentVersion, Some(Field::CurrentVersion)),

            (SeekOpenParen, '(') => (NewVersion, None),
            (SeekOpenParen, _) => (SeekOpenParen, None),

            (NewVersion, ' ') => (Repository, None),
            (NewVersion, _) => (NewVersion, Some(Field::NewVersion)),

            (Repository, ')') => (Done, None),
            (Repository, _) => (Repository, Some(Field::Repository)),

            (Done, _) => (Done, None),
        }
    }
}

/// Parse one install line into an update record
///
/// Malformed lines yield records with empty fields for whatever could not
/// be captured.
#[must_use]
pub fn parse_install_line(line: &str) -> UpdateRecord {
    let mut package_name = String::new();
    let mut current_version = String::new();
    let mut new_version = String::new();
    let mut repository = String::new();

    let mut state = ScanState::SkipMarker;
    for c in line.chars() {
        if state == ScanState::Done {
            break;
        }

        let (next, field) = state.step(c);
        match field {
            Some(Field::PackageName) => package_name.push(c),
            Some(Field::CurrentVersion) => current_version.push(c),
            Some(Field::NewVersion) => new_version.push(c),
            Some(Field::Repository) => repository.push(c),
            None => {}
        }
        state = next;
    }

    UpdateRecord::new(package_name, current_version, new_version, repository)
}
