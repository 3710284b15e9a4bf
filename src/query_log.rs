//! Append-only log of user queries and the daily digest built from it.

use chrono::{Local, NaiveDate};
use failure::Fail;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DIGEST_FALLBACK_LINES: usize = 50;
pub const EMPTY_DIGEST: &str = "Дайджест: за сутки не было запросов.";

#[derive(Debug, Fail)]
pub enum QueryLogError {
    #[fail(display = "I/O error: {}", _0)]
    Io(io::Error),
}

impl From<io::Error> for QueryLogError {
    fn from(err: io::Error) -> QueryLogError {
        QueryLogError::Io(err)
    }
}

#[derive(Clone, Debug)]
pub struct QueryLog {
    path: PathBuf,
}

/// `<timestamp> | <user id> | <username> | <text>`, always on a single line.
pub fn format_entry(timestamp: &str, user_id: &str, username: &str, text: &str) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    format!("{} | {} | {} | {}", timestamp, user_id, username, flat)
}

impl QueryLog {
    pub fn new<P: AsRef<Path>>(path: P) -> QueryLog {
        QueryLog {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, user_id: &str, username: &str, text: &str) -> Result<(), QueryLogError> {
        let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", format_entry(&timestamp, user_id, username, text))?;
        Ok(())
    }

    /// All logged lines. A log that was never written is empty.
    pub fn lines(&self) -> Result<Vec<String>, QueryLogError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(contents
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(String::from)
                .collect()),
            Err(ref err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(QueryLogError::from(err)),
        }
    }
}

/// Lines logged on `day`; the last `DIGEST_FALLBACK_LINES` lines when that day has none.
pub fn compose_digest(lines: &[String], day: NaiveDate) -> String {
    if lines.is_empty() {
        return EMPTY_DIGEST.to_owned();
    }

    let day_prefix = day.format("%Y-%m-%d").to_string();
    let of_the_day: Vec<&str> = lines
        .iter()
        .filter(|line| line.get(..10) == Some(day_prefix.as_str()))
        .map(String::as_str)
        .collect();

    let selected: Vec<&str> = if of_the_day.is_empty() {
        let skip = lines.len().saturating_sub(DIGEST_FALLBACK_LINES);
        lines[skip..].iter().map(String::as_str).collect()
    } else {
        of_the_day
    };

    format!(
        "Дайджест запросов пользователей в leasing bot за {}:\n{}",
        day_prefix,
        selected.join("\n")
    )
}
