use std::io;
use std::path::Path;

use thiserror::Error;

use harvest_logging::harvest_warn;

use crate::session::SessionCookie;

#[derive(Debug, Error)]
pub enum CookieFileError {
    #[error("cannot read cookie file {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: io::Error,
    },
}

/// Load cookies from a Netscape-format cookies.txt file.
///
/// An unreadable file is fatal for the run; individual malformed lines are
/// logged and skipped.
pub fn load_cookie_file(path: &Path) -> Result<Vec<SessionCookie>, CookieFileError> {
    let text = std::fs::read_to_string(path).map_err(|source| CookieFileError::Unreadable {
        path: path.display().to_string(),
        source,
    })?;
    Ok(parse_cookie_lines(&text))
}

/// Parse Netscape cookies.txt content: one tab-separated cookie per line
/// (`domain flag path secure expiry name value`). Comment and blank lines
/// are skipped, except the `#HttpOnly_` domain prefix which marks a real
/// cookie and is stripped.
pub fn parse_cookie_lines(text: &str) -> Vec<SessionCookie> {
    let mut cookies = Vec::new();
    for (line_no, raw) in text.lines().enumerate() {
        let mut line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("#HttpOnly_") {
            line = stripped;
        } else if line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 7 {
            harvest_warn!(
                "skipping malformed cookie line {} ({} fields, expected 7)",
                line_no + 1,
                fields.len()
            );
            continue;
        }

        let mut value = fields[6];
        if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
            value = &value[1..value.len() - 1];
        }

        cookies.push(SessionCookie {
            name: fields[5].to_string(),
            value: value.to_string(),
            domain: fields[0].to_string(),
            path: fields[2].to_string(),
            secure: fields[3].eq_ignore_ascii_case("TRUE"),
            // Digit strings only, including "0"; anything else means no expiry.
            expiry: fields[4].parse::<i64>().ok().filter(|&e| e >= 0),
        });
    }
    cookies
}
