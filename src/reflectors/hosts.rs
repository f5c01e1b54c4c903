//! Hosts list parsing.
//!
//! One reflector per line:
//!
//! ```text
//! # id;name;description;host;port
//! 12345;Bristol;South West UK;ysf.example.org;42000
//! ```
//!
//! Blank lines and `#` comments are ignored. Malformed lines are skipped with a
//! warning so one bad entry does not take the whole directory down.

use log::warn;
use serde::Serialize;

/// One parsed line of the hosts list, before address resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub host: String,
    pub port: u16,
}

pub fn parse_hosts(text: &str) -> Vec<HostEntry> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| parse_line(index + 1, line))
        .collect()
}

fn parse_line(line_no: usize, line: &str) -> Option<HostEntry> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let fields: Vec<&str> = line.split(';').map(str::trim).collect();
    if fields.len() != 5 {
        warn!(
            "hosts line {}: expected 5 fields, found {}; skipping",
            line_no,
            fields.len()
        );
        return None;
    }

    if fields[0].is_empty() || fields[3].is_empty() {
        warn!("hosts line {}: missing id or host; skipping", line_no);
        return None;
    }

    let port = match fields[4].parse::<u16>() {
        Ok(p) if p > 0 => p,
        _ => {
            warn!("hosts line {}: invalid port '{}'; skipping", line_no, fields[4]);
            return None;
        }
    };

    Some(HostEntry {
        id: fields[0].to_string(),
        name: fields[1].to_string(),
        description: fields[2].to_string(),
        host: fields[3].to_string(),
        port,
    })
}
