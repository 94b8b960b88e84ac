use std::collections::HashSet;

pub const DEFAULT_PORTS: &str = "443,80";

pub const DEFAULT_USER_AGENT: &str = "pokehttp: https://github.com/bruston/pokehttp";

pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

// Ports stay strings so a token is used in the URL exactly as the user typed it.
// Repeated tokens are dropped, first occurrence keeps its position.
pub fn parse_ports_csv(value: &str) -> Result<Vec<String>, String> {
    let raw = value.trim();
    let raw = raw.strip_suffix(',').unwrap_or(raw);
    if raw.trim().is_empty() {
        return Err("port list is empty".to_string());
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut out: Vec<String> = Vec::new();
    for part in raw.split(',') {
        let item = part.trim();
        if item.is_empty() {
            continue;
        }
        if item.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(format!("invalid port '{item}'"));
        }
        if seen.insert(item) {
            out.push(item.to_string());
        }
    }

    if out.is_empty() {
        return Err("port list is empty".to_string());
    }
    Ok(out)
}

// Strips CR left over from CRLF input and surrounding whitespace.
pub fn clean_target_line(line: &str) -> Option<&str> {
    let line = line.trim();
    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}
