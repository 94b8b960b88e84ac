use std::str::FromStr;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, HOST};

/// One `-H` directive, parsed once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HeaderDirective {
    /// Added to every request as-is. `value` may be empty.
    Header { name: String, value: String },
    /// Replaces the virtual host sent in the `Host` header.
    Host(String),
}

impl HeaderDirective {
    /// Splits `"Key: Value"` on the first colon. Leading spaces of the value
    /// are dropped, later colons are kept. A directive without a colon yields
    /// an empty-valued header.
    pub fn parse(raw: &str) -> Self {
        let Some((key, value)) = raw.split_once(':') else {
            return Self::Header {
                name: raw.trim().to_string(),
                value: String::new(),
            };
        };
        let key = key.trim();
        let value = value.trim_start_matches(' ');
        if key.eq_ignore_ascii_case("host") {
            return Self::Host(value.to_string());
        }
        Self::Header {
            name: key.to_string(),
            value: value.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Header { name, value } => {
                HeaderName::from_str(name).map_err(|_| format!("invalid header name '{name}'"))?;
                HeaderValue::from_str(value)
                    .map_err(|_| format!("invalid value for header '{name}'"))?;
            }
            Self::Host(host) => {
                HeaderValue::from_str(host).map_err(|_| format!("invalid host '{host}'"))?;
            }
        }
        Ok(())
    }
}

pub fn parse_header_directives(raw: &[String]) -> Vec<HeaderDirective> {
    raw.iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| HeaderDirective::parse(s))
        .collect()
}

/// Appends the directives to `headers` in order. Fails on the first name or
/// value that is not a legal HTTP header.
pub(crate) fn apply_directives(
    headers: &mut HeaderMap,
    directives: &[HeaderDirective],
) -> Result<(), String> {
    for directive in directives {
        match directive {
            HeaderDirective::Header { name, value } => {
                let key = HeaderName::from_str(name)
                    .map_err(|_| format!("invalid header name '{name}'"))?;
                let value = HeaderValue::from_str(value)
                    .map_err(|_| format!("invalid value for header '{name}'"))?;
                headers.append(key, value);
            }
            HeaderDirective::Host(host) => {
                let value =
                    HeaderValue::from_str(host).map_err(|_| format!("invalid host '{host}'"))?;
                headers.insert(HOST, value);
            }
        }
    }
    Ok(())
}
