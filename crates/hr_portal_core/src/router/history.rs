//! Navigation history and fragment parsing.

use once_cell::sync::Lazy;
use regex::Regex;

static EMBED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?#&]embed=true(?:[&#]|$)").expect("valid embed regex"));

/// Parsed URL fragment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Location {
    /// Route without `#` and query; empty when the fragment is empty.
    pub route: String,
    pub embed: bool,
}

impl Location {
    /// Parses `#/route?embed=true`, a bare `/route`, or a full URL.
    pub fn parse(input: &str) -> Self {
        let embed = EMBED_RE.is_match(input);
        let fragment = match input.split_once('#') {
            Some((_, fragment)) => fragment,
            None if input.starts_with('/') => input,
            None => "",
        };
        let route = fragment
            .split_once('?')
            .map_or(fragment, |(route, _)| route)
            .trim()
            .to_string();
        Self { route, embed }
    }

    pub fn route(&self) -> Option<&str> {
        (!self.route.is_empty()).then_some(self.route.as_str())
    }
}

/// Entry stack with a cursor, like a browser session history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
    cursor: usize,
}

impl History {
    /// Starts with one entry for the initial fragment (may be empty).
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![initial.into()],
            cursor: 0,
        }
    }

    /// Fragment at the cursor.
    pub fn location(&self) -> &str {
        self.entries
            .get(self.cursor)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Drops forward entries and appends `route`.
    pub fn push(&mut self, route: &str) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(route.to_string());
        self.cursor = self.entries.len() - 1;
    }

    pub fn back(&mut self) -> Option<&str> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(self.location())
    }

    pub fn forward(&mut self) -> Option<&str> {
        if self.cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor += 1;
        Some(self.location())
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
