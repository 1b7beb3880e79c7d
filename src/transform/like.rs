//! SQL `LIKE` patterns.

use std::fmt;

use regex::{Regex, RegexBuilder};

use crate::types::Collation;

/// A compiled `LIKE` pattern: `%` matches any run of characters, `_` exactly one, and
/// everything else matches literally. The pattern must match the whole value.
#[derive(Debug, Clone)]
pub struct LikePattern {
    pattern: String,
    regex: Regex,
}

impl LikePattern {
    pub fn new(pattern: &str, collation: Collation) -> Result<Self, regex::Error> {
        let mut source = String::with_capacity(pattern.len() + 8);
        let mut literal = String::new();
        source.push('^');
        for ch in pattern.chars() {
            match ch {
                '%' | '_' => {
                    source.push_str(&regex::escape(&literal));
                    literal.clear();
                    source.push_str(if ch == '%' { ".*" } else { "." });
                }
                _ => literal.push(ch),
            }
        }
        source.push_str(&regex::escape(&literal));
        source.push('$');

        let regex = RegexBuilder::new(&source)
            .case_insensitive(collation == Collation::CaseInsensitive)
            .dot_matches_new_line(true)
            .build()?;

        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

impl fmt::Display for LikePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.pattern)
    }
}
