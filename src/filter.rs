//! Pattern modifiers for library filters
//!
//! A raw filter string selects library entries by plain equality unless it
//! starts with one of the reserved prefixes:
//!
//! ```text
//! cpu.load        literal match
//! glob:cpu.*      shell-glob match on the remainder
//! regexp:^cpu\.   regular-expression search on the remainder
//! ```

use std::fmt;

use regex::Regex;
use thiserror::Error;

/// Prefix marking a glob pattern
pub const GLOB_PREFIX: &str = "glob:";

/// Prefix marking a regular-expression pattern
pub const REGEXP_PREFIX: &str = "regexp:";

/// Errors raised when a filter pattern cannot be compiled
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl FilterError {
    fn invalid(pattern: &str, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            message: message.into(),
        }
    }
}

/// A classified filter value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Plain string equality
    Literal(String),
    /// Shell-glob pattern, prefix stripped
    Glob(String),
    /// Regular-expression pattern, prefix stripped
    Regexp(String),
}

/// Classify a raw filter string by its prefix
///
/// No pattern syntax is checked here; malformed patterns surface when the
/// filter is compiled into a [`Matcher`].
pub fn apply_modifier(input: &str) -> Filter {
    if let Some(rest) = input.strip_prefix(GLOB_PREFIX) {
        Filter::Glob(rest.to_string())
    } else if let Some(rest) = input.strip_prefix(REGEXP_PREFIX) {
        Filter::Regexp(rest.to_string())
    } else {
        Filter::Literal(input.to_string())
    }
}

impl Filter {
    /// Same as [`apply_modifier`]
    pub fn parse(input: &str) -> Self {
        apply_modifier(input)
    }

    /// The pattern payload without its prefix
    pub fn pattern(&self) -> &str {
        match self {
            Filter::Literal(s) | Filter::Glob(s) | Filter::Regexp(s) => s,
        }
    }

    /// Compile the filter for repeated matching
    pub fn matcher(&self) -> Result<Matcher, FilterError> {
        match self {
            Filter::Literal(s) => Ok(Matcher::Exact(s.clone())),
            Filter::Glob(s) => {
                let source = glob_to_regex(s)?;
                Regex::new(&source)
                    .map(Matcher::Pattern)
                    .map_err(|e| FilterError::invalid(s, e.to_string()))
            }
            Filter::Regexp(s) => Regex::new(s)
                .map(Matcher::Pattern)
                .map_err(|e| FilterError::invalid(s, e.to_string())),
        }
    }

    /// Match a single candidate, compiling the pattern on the fly
    pub fn matches(&self, candidate: &str) -> Result<bool, FilterError> {
        Ok(self.matcher()?.is_match(candidate))
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Literal(s) => write!(f, "{}", s),
            Filter::Glob(s) => write!(f, "{}{}", GLOB_PREFIX, s),
            Filter::Regexp(s) => write!(f, "{}{}", REGEXP_PREFIX, s),
        }
    }
}

/// A compiled filter
#[derive(Debug, Clone)]
pub enum Matcher {
    Exact(String),
    Pattern(Regex),
}

impl Matcher {
    /// Case-sensitive match against a candidate string
    pub fn is_match(&self, candidate: &str) -> bool {
        match self {
            Matcher::Exact(s) => s == candidate,
            Matcher::Pattern(re) => re.is_match(candidate),
        }
    }
}

/// Translate a shell glob into an anchored regular expression
///
/// Supports `*`, `?` and bracket classes (`[abc]`, `[a-z]`, `[!x]`/`[^x]`).
fn glob_to_regex(glob: &str) -> Result<String, FilterError> {
    let mut out = String::from("^");
    let mut chars = glob.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => {
                out.push('[');
                if matches!(chars.peek(), Some('!') | Some('^')) {
                    chars.next();
                    out.push('^');
                }
                // A leading ']' is a literal member of the class
                if chars.peek() == Some(&']') {
                    chars.next();
                    out.push_str("\\]");
                }
                let mut closed = false;
                for c in chars.by_ref() {
                    match c {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '\\' | '[' | '&' | '~' => {
                            out.push('\\');
                            out.push(c);
                        }
                        _ => out.push(c),
                    }
                }
                if !closed {
                    return Err(FilterError::invalid(glob, "unterminated character class"));
                }
                out.push(']');
            }
            _ => out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
        }
    }

    out.push('$');
    Ok(out)
}
