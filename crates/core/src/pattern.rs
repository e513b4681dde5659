//! Glob-like route patterns compiled into path predicates.
//!
//! Grammar:
//! - `**` matches any sequence of path segments; `/**` also matches zero segments
//! - `*` matches within one segment and never crosses `/`
//! - `{a,b,c}` matches any one alternative (alternatives may contain wildcards)
//! - anything else is literal
//!
//! A pattern starting with `/` is anchored at the path root. A pattern without
//! a leading `/` (e.g. `*.png`) matches the trailing segments of a path at any depth.
//! Patterns match the URL path only; query string and origin are ignored.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Syntax errors found while compiling a pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("empty pattern")]
    Empty,

    #[error("unclosed `{{` at position {0}")]
    UnclosedBrace(usize),

    #[error("unexpected `}}` at position {0}")]
    StrayBrace(usize),

    #[error("nested `{{` at position {0}")]
    NestedBrace(usize),

    #[error("empty alternative in group at position {0}")]
    EmptyAlternative(usize),

    #[error("`{run}` at position {position} is not a valid wildcard")]
    BadWildcard { run: String, position: usize },

    #[error("`{0}` is not allowed in a path pattern")]
    Reserved(char),

    #[error("regex compilation failed: {0}")]
    Regex(String),
}

/// A compiled route pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern. Deterministic: the same source always yields the same predicate.
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        if source.is_empty() {
            return Err(PatternError::Empty);
        }

        let chars: Vec<char> = source.chars().collect();
        let mut out = String::from("^");
        if chars[0] != '/' {
            out.push_str("(?:.*/)?");
        }
        translate(&chars, 0, false, &mut out)?;
        out.push('$');

        let regex = Regex::new(&out).map_err(|e| PatternError::Regex(e.to_string()))?;
        Ok(Self { source: source.to_string(), regex })
    }

    /// Test a request path (no query string, no origin).
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// `/**` matches every path and must close a rule list.
    pub fn is_catch_all(&self) -> bool {
        self.source == "/**"
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::compile(&source).map_err(serde::de::Error::custom)
    }
}

/// `chars[at..]` starts with exactly two `*`.
fn globstar_at(chars: &[char], at: usize) -> bool {
    chars.get(at) == Some(&'*') && chars.get(at + 1) == Some(&'*') && chars.get(at + 2) != Some(&'*')
}

/// Translate `chars` (starting at absolute position `offset`) into regex syntax.
fn translate(chars: &[char], offset: usize, in_group: bool, out: &mut String) -> Result<(), PatternError> {
    let mut i = 0;
    while i < chars.len() {
        let position = offset + i;
        match chars[i] {
            '/' if globstar_at(chars, i + 1) => {
                match chars.get(i + 3) {
                    None => {
                        out.push_str("(?:/.*)?");
                        i += 3;
                    }
                    Some('/') => {
                        out.push_str("/(?:.*/)?");
                        i += 4;
                    }
                    Some(_) => {
                        out.push('/');
                        i += 1;
                    }
                }
            }
            '*' => {
                let run = chars[i..].iter().take_while(|c| **c == '*').count();
                match run {
                    1 => out.push_str("[^/]*"),
                    2 => out.push_str(".*"),
                    _ => return Err(PatternError::BadWildcard { run: "*".repeat(run), position }),
                }
                i += run;
            }
            '{' => {
                if in_group {
                    return Err(PatternError::NestedBrace(position));
                }
                let rest = &chars[i + 1..];
                let close = rest.iter().position(|c| *c == '}').ok_or(PatternError::UnclosedBrace(position))?;
                if let Some(nested) = rest[..close].iter().position(|c| *c == '{') {
                    return Err(PatternError::NestedBrace(position + 1 + nested));
                }

                out.push_str("(?:");
                let mut start = 0;
                for (n, alternative) in rest[..close].split(|c| *c == ',').enumerate() {
                    if alternative.is_empty() {
                        return Err(PatternError::EmptyAlternative(position));
                    }
                    if n > 0 {
                        out.push('|');
                    }
                    translate(alternative, position + 1 + start, true, out)?;
                    start += alternative.len() + 1;
                }
                out.push(')');
                i += close + 2;
            }
            '}' => return Err(PatternError::StrayBrace(position)),
            c @ ('?' | '#') => return Err(PatternError::Reserved(c)),
            c => {
                let mut buf = [0u8; 4];
                out.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                i += 1;
            }
        }
    }
    Ok(())
}
