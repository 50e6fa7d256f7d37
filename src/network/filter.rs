//! Interface allow-list matching.
//!
//! Patterns are exact names or globs: `*` (any run), `?` (one character),
//! `[abc]` / `[a-z]` / `[!abc]` (classes), `{eth*,en*}` (alternatives) and `\`
//! to escape the next character. Names without glob syntax are matched by
//! string comparison; the rest are compiled to anchored regular expressions.

use std::collections::HashSet;

use regex::Regex;

use crate::error::{Error, Result};
use crate::network::types::InterfaceDescriptor;

#[derive(Debug, Clone, Default)]
pub struct InterfaceFilter {
    exact: HashSet<String>,
    globs: Vec<Regex>,
}

impl InterfaceFilter {
    /// Compiles `patterns`. Any malformed pattern fails the whole filter.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut filter = Self::default();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if has_glob_syntax(pattern) {
                let source = glob_to_regex(pattern)?;
                let regex = Regex::new(&source).map_err(|e| Error::filter(pattern, e.to_string()))?;
                filter.globs.push(regex);
            } else {
                filter.exact.insert(pattern.to_string());
            }
        }
        Ok(filter)
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.globs.is_empty()
    }

    pub fn matches(&self, name: &str) -> bool {
        self.exact.contains(name) || self.globs.iter().any(|re| re.is_match(name))
    }

    /// Full inclusion policy for one counter sample.
    ///
    /// A non-empty allow-list decides on the name alone. Otherwise the
    /// interface must be enumerated, up and not loopback, unless
    /// `skip_checks` waives those checks.
    pub fn includes(&self, name: &str, descriptor: Option<&InterfaceDescriptor>, skip_checks: bool) -> bool {
        if !self.is_empty() {
            return self.matches(name);
        }
        if skip_checks {
            return true;
        }
        descriptor.is_some_and(|d| d.is_up() && !d.is_loopback())
    }
}

fn has_glob_syntax(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', ']', '{', '}', '\\'])
}

fn glob_to_regex(pattern: &str) -> Result<String> {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    let mut chars = pattern.chars().peekable();
    let mut alternation_depth = 0usize;

    out.push('^');
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '\\' => match chars.next() {
                Some(escaped) => out.push_str(&regex::escape(&escaped.to_string())),
                None => return Err(Error::filter(pattern, "trailing escape")),
            },
            '[' => {
                out.push('[');
                if chars.peek() == Some(&'!') {
                    chars.next();
                    out.push('^');
                }
                let mut closed = false;
                let mut empty = true;
                for c in chars.by_ref() {
                    match c {
                        ']' if !empty => {
                            closed = true;
                            break;
                        }
                        '\\' | '[' | ']' | '^' | '&' | '~' => {
                            out.push('\\');
                            out.push(c);
                        }
                        _ => out.push(c),
                    }
                    empty = false;
                }
                if !closed {
                    return Err(Error::filter(pattern, "unterminated character class"));
                }
                out.push(']');
            }
            ']' => return Err(Error::filter(pattern, "unmatched ']'")),
            '{' => {
                alternation_depth += 1;
                out.push_str("(?:");
            }
            ',' if alternation_depth > 0 => out.push('|'),
            '}' if alternation_depth > 0 => {
                alternation_depth -= 1;
                out.push(')');
            }
            '}' => return Err(Error::filter(pattern, "unmatched '}'")),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    if alternation_depth > 0 {
        return Err(Error::filter(pattern, "unterminated alternation"));
    }
    out.push('$');

    Ok(out)
}
