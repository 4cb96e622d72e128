//! Ignore-glob compilation.
//!
//! Ignore rules are written in a small glob dialect and compiled into anchored
//! regular expressions that are matched against absolute paths under the
//! target root:
//!
//! - `**/` matches zero or more whole path segments
//! - `*/` matches exactly one path segment
//! - `*.` matches any run of non-separator characters before a literal dot
//! - a bare `*` matches any run of non-separator characters
//! - every other character, dots and separators included, is literal
//!
//! Each glob yields a *path matcher* (the node itself and everything nested
//! beneath it) and, unless it ends in a separator, a *file matcher* (the exact
//! path only).
//!
//! ```
//! use renametree::pattern::IgnoreRules;
//! use std::path::Path;
//!
//! let rules = IgnoreRules::compile(Path::new("/proj"), &["bin/".to_string()]).unwrap();
//! assert!(rules.is_path_ignored(Path::new("/proj/bin/Debug")));
//! assert!(!rules.is_path_ignored(Path::new("/proj/binary")));
//! ```

use crate::config::ConfigError;
use regex::Regex;
use std::path::{MAIN_SEPARATOR, MAIN_SEPARATOR_STR, Path};

/// A lexical unit of an ignore glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobToken {
    /// Characters matched verbatim.
    Literal(String),
    /// The host path separator.
    Separator,
    /// `*` followed by a separator: exactly one segment.
    SingleSegment,
    /// `**` followed by a separator: zero or more segments.
    MultiSegment,
    /// `*` directly before a dot.
    AnyBeforeDot,
    /// `*` anywhere else.
    AnyInSegment,
    /// A literal `.`.
    Dot,
}

/// Splits a normalized glob into tokens.
///
/// # Errors
///
/// Returns `ConfigError::InvalidGlobPattern` if `**` is not followed by a
/// path separator.
pub fn tokenize(pattern: &str) -> Result<Vec<GlobToken>, ConfigError> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut i = 0;

    while i < chars.len() {
        let next = chars.get(i + 1).copied();
        let token = match chars[i] {
            '*' if next == Some('*') => {
                if chars.get(i + 2) != Some(&MAIN_SEPARATOR) {
                    return Err(ConfigError::InvalidGlobPattern {
                        pattern: pattern.to_string(),
                        reason: "`**` must be followed by a path separator".to_string(),
                    });
                }
                i += 3;
                GlobToken::MultiSegment
            }
            '*' if next == Some(MAIN_SEPARATOR) => {
                i += 2;
                GlobToken::SingleSegment
            }
            '*' if next == Some('.') => {
                i += 1;
                GlobToken::AnyBeforeDot
            }
            '*' => {
                i += 1;
                GlobToken::AnyInSegment
            }
            '.' => {
                i += 1;
                GlobToken::Dot
            }
            c if c == MAIN_SEPARATOR => {
                i += 1;
                GlobToken::Separator
            }
            c => {
                literal.push(c);
                i += 1;
                continue;
            }
        };

        if !literal.is_empty() {
            tokens.push(GlobToken::Literal(std::mem::take(&mut literal)));
        }
        tokens.push(token);
    }

    if !literal.is_empty() {
        tokens.push(GlobToken::Literal(literal));
    }

    Ok(tokens)
}

/// Renders tokens as regex source (unanchored).
fn render(tokens: &[GlobToken]) -> String {
    let sep = regex::escape(MAIN_SEPARATOR_STR);
    let mut out = String::new();
    for token in tokens {
        match token {
            GlobToken::Literal(text) => out.push_str(&regex::escape(text)),
            GlobToken::Separator => out.push_str(&sep),
            GlobToken::SingleSegment => out.push_str(&format!("[^{sep}]+{sep}")),
            GlobToken::MultiSegment => out.push_str(&format!("(?:[^{sep}]+{sep})*")),
            GlobToken::AnyBeforeDot | GlobToken::AnyInSegment => {
                out.push_str(&format!("[^{sep}]*"))
            }
            GlobToken::Dot => out.push_str(r"\."),
        }
    }
    out
}

/// The escaped `root + separator` prefix every matcher starts with.
fn root_prefix(root: &Path) -> String {
    let root = root.to_string_lossy();
    let trimmed = root.trim_end_matches(MAIN_SEPARATOR);
    format!(
        "{}{}",
        regex::escape(trimmed),
        regex::escape(MAIN_SEPARATOR_STR)
    )
}

fn build_regex(pattern: &str, source: &str) -> Result<Regex, ConfigError> {
    Regex::new(source).map_err(|e| ConfigError::InvalidGlobPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}

fn non_empty_tokens(pattern: &str, body: &str) -> Result<Vec<GlobToken>, ConfigError> {
    let tokens = tokenize(body)?;
    if tokens.is_empty() {
        return Err(ConfigError::InvalidGlobPattern {
            pattern: pattern.to_string(),
            reason: "pattern is empty".to_string(),
        });
    }
    Ok(tokens)
}

/// Matches a path and everything nested beneath it.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    regex: Regex,
}

impl PathMatcher {
    /// Compiles `pattern` relative to `root`.
    ///
    /// A single trailing separator is ignored, so `bin/` and `bin` yield the
    /// same path matcher.
    pub fn compile(root: &Path, pattern: &str) -> Result<Self, ConfigError> {
        let body = pattern.strip_suffix(MAIN_SEPARATOR).unwrap_or(pattern);
        let tokens = non_empty_tokens(pattern, body)?;
        let sep = regex::escape(MAIN_SEPARATOR_STR);
        let source = format!(
            "^{}{}(?:{sep}(?s:.*))?$",
            root_prefix(root),
            render(&tokens)
        );
        Ok(Self {
            regex: build_regex(pattern, &source)?,
        })
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.regex.is_match(&path.to_string_lossy())
    }
}

/// Matches exactly one path.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    regex: Regex,
}

impl FileMatcher {
    /// Compiles `pattern` relative to `root`.
    ///
    /// Returns `Ok(None)` for patterns ending in a separator, which denote
    /// directories and have no file matcher.
    pub fn compile(root: &Path, pattern: &str) -> Result<Option<Self>, ConfigError> {
        if pattern.ends_with(MAIN_SEPARATOR) {
            return Ok(None);
        }
        let tokens = non_empty_tokens(pattern, pattern)?;
        let source = format!("^{}{}$", root_prefix(root), render(&tokens));
        Ok(Some(Self {
            regex: build_regex(pattern, &source)?,
        }))
    }

    pub fn matches(&self, path: &Path) -> bool {
        self.regex.is_match(&path.to_string_lossy())
    }
}

/// The compiled matchers for one configured ignore glob.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    pub path_matcher: PathMatcher,
    pub file_matcher: Option<FileMatcher>,
}

/// The full, immutable set of ignore rules for a run.
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    rules: Vec<IgnoreRule>,
}

impl IgnoreRules {
    /// Compiles every normalized glob in `patterns` against `root`.
    ///
    /// # Errors
    ///
    /// Fails on the first malformed pattern; nothing is partially compiled.
    pub fn compile(root: &Path, patterns: &[String]) -> Result<Self, ConfigError> {
        let rules = patterns
            .iter()
            .map(|glob| {
                Ok(IgnoreRule {
                    path_matcher: PathMatcher::compile(root, glob)?,
                    file_matcher: FileMatcher::compile(root, glob)?,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { rules })
    }

    /// True if `path` is, or lies beneath, an ignored node.
    pub fn is_path_ignored(&self, path: &Path) -> bool {
        self.rules.iter().any(|rule| rule.path_matcher.matches(path))
    }

    /// True if `path` is exactly an ignored file.
    pub fn is_file_ignored(&self, path: &Path) -> bool {
        self.rules
            .iter()
            .filter_map(|rule| rule.file_matcher.as_ref())
            .any(|matcher| matcher.matches(path))
    }

    pub fn rules(&self) -> &[IgnoreRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
