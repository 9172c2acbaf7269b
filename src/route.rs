//! Route-pattern compilation and parameter extraction.
//!
//! Patterns mix literal path text with `:name` placeholders:
//! `"/users/:id/posts/:post_id"`. Extraction matches a pattern against a path
//! (query already stripped) and returns the named captures in declaration
//! order.
//!
//! Compilation is positional: one left-to-right scan classifies the pattern
//! into literal and parameter tokens, and the matcher is assembled token by
//! token. Literal text is regex-escaped on the way in, so a literal segment
//! that happens to share text with another can never be rewritten by a later
//! substitution. Each parameter becomes a named capture of one or more word
//! characters, flanked by an optional slash on each side.
//!
//! Patterns are static per route registration, so compiled matchers are
//! cached for the life of the process, keyed by pattern text.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use indexmap::IndexMap;
use regex::Regex;

use crate::error::DecodeError;

/// Named values extracted from one matched route pattern, in declaration
/// order.
pub type ParamMap = IndexMap<String, String>;

/// One piece of a scanned route pattern.
#[derive(Debug, PartialEq, Eq)]
enum Token {
    Literal(String),
    Param(String),
}

struct Compiled {
    regex: Regex,
    names: Vec<String>,
}

static CACHE: OnceLock<RwLock<HashMap<String, Arc<Compiled>>>> = OnceLock::new();

/// Extracts named path parameters from `url` using `pattern`.
///
/// `url` must be the path only — strip the query component first
/// ([`Request::path`](crate::Request::path) does this).
///
/// # Errors
///
/// [`DecodeError::InvalidPattern`] if the pattern cannot be compiled (for
/// example a duplicate parameter name), [`DecodeError::RouteMismatch`] if the
/// compiled pattern does not match `url`.
pub fn extract(url: &str, pattern: &str) -> Result<ParamMap, DecodeError> {
    let compiled = lookup_or_compile(pattern)?;

    let captures = compiled.regex.captures(url).ok_or_else(|| DecodeError::RouteMismatch {
        url: url.to_owned(),
        pattern: pattern.to_owned(),
    })?;

    let mut params = ParamMap::with_capacity(compiled.names.len());
    for name in &compiled.names {
        if let Some(m) = captures.name(name) {
            params.insert(name.clone(), m.as_str().to_owned());
        }
    }
    Ok(params)
}

fn lookup_or_compile(pattern: &str) -> Result<Arc<Compiled>, DecodeError> {
    let cache = CACHE.get_or_init(|| RwLock::new(HashMap::new()));

    if let Some(hit) = cache.read().expect("route cache poisoned").get(pattern) {
        return Ok(Arc::clone(hit));
    }

    let compiled = Arc::new(compile(pattern)?);
    cache
        .write()
        .expect("route cache poisoned")
        .entry(pattern.to_owned())
        .or_insert_with(|| Arc::clone(&compiled));
    Ok(compiled)
}

fn compile(pattern: &str) -> Result<Compiled, DecodeError> {
    let tokens = scan(pattern);

    let mut source = String::with_capacity(pattern.len() + 16);
    let mut names = Vec::new();
    for token in &tokens {
        match token {
            Token::Literal(text) => source.push_str(&regex::escape(text)),
            Token::Param(name) => {
                // Capture-group names must start with a letter or underscore.
                if name.starts_with(|c: char| c.is_ascii_digit()) {
                    return Err(DecodeError::InvalidPattern(pattern.to_owned()));
                }
                source.push_str(&format!("/?(?P<{name}>\\w+)/?"));
                names.push(name.clone());
            }
        }
    }

    // Duplicate parameter names within one pattern make the capture groups
    // ambiguous; the regex engine rejects them here.
    let regex = Regex::new(&source)
        .map_err(|_| DecodeError::InvalidPattern(pattern.to_owned()))?;
    Ok(Compiled { regex, names })
}

/// Splits a pattern into literal and parameter tokens in one pass.
///
/// A parameter is a `:` followed by word characters; the slash before it and
/// the slash after its name are folded into the parameter token, where the
/// compiler re-emits them as optional.
fn scan(pattern: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        let starts_param = c == ':'
            && chars.peek().is_some_and(|n| n.is_ascii_alphanumeric() || *n == '_');
        if !starts_param {
            literal.push(c);
            continue;
        }

        // The slash before the marker is folded into the parameter token.
        if literal.ends_with('/') {
            literal.pop();
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(std::mem::take(&mut literal)));
        }

        let mut name = String::new();
        while let Some(&n) = chars.peek() {
            if n.is_ascii_alphanumeric() || n == '_' {
                name.push(n);
                chars.next();
            } else {
                break;
            }
        }
        tokens.push(Token::Param(name));

        // A slash directly after the name belongs to the parameter too.
        if chars.peek() == Some(&'/') {
            chars.next();
        }
    }

    if !literal.is_empty() {
        tokens.push(Token::Literal(literal));
    }
    tokens
}
