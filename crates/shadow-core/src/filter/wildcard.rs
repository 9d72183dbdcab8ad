//! Shell-style wildcard matching
//!
//! Patterns follow POSIX `fnmatch` rules without case folding: `*` matches any
//! run of characters, `?` a single character, `[seq]` a character class and
//! `[!seq]` its complement. An unterminated `[` is a literal bracket. A
//! reversed range such as `z-a` is dropped from its class; a class left empty
//! matches nothing, a negated one any character. The pattern must match the
//! whole value.

use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;

/// Compiled patterns kept per thread before the cache is reset
const CACHE_CAPACITY: usize = 256;

thread_local! {
    static COMPILED: RefCell<HashMap<String, Option<Wildcard>>> = RefCell::new(HashMap::new());
}

/// A compiled wildcard pattern
#[derive(Debug, Clone)]
pub struct Wildcard {
    /// `None` for a pattern no value can match
    regex: Option<Regex>,
}

impl Wildcard {
    /// Compile `pattern`
    ///
    /// Returns `None` when the translated expression is rejected by the
    /// regex engine.
    pub fn new(pattern: &str) -> Option<Self> {
        let Some(expression) = translate(pattern) else {
            return Some(Self { regex: None });
        };
        match Regex::new(&expression) {
            Ok(regex) => Some(Self { regex: Some(regex) }),
            Err(e) => {
                tracing::warn!(pattern, error = %e, "Unusable wildcard pattern");
                None
            }
        }
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.regex.as_ref().is_some_and(|regex| regex.is_match(value))
    }
}

/// Match `value` against `pattern`; unusable patterns match nothing.
///
/// Compiled patterns are cached per thread, so a pattern evaluated against
/// every record of a pass is translated once.
pub fn wildcard_match(pattern: &str, value: &str) -> bool {
    if !pattern.contains(['*', '?', '[']) {
        return pattern == value;
    }
    COMPILED.with(|cache| {
        let mut cache = cache.borrow_mut();
        if !cache.contains_key(pattern) {
            if cache.len() >= CACHE_CAPACITY {
                cache.clear();
            }
            cache.insert(pattern.to_string(), Wildcard::new(pattern));
        }
        cache
            .get(pattern)
            .and_then(Option::as_ref)
            .is_some_and(|wildcard| wildcard.is_match(value))
    })
}

/// Translate a wildcard pattern into an anchored regular expression
///
/// Returns `None` when a class can match no character, which makes the
/// whole pattern unmatchable.
fn translate(pattern: &str) -> Option<String> {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::from("(?s)^");
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            '[' => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i..end])?);
                    i = end + 1;
                }
                None => out.push_str(r"\["),
            },
            _ => push_literal(&mut out, c),
        }
    }

    out.push('$');
    Some(out)
}

/// Index of the `]` closing a class whose body starts at `start`
///
/// A `]` directly after `[` or `[!` belongs to the class body.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut j = start;
    if chars.get(j) == Some(&'!') {
        j += 1;
    }
    if chars.get(j) == Some(&']') {
        j += 1;
    }
    chars[j.min(chars.len())..]
        .iter()
        .position(|&c| c == ']')
        .map(|offset| j + offset)
}

fn translate_class(body: &[char]) -> Option<String> {
    let (negated, mut rest) = match body.split_first() {
        Some((&'!', tail)) => (true, tail),
        _ => (false, body),
    };

    let mut members = String::new();
    while let Some((&first, tail)) = rest.split_first() {
        match tail {
            ['-', last, remainder @ ..] => {
                if first <= *last {
                    push_class_char(&mut members, first);
                    members.push('-');
                    push_class_char(&mut members, *last);
                }
                rest = remainder;
            }
            _ => {
                push_class_char(&mut members, first);
                rest = tail;
            }
        }
    }

    match (members.is_empty(), negated) {
        (true, true) => Some(".".to_string()),
        (true, false) => None,
        (false, true) => Some(format!("[^{members}]")),
        (false, false) => Some(format!("[{members}]")),
    }
}

fn push_literal(out: &mut String, c: char) {
    out.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
}

fn push_class_char(out: &mut String, c: char) {
    // regex-syntax accepts an escape for any ASCII punctuation.
    if c.is_ascii_punctuation() {
        out.push('\\');
    }
    out.push(c);
}
