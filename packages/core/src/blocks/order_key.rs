//! Fractional order keys
//!
//! An `OrderKey` is a base-62 digit string read as a fraction in `(0, 1)`.
//! Keys compare lexicographically, and a fresh key can always be generated
//! strictly between any two distinct keys, so inserting never requires
//! renumbering existing rows or columns.

use serde::{Deserialize, Serialize};
use std::fmt;

const DIGITS: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const BASE: usize = 62;

fn digit_value(c: u8) -> usize {
    match c {
        b'0'..=b'9' => (c - b'0') as usize,
        b'A'..=b'Z' => (c - b'A') as usize + 10,
        b'a'..=b'z' => (c - b'a') as usize + 36,
        _ => 0,
    }
}

/// Opaque, comparable ordering key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderKey(String);

impl OrderKey {
    /// Accept a key read back from a snapshot
    ///
    /// Returns `None` for empty strings, characters outside the base-62
    /// alphabet, or a trailing zero digit (which would leave no room below it).
    pub fn parse(value: &str) -> Option<Self> {
        let valid = !value.is_empty()
            && value.bytes().all(|c| c.is_ascii_alphanumeric())
            && !value.ends_with('0');
        valid.then(|| OrderKey(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Calculate a key for inserting between `prev` and `next`
    ///
    /// # Examples
    /// ```
    /// use blockdoc_core::blocks::OrderKey;
    ///
    /// let first = OrderKey::between(None, None);
    /// let after = OrderKey::between(Some(&first), None);
    /// let middle = OrderKey::between(Some(&first), Some(&after));
    /// assert!(first < middle && middle < after);
    /// ```
    ///
    /// Bounds given in the wrong order are treated as "after `prev`".
    pub fn between(prev: Option<&OrderKey>, next: Option<&OrderKey>) -> OrderKey {
        let lower = prev.map(|k| k.0.as_bytes()).unwrap_or_default();
        let upper = match (prev, next) {
            (Some(p), Some(n)) if p >= n => None,
            (_, n) => n.map(|k| k.0.as_bytes()),
        };
        let digits = midpoint(lower, upper);
        // midpoint only emits bytes from DIGITS
        OrderKey(digits.into_iter().map(char::from).collect())
    }

    /// `count` strictly increasing keys, suitable for seeding a fresh grid
    pub fn sequence(count: usize) -> Vec<OrderKey> {
        let mut keys: Vec<OrderKey> = Vec::with_capacity(count);
        for _ in 0..count {
            let key = OrderKey::between(keys.last(), None);
            keys.push(key);
        }
        keys
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Digits strictly between fractions `a` and `b` (`None` means 1.0)
fn midpoint(a: &[u8], b: Option<&[u8]>) -> Vec<u8> {
    if let Some(b) = b {
        let mut n = 0;
        while n < b.len() && a.get(n).copied().unwrap_or(b'0') == b[n] {
            n += 1;
        }
        if n > 0 {
            let mut out = b[..n].to_vec();
            let rest_a = a.get(n..).unwrap_or_default();
            out.extend(midpoint(rest_a, Some(&b[n..])));
            return out;
        }
    }

    let digit_a = a.first().map(|c| digit_value(*c)).unwrap_or(0);
    let digit_b = b
        .and_then(|b| b.first())
        .map(|c| digit_value(*c))
        .unwrap_or(BASE);

    if digit_b.saturating_sub(digit_a) > 1 {
        return vec![DIGITS[(digit_a + digit_b) / 2]];
    }

    match b {
        Some(b) if b.len() > 1 => vec![b[0]],
        _ => {
            let mut out = vec![DIGITS[digit_a]];
            out.extend(midpoint(a.get(1..).unwrap_or_default(), None));
            out
        }
    }
}
