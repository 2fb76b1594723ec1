/// High-score board and its share-URL encoding.
///
/// The board travels in the `s` query parameter of a URL. The value is
/// encoded twice, the way a browser page does it with
/// `URLSearchParams.set("s", encodeURIComponent(JSON.stringify(top)))`:
///
///   JSON text  ->  component-encode  ->  form-encode  ->  `?s=...`
///
/// Loading reverses the chain. The lenient loaders never fail: anything
/// malformed yields an empty board, and individual entries without a
/// string `name` or a positive `score` are dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Query parameter that carries the board.
pub const SCORE_PARAM: &str = "s";
pub const DEFAULT_CAPACITY: usize = 3;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Bytes `encodeURIComponent` leaves alone besides ASCII alphanumerics.
const COMPONENT_SAFE: &[u8] = b"-_.!~*'()";
/// Bytes form encoding leaves alone besides ASCII alphanumerics.
const FORM_SAFE: &[u8] = b"*-._";

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("malformed percent escape at byte {0}")]
    BadEscape(usize),
    #[error("decoded text is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("score list is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("score list is not a JSON array")]
    NotArray,
    #[error("query has no `{0}` parameter")]
    MissingParam(&'static str),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub name: String,
    pub score: u32,
}

impl Score {
    pub fn new(name: impl Into<String>, score: u32) -> Self {
        Score { name: name.into(), score }
    }
}

// ══════════════════════════════════════════════════════════════
// Percent encoding
// ══════════════════════════════════════════════════════════════

/// `encodeURIComponent`: every byte outside the unreserved set becomes `%XX`.
pub fn encode_component(s: &str) -> String {
    percent_encode(s, COMPONENT_SAFE, false)
}

/// Strict inverse of `encode_component`.
pub fn decode_component(s: &str) -> Result<String, ScoreError> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = bytes
                .get(i + 1..i + 3)
                .and_then(hex_pair)
                .ok_or(ScoreError::BadEscape(i))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(String::from_utf8(out)?)
}

/// `application/x-www-form-urlencoded` value encoding (space -> `+`).
pub fn form_encode(s: &str) -> String {
    percent_encode(s, FORM_SAFE, true)
}

/// Lenient form decoding: `+` is a space, bad escapes pass through as-is,
/// invalid UTF-8 is replaced.
pub fn form_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => match bytes.get(i + 1..i + 3).and_then(hex_pair) {
                Some(byte) => {
                    out.push(byte);
                    i += 3;
                }
                None => {
                    out.push(b'%');
                    i += 1;
                }
            },
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn percent_encode(s: &str, safe: &[u8], space_as_plus: bool) -> String {
    let mut out = String::with_capacity(s.len() * 3);
    for &b in s.as_bytes() {
        if b.is_ascii_alphanumeric() || safe.contains(&b) {
            out.push(b as char);
        } else if space_as_plus && b == b' ' {
            out.push('+');
        } else {
            out.push('%');
            out.push(HEX[(b >> 4) as usize] as char);
            out.push(HEX[(b & 0x0F) as usize] as char);
        }
    }
    out
}

fn hex_pair(pair: &[u8]) -> Option<u8> {
    let hi = (pair[0] as char).to_digit(16)?;
    let lo = (pair[1] as char).to_digit(16)?;
    Some((hi * 16 + lo) as u8)
}

// ══════════════════════════════════════════════════════════════
// URL / query helpers
// ══════════════════════════════════════════════════════════════

/// First value of `key` in a query string (leading `?` optional), form-decoded.
pub fn query_param(query: &str, key: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .find_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (form_decode(k) == key).then(|| form_decode(v))
        })
}

/// Split a URL into (everything before `?`, query without `?`, fragment with `#`).
fn split_url(url: &str) -> (&str, &str, &str) {
    let (rest, fragment) = match url.find('#') {
        Some(i) => (&url[..i], &url[i..]),
        None => (url, ""),
    };
    match rest.find('?') {
        Some(i) => (&rest[..i], &rest[i + 1..], fragment),
        None => (rest, "", fragment),
    }
}

// ══════════════════════════════════════════════════════════════
// ScoreBoard
// ══════════════════════════════════════════════════════════════

/// Top-N scores, highest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoreBoard {
    entries: Vec<Score>,
    capacity: usize,
}

impl Default for ScoreBoard {
    fn default() -> Self {
        ScoreBoard::new(DEFAULT_CAPACITY)
    }
}

impl ScoreBoard {
    pub fn new(capacity: usize) -> Self {
        ScoreBoard { entries: Vec::new(), capacity: capacity.max(1) }
    }

    pub fn entries(&self) -> &[Score] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn best(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    /// Would `score` earn a place on the board?
    pub fn qualifies(&self, score: u32) -> bool {
        if score == 0 {
            return false;
        }
        self.entries.len() < self.capacity
            || self.entries.last().map_or(true, |last| score > last.score)
    }

    /// Insert in rank order. Ties keep the older entry ahead.
    /// Returns the 0-based rank, or `None` if the entry did not make the cut.
    pub fn add(&mut self, entry: Score) -> Option<usize> {
        let rank = self
            .entries
            .iter()
            .position(|e| e.score < entry.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(rank, entry);
        self.entries.truncate(self.capacity);
        (rank < self.capacity).then_some(rank)
    }

    /// Fold another board in, skipping entries already present.
    pub fn merge(&mut self, other: &ScoreBoard) {
        for entry in other.entries() {
            if !self.entries.contains(entry) {
                self.add(entry.clone());
            }
        }
    }

    // ── Encoding ──

    pub fn to_json(&self) -> Result<String, ScoreError> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// `s=<double-encoded JSON>`, without the leading `?`.
    pub fn to_query(&self) -> Result<String, ScoreError> {
        let json = self.to_json()?;
        Ok(format!("{}={}", SCORE_PARAM, form_encode(&encode_component(&json))))
    }

    /// Replace the query of `base` with the board, keeping any fragment.
    pub fn to_url(&self, base: &str) -> Result<String, ScoreError> {
        let (head, _, fragment) = split_url(base);
        Ok(format!("{}?{}{}", head, self.to_query()?, fragment))
    }

    // ── Decoding ──

    /// Parse a JSON score list, dropping entries that are not well formed.
    pub fn try_from_json(json: &str, capacity: usize) -> Result<Self, ScoreError> {
        let value: Value = serde_json::from_str(json)?;
        let items = value.as_array().ok_or(ScoreError::NotArray)?;
        let mut board = ScoreBoard::new(capacity);
        for entry in items.iter().filter_map(score_from_value) {
            board.add(entry);
        }
        Ok(board)
    }

    pub fn try_from_query(query: &str, capacity: usize) -> Result<Self, ScoreError> {
        let raw = query_param(query, SCORE_PARAM).ok_or(ScoreError::MissingParam(SCORE_PARAM))?;
        let json = decode_component(&raw)?;
        Self::try_from_json(&json, capacity)
    }

    pub fn from_query(query: &str, capacity: usize) -> Self {
        Self::try_from_query(query, capacity).unwrap_or_else(|e| {
            debug!(error = %e, "ignoring score query");
            ScoreBoard::new(capacity)
        })
    }

    /// Accepts a full share URL or a bare query string.
    pub fn try_from_url(url: &str, capacity: usize) -> Result<Self, ScoreError> {
        let url = url.trim();
        let query = if url.contains('?') { split_url(url).1 } else { url };
        Self::try_from_query(query, capacity)
    }

    pub fn from_url(url: &str, capacity: usize) -> Self {
        let (_, query, _) = split_url(url.trim());
        Self::from_query(query, capacity)
    }
}

fn score_from_value(v: &Value) -> Option<Score> {
    let name = v.get("name")?.as_str()?;
    let raw = v.get("score")?;
    let score = match raw.as_u64() {
        Some(n) => n,
        None => raw
            .as_f64()
            .filter(|f| f.is_finite() && *f > 0.0)
            .map(|f| (f as u64).max(1))?,
    };
    (score > 0).then(|| Score::new(name, score.min(u32::MAX as u64) as u32))
}
