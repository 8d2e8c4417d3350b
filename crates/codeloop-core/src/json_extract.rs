// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use serde_json::Value;

/// Extracts the largest syntactically-valid JSON object embedded in `text`.
///
/// Models routinely wrap their JSON reply in prose, markdown fences, or
/// "thinking" blocks. Rather than regex-matching (which breaks on braces
/// inside string literals), this scans every balanced `{...}` substring,
/// parses each candidate, and keeps the longest one that parses. Returns
/// `None` if nothing in `text` parses as a JSON object.
pub fn extract_largest_json_object(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    let mut best: Option<(usize, Value)> = None;

    for (start, &b) in bytes.iter().enumerate() {
        if b != b'{' {
            continue;
        }
        if let Some(end) = matching_brace_end(bytes, start) {
            let candidate = &text[start..=end];
            if let Ok(value) = serde_json::from_str::<Value>(candidate) {
                let len = candidate.len();
                if best.as_ref().map(|(best_len, _)| len > *best_len).unwrap_or(true) {
                    best = Some((len, value));
                }
            }
        }
    }

    best.map(|(_, v)| v)
}

/// Finds the index of the `}` that balances the `{` at `start`, honoring
/// string literals and escapes so braces inside quoted text don't confuse
/// the depth count.
fn matching_brace_end(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}
