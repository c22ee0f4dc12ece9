//! Codec for the remote store's minute-encoded stat fields.
//!
//! A field like `"2 (15', 38')"` packs an occurrence count and the
//! minutes at which each occurrence happened. A bare integer (`"5"`)
//! is the legacy form: count known, minutes unknown. Every decode and
//! re-encode of these strings goes through here; nothing else in the
//! crate parses them.

/// Decoded form of a minute-encoded field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MinuteField {
    pub count: u32,
    pub minutes: Vec<u32>,
}

impl MinuteField {
    pub fn new(count: u32, minutes: Vec<u32>) -> MinuteField {
        MinuteField { count, minutes }
    }
}

/// Decode never fails: absent, empty or unparseable input yields a
/// zero count. Malformed input degrades to whatever leading integer
/// can be salvaged, mirroring how the store's other clients read it.
pub fn decode(field: Option<&str>) -> MinuteField {
    let s = match field {
        Some(s) => s.trim(),
        None => return MinuteField::default(),
    };
    if s.is_empty() {
        return MinuteField::default();
    }

    if let Some((head, tail)) = s.split_once('(') {
        let count = leading_int(head.trim());
        let minutes = match tail.rsplit_once(')') {
            Some((inner, _)) => inner
                .split(',')
                .filter_map(|m| m.trim().trim_end_matches('\'').parse::<u32>().ok())
                .collect(),
            // unbalanced parenthesis, keep the count only
            None => Vec::new(),
        };
        MinuteField { count, minutes }
    } else {
        MinuteField { count: leading_int(s), minutes: Vec::new() }
    }
}

/// Inverse of [decode]. The caller is responsible for keeping
/// `count == minutes.len()` when minutes are present; the two are
/// encoded independently.
pub fn encode(count: u32, minutes: &[u32]) -> String {
    if minutes.is_empty() {
        count.to_string()
    } else {
        let joined = minutes.iter().map(u32::to_string).collect::<Vec<String>>().join("', ");
        format!("{count} ({joined}')")
    }
}

/// The single increment operation used by every merge-path stat bump:
/// decode, append the new minute, re-encode with count + 1.
pub fn reconcile_append(existing: Option<&str>, minute: u32) -> String {
    let mut field = decode(existing);
    field.minutes.push(minute);
    encode(field.count + 1, &field.minutes)
}

/// Decrement used by goal deletion. Lowers the count (floored at
/// zero) but keeps the minute markers, so a decremented field can
/// disagree with its own minute list, matching what the remote store
/// already contains for past deletions.
pub fn reconcile_decrement(existing: Option<&str>) -> String {
    let field = decode(existing);
    encode(field.count.saturating_sub(1), &field.minutes)
}

fn leading_int(s: &str) -> u32 {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}
