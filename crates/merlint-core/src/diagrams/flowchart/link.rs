use super::ast::{ArrowHead, Stroke};
use crate::utils::{find_unquoted, is_ident_char, strip_quotes};

/// A connector scanned from the text following a node reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct LinkToken {
    pub arrow: String,
    pub stroke: Stroke,
    pub start: Option<ArrowHead>,
    pub end: Option<ArrowHead>,
    pub label: Option<String>,
}

fn is_body_byte(b: Option<&u8>) -> bool {
    matches!(b, Some(b'-' | b'=' | b'.' | b'~'))
}

fn start_head(bytes: &[u8]) -> Option<ArrowHead> {
    match bytes.first() {
        Some(b'<') => Some(ArrowHead::Point),
        Some(b'x') if is_body_byte(bytes.get(1)) => Some(ArrowHead::Cross),
        Some(b'o') if is_body_byte(bytes.get(1)) => Some(ArrowHead::Circle),
        _ => None,
    }
}

/// `x` and `o` only count as heads when they do not run into a following identifier.
fn end_head(rest: &str) -> Option<ArrowHead> {
    let mut chars = rest.chars();
    let head = match chars.next()? {
        '>' => return Some(ArrowHead::Point),
        'x' => ArrowHead::Cross,
        'o' => ArrowHead::Circle,
        _ => return None,
    };
    match chars.next() {
        Some(ch) if is_ident_char(ch) => None,
        _ => Some(head),
    }
}

fn classify_stroke(body: &str) -> Option<Stroke> {
    if body.len() < 2 {
        return None;
    }
    if body.bytes().all(|b| b == b'~') {
        return (body.len() >= 3).then_some(Stroke::Invisible);
    }
    if body.bytes().all(|b| b == b'=') {
        return Some(Stroke::Thick);
    }
    if body.bytes().all(|b| b == b'-') {
        return Some(Stroke::Normal);
    }
    let inner = body.strip_prefix('-')?;
    let inner = inner.strip_suffix('-').unwrap_or(inner);
    (!inner.is_empty() && inner.bytes().all(|b| b == b'.')).then_some(Stroke::Dotted)
}

/// Finds the closing half of a text-form link (`A -- text --> B`). Returns the byte range of the
/// closing token.
fn find_text_close(s: &str, from: usize, stroke: Stroke) -> Option<(usize, usize)> {
    let bytes = s.as_bytes();
    let (mut at, body) = match stroke {
        Stroke::Normal => (find_unquoted(s, from, "--")?, b'-'),
        Stroke::Thick => (find_unquoted(s, from, "==")?, b'='),
        Stroke::Dotted => {
            let mut at = find_unquoted(s, from, ".-")?;
            while at > from && bytes[at - 1] == b'.' {
                at -= 1;
            }
            (at, b'-')
        }
        Stroke::Invisible => return None,
    };
    let start = at;
    while at < bytes.len() && (bytes[at] == body || (stroke == Stroke::Dotted && bytes[at] == b'.'))
    {
        at += 1;
    }
    if end_head(&s[at..]).is_some() {
        at += 1;
    }
    Some((start, at))
}

/// Scans one link token at the start of `s`, including a trailing `|label|`.
///
/// Returns the token and the number of bytes consumed, or a message describing why the text is
/// not a well-formed link.
pub(super) fn scan_link(s: &str) -> Result<(LinkToken, usize), String> {
    let bytes = s.as_bytes();
    let start = start_head(bytes);
    let body_start = usize::from(start.is_some());
    let mut idx = body_start;
    while is_body_byte(bytes.get(idx)) {
        idx += 1;
    }
    let body = &s[body_start..idx];
    let Some(stroke) = classify_stroke(body) else {
        let token = if idx == 0 {
            s.split_whitespace().next().unwrap_or_default()
        } else {
            &s[..idx]
        };
        return Err(format!("unrecognized link `{token}`"));
    };

    let mut end = end_head(&s[idx..]);
    if end.is_some() {
        idx += 1;
    }

    let mut text_label = None;
    let arrow = if end.is_none() && matches!(body, "--" | "==" | "-.") {
        let Some((close_start, close_end)) = find_text_close(s, idx, stroke) else {
            return Err(format!("link `{}` is missing its closing arrow", &s[..idx]));
        };
        let text = s[idx..close_start].trim();
        if text.is_empty() {
            return Err("link text must not be empty".to_string());
        }
        text_label = Some(strip_quotes(text).to_string());
        let close = &s[close_start..close_end];
        end = end_head(&close[close.len() - 1..]);
        idx = close_end;

        let mut arrow = s[..body_start].to_string();
        if stroke == Stroke::Dotted {
            arrow.push('-');
        }
        arrow.push_str(close);
        arrow
    } else {
        s[..idx].to_string()
    };

    let mut label = text_label;
    let after = &s[idx..];
    let trimmed = after.trim_start();
    if let Some(inner) = trimmed.strip_prefix('|') {
        let Some(close) = find_unquoted(inner, 0, "|") else {
            return Err("unclosed link label".to_string());
        };
        label = Some(strip_quotes(&inner[..close]).to_string());
        idx += (after.len() - trimmed.len()) + 1 + close + 1;
    }

    Ok((
        LinkToken {
            arrow,
            stroke,
            start,
            end,
            label,
        },
        idx,
    ))
}
