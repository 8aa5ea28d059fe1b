use crate::Position;

/// One physical source line with surrounding whitespace removed.
///
/// `column` is the 1-based column of the first character of `text` in the original line, so
/// positions computed from offsets into `text` stay faithful to the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Line<'a> {
    pub number: usize,
    pub column: usize,
    pub text: &'a str,
}

impl<'a> Line<'a> {
    pub fn pos(&self) -> Position {
        Position::new(self.number, self.column)
    }

    /// Position of the byte offset `offset` inside `text`.
    pub fn pos_at(&self, offset: usize) -> Position {
        let offset = offset.min(self.text.len());
        Position::new(
            self.number,
            self.column + self.text[..offset].chars().count(),
        )
    }

    /// A trimmed sub-line covering `text[start..end]`.
    pub fn slice(&self, start: usize, end: usize) -> Line<'a> {
        let raw = &self.text[start..end];
        let trimmed = raw.trim_start();
        let lead = start + (raw.len() - trimmed.len());
        Line {
            number: self.number,
            column: self.pos_at(lead).column,
            text: trimmed.trim_end(),
        }
    }

    /// Everything after byte offset `start`, trimmed.
    pub fn tail(&self, start: usize) -> Line<'a> {
        self.slice(start, self.text.len())
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_comment(&self) -> bool {
        self.text.starts_with("%%")
    }

    /// Splits off the first whitespace-delimited word. The rest keeps its own column.
    pub fn first_word(&self) -> (&'a str, Line<'a>) {
        let end = self
            .text
            .find(char::is_whitespace)
            .unwrap_or(self.text.len());
        (&self.text[..end], self.tail(end))
    }
}

pub(crate) fn source_lines(source: &str) -> impl Iterator<Item = Line<'_>> {
    source.lines().enumerate().map(|(idx, raw)| {
        let trimmed = raw.trim_start();
        let indent = raw[..raw.len() - trimmed.len()].chars().count();
        Line {
            number: idx + 1,
            column: indent + 1,
            text: trimmed.trim_end(),
        }
    })
}

pub(crate) fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Byte length of the flowchart node id at the start of `s`: letters, digits and `_`, joined by
/// single `-` characters (`node-1`). A `-` followed by anything else starts a link.
pub(crate) fn node_id_len(s: &str) -> usize {
    let mut end = 0usize;
    let mut chars = s.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        let joins = ch == '-'
            && end > 0
            && chars.peek().is_some_and(|&(_, next)| is_ident_char(next));
        if !(is_ident_char(ch) || joins) {
            break;
        }
        end = idx + ch.len_utf8();
    }
    end
}

/// Byte length of a state or class style identifier, which additionally allows `-` and `.`.
pub(crate) fn name_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut end = 0usize;
    for (idx, ch) in s.char_indices() {
        let arrow_ahead = matches!(ch, '-' | '.') && bytes.get(idx + 1) == Some(&(ch as u8));
        if arrow_ahead || !(is_ident_char(ch) || ch == '-' || ch == '.') {
            break;
        }
        end = idx + ch.len_utf8();
    }
    end
}

/// Removes one pair of wrapping double quotes.
pub(crate) fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Finds `delim` at or after `start`, skipping over double-quoted spans.
pub(crate) fn find_unquoted(input: &str, start: usize, delim: &str) -> Option<usize> {
    let bytes = input.as_bytes();
    let delim_bytes = delim.as_bytes();
    let mut pos = start;

    while pos + delim_bytes.len() <= bytes.len() {
        if bytes[pos..pos + delim_bytes.len()] == *delim_bytes {
            return Some(pos);
        }
        if bytes[pos] == b'"' {
            pos += 1;
            while pos < bytes.len() && bytes[pos] != b'"' {
                pos += 1;
            }
        }
        pos += 1;
    }

    None
}

/// Byte ranges of the `;`-separated statements of a line, ignoring `;` inside quotes.
pub(crate) fn split_statements(text: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = 0usize;
    while let Some(idx) = find_unquoted(text, start, ";") {
        out.push((start, idx));
        start = idx + 1;
    }
    out.push((start, text.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lines_keep_their_columns() {
        let lines: Vec<_> = source_lines("graph LR\n    A --> B\n\n\tC").collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1].pos(), Position::new(2, 5));
        assert_eq!(lines[1].text, "A --> B");
        assert!(lines[2].is_blank());
        assert_eq!(lines[3].pos(), Position::new(4, 2));
        assert_eq!(lines[1].pos_at(6), Position::new(2, 11));
    }

    #[test]
    fn first_word_splits_keyword_from_rest() {
        let line = source_lines("  subgraph   One Two").next().unwrap();
        let (word, rest) = line.first_word();
        assert_eq!(word, "subgraph");
        assert_eq!(rest.text, "One Two");
        assert_eq!(rest.column, 14);
    }

    #[test]
    fn statements_split_outside_quotes() {
        assert_eq!(split_statements("A;B"), vec![(0, 1), (2, 3)]);
        assert_eq!(split_statements(r#"A["x;y"];B"#), vec![(0, 8), (9, 10)]);
        assert_eq!(find_unquoted(r#""|" |"#, 0, "|"), Some(4));
    }

    #[test]
    fn identifier_scanning() {
        assert_eq!(node_id_len("node_1-->B"), 6);
        assert_eq!(node_id_len("node-1 --> node-2"), 6);
        assert_eq!(node_id_len("a-b-c-.->d"), 5);
        assert_eq!(node_id_len("A-x"), 3);
        assert_eq!(node_id_len("A->B"), 1);
        assert_eq!(node_id_len("-A"), 0);
        assert_eq!(node_id_len("Ünïcode rest"), "Ünïcode".len());
        assert_eq!(name_len("Some.State-1 --> X"), 12);
        assert_eq!(name_len("A-->B"), 1);
        assert_eq!(name_len("A..B"), 1);
        assert_eq!(strip_quotes("\"quoted\""), "quoted");
        assert_eq!(strip_quotes("\""), "\"");
    }
}
