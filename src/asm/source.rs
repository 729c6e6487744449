//! Splits raw assembly text into text-section and data-section lines.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Text,
    Data,
}

/// A non-empty, comment-free, trimmed source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// 1-based line number in the source text.
    pub number: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sections {
    pub text: Vec<SourceLine>,
    pub data: Vec<SourceLine>,
}

/// Route each line to its section. Lines before any directive belong to
/// `.text`. Text lines have their commas turned into spaces; data lines keep
/// them so string literals survive untouched.
pub fn split_sections(source: &str) -> Sections {
    let mut out = Sections::default();
    let mut section = Section::Text;

    for (i, raw) in source.lines().enumerate() {
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }
        match line {
            ".text" => {
                section = Section::Text;
                continue;
            }
            ".data" => {
                section = Section::Data;
                continue;
            }
            _ => {}
        }
        let number = i + 1;
        match section {
            Section::Text => out.text.push(SourceLine {
                number,
                text: normalize_commas(line),
            }),
            Section::Data => out.data.push(SourceLine {
                number,
                text: line.to_string(),
            }),
        }
    }
    out
}

/// Drop everything from the first `#` outside a double-quoted string.
pub fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            '#' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Replace operand commas with spaces and collapse whitespace runs.
pub fn normalize_commas(line: &str) -> String {
    line.replace(',', " ").split_whitespace().collect::<Vec<_>>().join(" ")
}
