//! ANSI escape extraction and stripping.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnsiCodeKind {
    Csi,
    Osc,
    Apc,
    Dcs,
    Ss3,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsiCode<'a> {
    pub code: &'a str,
    pub kind: AnsiCodeKind,
}

impl AnsiCode<'_> {
    pub fn len(&self) -> usize {
        self.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Whether this is a complete SGR (`ESC[...m`) sequence.
    pub fn is_sgr(&self) -> bool {
        self.kind == AnsiCodeKind::Csi && self.code.ends_with('m')
    }
}

/// Recognize an escape sequence starting at byte offset `pos`.
pub fn extract_ansi_code(input: &str, pos: usize) -> Option<AnsiCode<'_>> {
    let bytes = input.as_bytes();
    if pos + 1 >= bytes.len() || bytes[pos] != 0x1b {
        return None;
    }

    match bytes[pos + 1] {
        b'[' => extract_csi(input, pos),
        b']' => extract_string_terminated(input, pos, AnsiCodeKind::Osc),
        b'_' => extract_string_terminated(input, pos, AnsiCodeKind::Apc),
        b'P' => extract_string_terminated(input, pos, AnsiCodeKind::Dcs),
        b'O' => extract_ss3(input, pos),
        _ => None,
    }
}

fn extract_csi(input: &str, pos: usize) -> Option<AnsiCode<'_>> {
    let bytes = input.as_bytes();
    let end = (pos + 2..bytes.len()).find(|&idx| (0x40..=0x7e).contains(&bytes[idx]))? + 1;
    Some(AnsiCode {
        code: &input[pos..end],
        kind: AnsiCodeKind::Csi,
    })
}

fn extract_ss3(input: &str, pos: usize) -> Option<AnsiCode<'_>> {
    // The final byte may be multi-byte in malformed input; only accept ASCII finals.
    let final_byte = *input.as_bytes().get(pos + 2)?;
    if !final_byte.is_ascii() {
        return None;
    }
    Some(AnsiCode {
        code: &input[pos..pos + 3],
        kind: AnsiCodeKind::Ss3,
    })
}

fn extract_string_terminated(input: &str, pos: usize, kind: AnsiCodeKind) -> Option<AnsiCode<'_>> {
    let bytes = input.as_bytes();
    let mut idx = pos + 2;
    while idx < bytes.len() {
        if bytes[idx] == 0x07 {
            return Some(AnsiCode {
                code: &input[pos..idx + 1],
                kind,
            });
        }
        if bytes[idx] == 0x1b && bytes.get(idx + 1) == Some(&b'\\') {
            return Some(AnsiCode {
                code: &input[pos..idx + 2],
                kind,
            });
        }
        idx += 1;
    }
    None
}

/// Remove every recognized escape sequence, keeping the visible text.
pub fn strip_ansi(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut idx = 0;
    while idx < input.len() {
        if let Some(code) = extract_ansi_code(input, idx) {
            idx += code.len();
            continue;
        }
        let Some(ch) = input[idx..].chars().next() else {
            break;
        };
        out.push(ch);
        idx += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{extract_ansi_code, strip_ansi, AnsiCodeKind};

    #[test]
    fn csi_extends_to_final_byte() {
        let code = extract_ansi_code("\x1b[1;31mred", 0).expect("csi");
        assert_eq!(code.code, "\x1b[1;31m");
        assert_eq!(code.kind, AnsiCodeKind::Csi);
        assert!(code.is_sgr());
    }

    #[test]
    fn osc_accepts_bel_and_st_terminators() {
        let bel = extract_ansi_code("\x1b]8;;x\x07", 0).expect("osc");
        assert_eq!(bel.len(), 7);
        let st = extract_ansi_code("\x1b]0;t\x1b\\rest", 0).expect("osc");
        assert_eq!(st.code, "\x1b]0;t\x1b\\");
    }

    #[test]
    fn unterminated_sequences_are_not_codes() {
        assert!(extract_ansi_code("\x1b[12", 0).is_none());
        assert!(extract_ansi_code("\x1b", 0).is_none());
    }

    #[test]
    fn strip_removes_styles_and_links() {
        let input = "\x1b[1mhi\x1b[0m \x1b]8;;https://example.com\x07link\x1b]8;;\x07";
        assert_eq!(strip_ansi(input), "hi link");
    }
}
