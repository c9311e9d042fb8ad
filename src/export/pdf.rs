//! Minimal paginated PDF 1.4 writer
//!
//! Text only: Helvetica for body lines, Helvetica-Bold for section headings,
//! WinAnsi encoding, fixed-width word wrap and automatic page breaks.

use crate::planner::PlanResult;

const PAGE_WIDTH: f32 = 595.0;
const PAGE_HEIGHT: f32 = 842.0;
const MARGIN: f32 = 50.0;
const FONT_SIZE: f32 = 12.0;
const LEADING: f32 = 14.0;

/// Helvetica averages about half an em per glyph
pub const WRAP_COLUMNS: usize = ((PAGE_WIDTH - 2.0 * MARGIN) / (FONT_SIZE * 0.5)) as usize - 2;
pub const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2.0 * MARGIN) / LEADING) as usize;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    text: String,
    bold: bool,
}

impl Line {
    fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    fn heading(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

/// Render every role section of a plan into PDF bytes
pub fn render_plan(result: &PlanResult) -> Vec<u8> {
    let mut lines = Vec::new();
    for (role, text) in result.iter() {
        lines.push(Line::heading(role));
        for raw in text.lines() {
            if raw.trim().is_empty() {
                lines.push(Line::body(""));
            } else {
                lines.extend(wrap(raw.trim_end(), WRAP_COLUMNS).into_iter().map(Line::body));
            }
        }
        lines.push(Line::body(""));
    }

    let pages: Vec<&[Line]> = if lines.is_empty() {
        vec![&lines[..]]
    } else {
        lines.chunks(LINES_PER_PAGE).collect()
    };
    write_document(&pages)
}

/// Greedy word wrap; words longer than a line are split
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if current_len > 0 && current_len + 1 + word_len > width {
            out.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if word_len > width {
            let chars: Vec<char> = word.chars().collect();
            for chunk in chars.chunks(width) {
                if current_len > 0 {
                    out.push(std::mem::take(&mut current));
                }
                current = chunk.iter().collect();
                current_len = chunk.len();
            }
            continue;
        }

        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if current_len > 0 {
        out.push(current);
    }
    out
}

/// Encode text as a PDF literal string body in WinAnsiEncoding
fn encode_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\t' => out.push_str("    "),
            _ => match win_ansi(c) {
                Some(code) => out.push_str(&format!("\\{:03o}", code)),
                None => out.push('?'),
            },
        }
    }
    out
}

fn win_ansi(c: char) -> Option<u8> {
    match c {
        '€' => Some(0x80),
        '‘' => Some(0x91),
        '’' => Some(0x92),
        '“' => Some(0x93),
        '”' => Some(0x94),
        '•' => Some(0x95),
        '–' => Some(0x96),
        '—' => Some(0x97),
        '\u{a0}'..='\u{ff}' => Some(c as u8),
        _ => None,
    }
}

fn content_stream(lines: &[Line]) -> String {
    let top = PAGE_HEIGHT - MARGIN - FONT_SIZE;
    let mut stream = format!("BT\n{} TL\n{} {} Td\n", LEADING, MARGIN, top);
    for line in lines {
        let font = if line.bold { "F2" } else { "F1" };
        stream.push_str(&format!(
            "/{} {} Tf\n({}) Tj\nT*\n",
            font,
            FONT_SIZE,
            encode_text(&line.text)
        ));
    }
    stream.push_str("ET\n");
    stream
}

fn write_document(pages: &[&[Line]]) -> Vec<u8> {
    // 1 catalog, 2 page tree, 3-4 fonts, then a (page, content) pair per page
    let page_id = |i: usize| 5 + 2 * i;
    let kids = (0..pages.len())
        .map(|i| format!("{} 0 R", page_id(i)))
        .collect::<Vec<_>>()
        .join(" ");

    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!("<< /Type /Pages /Kids [{}] /Count {} >>", kids, pages.len()),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>".to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>".to_string(),
    ];
    for (i, lines) in pages.iter().enumerate() {
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
            PAGE_WIDTH,
            PAGE_HEIGHT,
            page_id(i) + 1
        ));
        let stream = content_stream(lines);
        objects.push(format!("<< /Length {} >>\nstream\n{}endstream", stream.len(), stream));
    }

    let mut out: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
    }

    let xref_offset = out.len();
    out.extend_from_slice(format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1).as_bytes());
    for offset in offsets {
        out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    out.extend_from_slice(
        format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
            objects.len() + 1,
            xref_offset
        )
        .as_bytes(),
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(entries: &[(&str, &str)]) -> PlanResult {
        entries.iter().map(|(r, t)| (r.to_string(), t.to_string())).collect()
    }

    fn as_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).to_string()
    }

    #[test]
    fn test_document_frame() {
        let bytes = render_plan(&plan(&[("Flight Specialist", "Take the morning flight")]));
        let text = as_text(&bytes);

        assert!(bytes.starts_with(b"%PDF-1.4\n"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("/Count 1"));
        assert!(text.contains("(Flight Specialist) Tj"));
        assert!(text.contains("(Take the morning flight) Tj"));
    }

    #[test]
    fn test_xref_offsets_point_at_objects() {
        let bytes = render_plan(&plan(&[("A", "b")]));
        let text = as_text(&bytes);

        let startxref: usize = text
            .rsplit("startxref\n")
            .next()
            .and_then(|s| s.lines().next())
            .and_then(|s| s.parse().ok())
            .unwrap();
        assert!(bytes[startxref..].starts_with(b"xref\n"));

        let xref = as_text(&bytes[startxref..]);
        let first_entry = xref.lines().nth(3).unwrap();
        let offset: usize = first_entry[..10].parse().unwrap();
        assert!(bytes[offset..].starts_with(b"1 0 obj"));
    }

    #[test]
    fn test_long_plan_paginates() {
        let long = (0..LINES_PER_PAGE * 2).map(|i| format!("Day {}", i)).collect::<Vec<_>>().join("\n");
        let text = as_text(&render_plan(&plan(&[("Activity Planner", &long)])));

        assert!(text.contains("/Count 3"));
    }

    #[test]
    fn test_empty_plan_still_has_a_page() {
        let text = as_text(&render_plan(&PlanResult::default()));
        assert!(text.contains("/Count 1"));
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("aa bb cc", 5), ["aa bb", "cc"]);
        assert_eq!(wrap("abcdefgh", 3), ["abc", "def", "gh"]);
        assert_eq!(wrap("x abcdefgh y", 3), ["x", "abc", "def", "gh", "y"]);
        assert!(wrap("   ", 10).is_empty());
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text("a (b) \\c"), "a \\(b\\) \\\\c");
        assert_eq!(encode_text("café – €5"), "caf\\351 \\226 \\2005");
        assert_eq!(encode_text("❌ Error"), "? Error");
    }
}
