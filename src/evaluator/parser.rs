// src/evaluator/parser.rs - Parse LLM replies into scores and commentary sections

/// Extract the first number in a reply such as "72", "Score: 0.85" or "**64.5**".
pub fn parse_score_reply(reply: &str) -> Option<f64> {
    let bytes = reply.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        let starts_number = c.is_ascii_digit()
            || (c == b'.' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit))
            || (c == b'-' && bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit() || *b == b'.'));
        if starts_number {
            let start = i;
            i += 1;
            let mut seen_dot = c == b'.';
            while i < bytes.len() {
                match bytes[i] {
                    b'0'..=b'9' => i += 1,
                    b'.' if !seen_dot && bytes.get(i + 1).is_some_and(u8::is_ascii_digit) => {
                        seen_dot = true;
                        i += 1;
                    }
                    _ => break,
                }
            }
            return reply[start..i].parse().ok();
        }
        i += 1;
    }
    None
}

/// Commentary split into its two reader-facing parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commentary {
    pub assessment: String,
    pub advice: String,
}

const ASSESSMENT_HEADINGS: &[&str] = &["ESG ASSESSMENT", "【ESG评价】"];
const ADVICE_HEADINGS: &[&str] = &["INVESTMENT ADVICE", "【投资建议】"];

enum Section {
    None,
    Assessment,
    Advice,
}

/// Split a reply on its "ESG assessment" / "Investment advice" headings.
/// A reply without headings is treated as pure assessment.
pub fn parse_commentary(reply: &str) -> Commentary {
    let mut assessment = Vec::new();
    let mut advice = Vec::new();
    let mut section = Section::None;

    for line in reply.lines() {
        let trimmed = line.trim().trim_start_matches('#').trim();
        if let Some(rest) = strip_heading(trimmed, ASSESSMENT_HEADINGS) {
            section = Section::Assessment;
            if !rest.is_empty() {
                assessment.push(rest);
            }
            continue;
        }
        if let Some(rest) = strip_heading(trimmed, ADVICE_HEADINGS) {
            section = Section::Advice;
            if !rest.is_empty() {
                advice.push(rest);
            }
            continue;
        }
        match section {
            Section::Advice => advice.push(trimmed),
            Section::None | Section::Assessment => assessment.push(trimmed),
        }
    }

    Commentary {
        assessment: join_lines(&assessment),
        advice: join_lines(&advice),
    }
}

fn strip_heading<'a>(line: &'a str, headings: &[&str]) -> Option<&'a str> {
    let upper = line.to_uppercase();
    let stripped = line.trim_start_matches('*');
    let upper_stripped = upper.trim_start_matches('*');
    for heading in headings {
        if upper_stripped.starts_with(heading) {
            let rest = stripped.get(heading.len()..).unwrap_or_default();
            return Some(rest.trim_start_matches(['*', ':', '：']).trim());
        }
    }
    None
}

fn join_lines(lines: &[&str]) -> String {
    lines
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
