//! Markdown-subset parser: summary text → ordered display blocks.
//!
//! Only five constructs are recognised: headings (levels 1–3), fenced code
//! blocks, blockquotes, unordered lists and paragraphs. Anything else reads
//! as paragraph text. The scan is a single top-to-bottom pass over the lines
//! of the input; blocks never nest.
//!
//! Two boundaries are deliberate and covered by tests:
//!
//! - bullets need the exact two-character prefix `"* "` or `"- "`, so `-item`
//!   and a lone `-` are paragraph text;
//! - an unterminated fence swallows the rest of the document as code.

use serde::{Deserialize, Serialize};

const FENCE: &str = "```";

/// One parsed unit of the summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// `#`, `##` or `###` heading.
    Heading { level: u8, text: String },
    /// Lines between fences, joined with `\n`.
    CodeBlock { code: String },
    /// Consecutive `> ` lines with the prefix stripped, joined with `\n`.
    Quote { text: String },
    /// Consecutive `* ` / `- ` lines, one item per line.
    List { items: Vec<String> },
    /// Consecutive plain lines joined with a single space.
    Paragraph { text: String },
}

/// Parse summary text into display blocks.
///
/// Pure and deterministic: the same input always yields the same blocks.
///
/// ```rust
/// use edgequake_docsum::markdown::{parse_blocks, Block};
///
/// let blocks = parse_blocks("# Title\n\nbody text");
/// assert_eq!(
///     blocks,
///     vec![
///         Block::Heading { level: 1, text: "Title".into() },
///         Block::Paragraph { text: "body text".into() },
///     ]
/// );
/// ```
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.trim().is_empty() {
            i += 1;
            continue;
        }

        if let Some((level, rest)) = heading(line) {
            blocks.push(Block::Heading {
                level,
                text: rest.to_string(),
            });
            i += 1;
            continue;
        }

        if is_fence(line) {
            i += 1;
            let start = i;
            while i < lines.len() && !is_fence(lines[i]) {
                i += 1;
            }
            blocks.push(Block::CodeBlock {
                code: lines[start..i].join("\n"),
            });
            // Closing fence; past the end when unterminated.
            i += 1;
            continue;
        }

        if line.starts_with("> ") {
            let mut quote = Vec::new();
            while i < lines.len() {
                match lines[i].strip_prefix("> ") {
                    Some(rest) => quote.push(rest),
                    None => break,
                }
                i += 1;
            }
            blocks.push(Block::Quote {
                text: quote.join("\n"),
            });
            continue;
        }

        if bullet(line).is_some() {
            let mut items = Vec::new();
            while i < lines.len() {
                match bullet(lines[i]) {
                    Some(item) => items.push(item.to_string()),
                    None => break,
                }
                i += 1;
            }
            blocks.push(Block::List { items });
            continue;
        }

        // Paragraph. The lead line matched no rule above, so it is always
        // taken; only continuation lines stop at block markers.
        let mut paragraph = vec![line];
        i += 1;
        while i < lines.len() && !lines[i].trim().is_empty() && !interrupts_paragraph(lines[i]) {
            paragraph.push(lines[i]);
            i += 1;
        }
        blocks.push(Block::Paragraph {
            text: paragraph.join(" "),
        });
    }

    blocks
}

fn heading(line: &str) -> Option<(u8, &str)> {
    if let Some(rest) = line.strip_prefix("# ") {
        Some((1, rest))
    } else if let Some(rest) = line.strip_prefix("## ") {
        Some((2, rest))
    } else {
        line.strip_prefix("### ").map(|rest| (3, rest))
    }
}

fn is_fence(line: &str) -> bool {
    line.trim().starts_with(FENCE)
}

fn bullet(line: &str) -> Option<&str> {
    line.strip_prefix("* ").or_else(|| line.strip_prefix("- "))
}

fn interrupts_paragraph(line: &str) -> bool {
    line.starts_with('#') || is_fence(line) || line.starts_with('>') || bullet(line).is_some()
}
