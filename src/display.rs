//! Terminal presentation of display blocks.
//!
//! Parsing lives in [`crate::markdown`]; this module only decides how each
//! block looks. Two modes are supported: ANSI-styled output for a terminal
//! and plain text for pipes, files or `--no-color`.

use crate::markdown::Block;

// ── ANSI helpers ────────────────────────────────────────────────────────────

fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn italic(s: &str) -> String {
    format!("\x1b[3m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Whether to emit ANSI escape sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    Styled,
    Plain,
}

/// Render blocks for the terminal, separated by one blank line.
///
/// ```rust
/// use edgequake_docsum::display::{render_blocks, DisplayMode};
/// use edgequake_docsum::Block;
///
/// let out = render_blocks(
///     &[Block::List { items: vec!["a".into(), "b".into()] }],
///     DisplayMode::Plain,
/// );
/// assert_eq!(out, "  • a\n  • b\n");
/// ```
pub fn render_blocks(blocks: &[Block], mode: DisplayMode) -> String {
    let rendered: Vec<String> = blocks.iter().map(|b| render_block(b, mode)).collect();
    rendered.join("\n")
}

/// Render a single block, ending with a newline.
pub fn render_block(block: &Block, mode: DisplayMode) -> String {
    let styled = mode == DisplayMode::Styled;
    match block {
        Block::Heading { level, text } => {
            if styled {
                let title = match level {
                    1 => bold(&cyan(&text.to_uppercase())),
                    2 => bold(&cyan(text)),
                    _ => bold(text),
                };
                format!("{title}\n")
            } else {
                match level {
                    1 => format!("{text}\n{}\n", "=".repeat(text.chars().count())),
                    2 => format!("{text}\n{}\n", "-".repeat(text.chars().count())),
                    _ => format!("{text}\n"),
                }
            }
        }
        Block::CodeBlock { code } => code
            .split('\n')
            .map(|line| {
                let line = format!("    {line}");
                if styled {
                    format!("{}\n", dim(&line))
                } else {
                    format!("{line}\n")
                }
            })
            .collect(),
        Block::Quote { text } => text
            .split('\n')
            .map(|line| {
                if styled {
                    format!("{} {}\n", dim("│"), italic(line))
                } else {
                    format!("│ {line}\n")
                }
            })
            .collect(),
        Block::List { items } => items
            .iter()
            .map(|item| {
                if styled {
                    format!("  {} {item}\n", cyan("•"))
                } else {
                    format!("  • {item}\n")
                }
            })
            .collect(),
        Block::Paragraph { text } => format!("{text}\n"),
    }
}

/// The summary panel: a title line followed by the blocks.
pub fn render_summary(blocks: &[Block], mode: DisplayMode) -> String {
    let title = match mode {
        DisplayMode::Styled => bold("Summary"),
        DisplayMode::Plain => "Summary".to_string(),
    };
    format!("{title}\n\n{}", render_blocks(blocks, mode))
}
