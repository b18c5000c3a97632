//! Mount container made of typed blocks.

use crate::page::PageAction;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, text: String },
    Text(String),
    Kpi { label: String, value: String },
    /// Read-only label/value pair.
    Detail { label: String, value: String },
    /// Editable form input.
    Field {
        name: String,
        label: String,
        value: String,
        required: bool,
    },
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
    },
    TreeItem { depth: usize, text: String },
    Chip { tone: Tone, text: String },
    Button { label: String, action: PageAction },
    Notice { tone: Tone, text: String },
}

/// Block list a page renders into.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Surface {
    id: String,
    blocks: Vec<Block>,
}

impl Surface {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            blocks: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn push(&mut self, block: Block) -> &mut Self {
        self.blocks.push(block);
        self
    }

    pub fn heading(&mut self, level: u8, text: impl Into<String>) -> &mut Self {
        self.push(Block::Heading {
            level,
            text: text.into(),
        })
    }

    pub fn text(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Block::Text(text.into()))
    }

    pub fn kpi(&mut self, label: impl Into<String>, value: impl ToString) -> &mut Self {
        self.push(Block::Kpi {
            label: label.into(),
            value: value.to_string(),
        })
    }

    pub fn detail(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.push(Block::Detail {
            label: label.into(),
            value: value.into(),
        })
    }

    pub fn button(&mut self, label: impl Into<String>, action: PageAction) -> &mut Self {
        self.push(Block::Button {
            label: label.into(),
            action,
        })
    }

    pub fn notice(&mut self, tone: Tone, text: impl Into<String>) -> &mut Self {
        self.push(Block::Notice {
            tone,
            text: text.into(),
        })
    }

    pub fn table(&mut self, columns: &[&str], rows: Vec<Vec<String>>) -> &mut Self {
        self.push(Block::Table {
            columns: columns.iter().map(|column| column.to_string()).collect(),
            rows,
        })
    }

    /// First heading text, if any.
    pub fn title(&self) -> Option<&str> {
        self.blocks.iter().find_map(|block| match block {
            Block::Heading { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Case-sensitive search over the rendered text.
    pub fn contains_text(&self, needle: &str) -> bool {
        self.to_string().contains(needle)
    }

    /// Action bound to the first button labelled `label`.
    pub fn button_action(&self, label: &str) -> Option<&PageAction> {
        self.blocks.iter().find_map(|block| match block {
            Block::Button {
                label: candidate,
                action,
            } if candidate == label => Some(action),
            _ => None,
        })
    }

    pub fn field_value(&self, name: &str) -> Option<&str> {
        self.blocks.iter().find_map(|block| match block {
            Block::Field {
                name: candidate,
                value,
                ..
            } if candidate == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Rows of every table, in order.
    pub fn table_rows(&self) -> Vec<&[String]> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Table { rows, .. } => Some(rows),
                _ => None,
            })
            .flat_map(|rows| rows.iter().map(Vec::as_slice))
            .collect()
    }
}

impl Display for Surface {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for block in &self.blocks {
            match block {
                Block::Heading { level, text } => {
                    writeln!(f, "{} {text}", "#".repeat(usize::from((*level).max(1))))?
                }
                Block::Text(text) => writeln!(f, "{text}")?,
                Block::Kpi { label, value } => writeln!(f, "[{label}: {value}]")?,
                Block::Detail { label, value } => writeln!(f, "{label}: {value}")?,
                Block::Field {
                    name,
                    label,
                    value,
                    required,
                } => {
                    let marker = if *required { " *" } else { "" };
                    writeln!(f, "{label}{marker} ({name}) = {value}")?
                }
                Block::Table { columns, rows } => {
                    writeln!(f, "| {} |", columns.join(" | "))?;
                    for row in rows {
                        writeln!(f, "| {} |", row.join(" | "))?;
                    }
                }
                Block::TreeItem { depth, text } => writeln!(f, "{}- {text}", "  ".repeat(*depth))?,
                Block::Chip { text, .. } => writeln!(f, "({text})")?,
                Block::Button { label, .. } => writeln!(f, "<{label}>")?,
                Block::Notice { tone, text } => writeln!(f, "!{tone:?}: {text}")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Surface;
    use crate::page::PageAction;

    #[test]
    fn renders_blocks_as_text_and_finds_buttons() {
        let mut surface = Surface::new("app");
        surface
            .heading(1, "Dashboard")
            .kpi("Pending Approvals", 6)
            .button("Review Approvals", PageAction::navigate("/approvals/pending"));

        let text = surface.to_string();
        assert!(text.contains("# Dashboard"));
        assert!(text.contains("[Pending Approvals: 6]"));
        assert_eq!(surface.title(), Some("Dashboard"));
        assert_eq!(
            surface.button_action("Review Approvals"),
            Some(&PageAction::navigate("/approvals/pending"))
        );

        surface.clear();
        assert!(surface.is_empty());
    }
}
