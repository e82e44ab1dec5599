use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Border {
    None,
    Single,
    Double,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
}

/// How a numeric cell is displayed. Every format except `Percent` treats the
/// value as fixed-point cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberFormat {
    /// Negatives in parentheses, zero as a dash.
    Accounting,
    /// Accounting layout with a leading currency symbol.
    Currency,
    /// Plain number with thousands separators.
    Number,
    /// Ratio rendered as a percentage.
    Percent,
}

/// Presentation attributes for a column, row or cell.
///
/// Every key is optional; an unset key does not take part in the cascade, so a
/// row can override a column's `bold` with `Some(false)` while leaving its
/// border alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_top: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_bottom: Option<Border>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pad_top: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_format: Option<NumberFormat>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn with_border_top(mut self, border: Border) -> Self {
        self.border_top = Some(border);
        self
    }

    pub fn with_border_bottom(mut self, border: Border) -> Self {
        self.border_bottom = Some(border);
        self
    }

    pub fn with_pad_top(mut self, pad_top: bool) -> Self {
        self.pad_top = Some(pad_top);
        self
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn with_align(mut self, align: Align) -> Self {
        self.align = Some(align);
        self
    }

    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = Some(format);
        self
    }

    /// Returns a new style where every key set on `other` wins.
    pub fn merge(&self, other: &Style) -> Style {
        Style {
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            border_top: other.border_top.or(self.border_top),
            border_bottom: other.border_bottom.or(self.border_bottom),
            pad_top: other.pad_top.or(self.pad_top),
            indent: other.indent.or(self.indent),
            align: other.align.or(self.align),
            number_format: other.number_format.or(self.number_format),
        }
    }

    pub fn is_bold(&self) -> bool {
        self.bold.unwrap_or(false)
    }

    pub fn is_italic(&self) -> bool {
        self.italic.unwrap_or(false)
    }

    pub fn has_pad_top(&self) -> bool {
        self.pad_top.unwrap_or(false)
    }

    pub fn indent_level(&self) -> u8 {
        self.indent.unwrap_or(0)
    }

    pub fn top_border(&self) -> Border {
        self.border_top.unwrap_or(Border::None)
    }

    pub fn bottom_border(&self) -> Border {
        self.border_bottom.unwrap_or(Border::None)
    }
}

/// Effective style of a cell: column, then row, then the cell's own override.
pub fn resolve_style(column: &Style, row: &Style, cell: &Style) -> Style {
    column.merge(row).merge(cell)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_overrides_column_and_cell_overrides_row() {
        let column = Style::new().with_bold(true);
        let row = Style::new().with_bold(false);

        let effective = resolve_style(&column, &row, &Style::new());
        assert!(!effective.is_bold());

        let cell = Style::new().with_bold(true);
        let effective = resolve_style(&column, &row, &cell);
        assert!(effective.is_bold());
    }

    #[test]
    fn test_unset_keys_do_not_override() {
        let column = Style::new()
            .with_number_format(NumberFormat::Accounting)
            .with_align(Align::Right);
        let row = Style::new().with_border_top(Border::Single);
        let cell = Style::new().with_number_format(NumberFormat::Currency);

        let effective = resolve_style(&column, &row, &cell);
        assert_eq!(effective.number_format, Some(NumberFormat::Currency));
        assert_eq!(effective.align, Some(Align::Right));
        assert_eq!(effective.top_border(), Border::Single);
        assert_eq!(effective.bottom_border(), Border::None);
    }

    #[test]
    fn test_resolve_does_not_alias_inputs() {
        let row = Style::new().with_indent(1);
        let mut effective = resolve_style(&Style::new(), &row, &Style::new());
        effective.indent = Some(3);
        assert_eq!(row.indent, Some(1));
    }
}
