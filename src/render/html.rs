use super::{cell_text, ensure_translatable, row_is_hidden, RenderOptions, RenderTarget};
use crate::error::Result;
use crate::formula::{Evaluator, FormulaContext};
use crate::style::{Align, Border, Style};
use crate::table::Table;
use log::debug;
use quick_xml::escape::escape;
use serde::{Deserialize, Serialize};

const STYLESHEET: &str = "\
table.financial-statement { border-collapse: collapse; margin-bottom: 2em; }
table.financial-statement td { padding: 1px 8px; }
td.bold { font-weight: bold; }
td.italic { font-style: italic; }
td.numeric, td.align-right { text-align: right; }
td.align-center { text-align: center; }
td.indent-1 { padding-left: 1.5em; }
td.indent-2 { padding-left: 3em; }
td.indent-3 { padding-left: 4.5em; }
td.border-top-single { border-top: 1px solid #000; }
td.border-top-double { border-top: 3px double #000; }
td.border-bottom-single { border-bottom: 1px solid #000; }
td.border-bottom-double { border-bottom: 3px double #000; }
tr.pad-top td { padding-top: 0.8em; }
";

/// One cell as it will be shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedCell {
    pub col: usize,
    pub text: String,
    pub style: Style,
    pub classes: Vec<String>,
    pub numeric: bool,
}

/// One visible row, with every formula already evaluated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedRow {
    pub number: u32,
    pub id: Option<String>,
    pub tags: Vec<String>,
    pub pad_top: bool,
    pub cells: Vec<RenderedCell>,
}

/// CSS classes for an effective style.
pub fn css_classes(style: &Style) -> Vec<String> {
    let mut classes = Vec::new();
    if style.is_bold() {
        classes.push("bold".to_string());
    }
    if style.is_italic() {
        classes.push("italic".to_string());
    }
    if style.indent_level() > 0 {
        classes.push(format!("indent-{}", style.indent_level()));
    }
    match style.align {
        Some(Align::Right) => classes.push("align-right".to_string()),
        Some(Align::Center) => classes.push("align-center".to_string()),
        Some(Align::Left) | None => {}
    }
    for (side, border) in [("top", style.top_border()), ("bottom", style.bottom_border())] {
        match border {
            Border::Single => classes.push(format!("border-{}-single", side)),
            Border::Double => classes.push(format!("border-{}-double", side)),
            Border::None => {}
        }
    }
    classes
}

/// Evaluates `table` into row descriptors, dropping hidden rows.
pub fn render_rows(
    table: &Table,
    context: FormulaContext<'_>,
    options: &RenderOptions,
) -> Result<Vec<RenderedRow>> {
    ensure_translatable(table, RenderTarget::Html)?;
    let evaluator = Evaluator::new(table, context);
    let mut rendered = Vec::with_capacity(table.rows().len());

    for row in table.rows() {
        if row_is_hidden(&evaluator, row, options)? {
            debug!("{}: hiding zero row {}", table.name(), row.number());
            continue;
        }

        let mut cells = Vec::with_capacity(table.column_count());
        for col in 0..table.column_count() {
            let style = table.effective_style(row.number(), col);
            let (text, numeric) = match row.cell(col) {
                Some(cell) => cell_text(&evaluator, cell, style.number_format, options)?,
                None => (String::new(), false),
            };
            let mut classes = css_classes(&style);
            if numeric {
                classes.push("numeric".to_string());
            }
            cells.push(RenderedCell {
                col,
                text,
                style,
                classes,
                numeric,
            });
        }

        rendered.push(RenderedRow {
            number: row.number(),
            id: row.id().map(str::to_string),
            tags: row.tags.iter().cloned().collect(),
            pad_top: row.style.has_pad_top(),
            cells,
        });
    }

    Ok(rendered)
}

/// Renders `table` as an HTML `<table>` element.
pub fn render_table(
    table: &Table,
    context: FormulaContext<'_>,
    options: &RenderOptions,
) -> Result<String> {
    let rows = render_rows(table, context, options)?;
    let mut html = String::new();

    html.push_str(&format!(
        "<table class=\"financial-statement\" data-statement=\"{}\">\n",
        escape(table.name())
    ));
    html.push_str("<tbody>\n");
    for row in &rows {
        html.push_str(&format!("<tr data-row=\"{}\"", row.number));
        if let Some(id) = &row.id {
            html.push_str(&format!(" data-id=\"{}\"", escape(id.as_str())));
        }
        if row.pad_top {
            html.push_str(" class=\"pad-top\"");
        }
        html.push('>');
        for cell in &row.cells {
            if cell.classes.is_empty() {
                html.push_str("<td>");
            } else {
                html.push_str(&format!("<td class=\"{}\">", cell.classes.join(" ")));
            }
            html.push_str(&escape(cell.text.as_str()));
            html.push_str("</td>");
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    Ok(html)
}

/// A standalone page holding several statements.
pub fn render_document(
    title: &str,
    tables: &[&Table],
    context: FormulaContext<'_>,
    options: &RenderOptions,
) -> Result<String> {
    let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape(title)));
    html.push_str(&format!("<style>\n{}</style>\n</head>\n<body>\n", STYLESHEET));
    for table in tables {
        html.push_str(&render_table(table, context, options)?);
    }
    html.push_str("</body>\n</html>\n");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account_map::AccountMap;
    use crate::schema::{AuditData, BusinessInfo, CashFlowData, YearMapping, YearType};
    use crate::style::NumberFormat;
    use crate::table::{RowOptions, HIDE_IF_ZERO};
    use std::collections::BTreeMap;

    fn audit() -> AuditData {
        let mut trial_balances = BTreeMap::new();
        trial_balances.insert(
            "2023".to_string(),
            AccountMap::from_entries([("ASSET_INVENTORY", 250_000)]).unwrap(),
        );
        AuditData {
            business: BusinessInfo {
                legal_name: "Smith & <Sons>".to_string(),
                fiscal_year_end: "December 31".to_string(),
            },
            years: YearMapping::new("2023"),
            trial_balances,
            cash_flow: CashFlowData::default(),
        }
    }

    fn table() -> Table {
        let mut table = Table::new("Figures");
        table.set_year_column(YearType::Cy, 1);
        table.get_column(1).style = Style::new().with_number_format(NumberFormat::Accounting);
        table
            .add_row(["Ben & Jerry's <b>", "=TBLOOKUP('ASSET_INVENTORY','CY')"], RowOptions::new().id("INV"))
            .unwrap();
        table
            .add_row(
                ["Unused", "=TBLOOKUP('ASSET_OTHER','CY')"],
                RowOptions::new().tag(HIDE_IF_ZERO),
            )
            .unwrap();
        table
            .add_row(
                ["Total", "=SUM(B1:B2)"],
                RowOptions::new().style(Style::new().with_bold(true).with_pad_top(true)),
            )
            .unwrap();
        table
    }

    #[test]
    fn test_zero_rows_are_suppressed() {
        let audit = audit();
        let table = table();
        let context = FormulaContext::from_audit(&audit);

        let rows = render_rows(&table, context, &RenderOptions::default()).unwrap();
        assert_eq!(rows.iter().map(|r| r.number).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(rows[0].cells[1].text, "2,500");
        assert!(rows[0].cells[1].numeric);
        assert!(rows[1].cells[0].classes.contains(&"bold".to_string()));

        let options = RenderOptions {
            hide_zero_rows: false,
            ..RenderOptions::default()
        };
        let rows = render_rows(&table, context, &options).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].cells[1].text, "-");
    }

    #[test]
    fn test_markup_is_escaped() {
        let audit = audit();
        let html = render_table(&table(), FormulaContext::from_audit(&audit), &RenderOptions::default())
            .unwrap();
        assert!(html.contains("Ben &amp; Jerry&apos;s &lt;b&gt;"));
        assert!(html.contains("data-id=\"INV\""));
        assert!(html.contains("<tr data-row=\"3\" class=\"pad-top\">"));
        assert!(!html.contains("data-row=\"2\""));
    }

    #[test]
    fn test_document_wraps_every_statement() {
        let audit = audit();
        let table = table();
        let html = render_document(
            "Ben & Jerry's",
            &[&table, &table],
            FormulaContext::from_audit(&audit),
            &RenderOptions::default(),
        )
        .unwrap();
        assert!(html.starts_with("<!DOCTYPE html>\n"));
        assert!(html.contains("<title>Ben &amp; Jerry&apos;s</title>\n<style>\n"));
        assert_eq!(html.matches("<table class=\"financial-statement\"").count(), 2);
        assert!(html.ends_with("</table>\n</body>\n</html>\n"));
    }

    #[test]
    fn test_css_classes() {
        let style = Style::new()
            .with_indent(2)
            .with_border_top(Border::Single)
            .with_border_bottom(Border::Double)
            .with_align(Align::Right);
        assert_eq!(
            css_classes(&style),
            vec![
                "indent-2",
                "align-right",
                "border-top-single",
                "border-bottom-double"
            ]
        );
    }
}
