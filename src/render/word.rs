//! WordprocessingML output: one Word table per statement, separated by page
//! breaks, packaged into a minimal `.docx` archive.

use super::{cell_text, ensure_translatable, row_is_hidden, RenderOptions, RenderTarget};
use crate::error::Result;
use crate::formula::{Evaluator, FormulaContext};
use crate::style::{Align, Border, Style};
use crate::table::Table;
use log::debug;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer as XmlWriter;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Twentieths of a point per column-width unit.
const TWIPS_PER_WIDTH: f64 = 120.0;
const DEFAULT_WIDTH: f64 = 12.0;
const INDENT_TWIPS: u32 = 240;
const PAD_TOP_TWIPS: u32 = 120;

type Writer = XmlWriter<Vec<u8>>;

/// Builds the `word/document.xml` part for `tables`.
pub fn document_xml(
    tables: &[&Table],
    context: FormulaContext<'_>,
    options: &RenderOptions,
) -> Result<String> {
    let mut writer = XmlWriter::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut document = BytesStart::new("w:document");
    document.push_attribute(("xmlns:w", WORDML_NS));
    writer.write_event(Event::Start(document))?;
    writer.write_event(Event::Start(BytesStart::new("w:body")))?;

    for (index, table) in tables.iter().enumerate() {
        if index > 0 {
            write_page_break(&mut writer)?;
        }
        write_table(&mut writer, table, context, options)?;
    }

    writer.write_event(Event::Empty(BytesStart::new("w:sectPr")))?;
    writer.write_event(Event::End(BytesEnd::new("w:body")))?;
    writer.write_event(Event::End(BytesEnd::new("w:document")))?;

    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

/// Renders `tables` into a `.docx` file held in memory.
pub fn render_docx(
    tables: &[&Table],
    context: FormulaContext<'_>,
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    let document = document_xml(tables, context, options)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, contents) in [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", document.as_str()),
    ] {
        zip.start_file(name, file_options)?;
        zip.write_all(contents.as_bytes())?;
    }
    let buffer = zip.finish()?.into_inner();
    debug!("Packaged {} tables into {} bytes of docx", tables.len(), buffer.len());
    Ok(buffer)
}

fn write_page_break(writer: &mut Writer) -> Result<()> {
    let mut br = BytesStart::new("w:br");
    br.push_attribute(("w:type", "page"));
    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    writer.write_event(Event::Start(BytesStart::new("w:r")))?;
    writer.write_event(Event::Empty(br))?;
    writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    Ok(())
}

fn write_table(
    writer: &mut Writer,
    table: &Table,
    context: FormulaContext<'_>,
    options: &RenderOptions,
) -> Result<()> {
    ensure_translatable(table, RenderTarget::Word)?;
    let evaluator = Evaluator::new(table, context);

    let widths: Vec<u32> = (0..table.column_count())
        .map(|col| {
            let width = table.column(col).and_then(|c| c.width).unwrap_or(DEFAULT_WIDTH);
            (width * TWIPS_PER_WIDTH).round() as u32
        })
        .collect();

    writer.write_event(Event::Start(BytesStart::new("w:tbl")))?;
    writer.write_event(Event::Start(BytesStart::new("w:tblPr")))?;
    let mut table_width = BytesStart::new("w:tblW");
    table_width.push_attribute(("w:w", "0"));
    table_width.push_attribute(("w:type", "auto"));
    writer.write_event(Event::Empty(table_width))?;
    writer.write_event(Event::End(BytesEnd::new("w:tblPr")))?;

    writer.write_event(Event::Start(BytesStart::new("w:tblGrid")))?;
    for width in &widths {
        let mut grid_col = BytesStart::new("w:gridCol");
        grid_col.push_attribute(("w:w", width.to_string().as_str()));
        writer.write_event(Event::Empty(grid_col))?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:tblGrid")))?;

    for row in table.rows() {
        if row_is_hidden(&evaluator, row, options)? {
            continue;
        }
        writer.write_event(Event::Start(BytesStart::new("w:tr")))?;
        for (col, width) in widths.iter().enumerate() {
            let style = table.effective_style(row.number(), col);
            let (text, numeric) = match row.cell(col) {
                Some(cell) => cell_text(&evaluator, cell, style.number_format, options)?,
                None => (String::new(), false),
            };
            write_cell(writer, &text, &style, numeric, *width)?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:tr")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:tbl")))?;
    Ok(())
}

fn write_cell(writer: &mut Writer, text: &str, style: &Style, numeric: bool, width: u32) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new("w:tc")))?;

    writer.write_event(Event::Start(BytesStart::new("w:tcPr")))?;
    let mut cell_width = BytesStart::new("w:tcW");
    cell_width.push_attribute(("w:w", width.to_string().as_str()));
    cell_width.push_attribute(("w:type", "dxa"));
    writer.write_event(Event::Empty(cell_width))?;
    let borders = [("w:top", style.top_border()), ("w:bottom", style.bottom_border())];
    if borders.iter().any(|(_, border)| *border != Border::None) {
        writer.write_event(Event::Start(BytesStart::new("w:tcBorders")))?;
        for (side, border) in borders {
            let value = match border {
                Border::None => continue,
                Border::Single => "single",
                Border::Double => "double",
            };
            let mut edge = BytesStart::new(side);
            edge.push_attribute(("w:val", value));
            edge.push_attribute(("w:sz", "4"));
            edge.push_attribute(("w:space", "0"));
            edge.push_attribute(("w:color", "000000"));
            writer.write_event(Event::Empty(edge))?;
        }
        writer.write_event(Event::End(BytesEnd::new("w:tcBorders")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:tcPr")))?;

    writer.write_event(Event::Start(BytesStart::new("w:p")))?;
    writer.write_event(Event::Start(BytesStart::new("w:pPr")))?;
    if style.has_pad_top() {
        let mut spacing = BytesStart::new("w:spacing");
        spacing.push_attribute(("w:before", PAD_TOP_TWIPS.to_string().as_str()));
        writer.write_event(Event::Empty(spacing))?;
    }
    if style.indent_level() > 0 {
        let mut indent = BytesStart::new("w:ind");
        let left = INDENT_TWIPS * u32::from(style.indent_level());
        indent.push_attribute(("w:left", left.to_string().as_str()));
        writer.write_event(Event::Empty(indent))?;
    }
    let justification = match style.align {
        Some(Align::Right) => Some("right"),
        Some(Align::Center) => Some("center"),
        _ if numeric => Some("right"),
        _ => None,
    };
    if let Some(value) = justification {
        let mut jc = BytesStart::new("w:jc");
        jc.push_attribute(("w:val", value));
        writer.write_event(Event::Empty(jc))?;
    }
    writer.write_event(Event::End(BytesEnd::new("w:pPr")))?;

    if !text.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("w:r")))?;
        if style.is_bold() || style.is_italic() {
            writer.write_event(Event::Start(BytesStart::new("w:rPr")))?;
            if style.is_bold() {
                writer.write_event(Event::Empty(BytesStart::new("w:b")))?;
            }
            if style.is_italic() {
                writer.write_event(Event::Empty(BytesStart::new("w:i")))?;
            }
            writer.write_event(Event::End(BytesEnd::new("w:rPr")))?;
        }
        let mut run_text = BytesStart::new("w:t");
        run_text.push_attribute(("xml:space", "preserve"));
        writer.write_event(Event::Start(run_text))?;
        writer.write_event(Event::Text(BytesText::new(text)))?;
        writer.write_event(Event::End(BytesEnd::new("w:t")))?;
        writer.write_event(Event::End(BytesEnd::new("w:r")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("w:p")))?;
    writer.write_event(Event::End(BytesEnd::new("w:tc")))?;
    Ok(())
}
