use docx_rs::{
    read_docx, DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild,
    StructuredDataTag, StructuredDataTagChild, Table, TableCellContent, TableChild,
    TableRowChild,
};
use tracing::info;

use super::ExtractionError;

/// Flattens the visible text of a DOCX body: one line per paragraph, table
/// cells read row by row, content controls and tracked insertions read in
/// place. Formatting is dropped.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let docx = read_docx(bytes).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut lines = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => lines.push(paragraph_text(p)),
            DocumentChild::Table(t) => table_text(t, &mut lines),
            DocumentChild::StructuredDataTag(sdt) => block_sdt_text(sdt, &mut lines),
            _ => {}
        }
    }

    info!("DOCX body has {} text blocks", lines.len());

    Ok(lines.join("\n"))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_paragraph_children(&paragraph.children, &mut text);
    text
}

fn push_run(run: &Run, out: &mut String) {
    for run_child in &run.children {
        if let RunChild::Text(t) = run_child {
            out.push_str(&t.text);
        }
    }
}

fn push_paragraph_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, out),
            ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, out),
            ParagraphChild::Insert(insert) => {
                for insert_child in &insert.children {
                    if let InsertChild::Run(run) = insert_child {
                        push_run(run, out);
                    }
                }
            }
            ParagraphChild::StructuredDataTag(sdt) => inline_sdt_text(sdt, out),
            _ => {}
        }
    }
}

/// Content control inside a paragraph: its runs continue the current line.
fn inline_sdt_text(sdt: &StructuredDataTag, out: &mut String) {
    for child in &sdt.children {
        match child {
            StructuredDataTagChild::Run(run) => push_run(run, out),
            StructuredDataTagChild::Paragraph(p) => push_paragraph_children(&p.children, out),
            StructuredDataTagChild::StructuredDataTag(inner) => inline_sdt_text(inner, out),
            _ => {}
        }
    }
}

/// Content control at block level: paragraphs and tables become lines.
fn block_sdt_text(sdt: &StructuredDataTag, lines: &mut Vec<String>) {
    let mut pending = String::new();
    for child in &sdt.children {
        match child {
            StructuredDataTagChild::Run(run) => push_run(run, &mut pending),
            StructuredDataTagChild::Paragraph(p) => lines.push(paragraph_text(p)),
            StructuredDataTagChild::Table(t) => table_text(t, lines),
            StructuredDataTagChild::StructuredDataTag(inner) => block_sdt_text(inner, lines),
            _ => {}
        }
    }
    if !pending.is_empty() {
        lines.push(pending);
    }
}

#[allow(irrefutable_let_patterns)]
fn table_text(table: &Table, lines: &mut Vec<String>) {
    for row in &table.rows {
        if let TableChild::TableRow(row) = row {
            for cell in &row.cells {
                if let TableRowChild::TableCell(cell) = cell {
                    for content in &cell.children {
                        match content {
                            TableCellContent::Paragraph(p) => lines.push(paragraph_text(p)),
                            TableCellContent::Table(t) => table_text(t, lines),
                            TableCellContent::StructuredDataTag(sdt) => {
                                block_sdt_text(sdt, lines)
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
    }
}
