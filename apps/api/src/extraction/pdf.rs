use std::fmt::Display;

use lopdf::Document;
use tracing::{info, warn};

use super::ExtractionError;

/// Extracts the text of every page of an in-memory PDF, in page order.
///
/// A page that fails to decode is skipped and logged; only a document that
/// cannot be loaded at all is an error. Returns an empty string for a PDF
/// without any page text.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractionError::Pdf(e.to_string()))?;
    let pages = doc.get_pages();

    info!("PDF has {} pages", pages.len());

    // get_pages() is a BTreeMap keyed by page number, so iteration is ordered.
    let text = join_pages(
        pages
            .keys()
            .map(|&page_number| (page_number, doc.extract_text(&[page_number]))),
    );

    if text.trim().is_empty() {
        warn!("No text could be extracted from PDF");
    }

    Ok(text)
}

/// Joins per-page extraction results with newlines, skipping pages that
/// errored or came back blank.
fn join_pages<E: Display>(pages: impl IntoIterator<Item = (u32, Result<String, E>)>) -> String {
    let mut kept: Vec<String> = Vec::new();

    for (page_number, result) in pages {
        match result {
            Ok(text) if !text.trim().is_empty() => kept.push(text.trim_end().to_string()),
            Ok(_) => warn!("No text found on page {page_number}"),
            Err(e) => warn!("Failed to extract text from page {page_number}: {e}"),
        }
    }

    kept.join("\n")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn text_page(line: &str) -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![72.into(), 700.into()]),
            Operation::new("Tj", vec![Object::string_literal(line)]),
            Operation::new("ET", vec![]),
        ]
    }

    /// A content stream whose `Tf` has no font operand; lopdf refuses to
    /// extract text from it.
    fn broken_page() -> Vec<Operation> {
        vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![]),
            Operation::new("Tj", vec![Object::string_literal("unreachable")]),
            Operation::new("ET", vec![]),
        ]
    }

    /// Builds a minimal PDF, one content stream per page, all pages sharing
    /// a Courier font resource.
    fn build_pdf(pages: Vec<Vec<Operation>>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for operations in pages {
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    /// One Courier text line per page.
    pub(crate) fn pdf_with_pages(lines: &[&str]) -> Vec<u8> {
        build_pdf(lines.iter().map(|line| text_page(line)).collect())
    }

    pub(crate) fn single_page_pdf(line: &str) -> Vec<u8> {
        pdf_with_pages(&[line])
    }

    #[test]
    fn test_extracts_pages_in_order() {
        let bytes = pdf_with_pages(&["Experience", "Education", "Skills"]);
        let text = extract_pdf_text(&bytes).unwrap();

        let experience = text.find("Experience").unwrap();
        let education = text.find("Education").unwrap();
        let skills = text.find("Skills").unwrap();
        assert!(experience < education && education < skills);
    }

    #[test]
    fn test_broken_page_is_skipped_in_real_document() {
        let bytes = build_pdf(vec![
            text_page("Experience"),
            broken_page(),
            text_page("Education"),
            text_page("Skills"),
        ]);

        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.extract_text(&[2]).is_err());

        let text = extract_pdf_text(&bytes).unwrap();
        assert!(!text.contains("unreachable"));
        let experience = text.find("Experience").unwrap();
        let education = text.find("Education").unwrap();
        let skills = text.find("Skills").unwrap();
        assert!(experience < education && education < skills);
    }

    #[test]
    fn test_failing_page_is_skipped_and_order_preserved() {
        let pages: Vec<(u32, Result<String, String>)> = vec![
            (1, Ok("page one".to_string())),
            (2, Err("bad content stream".to_string())),
            (3, Ok("page three".to_string())),
            (4, Ok("page four".to_string())),
        ];
        assert_eq!(join_pages(pages), "page one\npage three\npage four");
    }

    #[test]
    fn test_blank_pages_are_skipped() {
        let pages: Vec<(u32, Result<String, String>)> = vec![
            (1, Ok("   \n".to_string())),
            (2, Ok("only text".to_string())),
        ];
        assert_eq!(join_pages(pages), "only text");
    }

    #[test]
    fn test_all_pages_failing_yields_empty_text() {
        let pages: Vec<(u32, Result<String, String>)> =
            vec![(1, Err("boom".to_string())), (2, Err("boom".to_string()))];
        assert_eq!(join_pages(pages), "");
    }

    #[test]
    fn test_unloadable_pdf_is_an_error() {
        assert!(matches!(
            extract_pdf_text(b"%PDF-1.5 truncated"),
            Err(ExtractionError::Pdf(_))
        ));
    }
}
