//! PDF dictionaries: text is pulled page by page from content streams.

use hdm_model::{DictionarySection, ExtractionWarning, SectionLabel};
use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

/// Sections and skipped-page warnings produced from one document.
#[derive(Debug, Default)]
pub struct DocumentOutput {
    pub sections: Vec<DictionarySection>,
    pub warnings: Vec<ExtractionWarning>,
}

/// Load a PDF and extract each page. Fails only when the file cannot be
/// opened at all; individual page failures become warnings.
pub fn extract_document(bytes: &[u8]) -> Result<DocumentOutput, String> {
    let doc = Document::load_mem(bytes).map_err(|e| e.to_string())?;
    if doc.is_encrypted() {
        return Err("document is encrypted".to_string());
    }

    let pages = doc
        .get_pages()
        .into_iter()
        .map(|(number, page_id)| (number, page_text(&doc, page_id).map_err(|e| e.to_string())));
    Ok(assemble_pages(pages))
}

/// Turn per-page extraction results into sections, in page order.
///
/// Failed pages are recorded as warnings. Pages without text are dropped.
pub fn assemble_pages<I>(pages: I) -> DocumentOutput
where
    I: IntoIterator<Item = (u32, Result<String, String>)>,
{
    let mut output = DocumentOutput::default();
    for (number, result) in pages {
        match result {
            Ok(text) => {
                let mut section = DictionarySection::new(SectionLabel::Page(number));
                section.lines = normalize_lines(&text);
                if !section.lines.is_empty() {
                    output.sections.push(section);
                }
            }
            Err(message) => output.warnings.push(ExtractionWarning {
                location: format!("page {number}"),
                message,
            }),
        }
    }
    output
}

/// Collapse runs of whitespace inside each line and drop blank lines.
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

fn page_text(doc: &Document, page_id: ObjectId) -> Result<String, lopdf::Error> {
    let bytes = doc.get_page_content(page_id)?;
    let content = Content::decode(&bytes)?;

    let mut text = String::new();
    for operation in &content.operations {
        match operation.operator.as_str() {
            "Tj" | "TJ" | "'" | "\"" => {
                if matches!(operation.operator.as_str(), "'" | "\"") {
                    end_line(&mut text);
                }
                for operand in &operation.operands {
                    if let Some(s) = string_from_object(operand) {
                        text.push_str(&s);
                    }
                }
            }
            "Td" | "TD" | "T*" | "Tm" | "ET" => end_line(&mut text),
            _ => {}
        }
    }
    Ok(text)
}

fn end_line(text: &mut String) {
    if !text.is_empty() && !text.ends_with('\n') {
        text.push('\n');
    }
}

fn string_from_object(obj: &Object) -> Option<String> {
    match obj {
        Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
        Object::Array(items) => {
            let mut out = String::new();
            for item in items {
                match item {
                    Object::String(bytes, _) => out.push_str(&decode_pdf_string(bytes)),
                    // Large negative kerning inside TJ is how most producers emit a space.
                    Object::Integer(offset) if *offset <= -200 => out.push(' '),
                    Object::Real(offset) if *offset <= -200.0 => out.push(' '),
                    _ => {}
                }
            }
            (!out.is_empty()).then_some(out)
        }
        _ => None,
    }
}

fn decode_pdf_string(bytes: &[u8]) -> String {
    if let [0xFE, 0xFF, rest @ ..] = bytes {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_pages_become_warnings() {
        let out = assemble_pages(vec![
            (1, Ok("claims_detail  claim_id   string".to_string())),
            (2, Err("invalid content stream".to_string())),
            (3, Ok("  \n\t".to_string())),
            (4, Ok("bill_amount numeric\n\nBilled amount".to_string())),
        ]);
        assert_eq!(out.sections.len(), 2);
        assert_eq!(out.sections[0].label, SectionLabel::Page(1));
        assert_eq!(out.sections[0].lines, vec!["claims_detail claim_id string"]);
        assert_eq!(out.sections[1].label, SectionLabel::Page(4));
        assert_eq!(
            out.sections[1].lines,
            vec!["bill_amount numeric", "Billed amount"]
        );
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.warnings[0].location, "page 2");
    }

    #[test]
    fn decodes_utf16_strings() {
        let bytes = [0xFE, 0xFF, 0x00, b'I', 0x00, b'D'];
        assert_eq!(decode_pdf_string(&bytes), "ID");
        assert_eq!(decode_pdf_string(b"claim"), "claim");
    }

    #[test]
    fn garbage_is_not_a_document() {
        assert!(extract_document(b"not a pdf").is_err());
    }
}
