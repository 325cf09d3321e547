//! Unit tests for DOCX text extraction

use teachassist::docx::{extract_text, is_useful, MIN_USEFUL_LEN};

#[test]
fn test_document_xml_fragment() {
    let xml = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:document><w:body><w:p><w:r><w:t>Chapter 4: Motion</w:t></w:r></w:p>"#,
        r#"<w:p><w:r><w:t xml:space="preserve">Speed = distance &#247; time, "#,
        r#"</w:t></w:r><w:r><w:t>measured in m/s &amp; km/h.</w:t></w:r></w:p></w:body></w:document>"#,
    );
    let text = extract_text(xml.as_bytes());
    assert_eq!(
        text,
        "Chapter 4: Motion Speed = distance &#247; time,  measured in m/s & km/h."
    );
    assert!(is_useful(&text));
}

#[test]
fn test_non_ascii_runs_kept() {
    let xml = "<w:t>प्रकाश संश्लेषण</w:t>";
    assert_eq!(extract_text(xml.as_bytes()), "प्रकाश संश्लेषण");
}

#[test]
fn test_empty_input() {
    let text = extract_text(b"");
    assert!(text.is_empty());
    assert!(!is_useful(&text));
    assert_eq!(MIN_USEFUL_LEN, 50);
}
