//! Resume text extraction from uploaded files.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TextExtractError {
    #[error("Could not extract text from PDF: {0}")]
    Pdf(String),

    #[error("Error reading text file: {0}")]
    Encoding(String),

    #[error("{0} files are not supported; upload PDF or plain text")]
    Unsupported(String),

    #[error("File is empty")]
    Empty,
}

/// Extracts plain text from a PDF or UTF-8 text upload, chosen by extension.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, TextExtractError> {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| TextExtractError::Pdf(e.to_string()))?,
        "docx" | "doc" => return Err(TextExtractError::Unsupported(extension.to_uppercase())),
        _ => String::from_utf8(bytes.to_vec())
            .map_err(|e| TextExtractError::Encoding(e.to_string()))?,
    };

    if text.trim().is_empty() {
        return Err(TextExtractError::Empty);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_decoded() {
        let text = extract_text("jane.txt", "Jane Doe\nRust".as_bytes()).unwrap();
        assert_eq!(text, "Jane Doe\nRust");
    }

    #[test]
    fn test_unknown_extension_is_treated_as_text() {
        assert_eq!(extract_text("resume", b"hello").unwrap(), "hello");
    }

    #[test]
    fn test_whitespace_only_is_empty() {
        assert_eq!(extract_text("blank.txt", b" \n\t "), Err(TextExtractError::Empty));
    }

    #[test]
    fn test_invalid_utf8_is_an_encoding_error() {
        let err = extract_text("bad.txt", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, TextExtractError::Encoding(_)));
    }

    #[test]
    fn test_docx_is_unsupported() {
        assert_eq!(
            extract_text("Resume.DOCX", b"PK\x03\x04"),
            Err(TextExtractError::Unsupported("DOCX".to_string()))
        );
    }
}
