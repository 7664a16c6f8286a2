//! Resume text extraction. A PDF that cannot be parsed yields `None`;
//! callers decide how to surface that.

use tracing::warn;

pub fn extract_text(bytes: &[u8]) -> Option<String> {
    match pdf_extract::extract_text_from_mem(bytes) {
        Ok(text) if !text.trim().is_empty() => Some(text),
        Ok(_) => {
            warn!("PDF contained no extractable text");
            None
        }
        Err(e) => {
            warn!("Failed to extract text from PDF: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_yield_none() {
        assert!(extract_text(b"not a pdf at all").is_none());
    }

    #[test]
    fn test_empty_input_yields_none() {
        assert!(extract_text(&[]).is_none());
    }
}
