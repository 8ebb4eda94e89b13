//! Deterministic key layout, carried over 1:1 from the original service
//! (`examples/original_source/app/services/s3_service.py`).

pub fn document_key(user_id: &str, conversation_id: &str, document_id: &str, filename: &str) -> String {
    format!("users/{user_id}/conversations/{conversation_id}/documents/{document_id}/{filename}")
}

pub fn summary_markdown_key(reference_number: &str) -> String {
    format!("summaries/{reference_number}.md")
}

pub fn summary_pdf_key(reference_number: &str) -> String {
    format!("summaries/{reference_number}.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_key_matches_layout() {
        assert_eq!(
            document_key("u1", "c1", "d1", "contract.pdf"),
            "users/u1/conversations/c1/documents/d1/contract.pdf"
        );
    }

    #[test]
    fn summary_keys_share_the_reference_number() {
        assert_eq!(summary_markdown_key("SUM-20260727-AB3K9"), "summaries/SUM-20260727-AB3K9.md");
        assert_eq!(summary_pdf_key("SUM-20260727-AB3K9"), "summaries/SUM-20260727-AB3K9.pdf");
    }
}
