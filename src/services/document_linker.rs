use crate::domain::models::Proposal;

/// Resolves a proposal's document reference into a downloadable URL.
#[derive(Debug, Clone)]
pub struct DocumentLinker {
    base_url: String,
}

impl DocumentLinker {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// URL of the submitted document, `None` when the proposal has none.
    pub fn url_for(&self, proposal: &Proposal) -> Option<String> {
        let reference = proposal.document_ref.as_deref()?.trim();
        if reference.is_empty() {
            return None;
        }
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Some(reference.to_string());
        }
        Some(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            reference.trim_start_matches('/')
        ))
    }
}
