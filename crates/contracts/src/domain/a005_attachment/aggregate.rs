use serde::{Deserialize, Serialize};

/// Answer of the multipart upload endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub filename: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub extracted_text: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Uploaded document sent along with chat and generation requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub mime_type: String,
    pub filename: String,
    pub url: String,
    pub extracted_text: Option<String>,
}

impl Attachment {
    /// `mime_type` comes from the picked file; the server echo may omit it.
    pub fn from_upload(upload: UploadResponse, mime_type: &str) -> Self {
        Self {
            mime_type: upload.mime_type.unwrap_or_else(|| mime_type.to_string()),
            filename: upload.filename,
            url: upload.url,
            extracted_text: upload.extracted_text,
        }
    }

    pub fn has_text(&self) -> bool {
        self.extracted_text.as_ref().is_some_and(|t| !t.is_empty())
    }
}

/// Ordered attachments, removable by filename.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentList {
    items: Vec<Attachment>,
}

impl AttachmentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, attachment: Attachment) {
        self.items.push(attachment);
    }

    /// Removes the first attachment with this filename.
    pub fn remove(&mut self, filename: &str) -> Option<Attachment> {
        let pos = self.items.iter().position(|a| a.filename == filename)?;
        Some(self.items.remove(pos))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attachment> {
        self.items.iter()
    }

    pub fn to_vec(&self) -> Vec<Attachment> {
        self.items.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(name: &str) -> UploadResponse {
        UploadResponse {
            filename: name.into(),
            url: format!("/uploads/{name}"),
            extracted_text: Some("texto".into()),
            mime_type: None,
        }
    }

    #[test]
    fn test_serializes_mime_as_type() {
        let a = Attachment::from_upload(upload("a.pdf"), "application/pdf");
        let json = serde_json::to_value(&a).unwrap();
        assert_eq!(json["type"], "application/pdf");
        assert_eq!(json["extracted_text"], "texto");
    }

    #[test]
    fn test_remove_by_filename() {
        let mut list = AttachmentList::new();
        list.push(Attachment::from_upload(upload("a.pdf"), "application/pdf"));
        list.push(Attachment::from_upload(upload("b.txt"), "text/plain"));
        assert!(list.remove("a.pdf").is_some());
        assert!(list.remove("a.pdf").is_none());
        assert_eq!(list.len(), 1);
    }
}
