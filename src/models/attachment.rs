use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub task_id: String,
    pub file_name: String,
    pub file_url: String,
}

impl Attachment {
    /// Only `data:`, `http://` and `https://` URLs are considered valid;
    /// anything else is kept in storage but excluded from rendered lists.
    pub fn has_valid_url(&self) -> bool {
        self.file_url.starts_with("data:")
            || self.file_url.starts_with("http://")
            || self.file_url.starts_with("https://")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attachment(url: &str) -> Attachment {
        Attachment {
            id: "a1".into(),
            task_id: "t1".into(),
            file_name: "anexo".into(),
            file_url: url.into(),
        }
    }

    #[test]
    fn test_data_url_is_valid() {
        assert!(attachment("data:image/png;base64,iVBORw0KGgo=").has_valid_url());
    }

    #[test]
    fn test_http_urls_are_valid() {
        assert!(attachment("http://example.com/f.pdf").has_valid_url());
        assert!(attachment("https://example.com/f.pdf").has_valid_url());
    }

    #[test]
    fn test_other_schemes_are_invalid() {
        assert!(!attachment("ftp://x").has_valid_url());
        assert!(!attachment("file:///etc/passwd").has_valid_url());
        assert!(!attachment("").has_valid_url());
    }
}
