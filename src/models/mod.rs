use serde::{Deserialize, Serialize};

/// Backend account info object.
///
/// altdesk-server returns this under the `account` field.
/// We keep it flexible to avoid breaking when backend fields evolve.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AccountInfo {
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct MediaItem {
    pub id: String,

    pub title: String,

    #[serde(rename = "file-name")]
    pub file_name: String,

    #[serde(rename = "thumbnail-url")]
    pub thumbnail_url: String,

    /// RFC3339 upload timestamp. Opaque to us; only used as a sort tiebreak,
    /// and RFC3339 sorts correctly as a plain string.
    #[serde(rename = "uploaded-at")]
    pub uploaded_at: String,

    /// Persisted caption. The backend sends null or omits the key when no
    /// caption has ever been stored; both normalize to "".
    #[serde(rename = "alt-text", default, deserialize_with = "null_as_empty")]
    pub alt_text: String,

    /// Record-scoped capability for the save endpoint. Present only when the
    /// viewer may edit this record's caption. Opaque: passed through to the
    /// save request unmodified, never parsed or refreshed client-side.
    #[serde(rename = "edit-token", default)]
    pub edit_token: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v: Option<String> = Option::deserialize(deserializer)?;
    Ok(v.unwrap_or_default())
}

impl MediaItem {
    pub fn is_editable(&self) -> bool {
        self.edit_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_item_null_alt_text_normalizes_to_empty() {
        let json = r#"{
            "id": "m-1",
            "title": "Sunset",
            "file-name": "sunset.jpg",
            "thumbnail-url": "/thumbs/sunset.jpg",
            "uploaded-at": "2024-11-02T10:00:00Z",
            "alt-text": null,
            "edit-token": "tok-1"
        }"#;
        let item: MediaItem = serde_json::from_str(json).expect("media item should parse");
        assert_eq!(item.alt_text, "");
        assert!(item.is_editable());
    }

    #[test]
    fn test_media_item_missing_alt_text_key_defaults_to_empty() {
        let json = r#"{
            "id": "m-3",
            "title": "Pier",
            "file-name": "pier.jpg",
            "thumbnail-url": "/thumbs/pier.jpg",
            "uploaded-at": "2024-11-04T12:00:00Z"
        }"#;
        let item: MediaItem = serde_json::from_str(json).expect("media item should parse");
        assert_eq!(item.alt_text, "");
    }

    #[test]
    fn test_media_item_missing_edit_token_is_read_only() {
        let json = r#"{
            "id": "m-2",
            "title": "Harbor",
            "file-name": "harbor.png",
            "thumbnail-url": "/thumbs/harbor.png",
            "uploaded-at": "2024-11-03T09:30:00Z",
            "alt-text": "a harbor at dawn"
        }"#;
        let item: MediaItem = serde_json::from_str(json).expect("media item should parse");
        assert!(!item.is_editable());
        assert_eq!(item.alt_text, "a harbor at dawn");
    }
}
