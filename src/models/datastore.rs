//! Owners document, the shape held in local storage and on the remote mirror.

use serde::{Deserialize, Serialize};

use super::BusinessOwner;

/// The root document containing every registered owner.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnersDocument {
    #[serde(default)]
    pub owners: Vec<BusinessOwner>,
}

impl OwnersDocument {
    pub fn new(owners: Vec<BusinessOwner>) -> Self {
        Self { owners }
    }
}

/// Request body accepted by the mirror endpoint.
///
/// Older clients post the bare owners array instead of the wrapped document.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MirrorPayload {
    Bare(Vec<BusinessOwner>),
    Document(OwnersDocument),
}

impl From<MirrorPayload> for OwnersDocument {
    fn from(payload: MirrorPayload) -> Self {
        match payload {
            MirrorPayload::Bare(owners) => OwnersDocument { owners },
            MirrorPayload::Document(document) => document,
        }
    }
}

/// Acknowledgement returned after the mirror file is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReceipt {
    pub owner_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_owners_field() {
        let doc: OwnersDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.owners.is_empty());
    }

    #[test]
    fn test_payload_accepts_both_shapes() {
        let bare: MirrorPayload = serde_json::from_str("[]").unwrap();
        assert!(OwnersDocument::from(bare).owners.is_empty());

        let wrapped: MirrorPayload = serde_json::from_str(r#"{"owners":[]}"#).unwrap();
        assert!(OwnersDocument::from(wrapped).owners.is_empty());
    }
}
