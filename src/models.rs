// src/models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A credential record as held by the remote store.
///
/// `encoded_secret` travels as `encryptedPassword` on the wire and is never
/// the plaintext.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: u64,
    pub category: String,
    pub app: String,
    pub user_name: String,
    #[serde(rename = "encryptedPassword")]
    pub encoded_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Payload for a record that has not been stored yet.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewCredential {
    pub category: String,
    pub app: String,
    pub user_name: String,
    #[serde(rename = "encryptedPassword")]
    pub encoded_secret: String,
}

/// Partial replacement sent on update. Absent fields are left out of the body.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CredentialPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(
        rename = "encryptedPassword",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub encoded_secret: Option<String>,
}

impl From<NewCredential> for CredentialPatch {
    fn from(data: NewCredential) -> Self {
        CredentialPatch {
            category: Some(data.category),
            app: Some(data.app),
            user_name: Some(data.user_name),
            encoded_secret: Some(data.encoded_secret),
        }
    }
}

// Request bodies. Timestamps are stamped by the repository at send time.

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateBody<'a> {
    #[serde(flatten)]
    pub data: &'a NewCredential,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateBody<'a> {
    #[serde(flatten)]
    pub patch: &'a CredentialPatch,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_credential_uses_wire_field_names() {
        let json = r#"{
            "id": 7,
            "category": "Email",
            "app": "Mail",
            "userName": "a@x.com",
            "encryptedPassword": "aHVudGVyMg==",
            "createdAt": "2024-03-01T10:00:00.000Z"
        }"#;
        let credential: Credential = serde_json::from_str(json).unwrap();
        assert_eq!(credential.id, 7);
        assert_eq!(credential.user_name, "a@x.com");
        assert_eq!(credential.encoded_secret, "aHVudGVyMg==");
        assert_eq!(
            credential.created_at,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
        assert!(credential.updated_at.is_none());
    }

    #[test]
    fn test_update_body_omits_absent_fields() {
        let patch = CredentialPatch {
            app: Some("VPN".to_string()),
            ..CredentialPatch::default()
        };
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let value = serde_json::to_value(UpdateBody { patch: &patch, updated_at: now }).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["app"], "VPN");
        assert!(object.contains_key("updatedAt"));
    }

    #[test]
    fn test_create_body_carries_both_timestamps() {
        let data = NewCredential {
            category: "Work".to_string(),
            app: "VPN".to_string(),
            user_name: "a@x.com".to_string(),
            encoded_secret: "c2VjcmV0MQ==".to_string(),
        };
        let now = Utc::now();
        let value = serde_json::to_value(CreateBody { data: &data, created_at: now, updated_at: now }).unwrap();
        assert_eq!(value["encryptedPassword"], "c2VjcmV0MQ==");
        assert_eq!(value["createdAt"], value["updatedAt"]);
        assert!(value.get("id").is_none());
    }
}
