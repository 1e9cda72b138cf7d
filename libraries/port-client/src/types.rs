//! Types for Port API requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Default Port API base URL.
pub const DEFAULT_API_URL: &str = "https://api.getport.io";

/// Blueprint under which Port keeps user entities.
pub const USER_BLUEPRINT: &str = "_user";

/// Configuration for connecting to the Port API.
#[derive(Debug, Clone)]
pub struct PortConfig {
    /// Base URL of the API (e.g., "https://api.getport.io")
    pub url: String,
    /// Current access token (if authenticated)
    pub access_token: Option<String>,
}

impl PortConfig {
    /// Create a new config with just the URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: None,
        }
    }

    /// Create a config with an existing access token.
    pub fn with_token(url: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            access_token: Some(access_token.into()),
        }
    }
}

impl Default for PortConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Client credentials exchanged for a bearer token.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// A hint identifying the credentials without leaking them.
    ///
    /// Shows at most the first 8 characters of the client id; the secret
    /// never appears.
    pub fn hint(&self) -> String {
        if self.client_id.chars().count() > 8 {
            let prefix: String = self.client_id.chars().take(8).collect();
            format!("{}...", prefix)
        } else if self.client_id.is_empty() {
            "[not set]".to_string()
        } else {
            "[redacted]".to_string()
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.hint())
            .field("client_secret", &"***")
            .finish()
    }
}

// =============================================================================
// Authentication Types
// =============================================================================

/// Request body for the access token endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AccessTokenRequest<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

/// Response from the access token endpoint.
///
/// Port answers with `accessToken`; `access_token` is accepted as well.
/// Each spelling is its own field so a body carrying both still parses.
#[derive(Debug, Deserialize)]
pub struct AccessTokenResponse {
    #[serde(rename = "accessToken", default)]
    access_token_camel: Option<String>,
    #[serde(rename = "access_token", default)]
    access_token_snake: Option<String>,
    /// Token validity in seconds
    #[serde(rename = "expiresIn", alias = "expires_in", default)]
    pub expires_in: Option<u64>,
}

impl AccessTokenResponse {
    /// The first non-empty token, preferring `accessToken`.
    pub fn into_token(self) -> Option<String> {
        self.access_token_camel
            .filter(|t| !t.is_empty())
            .or(self.access_token_snake.filter(|t| !t.is_empty()))
    }
}

// =============================================================================
// Entity Types
// =============================================================================

/// A catalog entity as returned by Port.
///
/// Fields the client does not model are kept in `extra` so that
/// serializing an entity reproduces what the API returned.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entity {
    /// Display name: the title, or the identifier when there is none.
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .unwrap_or(&self.identifier)
    }

    /// Look up a field under `properties`, falling back to the entity root.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.properties
            .as_ref()
            .and_then(|p| p.get(name))
            .filter(|v| !v.is_null())
            .or_else(|| self.extra.get(name).filter(|v| !v.is_null()))
    }
}

/// One page of an entity listing.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum EntityListResponse {
    Bare(Vec<Entity>),
    Page {
        #[serde(default)]
        entities: Vec<Entity>,
        #[serde(default)]
        next: Option<String>,
    },
}

impl EntityListResponse {
    pub(crate) fn into_parts(self) -> (Vec<Entity>, Option<String>) {
        match self {
            Self::Bare(entities) => (entities, None),
            Self::Page { entities, next } => (entities, next.filter(|n| !n.is_empty())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hint_truncates_long_client_id() {
        let creds = Credentials::new("abcdefghijklmnop", "secret");
        assert_eq!(creds.hint(), "abcdefgh...");
    }

    #[test]
    fn test_hint_hides_short_client_id() {
        assert_eq!(Credentials::new("abc", "s").hint(), "[redacted]");
        assert_eq!(Credentials::new("", "s").hint(), "[not set]");
    }

    #[test]
    fn test_debug_never_prints_secret() {
        let creds = Credentials::new("client-id-1234", "super-secret-value");
        let debug = format!("{:?}", creds);
        assert!(!debug.contains("super-secret-value"));
        assert!(!debug.contains("client-id-1234"));
    }

    #[test]
    fn test_entity_keeps_unknown_fields() {
        let raw = json!({
            "identifier": "jane@example.com",
            "title": "Jane",
            "blueprint": "_user",
            "properties": {"status": "Inactive"},
            "updatedAt": "2024-01-01T00:00:00.000Z",
            "team": ["platform"]
        });

        let entity: Entity = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(entity.extra.get("blueprint"), Some(&json!("_user")));
        assert_eq!(serde_json::to_value(&entity).unwrap(), raw);
    }

    #[test]
    fn test_field_prefers_properties() {
        let entity: Entity = serde_json::from_value(json!({
            "identifier": "u1",
            "status": "active",
            "properties": {"status": "disabled"}
        }))
        .unwrap();
        assert_eq!(entity.field("status"), Some(&json!("disabled")));

        let root_only: Entity = serde_json::from_value(json!({
            "identifier": "u2",
            "status": "inactive",
            "properties": {"status": null}
        }))
        .unwrap();
        assert_eq!(root_only.field("status"), Some(&json!("inactive")));
    }

    #[test]
    fn test_display_name_falls_back_to_identifier() {
        let entity: Entity =
            serde_json::from_value(json!({"identifier": "u1", "title": null})).unwrap();
        assert_eq!(entity.display_name(), "u1");
    }

    #[test]
    fn test_list_response_shapes() {
        let bare: EntityListResponse =
            serde_json::from_value(json!([{"identifier": "a"}])).unwrap();
        let (entities, next) = bare.into_parts();
        assert_eq!(entities.len(), 1);
        assert!(next.is_none());

        let page: EntityListResponse = serde_json::from_value(json!({
            "ok": true,
            "entities": [{"identifier": "a"}, {"identifier": "b"}],
            "next": ""
        }))
        .unwrap();
        let (entities, next) = page.into_parts();
        assert_eq!(entities.len(), 2);
        assert!(next.is_none());
    }

    #[test]
    fn test_token_response_with_both_spellings() {
        let both: AccessTokenResponse =
            serde_json::from_value(json!({"accessToken": "camel", "access_token": "snake"}))
                .unwrap();
        assert_eq!(both.into_token().as_deref(), Some("camel"));

        let empty_camel: AccessTokenResponse =
            serde_json::from_value(json!({"accessToken": "", "access_token": "snake"})).unwrap();
        assert_eq!(empty_camel.into_token().as_deref(), Some("snake"));

        let none: AccessTokenResponse = serde_json::from_value(json!({"ok": true})).unwrap();
        assert!(none.into_token().is_none());
    }
}
