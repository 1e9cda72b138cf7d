//! Entity listing and deletion for a single blueprint.

use crate::error::{PortClientError, Result};
use crate::types::{Entity, EntityListResponse};
use reqwest::{Client, Response};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Query parameter carrying the pagination cursor.
const CURSOR_PARAM: &str = "from";

/// Entity client for one Port blueprint.
pub struct EntityClient<'a> {
    http: &'a Client,
    base_url: &'a str,
    access_token: &'a str,
    blueprint: &'a str,
}

impl<'a> EntityClient<'a> {
    pub(crate) fn new(
        http: &'a Client,
        base_url: &'a str,
        access_token: &'a str,
        blueprint: &'a str,
    ) -> Self {
        Self {
            http,
            base_url,
            access_token,
            blueprint,
        }
    }

    fn collection_url(&self) -> String {
        format!(
            "{}/v1/blueprints/{}/entities",
            self.base_url,
            urlencoding::encode(self.blueprint)
        )
    }

    /// URL of a single entity, with the identifier encoded as one path segment.
    pub fn entity_url(&self, identifier: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(),
            urlencoding::encode(identifier)
        )
    }

    /// Fetch every entity of the blueprint, following pagination cursors
    /// until the API stops returning one.
    pub async fn list_entities(&self) -> Result<Vec<Entity>> {
        let mut entities = Vec::new();
        let mut cursor: Option<String> = None;
        let mut seen_cursors = HashSet::new();
        let mut pages = 0usize;

        loop {
            let (page, next) = self.list_page(cursor.as_deref()).await?;
            pages += 1;
            entities.extend(page);

            match next {
                None => break,
                Some(next) if !seen_cursors.insert(next.clone()) => {
                    warn!(
                        blueprint = %self.blueprint,
                        cursor = %next,
                        "Pagination cursor repeated, stopping"
                    );
                    break;
                }
                Some(next) => cursor = Some(next),
            }
        }

        debug!(
            blueprint = %self.blueprint,
            entities = entities.len(),
            pages,
            "Fetched entities"
        );

        Ok(entities)
    }

    /// Fetch a single page. Returns the entities and the cursor of the next
    /// page, if any.
    pub async fn list_page(&self, cursor: Option<&str>) -> Result<(Vec<Entity>, Option<String>)> {
        let url = self.collection_url();
        debug!(url = %url, cursor = ?cursor, "Fetching entity page");

        let mut request = self.http.get(&url).bearer_auth(self.access_token);
        if let Some(cursor) = cursor {
            request = request.query(&[(CURSOR_PARAM, cursor)]);
        }

        let response = request.send().await.map_err(PortClientError::from_send)?;
        let status = response.status();

        if status.is_success() {
            let page: EntityListResponse = response.json().await.map_err(|e| {
                PortClientError::ParseError(format!("Failed to parse entity list: {}", e))
            })?;

            Ok(page.into_parts())
        } else {
            Err(error_from_response(response).await)
        }
    }

    /// Delete one entity by identifier.
    pub async fn delete_entity(&self, identifier: &str) -> Result<()> {
        let url = self.entity_url(identifier);
        debug!(url = %url, identifier = %identifier, "Deleting entity");

        let response = self
            .http
            .delete(&url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(PortClientError::from_send)?;

        if response.status().is_success() {
            debug!(identifier = %identifier, "Entity deleted");
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}

async fn error_from_response(response: Response) -> PortClientError {
    let status = response.status();
    let url = response.url().to_string();
    let error_text = response.text().await.unwrap_or_default();

    match status.as_u16() {
        401 => PortClientError::AuthRequired,
        422 => PortClientError::InvalidRequest {
            url,
            message: error_text,
        },
        code => PortClientError::ServerError {
            status: code,
            message: format!("{} (request URL: {})", error_text, url),
        },
    }
}
