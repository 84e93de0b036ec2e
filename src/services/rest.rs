use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

use super::provider::{DataProvider, ProviderError, CHANGE_FEED_CAPACITY};
use crate::models::{ChangeEvent, MatchRecord, NewSwipe, Profile, ProfileCard, ProfileId, Swipe};

/// Table names in the hosted backend
#[derive(Debug, Clone)]
pub struct RestTables {
    pub profiles: String,
    pub swipes: String,
    pub matches: String,
}

impl Default for RestTables {
    fn default() -> Self {
        Self {
            profiles: "profiles".to_string(),
            swipes: "swipes".to_string(),
            matches: "matches".to_string(),
        }
    }
}

/// Client for a hosted PostgREST-style backend
///
/// Handles all communication with the hosted database:
/// - Resolving profiles and fetching feed candidates
/// - Inserting swipes and checking reciprocity
/// - Materializing and listing matches
///
/// The hosted realtime socket is not consumed; the change feed only carries
/// writes made through this instance.
pub struct RestProvider {
    base_url: String,
    api_key: String,
    client: Client,
    tables: RestTables,
    changes: broadcast::Sender<ChangeEvent>,
}

impl RestProvider {
    pub fn new(
        base_url: String,
        api_key: String,
        tables: RestTables,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);

        Ok(Self {
            base_url,
            api_key,
            client,
            tables,
            changes,
        })
    }

    /// Build `<base>/rest/v1/<table>?k=v&...` with encoded filter values
    fn table_url(&self, table: &str, params: &[(&str, String)]) -> String {
        let mut url = format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table);
        if !params.is_empty() {
            let query = params
                .iter()
                .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, ProviderError> {
        let url = self.table_url(table, params);
        tracing::debug!("GET {}", url);

        let response = self.authorized(self.client.get(&url)).send().await?;
        parse_rows(response, table).await
    }

    async fn post_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        params: &[(&str, String)],
        prefer: &str,
        body: &Value,
    ) -> Result<Vec<T>, ProviderError> {
        let url = self.table_url(table, params);
        tracing::debug!("POST {}", url);

        let response = self
            .authorized(self.client.post(&url))
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await?;
        parse_rows(response, table).await
    }

    fn publish(&self, event: ChangeEvent) {
        let _ = self.changes.send(event);
    }
}

async fn parse_rows<T: DeserializeOwned>(response: Response, table: &str) -> Result<Vec<T>, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
        tracing::error!("Request on {} failed: {} - {}", table, status, body);
        return Err(ProviderError::Api(format!("{} request failed: {}", table, status)));
    }

    let json: Value = response.json().await?;
    serde_json::from_value(json)
        .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse {} rows: {}", table, e)))
}

fn id_list(ids: &[ProfileId]) -> String {
    let joined = ids.iter().map(Uuid::to_string).collect::<Vec<_>>().join(",");
    format!("({})", joined)
}

#[derive(serde::Deserialize)]
struct IdRow {
    id: ProfileId,
}

#[derive(serde::Deserialize)]
struct SwipedRow {
    swiped_id: ProfileId,
}

#[async_trait]
impl DataProvider for RestProvider {
    async fn profile_id_for_user(&self, user_id: Uuid) -> Result<Option<ProfileId>, ProviderError> {
        let rows: Vec<IdRow> = self
            .get_rows(
                &self.tables.profiles,
                &[("select", "id".into()), ("user_id", format!("eq.{}", user_id))],
            )
            .await?;

        // Anything but exactly one row means no usable profile
        match rows.as_slice() {
            [row] => Ok(Some(row.id)),
            [] => Ok(None),
            _ => {
                tracing::warn!("User {} owns {} profile rows, treating as none", user_id, rows.len());
                Ok(None)
            }
        }
    }

    async fn swiped_ids(&self, swiper_id: ProfileId) -> Result<Vec<ProfileId>, ProviderError> {
        let rows: Vec<SwipedRow> = self
            .get_rows(
                &self.tables.swipes,
                &[("select", "swiped_id".into()), ("swiper_id", format!("eq.{}", swiper_id))],
            )
            .await?;

        Ok(rows.into_iter().map(|r| r.swiped_id).collect())
    }

    async fn fetch_profiles(
        &self,
        exclude: &[ProfileId],
        limit: usize,
    ) -> Result<Vec<Profile>, ProviderError> {
        let mut params = vec![("select", "*".to_string()), ("limit", limit.to_string())];
        if !exclude.is_empty() {
            params.push(("id", format!("not.in.{}", id_list(exclude))));
        }

        let profiles: Vec<Profile> = self.get_rows(&self.tables.profiles, &params).await?;
        tracing::debug!("Fetched {} feed candidates", profiles.len());

        Ok(profiles)
    }

    async fn insert_swipe(&self, swipe: &NewSwipe) -> Result<Swipe, ProviderError> {
        let body = json!({
            "swiper_id": swipe.swiper_id,
            "swiped_id": swipe.swiped_id,
            "is_like": swipe.is_like,
        });

        let rows: Vec<Swipe> = self
            .post_rows(&self.tables.swipes, &[], "return=representation", &body)
            .await?;
        let record = rows
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("Insert returned no swipe row".into()))?;

        self.publish(ChangeEvent::SwipeInserted {
            swiper_id: record.swiper_id,
            swiped_id: record.swiped_id,
            is_like: record.is_like,
        });
        Ok(record)
    }

    async fn query_reciprocal_swipe(
        &self,
        swiper_id: ProfileId,
        swiped_id: ProfileId,
    ) -> Result<Option<Swipe>, ProviderError> {
        let rows: Vec<Swipe> = self
            .get_rows(
                &self.tables.swipes,
                &[
                    ("select", "*".into()),
                    ("swiper_id", format!("eq.{}", swiped_id)),
                    ("swiped_id", format!("eq.{}", swiper_id)),
                    ("is_like", "eq.true".into()),
                    ("limit", "1".into()),
                ],
            )
            .await?;

        Ok(rows.into_iter().next())
    }

    async fn upsert_match(&self, a: ProfileId, b: ProfileId) -> Result<MatchRecord, ProviderError> {
        let (user1_id, user2_id) = MatchRecord::ordered_pair(a, b);
        let body = json!({ "user1_id": user1_id, "user2_id": user2_id });

        let inserted: Vec<MatchRecord> = self
            .post_rows(
                &self.tables.matches,
                &[("on_conflict", "user1_id,user2_id".into())],
                "resolution=ignore-duplicates,return=representation",
                &body,
            )
            .await?;

        if let Some(record) = inserted.into_iter().next() {
            self.publish(ChangeEvent::MatchCreated { user1_id, user2_id });
            return Ok(record);
        }

        let existing: Vec<MatchRecord> = self
            .get_rows(
                &self.tables.matches,
                &[
                    ("select", "*".into()),
                    ("user1_id", format!("eq.{}", user1_id)),
                    ("user2_id", format!("eq.{}", user2_id)),
                ],
            )
            .await?;

        existing
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::NotFound(format!("Match {} / {}", user1_id, user2_id)))
    }

    async fn fetch_matches(&self, profile_id: ProfileId) -> Result<Vec<MatchRecord>, ProviderError> {
        self.get_rows(
            &self.tables.matches,
            &[
                ("select", "id,user1_id,user2_id,created_at".into()),
                ("or", format!("(user1_id.eq.{0},user2_id.eq.{0})", profile_id)),
                ("order", "created_at.desc".into()),
            ],
        )
        .await
    }

    async fn profile_cards(&self, ids: &[ProfileId]) -> Result<Vec<ProfileCard>, ProviderError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.get_rows(
            &self.tables.profiles,
            &[
                ("select", "id,display_name,profile_image_url,age,bio".into()),
                ("id", format!("in.{}", id_list(ids))),
            ],
        )
        .await
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.changes.subscribe()
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = self.table_url(&self.tables.profiles, &[("select", "id".into()), ("limit", "1".into())]);
        let response = self.authorized(self.client.get(&url)).send().await?;
        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn provider(base_url: String) -> RestProvider {
        RestProvider::new(base_url, "anon_key".to_string(), RestTables::default(), Duration::from_secs(5))
            .unwrap()
    }

    #[test]
    fn test_table_url_encodes_filters() {
        let provider = provider("https://backend.test/".to_string());
        let url = provider.table_url("profiles", &[("id", "not.in.(a,b)".into())]);
        assert_eq!(url, "https://backend.test/rest/v1/profiles?id=not.in.%28a%2Cb%29");
    }

    #[tokio::test]
    async fn test_profile_id_lookup() {
        let mut server = mockito::Server::new_async().await;
        let id = Uuid::new_v4();
        let mock = server
            .mock("GET", "/rest/v1/profiles")
            .match_query(Matcher::Any)
            .match_header("apikey", "anon_key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"[{{"id":"{}"}}]"#, id))
            .create_async()
            .await;

        let result = provider(server.url()).profile_id_for_user(Uuid::new_v4()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, Some(id));
    }

    #[tokio::test]
    async fn test_profile_id_lookup_requires_single_row() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/rest/v1/profiles")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(format!(r#"[{{"id":"{}"}},{{"id":"{}"}}]"#, Uuid::new_v4(), Uuid::new_v4()))
            .create_async()
            .await;

        let result = provider(server.url()).profile_id_for_user(Uuid::new_v4()).await.unwrap();
        assert_eq!(result, None);
    }

    #[tokio::test]
    async fn test_insert_swipe_error_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/rest/v1/swipes")
            .with_status(409)
            .with_body(r#"{"message":"conflict"}"#)
            .create_async()
            .await;

        let swipe = NewSwipe {
            swiper_id: Uuid::new_v4(),
            swiped_id: Uuid::new_v4(),
            is_like: true,
        };
        let result = provider(server.url()).insert_swipe(&swipe).await;

        assert!(matches!(result, Err(ProviderError::Api(_))));
    }
}
