//! Note CRUD against the remote API.
//!
//! Every call goes through [`SessionStore::authenticated_call`], so nothing is
//! sent without a token. HTTP errors that carry no server detail get a
//! per-operation fallback message.

mod types;

pub use types::{NewNote, Note, NotePatch};

use crate::error::ClientError;
use crate::http::{ApiClient, RequestOptions};
use crate::session::SessionStore;

const NOTES_PATH: &str = "/notes";

fn note_path(note_id: &str) -> String {
    format!("{NOTES_PATH}/{}", urlencoding::encode(note_id))
}

/// Note operations bound to a client and a session.
#[derive(Debug, Clone, Copy)]
pub struct Notes<'a> {
    client: &'a ApiClient,
    session: &'a SessionStore,
}

impl<'a> Notes<'a> {
    pub fn new(client: &'a ApiClient, session: &'a SessionStore) -> Self {
        Self { client, session }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    /// All notes, in server order. A blank `query` is not sent.
    pub async fn list(&self, query: Option<&str>) -> Result<Vec<Note>, ClientError> {
        let client = self.client;
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);

        self.session
            .authenticated_call(|token| async move {
                let mut options = RequestOptions::authorized(&token);
                if let Some(q) = query {
                    options = options.query("q", q);
                }
                client.get(NOTES_PATH, options).await
            })
            .await
            .map_err(|e| e.with_fallback("Failed to fetch notes"))
    }

    pub async fn get(&self, note_id: &str) -> Result<Note, ClientError> {
        let client = self.client;
        let path = note_path(note_id);

        self.session
            .authenticated_call(|token| async move {
                client.get(&path, RequestOptions::authorized(&token)).await
            })
            .await
            .map_err(|e| e.with_fallback("Failed to fetch note"))
    }

    pub async fn create(&self, note: &NewNote) -> Result<Note, ClientError> {
        let client = self.client;

        let created: Note = self
            .session
            .authenticated_call(|token| async move {
                client
                    .post(NOTES_PATH, Some(note), RequestOptions::authorized(&token))
                    .await
            })
            .await
            .map_err(|e| e.with_fallback("Failed to create note"))?;

        tracing::debug!(note_id = %created.note_id, "Created note");
        Ok(created)
    }

    pub async fn update(&self, note_id: &str, patch: &NotePatch) -> Result<Note, ClientError> {
        let client = self.client;
        let path = note_path(note_id);

        self.session
            .authenticated_call(|token| async move {
                client
                    .put(&path, Some(patch), RequestOptions::authorized(&token))
                    .await
            })
            .await
            .map_err(|e| e.with_fallback("Failed to update note"))
    }

    pub async fn delete(&self, note_id: &str) -> Result<(), ClientError> {
        let client = self.client;
        let path = note_path(note_id);

        self.session
            .authenticated_call(|token| async move {
                client.delete(&path, RequestOptions::authorized(&token)).await
            })
            .await
            .map_err(|e| e.with_fallback("Failed to delete note"))?;

        tracing::debug!(note_id, "Deleted note");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn note_json(id: &str, title: &str, content: &str) -> serde_json::Value {
        json!({
            "note_id": id,
            "note_title": title,
            "note_content": content,
            "created_on": "2024-03-01T09:30:00+00:00",
            "last_update": "2024-03-01T09:30:00+00:00"
        })
    }

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn note_ids_are_path_encoded() {
        assert_eq!(note_path("abc-123"), "/notes/abc-123");
        assert_eq!(note_path("a/b c"), "/notes/a%2Fb%20c");
    }

    #[tokio::test]
    async fn every_operation_fails_closed_without_token() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let session = SessionStore::new(None);
        let notes = Notes::new(&client, &session);

        assert!(notes.list(None).await.unwrap_err().is_unauthenticated());
        assert!(notes.get("n1").await.unwrap_err().is_unauthenticated());
        assert!(notes
            .create(&NewNote::new("t", "c"))
            .await
            .unwrap_err()
            .is_unauthenticated());
        assert!(notes
            .update("n1", &NotePatch::default().title("t"))
            .await
            .unwrap_err()
            .is_unauthenticated());
        assert!(notes.delete("n1").await.unwrap_err().is_unauthenticated());
    }

    #[tokio::test]
    async fn list_sends_bearer_and_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notes"))
            .and(query_param("q", "milk"))
            .and(header("Authorization", "Bearer tok"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([note_json("n1", "Groceries", "Milk, eggs")])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let session = SessionStore::new(Some("tok".into()));
        let listed = Notes::new(&client, &session).list(Some(" milk ")).await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].note_id, "n1");
    }

    #[tokio::test]
    async fn list_preserves_server_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                note_json("b", "Second", ""),
                note_json("a", "First", ""),
            ])))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let session = SessionStore::new(Some("tok".into()));
        let listed = Notes::new(&client, &session).list(Some("")).await.unwrap();

        let ids: Vec<&str> = listed.iter().map(|n| n.note_id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[tokio::test]
    async fn create_posts_title_and_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/notes"))
            .and(header("Authorization", "Bearer tok"))
            .and(body_json(json!({"note_title": "Groceries", "note_content": "Milk, eggs"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(note_json("n9", "Groceries", "Milk, eggs")),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let session = SessionStore::new(Some("tok".into()));
        let created = Notes::new(&client, &session)
            .create(&NewNote::new("Groceries", "Milk, eggs"))
            .await
            .unwrap();
        assert_eq!(created.note_id, "n9");
    }

    #[tokio::test]
    async fn update_sends_only_changed_fields() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/notes/n1"))
            .and(body_json(json!({"note_content": "Milk, eggs, bread"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(note_json("n1", "Groceries", "Milk, eggs, bread")),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let session = SessionStore::new(Some("tok".into()));
        let updated = Notes::new(&client, &session)
            .update("n1", &NotePatch::default().content("Milk, eggs, bread"))
            .await
            .unwrap();
        assert_eq!(updated.note_content, "Milk, eggs, bread");
    }

    #[tokio::test]
    async fn get_missing_note_surfaces_server_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/notes/ghost"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"detail": "Note not found"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let session = SessionStore::new(Some("tok".into()));
        let err = Notes::new(&client, &session).get("ghost").await.unwrap_err();
        assert_eq!(err.message(), "Note not found");
    }

    #[tokio::test]
    async fn delete_missing_note_without_detail_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/notes/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let session = SessionStore::new(Some("tok".into()));
        let err = Notes::new(&client, &session).delete("ghost").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.message(), "Failed to delete note");
    }
}
