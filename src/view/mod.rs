//! Page logic for the notes list and the note editor.
//!
//! Both are small state machines: `Unauthenticated` when the session has no
//! token, `Loading` while a fetch is in flight, `Ready` once it settled.
//! `Loading` only exists inside `refresh`/`load`, which hold the view mutably,
//! so a caller always sees one of the settled states afterwards.
//! Mutations never patch local state; they are followed by a full refetch.
//! A failed refetch after a successful mutation is kept in `error()` and does
//! not turn the mutation into a failure.

use crate::error::ClientError;
use crate::notes::{NewNote, Note, NotePatch, Notes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Unauthenticated,
    Loading,
    Ready,
}

/// The home page: searchable list of the user's notes.
#[derive(Debug, Clone)]
pub struct NoteBoard {
    state: ViewState,
    query: String,
    notes: Vec<Note>,
    error: Option<String>,
}

impl Default for NoteBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteBoard {
    pub fn new() -> Self {
        Self {
            state: ViewState::Unauthenticated,
            query: String::new(),
            notes: Vec::new(),
            error: None,
        }
    }

    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::new()
        }
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Refetch the list. Signed out, the board empties without any request.
    pub async fn refresh(&mut self, notes: &Notes<'_>) -> Result<(), ClientError> {
        if !notes.is_authenticated() {
            self.state = ViewState::Unauthenticated;
            self.notes.clear();
            self.error = None;
            return Ok(());
        }

        self.state = ViewState::Loading;
        self.error = None;
        let result = notes.list(Some(self.query.as_str())).await;
        self.state = ViewState::Ready;

        match result {
            Ok(list) => {
                self.notes = list;
                Ok(())
            }
            Err(e) => {
                self.notes.clear();
                self.error = Some(e.message());
                Err(e)
            }
        }
    }

    /// Create a note, then reload the list.
    pub async fn create(
        &mut self,
        notes: &Notes<'_>,
        title: &str,
        content: &str,
    ) -> Result<Note, ClientError> {
        let created = notes
            .create(&NewNote::new(title, content))
            .await
            .inspect_err(|e| self.error = Some(e.message()))?;
        self.refetch_after_mutation(notes).await;
        Ok(created)
    }

    /// Delete a note, then reload the list.
    pub async fn delete(&mut self, notes: &Notes<'_>, note_id: &str) -> Result<(), ClientError> {
        notes
            .delete(note_id)
            .await
            .inspect_err(|e| self.error = Some(e.message()))?;
        self.refetch_after_mutation(notes).await;
        Ok(())
    }

    async fn refetch_after_mutation(&mut self, notes: &Notes<'_>) {
        if let Err(e) = self.refresh(notes).await {
            tracing::warn!("Note list refetch failed after a change: {e}");
        }
    }
}

/// The edit page for a single note.
#[derive(Debug, Clone)]
pub struct NoteEditor {
    note_id: String,
    state: ViewState,
    note: Option<Note>,
    error: Option<String>,
    load_status: Option<u16>,
}

impl NoteEditor {
    pub fn new(note_id: impl Into<String>) -> Self {
        Self {
            note_id: note_id.into(),
            state: ViewState::Unauthenticated,
            note: None,
            error: None,
            load_status: None,
        }
    }

    pub fn note_id(&self) -> &str {
        &self.note_id
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn note(&self) -> Option<&Note> {
        self.note.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The editor has settled without a note to show.
    pub fn is_not_found(&self) -> bool {
        self.state == ViewState::Ready && self.note.is_none()
    }

    /// Fetch the note being edited.
    pub async fn load(&mut self, notes: &Notes<'_>) -> Result<(), ClientError> {
        if !notes.is_authenticated() {
            self.state = ViewState::Unauthenticated;
            self.note = None;
            return Err(ClientError::Unauthenticated);
        }

        self.state = ViewState::Loading;
        self.error = None;
        self.load_status = None;
        let result = notes.get(&self.note_id).await;
        self.state = ViewState::Ready;

        match result {
            Ok(note) => {
                self.note = Some(note);
                Ok(())
            }
            Err(e) => {
                self.note = None;
                self.error = Some(e.message());
                self.load_status = e.status();
                Err(e)
            }
        }
    }

    /// Save the loaded note with `title`/`content` replacing the current values.
    ///
    /// Both fields are sent. A blank resulting title is rejected locally.
    pub async fn save(
        &mut self,
        notes: &Notes<'_>,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<Note, ClientError> {
        let Some(current) = &self.note else {
            return Err(ClientError::NotLoaded {
                status: self.load_status,
                message: self
                    .error
                    .clone()
                    .unwrap_or_else(|| "Note not loaded".to_string()),
            });
        };

        let title = title.unwrap_or(&current.note_title);
        if title.trim().is_empty() {
            return Err(ClientError::EmptyTitle);
        }
        let content = content.unwrap_or(&current.note_content);
        let patch = NotePatch::default().title(title).content(content);

        let updated = notes
            .update(&self.note_id, &patch)
            .await
            .inspect_err(|e| self.error = Some(e.message()))?;
        self.note = Some(updated.clone());
        self.error = None;
        Ok(updated)
    }
}
