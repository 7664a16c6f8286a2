//! Conversation state store.
//!
//! Tracks zero-or-one active conversation plus the user's conversation
//! list, and mediates between user input, the AI service, and persistence.
//! Persistence and title generation go through the injected [`ChatBackend`],
//! so the store itself never touches the database or the network.
//!
//! A conversation moves through three states:
//!
//! ```text
//! NONE --start_new--> UNSAVED --commit_initial--> SAVED
//! ```
//!
//! The `saved` flag is monotonic. An `UNSAVED` conversation takes
//! `append_turn` (in-memory only); a `SAVED` one takes `persist_turn`
//! (in-memory append plus an incremental write). A failed `commit_initial`
//! leaves the conversation `UNSAVED`; the caller must re-invoke.
//!
//! Mutations lock the inner state only for the duration of the edit; no
//! lock is held across an await, so concurrent async operations interleave
//! last-write-wins on the flags.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::models::chat::{AiMessage, MessageRole};

/// Reason code for an expected store failure. The store never panics for
/// these; callers handle both variants of the returned `Result`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("not authenticated")]
    Unauthenticated,
    #[error("not found")]
    NotFound,
    #[error("backend failure: {0}")]
    Backend(String),
}

/// One message in a conversation, tagged with its speaker role.
/// Turns are append-only; they are never removed or reordered.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    fn new(message: AiMessage) -> Self {
        Turn {
            id: Uuid::new_v4(),
            role: message.role,
            content: message.content,
            created_at: Utc::now(),
        }
    }
}

/// A titled, ordered sequence of turns. `saved` flips to true exactly once,
/// on the first successful [`ChatStore::commit_initial`].
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: Uuid,
    pub title: String,
    pub saved: bool,
    pub turns: Vec<Turn>,
}

/// Navigation entry for one conversation, most recent first in the list.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSummary {
    pub id: Uuid,
    pub title: String,
}

/// Outcome of [`ChatStore::commit_initial`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The conversation was persisted; carries the id assigned by the
    /// persistence layer.
    Committed(Uuid),
    /// Nothing to do: no active conversation, already saved, or fewer
    /// than two turns. Logged, never an error.
    Skipped,
}

/// Persistence/AI seam consumed by the store. The production implementation
/// wraps the chat queries and the LLM client; tests script their own.
#[async_trait]
pub trait ChatBackend: Send + Sync + 'static {
    async fn fetch_chats(&self) -> Result<Vec<ChatSummary>, StoreError>;
    async fn fetch_chat(&self, id: Uuid) -> Result<Conversation, StoreError>;
    /// Persists a new conversation and returns the id the persistence
    /// layer assigned to it.
    async fn create_chat(&self, title: &str, turns: &[Turn]) -> Result<Uuid, StoreError>;
    async fn append_message(&self, chat_id: Uuid, message: AiMessage) -> Result<(), StoreError>;
    async fn generate_title(&self, input: &str) -> Result<String, StoreError>;
}

#[derive(Debug, Default)]
struct StoreState {
    chats: Vec<ChatSummary>,
    current: Option<Conversation>,
    is_loading_chats: bool,
    is_loading_chat: bool,
    load_chat_error: bool,
}

const PLACEHOLDER_TITLE: &str = "New chat";

/// The conversation state store. Cheap to clone; clones share state.
pub struct ChatStore<B: ChatBackend> {
    backend: Arc<B>,
    state: Arc<Mutex<StoreState>>,
}

impl<B: ChatBackend> Clone for ChatStore<B> {
    fn clone(&self) -> Self {
        ChatStore {
            backend: Arc::clone(&self.backend),
            state: Arc::clone(&self.state),
        }
    }
}

impl<B: ChatBackend> ChatStore<B> {
    pub fn new(backend: B) -> Self {
        ChatStore {
            backend: Arc::new(backend),
            state: Arc::new(Mutex::new(StoreState::default())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        // Mutations are short and never hold the lock across an await,
        // so a poisoned lock can only come from a panic mid-edit.
        self.state.lock().expect("chat store lock poisoned")
    }

    /// Fetches the user's conversation summaries. On failure the previous
    /// list is left untouched.
    pub async fn load_all(&self) -> Result<(), StoreError> {
        self.lock().is_loading_chats = true;

        let result = self.backend.fetch_chats().await;

        let mut state = self.lock();
        state.is_loading_chats = false;
        match result {
            Ok(chats) => {
                state.chats = chats;
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load chats: {e}");
                Err(e)
            }
        }
    }

    /// Fetches the full turn history of one conversation and makes it the
    /// active one. On failure the error flag is set and the previously
    /// active conversation is left as-is; no partial data is installed.
    pub async fn load_one(&self, id: Uuid) -> Result<(), StoreError> {
        self.lock().is_loading_chat = true;

        let result = self.backend.fetch_chat(id).await;

        let mut state = self.lock();
        state.is_loading_chat = false;
        match result {
            Ok(conversation) => {
                state.current = Some(conversation);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to load chat {id}: {e}");
                state.load_chat_error = true;
                Err(e)
            }
        }
    }

    /// Creates an in-memory conversation holding one requester turn, puts
    /// it at the front of the summary list, and kicks off asynchronous
    /// title generation. The returned handle resolves when the title task
    /// finishes; callers may await it or drop it.
    ///
    /// A title that resolves after the conversation has left the summary
    /// list is dropped silently.
    pub fn start_new(&self, input: &str) -> (Uuid, JoinHandle<()>) {
        let conversation = Conversation {
            id: Uuid::new_v4(),
            title: PLACEHOLDER_TITLE.to_string(),
            saved: false,
            turns: vec![Turn::new(AiMessage {
                role: MessageRole::User,
                content: input.to_string(),
            })],
        };
        let id = conversation.id;

        {
            let mut state = self.lock();
            state.chats.insert(
                0,
                ChatSummary {
                    id,
                    title: conversation.title.clone(),
                },
            );
            state.current = Some(conversation);
        }

        let store = self.clone();
        let input = input.to_string();
        let handle = tokio::spawn(async move {
            match store.backend.generate_title(&input).await {
                Ok(title) => store.apply_title(id, title),
                Err(e) => warn!("Title generation failed: {e}"),
            }
        });

        (id, handle)
    }

    /// Applies an asynchronously generated title, unless the conversation
    /// has been discarded from the summary list in the meantime.
    fn apply_title(&self, id: Uuid, title: String) {
        let mut state = self.lock();
        let Some(entry) = state.chats.iter_mut().find(|c| c.id == id) else {
            debug!("Dropping stale title for discarded chat {id}");
            return;
        };
        entry.title = title.clone();
        if let Some(current) = state.current.as_mut() {
            if current.id == id {
                current.title = title;
            }
        }
    }

    /// Appends a turn to the active conversation, in memory only. Used for
    /// turns not yet eligible for durable save (e.g. the assistant's first
    /// reply before the initial commit). No-op without an active
    /// conversation.
    pub fn append_turn(&self, message: AiMessage) {
        let mut state = self.lock();
        let Some(current) = state.current.as_mut() else {
            return;
        };
        current.turns.push(Turn::new(message));
        let (id, title) = (current.id, current.title.clone());
        if let Some(entry) = state.chats.iter_mut().find(|c| c.id == id) {
            entry.title = title;
        }
    }

    /// Appends a turn in memory and issues an asynchronous single-turn
    /// write to the persistence layer. The in-memory state is unaffected by
    /// the write's outcome; the caller may await the returned handle to
    /// observe it, or drop the handle for fire-and-forget.
    pub fn persist_turn(&self, message: AiMessage) -> JoinHandle<Result<(), StoreError>> {
        let chat_id = {
            let state = self.lock();
            state.current.as_ref().map(|c| c.id)
        };

        let Some(chat_id) = chat_id else {
            return tokio::spawn(async { Err::<(), _>(StoreError::NotFound) });
        };

        self.append_turn(message.clone());

        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            let result = backend.append_message(chat_id, message).await;
            if let Err(e) = &result {
                warn!("Failed to persist turn for chat {chat_id}: {e}");
            }
            result
        })
    }

    /// One-time transition from unsaved to saved. Skips (with a log line,
    /// not an error) when there is no active conversation, it is already
    /// saved, or it holds fewer than two turns. On success the provisional
    /// id is replaced with the one assigned by the persistence layer, both
    /// on the active conversation and on its summary entry.
    ///
    /// On backend failure the conversation stays unsaved and the caller
    /// may re-invoke; there is no automatic retry.
    pub async fn commit_initial(&self) -> Result<CommitOutcome, StoreError> {
        let snapshot = {
            let state = self.lock();
            match &state.current {
                None => {
                    info!("No active chat; skipping initial save");
                    return Ok(CommitOutcome::Skipped);
                }
                Some(c) if c.saved => {
                    info!("Chat {} already saved; skipping initial save", c.id);
                    return Ok(CommitOutcome::Skipped);
                }
                Some(c) if c.turns.len() < 2 => {
                    warn!("Chat {} has fewer than two turns; skipping initial save", c.id);
                    return Ok(CommitOutcome::Skipped);
                }
                Some(c) => c.clone(),
            }
        };

        let assigned_id = self
            .backend
            .create_chat(&snapshot.title, &snapshot.turns)
            .await?;

        let mut state = self.lock();
        if let Some(entry) = state.chats.iter_mut().find(|c| c.id == snapshot.id) {
            entry.id = assigned_id;
        }
        if let Some(current) = state.current.as_mut() {
            if current.id == snapshot.id {
                current.id = assigned_id;
                current.saved = true;
            }
        }
        info!("Committed chat {} as {assigned_id}", snapshot.id);
        Ok(CommitOutcome::Committed(assigned_id))
    }

    /// The active conversation's turns, in append order. Empty when no
    /// conversation is active.
    pub fn active_turns(&self) -> Vec<Turn> {
        self.lock()
            .current
            .as_ref()
            .map(|c| c.turns.clone())
            .unwrap_or_default()
    }

    /// Clears the active conversation (used when navigating to a fresh
    /// session). The summary list is kept.
    pub fn reset(&self) {
        self.lock().current = None;
    }

    pub fn active(&self) -> Option<Conversation> {
        self.lock().current.clone()
    }

    pub fn chats(&self) -> Vec<ChatSummary> {
        self.lock().chats.clone()
    }

    pub fn is_loading_chats(&self) -> bool {
        self.lock().is_loading_chats
    }

    pub fn is_loading_chat(&self) -> bool {
        self.lock().is_loading_chat
    }

    pub fn load_chat_error(&self) -> bool {
        self.lock().load_chat_error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::Semaphore;

    /// Scriptable backend: queued results per operation, plus a gate that
    /// holds title generation until the test releases it.
    struct MockBackend {
        chats: StdMutex<Vec<ChatSummary>>,
        fetch_chat_results: StdMutex<VecDeque<Result<Conversation, StoreError>>>,
        create_results: StdMutex<VecDeque<Result<Uuid, StoreError>>>,
        append_results: StdMutex<VecDeque<Result<(), StoreError>>>,
        appended: StdMutex<Vec<(Uuid, AiMessage)>>,
        created: StdMutex<Vec<String>>,
        title: StdMutex<Result<String, StoreError>>,
        title_gate: Semaphore,
    }

    impl MockBackend {
        fn new() -> Self {
            MockBackend {
                chats: StdMutex::new(vec![]),
                fetch_chat_results: StdMutex::new(VecDeque::new()),
                create_results: StdMutex::new(VecDeque::new()),
                append_results: StdMutex::new(VecDeque::new()),
                appended: StdMutex::new(vec![]),
                created: StdMutex::new(vec![]),
                title: StdMutex::new(Ok("Generated Title".to_string())),
                title_gate: Semaphore::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatBackend for Arc<MockBackend> {
        async fn fetch_chats(&self) -> Result<Vec<ChatSummary>, StoreError> {
            Ok(self.chats.lock().unwrap().clone())
        }

        async fn fetch_chat(&self, _id: Uuid) -> Result<Conversation, StoreError> {
            self.fetch_chat_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(StoreError::NotFound))
        }

        async fn create_chat(&self, title: &str, _turns: &[Turn]) -> Result<Uuid, StoreError> {
            self.created.lock().unwrap().push(title.to_string());
            self.create_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Uuid::new_v4()))
        }

        async fn append_message(
            &self,
            chat_id: Uuid,
            message: AiMessage,
        ) -> Result<(), StoreError> {
            self.appended.lock().unwrap().push((chat_id, message));
            self.append_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(()))
        }

        async fn generate_title(&self, _input: &str) -> Result<String, StoreError> {
            let permit = self.title_gate.acquire().await.unwrap();
            permit.forget();
            self.title.lock().unwrap().clone()
        }
    }

    fn store_with_mock() -> (ChatStore<Arc<MockBackend>>, Arc<MockBackend>) {
        let backend = Arc::new(MockBackend::new());
        (ChatStore::new(Arc::clone(&backend)), backend)
    }

    fn user_msg(content: &str) -> AiMessage {
        AiMessage {
            role: MessageRole::User,
            content: content.to_string(),
        }
    }

    fn assistant_msg(content: &str) -> AiMessage {
        AiMessage {
            role: MessageRole::Assistant,
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_start_new_creates_single_unsaved_conversation() {
        let (store, _backend) = store_with_mock();

        let (id, _title) = store.start_new("I want a job in data");

        let current = store.active().unwrap();
        assert_eq!(current.id, id);
        assert_eq!(current.title, "New chat");
        assert!(!current.saved);
        assert_eq!(current.turns.len(), 1);
        assert_eq!(current.turns[0].role, MessageRole::User);
        assert_eq!(current.turns[0].content, "I want a job in data");

        let chats = store.chats();
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].id, id);
    }

    #[tokio::test]
    async fn test_title_applied_to_list_and_current() {
        let (store, backend) = store_with_mock();

        let (id, title_task) = store.start_new("hello");
        backend.title_gate.add_permits(1);
        title_task.await.unwrap();

        assert_eq!(store.active().unwrap().title, "Generated Title");
        assert_eq!(store.chats()[0].title, "Generated Title");
        assert_eq!(store.chats()[0].id, id);
    }

    #[tokio::test]
    async fn test_stale_title_does_not_resurrect_discarded_conversation() {
        let (store, backend) = store_with_mock();

        let (_id, title_task) = store.start_new("hello");
        store.reset();
        // Discard the entry from the list too, as a navigation reload would.
        store.load_all().await.unwrap();

        backend.title_gate.add_permits(1);
        title_task.await.unwrap();

        assert!(store.active().is_none());
        assert!(store.chats().is_empty());
    }

    #[tokio::test]
    async fn test_reset_keeps_list_but_clears_active() {
        let (store, backend) = store_with_mock();

        let (id, title_task) = store.start_new("hello");
        store.reset();

        backend.title_gate.add_permits(1);
        title_task.await.unwrap();

        // The summary entry still exists, so the title lands there, but
        // the discarded active conversation is not resurrected.
        assert!(store.active().is_none());
        assert_eq!(store.chats()[0].id, id);
        assert_eq!(store.chats()[0].title, "Generated Title");
    }

    #[tokio::test]
    async fn test_append_order_matches_call_order() {
        let (store, _backend) = store_with_mock();

        store.start_new("first");
        store.append_turn(assistant_msg("second"));
        store.append_turn(user_msg("third"));
        store.append_turn(assistant_msg("fourth"));

        let contents: Vec<_> = store
            .active_turns()
            .into_iter()
            .map(|t| t.content)
            .collect();
        assert_eq!(contents, vec!["first", "second", "third", "fourth"]);
    }

    #[tokio::test]
    async fn test_commit_initial_skips_below_two_turns() {
        let (store, backend) = store_with_mock();

        store.start_new("only one turn");
        let outcome = store.commit_initial().await.unwrap();

        assert_eq!(outcome, CommitOutcome::Skipped);
        assert!(!store.active().unwrap().saved);
        assert!(backend.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_initial_assigns_persistent_id() {
        let (store, backend) = store_with_mock();
        let assigned = Uuid::new_v4();
        backend.create_results.lock().unwrap().push_back(Ok(assigned));

        let (provisional, _t) = store.start_new("hi");
        store.append_turn(assistant_msg("hello!"));
        let outcome = store.commit_initial().await.unwrap();

        assert_eq!(outcome, CommitOutcome::Committed(assigned));
        let current = store.active().unwrap();
        assert!(current.saved);
        assert_eq!(current.id, assigned);
        assert_ne!(current.id, provisional);
        // The summary entry follows the id swap.
        assert_eq!(store.chats()[0].id, assigned);
    }

    #[tokio::test]
    async fn test_commit_initial_idempotent_after_success() {
        let (store, backend) = store_with_mock();

        store.start_new("hi");
        store.append_turn(assistant_msg("hello!"));
        store.commit_initial().await.unwrap();
        let before = store.active().unwrap();

        let outcome = store.commit_initial().await.unwrap();
        assert_eq!(outcome, CommitOutcome::Skipped);
        assert_eq!(store.active().unwrap(), before);
        assert_eq!(backend.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_commit_initial_failure_leaves_unsaved_and_is_retryable() {
        let (store, backend) = store_with_mock();
        backend
            .create_results
            .lock()
            .unwrap()
            .push_back(Err(StoreError::Backend("db down".to_string())));

        store.start_new("hi");
        store.append_turn(assistant_msg("hello!"));

        let err = store.commit_initial().await.unwrap_err();
        assert_eq!(err, StoreError::Backend("db down".to_string()));
        assert!(!store.active().unwrap().saved);

        // Caller re-invokes; next attempt succeeds.
        let outcome = store.commit_initial().await.unwrap();
        assert!(matches!(outcome, CommitOutcome::Committed(_)));
        assert!(store.active().unwrap().saved);
    }

    #[tokio::test]
    async fn test_persist_turn_failure_keeps_both_turns_in_memory() {
        let (store, backend) = store_with_mock();

        store.start_new("hi");
        store.append_turn(assistant_msg("hello!"));
        store.commit_initial().await.unwrap();

        backend.append_results.lock().unwrap().push_back(Ok(()));
        backend
            .append_results
            .lock()
            .unwrap()
            .push_back(Err(StoreError::Backend("write failed".to_string())));

        let h1 = store.persist_turn(user_msg("more context"));
        assert!(h1.await.unwrap().is_ok());
        let h2 = store.persist_turn(assistant_msg("noted"));
        assert!(h2.await.unwrap().is_err());

        let contents: Vec<_> = store
            .active_turns()
            .into_iter()
            .map(|t| t.content)
            .collect();
        assert_eq!(contents, vec!["hi", "hello!", "more context", "noted"]);
    }

    #[tokio::test]
    async fn test_persist_turn_writes_against_assigned_id() {
        let (store, backend) = store_with_mock();
        let assigned = Uuid::new_v4();
        backend.create_results.lock().unwrap().push_back(Ok(assigned));

        store.start_new("hi");
        store.append_turn(assistant_msg("hello!"));
        store.commit_initial().await.unwrap();

        store
            .persist_turn(user_msg("follow-up"))
            .await
            .unwrap()
            .unwrap();

        let appended = backend.appended.lock().unwrap();
        assert_eq!(appended.len(), 1);
        assert_eq!(appended[0].0, assigned);
    }

    #[tokio::test]
    async fn test_load_one_missing_sets_error_flag_and_keeps_list() {
        let (store, backend) = store_with_mock();
        backend
            .fetch_chat_results
            .lock()
            .unwrap()
            .push_back(Err(StoreError::NotFound));
        store.start_new("existing");
        let chats_before = store.chats();

        let err = store.load_one(Uuid::new_v4()).await.unwrap_err();

        assert_eq!(err, StoreError::NotFound);
        assert!(store.load_chat_error());
        assert!(!store.is_loading_chat());
        assert_eq!(store.chats(), chats_before);
    }

    #[tokio::test]
    async fn test_load_one_installs_saved_conversation() {
        let (store, backend) = store_with_mock();
        let id = Uuid::new_v4();
        backend
            .fetch_chat_results
            .lock()
            .unwrap()
            .push_back(Ok(Conversation {
                id,
                title: "Old chat".to_string(),
                saved: true,
                turns: vec![
                    Turn::new(user_msg("q")),
                    Turn::new(assistant_msg("a")),
                ],
            }));

        store.load_one(id).await.unwrap();

        let current = store.active().unwrap();
        assert!(current.saved);
        assert_eq!(current.id, id);
        assert_eq!(store.active_turns().len(), 2);
    }

    #[tokio::test]
    async fn test_load_all_replaces_list_with_server_state() {
        let (store, backend) = store_with_mock();
        let existing = ChatSummary {
            id: Uuid::new_v4(),
            title: "From server".to_string(),
        };
        backend.chats.lock().unwrap().push(existing.clone());

        store.load_all().await.unwrap();
        assert_eq!(store.chats(), vec![existing]);
        assert!(!store.is_loading_chats());
    }

    #[tokio::test]
    async fn test_active_turns_empty_without_active_conversation() {
        let (store, _backend) = store_with_mock();
        assert!(store.active_turns().is_empty());
        store.append_turn(user_msg("ignored"));
        assert!(store.active_turns().is_empty());
    }
}
