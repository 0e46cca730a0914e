use super::error::ApplicationError;
use crate::domain::background::BackgroundSource;
use crate::domain::editor::{EditorSnapshot, EditorState, PointerEvent};
use crate::domain::error::DomainError;
use crate::domain::text_overlay::{TextAlign, TextOverlay};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StyleUpdate {
    pub text: Option<String>,
    pub color: Option<String>,
    pub font_size: Option<u32>,
    pub align: Option<TextAlign>,
}

#[derive(Debug)]
struct Session {
    editor: EditorState,
    last_touched: Instant,
    /// Monotonic access counter; the lowest value is evicted first when full.
    touch_seq: u64,
}

#[derive(Debug, Default)]
struct SessionTable {
    entries: HashMap<u64, Session>,
    seq: u64,
}

impl SessionTable {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }

    fn purge_idle(&mut self, idle_ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, session| session.last_touched.elapsed() < idle_ttl);
        before - self.entries.len()
    }

    fn evict_least_recent(&mut self) -> Option<u64> {
        let id = self
            .entries
            .iter()
            .min_by_key(|(_, session)| session.touch_seq)
            .map(|(id, _)| *id)?;
        self.entries.remove(&id);
        Some(id)
    }
}

/// In-memory editor sessions. Nothing survives a restart.
///
/// Sessions idle for longer than `idle_ttl` are dropped, and at most
/// `max_sessions` are held; creating one more evicts the least recently used.
#[derive(Debug)]
pub struct SessionService {
    sessions: Mutex<SessionTable>,
    next_id: AtomicU64,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionService {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionService {
    pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
    pub const DEFAULT_MAX_SESSIONS: usize = 1000;

    pub fn new() -> Self {
        Self::with_limits(Self::DEFAULT_IDLE_TTL, Self::DEFAULT_MAX_SESSIONS)
    }

    pub fn with_limits(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(SessionTable::default()),
            next_id: AtomicU64::new(1),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    pub fn idle_ttl(&self) -> Duration {
        self.idle_ttl
    }

    pub async fn create(&self) -> (u64, EditorSnapshot) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let editor = EditorState::new();
        let snapshot = editor.snapshot();

        let mut table = self.sessions.lock().await;
        table.purge_idle(self.idle_ttl);
        while table.entries.len() >= self.max_sessions {
            match table.evict_least_recent() {
                Some(evicted) => tracing::debug!(session = evicted, "session evicted (limit reached)"),
                None => break,
            }
        }
        let touch_seq = table.next_seq();
        table.entries.insert(
            id,
            Session {
                editor,
                last_touched: Instant::now(),
                touch_seq,
            },
        );
        tracing::debug!(session = id, "session created");
        (id, snapshot)
    }

    /// Drops every idle session. Returns how many were removed.
    pub async fn purge_idle(&self) -> usize {
        let removed = self.sessions.lock().await.purge_idle(self.idle_ttl);
        if removed > 0 {
            tracing::info!(removed, "idle sessions purged");
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.entries.len()
    }

    pub async fn remove(&self, id: u64) -> Result<(), ApplicationError> {
        self.sessions
            .lock()
            .await
            .entries
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::SessionNotFound(id).into())
    }

    /// Runs `f` against the session while holding the lock. An idle session
    /// is dropped on access and reported as not found.
    async fn with_session<T>(
        &self,
        id: u64,
        f: impl FnOnce(&mut EditorState) -> Result<T, ApplicationError>,
    ) -> Result<T, ApplicationError> {
        let mut table = self.sessions.lock().await;
        let expired = match table.entries.get(&id) {
            Some(session) => session.last_touched.elapsed() >= self.idle_ttl,
            None => return Err(DomainError::SessionNotFound(id).into()),
        };
        if expired {
            table.entries.remove(&id);
            tracing::debug!(session = id, "idle session expired");
            return Err(DomainError::SessionNotFound(id).into());
        }

        let touch_seq = table.next_seq();
        let session = table.entries.get_mut(&id).ok_or(DomainError::SessionNotFound(id))?;
        session.last_touched = Instant::now();
        session.touch_seq = touch_seq;
        f(&mut session.editor)
    }

    pub async fn snapshot(&self, id: u64) -> Result<EditorSnapshot, ApplicationError> {
        self.with_session(id, |editor| Ok(editor.snapshot())).await
    }

    pub async fn update_style(&self, id: u64, update: StyleUpdate) -> Result<EditorSnapshot, ApplicationError> {
        self.with_session(id, |editor| {
            // サイズの検証を先に行い、失敗時は何も変更しない
            if let Some(size) = update.font_size {
                editor.set_font_size(size)?;
            }
            if let Some(text) = update.text {
                editor.set_text(text);
            }
            if let Some(color) = update.color.as_deref() {
                editor.set_color(color);
            }
            if let Some(align) = update.align {
                editor.set_align(align);
            }
            Ok(editor.snapshot())
        })
        .await
    }

    pub async fn select_background(
        &self,
        id: u64,
        background: BackgroundSource,
    ) -> Result<EditorSnapshot, ApplicationError> {
        self.with_session(id, |editor| {
            editor.select_background(background);
            Ok(editor.snapshot())
        })
        .await
    }

    pub async fn apply_pointer(&self, id: u64, event: &PointerEvent) -> Result<EditorSnapshot, ApplicationError> {
        self.with_session(id, |editor| {
            editor.apply_pointer(event);
            Ok(editor.snapshot())
        })
        .await
    }

    /// Background and overlay to export. Fails when no background was chosen.
    pub async fn export_inputs(&self, id: u64) -> Result<(BackgroundSource, TextOverlay), ApplicationError> {
        self.with_session(id, |editor| {
            let background = editor
                .background()
                .cloned()
                .ok_or_else(|| DomainError::InvalidInput("no background image selected".to_string()))?;
            Ok((background, editor.overlay().clone()))
        })
        .await
    }
}
