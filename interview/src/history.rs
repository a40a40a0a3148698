//! Per-session practice history, kept in memory only.
//!
//! The store is bounded: sessions idle for longer than the TTL are dropped,
//! then the least recently written ones once the session cap is reached.
//! Both happen on write.

use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::topics::{Difficulty, Topic};

/// Attempts kept per kind and session; oldest are dropped first.
pub const MAX_ENTRIES: usize = 50;

/// Sessions kept at once.
pub const MAX_SESSIONS: usize = 1_000;

/// Sessions without a recorded attempt for this long are dropped.
pub const SESSION_IDLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodingAttempt {
    pub title: String,
    pub topic: Option<Topic>,
    pub difficulty: Option<Difficulty>,
    pub score: Option<u8>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizAttempt {
    pub topic: Topic,
    pub correct: usize,
    pub total: usize,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionHistory {
    pub coding: Vec<CodingAttempt>,
    pub quiz: Vec<QuizAttempt>,
}

impl SessionHistory {
    /// Mean coding score over attempts that have one.
    pub fn average_coding_score(&self) -> Option<f32> {
        let scores: Vec<u8> = self.coding.iter().filter_map(|a| a.score).collect();
        if scores.is_empty() {
            None
        } else {
            Some(scores.iter().map(|s| *s as f32).sum::<f32>() / scores.len() as f32)
        }
    }

    /// Overall quiz accuracy in percent.
    pub fn quiz_accuracy(&self) -> Option<f32> {
        let total: usize = self.quiz.iter().map(|q| q.total).sum();
        if total == 0 {
            return None;
        }
        let correct: usize = self.quiz.iter().map(|q| q.correct).sum();
        Some(correct as f32 * 100.0 / total as f32)
    }
}

fn push_bounded<T>(list: &mut Vec<T>, item: T) {
    if list.len() >= MAX_ENTRIES {
        list.remove(0);
    }
    list.push(item);
}

struct Slot {
    history: SessionHistory,
    last_write: Instant,
}

/// Session id -> history. Sessions are independent of each other.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Slot>>,
    max_sessions: usize,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(MAX_SESSIONS, SESSION_IDLE_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(max_sessions: usize, idle_ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            idle_ttl,
        }
    }

    pub async fn record_coding(&self, session: &str, attempt: CodingAttempt) {
        let mut w = self.sessions.write().await;
        let history = self.slot(&mut w, session);
        push_bounded(&mut history.coding, attempt);
        debug!(session, count = history.coding.len(), "coding attempt recorded");
    }

    pub async fn record_quiz(&self, session: &str, attempt: QuizAttempt) {
        let mut w = self.sessions.write().await;
        let history = self.slot(&mut w, session);
        push_bounded(&mut history.quiz, attempt);
        debug!(session, count = history.quiz.len(), "quiz attempt recorded");
    }

    /// Prunes other sessions, then returns this one's history with its
    /// write time refreshed.
    fn slot<'a>(
        &self,
        sessions: &'a mut HashMap<String, Slot>,
        session: &str,
    ) -> &'a mut SessionHistory {
        let now = Instant::now();
        let before = sessions.len();
        sessions.retain(|id, slot| {
            id == session || now.duration_since(slot.last_write) < self.idle_ttl
        });

        if !sessions.contains_key(session) {
            while sessions.len() >= self.max_sessions {
                let oldest = sessions
                    .iter()
                    .min_by_key(|(_, slot)| slot.last_write)
                    .map(|(id, _)| id.clone());
                match oldest {
                    Some(id) => sessions.remove(&id),
                    None => break,
                };
            }
        }

        let pruned = before.saturating_sub(sessions.len());
        if pruned > 0 {
            debug!(pruned, remaining = sessions.len(), "sessions pruned");
        }

        let slot = sessions.entry(session.to_string()).or_insert_with(|| Slot {
            history: SessionHistory::default(),
            last_write: now,
        });
        slot.last_write = now;
        &mut slot.history
    }

    /// Copy of the session's history; empty for unknown sessions.
    pub async fn snapshot(&self, session: &str) -> SessionHistory {
        self.sessions
            .read()
            .await
            .get(session)
            .map(|slot| slot.history.clone())
            .unwrap_or_default()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn clear(&self, session: &str) {
        self.sessions.write().await.remove(session);
    }
}
