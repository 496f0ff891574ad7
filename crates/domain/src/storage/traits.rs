use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{
    DateRange, DjSettings, MessageQuery, MessageRecord, NewMessage, NewShow, ProviderProfile,
    SettingsUpdate, ShowId, ShowRecord, ShowSummary, UserId, UserRecord,
};

/// Common result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(String),
}

impl StorageError {
    pub fn from_source(err: impl std::fmt::Display) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts the user on first sign-in (keyed by provider subject) or
    /// refreshes name/email on later sign-ins. `new_id` is only used when the
    /// subject is unknown.
    async fn upsert_user(&self, profile: ProviderProfile, new_id: UserId)
        -> StorageResult<UserRecord>;
    async fn find_user(&self, id: &UserId) -> StorageResult<Option<UserRecord>>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn find_settings(&self, user: &UserId) -> StorageResult<Option<DjSettings>>;
    async fn upsert_settings(&self, update: SettingsUpdate) -> StorageResult<DjSettings>;
}

#[async_trait]
pub trait BannedWordStore: Send + Sync {
    async fn banned_words(&self, user: &UserId) -> StorageResult<Vec<String>>;
    /// Deletes every stored word for the user, then inserts `words`.
    async fn replace_banned_words(
        &self,
        user: &UserId,
        words: Vec<String>,
    ) -> StorageResult<Vec<String>>;
}

#[async_trait]
pub trait ShowStore: Send + Sync {
    async fn insert_show(&self, show: NewShow) -> StorageResult<ShowRecord>;
    async fn find_show(&self, id: &ShowId) -> StorageResult<Option<ShowRecord>>;
    async fn active_show(&self, user: &UserId) -> StorageResult<Option<ShowRecord>>;
    /// Marks the show inactive, stamps `ended_at` and caches the sum of its
    /// message payments. Already-ended shows are returned untouched.
    async fn end_show(&self, id: &ShowId, ended_at: DateTime<Utc>)
        -> StorageResult<Option<ShowRecord>>;
    /// Ends every active show of `user`, returning how many were closed.
    async fn close_active_shows(&self, user: &UserId, ended_at: DateTime<Utc>)
        -> StorageResult<u64>;
    /// Ended shows of `user` created within `range`, newest first.
    async fn past_shows(&self, user: &UserId, range: DateRange)
        -> StorageResult<Vec<ShowSummary>>;
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert_message(&self, message: NewMessage) -> StorageResult<MessageRecord>;
    /// Messages of a show, newest first.
    async fn list_messages(
        &self,
        show: &ShowId,
        query: &MessageQuery,
    ) -> StorageResult<Vec<MessageRecord>>;
}
