use hearme_domain::model::UserId;
use hearme_domain::storage::{BannedWordStore, StorageResult};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};

use crate::entity::banned_words;
use crate::errors::StorageError;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl BannedWordStore for SeaOrmStorage {
    async fn banned_words(&self, user: &UserId) -> StorageResult<Vec<String>> {
        let rows = banned_words::Entity::find()
            .filter(banned_words::Column::UserId.eq(user.as_str()))
            .order_by_asc(banned_words::Column::Id)
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(rows.into_iter().map(|row| row.word).collect())
    }

    async fn replace_banned_words(
        &self,
        user: &UserId,
        words: Vec<String>,
    ) -> StorageResult<Vec<String>> {
        let words: Vec<String> = words
            .into_iter()
            .map(|word| word.trim().to_string())
            .filter(|word| !word.is_empty())
            .collect();

        let txn = self
            .connection()
            .begin()
            .await
            .map_err(StorageError::from_source)?;

        banned_words::Entity::delete_many()
            .filter(banned_words::Column::UserId.eq(user.as_str()))
            .exec(&txn)
            .await
            .map_err(StorageError::from_source)?;

        if !words.is_empty() {
            let rows = words.iter().map(|word| banned_words::ActiveModel {
                user_id: Set(user.as_str().to_owned()),
                word: Set(word.clone()),
                ..Default::default()
            });
            banned_words::Entity::insert_many(rows)
                .exec_without_returning(&txn)
                .await
                .map_err(StorageError::from_source)?;
        }

        txn.commit().await.map_err(StorageError::from_source)?;
        Ok(words)
    }
}
