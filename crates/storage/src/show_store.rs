use chrono::{DateTime, Utc};
use hearme_domain::model::{DateRange, NewShow, ShowId, ShowRecord, ShowSummary, UserId};
use hearme_domain::storage::{ShowStore, StorageResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

use crate::entity::{messages, shows};
use crate::errors::StorageError;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl ShowStore for SeaOrmStorage {
    async fn insert_show(&self, show: NewShow) -> StorageResult<ShowRecord> {
        let created = shows::ActiveModel {
            id: Set(show.id.into_inner()),
            user_id: Set(show.user_id.into_inner()),
            title: Set(show.title),
            active: Set(true),
            created_at: Set(show.created_at),
            ended_at: Set(None),
            total_earnings: Set(None),
        }
        .insert(self.connection())
        .await
        .map_err(StorageError::from_source)?;
        Ok(show_to_record(created))
    }

    async fn find_show(&self, id: &ShowId) -> StorageResult<Option<ShowRecord>> {
        let maybe = shows::Entity::find_by_id(id.as_str().to_owned())
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe.map(show_to_record))
    }

    async fn active_show(&self, user: &UserId) -> StorageResult<Option<ShowRecord>> {
        let maybe = shows::Entity::find()
            .filter(shows::Column::UserId.eq(user.as_str()))
            .filter(shows::Column::Active.eq(true))
            .order_by_desc(shows::Column::CreatedAt)
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe.map(show_to_record))
    }

    async fn end_show(
        &self,
        id: &ShowId,
        ended_at: DateTime<Utc>,
    ) -> StorageResult<Option<ShowRecord>> {
        let maybe = shows::Entity::find_by_id(id.as_str().to_owned())
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        let Some(model) = maybe else {
            return Ok(None);
        };
        if !model.active {
            return Ok(Some(show_to_record(model)));
        }
        close_show(self.connection(), model, ended_at)
            .await
            .map(Some)
    }

    async fn close_active_shows(
        &self,
        user: &UserId,
        ended_at: DateTime<Utc>,
    ) -> StorageResult<u64> {
        let active = shows::Entity::find()
            .filter(shows::Column::UserId.eq(user.as_str()))
            .filter(shows::Column::Active.eq(true))
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;

        let mut closed = 0;
        for model in active {
            close_show(self.connection(), model, ended_at).await?;
            closed += 1;
        }
        Ok(closed)
    }

    async fn past_shows(
        &self,
        user: &UserId,
        range: DateRange,
    ) -> StorageResult<Vec<ShowSummary>> {
        let mut query = shows::Entity::find()
            .filter(shows::Column::UserId.eq(user.as_str()))
            .filter(shows::Column::Active.eq(false))
            .filter(shows::Column::EndedAt.is_not_null());
        if let Some(from) = range.from {
            query = query.filter(shows::Column::CreatedAt.gte(from));
        }
        if let Some(until) = range.until {
            query = query.filter(shows::Column::CreatedAt.lte(until));
        }
        let rows = query
            .order_by_desc(shows::Column::CreatedAt)
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;

        let mut summaries = Vec::with_capacity(rows.len());
        for model in rows {
            let message_count = messages::Entity::find()
                .filter(messages::Column::ShowId.eq(model.id.as_str()))
                .count(self.connection())
                .await
                .map_err(StorageError::from_source)?;
            summaries.push(ShowSummary {
                show: show_to_record(model),
                message_count,
            });
        }
        Ok(summaries)
    }
}

/// Flips the show inactive and caches the sum of its message payments.
async fn close_show(
    db: &DatabaseConnection,
    model: shows::Model,
    ended_at: DateTime<Utc>,
) -> StorageResult<ShowRecord> {
    let payments = messages::Entity::find()
        .filter(messages::Column::ShowId.eq(model.id.as_str()))
        .all(db)
        .await
        .map_err(StorageError::from_source)?;
    let total = payments
        .iter()
        .fold(0_i64, |acc, message| acc.saturating_add(message.payment));

    let mut active: shows::ActiveModel = model.into();
    active.active = Set(false);
    active.ended_at = Set(Some(ended_at));
    active.total_earnings = Set(Some(total));
    let updated = active
        .update(db)
        .await
        .map_err(StorageError::from_source)?;
    Ok(show_to_record(updated))
}

fn show_to_record(model: shows::Model) -> ShowRecord {
    ShowRecord {
        id: ShowId::new(model.id),
        user_id: UserId::new(model.user_id),
        title: model.title,
        active: model.active,
        created_at: model.created_at,
        ended_at: model.ended_at,
        total_earnings: model.total_earnings,
    }
}
