use hearme_domain::model::{MessageId, MessageQuery, MessageRecord, NewMessage, ShowId};
use hearme_domain::storage::{MessageStore, StorageResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::entity::messages;
use crate::errors::StorageError;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl MessageStore for SeaOrmStorage {
    async fn insert_message(&self, message: NewMessage) -> StorageResult<MessageRecord> {
        let created = messages::ActiveModel {
            id: Set(message.id.into_inner()),
            show_id: Set(message.show_id.into_inner()),
            display_name: Set(message.display_name),
            content: Set(message.content),
            payment: Set(message.payment),
            paid: Set(message.paid),
            payment_ref: Set(message.payment_ref),
            created_at: Set(message.created_at),
        }
        .insert(self.connection())
        .await
        .map_err(StorageError::from_source)?;
        Ok(message_to_record(created))
    }

    async fn list_messages(
        &self,
        show: &ShowId,
        query: &MessageQuery,
    ) -> StorageResult<Vec<MessageRecord>> {
        let mut select = messages::Entity::find()
            .filter(messages::Column::ShowId.eq(show.as_str()));
        if query.paid_only {
            select = select.filter(messages::Column::Paid.eq(true));
        }
        if let Some(since) = query.since {
            select = select.filter(messages::Column::CreatedAt.gt(since));
        }
        let rows = select
            .order_by_desc(messages::Column::CreatedAt)
            .order_by_desc(messages::Column::Id)
            .all(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(rows.into_iter().map(message_to_record).collect())
    }
}

fn message_to_record(model: messages::Model) -> MessageRecord {
    MessageRecord {
        id: MessageId::new(model.id),
        show_id: ShowId::new(model.show_id),
        display_name: model.display_name,
        content: model.content,
        payment: model.payment,
        paid: model.paid,
        payment_ref: model.payment_ref,
        created_at: model.created_at,
    }
}
