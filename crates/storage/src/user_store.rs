use chrono::Utc;
use hearme_domain::model::{ProviderProfile, UserId, UserRecord};
use hearme_domain::storage::{StorageResult, UserStore};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};

use crate::entity::users;
use crate::errors::StorageError;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl UserStore for SeaOrmStorage {
    async fn upsert_user(
        &self,
        profile: ProviderProfile,
        new_id: UserId,
    ) -> StorageResult<UserRecord> {
        let existing = users::Entity::find()
            .filter(users::Column::Subject.eq(profile.subject.as_str()))
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;

        let model = match existing {
            Some(model) => {
                let mut active: users::ActiveModel = model.into();
                active.name = Set(profile.name);
                active.email = Set(profile.email);
                active.update(self.connection()).await
            }
            None => {
                users::ActiveModel {
                    id: Set(new_id.into_inner()),
                    subject: Set(profile.subject),
                    name: Set(profile.name),
                    email: Set(profile.email),
                    created_at: Set(Utc::now()),
                }
                .insert(self.connection())
                .await
            }
        }
        .map_err(StorageError::from_source)?;

        Ok(user_to_record(model))
    }

    async fn find_user(&self, id: &UserId) -> StorageResult<Option<UserRecord>> {
        let maybe = users::Entity::find_by_id(id.as_str().to_owned())
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe.map(user_to_record))
    }
}

fn user_to_record(model: users::Model) -> UserRecord {
    UserRecord {
        id: UserId::new(model.id),
        subject: model.subject,
        name: model.name,
        email: model.email,
        created_at: model.created_at,
    }
}
