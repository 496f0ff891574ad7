use chrono::Utc;
use hearme_domain::model::{DjSettings, SettingsUpdate, UserId};
use hearme_domain::storage::{SettingsStore, StorageResult};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};

use crate::entity::dj_settings;
use crate::errors::StorageError;
use crate::SeaOrmStorage;

#[async_trait::async_trait]
impl SettingsStore for SeaOrmStorage {
    async fn find_settings(&self, user: &UserId) -> StorageResult<Option<DjSettings>> {
        let maybe = dj_settings::Entity::find_by_id(user.as_str().to_owned())
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;
        Ok(maybe.map(settings_to_record))
    }

    async fn upsert_settings(&self, update: SettingsUpdate) -> StorageResult<DjSettings> {
        let existing = dj_settings::Entity::find_by_id(update.user_id.as_str().to_owned())
            .one(self.connection())
            .await
            .map_err(StorageError::from_source)?;

        let is_new = existing.is_none();
        let mut active: dj_settings::ActiveModel = match existing {
            Some(model) => model.into(),
            None => dj_settings::ActiveModel {
                user_id: Set(update.user_id.as_str().to_owned()),
                ..Default::default()
            },
        };
        active.artist_name = Set(update.artist_name);
        active.price_per_char = Set(update.price_per_char);
        active.star_price = Set(update.star_price);
        active.kiss_price = Set(update.kiss_price);
        active.heart_price = Set(update.heart_price);
        active.auto_moderate = Set(update.auto_moderate);
        active.payout_email = Set(update.payout_email);
        active.updated_at = Set(Utc::now());

        let model = if is_new {
            active.insert(self.connection()).await
        } else {
            active.update(self.connection()).await
        }
        .map_err(StorageError::from_source)?;
        Ok(settings_to_record(model))
    }
}

fn settings_to_record(model: dj_settings::Model) -> DjSettings {
    DjSettings {
        user_id: UserId::new(model.user_id),
        artist_name: model.artist_name,
        price_per_char: model.price_per_char,
        star_price: model.star_price,
        kiss_price: model.kiss_price,
        heart_price: model.heart_price,
        auto_moderate: model.auto_moderate,
        payout_email: model.payout_email,
        updated_at: model.updated_at,
    }
}
