use sea_orm::sea_query::{ColumnDef, Expr, Index, IndexCreateStatement, Table, TableCreateStatement};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection};

use crate::entity::{banned_words, dj_settings, messages, shows, users};
use crate::errors::StorageError;
use hearme_domain::storage::StorageResult;

pub async fn run_migrations(db: &DatabaseConnection) -> StorageResult<()> {
    let backend = db.get_database_backend();

    let users_table = Table::create()
        .table(users::Entity)
        .col(
            ColumnDef::new(users::Column::Id)
                .string_len(32)
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(users::Column::Subject)
                .string_len(255)
                .not_null()
                .unique_key(),
        )
        .col(ColumnDef::new(users::Column::Name).string().null())
        .col(ColumnDef::new(users::Column::Email).string().null())
        .col(
            ColumnDef::new(users::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .to_owned();
    create_table(db, backend, users_table).await?;

    let settings_table = Table::create()
        .table(dj_settings::Entity)
        .col(
            ColumnDef::new(dj_settings::Column::UserId)
                .string_len(32)
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(dj_settings::Column::ArtistName).string().null())
        .col(
            ColumnDef::new(dj_settings::Column::PricePerChar)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(dj_settings::Column::StarPrice)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(dj_settings::Column::KissPrice)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(dj_settings::Column::HeartPrice)
                .big_integer()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(dj_settings::Column::AutoModerate)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(ColumnDef::new(dj_settings::Column::PayoutEmail).string().null())
        .col(
            ColumnDef::new(dj_settings::Column::UpdatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, settings_table).await?;

    let banned_words_table = Table::create()
        .table(banned_words::Entity)
        .col(
            ColumnDef::new(banned_words::Column::Id)
                .integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(banned_words::Column::UserId)
                .string_len(32)
                .not_null(),
        )
        .col(ColumnDef::new(banned_words::Column::Word).string().not_null())
        .to_owned();
    create_table(db, backend, banned_words_table).await?;
    create_index(
        db,
        backend,
        Index::create()
            .name("idx_banned_words_user")
            .table(banned_words::Entity)
            .col(banned_words::Column::UserId)
            .to_owned(),
    )
    .await?;

    let shows_table = Table::create()
        .table(shows::Entity)
        .col(
            ColumnDef::new(shows::Column::Id)
                .string_len(32)
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(shows::Column::UserId).string_len(32).not_null())
        .col(ColumnDef::new(shows::Column::Title).string().not_null())
        .col(ColumnDef::new(shows::Column::Active).boolean().not_null())
        .col(
            ColumnDef::new(shows::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(shows::Column::EndedAt)
                .timestamp_with_time_zone()
                .null(),
        )
        .col(
            ColumnDef::new(shows::Column::TotalEarnings)
                .big_integer()
                .null(),
        )
        .to_owned();
    create_table(db, backend, shows_table).await?;
    create_index(
        db,
        backend,
        Index::create()
            .name("idx_shows_user_active")
            .table(shows::Entity)
            .col(shows::Column::UserId)
            .col(shows::Column::Active)
            .to_owned(),
    )
    .await?;

    let messages_table = Table::create()
        .table(messages::Entity)
        .col(
            ColumnDef::new(messages::Column::Id)
                .string_len(32)
                .not_null()
                .primary_key(),
        )
        .col(
            ColumnDef::new(messages::Column::ShowId)
                .string_len(32)
                .not_null(),
        )
        .col(
            ColumnDef::new(messages::Column::DisplayName)
                .string()
                .not_null(),
        )
        .col(ColumnDef::new(messages::Column::Content).text().not_null())
        .col(
            ColumnDef::new(messages::Column::Payment)
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(messages::Column::Paid)
                .boolean()
                .not_null()
                .default(false),
        )
        .col(ColumnDef::new(messages::Column::PaymentRef).string().null())
        .col(
            ColumnDef::new(messages::Column::CreatedAt)
                .timestamp_with_time_zone()
                .not_null(),
        )
        .to_owned();
    create_table(db, backend, messages_table).await?;
    create_index(
        db,
        backend,
        Index::create()
            .name("idx_messages_show_created")
            .table(messages::Entity)
            .col(messages::Column::ShowId)
            .col(messages::Column::CreatedAt)
            .to_owned(),
    )
    .await?;

    Ok(())
}

async fn create_table(
    db: &DatabaseConnection,
    backend: DatabaseBackend,
    mut statement: TableCreateStatement,
) -> StorageResult<()> {
    statement.if_not_exists();
    db.execute(backend.build(&statement))
        .await
        .map_err(StorageError::from_source)?;
    Ok(())
}

async fn create_index(
    db: &DatabaseConnection,
    backend: DatabaseBackend,
    mut statement: IndexCreateStatement,
) -> StorageResult<()> {
    statement.if_not_exists();
    db.execute(backend.build(&statement))
        .await
        .map_err(StorageError::from_source)?;
    Ok(())
}
