//! Create connection table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Connection::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Connection::FollowerId).string_len(32).not_null())
                    .col(ColumnDef::new(Connection::FollowingId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Connection::Status)
                            .string_len(16)
                            .not_null()
                            .default("accepted"),
                    )
                    .col(
                        ColumnDef::new(Connection::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Connection::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    // Primary key: (follower_id, following_id) - prevent duplicate follows
                    .primary_key(
                        Index::create()
                            .name("pk_connection")
                            .col(Connection::FollowerId)
                            .col(Connection::FollowingId),
                    )
                    // No self-follow
                    .check(
                        Expr::col(Connection::FollowerId).ne(Expr::col(Connection::FollowingId)),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_connection_follower")
                            .from(Connection::Table, Connection::FollowerId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_connection_following")
                            .from(Connection::Table, Connection::FollowingId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: following_id (for listing followers)
        manager
            .create_index(
                Index::create()
                    .name("idx_connection_following_id")
                    .table(Connection::Table)
                    .col(Connection::FollowingId)
                    .col(Connection::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Connection::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Connection {
    Table,
    FollowerId,
    FollowingId,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
