use sea_orm_migration::prelude::*;

use super::m20250901_000001_create_users::Users;
use super::m20250901_000002_create_posts::Posts;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PostLikes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PostLikes::PostId).uuid().not_null())
                    .col(ColumnDef::new(PostLikes::UserId).uuid().not_null())
                    // One like per user per post, by construction.
                    .primary_key(
                        Index::create()
                            .col(PostLikes::PostId)
                            .col(PostLikes::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_likes_post")
                            .from(PostLikes::Table, PostLikes::PostId)
                            .to(Posts::Table, Posts::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_post_likes_user")
                            .from(PostLikes::Table, PostLikes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PostLikes::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PostLikes {
    Table,
    PostId,
    UserId,
}
