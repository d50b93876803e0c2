//! Post entity for SeaORM.
//!
//! Carries the denormalized counters next to the row; the like set and the
//! comment sequence live in their own tables and are loaded alongside.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub author_id: Uuid,
    #[sea_orm(unique)]
    pub slug: String,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub tags: Vec<String>,
    pub featured_image: Option<String>,
    pub view_count: i64,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AuthorId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Author,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comment,
    #[sea_orm(has_many = "super::post_like::Entity")]
    PostLike,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Author.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comment.def()
    }
}

impl Related<super::post_like::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostLike.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Conversion from Domain Post to SeaORM ActiveModel (row fields only).
impl From<quill_core::domain::Post> for ActiveModel {
    fn from(post: quill_core::domain::Post) -> Self {
        Self {
            id: Set(post.id),
            author_id: Set(post.author_id),
            slug: Set(post.slug),
            title: Set(post.title),
            content: Set(post.content),
            tags: Set(post.tags),
            featured_image: Set(post.featured_image),
            view_count: Set(post.view_count),
            like_count: Set(post.like_count),
            comment_count: Set(post.comment_count),
            created_at: Set(post.created_at.into()),
            updated_at: Set(post.updated_at.into()),
        }
    }
}
