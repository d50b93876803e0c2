//! SeaORM post repository.
//!
//! Likes and comments are mutated inside a single transaction that locks the
//! post row, so interactions on the same post serialize while different
//! posts stay independent. The denormalized counters are recomputed from
//! their backing tables before the commit, never outside it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set, Unchanged};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbBackend, DbConn, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Statement, TransactionTrait,
};
use std::collections::HashMap;
use uuid::Uuid;

use quill_core::domain::Post;
use quill_core::error::RepoError;
use quill_core::ports::{PostPage, PostQuery, PostRepository, PostSort};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_like::{self, Entity as PostLikeEntity};

/// PostgreSQL post repository.
pub struct SeaOrmPostRepository {
    db: DbConn,
}

impl SeaOrmPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Load the like set and comment sequence for a single post row.
    async fn hydrate_one(&self, model: post::Model) -> Result<Post, RepoError> {
        let comments = CommentEntity::find()
            .filter(comment::Column::PostId.eq(model.id))
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        let likes = PostLikeEntity::find()
            .filter(post_like::Column::PostId.eq(model.id))
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(assemble(model, comments, likes))
    }

    /// Batched variant of [`Self::hydrate_one`] for listing pages.
    async fn hydrate_all(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();

        let mut comments_by_post: HashMap<Uuid, Vec<comment::Model>> = HashMap::new();
        for item in CommentEntity::find()
            .filter(comment::Column::PostId.is_in(ids.clone()))
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?
        {
            comments_by_post.entry(item.post_id).or_default().push(item);
        }

        let mut likes_by_post: HashMap<Uuid, Vec<post_like::Model>> = HashMap::new();
        for item in PostLikeEntity::find()
            .filter(post_like::Column::PostId.is_in(ids))
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?
        {
            likes_by_post.entry(item.post_id).or_default().push(item);
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let comments = comments_by_post.remove(&model.id).unwrap_or_default();
                let likes = likes_by_post.remove(&model.id).unwrap_or_default();
                assemble(model, comments, likes)
            })
            .collect())
    }

    /// Lock the post row for the duration of the transaction, serializing
    /// interactions on the same post. `NotFound` when the post is gone.
    async fn lock_post<C: ConnectionTrait>(txn: &C, post_id: Uuid) -> Result<(), RepoError> {
        let locked = txn
            .query_one(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "SELECT id FROM posts WHERE id = $1 FOR UPDATE",
                [post_id.into()],
            ))
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        if locked.is_none() {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }

    async fn reload(&self, post_id: Uuid) -> Result<Post, RepoError> {
        let model = PostEntity::find_by_id(post_id)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?
            .ok_or(RepoError::NotFound)?;
        self.hydrate_one(model).await
    }
}

#[async_trait]
impl PostRepository for SeaOrmPostRepository {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let model: post::ActiveModel = post.into();
        let inserted = model.insert(&self.db).await.map_err(write_err)?;

        self.hydrate_one(inserted).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        match model {
            Some(model) => Ok(Some(self.hydrate_one(model).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        match model {
            Some(model) => Ok(Some(self.hydrate_one(model).await?)),
            None => Ok(None),
        }
    }

    async fn slug_exists(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, RepoError> {
        let mut query = PostEntity::find().filter(post::Column::Slug.eq(slug));
        if let Some(id) = exclude {
            query = query.filter(post::Column::Id.ne(id));
        }

        let count = query
            .count(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(count > 0)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let model = post::ActiveModel {
            id: Unchanged(post.id),
            author_id: NotSet,
            slug: Set(post.slug),
            title: Set(post.title),
            content: Set(post.content),
            tags: Set(post.tags),
            featured_image: Set(post.featured_image),
            view_count: NotSet,
            like_count: NotSet,
            comment_count: NotSet,
            created_at: NotSet,
            updated_at: Set(post.updated_at.into()),
        };

        let updated = model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => RepoError::NotFound,
            other => write_err(other),
        })?;

        self.hydrate_one(updated).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn list(&self, query: &PostQuery) -> Result<PostPage, RepoError> {
        let mut select = PostEntity::find();

        if let Some(search) = &query.search {
            select = select.filter(
                Condition::any()
                    .add(post::Column::Title.contains(search))
                    .add(post::Column::Content.contains(search)),
            );
        }
        if let Some(author) = query.author {
            select = select.filter(post::Column::AuthorId.eq(author));
        }
        if let Some(tag) = &query.tag {
            select = select.filter(Expr::cust_with_values("? = ANY(tags)", [tag.clone()]));
        }

        select = match query.sort {
            PostSort::Newest => select.order_by_desc(post::Column::CreatedAt),
            PostSort::Oldest => select.order_by_asc(post::Column::CreatedAt),
        };
        // Stable tiebreak so pages never overlap on equal timestamps.
        select = select.order_by_asc(post::Column::Id);

        let paginator = select.paginate(&self.db, query.page_size);
        let totals = paginator
            .num_items_and_pages()
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;
        let models = paginator
            .fetch_page(query.page.saturating_sub(1))
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        let posts = self.hydrate_all(models).await?;

        Ok(PostPage {
            posts,
            current_page: query.page,
            total_pages: totals.number_of_pages,
            total_posts: totals.number_of_items,
            has_next: query.page < totals.number_of_pages,
            has_prev: query.page > 1,
        })
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), RepoError> {
        let result = self
            .db
            .execute(Statement::from_sql_and_values(
                DbBackend::Postgres,
                "UPDATE posts SET view_count = view_count + 1 WHERE id = $1",
                [id.into()],
            ))
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn toggle_like(&self, post_id: Uuid, user_id: Uuid) -> Result<Post, RepoError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RepoError::Connection(e.to_string()))?;

        Self::lock_post(&txn, post_id).await?;

        let existing = PostLikeEntity::find_by_id((post_id, user_id))
            .one(&txn)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        if existing.is_some() {
            PostLikeEntity::delete_by_id((post_id, user_id))
                .exec(&txn)
                .await
                .map_err(|e| RepoError::Query(e.to_string()))?;
        } else {
            let like = post_like::ActiveModel {
                post_id: Set(post_id),
                user_id: Set(user_id),
            };
            PostLikeEntity::insert(like)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| RepoError::Query(e.to_string()))?;
        }

        recount(&txn, post_id, "like_count", "post_likes").await?;

        txn.commit()
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        tracing::debug!(post_id = %post_id, user_id = %user_id, "like toggled");
        self.reload(post_id).await
    }

    async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        content: &str,
        at: DateTime<Utc>,
    ) -> Result<Post, RepoError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RepoError::Connection(e.to_string()))?;

        Self::lock_post(&txn, post_id).await?;

        let model = comment::ActiveModel {
            post_id: Set(post_id),
            author_id: Set(author_id),
            content: Set(content.to_string()),
            created_at: Set(at.into()),
            ..Default::default()
        };
        model
            .insert(&txn)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        recount(&txn, post_id, "comment_count", "comments").await?;

        txn.commit()
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        self.reload(post_id).await
    }
}

/// Recompute a denormalized counter from its backing table, inside `txn`.
async fn recount<C: ConnectionTrait>(
    txn: &C,
    post_id: Uuid,
    counter: &str,
    table: &str,
) -> Result<(), RepoError> {
    let sql = format!(
        "UPDATE posts SET {counter} = (SELECT COUNT(*) FROM {table} WHERE post_id = $1) \
         WHERE id = $1"
    );
    txn.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        sql,
        [post_id.into()],
    ))
    .await
    .map_err(|e| RepoError::Query(e.to_string()))?;

    Ok(())
}

fn assemble(
    model: post::Model,
    comments: Vec<comment::Model>,
    likes: Vec<post_like::Model>,
) -> Post {
    Post {
        id: model.id,
        author_id: model.author_id,
        slug: model.slug,
        title: model.title,
        content: model.content,
        tags: model.tags,
        featured_image: model.featured_image,
        view_count: model.view_count,
        like_count: model.like_count,
        comment_count: model.comment_count,
        likes: likes.into_iter().map(|like| like.user_id).collect(),
        comments: comments.into_iter().map(Into::into).collect(),
        created_at: model.created_at.into(),
        updated_at: model.updated_at.into(),
    }
}

fn write_err(err: DbErr) -> RepoError {
    let msg = err.to_string();
    if msg.contains("duplicate") || msg.contains("unique") {
        RepoError::Constraint(msg)
    } else {
        RepoError::Query(msg)
    }
}
