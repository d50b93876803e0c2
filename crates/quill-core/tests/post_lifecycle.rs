//! End-to-end exercises of the post store and interaction engine against an
//! in-memory repository.

mod support;

use std::collections::HashSet;
use std::sync::Arc;

use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{NewPost, PostPatch};
use quill_core::ports::{PostQuery, PostSort};
use quill_core::service::{InteractionService, PostService};
use support::MemoryPostRepository;

fn services() -> (PostService, InteractionService, Arc<MemoryPostRepository>) {
    let repo = Arc::new(MemoryPostRepository::new());
    (
        PostService::new(repo.clone()),
        InteractionService::new(repo.clone()),
        repo,
    )
}

fn draft(title: &str) -> NewPost {
    NewPost {
        title: title.to_string(),
        content: "<p>body</p>".to_string(),
        tags: vec![],
        featured_image: None,
    }
}

#[tokio::test]
async fn colliding_titles_get_suffixed_slugs() {
    let (posts, _, _) = services();
    let author = Some(Uuid::new_v4());

    let first = posts.create_post(author, draft("Hello World")).await.unwrap();
    let second = posts.create_post(author, draft("Hello World")).await.unwrap();
    let third = posts.create_post(author, draft("Hello World")).await.unwrap();

    assert_eq!(first.slug, "hello-world");
    assert_eq!(second.slug, "hello-world-1");
    assert_eq!(third.slug, "hello-world-2");

    let slugs: HashSet<_> = [&first.slug, &second.slug, &third.slug]
        .into_iter()
        .collect();
    assert_eq!(slugs.len(), 3);
}

#[tokio::test]
async fn slug_suffix_attempts_are_bounded() {
    let (posts, _, _) = services();
    let author = Some(Uuid::new_v4());

    // base slug plus the full range of numeric suffixes
    for _ in 0..=quill_core::slug::SLUG_SUFFIX_LIMIT {
        posts.create_post(author, draft("Evergreen")).await.unwrap();
    }

    let exhausted = posts.create_post(author, draft("Evergreen")).await;
    assert!(matches!(exhausted, Err(DomainError::Conflict(_))));
}

#[tokio::test]
async fn create_post_requires_authentication_and_valid_fields() {
    let (posts, _, _) = services();
    let author = Some(Uuid::new_v4());

    assert!(matches!(
        posts.create_post(None, draft("Anonymous")).await,
        Err(DomainError::Unauthorized)
    ));
    assert!(matches!(
        posts.create_post(author, draft("   ")).await,
        Err(DomainError::Validation(_))
    ));
    assert!(matches!(
        posts.create_post(author, draft(&"x".repeat(201))).await,
        Err(DomainError::Validation(_))
    ));

    let empty_body = NewPost {
        content: "  ".to_string(),
        ..draft("Has title")
    };
    assert!(matches!(
        posts.create_post(author, empty_body).await,
        Err(DomainError::Validation(_))
    ));
}

#[tokio::test]
async fn tags_are_normalized_on_create() {
    let (posts, _, _) = services();

    let input = NewPost {
        tags: vec![
            "Rust".to_string(),
            " Web ".to_string(),
            "rust".to_string(),
        ],
        ..draft("Tagged")
    };
    let post = posts
        .create_post(Some(Uuid::new_v4()), input)
        .await
        .unwrap();

    assert_eq!(post.tags, vec!["rust".to_string(), "web".to_string()]);
}

#[tokio::test]
async fn toggling_like_twice_restores_prior_state() {
    let (posts, interactions, _) = services();
    let author = Uuid::new_v4();
    let reader = Uuid::new_v4();

    let post = posts
        .create_post(Some(author), draft("Likeable"))
        .await
        .unwrap();

    let liked = interactions
        .toggle_like(post.id, Some(reader))
        .await
        .unwrap();
    assert_eq!(liked.like_count, 1);
    assert!(liked.liked_by(reader));

    let unliked = interactions
        .toggle_like(post.id, Some(reader))
        .await
        .unwrap();
    assert_eq!(unliked.like_count, 0);
    assert!(!unliked.liked_by(reader));
}

#[tokio::test]
async fn counters_always_match_their_collections() {
    let (posts, interactions, repo) = services();
    let author = Uuid::new_v4();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let post = posts
        .create_post(Some(author), draft("Busy thread"))
        .await
        .unwrap();

    interactions.toggle_like(post.id, Some(alice)).await.unwrap();
    interactions.toggle_like(post.id, Some(bob)).await.unwrap();
    interactions.toggle_like(post.id, Some(alice)).await.unwrap(); // un-like
    interactions
        .add_comment(post.id, Some(alice), "first!")
        .await
        .unwrap();
    interactions
        .add_comment(post.id, Some(bob), "second")
        .await
        .unwrap();

    let stored = repo.stored(post.id).unwrap();
    assert_eq!(stored.like_count, stored.likes.len() as i64);
    assert_eq!(stored.comment_count, stored.comments.len() as i64);
    assert_eq!(stored.like_count, 1);
    assert_eq!(stored.comment_count, 2);
    assert_eq!(stored.likes, vec![bob]);
}

#[tokio::test]
async fn comments_append_in_order_with_server_timestamps() {
    let (posts, interactions, _) = services();
    let author = Uuid::new_v4();

    let post = posts
        .create_post(Some(author), draft("Discussion"))
        .await
        .unwrap();

    interactions
        .add_comment(post.id, Some(author), "  older  ")
        .await
        .unwrap();
    let updated = interactions
        .add_comment(post.id, Some(author), "newer")
        .await
        .unwrap();

    assert_eq!(updated.comments.len(), 2);
    // content is stored trimmed, oldest first
    assert_eq!(updated.comments[0].content, "older");
    assert_eq!(updated.comments[1].content, "newer");
    assert!(updated.comments[0].created_at <= updated.comments[1].created_at);
}

#[tokio::test]
async fn empty_comments_are_rejected() {
    let (posts, interactions, repo) = services();
    let author = Uuid::new_v4();

    let post = posts
        .create_post(Some(author), draft("Quiet"))
        .await
        .unwrap();

    let result = interactions.add_comment(post.id, Some(author), "   ").await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
    assert_eq!(repo.stored(post.id).unwrap().comment_count, 0);
}

#[tokio::test]
async fn interactions_require_authentication() {
    let (posts, interactions, _) = services();

    let post = posts
        .create_post(Some(Uuid::new_v4()), draft("Members only"))
        .await
        .unwrap();

    assert!(matches!(
        interactions.toggle_like(post.id, None).await,
        Err(DomainError::Unauthorized)
    ));
    assert!(matches!(
        interactions.add_comment(post.id, None, "hi").await,
        Err(DomainError::Unauthorized)
    ));
}

#[tokio::test]
async fn interactions_on_missing_posts_are_not_found() {
    let (_, interactions, _) = services();

    let result = interactions
        .toggle_like(Uuid::new_v4(), Some(Uuid::new_v4()))
        .await;
    assert!(matches!(result, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn only_the_author_may_update_or_delete() {
    let (posts, _, repo) = services();
    let author = Uuid::new_v4();
    let intruder = Uuid::new_v4();

    let post = posts
        .create_post(Some(author), draft("Mine"))
        .await
        .unwrap();

    let patch = PostPatch {
        title: Some("Stolen".to_string()),
        ..Default::default()
    };
    let update = posts.update_post(post.id, Some(intruder), patch).await;
    assert!(matches!(update, Err(DomainError::Forbidden)));

    let anonymous = posts
        .update_post(post.id, None, PostPatch::default())
        .await;
    assert!(matches!(anonymous, Err(DomainError::Unauthorized)));

    let delete = posts.delete_post(post.id, Some(intruder)).await;
    assert!(matches!(delete, Err(DomainError::Forbidden)));

    // the post is untouched
    let stored = repo.stored(post.id).unwrap();
    assert_eq!(stored.title, "Mine");
    assert_eq!(stored.updated_at, post.updated_at);
}

#[tokio::test]
async fn author_can_update_and_delete() {
    let (posts, _, _) = services();
    let author = Uuid::new_v4();

    let post = posts
        .create_post(Some(author), draft("Original"))
        .await
        .unwrap();

    let patch = PostPatch {
        content: Some("<p>revised</p>".to_string()),
        tags: Some(vec!["Updates".to_string()]),
        ..Default::default()
    };
    let updated = posts
        .update_post(post.id, Some(author), patch)
        .await
        .unwrap();
    assert_eq!(updated.content, "<p>revised</p>");
    assert_eq!(updated.tags, vec!["updates".to_string()]);
    // unchanged title keeps the slug
    assert_eq!(updated.slug, "original");

    posts.delete_post(post.id, Some(author)).await.unwrap();
    let gone = posts.get_post(&post.id.to_string()).await;
    assert!(matches!(gone, Err(DomainError::NotFound(_))));
}

#[tokio::test]
async fn retitling_rederives_the_slug_with_collision_policy() {
    let (posts, _, _) = services();
    let author = Some(Uuid::new_v4());

    posts.create_post(author, draft("Hello World")).await.unwrap();
    let other = posts.create_post(author, draft("Goodbye")).await.unwrap();

    let patch = PostPatch {
        title: Some("Hello World".to_string()),
        ..Default::default()
    };
    let renamed = posts
        .update_post(other.id, author, patch)
        .await
        .unwrap();
    assert_eq!(renamed.slug, "hello-world-1");

    // retitling to the same title leaves the slug alone
    let same = posts
        .update_post(
            renamed.id,
            author,
            PostPatch {
                title: Some("Hello World".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(same.slug, "hello-world-1");
}

#[tokio::test]
async fn display_reads_count_views_edit_loads_do_not() {
    let (posts, _, repo) = services();
    let author = Uuid::new_v4();

    let post = posts
        .create_post(Some(author), draft("Watched"))
        .await
        .unwrap();

    let by_slug = posts.get_post("watched").await.unwrap();
    assert_eq!(by_slug.view_count, 1);
    let by_id = posts.get_post(&post.id.to_string()).await.unwrap();
    assert_eq!(by_id.view_count, 2);

    // an update loads the post without counting a view
    posts
        .update_post(post.id, Some(author), PostPatch::default())
        .await
        .unwrap();
    assert_eq!(repo.stored(post.id).unwrap().view_count, 2);
}

#[tokio::test]
async fn pagination_covers_every_post_exactly_once() {
    let (posts, _, _) = services();
    let author = Some(Uuid::new_v4());

    for i in 0..25 {
        posts.create_post(author, draft(&format!("Post {i}"))).await.unwrap();
    }

    let mut seen = HashSet::new();
    let mut page_number = 1;
    loop {
        let page = posts
            .list_posts(PostQuery {
                page: page_number,
                page_size: 10,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.total_posts, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.has_prev, page_number > 1);
        for post in &page.posts {
            assert!(seen.insert(post.id), "duplicate post across pages");
        }

        if !page.has_next {
            break;
        }
        page_number += 1;
    }

    assert_eq!(page_number, 3);
    assert_eq!(seen.len(), 25);
}

#[tokio::test]
async fn listing_filters_by_author_tag_and_search() {
    let (posts, _, _) = services();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let tagged = NewPost {
        tags: vec!["Rust".to_string()],
        ..draft("Alice on ownership")
    };
    posts.create_post(Some(alice), tagged).await.unwrap();
    posts
        .create_post(Some(bob), draft("Bob on gardening"))
        .await
        .unwrap();

    let by_author = posts
        .list_posts(PostQuery {
            author: Some(alice),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_author.total_posts, 1);
    assert_eq!(by_author.posts[0].author_id, alice);

    // tag filters normalize case the same way tags do
    let by_tag = posts
        .list_posts(PostQuery {
            tag: Some("RUST".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_tag.total_posts, 1);

    let by_search = posts
        .list_posts(PostQuery {
            search: Some("gardening".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_search.total_posts, 1);
    assert_eq!(by_search.posts[0].title, "Bob on gardening");
}

#[tokio::test]
async fn listing_orders_newest_first_by_default() {
    let (posts, _, _) = services();
    let author = Some(Uuid::new_v4());

    posts.create_post(author, draft("First")).await.unwrap();
    posts.create_post(author, draft("Second")).await.unwrap();

    let newest = posts.list_posts(PostQuery::default()).await.unwrap();
    assert_eq!(newest.posts[0].title, "Second");

    let oldest = posts
        .list_posts(PostQuery {
            sort: PostSort::Oldest,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(oldest.posts[0].title, "First");
}
