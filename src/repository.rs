use crate::models::{
    Blog, BlogOwner, BlogResponse, BlogSummary, NewBlog, NewUser, UpdateBlogRequest, User,
    UserResponse,
};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Repository Trait
///
/// Defines the abstract contract for all persistence operations against the
/// two stores (users and blogs). Handlers interact with this boundary only,
/// never with the concrete implementation, which keeps the store swappable
/// between Postgres and the in-memory implementation used by tests.
///
/// Every method is a single independent round trip. Failures propagate as
/// errors and surface to the client as a 500; there is no retry logic and no
/// transaction spanning two calls — the create-blog workflow's second write
/// (the owner's list append) is deliberately a separate operation.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) safely shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Blogs ---
    /// All blogs with their owner populated, for the public listing.
    async fn get_blogs(&self) -> Result<Vec<BlogResponse>, sqlx::Error>;
    /// A single raw blog record (owner as id, not populated).
    async fn get_blog(&self, id: Uuid) -> Result<Option<Blog>, sqlx::Error>;
    async fn create_blog(&self, new: NewBlog) -> Result<Blog, sqlx::Error>;
    /// Overwrites title/author/url/likes with exactly the supplied values.
    /// Returns None when no blog has that id. The owner column is untouched.
    async fn update_blog(
        &self,
        id: Uuid,
        fields: UpdateBlogRequest,
    ) -> Result<Option<Blog>, sqlx::Error>;
    /// Returns true if a row was removed.
    async fn delete_blog(&self, id: Uuid) -> Result<bool, sqlx::Error>;
    /// The dependent second write of the create workflow: appends the new
    /// blog's id to the owner's denormalized list.
    async fn append_blog_to_user(&self, user_id: Uuid, blog_id: Uuid)
    -> Result<(), sqlx::Error>;

    // --- Users ---
    /// All users with their blogs list resolved from the stored id array.
    async fn get_users(&self) -> Result<Vec<UserResponse>, sqlx::Error>;
    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error>;
    async fn create_user(&self, new: NewUser) -> Result<User, sqlx::Error>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The concrete implementation of the `Repository` trait, backed by
/// PostgreSQL. The `users.blogs uuid[]` column carries the denormalized
/// back-reference the document-style data model calls for.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Flat row shape for the owner-populated blog listing query.
#[derive(FromRow)]
struct BlogWithOwnerRow {
    id: Uuid,
    title: String,
    author: Option<String>,
    url: Option<String>,
    likes: Option<i64>,
    user_id: Option<Uuid>,
    username: Option<String>,
    name: Option<String>,
}

impl From<BlogWithOwnerRow> for BlogResponse {
    fn from(row: BlogWithOwnerRow) -> Self {
        BlogResponse {
            id: row.id,
            title: row.title,
            author: row.author,
            url: row.url,
            likes: row.likes,
            user: row.user_id.map(|id| BlogOwner {
                id,
                username: row.username.unwrap_or_default(),
                name: row.name.unwrap_or_default(),
            }),
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// get_blogs
    ///
    /// Lists every blog, left-joined with its owner so the response carries
    /// the owner's username and name. Ownerless blogs survive the join with
    /// a null owner.
    async fn get_blogs(&self) -> Result<Vec<BlogResponse>, sqlx::Error> {
        let rows = sqlx::query_as::<_, BlogWithOwnerRow>(
            r#"
            SELECT b.id, b.title, b.author, b.url, b.likes, b.user_id,
                   u.username, u.name
            FROM blogs b
            LEFT JOIN users u ON u.id = b.user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(BlogResponse::from).collect())
    }

    async fn get_blog(&self, id: Uuid) -> Result<Option<Blog>, sqlx::Error> {
        sqlx::query_as::<_, Blog>(
            "SELECT id, title, author, url, likes, user_id FROM blogs WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// create_blog
    ///
    /// Inserts a fully-defaulted blog record. The caller is responsible for
    /// the dependent `append_blog_to_user` write afterwards.
    async fn create_blog(&self, new: NewBlog) -> Result<Blog, sqlx::Error> {
        sqlx::query_as::<_, Blog>(
            r#"
            INSERT INTO blogs (id, title, author, url, likes, user_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, author, url, likes, user_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.title)
        .bind(new.author)
        .bind(new.url)
        .bind(new.likes)
        .bind(new.user)
        .fetch_one(&self.pool)
        .await
    }

    /// update_blog
    ///
    /// Overwrites the four content fields unconditionally. A None binds as
    /// NULL, so omitted fields are unset rather than preserved. `user_id` is
    /// absent from the SET list: ownership is immutable through update.
    async fn update_blog(
        &self,
        id: Uuid,
        fields: UpdateBlogRequest,
    ) -> Result<Option<Blog>, sqlx::Error> {
        sqlx::query_as::<_, Blog>(
            r#"
            UPDATE blogs
            SET title = $2, author = $3, url = $4, likes = $5
            WHERE id = $1
            RETURNING id, title, author, url, likes, user_id
            "#,
        )
        .bind(id)
        .bind(fields.title)
        .bind(fields.author)
        .bind(fields.url)
        .bind(fields.likes)
        .fetch_optional(&self.pool)
        .await
    }

    /// delete_blog
    ///
    /// Removes the record. The former owner's `blogs` list is left as-is —
    /// the dangling reference is an accepted limitation of this data model.
    async fn delete_blog(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn append_blog_to_user(
        &self,
        user_id: Uuid,
        blog_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET blogs = array_append(blogs, $2) WHERE id = $1")
            .bind(user_id)
            .bind(blog_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// get_users
    ///
    /// Lists every user, resolving the blogs list through the stored id
    /// array (one lookup per user, ordered by array position). This follows
    /// the denormalized list rather than reverse-querying `blogs.user_id`,
    /// so the two stay observably independent.
    async fn get_users(&self) -> Result<Vec<UserResponse>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, username, name, password_hash, blogs FROM users",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut responses = Vec::with_capacity(users.len());
        for user in users {
            let blogs = sqlx::query_as::<_, BlogSummary>(
                r#"
                SELECT id, title, author, url, likes
                FROM blogs
                WHERE id = ANY($1)
                ORDER BY array_position($1, id)
                "#,
            )
            .bind(user.blogs.clone())
            .fetch_all(&self.pool)
            .await?;

            responses.push(UserResponse {
                id: user.id,
                username: user.username,
                name: user.name,
                blogs,
            });
        }
        Ok(responses)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, name, password_hash, blogs FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, name, password_hash, blogs FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_user(&self, new: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, name, password_hash, blogs)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, name, password_hash, blogs
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new.username)
        .bind(new.name)
        .bind(new.password_hash)
        .bind(Vec::<Uuid>::new())
        .fetch_one(&self.pool)
        .await
    }
}

/// MemoryRepository
///
/// An in-memory implementation of the `Repository` trait. Tests inject one
/// per run instead of sharing process-wide database state; each instance is
/// a fresh, isolated store. Semantics mirror the Postgres implementation,
/// including the denormalized `blogs` list on users.
#[derive(Default)]
pub struct MemoryRepository {
    users: RwLock<Vec<User>>,
    blogs: RwLock<Vec<Blog>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get_blogs(&self) -> Result<Vec<BlogResponse>, sqlx::Error> {
        let users = self.users.read().expect("users lock");
        let blogs = self.blogs.read().expect("blogs lock");

        Ok(blogs
            .iter()
            .map(|b| BlogResponse {
                id: b.id,
                title: b.title.clone(),
                author: b.author.clone(),
                url: b.url.clone(),
                likes: b.likes,
                user: b.user.and_then(|owner_id| {
                    users.iter().find(|u| u.id == owner_id).map(|u| BlogOwner {
                        id: u.id,
                        username: u.username.clone(),
                        name: u.name.clone(),
                    })
                }),
            })
            .collect())
    }

    async fn get_blog(&self, id: Uuid) -> Result<Option<Blog>, sqlx::Error> {
        let blogs = self.blogs.read().expect("blogs lock");
        Ok(blogs.iter().find(|b| b.id == id).cloned())
    }

    async fn create_blog(&self, new: NewBlog) -> Result<Blog, sqlx::Error> {
        let blog = Blog {
            id: Uuid::new_v4(),
            title: new.title,
            author: Some(new.author),
            url: Some(new.url),
            likes: Some(new.likes),
            user: Some(new.user),
        };
        self.blogs.write().expect("blogs lock").push(blog.clone());
        Ok(blog)
    }

    async fn update_blog(
        &self,
        id: Uuid,
        fields: UpdateBlogRequest,
    ) -> Result<Option<Blog>, sqlx::Error> {
        let mut blogs = self.blogs.write().expect("blogs lock");
        let Some(blog) = blogs.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        if let Some(title) = fields.title {
            blog.title = title;
        }
        blog.author = fields.author;
        blog.url = fields.url;
        blog.likes = fields.likes;
        Ok(Some(blog.clone()))
    }

    async fn delete_blog(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut blogs = self.blogs.write().expect("blogs lock");
        let before = blogs.len();
        blogs.retain(|b| b.id != id);
        Ok(blogs.len() < before)
    }

    async fn append_blog_to_user(
        &self,
        user_id: Uuid,
        blog_id: Uuid,
    ) -> Result<(), sqlx::Error> {
        let mut users = self.users.write().expect("users lock");
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.blogs.push(blog_id);
        }
        Ok(())
    }

    async fn get_users(&self) -> Result<Vec<UserResponse>, sqlx::Error> {
        let users = self.users.read().expect("users lock");
        let blogs = self.blogs.read().expect("blogs lock");

        Ok(users
            .iter()
            .map(|u| UserResponse {
                id: u.id,
                username: u.username.clone(),
                name: u.name.clone(),
                // Resolve through the stored id list, preserving its order.
                blogs: u
                    .blogs
                    .iter()
                    .filter_map(|blog_id| {
                        blogs.iter().find(|b| b.id == *blog_id).map(|b| BlogSummary {
                            id: b.id,
                            title: b.title.clone(),
                            author: b.author.clone(),
                            url: b.url.clone(),
                            likes: b.likes,
                        })
                    })
                    .collect(),
            })
            .collect())
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let users = self.users.read().expect("users lock");
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        let users = self.users.read().expect("users lock");
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, new: NewUser) -> Result<User, sqlx::Error> {
        let user = User {
            id: Uuid::new_v4(),
            username: new.username,
            name: new.name,
            password_hash: new.password_hash,
            blogs: Vec::new(),
        };
        self.users.write().expect("users lock").push(user.clone());
        Ok(user)
    }
}
