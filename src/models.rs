use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical user record from the `users` table. The password hash is stored
/// here but never serialized out: every endpoint that returns a user relies on
/// `#[serde(skip_serializing)]` to keep it off the wire.
#[derive(Debug, Clone, Serialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    /// Unique login name, at least 3 characters (enforced at registration).
    pub username: String,
    /// Display name. Stored as an empty string when omitted at registration.
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Denormalized back-reference: ids of the blogs this user created, in
    /// insertion order. Appended by the create-blog workflow as a second
    /// write; never cleaned up when a blog is deleted.
    pub blogs: Vec<Uuid>,
}

/// Blog
///
/// A blog record from the `blogs` table. `author`, `url` and `likes` are
/// nullable: the create workflow defaults them (`""`, `""`, `0`), but the
/// update workflow overwrites all four content fields with whatever the
/// request supplied, so an omitted field becomes unset.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Blog {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,

    /// Maps SQL column "user_id" to the JSON field "user".
    /// The owning user. Set once at creation, never modified by update.
    #[sqlx(rename = "user_id")]
    pub user: Option<Uuid>,
}

// --- Populated Output Schemas ---

/// BlogOwner
///
/// The owner fields embedded in a listed blog (GET /api/blogs).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BlogOwner {
    pub id: Uuid,
    pub username: String,
    pub name: String,
}

/// BlogResponse
///
/// A blog with its owner populated. Ownerless blogs carry `"user": null`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct BlogResponse {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
    pub user: Option<BlogOwner>,
}

/// BlogSummary
///
/// The blog fields embedded in a listed user (GET /api/users).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct BlogSummary {
    pub id: Uuid,
    pub title: String,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

/// UserResponse
///
/// A user with the blogs list resolved from the stored id array. The resolve
/// follows the denormalized list, not a reverse query, so a blog missing from
/// the owner's list (the accepted create-crash window) stays missing here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub name: String,
    pub blogs: Vec<BlogSummary>,
}

/// --- Request Payloads (Input Schemas) ---

/// CreateBlogRequest
///
/// Input payload for POST /api/blogs. `title` is optional at the type level
/// so its absence surfaces as the workflow's own 400 rather than a
/// deserialization rejection; the other fields are defaulted when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateBlogRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

/// UpdateBlogRequest
///
/// Replacement payload for PUT /api/blogs/{id}. All four content fields are
/// overwritten with exactly these values: unlike creation there is no
/// defaulting, so an omitted `author`/`url`/`likes` unsets the stored value.
/// The owner is not part of this payload and cannot be changed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateBlogRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub url: Option<String>,
    pub likes: Option<i64>,
}

/// CreateUserRequest
///
/// Input payload for POST /api/users. Validation (presence, minimum lengths,
/// uniqueness) happens in the handler so the error messages stay exact.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// LoginRequest
///
/// Credentials for POST /api/login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// LoginResponse
///
/// Successful login payload: a bearer token plus the identity it encodes.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub name: String,
}

// --- Internal Repository Inputs ---

/// NewBlog
///
/// A fully-defaulted blog ready for insertion. Built by the create workflow
/// after validation: `likes` 0 and `author`/`url` empty string when the
/// request omitted them, owner taken from the authenticated caller.
#[derive(Debug, Clone)]
pub struct NewBlog {
    pub title: String,
    pub author: String,
    pub url: String,
    pub likes: i64,
    pub user: Uuid,
}

/// NewUser
///
/// A validated registration ready for insertion. The password has already
/// been hashed; the plaintext never reaches the repository.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub password_hash: String,
}
