use crate::{
    AppState,
    auth::{self, AuthUser},
    error::ApiError,
    models::{
        Blog, BlogResponse, CreateBlogRequest, CreateUserRequest, LoginRequest, LoginResponse,
        NewBlog, NewUser, UpdateBlogRequest, User, UserResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

// --- Blog Handlers ---

/// get_blogs
///
/// [Public Route] Lists every blog with its owner's username and name
/// populated. Ownerless blogs are listed with `"user": null`.
#[utoipa::path(
    get,
    path = "/api/blogs",
    responses((status = 200, description = "All blogs with owners populated", body = [BlogResponse]))
)]
pub async fn get_blogs(State(state): State<AppState>) -> Result<Json<Vec<BlogResponse>>, ApiError> {
    let blogs = state.repo.get_blogs().await?;
    Ok(Json(blogs))
}

/// get_blog
///
/// [Public Route] Retrieves a single blog by id, unpopulated (the owner
/// appears as an id reference).
#[utoipa::path(
    get,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 200, description = "Found", body = Blog),
        (status = 404, description = "No blog with that id")
    )
)]
pub async fn get_blog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Blog>, ApiError> {
    match state.repo.get_blog(id).await? {
        Some(blog) => Ok(Json(blog)),
        None => Err(ApiError::NotFound),
    }
}

/// create_blog
///
/// [Authenticated Route] Creates a blog owned by the caller.
///
/// The workflow: the `AuthUser` extractor has already resolved the bearer
/// token to an existing user (401 otherwise). A missing or empty title is a
/// 400 and nothing is written. Defaults are applied (`likes` 0, `author` and
/// `url` empty string), the blog is inserted, and only then is its id
/// appended to the owner's `blogs` list as a second, dependent write. The
/// two writes are not wrapped in a transaction; a failure between them
/// leaves a blog that exists but is not yet in the owner's list.
#[utoipa::path(
    post,
    path = "/api/blogs",
    request_body = CreateBlogRequest,
    responses(
        (status = 201, description = "Created", body = Blog),
        (status = 400, description = "Missing title"),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn create_blog(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateBlogRequest>,
) -> Result<(StatusCode, Json<Blog>), ApiError> {
    let title = payload
        .title
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Validation("title is required".to_string()))?;

    let blog = state
        .repo
        .create_blog(NewBlog {
            title,
            author: payload.author.unwrap_or_default(),
            url: payload.url.unwrap_or_default(),
            likes: payload.likes.unwrap_or(0),
            user: user_id,
        })
        .await?;

    // Dependent second write: the blog insert above must have succeeded
    // before the owner's list is touched.
    state.repo.append_blog_to_user(user_id, blog.id).await?;

    Ok((StatusCode::CREATED, Json(blog)))
}

/// update_blog
///
/// [Public Route] Replaces a blog's title, author, url and likes with the
/// supplied values. Fields omitted from the payload are unset, not kept —
/// update deliberately does not share creation's defaulting. Ownership is
/// not checked and the owner is never modified.
#[utoipa::path(
    put,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    request_body = UpdateBlogRequest,
    responses(
        (status = 200, description = "Updated", body = Blog),
        (status = 400, description = "Missing title"),
        (status = 404, description = "No blog with that id")
    )
)]
pub async fn update_blog(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBlogRequest>,
) -> Result<Json<Blog>, ApiError> {
    // Existence first: a missing record is a 404 even when the payload is
    // also invalid.
    if state.repo.get_blog(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    if payload.title.as_deref().is_none_or(|t| t.is_empty()) {
        return Err(ApiError::Validation("title is required".to_string()));
    }

    match state.repo.update_blog(id, payload).await? {
        Some(blog) => Ok(Json(blog)),
        // Deleted between the two round trips.
        None => Err(ApiError::NotFound),
    }
}

/// delete_blog
///
/// [Authenticated Route] Deletes a blog, gated on ownership.
///
/// Check order for an authenticated caller: existence (404), then owner
/// equality against the caller's id (401). A blog with no recorded owner is
/// deletable by no one. The former owner's `blogs` list is not compensated.
#[utoipa::path(
    delete,
    path = "/api/blogs/{id}",
    params(("id" = Uuid, Path, description = "Blog ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Not authenticated or not the owner"),
        (status = 404, description = "No blog with that id")
    )
)]
pub async fn delete_blog(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let blog = state.repo.get_blog(id).await?.ok_or(ApiError::NotFound)?;

    match blog.user {
        Some(owner) if owner == user_id => {}
        _ => {
            return Err(ApiError::Unauthorized(
                "only the owner can delete a blog".to_string(),
            ));
        }
    }

    state.repo.delete_blog(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// --- User Handlers ---

/// get_users
///
/// [Public Route] Lists every user with the blogs list populated from the
/// user's stored id list.
#[utoipa::path(
    get,
    path = "/api/users",
    responses((status = 200, description = "All users with blogs populated", body = [UserResponse]))
)]
pub async fn get_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.repo.get_users().await?;
    Ok(Json(users))
}

/// create_user
///
/// [Public Route] Registers a new user. Validation order and messages are
/// part of the contract: username presence, username length (≥3), password
/// presence, password length (≥8), then username uniqueness. The password
/// is hashed before it reaches the repository; the stored hash is excluded
/// from the response by the model's serialization.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Registered", body = User),
        (status = 400, description = "Validation failure or duplicate username")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let username = match payload.username {
        Some(u) if !u.is_empty() => u,
        _ => return Err(ApiError::Validation("username is required".to_string())),
    };
    if username.chars().count() < 3 {
        return Err(ApiError::Validation(
            "username must be at least 3 characters long".to_string(),
        ));
    }

    let password = match payload.password {
        Some(p) if !p.is_empty() => p,
        _ => return Err(ApiError::Validation("password is required".to_string())),
    };
    if password.chars().count() < 8 {
        return Err(ApiError::Validation(
            "password must be at least 8 characters long".to_string(),
        ));
    }

    if state
        .repo
        .find_user_by_username(&username)
        .await?
        .is_some()
    {
        return Err(ApiError::Validation("username must be unique".to_string()));
    }

    let password_hash =
        auth::hash_password(&password).map_err(|e| ApiError::Internal(e.to_string()))?;

    let user = state
        .repo
        .create_user(NewUser {
            username,
            name: payload.name.unwrap_or_default(),
            password_hash,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// login
///
/// [Public Route] Verifies a username/password pair and issues a bearer
/// token. An unknown username and a wrong password fail identically.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state.repo.find_user_by_username(&payload.username).await?;

    let password_ok = user
        .as_ref()
        .map(|u| auth::verify_password(&payload.password, &u.password_hash))
        .unwrap_or(false);

    let Some(user) = user.filter(|_| password_ok) else {
        return Err(ApiError::Unauthorized(
            "invalid username or password".to_string(),
        ));
    };

    let token = auth::create_token(&user, &state.config.jwt_secret)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        name: user.name,
    }))
}
