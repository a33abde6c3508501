use blog_list::{AppConfig, AppState, MemoryRepository, RepositoryState, create_router};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

// --- Test Harness ---

// Each test spawns its own server over a fresh in-memory store, so there is
// no shared state to reset between cases.
struct TestApp {
    address: String,
    client: reqwest::Client,
}

async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new()) as RepositoryState;
    let state = AppState {
        repo,
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    /// Registers a user and returns a bearer token for it.
    async fn register_and_login(&self, username: &str) -> String {
        let resp = self
            .client
            .post(format!("{}/api/users", self.address))
            .json(&json!({ "username": username, "name": "Test User", "password": "password123" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);

        let resp = self
            .client
            .post(format!("{}/api/login", self.address))
            .json(&json!({ "username": username, "password": "password123" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);

        let body: Value = resp.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_blog(&self, token: &str, payload: Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/blogs", self.address))
            .bearer_auth(token)
            .json(&payload)
            .send()
            .await
            .unwrap()
    }

    async fn list_blogs(&self) -> Vec<Value> {
        let resp = self
            .client
            .get(format!("{}/api/blogs", self.address))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        resp.json().await.unwrap()
    }
}

// --- Listing ---

#[tokio::test]
async fn blogs_are_returned_as_json_with_an_id_field() {
    let app = spawn_app().await;
    let token = app.register_and_login("root").await;

    app.create_blog(&token, json!({ "title": "HTML is easy", "likes": 10 }))
        .await;
    app.create_blog(
        &token,
        json!({ "title": "Browser can execute only JavaScript", "likes": 20 }),
    )
    .await;

    let resp = app
        .client
        .get(format!("{}/api/blogs", app.address))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert!(
        resp.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("application/json")
    );

    let blogs: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(blogs.len(), 2);

    for blog in &blogs {
        // The representation exposes `id` and nothing storage-native.
        assert!(blog["id"].is_string());
        assert!(blog.get("_id").is_none());
        assert!(blog.get("user_id").is_none());
    }

    let titles: Vec<&str> = blogs.iter().map(|b| b["title"].as_str().unwrap()).collect();
    assert!(titles.contains(&"HTML is easy"));
    assert!(titles.contains(&"Browser can execute only JavaScript"));

    let likes: Vec<i64> = blogs.iter().map(|b| b["likes"].as_i64().unwrap()).collect();
    assert!(likes.contains(&10));
    assert!(likes.contains(&20));
}

#[tokio::test]
async fn listed_blogs_carry_the_owner_username_and_name() {
    let app = spawn_app().await;
    let token = app.register_and_login("mluukkai").await;

    app.create_blog(&token, json!({ "title": "Type wars" })).await;

    let blogs = app.list_blogs().await;
    assert_eq!(blogs[0]["user"]["username"], "mluukkai");
    assert_eq!(blogs[0]["user"]["name"], "Test User");
    assert!(blogs[0]["user"]["id"].is_string());
}

// --- Single Blog ---

#[tokio::test]
async fn a_single_blog_is_returned_unpopulated() {
    let app = spawn_app().await;
    let token = app.register_and_login("root").await;

    let created: Value = app
        .create_blog(&token, json!({ "title": "First class tests" }))
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let resp = app
        .client
        .get(format!("{}/api/blogs/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let blog: Value = resp.json().await.unwrap();
    assert_eq!(blog["title"], "First class tests");
    // The detail view keeps the owner as a plain id reference.
    assert!(blog["user"].is_string());
}

#[tokio::test]
async fn fetching_a_missing_blog_returns_404() {
    let app = spawn_app().await;

    let resp = app
        .client
        .get(format!(
            "{}/api/blogs/00000000-0000-0000-0000-000000000000",
            app.address
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

// --- Creation ---

#[tokio::test]
async fn a_blog_created_without_likes_defaults_to_zero() {
    let app = spawn_app().await;
    let token = app.register_and_login("root").await;

    let resp = app
        .create_blog(
            &token,
            json!({ "title": "Canonical string reduction", "author": "Edsger W. Dijkstra", "url": "http://example.com" }),
        )
        .await;
    assert_eq!(resp.status(), 201);

    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["likes"], 0);

    let blogs = app.list_blogs().await;
    assert_eq!(blogs[0]["likes"], 0);
}

#[tokio::test]
async fn a_blog_without_a_title_can_not_be_added() {
    let app = spawn_app().await;
    let token = app.register_and_login("root").await;

    let resp = app
        .create_blog(&token, json!({ "likes": 0, "author": "Gregory B", "url": "www.example.com" }))
        .await;
    assert_eq!(resp.status(), 400);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "title is required");

    assert_eq!(app.list_blogs().await.len(), 0);
}

#[tokio::test]
async fn a_blog_can_not_be_added_without_a_token() {
    let app = spawn_app().await;
    app.register_and_login("root").await;

    let resp = app
        .client
        .post(format!("{}/api/blogs", app.address))
        .json(&json!({ "title": "No token" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    assert_eq!(app.list_blogs().await.len(), 0);
}

// --- Deletion ---

#[tokio::test]
async fn deleting_without_a_token_fails_and_keeps_the_record() {
    let app = spawn_app().await;
    let token = app.register_and_login("root").await;

    let created: Value = app
        .create_blog(&token, json!({ "title": "Keep me" }))
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let resp = app
        .client
        .delete(format!("{}/api/blogs/{}", app.address, id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    assert_eq!(app.list_blogs().await.len(), 1);
}

#[tokio::test]
async fn deleting_with_another_users_token_fails() {
    let app = spawn_app().await;
    let owner_token = app.register_and_login("owner").await;
    let other_token = app.register_and_login("intruder").await;

    let created: Value = app
        .create_blog(&owner_token, json!({ "title": "Owned" }))
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let resp = app
        .client
        .delete(format!("{}/api/blogs/{}", app.address, id))
        .bearer_auth(&other_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    assert_eq!(app.list_blogs().await.len(), 1);
}

#[tokio::test]
async fn the_owner_can_delete_their_blog() {
    let app = spawn_app().await;
    let token = app.register_and_login("root").await;

    let created: Value = app
        .create_blog(&token, json!({ "title": "Short-lived" }))
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();
    app.create_blog(&token, json!({ "title": "Survivor" })).await;

    let resp = app
        .client
        .delete(format!("{}/api/blogs/{}", app.address, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    // Exactly one record removed.
    let blogs = app.list_blogs().await;
    assert_eq!(blogs.len(), 1);
    assert_eq!(blogs[0]["title"], "Survivor");

    // Deleting again resolves to not-found, not an error.
    let resp = app
        .client
        .delete(format!("{}/api/blogs/{}", app.address, id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

// --- Update ---

#[tokio::test]
async fn updating_likes_is_visible_on_refetch() {
    let app = spawn_app().await;
    let token = app.register_and_login("root").await;

    let created: Value = app
        .create_blog(
            &token,
            json!({ "title": "Incremented", "author": "A", "url": "http://u", "likes": 10 }),
        )
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    let resp = app
        .client
        .put(format!("{}/api/blogs/{}", app.address, id))
        .json(&json!({ "title": "Incremented", "author": "A", "url": "http://u", "likes": 11 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["likes"], 11);

    let refetched: Value = app
        .client
        .get(format!("{}/api/blogs/{}", app.address, id))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(refetched["likes"], 11);
}

#[tokio::test]
async fn update_overwrites_with_exactly_the_supplied_fields() {
    let app = spawn_app().await;
    let token = app.register_and_login("root").await;

    let created: Value = app
        .create_blog(
            &token,
            json!({ "title": "Full", "author": "Someone", "url": "http://u", "likes": 5 }),
        )
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap();

    // Omitted fields are unset, not preserved: update has no defaulting.
    let resp = app
        .client
        .put(format!("{}/api/blogs/{}", app.address, id))
        .json(&json!({ "title": "Trimmed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["title"], "Trimmed");
    assert!(updated["author"].is_null());
    assert!(updated["url"].is_null());
    assert!(updated["likes"].is_null());
    // Ownership survives update untouched.
    assert!(updated["user"].is_string());
}

#[tokio::test]
async fn updating_a_missing_blog_returns_404() {
    let app = spawn_app().await;

    let resp = app
        .client
        .put(format!(
            "{}/api/blogs/00000000-0000-0000-0000-000000000000",
            app.address
        ))
        .json(&json!({ "title": "Ghost", "likes": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

// --- End-to-end scenario ---

#[tokio::test]
async fn seeded_blogs_are_all_returned_with_their_like_counts() {
    let app = spawn_app().await;
    let token = app.register_and_login("root").await;

    app.create_blog(&token, json!({ "title": "HTML is easy", "likes": 10 }))
        .await;
    app.create_blog(
        &token,
        json!({ "title": "Browser can execute only JavaScript", "likes": 20 }),
    )
    .await;

    let blogs = app.list_blogs().await;
    assert_eq!(blogs.len(), 2);

    let find = |title: &str| {
        blogs
            .iter()
            .find(|b| b["title"] == title)
            .unwrap_or_else(|| panic!("blog '{title}' not listed"))
    };
    assert_eq!(find("HTML is easy")["likes"], 10);
    assert_eq!(find("Browser can execute only JavaScript")["likes"], 20);
}
