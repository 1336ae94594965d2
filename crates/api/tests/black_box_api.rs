use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = backoffice_api::app::build_app(jwt_secret.to_string()).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Debug, serde::Deserialize)]
struct TokenClaims {
    sub: uuid::Uuid,
    username: String,
    roles: Vec<String>,
    iat: i64,
    exp: i64,
}

fn decode_claims(jwt_secret: &str, token: &str) -> TokenClaims {
    let mut validation = jsonwebtoken::Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    jsonwebtoken::decode::<TokenClaims>(
        token,
        &jsonwebtoken::DecodingKey::from_secret(jwt_secret.as_bytes()),
        &validation,
    )
    .expect("failed to decode token")
    .claims
}

fn mint_expired_token(jwt_secret: &str) -> String {
    #[derive(serde::Serialize)]
    struct Claims {
        sub: uuid::Uuid,
        username: String,
        roles: Vec<String>,
        iat: i64,
        exp: i64,
    }

    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: uuid::Uuid::now_v7(),
        username: "ghost".to_string(),
        roles: vec!["viewer".to_string()],
        iat: now - 7200,
        exp: now - 3600,
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn register(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    email: &str,
    roles: Option<Vec<&str>>,
) -> serde_json::Value {
    let mut body = json!({
        "username": username,
        "email": email,
        "password": "secret123",
    });
    if let Some(roles) = roles {
        body["roles"] = json!(roles);
    }

    let res = client
        .post(format!("{base_url}/api/auth/register"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn register_without_roles_defaults_to_viewer() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let body = register(&client, &srv.base_url, "alice", "a@x.com", None).await;

    assert_eq!(body["user"]["roles"], json!(["viewer"]));
    let claims = decode_claims(jwt_secret, body["token"].as_str().unwrap());
    assert_eq!(claims.roles, vec!["viewer"]);
    assert_eq!(claims.username, "alice");
    assert_eq!(claims.exp - claims.iat, 3600);
    assert_eq!(
        claims.sub.to_string(),
        body["user"]["id"].as_str().unwrap()
    );
}

#[tokio::test]
async fn login_sets_cookie_and_logout_clears_it() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    register(&client, &srv.base_url, "alice", "a@x.com", None).await;

    let res = client
        .post(format!("{}/api/auth/login", srv.base_url))
        .json(&json!({ "identifier": "a@x.com", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cookie = res
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Max-Age=3600"));

    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["username"], "alice");

    let res = client
        .post(format!("{}/api/auth/logout", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let cleared = res
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn bad_credentials_are_indistinguishable() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    register(&client, &srv.base_url, "alice", "a@x.com", None).await;

    let wrong_password = client
        .post(format!("{}/api/auth/login", srv.base_url))
        .json(&json!({ "identifier": "a@x.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_password.status(), StatusCode::BAD_REQUEST);
    let wrong_password: serde_json::Value = wrong_password.json().await.unwrap();

    let unknown_account = client
        .post(format!("{}/api/auth/login", srv.base_url))
        .json(&json!({ "identifier": "nobody@x.com", "password": "secret123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown_account.status(), StatusCode::BAD_REQUEST);
    let unknown_account: serde_json::Value = unknown_account.json().await.unwrap();

    // Identical shape and message: no account-enumeration signal.
    assert_eq!(wrong_password, unknown_account);
    assert_eq!(wrong_password["message"], "invalid credentials");
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    register(&client, &srv.base_url, "alice", "a@x.com", None).await;

    let res = client
        .post(format!("{}/api/auth/register", srv.base_url))
        .json(&json!({
            "username": "alice2",
            "email": "a@x.com",
            "password": "secret123",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "duplicate_account");
}

#[tokio::test]
async fn registering_with_unknown_role_fails() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/api/auth/register", srv.base_url))
        .json(&json!({
            "username": "bob",
            "email": "b@x.com",
            "password": "secret123",
            "roles": ["viewer", "czar"],
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], "invalid_role");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/api/users", srv.base_url))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn insufficient_role_is_403_with_required_vs_actual() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let body = register(&client, &srv.base_url, "alice", "a@x.com", None).await;
    let token = body["token"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/api/users", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["required_roles"], json!(["super_admin"]));
    assert_eq!(body["user_roles"], json!(["viewer"]));
}

#[tokio::test]
async fn expired_token_is_401_not_403() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let expired = mint_expired_token(jwt_secret);
    let res = client
        .get(format!("{}/api/users", srv.base_url))
        .bearer_auth(&expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/api/auth/check", srv.base_url))
        .bearer_auth(&expired)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["authenticated"], json!(false));
}

#[tokio::test]
async fn check_accepts_header_or_cookie() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let body = register(&client, &srv.base_url, "alice", "a@x.com", None).await;
    let token = body["token"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/api/auth/check", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let via_header: serde_json::Value = res.json().await.unwrap();
    assert_eq!(via_header["authenticated"], json!(true));
    assert_eq!(via_header["user"]["username"], "alice");

    let res = client
        .get(format!("{}/api/auth/check", srv.base_url))
        .header(reqwest::header::COOKIE, format!("token={token}"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/auth/check", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let missing: serde_json::Value = res.json().await.unwrap();
    assert_eq!(missing["authenticated"], json!(false));
}

#[tokio::test]
async fn current_permissions_reflect_the_store_not_the_token() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let body = register(&client, &srv.base_url, "alice", "a@x.com", None).await;
    let token = body["token"].as_str().unwrap().to_string();

    let res = client
        .get(format!("{}/api/auth/permissions", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let permissions: Vec<&str> = body["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    assert!(permissions.contains(&"assets.read"));
    assert!(permissions.contains(&"services.read"));
    assert_eq!(body["roles"][0]["name"], "viewer");
}

#[tokio::test]
async fn super_admin_manages_users_roles_and_permissions() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let body = register(
        &client,
        &srv.base_url,
        "root",
        "root@x.com",
        Some(vec!["super_admin"]),
    )
    .await;
    let token = body["token"].as_str().unwrap().to_string();

    // Listing users expands roles down to permissions.
    let res = client
        .get(format!("{}/api/users", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let users: serde_json::Value = res.json().await.unwrap();
    let root = &users.as_array().unwrap()[0];
    assert_eq!(root["username"], "root");
    assert_eq!(root["roles"][0]["name"], "super_admin");
    assert!(!root["roles"][0]["permissions"].as_array().unwrap().is_empty());
    assert!(root.get("password_hash").is_none());

    // Create a permission, then a role granting it.
    let res = client
        .post(format!("{}/api/permissions", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "reports.read", "description": "read reports" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let permission: serde_json::Value = res.json().await.unwrap();
    let permission_id = permission["id"].as_str().unwrap();

    let res = client
        .post(format!("{}/api/roles", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "report_reader", "permissions": [permission_id] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let role: serde_json::Value = res.json().await.unwrap();
    assert_eq!(role["permissions"][0]["name"], "reports.read");
    let role_id = role["id"].as_str().unwrap().to_string();

    // Unknown permission refs fail role creation outright.
    let res = client
        .post(format!("{}/api/roles", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "broken",
            "permissions": [uuid::Uuid::now_v7().to_string()],
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Assign the new role to a fresh user, then delete the role: the user
    // listing tolerates the dangling reference.
    register(&client, &srv.base_url, "carol", "c@x.com", None).await;
    let res = client
        .get(format!("{}/api/users", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let users: serde_json::Value = res.json().await.unwrap();
    let carol = users
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["username"] == "carol")
        .unwrap();
    let carol_id = carol["id"].as_str().unwrap();

    let res = client
        .put(format!("{}/api/users/{carol_id}", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "roles": ["report_reader"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .delete(format!("{}/api/roles/{role_id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/users/{carol_id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let carol: serde_json::Value = res.json().await.unwrap();
    assert_eq!(carol["roles"], json!([]));
}

#[tokio::test]
async fn asset_lifecycle_with_public_listings() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();
    let body = register(
        &client,
        &srv.base_url,
        "root",
        "root@x.com",
        Some(vec!["super_admin"]),
    )
    .await;
    let token = body["token"].as_str().unwrap().to_string();

    // Anonymous creation is rejected; viewer creation is forbidden.
    let entry = json!({
        "description": "Annual asset inventory",
        "starts_at": "2024-01-01T00:00:00Z",
        "ends_at": "2024-12-31T00:00:00Z",
        "published_at": "2024-06-01T00:00:00Z",
        "year": "2024",
        "link": "https://example.com/doc.pdf",
        "published": true,
        "publisher": "root",
        "editable": true,
    });

    let res = client
        .post(format!("{}/api/assets", srv.base_url))
        .json(&entry)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let viewer = register(&client, &srv.base_url, "vera", "v@x.com", None).await;
    let viewer_token = viewer["token"].as_str().unwrap();
    let res = client
        .post(format!("{}/api/assets", srv.base_url))
        .bearer_auth(viewer_token)
        .json(&entry)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Create as super_admin.
    let res = client
        .post(format!("{}/api/assets", srv.base_url))
        .bearer_auth(&token)
        .json(&entry)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    let entry_id = created["data"]["id"].as_str().unwrap().to_string();

    // Public listing endpoints need no token.
    let res = client
        .get(format!("{}/api/assets", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let listed: serde_json::Value = res.json().await.unwrap();
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let res = client
        .get(format!("{}/api/assets/years", srv.base_url))
        .send()
        .await
        .unwrap();
    let years: serde_json::Value = res.json().await.unwrap();
    assert_eq!(years["data"], json!([2024]));

    let res = client
        .get(format!("{}/api/assets/years/2024", srv.base_url))
        .send()
        .await
        .unwrap();
    let by_year: serde_json::Value = res.json().await.unwrap();
    assert_eq!(by_year["data"].as_array().unwrap().len(), 1);

    let res = client
        .get(format!("{}/api/assets/years/nope", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // Update, fetch, delete (management roles).
    let res = client
        .put(format!("{}/api/assets/{entry_id}", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "published": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["data"]["published"], json!(false));

    let res = client
        .get(format!("{}/api/assets/publisher/root", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let by_publisher: serde_json::Value = res.json().await.unwrap();
    assert_eq!(by_publisher["data"].as_array().unwrap().len(), 1);

    let res = client
        .delete(format!("{}/api/assets/{entry_id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/api/assets/{entry_id}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // The service collection is independent of the asset collection.
    let res = client
        .get(format!("{}/api/services", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let services: serde_json::Value = res.json().await.unwrap();
    assert!(services["data"].as_array().unwrap().is_empty());
}
