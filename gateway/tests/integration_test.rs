//! Integration tests for the gateway router
//!
//! Requests are driven in-process through the full router with an in-memory
//! user store, a recording notifier and a manual clock.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use auth::password::hash_password;
use auth::{IdentityClaim, JwtConfig, ManualClock, Notifier, NotifyError, Role, TokenService};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use http_body_util::BodyExt;
use tower::ServiceExt;
use user_store::{InMemoryUserStore, UserRecord};

use gateway_lib::{build_router, AppState, GatewayConfig};

const SECRET: &str = "integration-secret";

#[derive(Default)]
struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    fn last_code(&self) -> String {
        let sent = self.sent.lock().unwrap();
        let (_, body) = sent.last().expect("no message sent");
        body.rsplit(' ').next().unwrap().to_string()
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, to: &str, _subject: &str, body: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push((to.to_string(), body.to_string()));
        Ok(())
    }
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(&self, _to: &str, _subject: &str, _body: &str) -> Result<(), NotifyError> {
        Err(NotifyError("mail API unreachable".to_string()))
    }
}

fn user(id: &str, username: &str, email: &str, password: &str, course: &str, role: Role) -> UserRecord {
    UserRecord {
        id: id.to_string(),
        fullname: username.to_uppercase(),
        username: username.to_string(),
        email: email.to_string(),
        password: hash_password(password).unwrap(),
        course: course.to_string(),
        role,
        absences: 0,
        tests: Vec::new(),
    }
}

fn seed() -> Vec<UserRecord> {
    vec![
        user("1", "alice", "alice@x.com", "pw123", "Web Development", Role::User),
        user("2", "bob", "bob@x.com", "secret", "Data Science", Role::User),
        user("3", "admin", "admin@x.com", "adminpw", "", Role::Admin),
    ]
}

fn config() -> GatewayConfig {
    GatewayConfig {
        jwt_secret: SECRET.to_string(),
        ..GatewayConfig::default()
    }
}

struct Harness {
    app: Router,
    clock: Arc<ManualClock>,
    notifier: Arc<RecordingNotifier>,
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::new(
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap(),
    ));
    let notifier = Arc::new(RecordingNotifier::default());
    let store = Arc::new(InMemoryUserStore::with_users(seed()));
    let state = AppState::with_clock(config(), store, notifier.clone(), clock.clone()).unwrap();

    Harness {
        app: build_router(state),
        clock,
        notifier,
    }
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn location(resp: &Response) -> &str {
    resp.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

/// Raw `Set-Cookie` header for cookie `name`.
fn set_cookie_header(resp: &Response, name: &str) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{}=", name)))
        .map(|v| v.to_string())
}

/// `name=value` pair to send back in a `Cookie` header.
fn cookie_pair(resp: &Response, name: &str) -> String {
    let header = set_cookie_header(resp, name).unwrap();
    header.split(';').next().unwrap().to_string()
}

async fn json(resp: Response) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let resp = send(app, post_form("/login", &format!("username={}&password={}", username, password), None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    cookie_pair(&resp, "token")
}

#[tokio::test]
async fn test_login_sets_token_cookie() {
    let h = harness();

    let resp = send(&h.app, post_form("/login", "username=alice&password=pw123", None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/student/profile");

    let cookie = set_cookie_header(&resp, "token").unwrap();
    assert!(cookie.contains("Max-Age=7200"));
    assert!(cookie.contains("HttpOnly"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_login_by_email_and_admin_landing() {
    let h = harness();

    let resp = send(&h.app, post_form("/login", "username=bob@x.com&password=secret", None)).await;
    assert_eq!(location(&resp), "/student/profile");

    let resp = send(&h.app, post_form("/login", "username=admin&password=adminpw", None)).await;
    assert_eq!(location(&resp), "/admin/dashboard");
}

#[tokio::test]
async fn test_login_failure() {
    let h = harness();

    for body in ["username=alice&password=wrong", "username=nobody&password=pw123"] {
        let resp = send(&h.app, post_form("/login", body, None)).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert!(set_cookie_header(&resp, "token").is_none());

        let body = json(resp).await;
        assert_eq!(body["view"], "login");
        assert_eq!(body["error"], "Invalid credentials");
    }
}

#[tokio::test]
async fn test_login_page_redirects_when_logged_in() {
    let h = harness();
    let token = login(&h.app, "admin", "adminpw").await;

    let resp = send(&h.app, get("/login", Some(&token))).await;
    assert_eq!(location(&resp), "/admin/dashboard");

    let resp = send(&h.app, get("/", None)).await;
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_missing_cookie_redirects_without_clearing() {
    let h = harness();

    let resp = send(&h.app, get("/admin/dashboard", None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    assert!(resp.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_foreign_token_is_cleared() {
    let h = harness();
    let foreign = TokenService::new(&JwtConfig::new("another-secret", "student-portal", 7200)).unwrap();
    let claim = IdentityClaim {
        sub: "3".to_string(),
        role: Role::Admin,
        username: "admin".to_string(),
        email: "admin@x.com".to_string(),
        fullname: "ADMIN".to_string(),
        course: String::new(),
    };
    let token = foreign.issue(&claim).unwrap();

    let resp = send(&h.app, get("/admin/dashboard", Some(&format!("token={}", token)))).await;
    assert_eq!(location(&resp), "/login");
    assert!(set_cookie_header(&resp, "token").unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn test_expired_token_is_cleared() {
    let h = harness();
    let token = login(&h.app, "alice", "pw123").await;

    h.clock.advance(Duration::minutes(119));
    let resp = send(&h.app, get("/student/profile", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    h.clock.advance(Duration::minutes(1));
    let resp = send(&h.app, get("/student/profile", Some(&token))).await;
    assert_eq!(location(&resp), "/login");
    assert!(set_cookie_header(&resp, "token").unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn test_role_enforcement() {
    let h = harness();
    let student = login(&h.app, "alice", "pw123").await;
    let admin = login(&h.app, "admin", "adminpw").await;

    let resp = send(&h.app, get("/admin/dashboard", Some(&student))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"Access Denied");

    let resp = send(&h.app, get("/student/profile", Some(&admin))).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_dashboard() {
    let h = harness();
    let admin = login(&h.app, "admin", "adminpw").await;

    let body = json(send(&h.app, get("/admin/dashboard", Some(&admin))).await).await;
    assert_eq!(body["admin"]["username"], "admin");
    assert_eq!(body["total_students"], 2);
    assert_eq!(body["courses"].as_array().unwrap().len(), 4);

    let body = json(send(&h.app, get("/admin/dashboard?course=Data%20Science", Some(&admin))).await).await;
    assert_eq!(body["total_students"], 1);
    assert_eq!(body["students"][0]["username"], "bob");
    assert_eq!(body["course"], "Data Science");
}

#[tokio::test]
async fn test_student_profile_hides_password() {
    let h = harness();
    let token = login(&h.app, "alice", "pw123").await;

    let resp = send(&h.app, get("/student/profile", Some(&token))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json(resp).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["course"], "Web Development");
    assert!(body.get("password").is_none());
}

#[tokio::test]
async fn test_add_student() {
    let h = harness();
    let admin = login(&h.app, "admin", "adminpw").await;

    let resp = send(
        &h.app,
        post_form(
            "/admin/add-student",
            "fullname=Carol&username=carol&email=carol@x.com&password=pw&course=Data+Science",
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/dashboard");

    let resp = send(
        &h.app,
        post_form(
            "/admin/add-student",
            "fullname=Alice&username=alice&email=other@x.com&password=pw&course=Data+Science",
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body = json(resp).await;
    assert_eq!(body["view"], "admin/add-student");
    assert_eq!(body["error"], "Username already taken");

    let token = login(&h.app, "carol", "pw").await;
    let body = json(send(&h.app, get("/student/profile", Some(&token))).await).await;
    assert_eq!(body["email"], "carol@x.com");
}

#[tokio::test]
async fn test_edit_and_delete_student() {
    let h = harness();
    let admin = login(&h.app, "admin", "adminpw").await;

    let resp = send(&h.app, post_form("/admin/students/2/edit", "absences=3", Some(&admin))).await;
    assert_eq!(location(&resp), "/admin/dashboard");
    let body = json(send(&h.app, get("/admin/students/2", Some(&admin))).await).await;
    assert_eq!(body["absences"], 3);

    // A full edit form with untouched fields left blank
    let resp = send(
        &h.app,
        post_form(
            "/admin/students/2/edit",
            "fullname=&username=&email=&course=&absences=&password=",
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(location(&resp), "/admin/dashboard");
    let body = json(send(&h.app, get("/admin/students/2", Some(&admin))).await).await;
    assert_eq!(body["absences"], 3);
    assert_eq!(body["username"], "bob");

    let resp = send(&h.app, post_form("/admin/students/2/edit", "absences=lots", Some(&admin))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = send(&h.app, post_form("/admin/students/2/delete", "", Some(&admin))).await;
    assert_eq!(location(&resp), "/admin/dashboard");
    let resp = send(&h.app, get("/admin/students/2", Some(&admin))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_full_password_reset() {
    let h = harness();

    let resp = send(&h.app, post_form("/forgot-password", "email=bob@x.com", None)).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/verify-otp");
    let session = cookie_pair(&resp, "reset_session");
    assert!(set_cookie_header(&resp, "reset_session").unwrap().contains("Max-Age=900"));
    assert_eq!(h.notifier.count(), 1);

    let code = h.notifier.last_code();
    assert_eq!(code.len(), 6);
    let wrong = if code == "100000" { "100001" } else { "100000" };

    let resp = send(&h.app, post_form("/verify-otp", &format!("otp={}", wrong), Some(&session))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(resp).await["error"], "Incorrect OTP.");

    // Not verified yet
    let resp = send(&h.app, get("/reset-password", Some(&session))).await;
    assert_eq!(location(&resp), "/login");

    let resp = send(&h.app, post_form("/verify-otp", &format!("otp={}", code), Some(&session))).await;
    assert_eq!(location(&resp), "/reset-password");

    let resp = send(&h.app, post_form("/verify-otp", &format!("otp={}", code), Some(&session))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(resp).await["error"], "No active OTP. Request a new code.");

    let resp = send(&h.app, get("/reset-password", Some(&session))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(
        &h.app,
        post_form("/reset-password", "password=newpw&confirm_password=other", Some(&session)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(resp).await["error"], "Passwords do not match");

    let resp = send(
        &h.app,
        post_form("/reset-password", "password=newpw&confirmPassword=newpw", Some(&session)),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(set_cookie_header(&resp, "reset_session").unwrap().contains("Max-Age=0"));
    let body = json(resp).await;
    assert_eq!(body["view"], "login");
    assert_eq!(body["success"], "Password reset successfully. Please log in.");

    // The grant was spent
    let resp = send(
        &h.app,
        post_form("/reset-password", "password=again&confirm_password=again", Some(&session)),
    )
    .await;
    assert_eq!(location(&resp), "/login");

    let resp = send(&h.app, post_form("/login", "username=bob&password=secret", None)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    login(&h.app, "bob", "newpw").await;
}

#[tokio::test]
async fn test_expired_otp() {
    let h = harness();

    let resp = send(&h.app, post_form("/forgot-password", "email=bob@x.com", None)).await;
    let session = cookie_pair(&resp, "reset_session");
    let code = h.notifier.last_code();

    h.clock.advance(Duration::minutes(5));
    let resp = send(&h.app, post_form("/verify-otp", &format!("otp={}", code), Some(&session))).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(resp).await["error"], "OTP has expired. Request a new code.");
}

#[tokio::test]
async fn test_verify_without_session() {
    let h = harness();

    let resp = send(&h.app, post_form("/verify-otp", "otp=123456", None)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json(resp).await["error"], "No active OTP. Request a new code.");
}

#[tokio::test]
async fn test_forgot_password_unknown_email() {
    let h = harness();

    let resp = send(&h.app, post_form("/forgot-password", "email=ghost@x.com", None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(set_cookie_header(&resp, "reset_session").is_none());
    assert_eq!(h.notifier.count(), 0);

    let body = json(resp).await;
    assert_eq!(body["view"], "auth/forgot-password");
    assert_eq!(body["error"], "No account found with this email.");
}

#[tokio::test]
async fn test_forgot_password_send_failure() {
    let store = Arc::new(InMemoryUserStore::with_users(seed()));
    let state = AppState::new(config(), store, Arc::new(FailingNotifier)).unwrap();
    let app = build_router(state);

    let resp = send(&app, post_form("/forgot-password", "email=bob@x.com", None)).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json(resp).await["error"], "Failed to send OTP. Try again.");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let h = harness();
    let token = login(&h.app, "alice", "pw123").await;

    let resp = send(&h.app, get("/logout", Some(&token))).await;
    assert_eq!(location(&resp), "/login");
    assert!(set_cookie_header(&resp, "token").unwrap().contains("Max-Age=0"));
}

#[tokio::test]
async fn test_unknown_route() {
    let h = harness();

    let resp = send(&h.app, get("/nope", None)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(json(resp).await["view"], "404");
}
