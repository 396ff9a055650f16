use rocket::http::{Cookie, CookieJar, Status};
use rocket::serde::json::Json;
use rocket::State;
use utoipa::ToSchema;

use super::crud::{body, JsonBody};
use super::Message;
use crate::config::Config;
use crate::data::store::Storage;
use crate::data::user::db::{UserDbExt, UserLoginData, UserSignupData};
use crate::data::user::UserResponse;
use crate::resp::jwt::{SessionToken, AUTH_COOKIE_NAME};
use crate::resp::problem::Problem;
use crate::security::Security;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub token: String,
    pub user: UserResponse,
}

fn issue_token(
    user: uuid::Uuid,
    config: &Config,
    security: &Security,
    cookies: &CookieJar<'_>,
) -> Result<String, Problem> {
    let session = SessionToken::new(user, config.token_lifetime_secs);
    let token = session.encode_jwt(security).map_err(|e| {
        crate::resp::problem::problems::internal("Unable to issue session token.", e)
    })?;

    cookies.add(session.cookie(token.clone()));
    Ok(token)
}

/// Sign in with email and password
#[utoipa::path(
    request_body = UserLoginData,
    responses(
        (status = 200, description = "Signed in; the token is also set as the `t` cookie", body = TokenResponse),
        (status = 400, description = "Invalid email or password", body = Problem),
    )
)]
#[post("/signin", data = "<login>")]
#[tracing::instrument(skip(login, cookies, config, security))]
pub async fn signin<'a>(
    login: JsonBody<'_, UserLoginData>,
    cookies: &'a CookieJar<'_>,
    storage: &State<Storage>,
    config: &State<Config>,
    security: &State<Security>,
) -> Result<Json<TokenResponse>, Problem> {
    let login = body(login)?;

    // VULN: no rate limiting of failed sign-in attempts
    let user = storage.repo().check_credentials(&login).await?;
    let token = issue_token(user.id, config, security, cookies)?;

    tracing::info!("User {} signed in", user.id);
    Ok(Json(TokenResponse { token }))
}

/// Register a new user and sign them in
#[utoipa::path(
    request_body = UserSignupData,
    responses(
        (status = 201, description = "User created and signed in", body = SignupResponse),
        (status = 400, description = "Invalid profile or email already in use", body = Problem),
    )
)]
#[post("/signup", data = "<signup>")]
#[tracing::instrument(skip(signup, cookies, config, security))]
pub async fn signup<'a>(
    signup: JsonBody<'_, UserSignupData>,
    cookies: &'a CookieJar<'_>,
    storage: &State<Storage>,
    config: &State<Config>,
    security: &State<Security>,
) -> Result<(Status, Json<SignupResponse>), Problem> {
    let user = storage.repo().create_user(body(signup)?).await?;
    let token = issue_token(user.id, config, security, cookies)?;

    Ok((
        Status::Created,
        Json(SignupResponse {
            token,
            user: UserResponse::from(user),
        }),
    ))
}

/// Clear the session cookie
#[utoipa::path(
    responses(
        (status = 200, description = "Session cookie cleared", body = Message),
    )
)]
#[get("/signout")]
#[tracing::instrument]
pub fn signout(cookies: &CookieJar<'_>) -> Json<Message> {
    cookies.remove(Cookie::build(AUTH_COOKIE_NAME).path("/"));
    Json(Message::new("signed out"))
}

#[cfg(test)]
mod auth_endpoints {
    use rocket::http::{ContentType, Status};
    use serde_json::{json, Value};

    use super::*;
    use crate::test_util::{bearer, client, sign_up};

    #[rocket::async_test]
    async fn signup_then_signin_issues_tokens() {
        let client = client().await;
        let (id, signup_token) = sign_up(&client, "ada@example.com").await;

        let response = client
            .post("/auth/signin")
            .header(ContentType::JSON)
            .body(json!({ "email": "ada@example.com", "password": "password123" }).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);
        assert!(
            response.cookies().get(AUTH_COOKIE_NAME).is_some(),
            "session cookie wasn't set"
        );
        let body: TokenResponse = response.into_json().await.expect("token response");
        assert!(!body.token.is_empty());
        assert!(!signup_token.is_empty());

        let me = client
            .get(format!("/api/users/{}", id))
            .header(bearer(&body.token))
            .dispatch()
            .await;
        assert_eq!(me.status(), Status::Ok);
    }

    #[rocket::async_test]
    async fn signup_hides_password_hash() {
        let client = client().await;

        let response = client
            .post("/auth/signup")
            .header(ContentType::JSON)
            .body(
                json!({
                    "userName": "grace",
                    "email": "grace@example.com",
                    "password": "password123"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Created);
        let body: Value = response.into_json().await.expect("json body");
        assert!(body["token"].is_string());
        assert_eq!(body["user"]["email"], "grace@example.com");
        assert_eq!(body["user"]["role"], "student");
        assert!(body["user"].get("password").is_none());
    }

    #[rocket::async_test]
    async fn signin_failures_look_identical() {
        let client = client().await;
        sign_up(&client, "ada@example.com").await;

        let mut bodies = vec![];
        for (email, password) in [
            ("ada@example.com", "wrong-password"),
            ("nobody@example.com", "password123"),
        ] {
            let response = client
                .post("/auth/signin")
                .header(ContentType::JSON)
                .body(json!({ "email": email, "password": password }).to_string())
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::BadRequest);
            bodies.push(response.into_string().await.expect("body"));
        }

        assert_eq!(bodies[0], bodies[1]);
        assert!(bodies[0].contains("Invalid email or password"));
    }

    #[rocket::async_test]
    async fn duplicate_signup_is_rejected() {
        let client = client().await;
        sign_up(&client, "ada@example.com").await;

        let response = client
            .post("/auth/signup")
            .header(ContentType::JSON)
            .body(
                json!({
                    "userName": "ada2",
                    "email": "ada@example.com",
                    "password": "password123"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.expect("json body");
        assert_eq!(body["message"], "Email already in use");
    }

    #[rocket::async_test]
    async fn signout_clears_cookie() {
        let client = client().await;

        let response = client.get("/auth/signout").dispatch().await;
        assert_eq!(response.status(), Status::Ok);
        let body: Message = response.into_json().await.expect("message");
        assert_eq!(body.message, "signed out");
    }

    #[rocket::async_test]
    async fn session_cookie_authorizes_requests() {
        let client = client().await;
        sign_up(&client, "ada@example.com").await;

        // The tracked client keeps the cookie set by sign-up.
        let response = client.get("/api/users").dispatch().await;
        assert_eq!(response.status(), Status::Ok);

        client.get("/auth/signout").dispatch().await;
        let response = client.get("/api/users").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[derive(Clone, Default)]
    struct CapturedLog(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().expect("log buffer").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[rocket::async_test]
    async fn auth_spans_leave_out_secrets_and_bodies() {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::set_global_default(subscriber).expect("only global subscriber");

        let client = client().await;
        sign_up(&client, "ada@example.com").await;
        let response = client
            .post("/auth/signin")
            .header(ContentType::JSON)
            .body(json!({ "email": "ada@example.com", "password": "password123" }).to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let response = client
            .post("/auth/signup")
            .header(ContentType::JSON)
            .body(r#"{"userName":"eve","email":"eve@example.com","password":"leaky-pass","#)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        let captured = String::from_utf8(log.0.lock().expect("log buffer").clone())
            .expect("utf-8 log");
        assert!(captured.contains("signed in"), "nothing was captured");
        assert!(!captured.contains("campus-test-secret"));
        assert!(!captured.contains("password123"));
        assert!(!captured.contains("leaky-pass"));
    }
}
