mod common;

use common::{context, make_token, signed_in_context, EMAIL, USER_ID};
use pretty_assertions::assert_eq;
use serde_json::json;
use taskflow::{AuthError, Error};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn sign_in_stores_token_and_decodes_user() {
    let server = MockServer::start().await;
    let token = make_token(USER_ID, EMAIL);
    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .and(body_json(json!({ "email": EMAIL, "password": "secret1" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": token, "token_type": "bearer" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (ctx, _tmp) = context(&server);
    assert!(!ctx.auth.is_authenticated());

    let session = ctx.auth.sign_in(EMAIL, "secret1").await.unwrap();
    assert_eq!(session.user_id(), USER_ID);
    assert!(ctx.auth.is_authenticated());
    assert_eq!(ctx.auth.store().load(), Some(token));
    assert_eq!(ctx.auth.user_id().as_deref(), Some(USER_ID));
}

#[tokio::test]
async fn sign_out_forgets_the_token() {
    let server = MockServer::start().await;
    let (ctx, _tmp) = signed_in_context(&server);
    assert!(ctx.auth.is_authenticated());

    ctx.auth.sign_out().unwrap();
    assert!(!ctx.auth.is_authenticated());
    assert!(ctx.auth.current_user().is_none());
    assert!(matches!(
        ctx.session(),
        Err(Error::Auth(AuthError::NotAuthenticated))
    ));
    // Signing out twice is fine.
    ctx.auth.sign_out().unwrap();
}

#[tokio::test]
async fn bad_credentials_surface_server_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Incorrect email or password" })),
        )
        .mount(&server)
        .await;

    let (ctx, _tmp) = context(&server);
    let err = ctx.auth.sign_in(EMAIL, "wrong1").await.unwrap_err();
    assert_eq!(err.to_string(), "Incorrect email or password");
    assert_eq!(err.status(), Some(401));
    assert!(!ctx.auth.is_authenticated());
}

#[tokio::test]
async fn unreadable_error_body_uses_fallback() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let (ctx, _tmp) = context(&server);
    let err = ctx.auth.sign_up(EMAIL, "secret1").await.unwrap_err();
    assert_eq!(err.to_string(), "Signup failed");
}

#[tokio::test]
async fn sign_up_returns_account_without_signing_in() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": USER_ID,
            "email": EMAIL,
            "created_at": "2025-02-03T04:05:06"
        })))
        .mount(&server)
        .await;

    let (ctx, _tmp) = context(&server);
    let account = ctx.auth.sign_up(EMAIL, "secret1").await.unwrap();
    assert_eq!(account.id, USER_ID);
    assert_eq!(account.email, EMAIL);
    assert!(!ctx.auth.is_authenticated());
}

#[tokio::test]
async fn validation_detail_list_is_joined() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [
                { "loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error" },
                { "loc": ["body", "password"], "msg": "field required", "type": "missing" }
            ]
        })))
        .mount(&server)
        .await;

    let (ctx, _tmp) = context(&server);
    let err = ctx.auth.sign_up("x", "").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "value is not a valid email address; field required"
    );
}

#[tokio::test]
async fn password_reset_flow() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/forgot-password"))
        .and(body_json(json!({ "email": EMAIL })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "If the email exists, a reset link has been sent"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/reset-password"))
        .and(body_json(json!({ "token": "abc", "new_password": "newpass1" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "message": "Password reset successfully" })),
        )
        .mount(&server)
        .await;

    let (ctx, _tmp) = context(&server);
    let requested = ctx.auth.forgot_password(EMAIL).await.unwrap();
    assert_eq!(requested.reset_link, None);
    assert_eq!(
        ctx.auth.reset_password("abc", "newpass1").await.unwrap(),
        "Password reset successfully"
    );
}

#[tokio::test]
async fn garbage_token_on_disk_is_not_a_session() {
    let server = MockServer::start().await;
    let (ctx, _tmp) = context(&server);
    ctx.auth.store().save("not-a-jwt").unwrap();
    assert!(matches!(
        ctx.session(),
        Err(Error::Auth(AuthError::MalformedToken(_)))
    ));
}
