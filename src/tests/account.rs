use portal_shared::account::{
    handle::{AuthRes, ForgotPasswordReq, LoginReq, ResetPasswordReq},
    Role,
};
use serde_json::json;

use super::*;
use crate::{account::PasscodeRecord, auth::Claims, store::Store};

fn login_req(email: &str, password: &str) -> LoginReq {
    LoginReq {
        email: email.parse().unwrap(),
        password: password.to_owned(),
    }
}

fn reset_req(email: &str, otp: &str, password: &str, confirm: &str) -> ResetPasswordReq {
    ResetPasswordReq {
        email: email.parse().unwrap(),
        otp: otp.to_owned(),
        new_password: password.to_owned(),
        confirm_password: confirm.to_owned(),
    }
}

fn claims(token: &str) -> Claims {
    TokenKeys::new(SECRET).verify(token).unwrap()
}

/// Test: register accounts and derive their roles.
#[tokio::test]
async fn register() {
    let app = TestApp::new();

    let student = app.register("ada@bowen.edu.ng", "3/1001").await;
    assert_eq!(student.user.role, Role::Student);
    assert_eq!(student.user.email, "ada@bowen.edu.ng");
    assert_eq!(claims(&student.token).user_id, student.user.id);

    let admin = app.register("staff@bowen.edu.ng", "admin/0001").await;
    assert_eq!(admin.user.role, Role::Admin);
    assert_eq!(claims(&admin.token).role, Role::Admin);

    // prefix is matched literally
    let upper = app.register("upper@bowen.edu.ng", "Admin/0002").await;
    assert_eq!(upper.user.role, Role::Student);

    // password hash never leaves the server
    let (_, body) = app
        .send(json(
            "POST",
            "/api/auth/login",
            None,
            &login_req("ada@bowen.edu.ng", PASSWORD),
        ))
        .await;
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn register_rejections() {
    let app = TestApp::new();
    app.register("ada@bowen.edu.ng", "3/1001").await;

    let (status, body) = app
        .send(json(
            "POST",
            "/api/auth/register",
            None,
            &register_req("ada@bowen.edu.ng", "3/1002"),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "user already exists");

    let mut short = register_req("short@bowen.edu.ng", "3/1003");
    short.password = "1234567".to_owned();
    let (status, _) = app
        .send(json("POST", "/api/auth/register", None, &short))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut blank = register_req("blank@bowen.edu.ng", "3/1004");
    blank.first_name = " ".to_owned();
    let (status, _) = app
        .send(json("POST", "/api/auth/register", None, &blank))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // level outside of 100..=400 and a malformed email
    for body in [
        json!({
            "firstName": "Ada", "lastName": "Obi", "email": "lvl@bowen.edu.ng",
            "matricNumber": "3/1005", "phoneNumber": "080", "password": PASSWORD, "level": 500
        }),
        json!({
            "firstName": "Ada", "lastName": "Obi", "email": "not-an-email",
            "matricNumber": "3/1006", "phoneNumber": "080", "password": PASSWORD, "level": 300
        }),
    ] {
        let (status, body) = app
            .send(json("POST", "/api/auth/register", None, &body))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn login() {
    let app = TestApp::new();
    let registered = app.register("ada@bowen.edu.ng", "3/1001").await;

    let (status, body) = app
        .send(json(
            "POST",
            "/api/auth/login",
            None,
            &login_req("ada@bowen.edu.ng", PASSWORD),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let res: AuthRes = serde_json::from_value(body).unwrap();
    assert_eq!(res.user, registered.user);
    let claims = claims(&res.token);
    assert_eq!(claims.user_id, registered.user.id);
    assert_eq!(claims.email, "ada@bowen.edu.ng");
    assert_eq!(claims.role, Role::Student);

    let (wrong_password, wrong_body) = app
        .send(json(
            "POST",
            "/api/auth/login",
            None,
            &login_req("ada@bowen.edu.ng", "password124"),
        ))
        .await;
    let (unknown, unknown_body) = app
        .send(json(
            "POST",
            "/api/auth/login",
            None,
            &login_req("nobody@bowen.edu.ng", PASSWORD),
        ))
        .await;
    assert_eq!(wrong_password, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
}

#[tokio::test]
async fn bearer_token() {
    let app = TestApp::new();
    let token = app.student("ada@bowen.edu.ng").await;

    let (status, body) = app
        .send(empty("GET", "/api/users/profile", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@bowen.edu.ng");

    let (status, _) = app.send(empty("GET", "/api/users/profile", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send(
            Request::builder()
                .uri("/api/users/profile")
                .header(http::header::AUTHORIZATION, token.as_str())
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let forged = TokenKeys::new("another-secret")
        .issue(
            &app.store
                .account_by_email("ada@bowen.edu.ng")
                .await
                .unwrap()
                .unwrap(),
            chrono::Utc::now(),
        )
        .unwrap();
    let (status, _) = app
        .send(empty("GET", "/api/users/profile", Some(&forged)))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // students can't reach admin routes
    let (status, body) = app.send(empty("GET", "/api/stats", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "admin access required");
}

#[tokio::test]
async fn forgot_password_replaces_passcode() {
    let app = TestApp::new();
    app.register("ada@bowen.edu.ng", "3/1001").await;

    let req = ForgotPasswordReq {
        email: "ada@bowen.edu.ng".parse().unwrap(),
    };
    for _ in 0..2 {
        let (status, _) = app
            .send(json("POST", "/api/auth/forgot-password", None, &req))
            .await;
        assert_eq!(status, StatusCode::OK);
    }
    let codes = app.store.all::<PasscodeRecord>().unwrap();
    assert_eq!(codes.len(), 1);
    assert_eq!(codes[0].email, "ada@bowen.edu.ng");

    let unknown = ForgotPasswordReq {
        email: "nobody@bowen.edu.ng".parse().unwrap(),
    };
    let (status, _) = app
        .send(json("POST", "/api/auth/forgot-password", None, &unknown))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reset_password() {
    let app = TestApp::new();
    app.register("ada@bowen.edu.ng", "3/1001").await;
    app.register("bola@bowen.edu.ng", "3/1002").await;

    for email in ["ada@bowen.edu.ng", "bola@bowen.edu.ng"] {
        let req = ForgotPasswordReq {
            email: email.parse().unwrap(),
        };
        app.send(json("POST", "/api/auth/forgot-password", None, &req))
            .await;
    }
    let codes = app.store.all::<PasscodeRecord>().unwrap();
    let code_of = |email: &str| {
        codes
            .iter()
            .find(|r| r.email == email)
            .unwrap()
            .otp
            .to_string()
    };
    let ada = code_of("ada@bowen.edu.ng");
    let bola = code_of("bola@bowen.edu.ng");
    let new_password = "new-password";

    for (req, expected) in [
        // mismatched confirmation
        (
            reset_req("ada@bowen.edu.ng", &ada, new_password, "other-password"),
            "passwords do not match",
        ),
        // too short
        (
            reset_req("ada@bowen.edu.ng", &ada, "short", "short"),
            "password must be at least 8 characters",
        ),
        // code of another email
        (
            reset_req("ada@bowen.edu.ng", &bola, new_password, new_password),
            "invalid or expired otp",
        ),
        (
            reset_req("ada@bowen.edu.ng", "12ab56", new_password, new_password),
            "invalid or expired otp",
        ),
    ] {
        let (status, body) = app
            .send(json("POST", "/api/auth/reset-password", None, &req))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], expected);
    }

    let req = reset_req("ada@bowen.edu.ng", &ada, new_password, new_password);
    let (status, _) = app
        .send(json("POST", "/api/auth/reset-password", None, &req))
        .await;
    assert_eq!(status, StatusCode::OK);

    // replay fails, the code is gone
    let (status, _) = app
        .send(json("POST", "/api/auth/reset-password", None, &req))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app
        .store
        .all::<PasscodeRecord>()
        .unwrap()
        .iter()
        .all(|r| r.email != "ada@bowen.edu.ng"));

    let (status, _) = app
        .send(json(
            "POST",
            "/api/auth/login",
            None,
            &login_req("ada@bowen.edu.ng", PASSWORD),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = app
        .send(json(
            "POST",
            "/api/auth/login",
            None,
            &login_req("ada@bowen.edu.ng", new_password),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn expired_passcode() {
    let app = TestApp::new();
    app.register("ada@bowen.edu.ng", "3/1001").await;

    let issued =
        chrono::Utc::now() - chrono::Duration::minutes(PasscodeRecord::LIFETIME_MINUTES + 1);
    let record = PasscodeRecord::issue("ada@bowen.edu.ng".to_owned(), issued);
    app.store.replace_passcode(&record).await.unwrap();

    let otp = record.otp.to_string();
    let req = reset_req("ada@bowen.edu.ng", &otp, "new-password", "new-password");
    let (status, _) = app
        .send(json("POST", "/api/auth/reset-password", None, &req))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn users() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let student = app.student("ada@bowen.edu.ng").await;
    let mut other = register_req("bola@bowen.edu.ng", "1/1001");
    other.level = Level::try_from(100).unwrap();
    app.send(json("POST", "/api/auth/register", None, &other))
        .await;

    let (status, body) = app
        .send(empty("GET", "/api/users/students", Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = app
        .send(empty("GET", "/api/users/students?level=100", Some(&admin)))
        .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["email"], "bola@bowen.edu.ng");

    // an empty level lists every level
    let (status, body) = app
        .send(empty("GET", "/api/users/students?level=", Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = app
        .send(empty("GET", "/api/users/students?level=400", Some(&admin)))
        .await;
    assert_eq!(body, json!([]));

    let (status, _) = app
        .send(empty("GET", "/api/users/students?level=150", Some(&admin)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(empty("GET", "/api/users/students", Some(&student)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(json(
            "PUT",
            "/api/users/profile-picture",
            Some(&student),
            &json!({ "profilePicture": "https://img.example.com/ada.png" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = app
        .send(empty("GET", "/api/users/profile", Some(&student)))
        .await;
    assert_eq!(body["profilePicture"], "https://img.example.com/ada.png");
}
