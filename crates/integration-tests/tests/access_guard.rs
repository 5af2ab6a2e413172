//! Admin dashboard access over real HTTP with session cookies.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use reqwest::header::LOCATION;
use zenos_integration_tests::{ADMIN_EMAIL, SHOPPER_EMAIL, TestApp};

fn location(resp: &reqwest::Response) -> &str {
    resp.headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_admin_path_redirects_to_login() {
    let app = TestApp::new().await;
    let base = app.spawn().await;
    let client = TestApp::client();

    let resp = client.get(format!("{base}/admin")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_dashboard_signed_out_redirects_to_login() {
    let app = TestApp::new().await;
    let base = app.spawn().await;
    let client = TestApp::client();

    let resp = client.get(format!("{base}/Dashboard")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_dashboard_shopper_redirects_home() {
    let app = TestApp::new().await;
    let base = app.spawn().await;
    let client = TestApp::client();

    let resp = TestApp::sign_in(&client, &base, SHOPPER_EMAIL).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");

    let resp = client.get(format!("{base}/Dashboard")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/");
}

#[tokio::test]
async fn test_dashboard_admin_any_case_renders() {
    let app = TestApp::new().await;
    let base = app.spawn().await;
    let client = TestApp::client();

    let resp = TestApp::sign_in(&client, &base, "Admin@Gmail.com").await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/Dashboard");

    let resp = client.get(format!("{base}/Dashboard")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Civic"));
}

#[tokio::test]
async fn test_logout_revokes_dashboard() {
    let app = TestApp::new().await;
    let base = app.spawn().await;
    let client = TestApp::client();

    TestApp::sign_in(&client, &base, ADMIN_EMAIL).await;
    let resp = client.post(format!("{base}/logout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let resp = client.get(format!("{base}/Dashboard")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_dashboard_api_status_codes() {
    let app = TestApp::new().await;
    let base = app.spawn().await;

    let anonymous = TestApp::client();
    let resp = anonymous
        .get(format!("{base}/api/dashboard"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let shopper = TestApp::client();
    TestApp::sign_in(&shopper, &base, SHOPPER_EMAIL).await;
    let resp = shopper
        .get(format!("{base}/api/dashboard"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let admin = TestApp::client();
    TestApp::sign_in(&admin, &base, ADMIN_EMAIL).await;
    let resp = admin
        .get(format!("{base}/api/dashboard"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let summary: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(summary["listings"], 4);
    assert_eq!(summary["countries"], 3);
    assert_eq!(summary["loaded"], true);
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = TestApp::new().await;
    let base = app.spawn().await;
    let client = TestApp::client();

    let resp = client
        .post(format!("{base}/login"))
        .form(&[("email", ADMIN_EMAIL), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = resp.text().await.unwrap();
    assert!(body.contains("Invalid email or password."));

    let resp = client.get(format!("{base}/Dashboard")).send().await.unwrap();
    assert_eq!(location(&resp), "/login");
}

#[tokio::test]
async fn test_malformed_email_is_rejected() {
    let app = TestApp::new().await;
    let base = app.spawn().await;
    let client = TestApp::client();

    let resp = client
        .post(format!("{base}/login"))
        .form(&[("email", "not-an-email"), ("password", "x")])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_client_error());
}
