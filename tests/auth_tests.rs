mod common;

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use digital_address_rust::auth::{
    FileStorage, ForgotPasswordRequest, LoginRequest, MemoryStorage, RegisterRequest, TokenStorage,
};
use digital_address_rust::config::{ClientConfig, ClientOptions, TOKEN_STORAGE_KEY};
use digital_address_rust::error::Error;
use digital_address_rust::store::{Access, Route};
use digital_address_rust::DigitalAddressClient;

#[tokio::test]
async fn login_persists_token_across_restarts() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let token_file = dir.path().join("session.json");
    let jwt = common::token("ravi", 3600);

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"email": "ravi@example.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": jwt})))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client_with_storage(&server, Arc::new(FileStorage::new(&token_file)));
    let session = client
        .auth()
        .login(&LoginRequest::with_email("ravi@example.com", "secret"))
        .await
        .unwrap();
    assert_eq!(session.subject().as_deref(), Some("ravi"));

    let stored = FileStorage::new(&token_file)
        .get_item(TOKEN_STORAGE_KEY)
        .await
        .unwrap();
    assert_eq!(stored, Some(serde_json::to_string(&jwt).unwrap()));

    let config = ClientConfig::new(&server.uri())
        .unwrap()
        .with_token_file(&token_file);
    let restarted = DigitalAddressClient::from_config(config, ClientOptions::default())
        .await
        .unwrap();
    assert_eq!(
        restarted.auth().get_session().await.map(|s| s.access_token),
        Some(jwt)
    );
    assert_eq!(
        restarted.state().read().await.guard(Route::Dashboard),
        Access::Granted
    );
}

#[tokio::test]
async fn login_without_persistence_leaves_storage_empty() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "opaque"})))
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let client = DigitalAddressClient::with_storage(
        &server.uri(),
        ClientOptions::default().with_persist_session(false),
        storage.clone(),
    );
    client
        .auth()
        .login(&LoginRequest::with_phone("9876543210", "secret"))
        .await
        .unwrap();

    assert!(client.state().read().await.is_authenticated());
    assert_eq!(storage.get_item(TOKEN_STORAGE_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn rejected_login_reports_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = common::client(&server);
    let err = client
        .auth()
        .login(&LoginRequest::with_email("ravi@example.com", "wrong"))
        .await
        .unwrap_err();

    assert!(matches!(&err, Error::Unauthorized(m) if m == "Invalid credentials"));
    assert!(!client.state().read().await.is_authenticated());
}

#[tokio::test]
async fn login_needs_an_identifier_before_any_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let request = LoginRequest {
        password: "secret".to_string(),
        ..Default::default()
    };
    let err = client.auth().login(&request).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn overlapping_logins_are_refused() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"token": "opaque"}))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let request = LoginRequest::with_email("ravi@example.com", "secret");
    let (first, second) = tokio::join!(
        client.auth().login(&request),
        client.auth().login(&request)
    );

    assert!(first.is_ok());
    assert!(matches!(second, Err(Error::Busy(_))));
}

#[tokio::test]
async fn register_sends_camel_case_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "userName": "ravi",
            "emailId": "ravi@example.com",
            "password": "secret",
            "phoneNumber": "9876543210"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("User registered successfully"))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let answer = client
        .auth()
        .register(&RegisterRequest {
            user_name: "ravi".to_string(),
            email_id: "ravi@example.com".to_string(),
            password: "secret".to_string(),
            phone_number: "9876543210".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(answer, "User registered successfully");
}

#[tokio::test]
async fn forgot_password_checks_confirmation_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/forgot-password"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let err = client
        .auth()
        .forgot_password(&ForgotPasswordRequest {
            email_or_phone: "ravi@example.com".to_string(),
            aadhaar_number: "1234 5678 9012".to_string(),
            date_of_birth: "1990-01-01".to_string(),
            new_password: "new-secret".to_string(),
            confirm_password: "other".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(m) if m == "Passwords do not match"));
}

#[tokio::test]
async fn forgot_password_sends_cleaned_aadhaar() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/forgot-password"))
        .and(body_json(json!({
            "emailOrPhone": "ravi@example.com",
            "aadhaarNumber": "123456789012",
            "dateOfBirth": "1990-01-01",
            "newPassword": "new-secret",
            "confirmPassword": "new-secret"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"message": "Password reset"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let answer = client
        .auth()
        .forgot_password(&ForgotPasswordRequest {
            email_or_phone: "ravi@example.com".to_string(),
            aadhaar_number: "1234 5678 9012".to_string(),
            date_of_birth: "1990-01-01".to_string(),
            new_password: "new-secret".to_string(),
            confirm_password: "new-secret".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(answer["message"], "Password reset");
}

#[tokio::test]
async fn profile_loads_user_and_aadhaar_flag() {
    let server = MockServer::start().await;
    let jwt = common::token("ravi", 3600);
    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .and(header("Authorization", format!("Bearer {}", jwt).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "userName": "ravi",
            "emailId": "ravi@example.com",
            "phoneNumber": "9876543210",
            "aadhaarVerified": true
        })))
        .mount(&server)
        .await;

    let client = common::logged_in(&server, &jwt, false).await;
    let profile = client.auth().profile().await.unwrap();
    assert_eq!(profile.username, "ravi");

    let state = client.state();
    let state = state.read().await;
    assert_eq!(state.username(), Some("ravi"));
    assert!(state.is_aadhaar_verified());
    assert!(!state.user_loading());
    assert_eq!(state.guard(Route::CreateAddress), Access::Granted);
}

#[tokio::test]
async fn rejected_profile_ends_the_session() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path().join("session.json")));
    Mock::given(method("GET"))
        .and(path("/api/auth/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = common::client_with_storage(&server, storage.clone());
    client
        .auth()
        .set_session(digital_address_rust::auth::Session::new("stale"))
        .await
        .unwrap();

    let err = client.auth().profile().await.unwrap_err();
    assert!(matches!(err, Error::SessionExpired));
    assert_eq!(err.user_message(), "Session expired. Please login again.");
    assert_eq!(storage.get_item(TOKEN_STORAGE_KEY).await.unwrap(), None);
    assert_eq!(
        client.state().read().await.guard(Route::Profile),
        Access::Redirect("/")
    );
}

#[tokio::test]
async fn aadhaar_verification_unlocks_address_creation() {
    let server = MockServer::start().await;
    let jwt = common::token("ravi", 3600);
    Mock::given(method("POST"))
        .and(path("/api/auth/verify-aadhaar"))
        .and(header("Authorization", format!("Bearer {}", jwt).as_str()))
        .and(body_json(json!({
            "aadhaarNumber": "123456789012",
            "dateOfBirth": "1990-01-01"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("Aadhaar verified successfully"))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::logged_in(&server, &jwt, false).await;
    assert_eq!(
        client.state().read().await.guard(Route::CreateAddress),
        Access::NeedsAadhaar
    );

    client
        .auth()
        .verify_aadhaar("1234 5678 9012", "1990-01-01")
        .await
        .unwrap();

    assert_eq!(
        client.state().read().await.guard(Route::CreateAddress),
        Access::Granted
    );
}

#[tokio::test]
async fn second_aadhaar_verification_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify-aadhaar"))
        .respond_with(ResponseTemplate::new(400).set_body_string("aadhaar verified"))
        .mount(&server)
        .await;

    let client = common::logged_in(&server, "opaque", false).await;
    let err = client
        .auth()
        .verify_aadhaar("123456789012", "1990-01-01")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AlreadyVerified));
    assert!(client.state().read().await.is_aadhaar_verified());
}

#[tokio::test]
async fn aadhaar_verification_requires_login() {
    let server = MockServer::start().await;
    let client = common::client(&server);
    let err = client
        .auth()
        .verify_aadhaar("123456789012", "1990-01-01")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotLoggedIn));
}

#[tokio::test]
async fn logout_clears_store_and_storage() {
    let server = MockServer::start().await;
    let dir = tempdir().unwrap();
    let token_file = dir.path().join("session.json");
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "opaque"})))
        .mount(&server)
        .await;

    let client = common::client_with_storage(&server, Arc::new(FileStorage::new(&token_file)));
    client
        .auth()
        .login(&LoginRequest::with_email("ravi@example.com", "secret"))
        .await
        .unwrap();
    client
        .state()
        .write()
        .await
        .addresses_mut()
        .replace_all(vec![common::address("ravi@home.add", 60.0)]);

    client.auth().logout().await.unwrap();

    let state = client.state();
    let state = state.read().await;
    assert_eq!(state.token(), None);
    assert!(state.addresses().is_empty());
    assert_eq!(state.guard(Route::Dashboard), Access::Redirect("/"));
    assert_eq!(
        FileStorage::new(&token_file)
            .get_item(TOKEN_STORAGE_KEY)
            .await
            .unwrap(),
        None
    );
}

#[tokio::test]
async fn expired_persisted_token_is_discarded() {
    let server = MockServer::start().await;
    let storage = Arc::new(MemoryStorage::new());
    let expired = common::token("ravi", -60);
    storage
        .set_item(TOKEN_STORAGE_KEY, &serde_json::to_string(&expired).unwrap())
        .await
        .unwrap();

    let client = common::client_with_storage(&server, storage.clone());
    assert_eq!(client.auth().restore_session().await.unwrap(), None);
    assert_eq!(storage.get_item(TOKEN_STORAGE_KEY).await.unwrap(), None);
    assert_eq!(
        client.state().read().await.guard(Route::Home),
        Access::Redirect("/")
    );
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    let client = DigitalAddressClient::new("http://127.0.0.1:1");
    let err = client
        .auth()
        .login(&LoginRequest::with_email("ravi@example.com", "secret"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network(_)));
    assert_eq!(err.user_message(), "Network error. Please check your connection");
}
