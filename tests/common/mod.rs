#![allow(dead_code)]

use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::MockServer;

use digital_address_rust::address::DigitalAddress;
use digital_address_rust::auth::{Session, TokenStorage};
use digital_address_rust::config::ClientOptions;
use digital_address_rust::DigitalAddressClient;

#[derive(Serialize)]
struct TestClaims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// A signed token expiring `ttl_secs` from now (negative for the past).
pub fn token(sub: &str, ttl_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    encode(
        &Header::default(),
        &TestClaims {
            sub: sub.to_string(),
            iat: now,
            exp: now + ttl_secs,
        },
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

pub fn client(server: &MockServer) -> DigitalAddressClient {
    DigitalAddressClient::new(&server.uri())
}

pub fn client_with_storage(
    server: &MockServer,
    storage: Arc<dyn TokenStorage>,
) -> DigitalAddressClient {
    DigitalAddressClient::with_storage(&server.uri(), ClientOptions::default(), storage)
}

/// Client with a live session; `verified` sets the Aadhaar flag.
pub async fn logged_in(
    server: &MockServer,
    access_token: &str,
    verified: bool,
) -> DigitalAddressClient {
    let client = client(server);
    client
        .auth()
        .set_session(Session::new(access_token))
        .await
        .unwrap();
    client.state().write().await.set_user_verified(verified);
    client
}

pub fn address_json(digital_address: &str, score: f64) -> Value {
    json!({
        "digitalAddress": digital_address,
        "suffix": "home.add",
        "addressName": "Home",
        "purpose": "Deliveries",
        "address": "12 MG Road, Bengaluru",
        "pincode": "560001",
        "latitude": 12.9716,
        "longitude": 77.5946,
        "uniPin": "482913",
        "consentType": "PERMANENT",
        "confidenceScore": score,
        "status": "ACTIVE",
        "generatedDigipin": "4P3-JK8-52C9",
        "createdAt": "2026-01-10T08:30:00"
    })
}

pub fn address(digital_address: &str, score: f64) -> DigitalAddress {
    serde_json::from_value(address_json(digital_address, score)).unwrap()
}
