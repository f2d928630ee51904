mod common;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use digital_address_rust::aava::{AavaVerificationRequest, UseCase, VerificationStatus};
use digital_address_rust::address::ConfidenceScore;
use digital_address_rust::error::Error;

#[tokio::test]
async fn verify_sends_a_trimmed_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/aava/aava-verify"))
        .and(body_json(json!({
            "digitalAddress": "ravi@home.add",
            "agentId": "AG-7",
            "locationConfirmed": true,
            "verificationNotes": null,
            "verifiedLatitude": 12.9716,
            "verifiedLongitude": 77.5946,
            "photoproofUrl": null,
            "verificationStatus": "VERIFIED"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "digitalAddress": "ravi@home.add",
            "agentId": "AG-7",
            "isAavaVerified": true,
            "verificationType": "AAVA",
            "verificationStatus": "VERIFIED",
            "oldConfidenceScore": 60,
            "newConfidenceScore": 90,
            "verifiedAt": "2026-03-02T10:15:00Z",
            "tamperProofLogged": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let request =
        AavaVerificationRequest::new(" ravi@home.add ", "AG-7 ", VerificationStatus::Verified)
            .with_location(12.9716, 77.5946)
            .with_notes(" ")
            .with_photo_proof("");
    let result = tokio_test::assert_ok!(client.aava().verify(&request).await);

    assert!(result.is_aava_verified);
    assert!(result.tamper_proof_logged);
    assert_eq!(result.new_confidence_score, Some(ConfidenceScore::new(90.0)));
}

#[tokio::test]
async fn verify_needs_an_agent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/aava/aava-verify"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let request =
        AavaVerificationRequest::new("ravi@home.add", "   ", VerificationStatus::Pending);
    let err = client.aava().verify(&request).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(m) if m == "AAVA agent ID is required"));
}

#[tokio::test]
async fn status_reports_use_case_decisions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/aava/aava-status/ravi%40home.add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "digitalAddress": "ravi@home.add",
            "verificationType": "AAVA",
            "agentId": "AG-7",
            "verifiedAt": "2026-03-02T10:15:00Z",
            "isAavaVerified": true,
            "requiresAavaVerification": false,
            "verificationNotes": "Door number matches",
            "confidenceScore": 90,
            "approvedUseCases": {
                "governmentWelfare": true,
                "propertyRecords": true,
                "legalNotices": true,
                "emergencyServices": true,
                "eCommerce": true,
                "foodDelivery": true
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::client(&server);
    let status = client.aava().status(" ravi@home.add ").await.unwrap();

    assert!(status.is_aava_verified);
    for use_case in UseCase::ALL {
        assert_eq!(status.is_approved_for(use_case), Some(true), "{:?}", use_case);
    }
    assert!(status.policy_mismatches().is_empty());
}

#[tokio::test]
async fn status_of_unknown_address_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/aava/aava-status/nobody%40home.add"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = common::client(&server);
    let err = client.aava().status("nobody@home.add").await.unwrap_err();
    assert_eq!(err.user_message(), "Digital address not found");
}

#[tokio::test]
async fn status_accepts_zone_less_timestamps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/aava/aava-status/ravi%40home.add"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "digitalAddress": "ravi@home.add",
            "isAavaVerified": true,
            "verifiedAt": "2026-03-02T10:15:00"
        })))
        .mount(&server)
        .await;

    let client = common::client(&server);
    let status = client.aava().status("ravi@home.add").await.unwrap();
    assert_eq!(
        status.verified_at.map(|t| t.to_rfc3339()),
        Some("2026-03-02T10:15:00+00:00".to_string())
    );
}

#[tokio::test]
async fn status_sends_the_session_token_when_logged_in() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/aava/aava-status/ravi%40home.add"))
        .and(header("Authorization", "Bearer opaque"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "digitalAddress": "ravi@home.add",
            "isAavaVerified": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = common::logged_in(&server, "opaque", false).await;
    let status = client.aava().status("ravi@home.add").await.unwrap();
    assert!(!status.is_aava_verified);
}
