//! Types for AAVA field verification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::address::ConfidenceScore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    #[default]
    Pending,
    Verified,
    VerificationFailed,
    RequiresCorrection,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            VerificationStatus::Pending => "Pending Review",
            VerificationStatus::Verified => "Verified",
            VerificationStatus::VerificationFailed => "Verification Failed",
            VerificationStatus::RequiresCorrection => "Requires Correction",
        })
    }
}

/// Field agent's submission
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AavaVerificationRequest {
    pub digital_address: String,
    pub agent_id: String,
    pub location_confirmed: bool,
    pub verification_notes: Option<String>,
    pub verified_latitude: Option<f64>,
    pub verified_longitude: Option<f64>,
    #[serde(rename = "photoproofUrl")]
    pub photoproof_url: Option<String>,
    pub verification_status: VerificationStatus,
}

impl AavaVerificationRequest {
    pub fn new(digital_address: &str, agent_id: &str, status: VerificationStatus) -> Self {
        Self {
            digital_address: digital_address.to_string(),
            agent_id: agent_id.to_string(),
            verification_status: status,
            ..Default::default()
        }
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.verified_latitude = Some(latitude);
        self.verified_longitude = Some(longitude);
        self.location_confirmed = true;
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.verification_notes = Some(notes.to_string());
        self
    }

    pub fn with_photo_proof(mut self, url: &str) -> Self {
        self.photoproof_url = Some(url.to_string());
        self
    }

    /// Trims text fields; blank optional text becomes `None`.
    pub fn normalized(&self) -> Self {
        fn blank_to_none(v: &Option<String>) -> Option<String> {
            v.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }

        Self {
            digital_address: self.digital_address.trim().to_string(),
            agent_id: self.agent_id.trim().to_string(),
            verification_notes: blank_to_none(&self.verification_notes),
            photoproof_url: blank_to_none(&self.photoproof_url),
            ..self.clone()
        }
    }
}

/// Outcome recorded by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AavaVerificationResult {
    pub digital_address: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub is_aava_verified: bool,
    #[serde(default)]
    pub verification_type: Option<String>,
    #[serde(default)]
    pub verification_status: VerificationStatus,
    #[serde(default)]
    pub old_confidence_score: Option<ConfidenceScore>,
    #[serde(default)]
    pub new_confidence_score: Option<ConfidenceScore>,
    #[serde(default, with = "crate::address::timestamp")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tamper_proof_logged: bool,
}

/// Services an address can be released to
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UseCase {
    GovernmentWelfare,
    PropertyRecords,
    LegalNotices,
    EmergencyServices,
    #[serde(rename = "eCommerce")]
    ECommerce,
    FoodDelivery,
}

impl UseCase {
    pub const ALL: [UseCase; 6] = [
        UseCase::GovernmentWelfare,
        UseCase::PropertyRecords,
        UseCase::LegalNotices,
        UseCase::EmergencyServices,
        UseCase::ECommerce,
        UseCase::FoodDelivery,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            UseCase::GovernmentWelfare => "Government Welfare",
            UseCase::PropertyRecords => "Property Records",
            UseCase::LegalNotices => "Legal Notices",
            UseCase::EmergencyServices => "Emergency Services",
            UseCase::ECommerce => "E-Commerce",
            UseCase::FoodDelivery => "Food Delivery",
        }
    }

    /// The published approval criteria. The backend decides; this mirrors
    /// it for display.
    ///
    /// - government and legal: AAVA verified only
    /// - emergency: verified, or a score of 80 and up
    /// - commercial: a score of 50 and up
    pub fn is_approved(&self, aava_verified: bool, score: ConfidenceScore) -> bool {
        match self {
            UseCase::GovernmentWelfare | UseCase::PropertyRecords | UseCase::LegalNotices => {
                aava_verified
            }
            UseCase::EmergencyServices => aava_verified || score.value() >= 80.0,
            UseCase::ECommerce | UseCase::FoodDelivery => score.value() >= 50.0,
        }
    }

    /// Criteria text shown next to a decision
    pub fn criteria(&self) -> &'static str {
        match self {
            UseCase::GovernmentWelfare | UseCase::PropertyRecords | UseCase::LegalNotices => {
                "requires full AAVA verification"
            }
            UseCase::EmergencyServices => "AAVA verification or 80+ confidence score",
            UseCase::ECommerce | UseCase::FoodDelivery => "50+ confidence score",
        }
    }
}

/// Current verification state of an address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AavaStatus {
    pub digital_address: String,
    #[serde(default)]
    pub verification_type: Option<String>,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default, with = "crate::address::timestamp")]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_aava_verified: bool,
    #[serde(default)]
    pub requires_aava_verification: bool,
    #[serde(default)]
    pub verification_notes: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<ConfidenceScore>,
    /// Decisions as sent by the server. Keys outside [`UseCase`] are kept
    /// under their raw name.
    #[serde(default)]
    pub approved_use_cases: BTreeMap<String, bool>,
}

impl AavaStatus {
    pub fn is_approved_for(&self, use_case: UseCase) -> Option<bool> {
        let key = serde_json::to_value(use_case).ok()?;
        self.approved_use_cases.get(key.as_str()?).copied()
    }

    /// Use cases where the server's answer differs from the published
    /// criteria. Requires a confidence score in the status.
    pub fn policy_mismatches(&self) -> Vec<UseCase> {
        let score = match self.confidence_score {
            Some(score) => score,
            None => return Vec::new(),
        };
        UseCase::ALL
            .iter()
            .copied()
            .filter(|uc| {
                self.is_approved_for(*uc).map_or(false, |server| {
                    server != uc.is_approved(self.is_aava_verified, score)
                })
            })
            .collect()
    }
}
