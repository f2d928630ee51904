//! Types for the Address Information Unit service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::address::ConfidenceScore;
use crate::error::Result;
use crate::validate;

/// What a delivery partner keeps about a customer. Never holds the
/// physical address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiuRecord {
    pub name: String,
    pub phone_number: String,
    pub digital_address: String,
    /// DaPin handed over by the customer. Stays in the local registry and
    /// is never part of the store request.
    #[serde(skip)]
    pub da_pin: Option<String>,
}

impl AiuRecord {
    pub fn new(name: &str, phone_number: &str, digital_address: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            phone_number: phone_number.trim().to_string(),
            digital_address: digital_address.trim().to_string(),
            da_pin: None,
        }
    }

    pub fn with_da_pin(mut self, da_pin: &str) -> Self {
        self.da_pin = Some(da_pin.trim().to_string());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate::required("Name", &self.name)?;
        validate::phone_number(&self.phone_number)?;
        validate::digital_address(&self.digital_address)?;
        match &self.da_pin {
            Some(pin) => validate::pin(pin),
            None => Ok(()),
        }
    }
}

/// A record held in the local partner registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRecord {
    pub id: u64,
    pub record: AiuRecord,
    pub stored_at: DateTime<Utc>,
}

/// Partner-side cache, newest first.
#[derive(Debug, Clone, Default)]
pub struct AiuRegistry {
    records: Vec<StoredRecord>,
    next_id: u64,
}

impl AiuRegistry {
    pub fn insert(&mut self, record: AiuRecord) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.records.insert(
            0,
            StoredRecord {
                id,
                record,
                stored_at: Utc::now(),
            },
        );
        id
    }

    pub fn remove(&mut self, id: u64) -> Option<StoredRecord> {
        let pos = self.records.iter().position(|r| r.id == id)?;
        Some(self.records.remove(pos))
    }

    pub fn get(&self, id: u64) -> Option<&StoredRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn records(&self) -> &[StoredRecord] {
        &self.records
    }

    pub fn find_by_phone(&self, phone_number: &str) -> Option<&StoredRecord> {
        self.records
            .iter()
            .find(|r| r.record.phone_number == phone_number)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResolveRequest<'a> {
    pub digital_address: &'a str,
    pub upi_pin: &'a str,
}

/// Physical location released under consent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAddress {
    pub digital_address: String,
    #[serde(default)]
    pub generated_digipin: Option<String>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub pincode: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub confidence_score: ConfidenceScore,
    #[serde(default)]
    pub verification_type: Option<String>,
}

/// Delivery outcome reported by a partner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentStatus {
    #[default]
    Success,
    Failure,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub digital_address: String,
    pub fulfillment_status: FulfillmentStatus,
    pub aiu_identifier: String,
    #[serde(default)]
    pub comments: String,
}

impl FeedbackRequest {
    pub fn new(
        digital_address: &str,
        fulfillment_status: FulfillmentStatus,
        aiu_identifier: &str,
    ) -> Self {
        Self {
            digital_address: digital_address.trim().to_string(),
            fulfillment_status,
            aiu_identifier: aiu_identifier.trim().to_string(),
            comments: String::new(),
        }
    }

    pub fn with_comments(mut self, comments: &str) -> Self {
        self.comments = comments.to_string();
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate::required("Digital address", &self.digital_address)?;
        validate::required("AIU identifier", &self.aiu_identifier)
    }
}

/// Score movement caused by the feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    #[serde(default)]
    pub digital_address: Option<String>,
    #[serde(default)]
    pub fulfillment_status: Option<FulfillmentStatus>,
    pub old_confidence_score: ConfidenceScore,
    pub new_confidence_score: ConfidenceScore,
    #[serde(default)]
    pub message: Option<String>,
}

impl FeedbackResponse {
    pub fn delta(&self) -> f64 {
        self.new_confidence_score.value() - self.old_confidence_score.value()
    }

    pub fn is_unchanged(&self) -> bool {
        self.old_confidence_score == self.new_confidence_score
    }
}
