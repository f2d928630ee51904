//! Types for digital address records

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{Error, Result};
use crate::validate;

/// How long a partner may resolve the address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConsentType {
    #[default]
    Permanent,
    Temporary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AddressStatus {
    #[default]
    Active,
    Expired,
    Inactive,
}

/// Server computed reliability metric, always within `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct ConfidenceScore(f64);

impl ConfidenceScore {
    pub const MIN: f64 = 0.0;
    pub const MAX: f64 = 100.0;

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self(Self::MIN);
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for ConfidenceScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{:.1}", self.0)
        }
    }
}

impl Serialize for ConfidenceScore {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.0)
    }
}

impl<'de> Deserialize<'de> for ConfidenceScore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Option::<f64>::deserialize(deserializer)?;
        Ok(Self::new(raw.unwrap_or(Self::MIN)))
    }
}

/// A digital address record owned by the logged in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalAddress {
    /// `user@suffix`
    pub digital_address: String,
    #[serde(default)]
    pub suffix: Option<String>,
    #[serde(default)]
    pub address_name: String,
    #[serde(default)]
    pub purpose: String,
    /// Physical address
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub pincode: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub uni_pin: Option<String>,
    #[serde(default)]
    pub consent_type: ConsentType,
    #[serde(default)]
    pub consent_duration_days: Option<u32>,
    #[serde(default)]
    pub confidence_score: ConfidenceScore,
    #[serde(default, deserialize_with = "status_or_active")]
    pub status: AddressStatus,
    #[serde(default)]
    pub generated_digipin: Option<String>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DigitalAddress {
    /// Whole days left on a TEMPORARY grant, never negative.
    ///
    /// `None` for PERMANENT consent, when the record lacks a creation
    /// time or duration, or when the expiry is out of the calendar range.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        if self.consent_type != ConsentType::Temporary {
            return None;
        }
        let created = self.created_at?;
        let days = i64::from(self.consent_duration_days.filter(|d| *d > 0)?);
        let expiry = created.checked_add_signed(chrono::Duration::try_days(days)?)?;
        let left_ms = (expiry - now).num_milliseconds();
        const DAY_MS: i64 = 24 * 60 * 60 * 1000;
        // ceil for positive spans
        let left_days = (left_ms + DAY_MS - 1).div_euclid(DAY_MS);
        Some(left_days.max(0))
    }

    pub fn is_active(&self) -> bool {
        self.status == AddressStatus::Active
    }
}

fn status_or_active<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<AddressStatus, D::Error> {
    Ok(Option::<AddressStatus>::deserialize(deserializer)?.unwrap_or_default())
}

/// Timestamps arrive either as RFC 3339 or as zone-less local date-times,
/// which are taken to be UTC.
pub(crate) mod timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
        let raw = match Option::<String>::deserialize(deserializer)? {
            Some(raw) => raw,
            None => return Ok(None),
        };
        if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
            return Ok(Some(dt.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Some(naive.and_utc()))
            .map_err(serde::de::Error::custom)
    }
}

/// Form data for a new address. Coordinates come from the location
/// provider at submit time.
#[derive(Debug, Clone, Default)]
pub struct NewAddress {
    pub suffix: Option<String>,
    pub address_name: String,
    pub purpose: String,
    pub address: String,
    pub pincode: String,
    pub uni_pin: String,
    pub consent_type: ConsentType,
    pub consent_duration_days: Option<u32>,
}

impl NewAddress {
    pub fn validate(&self) -> Result<()> {
        validate::required("Address name", &self.address_name)?;
        validate::required("Physical address", &self.address)?;
        validate::pincode(&self.pincode)?;
        validate::pin(&self.uni_pin)?;
        validate_consent(self.consent_type, self.consent_duration_days)
    }
}

/// Edited fields of an existing address
#[derive(Debug, Clone, Default)]
pub struct AddressUpdate {
    pub address_name: String,
    pub purpose: String,
    pub address: String,
    pub pincode: String,
    pub uni_pin: String,
    pub consent_type: ConsentType,
    pub consent_duration_days: Option<u32>,
}

impl AddressUpdate {
    /// Starts an edit from the stored record.
    pub fn from_existing(address: &DigitalAddress) -> Self {
        Self {
            address_name: address.address_name.clone(),
            purpose: address.purpose.clone(),
            address: address.address.clone(),
            pincode: address.pincode.clone(),
            uni_pin: address.uni_pin.clone().unwrap_or_default(),
            consent_type: address.consent_type,
            consent_duration_days: address.consent_duration_days,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("Address name", &self.address_name),
            ("Purpose", &self.purpose),
            ("Physical address", &self.address),
        ] {
            validate::required(field, value)?;
        }
        validate::pincode(&self.pincode)?;
        validate::pin(&self.uni_pin)?;
        validate_consent(self.consent_type, self.consent_duration_days)
    }
}

/// TEMPORARY consent must carry a positive duration.
pub fn validate_consent(consent_type: ConsentType, days: Option<u32>) -> Result<()> {
    match (consent_type, days) {
        (ConsentType::Temporary, None) | (ConsentType::Temporary, Some(0)) => Err(
            Error::invalid_input("Number of days is required for temporary consent"),
        ),
        _ => Ok(()),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateAddressPayload<'a> {
    pub suffix: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub address: &'a str,
    pub address_name: &'a str,
    pub pincode: &'a str,
    pub purpose: &'a str,
    pub uni_pin: &'a str,
    pub consent_type: ConsentType,
    pub consent_duration_days: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdateAddressPayload<'a> {
    pub digital_address: &'a str,
    pub suffix: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub address: &'a str,
    pub address_name: &'a str,
    pub pincode: &'a str,
    pub purpose: &'a str,
    pub uni_pin: &'a str,
    pub consent_type: ConsentType,
    pub consent_duration_days: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteAddressPayload<'a> {
    pub digital_address: &'a str,
}
