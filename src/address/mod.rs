//! Digital address records of the logged in user

mod types;

use log::info;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::geolocation::{self, LocationProvider};
use crate::store::Submission;
use crate::ClientContext;

pub use types::*;
pub(crate) use types::timestamp;

/// Client for `/api/digital-address`
pub struct AddressClient {
    ctx: Arc<ClientContext>,
}

impl AddressClient {
    pub(crate) fn new(ctx: Arc<ClientContext>) -> Self {
        Self { ctx }
    }

    /// Fetch every address of the user and replace the local book.
    pub async fn list(&self) -> Result<Vec<DigitalAddress>> {
        let token = self.ctx.require_token().await?;

        let addresses: Option<Vec<DigitalAddress>> =
            Fetch::get(&self.ctx.http, &self.ctx.endpoint("/api/digital-address"))
                .bearer_auth(&token)
                .execute()
                .await?;
        let addresses = addresses.unwrap_or_default();

        self.ctx
            .state
            .write()
            .await
            .addresses_mut()
            .replace_all(addresses.clone());
        Ok(addresses)
    }

    /// Create an address at the current device position.
    ///
    /// The form is validated before the location is requested, so a bad
    /// form never reaches the network. Requires a verified Aadhaar.
    pub async fn create(
        &self,
        form: &NewAddress,
        location: &dyn LocationProvider,
    ) -> Result<DigitalAddress> {
        form.validate()?;
        let token = {
            let state = self.ctx.state.read().await;
            let token = state.require_token()?;
            if !state.is_aadhaar_verified() {
                return Err(Error::AadhaarRequired);
            }
            token
        };

        let _guard = self.ctx.in_flight.begin(Submission::CreateAddress)?;
        let coords = geolocation::acquire(location, self.ctx.options.geolocation_timeout).await?;

        let suffix = form
            .suffix
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.ctx.options.default_suffix);
        let payload = CreateAddressPayload {
            suffix,
            latitude: coords.latitude,
            longitude: coords.longitude,
            address: &form.address,
            address_name: &form.address_name,
            pincode: &form.pincode,
            purpose: &form.purpose,
            uni_pin: &form.uni_pin,
            consent_type: form.consent_type,
            consent_duration_days: form
                .consent_duration_days
                .filter(|d| *d > 0)
                .unwrap_or(self.ctx.options.default_consent_duration_days),
        };

        let created: DigitalAddress = Fetch::post(
            &self.ctx.http,
            &self.ctx.endpoint("/api/digital-address/create"),
        )
        .bearer_auth(&token)
        .json(&payload)?
        .execute()
        .await?;

        info!("created digital address {}", created.digital_address);
        self.ctx
            .state
            .write()
            .await
            .addresses_mut()
            .add(created.clone());
        Ok(created)
    }

    /// Save edits to an existing address. Identifier, suffix and
    /// coordinates are carried over from `existing`.
    pub async fn update(
        &self,
        existing: &DigitalAddress,
        update: &AddressUpdate,
    ) -> Result<DigitalAddress> {
        update.validate()?;
        let token = self.ctx.require_token().await?;

        let payload = UpdateAddressPayload {
            digital_address: &existing.digital_address,
            suffix: existing.suffix.as_deref(),
            latitude: existing.latitude,
            longitude: existing.longitude,
            address: &update.address,
            address_name: &update.address_name,
            pincode: &update.pincode,
            purpose: &update.purpose,
            uni_pin: &update.uni_pin,
            consent_type: update.consent_type,
            consent_duration_days: update.consent_duration_days,
        };

        let _guard = self.ctx.in_flight.begin(Submission::UpdateAddress)?;
        let updated: DigitalAddress = Fetch::put(
            &self.ctx.http,
            &self.ctx.endpoint("/api/digital-address/update"),
        )
        .bearer_auth(&token)
        .json(&payload)?
        .execute()
        .await?;

        self.ctx
            .state
            .write()
            .await
            .addresses_mut()
            .update(updated.clone());
        Ok(updated)
    }

    /// Delete an address and drop it from the local book.
    pub async fn delete(&self, digital_address: &str) -> Result<()> {
        let token = self.ctx.require_token().await?;

        let _guard = self.ctx.in_flight.begin(Submission::DeleteAddress)?;
        Fetch::delete(
            &self.ctx.http,
            &self.ctx.endpoint("/api/digital-address/delete"),
        )
        .bearer_auth(&token)
        .json(&DeleteAddressPayload { digital_address })?
        .execute_text()
        .await?;

        info!("deleted digital address {}", digital_address);
        self.ctx
            .state
            .write()
            .await
            .addresses_mut()
            .remove(digital_address);
        Ok(())
    }

    /// Ask the backend for the Digipin of a position.
    pub async fn digipin(&self, latitude: f64, longitude: f64) -> Result<String> {
        let token = self.ctx.require_token().await?;

        let text = Fetch::get(
            &self.ctx.http,
            &self.ctx.endpoint("/api/digital-address/digipin"),
        )
        .bearer_auth(&token)
        .query("lat", latitude)
        .query("lon", longitude)
        .execute_text()
        .await?;

        parse_digipin(&text)
            .ok_or_else(|| Error::invalid_input("empty digipin response"))
    }
}

const DIGIPIN_KEYS: [&str; 4] = ["digipinId", "digipin", "generatedDigipin", "digiPin"];

/// The endpoint answers with a bare code, a JSON string, or an object.
fn parse_digipin(text: &str) -> Option<String> {
    let text = text.trim();
    let code = match serde_json::from_str::<serde_json::Value>(text) {
        Ok(serde_json::Value::String(s)) => s,
        Ok(serde_json::Value::Object(map)) => DIGIPIN_KEYS
            .iter()
            .find_map(|k| map.get(*k).and_then(|v| v.as_str()))
            .map(str::to_string)?,
        _ => text.to_string(),
    };
    Some(code).filter(|c| !c.is_empty())
}
