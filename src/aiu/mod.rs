//! Address Information Unit: the partner-facing side.
//!
//! Partners keep a minimal record of a customer (name, phone, digital
//! address) and resolve it to a physical location only with the owner's
//! DaPin. Delivery outcomes flow back as feedback that moves the address'
//! confidence score.

mod types;

use log::info;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::store::Submission;
use crate::validate;
use crate::ClientContext;

pub use types::*;

pub struct AiuClient {
    ctx: Arc<ClientContext>,
}

impl AiuClient {
    pub(crate) fn new(ctx: Arc<ClientContext>) -> Self {
        Self { ctx }
    }

    /// Store a partner record on the backend and in the local registry.
    /// Returns the local registry id.
    pub async fn store(&self, record: &AiuRecord) -> Result<u64> {
        record.validate()?;

        let _guard = self.ctx.in_flight.begin(Submission::StoreAiu)?;
        let builder = Fetch::post(&self.ctx.http, &self.ctx.endpoint("/api/aiu/store"));
        self.ctx
            .with_optional_auth(builder)
            .await
            .json(record)?
            .execute_text()
            .await?;

        let id = self
            .ctx
            .state
            .write()
            .await
            .aiu_records_mut()
            .insert(record.clone());
        Ok(id)
    }

    /// Drop a record from the local registry only.
    pub async fn forget(&self, id: u64) -> Option<StoredRecord> {
        self.ctx.state.write().await.aiu_records_mut().remove(id)
    }

    pub async fn records(&self) -> Vec<StoredRecord> {
        self.ctx.state.read().await.aiu_records().records().to_vec()
    }

    /// Resolve a digital address to its location with the owner's DaPin.
    ///
    /// One attempt, nothing cached. 404 means the address is unknown, 401
    /// a wrong PIN or no active consent.
    pub async fn resolve_with_consent(
        &self,
        digital_address: &str,
        upi_pin: &str,
    ) -> Result<ResolvedAddress> {
        let digital_address = digital_address.trim();
        validate::required("Digital address", digital_address)?;
        validate::pin(upi_pin)?;

        let _guard = self.ctx.in_flight.begin(Submission::Resolve)?;
        let builder = Fetch::post(
            &self.ctx.http,
            &self.ctx.endpoint("/api/aiu/resolve-with-consent"),
        );
        let resolved: ResolvedAddress = self
            .ctx
            .with_optional_auth(builder)
            .await
            .json(&ResolveRequest {
                digital_address,
                upi_pin,
            })?
            .execute()
            .await
            .map_err(|e| match e {
                Error::NotFound(_) => Error::NotFound("Digital address not found".to_string()),
                other => other.or_message("Invalid DaPin or no active consent", ""),
            })?;

        info!("resolved {}", resolved.digital_address);
        Ok(resolved)
    }

    /// Resolve a registry entry with the DaPin stored alongside it.
    pub async fn resolve_stored(&self, id: u64) -> Result<ResolvedAddress> {
        let record = self
            .ctx
            .state
            .read()
            .await
            .aiu_records()
            .get(id)
            .map(|stored| stored.record.clone())
            .ok_or_else(|| Error::NotFound(format!("No stored record #{}", id)))?;
        let da_pin = record
            .da_pin
            .ok_or_else(|| Error::invalid_input("Please enter DaPin"))?;
        self.resolve_with_consent(&record.digital_address, &da_pin)
            .await
    }

    /// Report a delivery outcome. The returned scores are the server's;
    /// a matching address in the local book takes the new score.
    pub async fn feedback(&self, request: &FeedbackRequest) -> Result<FeedbackResponse> {
        request.validate()?;

        let _guard = self.ctx.in_flight.begin(Submission::Feedback)?;
        let builder = Fetch::post(&self.ctx.http, &self.ctx.endpoint("/api/aiu/feedback"));
        let response: FeedbackResponse = self
            .ctx
            .with_optional_auth(builder)
            .await
            .json(request)?
            .execute()
            .await
            .map_err(|e| match e {
                Error::NotFound(_) => Error::NotFound("Digital address not found".to_string()),
                other => other.or_message("", "Invalid feedback data"),
            })?;

        let mut state = self.ctx.state.write().await;
        let book = state.addresses_mut();
        if let Some(existing) = book.get(&request.digital_address).cloned() {
            let mut updated = existing;
            updated.confidence_score = response.new_confidence_score;
            book.update(updated);
        }
        Ok(response)
    }
}
