//! AAVA field verification

mod types;

use log::info;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::fetch::Fetch;
use crate::store::Submission;
use crate::validate;
use crate::ClientContext;

pub use types::*;

pub struct AavaClient {
    ctx: Arc<ClientContext>,
}

impl AavaClient {
    pub(crate) fn new(ctx: Arc<ClientContext>) -> Self {
        Self { ctx }
    }

    /// Submit an agent's verification of an address
    pub async fn verify(
        &self,
        request: &AavaVerificationRequest,
    ) -> Result<AavaVerificationResult> {
        let payload = request.normalized();
        validate::required("Digital address", &payload.digital_address)?;
        validate::required("AAVA agent ID", &payload.agent_id)?;
        if payload.verified_latitude.is_some() != payload.verified_longitude.is_some() {
            return Err(Error::invalid_input(
                "Both verified latitude and longitude are needed",
            ));
        }

        let _guard = self.ctx.in_flight.begin(Submission::AavaVerify)?;
        let builder = Fetch::post(&self.ctx.http, &self.ctx.endpoint("/api/aava/aava-verify"));
        let result: AavaVerificationResult = self
            .ctx
            .with_optional_auth(builder)
            .await
            .json(&payload)?
            .execute()
            .await?;

        info!(
            "aava verification for {} recorded as {:?}",
            result.digital_address, result.verification_status
        );
        Ok(result)
    }

    /// Look up the verification state and approved use cases
    pub async fn status(&self, digital_address: &str) -> Result<AavaStatus> {
        let digital_address = digital_address.trim();
        validate::required("Digital address", digital_address)?;

        let _guard = self.ctx.in_flight.begin(Submission::AavaStatus)?;
        let url = self.ctx.endpoint(&format!(
            "/api/aava/aava-status/{}",
            urlencoding::encode(digital_address)
        ));
        let builder = Fetch::get(&self.ctx.http, &url);
        self.ctx
            .with_optional_auth(builder)
            .await
            .execute()
            .await
            .map_err(|e| match e {
                Error::NotFound(_) => Error::NotFound("Digital address not found".to_string()),
                other => other,
            })
    }
}
