use dotenv::dotenv;
use std::env;

use digital_address_rust::aava::{AavaVerificationRequest, UseCase, VerificationStatus};
use digital_address_rust::prelude::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let config = ClientConfig::from_env()?;
    let digital_address = env::var("DEMO_ADDRESS").expect("DEMO_ADDRESS must be set");

    let client = DigitalAddressClient::from_config(config, ClientOptions::default()).await?;
    let aava = client.aava();

    if let Ok(agent_id) = env::var("DEMO_AGENT_ID") {
        println!("\n1. Submitting a field verification");
        let request = AavaVerificationRequest::new(
            &digital_address,
            &agent_id,
            VerificationStatus::Verified,
        )
        .with_location(12.9716, 77.5946)
        .with_notes("Door number matches");
        match aava.verify(&request).await {
            Ok(result) => println!(
                "{}: {} (score {:?} -> {:?})",
                result.digital_address,
                result.verification_status,
                result.old_confidence_score,
                result.new_confidence_score
            ),
            Err(e) => println!("Verification failed: {}", e.user_message()),
        }
    }

    println!("\n2. Status");
    let status = aava.status(&digital_address).await?;
    println!("AAVA verified: {}", status.is_aava_verified);
    for use_case in UseCase::ALL {
        println!(
            "  {:<20} {:?}",
            use_case.label(),
            status.is_approved_for(use_case)
        );
    }

    Ok(())
}
