use dotenv::dotenv;
use std::env;

use digital_address_rust::prelude::*;

/// Partner flow: keep a customer record, resolve it with the customer's
/// DaPin, then report how the delivery went.
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let config = ClientConfig::from_env()?;
    let digital_address = env::var("DEMO_ADDRESS").expect("DEMO_ADDRESS must be set");
    let upi_pin = env::var("DEMO_DAPIN").expect("DEMO_DAPIN must be set");
    let aiu_id = env::var("DEMO_AIU_ID").unwrap_or_else(|_| "demo-aiu".to_string());

    let client = DigitalAddressClient::from_config(config, ClientOptions::default()).await?;
    let aiu = client.aiu();

    println!("\n1. Storing the customer record");
    let record = AiuRecord::new("Demo Customer", "9876543210", &digital_address);
    match aiu.store(&record).await {
        Ok(id) => println!("Stored locally as #{}", id),
        Err(e) => println!("Store failed: {}", e.user_message()),
    }

    println!("\n2. Resolving with consent");
    match aiu.resolve_with_consent(&digital_address, &upi_pin).await {
        Ok(resolved) => {
            println!("Address: {}", resolved.address);
            println!("Location: {}, {}", resolved.latitude, resolved.longitude);
            println!("Confidence: {}", resolved.confidence_score);
        }
        Err(e) => {
            println!("Resolve failed: {}", e.user_message());
            return Ok(());
        }
    }

    println!("\n3. Reporting a successful delivery");
    let feedback = FeedbackRequest::new(&digital_address, FulfillmentStatus::Success, &aiu_id)
        .with_comments("Delivered at the gate");
    let response = aiu.feedback(&feedback).await?;
    println!(
        "Confidence moved {} -> {}",
        response.old_confidence_score, response.new_confidence_score
    );

    Ok(())
}
