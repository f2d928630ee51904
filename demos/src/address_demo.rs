use chrono::Utc;
use dotenv::dotenv;
use std::env;

use digital_address_rust::auth::LoginRequest;
use digital_address_rust::prelude::*;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let config = ClientConfig::from_env()?;
    let email = env::var("DEMO_EMAIL").expect("DEMO_EMAIL must be set");
    let password = env::var("DEMO_PASSWORD").expect("DEMO_PASSWORD must be set");

    let client = DigitalAddressClient::from_config(config, ClientOptions::default()).await?;
    if client.auth().get_session().await.is_none() {
        client
            .auth()
            .login(&LoginRequest::with_email(&email, &password))
            .await?;
    }
    // Loads the Aadhaar flag into the store.
    client.auth().profile().await?;

    let addresses = client.addresses();

    println!("\n1. Creating an address at a fixed position");
    let form = NewAddress {
        address_name: "Home".to_string(),
        purpose: "Deliveries".to_string(),
        address: "12 MG Road, Bengaluru".to_string(),
        pincode: "560001".to_string(),
        uni_pin: "482913".to_string(),
        consent_type: ConsentType::Temporary,
        consent_duration_days: Some(30),
        ..Default::default()
    };
    match addresses.create(&form, &FixedLocation::new(12.9716, 77.5946)).await {
        Ok(created) => println!("Created {}", created.digital_address),
        Err(e) => println!("Create failed: {}", e.user_message()),
    }

    println!("\n2. Listing");
    let all = addresses.list().await?;
    for address in &all {
        println!(
            "  {} score {} days left {:?}",
            address.digital_address,
            address.confidence_score,
            address.days_remaining(Utc::now())
        );
    }

    if let Some(first) = all.first() {
        println!("\n3. Renaming {}", first.digital_address);
        let mut update = AddressUpdate::from_existing(first);
        update.address_name = format!("{} (edited)", first.address_name);
        if update.purpose.is_empty() {
            update.purpose = "Deliveries".to_string();
        }
        match addresses.update(first, &update).await {
            Ok(updated) => println!("Now called {}", updated.address_name),
            Err(e) => println!("Update failed: {}", e.user_message()),
        }

        if let (Some(lat), Some(lon)) = (first.latitude, first.longitude) {
            println!("\n4. Digipin: {}", addresses.digipin(lat, lon).await?);
        }
    }

    let state = client.state();
    let stats = state.read().await.addresses().stats();
    println!("\nStats: {:?}", stats);

    Ok(())
}

