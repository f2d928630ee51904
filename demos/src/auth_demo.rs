use dotenv::dotenv;
use std::env;

use digital_address_rust::auth::{LoginRequest, RegisterRequest};
use digital_address_rust::prelude::*;
use digital_address_rust::store::Route;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let config = ClientConfig::from_env()?;
    let email = env::var("DEMO_EMAIL").expect("DEMO_EMAIL must be set");
    let password = env::var("DEMO_PASSWORD").expect("DEMO_PASSWORD must be set");

    let client = DigitalAddressClient::from_config(config, ClientOptions::default()).await?;

    if let Ok(phone) = env::var("DEMO_PHONE") {
        println!("\n1. Registering {}", email);
        let request = RegisterRequest {
            user_name: env::var("DEMO_USERNAME").unwrap_or_else(|_| "demo".to_string()),
            email_id: email.clone(),
            password: password.clone(),
            phone_number: phone,
        };
        match client.auth().register(&request).await {
            Ok(answer) => println!("Registered: {}", answer),
            Err(e) => println!("Registration skipped: {}", e.user_message()),
        }
    }

    println!("\n2. Logging in");
    let session = client
        .auth()
        .login(&LoginRequest::with_email(&email, &password))
        .await?;
    println!("Token subject: {:?}", session.subject());

    println!("\n3. Profile");
    let profile = client.auth().profile().await?;
    println!("{} (aadhaar verified: {})", profile.username, profile.aadhaar_verified);

    if !profile.aadhaar_verified {
        if let (Ok(aadhaar), Ok(dob)) = (env::var("DEMO_AADHAAR"), env::var("DEMO_DOB")) {
            println!("\n4. Verifying Aadhaar");
            match client.auth().verify_aadhaar(&aadhaar, &dob).await {
                Ok(_) | Err(Error::AlreadyVerified) => println!("Aadhaar verified"),
                Err(e) => println!("Verification failed: {}", e.user_message()),
            }
        }
    }

    let state = client.state();
    println!(
        "\nCreate address page: {:?}",
        state.read().await.guard(Route::CreateAddress)
    );

    println!("\n5. Logging out");
    client.auth().logout().await?;
    println!("Dashboard page: {:?}", state.read().await.guard(Route::Dashboard));

    Ok(())
}
