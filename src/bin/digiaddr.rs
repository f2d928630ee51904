use clap::{App, Arg, ArgMatches};
use log::debug;
use std::process;

use digital_address_rust::aava::UseCase;
use digital_address_rust::address::ConsentType;
use digital_address_rust::aiu::{AiuRecord, FeedbackRequest, FulfillmentStatus};
use digital_address_rust::auth::LoginRequest;
use digital_address_rust::config::{ClientConfig, ClientOptions};
use digital_address_rust::error::{Error, Result};
use digital_address_rust::DigitalAddressClient;

fn cli() -> App<'static> {
    App::new("digiaddr")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage digital addresses, resolve them with consent and check AAVA status")
        .arg(
            Arg::new("api_url")
                .long("api-url")
                .value_name("URL")
                .help("Backend base URL (defaults to DIGITAL_ADDRESS_API_URL)")
                .takes_value(true),
        )
        .arg(
            Arg::new("token_file")
                .long("token-file")
                .value_name("FILE")
                .help("Where the session token is kept between runs")
                .takes_value(true),
        )
        .subcommand(
            App::new("login")
                .about("Log in with email or phone")
                .arg(Arg::new("email").long("email").takes_value(true))
                .arg(Arg::new("phone").long("phone").takes_value(true))
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .subcommand(App::new("logout").about("Forget the stored session"))
        .subcommand(App::new("profile").about("Show the logged in user"))
        .subcommand(App::new("list").about("List your digital addresses"))
        .subcommand(
            App::new("delete")
                .about("Delete one of your digital addresses")
                .arg(Arg::new("address").required(true)),
        )
        .subcommand(
            App::new("store")
                .about("Store a customer record as an AIU")
                .arg(Arg::new("name").long("name").takes_value(true).required(true))
                .arg(Arg::new("phone").long("phone").takes_value(true).required(true))
                .arg(
                    Arg::new("pin")
                        .long("pin")
                        .help("Customer's DaPin, validated only; not saved after exit")
                        .takes_value(true),
                )
                .arg(Arg::new("address").required(true)),
        )
        .subcommand(
            App::new("resolve")
                .about("Resolve a digital address with the owner's DaPin")
                .arg(Arg::new("address").required(true))
                .arg(
                    Arg::new("pin")
                        .long("pin")
                        .takes_value(true)
                        .required(true),
                ),
        )
        .subcommand(
            App::new("feedback")
                .about("Report a delivery outcome")
                .arg(Arg::new("address").required(true))
                .arg(
                    Arg::new("status")
                        .long("status")
                        .takes_value(true)
                        .possible_values(["success", "failure", "neutral"])
                        .required(true),
                )
                .arg(
                    Arg::new("aiu")
                        .long("aiu")
                        .value_name("ID")
                        .takes_value(true)
                        .required(true),
                )
                .arg(Arg::new("comments").long("comments").takes_value(true)),
        )
        .subcommand(
            App::new("aava-status")
                .about("Show AAVA verification and approved use cases")
                .arg(Arg::new("address").required(true)),
        )
}

fn config(matches: &ArgMatches) -> Result<ClientConfig> {
    let mut config = match matches.value_of("api_url") {
        Some(url) => {
            let mut config = ClientConfig::new(url)?;
            if let Ok(path) = std::env::var("DIGITAL_ADDRESS_TOKEN_FILE") {
                config = config.with_token_file(path);
            }
            config
        }
        None => ClientConfig::from_env()?,
    };
    if let Some(path) = matches.value_of("token_file") {
        config = config.with_token_file(path);
    }
    Ok(config)
}

async fn run(matches: ArgMatches) -> Result<()> {
    let config = config(&matches)?;
    debug!("using backend {}", config.base_url());
    let client = DigitalAddressClient::from_config(config, ClientOptions::default()).await?;

    match matches.subcommand() {
        Some(("login", args)) => {
            let password = args.value_of("password").unwrap_or_default();
            let request = match (args.value_of("email"), args.value_of("phone")) {
                (Some(email), _) => LoginRequest::with_email(email, password),
                (None, Some(phone)) => LoginRequest::with_phone(phone, password),
                (None, None) => return Err(Error::invalid_input("Email or phone is required")),
            };
            client.auth().login(&request).await?;
            println!("Logged in");
        }
        Some(("logout", _)) => {
            client.auth().logout().await?;
            println!("Logged out");
        }
        Some(("profile", _)) => {
            let profile = client.auth().profile().await?;
            match &profile.email {
                Some(email) => println!("{} <{}>", profile.username, email),
                None => println!("{}", profile.username),
            }
            println!(
                "Aadhaar: {}",
                if profile.aadhaar_verified { "verified" } else { "not verified" }
            );
        }
        Some(("list", _)) => {
            let addresses = client.addresses().list().await?;
            if addresses.is_empty() {
                println!("No digital addresses yet");
            }
            let now = chrono::Utc::now();
            for address in &addresses {
                let consent = match (address.consent_type, address.days_remaining(now)) {
                    (ConsentType::Temporary, Some(days)) => {
                        format!("temporary, {} days left", days)
                    }
                    (ConsentType::Temporary, None) => "temporary".to_string(),
                    (ConsentType::Permanent, _) => "permanent".to_string(),
                };
                println!(
                    "{}  {}  score {}  ({})",
                    address.digital_address, address.address_name, address.confidence_score, consent
                );
            }
        }
        Some(("delete", args)) => {
            let address = args.value_of("address").unwrap_or_default();
            client.addresses().delete(address).await?;
            println!("Deleted {}", address);
        }
        Some(("store", args)) => {
            let mut record = AiuRecord::new(
                args.value_of("name").unwrap_or_default(),
                args.value_of("phone").unwrap_or_default(),
                args.value_of("address").unwrap_or_default(),
            );
            if let Some(pin) = args.value_of("pin") {
                record = record.with_da_pin(pin);
            }
            client.aiu().store(&record).await?;
            println!("Stored {}", record.digital_address);
        }
        Some(("resolve", args)) => {
            let resolved = client
                .aiu()
                .resolve_with_consent(
                    args.value_of("address").unwrap_or_default(),
                    args.value_of("pin").unwrap_or_default(),
                )
                .await?;
            println!("{}", resolved.address);
            println!("Pincode: {}", resolved.pincode);
            println!("Location: {}, {}", resolved.latitude, resolved.longitude);
            if let Some(digipin) = &resolved.generated_digipin {
                println!("Digipin: {}", digipin);
            }
            println!("Confidence: {}", resolved.confidence_score);
        }
        Some(("feedback", args)) => {
            let status = match args.value_of("status") {
                Some("failure") => FulfillmentStatus::Failure,
                Some("neutral") => FulfillmentStatus::Neutral,
                _ => FulfillmentStatus::Success,
            };
            let mut request = FeedbackRequest::new(
                args.value_of("address").unwrap_or_default(),
                status,
                args.value_of("aiu").unwrap_or_default(),
            );
            if let Some(comments) = args.value_of("comments") {
                request = request.with_comments(comments);
            }
            let response = client.aiu().feedback(&request).await?;
            println!(
                "Confidence {} -> {} ({:+})",
                response.old_confidence_score,
                response.new_confidence_score,
                response.delta()
            );
        }
        Some(("aava-status", args)) => {
            let status = client
                .aava()
                .status(args.value_of("address").unwrap_or_default())
                .await?;
            println!(
                "{}: {}",
                status.digital_address,
                if status.is_aava_verified { "AAVA verified" } else { "not AAVA verified" }
            );
            for use_case in UseCase::ALL {
                let decision = match status.is_approved_for(use_case) {
                    Some(true) => "approved",
                    Some(false) => "not approved",
                    None => "unknown",
                };
                println!("  {:<20} {:<13} {}", use_case.label(), decision, use_case.criteria());
            }
        }
        _ => {
            cli().print_help().map_err(Error::config)?;
            println!();
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let matches = cli().get_matches();
    if let Err(e) = run(matches).await {
        eprintln!("Error: {}", e.user_message());
        process::exit(1);
    }
}
