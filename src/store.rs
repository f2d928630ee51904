//! In-memory application state shared by all service clients.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::address::{ConsentType, DigitalAddress};
use crate::aiu::AiuRegistry;
use crate::auth::UserProfile;
use crate::error::{Error, Result};

/// Where unauthenticated visitors are sent.
pub const LANDING_PATH: &str = "/";

/// The user's addresses as last fetched, newest first.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    addresses: Vec<DigitalAddress>,
    last_fetch: Option<DateTime<Utc>>,
}

/// Counts shown on the dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AddressStats {
    pub total: usize,
    pub permanent: usize,
    pub temporary: usize,
    pub active: usize,
}

impl AddressBook {
    pub fn all(&self) -> &[DigitalAddress] {
        &self.addresses
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    pub fn get(&self, digital_address: &str) -> Option<&DigitalAddress> {
        self.addresses
            .iter()
            .find(|a| a.digital_address == digital_address)
    }

    /// Replaces everything with a fresh fetch.
    pub fn replace_all(&mut self, addresses: Vec<DigitalAddress>) {
        self.addresses = addresses;
        self.last_fetch = Some(Utc::now());
    }

    pub fn add(&mut self, address: DigitalAddress) {
        self.addresses.insert(0, address);
    }

    /// Returns whether an entry was removed.
    pub fn remove(&mut self, digital_address: &str) -> bool {
        let before = self.addresses.len();
        self.addresses
            .retain(|a| a.digital_address != digital_address);
        self.addresses.len() != before
    }

    /// Replaces the entry with the same digital address. Unknown entries
    /// are ignored.
    pub fn update(&mut self, address: DigitalAddress) -> bool {
        match self
            .addresses
            .iter_mut()
            .find(|a| a.digital_address == address.digital_address)
        {
            Some(slot) => {
                *slot = address;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.addresses.clear();
        self.last_fetch = None;
    }

    /// The first address holding the top score.
    pub fn highest_confidence(&self) -> Option<&DigitalAddress> {
        self.addresses.iter().fold(None, |best, current| match best {
            Some(b) if current.confidence_score <= b.confidence_score => Some(b),
            _ => Some(current),
        })
    }

    pub fn filter(&self, consent: ConsentType) -> Vec<&DigitalAddress> {
        self.addresses
            .iter()
            .filter(|a| a.consent_type == consent)
            .collect()
    }

    pub fn stats(&self) -> AddressStats {
        self.addresses
            .iter()
            .fold(AddressStats::default(), |mut stats, a| {
                stats.total += 1;
                match a.consent_type {
                    ConsentType::Permanent => stats.permanent += 1,
                    ConsentType::Temporary => stats.temporary += 1,
                }
                if a.is_active() {
                    stats.active += 1;
                }
                stats
            })
    }
}

/// Application pages that care about authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Root,
    Home,
    Dashboard,
    Profile,
    CreateAddress,
    AiuStore,
    ResolveConsent,
    Feedback,
    AavaVerification,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Root => "/",
            Route::Home => "/home",
            Route::Dashboard => "/dashboard",
            Route::Profile => "/profile",
            Route::CreateAddress => "/home",
            Route::AiuStore => "/user_aiu",
            Route::ResolveConsent => "/resolve_consent",
            Route::Feedback => "/feedback",
            Route::AavaVerification => "/verify-aava",
        }
    }

    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            Route::Home | Route::Dashboard | Route::Profile | Route::CreateAddress
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// Logged in but Aadhaar is not yet verified
    NeedsAadhaar,
    Redirect(&'static str),
}

/// Session token, profile and addresses.
#[derive(Debug, Default)]
pub struct AppState {
    token: Option<String>,
    user: Option<UserProfile>,
    user_loading: bool,
    aadhaar_verified: bool,
    addresses: AddressBook,
    aiu_records: AiuRegistry,
}

impl AppState {
    pub fn with_token(token: Option<String>) -> Self {
        Self {
            token,
            ..Default::default()
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Token for a bearer request.
    pub fn require_token(&self) -> Result<String> {
        self.token.clone().ok_or(Error::NotLoggedIn)
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    /// Drops everything tied to the session.
    pub fn clear_session(&mut self) {
        self.token = None;
        self.user = None;
        self.user_loading = false;
        self.aadhaar_verified = false;
        self.addresses.clear();
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }

    pub fn user_loading(&self) -> bool {
        self.user_loading
    }

    pub fn set_user_loading(&mut self, loading: bool) {
        self.user_loading = loading;
    }

    pub fn set_user(&mut self, user: UserProfile) {
        self.aadhaar_verified = user.aadhaar_verified;
        self.user = Some(user);
        self.user_loading = false;
    }

    pub fn is_aadhaar_verified(&self) -> bool {
        self.aadhaar_verified
    }

    pub fn set_user_verified(&mut self, verified: bool) {
        self.aadhaar_verified = verified;
        if let Some(user) = self.user.as_mut() {
            user.aadhaar_verified = verified;
        }
    }

    pub fn addresses(&self) -> &AddressBook {
        &self.addresses
    }

    pub fn addresses_mut(&mut self) -> &mut AddressBook {
        &mut self.addresses
    }

    pub fn aiu_records(&self) -> &AiuRegistry {
        &self.aiu_records
    }

    pub fn aiu_records_mut(&mut self) -> &mut AiuRegistry {
        &mut self.aiu_records
    }

    pub fn guard(&self, route: Route) -> Access {
        if !route.requires_auth() {
            return Access::Granted;
        }
        if !self.is_authenticated() {
            return Access::Redirect(LANDING_PATH);
        }
        if route == Route::CreateAddress && !self.aadhaar_verified {
            return Access::NeedsAadhaar;
        }
        Access::Granted
    }
}

/// Kinds of submission that may not overlap with themselves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Submission {
    Login,
    Register,
    ForgotPassword,
    VerifyAadhaar,
    CreateAddress,
    UpdateAddress,
    DeleteAddress,
    StoreAiu,
    Resolve,
    Feedback,
    AavaVerify,
    AavaStatus,
}

impl Submission {
    fn name(&self) -> &'static str {
        match self {
            Submission::Login => "login",
            Submission::Register => "register",
            Submission::ForgotPassword => "password reset",
            Submission::VerifyAadhaar => "Aadhaar verification",
            Submission::CreateAddress => "create address",
            Submission::UpdateAddress => "update address",
            Submission::DeleteAddress => "delete address",
            Submission::StoreAiu => "AIU store",
            Submission::Resolve => "resolve",
            Submission::Feedback => "feedback",
            Submission::AavaVerify => "AAVA verification",
            Submission::AavaStatus => "AAVA status",
        }
    }
}

/// Tracks running submissions; a second one of the same kind fails with
/// [`Error::Busy`] until the first guard is dropped.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    running: Arc<Mutex<HashSet<Submission>>>,
}

#[must_use]
#[derive(Debug)]
pub struct InFlightGuard {
    running: Arc<Mutex<HashSet<Submission>>>,
    kind: Submission,
}

impl InFlight {
    pub fn begin(&self, kind: Submission) -> Result<InFlightGuard> {
        let mut running = self
            .running
            .lock()
            .map_err(|_| Error::Busy(kind.name().to_string()))?;
        if !running.insert(kind) {
            return Err(Error::Busy(kind.name().to_string()));
        }
        Ok(InFlightGuard {
            running: self.running.clone(),
            kind,
        })
    }

    pub fn is_running(&self, kind: Submission) -> bool {
        self.running
            .lock()
            .map(|r| r.contains(&kind))
            .unwrap_or(false)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if let Ok(mut running) = self.running.lock() {
            running.remove(&self.kind);
        }
    }
}
