//! Types for authentication and user management

use serde::{Deserialize, Serialize};

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_name: String,
    pub email_id: String,
    pub password: String,
    pub phone_number: String,
}

/// Login with either an email or a phone number
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub password: String,
}

impl LoginRequest {
    pub fn with_email(email: &str, password: &str) -> Self {
        Self {
            email: Some(email.to_string()),
            phone: None,
            password: password.to_string(),
        }
    }

    pub fn with_phone(phone: &str, password: &str) -> Self {
        Self {
            email: None,
            phone: Some(phone.to_string()),
            password: password.to_string(),
        }
    }
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Password reset authorised by Aadhaar details
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email_or_phone: String,
    pub aadhaar_number: String,
    pub date_of_birth: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AadhaarVerificationRequest {
    pub aadhaar_number: String,
    pub date_of_birth: String,
}

/// Profile of the logged in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(alias = "userName")]
    pub username: String,
    #[serde(default, alias = "emailId")]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub aadhaar_verified: bool,
}
