//! Input checks that must pass before a request is sent.

use crate::error::{Error, Result};

/// `true` when `value` is exactly `len` ASCII digits.
pub fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

pub fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_input(format!("{} is required", field)));
    }
    Ok(())
}

/// 6-digit consent PIN (uniPin / DaPin / upiPin).
pub fn pin(value: &str) -> Result<()> {
    if !is_digits(value, 6) {
        return Err(Error::invalid_input("DaPin must be 6 digits"));
    }
    Ok(())
}

pub fn pincode(value: &str) -> Result<()> {
    if !is_digits(value.trim(), 6) {
        return Err(Error::invalid_input("Pincode must be 6 digits"));
    }
    Ok(())
}

pub fn phone_number(value: &str) -> Result<()> {
    if !is_digits(value, 10) {
        return Err(Error::invalid_input("Mobile number should be 10 digits"));
    }
    Ok(())
}

/// Loose `local@domain.tld` shape.
pub fn email(value: &str) -> Result<()> {
    let ok = value.split_once('@').map_or(false, |(local, domain)| {
        !local.is_empty()
            && !value.contains(char::is_whitespace)
            && domain.matches('@').count() == 0
            && domain
                .split_once('.')
                .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty())
    });
    if !ok {
        return Err(Error::invalid_input("Invalid email format"));
    }
    Ok(())
}

/// Strips spaces from an Aadhaar number and checks it is 12 digits.
pub fn aadhaar(value: &str) -> Result<String> {
    let cleaned: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if !is_digits(&cleaned, 12) {
        return Err(Error::invalid_input("Aadhaar number must be 12 digits"));
    }
    Ok(cleaned)
}

/// A digital address is `user@suffix` with both parts non-empty.
pub fn digital_address(value: &str) -> Result<()> {
    let value = value.trim();
    match value.split_once('@') {
        Some((user, suffix))
            if !user.is_empty() && !suffix.is_empty() && !suffix.contains('@') =>
        {
            Ok(())
        }
        _ => Err(Error::invalid_input(
            "Digital address must look like user@suffix",
        )),
    }
}
