use serde::{Deserialize, Serialize};

pub const PLACEHOLDER_MSISDN: &str = "254700000000";

const COUNTRY_CODE: &str = "254";
const LOCAL_NUMBER_LEN: usize = 9;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingDetails {
    pub email: String,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
}

impl BillingDetails {
    // Guest checkout is supported, so every field has a placeholder default.
    pub fn from_parts(
        email: Option<String>,
        phone: Option<String>,
        first_name: Option<String>,
        last_name: Option<String>,
        address: Option<String>,
    ) -> Self {
        Self {
            email: email.unwrap_or_else(|| "guest@example.com".to_string()),
            phone: normalize_msisdn(phone.as_deref().unwrap_or("")),
            first_name: first_name.unwrap_or_else(|| "Guest".to_string()),
            last_name: last_name.unwrap_or_else(|| "Customer".to_string()),
            address: address.unwrap_or_else(|| "Nairobi".to_string()),
        }
    }
}

pub fn normalize_msisdn(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return PLACEHOLDER_MSISDN.to_string();
    }
    if let Some(rest) = digits.strip_prefix('0') {
        return format!("{COUNTRY_CODE}{rest}");
    }
    if digits.starts_with(COUNTRY_CODE) {
        return digits;
    }
    if digits.len() == LOCAL_NUMBER_LEN {
        return format!("{COUNTRY_CODE}{digits}");
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_zero_becomes_country_code() {
        assert_eq!(normalize_msisdn("0712345678"), "254712345678");
    }

    #[test]
    fn bare_local_number_gets_country_code() {
        assert_eq!(normalize_msisdn("712345678"), "254712345678");
    }

    #[test]
    fn already_international_unchanged() {
        assert_eq!(normalize_msisdn("254712345678"), "254712345678");
        assert_eq!(normalize_msisdn("+254 712 345 678"), "254712345678");
    }

    #[test]
    fn empty_falls_back_to_placeholder() {
        assert_eq!(normalize_msisdn(""), PLACEHOLDER_MSISDN);
        assert_eq!(normalize_msisdn("n/a"), PLACEHOLDER_MSISDN);
    }

    #[test]
    fn guest_defaults_fill_every_field() {
        let billing = BillingDetails::from_parts(None, None, None, None, None);
        assert_eq!(billing.phone, PLACEHOLDER_MSISDN);
        assert_eq!(billing.email, "guest@example.com");
        assert_eq!(billing.first_name, "Guest");
    }
}
