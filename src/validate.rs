use validator::ValidationError;

/// Letters (including accented), spaces, hyphens and apostrophes only.
/// Length bounds are handled by `length` rules on the request structs.
pub fn person_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("name_required"));
    }
    let valid = value
        .chars()
        .all(|c| c.is_alphabetic() || c == ' ' || c == '-' || c == '\'');
    if !valid {
        return Err(ValidationError::new("name_charset"));
    }
    Ok(())
}

/// Accepts anything the phone parser recognizes as a real number.
/// Numbers without a country prefix are parsed against the shop's
/// default region, as the storefront serves a single market.
pub fn phone_number(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("phone_required"));
    }
    match phonenumber::parse(Some(phonenumber::country::Id::FR), value) {
        Ok(parsed) if phonenumber::is_valid(&parsed) => Ok(()),
        _ => Err(ValidationError::new("phone_invalid")),
    }
}
