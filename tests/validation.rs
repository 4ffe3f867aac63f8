use sensations_api::dto::checkout::CheckoutRequest;
use sensations_api::validate::{person_name, phone_number};
use validator::Validate;

fn valid_request() -> CheckoutRequest {
    CheckoutRequest {
        first_name: "Jean".into(),
        last_name: "Mbadinga".into(),
        email: "jean.mbadinga@example.com".into(),
        phone: "+33612345678".into(),
        address: "12 Rue des Fleurs, Libreville".into(),
    }
}

#[test]
fn valid_checkout_form_passes() {
    assert!(valid_request().validate().is_ok());
}

#[test]
fn every_invalid_field_is_reported_together() {
    let request = CheckoutRequest {
        first_name: "J".into(),
        last_name: "Mb4dinga".into(),
        email: "not-an-email".into(),
        phone: "hello".into(),
        address: "short".into(),
    };

    let errors = request.validate().unwrap_err();
    let fields = errors.field_errors();
    assert!(fields.contains_key("first_name"));
    assert!(fields.contains_key("last_name"));
    assert!(fields.contains_key("email"));
    assert!(fields.contains_key("phone"));
    assert!(fields.contains_key("address"));
    assert_eq!(fields.len(), 5);
}

#[test]
fn one_bad_field_does_not_hide_the_others() {
    let mut request = valid_request();
    request.phone = "123".into();
    request.address = "close".into();

    let errors = request.validate().unwrap_err();
    let fields = errors.field_errors();
    assert!(fields.contains_key("phone"));
    assert!(fields.contains_key("address"));
    assert!(!fields.contains_key("first_name"));
}

#[test]
fn person_name_allows_accents_hyphens_apostrophes() {
    assert!(person_name("Aïcha N'Guema").is_ok());
    assert!(person_name("Marie-Thérèse").is_ok());
    assert!(person_name("Jean3").is_err());
    assert!(person_name("   ").is_err());
}

#[test]
fn phone_number_requires_a_parseable_number() {
    assert!(phone_number("+33612345678").is_ok());
    assert!(phone_number("0612345678").is_ok());
    assert!(phone_number("not a phone").is_err());
    assert!(phone_number("").is_err());
}
