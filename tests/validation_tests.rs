use fx_rate_bot::utils::Validator;

#[test]
fn test_validate_pair() {
    // Valid pairs, normalized to uppercase
    assert_eq!(
        Validator::validate_pair("usd/ngn").unwrap().to_string(),
        "USD/NGN"
    );
    assert_eq!(
        Validator::validate_pair(" GBP/ngn ").unwrap().to_string(),
        "GBP/NGN"
    );

    // Invalid pairs
    assert!(Validator::validate_pair("").is_err());
    assert!(Validator::validate_pair("USDNGN").is_err());
    assert!(Validator::validate_pair("US/NGN").is_err());
    assert!(Validator::validate_pair("USD/N1N").is_err());
    assert!(Validator::validate_pair("USD/NGN/EUR").is_err());
    assert!(Validator::validate_pair("USD NGN").is_err());
}

#[test]
fn test_validate_threshold() {
    // Valid thresholds
    assert_eq!(Validator::validate_threshold("850").unwrap(), 850.0);
    assert_eq!(Validator::validate_threshold("0.5").unwrap(), 0.5);
    assert_eq!(Validator::validate_threshold(" 1650.25 ").unwrap(), 1650.25);

    // Invalid thresholds
    assert!(Validator::validate_threshold("").is_err());
    assert!(Validator::validate_threshold("-5").is_err());
    assert!(Validator::validate_threshold("0").is_err());
    assert!(Validator::validate_threshold("eight hundred").is_err());
    assert!(Validator::validate_threshold("NaN").is_err());
    assert!(Validator::validate_threshold("inf").is_err());
}
