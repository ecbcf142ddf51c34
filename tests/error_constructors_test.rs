use renewable_charge::error::ChargeError;

#[test]
fn error_constructors_group_1() {
    assert!(matches!(
        ChargeError::config("x"),
        ChargeError::Config { .. }
    ));
    assert!(matches!(
        ChargeError::validation("f", "m"),
        ChargeError::Validation { .. }
    ));
    assert!(matches!(ChargeError::io("x"), ChargeError::Io { .. }));
}

#[test]
fn error_constructors_group_2() {
    let ser = ChargeError::Serialization {
        message: "s".into(),
    };
    assert!(matches!(ser, ChargeError::Serialization { .. }));
    assert!(matches!(
        ChargeError::missing_owner("zoe"),
        ChargeError::MissingOwner { .. }
    ));
    assert!(matches!(
        ChargeError::feedback("x"),
        ChargeError::Feedback { .. }
    ));
}

#[test]
fn conversions() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(ChargeError::from(io), ChargeError::Io { .. }));

    let json = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    assert!(matches!(
        ChargeError::from(json),
        ChargeError::Serialization { .. }
    ));
}

#[test]
fn display_messages() {
    let e = ChargeError::validation("field", "bad");
    let s = format!("{}", e);
    assert!(s.contains("Validation error"));

    let e = ChargeError::feedback("strip offline");
    assert_eq!(e.to_string(), "Feedback error: strip offline");
}
