//! Number subsystem conformance tests.
//!
//! Bit decoding, exact decimal expansion and strict literal parsing,
//! checked against reference values for well-known binary64 numbers.

use exact_json::number::{decode_float, exact_decimal, strict_parse_f64, ExactDecimal};
use exact_json::{Error, ErrorKind};
use proptest::prelude::*;
use test_case::test_case;

// ============================================================================
// Bit decoding
// ============================================================================

#[test_case(1.0, 0, 1023, 0x0 ; "one")]
#[test_case(1.0 + f64::EPSILON, 0, 1023, 0x1 ; "one plus epsilon")]
#[test_case(2.0, 0, 1024, 0x0 ; "two")]
#[test_case(-2.0, 1, 1024, 0x0 ; "minus two")]
#[test_case(1.0 / 3.0, 0, 1021, 0x5555555555555 ; "one third")]
#[test_case(std::f64::consts::PI, 0, 1024, 0x921fb54442d18 ; "pi")]
#[test_case(3.0, 0, 1024, 0x8000000000000 ; "three")]
#[test_case(4.0, 0, 1025, 0x0 ; "four")]
#[test_case(5.0, 0, 1025, 0x4000000000000 ; "five")]
#[test_case(6.0, 0, 1025, 0x8000000000000 ; "six")]
#[test_case(23.0, 0, 1027, 0x7000000000000 ; "twenty three")]
#[test_case(f64::from_bits(1), 0, 0, 0x1 ; "min subnormal")]
#[test_case(f64::from_bits(0x000f_ffff_ffff_ffff), 0, 0, 0xfffffffffffff ; "max subnormal")]
#[test_case(f64::MIN_POSITIVE, 0, 1, 0x0 ; "min positive normal")]
#[test_case(f64::MAX, 0, 2046, 0xfffffffffffff ; "max")]
#[test_case(0.0, 0, 0, 0x0 ; "zero")]
#[test_case(-0.0, 1, 0, 0x0 ; "negative zero")]
#[test_case(f64::INFINITY, 0, 2047, 0x0 ; "infinity")]
#[test_case(f64::NEG_INFINITY, 1, 2047, 0x0 ; "negative infinity")]
fn decode_known_values(value: f64, sign: u8, exponent: u16, mantissa: u64) {
    let decoded = decode_float(value).unwrap();
    assert_eq!(
        (decoded.sign, decoded.exponent, decoded.mantissa),
        (sign, exponent, mantissa)
    );
    assert_eq!(decoded.to_f64().to_bits(), value.to_bits());
}

#[test]
fn decode_rejects_nan() {
    assert_eq!(decode_float(f64::NAN).unwrap_err(), Error::NotANumber);
    assert_eq!(
        decode_float(-f64::NAN).unwrap_err().kind(),
        ErrorKind::InputType
    );
}

// ============================================================================
// Exact decimal expansion
// ============================================================================

#[test_case(0.5, "0.5" ; "half")]
#[test_case(-2.5, "-2.5" ; "minus two and a half")]
#[test_case(1e21, "1000000000000000000000" ; "no exponent notation")]
#[test_case(0.1, "0.1000000000000000055511151231257827021181583404541015625" ; "tenth")]
#[test_case(1.0 / 3.0, "0.333333333333333314829616256247390992939472198486328125" ; "one third")]
#[test_case(std::f64::consts::PI, "3.141592653589793115997963468544185161590576171875" ; "pi")]
#[test_case(1.0 + f64::EPSILON, "1.0000000000000002220446049250313080847263336181640625" ; "one plus epsilon")]
#[test_case(9007199254740993.0, "9007199254740992" ; "rounded above two to the 53")]
fn exact_expansion(value: f64, expected: &str) {
    assert_eq!(exact_decimal(value).unwrap().to_fixed(), expected);
}

#[test]
fn exact_expansion_of_extremes() {
    let max = exact_decimal(f64::MAX).unwrap().to_fixed();
    assert_eq!(max.len(), 309);
    assert!(max.starts_with("17976931348623157"));

    let min = exact_decimal(f64::from_bits(1)).unwrap();
    assert_eq!(min.significant_digits(), 751);
    let text = min.to_fixed();
    assert_eq!(text.len(), 1076);
    assert!(text.starts_with("0.000000000000000000000000000000000000000000000000000"));
    assert!(text.contains("49406564584124654417656879286822137236505980"));
}

#[test]
fn exact_expansion_of_zeros() {
    let negative = exact_decimal(-0.0).unwrap();
    assert!(negative.is_zero());
    assert!(negative.is_negative());
    assert_eq!(negative.to_fixed(), "0");
    assert!(!exact_decimal(0.0).unwrap().is_negative());
}

#[test_case(f64::NAN ; "nan")]
#[test_case(f64::INFINITY ; "infinity")]
#[test_case(f64::NEG_INFINITY ; "negative infinity")]
fn exact_expansion_rejects_non_finite(value: f64) {
    assert_eq!(exact_decimal(value).unwrap_err().kind(), ErrorKind::InputType);
}

// ============================================================================
// Strict literal parsing
// ============================================================================

#[test]
fn strict_parse_error_kinds() {
    assert_eq!(
        strict_parse_f64("0.1").unwrap_err().kind(),
        ErrorKind::PrecisionLoss
    );
    assert_eq!(
        strict_parse_f64("2e308").unwrap_err(),
        Error::NumberOutOfRange {
            literal: "2e308".to_string()
        }
    );
    assert_eq!(
        strict_parse_f64("0x10").unwrap_err().kind(),
        ErrorKind::Grammar
    );
}

#[test]
fn strict_parse_keeps_sign_of_zero() {
    assert_eq!(strict_parse_f64("-0").unwrap().to_bits(), (-0.0f64).to_bits());
    assert_eq!(strict_parse_f64("0e-999999").unwrap().to_bits(), 0);
}

#[test]
fn decimal_parse_normalizes() {
    let a: ExactDecimal = "1.50e1".parse().unwrap();
    let b: ExactDecimal = "15".parse().unwrap();
    assert_eq!(a, b);
    assert_eq!(a.to_fixed(), "15");
}

proptest! {
    #[test]
    fn expansion_parses_back_exactly(bits in any::<u64>()) {
        let value = f64::from_bits(bits);
        prop_assume!(value.is_finite());

        let text = exact_decimal(value).unwrap().to_fixed();
        let parsed = strict_parse_f64(&text).unwrap();
        if value == 0.0 {
            // The expansion of -0 is "0"; only the encoder writes "-0".
            prop_assert_eq!(parsed, 0.0);
        } else {
            prop_assert_eq!(parsed.to_bits(), bits);
        }
    }

    #[test]
    fn shortest_repr_is_exact_only_when_expansion_matches(value in any::<f64>()) {
        prop_assume!(value.is_finite() && value != 0.0);

        let shortest = format!("{:e}", value);
        let exact = exact_decimal(value).unwrap();
        let shortest_decimal: ExactDecimal = shortest.parse().unwrap();
        let accepted = strict_parse_f64(&shortest).is_ok();
        prop_assert_eq!(accepted, shortest_decimal == exact);
    }
}
