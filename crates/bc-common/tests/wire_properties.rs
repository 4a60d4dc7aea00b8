//! Property tests for the formatted-error wire format.
//!
//! - Any status/code/payload assembled with `format_wire` parses back exactly
//! - Status and code survive payloads that contain the separator

use bc_common::{format_wire, parse_wire, BusinessCode};
use proptest::prelude::*;

fn separator() -> impl Strategy<Value = char> {
    prop::sample::select(vec!['#', '|', '!', '~', '$'])
}

proptest! {
    #[test]
    fn status_and_code_survive_roundtrip(
        sep in separator(),
        status in 100u16..600,
        package_crc in any::<u8>(),
        function_crc in any::<u8>(),
        line in 0u32..5000,
        payload in ".*",
    ) {
        let code = BusinessCode::from_parts(package_crc, function_crc, line);
        let wire = format_wire(sep, status, &code, &payload);
        let parsed = parse_wire(&wire, sep).unwrap();
        prop_assert_eq!(parsed.status, status);
        prop_assert_eq!(parsed.code, code);
        prop_assert_eq!(parsed.payload, payload);
    }

    #[test]
    fn nested_formatting_keeps_outer_header(
        outer in 100u16..600,
        inner in 100u16..600,
        message in "[a-z ]{0,40}",
    ) {
        let inner_code = BusinessCode::from_parts(1, 2, 3);
        let outer_code = BusinessCode::from_parts(4, 5, 6);
        let inner_wire = format_wire('#', inner, &inner_code, &message);
        let outer_wire = format_wire('#', outer, &outer_code, &inner_wire);

        let parsed = parse_wire(&outer_wire, '#').unwrap();
        prop_assert_eq!(parsed.status, outer);
        prop_assert_eq!(&parsed.code, &outer_code);

        let nested = parse_wire(&parsed.payload, '#').unwrap();
        prop_assert_eq!(nested.status, inner);
        prop_assert_eq!(nested.code, inner_code);
        prop_assert_eq!(nested.payload, message);
    }
}
