//! Property tests for generated Go text.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use funccover_gen::prelude::*;
use proptest::prelude::*;
use std::time::Duration;

proptest! {
    /// Quoted strings never contain raw line breaks or unescaped quotes.
    #[test]
    fn quote_stays_on_one_line(s in any::<String>()) {
        let quoted = quote(&s);
        prop_assert!(quoted.starts_with('"') && quoted.ends_with('"'));
        prop_assert!(!quoted.contains('\n'));
        let inner = &quoted[1..quoted.len() - 1];
        let mut escaped = false;
        for c in inner.chars() {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else {
                prop_assert_ne!(c, '"');
            }
        }
    }

    /// Inline counter statements never introduce a newline.
    #[test]
    fn counter_statements_are_single_line(id in "[0-9a-f]{12}", index in 0usize..100_000) {
        let table = table_symbol(&id).unwrap();
        let text = inline_stmt(&counter_stmt(&table, index));
        prop_assert!(!text.contains('\n'));
        let expected = format!("cover_{id}.Counts[{index}] = true; ");
        prop_assert_eq!(text, expected);
    }

    /// The declaration line count depends only on the hook, never on the
    /// number of recorded functions.
    #[test]
    fn declaration_shape_is_stable(n in 0usize..50, period_ms in 0u64..10_000) {
        let fragment = CoverDeclBuilder::new("cover_p")
            .unwrap()
            .output_file("cover.out")
            .period(Duration::from_millis(period_ms))
            .functions((0..n).map(|i| (format!("f{i}"), i as u32 + 1)))
            .build();
        let go = generate(&fragment);
        let expected_lines = if period_ms == 0 { 7 } else { 11 };
        prop_assert_eq!(go.lines().count(), expected_lines);
    }

    /// Durations render with a unit Go accepts and keep their value.
    #[test]
    fn go_duration_preserves_value(nanos in 1u64..u64::from(u32::MAX) * 1000) {
        let text = go_duration(Duration::from_nanos(nanos));
        let (digits, scale) = if let Some(d) = text.strip_suffix("ms") {
            (d, 1_000_000u128)
        } else if let Some(d) = text.strip_suffix("us") {
            (d, 1_000)
        } else if let Some(d) = text.strip_suffix("ns") {
            (d, 1)
        } else {
            (text.strip_suffix('s').unwrap(), 1_000_000_000)
        };
        prop_assert_eq!(digits.parse::<u128>().unwrap() * scale, u128::from(nanos));
    }
}

#[test]
fn fragment_serializes_for_debug_dumps() {
    let fragment = CoverDeclBuilder::new("cover_s").unwrap().function("main", 1).build();
    let json = serde_json::to_string(&fragment).unwrap();
    let back: GoFragment = serde_json::from_str(&json).unwrap();
    assert_eq!(back, fragment);
}
