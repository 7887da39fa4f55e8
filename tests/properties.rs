use proptest::prelude::*;
use rclc_engine::eval::eval_str;
use rclc_engine::radix::convert;
use rclc_engine::{Context, Mode, NumberSystem};

const MAX_EXPR_BYTES: usize = 64;

fn programming(text: &str, ns: NumberSystem) -> String {
    match eval_str(text, Context::new(Mode::Programming, ns)) {
        Ok(v) => v.format(ns, 10),
        Err(e) => format!("{:?}", e),
    }
}

proptest! {
    #[test]
    fn decimal_hex_decimal_round_trips(n in any::<i128>()) {
        let hex = convert(&n.to_string(), 10, 16).unwrap();
        prop_assert_eq!(convert(&hex, 16, 10).unwrap(), n.to_string());
    }

    #[test]
    fn binary_and_octal_round_trip(n in any::<i64>()) {
        for base in [2u32, 8].iter() {
            let s = convert(&n.to_string(), 10, *base).unwrap();
            prop_assert_eq!(convert(&s, *base, 10).unwrap(), n.to_string());
        }
    }

    #[test]
    fn hex_output_matches_std_formatting(n in any::<u64>()) {
        prop_assert_eq!(convert(&n.to_string(), 10, 16).unwrap(), format!("{:X}", n));
    }

    #[test]
    fn programming_arithmetic_wraps_at_32_bits(a in any::<i32>(), b in any::<i32>()) {
        let dec = NumberSystem::Decimal;
        prop_assert_eq!(programming(&format!("({}) + ({})", a, b), dec), a.wrapping_add(b).to_string());
        prop_assert_eq!(programming(&format!("({}) - ({})", a, b), dec), a.wrapping_sub(b).to_string());
        prop_assert_eq!(programming(&format!("({}) * ({})", a, b), dec), a.wrapping_mul(b).to_string());
        prop_assert_eq!(programming(&format!("({}) XOR ({})", a, b), dec), (a ^ b).to_string());
    }

    #[test]
    fn programming_hex_shows_the_bit_pattern(a in any::<u32>(), b in any::<u32>()) {
        let got = programming(&format!("{:X} AND {:X}", a, b), NumberSystem::Hexadecimal);
        let mut want = format!("{:X}", a & b);
        if want.len() % 2 == 1 {
            want.insert(0, '0');
        }
        prop_assert_eq!(got, want);
    }

    #[test]
    fn evaluation_never_panics(
        bytes in proptest::collection::vec(any::<u8>(), 0..=MAX_EXPR_BYTES)
    ) {
        let input = String::from_utf8_lossy(&bytes).into_owned();
        for mode in [Mode::Basic, Mode::Scientific, Mode::Financial, Mode::Programming].iter() {
            let _ = eval_str(&input, Context::new(*mode, NumberSystem::Decimal));
            let _ = eval_str(&input, Context::new(*mode, NumberSystem::Hexadecimal));
        }
    }
}
