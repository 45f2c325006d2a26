use rand::Rng;

/// Generates a 6-digit one-time passcode.
pub fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    rng.gen_range(100_000..=999_999).to_string()
}

/// Checks that a submitted code has the expected 6-digit shape.
pub fn is_valid_otp_format(otp: &str) -> bool {
    otp.len() == 6 && otp.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_otp_is_six_digits() {
        for _ in 0..100 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(is_valid_otp_format(&otp));
            let value: u32 = otp.parse().expect("numeric");
            assert!((100_000..=999_999).contains(&value));
        }
    }

    #[test]
    fn format_check_rejects_bad_codes() {
        assert!(!is_valid_otp_format(""));
        assert!(!is_valid_otp_format("12345"));
        assert!(!is_valid_otp_format("1234567"));
        assert!(!is_valid_otp_format("12a456"));
        assert!(!is_valid_otp_format("12 456"));
        assert!(is_valid_otp_format("000000"));
    }
}
