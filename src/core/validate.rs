//! NHS number validation
//!
//! NHS numbers are ten digits with a modulus 11 check digit. Validation is
//! advisory on the send path: a failing number is logged, not rejected,
//! because the upstream registry is the authority on identity.

/// Check an NHS number against its modulus 11 check digit.
///
/// Returns false for anything that is not exactly ten ASCII digits, and for
/// numbers whose computed check digit is 10 (never issued).
pub fn is_valid_nhs_number(candidate: &str) -> bool {
    if candidate.len() != 10 || !candidate.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }

    let digits: Vec<u32> = candidate
        .bytes()
        .map(|b| u32::from(b - b'0'))
        .collect();

    let weighted_sum: u32 = digits[..9]
        .iter()
        .enumerate()
        .map(|(i, d)| d * (10 - i as u32))
        .sum();

    let check = match 11 - (weighted_sum % 11) {
        11 => 0,
        10 => return false,
        n => n,
    };

    check == digits[9]
}
