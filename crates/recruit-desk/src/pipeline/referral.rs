const NAME_PART_LEN: usize = 3;
const PHONE_PART_LEN: usize = 3;

/// Mint the referral code handed to a newly enrolled team member.
///
/// The code is the first three characters of the name with all whitespace removed,
/// upper-cased, followed by the last three characters of the phone number. Short inputs
/// produce short parts; nothing is padded and nothing besides whitespace is filtered.
/// Codes are not unique.
pub fn generate_referral_code(name: &str, phone: &str) -> String {
    let name_part: String = name
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .take(NAME_PART_LEN)
        .flat_map(char::to_uppercase)
        .collect();

    let phone_len = phone.chars().count();
    let phone_part: String = phone
        .chars()
        .skip(phone_len.saturating_sub(PHONE_PART_LEN))
        .collect();

    format!("{name_part}{phone_part}")
}

#[cfg(test)]
mod tests {
    use super::generate_referral_code;

    #[test]
    fn combines_name_prefix_and_phone_suffix() {
        assert_eq!(generate_referral_code("Ada Lovelace", "9876543210"), "ADA210");
    }

    #[test]
    fn short_inputs_are_not_padded() {
        assert_eq!(generate_referral_code("Al", "12"), "AL12");
        assert_eq!(generate_referral_code("", ""), "");
    }

    #[test]
    fn whitespace_inside_the_name_is_skipped() {
        assert_eq!(generate_referral_code("  J o\tn ", "+1 555 0100"), "JON100");
    }

    #[test]
    fn punctuation_passes_through() {
        assert_eq!(generate_referral_code("O'Neil", "555-12-3"), "O'N2-3");
    }

    #[test]
    fn counts_characters_rather_than_bytes() {
        assert_eq!(generate_referral_code("Émilie", "０１２３"), "ÉMI１２３");
    }
}
