use crate::error::DappError;
use ethers::types::{Address, H256, U256};

/// Parse a transfer amount typed by the user.
///
/// Amounts are whole token units, the way the form collects them: a
/// non-negative base-10 integer. Fractions are rejected rather than rounded.
pub fn parse_token_amount(input: &str) -> Result<U256, DappError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DappError::InvalidInput("Amount cannot be empty".to_string()));
    }
    if !trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Err(DappError::InvalidInput(format!(
            "Amount must be a whole number of tokens, got '{}'",
            trimmed
        )));
    }
    U256::from_dec_str(trimmed)
        .map_err(|e| DappError::InvalidInput(format!("Invalid amount '{}': {}", trimmed, e)))
}

/// Parse a recipient address (`0x` + 40 hex digits).
pub fn parse_recipient(input: &str) -> Result<Address, DappError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DappError::InvalidInput("Recipient cannot be empty".to_string()));
    }
    trimmed.parse::<Address>().map_err(|_| {
        DappError::InvalidInput(format!(
            "Invalid recipient address '{}'",
            trimmed
        ))
    })
}

/// Cut a message to at most `max` characters (not bytes).
pub fn truncate_chars(message: &str, max: usize) -> &str {
    match message.char_indices().nth(max) {
        Some((idx, _)) => &message[..idx],
        None => message,
    }
}

/// Full lower-case hex form with the `0x` prefix.
pub fn format_address(address: &Address) -> String {
    format!("{:#x}", address)
}

/// `0x1234…abcd` for tight spaces.
pub fn short_address(address: &Address) -> String {
    let full = format_address(address);
    format!("{}…{}", &full[..6], &full[full.len() - 4..])
}

pub fn format_hash(hash: &H256) -> String {
    format!("{:#x}", hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== parse_token_amount tests ====================

    #[test]
    fn test_parse_token_amount_integer() {
        assert_eq!(parse_token_amount("5").unwrap(), U256::from(5u64));
        assert_eq!(parse_token_amount("  100 ").unwrap(), U256::from(100u64));
    }

    #[test]
    fn test_parse_token_amount_zero_is_allowed() {
        assert_eq!(parse_token_amount("0").unwrap(), U256::zero());
    }

    #[test]
    fn test_parse_token_amount_large_value() {
        let amount = parse_token_amount("1000000000000000000000000").unwrap();
        assert_eq!(amount, U256::exp10(24));
    }

    #[test]
    fn test_parse_token_amount_empty_fails() {
        let err = parse_token_amount("   ").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_parse_token_amount_rejects_fractions_and_signs() {
        assert!(parse_token_amount("1.5").is_err());
        assert!(parse_token_amount("-1").is_err());
        assert!(parse_token_amount("abc").is_err());
    }

    // ==================== parse_recipient tests ====================

    #[test]
    fn test_parse_recipient_valid() {
        let addr = parse_recipient("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap();
        assert_eq!(
            format_address(&addr),
            "0x70997970c51812dc3a010c7d01b50e0d17dc79c8"
        );
    }

    #[test]
    fn test_parse_recipient_invalid() {
        let err = parse_recipient("0xabc").unwrap_err();
        assert!(matches!(err, DappError::InvalidInput(_)));
        assert!(err.to_string().contains("Invalid recipient address"));
    }

    // ==================== truncate_chars tests ====================

    #[test]
    fn test_truncate_chars_short_message_untouched() {
        assert_eq!(truncate_chars("Transaction failed", 100), "Transaction failed");
    }

    #[test]
    fn test_truncate_chars_cuts_at_limit() {
        let long = "x".repeat(150);
        assert_eq!(truncate_chars(&long, 100).len(), 100);
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        let msg = "é".repeat(120);
        let cut = truncate_chars(&msg, 100);
        assert_eq!(cut.chars().count(), 100);
    }

    #[test]
    fn test_short_address() {
        let addr = parse_recipient("0x70997970C51812dc3A010C7d01b50e0d17dc79C8").unwrap();
        assert_eq!(short_address(&addr), "0x7099…79c8");
    }
}
