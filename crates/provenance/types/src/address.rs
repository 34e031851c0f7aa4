//! Account address helpers.
//!
//! Addresses are compared as 20-byte values, so `0xAbC...` and `0xabc...`
//! name the same account. Textual case only matters for display.

use alloy_primitives::Address;

use crate::error::ParseError;

/// Reserved "no prior owner" address used by mint transfers.
pub const BURN_ADDRESS: Address = Address::ZERO;

/// Parse a `0x`-prefixed, 40 hex digit address in any letter case.
pub fn parse_address(input: &str) -> Result<Address, ParseError> {
    let trimmed = input.trim();
    let valid = trimmed.len() == 42
        && trimmed.starts_with("0x")
        && trimmed[2..].bytes().all(|b| b.is_ascii_hexdigit());
    if !valid {
        return Err(ParseError::InvalidAddress(input.to_string()));
    }
    trimmed
        .parse::<Address>()
        .map_err(|_| ParseError::InvalidAddress(input.to_string()))
}

pub fn is_burn(address: &Address) -> bool {
    *address == BURN_ADDRESS
}

/// Shorten an address for display, e.g. `0x1234...5678`.
pub fn shorten_address(address: &Address, chars: usize) -> String {
    let full = alloy_primitives::hex::encode_prefixed(address.as_slice());
    let chars = chars.min(20);
    format!("{}...{}", &full[..chars + 2], &full[full.len() - chars..])
}
