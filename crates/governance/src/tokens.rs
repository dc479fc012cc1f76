//! Token symbol and decimal lookups against the organization's balances

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{DaoRecord, Proposal, Token, TokenBalance};
use crate::{ResolveError, ResolveResult};

/// Which token a lookup is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenField {
    Tribute,
    Payment,
}

/// Find a balance entry by token address, ignoring checksum casing
pub fn find_token<'a>(balances: &'a [TokenBalance], address: &str) -> Option<&'a TokenBalance> {
    balances
        .iter()
        .find(|b| b.token.token_address.eq_ignore_ascii_case(address))
}

/// The token entry behind a proposal's tribute or payment.
///
/// Payment lookups are skipped when no payment is requested.
pub fn token_for(proposal: &Proposal, field: TokenField) -> ResolveResult<&Token> {
    let address = match field {
        TokenField::Tribute => proposal.tribute_token.as_deref(),
        TokenField::Payment if proposal.payment_requested == 0 => None,
        TokenField::Payment => proposal.payment_token.as_deref(),
    };
    let address = address.ok_or_else(|| {
        ResolveError::LookupMiss(format!("{:?} token of proposal {}", field, proposal.proposal_id))
    })?;
    let dao = proposal.moloch.as_ref().ok_or(ResolveError::MissingMetadata)?;

    find_token(&dao.token_balances, address)
        .map(|balance| &balance.token)
        .ok_or_else(|| ResolveError::LookupMiss(address.to_string()))
}

pub fn token_symbol_for(proposal: &Proposal, field: TokenField) -> Option<String> {
    match token_for(proposal, field) {
        Ok(token) => token.symbol.clone(),
        Err(err) => {
            debug!("No symbol for proposal {}: {}", proposal.proposal_id, err);
            None
        }
    }
}

pub fn token_decimals_for(proposal: &Proposal, field: TokenField) -> Option<u32> {
    match token_for(proposal, field) {
        Ok(token) => token.decimals,
        Err(err) => {
            debug!("No decimals for proposal {}: {}", proposal.proposal_id, err);
            None
        }
    }
}

/// An entry in a tribute token picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenOption {
    pub label: String,
    pub address: String,
    pub decimals: Option<u32>,
    pub balance: u128,
}

impl From<&TokenBalance> for TokenOption {
    fn from(balance: &TokenBalance) -> Self {
        let label = match balance.token.symbol.as_deref() {
            Some(symbol) if !symbol.is_empty() => symbol.to_string(),
            _ => balance.token.token_address.clone(),
        };
        Self {
            label,
            address: balance.token.token_address.clone(),
            decimals: balance.token.decimals,
            balance: balance.token_balance,
        }
    }
}

/// Tokens a tribute may be offered in: the deposit token first, then every
/// other treasury token.
pub fn tribute_token_options(dao: &DaoRecord) -> Vec<TokenOption> {
    let deposit_address = dao.deposit_token.as_ref().map(|t| t.token_address.as_str());

    let mut options = Vec::with_capacity(dao.token_balances.len());
    if let Some(deposit) = deposit_address.and_then(|a| find_token(&dao.token_balances, a)) {
        options.push(TokenOption::from(deposit));
    }

    options.extend(
        dao.token_balances
            .iter()
            .filter(|b| b.guild_bank)
            .filter(|b| {
                deposit_address.map_or(true, |d| !b.token.token_address.eq_ignore_ascii_case(d))
            })
            .map(TokenOption::from),
    );
    options
}

/// Convert a human-entered amount such as `"12.5"` into base units
pub fn to_base_units(amount: &str, decimals: u32) -> ResolveResult<u128> {
    let invalid = || ResolveError::InvalidAmount(amount.to_string());
    let amount_trimmed = amount.trim();

    let (whole, fraction) = match amount_trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (amount_trimmed, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().chain(fraction.chars()).all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if fraction.len() > decimals as usize {
        return Err(invalid());
    }

    let scale = 10u128.checked_pow(decimals).ok_or_else(invalid)?;
    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u128>().map_err(|_| invalid())?
    };

    let fraction_units = if fraction.is_empty() {
        0
    } else {
        let padding = 10u128
            .checked_pow(decimals - fraction.len() as u32)
            .ok_or_else(invalid)?;
        fraction.parse::<u128>().map_err(|_| invalid())? * padding
    };

    whole_units
        .checked_mul(scale)
        .and_then(|units| units.checked_add(fraction_units))
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(address: &str, symbol: &str, decimals: u32, guild_bank: bool) -> TokenBalance {
        TokenBalance {
            token: Token {
                token_address: address.to_string(),
                symbol: Some(symbol.to_string()),
                decimals: Some(decimals),
            },
            guild_bank,
            token_balance: 1_000,
        }
    }

    fn dao() -> DaoRecord {
        DaoRecord {
            id: "0xdao".into(),
            deposit_token: Some(Token {
                token_address: "0xWETH".into(),
                ..Default::default()
            }),
            token_balances: vec![
                balance("0xdai", "DAI", 18, true),
                balance("0xweth", "WETH", 18, true),
                balance("0xusdc", "USDC", 6, false),
                balance("0xrare", "", 0, true),
            ],
            ..Default::default()
        }
    }

    fn proposal() -> Proposal {
        Proposal {
            proposal_id: "4".into(),
            tribute_token: Some("0xWeth".into()),
            tribute_offered: 10,
            payment_token: Some("0xusdc".into()),
            payment_requested: 500,
            moloch: Some(dao()),
            ..Default::default()
        }
    }

    #[test]
    fn test_lookup_ignores_case() {
        let p = proposal();
        assert_eq!(token_symbol_for(&p, TokenField::Tribute), Some("WETH".to_string()));
        assert_eq!(token_decimals_for(&p, TokenField::Tribute), Some(18));
        assert_eq!(token_symbol_for(&p, TokenField::Payment), Some("USDC".to_string()));
        assert_eq!(token_decimals_for(&p, TokenField::Payment), Some(6));
    }

    #[test]
    fn test_zero_payment_skips_lookup() {
        let mut p = proposal();
        p.payment_requested = 0;
        assert_eq!(token_symbol_for(&p, TokenField::Payment), None);
        assert_eq!(token_decimals_for(&p, TokenField::Payment), None);
        assert!(matches!(token_for(&p, TokenField::Payment), Err(ResolveError::LookupMiss(_))));
    }

    #[test]
    fn test_misses_yield_none() {
        let mut p = proposal();
        p.tribute_token = Some("0xnothere".into());
        assert_eq!(token_symbol_for(&p, TokenField::Tribute), None);

        p.moloch = None;
        assert_eq!(
            token_for(&p, TokenField::Payment).unwrap_err(),
            ResolveError::MissingMetadata
        );
    }

    #[test]
    fn test_tribute_options_order() {
        let options = tribute_token_options(&dao());
        let labels: Vec<&str> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["WETH", "DAI", "0xrare"]);
    }

    #[test]
    fn test_base_units() {
        assert_eq!(to_base_units("12.5", 18).unwrap(), 12_500_000_000_000_000_000);
        assert_eq!(to_base_units("3", 6).unwrap(), 3_000_000);
        assert_eq!(to_base_units(".25", 2).unwrap(), 25);
        assert_eq!(to_base_units("7", 0).unwrap(), 7);
        assert!(to_base_units("1.234", 2).is_err());
        assert!(to_base_units("1,5", 18).is_err());
        assert!(to_base_units("", 18).is_err());
        assert!(to_base_units("-1", 18).is_err());
        assert!(to_base_units("1", 60).is_err());
    }
}
