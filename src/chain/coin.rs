//! Gas price and coin helpers

use std::fmt;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::chain::proto::Coin;
use crate::error::{Result, WalletError};

/// A decimal amount of a single denom, e.g. `0.01udaric`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GasPrice {
    pub amount: Decimal,
    pub denom: String,
}

impl GasPrice {
    /// Fee owed for `gas` units, truncated toward zero.
    ///
    /// A zero fee produces an empty coin set, the same way the chain drops
    /// zero-amount coins from a fee.
    pub fn fee_for(&self, gas: u64) -> Result<Vec<Coin>> {
        let total = self
            .amount
            .checked_mul(Decimal::from(gas))
            .ok_or_else(|| WalletError::Validation(format!("fee overflow for {} gas", gas)))?
            .trunc();

        let amount = total
            .to_u128()
            .ok_or_else(|| WalletError::Validation(format!("invalid fee amount {}", total)))?;

        if amount == 0 {
            return Ok(vec![]);
        }

        Ok(vec![Coin {
            denom: self.denom.clone(),
            amount: amount.to_string(),
        }])
    }
}

impl FromStr for GasPrice {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self> {
        let (amount, denom) = split_amount_denom(s)
            .map_err(|e| WalletError::Config(format!("error while parsing gas price: {}", e)))?;

        let amount = Decimal::from_str(amount).map_err(|e| {
            WalletError::Config(format!("error while parsing gas price {}: {}", s, e))
        })?;

        Ok(Self {
            amount,
            denom: denom.to_string(),
        })
    }
}

impl fmt::Display for GasPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Parse a comma separated list of integer coins, e.g. `2000udaric,10uatom`
pub fn parse_coins(s: &str) -> Result<Vec<Coin>> {
    let mut coins = Vec::new();

    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (amount, denom) = split_amount_denom(part).map_err(WalletError::Validation)?;
        if amount.contains('.') {
            return Err(WalletError::Validation(format!(
                "coin amount must be an integer: {}",
                part
            )));
        }

        let amount: u128 = amount
            .parse()
            .map_err(|e| WalletError::Validation(format!("invalid coin amount {}: {}", part, e)))?;

        coins.push(Coin {
            denom: denom.to_string(),
            amount: amount.to_string(),
        });
    }

    Ok(coins)
}

/// Render coins the way the chain prints them: `2000udaric,10uatom`
/// `ceil(gas_used * adjustment)` in decimal arithmetic
pub fn adjust_gas(gas_used: u64, adjustment: f64) -> Result<u64> {
    // Shortest decimal form of the float, so 2.2 stays 2.2
    let factor = Decimal::from_str(&adjustment.to_string())
        .map_err(|e| WalletError::Config(format!("invalid gas adjustment {}: {}", adjustment, e)))?;

    Decimal::from(gas_used)
        .checked_mul(factor)
        .map(|gas| gas.ceil())
        .and_then(|gas| gas.to_u64())
        .ok_or_else(|| {
            WalletError::Simulation(format!("adjusted gas overflows: {} x {}", gas_used, adjustment))
        })
}

pub fn format_coins(coins: &[Coin]) -> String {
    coins
        .iter()
        .map(|c| format!("{}{}", c.amount, c.denom))
        .collect::<Vec<_>>()
        .join(",")
}

/// Split `<amount><denom>` where the amount is digits with an optional dot.
fn split_amount_denom(s: &str) -> std::result::Result<(&str, &str), String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty coin string".to_string());
    }

    let split_pos = s
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .ok_or_else(|| format!("missing denom in {}", s))?;

    let (amount, denom) = s.split_at(split_pos);
    let denom = denom.trim();

    if amount.is_empty() {
        return Err(format!("missing amount in {}", s));
    }
    validate_denom(denom)?;

    Ok((amount, denom))
}

/// Denoms are 3 to 128 characters, start with a letter and may contain
/// letters, digits and `/:._-`
fn validate_denom(denom: &str) -> std::result::Result<(), String> {
    let mut chars = denom.chars();
    let first_ok = chars.next().map(|c| c.is_ascii_alphabetic()).unwrap_or(false);
    let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));

    if !first_ok || !rest_ok || denom.len() < 3 || denom.len() > 128 {
        return Err(format!("invalid denom: {}", denom));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gas_price_parsing() {
        let price: GasPrice = "0.01udaric".parse().unwrap();
        assert_eq!(price.denom, "udaric");
        assert_eq!(price.amount, Decimal::from_str("0.01").unwrap());
        assert_eq!(price.to_string(), "0.01udaric");

        let price: GasPrice = "25uatom".parse().unwrap();
        assert_eq!(price.amount, Decimal::from(25));
    }

    #[test]
    fn test_invalid_gas_prices() {
        for input in ["", "udaric", "0.01", "-1udaric", "0.01u", "1..2udaric", "0.011"] {
            let err = input.parse::<GasPrice>().unwrap_err();
            assert!(
                matches!(err, WalletError::Config(_)),
                "{:?} should be a config error, got {:?}",
                input,
                err
            );
        }
    }

    #[test]
    fn test_fee_truncates() {
        let price: GasPrice = "0.01udaric".parse().unwrap();

        let fee = price.fee_for(200_000).unwrap();
        assert_eq!(fee, vec![Coin { denom: "udaric".to_string(), amount: "2000".to_string() }]);

        // 0.01 * 199_999 = 1999.99, never rounded up
        let fee = price.fee_for(199_999).unwrap();
        assert_eq!(fee[0].amount, "1999");
        assert_eq!(fee[0].denom, "udaric");
    }

    #[test]
    fn test_zero_fee_is_empty() {
        let price: GasPrice = "0.01udaric".parse().unwrap();
        assert!(price.fee_for(0).unwrap().is_empty());
        assert!(price.fee_for(99).unwrap().is_empty());
        assert_eq!(price.fee_for(100).unwrap()[0].amount, "1");
    }

    #[test]
    fn test_adjust_gas() {
        assert_eq!(adjust_gas(80_000, 1.5).unwrap(), 120_000);
        assert_eq!(adjust_gas(70_001, 1.5).unwrap(), 105_002);
        // 50 * 2.2 is 110.00000000000001 in f64
        assert_eq!(adjust_gas(50, 2.2).unwrap(), 110);
        assert_eq!(adjust_gas(0, 1.5).unwrap(), 0);

        assert!(matches!(adjust_gas(1, f64::INFINITY), Err(WalletError::Config(_))));
        assert!(adjust_gas(u64::MAX, 1.5).unwrap_err().is_simulation());
    }

    #[test]
    fn test_parse_coins() {
        let coins = parse_coins("2000udaric, 10uatom").unwrap();
        assert_eq!(coins.len(), 2);
        assert_eq!(coins[0].amount, "2000");
        assert_eq!(coins[1].denom, "uatom");
        assert_eq!(format_coins(&coins), "2000udaric,10uatom");

        assert!(parse_coins("").unwrap().is_empty());
        assert!(parse_coins("1.5udaric").unwrap_err().is_validation());
        assert!(parse_coins("udaric").unwrap_err().is_validation());
    }

    #[test]
    fn test_ibc_denom() {
        let coins = parse_coins("15ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2").unwrap();
        assert!(coins[0].denom.starts_with("ibc/"));
    }
}
