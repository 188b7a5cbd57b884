//! Monetary types for token amounts and per-token balances.

use std::fmt;

use rust_decimal::Decimal;

/// Number of atoms in one coin.
pub const ATOMS_PER_COIN: i64 = 100_000_000;

/// The two tokens carried by every output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// The volatile mining token (order `amount` side).
    Token0,
    /// The price-anchored token (order `payout` side).
    Token1,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token0 => write!(f, "NDR"),
            Self::Token1 => write!(f, "STB"),
        }
    }
}

/// Amount of a token counted in atoms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Self = Self(0);

    /// Create an amount from a count of atoms.
    #[must_use]
    pub const fn from_atoms(atoms: i64) -> Self {
        Self(atoms)
    }

    /// Get the count of atoms.
    #[must_use]
    pub const fn atoms(&self) -> i64 {
        self.0
    }

    /// Absolute value, saturating at `i64::MAX`.
    #[must_use]
    pub const fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }

    #[must_use]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Convert to whole coins for display.
    #[must_use]
    pub fn to_coin(&self) -> Decimal {
        Decimal::new(self.0, 8)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Coin", self.to_coin())
    }
}

/// Net amounts of both tokens, as produced by an input/output balance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Balance {
    token0: Amount,
    token1: Amount,
}

impl Balance {
    #[must_use]
    pub const fn new(token0: Amount, token1: Amount) -> Self {
        Self { token0, token1 }
    }

    /// Amount of the given token.
    #[must_use]
    pub const fn amount(&self, token: Token) -> Amount {
        match token {
            Token::Token0 => self.token0,
            Token::Token1 => self.token1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn amount_to_coin() {
        assert_eq!(Amount::from_atoms(150_000_000).to_coin(), dec!(1.5));
        assert_eq!(Amount::from_atoms(-1).to_coin(), dec!(-0.00000001));
    }

    #[test]
    fn amount_abs_saturates() {
        assert_eq!(Amount::from_atoms(i64::MIN).abs().atoms(), i64::MAX);
        assert_eq!(Amount::from_atoms(-7).abs().atoms(), 7);
    }

    #[test]
    fn balance_by_token() {
        let balance = Balance::new(Amount::from_atoms(5), Amount::from_atoms(-3));
        assert_eq!(balance.amount(Token::Token0).atoms(), 5);
        assert_eq!(balance.amount(Token::Token1).atoms(), -3);
        assert_eq!(Token::Token1.to_string(), "STB");
    }
}
