//! ERC-20 style token table

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use types::{Address, Result, SynthError, U256};

/// Balances and metadata of one token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenState {
    pub symbol: String,
    pub decimals: u8,
    pub total_supply: U256,
    pub balances: HashMap<Address, U256>,
}

impl TokenState {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            ..Default::default()
        }
    }

    pub fn balance_of(&self, holder: &Address) -> U256 {
        self.balances.get(holder).copied().unwrap_or_default()
    }

    pub fn mint(&mut self, to: Address, amount: U256) -> Result<()> {
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(SynthError::Overflow("token supply"))?;
        let balance = self.balances.entry(to).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(SynthError::Overflow("token balance"))?;
        Ok(())
    }

    pub fn burn(&mut self, from: Address, amount: U256) -> Result<()> {
        self.debit(from, amount)?;
        self.total_supply -= amount;
        Ok(())
    }

    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<()> {
        self.debit(from, amount)?;
        let balance = self.balances.entry(to).or_default();
        *balance = balance
            .checked_add(amount)
            .ok_or(SynthError::Overflow("token balance"))?;
        Ok(())
    }

    fn debit(&mut self, from: Address, amount: U256) -> Result<()> {
        let available = self.balance_of(&from);
        if available < amount {
            return Err(SynthError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        let remaining = available - amount;
        if remaining.is_zero() {
            self.balances.remove(&from);
        } else {
            self.balances.insert(from, remaining);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mint_transfer_burn_conserves_supply() {
        let alice = Address::from_low_u64_be(1);
        let bob = Address::from_low_u64_be(2);
        let mut token = TokenState::new("USDC", 6);

        token.mint(alice, U256::from(1_000u64)).unwrap();
        token.transfer(alice, bob, U256::from(400u64)).unwrap();
        token.burn(bob, U256::from(100u64)).unwrap();

        assert_eq!(token.balance_of(&alice), U256::from(600u64));
        assert_eq!(token.balance_of(&bob), U256::from(300u64));
        assert_eq!(token.total_supply, U256::from(900u64));
    }

    #[test]
    fn test_overdraft_rejected() {
        let alice = Address::from_low_u64_be(1);
        let mut token = TokenState::new("USDC", 6);
        token.mint(alice, U256::from(10u64)).unwrap();

        let err = token
            .transfer(alice, Address::zero(), U256::from(11u64))
            .unwrap_err();
        assert_eq!(
            err,
            SynthError::InsufficientBalance {
                requested: U256::from(11u64),
                available: U256::from(10u64)
            }
        );
    }
}
