//! Issuance ledger for one network
//!
//! A [`SynthFactory`] deploys synth tokens at deterministic addresses, mints
//! and burns them for authorized principals, stores the price pushed by the
//! reconciler and converts between synth and collateral units. Factories on
//! different networks never talk to each other; their prices converge only
//! through reconciliation.

use crate::notifications::{BridgeNotification, NotificationKind};
use crate::pricing::{check_collateral_decimals, convert_amount};
use crate::record::{CollateralToken, FactoryState, SynthRecord};
use ethers_core::utils::{get_create2_address_from_hash, keccak256};
use std::sync::Arc;
use tracing::{debug, info};
use types::units::format_units;
use types::{
    AccessControl, Address, Capability, ChainId, ConvertDirection, Result, Sid, SynthError,
    TokenHandle, U256, PRICE_DECIMALS, SYNTH_DECIMALS,
};

/// Creation code of the synth token; its hash fixes every synth address
pub const SYNTH_INIT_CODE: &[u8] = b"synthex/synth-erc20/v1";

/// CREATE2 address of the synth `sid` deployed by `factory`
pub fn synth_address(factory: Address, sid: Sid) -> TokenHandle {
    TokenHandle(get_create2_address_from_hash(
        factory,
        sid.to_salt(),
        keccak256(SYNTH_INIT_CODE),
    ))
}

pub struct SynthFactory {
    address: Address,
    chain_id: ChainId,
    access: Arc<dyn AccessControl>,
    state: FactoryState,
}

impl SynthFactory {
    pub fn new(address: Address, chain_id: ChainId, access: Arc<dyn AccessControl>) -> Self {
        Self {
            address,
            chain_id,
            access,
            state: FactoryState::default(),
        }
    }

    /// Rebuild from a persisted snapshot
    pub fn with_state(mut self, state: FactoryState) -> Self {
        self.state = state;
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn state(&self) -> &FactoryState {
        &self.state
    }

    pub fn preview_synth_address(&self, sid: Sid) -> TokenHandle {
        synth_address(self.address, sid)
    }

    pub fn create_synth(&mut self, caller: &Address, sid: Sid, symbol: &str) -> Result<TokenHandle> {
        self.access.require(caller, Capability::CanCreateSynth)?;
        if self.state.synths.contains_key(&sid) {
            return Err(SynthError::AlreadyExists(format!("synth {sid}")));
        }
        let symbol = symbol.trim();
        if symbol.is_empty() {
            return Err(SynthError::Range(format!("empty symbol for synth {sid}")));
        }

        let handle = self.preview_synth_address(sid);
        self.state
            .synths
            .insert(sid, SynthRecord::new(handle, symbol.to_string()));
        info!(
            chain = self.chain_id,
            sid = %sid.label(),
            symbol,
            %handle,
            liquidity_staking = sid.is_liquidity_staking_synth(),
            "synth created"
        );
        Ok(handle)
    }

    pub fn set_collateral_token(&mut self, caller: &Address, token: Address, decimals: u8) -> Result<()> {
        self.access.require(caller, Capability::CanCreateSynth)?;
        check_collateral_decimals(decimals)?;
        self.state.collateral = Some(CollateralToken { token, decimals });
        info!(chain = self.chain_id, ?token, decimals, "collateral token set");
        Ok(())
    }

    pub fn collateral_token(&self) -> Option<CollateralToken> {
        self.state.collateral
    }

    fn record_mut(&mut self, sid: Sid) -> Result<&mut SynthRecord> {
        self.state
            .synths
            .get_mut(&sid)
            .ok_or_else(|| SynthError::not_found(format!("synth {sid}")))
    }

    pub fn mint(&mut self, caller: &Address, sid: Sid, amount: U256, recipient: Address) -> Result<()> {
        self.access.require(caller, Capability::CanMint)?;
        let chain = self.chain_id;
        let record = self.record_mut(sid)?;

        let supply = record
            .circulating_supply
            .checked_add(amount)
            .ok_or(SynthError::Overflow("synth supply"))?;
        let balance = record
            .balance_of(&recipient)
            .checked_add(amount)
            .ok_or(SynthError::Overflow("synth balance"))?;
        record.circulating_supply = supply;
        record.balances.insert(recipient, balance);

        info!(
            chain,
            sid = %sid.label(),
            amount = %format_units(amount, SYNTH_DECIMALS),
            ?recipient,
            supply = %format_units(supply, SYNTH_DECIMALS),
            "mint"
        );
        Ok(())
    }

    pub fn burn(&mut self, caller: &Address, sid: Sid, amount: U256, holder: Address) -> Result<()> {
        self.access.require(caller, Capability::CanBurn)?;
        let chain = self.chain_id;
        let record = self.record_mut(sid)?;

        let available = record.balance_of(&holder);
        if available < amount {
            return Err(SynthError::InsufficientBalance {
                requested: amount,
                available,
            });
        }
        let supply = record
            .circulating_supply
            .checked_sub(amount)
            .ok_or(SynthError::Overflow("circulating supply below holder balance"))?;
        let remaining = available - amount;
        if remaining.is_zero() {
            record.balances.remove(&holder);
        } else {
            record.balances.insert(holder, remaining);
        }
        record.circulating_supply = supply;

        info!(
            chain,
            sid = %sid.label(),
            amount = %format_units(amount, SYNTH_DECIMALS),
            ?holder,
            supply = %format_units(record.circulating_supply, SYNTH_DECIMALS),
            "burn"
        );
        Ok(())
    }

    pub fn set_price(&mut self, caller: &Address, sid: Sid, price: U256) -> Result<()> {
        self.access.require(caller, Capability::CanSetPrice)?;
        if price.is_zero() {
            return Err(SynthError::Range(format!("zero price for synth {sid}")));
        }
        let chain = self.chain_id;
        let record = self.record_mut(sid)?;
        let previous = std::mem::replace(&mut record.price, price);

        info!(
            chain,
            sid = %sid.label(),
            price = %format_units(price, PRICE_DECIMALS),
            previous = %format_units(previous, PRICE_DECIMALS),
            "price set"
        );
        Ok(())
    }

    /// Convert between the factory collateral and synth `sid` at its current price
    pub fn convert(&self, sid: Sid, amount: U256, direction: ConvertDirection) -> Result<U256> {
        let collateral = self
            .state
            .collateral
            .ok_or_else(|| SynthError::not_found("collateral token"))?;
        let price = self.price(sid)?;
        convert_amount(amount, collateral.decimals, price, direction)
    }

    /// Record a remote mint or burn relayed by the bridge.
    ///
    /// Returns `false` when the notification was already applied.
    pub fn apply_notification(&mut self, caller: &Address, note: &BridgeNotification) -> Result<bool> {
        let capability = match note.kind {
            NotificationKind::Mint => Capability::CanMint,
            NotificationKind::Burn => Capability::CanBurn,
        };
        self.access.require(caller, capability)?;
        self.synth(note.sid)?;

        if self.state.seen_notifications.contains(&note.key()) {
            debug!(
                chain = self.chain_id,
                source_chain = note.source_chain,
                nonce = note.nonce,
                "duplicate bridge notification dropped"
            );
            return Ok(false);
        }
        self.state
            .remote
            .entry(note.sid)
            .or_default()
            .record(note.kind, note.amount)?;
        self.state.seen_notifications.insert(note.key());

        info!(
            chain = self.chain_id,
            sid = %note.sid.label(),
            source_chain = note.source_chain,
            nonce = note.nonce,
            kind = ?note.kind,
            amount = %format_units(note.amount, SYNTH_DECIMALS),
            "bridge notification applied"
        );
        Ok(true)
    }

    /// Local supply plus the net supply reported by the bridge
    pub fn global_circulation(&self, sid: Sid) -> Result<U256> {
        let local = self.circulating_supply(sid)?;
        let remote = self
            .state
            .remote
            .get(&sid)
            .map(|r| r.net())
            .unwrap_or_default();
        local
            .checked_add(remote)
            .ok_or(SynthError::Overflow("global circulation"))
    }

    pub fn synth(&self, sid: Sid) -> Result<&SynthRecord> {
        self.state
            .synths
            .get(&sid)
            .ok_or_else(|| SynthError::not_found(format!("synth {sid}")))
    }

    pub fn price(&self, sid: Sid) -> Result<U256> {
        Ok(self.synth(sid)?.price)
    }

    pub fn circulating_supply(&self, sid: Sid) -> Result<U256> {
        Ok(self.synth(sid)?.circulating_supply)
    }

    pub fn balance_of(&self, sid: Sid, holder: &Address) -> Result<U256> {
        Ok(self.synth(sid)?.balance_of(holder))
    }

    /// Active SIDs in ascending order
    pub fn synths(&self) -> impl Iterator<Item = Sid> + '_ {
        self.state.synths.keys().copied()
    }

    pub fn is_active(&self, sid: Sid) -> bool {
        self.state.synths.contains_key(&sid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{RoleTable, SENTINEL_MAX};

    fn admin() -> Address {
        Address::from_low_u64_be(0xad)
    }

    fn factory() -> SynthFactory {
        let roles = Arc::new(RoleTable::with_admin(admin()));
        SynthFactory::new(Address::from_low_u64_be(0xfac), 56, roles)
    }

    #[test]
    fn test_create_synth_uses_preview_address() {
        let mut f = factory();
        let sid = Sid::from_parts(10, 1, 0);
        let preview = f.preview_synth_address(sid);
        assert_eq!(f.create_synth(&admin(), sid, "sVELO").unwrap(), preview);
        assert_eq!(f.synth(sid).unwrap().price, SENTINEL_MAX);
        assert_eq!(f.synth(sid).unwrap().decimals, 18);
        assert!(matches!(
            f.create_synth(&admin(), sid, "sVELO"),
            Err(SynthError::AlreadyExists(_))
        ));
    }

    #[test]
    fn test_create2_derivation() {
        let factory_address = Address::from_low_u64_be(0xfac);
        let sid = Sid::from_parts(56, 0x8000_0002, 3);

        let mut preimage = vec![0xffu8];
        preimage.extend_from_slice(factory_address.as_bytes());
        preimage.extend_from_slice(&sid.to_salt());
        preimage.extend_from_slice(&keccak256(SYNTH_INIT_CODE));
        let expected = Address::from_slice(&keccak256(&preimage)[12..]);

        assert_eq!(synth_address(factory_address, sid).address(), expected);
        assert_ne!(
            synth_address(factory_address, sid),
            synth_address(Address::from_low_u64_be(0xfad), sid)
        );
    }

    #[test]
    fn test_mint_then_burn_restores_supply() {
        let mut f = factory();
        let sid = Sid::from_parts(10, 1, 0);
        let holder = Address::from_low_u64_be(7);
        f.create_synth(&admin(), sid, "sVELO").unwrap();

        f.mint(&admin(), sid, U256::from(500u64), holder).unwrap();
        assert_eq!(f.circulating_supply(sid).unwrap(), U256::from(500u64));
        f.burn(&admin(), sid, U256::from(500u64), holder).unwrap();
        assert_eq!(f.circulating_supply(sid).unwrap(), U256::zero());
        assert_eq!(f.balance_of(sid, &holder).unwrap(), U256::zero());
    }

    #[test]
    fn test_burn_more_than_held() {
        let mut f = factory();
        let sid = Sid::from_parts(10, 1, 0);
        let holder = Address::from_low_u64_be(7);
        f.create_synth(&admin(), sid, "sVELO").unwrap();
        f.mint(&admin(), sid, U256::from(5u64), holder).unwrap();

        assert_eq!(
            f.burn(&admin(), sid, U256::from(6u64), holder),
            Err(SynthError::InsufficientBalance {
                requested: U256::from(6u64),
                available: U256::from(5u64),
            })
        );
    }

    #[test]
    fn test_set_price_rules() {
        let mut f = factory();
        let sid = Sid::from_parts(10, 1, 0);
        let stranger = Address::from_low_u64_be(0x666);
        f.create_synth(&admin(), sid, "sVELO").unwrap();

        assert!(matches!(
            f.set_price(&admin(), sid, U256::zero()),
            Err(SynthError::Range(_))
        ));
        assert!(matches!(
            f.set_price(&stranger, sid, U256::one()),
            Err(SynthError::Unauthorized { .. })
        ));
        assert!(matches!(
            f.set_price(&admin(), Sid::from_parts(1, 1, 1), U256::one()),
            Err(SynthError::NotFound(_))
        ));
        f.set_price(&admin(), sid, U256::from(3u64)).unwrap();
        f.set_price(&admin(), sid, U256::from(2u64)).unwrap();
        assert_eq!(f.price(sid).unwrap(), U256::from(2u64));
    }

    #[test]
    fn test_convert_needs_collateral() {
        let mut f = factory();
        let sid = Sid::from_parts(10, 1, 0);
        f.create_synth(&admin(), sid, "sVELO").unwrap();
        assert!(matches!(
            f.convert(sid, U256::one(), ConvertDirection::CollateralToSynth),
            Err(SynthError::NotFound(_))
        ));
        assert!(matches!(
            f.set_collateral_token(&admin(), Address::from_low_u64_be(1), 8),
            Err(SynthError::Range(_))
        ));
    }
}
