//! Bridge mint/burn notifications
//!
//! The bridge relays `notifyMint` / `notifyBurn` from other networks
//! at-least-once and in any order. Each message is identified by its
//! `(source_chain, nonce)`; replays are dropped, and mint and burn totals are
//! kept apart so the net remote supply does not depend on arrival order.

use serde::{Deserialize, Serialize};
use types::{ChainId, Result, Sid, SynthError, U256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Mint,
    Burn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeNotification {
    pub source_chain: ChainId,
    pub nonce: u64,
    pub sid: Sid,
    pub kind: NotificationKind,
    pub amount: U256,
}

impl BridgeNotification {
    pub fn mint(source_chain: ChainId, nonce: u64, sid: Sid, amount: U256) -> Self {
        Self {
            source_chain,
            nonce,
            sid,
            kind: NotificationKind::Mint,
            amount,
        }
    }

    pub fn burn(source_chain: ChainId, nonce: u64, sid: Sid, amount: U256) -> Self {
        Self {
            source_chain,
            nonce,
            sid,
            kind: NotificationKind::Burn,
            amount,
        }
    }

    /// Replay key
    pub fn key(&self) -> (ChainId, u64) {
        (self.source_chain, self.nonce)
    }
}

/// Supply minted and burned on other networks, as observed here
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSupply {
    pub minted: U256,
    pub burned: U256,
}

impl RemoteSupply {
    pub fn record(&mut self, kind: NotificationKind, amount: U256) -> Result<()> {
        let total = match kind {
            NotificationKind::Mint => &mut self.minted,
            NotificationKind::Burn => &mut self.burned,
        };
        *total = total
            .checked_add(amount)
            .ok_or(SynthError::Overflow("remote supply"))?;
        Ok(())
    }

    /// Net remote supply; zero while a burn is seen ahead of its mint
    pub fn net(&self) -> U256 {
        self.minted.saturating_sub(self.burned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_saturates_on_early_burn() {
        let mut remote = RemoteSupply::default();
        remote.record(NotificationKind::Burn, U256::from(40u64)).unwrap();
        assert_eq!(remote.net(), U256::zero());

        remote.record(NotificationKind::Mint, U256::from(100u64)).unwrap();
        assert_eq!(remote.net(), U256::from(60u64));
    }

    #[test]
    fn test_notification_json_shape() {
        let note = BridgeNotification::mint(56, 7, Sid::from_parts(10, 1, 0), U256::from(5u64));
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["kind"], "mint");
        assert_eq!(json["nonce"], 7);
    }
}
