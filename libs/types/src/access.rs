//! Capability-based access control
//!
//! The core never decides who may mint or set prices; it asks an
//! [`AccessControl`] collaborator. [`RoleTable`] is the in-memory table used by
//! the devnet and the tests.

use crate::errors::{Result, SynthError};
use ethers_core::types::Address;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Capabilities checked by the Factory and Chef entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    CanMint,
    CanBurn,
    CanSetPrice,
    CanRegisterPool,
    /// Deploy synth tokens and configure the factory reference collateral
    CanCreateSynth,
    /// Move funds in and out of farms (deposit/withdraw/compound/harvest)
    CanOperateFarm,
}

impl Capability {
    pub const ALL: [Capability; 6] = [
        Capability::CanMint,
        Capability::CanBurn,
        Capability::CanSetPrice,
        Capability::CanRegisterPool,
        Capability::CanCreateSynth,
        Capability::CanOperateFarm,
    ];
}

/// Boolean predicate over (principal, capability)
pub trait AccessControl: Send + Sync {
    fn has_capability(&self, principal: &Address, capability: Capability) -> bool;

    /// Fail with `Unauthorized` unless the principal holds the capability
    fn require(&self, principal: &Address, capability: Capability) -> Result<()> {
        if self.has_capability(principal, capability) {
            Ok(())
        } else {
            Err(SynthError::Unauthorized {
                principal: *principal,
                capability,
            })
        }
    }
}

/// In-memory grant table
#[derive(Debug, Default)]
pub struct RoleTable {
    grants: RwLock<HashMap<Address, HashSet<Capability>>>,
}

impl RoleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table where `admin` holds every capability
    pub fn with_admin(admin: Address) -> Self {
        let table = Self::new();
        for capability in Capability::ALL {
            table.grant(admin, capability);
        }
        table
    }

    pub fn grant(&self, principal: Address, capability: Capability) {
        self.grants
            .write()
            .entry(principal)
            .or_default()
            .insert(capability);
    }

    pub fn revoke(&self, principal: &Address, capability: Capability) {
        if let Some(caps) = self.grants.write().get_mut(principal) {
            caps.remove(&capability);
        }
    }
}

impl AccessControl for RoleTable {
    fn has_capability(&self, principal: &Address, capability: Capability) -> bool {
        self.grants
            .read()
            .get(principal)
            .map(|caps| caps.contains(&capability))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_and_revoke() {
        let operator = Address::from_low_u64_be(7);
        let table = RoleTable::new();

        assert!(!table.has_capability(&operator, Capability::CanMint));
        table.grant(operator, Capability::CanMint);
        assert!(table.has_capability(&operator, Capability::CanMint));
        assert!(!table.has_capability(&operator, Capability::CanBurn));

        table.revoke(&operator, Capability::CanMint);
        assert!(matches!(
            table.require(&operator, Capability::CanMint),
            Err(SynthError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_admin_holds_everything() {
        let admin = Address::from_low_u64_be(1);
        let table = RoleTable::with_admin(admin);
        for capability in Capability::ALL {
            assert!(table.require(&admin, capability).is_ok());
        }
    }
}
