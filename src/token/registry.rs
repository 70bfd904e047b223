//! Token administration and pool lookup

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::info;

use crate::error::{CcipError, Result};
use crate::protocol::Address;
use crate::traits::TokenPool;

#[derive(Default, Clone)]
struct TokenConfig {
    administrator: Option<Address>,
    pending_administrator: Option<Address>,
    pool: Option<Arc<dyn TokenPool>>,
}

/// Registry mapping local tokens to the pool that moves them
///
/// Each token has its own administrator, proposed by the registry owner and
/// confirmed by the proposed account (two-step handover). Only the
/// administrator can set or replace the token's pool.
///
/// # Example
///
/// ```rust
/// use alloy_primitives::address;
/// use ccip_rs::{Address, TokenAdminRegistry};
///
/// let owner = Address::evm(address!("0000000000000000000000000000000000000001"));
/// let admin = Address::evm(address!("0000000000000000000000000000000000000002"));
/// let token = Address::evm(address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48"));
///
/// let registry = TokenAdminRegistry::new(owner.clone());
/// registry.propose_administrator(&owner, &token, admin.clone()).unwrap();
/// registry.accept_admin_role(&admin, &token).unwrap();
/// assert_eq!(registry.administrator(&token), Some(admin));
/// ```
pub struct TokenAdminRegistry {
    owner: Address,
    tokens: RwLock<HashMap<Address, TokenConfig>>,
}

impl fmt::Debug for TokenAdminRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenAdminRegistry")
            .field("owner", &self.owner)
            .field("tokens", &self.supported_tokens())
            .finish()
    }
}

impl TokenAdminRegistry {
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    pub fn owner(&self) -> &Address {
        &self.owner
    }

    /// Proposes an administrator for a token that has none yet.
    ///
    /// # Errors
    ///
    /// [`CcipError::OnlyCallableByOwner`] for any caller but the owner, and
    /// [`CcipError::InvalidConfig`] if the token already has an administrator.
    pub fn propose_administrator(
        &self,
        caller: &Address,
        token: &Address,
        administrator: Address,
    ) -> Result<()> {
        if caller != &self.owner {
            return Err(CcipError::OnlyCallableByOwner);
        }

        let mut tokens = self.write();
        let config = tokens.entry(token.clone()).or_default();
        if config.administrator.is_some() {
            return Err(CcipError::InvalidConfig(format!(
                "token {token} already has an administrator"
            )));
        }
        config.pending_administrator = Some(administrator.clone());

        info!(
            token = %token,
            administrator = %administrator,
            event = "administrator_transfer_requested"
        );
        Ok(())
    }

    /// Starts handing the token over to a new administrator.
    pub fn transfer_admin_role(
        &self,
        caller: &Address,
        token: &Address,
        new_administrator: Address,
    ) -> Result<()> {
        let mut tokens = self.write();
        let config = tokens
            .get_mut(token)
            .filter(|c| c.administrator.as_ref() == Some(caller))
            .ok_or_else(|| CcipError::OnlyAdministrator {
                token: token.clone(),
            })?;
        config.pending_administrator = Some(new_administrator.clone());

        info!(
            token = %token,
            administrator = %new_administrator,
            event = "administrator_transfer_requested"
        );
        Ok(())
    }

    /// Completes a handover; only the pending administrator may call this.
    pub fn accept_admin_role(&self, caller: &Address, token: &Address) -> Result<()> {
        let mut tokens = self.write();
        let config = tokens
            .get_mut(token)
            .filter(|c| c.pending_administrator.as_ref() == Some(caller))
            .ok_or_else(|| CcipError::OnlyPendingAdministrator {
                token: token.clone(),
            })?;
        config.administrator = config.pending_administrator.take();

        info!(
            token = %token,
            administrator = %caller,
            event = "administrator_transferred"
        );
        Ok(())
    }

    /// Sets (or with `None`, removes) the pool of a token.
    ///
    /// # Errors
    ///
    /// [`CcipError::OnlyAdministrator`] for any caller but the token's
    /// administrator, and [`CcipError::InvalidTokenPoolToken`] when the pool
    /// manages a different token.
    pub fn set_pool(
        &self,
        caller: &Address,
        token: &Address,
        pool: Option<Arc<dyn TokenPool>>,
    ) -> Result<()> {
        if let Some(pool) = &pool {
            let actual = pool.token();
            if &actual != token {
                return Err(CcipError::InvalidTokenPoolToken {
                    expected: token.clone(),
                    actual,
                });
            }
        }

        let mut tokens = self.write();
        let config = tokens
            .get_mut(token)
            .filter(|c| c.administrator.as_ref() == Some(caller))
            .ok_or_else(|| CcipError::OnlyAdministrator {
                token: token.clone(),
            })?;

        let pool_address = pool.as_ref().map(|p| p.pool_address().to_string());
        config.pool = pool;

        info!(
            token = %token,
            pool = pool_address.as_deref().unwrap_or("none"),
            event = "pool_set"
        );
        Ok(())
    }

    pub fn pool(&self, token: &Address) -> Option<Arc<dyn TokenPool>> {
        self.read().get(token).and_then(|c| c.pool.clone())
    }

    pub fn administrator(&self, token: &Address) -> Option<Address> {
        self.read().get(token).and_then(|c| c.administrator.clone())
    }

    pub fn pending_administrator(&self, token: &Address) -> Option<Address> {
        self.read()
            .get(token)
            .and_then(|c| c.pending_administrator.clone())
    }

    /// Tokens that currently have a pool
    pub fn supported_tokens(&self) -> Vec<Address> {
        let mut tokens: Vec<Address> = self
            .read()
            .iter()
            .filter(|(_, c)| c.pool.is_some())
            .map(|(token, _)| token.clone())
            .collect();
        tokens.sort();
        tokens
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Address, TokenConfig>> {
        self.tokens.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Address, TokenConfig>> {
        self.tokens.write().unwrap_or_else(|e| e.into_inner())
    }
}
