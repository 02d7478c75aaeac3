//! Operator and operator-owner roles.
//!
//! Exactly one operator is authoritative at any instant. Signatures are
//! checked against the operator read at validation time, so replacing the
//! operator invalidates every signature the previous one issued that has not
//! been applied yet.

use ppf_types::Address;
use serde::{Deserialize, Serialize};

use crate::{FeedError, Result};

/// The signer authorized to update rates and the owner allowed to replace it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorRole {
    operator: Address,
    owner: Address,
}

impl OperatorRole {
    /// # Errors
    ///
    /// [`FeedError::ZeroAddress`] if either address is zero.
    pub fn new(operator: Address, owner: Address) -> Result<Self> {
        if operator.is_zero() || owner.is_zero() {
            return Err(FeedError::ZeroAddress);
        }
        Ok(Self { operator, owner })
    }

    pub fn operator(&self) -> Address {
        self.operator
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    /// Replace the operator. Only the owner may do this.
    pub fn set_operator(&mut self, caller: Address, operator: Address) -> Result<()> {
        self.ensure_owner(caller)?;
        if operator.is_zero() {
            return Err(FeedError::ZeroAddress);
        }
        self.operator = operator;
        Ok(())
    }

    /// Hand the owner role to another address. Only the owner may do this.
    pub fn set_owner(&mut self, caller: Address, owner: Address) -> Result<()> {
        self.ensure_owner(caller)?;
        if owner.is_zero() {
            return Err(FeedError::ZeroAddress);
        }
        self.owner = owner;
        Ok(())
    }

    fn ensure_owner(&self, caller: Address) -> Result<()> {
        if caller != self.owner {
            return Err(FeedError::NotOperatorOwner { caller });
        }
        Ok(())
    }
}
