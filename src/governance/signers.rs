//! Signer registry
//!
//! Immutable set of authorized signers plus the vote threshold shared by
//! cut proposals and the relinquish vote.

use crate::error::GovernanceError;
use crate::identity::Address;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerRegistry {
    /// Construction order, no duplicates
    signers: Vec<Address>,
    members: HashSet<Address>,
    threshold: usize,
    admin: Address,
}

impl SignerRegistry {
    /// Validate and freeze the signer set.
    ///
    /// Checks run in this order: empty list, threshold range, then each
    /// entry for the null sentinel and duplicates in list order. The admin
    /// must not be null either.
    pub fn new(signers: Vec<Address>, threshold: usize, admin: Address) -> Result<Self, GovernanceError> {
        if signers.is_empty() {
            return Err(GovernanceError::EmptySignerList);
        }
        if threshold < 1 || threshold > signers.len() {
            return Err(GovernanceError::InvalidVoteThreshold {
                threshold,
                signers: signers.len(),
            });
        }

        let mut members = HashSet::with_capacity(signers.len());
        for signer in &signers {
            if signer.is_zero() {
                return Err(GovernanceError::NullAddress);
            }
            if !members.insert(*signer) {
                return Err(GovernanceError::DuplicateSigner(*signer));
            }
        }
        if admin.is_zero() {
            return Err(GovernanceError::NullAddress);
        }

        Ok(Self {
            signers,
            members,
            threshold,
            admin,
        })
    }

    pub fn is_signer(&self, identity: &Address) -> bool {
        self.members.contains(identity)
    }

    /// Fail with `NotASigner` unless `identity` is in the set
    pub fn ensure_signer(&self, identity: &Address) -> Result<(), GovernanceError> {
        if self.is_signer(identity) {
            Ok(())
        } else {
            Err(GovernanceError::NotASigner(*identity))
        }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn signers(&self) -> &[Address] {
        &self.signers
    }

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn len(&self) -> usize {
        self.signers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signers.is_empty()
    }
}
