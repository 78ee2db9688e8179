use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use tracing::{info, instrument, warn};
use zkbridge_core::base::{Address, FieldElement, Hash256, reduce};
use zkbridge_core::commitment::locker_script_hash;
use zkbridge_core::constants::CANDIDATE_ROOTS;
use zkbridge_core::schema::PublicSignals;
use zkbridge_proofs::Proof;

use crate::{ClaimError, ClaimEvent, ClaimRequest, Minter, ProofVerifier};

struct State {
    owner: Address,
    verifier: Box<dyn ProofVerifier>,
    minter: Box<dyn Minter>,
    lockers: HashMap<FieldElement, Vec<u8>>,
    nullifiers: HashSet<FieldElement>,
    claim_count: u64,
    total_claimed: u128,
    events: Vec<ClaimEvent>,
}

/// Clears the in-progress marker when a claim finishes, however it finishes.
struct InClaim<'a>(&'a Mutex<Option<ThreadId>>);

impl Drop for InClaim<'_> {
    fn drop(&mut self) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// The destination-ledger claim state machine.
///
/// Each nullifier moves from unused to used exactly once. All operations serialize on a
/// single lock, so concurrent claims racing on one nullifier yield one success and
/// [`ClaimError::AlreadyClaimed`] for the rest. The mint runs before any state is
/// written, so a failed mint leaves the claim retryable.
pub struct ClaimVerifier {
    destination_chain_id: u16,
    state: Mutex<State>,
    claiming_thread: Mutex<Option<ThreadId>>,
}

impl ClaimVerifier {
    /// A verifier for claims targeting `destination_chain_id`, administered by `owner`.
    pub fn new(
        owner: Address,
        destination_chain_id: u16,
        verifier: Box<dyn ProofVerifier>,
        minter: Box<dyn Minter>,
    ) -> Self {
        Self {
            destination_chain_id,
            state: Mutex::new(State {
                owner,
                verifier,
                minter,
                lockers: HashMap::new(),
                nullifiers: HashSet::new(),
                claim_count: 0,
                total_claimed: 0,
                events: Vec::new(),
            }),
            claiming_thread: Mutex::new(None),
        }
    }

    /// Chain identifier bound into every claim's public signals.
    #[must_use]
    pub const fn destination_chain_id(&self) -> u16 {
        self.destination_chain_id
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, ClaimError> {
        let current = thread::current().id();
        let claiming = *self
            .claiming_thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if claiming == Some(current) {
            return Err(ClaimError::ReentrantClaim);
        }
        // State is only written after every fallible step, so a poisoned lock still
        // holds a consistent state.
        Ok(self.state.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn lock_as_owner(&self, caller: &Address) -> Result<MutexGuard<'_, State>, ClaimError> {
        let state = self.lock()?;
        if state.owner != *caller {
            return Err(ClaimError::Unauthorized);
        }
        Ok(state)
    }

    /// Claim with candidate roots given as display-order block roots.
    ///
    /// # Errors
    /// See [`ClaimVerifier::claim`].
    pub fn claim_with_display_roots(
        &self,
        proof: &Proof,
        display_roots: &[[u8; 32]; CANDIDATE_ROOTS],
        nullifier: FieldElement,
        amount: u64,
        recipient: Address,
        locker_script_hash: FieldElement,
    ) -> Result<ClaimEvent, ClaimError> {
        let candidate_roots = display_roots.map(|root| reduce(&Hash256::from_display(root)));
        self.claim(
            proof,
            candidate_roots,
            nullifier,
            amount,
            recipient,
            locker_script_hash,
        )
    }

    /// Submit a [`ClaimRequest`].
    ///
    /// # Errors
    /// See [`ClaimVerifier::claim`].
    pub fn submit(&self, request: &ClaimRequest) -> Result<ClaimEvent, ClaimError> {
        self.claim(
            &request.proof,
            request.candidate_roots,
            request.nullifier,
            request.amount,
            request.recipient,
            request.locker_script_hash,
        )
    }

    /// Consume `nullifier` and mint `amount` to `recipient`.
    ///
    /// Checks run in order: non-zero amount and recipient, unused nullifier, registered
    /// locker, valid proof over
    /// `[candidate_roots..., nullifier, amount, destination_chain_id, recipient, locker_script_hash]`,
    /// then the mint. Only when the mint succeeds is the nullifier marked used and the
    /// counters updated.
    ///
    /// # Errors
    /// Any [`ClaimError`] except `Unauthorized` and `Locker`; none of them changes state.
    #[instrument(skip_all, fields(nullifier = %nullifier, amount = amount, recipient = %recipient))]
    pub fn claim(
        &self,
        proof: &Proof,
        candidate_roots: [FieldElement; CANDIDATE_ROOTS],
        nullifier: FieldElement,
        amount: u64,
        recipient: Address,
        locker_script_hash: FieldElement,
    ) -> Result<ClaimEvent, ClaimError> {
        if amount == 0 || recipient.is_zero() {
            return Err(ClaimError::ZeroAmountOrRecipient);
        }

        let mut state = self.lock()?;
        let _in_claim = self.enter_claim();

        if state.nullifiers.contains(&nullifier) {
            return Err(ClaimError::AlreadyClaimed(nullifier));
        }
        let locker_script = state
            .lockers
            .get(&locker_script_hash)
            .cloned()
            .ok_or(ClaimError::UnregisteredLocker(locker_script_hash))?;

        let signals = PublicSignals {
            candidate_roots,
            nullifier,
            amount,
            destination_chain_id: self.destination_chain_id,
            recipient,
            locker_script_hash,
        };
        if !state.verifier.verify(proof, &signals) {
            warn!("Rejected claim with invalid proof");
            return Err(ClaimError::InvalidProof);
        }

        state
            .minter
            .mint(&locker_script, &recipient, amount)
            .map_err(ClaimError::MintFailed)?;

        state.nullifiers.insert(nullifier);
        let event = ClaimEvent {
            sequence: state.claim_count,
            nullifier,
            recipient,
            amount,
            locker_script_hash,
        };
        state.claim_count = state.claim_count.saturating_add(1);
        state.total_claimed = state.total_claimed.saturating_add(u128::from(amount));
        state.events.push(event.clone());

        info!(sequence = event.sequence, "Claim accepted");
        Ok(event)
    }

    fn enter_claim(&self) -> InClaim<'_> {
        *self
            .claiming_thread
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(thread::current().id());
        InClaim(&self.claiming_thread)
    }

    /// Register `script` as a locker and return its hash.
    ///
    /// Registering the same script again is a no-op. Scripts are zero-padded before
    /// hashing, so distinct scripts can share a hash; the first registration keeps it.
    ///
    /// # Errors
    /// `Unauthorized` for non-owners, `Locker` for scripts too long to hash,
    /// `LockerAlreadyRegistered` when the hash belongs to a different script.
    #[instrument(skip_all, fields(script_len = script.len()))]
    pub fn register_locker(
        &self,
        caller: &Address,
        script: &[u8],
    ) -> Result<FieldElement, ClaimError> {
        let mut state = self.lock_as_owner(caller)?;
        let hash = locker_script_hash(script)?;
        match state.lockers.entry(hash) {
            Entry::Occupied(existing) if existing.get().as_slice() != script => {
                warn!(locker_script_hash = %hash, "Locker hash already taken");
                return Err(ClaimError::LockerAlreadyRegistered(hash));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(script.to_vec());
            }
        }
        info!(locker_script_hash = %hash, "Locker registered");
        Ok(hash)
    }

    /// Remove a locker, returning its script if it was registered.
    ///
    /// # Errors
    /// `Unauthorized` for non-owners.
    pub fn remove_locker(
        &self,
        caller: &Address,
        hash: &FieldElement,
    ) -> Result<Option<Vec<u8>>, ClaimError> {
        let mut state = self.lock_as_owner(caller)?;
        let removed = state.lockers.remove(hash);
        info!(locker_script_hash = %hash, removed = removed.is_some(), "Locker removed");
        Ok(removed)
    }

    /// Replace the proof verification backend.
    ///
    /// # Errors
    /// `Unauthorized` for non-owners.
    pub fn set_verifier(
        &self,
        caller: &Address,
        verifier: Box<dyn ProofVerifier>,
    ) -> Result<(), ClaimError> {
        self.lock_as_owner(caller)?.verifier = verifier;
        info!("Proof verifier replaced");
        Ok(())
    }

    /// Replace the minting collaborator.
    ///
    /// # Errors
    /// `Unauthorized` for non-owners.
    pub fn set_minter(&self, caller: &Address, minter: Box<dyn Minter>) -> Result<(), ClaimError> {
        self.lock_as_owner(caller)?.minter = minter;
        info!("Minter replaced");
        Ok(())
    }

    /// Hand administration over to `new_owner`.
    ///
    /// # Errors
    /// `Unauthorized` for non-owners.
    pub fn transfer_ownership(
        &self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<(), ClaimError> {
        self.lock_as_owner(caller)?.owner = new_owner;
        info!(new_owner = %new_owner, "Ownership transferred");
        Ok(())
    }

    /// Current owner.
    ///
    /// # Errors
    /// `ReentrantClaim` when called from inside a claim on the same thread.
    pub fn owner(&self) -> Result<Address, ClaimError> {
        Ok(self.lock()?.owner)
    }

    /// Whether `nullifier` has been consumed.
    ///
    /// # Errors
    /// `ReentrantClaim` when called from inside a claim on the same thread.
    pub fn is_nullifier_used(&self, nullifier: &FieldElement) -> Result<bool, ClaimError> {
        Ok(self.lock()?.nullifiers.contains(nullifier))
    }

    /// The script registered under `hash`.
    ///
    /// # Errors
    /// `ReentrantClaim` when called from inside a claim on the same thread.
    pub fn locker_script(&self, hash: &FieldElement) -> Result<Option<Vec<u8>>, ClaimError> {
        Ok(self.lock()?.lockers.get(hash).cloned())
    }

    /// Number of accepted claims.
    ///
    /// # Errors
    /// `ReentrantClaim` when called from inside a claim on the same thread.
    pub fn claim_count(&self) -> Result<u64, ClaimError> {
        Ok(self.lock()?.claim_count)
    }

    /// Sum of all minted amounts.
    ///
    /// # Errors
    /// `ReentrantClaim` when called from inside a claim on the same thread.
    pub fn total_claimed(&self) -> Result<u128, ClaimError> {
        Ok(self.lock()?.total_claimed)
    }

    /// Accepted claims in order.
    ///
    /// # Errors
    /// `ReentrantClaim` when called from inside a claim on the same thread.
    pub fn events(&self) -> Result<Vec<ClaimEvent>, ClaimError> {
        Ok(self.lock()?.events.clone())
    }
}
