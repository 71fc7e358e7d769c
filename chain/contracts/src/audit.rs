//! Append-only audit log
//!
//! Every event a contract emits lands here as a numbered record whose hash
//! chains over the previous one, so a watcher holding a head hash can detect
//! any rewrite of earlier history.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::errors::AuditError;
use crate::events::ContractEvent;

/// Hash preceding the first record.
pub const GENESIS_HASH: [u8; 32] = [0u8; 32];

/// A single sequenced audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub sequence: u64,
    pub event: ContractEvent,
    pub chain_hash: [u8; 32],
}

/// Position in the log a component can rewind to inside its own atomic unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Checkpoint {
    len: usize,
    head: [u8; 32],
}

/// Hash-chained event log.
#[derive(Debug, Clone)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
    head: [u8; 32],
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            head: GENESIS_HASH,
        }
    }

    /// Append an event and return its record.
    pub fn append(&mut self, event: ContractEvent) -> &AuditRecord {
        let sequence = self.records.len() as u64;
        let chain_hash = chain_hash(&self.head, sequence, &event);
        self.head = chain_hash;
        self.records.push(AuditRecord {
            sequence,
            event,
            chain_hash,
        });
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// Iterate over the logged events in emission order.
    pub fn events(&self) -> impl Iterator<Item = &ContractEvent> + '_ {
        self.records.iter().map(|r| &r.event)
    }

    /// Hash of the latest record (genesis hash when empty).
    pub fn head(&self) -> [u8; 32] {
        self.head
    }

    pub fn head_hex(&self) -> String {
        hex::encode(self.head)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Recompute the chain from genesis and compare against stored hashes.
    pub fn verify(&self) -> Result<(), AuditError> {
        verify_records(&self.records).map(|_| ())
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            len: self.records.len(),
            head: self.head,
        }
    }

    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        self.records.truncate(checkpoint.len);
        self.head = checkpoint.head;
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Chain hash of a record: `SHA-256(prev || sequence_be || canonical(event))`.
pub fn chain_hash(prev: &[u8; 32], sequence: u64, event: &ContractEvent) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(prev);
    hasher.update(sequence.to_be_bytes());
    hasher.update(event.canonical_bytes());
    hasher.finalize().into()
}

/// Verify an exported sequence of records, returning the head hash.
pub fn verify_records(records: &[AuditRecord]) -> Result<[u8; 32], AuditError> {
    let mut head = GENESIS_HASH;
    for (expected, record) in records.iter().enumerate() {
        let expected = expected as u64;
        if record.sequence != expected {
            return Err(AuditError::SequenceMismatch {
                expected,
                actual: record.sequence,
            });
        }
        let recomputed = chain_hash(&head, record.sequence, &record.event);
        if recomputed != record.chain_hash {
            return Err(AuditError::ChainBroken {
                sequence: record.sequence,
            });
        }
        head = recomputed;
    }
    Ok(head)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::DepositMade;
    use custody_types::ids::Identity;
    use rust_decimal::Decimal;

    fn deposit(amount: i64) -> ContractEvent {
        ContractEvent::DepositMade(DepositMade {
            depositor: Identity::new("user"),
            amount: Decimal::from(amount),
        })
    }

    #[test]
    fn test_empty_log_has_genesis_head() {
        let log = AuditLog::new();
        assert!(log.is_empty());
        assert_eq!(log.head(), GENESIS_HASH);
        assert!(log.verify().is_ok());
    }

    #[test]
    fn test_append_sequences_and_chains() {
        let mut log = AuditLog::new();
        let first = log.append(deposit(1)).clone();
        let second = log.append(deposit(2)).clone();

        assert_eq!(first.sequence, 0);
        assert_eq!(second.sequence, 1);
        assert_eq!(second.chain_hash, chain_hash(&first.chain_hash, 1, &deposit(2)));
        assert_eq!(log.head(), second.chain_hash);
        assert!(log.verify().is_ok());
    }

    #[test]
    fn test_chain_hash_covers_canonical_encoding() {
        let event = deposit(7);
        let mut hasher = Sha256::new();
        hasher.update(GENESIS_HASH);
        hasher.update(0u64.to_be_bytes());
        hasher.update(event.canonical_bytes());
        let expected: [u8; 32] = hasher.finalize().into();

        assert_eq!(chain_hash(&GENESIS_HASH, 0, &event), expected);

        let rescaled = ContractEvent::DepositMade(DepositMade {
            depositor: Identity::new("user"),
            amount: Decimal::new(700, 2),
        });
        assert_eq!(chain_hash(&GENESIS_HASH, 0, &rescaled), expected);
    }

    #[test]
    fn test_tampered_record_detected() {
        let mut log = AuditLog::new();
        log.append(deposit(1));
        log.append(deposit(2));

        let mut records = log.records().to_vec();
        records[0].event = deposit(100);
        assert_eq!(
            verify_records(&records),
            Err(AuditError::ChainBroken { sequence: 0 })
        );
    }

    #[test]
    fn test_dropped_record_detected() {
        let mut log = AuditLog::new();
        log.append(deposit(1));
        log.append(deposit(2));

        let records = log.records()[1..].to_vec();
        assert_eq!(
            verify_records(&records),
            Err(AuditError::SequenceMismatch {
                expected: 0,
                actual: 1
            })
        );
    }

    #[test]
    fn test_rollback_restores_head() {
        let mut log = AuditLog::new();
        log.append(deposit(1));
        let checkpoint = log.checkpoint();
        let head = log.head();

        log.append(deposit(2));
        log.rollback(checkpoint);

        assert_eq!(log.len(), 1);
        assert_eq!(log.head(), head);
        assert!(log.verify().is_ok());
    }

    #[test]
    fn test_verify_records_returns_head() {
        let mut log = AuditLog::new();
        log.append(deposit(3));
        assert_eq!(verify_records(log.records()).unwrap(), log.head());
    }
}
