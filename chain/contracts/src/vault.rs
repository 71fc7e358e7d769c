//! Secure Vault: aggregate custody with authorization-gated release
//!
//! Deposits are open to anyone. Withdrawals are restricted to the deploying
//! identity and need a token the registry has never seen. The registry
//! consumption, the balance debit, the transfer to the recipient and the
//! `WithdrawalMade` event form one unit: if any of them fails, none of them
//! is visible afterwards.

use custody_types::ids::{AuthorizationToken, Identity};
use custody_types::numeric::validate_amount;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::audit::AuditLog;
use crate::config::VaultConfig;
use crate::errors::{ConfigError, VaultError, WithdrawError};
use crate::events::{ContractEvent, DepositMade, WithdrawalMade};
use crate::registry::SharedRegistry;
use crate::security::OwnerGuard;
use crate::transfer::{Ledger, ValueTransfer};

/// Vault contract holding a single aggregate balance.
///
/// Conservation holds after every call:
/// `balance == total_deposited - total_withdrawn`, and `balance >= 0`.
#[derive(Debug)]
pub struct SecureVault<T: ValueTransfer = Ledger> {
    /// Privileged identity (the deployer)
    owner: OwnerGuard,
    /// Registry consulted on every withdrawal; fixed at construction
    registry: SharedRegistry,
    /// Custodied balance
    balance: Decimal,
    total_deposited: Decimal,
    total_withdrawn: Decimal,
    /// Backend delivering released value to recipients
    transfer: T,
    config: VaultConfig,
    /// Emitted events (append-only)
    log: AuditLog,
}

impl SecureVault<Ledger> {
    /// Deploy a vault owned by `deployer`, bound to `registry`, paying out
    /// through an in-memory `Ledger`.
    pub fn new(deployer: Identity, registry: SharedRegistry) -> Self {
        Self::build(deployer, registry, Ledger::new(), VaultConfig::default())
    }
}

impl<T: ValueTransfer> SecureVault<T> {
    /// Deploy a vault with a custom transfer backend and configuration.
    pub fn with_transfer(
        deployer: Identity,
        registry: SharedRegistry,
        transfer: T,
        config: VaultConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(deployer, registry, transfer, config))
    }

    fn build(deployer: Identity, registry: SharedRegistry, transfer: T, config: VaultConfig) -> Self {
        info!(owner = %deployer, unit_scale = config.unit_scale, "SecureVault deployed");
        Self {
            owner: OwnerGuard::new(deployer),
            registry,
            balance: Decimal::ZERO,
            total_deposited: Decimal::ZERO,
            total_withdrawn: Decimal::ZERO,
            transfer,
            config,
            log: AuditLog::new(),
        }
    }

    // ───────────────────────── Deposit ─────────────────────────

    /// Credit `amount` attached by `caller` to the vault balance.
    ///
    /// Emits `DepositMade(caller, amount)`. Zero, negative and over-precise
    /// amounts are rejected without any state change.
    pub fn deposit(&mut self, caller: &Identity, amount: Decimal) -> Result<ContractEvent, VaultError> {
        let amount = validate_amount(amount, self.config.unit_scale).map_err(|e| {
            warn!(caller = %caller, error = %e, "Deposit rejected");
            VaultError::InvalidAmount(e)
        })?;

        let balance = self.balance.checked_add(amount).ok_or(VaultError::Overflow)?;
        let total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(VaultError::Overflow)?;

        self.balance = balance;
        self.total_deposited = total_deposited;

        let event = ContractEvent::DepositMade(DepositMade {
            depositor: caller.clone(),
            amount,
        });
        self.log.append(event.clone());

        info!(caller = %caller, amount = %amount, balance = %self.balance, "Deposit made");
        Ok(event)
    }

    // ───────────────────────── Withdraw ─────────────────────────

    /// Release `amount` to `recipient` against a fresh authorization `token`.
    ///
    /// Checks, in order: caller is the owner, amount is valid, amount is
    /// covered by the balance, token is unused. The registry stays locked
    /// from consumption until the event is appended, so no observer sees a
    /// consumed token without the matching debit. A refused transfer undoes
    /// the consumption and the debit before returning `TransferFailed`.
    pub fn withdraw(
        &mut self,
        caller: &Identity,
        token: AuthorizationToken,
        recipient: &Identity,
        amount: Decimal,
    ) -> Result<ContractEvent, WithdrawError> {
        self.owner.ensure_owner(caller)?;

        let amount = validate_amount(amount, self.config.unit_scale)?;
        if amount > self.balance {
            warn!(
                requested = %amount,
                available = %self.balance,
                "Withdrawal exceeds balance"
            );
            return Err(WithdrawError::InsufficientFunds {
                requested: amount.to_string(),
                available: self.balance.to_string(),
            });
        }

        let mut registry = self.registry.lock();
        let (_, receipt) = registry.stage_consume(token)?;

        let previous_balance = self.balance;
        self.balance -= amount;
        debug!(token = %token, balance = %self.balance, "Balance debited");

        if let Err(e) = self.transfer.transfer(recipient, amount) {
            self.balance = previous_balance;
            registry.revert(receipt);
            warn!(recipient = %recipient, error = %e, "Transfer failed, withdrawal rolled back");
            return Err(WithdrawError::TransferFailed {
                recipient: recipient.to_string(),
                reason: e.to_string(),
            });
        }

        self.total_withdrawn += amount;
        let event = ContractEvent::WithdrawalMade(WithdrawalMade {
            recipient: recipient.clone(),
            amount,
        });
        self.log.append(event.clone());
        drop(registry);

        info!(
            recipient = %recipient,
            amount = %amount,
            balance = %self.balance,
            "Withdrawal made"
        );
        Ok(event)
    }

    // ───────────────────────── Views ─────────────────────────

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn total_deposited(&self) -> Decimal {
        self.total_deposited
    }

    pub fn total_withdrawn(&self) -> Decimal {
        self.total_withdrawn
    }

    /// The privileged identity fixed at construction.
    pub fn owner(&self) -> &Identity {
        self.owner.owner()
    }

    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Whether the bound registry has consumed `token`.
    pub fn is_authorization_used(&self, token: &AuthorizationToken) -> bool {
        self.registry.lock().is_consumed(token)
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    /// Events emitted by the vault, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &ContractEvent> + '_ {
        self.log.events()
    }

    pub fn audit_log(&self) -> &AuditLog {
        &self.log
    }

    pub fn transfer_backend(&self) -> &T {
        &self.transfer
    }

    /// Mutable access to the transfer backend, e.g. to change which
    /// recipients accept value.
    pub fn transfer_backend_mut(&mut self) -> &mut T {
        &mut self.transfer
    }
}
