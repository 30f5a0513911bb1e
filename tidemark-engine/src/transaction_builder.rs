//! Transaction builder - unsigned ledger transaction payloads
//!
//! Translates domain parameters into ledger-ready transaction requests. The
//! builder never signs or submits anything; callers hand the payloads to
//! whatever holds the wallet keys. Field names follow the ledger's JSON
//! transaction format in snake_case.

use chrono::Utc;
use serde::Serialize;

use crate::condition_generator::{ConditionGenerator, ConditionPair};
use crate::error::EscrowError;
use crate::EscrowResult;

/// Seconds between the unix epoch and the ledger epoch (2000-01-01T00:00:00Z)
pub const RIPPLE_EPOCH_OFFSET: i64 = 946_684_800;

/// Current time in ledger-epoch seconds
pub fn ripple_time_now() -> u32 {
    (Utc::now().timestamp() - RIPPLE_EPOCH_OFFSET) as u32
}

/// Unsigned escrow-create transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscrowCreate {
    pub transaction_type: String,
    pub account: String,
    /// Amount in drops, as the ledger expects it: a decimal string
    pub amount: String,
    pub destination: String,
    /// Ledger-epoch time after which the sender may cancel
    pub cancel_after: u32,
    pub condition: String,
}

/// Unsigned escrow-finish transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EscrowFinish {
    pub transaction_type: String,
    pub account: String,
    pub owner: String,
    pub offer_sequence: u32,
    pub condition: String,
    pub fulfillment: String,
}

/// Unsigned XRP payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub transaction_type: String,
    pub account: String,
    pub amount: String,
    pub destination: String,
}

/// Issued-currency amount limb used by trustline transactions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedCurrencyAmount {
    pub currency: String,
    pub issuer: String,
    pub value: String,
}

/// Unsigned trust-set transaction; a zero limit removes the trustline
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrustSet {
    pub transaction_type: String,
    pub account: String,
    pub limit_amount: IssuedCurrencyAmount,
}

/// Builds unsigned transactions; owns the condition generator so escrow
/// creation draws exactly one fresh pair per call
#[derive(Debug, Default, Clone, Copy)]
pub struct EscrowTransactionBuilder {
    generator: ConditionGenerator,
}

impl EscrowTransactionBuilder {
    pub fn new() -> Self {
        Self {
            generator: ConditionGenerator::new(),
        }
    }

    /// Build an escrow-create transaction and its condition pair.
    ///
    /// `cancel_after_offset_secs` is added to the current ledger time; the
    /// escrow becomes cancellable only after that deadline. Choosing an
    /// offset large enough to allow settlement is the caller's
    /// responsibility, no minimum is enforced here.
    pub fn build_create(
        &self,
        sender: &str,
        destination: &str,
        amount_drops: u64,
        cancel_after_offset_secs: u32,
    ) -> EscrowResult<(EscrowCreate, ConditionPair)> {
        if sender.trim().is_empty() || destination.trim().is_empty() {
            return Err(EscrowError::ledger_build(
                "Sender and destination addresses are required",
            ));
        }
        if amount_drops == 0 {
            return Err(EscrowError::ledger_build("Amount must be greater than 0 drops"));
        }

        let pair = self.generator.generate()?;

        let tx = EscrowCreate {
            transaction_type: "EscrowCreate".to_string(),
            account: sender.to_string(),
            amount: amount_drops.to_string(),
            destination: destination.to_string(),
            cancel_after: ripple_time_now().saturating_add(cancel_after_offset_secs),
            condition: pair.condition.clone(),
        };

        Ok((tx, pair))
    }

    /// Build an escrow-finish transaction.
    ///
    /// Pure construction; whether the fulfillment matches the condition is
    /// checked on-ledger at submission. A request with any field absent can
    /// never succeed there, so it is rejected here instead of being sent.
    pub fn build_finish(
        &self,
        account: &str,
        owner: &str,
        offer_sequence: u32,
        condition: &str,
        fulfillment: &str,
    ) -> EscrowResult<EscrowFinish> {
        if account.trim().is_empty() {
            return Err(EscrowError::MissingField("account"));
        }
        if owner.trim().is_empty() {
            return Err(EscrowError::MissingField("owner"));
        }
        if offer_sequence == 0 {
            return Err(EscrowError::MissingField("offer_sequence"));
        }
        if condition.trim().is_empty() {
            return Err(EscrowError::MissingField("condition"));
        }
        if fulfillment.trim().is_empty() {
            return Err(EscrowError::MissingField("fulfillment"));
        }

        Ok(EscrowFinish {
            transaction_type: "EscrowFinish".to_string(),
            account: account.to_string(),
            owner: owner.to_string(),
            offer_sequence,
            condition: condition.to_string(),
            fulfillment: fulfillment.to_string(),
        })
    }

    /// Build a plain XRP payment in drops
    pub fn build_payment(
        &self,
        sender: &str,
        destination: &str,
        amount_drops: u64,
    ) -> EscrowResult<Payment> {
        if sender.trim().is_empty() || destination.trim().is_empty() {
            return Err(EscrowError::ledger_build(
                "Sender and destination addresses are required",
            ));
        }
        if amount_drops == 0 {
            return Err(EscrowError::ledger_build("Amount must be greater than 0 drops"));
        }

        Ok(Payment {
            transaction_type: "Payment".to_string(),
            account: sender.to_string(),
            amount: amount_drops.to_string(),
            destination: destination.to_string(),
        })
    }

    /// Build a trust-set transaction authorizing an issued currency up to a limit
    pub fn build_trust_set(
        &self,
        account: &str,
        currency: &str,
        issuer: &str,
        limit: &str,
    ) -> EscrowResult<TrustSet> {
        if account.trim().is_empty() || issuer.trim().is_empty() || currency.trim().is_empty() {
            return Err(EscrowError::ledger_build(
                "Account, issuer and currency are required",
            ));
        }

        Ok(TrustSet {
            transaction_type: "TrustSet".to_string(),
            account: account.to_string(),
            limit_amount: IssuedCurrencyAmount {
                currency: currency.to_string(),
                issuer: issuer.to_string(),
                value: limit.to_string(),
            },
        })
    }

    /// Build a trust-set that removes a trustline by zeroing its limit
    pub fn build_trust_clear(
        &self,
        account: &str,
        currency: &str,
        issuer: &str,
    ) -> EscrowResult<TrustSet> {
        self.build_trust_set(account, currency, issuer, "0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition_generator::verify;

    #[test]
    fn create_places_roles_and_amount() {
        let builder = EscrowTransactionBuilder::new();
        let before = ripple_time_now();
        let (tx, pair) = builder.build_create("rBOB", "rALICE", 500, 3600).unwrap();

        assert_eq!(tx.transaction_type, "EscrowCreate");
        assert_eq!(tx.account, "rBOB");
        assert_eq!(tx.destination, "rALICE");
        assert_eq!(tx.amount, "500");
        assert_eq!(tx.condition, pair.condition);
        assert!(tx.cancel_after > before);
        assert!(tx.cancel_after >= before + 3600);
    }

    #[test]
    fn create_rejects_zero_amount() {
        let builder = EscrowTransactionBuilder::new();
        let err = builder.build_create("rBOB", "rALICE", 0, 3600).unwrap_err();
        assert!(matches!(err, EscrowError::LedgerBuild(_)));
    }

    #[test]
    fn create_rejects_empty_addresses() {
        let builder = EscrowTransactionBuilder::new();
        assert!(builder.build_create("", "rALICE", 500, 3600).is_err());
        assert!(builder.build_create("rBOB", " ", 500, 3600).is_err());
    }

    #[test]
    fn finish_rejects_each_missing_field() {
        let builder = EscrowTransactionBuilder::new();
        let cases: [(&str, &str, u32, &str, &str, &str); 5] = [
            ("", "rBOB", 7, "A0", "A0", "account"),
            ("rALICE", "", 7, "A0", "A0", "owner"),
            ("rALICE", "rBOB", 0, "A0", "A0", "offer_sequence"),
            ("rALICE", "rBOB", 7, "", "A0", "condition"),
            ("rALICE", "rBOB", 7, "A0", "", "fulfillment"),
        ];
        for (account, owner, seq, condition, fulfillment, field) in cases {
            let err = builder
                .build_finish(account, owner, seq, condition, fulfillment)
                .unwrap_err();
            match err {
                EscrowError::MissingField(name) => assert_eq!(name, field),
                other => panic!("expected MissingField({field}), got {other:?}"),
            }
        }
    }

    #[test]
    fn create_then_finish_round_trips_the_pair() {
        let builder = EscrowTransactionBuilder::new();
        let (create, pair) = builder.build_create("rBOB", "rALICE", 500, 3600).unwrap();
        let finish = builder
            .build_finish("rALICE", "rBOB", 42, &pair.condition, &pair.fulfillment)
            .unwrap();

        assert_eq!(finish.condition, create.condition);
        assert_eq!(finish.fulfillment, pair.fulfillment);
        assert!(verify(&finish.condition, &finish.fulfillment));
    }

    #[test]
    fn payloads_serialize_with_ledger_field_names() {
        let builder = EscrowTransactionBuilder::new();
        let (tx, _) = builder.build_create("rBOB", "rALICE", 500, 60).unwrap();
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["transaction_type"], "EscrowCreate");
        assert!(json.get("cancel_after").is_some());
        assert!(json.get("condition").is_some());

        let trust = builder.build_trust_set("rBOB", "USD", "rISSUER", "1000").unwrap();
        let json = serde_json::to_value(&trust).unwrap();
        assert_eq!(json["limit_amount"]["currency"], "USD");
        assert_eq!(json["limit_amount"]["value"], "1000");
    }

    #[test]
    fn trust_clear_zeroes_the_limit() {
        let builder = EscrowTransactionBuilder::new();
        let tx = builder.build_trust_clear("rBOB", "USD", "rISSUER").unwrap();
        assert_eq!(tx.limit_amount.value, "0");
    }

    #[test]
    fn payment_uses_drops_string() {
        let builder = EscrowTransactionBuilder::new();
        let tx = builder.build_payment("rBOB", "rALICE", 1_000_000).unwrap();
        assert_eq!(tx.amount, "1000000");
        assert_eq!(tx.transaction_type, "Payment");
    }

    #[test]
    fn ledger_epoch_is_behind_unix_epoch() {
        let unix = Utc::now().timestamp();
        let ripple = ripple_time_now() as i64;
        let diff = (unix - ripple) - RIPPLE_EPOCH_OFFSET;
        // The two clock reads may straddle a second boundary
        assert!((-1..=1).contains(&diff));
    }
}
