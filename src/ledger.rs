//! Reward ledger and the step-currency wallet.
//!
//! Totals only ever grow; the one subtraction is [`RewardLedger::spend`],
//! which is all-or-nothing.

use std::fmt;

use serde::Serialize;

/// One credited reward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credit {
    /// Spendable step currency.
    Steps(u32),
    /// Experience points.
    Experience(u32),
    /// An inventory item.
    Item(String),
    /// A named discovery.
    Discovery(String),
}

/// A spend that the wallet could not cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsufficientSteps {
    /// Steps the action costs.
    pub needed: u32,
    /// Steps in the wallet.
    pub available: u32,
}

impl fmt::Display for InsufficientSteps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "not enough steps: need {}, have {}",
            self.needed, self.available
        )
    }
}

impl std::error::Error for InsufficientSteps {}

/// Read-only snapshot of the ledger for display.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LedgerSummary {
    /// Current spendable balance.
    pub balance: u32,
    /// Steps earned over the session (before spending).
    pub steps_earned: u64,
    /// Steps spent over the session.
    pub steps_spent: u64,
    /// Experience earned over the session.
    pub experience: u64,
    /// Items earned, in order.
    pub items: Vec<String>,
    /// Discoveries made, in order.
    pub discoveries: Vec<String>,
}

/// Session accumulator for rewards, plus the step wallet.
#[derive(Debug, Clone, Default)]
pub struct RewardLedger {
    balance: u32,
    steps_earned: u64,
    steps_spent: u64,
    experience: u64,
    items: Vec<String>,
    discoveries: Vec<String>,
}

impl RewardLedger {
    /// Empty ledger with an opening balance.
    ///
    /// The opening balance is not counted as earned.
    #[must_use]
    pub fn with_balance(balance: u32) -> Self {
        Self {
            balance,
            ..Self::default()
        }
    }

    /// Current spendable steps.
    #[must_use]
    pub const fn balance(&self) -> u32 {
        self.balance
    }

    /// Whether `amount` could be spent right now.
    #[must_use]
    pub const fn can_afford(&self, amount: u32) -> bool {
        self.balance >= amount
    }

    /// Record a reward.
    pub fn credit(&mut self, credit: Credit) {
        match credit {
            Credit::Steps(amount) => {
                self.balance = self.balance.saturating_add(amount);
                self.steps_earned = self.steps_earned.saturating_add(u64::from(amount));
            }
            Credit::Experience(amount) => {
                self.experience = self.experience.saturating_add(u64::from(amount));
            }
            Credit::Item(item) => self.items.push(item),
            Credit::Discovery(name) => self.discoveries.push(name),
        }
    }

    /// Spend steps if the balance covers `amount`.
    ///
    /// On success returns the new balance. On failure nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`InsufficientSteps`] when `amount` exceeds the balance.
    pub fn spend(&mut self, amount: u32) -> Result<u32, InsufficientSteps> {
        let Some(remaining) = self.balance.checked_sub(amount) else {
            return Err(InsufficientSteps {
                needed: amount,
                available: self.balance,
            });
        };
        self.balance = remaining;
        self.steps_spent = self.steps_spent.saturating_add(u64::from(amount));
        Ok(remaining)
    }

    /// Snapshot for display.
    #[must_use]
    pub fn summarize(&self) -> LedgerSummary {
        LedgerSummary {
            balance: self.balance,
            steps_earned: self.steps_earned,
            steps_spent: self.steps_spent,
            experience: self.experience,
            items: self.items.clone(),
            discoveries: self.discoveries.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_succeeds_and_decrements() {
        let mut ledger = RewardLedger::with_balance(30);
        assert_eq!(ledger.spend(10), Ok(20));
        assert_eq!(ledger.balance(), 20);
        assert_eq!(ledger.summarize().steps_spent, 10);
    }

    #[test]
    fn test_spend_exact_balance() {
        let mut ledger = RewardLedger::with_balance(10);
        assert_eq!(ledger.spend(10), Ok(0));
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn test_spend_fails_without_partial_deduction() {
        let mut ledger = RewardLedger::with_balance(8);
        let err = ledger.spend(10).unwrap_err();
        assert_eq!(
            err,
            InsufficientSteps {
                needed: 10,
                available: 8
            }
        );
        assert_eq!(ledger.balance(), 8);
        assert_eq!(ledger.summarize().steps_spent, 0);
    }

    #[test]
    fn test_credits_accumulate() {
        let mut ledger = RewardLedger::default();
        ledger.credit(Credit::Steps(40));
        ledger.credit(Credit::Steps(2));
        ledger.credit(Credit::Experience(25));
        ledger.credit(Credit::Item("Void Crystal".into()));
        ledger.credit(Credit::Discovery("Ancient Ruins".into()));

        let summary = ledger.summarize();
        assert_eq!(summary.balance, 42);
        assert_eq!(summary.steps_earned, 42);
        assert_eq!(summary.experience, 25);
        assert_eq!(summary.items, vec!["Void Crystal".to_string()]);
        assert_eq!(summary.discoveries, vec!["Ancient Ruins".to_string()]);
    }

    #[test]
    fn test_opening_balance_is_not_earned() {
        let ledger = RewardLedger::with_balance(100);
        let summary = ledger.summarize();
        assert_eq!(summary.balance, 100);
        assert_eq!(summary.steps_earned, 0);
    }

    #[test]
    fn test_insufficient_message() {
        let err = InsufficientSteps {
            needed: 20,
            available: 3,
        };
        assert_eq!(err.to_string(), "not enough steps: need 20, have 3");
    }
}
