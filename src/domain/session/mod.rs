//! Wallet session - the worker's view of "the current connected account"
//!
//! Constructed by the worker once a provider connection exists and dropped
//! with it, so the account watch can never outlive the connection.

use alloy::primitives::Address;

use crate::domain::address::to_checksummed;

/// Tracks the active account exposed by the wallet endpoint
#[derive(Debug, Default)]
pub struct WalletSession {
    current: Option<Address>,
    known: Vec<Address>,
}

impl WalletSession {
    /// Seed the session from the initial account list
    pub fn new(accounts: Vec<Address>) -> Self {
        let mut session = Self::default();
        session.apply_accounts(accounts);
        session
    }

    /// Apply an account-change notification.
    ///
    /// A non-empty list moves the current account to its first entry; an
    /// empty list leaves the current account untouched. Returns true when
    /// the current account actually changed.
    pub fn apply_accounts(&mut self, accounts: Vec<Address>) -> bool {
        if accounts.is_empty() {
            return false;
        }
        let next = accounts[0];
        let changed = self.current != Some(next);
        self.current = Some(next);
        self.known = accounts;
        changed
    }

    pub fn current(&self) -> Option<Address> {
        self.current
    }

    /// Checksummed display form of the current account, if any
    pub fn current_display(&self) -> Option<String> {
        self.current.map(to_checksummed)
    }

    pub fn accounts(&self) -> &[Address] {
        &self.known
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    #[test]
    fn seeds_from_first_account() {
        let session = WalletSession::new(vec![addr(1), addr(2)]);
        assert_eq!(session.current(), Some(addr(1)));
        assert_eq!(session.accounts().len(), 2);
    }

    #[test]
    fn empty_initial_list_leaves_session_unset() {
        let session = WalletSession::new(Vec::new());
        assert_eq!(session.current(), None);
    }

    #[test]
    fn notification_moves_to_first_entry() {
        let mut session = WalletSession::new(vec![addr(1)]);
        assert!(session.apply_accounts(vec![addr(2), addr(1)]));
        assert_eq!(session.current(), Some(addr(2)));
    }

    #[test]
    fn empty_notification_is_ignored() {
        let mut session = WalletSession::new(vec![addr(1)]);
        assert!(!session.apply_accounts(Vec::new()));
        assert_eq!(session.current(), Some(addr(1)));
    }

    #[test]
    fn unchanged_first_entry_reports_no_change() {
        let mut session = WalletSession::new(vec![addr(1), addr(2)]);
        assert!(!session.apply_accounts(vec![addr(1)]));
        assert_eq!(session.current(), Some(addr(1)));
    }
}
