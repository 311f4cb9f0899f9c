//! Test the wallet-session account rules and gallery selection logic

#[test]
fn test_account_change_rules() {
    // Simulate the session's reaction to account-change notifications

    #[derive(Debug, Default)]
    struct MockSession {
        current: Option<String>,
    }

    impl MockSession {
        fn apply_accounts(&mut self, accounts: Vec<String>) {
            if accounts.is_empty() {
                return; // empty notification leaves the account unchanged
            }
            self.current = Some(accounts[0].clone());
        }
    }

    let mut session = MockSession::default();

    // Initial acquisition: empty list leaves the session unset
    session.apply_accounts(Vec::new());
    assert_eq!(session.current, None);

    // Non-empty list sets the first entry
    session.apply_accounts(vec!["0xaaa".into(), "0xbbb".into()]);
    assert_eq!(session.current.as_deref(), Some("0xaaa"));

    // A notification moves to the new first entry
    session.apply_accounts(vec!["0xbbb".into()]);
    assert_eq!(session.current.as_deref(), Some("0xbbb"));

    // An empty notification changes nothing
    session.apply_accounts(Vec::new());
    assert_eq!(session.current.as_deref(), Some("0xbbb"));

    println!("✓ Account-change rules hold");
}

#[test]
fn test_connect_failure_is_non_blocking() {
    // connect() failing (no provider, user declined) must degrade to a
    // logged warning - the manual address path keeps working

    #[derive(Debug, PartialEq)]
    enum Status {
        None,
        Warn(String),
    }

    struct FlowState {
        status: Status,
        input_enabled: bool,
    }

    let mut state = FlowState {
        status: Status::None,
        input_enabled: true,
    };

    // Simulated connect failure
    let connect_result: Result<Vec<String>, String> = Err("no wallet endpoint".into());
    if let Err(message) = connect_result {
        state.status = Status::Warn(message);
        // note: input_enabled is untouched
    }

    assert_eq!(state.status, Status::Warn("no wallet endpoint".into()));
    assert!(state.input_enabled, "address entry must remain usable");

    println!("✓ Connect failure degrades to a warning");
}

#[test]
fn test_grid_selection_math() {
    // The gallery grid clamps selection and navigates by whole columns

    fn move_down(selected: usize, columns: usize, len: usize) -> usize {
        let next = selected + columns;
        if next < len {
            next
        } else {
            selected
        }
    }

    fn move_up(selected: usize, columns: usize) -> usize {
        selected.saturating_sub(columns)
    }

    fn clamp(selected: usize, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            selected.min(len - 1)
        }
    }

    // 7 cells in 3 columns:
    //   0 1 2
    //   3 4 5
    //   6
    assert_eq!(move_down(1, 3, 7), 4);
    assert_eq!(move_down(4, 3, 7), 4, "would fall past the last row");
    assert_eq!(move_up(4, 3), 1);
    assert_eq!(move_up(1, 3), 0, "saturates at the first cell");

    // A new, smaller gallery clamps a stale selection
    assert_eq!(clamp(6, 2), 1);
    assert_eq!(clamp(0, 0), 0);

    println!("✓ Grid selection logic is correct");
}
