//! Property tests for the period arithmetic and status rules

use proptest::prelude::*;

use mcdao_governance::{
    grace_period_remaining, in_grace_period, status, token_symbol_for, voting_ends_in,
    DaoRecord, DaoVersion, Proposal, ProposalStatus, Token, TokenBalance, TokenField,
};

fn proposal(start: u64, sponsored: bool, processed: bool) -> Proposal {
    Proposal {
        proposal_id: "100".into(),
        starting_period: start,
        sponsored,
        processed,
        ..Default::default()
    }
}

fn any_version() -> impl Strategy<Value = DaoVersion> {
    prop_oneof![Just(DaoVersion::V1), Just(DaoVersion::V2), Just(DaoVersion::V2x)]
}

proptest! {
    #[test]
    fn v1_is_never_sponsored(
        start in 0u64..1_000,
        current in 0u64..2_000,
        voting in 0u64..100,
        grace in 0u64..100,
        sponsored in any::<bool>(),
        processed in any::<bool>(),
    ) {
        let p = proposal(start, sponsored, processed);
        let s = status(&p, current, voting, grace, DaoVersion::V1);
        prop_assert_ne!(s, ProposalStatus::Sponsored);
        prop_assert_ne!(s, ProposalStatus::Unsponsored);
    }

    #[test]
    fn unsponsored_v2_never_enters_windows(
        start in 0u64..1_000,
        current in 0u64..2_000,
        voting in 0u64..100,
        grace in 0u64..100,
        v2x in any::<bool>(),
    ) {
        let version = if v2x { DaoVersion::V2x } else { DaoVersion::V2 };
        let p = proposal(start, false, false);
        let s = status(&p, current, voting, grace, version);
        prop_assert!(!matches!(
            s,
            ProposalStatus::VotingPeriod | ProposalStatus::GracePeriod | ProposalStatus::ReadyForProcessing
        ));
    }

    #[test]
    fn voting_ends_zero_after_window(
        start in 0u64..1_000,
        voting in 0u64..100,
        extra in 0u64..500,
    ) {
        let p = proposal(start, true, false);
        prop_assert_eq!(voting_ends_in(&p, start + voting + extra, voting), 0);
    }

    #[test]
    fn grace_remaining_matches_formula(
        start in 0u64..1_000,
        current in 0u64..2_000,
        voting in 0u64..100,
        grace in 0u64..100,
    ) {
        let p = proposal(start, true, false);
        let remaining = grace_period_remaining(&p, current, voting, grace);
        if in_grace_period(&p, current, voting, grace) {
            prop_assert_eq!(remaining, start + voting + grace - current + 1);
            prop_assert!(remaining > 0);
        } else {
            prop_assert_eq!(remaining, 0);
        }
    }

    #[test]
    fn sponsored_status_follows_windows(
        start in 0u64..1_000,
        current in 0u64..2_000,
        voting in 1u64..100,
        grace in 0u64..100,
        version in any_version(),
    ) {
        let p = proposal(start, true, false);
        let s = status(&p, current, voting, grace, version);
        let expected = if current < start {
            if version == DaoVersion::V1 { ProposalStatus::Queued } else { ProposalStatus::Sponsored }
        } else if current < start + voting {
            ProposalStatus::VotingPeriod
        } else if current < start + voting + grace {
            ProposalStatus::GracePeriod
        } else {
            ProposalStatus::ReadyForProcessing
        };
        prop_assert_eq!(s, expected);
    }

    #[test]
    fn zero_payment_has_no_symbol(
        symbols in proptest::collection::vec("[A-Z]{2,5}", 0..6),
    ) {
        let balances: Vec<TokenBalance> = symbols
            .iter()
            .enumerate()
            .map(|(i, symbol)| TokenBalance {
                token: Token {
                    token_address: format!("0x{:040x}", i),
                    symbol: Some(symbol.clone()),
                    decimals: Some(18),
                },
                guild_bank: true,
                token_balance: 1,
            })
            .collect();

        let p = Proposal {
            payment_requested: 0,
            payment_token: Some(format!("0x{:040x}", 0)),
            moloch: Some(DaoRecord { token_balances: balances, ..Default::default() }),
            ..Default::default()
        };
        prop_assert_eq!(token_symbol_for(&p, TokenField::Payment), None);
    }
}
