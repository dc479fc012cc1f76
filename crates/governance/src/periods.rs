//! Period-window arithmetic
//!
//! Windows are half-open ranges of period numbers:
//!
//! - voting: `[start, start + voting)`
//! - grace: `[start + voting, start + voting + grace)`
//!
//! All sums saturate so oversized lengths from a corrupt record never panic.

use crate::status::{status_with, ProposalStatus};
use crate::types::{DaoMetadata, Proposal};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

fn voting_end(proposal: &Proposal, voting_len: u64) -> u64 {
    proposal.starting_period.saturating_add(voting_len)
}

fn grace_end(proposal: &Proposal, voting_len: u64, grace_len: u64) -> u64 {
    voting_end(proposal, voting_len).saturating_add(grace_len)
}

/// The proposal's starting period has not been reached yet
pub fn in_queue(proposal: &Proposal, current_period: u64) -> bool {
    current_period < proposal.starting_period
}

pub fn in_voting_period(proposal: &Proposal, current_period: u64, voting_len: u64) -> bool {
    proposal.starting_period <= current_period && current_period < voting_end(proposal, voting_len)
}

pub fn in_grace_period(
    proposal: &Proposal,
    current_period: u64,
    voting_len: u64,
    grace_len: u64,
) -> bool {
    voting_end(proposal, voting_len) <= current_period
        && current_period < grace_end(proposal, voting_len, grace_len)
}

pub fn passed_voting_and_grace(
    proposal: &Proposal,
    current_period: u64,
    voting_len: u64,
    grace_len: u64,
) -> bool {
    current_period >= grace_end(proposal, voting_len, grace_len)
}

/// Periods left in the grace window, or 0 outside it.
///
/// The result carries a `+1` over the plain distance to the window end.
/// TODO: confirm the `+1` against the contract's period accounting.
pub fn grace_period_remaining(
    proposal: &Proposal,
    current_period: u64,
    voting_len: u64,
    grace_len: u64,
) -> u64 {
    if in_grace_period(proposal, current_period, voting_len, grace_len) {
        (grace_end(proposal, voting_len, grace_len) - current_period).saturating_add(1)
    } else {
        0
    }
}

/// Periods left in the voting window, or 0 outside it
pub fn voting_ends_in(proposal: &Proposal, current_period: u64, voting_len: u64) -> u64 {
    if in_voting_period(proposal, current_period, voting_len) {
        voting_end(proposal, voting_len) - current_period
    } else {
        0
    }
}

/// Periods until voting opens, or 0 once it has
pub fn voting_starts_in(proposal: &Proposal, current_period: u64) -> u64 {
    if in_queue(proposal, current_period) {
        proposal.starting_period - current_period
    } else {
        0
    }
}

/// Voting and grace are over and nobody has processed the proposal yet
pub fn ready_for_processing(
    proposal: &Proposal,
    current_period: u64,
    voting_len: u64,
    grace_len: u64,
) -> bool {
    !proposal.processed && passed_voting_and_grace(proposal, current_period, voting_len, grace_len)
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// Render `periods` as wall-clock time in its largest whole unit.
///
/// Falls back to counting periods when the period duration is unknown.
pub fn format_periods(periods: u64, period_duration: u64) -> String {
    if period_duration == 0 {
        return plural(periods, "period");
    }

    let seconds = periods.saturating_mul(period_duration);
    if seconds >= DAY {
        plural(seconds / DAY, "day")
    } else if seconds >= HOUR {
        plural(seconds / HOUR, "hour")
    } else if seconds >= MINUTE {
        plural(seconds / MINUTE, "minute")
    } else {
        "less than a minute".to_string()
    }
}

/// Countdown line for the proposal's current status.
///
/// Waiting, voting and grace statuses count down to the end of their
/// window. Other statuses get a fixed label; missing metadata gives an
/// empty string.
pub fn countdown_text(
    proposal: &Proposal,
    meta: Option<&DaoMetadata>,
    period_duration: u64,
) -> String {
    let meta = match meta {
        Some(meta) => meta,
        None => return String::new(),
    };
    let current = meta.current_period;
    let voting_len = meta.voting_period_length;
    let grace_len = meta.grace_period_length;

    match status_with(proposal, Some(meta)) {
        ProposalStatus::Queued | ProposalStatus::Sponsored => format!(
            "Voting begins in {}",
            format_periods(voting_starts_in(proposal, current), period_duration)
        ),
        ProposalStatus::VotingPeriod => format!(
            "Voting ends in {}",
            format_periods(voting_ends_in(proposal, current, voting_len), period_duration)
        ),
        ProposalStatus::GracePeriod => format!(
            "Grace period ends in {}",
            format_periods(
                grace_period_remaining(proposal, current, voting_len, grace_len),
                period_duration
            )
        ),
        ProposalStatus::ReadyForProcessing => "Ready for processing".to_string(),
        ProposalStatus::Unsponsored => "Awaiting sponsor".to_string(),
        ProposalStatus::Unknown => String::new(),
        done => done.as_str().to_string(),
    }
}
