//! The personhood decision.
//!
//! Rejections come before acceptances: an enabled negative check that fires
//! wins even when a positive check would also pass.

use passport_types::Check;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonhoodReason {
    Delegated,
    DenyListed,
    Signaled,
    AllowListed,
    ParticipationScore,
    MembershipLevel,
    NoCriterionMet,
}

impl PersonhoodReason {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Delegated => "User has delegated their personhood",
            Self::DenyListed => "User is blacklisted",
            Self::Signaled => "User has been signaled too many times",
            Self::AllowListed => "User is whitelisted",
            Self::ParticipationScore => "User's participation score is above the threshold",
            Self::MembershipLevel => "User's membership level is above the minimum required",
            Self::NoCriterionMet => "User does not meet the criteria to be considered a person",
        }
    }

    fn for_check(check: Check) -> Self {
        match check {
            Check::AllowList => Self::AllowListed,
            Check::DenyList => Self::DenyListed,
            Check::Signals => Self::Signaled,
            Check::ParticipationScore => Self::ParticipationScore,
            Check::MembershipLevel => Self::MembershipLevel,
        }
    }
}

impl fmt::Display for PersonhoodReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personhood {
    pub is_person: bool,
    pub reason: PersonhoodReason,
}

impl Personhood {
    fn person(reason: PersonhoodReason) -> Self {
        Self {
            is_person: true,
            reason,
        }
    }

    fn not_person(reason: PersonhoodReason) -> Self {
        Self {
            is_person: false,
            reason,
        }
    }
}

const NEGATIVE_ORDER: [Check; 2] = [Check::DenyList, Check::Signals];
const POSITIVE_ORDER: [Check; 3] = [
    Check::AllowList,
    Check::ParticipationScore,
    Check::MembershipLevel,
];

/// Decide personhood. `passes` is only consulted for enabled checks; for a
/// negative check it answers "did it fire", for a positive one "is it met".
pub fn decide<E, P>(delegated: bool, enabled: E, mut passes: P) -> Personhood
where
    E: Fn(Check) -> bool,
    P: FnMut(Check) -> bool,
{
    if delegated {
        return Personhood::not_person(PersonhoodReason::Delegated);
    }
    for check in NEGATIVE_ORDER {
        if enabled(check) && passes(check) {
            return Personhood::not_person(PersonhoodReason::for_check(check));
        }
    }
    for check in POSITIVE_ORDER {
        if enabled(check) && passes(check) {
            return Personhood::person(PersonhoodReason::for_check(check));
        }
    }
    Personhood::not_person(PersonhoodReason::NoCriterionMet)
}
