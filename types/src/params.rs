//! Checkpointed parameter keys and their initial values.
//!
//! Every value here is stored in the checkpointed parameter store, so a vote
//! running against a snapshot block keeps reading the values in force at that
//! block even after an administrator changes them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A toggleable personhood check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    AllowList,
    DenyList,
    Signals,
    ParticipationScore,
    MembershipLevel,
}

impl Check {
    pub const ALL: [Check; 5] = [
        Check::AllowList,
        Check::DenyList,
        Check::Signals,
        Check::ParticipationScore,
        Check::MembershipLevel,
    ];

    /// Negative checks can only reject; positive checks can only accept.
    pub fn is_negative(&self) -> bool {
        matches!(self, Self::DenyList | Self::Signals)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::AllowList => "allow_list",
            Self::DenyList => "deny_list",
            Self::Signals => "signals",
            Self::ParticipationScore => "participation_score",
            Self::MembershipLevel => "membership_level",
        }
    }
}

/// Security classification of an application. Controls how many points one
/// action in that application is worth. An application without a tier
/// scores nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SecurityTier {
    Low,
    Medium,
    High,
}

impl SecurityTier {
    pub const ALL: [SecurityTier; 3] = [SecurityTier::Low, SecurityTier::Medium, SecurityTier::High];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// Key of one checkpointed parameter timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKey {
    /// Minimum cumulative participation score to be considered a person.
    ParticipationScoreThreshold,
    /// Signal count at which the signals check rejects.
    SignalsThreshold,
    /// Percentage lost per round in the cumulative score recurrence (0..=100).
    DecayRate,
    /// Look-back window, in rounds, of the cumulative score.
    RoundsForCumulativeScore,
    /// Active entities a passport may hold.
    MaxEntitiesPerPassport,
    /// Percentage of allow-listed entities that makes a passport allow-listed.
    AllowListThresholdPercent,
    /// Percentage of deny-listed entities that makes a passport deny-listed.
    DenyListThresholdPercent,
    /// Minimum membership-token level accepted by the membership check.
    MinimumMembershipLevel,
    /// Points per action for applications of the given tier.
    SecurityMultiplier(SecurityTier),
    /// 1 when the check is enabled, 0 when disabled.
    CheckEnabled(Check),
}

impl ParamKey {
    /// Whether the value is a percentage and must stay within 0..=100.
    pub fn is_percentage(&self) -> bool {
        matches!(
            self,
            Self::DecayRate | Self::AllowListThresholdPercent | Self::DenyListThresholdPercent
        )
    }

    /// Whether the value is a 0/1 flag.
    pub fn is_flag(&self) -> bool {
        matches!(self, Self::CheckEnabled(_))
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParticipationScoreThreshold => write!(f, "participation_score_threshold"),
            Self::SignalsThreshold => write!(f, "signals_threshold"),
            Self::DecayRate => write!(f, "decay_rate"),
            Self::RoundsForCumulativeScore => write!(f, "rounds_for_cumulative_score"),
            Self::MaxEntitiesPerPassport => write!(f, "max_entities_per_passport"),
            Self::AllowListThresholdPercent => write!(f, "allow_list_threshold_percent"),
            Self::DenyListThresholdPercent => write!(f, "deny_list_threshold_percent"),
            Self::MinimumMembershipLevel => write!(f, "minimum_membership_level"),
            Self::SecurityMultiplier(tier) => write!(f, "security_multiplier.{}", tier.name()),
            Self::CheckEnabled(check) => write!(f, "check_enabled.{}", check.name()),
        }
    }
}

/// Initial values seeded into the parameter store at genesis.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassportParams {
    pub participation_score_threshold: u64,
    pub signals_threshold: u64,
    /// Percentage lost per round (0..=100).
    pub decay_rate: u64,
    pub rounds_for_cumulative_score: u64,
    pub max_entities_per_passport: u64,
    pub allow_list_threshold_percent: u64,
    pub deny_list_threshold_percent: u64,
    pub minimum_membership_level: u64,

    pub low_security_multiplier: u64,
    pub medium_security_multiplier: u64,
    pub high_security_multiplier: u64,

    /// Checks enabled at genesis. Everything else starts disabled.
    pub enabled_checks: Vec<Check>,
}

impl PassportParams {
    /// Every parameter as `(key, value)` pairs, in a stable order.
    pub fn entries(&self) -> Vec<(ParamKey, u64)> {
        let mut out = vec![
            (
                ParamKey::ParticipationScoreThreshold,
                self.participation_score_threshold,
            ),
            (ParamKey::SignalsThreshold, self.signals_threshold),
            (ParamKey::DecayRate, self.decay_rate),
            (
                ParamKey::RoundsForCumulativeScore,
                self.rounds_for_cumulative_score,
            ),
            (ParamKey::MaxEntitiesPerPassport, self.max_entities_per_passport),
            (
                ParamKey::AllowListThresholdPercent,
                self.allow_list_threshold_percent,
            ),
            (
                ParamKey::DenyListThresholdPercent,
                self.deny_list_threshold_percent,
            ),
            (ParamKey::MinimumMembershipLevel, self.minimum_membership_level),
            (
                ParamKey::SecurityMultiplier(SecurityTier::Low),
                self.low_security_multiplier,
            ),
            (
                ParamKey::SecurityMultiplier(SecurityTier::Medium),
                self.medium_security_multiplier,
            ),
            (
                ParamKey::SecurityMultiplier(SecurityTier::High),
                self.high_security_multiplier,
            ),
        ];
        for check in Check::ALL {
            let enabled = self.enabled_checks.contains(&check);
            out.push((ParamKey::CheckEnabled(check), u64::from(enabled)));
        }
        out
    }
}

impl Default for PassportParams {
    fn default() -> Self {
        Self {
            participation_score_threshold: 0,
            signals_threshold: 2,
            decay_rate: 0,
            rounds_for_cumulative_score: 8,
            max_entities_per_passport: 5,
            allow_list_threshold_percent: 100,
            deny_list_threshold_percent: 100,
            minimum_membership_level: 2,
            low_security_multiplier: 100,
            medium_security_multiplier: 200,
            high_security_multiplier: 400,
            enabled_checks: Vec::new(),
        }
    }
}
