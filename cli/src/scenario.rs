//! JSON scenarios run against an in-memory ledger.
//!
//! A scenario is a list of steps. Applications are named and mapped to ids
//! with `app_id_from_name`; administrative steps run as the scenario admin.
//! Every step yields one JSON line: its result or its error, plus the events
//! it produced. A failing step does not stop the run.

use std::collections::HashMap;
use std::sync::Arc;

use passport_crypto::{
    app_id_from_name, derive_address, keypair_from_seed, sign_consent, Consent, ConsentKind,
};
use passport_engine::{Collaborators, Passport, PassportConfig, PassportError, Role};
use passport_nullables::{NullAppRegistry, NullBlockClock, NullMembership, NullRoundClock};
use passport_signals::ListKind;
use passport_types::{
    Address, AppId, AppRegistry, BlockClock, BlockNumber, Check, ParamKey, RoundId, SecurityTier,
    Signature,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::parse_seed;

#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Holder of every role at genesis.
    pub admin: Address,
    /// Block the clock starts at.
    #[serde(default)]
    pub start_block: u64,
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    // ── Collaborators ──
    RegisterApp { app: String, admin: Address },
    SetLevel { holder: Address, level: u8 },
    AdvanceBlocks { blocks: u64 },
    BeginRound,

    // ── Administration ──
    SetParam { key: ParamKey, value: u64 },
    EnableCheck { check: Check, #[serde(default = "default_true")] enabled: bool },
    GrantRole { role: Role, account: Address },
    SetAppSecurity { app: String, tier: SecurityTier },

    // ── Identity ──
    RequestLink { entity: Address, passport: Address },
    AcceptLink { passport: Address, entity: Address },
    /// Passport links the entity whose key is derived from `entity_seed`.
    SignedLink { passport: Address, entity_seed: String, deadline: u64 },
    Unlink { caller: Address, entity: Address },
    RequestDelegation { delegator: Address, delegatee: Address },
    AcceptDelegation { delegatee: Address, delegator: Address },
    /// Delegatee activates a delegation signed with `delegator_seed`.
    SignedDelegation { delegatee: Address, delegator_seed: String, deadline: u64 },
    RevokeDelegation { caller: Address },

    // ── Scores, signals, lists ──
    RegisterAction { user: Address, app: String, round: Option<RoundId> },
    AssignSignaler { app: String, signaler: Address },
    Signal { signaler: Address, user: Address, #[serde(default)] reason: String },
    ResetSignals { user: Address, #[serde(default)] reason: String },
    ResetSignalsForApp { app: String, user: Address, #[serde(default)] reason: String },
    List { list: ListKind, addr: Address },
    Unlist { list: ListKind, addr: Address },

    // ── Queries ──
    IsPerson { addr: Address, block: Option<u64> },
    CumulativeScore { addr: Address, round: RoundId },
    Role { addr: Address },
}

fn default_true() -> bool {
    true
}

struct Simulation {
    ledger: Passport,
    admin: Address,
    blocks: Arc<NullBlockClock>,
    rounds: Arc<NullRoundClock>,
    apps: Arc<NullAppRegistry>,
    membership: Arc<NullMembership>,
    names: HashMap<String, AppId>,
}

impl Simulation {
    fn app(&mut self, name: &str) -> AppId {
        *self
            .names
            .entry(name.to_string())
            .or_insert_with(|| app_id_from_name(name))
    }

    fn sign(&self, kind: ConsentKind, seed: &str, counterparty: &Address, deadline: u64) -> anyhow::Result<(Address, Signature)> {
        let kp = keypair_from_seed(&parse_seed(seed)?);
        let signer = derive_address(&kp.public);
        let consent = Consent {
            kind,
            signer: signer.clone(),
            counterparty: counterparty.clone(),
            nonce: self.ledger.consent_nonce(&signer),
            deadline: BlockNumber::new(deadline),
        };
        let signature = sign_consent(&consent, self.ledger.consent_domain(), &kp.private);
        Ok((signer, signature))
    }

    fn step(&mut self, step: Step) -> anyhow::Result<Value> {
        let admin = self.admin.clone();
        let ok = |r: Result<(), PassportError>| r.map(|_| json!("ok"));
        let value = match step {
            Step::RegisterApp { app, admin } => {
                let id = self.app(&app);
                self.apps.register(id, admin);
                json!({ "app": id.to_string() })
            }
            Step::SetLevel { holder, level } => {
                self.membership.set_level(&holder, level);
                json!("ok")
            }
            Step::AdvanceBlocks { blocks } => json!({ "block": self.blocks.advance(blocks).as_u64() }),
            Step::BeginRound => {
                let round = self.rounds.begin_round(self.blocks.current_block());
                json!({ "round": round })
            }
            Step::SetParam { key, value } => ok(self.ledger.set_param(&admin, key, value))?,
            Step::EnableCheck { check, enabled } => ok(self.ledger.set_check_enabled(&admin, check, enabled))?,
            Step::GrantRole { role, account } => ok(self.ledger.grant_role(&admin, role, &account))?,
            Step::SetAppSecurity { app, tier } => {
                let id = self.app(&app);
                ok(self.ledger.set_app_security(&admin, id, tier))?
            }
            Step::RequestLink { entity, passport } => ok(self.ledger.request_link(&entity, &passport))?,
            Step::AcceptLink { passport, entity } => ok(self.ledger.accept_link(&passport, &entity))?,
            Step::SignedLink { passport, entity_seed, deadline } => {
                let (entity, sig) = self.sign(ConsentKind::LinkEntity, &entity_seed, &passport, deadline)?;
                self.ledger
                    .direct_link(&passport, &entity, BlockNumber::new(deadline), &sig)?;
                json!({ "entity": entity })
            }
            Step::Unlink { caller, entity } => ok(self.ledger.unlink(&caller, &entity))?,
            Step::RequestDelegation { delegator, delegatee } => {
                ok(self.ledger.request_delegation(&delegator, &delegatee))?
            }
            Step::AcceptDelegation { delegatee, delegator } => {
                ok(self.ledger.accept_delegation(&delegatee, &delegator))?
            }
            Step::SignedDelegation { delegatee, delegator_seed, deadline } => {
                let (delegator, sig) =
                    self.sign(ConsentKind::Delegation, &delegator_seed, &delegatee, deadline)?;
                self.ledger.delegate_with_signature(
                    &delegatee,
                    &delegator,
                    BlockNumber::new(deadline),
                    &sig,
                )?;
                json!({ "delegator": delegator })
            }
            Step::RevokeDelegation { caller } => ok(self.ledger.revoke_delegation(&caller))?,
            Step::RegisterAction { user, app, round } => {
                let id = self.app(&app);
                let points = match round {
                    Some(round) => self.ledger.register_action_for_round(&admin, &user, id, round)?,
                    None => self.ledger.register_action(&admin, &user, id)?,
                };
                json!({ "points": points })
            }
            Step::AssignSignaler { app, signaler } => {
                let id = self.app(&app);
                let app_admin = self.apps.app_admin(&id).unwrap_or_else(|| admin.clone());
                ok(self.ledger.assign_signaler(&app_admin, id, &signaler))?
            }
            Step::Signal { signaler, user, reason } => ok(self.ledger.signal(&signaler, &user, &reason))?,
            Step::ResetSignals { user, reason } => ok(self.ledger.reset_signals(&admin, &user, &reason))?,
            Step::ResetSignalsForApp { app, user, reason } => {
                let id = self.app(&app);
                let app_admin = self.apps.app_admin(&id).unwrap_or_else(|| admin.clone());
                ok(self.ledger.reset_signals_for_app(&app_admin, id, &user, &reason))?
            }
            Step::List { list: ListKind::Allow, addr } => ok(self.ledger.add_to_allow_list(&admin, &addr))?,
            Step::List { list: ListKind::Deny, addr } => ok(self.ledger.add_to_deny_list(&admin, &addr))?,
            Step::Unlist { list: ListKind::Allow, addr } => ok(self.ledger.remove_from_allow_list(&admin, &addr))?,
            Step::Unlist { list: ListKind::Deny, addr } => ok(self.ledger.remove_from_deny_list(&admin, &addr))?,
            Step::IsPerson { addr, block } => {
                let result = match block {
                    Some(block) => self.ledger.is_person_at(&addr, BlockNumber::new(block)),
                    None => self.ledger.is_person(&addr),
                };
                json!({ "is_person": result.is_person, "reason": result.reason.message() })
            }
            Step::CumulativeScore { addr, round } => {
                json!({ "score": self.ledger.cumulative_score(&addr, round) })
            }
            Step::Role { addr } => json!({ "role": self.ledger.role_of(&addr) }),
        };
        Ok(value)
    }
}

/// Run `scenario` and return one JSON line per step.
pub fn run(config: &PassportConfig, scenario: Scenario) -> anyhow::Result<Vec<String>> {
    let blocks = Arc::new(NullBlockClock::new(scenario.start_block.max(config.genesis_block)));
    let rounds = Arc::new(NullRoundClock::new());
    let apps = Arc::new(NullAppRegistry::new());
    let membership = Arc::new(NullMembership::new());
    let collaborators = Collaborators {
        blocks: blocks.clone(),
        rounds: rounds.clone(),
        apps: apps.clone(),
        membership: membership.clone(),
    };
    let ledger = Passport::new(config, &scenario.admin, collaborators)?;
    let mut sim = Simulation {
        ledger,
        admin: scenario.admin,
        blocks,
        rounds,
        apps,
        membership,
        names: HashMap::new(),
    };

    let mut lines = Vec::with_capacity(scenario.steps.len());
    for (index, step) in scenario.steps.into_iter().enumerate() {
        let block = sim.blocks.current_block().as_u64();
        let line = match sim.step(step) {
            Ok(result) => json!({ "step": index, "block": block, "result": result }),
            Err(err) => {
                tracing::warn!(step = index, error = %err, "scenario step failed");
                json!({ "step": index, "block": block, "error": err.to_string() })
            }
        };
        let events = sim.ledger.drain_events();
        let mut line = line;
        if !events.is_empty() {
            line["events"] = serde_json::to_value(&events)?;
        }
        lines.push(line.to_string());
    }
    Ok(lines)
}
