//! Battle orchestration.
//!
//! A [`Battle`] owns both rosters for the length of one encounter and steps
//! through an explicit state machine:
//!
//! ```text
//! Init → RoundStart → (PlayerInput | TurnProcessing)* → RoundStart → … → Victory | Defeat
//! ```
//!
//! [`Battle::advance`] is the single stepping entry point. Each call performs
//! one unit of work (start a round, or run one battler's turn to completion)
//! and reports what happened as a [`Step`]. Detailed notifications accumulate
//! as [`BattleEvent`]s.

mod ai;
mod apply;
mod encounter;
mod events;
mod rewards;
mod triggers;

pub use encounter::{EncounterPool, EncounterTable};
pub use events::BattleEvent;
pub use rewards::{AllyReward, Rewards, gain_exp, victory_payout};

use crate::action::{ActionResolver, TargetError, select_targets};
use crate::config::BattleConfig;
use crate::error::report;
use crate::registry::{Catalog, RegistryError};
use crate::rng::RandomSource;
use crate::stats::{Battler, BattlerId, BattlerKind, GUARDING};

/// First id handed to generated enemies.
pub const ENEMY_ID_BASE: u32 = 1000;

/// Which roster a battler belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Ally,
    Enemy,
}

impl Side {
    pub const fn opposite(self) -> Self {
        match self {
            Self::Ally => Self::Enemy,
            Self::Enemy => Self::Ally,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BattlePhase {
    #[default]
    Init,
    RoundStart,
    PlayerInput,
    TurnProcessing,
    Victory,
    Defeat,
}

impl BattlePhase {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Victory | Self::Defeat)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Outcome {
    Victory,
    Defeat,
}

/// What one call to [`Battle::advance`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    RoundStarted(u32),
    /// Paused for a manual player turn; call [`Battle::resume_auto`].
    AwaitingInput,
    TurnTaken(BattlerId),
    /// Every queued battler has acted.
    RoundComplete,
    /// The encounter rolled no enemies; nothing was started.
    NoEncounter,
    Finished(Outcome),
}

/// Snapshot-able battle state.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleSession {
    pub allies: Vec<Battler>,
    pub enemies: Vec<Battler>,
    pub turn_queue: Vec<BattlerId>,
    pub turn_index: usize,
    pub round_count: u32,
    pub phase: BattlePhase,
    pub floor: u32,
}

impl BattleSession {
    pub fn roster(&self, side: Side) -> &[Battler] {
        match side {
            Side::Ally => &self.allies,
            Side::Enemy => &self.enemies,
        }
    }

    fn roster_mut(&mut self, side: Side) -> &mut Vec<Battler> {
        match side {
            Side::Ally => &mut self.allies,
            Side::Enemy => &mut self.enemies,
        }
    }

    pub fn side_of(&self, id: BattlerId) -> Option<Side> {
        if self.allies.iter().any(|b| b.id == id) {
            Some(Side::Ally)
        } else if self.enemies.iter().any(|b| b.id == id) {
            Some(Side::Enemy)
        } else {
            None
        }
    }

    pub fn battler(&self, id: BattlerId) -> Option<&Battler> {
        self.allies.iter().chain(&self.enemies).find(|b| b.id == id)
    }

    pub fn battler_mut(&mut self, id: BattlerId) -> Option<&mut Battler> {
        self.allies
            .iter_mut()
            .chain(self.enemies.iter_mut())
            .find(|b| b.id == id)
    }

    /// Living battlers of `side`.
    pub fn living(&self, side: Side) -> Vec<&Battler> {
        self.roster(side).iter().filter(|b| b.is_alive()).collect()
    }

    pub fn is_wiped(&self, side: Side) -> bool {
        self.roster(side).iter().all(|b| !b.is_alive())
    }

    pub fn round_exhausted(&self) -> bool {
        self.turn_index >= self.turn_queue.len()
    }
}

/// One encounter in progress.
pub struct Battle<'a, R: RandomSource> {
    catalog: &'a Catalog,
    config: &'a BattleConfig,
    rng: R,
    session: BattleSession,
    player_turn_requested: bool,
    pending_casts: Vec<(BattlerId, String)>,
    events: Vec<BattleEvent>,
    rewards: Option<Rewards>,
}

impl<'a, R: RandomSource> Battle<'a, R> {
    pub fn new(catalog: &'a Catalog, config: &'a BattleConfig, rng: R) -> Self {
        Self {
            catalog,
            config,
            rng,
            session: BattleSession {
                floor: 1,
                ..BattleSession::default()
            },
            player_turn_requested: false,
            pending_casts: Vec::new(),
            events: Vec::new(),
            rewards: None,
        }
    }

    // ===== accessors =====

    pub fn session(&self) -> &BattleSession {
        &self.session
    }

    pub fn phase(&self) -> BattlePhase {
        self.session.phase
    }

    pub fn round(&self) -> u32 {
        self.session.round_count
    }

    pub fn allies(&self) -> &[Battler] {
        &self.session.allies
    }

    pub fn enemies(&self) -> &[Battler] {
        &self.session.enemies
    }

    pub fn battler(&self, id: BattlerId) -> Option<&Battler> {
        self.session.battler(id)
    }

    /// Direct access for scripted scenarios and presentation-driven edits.
    pub fn battler_mut(&mut self, id: BattlerId) -> Option<&mut Battler> {
        self.session.battler_mut(id)
    }

    pub fn rewards(&self) -> Option<&Rewards> {
        self.rewards.as_ref()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.session.phase {
            BattlePhase::Victory => Some(Outcome::Victory),
            BattlePhase::Defeat => Some(Outcome::Defeat),
            _ => None,
        }
    }

    /// Drains the accumulated notifications.
    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ends the battle, returning the allies and the random source.
    pub fn into_parts(self) -> (Vec<Battler>, R) {
        (self.session.allies, self.rng)
    }

    // ===== lifecycle =====

    /// Installs both rosters and resets counters and the queue.
    pub fn setup(&mut self, allies: Vec<Battler>, enemies: Vec<Battler>) {
        let floor = self.session.floor;
        self.session = BattleSession {
            allies,
            enemies,
            floor,
            ..BattleSession::default()
        };
        self.player_turn_requested = false;
        self.pending_casts.clear();
        self.rewards = None;
    }

    pub fn set_floor(&mut self, floor: u32) {
        self.session.floor = floor;
    }

    /// Generates a floor-scaled enemy roster from `table` and starts round 1.
    pub fn start_encounter(&mut self, table: &EncounterTable, floor: u32) -> Step {
        let species = table.roll(floor, &mut self.rng);
        let enemies = self.spawn_enemies(&species, table.scale_for(floor), table.enemy_level);
        self.begin(floor, enemies)
    }

    /// Starts round 1 against a fixed list of species at `floor` scaling.
    pub fn start_fixed_encounter(&mut self, species: &[&str], floor: u32) -> Step {
        let ids: Vec<String> = species.iter().map(|s| s.to_string()).collect();
        let scale = EncounterTable::default().scale_for(floor);
        let enemies = self.spawn_enemies(&ids, scale, 1);
        self.begin(floor, enemies)
    }

    fn spawn_enemies(&self, species: &[String], scale: f64, level: u32) -> Vec<Battler> {
        species
            .iter()
            .enumerate()
            .filter_map(|(i, id)| {
                self.catalog
                    .spawn(
                        BattlerId(ENEMY_ID_BASE + i as u32),
                        id,
                        BattlerKind::Enemy { scale },
                        level,
                        i as u8,
                        self.config,
                    )
                    .inspect_err(|err: &RegistryError| report(err))
                    .ok()
            })
            .collect()
    }

    fn begin(&mut self, floor: u32, enemies: Vec<Battler>) -> Step {
        if enemies.is_empty() {
            tracing::warn!(floor, "encounter has no enemies");
            return Step::NoEncounter;
        }
        let allies = std::mem::take(&mut self.session.allies);
        self.session.floor = floor;
        self.setup(allies, enemies);
        for ally in &mut self.session.allies {
            ally.reset_battle_state();
        }
        self.events.push(BattleEvent::EncounterStarted {
            floor,
            enemies: self.session.enemies.iter().map(|b| b.id).collect(),
        });
        self.next_round()
    }

    /// Replaces the ally roster before an encounter starts.
    pub fn set_allies(&mut self, allies: Vec<Battler>) {
        self.session.allies = allies;
    }

    /// Asks for a manual turn; honoured at the next round boundary.
    pub fn request_player_turn(&mut self) {
        self.player_turn_requested = true;
    }

    /// Leaves `PlayerInput` and continues the round automatically.
    pub fn resume_auto(&mut self) -> Step {
        self.player_turn_requested = false;
        if self.session.phase != BattlePhase::PlayerInput {
            return self.advance();
        }
        self.build_turn_queue();
        self.session.phase = BattlePhase::TurnProcessing;
        Step::RoundStarted(self.session.round_count)
    }

    /// Single stepping entry point.
    pub fn advance(&mut self) -> Step {
        match self.session.phase {
            BattlePhase::Init => self.next_round(),
            BattlePhase::RoundStart | BattlePhase::TurnProcessing => {
                if self.session.round_exhausted() {
                    return self.next_round();
                }
                match self.process_next_turn() {
                    Step::RoundComplete => self.next_round(),
                    step => step,
                }
            }
            BattlePhase::PlayerInput => Step::AwaitingInput,
            BattlePhase::Victory => Step::Finished(Outcome::Victory),
            BattlePhase::Defeat => Step::Finished(Outcome::Defeat),
        }
    }

    /// Steps until the battle ends, pauses for input, or `max_rounds` pass.
    pub fn run(&mut self, max_rounds: u32) -> Step {
        loop {
            let step = self.advance();
            match step {
                Step::Finished(_) | Step::AwaitingInput | Step::NoEncounter => return step,
                Step::RoundStarted(round) if round > max_rounds => return step,
                _ => {}
            }
        }
    }

    /// Opens a new round.
    pub fn next_round(&mut self) -> Step {
        if let Some(outcome) = self.outcome() {
            return Step::Finished(outcome);
        }
        if self.session.round_count == 0 && self.session.enemies.is_empty() {
            return Step::NoEncounter;
        }
        self.session.round_count += 1;
        self.session.phase = BattlePhase::RoundStart;
        let round = self.session.round_count;
        tracing::debug!(round, "round start");
        self.events.push(BattleEvent::RoundStarted { round });

        if self.session.is_wiped(Side::Ally) {
            return self.end(false);
        }
        if self.session.is_wiped(Side::Enemy) {
            return self.end(true);
        }

        for b in self
            .session
            .allies
            .iter_mut()
            .chain(self.session.enemies.iter_mut())
        {
            b.remove_state(GUARDING);
        }

        if self.player_turn_requested {
            self.session.phase = BattlePhase::PlayerInput;
            self.events.push(BattleEvent::PlayerInputRequested { round });
            return Step::AwaitingInput;
        }

        self.build_turn_queue();
        self.session.phase = BattlePhase::TurnProcessing;
        Step::RoundStarted(round)
    }

    /// Living battlers by descending speed, ties broken randomly.
    fn build_turn_queue(&mut self) {
        let mut entries: Vec<(BattlerId, i32, f64)> = self
            .session
            .allies
            .iter()
            .chain(&self.session.enemies)
            .filter(|b| b.is_alive())
            .map(|b| (b.id, self.catalog.sheet(b, self.config).speed, 0.0))
            .collect();
        for entry in &mut entries {
            entry.2 = self.rng.next_f64();
        }
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.total_cmp(&b.2)));

        self.session.turn_queue = entries.into_iter().map(|(id, _, _)| id).collect();
        self.session.turn_index = 0;
    }

    /// Runs the next living battler's turn.
    pub fn process_next_turn(&mut self) -> Step {
        match self.session.phase {
            BattlePhase::TurnProcessing | BattlePhase::RoundStart => {}
            BattlePhase::PlayerInput => return Step::AwaitingInput,
            BattlePhase::Init => return self.next_round(),
            BattlePhase::Victory => return Step::Finished(Outcome::Victory),
            BattlePhase::Defeat => return Step::Finished(Outcome::Defeat),
        }

        while let Some(&id) = self.session.turn_queue.get(self.session.turn_index) {
            self.session.turn_index += 1;
            if !self.battler(id).is_some_and(Battler::is_alive) {
                continue;
            }
            self.take_turn(id);
            if self.session.is_wiped(Side::Ally) || self.session.is_wiped(Side::Enemy) {
                self.session.turn_index = self.session.turn_queue.len();
            }
            return Step::TurnTaken(id);
        }
        Step::RoundComplete
    }

    fn take_turn(&mut self, id: BattlerId) {
        let Some(side) = self.session.side_of(id) else {
            return;
        };
        self.events.push(BattleEvent::TurnStarted { unit: id });
        self.turn_start_triggers(id);
        if !self.battler(id).is_some_and(Battler::is_alive) {
            return;
        }

        let action = ai::choose_action(
            self.catalog,
            self.config,
            &self.session,
            id,
            &mut self.rng,
        );
        let Some(subject) = self.session.battler(id) else {
            return;
        };
        let friends = self.session.living(side);
        let foes = self.session.living(side.opposite());
        let targets = select_targets(action.def.target(), subject, &friends, &foes, &mut self.rng);

        tracing::debug!(unit = %id, action = action.id(), targets = targets.len(), "turn");
        self.events.push(BattleEvent::ActionChosen {
            unit: id,
            action: action.id().to_owned(),
            targets: targets.clone(),
        });

        if targets.is_empty() {
            report(&TargetError::NoTargets {
                action: action.id().to_owned(),
                subject: id,
                rule: action.def.target(),
            });
            return;
        }

        self.execute(id, &action.def, &targets);
        self.flush_death_casts();
    }

    /// Resolves `action` by `user` against each target and applies the results.
    fn execute(&mut self, user: BattlerId, action: &crate::action::ActionDef, targets: &[BattlerId]) {
        let Some(subject) = self.session.battler(user).cloned() else {
            return;
        };
        let resolver = ActionResolver::new(self.catalog, self.config, &subject, action);
        for &target_id in targets {
            let Some(target) = self.session.battler(target_id).cloned() else {
                continue;
            };
            let results = resolver.apply(&target, &mut self.rng);
            for result in &results {
                self.apply_result(user, result);
            }
        }
    }

    /// Swaps the formation slots `a` and `b` on `side`.
    pub fn swap_slots(&mut self, side: Side, a: u8, b: u8) {
        for battler in self.session.roster_mut(side) {
            if battler.slot_index == a {
                battler.slot_index = b;
            } else if battler.slot_index == b {
                battler.slot_index = a;
            }
        }
    }

    /// Ends the battle. Later calls are no-ops returning the first outcome.
    pub fn end(&mut self, win: bool) -> Step {
        if let Some(outcome) = self.outcome() {
            return Step::Finished(outcome);
        }
        let outcome = if win {
            Outcome::Victory
        } else {
            Outcome::Defeat
        };
        self.session.phase = if win {
            BattlePhase::Victory
        } else {
            BattlePhase::Defeat
        };
        self.session.turn_index = self.session.turn_queue.len();

        if win {
            self.rewards = Some(self.grant_rewards());
        }
        for b in self
            .session
            .allies
            .iter_mut()
            .chain(self.session.enemies.iter_mut())
        {
            b.reset_battle_state();
        }

        tracing::debug!(%outcome, round = self.session.round_count, "battle ended");
        self.events.push(BattleEvent::BattleEnded {
            outcome,
            rewards: self.rewards.clone(),
        });
        Step::Finished(outcome)
    }

    fn grant_rewards(&mut self) -> Rewards {
        let enemy_count = self.session.enemies.len() as u32;
        let (gold, exp) = victory_payout(self.config, enemy_count, self.session.floor);

        let mut allies = Vec::with_capacity(self.session.allies.len());
        for ally in &mut self.session.allies {
            let rate = self.catalog.sheet(ally, self.config).xp_rate;
            let gained = (f64::from(exp) * (1.0 + rate)).round().max(0.0) as u32;
            let level_ups = gain_exp(self.catalog, self.config, ally, gained);
            for level_up in &level_ups {
                self.events.push(BattleEvent::LevelUp {
                    unit: ally.id,
                    level_up: level_up.clone(),
                });
            }
            allies.push(AllyReward {
                unit: ally.id,
                exp: gained,
                level_ups,
            });
        }

        for ally in self.session.allies.iter_mut().filter(|b| b.is_alive()) {
            let mhp = self.catalog.sheet(ally, self.config).mhp;
            let heal = (f64::from(mhp) * self.config.post_battle_heal_ratio).floor() as i32;
            ally.change_hp(heal, mhp);
        }

        self.battle_end_triggers();
        Rewards { gold, exp, allies }
    }
}
