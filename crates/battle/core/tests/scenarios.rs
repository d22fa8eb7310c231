use battle_core::{
    ActionCategory, ActionDef, ActionResolver, Battle, BattleConfig, BattleEvent, BattlePhase,
    BattlerId, BattlerKind, Catalog, EffectDef, EffectKind, EncounterTable, EquipmentDef, GUARDING,
    Outcome, ScriptedRng, Side, SpeciesDef, Step, TargetRule, Temperament, Trait, TraitCode,
    gain_exp,
};

const HERO: BattlerId = BattlerId(1);
const FIRST_ENEMY: BattlerId = BattlerId(1000);

fn species(id: &str, hp: f64, agi: f64, acts: &[&str]) -> SpeciesDef {
    let mut def = SpeciesDef::new(id).with_hp(hp, 0.0).with_acts(acts, &[]);
    def.agi = Some(agi);
    def
}

fn catalog() -> Catalog {
    let mut catalog = Catalog::new();
    catalog.skills.register(ActionDef::basic_attack());
    catalog.skills.register(
        ActionDef::new("smash")
            .with_target(TargetRule::EnemyAll)
            .with_effect(EffectDef::new(EffectKind::HpDamage, "100")),
    );
    catalog.skills.register(
        ActionDef::new("crush").with_effect(EffectDef::new(EffectKind::HpDamage, "1000")),
    );
    catalog.skills.register(
        ActionDef::new("blast")
            .with_target(TargetRule::EnemyAll)
            .with_effect(EffectDef::new(EffectKind::HpDamage, "50")),
    );

    catalog.skills.register(
        ActionDef::new("sweep")
            .with_target(TargetRule::EnemyRow)
            .with_effect(EffectDef::new(EffectKind::HpDamage, "1")),
    );
    catalog.skills.register(
        ActionDef::new("cure")
            .with_category(ActionCategory::Heal)
            .with_target(TargetRule::AllySingle)
            .with_effect(EffectDef::new(EffectKind::HpHeal, "5")),
    );
    catalog.skills.register(
        ActionDef::new("wither")
            .with_effect(EffectDef::new(EffectKind::IncreaseMaxHp, "0 - 5"))
            .with_effect(EffectDef::new(EffectKind::IncreaseLevel, "0 - 3")),
    );

    catalog.species.register(species("hero", 50.0, 200.0, &["smash"]));
    catalog.species.register(species("sweeper", 50.0, 200.0, &["sweep"]));
    catalog.species.register(species("squire", 20.0, 1.0, &["attack"]));
    catalog.species.register(
        species("angel", 20.0, 300.0, &["attack"])
            .with_temperament(Temperament::Kind)
            .with_acts(&["attack"], &["cure"]),
    );
    catalog.species.register(species("slime", 1.0, 100.0, &["attack"]));
    catalog.species.register(species("brute", 1000.0, 200.0, &["crush"]));
    catalog.species.register(species("imp", 20.0, 200.0, &["crush"]));
    catalog.species.register(species("wall", 1000.0, 1.0, &["attack"]));
    catalog.species.register(
        species("stalwart", 10.0, 1.0, &["attack"]).with_trait(Trait::new(TraitCode::SurviveKo, 0.0)),
    );
    catalog.species.register(
        species("martyr", 10.0, 1.0, &["attack"])
            .with_trait(Trait::with_data(TraitCode::OnDeathCast, "blast", 0.0)),
    );
    catalog.equipment.register(
        EquipmentDef::new("phoenix_charm").with_trait(Trait::new(TraitCode::ReviveOnKo, 1.0)),
    );
    catalog
}

fn actor(catalog: &Catalog, config: &BattleConfig, species: &str) -> battle_core::Battler {
    catalog
        .spawn(HERO, species, BattlerKind::Actor { equipment: None }, 1, 0, config)
        .unwrap()
}

fn count(events: &[BattleEvent], pred: impl Fn(&BattleEvent) -> bool) -> usize {
    events.iter().filter(|e| pred(e)).count()
}

#[test]
fn level_one_basic_attack_deals_six() {
    let catalog = catalog();
    let config = BattleConfig::default().without_crits();
    let user = actor(&catalog, &config, "slime");
    let target = catalog
        .spawn(FIRST_ENEMY, "slime", BattlerKind::Enemy { scale: 1.0 }, 1, 0, &config)
        .unwrap();
    let attack = catalog.basic_attack();

    let results = ActionResolver::new(&catalog, &config, &user, &attack.def)
        .apply(&target, &mut ScriptedRng::constant(0.0));

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].value, 6);
    assert!(!results[0].is_crit);
}

#[test]
fn victory_pays_out_exactly_once() {
    let catalog = catalog();
    let config = BattleConfig::default().without_crits();
    let mut battle = Battle::new(&catalog, &config, ScriptedRng::constant(0.0));
    battle.set_allies(vec![actor(&catalog, &config, "hero")]);
    battle.start_fixed_encounter(&["slime", "slime"], 2);

    assert_eq!(battle.run(10), Step::Finished(Outcome::Victory));
    let rewards = battle.rewards().cloned().unwrap();
    assert_eq!(rewards.gold, 2 * 20 * 2);
    assert_eq!(rewards.exp, 2 * 5 * 2);
    assert_eq!(battle.battler(HERO).unwrap().exp, 20);

    assert_eq!(battle.end(true), Step::Finished(Outcome::Victory));
    assert_eq!(battle.end(false), Step::Finished(Outcome::Victory));
    assert_eq!(battle.battler(HERO).unwrap().exp, 20);

    let events = battle.take_events();
    assert_eq!(
        count(&events, |e| matches!(e, BattleEvent::BattleEnded { .. })),
        1
    );
    assert_eq!(battle.phase(), BattlePhase::Victory);
}

#[test]
fn cyclic_species_still_resolve() {
    let mut catalog = Catalog::new();
    catalog
        .species
        .register(SpeciesDef::new("base").with_parent("child").with_hp(30.0, 0.0));
    catalog.species.register(SpeciesDef::new("child").with_parent("base"));

    let child = catalog.species.get("child").unwrap();
    assert_eq!(child.id, "child");
    assert!(catalog.species.get("base").is_some());
}

#[test]
fn hundred_exp_levels_up_and_restores() {
    let mut catalog = catalog();
    let mut squire = SpeciesDef::new("squire").with_hp(20.0, 0.2).with_xp_curve(10.0);
    squire.base_mp = Some(8.0);
    catalog.species.register(squire);
    let config = BattleConfig::default();
    let mut battler = actor(&catalog, &config, "squire");
    battler.set_hp(1, 20);
    battler.set_mp(0, 8);

    gain_exp(&catalog, &config, &mut battler, 100);

    let sheet = catalog.sheet(&battler, &config);
    assert_eq!(battler.level, 2);
    assert_eq!(battler.hp(), sheet.mhp);
    assert_eq!(battler.mp(), sheet.mmp);
}

#[test]
fn guard_wears_off_at_next_round() {
    let catalog = catalog();
    let config = BattleConfig::default().without_crits();
    let mut battle = Battle::new(&catalog, &config, ScriptedRng::constant(0.0));
    battle.set_allies(vec![actor(&catalog, &config, "wall")]);
    battle.start_fixed_encounter(&["wall"], 1);
    battle.battler_mut(HERO).unwrap().add_state(GUARDING);

    loop {
        if let Step::RoundStarted(2) = battle.advance() {
            break;
        }
    }
    assert!(!battle.battler(HERO).unwrap().is_guarding());
}

#[test]
fn survive_ko_triggers_once_per_battle() {
    let catalog = catalog();
    let config = BattleConfig::default().without_crits();
    let mut battle = Battle::new(&catalog, &config, ScriptedRng::constant(0.0));
    battle.set_allies(vec![actor(&catalog, &config, "stalwart")]);
    battle.start_fixed_encounter(&["brute"], 1);

    assert_eq!(battle.advance(), Step::TurnTaken(FIRST_ENEMY));
    assert_eq!(battle.battler(HERO).unwrap().hp(), 1);

    assert_eq!(battle.run(10), Step::Finished(Outcome::Defeat));
    let events = battle.take_events();
    assert_eq!(
        count(&events, |e| matches!(e, BattleEvent::UnitSurvived { unit } if *unit == HERO)),
        1
    );
    assert_eq!(
        count(&events, |e| matches!(e, BattleEvent::UnitDied { unit } if *unit == HERO)),
        1
    );
}

#[test]
fn revive_on_ko_breaks_the_equipment() {
    let catalog = catalog();
    let config = BattleConfig::default().without_crits();
    let mut hero = actor(&catalog, &config, "wall");
    hero.set_hp(5, 1000);
    hero.set_equipment(Some("phoenix_charm".into()));

    let mut battle = Battle::new(&catalog, &config, ScriptedRng::constant(0.0));
    battle.set_allies(vec![hero]);
    battle.start_fixed_encounter(&["brute"], 1);
    battle.take_events();

    assert_eq!(battle.advance(), Step::TurnTaken(FIRST_ENEMY));
    let hero = battle.battler(HERO).unwrap();
    assert_eq!(hero.hp(), 1000);
    assert_eq!(hero.equipment(), None);

    let events = battle.take_events();
    assert!(events.contains(&BattleEvent::EquipmentBroken {
        unit: HERO,
        item: "phoenix_charm".into(),
    }));
    assert!(events.contains(&BattleEvent::UnitRevived { unit: HERO, hp: 1000 }));
    assert_eq!(count(&events, |e| matches!(e, BattleEvent::UnitDied { .. })), 0);
}

#[test]
fn on_death_cast_hits_every_living_opponent() {
    let catalog = catalog();
    let config = BattleConfig::default().without_crits();
    let mut battle = Battle::new(&catalog, &config, ScriptedRng::constant(0.0));
    battle.set_allies(vec![actor(&catalog, &config, "martyr")]);
    battle.start_fixed_encounter(&["imp", "imp"], 1);

    assert_eq!(battle.advance(), Step::TurnTaken(FIRST_ENEMY));
    assert!(battle.enemies().iter().all(|b| !b.is_alive()));
    let events = battle.take_events();
    assert!(events.iter().any(|e| matches!(
        e,
        BattleEvent::TraitTriggered { unit, code: TraitCode::OnDeathCast, value: 2 } if *unit == HERO
    )));

    // Both sides are down; a wiped party is checked first.
    assert_eq!(battle.advance(), Step::Finished(Outcome::Defeat));
}

#[test]
fn player_turn_pauses_at_round_boundary() {
    let catalog = catalog();
    let config = BattleConfig::default().without_crits();
    let mut battle = Battle::new(&catalog, &config, ScriptedRng::constant(0.0));
    battle.set_allies(vec![actor(&catalog, &config, "wall")]);
    assert_eq!(battle.start_fixed_encounter(&["wall"], 1), Step::RoundStarted(1));

    battle.request_player_turn();
    assert_eq!(battle.phase(), BattlePhase::TurnProcessing);
    assert_eq!(battle.run(10), Step::AwaitingInput);
    assert_eq!(battle.phase(), BattlePhase::PlayerInput);
    assert_eq!(battle.round(), 2);
    assert_eq!(battle.advance(), Step::AwaitingInput);

    assert_eq!(battle.resume_auto(), Step::RoundStarted(2));
    assert_eq!(battle.phase(), BattlePhase::TurnProcessing);
    assert!(matches!(battle.advance(), Step::TurnTaken(_)));
    assert!(
        battle
            .take_events()
            .contains(&BattleEvent::PlayerInputRequested { round: 2 })
    );
}

#[test]
fn growth_effects_never_go_negative() {
    let catalog = catalog();
    let config = BattleConfig::default();
    let user = actor(&catalog, &config, "hero");
    let target = catalog
        .spawn(FIRST_ENEMY, "hero", BattlerKind::Enemy { scale: 1.0 }, 5, 0, &config)
        .unwrap();
    let wither = catalog.action("wither");

    let results = ActionResolver::new(&catalog, &config, &user, &wither.def)
        .apply(&target, &mut ScriptedRng::constant(0.0));

    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.value == 0));
}

#[test]
fn enemy_row_follows_swapped_slots() {
    let catalog = catalog();
    let config = BattleConfig::default().without_crits();
    let mut battle = Battle::new(&catalog, &config, ScriptedRng::constant(0.0));
    battle.set_allies(vec![actor(&catalog, &config, "sweeper")]);
    battle.start_fixed_encounter(&["wall", "wall"], 1);
    battle.swap_slots(Side::Enemy, 1, 4);
    battle.take_events();

    assert_eq!(battle.advance(), Step::TurnTaken(HERO));
    let events = battle.take_events();
    assert!(events.contains(&BattleEvent::ActionChosen {
        unit: HERO,
        action: "sweep".into(),
        targets: vec![FIRST_ENEMY],
    }));
    assert!(!battle.battler(BattlerId(1001)).unwrap().is_front_row());
}

/// Runs the angel's opening turn with its friend at `friend_hp` of 20.
fn kind_choice(friend_hp: i32) -> String {
    let catalog = catalog();
    let config = BattleConfig::default().without_crits();
    let angel = actor(&catalog, &config, "angel");
    let mut friend = catalog
        .spawn(BattlerId(2), "squire", BattlerKind::Actor { equipment: None }, 1, 1, &config)
        .unwrap();
    friend.set_hp(friend_hp, 20);

    let mut battle = Battle::new(&catalog, &config, ScriptedRng::constant(0.0));
    battle.set_allies(vec![angel, friend]);
    battle.start_fixed_encounter(&["wall"], 1);
    battle.take_events();

    assert_eq!(battle.advance(), Step::TurnTaken(HERO));
    battle
        .take_events()
        .into_iter()
        .find_map(|e| match e {
            BattleEvent::ActionChosen { action, .. } => Some(action),
            _ => None,
        })
        .unwrap()
}

#[test]
fn kind_heal_threshold_is_exclusive() {
    // 0.6 of 20 mhp.
    assert_eq!(kind_choice(12), "attack");
    assert_eq!(kind_choice(11), "cure");
}

#[test]
fn empty_encounter_roll_starts_nothing() {
    let catalog = catalog();
    let config = BattleConfig::default();
    let mut battle = Battle::new(&catalog, &config, ScriptedRng::constant(0.0));
    battle.set_allies(vec![actor(&catalog, &config, "hero")]);

    assert_eq!(
        battle.start_encounter(&EncounterTable::default(), 3),
        Step::NoEncounter
    );
    assert_eq!(battle.run(10), Step::NoEncounter);
    assert_eq!(battle.outcome(), None);
    assert!(battle.rewards().is_none());
    assert_eq!(battle.battler(HERO).unwrap().exp, 0);
}
