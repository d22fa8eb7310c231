use battle_core::{
    ActionDef, ActionResolver, BattleConfig, BattlerId, BattlerKind, Catalog, Element, SpeciesDef,
    ScriptedRng, exp_for_level, relation_rate,
};
use proptest::prelude::*;

fn element() -> impl Strategy<Value = Element> {
    prop_oneof![
        Just(Element::R),
        Just(Element::G),
        Just(Element::B),
        Just(Element::W),
        Just(Element::K),
    ]
}

fn catalog(base_hp: f64, hp_growth: f64) -> Catalog {
    let mut catalog = Catalog::new();
    catalog
        .species
        .register(SpeciesDef::new("subject").with_hp(base_hp, hp_growth));
    catalog
}

proptest! {
    #[test]
    fn max_hp_never_drops_with_level(
        base_hp in 1.0f64..500.0,
        hp_growth in 0.0f64..2.0,
        level in 1u32..98,
    ) {
        let catalog = catalog(base_hp, hp_growth);
        let config = BattleConfig::default();
        let spawn = |level| {
            catalog
                .spawn(BattlerId(1), "subject", BattlerKind::Actor { equipment: None }, level, 0, &config)
                .unwrap()
        };
        let lower = catalog.sheet(&spawn(level), &config).mhp;
        let higher = catalog.sheet(&spawn(level + 1), &config).mhp;
        prop_assert!(higher >= lower);
    }

    #[test]
    fn exp_thresholds_strictly_increase(curve in 1.0f64..50.0, level in 1u32..98) {
        prop_assert!(exp_for_level(curve, level + 1) > exp_for_level(curve, level));
    }

    #[test]
    fn resolving_twice_yields_the_same_definition(hp in 1.0f64..100.0, depth in 1usize..6) {
        let mut catalog = Catalog::new();
        catalog.species.register(SpeciesDef::new("root").with_hp(hp, 0.0));
        let mut parent = "root".to_string();
        for i in 0..depth {
            let id = format!("gen{i}");
            catalog.species.register(SpeciesDef::new(&id).with_parent(&parent));
            parent = id;
        }

        let first = catalog.species.get(&parent).unwrap();
        let second = catalog.species.get(&parent).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.base_hp, Some(hp));
    }

    #[test]
    fn hit_at_or_below_evasion_always_misses(
        hit in 0.0f64..1.0,
        gap in 0.0f64..0.5,
        roll in 0.0f64..1.0,
    ) {
        let catalog = catalog(50.0, 0.0);
        let config = BattleConfig {
            base_hit: hit,
            base_eva: hit + gap,
            ..BattleConfig::default()
        };
        let spawn = |id| {
            catalog
                .spawn(BattlerId(id), "subject", BattlerKind::Enemy { scale: 1.0 }, 1, 0, &config)
                .unwrap()
        };
        let (user, target) = (spawn(1), spawn(2));
        let attack = ActionDef::basic_attack();

        let results = ActionResolver::new(&catalog, &config, &user, &attack)
            .apply(&target, &mut ScriptedRng::constant(roll));
        prop_assert_eq!(results.len(), 1);
        prop_assert!(results[0].is_miss);
    }

    #[test]
    fn element_relations_are_asymmetric(attack in element(), defender in element()) {
        let forward = relation_rate(attack, &[defender]);
        let backward = relation_rate(defender, &[attack]);
        if attack == defender {
            prop_assert_eq!(forward, 0.75);
        } else if forward == 1.25 {
            prop_assert_eq!(backward, 0.75);
        } else if forward == 1.0 {
            prop_assert_eq!(backward, 1.0);
        }
        prop_assert!([0.75, 1.0, 1.25].contains(&forward));
    }
}
