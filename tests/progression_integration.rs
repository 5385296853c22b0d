//! Experience and leveling through the public engine API

use arena_duel::combat::{BaseStats, CombatStats};
use arena_duel::core::config::{ArenaConfig, ProgressionConfig};
use arena_duel::progression::{MemoryProfileStore, Profile, ProfileStore, ProgressionEngine, StatUpgrade};

#[test]
fn test_grant_250_from_fresh_profile() {
    let config = ProgressionConfig {
        base_xp_to_next: 100,
        xp_growth: 1.5,
        health_per_level: 10.0,
        ..ProgressionConfig::default()
    };
    let mut engine = ProgressionEngine::new(MemoryProfileStore::new(), config, 99);

    let award = engine.grant_xp("squire", 250).unwrap().unwrap();

    assert_eq!(award.level_before, 1);
    assert_eq!(award.level_after, 3);
    let profile = engine.store().get("squire").unwrap();
    assert_eq!((profile.level, profile.xp, profile.xp_to_next), (3, 0, 225));
    assert_eq!(engine.store().saves, 1);
}

#[test]
fn test_noop_grants_leave_existing_profile_untouched() {
    let mut existing = Profile::new_default();
    existing.xp = 30;
    let store = MemoryProfileStore::new().with_profile("squire", existing.clone());
    let mut engine = ProgressionEngine::new(store, ProgressionConfig::default(), 1);

    assert!(engine.grant_xp("squire", 0).unwrap().is_none());
    assert!(engine.grant_xp("", 100).unwrap().is_none());

    assert_eq!(engine.store().load_profile("squire"), Some(existing));
    assert_eq!(engine.store().saves, 0);
}

#[test]
fn test_upgrades_feed_effective_stats() {
    let mut engine = ProgressionEngine::new(MemoryProfileStore::new(), ProgressionConfig::default(), 4);
    let award = engine.grant_xp("squire", 10_000).unwrap().unwrap();
    let profile = engine.load_or_create("squire");

    let count = |kind: StatUpgrade| award.upgrades.iter().filter(|u| **u == kind).count() as f32;
    let config = engine.config();
    assert!((profile.bonus_health - count(StatUpgrade::Health) * config.health_per_level).abs() < 0.001);
    assert!((profile.bonus_damage - count(StatUpgrade::Damage) * config.damage_per_level).abs() < 0.001);
    assert!((profile.bonus_speed - count(StatUpgrade::Speed) * config.speed_per_level).abs() < 0.001);

    let base = BaseStats::default();
    let stats = CombatStats::assemble(&base, &profile);
    assert_eq!(stats.max_health, base.max_health + profile.bonus_health);
    assert_eq!(stats.attack_damage, base.attack_damage + profile.bonus_damage);
}

#[test]
fn test_progression_section_from_toml() {
    let config = ArenaConfig::from_toml_str(
        r#"
        [progression]
        base_xp_to_next = 50
        xp_growth = 2.0
        "#,
    )
    .unwrap();
    let mut engine = ProgressionEngine::new(MemoryProfileStore::new(), config.progression, 0);

    engine.grant_xp("squire", 50).unwrap();
    let profile = engine.store().get("squire").unwrap();
    assert_eq!(profile.level, 2);
    assert_eq!(profile.xp_to_next, 100);
}
