use glam::Vec2;

use spellcast::hud::HudSnapshot;
use spellcast::landmarks::{FrameDetections, HandLabel};
use spellcast::playtest::{pushed_hand, resting_hand};
use spellcast::{Game, GameConfig, SessionSnapshot};

#[test]
fn snapshot_round_trip_preserves_state() {
    let mut game = Game::new(GameConfig::default());
    game.start(0.0, Ok(())).expect("start");
    for i in 1..=90 {
        let now_ms = i as f64 * 16.0;
        let hand = if i % 30 == 0 {
            pushed_hand(HandLabel::Right, Vec2::ZERO)
        } else {
            resting_hand(HandLabel::Right, Vec2::ZERO)
        };
        game.tick(now_ms, Some(&FrameDetections::new(vec![hand])));
    }
    {
        let session = game.session_mut();
        let sim = session.config().simulation.clone();
        session.world.spawn_boss(2, &sim);
    }

    let state = game.session().snapshot();
    let json = serde_json::to_string(&state).expect("serialize snapshot");
    let restored: SessionSnapshot = serde_json::from_str(&json).expect("deserialize snapshot");

    assert_eq!(restored.combat.score, state.combat.score);
    assert_eq!(restored.progression, state.progression);
    assert_eq!(restored.monsters.len(), state.monsters.len());
    assert_eq!(restored.boss.as_ref().map(|b| b.max_hp), Some(32));
    assert_eq!(restored.particle_count, state.particle_count);
}

#[test]
fn hud_snapshot_serializes_for_frontends() {
    let game = Game::new(GameConfig::default());
    let hud: HudSnapshot = game.hud();
    let value = serde_json::to_value(&hud).expect("serialize hud");
    assert_eq!(value["combo_label"], "x1.00");
    assert_eq!(value["hp"], 10);
    assert_eq!(value["hint"], "Ready");
    assert!(value["boss"].is_null());
}
