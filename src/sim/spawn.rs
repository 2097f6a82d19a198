//! Spawn policy
//!
//! Walks the level's obstacle sequence as the world scrolls, activates the
//! boss once the run is long enough, and releases power-ups from bonus blocks.

use glam::Vec2;
use rand::Rng;

use super::geometry::Rect;
use super::state::{ObstacleKind, World};
use crate::consts::*;
use crate::level::LevelConfig;
use crate::tuning::DifficultyTuning;

/// Power-up launch velocity out of a bonus block (forward and up)
pub const POWERUP_LAUNCH: Vec2 = Vec2::new(2.0, -8.0);
pub const POWERUP_SIZE: f32 = 30.0;

/// Size and placement of a freshly spawned obstacle at `x`
///
/// Returns `None` for gaps, which take up space but never exist as entities.
pub fn obstacle_rect(kind: ObstacleKind, x: f32, rng: &mut impl Rng) -> Option<Rect> {
    let on_ground = |w: f32, h: f32| Rect::new(x, GROUND_Y - h, w, h);

    let rect = match kind {
        ObstacleKind::Pipe => {
            let h = 60.0 + rng.random_range(0.0..60.0);
            on_ground(60.0, h)
        }
        ObstacleKind::Block | ObstacleKind::QuestionBlock => {
            let lane = if rng.random_bool(0.4) { 110.0 } else { 170.0 };
            Rect::new(x, GROUND_Y - lane, 40.0, 40.0)
        }
        ObstacleKind::Goomba => on_ground(40.0, 40.0),
        ObstacleKind::Shell => on_ground(40.0, 30.0),
        ObstacleKind::Coin => {
            let lift = if rng.random_bool(0.5) { 0.0 } else { 80.0 };
            Rect::new(x, GROUND_Y - 30.0 - lift, 30.0, 30.0)
        }
        ObstacleKind::FireFlower => on_ground(POWERUP_SIZE, POWERUP_SIZE),
        ObstacleKind::Piranha => on_ground(40.0, 60.0),
        ObstacleKind::Gap => return None,
    };
    Some(rect)
}

/// Run the spawn policy for one frame
pub fn run_spawn_policy(world: &mut World, level: Option<&LevelConfig>, tuning: &DifficultyTuning) {
    if world.distance > BOSS_SPAWN_DISTANCE && !world.boss.active && !world.boss.defeated {
        activate_boss(world);
    }

    // No ordinary spawns during the fight
    if world.boss.active {
        return;
    }

    if world.distance < world.gap_until {
        return;
    }

    let spacing = tuning.min_spacing(world.game_speed);
    let ready = match world.obstacles.last() {
        None => true,
        Some(last) => CANVAS_WIDTH - last.rect.x > spacing,
    };
    if ready {
        if let Some(level) = level {
            spawn_next_obstacle(world, level, spacing);
        }
    }
}

fn activate_boss(world: &mut World) {
    let boss = &mut world.boss;
    boss.active = true;
    boss.rect.x = BOSS_ENTRY_X;
    boss.rect.y = BOSS_ENTRY_Y;
    log::info!("Boss activated at distance {:.0}", world.distance);
    world.announce("Warning! Boss approaching!");

    // Guarantee the fight is winnable
    if !world.player.has_fire_power {
        let rect = Rect::new(
            CANVAS_WIDTH - 150.0,
            GROUND_Y - POWERUP_SIZE,
            POWERUP_SIZE,
            POWERUP_SIZE,
        );
        world.spawn_obstacle(ObstacleKind::FireFlower, rect, Vec2::ZERO);
    }
}

/// Consume the next token of the level's cyclic sequence
fn spawn_next_obstacle(world: &mut World, level: &LevelConfig, spacing: f32) {
    if level.obstacles.is_empty() {
        return;
    }
    let kind = level.obstacles[world.next_obstacle_index % level.obstacles.len()];
    world.next_obstacle_index += 1;

    match obstacle_rect(kind, SPAWN_X, &mut world.rng) {
        Some(rect) => world.spawn_obstacle(kind, rect, Vec2::ZERO),
        None => world.gap_until = world.distance + spacing,
    }
}

/// Trigger a bonus block: mark it used and pop a power-up out of its top
///
/// Returns false if the obstacle is not an unused bonus block.
pub fn activate_block(world: &mut World, index: usize) -> bool {
    let Some(block) = world.obstacles.get_mut(index) else {
        return false;
    };
    if block.kind != ObstacleKind::QuestionBlock || block.is_used {
        return false;
    }
    block.is_used = true;

    let rect = Rect::new(
        block.rect.x,
        block.rect.y - POWERUP_SIZE,
        POWERUP_SIZE,
        POWERUP_SIZE,
    );
    log::debug!("Bonus block {} released a power-up", block.id);
    world.spawn_obstacle(ObstacleKind::FireFlower, rect, POWERUP_LAUNCH);
    true
}

/// Activate the unused bonus block under a pointer position
pub fn activate_block_at(world: &mut World, x: f32, y: f32) -> bool {
    let hit = world.obstacles.iter().position(|o| {
        o.kind == ObstacleKind::QuestionBlock && !o.is_used && o.rect.contains(x, y)
    });
    match hit {
        Some(index) => activate_block(world, index),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelConfig;
    use crate::tuning::{Difficulty, Theme};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn level(obstacles: Vec<ObstacleKind>) -> LevelConfig {
        LevelConfig {
            id: "test".into(),
            name: "Test".into(),
            difficulty: Difficulty::Medium,
            description: String::new(),
            theme: Theme::Overworld,
            obstacles,
        }
    }

    #[test]
    fn test_every_kind_has_a_placement() {
        let mut rng = Pcg32::seed_from_u64(7);
        for kind in ObstacleKind::ALL {
            let rect = obstacle_rect(kind, SPAWN_X, &mut rng);
            match kind {
                ObstacleKind::Gap => assert!(rect.is_none()),
                _ => {
                    let rect = rect.unwrap();
                    assert!(rect.bottom() <= GROUND_Y, "{kind:?} sinks below ground");
                    assert_eq!(rect.x, SPAWN_X);
                }
            }
        }
    }

    #[test]
    fn test_pipe_height_range() {
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            let rect = obstacle_rect(ObstacleKind::Pipe, 0.0, &mut rng).unwrap();
            assert!(rect.height >= 60.0 && rect.height < 120.0);
            assert_eq!(rect.bottom(), GROUND_Y);
        }
    }

    #[test]
    fn test_spawns_when_empty_and_cycles_sequence() {
        let mut world = World::new(1);
        let level = level(vec![ObstacleKind::Coin, ObstacleKind::Pipe]);
        let tuning = Difficulty::Medium.tuning();

        run_spawn_policy(&mut world, Some(&level), &tuning);
        assert_eq!(world.obstacles.len(), 1);
        assert_eq!(world.obstacles[0].kind, ObstacleKind::Coin);

        // Tail still too close to the right edge
        run_spawn_policy(&mut world, Some(&level), &tuning);
        assert_eq!(world.obstacles.len(), 1);

        world.obstacles[0].rect.x = 0.0;
        run_spawn_policy(&mut world, Some(&level), &tuning);
        assert_eq!(world.obstacles[1].kind, ObstacleKind::Pipe);

        world.obstacles[1].rect.x = 0.0;
        run_spawn_policy(&mut world, Some(&level), &tuning);
        assert_eq!(world.obstacles[2].kind, ObstacleKind::Coin);
        assert_eq!(world.next_obstacle_index, 3);
    }

    #[test]
    fn test_gap_consumes_slot_and_space() {
        let mut world = World::new(1);
        let level = level(vec![ObstacleKind::Gap, ObstacleKind::Coin]);
        let tuning = Difficulty::Medium.tuning();

        run_spawn_policy(&mut world, Some(&level), &tuning);
        assert!(world.obstacles.is_empty());
        assert_eq!(world.next_obstacle_index, 1);
        assert!(world.gap_until > world.distance);

        // Held back until the world scrolls past the gap
        run_spawn_policy(&mut world, Some(&level), &tuning);
        assert!(world.obstacles.is_empty());

        world.distance = world.gap_until;
        run_spawn_policy(&mut world, Some(&level), &tuning);
        assert_eq!(world.obstacles.len(), 1);
    }

    #[test]
    fn test_empty_sequence_spawns_nothing() {
        let mut world = World::new(1);
        run_spawn_policy(&mut world, Some(&level(vec![])), &Difficulty::Easy.tuning());
        run_spawn_policy(&mut world, None, &Difficulty::Easy.tuning());
        assert!(world.obstacles.is_empty());
    }

    #[test]
    fn test_boss_activation_injects_powerup() {
        let mut world = World::new(1);
        world.distance = BOSS_SPAWN_DISTANCE + 1.0;
        let level = level(vec![ObstacleKind::Pipe]);
        run_spawn_policy(&mut world, Some(&level), &Difficulty::Medium.tuning());

        assert!(world.boss.active);
        assert_eq!(world.obstacles.len(), 1);
        assert_eq!(world.obstacles[0].kind, ObstacleKind::FireFlower);
        assert!(
            world
                .events
                .iter()
                .any(|e| matches!(e, crate::sim::GameEvent::Announce(m) if m.contains("Boss")))
        );

        // Ordinary spawning is suspended
        world.obstacles[0].rect.x = 0.0;
        run_spawn_policy(&mut world, Some(&level), &Difficulty::Medium.tuning());
        assert_eq!(world.obstacles.len(), 1);
    }

    #[test]
    fn test_no_powerup_when_already_armed() {
        let mut world = World::new(1);
        world.player.has_fire_power = true;
        world.distance = BOSS_SPAWN_DISTANCE + 1.0;
        run_spawn_policy(&mut world, None, &Difficulty::Medium.tuning());
        assert!(world.boss.active);
        assert!(world.obstacles.is_empty());
    }

    #[test]
    fn test_defeated_boss_never_returns() {
        let mut world = World::new(1);
        world.boss.defeated = true;
        world.distance = BOSS_SPAWN_DISTANCE * 2.0;
        run_spawn_policy(&mut world, None, &Difficulty::Medium.tuning());
        assert!(!world.boss.active);
    }

    #[test]
    fn test_bonus_block_activates_once() {
        let mut world = World::new(1);
        world.spawn_obstacle(
            ObstacleKind::QuestionBlock,
            Rect::new(300.0, 350.0, 40.0, 40.0),
            Vec2::ZERO,
        );

        assert!(activate_block_at(&mut world, 320.0, 370.0));
        assert!(world.obstacles[0].is_used);
        assert_eq!(world.obstacles.len(), 2);
        let powerup = &world.obstacles[1];
        assert_eq!(powerup.kind, ObstacleKind::FireFlower);
        assert_eq!(powerup.rect.bottom(), 350.0);
        assert_eq!(powerup.vel, POWERUP_LAUNCH);

        assert!(!activate_block_at(&mut world, 320.0, 370.0));
        assert_eq!(world.obstacles.len(), 2);
    }

    #[test]
    fn test_plain_block_ignores_clicks() {
        let mut world = World::new(1);
        world.spawn_obstacle(ObstacleKind::Block, Rect::new(300.0, 350.0, 40.0, 40.0), Vec2::ZERO);
        assert!(!activate_block_at(&mut world, 320.0, 370.0));
        assert!(!activate_block(&mut world, 5));
    }
}
