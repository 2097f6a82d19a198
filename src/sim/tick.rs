//! Per-frame simulation step
//!
//! Advances the world by one frame. Physics runs in per-frame units, so the
//! host must call this once per display refresh. Step order is fixed: each
//! stage reads the positions and flags written by the one before it.

use glam::Vec2;

use super::geometry::{Rect, check_collision, is_vertical_collision};
use super::pool::ObjectPool;
use super::spawn::{activate_block, run_spawn_policy};
use super::state::{Contact, GamePhase, Projectile, World};
use crate::consts::*;
use crate::level::LevelConfig;

/// Control state sampled for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Fast-fall while airborne
    pub down: bool,
    pub shoot: bool,
    /// Host timestamp in milliseconds, used by the fire cooldown
    pub now_ms: f64,
}

/// Advance the world by one frame
pub fn tick(world: &mut World, level: Option<&LevelConfig>, input: &TickInput) {
    if world.phase != GamePhase::Playing {
        return;
    }
    world.frame_count += 1;

    let tuning = level.map(|l| l.difficulty).unwrap_or_default().tuning();

    step_player(world, input);

    // The world stops scrolling for the boss encounter
    if !world.boss.active {
        world.game_speed = (world.game_speed + SPEED_INCREMENT).min(tuning.max_speed());
        world.distance += world.game_speed;
    }

    run_spawn_policy(world, level, &tuning);

    step_boss(world);
    step_obstacles(world);
    step_projectiles(world);

    resolve_collisions(world);
}

fn step_player(world: &mut World, input: &TickInput) {
    let (gravity, jump_force) = if world.boss.active {
        (
            GRAVITY * BOSS_PHASE_GRAVITY_SCALE,
            JUMP_FORCE * BOSS_PHASE_JUMP_SCALE,
        )
    } else {
        (GRAVITY, JUMP_FORCE)
    };

    let player = &mut world.player;
    if input.left {
        player.rect.x -= PLAYER_SPEED;
    }
    if input.right {
        player.rect.x += PLAYER_SPEED;
    }
    if input.jump && player.is_grounded {
        player.vy = jump_force;
        player.is_grounded = false;
        player.rotation = JUMP_ROTATION;
    }
    if input.down && !player.is_grounded {
        player.vy += FAST_FALL_BOOST;
    }

    player.rect.x = player.rect.x.clamp(0.0, CANVAS_WIDTH - player.rect.width);
    player.vy += gravity;
    player.rect.y += player.vy;

    let floor = GROUND_Y - player.rect.height;
    if player.rect.y > floor {
        player.rect.y = floor;
        player.vy = 0.0;
        player.is_grounded = true;
        player.rotation = 0.0;
    } else {
        player.is_grounded = false;
        player.rotation = (player.rotation + ROTATION_STEP).min(MAX_FALL_ROTATION);
    }

    if input.shoot {
        try_fire(world, input.now_ms);
    }
}

/// Spawn a fireball if the player is armed and the limiter allows it
fn try_fire(world: &mut World, now_ms: f64) {
    if !world.player.has_fire_power
        || world.projectiles.len() >= MAX_PLAYER_PROJECTILES
        || now_ms - world.last_shot_ms < FIRE_COOLDOWN_MS
    {
        return;
    }
    world.last_shot_ms = now_ms;

    let player = &world.player.rect;
    let rect = Rect::new(
        player.right(),
        player.center().y - PROJECTILE_SIZE / 2.0,
        PROJECTILE_SIZE,
        PROJECTILE_SIZE,
    );
    let shot = world.make_projectile(rect, Vec2::new(PROJECTILE_SPEED, PROJECTILE_INITIAL_VY));
    world.projectiles.push(shot);
}

fn step_boss(world: &mut World) {
    if !world.boss.active {
        return;
    }

    let boss = &mut world.boss;
    if boss.rect.x > BOSS_REST_X {
        boss.rect.x = (boss.rect.x - BOSS_DRIFT_SPEED).max(BOSS_REST_X);
    }

    boss.rect.y += boss.vy;
    if boss.rect.y < BOSS_MIN_Y {
        boss.rect.y = BOSS_MIN_Y;
        boss.vy = boss.vy.abs();
    } else if boss.rect.y > BOSS_MAX_Y {
        boss.rect.y = BOSS_MAX_Y;
        boss.vy = -boss.vy.abs();
    }

    boss.shoot_timer = boss.shoot_timer.saturating_sub(1);
    if boss.shoot_timer > 0 {
        return;
    }
    boss.shoot_timer = BOSS_SHOOT_INTERVAL;

    // Aim at where the player is now
    let origin = boss.rect.center();
    let target = world.player.rect.center();
    let mut dir = (target - origin).normalize_or_zero();
    if dir == Vec2::ZERO {
        dir = Vec2::NEG_X;
    }
    let rect = Rect::new(
        origin.x - BOSS_SHOT_SIZE / 2.0,
        origin.y - BOSS_SHOT_SIZE / 2.0,
        BOSS_SHOT_SIZE,
        BOSS_SHOT_SIZE,
    );
    let shot = world.make_projectile(rect, dir * BOSS_SHOT_SPEED);
    world.enemy_projectiles.push(shot);
}

fn step_obstacles(world: &mut World) {
    let scroll = if world.boss.active {
        0.0
    } else {
        world.game_speed
    };

    for i in 0..world.obstacles.len() {
        let obstacle = &mut world.obstacles[i];
        obstacle.rect.x -= scroll + obstacle.kind.creep_speed();
        if obstacle.is_launched() && !obstacle.passed {
            step_powerup(world, i);
        }
    }

    let mut i = 0;
    while i < world.obstacles.len() {
        if world.obstacles[i].rect.right() < -CULL_MARGIN {
            let obstacle = world.obstacles.remove(i);
            world.obstacle_pool.release(obstacle);
        } else {
            i += 1;
        }
    }
}

/// Local gravity, ground bounce and wall bounce for a launched power-up
fn step_powerup(world: &mut World, index: usize) {
    {
        let powerup = &mut world.obstacles[index];
        powerup.vel.y += GRAVITY;
        powerup.rect.x += powerup.vel.x;
        powerup.rect.y += powerup.vel.y;

        if powerup.rect.bottom() > GROUND_Y {
            powerup.rect.y = GROUND_Y - powerup.rect.height;
            powerup.vel.y = if powerup.vel.y < 1.0 {
                0.0
            } else {
                -powerup.vel.y * 0.5
            };
        }
    }

    for j in 0..world.obstacles.len() {
        if j == index {
            continue;
        }
        let solid = &world.obstacles[j];
        if solid.passed || !solid.kind.is_solid() {
            continue;
        }
        let solid = solid.rect;

        let powerup = &mut world.obstacles[index];
        if !check_collision(&powerup.rect, &solid, 0.0) {
            continue;
        }
        if is_vertical_collision(&powerup.rect, &solid) && powerup.vel.y >= 0.0 {
            powerup.rect.y = solid.y - powerup.rect.height;
            powerup.vel.y = 0.0;
        } else {
            powerup.vel.x = -powerup.vel.x;
            if powerup.rect.center().x < solid.center().x {
                powerup.rect.x = solid.x - powerup.rect.width;
            } else {
                powerup.rect.x = solid.right();
            }
        }
    }
}

fn step_projectiles(world: &mut World) {
    for shot in &mut world.projectiles {
        shot.rect.x += shot.vel.x;
        shot.rect.y += shot.vel.y;
        shot.vel.y += GRAVITY;
        if shot.rect.bottom() > GROUND_Y {
            shot.rect.y = GROUND_Y - shot.rect.height;
            shot.vel.y = PROJECTILE_BOUNCE_VY;
        }
    }
    release_where(&mut world.projectiles, &mut world.projectile_pool, |p| {
        p.rect.x > CANVAS_WIDTH + CULL_MARGIN
    });

    for shot in &mut world.enemy_projectiles {
        shot.rect.x += shot.vel.x;
        shot.rect.y += shot.vel.y;
    }
    release_where(
        &mut world.enemy_projectiles,
        &mut world.projectile_pool,
        // Only shots past an edge and still heading away; the boss can fire
        // from beyond the right edge
        |p| {
            (p.rect.right() < -CULL_MARGIN && p.vel.x <= 0.0)
                || (p.rect.x > CANVAS_WIDTH + CULL_MARGIN && p.vel.x >= 0.0)
                || (p.rect.bottom() < -CULL_MARGIN && p.vel.y <= 0.0)
                || (p.rect.y > CANVAS_HEIGHT + CULL_MARGIN && p.vel.y >= 0.0)
        },
    );
}

/// Drop matching projectiles, returning them to the pool
fn release_where(
    list: &mut Vec<Projectile>,
    pool: &mut ObjectPool<Projectile>,
    gone: impl Fn(&Projectile) -> bool,
) {
    let mut i = 0;
    while i < list.len() {
        if gone(&list[i]) {
            pool.release(list.remove(i));
        } else {
            i += 1;
        }
    }
}

fn resolve_collisions(world: &mut World) {
    player_vs_obstacles(world);
    if world.phase != GamePhase::Playing {
        return;
    }

    projectiles_vs_boss(world);
    if world.phase != GamePhase::Playing {
        return;
    }

    projectiles_vs_hazards(world);

    let hit = world
        .enemy_projectiles
        .iter()
        .any(|shot| check_collision(&world.player.rect, &shot.rect, ENEMY_HIT_PADDING));
    if hit {
        game_over(world);
    }
}

fn player_vs_obstacles(world: &mut World) {
    // Power-ups released during this pass are checked next frame
    let count = world.obstacles.len();
    for i in 0..count {
        let obstacle = &world.obstacles[i];
        let contact = obstacle.kind.contact();
        // Solids use exact edges so a kart resting on top stays grounded
        let padding = if contact == Contact::Solid {
            0.0
        } else {
            PLAYER_HIT_PADDING
        };
        if obstacle.passed || !check_collision(&world.player.rect, &obstacle.rect, padding) {
            continue;
        }

        match contact {
            Contact::Coin => {
                world.obstacles[i].retire();
                world.add_score(COIN_SCORE);
            }
            Contact::PowerUp => {
                world.obstacles[i].retire();
                world.player.has_fire_power = true;
                world.add_score(POWERUP_SCORE);
                log::info!("Power-up collected at distance {:.0}", world.distance);
                world.announce("Power up collected!");
            }
            Contact::Solid => resolve_solid(world, i),
            Contact::Lethal => {
                game_over(world);
                return;
            }
            Contact::Empty => {}
        }
    }
}

/// Land on, bonk against, or get pushed out of a solid obstacle
fn resolve_solid(world: &mut World, index: usize) {
    let solid = world.obstacles[index].rect;
    let player = &mut world.player;

    if !is_vertical_collision(&player.rect, &solid) {
        if player.rect.x < solid.x {
            player.rect.x = solid.x - player.rect.width;
        } else {
            player.rect.x = solid.right();
        }
        return;
    }

    let was_above = player.rect.bottom() - player.vy <= solid.y + LANDING_TOLERANCE;
    if player.vy >= 0.0 && was_above {
        player.rect.y = solid.y - player.rect.height;
        player.vy = 0.0;
        player.is_grounded = true;
    } else if player.vy < 0.0 {
        player.rect.y = solid.bottom();
        player.vy = BONK_VELOCITY;
        activate_block(world, index);
    }
}

fn projectiles_vs_boss(world: &mut World) {
    if !world.boss.active {
        return;
    }

    for i in 0..world.projectiles.len() {
        if !check_collision(&world.projectiles[i].rect, &world.boss.rect, 0.0) {
            continue;
        }
        world.projectiles[i].retire();

        let boss = &mut world.boss;
        boss.hp = boss.hp.saturating_sub(1);
        boss.rect.x += BOSS_KNOCKBACK;
        log::debug!("Boss hit, {} hp left", boss.hp);

        if boss.hp == 0 {
            victory(world);
            return;
        }
    }
}

fn projectiles_vs_hazards(world: &mut World) {
    for p in 0..world.projectiles.len() {
        for o in 0..world.obstacles.len() {
            let obstacle = &world.obstacles[o];
            if obstacle.passed
                || !obstacle.kind.is_hazard()
                || !check_collision(&world.projectiles[p].rect, &obstacle.rect, 0.0)
            {
                continue;
            }
            world.obstacles[o].retire();
            world.projectiles[p].retire();
            world.add_score(KILL_SCORE);
            break;
        }
    }
}

fn game_over(world: &mut World) {
    log::info!(
        "Game over at distance {:.0} with score {}",
        world.distance,
        world.score
    );
    world.set_phase(GamePhase::GameOver);
    let message = format!("Game Over. Your score was {}", world.score);
    world.announce(message);
}

fn victory(world: &mut World) {
    world.boss.active = false;
    world.boss.defeated = true;
    // The killing blow counts as a kill on top of the defeat bonus
    world.add_score(KILL_SCORE + BOSS_DEFEAT_SCORE);
    log::info!("Boss defeated, final score {}", world.score);
    world.set_phase(GamePhase::Victory);
    let message = format!("Victory! Boss defeated. Final score {}", world.score);
    world.announce(message);
}
