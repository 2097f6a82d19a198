//! Shape generation for 2D primitives
//!
//! All coordinates are canvas space. [`scene`] assembles a whole frame.

use glam::Vec2;
use std::f32::consts::PI;

use super::FrameView;
use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::sim::{Boss, Obstacle, ObstacleKind, Player};
use crate::tuning::{Color, Theme, ThemePalette};

/// Axis-aligned filled rectangle
pub fn rect(x: f32, y: f32, w: f32, h: f32, color: Color) -> Vec<Vertex> {
    vec![
        Vertex::new(x, y, color),
        Vertex::new(x + w, y, color),
        Vertex::new(x, y + h, color),
        Vertex::new(x, y + h, color),
        Vertex::new(x + w, y, color),
        Vertex::new(x + w, y + h, color),
    ]
}

pub fn triangle(a: Vec2, b: Vec2, c: Vec2, color: Color) -> Vec<Vertex> {
    vec![
        Vertex::new(a.x, a.y, color),
        Vertex::new(b.x, b.y, color),
        Vertex::new(c.x, c.y, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: Color, segments: u32) -> Vec<Vertex> {
    ellipse(center, radius, radius, color, segments)
}

/// Filled ellipse (a circle scaled per axis)
pub fn ellipse(center: Vec2, rx: f32, ry: f32, color: Color, segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + rx * theta1.cos(),
            center.y + ry * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + rx * theta2.cos(),
            center.y + ry * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Upper half disc, flat side down
pub fn dome(center: Vec2, radius: f32, color: Color, segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = PI + (i as f32 / segments as f32) * PI;
        let theta2 = PI + ((i + 1) as f32 / segments as f32) * PI;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Rotation about a pivot, for sprites drawn in local coordinates
#[derive(Debug, Clone, Copy)]
struct Pose {
    origin: Vec2,
    rot: Vec2,
}

impl Pose {
    fn new(origin: Vec2, degrees: f32) -> Self {
        Self {
            origin,
            rot: Vec2::from_angle(degrees.to_radians()),
        }
    }

    fn apply(&self, local: Vec2) -> Vec2 {
        self.origin + self.rot.rotate(local)
    }

    /// Convex polygon as a triangle fan
    fn polygon(&self, points: &[Vec2], color: Color) -> Vec<Vertex> {
        let mut vertices = Vec::with_capacity(points.len().saturating_sub(2) * 3);
        if let Some((&first, rest)) = points.split_first() {
            let a = self.apply(first);
            for pair in rest.windows(2) {
                let b = self.apply(pair[0]);
                let c = self.apply(pair[1]);
                vertices.extend(triangle(a, b, c, color));
            }
        }
        vertices
    }

    fn rect(&self, x: f32, y: f32, w: f32, h: f32, color: Color) -> Vec<Vertex> {
        self.polygon(
            &[
                Vec2::new(x, y),
                Vec2::new(x + w, y),
                Vec2::new(x + w, y + h),
                Vec2::new(x, y + h),
            ],
            color,
        )
    }

    fn circle(&self, center: Vec2, radius: f32, color: Color) -> Vec<Vertex> {
        circle(self.apply(center), radius, color, 16)
    }
}

/// Build every triangle for one frame, back to front
pub fn scene(frame: &FrameView<'_>) -> Vec<Vertex> {
    let palette = frame.theme.palette();
    let mut out = Vec::with_capacity(4096);

    background(&mut out, frame, palette);
    ground(&mut out, palette, frame.distance);

    for obstacle in frame.obstacles {
        draw_obstacle(&mut out, obstacle, palette, frame.frame_count);
    }

    if frame.boss.active {
        draw_boss(&mut out, frame.boss, frame.frame_count);
    }

    for shot in frame.projectiles {
        let r = shot.rect.width / 2.0;
        out.extend(circle(shot.rect.center(), r, colors::FIREBALL, 12));
    }
    for shot in frame.enemy_projectiles {
        let r = shot.rect.width / 2.0;
        out.extend(circle(shot.rect.center(), r, colors::BOSS_SHOT, 12));
    }

    draw_player(&mut out, frame.player, frame.car_color.rgba(), frame.frame_count);
    out
}

fn background(out: &mut Vec<Vertex>, frame: &FrameView<'_>, palette: &ThemePalette) {
    out.extend(rect(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT, palette.sky));

    match frame.theme {
        Theme::Overworld => {
            out.extend(circle(Vec2::new(700.0, 80.0), 40.0, colors::SUN, 24));

            let drift = (frame.frame_count as f32 * 0.5) % CANVAS_WIDTH;
            for (x, y, s) in [(100.0, 100.0, 1.0), (450.0, 160.0, 0.8)] {
                for wrap in [0.0, CANVAS_WIDTH] {
                    cloud(out, x - drift + wrap, y, s, palette.cloud);
                }
            }

            let offset = (frame.distance * 0.2) % CANVAS_WIDTH;
            for i in 0..3 {
                let x = i as f32 * 400.0 - offset;
                out.extend(dome(Vec2::new(x + 150.0, GROUND_Y), 120.0, palette.hill, 24));
                out.extend(dome(Vec2::new(x + 320.0, GROUND_Y), 35.0, palette.bush, 12));
            }
        }
        Theme::Underground => {
            let spacing = 80.0;
            let offset = (frame.distance * 0.3) % spacing;
            let mut x = -offset;
            while x < CANVAS_WIDTH + spacing {
                let depth = 30.0 + ((x + offset) * 0.37).sin().abs() * 40.0;
                out.extend(triangle(
                    Vec2::new(x, 0.0),
                    Vec2::new(x + 40.0, 0.0),
                    Vec2::new(x + 20.0, depth),
                    palette.hill,
                ));
                x += spacing;
            }
        }
        Theme::Castle => {
            let offset = (frame.distance * 0.2) % 300.0;
            for i in 0..4 {
                let x = i as f32 * 300.0 - offset;
                out.extend(rect(x, 100.0, 60.0, CANVAS_HEIGHT, palette.hill));
            }
            let glow = (frame.frame_count as f32 / 30.0).sin() * 0.1;
            let mut lava = colors::LAVA;
            lava[3] += glow;
            out.extend(rect(0.0, CANVAS_HEIGHT - 150.0, CANVAS_WIDTH, 150.0, lava));
        }
    }
}

fn cloud(out: &mut Vec<Vertex>, x: f32, y: f32, s: f32, color: Color) {
    out.extend(circle(Vec2::new(x, y), 30.0 * s, color, 16));
    out.extend(circle(Vec2::new(x + 25.0 * s, y - 10.0 * s), 35.0 * s, color, 16));
    out.extend(circle(Vec2::new(x + 50.0 * s, y), 30.0 * s, color, 16));
}

fn ground(out: &mut Vec<Vertex>, palette: &ThemePalette, distance: f32) {
    out.extend(rect(0.0, GROUND_Y, CANVAS_WIDTH, GROUND_HEIGHT, palette.ground));
    out.extend(rect(0.0, GROUND_Y, CANVAS_WIDTH, 15.0, palette.ground_detail));

    // Checkered dirt scrolls with the world
    let cell = 20.0;
    let shift = distance % cell;
    let mut col = 0;
    let mut x = -shift;
    while x < CANVAS_WIDTH {
        let mut row = 0;
        let mut y = GROUND_Y + 15.0;
        while y < CANVAS_HEIGHT {
            if (col + row) % 2 == 0 {
                out.extend(rect(x, y, cell / 2.0, cell / 2.0, colors::SHADE));
            }
            y += cell;
            row += 1;
        }
        x += cell;
        col += 1;
    }
}

fn draw_obstacle(out: &mut Vec<Vertex>, obstacle: &Obstacle, palette: &ThemePalette, frame: u64) {
    let r = &obstacle.rect;
    let t = frame as f32;

    match obstacle.kind {
        ObstacleKind::Pipe => {
            out.extend(rect(r.x, r.y, r.width, r.height, palette.pipe));
            out.extend(rect(r.x - 6.0, r.y, r.width + 12.0, 35.0, palette.pipe));
            out.extend(rect(r.x + 8.0, r.y + 4.0, 6.0, 25.0, palette.pipe_highlight));
            out.extend(rect(
                r.x + 8.0,
                r.y + 40.0,
                6.0,
                (r.height - 40.0).max(0.0),
                palette.pipe_highlight,
            ));
        }
        ObstacleKind::Block => {
            out.extend(rect(r.x, r.y, r.width, r.height, palette.block));
            let lines = palette.brick_lines;
            out.extend(rect(r.x, r.y + 10.0, r.width, 2.0, lines));
            out.extend(rect(r.x, r.y + 30.0, r.width, 2.0, lines));
            out.extend(rect(r.x + 20.0, r.y, 2.0, 10.0, lines));
            out.extend(rect(r.x + 10.0, r.y + 10.0, 2.0, 20.0, lines));
            out.extend(rect(r.x + 30.0, r.y + 30.0, 2.0, 10.0, lines));
        }
        ObstacleKind::QuestionBlock => {
            let body = if obstacle.is_used {
                colors::USED_BLOCK
            } else {
                colors::QUESTION_BLOCK
            };
            out.extend(rect(r.x, r.y, r.width, r.height, body));
            out.extend(rect(r.right() - 4.0, r.y, 4.0, r.height, colors::SHADE));
            out.extend(rect(r.x, r.bottom() - 4.0, r.width, 4.0, colors::SHADE));
            if !obstacle.is_used {
                // Blocky question mark
                let (x, y) = (r.x + 14.0, r.y + 8.0);
                let mark = colors::QUESTION_MARK;
                out.extend(rect(x, y, 12.0, 4.0, mark));
                out.extend(rect(x + 10.0, y, 4.0, 12.0, mark));
                out.extend(rect(x + 4.0, y + 12.0, 8.0, 4.0, mark));
                out.extend(rect(x + 4.0, y + 16.0, 4.0, 5.0, mark));
                out.extend(rect(x + 4.0, y + 23.0, 4.0, 4.0, mark));
                if (frame / 12) % 2 == 0 {
                    for (dx, dy) in [(2.0, 2.0), (34.0, 2.0), (2.0, 34.0), (34.0, 34.0)] {
                        out.extend(rect(r.x + dx, r.y + dy, 4.0, 4.0, colors::COIN));
                    }
                }
            }
        }
        ObstacleKind::Goomba => {
            let c = r.center();
            let walk = (t / 6.0).sin() * 5.0;
            let feet_y = r.bottom() - 2.0;
            out.extend(ellipse(Vec2::new(c.x - 10.0, feet_y + walk), 8.0, 5.0, colors::BLACK, 12));
            out.extend(ellipse(Vec2::new(c.x + 10.0, feet_y - walk), 8.0, 5.0, colors::BLACK, 12));
            out.extend(dome(Vec2::new(c.x, r.bottom() - 5.0), r.width / 2.0, colors::GOOMBA, 16));
            out.extend(rect(c.x - 8.0, c.y, 16.0, 15.0, colors::GOOMBA_FACE));
            for dx in [-6.0, 6.0] {
                out.extend(circle(Vec2::new(c.x + dx, c.y + 5.0), 4.0, colors::WHITE, 8));
                out.extend(circle(Vec2::new(c.x + dx * 0.8, c.y + 5.0), 1.5, colors::BLACK, 6));
            }
        }
        ObstacleKind::Shell => {
            out.extend(dome(Vec2::new(r.x + 20.0, r.y + 20.0), 15.0, colors::SHELL, 16));
            out.extend(rect(r.x + 5.0, r.y + 20.0, 30.0, 8.0, colors::WHITE));
            let walk = (t / 5.0).sin() * 3.0;
            out.extend(circle(Vec2::new(r.x + 10.0 + walk, r.y + 30.0), 6.0, colors::SHELL_FEET, 8));
            out.extend(circle(Vec2::new(r.x + 30.0 - walk, r.y + 30.0), 6.0, colors::SHELL_FEET, 8));
        }
        ObstacleKind::Piranha => {
            out.extend(rect(r.x + 10.0, r.y + 30.0, 20.0, r.height - 30.0, palette.pipe));
            let head = Vec2::new(r.x + 20.0, r.y + 18.0);
            out.extend(circle(head, 18.0, colors::PIRANHA, 16));
            let bite = (t / 9.0).sin() * 5.0;
            out.extend(triangle(
                head,
                Vec2::new(r.right(), r.y + 8.0 - bite),
                Vec2::new(r.right(), r.y + 28.0 + bite),
                colors::WHITE,
            ));
            for (dx, dy) in [(-7.0, -3.0), (-5.0, 10.0), (5.0, -6.0)] {
                out.extend(circle(head + Vec2::new(dx, dy), 3.0, colors::WHITE, 6));
            }
        }
        ObstacleKind::Coin => {
            let c = r.center();
            let squash = (t / 9.0).cos().abs();
            out.extend(ellipse(c, r.width / 2.0 * squash, r.height / 2.0, colors::COIN, 16));
            out.extend(rect(c.x - 2.0 * squash, c.y - 8.0, 4.0 * squash, 16.0, colors::COIN_EDGE));
        }
        ObstacleKind::FireFlower => {
            let c = r.center();
            out.extend(ellipse(c + Vec2::new(-8.0, 8.0), 6.0, 3.0, colors::FLOWER_LEAF, 8));
            out.extend(ellipse(c + Vec2::new(8.0, 8.0), 6.0, 3.0, colors::FLOWER_LEAF, 8));
            out.extend(circle(c, 10.0, colors::FLOWER_PETAL, 16));
            out.extend(circle(c, 5.0, colors::FLOWER_CORE, 12));
            out.extend(rect(c.x - 3.0, c.y - 2.0, 2.0, 4.0, colors::BLACK));
            out.extend(rect(c.x + 1.0, c.y - 2.0, 2.0, 4.0, colors::BLACK));
        }
        // Never materialized
        ObstacleKind::Gap => {}
    }
}

fn draw_boss(out: &mut Vec<Vertex>, boss: &Boss, frame: u64) {
    let r = &boss.rect;
    let hover = (frame as f32 / 18.0).sin() * 15.0;
    let top = r.y + hover;
    let cx = r.center().x;
    let mid = Vec2::new(cx, top + r.height / 2.0);

    out.extend(circle(mid, 50.0, colors::BOSS_SHELL, 24));
    out.extend(ellipse(mid, 40.0, 50.0, colors::BOSS_BODY, 24));
    out.extend(ellipse(mid + Vec2::new(0.0, 10.0), 25.0, 35.0, colors::BOSS_BELLY, 20));
    out.extend(circle(Vec2::new(cx, top + 40.0), 35.0, colors::BOSS_BODY, 20));
    out.extend(triangle(
        Vec2::new(cx - 10.0, top + 10.0),
        Vec2::new(cx, top - 20.0),
        Vec2::new(cx + 10.0, top + 10.0),
        colors::BOSS_HORN,
    ));
    for dx in [-10.0, 10.0] {
        out.extend(ellipse(Vec2::new(cx + dx, top + 35.0), 8.0, 10.0, colors::WHITE, 12));
        out.extend(circle(Vec2::new(cx + dx, top + 35.0), 3.0, colors::BOSS_HORN, 8));
    }

    // Health bar
    let ratio = if boss.max_hp == 0 {
        0.0
    } else {
        boss.hp as f32 / boss.max_hp as f32
    };
    out.extend(rect(r.x - 20.0, top - 40.0, 140.0, 10.0, colors::BLACK));
    out.extend(rect(r.x - 18.0, top - 38.0, 136.0 * ratio, 6.0, colors::HP_BAR));
}

fn draw_player(out: &mut Vec<Vertex>, player: &Player, car: Color, frame: u64) {
    let pose = Pose::new(player.rect.center(), player.rotation);
    let body = if player.has_fire_power {
        colors::WHITE
    } else {
        car
    };

    out.extend(pose.polygon(
        &[
            Vec2::new(-25.0, 5.0),
            Vec2::new(-25.0, -5.0),
            Vec2::new(10.0, -5.0),
            Vec2::new(25.0, 10.0),
            Vec2::new(25.0, 15.0),
            Vec2::new(-20.0, 15.0),
        ],
        body,
    ));
    if player.has_fire_power {
        out.extend(pose.rect(-20.0, 0.0, 30.0, 4.0, colors::HP_BAR));
    }
    out.extend(pose.rect(-28.0, 5.0, 5.0, 5.0, colors::EXHAUST));

    // Driver
    out.extend(pose.circle(Vec2::new(-5.0, -12.0), 10.0, body));
    out.extend(pose.circle(Vec2::new(-2.0, -12.0), 7.0, colors::SKIN));
    out.extend(pose.rect(0.0, -18.0, 10.0, 4.0, body));

    // Wheels with a spinning hub mark
    let spin = frame as f32 * 0.4;
    for wx in [-15.0, 15.0] {
        let hub = Vec2::new(wx, 15.0);
        out.extend(pose.circle(hub, 7.0, colors::WHEEL));
        let spoke = hub + Vec2::from_angle(spin) * 4.0;
        out.extend(pose.circle(spoke, 1.5, colors::WHITE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::CarColor;
    use crate::sim::{Rect, World};

    #[test]
    fn test_primitive_sizes() {
        assert_eq!(rect(0.0, 0.0, 10.0, 10.0, colors::WHITE).len(), 6);
        assert_eq!(circle(Vec2::ZERO, 5.0, colors::WHITE, 12).len(), 36);
        assert_eq!(dome(Vec2::ZERO, 5.0, colors::WHITE, 8).len(), 24);
    }

    #[test]
    fn test_pose_rotation() {
        let pose = Pose::new(Vec2::new(100.0, 100.0), 90.0);
        let p = pose.apply(Vec2::new(10.0, 0.0));
        assert!((p - Vec2::new(100.0, 110.0)).length() < 1e-4);
        // Quad becomes two triangles
        assert_eq!(pose.rect(0.0, 0.0, 4.0, 4.0, colors::WHITE).len(), 6);
    }

    #[test]
    fn test_scene_grows_with_entities() {
        let mut world = World::new(1);
        let empty = scene(&FrameView::new(&world, Theme::Overworld, CarColor::Red)).len();

        world.spawn_obstacle(ObstacleKind::Pipe, Rect::new(300.0, 420.0, 60.0, 100.0), Vec2::ZERO);
        let with_pipe = scene(&FrameView::new(&world, Theme::Overworld, CarColor::Red)).len();
        assert!(with_pipe > empty);

        world.spawn_obstacle(ObstacleKind::Gap, Rect::new(400.0, 420.0, 60.0, 100.0), Vec2::ZERO);
        let with_gap = scene(&FrameView::new(&world, Theme::Overworld, CarColor::Red)).len();
        assert_eq!(with_gap, with_pipe);

        world.boss.active = true;
        let with_boss = scene(&FrameView::new(&world, Theme::Overworld, CarColor::Red)).len();
        assert!(with_boss > with_gap);
    }

    #[test]
    fn test_every_theme_and_kind_draws() {
        let mut world = World::new(1);
        for (i, kind) in ObstacleKind::ALL.into_iter().enumerate() {
            let x = 40.0 + i as f32 * 80.0;
            world.spawn_obstacle(kind, Rect::new(x, 460.0, 40.0, 60.0), Vec2::ZERO);
        }
        world.obstacles[3].is_used = true;
        for theme in [Theme::Overworld, Theme::Underground, Theme::Castle] {
            let vertices = scene(&FrameView::new(&world, theme, CarColor::Blue));
            assert_eq!(vertices.len() % 3, 0);
            assert!(vertices.iter().all(|v| v.position.iter().all(|c| c.is_finite())));
        }
    }

    #[test]
    fn test_fire_power_repaints_kart() {
        let mut world = World::new(1);
        let normal = scene(&FrameView::new(&world, Theme::Castle, CarColor::Green));
        assert!(normal.iter().any(|v| v.color == CarColor::Green.rgba()));

        world.player.has_fire_power = true;
        let armed = scene(&FrameView::new(&world, Theme::Castle, CarColor::Green));
        assert!(!armed.iter().any(|v| v.color == CarColor::Green.rgba()));
    }
}
