//! Run lifecycle around the simulation
//!
//! [`Engine`] owns the world, the active level and the renderer. The host
//! drives it with [`Engine::frame`] once per display refresh and listens
//! through three observer callbacks.

use std::cell::RefCell;
use std::rc::Rc;

use super::spawn;
use super::state::{GameEvent, GamePhase, World};
use super::tick::{TickInput, tick};
use crate::input::{Action, InputState};
use crate::level::LevelConfig;
use crate::platform::EventBinding;
use crate::renderer::{FrameView, Renderer};
use crate::settings::{CarColor, Settings};
use crate::tuning::Theme;

type StateCallback = Box<dyn FnMut(GamePhase)>;
type ScoreCallback = Box<dyn FnMut(u64)>;
type AnnounceCallback = Box<dyn FnMut(&str)>;

pub struct Engine<R: Renderer> {
    world: World,
    level: Option<LevelConfig>,
    theme: Theme,
    car_color: CarColor,
    /// Shared with the key listeners
    input: Rc<RefCell<InputState>>,
    renderer: R,
    on_state_change: Option<StateCallback>,
    on_score: Option<ScoreCallback>,
    on_announce: Option<AnnounceCallback>,
    bindings: Vec<Box<dyn EventBinding>>,
    running: bool,
    /// Bumped on every start/stop so stale frame callbacks can bail out
    run_id: u64,
}

impl<R: Renderer> Engine<R> {
    pub fn new(renderer: R, settings: Settings, seed: u64) -> Self {
        log::debug!("Engine created with seed {}", seed);
        Self {
            world: World::new(seed),
            level: None,
            theme: Theme::default(),
            car_color: settings.car_color,
            input: Rc::new(RefCell::new(InputState::new(settings.bindings))),
            renderer,
            on_state_change: None,
            on_score: None,
            on_announce: None,
            bindings: Vec::new(),
            running: false,
            run_id: 0,
        }
    }

    /// Swap level data and theme. Takes effect on the next spawn.
    pub fn set_level(&mut self, level: LevelConfig) {
        log::info!(
            "Level set: {} ({}, {})",
            level.id,
            level.difficulty.as_str(),
            level.theme.as_str()
        );
        self.theme = level.theme;
        self.level = Some(level);
    }

    pub fn level(&self) -> Option<&LevelConfig> {
        self.level.as_ref()
    }

    pub fn set_car_color(&mut self, color: CarColor) {
        self.car_color = color;
    }

    pub fn car_color(&self) -> CarColor {
        self.car_color
    }

    /// Begin a fresh run from any phase
    pub fn start(&mut self) {
        self.world.reset();
        self.run_id += 1;
        self.running = true;

        // Subscribers see the reset score even though add_score was not called
        self.world.events.push(GameEvent::ScoreChanged(0));
        self.world.set_phase(GamePhase::Playing);
        self.world.announce("Game Started. Good luck!");

        match &self.level {
            Some(level) => log::info!(
                "Run started on {} ({}, {})",
                level.id,
                level.difficulty.as_str(),
                level.theme.as_str()
            ),
            None => log::warn!("Run started without a level, nothing will spawn"),
        }

        self.dispatch_events();
    }

    /// Abandon the run and return to the menu
    pub fn stop(&mut self) {
        if self.running {
            log::info!("Run stopped at score {}", self.world.score);
        }
        self.running = false;
        self.run_id += 1;
        self.world.phase = GamePhase::Menu;
    }

    /// Stop and release every attached listener. Safe to call repeatedly.
    pub fn cleanup(&mut self) {
        self.stop();
        for mut binding in self.bindings.drain(..) {
            binding.unbind();
        }
    }

    /// Advance and draw one frame
    ///
    /// Returns true while another frame should be scheduled.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if !self.running {
            return false;
        }

        let input = self.sample_input(now_ms);
        tick(&mut self.world, self.level.as_ref(), &input);
        self.renderer
            .draw(&FrameView::new(&self.world, self.theme, self.car_color));
        self.dispatch_events();

        self.running = self.world.phase == GamePhase::Playing;
        self.running
    }

    fn sample_input(&self, now_ms: f64) -> TickInput {
        let input = self.input.borrow();
        TickInput {
            left: input.is_action_active(Action::Left),
            right: input.is_action_active(Action::Right),
            jump: input.is_action_active(Action::Jump),
            down: input.is_action_active(Action::Down),
            shoot: input.is_action_active(Action::Shoot),
            now_ms,
        }
    }

    fn dispatch_events(&mut self) {
        for event in std::mem::take(&mut self.world.events) {
            match event {
                GameEvent::PhaseChanged(phase) => {
                    if let Some(cb) = self.on_state_change.as_mut() {
                        cb(phase);
                    }
                }
                GameEvent::ScoreChanged(score) => {
                    if let Some(cb) = self.on_score.as_mut() {
                        cb(score);
                    }
                }
                GameEvent::Announce(message) => {
                    if let Some(cb) = self.on_announce.as_mut() {
                        cb(&message);
                    }
                }
            }
        }
    }

    /// Toggle an action from an on-screen control
    pub fn set_virtual_action(&mut self, action: Action, active: bool) {
        self.input.borrow_mut().set_virtual_action(action, active);
    }

    /// Returns true when the key is bound and its default should be suppressed
    pub fn key_down(&mut self, code: &str) -> bool {
        self.input.borrow_mut().key_down(code)
    }

    pub fn key_up(&mut self, code: &str) {
        self.input.borrow_mut().key_up(code);
    }

    pub fn remap(&mut self, action: Action, key: &str) {
        self.input.borrow_mut().remap(action, key);
    }

    /// Pointer activation of a bonus block, in canvas coordinates
    pub fn activate_block_at(&mut self, x: f32, y: f32) -> bool {
        if self.world.phase != GamePhase::Playing {
            return false;
        }
        spawn::activate_block_at(&mut self.world, x, y)
    }

    /// Hand a listener scope to the engine; released by [`Engine::cleanup`]
    pub fn attach_binding(&mut self, binding: Box<dyn EventBinding>) {
        self.bindings.push(binding);
    }

    pub fn on_state_change(&mut self, cb: impl FnMut(GamePhase) + 'static) {
        self.on_state_change = Some(Box::new(cb));
    }

    pub fn on_score(&mut self, cb: impl FnMut(u64) + 'static) {
        self.on_score = Some(Box::new(cb));
    }

    pub fn on_announce(&mut self, cb: impl FnMut(&str) + 'static) {
        self.on_announce = Some(Box::new(cb));
    }

    pub fn phase(&self) -> GamePhase {
        self.world.phase
    }

    pub fn score(&self) -> u64 {
        self.world.score
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Input handle for listeners that write key state directly
    pub fn input(&self) -> Rc<RefCell<InputState>> {
        Rc::clone(&self.input)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::renderer::NullRenderer;
    use crate::sim::{ObstacleKind, Rect};
    use crate::tuning::Difficulty;
    use glam::Vec2;
    use proptest::prelude::*;
    use std::cell::Cell;

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

    fn engine(obstacles: Vec<ObstacleKind>) -> Engine<NullRenderer> {
        let mut engine = Engine::new(NullRenderer, Settings::default(), 42);
        engine.set_level(level(obstacles));
        engine
    }

    /// Counts draws and remembers the last frame number
    #[derive(Default)]
    struct RecordingRenderer {
        draws: usize,
        last_frame: u64,
    }

    impl Renderer for RecordingRenderer {
        fn draw(&mut self, frame: &FrameView<'_>) {
            self.draws += 1;
            self.last_frame = frame.frame_count;
        }
    }

    struct CountingBinding(Rc<Cell<u32>>);

    impl EventBinding for CountingBinding {
        fn unbind(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn record_scores(engine: &mut Engine<NullRenderer>) -> Rc<RefCell<Vec<u64>>> {
        let scores = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&scores);
        engine.on_score(move |s| sink.borrow_mut().push(s));
        scores
    }

    #[test]
    fn test_start_resets_and_notifies() {
        let mut engine = engine(vec![ObstacleKind::Coin]);
        let phases = Rc::new(RefCell::new(Vec::new()));
        let announcements = Rc::new(RefCell::new(Vec::new()));
        {
            let phases = Rc::clone(&phases);
            engine.on_state_change(move |p| phases.borrow_mut().push(p));
            let announcements = Rc::clone(&announcements);
            engine.on_announce(move |m| announcements.borrow_mut().push(m.to_string()));
        }
        let scores = record_scores(&mut engine);

        engine.world_mut().score = 999;
        engine.world_mut().player.has_fire_power = true;
        engine.start();

        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.score(), 0);
        assert!(!engine.world().player.has_fire_power);
        assert_eq!(*phases.borrow(), vec![GamePhase::Playing]);
        assert_eq!(*scores.borrow(), vec![0]);
        assert_eq!(*announcements.borrow(), vec!["Game Started. Good luck!"]);
    }

    #[test]
    fn test_menu_does_not_advance() {
        let mut engine = engine(vec![ObstacleKind::Coin]);
        assert_eq!(engine.phase(), GamePhase::Menu);
        assert!(!engine.frame(0.0));
        assert_eq!(engine.world().frame_count, 0);
        assert_eq!(engine.world().distance, 0.0);
    }

    #[test]
    fn test_stop_returns_to_menu() {
        let mut engine = Engine::new(RecordingRenderer::default(), Settings::default(), 1);
        engine.set_level(level(vec![ObstacleKind::Coin]));
        engine.start();
        for i in 0..5 {
            assert!(engine.frame(i as f64 * 16.0));
        }
        assert_eq!(engine.renderer().draws, 5);
        assert_eq!(engine.renderer().last_frame, 5);

        let run = engine.run_id();
        engine.stop();
        assert_eq!(engine.phase(), GamePhase::Menu);
        assert_ne!(engine.run_id(), run);
        assert!(!engine.frame(100.0));
        assert_eq!(engine.renderer().draws, 5);
    }

    #[test]
    fn test_all_coin_run() {
        let mut engine = engine(vec![ObstacleKind::Coin]);
        let scores = record_scores(&mut engine);
        engine.start();

        // Stays short of the boss threshold
        for i in 0..900 {
            assert!(engine.frame(i as f64 * 16.0));
            assert!(engine.world().player.is_grounded);
            assert_ne!(engine.phase(), GamePhase::GameOver);
        }

        let scores = scores.borrow();
        assert!(scores.len() > 1, "no coin was ever collected");
        for pair in scores.windows(2) {
            assert_eq!(pair[1] - pair[0], COIN_SCORE);
        }
        assert_eq!(engine.score() % COIN_SCORE, 0);
    }

    #[test]
    fn test_boss_defeat_awards_bonus() {
        let mut engine = engine(vec![ObstacleKind::Coin]);
        let phases = Rc::new(RefCell::new(Vec::new()));
        let announcements = Rc::new(RefCell::new(Vec::new()));
        {
            let phases = Rc::clone(&phases);
            engine.on_state_change(move |p| phases.borrow_mut().push(p));
            let announcements = Rc::clone(&announcements);
            engine.on_announce(move |m| announcements.borrow_mut().push(m.to_string()));
        }
        engine.start();
        engine.world_mut().player.has_fire_power = true;
        engine.world_mut().distance = BOSS_SPAWN_DISTANCE;

        assert!(engine.frame(0.0));
        assert!(engine.world().boss.active);
        let before = engine.score();
        engine.world_mut().boss.rect.x = BOSS_REST_X;

        for hit in 0..BOSS_HP {
            let world = engine.world_mut();
            let c = world.boss.rect.center();
            let shot = world.make_projectile(Rect::new(c.x - 10.0, c.y - 10.0, 20.0, 20.0), Vec2::ZERO);
            world.projectiles.push(shot);

            let more = engine.frame(16.0 * (hit + 1) as f64);
            assert_eq!(more, hit + 1 < BOSS_HP);
        }

        assert_eq!(engine.phase(), GamePhase::Victory);
        assert!(engine.world().boss.defeated);
        assert!(!engine.world().boss.active);
        assert_eq!(engine.score() - before, KILL_SCORE + BOSS_DEFEAT_SCORE);
        assert_eq!(*phases.borrow(), vec![GamePhase::Playing, GamePhase::Victory]);
        let expected = format!("Victory! Boss defeated. Final score {}", engine.score());
        assert_eq!(announcements.borrow().last(), Some(&expected));
    }

    #[test]
    fn test_hazard_contact_ends_run() {
        let mut engine = engine(vec![ObstacleKind::Goomba]);
        let scores = record_scores(&mut engine);
        let announcements = Rc::new(RefCell::new(Vec::new()));
        {
            let announcements = Rc::clone(&announcements);
            engine.on_announce(move |m| announcements.borrow_mut().push(m.to_string()));
        }
        engine.start();

        let world = engine.world_mut();
        let rect = world.player.rect;
        world.spawn_obstacle(ObstacleKind::Goomba, rect, Vec2::ZERO);

        assert!(!engine.frame(0.0));
        assert_eq!(engine.phase(), GamePhase::GameOver);
        assert_eq!(engine.world().frame_count, 1);
        assert_eq!(
            announcements.borrow().last().map(String::as_str),
            Some("Game Over. Your score was 0")
        );

        let updates = scores.borrow().len();
        for i in 0..10 {
            assert!(!engine.frame(16.0 * i as f64));
        }
        assert_eq!(scores.borrow().len(), updates);
        assert_eq!(engine.world().frame_count, 1);
    }

    #[test]
    fn test_fire_power_lasts_until_restart() {
        let mut engine = engine(vec![ObstacleKind::Coin, ObstacleKind::Block, ObstacleKind::Gap]);
        engine.start();

        let world = engine.world_mut();
        let rect = world.player.rect;
        world.spawn_obstacle(ObstacleKind::FireFlower, rect, Vec2::ZERO);
        engine.frame(0.0);
        assert!(engine.world().player.has_fire_power);
        assert_eq!(engine.score(), POWERUP_SCORE);

        engine.set_virtual_action(Action::Jump, true);
        engine.set_virtual_action(Action::Shoot, true);
        for i in 1..400 {
            if !engine.frame(i as f64 * 16.0) {
                break;
            }
            assert!(engine.world().player.has_fire_power);
        }

        engine.start();
        assert!(!engine.world().player.has_fire_power);
    }

    #[test]
    fn test_boss_activates_once() {
        let mut engine = engine(vec![ObstacleKind::Coin]);
        engine.start();
        engine.world_mut().distance = BOSS_SPAWN_DISTANCE;

        let mut activations = 0;
        let mut was_active = false;
        for i in 0..60 {
            if i == 20 {
                let boss = &mut engine.world_mut().boss;
                boss.active = false;
                boss.defeated = true;
            }
            engine.frame(i as f64 * 16.0);
            let active = engine.world().boss.active;
            if active && !was_active {
                activations += 1;
            }
            was_active = active;
        }

        assert_eq!(activations, 1);
        assert!(!engine.world().boss.active);
        assert!(engine.world().distance > BOSS_SPAWN_DISTANCE);
    }

    #[test]
    fn test_emergency_flower_when_unarmed() {
        let mut engine = engine(vec![ObstacleKind::Coin]);
        engine.start();
        engine.world_mut().distance = BOSS_SPAWN_DISTANCE;
        engine.frame(0.0);

        assert!(
            engine
                .world()
                .obstacles
                .iter()
                .any(|o| o.kind == ObstacleKind::FireFlower)
        );
    }

    #[test]
    fn test_cleanup_unbinds_once() {
        let mut engine = engine(vec![ObstacleKind::Coin]);
        let count = Rc::new(Cell::new(0));
        engine.attach_binding(Box::new(CountingBinding(Rc::clone(&count))));
        engine.attach_binding(Box::new(CountingBinding(Rc::clone(&count))));

        for _ in 0..3 {
            engine.start();
            engine.frame(0.0);
            engine.stop();
        }
        assert_eq!(count.get(), 0);

        engine.cleanup();
        assert_eq!(count.get(), 2);
        engine.cleanup();
        assert_eq!(count.get(), 2);
        assert_eq!(engine.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_keys_drive_player() {
        let mut engine = engine(vec![ObstacleKind::Coin]);
        engine.start();
        let x = engine.world().player.rect.x;

        assert!(engine.key_down("ArrowRight"));
        engine.frame(0.0);
        assert!(engine.world().player.rect.x > x);

        engine.key_up("ArrowRight");
        let x = engine.world().player.rect.x;
        engine.frame(16.0);
        assert_eq!(engine.world().player.rect.x, x);

        // Remapped jump ignores the old keys
        engine.remap(Action::Jump, "KeyJ");
        assert!(!engine.key_down("ArrowUp"));
        engine.frame(32.0);
        assert!(engine.world().player.is_grounded);
        assert!(engine.key_down("KeyJ"));
        engine.frame(48.0);
        assert!(!engine.world().player.is_grounded);
    }

    #[test]
    fn test_pointer_activates_block_only_while_playing() {
        let mut engine = engine(vec![ObstacleKind::Coin]);
        let block = Rect::new(400.0, GROUND_Y - 150.0, 40.0, 40.0);
        engine
            .world_mut()
            .spawn_obstacle(ObstacleKind::QuestionBlock, block, Vec2::ZERO);
        assert!(!engine.activate_block_at(420.0, GROUND_Y - 130.0));

        engine.start();
        engine
            .world_mut()
            .spawn_obstacle(ObstacleKind::QuestionBlock, block, Vec2::ZERO);
        assert!(!engine.activate_block_at(10.0, 10.0));
        assert!(engine.activate_block_at(420.0, GROUND_Y - 130.0));
        assert!(engine.world().obstacles[0].is_used);
        assert!(!engine.activate_block_at(420.0, GROUND_Y - 130.0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_score_never_decreases(
            inputs in prop::collection::vec(any::<(bool, bool, bool, bool, bool)>(), 1..400),
            seed in any::<u64>(),
        ) {
            let mut engine = Engine::new(NullRenderer, Settings::default(), seed);
            engine.set_level(crate::level::fallback_level());
            engine.start();
            prop_assert_eq!(engine.score(), 0);

            let mut last = 0;
            for (i, (left, right, jump, down, shoot)) in inputs.into_iter().enumerate() {
                engine.set_virtual_action(Action::Left, left);
                engine.set_virtual_action(Action::Right, right);
                engine.set_virtual_action(Action::Jump, jump);
                engine.set_virtual_action(Action::Down, down);
                engine.set_virtual_action(Action::Shoot, shoot);
                let more = engine.frame(i as f64 * 16.0);
                prop_assert!(engine.score() >= last);
                last = engine.score();
                if !more {
                    break;
                }
            }

            engine.start();
            prop_assert_eq!(engine.score(), 0);
        }
    }
}
