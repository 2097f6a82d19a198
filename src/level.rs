//! Level descriptors
//!
//! A level is an obstacle sequence replayed cyclically plus difficulty and
//! theme labels. Levels come from the built-in presets or from a
//! [`LevelSource`]. Generation never fails from the engine's point of view:
//! any fetch or parse error turns into [`fallback_level`].

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::error::LevelError;
use crate::sim::ObstacleKind;
use crate::tuning::{Difficulty, Theme};

/// Number of tokens in a procedurally generated level
pub const GENERATED_LENGTH: usize = 40;

/// Immutable level data handed to the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub id: String,
    pub name: String,
    pub difficulty: Difficulty,
    pub description: String,
    pub theme: Theme,
    pub obstacles: Vec<ObstacleKind>,
}

/// Wire shape before validation
#[derive(Deserialize)]
struct RawLevel {
    #[serde(default)]
    id: String,
    name: String,
    #[serde(default)]
    difficulty: Difficulty,
    #[serde(default)]
    description: String,
    #[serde(default)]
    theme: Option<String>,
    obstacles: Vec<ObstacleKind>,
}

/// Parse and validate a level descriptor
///
/// Unknown difficulty labels become Medium and a missing theme becomes
/// OVERWORLD. An unknown theme, an unknown obstacle tag or an empty sequence
/// is rejected.
pub fn parse_level(json: &str) -> Result<LevelConfig, LevelError> {
    let raw: RawLevel = serde_json::from_str(json)?;

    if raw.obstacles.is_empty() {
        return Err(LevelError::EmptyObstacles);
    }

    let theme = match raw.theme {
        None => Theme::default(),
        Some(label) => Theme::from_label(&label).ok_or(LevelError::UnknownTheme(label))?,
    };

    let id = if raw.id.trim().is_empty() {
        generated_id(json)
    } else {
        raw.id
    };

    Ok(LevelConfig {
        id,
        name: raw.name,
        difficulty: raw.difficulty,
        description: raw.description,
        theme,
        obstacles: raw.obstacles,
    })
}

/// Something that turns a free-text prompt into a raw level descriptor
pub trait LevelSource {
    fn fetch(&self, prompt: &str) -> Result<String, LevelError>;
}

/// Generate a level from a prompt, falling back to the built-in level on any
/// failure
pub fn generate_level<S: LevelSource + ?Sized>(source: &S, prompt: &str) -> LevelConfig {
    match source.fetch(prompt).and_then(|raw| parse_level(&raw)) {
        Ok(mut level) => {
            level.id = generated_id(prompt);
            log::info!(
                "Generated level '{}' ({}, {}, {} obstacles)",
                level.name,
                level.difficulty.as_str(),
                level.theme.as_str(),
                level.obstacles.len()
            );
            level
        }
        Err(e) => {
            log::warn!("Level generation failed, using fallback: {}", e);
            fallback_level()
        }
    }
}

fn generated_id(seed_text: &str) -> String {
    format!("gen_{:016x}", fnv1a(seed_text.as_bytes()))
}

/// FNV-1a, used to turn prompts into stable seeds and ids
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}

/// Offline generator: the prompt picks theme and difficulty by keyword and
/// seeds the token draw, so the same prompt always yields the same level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProceduralSource;

impl ProceduralSource {
    fn theme_for(prompt: &str) -> Theme {
        const CASTLE: [&str; 4] = ["castle", "lava", "bowser", "fire"];
        const UNDERGROUND: [&str; 4] = ["cave", "underground", "dungeon", "sewer"];

        if CASTLE.iter().any(|k| prompt.contains(k)) {
            Theme::Castle
        } else if UNDERGROUND.iter().any(|k| prompt.contains(k)) {
            Theme::Underground
        } else {
            Theme::Overworld
        }
    }

    fn difficulty_for(prompt: &str) -> Difficulty {
        const EASY: [&str; 3] = ["easy", "chill", "relaxed"];
        const HARD: [&str; 3] = ["hard", "insane", "brutal"];

        if HARD.iter().any(|k| prompt.contains(k)) {
            Difficulty::Hard
        } else if EASY.iter().any(|k| prompt.contains(k)) {
            Difficulty::Easy
        } else {
            Difficulty::Medium
        }
    }

    /// Token weights per difficulty. Harder levels lean on hazards and gaps.
    fn weights(difficulty: Difficulty) -> [(ObstacleKind, u32); 9] {
        let (hazard, gap, reward) = match difficulty {
            Difficulty::Easy => (1, 1, 4),
            Difficulty::Medium => (2, 2, 3),
            Difficulty::Hard => (4, 3, 2),
        };
        [
            (ObstacleKind::Coin, reward + 1),
            (ObstacleKind::Block, 3),
            (ObstacleKind::QuestionBlock, reward),
            (ObstacleKind::Pipe, 3),
            (ObstacleKind::Gap, gap),
            (ObstacleKind::Goomba, hazard + 1),
            (ObstacleKind::Shell, hazard),
            (ObstacleKind::Piranha, hazard),
            (ObstacleKind::FireFlower, 1),
        ]
    }

    fn draw(rng: &mut Pcg32, weights: &[(ObstacleKind, u32)]) -> ObstacleKind {
        let total: u32 = weights.iter().map(|(_, w)| w).sum();
        let mut roll = rng.random_range(0..total);
        for &(kind, weight) in weights {
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        ObstacleKind::Coin
    }

    fn title(prompt: &str) -> String {
        let words: Vec<String> = prompt
            .split_whitespace()
            .take(4)
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect();
        if words.is_empty() {
            "Mystery Run".to_string()
        } else {
            words.join(" ")
        }
    }
}

impl LevelSource for ProceduralSource {
    fn fetch(&self, prompt: &str) -> Result<String, LevelError> {
        let key = prompt.trim().to_lowercase();
        let mut rng = Pcg32::seed_from_u64(fnv1a(key.as_bytes()));

        let difficulty = Self::difficulty_for(&key);
        let weights = Self::weights(difficulty);
        let obstacles = (0..GENERATED_LENGTH)
            .map(|_| Self::draw(&mut rng, &weights))
            .collect();

        let level = LevelConfig {
            id: generated_id(prompt),
            name: Self::title(prompt),
            difficulty,
            description: format!(
                "A {} run built from \"{}\".",
                difficulty.as_str().to_lowercase(),
                prompt.trim()
            ),
            theme: Self::theme_for(&key),
            obstacles,
        };
        Ok(serde_json::to_string(&level)?)
    }
}

/// The always-valid level used when generation fails
pub fn fallback_level() -> LevelConfig {
    use ObstacleKind::*;
    LevelConfig {
        id: "fallback_error".to_string(),
        name: "Classic Fallback".to_string(),
        difficulty: Difficulty::Medium,
        description: "Network error? No problem. Here is a classic pipe run.".to_string(),
        theme: Theme::Overworld,
        obstacles: vec![
            Coin, Coin, Pipe, QuestionBlock, Shell, Gap, Pipe, Goomba, Coin, Shell, Pipe, Gap,
            Block, Goomba, Coin,
        ],
    }
}

/// Built-in levels shown in the menu
pub fn presets() -> Vec<LevelConfig> {
    use ObstacleKind::*;
    vec![
        LevelConfig {
            id: "classic_1_1".to_string(),
            name: "Classic 1-1".to_string(),
            difficulty: Difficulty::Easy,
            description: "The legendary beginning. Wide gaps and simple enemies.".to_string(),
            theme: Theme::Overworld,
            obstacles: vec![
                QuestionBlock, Coin, Block, QuestionBlock, Block, Piranha, Goomba, Pipe, Pipe,
                FireFlower, Gap, Block, Shell, QuestionBlock, Goomba, Piranha, Coin, Pipe, Goomba,
                Gap, Block, Shell, Block, Gap, Goomba, Piranha, Coin, FireFlower, Block,
                QuestionBlock,
            ],
        },
        LevelConfig {
            id: "dungeon_1_2".to_string(),
            name: "Deep Dungeon".to_string(),
            difficulty: Difficulty::Medium,
            description: "Underground blues. Watch out for plants!".to_string(),
            theme: Theme::Underground,
            obstacles: vec![
                Block, Block, Block, Gap, Piranha, Shell, Block, FireFlower, Gap, Piranha, Pipe,
                Goomba, QuestionBlock, Coin, Gap, Block,
            ],
        },
        LevelConfig {
            id: "castle_1_4".to_string(),
            name: "Bowser's Road".to_string(),
            difficulty: Difficulty::Hard,
            description: "Intense heat, fast speed, and tricky jumps.".to_string(),
            theme: Theme::Castle,
            obstacles: vec![
                Gap, Gap, Block, Gap, Piranha, Shell, Shell, Gap, Block, FireFlower, Gap, Gap,
                Piranha, Coin, Block, Goomba,
            ],
        },
    ]
}

/// Look up a preset by id
pub fn preset(id: &str) -> Option<LevelConfig> {
    presets().into_iter().find(|level| level.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource(fn() -> LevelError);

    impl LevelSource for FailingSource {
        fn fetch(&self, _prompt: &str) -> Result<String, LevelError> {
            Err((self.0)())
        }
    }

    struct CannedSource(&'static str);

    impl LevelSource for CannedSource {
        fn fetch(&self, _prompt: &str) -> Result<String, LevelError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_presets() {
        let levels = presets();
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[0].obstacles.len(), 30);
        assert_eq!(levels[2].theme, Theme::Castle);
        assert!(levels.iter().all(|l| !l.obstacles.is_empty()));
        assert_eq!(preset("dungeon_1_2").unwrap().difficulty, Difficulty::Medium);
        assert!(preset("world_9_9").is_none());
    }

    #[test]
    fn test_fallback_level() {
        let level = fallback_level();
        assert_eq!(level.id, "fallback_error");
        assert_eq!(level.obstacles.len(), 15);
        assert_eq!(level.obstacles[0], ObstacleKind::Coin);
    }

    #[test]
    fn test_parse_wire_format() {
        let json = r#"{
            "id": "custom",
            "name": "Custom",
            "difficulty": "Hard",
            "description": "d",
            "theme": "UNDERGROUND",
            "obstacles": ["PIPE", "GAP", "QUESTION_BLOCK"]
        }"#;
        let level = parse_level(json).unwrap();
        assert_eq!(level.id, "custom");
        assert_eq!(level.difficulty, Difficulty::Hard);
        assert_eq!(level.theme, Theme::Underground);
        assert_eq!(
            level.obstacles,
            vec![ObstacleKind::Pipe, ObstacleKind::Gap, ObstacleKind::QuestionBlock]
        );
    }

    #[test]
    fn test_parse_lenient_labels() {
        let json = r#"{"name":"x","difficulty":"Impossible","obstacles":["COIN"]}"#;
        let level = parse_level(json).unwrap();
        assert_eq!(level.difficulty, Difficulty::Medium);
        assert_eq!(level.theme, Theme::Overworld);
        assert!(level.id.starts_with("gen_"));
    }

    #[test]
    fn test_parse_rejects_bad_levels() {
        let empty = r#"{"name":"x","obstacles":[]}"#;
        assert!(matches!(parse_level(empty), Err(LevelError::EmptyObstacles)));

        let theme = r#"{"name":"x","theme":"SPACE","obstacles":["COIN"]}"#;
        assert!(matches!(parse_level(theme), Err(LevelError::UnknownTheme(t)) if t == "SPACE"));

        let token = r#"{"name":"x","obstacles":["LASER"]}"#;
        assert!(matches!(parse_level(token), Err(LevelError::Malformed(_))));

        assert!(matches!(parse_level("not json"), Err(LevelError::Malformed(_))));
    }

    #[test]
    fn test_generation_failures_fall_back() {
        let missing = FailingSource(|| LevelError::MissingCredential);
        assert_eq!(generate_level(&missing, "anything").id, "fallback_error");

        let offline = FailingSource(|| LevelError::Transport("offline".into()));
        assert_eq!(generate_level(&offline, "anything"), fallback_level());

        let garbage = CannedSource("{\"name\": 3}");
        assert_eq!(generate_level(&garbage, "anything").id, "fallback_error");
    }

    #[test]
    fn test_generated_id_from_prompt() {
        let canned = CannedSource(r#"{"id":"x","name":"n","obstacles":["PIPE"]}"#);
        let a = generate_level(&canned, "pipes everywhere");
        let b = generate_level(&canned, "more coins");
        assert!(a.id.starts_with("gen_"));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_procedural_is_stable_per_prompt() {
        let a = generate_level(&ProceduralSource, "a chill walk in the park");
        let b = generate_level(&ProceduralSource, "a chill walk in the park");
        assert_eq!(a, b);
        assert_eq!(a.obstacles.len(), GENERATED_LENGTH);
        assert_eq!(a.difficulty, Difficulty::Easy);
        assert_eq!(a.theme, Theme::Overworld);
        assert_eq!(a.name, "A Chill Walk In");
    }

    #[test]
    fn test_procedural_keywords() {
        let castle = generate_level(&ProceduralSource, "Insane LAVA castle");
        assert_eq!(castle.theme, Theme::Castle);
        assert_eq!(castle.difficulty, Difficulty::Hard);

        let cave = generate_level(&ProceduralSource, "spooky cave");
        assert_eq!(cave.theme, Theme::Underground);
        assert_eq!(cave.difficulty, Difficulty::Medium);
    }
}
