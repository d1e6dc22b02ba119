use directories::ProjectDirs;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::scoring::calculate_score_with_exponent;
use crate::util::round_to;

/// Ruleset governing a single game session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub total_rounds: u32,
    pub min_target_time: f64,
    pub max_target_time: f64,
    /// decimal places kept on generated targets
    pub target_precision: i32,
    pub max_points_per_round: f64,
    pub scoring_exponent: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_rounds: 5,
            min_target_time: 2.0,
            max_target_time: 8.0,
            target_precision: 1,
            max_points_per_round: 1000.0,
            scoring_exponent: 2.0,
        }
    }
}

/// Outcome of [`GameConfig::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Largest per-round maximum whose scores stay exact whole numbers
pub const MAX_POINTS_PER_ROUND: f64 = 9_007_199_254_740_991.0;

fn is_positive(value: f64) -> bool {
    // NaN fails this comparison as well
    value > 0.0
}

impl GameConfig {
    /// Check every field and collect all violations in field order.
    pub fn validate(&self) -> Validation {
        let mut errors = Vec::new();

        if self.total_rounds < 1 {
            errors.push("totalRounds must be a positive number".to_string());
        }

        if !is_positive(self.min_target_time) {
            errors.push("minTargetTime must be a positive number".to_string());
        }

        if !is_positive(self.max_target_time) {
            errors.push("maxTargetTime must be a positive number".to_string());
        }

        if self.min_target_time >= self.max_target_time {
            errors.push("minTargetTime must be less than maxTargetTime".to_string());
        }

        if self.target_precision < 0 {
            errors.push("targetPrecision must be a non-negative number".to_string());
        }

        if !is_positive(self.max_points_per_round) {
            errors.push("maxPointsPerRound must be a positive number".to_string());
        }

        if !is_positive(self.scoring_exponent) {
            errors.push("scoringExponent must be a positive number".to_string());
        }

        if self.max_points_per_round > MAX_POINTS_PER_ROUND {
            errors.push(format!(
                "maxPointsPerRound must not exceed {MAX_POINTS_PER_ROUND}"
            ));
        }

        Validation {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Draw a target uniformly from `[min_target_time, max_target_time)` and
    /// round it to `target_precision` decimals.
    pub fn generate_target_time<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let range = self.max_target_time - self.min_target_time;
        let raw = self.min_target_time + rng.gen::<f64>() * range;
        round_to(raw, self.target_precision)
    }

    /// Score a round with this ruleset's points and exponent.
    pub fn score(&self, target_time: f64, elapsed_time: f64) -> u64 {
        calculate_score_with_exponent(
            target_time,
            elapsed_time,
            self.max_points_per_round,
            self.scoring_exponent,
        )
    }
}

/// Partial configuration; `Some` fields replace the base value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub total_rounds: Option<u32>,
    pub min_target_time: Option<f64>,
    pub max_target_time: Option<f64>,
    pub target_precision: Option<i32>,
    pub max_points_per_round: Option<f64>,
    pub scoring_exponent: Option<f64>,
}

impl ConfigOverrides {
    pub fn apply_to(&self, base: &GameConfig) -> GameConfig {
        GameConfig {
            total_rounds: self.total_rounds.unwrap_or(base.total_rounds),
            min_target_time: self.min_target_time.unwrap_or(base.min_target_time),
            max_target_time: self.max_target_time.unwrap_or(base.max_target_time),
            target_precision: self.target_precision.unwrap_or(base.target_precision),
            max_points_per_round: self
                .max_points_per_round
                .unwrap_or(base.max_points_per_round),
            scoring_exponent: self.scoring_exponent.unwrap_or(base.scoring_exponent),
        }
    }
}

/// Merge overrides onto the defaults. Callers validate the result.
pub fn create_config(overrides: &ConfigOverrides) -> GameConfig {
    overrides.apply_to(&GameConfig::default())
}

pub trait ConfigStore {
    fn load(&self) -> GameConfig;
    fn save(&self, cfg: &GameConfig) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "blind-timer") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("blind_timer_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> GameConfig {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<GameConfig>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!(path = %self.path.display(), "ignoring config file: {e}"),
            }
        }
        GameConfig::default()
    }

    fn save(&self, cfg: &GameConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).map_err(std::io::Error::other)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::tempdir;

    #[test]
    fn default_config_values() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.total_rounds, 5);
        assert_eq!(cfg.min_target_time, 2.0);
        assert_eq!(cfg.max_target_time, 8.0);
        assert_eq!(cfg.target_precision, 1);
        assert_eq!(cfg.max_points_per_round, 1000.0);
        assert_eq!(cfg.scoring_exponent, 2.0);
    }

    #[test]
    fn default_config_is_valid() {
        let result = GameConfig::default().validate();
        assert!(result.valid);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn rejects_zero_rounds() {
        let cfg = GameConfig {
            total_rounds: 0,
            ..GameConfig::default()
        };
        let result = cfg.validate();
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("totalRounds")));
    }

    #[test]
    fn rejects_negative_min_target() {
        let cfg = GameConfig {
            min_target_time: -1.0,
            ..GameConfig::default()
        };
        let result = cfg.validate();
        assert!(!result.valid);
        assert!(result.errors.iter().any(|e| e.contains("minTargetTime")));
    }

    #[test]
    fn rejects_min_not_below_max() {
        let cfg = GameConfig {
            min_target_time: 8.0,
            max_target_time: 8.0,
            ..GameConfig::default()
        };
        let result = cfg.validate();
        assert_eq!(
            result.errors,
            vec!["minTargetTime must be less than maxTargetTime".to_string()]
        );
    }

    #[test]
    fn rejects_negative_precision_and_nan_exponent() {
        let cfg = GameConfig {
            target_precision: -1,
            scoring_exponent: f64::NAN,
            ..GameConfig::default()
        };
        let result = cfg.validate();
        assert_eq!(
            result.errors,
            vec![
                "targetPrecision must be a non-negative number".to_string(),
                "scoringExponent must be a positive number".to_string(),
            ]
        );
    }

    #[test]
    fn reports_every_violation_in_field_order() {
        let cfg = GameConfig {
            total_rounds: 0,
            min_target_time: 0.0,
            max_target_time: -2.0,
            target_precision: -3,
            max_points_per_round: 0.0,
            scoring_exponent: -1.0,
        };
        let result = cfg.validate();
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec![
                "totalRounds must be a positive number",
                "minTargetTime must be a positive number",
                "maxTargetTime must be a positive number",
                "minTargetTime must be less than maxTargetTime",
                "targetPrecision must be a non-negative number",
                "maxPointsPerRound must be a positive number",
                "scoringExponent must be a positive number",
            ]
        );
    }

    #[test]
    fn large_max_points_score_exactly() {
        let cfg = GameConfig {
            max_points_per_round: 1e10,
            ..GameConfig::default()
        };
        assert!(cfg.validate().valid);
        assert_eq!(cfg.score(5.0, 5.0), 10_000_000_000);
        assert_eq!(cfg.score(5.0, 4.0), 6_400_000_000);
    }

    #[test]
    fn rejects_max_points_beyond_exact_integers() {
        let cfg = GameConfig {
            max_points_per_round: 1e20,
            ..GameConfig::default()
        };
        let result = cfg.validate();
        assert!(!result.valid);
        assert_eq!(
            result.errors,
            vec!["maxPointsPerRound must not exceed 9007199254740991".to_string()]
        );

        let at_limit = GameConfig {
            max_points_per_round: MAX_POINTS_PER_ROUND,
            ..GameConfig::default()
        };
        assert!(at_limit.validate().valid);
    }

    #[test]
    fn create_config_without_overrides_is_default() {
        assert_eq!(
            create_config(&ConfigOverrides::default()),
            GameConfig::default()
        );
    }

    #[test]
    fn create_config_merges_overrides() {
        let cfg = create_config(&ConfigOverrides {
            total_rounds: Some(10),
            max_target_time: Some(12.5),
            ..ConfigOverrides::default()
        });
        assert_eq!(cfg.total_rounds, 10);
        assert_eq!(cfg.max_target_time, 12.5);
        assert_eq!(cfg.min_target_time, 2.0);
        assert_eq!(cfg.max_points_per_round, 1000.0);
    }

    #[test]
    fn create_config_does_not_validate() {
        let cfg = create_config(&ConfigOverrides {
            total_rounds: Some(0),
            ..ConfigOverrides::default()
        });
        assert_eq!(cfg.total_rounds, 0);
        assert!(!cfg.validate().valid);
    }

    #[test]
    fn generated_targets_stay_in_range_and_precision() {
        let mut rng = StdRng::seed_from_u64(7);
        let cfg = GameConfig::default();
        for _ in 0..1000 {
            let t = cfg.generate_target_time(&mut rng);
            assert!((2.0..=8.0).contains(&t), "out of range: {t}");
            assert!(((t * 10.0).round() - t * 10.0).abs() < 1e-9, "precision: {t}");
        }
    }

    #[test]
    fn generated_targets_with_huge_precision_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(1);
        for precision in [15, 20, 308, 400, i32::MAX] {
            let cfg = GameConfig {
                target_precision: precision,
                ..GameConfig::default()
            };
            assert!(cfg.validate().valid);
            for _ in 0..100 {
                let t = cfg.generate_target_time(&mut rng);
                assert!((2.0..=8.0).contains(&t), "precision {precision}: {t}");
            }
        }
    }

    #[test]
    fn generated_targets_with_zero_precision_are_whole() {
        let mut rng = StdRng::seed_from_u64(42);
        let cfg = GameConfig {
            target_precision: 0,
            min_target_time: 1.0,
            max_target_time: 3.0,
            ..GameConfig::default()
        };
        for _ in 0..200 {
            let t = cfg.generate_target_time(&mut rng);
            assert_eq!(t, t.round());
            assert!((1.0..=3.0).contains(&t));
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let cfg = GameConfig::default();
        let a: Vec<f64> = {
            let mut rng = StdRng::seed_from_u64(99);
            (0..5).map(|_| cfg.generate_target_time(&mut rng)).collect()
        };
        let b: Vec<f64> = {
            let mut rng = StdRng::seed_from_u64(99);
            (0..5).map(|_| cfg.generate_target_time(&mut rng)).collect()
        };
        assert_eq!(a, b);
    }

    #[test]
    fn score_uses_configured_exponent() {
        let quadratic = GameConfig::default();
        assert_eq!(quadratic.score(5.0, 4.0), 640);

        let linear = GameConfig {
            scoring_exponent: 1.0,
            ..GameConfig::default()
        };
        assert_eq!(linear.score(5.0, 4.0), 800);
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = GameConfig::default();
        store.save(&cfg).unwrap();
        let loaded = store.load();
        assert_eq!(cfg, loaded);
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let store = FileConfigStore::with_path(&path);
        let cfg = GameConfig {
            total_rounds: 3,
            min_target_time: 1.5,
            max_target_time: 4.0,
            target_precision: 2,
            max_points_per_round: 500.0,
            scoring_exponent: 3.0,
        };
        store.save(&cfg).unwrap();
        assert_eq!(store.load(), cfg);
    }

    #[test]
    fn broken_config_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, b"{ not json").unwrap();
        let store = FileConfigStore::with_path(&path);
        assert_eq!(store.load(), GameConfig::default());
    }

    #[test]
    fn partial_config_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, br#"{ "total_rounds": 3 }"#).unwrap();
        let store = FileConfigStore::with_path(&path);
        let cfg = store.load();
        assert_eq!(cfg.total_rounds, 3);
        assert_eq!(cfg.max_target_time, 8.0);
    }
}
