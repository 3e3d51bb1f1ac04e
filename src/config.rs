//! Configuration for Ritual Studio
//! Typed, serde-backed settings for the effects, session, and audio library

use serde::{Deserialize, Serialize};

// ============================================================================
// Effect configuration
// ============================================================================

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct LungsConfig {
    /// Particle count at healing level 0; the active count shrinks to
    /// floor(base_count * (1 - healing_level)) as days complete.
    pub base_count: usize,
    pub min_size: f32,
    pub size_jitter: f32,
    /// Velocity components are drawn from [-max_speed/2, max_speed/2].
    pub max_speed: f32,
    /// Horizontal scatter around each lung cluster center, in surface units.
    pub cluster_jitter: f32,
}

impl Default for LungsConfig {
    fn default() -> Self {
        Self {
            base_count: 200,
            min_size: 1.0,
            size_jitter: 4.0,
            max_speed: 0.5,
            cluster_jitter: 60.0,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ShieldConfig {
    pub ring_count: usize,
    /// Delay between consecutive ring spawns, seconds.
    pub stagger: f32,
    /// Total animation length, seconds.
    pub duration: f32,
    /// Rings expand over this fraction of the total duration.
    pub expand_fraction: f32,
    /// Max ring radius as a multiple of half the smaller surface extent.
    pub radius_scale: f32,
    pub min_line_width: f32,
    pub line_width_jitter: f32,
    /// Hold the final frame this long before clearing, seconds.
    pub clear_delay: f32,
}

impl Default for ShieldConfig {
    fn default() -> Self {
        Self {
            ring_count: 3,
            stagger: 0.3,
            duration: 3.0,
            expand_fraction: 0.8,
            radius_scale: 1.1,
            min_line_width: 2.0,
            line_width_jitter: 2.0,
            clear_delay: 0.5,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct DissolveConfig {
    pub count: usize,
    /// Opacity lost per frame. Per-frame, not dt-scaled: termination is
    /// bounded by ceil(1/decay_step) steps regardless of frame rate.
    pub decay_step: f32,
    pub min_size: f32,
    pub size_jitter: f32,
    /// Upward drift is drawn from [min_rise, min_rise + rise_jitter],
    /// surface units per frame.
    pub min_rise: f32,
    pub rise_jitter: f32,
}

impl Default for DissolveConfig {
    fn default() -> Self {
        Self {
            count: 200,
            decay_step: 0.01,
            min_size: 1.0,
            size_jitter: 2.0,
            min_rise: 0.5,
            rise_jitter: 1.0,
        }
    }
}

// ============================================================================
// Session & audio library
// ============================================================================

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct SessionConfig {
    /// Daily ritual length, seconds.
    pub duration_secs: f32,
    /// Seconds each affirmation stays on screen.
    pub affirmation_secs: f32,
    /// Release ritual: the written text clears this long after dissolve.
    pub release_clear_secs: f32,
    /// Release ritual: the affirmation appears this long after dissolve.
    pub release_affirmation_secs: f32,
    /// Shield button stays disabled this long after triggering.
    pub shield_cooldown_secs: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: 7.0 * 60.0,
            affirmation_secs: 5.0,
            release_clear_secs: 2.0,
            release_affirmation_secs: 2.5,
            shield_cooldown_secs: 3.0,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct FrequencyTrack {
    pub name: String,
    pub path: String,
}

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct AudioConfig {
    /// Healing frequency tracks offered as standalone loops.
    pub frequencies: Vec<FrequencyTrack>,
    /// Track played during the daily ritual session.
    pub ritual_track: FrequencyTrack,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            frequencies: vec![
                FrequencyTrack {
                    name: "528 Hz".to_string(),
                    path: "assets/freq-528.mp3".to_string(),
                },
                FrequencyTrack {
                    name: "639 Hz".to_string(),
                    path: "assets/freq-639.mp3".to_string(),
                },
                FrequencyTrack {
                    name: "741 Hz".to_string(),
                    path: "assets/freq-741.mp3".to_string(),
                },
            ],
            ritual_track: FrequencyTrack {
                name: "ritual".to_string(),
                path: "assets/binaural-beats-module-2.mp3".to_string(),
            },
        }
    }
}

// ============================================================================
// Main App Configuration
// ============================================================================

#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub lungs: LungsConfig,
    #[serde(default)]
    pub shield: ShieldConfig,
    #[serde(default)]
    pub dissolve: DissolveConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    /// Where the 21-day progress record lives.
    #[serde(default = "default_progress_path")]
    pub progress_path: String,
}

fn default_progress_path() -> String {
    "healing-progress.json".to_string()
}

impl AppConfig {
    pub fn save(&self, path: &str) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &str) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        Ok(config)
    }

    /// Missing or unreadable config is not an error; defaults apply.
    pub fn load_or_default(path: &str) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::info!("using default configuration ({e})");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_ritual_constants() {
        let c = AppConfig::default();
        assert_eq!(c.lungs.base_count, 200);
        assert_eq!(c.shield.ring_count, 3);
        assert!((c.shield.duration - 3.0).abs() < f32::EPSILON);
        assert!((c.shield.stagger - 0.3).abs() < f32::EPSILON);
        assert!((c.shield.expand_fraction - 0.8).abs() < f32::EPSILON);
        assert_eq!(c.dissolve.count, 200);
        assert!((c.dissolve.decay_step - 0.01).abs() < f32::EPSILON);
        assert!((c.session.duration_secs - 420.0).abs() < f32::EPSILON);
        assert_eq!(c.audio.frequencies.len(), 3);
    }

    #[test]
    fn roundtrips_through_json() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.lungs.base_count, config.lungs.base_count);
        assert_eq!(back.audio.ritual_track.path, config.audio.ritual_track.path);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let json = r#"{ "session": { "duration_secs": 10.0,
                                     "affirmation_secs": 5.0,
                                     "release_clear_secs": 2.0,
                                     "release_affirmation_secs": 2.5,
                                     "shield_cooldown_secs": 3.0 } }"#;
        let back: AppConfig = serde_json::from_str(json).unwrap();
        assert!((back.session.duration_secs - 10.0).abs() < f32::EPSILON);
        assert_eq!(back.lungs.base_count, 200);
        assert_eq!(back.progress_path, "healing-progress.json");
    }
}
