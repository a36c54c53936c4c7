use std::fmt;
use std::time::Duration;

use magiclamp::{AnimationParameters, EasingCurve};
use serde::de::{self, Deserializer};
use serde::Serializer;
use serde::{Deserialize, Serialize};

/// File name looked up inside the configuration directory.
pub const CONFIG_FILE_NAME: &str = "magiclamp.toml";

pub const MAX_GRID_RESOLUTION: u32 = 256;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LampConfig {
    pub version: u32,
    /// Base animation time; per-stage durations derive from it unless
    /// overridden in `[stages]`.
    #[serde(
        default = "default_duration",
        deserialize_with = "deserialize_duration",
        serialize_with = "serialize_duration"
    )]
    pub duration: Duration,
    #[serde(default = "default_grid_resolution")]
    pub grid_resolution: u32,
    #[serde(default = "default_max_bump_distance")]
    pub max_bump_distance: i32,
    #[serde(default = "default_shape_factor")]
    pub initial_shape_factor: f64,
    #[serde(default)]
    pub shape_curve: EasingCurve,
    #[serde(default)]
    pub stages: StageDurations,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StageDurations {
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        serialize_with = "serialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub squash: Option<Duration>,
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        serialize_with = "serialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub stretch: Option<Duration>,
    #[serde(
        default,
        deserialize_with = "deserialize_duration_opt",
        serialize_with = "serialize_duration_opt",
        skip_serializing_if = "Option::is_none"
    )]
    pub bump: Option<Duration>,
}

impl Default for LampConfig {
    fn default() -> Self {
        Self {
            version: 1,
            duration: default_duration(),
            stages: StageDurations::default(),
            grid_resolution: default_grid_resolution(),
            max_bump_distance: default_max_bump_distance(),
            initial_shape_factor: default_shape_factor(),
            shape_curve: EasingCurve::default(),
        }
    }
}

fn default_duration() -> Duration {
    Duration::from_millis(250)
}

fn default_grid_resolution() -> u32 {
    20
}

fn default_max_bump_distance() -> i32 {
    20
}

fn default_shape_factor() -> f64 {
    0.7
}

/// Durations are written back as humantime strings (`"250ms"`).
fn serialize_duration<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&humantime::format_duration(*duration))
}

fn serialize_duration_opt<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match duration {
        Some(duration) => serialize_duration(duration, serializer),
        None => serializer.serialize_none(),
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_duration_opt(deserializer).map(|d| d.unwrap_or_else(default_duration))
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    struct Visitor;
    impl<'de> de::Visitor<'de> for Visitor {
        type Value = Option<Duration>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a duration as number of milliseconds or human-readable string")
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            humantime::parse_duration(v.trim())
                .map(Some)
                .map_err(|err| E::custom(format!("invalid duration '{v}': {err}")))
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(Duration::from_millis(v)))
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if v < 0 {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_millis(v as u64)))
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() || v.is_sign_negative() {
                return Err(E::custom("duration must be non-negative"));
            }
            Ok(Some(Duration::from_nanos((v * 1_000_000.0).round() as u64)))
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(Visitor)
}

impl LampConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: LampConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.duration.is_zero() {
            return Err(ConfigError::Invalid("duration must be greater than zero".into()));
        }

        for (name, value) in [
            ("squash", self.stages.squash),
            ("stretch", self.stages.stretch),
            ("bump", self.stages.bump),
        ] {
            if value.is_some_and(|duration| duration.is_zero()) {
                return Err(ConfigError::Invalid(format!(
                    "stages.{name} must be greater than zero"
                )));
            }
        }

        if !(1..=MAX_GRID_RESOLUTION).contains(&self.grid_resolution) {
            return Err(ConfigError::Invalid(format!(
                "grid_resolution must be between 1 and {MAX_GRID_RESOLUTION}, got {}",
                self.grid_resolution
            )));
        }

        if self.max_bump_distance < 0 {
            return Err(ConfigError::Invalid("max_bump_distance must be >= 0".into()));
        }

        if !(0.0..=1.0).contains(&self.initial_shape_factor) {
            return Err(ConfigError::Invalid(format!(
                "initial_shape_factor must be within [0, 1], got {}",
                self.initial_shape_factor
            )));
        }

        Ok(())
    }

    /// Parameters handed to every new animation model.
    pub fn animation_parameters(&self) -> AnimationParameters {
        let mut params = AnimationParameters::from_base_duration(self.duration);
        if let Some(squash) = self.stages.squash {
            params.squash_duration = squash;
        }
        if let Some(stretch) = self.stages.stretch {
            params.stretch_duration = stretch;
        }
        if let Some(bump) = self.stages.bump {
            params.bump_duration = bump;
        }
        params.shape_curve = self.shape_curve;
        params.shape_factor = self.initial_shape_factor;
        params.max_bump_distance = self.max_bump_distance;
        tracing::trace!(?params, "derived animation parameters");
        params
    }

    pub fn grid_resolution(&self) -> u32 {
        self.grid_resolution
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
version = 1
duration = "400ms"
grid_resolution = 32
max_bump_distance = 12
initial_shape_factor = 0.5
shape_curve = "out-cubic"

[stages]
bump = 90
"#;

    #[test]
    fn parses_sample_config() {
        let config = LampConfig::from_toml_str(SAMPLE).expect("parse config");
        assert_eq!(config.version, 1);
        assert_eq!(config.duration, Duration::from_millis(400));
        assert_eq!(config.grid_resolution(), 32);
        assert_eq!(config.shape_curve, EasingCurve::OutCubic);
        assert_eq!(config.stages.bump, Some(Duration::from_millis(90)));

        let params = config.animation_parameters();
        assert_eq!(params.squash_duration, Duration::from_millis(400));
        assert_eq!(params.stretch_duration, Duration::from_millis(160));
        assert_eq!(params.bump_duration, Duration::from_millis(90));
        assert_eq!(params.max_bump_distance, 12);
        assert_eq!(params.shape_factor, 0.5);
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = LampConfig::from_toml_str("version = 1").unwrap();
        assert_eq!(config, LampConfig::default());
        assert_eq!(config.animation_parameters(), AnimationParameters::default());
    }

    #[test]
    fn accepts_bezier_curve_table() {
        let config = LampConfig::from_toml_str(
            r#"
version = 1
shape_curve = { cubic-bezier = [0.25, 0.1, 0.25, 1.0] }
"#,
        )
        .unwrap();
        assert!(matches!(config.shape_curve, EasingCurve::CubicBezier { .. }));
    }

    #[test]
    fn rejects_bezier_with_out_of_range_x() {
        let err = LampConfig::from_toml_str(
            r#"
version = 1
shape_curve = { cubic-bezier = [1.5, 0.0, 0.5, 1.0] }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_unknown_curve_name() {
        let err = LampConfig::from_toml_str("version = 1\nshape_curve = \"wobbly\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn rejects_out_of_range_values() {
        for input in [
            "version = 2",
            "version = 1\nduration = 0",
            "version = 1\ngrid_resolution = 0",
            "version = 1\ngrid_resolution = 1000",
            "version = 1\nmax_bump_distance = -1",
            "version = 1\ninitial_shape_factor = 1.5",
            "version = 1\n[stages]\nsquash = \"0s\"",
        ] {
            let err = LampConfig::from_toml_str(input).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{input} should be invalid");
        }
    }

    #[test]
    fn rejects_negative_duration() {
        let err = LampConfig::from_toml_str("version = 1\nduration = -5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn serialized_config_reads_back() {
        let mut config = LampConfig::from_toml_str(SAMPLE).unwrap();
        config.stages.stretch = Some(Duration::from_micros(12_500));
        config.shape_curve = EasingCurve::cubic_bezier(0.25, 0.1, 0.25, 1.0).unwrap();

        let text = toml::to_string(&config).unwrap();
        assert!(text.contains("duration = \"400ms\""), "{text}");
        assert!(text.contains("bump = \"90ms\""), "{text}");
        assert_eq!(LampConfig::from_toml_str(&text).unwrap(), config);

        let text = toml::to_string(&LampConfig::default()).unwrap();
        assert_eq!(LampConfig::from_toml_str(&text).unwrap(), LampConfig::default());
    }

    #[test]
    fn fractional_milliseconds_are_kept() {
        let config = LampConfig::from_toml_str("version = 1\nduration = 12.5").unwrap();
        assert_eq!(config.duration, Duration::from_micros(12_500));
    }
}
