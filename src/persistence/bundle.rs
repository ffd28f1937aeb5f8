//! Versioned save envelope
//!
//! On disk the bundle is a flat JSON object:
//! `{version, timestamp, progress, settings, stats, adaptive, checksum}`.
//! The checksum covers the canonical payload (sorted keys, checksum removed).

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::adaptive::AdaptiveState;
use crate::adaptive::state::{ActiveAssists, DecayTimers};
use crate::consts::SAVE_VERSION;
use crate::error::StoreError;
use crate::progress::ProgressState;
use crate::session::SessionState;
use crate::settings::SettingsState;
use crate::stats::StatsState;

const CHECKSUM_FIELD: &str = "checksum";

/// Schema sections and the version that introduced them
const SECTIONS_BY_VERSION: &[(u32, &[&str])] = &[
    (1, &["progress", "settings"]),
    (2, &["stats", "adaptive"]),
];

/// Persisted snapshot of player state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveBundle {
    pub version: u32,
    /// Virtual epoch-ms of the write
    pub timestamp: u64,
    #[serde(flatten)]
    pub state: SessionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

impl SaveBundle {
    pub fn new(state: SessionState, timestamp: u64) -> Self {
        Self {
            version: SAVE_VERSION,
            timestamp,
            state,
            checksum: None,
        }
    }

    /// Serialize and append the checksum of the canonical payload
    pub fn encode(&self) -> Result<String, StoreError> {
        let mut fields = match serde_json::to_value(self).map_err(StoreError::Serialization)? {
            Value::Object(fields) => fields,
            other => return Ok(other.to_string()),
        };
        fields.remove(CHECKSUM_FIELD);
        let sum = checksum(&canonical(&fields)?);
        fields.insert(CHECKSUM_FIELD.to_string(), Value::String(sum));
        serde_json::to_string(&fields).map_err(StoreError::Serialization)
    }
}

/// Integrity verdict for a loaded payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Integrity {
    Verified,
    /// Payload carried no checksum (pre-checksum saves)
    Missing,
    Mismatch { stored: String, computed: String },
}

/// Raw payload after checksum extraction
#[derive(Debug, Clone)]
pub struct DecodedPayload {
    pub fields: Map<String, Value>,
    pub integrity: Integrity,
}

/// Parse a stored payload and verify its checksum.
///
/// A mismatch is reported, not rejected; only unparsable input is an error.
pub fn decode(text: &str) -> Result<DecodedPayload, StoreError> {
    let mut fields: Map<String, Value> =
        serde_json::from_str(text).map_err(StoreError::MalformedSaveData)?;

    let stored = fields.remove(CHECKSUM_FIELD);
    let computed = checksum(&canonical(&fields)?);
    let integrity = match stored {
        None => Integrity::Missing,
        Some(Value::String(stored)) if stored == computed => Integrity::Verified,
        Some(other) => Integrity::Mismatch {
            stored: match other {
                Value::String(s) => s,
                v => v.to_string(),
            },
            computed,
        },
    };

    Ok(DecodedPayload { fields, integrity })
}

fn canonical(fields: &Map<String, Value>) -> Result<String, StoreError> {
    serde_json::to_string(fields).map_err(StoreError::Serialization)
}

/// 32-bit FNV-1a over the payload, as 8 hex digits
pub fn checksum(payload: &str) -> String {
    const OFFSET_BASIS: u32 = 0x811C_9DC5;
    const PRIME: u32 = 0x0100_0193;

    let hash = payload
        .bytes()
        .fold(OFFSET_BASIS, |hash, byte| (hash ^ u32::from(byte)).wrapping_mul(PRIME));
    format!("{:08x}", hash)
}

/// Schema version of a payload (missing or zero means v1)
pub fn source_version(fields: &Map<String, Value>) -> u32 {
    fields
        .get("version")
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .filter(|&v| v >= 1)
        .unwrap_or(1)
}

/// Bring a payload from `from_version` up to the current schema.
///
/// Sections that existed in the source schema are kept verbatim. Sections
/// introduced later are replaced wholesale with fresh defaults.
pub fn migrate(mut fields: Map<String, Value>, from_version: u32) -> Map<String, Value> {
    let defaults = default_sections();

    for &(introduced, sections) in SECTIONS_BY_VERSION {
        if introduced <= from_version {
            continue;
        }
        for &section in sections {
            if let Some(value) = defaults.get(section) {
                fields.insert(section.to_string(), value.clone());
            }
        }
    }
    fields.insert("version".to_string(), Value::from(from_version.max(SAVE_VERSION)));
    fields
}

fn default_sections() -> Map<String, Value> {
    match serde_json::to_value(SessionState::default()) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

/// Build a full `SessionState` from a payload of any shape.
///
/// Each named sub-record is merged against its defaults field by field: known
/// fields with a usable value are kept, everything else falls back.
pub fn merge_with_defaults(fields: &Map<String, Value>) -> SessionState {
    let stats = fields.get("stats");
    let adaptive = fields.get("adaptive");

    SessionState {
        progress: merge_record::<ProgressState>(fields.get("progress")),
        settings: merge_record::<SettingsState>(fields.get("settings")),
        stats: StatsState {
            session: merge_record(stats.and_then(|s| s.get("session"))),
            performance: merge_record(stats.and_then(|s| s.get("performance"))),
            progression: merge_record(stats.and_then(|s| s.get("progression"))),
        },
        adaptive: AdaptiveState {
            active_assists: merge_record::<ActiveAssists>(
                adaptive.and_then(|a| a.get("activeAssists")),
            ),
            decay_timers: merge_record::<DecayTimers>(adaptive.and_then(|a| a.get("decayTimers"))),
            last_evaluation: adaptive
                .and_then(|a| a.get("lastEvaluation"))
                .and_then(Value::as_u64)
                .unwrap_or(0),
        },
    }
}

/// Overlay `loaded` onto `T::default()` one field at a time
fn merge_record<T>(loaded: Option<&Value>) -> T
where
    T: Serialize + DeserializeOwned + Default,
{
    let mut merged = match serde_json::to_value(T::default()) {
        Ok(Value::Object(map)) => map,
        _ => return T::default(),
    };

    if let Some(Value::Object(loaded)) = loaded {
        for (key, value) in loaded {
            if !merged.contains_key(key) {
                continue;
            }
            let mut candidate = merged.clone();
            candidate.insert(key.clone(), value.clone());
            if serde_json::from_value::<T>(Value::Object(candidate)).is_ok() {
                merged.insert(key.clone(), value.clone());
            } else {
                log::warn!("Save field `{}` has an unusable value, using default", key);
            }
        }
    }

    serde_json::from_value(Value::Object(merged)).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_state() -> SessionState {
        let mut state = SessionState::default();
        state.progress.high_score = 4_250;
        state.progress.unlocked_level = 14;
        state.settings.volume = 0.35;
        state.stats.session.paddle_hits = 31;
        state.adaptive.active_assists.paddle_width_mod = 1.2;
        state.adaptive.decay_timers.paddle_width = 987_654;
        state
    }

    #[test]
    fn test_checksum_known_values() {
        // FNV-1a reference vectors
        assert_eq!(checksum(""), "811c9dc5");
        assert_eq!(checksum("a"), "e40c292c");
    }

    #[test]
    fn test_encode_decode_verifies() {
        let bundle = SaveBundle::new(sample_state(), 1_700_000_000_000);
        let text = bundle.encode().unwrap();
        let decoded = decode(&text).unwrap();
        assert_eq!(decoded.integrity, Integrity::Verified);
        assert!(!decoded.fields.contains_key(CHECKSUM_FIELD));
        assert_eq!(merge_with_defaults(&decoded.fields), bundle.state);
    }

    #[test]
    fn test_edited_value_is_detected() {
        let text = SaveBundle::new(sample_state(), 5).encode().unwrap();
        let tampered = text.replace("\"highScore\":4250", "\"highScore\":4259");
        assert_ne!(text, tampered);

        let decoded = decode(&tampered).unwrap();
        assert!(matches!(decoded.integrity, Integrity::Mismatch { .. }));
        // Data is still usable
        assert_eq!(merge_with_defaults(&decoded.fields).progress.high_score, 4_259);
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            decode("{not json"),
            Err(StoreError::MalformedSaveData(_))
        ));
        assert!(matches!(decode("[1,2]"), Err(StoreError::MalformedSaveData(_))));
    }

    #[test]
    fn test_source_version() {
        let fields = |v: Value| v.as_object().cloned().unwrap();
        assert_eq!(source_version(&fields(json!({}))), 1);
        assert_eq!(source_version(&fields(json!({"version": 0}))), 1);
        assert_eq!(source_version(&fields(json!({"version": "2"}))), 1);
        assert_eq!(source_version(&fields(json!({"version": 2}))), 2);
    }

    #[test]
    fn test_migrate_v1_keeps_progress_and_settings() {
        let v1 = json!({
            "version": 1,
            "progress": {"currentLevel": 7, "highScore": 900, "unlockedLevel": 8,
                         "levelsCompleted": 6, "score": 120, "lives": 2},
            "settings": {"volume": 0.2, "muted": true, "reducedMotion": true, "showStats": true},
            "stats": {"session": {"paddleHits": 999}},
        });
        let migrated = migrate(v1.as_object().cloned().unwrap(), 1);
        assert_eq!(migrated["progress"], v1["progress"]);
        assert_eq!(migrated["settings"], v1["settings"]);
        assert_eq!(migrated["version"], json!(SAVE_VERSION));

        let state = merge_with_defaults(&migrated);
        assert_eq!(state.stats, StatsState::default());
        assert_eq!(state.adaptive, AdaptiveState::default());
        assert_eq!(state.progress.current_level, 7);
        assert!(state.settings.muted);
    }

    #[test]
    fn test_migrate_current_is_noop() {
        let fields = serde_json::to_value(SaveBundle::new(sample_state(), 1))
            .unwrap()
            .as_object()
            .cloned()
            .unwrap();
        assert_eq!(migrate(fields.clone(), SAVE_VERSION), fields);
    }

    #[test]
    fn test_merge_fills_missing_and_bad_fields() {
        let partial = json!({
            "progress": {"highScore": 77, "lives": "three", "bogus": 1},
            "settings": "not an object",
            "stats": {"performance": {"precisionRatio": 55, "hitConsistency": -4}},
            "adaptive": {"activeAssists": {"ballSpeedMod": 0.85}, "lastEvaluation": 1234},
        });
        let state = merge_with_defaults(partial.as_object().unwrap());

        assert_eq!(state.progress.high_score, 77);
        assert_eq!(state.progress.lives, 3);
        assert_eq!(state.settings, SettingsState::default());
        assert_eq!(state.stats.performance.precision_ratio, 55);
        assert_eq!(state.stats.performance.hit_consistency, 0);
        assert_eq!(state.stats.session.max_concurrent_balls, 1);
        assert_eq!(state.adaptive.active_assists.ball_speed_mod, 0.85);
        assert_eq!(state.adaptive.active_assists.paddle_width_mod, 1.0);
        assert_eq!(state.adaptive.last_evaluation, 1_234);
    }

    #[test]
    fn test_merge_empty_is_defaults() {
        assert_eq!(merge_with_defaults(&Map::new()), SessionState::default());
    }
}
