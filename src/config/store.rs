//! Per-asset sidecar configuration.
//!
//! Each source raster may carry a `<file>.json` sidecar. Known keys are modelled as optional
//! fields that are defaulted explicitly at resolve time; unknown keys are kept in
//! [`SidecarRecord::extra`] and written back untouched.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    assets::naming::sidecar_path,
    foundation::{
        error::{ChromacutError, ChromacutResult},
        fsio,
    },
    segment::chroma::ChromaKey,
};

/// Recognised option names, in the order they are persisted.
pub const KNOWN_KEYS: &[&str] = &[
    "blue_threshold",
    "blue_ratio",
    "dark_blue_min",
    "dark_component_max",
    "paper_alpha",
    "scale",
];

/// Fallback values for every recognised option.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConfigDefaults {
    pub blue_threshold: i64,
    pub blue_ratio: f64,
    pub dark_blue_min: i64,
    pub dark_component_max: i64,
    /// Foreground opacity used when compositing onto paper. Seeded into new sidecars.
    pub paper_alpha: f64,
    pub scale: f64,
}

impl ConfigDefaults {
    /// Apply the same bounds as [`SidecarRecord::set`] to every default.
    pub fn validate(&self) -> ChromacutResult<()> {
        let mut check = SidecarRecord::default();
        check.set("blue_ratio", self.blue_ratio)?;
        check.set("paper_alpha", self.paper_alpha)?;
        check.set("scale", self.scale)?;
        Ok(())
    }
}

impl Default for ConfigDefaults {
    fn default() -> Self {
        Self {
            blue_threshold: 60,
            blue_ratio: 1.1,
            dark_blue_min: 40,
            dark_component_max: 80,
            paper_alpha: 0.6,
            scale: 1.0,
        }
    }
}

/// On-disk shape of a sidecar. Every known key is optional.
///
/// Keys are read one by one: a known key holding an unusable value reads as unset, is logged,
/// and is carried in `extra` so the file keeps it. Integer keys accept integral floats (`60.0`).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SidecarRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue_threshold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blue_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_blue_min: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark_component_max: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper_alpha: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
    /// Keys this version does not know about; preserved verbatim.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl<'de> Deserialize<'de> for SidecarRecord {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = serde_json::Map::<String, serde_json::Value>::deserialize(deserializer)?;
        Ok(Self::from_map(map))
    }
}

impl SidecarRecord {
    fn from_map(mut map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            blue_threshold: take_key(&mut map, "blue_threshold", integral),
            blue_ratio: take_key(&mut map, "blue_ratio", finite),
            dark_blue_min: take_key(&mut map, "dark_blue_min", integral),
            dark_component_max: take_key(&mut map, "dark_component_max", integral),
            paper_alpha: take_key(&mut map, "paper_alpha", |v| {
                finite(v).filter(|a| (0.0..=1.0).contains(a))
            }),
            scale: take_key(&mut map, "scale", |v| finite(v).filter(|s| *s > 0.0)),
            extra: map,
        }
    }

    /// Record with every known key populated from `defaults`.
    pub fn full(defaults: &ConfigDefaults) -> Self {
        Self {
            blue_threshold: Some(defaults.blue_threshold),
            blue_ratio: Some(defaults.blue_ratio),
            dark_blue_min: Some(defaults.dark_blue_min),
            dark_component_max: Some(defaults.dark_component_max),
            paper_alpha: Some(defaults.paper_alpha),
            scale: Some(defaults.scale),
            extra: serde_json::Map::new(),
        }
    }

    /// Parse sidecar JSON; any failure is [`ChromacutError::ConfigCorrupt`].
    pub fn from_json(bytes: &[u8]) -> ChromacutResult<Self> {
        serde_json::from_slice(bytes).map_err(|e| ChromacutError::config_corrupt(e.to_string()))
    }

    /// Pretty JSON with a four-space indent and a trailing newline.
    pub fn to_json_pretty(&self) -> ChromacutResult<Vec<u8>> {
        let mut buf = Vec::new();
        let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
        self.serialize(&mut ser).context("serialize sidecar")?;
        buf.push(b'\n');
        Ok(buf)
    }

    /// Merge persisted values over `defaults`.
    pub fn resolve(&self, defaults: &ConfigDefaults) -> AssetConfig {
        AssetConfig {
            blue_threshold: self.blue_threshold.unwrap_or(defaults.blue_threshold),
            blue_ratio: self.blue_ratio.unwrap_or(defaults.blue_ratio),
            dark_blue_min: self.dark_blue_min.unwrap_or(defaults.dark_blue_min),
            dark_component_max: self.dark_component_max.unwrap_or(defaults.dark_component_max),
            paper_alpha: self.paper_alpha.unwrap_or(defaults.paper_alpha),
            scale: self.scale.unwrap_or(defaults.scale),
            extra: self.extra.clone(),
        }
    }

    /// Set one option by name. Unknown names land in `extra`.
    pub fn set(&mut self, key: &str, value: f64) -> ChromacutResult<()> {
        if !value.is_finite() {
            return Err(ChromacutError::validation(format!(
                "value for '{key}' must be finite"
            )));
        }
        match key {
            "blue_threshold" => self.blue_threshold = Some(as_integer(key, value)?),
            "dark_blue_min" => self.dark_blue_min = Some(as_integer(key, value)?),
            "dark_component_max" => self.dark_component_max = Some(as_integer(key, value)?),
            "blue_ratio" => self.blue_ratio = Some(value),
            "paper_alpha" => {
                if !(0.0..=1.0).contains(&value) {
                    return Err(ChromacutError::validation("paper_alpha must be in [0, 1]"));
                }
                self.paper_alpha = Some(value);
            }
            "scale" => {
                if value <= 0.0 {
                    return Err(ChromacutError::validation("scale must be > 0"));
                }
                self.scale = Some(value);
            }
            _ => {
                let number = serde_json::Number::from_f64(value).ok_or_else(|| {
                    ChromacutError::validation(format!("value for '{key}' is not representable"))
                })?;
                self.extra
                    .insert(key.to_string(), serde_json::Value::Number(number));
                return Ok(());
            }
        }
        // Drop any unusable value the file held for this key.
        self.extra.remove(key);
        Ok(())
    }
}

fn take_key<T>(
    map: &mut serde_json::Map<String, serde_json::Value>,
    key: &str,
    parse: impl Fn(&serde_json::Value) -> Option<T>,
) -> Option<T> {
    let value = map.get(key)?;
    if value.is_null() {
        map.remove(key);
        return None;
    }
    match parse(value) {
        Some(parsed) => {
            map.remove(key);
            Some(parsed)
        }
        None => {
            tracing::warn!(key, value = %value, "ignoring invalid config value, using default");
            None
        }
    }
}

fn integral(value: &serde_json::Value) -> Option<i64> {
    if let Some(i) = value.as_i64() {
        return Some(i);
    }
    let f = value.as_f64()?;
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

fn finite(value: &serde_json::Value) -> Option<f64> {
    value.as_f64().filter(|f| f.is_finite())
}

fn as_integer(key: &str, value: f64) -> ChromacutResult<i64> {
    if value.fract() != 0.0 {
        return Err(ChromacutError::validation(format!(
            "'{key}' expects an integer, got {value}"
        )));
    }
    Ok(value as i64)
}

/// Fully resolved configuration for one asset.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetConfig {
    pub blue_threshold: i64,
    pub blue_ratio: f64,
    pub dark_blue_min: i64,
    pub dark_component_max: i64,
    pub paper_alpha: f64,
    pub scale: f64,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AssetConfig {
    pub fn from_defaults(defaults: &ConfigDefaults) -> Self {
        SidecarRecord::default().resolve(defaults)
    }

    /// Segmentation thresholds carried by this config.
    pub fn chroma_key(&self) -> ChromaKey {
        ChromaKey {
            blue_threshold: self.blue_threshold,
            blue_ratio: self.blue_ratio,
            dark_blue_min: self.dark_blue_min,
            dark_component_max: self.dark_component_max,
        }
    }
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self::from_defaults(&ConfigDefaults::default())
    }
}

/// Outcome of [`ConfigStore::shrink_scale`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScaleChange {
    /// `scale` was lowered and persisted.
    Applied { from: f64, to: f64 },
    /// `scale` was already at or below the target; nothing written.
    Unchanged { current: f64 },
}

/// Sidecar-backed configuration store.
///
/// Read-modify-write cycles are serialised per sidecar path, so concurrent updates from
/// different stages of the same process cannot lose each other's writes.
#[derive(Debug, Default)]
pub struct ConfigStore {
    defaults: ConfigDefaults,
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl ConfigStore {
    pub fn new(defaults: ConfigDefaults) -> Self {
        Self {
            defaults,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn defaults(&self) -> &ConfigDefaults {
        &self.defaults
    }

    /// Resolve the configuration for `asset`, seeding a full-default sidecar on first use.
    ///
    /// Never fails: unreadable or corrupt sidecars fall back to defaults (and are left on disk
    /// for a human to fix), failed seeding is logged.
    pub fn resolve(&self, asset: &Path) -> AssetConfig {
        let sidecar = sidecar_path(asset);
        let lock = self.lock_for(&sidecar);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        match self.read_record(&sidecar) {
            Ok(Some(record)) => record.resolve(&self.defaults),
            Ok(None) => {
                let record = SidecarRecord::full(&self.defaults);
                match self.write_record(&sidecar, &record) {
                    Ok(()) => {
                        tracing::info!(sidecar = %sidecar.display(), "created config");
                    }
                    Err(e) => {
                        tracing::warn!(sidecar = %sidecar.display(), error = %e, "failed to create config");
                    }
                }
                record.resolve(&self.defaults)
            }
            Err(e) => {
                tracing::warn!(sidecar = %sidecar.display(), error = %e, "falling back to default config");
                AssetConfig::from_defaults(&self.defaults)
            }
        }
    }

    /// Strictly read the sidecar of `asset`: `None` if absent, error if corrupt.
    pub fn load(&self, asset: &Path) -> ChromacutResult<Option<SidecarRecord>> {
        self.read_record(&sidecar_path(asset))
    }

    /// Set `key` to `value` in the sidecar of `asset` and persist it.
    ///
    /// Starts from the current record, or from full defaults if the sidecar is missing or
    /// corrupt.
    pub fn update(&self, asset: &Path, key: &str, value: f64) -> ChromacutResult<()> {
        let sidecar = sidecar_path(asset);
        let lock = self.lock_for(&sidecar);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut record = match self.read_record(&sidecar) {
            Ok(Some(record)) => record,
            Ok(None) => SidecarRecord::full(&self.defaults),
            Err(e) => {
                tracing::warn!(sidecar = %sidecar.display(), error = %e, "replacing unreadable config");
                SidecarRecord::full(&self.defaults)
            }
        };
        record.set(key, value)?;
        self.write_record(&sidecar, &record)?;
        tracing::debug!(sidecar = %sidecar.display(), key, value, "updated config");
        Ok(())
    }

    /// Lower `scale` to `target` if it is currently above it. Never raises it.
    ///
    /// Requires an existing, parseable sidecar; a missing `scale` key reads as the default.
    pub fn shrink_scale(&self, asset: &Path, target: f64) -> ChromacutResult<ScaleChange> {
        let sidecar = sidecar_path(asset);
        let lock = self.lock_for(&sidecar);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut record = self.read_record(&sidecar)?.ok_or_else(|| {
            ChromacutError::missing_dependency(format!("no sidecar at '{}'", sidecar.display()))
        })?;
        let current = record.scale.unwrap_or(self.defaults.scale);
        if current <= target {
            return Ok(ScaleChange::Unchanged { current });
        }
        record.set("scale", target)?;
        self.write_record(&sidecar, &record)?;
        Ok(ScaleChange::Applied {
            from: current,
            to: target,
        })
    }

    fn read_record(&self, sidecar: &Path) -> ChromacutResult<Option<SidecarRecord>> {
        let bytes = match std::fs::read(sidecar) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(ChromacutError::config_corrupt(format!(
                    "read '{}': {e}",
                    sidecar.display()
                )));
            }
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ChromacutError::config_corrupt(format!("{}: {e}", sidecar.display())))
    }

    fn write_record(&self, sidecar: &Path, record: &SidecarRecord) -> ChromacutResult<()> {
        fsio::write_atomic(sidecar, &record.to_json_pretty()?)
    }

    /// Entries nobody holds any more are pruned on every call.
    fn lock_for(&self, sidecar: &Path) -> Arc<Mutex<()>> {
        let mut table = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        table.retain(|_, lock| Arc::strong_count(lock) > 1);
        table.entry(sidecar.to_path_buf()).or_default().clone()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/store.rs"]
mod tests;
