//! Configuration vault – reads/writes `~/.scenelink/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scenelink_middleware::WsSceneClient;
use scenelink_runtime::RelayConfig;
use scenelink_types::{IndicatorSpec, InteractionMode, LengthUnits, ObjectSpec, RelayError};
use serde::{Deserialize, Serialize};

/// Persisted relay configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Port of the HTTP gateway the tracker talks to.
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    #[serde(default = "default_scene_host")]
    pub scene_host: String,

    #[serde(default = "default_scene_namespace")]
    pub scene_namespace: String,

    #[serde(default = "default_scene_name")]
    pub scene_name: String,

    /// `wss://` when true, `ws://` otherwise.
    #[serde(default = "default_true")]
    pub use_tls: bool,

    #[serde(default = "default_interval_ms")]
    pub publish_interval_ms: u64,

    /// Unit of `x, y` in inbound reports.
    #[serde(default)]
    pub units: LengthUnits,

    #[serde(default = "default_hidden_sentinel")]
    pub hidden_sentinel: f64,

    #[serde(default)]
    pub interaction_mode: InteractionMode,

    /// Viewer whose head pose drives the indicator.  Any viewer when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head_source: Option<String>,

    #[serde(default = "default_hand_commit_height")]
    pub hand_commit_height: f64,

    #[serde(default = "default_hand_indicator_offset")]
    pub hand_indicator_offset: f64,

    /// Run against an in-memory scene instead of connecting.
    #[serde(default)]
    pub dry_run: bool,

    #[serde(default = "default_objects")]
    pub objects: Vec<ObjectSpec>,

    #[serde(default)]
    pub indicator: IndicatorSpec,

    /// Object fed by the single-object `/data` route.  The primary object
    /// (or the first point object) when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_object: Option<String>,
}

fn default_http_port() -> u16 {
    scenelink_gateway::DEFAULT_PORT
}
fn default_scene_host() -> String {
    "arenaxr.org".to_string()
}
fn default_scene_namespace() -> String {
    "public".to_string()
}
fn default_scene_name() -> String {
    "cozmo-scene".to_string()
}
fn default_true() -> bool {
    true
}
fn default_interval_ms() -> u64 {
    scenelink_runtime::config::DEFAULT_PUBLISH_INTERVAL.as_millis() as u64
}
fn default_hidden_sentinel() -> f64 {
    scenelink_runtime::config::DEFAULT_HIDDEN_SENTINEL
}
fn default_hand_commit_height() -> f64 {
    RelayConfig::default().hand_commit_height
}
fn default_hand_indicator_offset() -> f64 {
    RelayConfig::default().hand_indicator_offset
}
fn default_objects() -> Vec<ObjectSpec> {
    RelayConfig::default().objects
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            scene_host: default_scene_host(),
            scene_namespace: default_scene_namespace(),
            scene_name: default_scene_name(),
            use_tls: true,
            publish_interval_ms: default_interval_ms(),
            units: LengthUnits::default(),
            hidden_sentinel: default_hidden_sentinel(),
            interaction_mode: InteractionMode::default(),
            head_source: None,
            hand_commit_height: default_hand_commit_height(),
            hand_indicator_offset: default_hand_indicator_offset(),
            dry_run: false,
            objects: default_objects(),
            indicator: IndicatorSpec::default(),
            data_object: None,
        }
    }
}

impl Config {
    pub fn scene_url(&self) -> String {
        WsSceneClient::scene_url(
            &self.scene_host,
            &self.scene_namespace,
            &self.scene_name,
            self.use_tls,
        )
    }

    /// Validate and convert into the runtime's configuration.
    ///
    /// # Errors
    ///
    /// [`RelayError::Config`] for a zero publish interval, an empty or
    /// duplicated object list, a `data_object` that is not configured, or a
    /// non-finite sentinel.
    pub fn to_relay_config(&self) -> Result<RelayConfig, RelayError> {
        if self.publish_interval_ms == 0 {
            return Err(RelayError::Config(
                "publish_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.objects.is_empty() {
            return Err(RelayError::Config("no objects configured".to_string()));
        }
        for (i, spec) in self.objects.iter().enumerate() {
            if self.objects[..i].iter().any(|o| o.id == spec.id) {
                return Err(RelayError::Config(format!("duplicate object id '{}'", spec.id)));
            }
            if spec.id == self.indicator.id {
                return Err(RelayError::Config(format!(
                    "object id '{}' collides with the indicator",
                    spec.id
                )));
            }
        }
        if let Some(id) = &self.data_object
            && !self.objects.iter().any(|o| &o.id == id)
        {
            return Err(RelayError::Config(format!("data_object '{id}' is not configured")));
        }
        if !self.hidden_sentinel.is_finite() {
            return Err(RelayError::Config("hidden_sentinel must be finite".to_string()));
        }

        Ok(RelayConfig {
            objects: self.objects.clone(),
            indicator: self.indicator.clone(),
            units: self.units,
            hidden_sentinel: self.hidden_sentinel,
            interaction_mode: self.interaction_mode,
            head_source: self.head_source.clone(),
            hand_commit_height: self.hand_commit_height,
            hand_indicator_offset: self.hand_indicator_offset,
            publish_interval: Duration::from_millis(self.publish_interval_ms),
            data_object: self.data_object.clone(),
        })
    }
}

/// `~/.scenelink/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".scenelink").join("config.toml")
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// Read from the config file.
    File,
    /// No file existed; defaults were written out.
    Created,
    /// No file existed and writing the defaults failed.
    CreateFailed(RelayError),
    /// The file could not be read or parsed; defaults are in use.
    Fallback(RelayError),
}

/// Load `~/.scenelink/config.toml`, falling back to the defaults, then apply
/// the `SCENELINK_*` environment overrides.
pub fn load() -> (Config, ConfigSource) {
    load_effective(&config_path(), |key| std::env::var(key).ok())
}

/// Same as [`load`] for an explicit path and variable lookup.
///
/// Overrides apply on every branch.  A first-run default file is written
/// before the overrides, so they are never persisted.
pub(crate) fn load_effective(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> (Config, ConfigSource) {
    let (mut cfg, source) = match load_from(path) {
        Ok(Some(cfg)) => (cfg, ConfigSource::File),
        Ok(None) => {
            let cfg = Config::default();
            match save_to(&cfg, path) {
                Ok(()) => (cfg, ConfigSource::Created),
                Err(e) => (cfg, ConfigSource::CreateFailed(e)),
            }
        }
        Err(e) => (Config::default(), ConfigSource::Fallback(e)),
    };
    apply_overrides(&mut cfg, env);
    (cfg, source)
}

/// Read a config file as-is.  `None` if it does not exist yet.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, RelayError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| RelayError::Config(format!("failed to read {}: {e}", path.display())))?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| RelayError::Config(format!("failed to parse {}: {e}", path.display())))?;
    Ok(Some(cfg))
}

/// Apply `SCENELINK_*` overrides looked up through `env`.
///
/// | Variable | Config field |
/// |---|---|
/// | `SCENELINK_HTTP_PORT` | `http_port` |
/// | `SCENELINK_SCENE_HOST` | `scene_host` |
/// | `SCENELINK_SCENE_NAME` | `scene_name` |
/// | `SCENELINK_INTERVAL_MS` | `publish_interval_ms` |
/// | `SCENELINK_DRY_RUN` | `dry_run` (`1`/`true`) |
///
/// Unparseable numeric values are ignored.
fn apply_overrides(cfg: &mut Config, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("SCENELINK_HTTP_PORT")
        && let Ok(port) = v.parse::<u16>()
    {
        cfg.http_port = port;
    }
    if let Some(v) = env("SCENELINK_SCENE_HOST") {
        cfg.scene_host = v;
    }
    if let Some(v) = env("SCENELINK_SCENE_NAME") {
        cfg.scene_name = v;
    }
    if let Some(v) = env("SCENELINK_INTERVAL_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.publish_interval_ms = ms;
    }
    if let Some(v) = env("SCENELINK_DRY_RUN") {
        cfg.dry_run = matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
    }
}

/// Write `cfg` to `path`, creating the directory with owner-only access.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), RelayError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| RelayError::Config(format!("failed to create config directory: {e}")))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700)).map_err(|e| {
                RelayError::Config(format!("failed to set config directory permissions: {e}"))
            })?;
        }
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| RelayError::Serialization(format!("config: {e}")))?;
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| RelayError::Config(format!("failed to write {}: {e}", path.display())))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| RelayError::Config(format!("failed to write {}: {e}", path.display())))?;
    Ok(())
}
