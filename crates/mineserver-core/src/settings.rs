//! Server settings domain types, validation and `server.properties` rendering.
//!
//! These are pure domain types with no infrastructure dependencies. The JSON
//! form uses camelCase keys so that settings files written by earlier panel
//! releases keep loading.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default IPv4 port of the dedicated server.
pub const DEFAULT_SERVER_PORT: u16 = 19132;

/// Default IPv6 port of the dedicated server.
pub const DEFAULT_SERVER_PORT_V6: u16 = 19133;

/// Allowed `tick-distance` range accepted by the server.
const TICK_DISTANCE_RANGE: std::ops::RangeInclusive<u32> = 4..=12;

/// Smallest `view-distance` accepted by the server.
const MIN_VIEW_DISTANCE: u32 = 5;

/// Game mode for new players.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Survival,
    Creative,
    Adventure,
}

/// World difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Peaceful,
    #[default]
    Easy,
    Normal,
    Hard,
}

/// Permission level granted to players joining for the first time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionLevel {
    Visitor,
    #[default]
    Member,
    Operator,
}

/// Movement authority model.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MovementAuthority {
    ClientAuth,
    #[default]
    ServerAuth,
    ServerAuthWithRewind,
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Survival => "survival",
            Self::Creative => "creative",
            Self::Adventure => "adventure",
        })
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Peaceful => "peaceful",
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
        })
    }
}

impl fmt::Display for PermissionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Visitor => "visitor",
            Self::Member => "member",
            Self::Operator => "operator",
        })
    }
}

impl fmt::Display for MovementAuthority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ClientAuth => "client-auth",
            Self::ServerAuth => "server-auth",
            Self::ServerAuthWithRewind => "server-auth-with-rewind",
        })
    }
}

/// Dedicated server settings.
///
/// Missing keys in a stored file fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerSettings {
    pub server_name: String,
    pub gamemode: GameMode,
    pub difficulty: Difficulty,
    pub max_players: u32,
    pub server_port: u16,
    pub server_port_v6: u16,
    pub enable_whitelist: bool,
    pub allow_cheats: bool,
    pub view_distance: u32,
    pub tick_distance: u32,
    /// Minutes before an idle player is kicked (0 disables).
    pub player_idle_timeout: u32,
    pub max_threads: u32,
    pub level_name: String,
    pub level_seed: String,
    pub default_player_permission_level: PermissionLevel,
    pub texturepack_required: bool,
    pub content_log_file_enabled: bool,
    pub compression_threshold: u32,
    pub server_authoritative_movement: MovementAuthority,
    pub player_movement_score_threshold: u32,
    pub player_movement_distance_threshold: f64,
    pub player_movement_duration_threshold_in_ms: u32,
    pub correct_player_movement: bool,
    pub server_authoritative_block_breaking: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            server_name: "Bedrock Server".to_string(),
            gamemode: GameMode::Survival,
            difficulty: Difficulty::Easy,
            max_players: 10,
            server_port: DEFAULT_SERVER_PORT,
            server_port_v6: DEFAULT_SERVER_PORT_V6,
            enable_whitelist: false,
            allow_cheats: false,
            view_distance: 32,
            tick_distance: 4,
            player_idle_timeout: 30,
            max_threads: 8,
            level_name: "Bedrock level".to_string(),
            level_seed: String::new(),
            default_player_permission_level: PermissionLevel::Member,
            texturepack_required: false,
            content_log_file_enabled: false,
            compression_threshold: 1,
            server_authoritative_movement: MovementAuthority::ServerAuth,
            player_movement_score_threshold: 20,
            player_movement_distance_threshold: 0.3,
            player_movement_duration_threshold_in_ms: 500,
            correct_player_movement: false,
            server_authoritative_block_breaking: false,
        }
    }
}

impl ServerSettings {
    /// Parse a stored settings document.
    ///
    /// Missing keys and keys set to `null` take their default value, so a
    /// single blank field does not invalidate the whole file.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let mut value: Value = serde_json::from_str(json)?;
        if let Some(fields) = value.as_object_mut() {
            fields.retain(|_, field| !field.is_null());
        }
        serde_json::from_value(value)
    }

    /// Render the settings in the server's native `server.properties` format.
    ///
    /// Keys are emitted in a fixed order, one `key=value` per line.
    pub fn to_properties(&self) -> String {
        let lines = [
            format!("server-name={}", self.server_name),
            format!("gamemode={}", self.gamemode),
            format!("difficulty={}", self.difficulty),
            format!("allow-cheats={}", self.allow_cheats),
            format!("max-players={}", self.max_players),
            "online-mode=true".to_string(),
            format!("white-list={}", self.enable_whitelist),
            format!("server-port={}", self.server_port),
            format!("server-portv6={}", self.server_port_v6),
            format!("view-distance={}", self.view_distance),
            format!("tick-distance={}", self.tick_distance),
            format!("player-idle-timeout={}", self.player_idle_timeout),
            format!("max-threads={}", self.max_threads),
            format!("level-name={}", self.level_name),
            format!("level-seed={}", self.level_seed),
            format!(
                "default-player-permission-level={}",
                self.default_player_permission_level
            ),
            format!("texturepack-required={}", self.texturepack_required),
            format!("content-log-file-enabled={}", self.content_log_file_enabled),
            format!("compression-threshold={}", self.compression_threshold),
            format!(
                "server-authoritative-movement={}",
                self.server_authoritative_movement
            ),
            format!(
                "player-movement-score-threshold={}",
                self.player_movement_score_threshold
            ),
            format!(
                "player-movement-distance-threshold={}",
                self.player_movement_distance_threshold
            ),
            format!(
                "player-movement-duration-threshold-in-ms={}",
                self.player_movement_duration_threshold_in_ms
            ),
            format!("correct-player-movement={}", self.correct_player_movement),
            format!(
                "server-authoritative-block-breaking={}",
                self.server_authoritative_block_breaking
            ),
        ];
        lines.join("\n")
    }

    /// Set a single field from its textual form.
    ///
    /// `key` is either the camelCase JSON key (`maxPlayers`) or the
    /// `server.properties` key (`max-players`). The value is parsed into the
    /// field's type and the resulting settings are validated before being
    /// applied; on error `self` is left unchanged.
    pub fn apply_override(&mut self, key: &str, raw: &str) -> Result<(), SettingsError> {
        let field = canonical_key(key);
        let invalid = |reason: String| SettingsError::InvalidValue {
            key: key.to_string(),
            reason,
        };

        let mut value = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        let Some(fields) = value.as_object_mut() else {
            return Err(invalid("settings are not an object".to_string()));
        };

        let parsed = match fields.get(&field) {
            None => return Err(SettingsError::UnknownKey(key.to_string())),
            Some(Value::String(_)) => Value::String(raw.to_string()),
            Some(_) => serde_json::from_str(raw.trim()).map_err(|e| invalid(e.to_string()))?,
        };
        fields.insert(field, parsed);

        let updated: Self = serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;
        validate_settings(&updated)?;
        *self = updated;
        Ok(())
    }
}

/// Map a property-style or camelCase key onto the JSON field name.
fn canonical_key(key: &str) -> String {
    let key = key.trim();
    match key {
        "white-list" => return "enableWhitelist".to_string(),
        "server-portv6" => return "serverPortV6".to_string(),
        _ => {}
    }

    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if ch == '-' || ch == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("{0} must be a single line")]
    MultiLine(&'static str),

    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("IPv4 and IPv6 ports must differ, both are {0}")]
    DuplicatePorts(u16),

    #[error("Max players must be at least 1")]
    InvalidMaxPlayers,

    #[error("Tick distance must be between 4 and 12, got {0}")]
    InvalidTickDistance(u32),

    #[error("View distance must be at least 5, got {0}")]
    InvalidViewDistance(u32),

    #[error("Movement distance threshold must be a non-negative number")]
    InvalidDistanceThreshold,

    #[error("Unknown setting: {0}")]
    UnknownKey(String),

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

/// Validate settings values.
pub fn validate_settings(settings: &ServerSettings) -> Result<(), SettingsError> {
    for (name, value) in [
        ("server-name", &settings.server_name),
        ("level-name", &settings.level_name),
    ] {
        if value.trim().is_empty() {
            return Err(SettingsError::EmptyField(name));
        }
    }

    for (name, value) in [
        ("server-name", &settings.server_name),
        ("level-name", &settings.level_name),
        ("level-seed", &settings.level_seed),
    ] {
        if value.contains(['\n', '\r']) {
            return Err(SettingsError::MultiLine(name));
        }
    }

    if settings.server_port == 0 || settings.server_port_v6 == 0 {
        return Err(SettingsError::InvalidPort);
    }
    if settings.server_port == settings.server_port_v6 {
        return Err(SettingsError::DuplicatePorts(settings.server_port));
    }

    if settings.max_players == 0 {
        return Err(SettingsError::InvalidMaxPlayers);
    }

    if !TICK_DISTANCE_RANGE.contains(&settings.tick_distance) {
        return Err(SettingsError::InvalidTickDistance(settings.tick_distance));
    }

    if settings.view_distance < MIN_VIEW_DISTANCE {
        return Err(SettingsError::InvalidViewDistance(settings.view_distance));
    }

    let threshold = settings.player_movement_distance_threshold;
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(SettingsError::InvalidDistanceThreshold);
    }

    Ok(())
}
