//! Session configuration

use bytes::Bytes;

use crate::engine::EngineSetup;

/// Video codec negotiated with the media service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoCodec {
    #[default]
    Vp8,
    H264,
}

/// Channel profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelMode {
    /// Everyone may publish
    #[default]
    Rtc,
    /// Broadcaster/audience split
    Live,
}

/// Which logical connection this session is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelRole {
    /// The main classroom/room channel
    #[default]
    Primary,
    /// An auxiliary channel (e.g. a screen-share sender)
    Secondary,
}

/// What the session takes care of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capabilities {
    /// Local lanes only; remote media, stats and audio levels are ignored
    PublishOnly,
    /// Local lanes plus remote participants, stats and audio levels
    PublishAndSubscribe,
}

impl Capabilities {
    pub fn subscribes(&self) -> bool {
        matches!(self, Capabilities::PublishAndSubscribe)
    }
}

/// Media encryption algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptionMode {
    #[default]
    None,
    Aes128Xts,
    Aes128Ecb,
    Aes256Xts,
    Aes128Gcm,
    Aes256Gcm,
}

impl EncryptionMode {
    /// Parse an algorithm name such as `aes-128-gcm`
    ///
    /// Case-insensitive; `_` is accepted in place of `-`. Returns `None` for
    /// names that are not recognized.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "none" => Some(EncryptionMode::None),
            "aes-128-xts" => Some(EncryptionMode::Aes128Xts),
            "aes-128-ecb" => Some(EncryptionMode::Aes128Ecb),
            "aes-256-xts" => Some(EncryptionMode::Aes256Xts),
            "aes-128-gcm" => Some(EncryptionMode::Aes128Gcm),
            "aes-256-gcm" => Some(EncryptionMode::Aes256Gcm),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionMode::None => "none",
            EncryptionMode::Aes128Xts => "aes-128-xts",
            EncryptionMode::Aes128Ecb => "aes-128-ecb",
            EncryptionMode::Aes256Xts => "aes-256-xts",
            EncryptionMode::Aes128Gcm => "aes-128-gcm",
            EncryptionMode::Aes256Gcm => "aes-256-gcm",
        }
    }
}

/// Requested media encryption
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionConfig {
    /// Algorithm name, see [`EncryptionMode::from_name`]
    pub algorithm: String,
    /// Shared secret
    pub key: Bytes,
}

impl EncryptionConfig {
    pub fn new(algorithm: impl Into<String>, key: impl Into<Bytes>) -> Self {
        Self {
            algorithm: algorithm.into(),
            key: key.into(),
        }
    }
}

/// Session configuration options
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Video codec
    pub codec: VideoCodec,

    /// Channel profile
    pub mode: ChannelMode,

    /// Primary or secondary connection, reported with every state change
    pub role: ChannelRole,

    /// Publish only, or publish and subscribe
    pub capabilities: Capabilities,

    /// Media service region (engine default when unset)
    pub region: Option<String>,

    /// Media encryption (off when unset)
    pub encryption: Option<EncryptionConfig>,

    /// Capacity of the upward event channel
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(ChannelRole::Primary)
    }
}

impl SessionConfig {
    /// Create a config for `role`
    ///
    /// Primary connections publish and subscribe; secondary ones only publish.
    pub fn new(role: ChannelRole) -> Self {
        let capabilities = match role {
            ChannelRole::Primary => Capabilities::PublishAndSubscribe,
            ChannelRole::Secondary => Capabilities::PublishOnly,
        };

        Self {
            codec: VideoCodec::default(),
            mode: ChannelMode::default(),
            role,
            capabilities,
            region: None,
            encryption: None,
            event_capacity: 256,
        }
    }

    /// Set the video codec
    pub fn codec(mut self, codec: VideoCodec) -> Self {
        self.codec = codec;
        self
    }

    /// Set the channel profile
    pub fn mode(mut self, mode: ChannelMode) -> Self {
        self.mode = mode;
        self
    }

    /// Override the capabilities implied by the role
    pub fn capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set the media service region
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Enable media encryption
    pub fn encryption(mut self, algorithm: impl Into<String>, key: impl Into<Bytes>) -> Self {
        self.encryption = Some(EncryptionConfig::new(algorithm, key));
        self
    }

    /// Set the event channel capacity (at least 1)
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Resolve the settings handed to the engine
    ///
    /// An unrecognized encryption algorithm disables encryption instead of
    /// falling back to some other algorithm.
    pub fn engine_setup(&self) -> EngineSetup {
        let (encryption, encryption_key) = match &self.encryption {
            Some(enc) => match EncryptionMode::from_name(&enc.algorithm) {
                Some(EncryptionMode::None) => (EncryptionMode::None, Bytes::new()),
                Some(mode) => (mode, enc.key.clone()),
                None => {
                    tracing::warn!(
                        algorithm = %enc.algorithm,
                        "Unrecognized encryption algorithm, media encryption disabled"
                    );
                    (EncryptionMode::None, Bytes::new())
                }
            },
            None => (EncryptionMode::None, Bytes::new()),
        };

        EngineSetup {
            codec: self.codec,
            mode: self.mode,
            region: self.region.clone(),
            encryption,
            encryption_key,
            audio_level_indication: self.capabilities.subscribes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();

        assert_eq!(config.role, ChannelRole::Primary);
        assert_eq!(config.capabilities, Capabilities::PublishAndSubscribe);
        assert_eq!(config.codec, VideoCodec::Vp8);
        assert_eq!(config.mode, ChannelMode::Rtc);
        assert!(config.encryption.is_none());
        assert_eq!(config.event_capacity, 256);
    }

    #[test]
    fn test_secondary_publishes_only() {
        let config = SessionConfig::new(ChannelRole::Secondary);

        assert_eq!(config.capabilities, Capabilities::PublishOnly);
        assert!(!config.engine_setup().audio_level_indication);
    }

    #[test]
    fn test_builder_chaining() {
        let config = SessionConfig::new(ChannelRole::Secondary)
            .codec(VideoCodec::H264)
            .mode(ChannelMode::Live)
            .capabilities(Capabilities::PublishAndSubscribe)
            .region("EU")
            .event_capacity(0);

        assert_eq!(config.codec, VideoCodec::H264);
        assert_eq!(config.mode, ChannelMode::Live);
        assert_eq!(config.capabilities, Capabilities::PublishAndSubscribe);
        assert_eq!(config.region.as_deref(), Some("EU"));
        assert_eq!(config.event_capacity, 1);
    }

    #[test]
    fn test_encryption_names() {
        assert_eq!(
            EncryptionMode::from_name("aes-128-gcm"),
            Some(EncryptionMode::Aes128Gcm)
        );
        assert_eq!(
            EncryptionMode::from_name("AES_256_XTS"),
            Some(EncryptionMode::Aes256Xts)
        );
        assert_eq!(EncryptionMode::from_name("rot13"), None);
        assert_eq!(EncryptionMode::Aes128Ecb.as_str(), "aes-128-ecb");
    }

    #[test]
    fn test_recognized_encryption_resolves() {
        let config = SessionConfig::default().encryption("aes-256-gcm", "secret");

        let setup = config.engine_setup();

        assert_eq!(setup.encryption, EncryptionMode::Aes256Gcm);
        assert_eq!(setup.encryption_key, Bytes::from_static(b"secret"));
    }

    #[test]
    fn test_unknown_encryption_fails_closed() {
        let config = SessionConfig::default().encryption("sm4-128-ecb", "secret");

        let setup = config.engine_setup();

        assert_eq!(setup.encryption, EncryptionMode::None);
        assert!(setup.encryption_key.is_empty());
    }
}
