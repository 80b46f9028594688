//! Session management
//!
//! A session is one logical connection to a media routing channel. The
//! [`SessionAdapter`] owns its connection state machine, lanes and registries
//! and applies engine events to them one at a time.

pub mod adapter;
pub mod config;
pub mod event;
pub mod state;

pub use adapter::SessionAdapter;
pub use config::{
    Capabilities, ChannelMode, ChannelRole, EncryptionConfig, EncryptionMode, SessionConfig,
    VideoCodec,
};
pub use event::SessionEvent;
pub use state::{ConnectionState, ConnectionStateMachine, Transition};
