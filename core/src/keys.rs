//! Key and query vocabulary of the remote-control protocol.

use std::fmt;
use std::str::FromStr;

use crate::error::UsageError;

macro_rules! named_keys {
    ($($variant:ident),+ $(,)?) => {
        /// Keys the device exposes by name.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum NamedKey {
            $($variant),+
        }

        impl NamedKey {
            pub const ALL: &'static [NamedKey] = &[$(NamedKey::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(NamedKey::$variant => stringify!($variant)),+
                }
            }
        }
    };
}

named_keys!(
    Home,
    Rev,
    Fwd,
    Play,
    Select,
    Left,
    Right,
    Down,
    Up,
    Back,
    InstantReplay,
    Info,
    Backspace,
    Search,
    Enter,
    VolumeDown,
    VolumeUp,
    VolumeMute,
    PowerOff,
);

impl FromStr for NamedKey {
    type Err = UsageError;

    /// Case-insensitive match on the protocol name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NamedKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UsageError::UnknownKey(s.to_string()))
    }
}

/// A single keypress: either a named key or a literal character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Named(NamedKey),
    Lit(char),
}

impl Key {
    /// Protocol spelling before percent-encoding, e.g. `Home` or `Lit_7`.
    pub fn protocol_name(&self) -> String {
        match self {
            Key::Named(key) => key.as_str().to_string(),
            Key::Lit(c) => format!("Lit_{c}"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.protocol_name())
    }
}

impl From<NamedKey> for Key {
    fn from(key: NamedKey) -> Self {
        Key::Named(key)
    }
}

impl FromStr for Key {
    type Err = UsageError;

    /// Accepts `Lit_<char>` for a single literal character, otherwise a
    /// named key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix("Lit_") {
            let mut chars = rest.chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Key::Lit(c)),
                _ => Err(UsageError::UnknownKey(s.to_string())),
            };
        }
        s.parse::<NamedKey>().map(Key::Named)
    }
}

/// Informational queries. Responses are opaque text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    DeviceInfo,
    Apps,
    ActiveApp,
}

impl Query {
    pub fn path(self) -> &'static str {
        match self {
            Query::DeviceInfo => "/query/device-info",
            Query::Apps => "/query/apps",
            Query::ActiveApp => "/query/active-app",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Query::DeviceInfo => "device-info",
            Query::Apps => "apps",
            Query::ActiveApp => "active-app",
        }
    }
}

impl FromStr for Query {
    type Err = UsageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "device-info" => Ok(Query::DeviceInfo),
            "apps" => Ok(Query::Apps),
            "active-app" => Ok(Query::ActiveApp),
            other => Err(UsageError::UnknownQuery(other.to_string())),
        }
    }
}
