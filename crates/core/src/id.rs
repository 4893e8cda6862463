// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier types for requests, streams, pools and connections

/// Declare a prefixed identifier backed by `SmolStr`.
///
/// Fresh ids are `{prefix}{nanoid}`; ids received from elsewhere are taken
/// as-is through `From`.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident = $prefix:literal;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(smol_str::SmolStr);

        impl $name {
            pub fn new() -> Self {
                Self(smol_str::format_smolstr!("{}{}", $prefix, nanoid::nanoid!(18)))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.into())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s.into())
            }
        }
    };
}

define_id! {
    /// Correlation reference routing transport events and liveness watches
    /// to exactly one in-flight request.
    RequestRef = "ref-";
}

define_id! {
    /// Caller-chosen tag wrapped around every item of a tagged stream, so a
    /// receiver fanning in several requests can tell them apart.
    StreamTag = "tag-";
}

define_id! {
    /// Pool a connection was checked out from.
    PoolId = "pool-";
}

define_id! {
    /// Identity of the connection (the owning actor) handed back on checkin.
    ConnId = "conn-";
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
