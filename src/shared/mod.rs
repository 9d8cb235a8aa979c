//! Small helpers shared by the library and the CLI

/// Returns the current version of the `mentorhub` crate
#[must_use]
pub const fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// User agent sent with every request
#[must_use]
pub fn user_agent() -> String {
    format!("mentorhub/{}", get_version())
}
