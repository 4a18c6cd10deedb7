//! Built-in tool profiles.

pub mod cbmc;
pub mod esbmc;
pub mod map2check;
pub mod two_ls;
pub mod ultimate;

use crate::adapter::ToolProfile;

/// Profiles of every tool the registry knows out of the box.
pub fn builtin_profiles() -> Vec<ToolProfile> {
    vec![
        cbmc::profile(),
        esbmc::profile(),
        two_ls::profile(),
        map2check::profile(),
        ultimate::profile(),
    ]
}
