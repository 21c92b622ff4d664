//! # Config Commands
//!
//! Retrieving the register configuration.

use tracing::debug;

use crate::state::RegisterConfig;

/// Gets the current register configuration.
///
/// ## When Used
/// - Startup (payment panel needs the shipping fee)
/// - Receipt printing (store header, paper width)
pub fn get_config(config: &RegisterConfig) -> RegisterConfig {
    debug!("get_config command");
    config.clone()
}
