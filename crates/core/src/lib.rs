pub mod config;
pub mod path_utils;
pub mod state;
pub mod store;

use tracing::info;

pub fn init() {
    info!("🟩 Flex Designer core initialized");
}
