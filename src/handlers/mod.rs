pub mod aura_zone;
pub mod wallet;

pub use aura_zone::aura_zone_config;
pub use wallet::wallet_config;
