pub mod banners;
pub mod ledger_entries;
pub mod prize_pool_entries;
pub mod prizes;
pub mod pull_records;
pub mod user_pity;
pub mod users;

pub use banners as banner_entity;
pub use ledger_entries as ledger_entry_entity;
pub use prize_pool_entries as pool_entry_entity;
pub use prizes as prize_entity;
pub use pull_records as pull_record_entity;
pub use user_pity as user_pity_entity;
pub use users as user_entity;

pub use banners::CurrencyType;
pub use prizes::Rarity;
