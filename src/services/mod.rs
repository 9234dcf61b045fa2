pub mod banner_service;
pub mod draw_service;
pub mod ledger_service;

pub use banner_service::*;
pub use draw_service::*;
pub use ledger_service::*;
