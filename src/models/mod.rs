pub mod banner;
pub mod draw;
pub mod pagination;
pub mod wallet;

pub use banner::*;
pub use draw::*;
pub use pagination::*;
pub use wallet::*;
