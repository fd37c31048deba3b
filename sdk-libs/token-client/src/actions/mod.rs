mod associated_account;
mod create_mint;
mod mint_to;
mod query;

pub use associated_account::*;
pub use create_mint::*;
pub use mint_to::*;
pub use query::*;
