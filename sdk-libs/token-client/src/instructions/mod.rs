mod create_and_fund;
mod create_mint;

pub use create_and_fund::*;
pub use create_mint::*;
