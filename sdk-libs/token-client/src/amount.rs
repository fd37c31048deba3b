use crate::errors::TokenClientError;

/// Converts a whole-token amount into base units for a mint with `decimals`.
pub fn scale_amount(whole: i64, decimals: u8) -> Result<u64, TokenClientError> {
    let whole = u64::try_from(whole)
        .map_err(|_| TokenClientError::InvalidAmount(format!("{} is negative", whole)))?;
    10u64
        .checked_pow(u32::from(decimals))
        .and_then(|factor| whole.checked_mul(factor))
        .ok_or_else(|| {
            TokenClientError::InvalidAmount(format!(
                "{} with {} decimals overflows u64",
                whole, decimals
            ))
        })
}
