use thiserror::Error;

use crate::interpolation::InterpolationError;

//=====================================================================
// Errors raised while loading tables, building models, and sampling.
//
// Every variant carries enough naming context (table, block, reaction)
// to point at the offending data without a debugger.
//=====================================================================
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    #[error("invalid table '{table}': {reason}")]
    InvalidTable { table: String, reason: String },

    #[error("table '{table}' has no {block} block")]
    MissingBlock { table: String, block: String },

    #[error("data integrity violation in {context}: {reason}")]
    DataIntegrity { context: String, reason: String },

    #[error("could not construct {reaction} from table '{table}': {reason}")]
    ModelConstruction { table: String, reaction: String, reason: String },

    #[error("{quantity} = {value} is outside of [{lower}, {upper}]")]
    OutOfRange { quantity: String, value: f64, lower: f64, upper: f64 },

    #[error("cell {cell} has no material assignment")]
    UnknownCell { cell: u64 },

    #[error(transparent)]
    Interpolation(#[from] InterpolationError),
}

pub type Result<T> = std::result::Result<T, TransportError>;

impl TransportError {
    pub fn invalid_table(table: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidTable { table: table.into(), reason: reason.into() }
    }

    pub fn missing_block(table: impl Into<String>, block: impl ToString) -> Self {
        Self::MissingBlock { table: table.into(), block: block.to_string() }
    }

    pub fn data_integrity(context: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataIntegrity { context: context.into(), reason: reason.into() }
    }

    pub fn model_construction(table: impl Into<String>, reaction: impl ToString, reason: impl ToString) -> Self {
        Self::ModelConstruction {
            table: table.into(),
            reaction: reaction.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn out_of_range(quantity: impl Into<String>, value: f64, lower: f64, upper: f64) -> Self {
        Self::OutOfRange { quantity: quantity.into(), value, lower, upper }
    }
}

// Fails with OutOfRange unless lower <= value <= upper.
pub(crate) fn check_range(quantity: &str, value: f64, lower: f64, upper: f64) -> Result<()> {
    if value.is_nan() || value < lower || value > upper {
        return Err(TransportError::out_of_range(quantity, value, lower, upper));
    }
    Ok(())
}

// Fails with OutOfRange unless value is strictly positive and finite.
pub(crate) fn check_positive(quantity: &str, value: f64) -> Result<()> {
    if !(value > 0.0 && value.is_finite()) {
        return Err(TransportError::out_of_range(quantity, value, f64::MIN_POSITIVE, f64::MAX));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = TransportError::model_construction("1001.80c", "MT 51", "missing law data");
        assert_eq!(
            err.to_string(),
            "could not construct MT 51 from table '1001.80c': missing law data"
        );

        let err = TransportError::missing_block("82000.12p", "SWD");
        assert_eq!(err.to_string(), "table '82000.12p' has no SWD block");
    }

    #[test]
    fn test_range_checks() {
        assert!(check_range("mu", 0.5, -1.0, 1.0).is_ok());
        assert!(check_range("mu", 1.5, -1.0, 1.0).is_err());
        assert!(check_range("mu", f64::NAN, -1.0, 1.0).is_err());
        assert!(check_positive("energy", 1.0).is_ok());
        assert!(matches!(
            check_positive("energy", 0.0),
            Err(TransportError::OutOfRange { .. })
        ));
    }
}
