use thiserror::Error;

/// Errors surfaced by the simulation core.
///
/// Every operation validates its inputs before computing anything, so an
/// error always means no output was produced. Broken payout conservation is
/// not represented here: it is a programming error and panics instead.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid parameter `{name}` = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: &'static str,
    },
    #[error("insufficient data: need more than {required} observations, got {available}")]
    InsufficientData { required: usize, available: usize },
    #[error("missing data: {0}")]
    MissingData(String),
    #[error("invalid series: {0}")]
    InvalidSeries(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl SimulationError {
    pub(crate) fn invalid(
        name: &'static str,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        SimulationError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let err = SimulationError::invalid("leverage", 0.5, "must be greater than 1");
        assert_eq!(
            err.to_string(),
            "invalid parameter `leverage` = 0.5: must be greater than 1"
        );
    }

    #[test]
    fn test_insufficient_data_message() {
        let err = SimulationError::InsufficientData {
            required: 252,
            available: 100,
        };
        assert!(err.to_string().contains("252"));
        assert!(err.to_string().contains("100"));
    }
}
