//! Domain error types.

/// Top-level error type for tierscan.
#[derive(Debug, thiserror::Error)]
pub enum TierscanError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("no data for {symbol} ({timeframe})")]
    NoData { symbol: String, timeframe: String },

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TierscanError {
    pub(crate) fn invalid(section: &str, key: &str, reason: impl Into<String>) -> Self {
        TierscanError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<&TierscanError> for std::process::ExitCode {
    fn from(err: &TierscanError) -> Self {
        let code: u8 = match err {
            TierscanError::Io(_) | TierscanError::Csv(_) => 1,
            TierscanError::ConfigParse { .. } | TierscanError::ConfigInvalid { .. } => 2,
            TierscanError::Data { .. } => 3,
            TierscanError::NoData { .. } | TierscanError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_data_message() {
        let err = TierscanError::InsufficientData {
            bars: 10,
            minimum: 55,
        };
        assert_eq!(err.to_string(), "insufficient data: have 10 bars, need 55");
    }

    #[test]
    fn config_invalid_helper() {
        let err = TierscanError::invalid("risk", "watch_risk_pct", "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid config value [risk] watch_risk_pct: must be positive"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TierscanError = io.into();
        assert!(matches!(err, TierscanError::Io(_)));
    }

    #[test]
    fn exit_codes_grouped() {
        let cases = [
            (
                TierscanError::invalid("scanner", "x", "bad"),
                std::process::ExitCode::from(2),
            ),
            (
                TierscanError::Data {
                    reason: "bad row".into(),
                },
                std::process::ExitCode::from(3),
            ),
            (
                TierscanError::InsufficientData {
                    bars: 1,
                    minimum: 2,
                },
                std::process::ExitCode::from(5),
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(
                format!("{:?}", std::process::ExitCode::from(&err)),
                format!("{:?}", expected)
            );
        }
    }
}
