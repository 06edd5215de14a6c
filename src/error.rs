use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    /// A precondition on the payload failed before anything was written.
    #[error("{0}")]
    MissingInput(&'static str),
    #[error("{report} generation failed: {source}")]
    GenerationFailed { report: &'static str, source: Box<ReportError> },
    #[error("PDF rendering failed: {0}")]
    Pdf(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// Wraps an error with the name of the report being generated.
    pub fn generation_failed(report: &'static str, source: ReportError) -> Self {
        match source {
            already @ ReportError::GenerationFailed { .. } => already,
            other => ReportError::GenerationFailed { report, source: Box::new(other) },
        }
    }

    pub fn is_missing_input(&self) -> bool {
        match self {
            ReportError::MissingInput(_) => true,
            ReportError::GenerationFailed { source, .. } => source.is_missing_input(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wrapped_message_names_the_report() {
        let err = ReportError::generation_failed("Progress report", ReportError::MissingInput("Onboarding data is required"));
        assert_eq!(err.to_string(), "Progress report generation failed: Onboarding data is required");
        assert!(err.is_missing_input());
    }

    #[test]
    fn wrapping_is_not_nested() {
        let inner = ReportError::generation_failed("Mood report", ReportError::MissingInput("User data is required"));
        let outer = ReportError::generation_failed("Other", inner);
        assert_eq!(outer.to_string(), "Mood report generation failed: User data is required");
    }

    #[test]
    fn classification_follows_the_wrapped_error() {
        let pdf = ReportError::generation_failed("Mood report", ReportError::Pdf("User data is required".into()));
        assert!(!pdf.is_missing_input());
        let io = ReportError::generation_failed("Mood report", std::io::Error::other("disk full").into());
        assert!(!io.is_missing_input());
        assert!(std::error::Error::source(&io).is_some());
    }
}
