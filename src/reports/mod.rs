pub mod quotation_pdf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("Invalid report data: {0}")]
    InvalidData(String),
}

impl From<printpdf::Error> for ReportError {
    fn from(err: printpdf::Error) -> Self {
        ReportError::Pdf(err.to_string())
    }
}
