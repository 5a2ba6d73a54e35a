use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("mail provider rejected the message ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}
