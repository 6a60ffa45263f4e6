use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("grade {0} is outside the allowed range 0..=100")]
    GradeOutOfRange(i32),
}

pub type Result<T> = std::result::Result<T, ModelError>;
