pub mod assessment_type;
pub mod evaluator;
pub mod mbti;
pub mod question;
pub mod result;
pub mod subscription;
pub mod user;
