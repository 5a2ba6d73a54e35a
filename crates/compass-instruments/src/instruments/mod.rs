pub mod mbti;
pub mod three_sixty;
pub mod tki;
pub mod wellness;
