pub mod outcome;
pub mod prompt;
pub mod protocol;
