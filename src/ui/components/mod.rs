pub mod progress_bar;
pub mod question_card;
pub mod setup;
pub mod summary;
