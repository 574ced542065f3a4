pub mod account;
pub mod image;
pub mod recipe;
pub mod recovery;
pub mod search;
