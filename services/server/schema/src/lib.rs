//! sea-orm entities for the Tavola database.

pub mod credentials;
pub mod ingredients;
pub mod recipe_ingredients;
pub mod recipe_steps;
pub mod recipes;
pub mod recoveries;
pub mod users;
