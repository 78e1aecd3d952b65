pub mod creation;
pub mod edit;
pub mod query;
