pub mod tally;
pub mod tally_store;
