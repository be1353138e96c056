pub mod accounts;
pub mod authorization;
pub mod catalog;
pub mod rating;
pub mod recommendations;
pub mod reviews;
pub mod watchlist;
