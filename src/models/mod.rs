//! Data models for the Biblio server

pub mod book;
pub mod borrower;
pub mod borrowing;
pub mod report;
