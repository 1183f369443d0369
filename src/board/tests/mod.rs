//! Board-level test suites.

mod draw;
mod perft;
mod proptest;
