//! Unit tests for the save file format.
//!
//! These tests cover path mapping, text encoding and decoding, and the
//! read/write helpers against a scratch directory.

mod save_file_tests;
