mod common;
mod manifest_tests;
mod merge_tests;
