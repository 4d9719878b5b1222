/// Unit test suite for the public engine API
mod basic_tests;
