//! Shared fixtures for the workspace lock tests.

pub mod planner_test_helpers;
