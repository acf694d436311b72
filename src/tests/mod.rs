//! Cross-component tests.

mod pipeline_tests;
