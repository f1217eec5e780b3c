//! Cross-module layout scenarios, driven through the fixed-advance shaper
//! so geometry is exact.

mod engine_tests;
