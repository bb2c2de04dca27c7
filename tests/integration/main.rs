//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises the wake cycle against
//! the mock board.  All tests run on the host (x86_64) with no real
//! hardware required.

mod mock_board;
mod wake_cycle_tests;
