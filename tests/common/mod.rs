#![allow(unused_imports)]

pub use autobuild_test_utils::builders;
pub use autobuild_test_utils::fakes;
pub use autobuild_test_utils::{init_tracing, with_timeout};
