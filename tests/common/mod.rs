#![allow(dead_code, unused_imports)]

pub use lerobot_runner_test_utils::{builders, fake_bin, init_tracing, with_timeout};
