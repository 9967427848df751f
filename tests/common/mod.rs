#![allow(dead_code)]

pub use stageflow_test_utils::builders;
pub use stageflow_test_utils::fake_executor;
pub use stageflow_test_utils::{init_tracing, with_timeout};
