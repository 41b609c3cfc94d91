#![allow(dead_code, unused_imports)]

pub use devloop_test_utils::builders;
pub use devloop_test_utils::recording_backend::RecordingBackend;
pub use devloop_test_utils::{
    init_tracing, rebuild_recorder, services, settle, wait_until_drained, with_timeout,
};
