
pub use call_log::{Call, CallLog};
pub use recording_driver::{RecordingDriver, TestComponent};
