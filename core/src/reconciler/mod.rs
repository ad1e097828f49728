pub mod pass_summary;
pub mod reconciler;
pub mod snapshot;

cfg_if! {
    if #[cfg(feature = "consistency_checks")] {
        mod consistency;
    }
}
