//! Post-harvest resolution passes: interface implementation and return
//! types.

mod interfaces;
mod return_types;

pub use interfaces::resolve_interfaces;
pub use return_types::resolve_return_types;

pub(crate) use interfaces::apply_pending_resolutions;
