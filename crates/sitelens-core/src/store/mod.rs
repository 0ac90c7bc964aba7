// ── Reactive site store ──
//
// Lock-free entity storage with push-based change notification.

mod collection;
mod registry;

pub use registry::SiteRegistry;
