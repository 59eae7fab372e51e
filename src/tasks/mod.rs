//! Background Tasks Module
//!
//! Contains background tasks that run alongside the caches.
//!
//! # Tasks
//! - Maintenance: prunes expired entries and logs statistics at a fixed interval
//! - Change listener: forwards data-change notifications to the dispatcher

mod changes;
mod maintenance;

pub use changes::spawn_change_listener;
pub use maintenance::MaintenanceScheduler;
