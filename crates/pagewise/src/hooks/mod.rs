//! Optional logging and metrics hooks.
//!
//! Both hooks default to inexpensive implementations: [`TracingLogger`]
//! and [`NoopMetrics`]. Hooks observe fetches but never influence them.

mod event;
mod logger;
mod metrics;

pub use self::event::{BacklinkSource, PageEvent};
pub use self::logger::{NoopLogger, PageLogger, TracingLogger};
pub use self::metrics::{CounterMetrics, MetricsSnapshot, NoopMetrics, PageMetrics};
