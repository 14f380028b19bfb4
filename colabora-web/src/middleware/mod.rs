//! Middlewares specific to Colabora.

mod metrics;

pub use self::metrics::Metrics;
