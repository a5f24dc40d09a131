// Domain layer: calendar model and ports. No I/O here.

pub mod model;
pub mod ports;
