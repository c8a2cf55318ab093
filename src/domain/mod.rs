// Domain layer: payload and record models plus the ports (interfaces) the pipeline depends on.

pub mod model;
pub mod ports;
