// Domain layer: wire-format and output models plus the ports (interfaces)
// implemented by config and storage adapters.

pub mod model;
pub mod ports;
