// Domain layer: the report's data contract and the ports the renderer and CLI plug into.

pub mod model;
pub mod ports;
