// Domain layer: campaign models and the ports (interfaces) to the remote service.

pub mod model;
pub mod ports;
