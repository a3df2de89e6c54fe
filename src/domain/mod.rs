// Domain layer: core models and ports (interfaces). No external dependencies beyond csv/serde.

pub mod model;
pub mod ports;
