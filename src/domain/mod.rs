// Domain layer: tabular model and ports. No knowledge of concrete sources.

pub mod model;
pub mod ports;
