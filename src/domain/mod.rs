// Domain layer: the City/Hotel shapes and the ports the pipeline is built on.
// Nothing here performs I/O.

pub mod model;
pub mod ports;
