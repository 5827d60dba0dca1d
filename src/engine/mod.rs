pub mod bucket;
pub mod simulation;

pub use bucket::{BucketTransition, CandleBucketEngine, DEFAULT_WINDOW_CAP};
pub use simulation::{SimulationGenerator, DEFAULT_COLD_START_LEN};
