pub mod tick;

pub use tick::{run_merge_pass, run_simulation_tick, MergePassReport};
