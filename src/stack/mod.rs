//! Stack data model and the operations that change it
//!
//! `StackRegistry` holds one `StackRecord` per stacked creature. Merging and
//! slicing both conserve the total number of logical units.

pub mod merge;
pub mod record;
pub mod registry;
pub mod removal;
pub mod slice;

pub use merge::{MergeBus, MergeEvaluator, MergeListener, MergeOutcome, SkipReason, StackMergeEvent};
pub use record::StackRecord;
pub use registry::StackRegistry;
pub use removal::{remove_chunk, remove_stack_data, ChunkSweep};
pub use slice::{SliceOperation, SlicedUnit};
