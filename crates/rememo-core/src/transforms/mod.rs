pub mod deps;
pub mod partition;

pub use deps::{analyze, is_expensive, Analysis, ValueInfo};
pub use partition::{merged_spans, partition, partition_spans, PartitionItem, ReactiveBlock};
