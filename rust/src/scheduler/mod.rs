//! Tiered greedy sprint scheduler.
//!
//! Epics are leveled, ordered by tier, and placed onto a shared capacity map:
//! commit work linearly behind a shared cursor, stretch and uncommitted work by
//! filling whatever capacity is left.

mod aggregate;
mod core;
mod ordering;
mod placement;

pub use aggregate::{assemble_epic, assemble_result};
pub use core::{ScheduleError, SprintScheduler};
pub use ordering::{order_epics, EpicPlan, EpicSortKey, PlacementPolicy};
pub use placement::{find_fill_slot, find_linear_slot, uncertainty_flags, Placer};
