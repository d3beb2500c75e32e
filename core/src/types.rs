//! Shared primitive types used across the entire simulation.

/// A simulation day. The host clock advances one day per tick.
pub type Day = u64;

/// Index of a grid cell. Cell assignment is owned by the host grid.
pub type CellId = u32;

/// Catalog identifier for a trade good.
pub type GoodId = String;

/// Catalog identifier for a trade route.
pub type RouteId = String;

/// Catalog identifier for a research node.
pub type NodeId = String;

/// Catalog identifier for a disaster definition.
pub type DisasterId = String;

/// The canonical run identifier.
pub type RunId = String;
