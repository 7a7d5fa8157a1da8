pub mod deal;
pub mod debt_schedule;
pub mod debt_structure;
pub mod exit;
pub mod model;
pub mod operating;
pub mod sensitivity;

/// Number of projection years in every model run.
pub const PROJECTION_YEARS: u32 = 5;
