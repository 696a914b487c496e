pub mod histogram;
pub mod pareto;
pub mod statistics;
pub mod summary;
