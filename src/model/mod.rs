pub mod ad_unit;
pub mod adapters;
pub mod bid;
