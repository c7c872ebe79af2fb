pub mod conversions;
pub mod serialization;
pub mod units;
