pub mod amount;
pub mod cairo_value;
pub mod calldata;
pub mod felt;
