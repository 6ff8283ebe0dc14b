pub mod categorical;
pub mod sequence;

pub use categorical::restrict_to_domain;
pub use sequence::{encode_dna_column, encode_dna_positions, position_column_name};
