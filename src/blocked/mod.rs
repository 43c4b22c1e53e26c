//! Cache blocking and single-threaded SIMD.
//!
//! Available implementations:
//! - `tiled`: i/j/k cut into `T`-sized blocks, scalar inner kernel
//! - `simple_simd`: SIMD lanes across output columns, no blocking

pub mod simple_simd;
pub mod tiled;
