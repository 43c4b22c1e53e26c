//! Seven ways to multiply dense matrices, built from scratch.
//!
//! Every strategy computes the same `C = A · B` over row-major `f64`
//! matrices. Each one adds one optimization to the previous: loop order,
//! threads, cache blocking, recursion, SIMD, and finally all of them
//! together. They exist to be measured against each other, and all of them
//! are checked against the naive triple loop.
//!
//! ## Usage
//!
//! ```
//! use matmul::{Matrix, Strategy, Tolerance, multiply};
//!
//! let a = Matrix::identity(64).scaled(2.0);
//! let reference = multiply(Strategy::Reference, &a, &a).unwrap();
//!
//! for strategy in Strategy::ALL {
//!     let c = multiply(strategy, &a, &a).unwrap();
//!     assert!(c.approx_eq(&reference, Tolerance::default()));
//! }
//! ```
//!
//! Tunables (block size, recursion threshold, vector ISA, worker count) live
//! in [`MatmulConfig`]:
//!
//! ```
//! use matmul::{Matrix, MatmulConfig, Strategy, VectorIsa, multiply_with};
//!
//! let config = MatmulConfig::default()
//!     .with_block_size(64)
//!     .with_vector_isa(VectorIsa::Portable8)
//!     .with_workers(4);
//!
//! let a = Matrix::filled(10, 20, 1.0);
//! let b = Matrix::filled(20, 10, 1.0);
//! let c = multiply_with(Strategy::Combined, &a, &b, &config).unwrap();
//! assert_eq!(c.get(3, 7), 20.0);
//! ```
//!
//! ## What's inside
//!
//! - i-j-k and i-k-j scalar loops
//! - Row-band threading with `std::thread::scope`
//! - Cache tiling with a configurable block edge
//! - 8-multiply quadrant recursion on a rayon pool
//! - AVX2 (4 lanes) and AVX-512 (8 lanes) kernels, portable lanes elsewhere

pub mod blocked;
pub mod compare;
pub mod config;
pub mod cpu;
pub mod error;
pub mod kernels;
pub mod matrix;
pub mod recursive;
pub mod strategy;
pub mod threaded;

pub use blocked::simple_simd::matmul_vectorized;
pub use blocked::tiled::matmul_blocked;
pub use compare::{Mismatch, Tolerance};
pub use config::{MatmulConfig, VectorIsa};
pub use cpu::CpuFeatures;
pub use error::{MatmulError, Result};
pub use matrix::naive_ijk::matmul_reference;
pub use matrix::naive_ikj::matmul_access_order;
pub use matrix::{Matrix, check_dims};
pub use recursive::matmul_divide_conquer;
pub use strategy::{Strategy, multiply, multiply_with};
pub use threaded::combined::matmul_combined;
pub use threaded::row_bands::matmul_data_parallel;
