//! Per-call tunables for the strategies.
//!
//! Every field has a default. [`MatmulConfig::from_env`] layers
//! `MATMUL_*` environment variables on top of the defaults, which is how the
//! benchmark runner is configured.

use std::fmt;
use std::str::FromStr;

use crate::cpu::CpuFeatures;
use crate::error::{MatmulError, Result};

/// Block edge used by the blocked and combined strategies. 32×32 f64 tiles
/// of A, B and C together take 24 KiB, which fits a 32 KiB L1.
pub const DEFAULT_BLOCK_SIZE: usize = 32;

/// Divide-and-conquer stops splitting once any dimension is at or below this.
pub const DEFAULT_DC_THRESHOLD: usize = 128;

/// Vector instruction set used for the SIMD lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorIsa {
    /// Plain Rust, 4 lanes. Runs everywhere.
    Portable4,
    /// Plain Rust, 8 lanes. Runs everywhere.
    Portable8,
    /// AVX2 + FMA, 4 × f64.
    Avx2,
    /// AVX-512F + FMA, 8 × f64.
    Avx512,
}

impl VectorIsa {
    pub const ALL: [VectorIsa; 4] = [
        VectorIsa::Portable4,
        VectorIsa::Portable8,
        VectorIsa::Avx2,
        VectorIsa::Avx512,
    ];

    /// Number of f64 lanes (the vector width W).
    pub fn lanes(self) -> usize {
        match self {
            VectorIsa::Portable4 | VectorIsa::Avx2 => 4,
            VectorIsa::Portable8 | VectorIsa::Avx512 => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VectorIsa::Portable4 => "portable4",
            VectorIsa::Portable8 => "portable8",
            VectorIsa::Avx2 => "avx2",
            VectorIsa::Avx512 => "avx512",
        }
    }

    /// Best instruction set the reported features allow.
    pub fn best_for(cpu: CpuFeatures) -> Self {
        if cfg!(target_arch = "x86_64") {
            if cpu.has_avx512_fma() {
                return VectorIsa::Avx512;
            }
            if cpu.has_avx2_fma() {
                return VectorIsa::Avx2;
            }
        }
        VectorIsa::Portable4
    }
}

impl fmt::Display for VectorIsa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VectorIsa {
    type Err = MatmulError;

    fn from_str(s: &str) -> Result<Self> {
        VectorIsa::ALL
            .into_iter()
            .find(|isa| isa.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MatmulError::InvalidConfig(format!("unknown vector isa `{s}`")))
    }
}

/// Tunables shared by all strategies. Strategies ignore the fields they
/// do not use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatmulConfig {
    /// Block edge T for blocked and combined.
    pub block_size: usize,
    /// Base-case threshold for divide-and-conquer.
    pub dc_threshold: usize,
    /// Requested vector ISA. `None` picks the best one `cpu` reports.
    pub vector_isa: Option<VectorIsa>,
    /// Worker count for data-parallel, blocked, combined and divide-and-conquer.
    pub workers: usize,
    /// Capabilities reported by the CPU probe.
    pub cpu: CpuFeatures,
}

impl Default for MatmulConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            dc_threshold: DEFAULT_DC_THRESHOLD,
            vector_isa: None,
            workers: default_workers(),
            cpu: CpuFeatures::detect(),
        }
    }
}

impl MatmulConfig {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_dc_threshold(mut self, dc_threshold: usize) -> Self {
        self.dc_threshold = dc_threshold;
        self
    }

    pub fn with_vector_isa(mut self, isa: VectorIsa) -> Self {
        self.vector_isa = Some(isa);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_cpu(mut self, cpu: CpuFeatures) -> Self {
        self.cpu = cpu;
        self
    }

    /// Reject tunables no strategy can run with.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(MatmulError::InvalidConfig("block_size must be > 0".into()));
        }
        if self.dc_threshold == 0 {
            return Err(MatmulError::InvalidConfig(
                "dc_threshold must be > 0".into(),
            ));
        }
        if self.workers == 0 {
            return Err(MatmulError::InvalidConfig("workers must be > 0".into()));
        }
        Ok(())
    }

    /// Defaults overridden by `MATMUL_BLOCK_SIZE`, `MATMUL_DC_THRESHOLD`,
    /// `MATMUL_WORKERS` and `MATMUL_VECTOR_ISA`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(v) = lookup("MATMUL_BLOCK_SIZE") {
            config.block_size = parse_usize("MATMUL_BLOCK_SIZE", &v)?;
        }
        if let Some(v) = lookup("MATMUL_DC_THRESHOLD") {
            config.dc_threshold = parse_usize("MATMUL_DC_THRESHOLD", &v)?;
        }
        if let Some(v) = lookup("MATMUL_WORKERS") {
            config.workers = parse_usize("MATMUL_WORKERS", &v)?;
        }
        if let Some(v) = lookup("MATMUL_VECTOR_ISA") {
            config.vector_isa = Some(v.parse()?);
        }
        config.validate()?;
        Ok(config)
    }
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn parse_usize(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| MatmulError::InvalidConfig(format!("{key}: `{value}` is not a count")))
}
