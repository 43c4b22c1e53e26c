//! Runtime CPU feature probe.
//!
//! The vector strategies never execute an instruction the probe has not
//! reported. Callers may build a [`CpuFeatures`] by hand to pretend a
//! feature is missing; a feature the running CPU lacks is ignored, since
//! kernel selection intersects the given set with [`CpuFeatures::detect`].

use std::fmt;

/// Vector capabilities relevant to the f64 kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuFeatures {
    pub avx2: bool,
    pub fma: bool,
    pub avx512f: bool,
}

impl CpuFeatures {
    /// Probe the running CPU.
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            Self {
                avx2: is_x86_feature_detected!("avx2"),
                fma: is_x86_feature_detected!("fma"),
                avx512f: is_x86_feature_detected!("avx512f"),
            }
        }

        #[cfg(not(target_arch = "x86_64"))]
        {
            Self::none()
        }
    }

    /// A CPU with no vector extensions. Only portable lanes will be used.
    pub fn none() -> Self {
        Self::default()
    }

    /// Features present in both sets.
    pub fn intersect(self, other: CpuFeatures) -> Self {
        Self {
            avx2: self.avx2 && other.avx2,
            fma: self.fma && other.fma,
            avx512f: self.avx512f && other.avx512f,
        }
    }

    pub fn has_avx2_fma(&self) -> bool {
        self.avx2 && self.fma
    }

    pub fn has_avx512_fma(&self) -> bool {
        self.avx512f && self.fma
    }
}

impl fmt::Display for CpuFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AVX2={}, FMA={}, AVX-512={}",
            self.avx2, self.fma, self.avx512f
        )
    }
}
