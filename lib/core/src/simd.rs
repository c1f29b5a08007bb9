// SIMD kernels for the two distance modes used by the flat index.
// AVX2/FMA on x86_64, NEON on aarch64, scalar everywhere else.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

// Below this width the scalar loop wins over the setup cost
#[cfg(any(target_arch = "x86_64", target_arch = "aarch64"))]
const MIN_DIM_SIZE_SIMD: usize = 16;

/// Inner product of two equal-length slices, 0.0 if lengths differ
#[inline]
pub fn dot_product_simd(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    #[cfg(target_arch = "x86_64")]
    {
        if a.len() >= MIN_DIM_SIZE_SIMD
            && is_x86_feature_detected!("avx2")
            && is_x86_feature_detected!("fma")
        {
            return unsafe { dot_product_avx2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if a.len() >= MIN_DIM_SIZE_SIMD && std::arch::is_aarch64_feature_detected!("neon") {
            return unsafe { dot_product_neon(a, b) };
        }
    }

    dot_product_scalar(a, b)
}

/// Squared Euclidean distance, infinite if lengths differ
#[inline]
pub fn l2_squared_simd(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }

    #[cfg(target_arch = "x86_64")]
    {
        if a.len() >= MIN_DIM_SIZE_SIMD
            && is_x86_feature_detected!("avx2")
            && is_x86_feature_detected!("fma")
        {
            return unsafe { l2_squared_avx2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if a.len() >= MIN_DIM_SIZE_SIMD && std::arch::is_aarch64_feature_detected!("neon") {
            return unsafe { l2_squared_neon(a, b) };
        }
    }

    l2_squared_scalar(a, b)
}

/// Squared L2 norm
#[inline]
pub fn norm_squared_simd(v: &[f32]) -> f32 {
    dot_product_simd(v, v)
}

/// L2 norm
#[inline]
pub fn norm_simd(v: &[f32]) -> f32 {
    norm_squared_simd(v).sqrt()
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
#[inline]
unsafe fn hsum_avx(v: __m256) -> f32 {
    let high = _mm256_extractf128_ps(v, 1);
    let low = _mm256_castps256_ps128(v);
    let mut sum = _mm_add_ps(high, low);
    sum = _mm_hadd_ps(sum, sum);
    sum = _mm_hadd_ps(sum, sum);
    _mm_cvtss_f32(sum)
}

/// 16 lanes per iteration across two accumulators
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
#[inline]
unsafe fn dot_product_avx2(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut acc1 = _mm256_setzero_ps();
    let mut acc2 = _mm256_setzero_ps();

    while i + 16 <= dim {
        let x1 = _mm256_loadu_ps(a.as_ptr().add(i));
        let y1 = _mm256_loadu_ps(b.as_ptr().add(i));
        let x2 = _mm256_loadu_ps(a.as_ptr().add(i + 8));
        let y2 = _mm256_loadu_ps(b.as_ptr().add(i + 8));
        acc1 = _mm256_fmadd_ps(x1, y1, acc1);
        acc2 = _mm256_fmadd_ps(x2, y2, acc2);
        i += 16;
    }

    let mut dot = hsum_avx(_mm256_add_ps(acc1, acc2));
    while i < dim {
        dot += a[i] * b[i];
        i += 1;
    }
    dot
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
#[inline]
unsafe fn l2_squared_avx2(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut acc1 = _mm256_setzero_ps();
    let mut acc2 = _mm256_setzero_ps();

    while i + 16 <= dim {
        let d1 = _mm256_sub_ps(
            _mm256_loadu_ps(a.as_ptr().add(i)),
            _mm256_loadu_ps(b.as_ptr().add(i)),
        );
        let d2 = _mm256_sub_ps(
            _mm256_loadu_ps(a.as_ptr().add(i + 8)),
            _mm256_loadu_ps(b.as_ptr().add(i + 8)),
        );
        acc1 = _mm256_fmadd_ps(d1, d1, acc1);
        acc2 = _mm256_fmadd_ps(d2, d2, acc2);
        i += 16;
    }

    let mut sum_sq = hsum_avx(_mm256_add_ps(acc1, acc2));
    while i < dim {
        let diff = a[i] - b[i];
        sum_sq += diff * diff;
        i += 1;
    }
    sum_sq
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
unsafe fn dot_product_neon(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut acc1 = vdupq_n_f32(0.0);
    let mut acc2 = vdupq_n_f32(0.0);

    while i + 8 <= dim {
        acc1 = vfmaq_f32(acc1, vld1q_f32(a.as_ptr().add(i)), vld1q_f32(b.as_ptr().add(i)));
        acc2 = vfmaq_f32(
            acc2,
            vld1q_f32(a.as_ptr().add(i + 4)),
            vld1q_f32(b.as_ptr().add(i + 4)),
        );
        i += 8;
    }

    let mut dot = vaddvq_f32(vaddq_f32(acc1, acc2));
    while i < dim {
        dot += a[i] * b[i];
        i += 1;
    }
    dot
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
#[inline]
unsafe fn l2_squared_neon(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut acc1 = vdupq_n_f32(0.0);
    let mut acc2 = vdupq_n_f32(0.0);

    while i + 8 <= dim {
        let d1 = vsubq_f32(vld1q_f32(a.as_ptr().add(i)), vld1q_f32(b.as_ptr().add(i)));
        let d2 = vsubq_f32(
            vld1q_f32(a.as_ptr().add(i + 4)),
            vld1q_f32(b.as_ptr().add(i + 4)),
        );
        acc1 = vfmaq_f32(acc1, d1, d1);
        acc2 = vfmaq_f32(acc2, d2, d2);
        i += 8;
    }

    let mut sum_sq = vaddvq_f32(vaddq_f32(acc1, acc2));
    while i < dim {
        let diff = a[i] - b[i];
        sum_sq += diff * diff;
        i += 1;
    }
    sum_sq
}

/// Two accumulators so the adds can pipeline
#[inline]
fn dot_product_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut dot0 = 0.0f32;
    let mut dot1 = 0.0f32;

    let chunks = a.chunks_exact(4);
    let remainder = chunks.remainder();
    for (x, y) in chunks.zip(b.chunks_exact(4)) {
        dot0 += x[0] * y[0] + x[1] * y[1];
        dot1 += x[2] * y[2] + x[3] * y[3];
    }

    let tail = a.len() - remainder.len();
    for i in tail..a.len() {
        dot0 += a[i] * b[i];
    }
    dot0 + dot1
}

#[inline]
fn l2_squared_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut sum0 = 0.0f32;
    let mut sum1 = 0.0f32;

    let chunks = a.chunks_exact(4);
    let remainder = chunks.remainder();
    for (x, y) in chunks.zip(b.chunks_exact(4)) {
        let d0 = x[0] - y[0];
        let d1 = x[1] - y[1];
        let d2 = x[2] - y[2];
        let d3 = x[3] - y[3];
        sum0 += d0 * d0 + d1 * d1;
        sum1 += d2 * d2 + d3 * d3;
    }

    let tail = a.len() - remainder.len();
    for i in tail..a.len() {
        let diff = a[i] - b[i];
        sum0 += diff * diff;
    }
    sum0 + sum1
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    fn naive_dot(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    fn naive_l2_squared(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
    }

    #[test]
    fn test_kernels_match_naive_across_widths() {
        let mut rng = rand::rng();
        // Widths around the SIMD thresholds and the embedding sizes in use
        for dim in [1, 3, 7, 15, 16, 17, 33, 384, 768, 901] {
            let a: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..1.0)).collect();
            let b: Vec<f32> = (0..dim).map(|_| rng.random_range(-1.0f32..1.0)).collect();

            let tolerance = 1e-3 * dim as f32;
            assert!((dot_product_simd(&a, &b) - naive_dot(&a, &b)).abs() < tolerance);
            assert!((l2_squared_simd(&a, &b) - naive_l2_squared(&a, &b)).abs() < tolerance);
        }
    }

    #[test]
    fn test_mismatched_lengths() {
        assert_eq!(dot_product_simd(&[1.0, 2.0], &[1.0]), 0.0);
        assert!(l2_squared_simd(&[1.0, 2.0], &[1.0]).is_infinite());
    }

    #[test]
    fn test_identical_vectors_have_zero_distance() {
        let v: Vec<f32> = (0..40).map(|i| i as f32 * 0.25).collect();
        assert_eq!(l2_squared_simd(&v, &v), 0.0);
        assert!((norm_simd(&[3.0, 4.0]) - 5.0).abs() < 1e-6);
    }
}
