// Distance kernels for the flat similarity scan.
// AVX2/FMA on x86_64, NEON on aarch64, unrolled scalar everywhere else.
// Every kernel returns the same value for the same inputs on a given machine,
// which the index relies on for reproducible result order.

#[cfg(target_arch = "x86_64")]
use std::arch::x86_64::*;

#[cfg(target_arch = "aarch64")]
use std::arch::aarch64::*;

#[cfg(target_arch = "x86_64")]
const MIN_DIM_SIZE_AVX: usize = 32;

#[cfg(target_arch = "aarch64")]
const MIN_DIM_SIZE_NEON: usize = 16;

/// Inner product of two equal-length slices. Mismatched lengths yield 0.0.
#[inline]
pub fn dot_product_simd(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    #[cfg(target_arch = "x86_64")]
    {
        if a.len() >= MIN_DIM_SIZE_AVX
            && is_x86_feature_detected!("avx2")
            && is_x86_feature_detected!("fma")
        {
            return unsafe { dot_product_avx2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if a.len() >= MIN_DIM_SIZE_NEON && std::arch::is_aarch64_feature_detected!("neon") {
            return unsafe { dot_product_neon(a, b) };
        }
    }

    dot_product_scalar(a, b)
}

/// Squared Euclidean distance. Mismatched lengths yield `f32::INFINITY`.
///
/// No square root is taken: ranking is identical and the value matches what
/// a flat L2 index reports as its distance.
#[inline]
pub fn l2_squared_simd(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return f32::INFINITY;
    }

    #[cfg(target_arch = "x86_64")]
    {
        if a.len() >= MIN_DIM_SIZE_AVX
            && is_x86_feature_detected!("avx2")
            && is_x86_feature_detected!("fma")
        {
            return unsafe { l2_squared_avx2(a, b) };
        }
    }

    #[cfg(target_arch = "aarch64")]
    {
        if a.len() >= MIN_DIM_SIZE_NEON && std::arch::is_aarch64_feature_detected!("neon") {
            return unsafe { l2_squared_neon(a, b) };
        }
    }

    l2_squared_scalar(a, b)
}

#[inline]
pub fn norm_simd(v: &[f32]) -> f32 {
    dot_product_simd(v, v).sqrt()
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn horizontal_sum_avx2(v: __m256) -> f32 {
    let high = _mm256_extractf128_ps(v, 1);
    let low = _mm256_castps256_ps128(v);
    let mut sum = _mm_add_ps(high, low);
    sum = _mm_hadd_ps(sum, sum);
    sum = _mm_hadd_ps(sum, sum);
    _mm_cvtss_f32(sum)
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
unsafe fn dot_product_avx2(a: &[f32], b: &[f32]) -> f32 {
    let dim = a.len();
    let mut i = 0;
    let mut acc1 = _mm256_setzero_ps();
    let mut acc2 = _mm256_setzero_ps();

    while i + 16 <= dim {
        let a1 = _mm256_loadu_ps(a.as_ptr().add(i));
        let b1 = _mm256_loadu_ps(b.as_ptr().add(i));
        let a2 = _mm256_loadu_ps(a.as_ptr().add(i + 8));
        let b2 = _mm256_loadu_ps(b.as_ptr().add(i + 8));
        acc1 = _mm256_fmadd_ps(a1, b1, acc1);
        acc2 = _mm256_fmadd_ps(a2, b2, acc2);
        i += 16;
    }

    let mut total = horizontal_sum_avx2(_mm256_add_ps(acc1, acc2));
    while i < dim {
        total += a[i] * b[i];
        i += 1;
    }
    total
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2", enable = "fma")]
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

    let mut total = horizontal_sum_avx2(_mm256_add_ps(acc1, acc2));
    while i < dim {
        let d = a[i] - b[i];
        total += d * d;
        i += 1;
    }
    total
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
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

    let mut total = vaddvq_f32(vaddq_f32(acc1, acc2));
    while i < dim {
        total += a[i] * b[i];
        i += 1;
    }
    total
}

#[cfg(target_arch = "aarch64")]
#[target_feature(enable = "neon")]
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

    let mut total = vaddvq_f32(vaddq_f32(acc1, acc2));
    while i < dim {
        let d = a[i] - b[i];
        total += d * d;
        i += 1;
    }
    total
}

/// Two accumulators over chunks of 8 for better pipelining.
#[inline]
fn dot_product_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut acc0 = 0.0f32;
    let mut acc1 = 0.0f32;

    let a_chunks = a.chunks_exact(8);
    let b_chunks = b.chunks_exact(8);
    let tail = a_chunks.remainder().len();

    for (x, y) in a_chunks.zip(b_chunks) {
        acc0 += x[0] * y[0] + x[1] * y[1] + x[2] * y[2] + x[3] * y[3];
        acc1 += x[4] * y[4] + x[5] * y[5] + x[6] * y[6] + x[7] * y[7];
    }

    for i in (a.len() - tail)..a.len() {
        acc0 += a[i] * b[i];
    }
    acc0 + acc1
}

#[inline]
fn l2_squared_scalar(a: &[f32], b: &[f32]) -> f32 {
    let mut acc0 = 0.0f32;
    let mut acc1 = 0.0f32;

    let a_chunks = a.chunks_exact(4);
    let b_chunks = b.chunks_exact(4);
    let tail = a_chunks.remainder().len();

    for (x, y) in a_chunks.zip(b_chunks) {
        let d0 = x[0] - y[0];
        let d1 = x[1] - y[1];
        let d2 = x[2] - y[2];
        let d3 = x[3] - y[3];
        acc0 += d0 * d0 + d1 * d1;
        acc1 += d2 * d2 + d3 * d3;
    }

    for i in (a.len() - tail)..a.len() {
        let d = a[i] - b[i];
        acc0 += d * d;
    }
    acc0 + acc1
}
