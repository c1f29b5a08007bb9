use serde::{Deserialize, Serialize};

/// A dense vector of 32-bit floats
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Append `values` multiplied by `weight`
    #[inline]
    pub fn extend_scaled(&mut self, values: &[f32], weight: f32) {
        self.data.extend(values.iter().map(|v| v * weight));
    }

    /// Inner product; 0.0 when dimensions differ
    #[inline]
    pub fn dot(&self, other: &Vector) -> f32 {
        crate::simd::dot_product_simd(&self.data, &other.data)
    }

    /// Squared L2 distance; infinite when dimensions differ
    #[inline]
    pub fn l2_squared(&self, other: &Vector) -> f32 {
        crate::simd::l2_squared_simd(&self.data, &other.data)
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        crate::simd::norm_simd(&self.data)
    }

    /// True when every component is exactly zero
    pub fn is_zero(&self) -> bool {
        self.data.iter().all(|&x| x == 0.0)
    }

    /// Normalize the vector to unit length. Zero vectors are left untouched.
    #[inline]
    pub fn normalize(&mut self) {
        let norm = crate::simd::norm_simd(&self.data);
        if norm > f32::EPSILON {
            let inv_norm = 1.0 / norm;
            for x in &mut self.data {
                *x *= inv_norm;
            }
        }
    }

    /// Unit-length copy
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut v = self.clone();
        v.normalize();
        v
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_and_l2_squared() {
        let v1 = Vector::new(vec![0.0, 0.0]);
        let v2 = Vector::new(vec![3.0, 4.0]);
        assert!((v1.l2_squared(&v2) - 25.0).abs() < 1e-6);
        assert_eq!(v2.dot(&Vector::new(vec![1.0, 1.0])), 7.0);
        // mismatched widths never compare as close
        assert_eq!(v1.l2_squared(&Vector::new(vec![0.0])), f32::INFINITY);
    }

    #[test]
    fn test_normalize_leaves_zero_vector() {
        let mut zero = Vector::new(vec![0.0; 4]);
        zero.normalize();
        assert_eq!(zero.as_slice(), &[0.0; 4]);
        assert!(zero.is_zero());

        let unit = Vector::new(vec![3.0, 4.0]).normalized();
        assert!((unit.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_extend_scaled() {
        let mut v = Vector::with_capacity(4);
        v.extend_scaled(&[1.0, 2.0], 0.5);
        v.extend_scaled(&[4.0], 2.0);
        assert_eq!(v.as_slice(), &[0.5, 1.0, 8.0]);
    }

    #[test]
    fn test_serde_is_plain_array() {
        let v = Vector::new(vec![1.0, 2.5]);
        assert_eq!(serde_json::to_string(&v).unwrap(), "[1.0,2.5]");
        let back: Vector = serde_json::from_str("[1.0,2.5]").unwrap();
        assert_eq!(back, v);
    }
}
