//! Decoded camera frame

/// Packed 8-bit, 3-channel image (channel order is irrelevant here: every
/// operation below is symmetric in the channels)
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self { width, height, data }
    }

    /// Uniform frame, handy for tests and placeholders
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self::new(width, height, vec![value; width as usize * height as usize * 3])
    }

    pub fn is_empty(&self) -> bool {
        self.data.len() < 3
    }

    /// Linear contrast/brightness: px = clamp(round(alpha * px + beta))
    pub fn boost(&mut self, alpha: f64, beta: f64) {
        for px in self.data.iter_mut() {
            *px = (alpha * *px as f64 + beta).round().clamp(0.0, 255.0) as u8;
        }
    }

    /// Mean of the HSV value channel (per-pixel max over channels)
    pub fn mean_value(&self) -> f64 {
        let pixels = self.data.chunks_exact(3);
        let count = pixels.len();
        if count == 0 {
            return 0.0;
        }
        let sum: u64 = pixels
            .map(|p| p[0].max(p[1]).max(p[2]) as u64)
            .sum();
        sum as f64 / count as f64
    }
}
