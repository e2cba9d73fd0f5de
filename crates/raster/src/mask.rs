use std::fmt;

/// An 8 bit coverage mask, stored row by row.
#[derive(Clone, PartialEq, Eq)]
pub struct AlphaMask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl AlphaMask {
    /// Creates a fully transparent mask.
    pub fn new(width: u32, height: u32) -> Self {
        AlphaMask {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Coverage of the pixel at (`x`, `y`), from 0 to 255.
    ///
    /// Panics if the pixel is out of bounds.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> u8 {
        assert!(x < self.width && y < self.height);
        self.data[y as usize * self.width as usize + x as usize]
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.data[start..start + w]
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    /// Sum of the coverage of all pixels, in pixels.
    pub fn covered_area(&self) -> f32 {
        self.data.iter().map(|&a| a as f32).sum::<f32>() / 255.0
    }

    pub(crate) fn clear(&mut self) {
        for a in &mut self.data {
            *a = 0;
        }
    }
}

impl fmt::Debug for AlphaMask {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "AlphaMask {}x{}", self.width, self.height)?;
        for y in 0..self.height {
            for a in self.row(y) {
                write!(f, "{:4}", a)?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[test]
fn mask_rows() {
    let mut mask = AlphaMask::new(3, 2);
    mask.data_mut()[4] = 255;
    assert_eq!(mask.get(1, 1), 255);
    assert_eq!(mask.row(1), &[0, 255, 0]);
    assert_eq!(mask.covered_area(), 1.0);

    mask.clear();
    assert_eq!(mask.covered_area(), 0.0);
}
