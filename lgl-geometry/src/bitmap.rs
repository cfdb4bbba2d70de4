use crate::errors::GeometryError;

/// Pixel layouts a decoded image can arrive in.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BitmapFormat {
    /// 24 bits per pixel, blue first
    Bgr8,
    /// 32 bits per pixel, blue first
    Bgra8,
    /// 8 bit luminance
    Gray8,
}

impl BitmapFormat {
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            BitmapFormat::Bgr8 => 3,
            BitmapFormat::Bgra8 => 4,
            BitmapFormat::Gray8 => 1,
        }
    }
}

/// A decoded image: tightly packed rows, no padding.
#[derive(Clone, Debug)]
pub struct Bitmap {
    width: u32,
    height: u32,
    format: BitmapFormat,
    data: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, format: BitmapFormat) -> Self {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        Self {
            width,
            height,
            format,
            data: vec![0; len],
        }
    }

    pub fn from_raw(
        width: u32,
        height: u32,
        format: BitmapFormat,
        data: Vec<u8>,
    ) -> Result<Self, GeometryError> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if expected != data.len() {
            return Err(GeometryError::simple(format!(
                "size mismatch : {}*{}*{} != {}",
                width,
                height,
                format.bytes_per_pixel(),
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> BitmapFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: &[u8]) -> Result<(), GeometryError> {
        let bpp = self.format.bytes_per_pixel();
        if x >= self.width || y >= self.height || pixel.len() != bpp {
            return Err(GeometryError::simple(format!(
                "bad pixel write at ({}, {}) with {} bytes",
                x,
                y,
                pixel.len()
            )));
        }
        let start = (y as usize * self.width as usize + x as usize) * bpp;
        self.data[start..start + bpp].copy_from_slice(pixel);
        Ok(())
    }
}
