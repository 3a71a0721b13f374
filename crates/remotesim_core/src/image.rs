use crate::error::{CoreError, Domain, ErrorKind, Result};

/// Pixel layout of a vision-sensor capture.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ImageFormat {
    Grayscale,
    Rgb,
}

impl ImageFormat {
    pub const fn channels(self) -> usize {
        match self {
            ImageFormat::Grayscale => 1,
            ImageFormat::Rgb => 3,
        }
    }
}

/// Decoded vision-sensor image, rows top-down.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Image {
    /// `rows[y][x]` intensity.
    Grayscale(Vec<Vec<u8>>),
    /// `rows[y][x]` = `[r, g, b]`.
    Rgb(Vec<Vec<[u8; 3]>>),
}

impl Image {
    pub fn height(&self) -> usize {
        match self {
            Image::Grayscale(rows) => rows.len(),
            Image::Rgb(rows) => rows.len(),
        }
    }

    pub fn width(&self) -> usize {
        match self {
            Image::Grayscale(rows) => rows.first().map_or(0, Vec::len),
            Image::Rgb(rows) => rows.first().map_or(0, Vec::len),
        }
    }

    pub const fn format(&self) -> ImageFormat {
        match self {
            Image::Grayscale(_) => ImageFormat::Grayscale,
            Image::Rgb(_) => ImageFormat::Rgb,
        }
    }
}

/// Decode a raw vision-sensor buffer into a top-down image.
///
/// The server delivers pixel bytes as signed chars, rows bottom-up. Each
/// byte is reinterpreted as unsigned (two's-complement wraparound), the flat
/// run is grouped into RGB triples unless grayscale was requested, and row
/// order is flipped so row 0 is the top of the frame.
pub fn decode_image(pixels: &[i8], resolution: [u32; 2], format: ImageFormat) -> Result<Image> {
    let width = resolution[0] as usize;
    let height = resolution[1] as usize;
    let expected = width * height * format.channels();
    if pixels.len() != expected {
        return Err(CoreError::warn()
            .domain(Domain::Data)
            .kind(ErrorKind::InvalidArgument)
            .msgf(format_args!(
                "vision frame of {} bytes does not match {}x{} {:?} resolution",
                pixels.len(),
                width,
                height,
                format
            ))
            .build());
    }

    let row_len = width * format.channels();
    let image = match format {
        ImageFormat::Grayscale => Image::Grayscale(
            pixels
                .chunks_exact(row_len)
                .rev()
                .map(|row| row.iter().map(|b| *b as u8).collect())
                .collect(),
        ),
        ImageFormat::Rgb => Image::Rgb(
            pixels
                .chunks_exact(row_len)
                .rev()
                .map(|row| {
                    row.chunks_exact(3)
                        .map(|p| [p[0] as u8, p[1] as u8, p[2] as u8])
                        .collect()
                })
                .collect(),
        ),
    };

    Ok(image)
}
