//! Readers for the IDX binary files used by MNIST and its derivatives.
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-3:   magic 2051  (0x00000803, big-endian)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-3:   magic 2049  (0x00000801, big-endian)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index
//! ```

use std::path::Path;

use log::info;

use crate::data::dataset::Split;
use crate::data::labels::Labels;
use crate::data::memory::{Layout, MemoryDataset};
use crate::data::partition_training;
use crate::error::{Error, Result};
use crate::math::matrix::Matrix;

const IMAGE_MAGIC: u32 = 2051;
const LABEL_MAGIC: u32 = 2049;

/// Decoded image file: one normalized image per column.
#[derive(Debug, Clone)]
pub struct Images {
    pub pixels: Matrix,
    pub width: usize,
    pub height: usize,
}

fn be_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

/// Parses an IDX3 image file. Pixels are divided by 255 so they lie in [0, 1].
pub fn parse_images(bytes: &[u8]) -> Result<Images> {
    if bytes.len() < 16 {
        return Err(Error::Format(format!(
            "IDX image file too short: expected at least 16 header bytes, got {}",
            bytes.len()
        )));
    }
    let magic = be_u32(bytes, 0);
    if magic != IMAGE_MAGIC {
        return Err(Error::Format(format!(
            "IDX image file magic number mismatch (got {}, expected {})",
            magic, IMAGE_MAGIC
        )));
    }

    let n_images = be_u32(bytes, 4) as usize;
    let height = be_u32(bytes, 8) as usize;
    let width = be_u32(bytes, 12) as usize;
    let n_pixels = height.checked_mul(width).ok_or_else(|| {
        Error::Format(format!("IDX image file: rows * cols overflows (rows={}, cols={})", height, width))
    })?;
    let needed = n_images
        .checked_mul(n_pixels)
        .and_then(|n| n.checked_add(16))
        .ok_or_else(|| Error::Format("IDX image file: data length overflows".into()))?;
    if bytes.len() < needed {
        return Err(Error::Format(format!(
            "IDX image file too short: header declares {} images of {}×{} pixels, \
             but file is only {} bytes",
            n_images, height, width, bytes.len()
        )));
    }

    let mut pixels = Matrix::zeros(n_pixels, n_images);
    for (image, chunk) in bytes[16..needed].chunks_exact(n_pixels.max(1)).enumerate() {
        for (p, &px) in chunk.iter().enumerate() {
            pixels.data[p][image] = px as f64 / 255.0;
        }
    }

    Ok(Images { pixels, width, height })
}

/// Parses an IDX1 label file into class indices.
pub fn parse_labels(bytes: &[u8]) -> Result<Vec<usize>> {
    if bytes.len() < 8 {
        return Err(Error::Format(format!(
            "IDX label file too short: expected at least 8 header bytes, got {}",
            bytes.len()
        )));
    }
    let magic = be_u32(bytes, 0);
    if magic != LABEL_MAGIC {
        return Err(Error::Format(format!(
            "IDX label file magic number mismatch (got {}, expected {})",
            magic, LABEL_MAGIC
        )));
    }
    let n_labels = be_u32(bytes, 4) as usize;
    if bytes.len() < 8 + n_labels {
        return Err(Error::Format(format!(
            "IDX label file too short: header declares {} labels but file is only {} bytes",
            n_labels, bytes.len()
        )));
    }
    Ok(bytes[8..8 + n_labels].iter().map(|&b| b as usize).collect())
}

fn read_pair(image_path: &Path, label_path: &Path) -> Result<(Images, Vec<usize>)> {
    let images = parse_images(&std::fs::read(image_path)?)?;
    let labels = parse_labels(&std::fs::read(label_path)?)?;
    if images.pixels.cols != labels.len() {
        return Err(Error::InvalidDataset(format!(
            "{} holds {} images but {} holds {} labels",
            image_path.display(), images.pixels.cols, label_path.display(), labels.len()
        )));
    }
    Ok((images, labels))
}

/// Loads MNIST from `dir`.
///
/// The first `training` examples of the training files (everything not
/// reserved for validation when `None`) form the training split with one-hot
/// labels; the last `validation` examples form the validation split with index
/// labels. The t10k files form the test split.
pub fn load_mnist(dir: &Path, training: Option<usize>, validation: usize) -> Result<MemoryDataset> {
    info!("Reading data from {:?}:", dir);
    let (train_images, train_labels) =
        read_pair(&dir.join("train-images-idx3-ubyte"), &dir.join("train-labels-idx1-ubyte"))?;
    let (test_images, test_labels) =
        read_pair(&dir.join("t10k-images-idx3-ubyte"), &dir.join("t10k-labels-idx1-ubyte"))?;

    if (test_images.width, test_images.height) != (train_images.width, train_images.height) {
        return Err(Error::InvalidDataset(format!(
            "test images are {}×{} but training images are {}×{}",
            test_images.width, test_images.height, train_images.width, train_images.height
        )));
    }

    let n_outputs = train_labels.iter().max().map_or(0, |&c| c + 1);
    let layout = Layout::Image { width: train_images.width, height: train_images.height };

    let full = Split::new(train_images.pixels, Labels::Index(train_labels))?;
    let (mut train_split, validation_split) = partition_training(&full, training, validation)?;
    train_split.labels = Labels::OneHot(train_split.labels.to_one_hot(n_outputs));

    let test = Split::new(test_images.pixels, Labels::Index(test_labels))?;
    MemoryDataset::new(train_split, validation_split, test, n_outputs, layout)
}
