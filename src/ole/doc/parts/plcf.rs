//! Property List with Character Positions (PLC).
//!
//! A PLC stores `n + 1` ascending 32-bit positions followed by `n`
//! fixed-size elements; element `i` covers positions `[cp[i], cp[i + 1])`.

use crate::common::binary;
use crate::common::error::{Error, Result};
use bytes::Bytes;

/// A parsed PLC.
///
/// # Examples
///
/// ```
/// use oleparse::ole::doc::parts::plcf::Plcf;
///
/// // CPs: 0, 10, 20; elements: [1, 2], [3, 4]
/// let data = vec![
///     0x00, 0x00, 0x00, 0x00,
///     0x0A, 0x00, 0x00, 0x00,
///     0x14, 0x00, 0x00, 0x00,
///     0x01, 0x02,
///     0x03, 0x04,
/// ];
///
/// let plcf = Plcf::parse(&data, 2).unwrap();
/// assert_eq!(plcf.len(), 2);
/// assert_eq!(plcf.range(1), Some((10, 20)));
/// assert_eq!(plcf.element(1), Some(&[3u8, 4][..]));
/// ```
#[derive(Debug, Clone)]
pub struct Plcf {
    positions: Vec<u32>,
    elements: Bytes,
    element_size: usize,
}

impl Plcf {
    /// Parse a PLC whose elements are `element_size` bytes each.
    ///
    /// The byte length must be exactly `4 * (n + 1) + element_size * n`.
    pub fn parse(data: &[u8], element_size: usize) -> Result<Self> {
        let stride = element_size + 4;
        if data.len() < 4 || (data.len() - 4) % stride != 0 {
            return Err(Error::InvalidFormat(format!(
                "PLC of {} bytes does not hold whole {}-byte elements",
                data.len(),
                element_size
            )));
        }
        let n = (data.len() - 4) / stride;

        let positions = (0..=n)
            .map(|i| binary::read_u32_le(data, i * 4))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let start = (n + 1) * 4;
        Ok(Self {
            positions,
            elements: Bytes::copy_from_slice(&data[start..]),
            element_size,
        })
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len().saturating_sub(1)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position `index`; valid for `0..=len()`.
    #[inline]
    pub fn position(&self, index: usize) -> Option<u32> {
        self.positions.get(index).copied()
    }

    pub fn element(&self, index: usize) -> Option<&[u8]> {
        if index >= self.len() {
            return None;
        }
        let start = index * self.element_size;
        Some(&self.elements[start..start + self.element_size])
    }

    /// `(start, end)` positions covered by element `index`.
    pub fn range(&self, index: usize) -> Option<(u32, u32)> {
        if index >= self.len() {
            return None;
        }
        Some((self.positions[index], self.positions[index + 1]))
    }

    /// Iterate over `(start, end, element)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, &[u8])> + '_ {
        (0..self.len()).map(move |i| {
            let start = i * self.element_size;
            (
                self.positions[i],
                self.positions[i + 1],
                &self.elements[start..start + self.element_size],
            )
        })
    }
}
