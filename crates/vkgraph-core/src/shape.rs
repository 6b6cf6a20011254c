#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Logical tensor sizes, most significant dimension first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    pub fn new(dims: Vec<usize>) -> Self {
        Self { dims }
    }

    pub fn from_slice(dims: &[usize]) -> Self {
        Self {
            dims: dims.to_vec(),
        }
    }

    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    pub fn numel(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Size of the dimension `offset` positions from the end (1 = innermost).
    ///
    /// Dimensions beyond the tensor's rank behave as size 1, which is how lower-rank tensors
    /// are laid out in the 4-D physical layout.
    pub fn size_from_end(&self, offset: usize) -> usize {
        if offset == 0 || offset > self.dims.len() {
            1
        } else {
            self.dims[self.dims.len() - offset]
        }
    }

    /// Sizes in (width, height, channels, batch) order, padded with 1s.
    pub fn whcn(&self) -> [usize; 4] {
        [
            self.size_from_end(1),
            self.size_from_end(2),
            self.size_from_end(3),
            self.size_from_end(4),
        ]
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Self::new(dims)
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{dim}")?;
        }
        write!(f, "]")
    }
}
