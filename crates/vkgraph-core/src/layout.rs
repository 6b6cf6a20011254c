/// GPU memory layouts for texture-backed tensors
///
/// A texture stores four consecutive elements of one logical dimension in a single texel.
/// Which dimension gets packed decides the texture's extents and therefore which regions
/// can be addressed with plain 3-D texel offsets.
use crate::shape::Shape;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// Number of elements packed into one texel
pub const TEXEL_PACKING: usize = 4;

/// Which logical dimension is packed into texels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum GpuMemoryLayout {
    /// Four consecutive width elements per texel
    WidthPacked,
    /// Four consecutive height elements per texel
    HeightPacked,
    /// Four consecutive channels per texel; batches are stacked along depth
    #[default]
    ChannelsPacked,
}

impl GpuMemoryLayout {
    pub fn name(&self) -> &'static str {
        match self {
            GpuMemoryLayout::WidthPacked => "width_packed",
            GpuMemoryLayout::HeightPacked => "height_packed",
            GpuMemoryLayout::ChannelsPacked => "channels_packed",
        }
    }

    /// Texture extents, in texels, needed to hold a tensor of the given shape.
    ///
    /// Sizes are padded to (N, C, H, W). The packed dimension is divided by
    /// [`TEXEL_PACKING`] rounding up; batch always folds into depth. Extents that do not fit
    /// an `i32` saturate at `i32::MAX`, which no device image reaches.
    pub fn image_extents(&self, shape: &Shape) -> IVec3 {
        let [w, h, c, n] = shape.whcn();
        let (x, y, z) = match self {
            GpuMemoryLayout::WidthPacked => (w.div_ceil(TEXEL_PACKING), h, c.saturating_mul(n)),
            GpuMemoryLayout::HeightPacked => (w, h.div_ceil(TEXEL_PACKING), c.saturating_mul(n)),
            GpuMemoryLayout::ChannelsPacked => {
                (w, h, c.div_ceil(TEXEL_PACKING).saturating_mul(n))
            }
        };
        IVec3::new(texel_extent(x), texel_extent(y), texel_extent(z))
    }
}

fn texel_extent(size: usize) -> i32 {
    i32::try_from(size).unwrap_or(i32::MAX)
}

impl std::fmt::Display for GpuMemoryLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Texel coordinates or extents: x = width, y = height, z = depth (batch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct IVec3 {
    pub data: [i32; 3],
}

impl IVec3 {
    pub const ZERO: IVec3 = IVec3 { data: [0, 0, 0] };

    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { data: [x, y, z] }
    }

    pub fn x(&self) -> i32 {
        self.data[0]
    }

    pub fn y(&self) -> i32 {
        self.data[1]
    }

    pub fn z(&self) -> i32 {
        self.data[2]
    }

    /// Pad to four components for std140 uniform blocks
    pub fn to_ivec4(self) -> [i32; 4] {
        [self.data[0], self.data[1], self.data[2], 0]
    }

    /// Component-wise sum, `None` if any component overflows
    pub fn checked_add(self, rhs: IVec3) -> Option<IVec3> {
        Some(IVec3::new(
            self.data[0].checked_add(rhs.data[0])?,
            self.data[1].checked_add(rhs.data[1])?,
            self.data[2].checked_add(rhs.data[2])?,
        ))
    }
}

impl std::fmt::Display for IVec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.data[0], self.data[1], self.data[2])
    }
}
