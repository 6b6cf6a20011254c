//! Execute nodes appended to the graph by operators

use super::value::ValueRef;
use crate::layout::IVec3;
use bytemuck::{Pod, Zeroable};
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

/// How a node touches the values in one of its argument groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum MemoryAccess {
    Read,
    Write,
}

/// A set of values bound with the same access mode
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ArgGroup {
    pub refs: Vec<ValueRef>,
    pub access: MemoryAccess,
}

impl ArgGroup {
    pub fn read(refs: Vec<ValueRef>) -> Self {
        Self {
            refs,
            access: MemoryAccess::Read,
        }
    }

    pub fn write(refs: Vec<ValueRef>) -> Self {
        Self {
            refs,
            access: MemoryAccess::Write,
        }
    }
}

/// Uniform block of the `copy_offset` shader.
///
/// ivec3 members occupy a full ivec4 slot under std140.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CopyOffsetParams {
    pub range: [i32; 4],
    pub src_offset: [i32; 4],
    pub dst_offset: [i32; 4],
}

impl CopyOffsetParams {
    pub fn new(range: IVec3, src_offset: IVec3, dst_offset: IVec3) -> Self {
        Self {
            range: range.to_ivec4(),
            src_offset: src_offset.to_ivec4(),
            dst_offset: dst_offset.to_ivec4(),
        }
    }

    pub fn range(&self) -> IVec3 {
        IVec3::new(self.range[0], self.range[1], self.range[2])
    }

    pub fn src_offset(&self) -> IVec3 {
        IVec3::new(self.src_offset[0], self.src_offset[1], self.src_offset[2])
    }

    pub fn dst_offset(&self) -> IVec3 {
        IVec3::new(self.dst_offset[0], self.dst_offset[1], self.dst_offset[2])
    }
}

/// Uniform block of the `copy_channel_offset` shader
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CopyChannelOffsetParams {
    /// Destination sizes in WHCN order
    pub out_sizes: [i32; 4],
    /// Source sizes in WHCN order
    pub in_sizes: [i32; 4],
    pub channel_range: i32,
    pub src_channel_offset: i32,
    pub dst_channel_offset: i32,
    pub _padding: i32,
}

/// The work a node performs.
///
/// Spatial and channel copies are kept apart: channels are packed four to a texel, so a
/// channel window cannot be described by a texel-aligned 3-D region.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum NodeOp {
    CopyOffset(CopyOffsetParams),
    CopyChannelOffset(CopyChannelOffsetParams),
}

impl NodeOp {
    /// Raw bytes to upload as the node's uniform buffer
    pub fn uniform_bytes(&self) -> &[u8] {
        match self {
            NodeOp::CopyOffset(params) => bytemuck::bytes_of(params),
            NodeOp::CopyChannelOffset(params) => bytemuck::bytes_of(params),
        }
    }
}

/// A compute dispatch recorded in the graph
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ExecuteNode {
    pub label: String,
    pub kernel_name: String,
    pub global_workgroup_size: IVec3,
    pub args: Vec<ArgGroup>,
    pub op: NodeOp,
}

impl ExecuteNode {
    /// Values this node reads
    pub fn reads(&self) -> Vec<ValueRef> {
        self.refs_with(MemoryAccess::Read)
    }

    /// Values this node writes
    pub fn writes(&self) -> Vec<ValueRef> {
        self.refs_with(MemoryAccess::Write)
    }

    fn refs_with(&self, access: MemoryAccess) -> Vec<ValueRef> {
        self.args
            .iter()
            .filter(|group| group.access == access)
            .flat_map(|group| group.refs.iter().copied())
            .collect()
    }

    pub fn as_copy_offset(&self) -> Option<&CopyOffsetParams> {
        match &self.op {
            NodeOp::CopyOffset(params) => Some(params),
            _ => None,
        }
    }

    pub fn as_copy_channel_offset(&self) -> Option<&CopyChannelOffsetParams> {
        match &self.op {
            NodeOp::CopyChannelOffset(params) => Some(params),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_block_sizes() {
        let offset = NodeOp::CopyOffset(CopyOffsetParams::new(
            IVec3::new(2, 1, 1),
            IVec3::ZERO,
            IVec3::ZERO,
        ));
        assert_eq!(offset.uniform_bytes().len(), 48);

        let channel = NodeOp::CopyChannelOffset(CopyChannelOffsetParams::zeroed());
        assert_eq!(channel.uniform_bytes().len(), 48);
    }

    #[test]
    fn test_read_write_groups() {
        let node = ExecuteNode {
            label: "copy".to_string(),
            kernel_name: "copy_offset_float".to_string(),
            global_workgroup_size: IVec3::new(1, 1, 1),
            args: vec![ArgGroup::write(vec![3]), ArgGroup::read(vec![0])],
            op: NodeOp::CopyOffset(CopyOffsetParams::zeroed()),
        };
        assert_eq!(node.reads(), vec![0]);
        assert_eq!(node.writes(), vec![3]);
        assert!(node.as_copy_offset().is_some());
        assert!(node.as_copy_channel_offset().is_none());
    }
}
