//! Region copy operators
//!
//! `copy_offset` moves a texel-aligned 3-D box between two textures. `copy_channel_offset`
//! moves a window of channels between two channels-packed tensors; it exists because a
//! channel window generally starts and ends inside a texel.
//!
//! Each operator comes as a `prepare_*` function that validates its arguments and builds the
//! node without touching the graph, and an `add_*` function that also appends it.

use crate::error::{GraphError, Result};
use crate::graph::{
    ArgGroup, ComputeGraph, CopyChannelOffsetParams, CopyOffsetParams, ExecuteNode, NodeOp,
    ValueRef,
};
use crate::layout::{GpuMemoryLayout, IVec3};
use crate::ops::utils::dim::{dim_at, NchwDim};
use crate::tensor::{check_memory_layout_is, VTensor};

const COPY_OFFSET: &str = "copy_offset";
const COPY_CHANNEL_OFFSET: &str = "copy_channel_offset";

fn check_same_dtype(operation: &str, t_in: &VTensor, t_out: &VTensor) -> Result<()> {
    if t_in.dtype() != t_out.dtype() {
        return Err(GraphError::dtype_mismatch(
            operation,
            t_in.dtype().name(),
            t_out.dtype().name(),
        ));
    }
    Ok(())
}

fn check_region(operation: &str, which: &str, offset: IVec3, range: IVec3, limits: IVec3) -> Result<()> {
    for axis in 0..3 {
        let start = i64::from(offset.data[axis]);
        let extent = i64::from(range.data[axis]);
        if start < 0 || extent < 0 || start + extent > i64::from(limits.data[axis]) {
            return Err(GraphError::out_of_bounds(
                operation,
                format!("{which} region at {offset} with range {range} exceeds texture limits {limits}"),
            ));
        }
    }
    Ok(())
}

/// Validate and build a `copy_offset` node copying `range` texels from `src_offset` in `input`
/// to `dst_offset` in `out`.
pub fn prepare_copy_offset_node(
    graph: &ComputeGraph,
    input: ValueRef,
    range: IVec3,
    src_offset: IVec3,
    dst_offset: IVec3,
    out: ValueRef,
) -> Result<ExecuteNode> {
    let t_in = graph.get_tensor(input)?;
    let t_out = graph.get_tensor(out)?;

    check_same_dtype(COPY_OFFSET, t_in, t_out)?;
    check_region(COPY_OFFSET, "source", src_offset, range, t_in.texture_limits())?;
    check_region(COPY_OFFSET, "destination", dst_offset, range, t_out.texture_limits())?;

    let kernel_name = format!("{}_{}", COPY_OFFSET, t_out.dtype().shader_suffix());
    Ok(ExecuteNode {
        label: String::new(),
        kernel_name,
        global_workgroup_size: range,
        args: vec![ArgGroup::write(vec![out]), ArgGroup::read(vec![input])],
        op: NodeOp::CopyOffset(CopyOffsetParams::new(range, src_offset, dst_offset)),
    })
}

pub fn add_copy_offset_node(
    graph: &mut ComputeGraph,
    input: ValueRef,
    range: IVec3,
    src_offset: IVec3,
    dst_offset: IVec3,
    out: ValueRef,
) -> Result<()> {
    let node = prepare_copy_offset_node(graph, input, range, src_offset, dst_offset, out)?;
    graph.append_node(node);
    Ok(())
}

fn whcn_sizes(tensor: &VTensor) -> Result<[i32; 4]> {
    let [w, h, c, n] = tensor.sizes().whcn();
    let to_i32 = |size: usize| {
        i32::try_from(size).map_err(|_| {
            GraphError::out_of_bounds(
                COPY_CHANNEL_OFFSET,
                format!("size {size} of {} does not fit a shader parameter", tensor.sizes()),
            )
        })
    };
    Ok([to_i32(w)?, to_i32(h)?, to_i32(c)?, to_i32(n)?])
}

/// Validate and build a `copy_channel_offset` node copying `channel_range` channels starting
/// at `src_channel_offset` in `input` to `dst_channel_offset` in `out`.
///
/// Both tensors must be channels-packed and agree on batch, height and width.
pub fn prepare_copy_channel_offset_node(
    graph: &ComputeGraph,
    input: ValueRef,
    channel_range: i32,
    src_channel_offset: i32,
    dst_channel_offset: i32,
    out: ValueRef,
) -> Result<ExecuteNode> {
    let t_in = graph.get_tensor(input)?;
    let t_out = graph.get_tensor(out)?;

    for t in [t_in, t_out] {
        if !check_memory_layout_is(t, GpuMemoryLayout::ChannelsPacked) {
            return Err(GraphError::layout_mismatch(
                COPY_CHANNEL_OFFSET,
                GpuMemoryLayout::ChannelsPacked.name(),
                t.memory_layout().name(),
            ));
        }
    }
    check_same_dtype(COPY_CHANNEL_OFFSET, t_in, t_out)?;

    for nchw_dim in [NchwDim::Batch, NchwDim::Height, NchwDim::Width] {
        let in_size = dim_at(t_in, nchw_dim);
        let out_size = dim_at(t_out, nchw_dim);
        if in_size != out_size {
            return Err(GraphError::out_of_bounds(
                COPY_CHANNEL_OFFSET,
                format!("{nchw_dim} differs between source ({in_size}) and destination ({out_size})"),
            ));
        }
    }

    let in_channels = dim_at(t_in, NchwDim::Channel) as u64;
    let out_channels = dim_at(t_out, NchwDim::Channel) as u64;
    let window_fits = |offset: i32, channels: u64| {
        u64::try_from(i64::from(offset) + i64::from(channel_range))
            .map(|end| end <= channels)
            .unwrap_or(false)
    };
    if channel_range < 0
        || src_channel_offset < 0
        || dst_channel_offset < 0
        || !window_fits(src_channel_offset, in_channels)
        || !window_fits(dst_channel_offset, out_channels)
    {
        return Err(GraphError::out_of_bounds(
            COPY_CHANNEL_OFFSET,
            format!(
                "channel window of {channel_range} from {src_channel_offset} (source has {in_channels}) \
                 to {dst_channel_offset} (destination has {out_channels})"
            ),
        ));
    }

    let kernel_name = format!("{}_{}", COPY_CHANNEL_OFFSET, t_out.dtype().shader_suffix());
    let params = CopyChannelOffsetParams {
        out_sizes: whcn_sizes(t_out)?,
        in_sizes: whcn_sizes(t_in)?,
        channel_range,
        src_channel_offset,
        dst_channel_offset,
        _padding: 0,
    };
    Ok(ExecuteNode {
        label: String::new(),
        kernel_name,
        global_workgroup_size: t_out.texture_limits(),
        args: vec![ArgGroup::write(vec![out]), ArgGroup::read(vec![input])],
        op: NodeOp::CopyChannelOffset(params),
    })
}

pub fn add_copy_channel_offset_node(
    graph: &mut ComputeGraph,
    input: ValueRef,
    channel_range: i32,
    src_channel_offset: i32,
    dst_channel_offset: i32,
    out: ValueRef,
) -> Result<()> {
    let node = prepare_copy_channel_offset_node(
        graph,
        input,
        channel_range,
        src_channel_offset,
        dst_channel_offset,
        out,
    )?;
    graph.append_node(node);
    Ok(())
}
