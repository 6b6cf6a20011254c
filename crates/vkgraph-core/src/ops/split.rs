//! Split operator
//!
//! Lowers `aten.split_with_sizes_copy.default` and `aten.split.Tensor` into copy nodes. The
//! input must be channels-packed; every output receives a contiguous slice of the input along
//! one axis, slices laid out back to back starting at offset zero.
//!
//! Width, height and batch slices are texel aligned and become `copy_offset` nodes. Channel
//! slices can start inside a texel and become `copy_channel_offset` nodes.

use crate::error::{GraphError, Result};
use crate::graph::{ComputeGraph, ExecuteNode, ValueRef};
use crate::layout::{GpuMemoryLayout, IVec3};
use crate::ops::copy::{prepare_copy_channel_offset_node, prepare_copy_offset_node};
use crate::ops::registry::OperatorRegistry;
use crate::ops::utils::dim::{dim_at, normalize_to_nchw_dim, NchwDim};
use crate::tensor::{check_memory_layout_is, VTensor};

pub const SPLIT_WITH_SIZES_COPY: &str = "aten.split_with_sizes_copy.default";
pub const SPLIT_TENSOR: &str = "aten.split.Tensor";

/// Both split operators take `[input, sizes, dim, outputs]`
const SPLIT_NUM_ARGS: usize = 4;

/// Check a split request before anything is emitted.
///
/// Errors are reported against `operation`. Sizes are only compared against the outputs;
/// their sum is not checked against the input.
pub fn validate_split(
    graph: &ComputeGraph,
    operation: &str,
    input: ValueRef,
    nchw_dim: NchwDim,
    split_sizes: &[i64],
    outputs: &[ValueRef],
) -> Result<()> {
    let t_in = graph.get_tensor(input)?;
    if !check_memory_layout_is(t_in, GpuMemoryLayout::ChannelsPacked) {
        return Err(GraphError::layout_mismatch(
            operation,
            GpuMemoryLayout::ChannelsPacked.name(),
            t_in.memory_layout().name(),
        ));
    }

    if outputs.len() != split_sizes.len() {
        return Err(GraphError::count_mismatch(
            operation,
            split_sizes.len(),
            outputs.len(),
        ));
    }

    for (index, (&out, &split_size)) in outputs.iter().zip(split_sizes).enumerate() {
        let t_out = graph.get_tensor(out)?;
        if !check_memory_layout_is(t_out, GpuMemoryLayout::ChannelsPacked) {
            return Err(GraphError::layout_mismatch(
                operation,
                GpuMemoryLayout::ChannelsPacked.name(),
                t_out.memory_layout().name(),
            ));
        }

        let extent = dim_at(t_out, nchw_dim) as i64;
        if extent != split_size {
            return Err(GraphError::size_mismatch(operation, index, split_size, extent));
        }
    }

    Ok(())
}

/// Texture component advanced by a texel-aligned split of `t_in`
fn texel_component(operation: &str, t_in: &VTensor, nchw_dim: NchwDim) -> Result<usize> {
    match nchw_dim {
        NchwDim::Width => Ok(0),
        NchwDim::Height => Ok(1),
        NchwDim::Batch => Ok(2),
        NchwDim::Channel => {
            let ndim = t_in.dim();
            let dim = ndim as i64 - nchw_dim.offset_from_end() as i64;
            Err(GraphError::unsupported_dimension(operation, dim, ndim))
        }
    }
}

fn prepare_texel_copies(
    graph: &ComputeGraph,
    operation: &str,
    input: ValueRef,
    nchw_dim: NchwDim,
    outputs: &[ValueRef],
) -> Result<Vec<ExecuteNode>> {
    let component = texel_component(operation, graph.get_tensor(input)?, nchw_dim)?;
    let mut src_offset = IVec3::ZERO;
    let dst_offset = IVec3::ZERO;

    let mut nodes = Vec::with_capacity(outputs.len());
    for &out in outputs {
        let range = graph.get_tensor(out)?.texture_limits();
        log::trace!("split along {nchw_dim}: output {out} from {src_offset} range {range}");
        nodes.push(prepare_copy_offset_node(
            graph, input, range, src_offset, dst_offset, out,
        )?);

        let mut step = IVec3::ZERO;
        step.data[component] = range.data[component];
        src_offset = src_offset.checked_add(step).ok_or_else(|| {
            GraphError::out_of_bounds(
                operation,
                format!("source offset {src_offset} overflows after range {range}"),
            )
        })?;
    }
    Ok(nodes)
}

fn prepare_channel_copies(
    graph: &ComputeGraph,
    operation: &str,
    input: ValueRef,
    outputs: &[ValueRef],
) -> Result<Vec<ExecuteNode>> {
    let mut src_channel_offset: i32 = 0;
    let dst_channel_offset = 0;

    let mut nodes = Vec::with_capacity(outputs.len());
    for &out in outputs {
        let channels = dim_at(graph.get_tensor(out)?, NchwDim::Channel);
        let channel_range = i32::try_from(channels).map_err(|_| {
            GraphError::out_of_bounds(
                operation,
                format!("output {out} has {channels} channels, more than a copy can address"),
            )
        })?;
        log::trace!(
            "split along channel: output {out} from channel {src_channel_offset} range {channel_range}"
        );
        nodes.push(prepare_copy_channel_offset_node(
            graph,
            input,
            channel_range,
            src_channel_offset,
            dst_channel_offset,
            out,
        )?);
        src_channel_offset = src_channel_offset.checked_add(channel_range).ok_or_else(|| {
            GraphError::out_of_bounds(
                operation,
                format!("channel offset {src_channel_offset} overflows after range {channel_range}"),
            )
        })?;
    }
    Ok(nodes)
}

/// Append one copy node per output, slicing `input` along `nchw_dim` in output order.
///
/// All nodes are prepared before any is appended; on error the graph is unchanged.
pub fn emit_split_copies(
    graph: &mut ComputeGraph,
    operation: &str,
    input: ValueRef,
    nchw_dim: NchwDim,
    outputs: &[ValueRef],
) -> Result<()> {
    let nodes = match nchw_dim {
        NchwDim::Width | NchwDim::Height | NchwDim::Batch => {
            prepare_texel_copies(graph, operation, input, nchw_dim, outputs)?
        }
        NchwDim::Channel => prepare_channel_copies(graph, operation, input, outputs)?,
    };
    graph.append_nodes(nodes);
    Ok(())
}

fn add_split_node(
    graph: &mut ComputeGraph,
    operation: &str,
    input: ValueRef,
    split_sizes: &[i64],
    dim: i64,
    out_list: ValueRef,
) -> Result<()> {
    let nchw_dim = normalize_to_nchw_dim(graph.get_tensor(input)?, dim)?;
    let outputs = graph.get_value_list(out_list)?.to_vec();

    validate_split(graph, operation, input, nchw_dim, split_sizes, &outputs)?;

    log::debug!(
        "{}: value {} into {} outputs along {} (sizes {:?})",
        operation,
        input,
        outputs.len(),
        nchw_dim,
        split_sizes
    );
    emit_split_copies(graph, operation, input, nchw_dim, &outputs)
}

/// Split `input` along `dim` into the tensors of the value list `out_list`
pub fn add_split_with_sizes_default_node(
    graph: &mut ComputeGraph,
    input: ValueRef,
    split_sizes: &[i64],
    dim: i64,
    out_list: ValueRef,
) -> Result<()> {
    add_split_node(
        graph,
        SPLIT_WITH_SIZES_COPY,
        input,
        split_sizes,
        dim,
        out_list,
    )
}

/// Same as [`add_split_with_sizes_default_node`] with the sizes and axis read from the graph
pub fn add_split_with_sizes_copy_node(
    graph: &mut ComputeGraph,
    input: ValueRef,
    split_sizes_ref: ValueRef,
    dim_ref: ValueRef,
    out_list: ValueRef,
) -> Result<()> {
    let split_sizes = graph.get_int_list(split_sizes_ref)?.to_vec();
    let dim = graph.extract_scalar::<i64>(dim_ref)?;
    add_split_with_sizes_default_node(graph, input, &split_sizes, dim, out_list)
}

/// Sizes produced by splitting `extent` into chunks of `split_size`.
///
/// Only whole chunks are kept: a trailing partial chunk gets no entry.
pub fn uniform_split_sizes(extent: i64, split_size: i64) -> Result<Vec<i64>> {
    if split_size <= 0 {
        return Err(GraphError::invalid_argument(
            SPLIT_TENSOR,
            format!("split size must be positive, got {split_size}"),
        ));
    }
    let count = (extent / split_size) as usize;
    Ok(vec![split_size; count])
}

/// Split `input` along the axis in `dim_ref` into chunks of the size in `split_size_ref`
pub fn add_split_tensor_node(
    graph: &mut ComputeGraph,
    input: ValueRef,
    split_size_ref: ValueRef,
    dim_ref: ValueRef,
    out_list: ValueRef,
) -> Result<()> {
    let split_size = graph.extract_scalar::<i64>(split_size_ref)?;
    let dim = graph.extract_scalar::<i64>(dim_ref)?;

    let t_in = graph.get_tensor(input)?;
    let nchw_dim = normalize_to_nchw_dim(t_in, dim)?;
    let extent = dim_at(t_in, nchw_dim) as i64;
    let split_sizes = uniform_split_sizes(extent, split_size)?;

    let remainder = extent % split_size;
    if remainder != 0 {
        log::warn!(
            "{}: {} of {} elements along {} are not covered by chunks of {}",
            SPLIT_TENSOR,
            remainder,
            extent,
            nchw_dim,
            split_size
        );
    }

    add_split_node(graph, SPLIT_TENSOR, input, &split_sizes, dim, out_list)
}

fn check_num_args(operation: &str, args: &[ValueRef]) -> Result<()> {
    if args.len() != SPLIT_NUM_ARGS {
        return Err(GraphError::argument_count(
            operation,
            SPLIT_NUM_ARGS,
            args.len(),
        ));
    }
    Ok(())
}

/// `aten.split_with_sizes_copy.default` with arguments `[input, split_sizes, dim, outputs]`
pub fn split_with_sizes_copy_default(graph: &mut ComputeGraph, args: &[ValueRef]) -> Result<()> {
    check_num_args(SPLIT_WITH_SIZES_COPY, args)?;
    add_split_with_sizes_copy_node(graph, args[0], args[1], args[2], args[3])
}

/// `aten.split.Tensor` with arguments `[input, split_size, dim, outputs]`
pub fn split_tensor(graph: &mut ComputeGraph, args: &[ValueRef]) -> Result<()> {
    check_num_args(SPLIT_TENSOR, args)?;
    add_split_tensor_node(graph, args[0], args[1], args[2], args[3])
}

/// Bind both split operators into `registry`
pub fn register_split_ops(registry: &OperatorRegistry) -> Result<()> {
    crate::register_operator!(
        registry,
        SPLIT_WITH_SIZES_COPY,
        "indexing",
        args: SPLIT_NUM_ARGS,
        split_with_sizes_copy_default
    );
    crate::register_operator!(
        registry,
        SPLIT_TENSOR,
        "indexing",
        args: SPLIT_NUM_ARGS,
        split_tensor
    );
    log::info!("Registered split operators");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphConfig;
    use crate::dtype::DType;

    fn split_graph(input: &[usize], outputs: &[&[usize]]) -> (ComputeGraph, ValueRef, ValueRef) {
        let mut graph = ComputeGraph::new(GraphConfig::default());
        let input = graph.add_tensor(input, DType::Float32);
        let outs = outputs
            .iter()
            .map(|sizes| graph.add_tensor(sizes, DType::Float32))
            .collect();
        let out_list = graph.add_value_list(outs);
        (graph, input, out_list)
    }

    #[test]
    fn test_width_split_offsets() {
        let (mut graph, input, out_list) =
            split_graph(&[1, 4, 2, 6], &[&[1, 4, 2, 2], &[1, 4, 2, 4]]);

        add_split_with_sizes_default_node(&mut graph, input, &[2, 4], 3, out_list).unwrap();

        let nodes = graph.execute_nodes();
        assert_eq!(nodes.len(), 2);
        let first = nodes[0].as_copy_offset().unwrap();
        let second = nodes[1].as_copy_offset().unwrap();
        assert_eq!(first.src_offset(), IVec3::ZERO);
        assert_eq!(first.range(), IVec3::new(2, 2, 1));
        assert_eq!(second.src_offset(), IVec3::new(2, 0, 0));
        assert_eq!(second.range(), IVec3::new(4, 2, 1));
        assert_eq!(second.dst_offset(), IVec3::ZERO);
    }

    #[test]
    fn test_channel_split_offsets() {
        let (mut graph, input, out_list) =
            split_graph(&[1, 4, 2, 2], &[&[1, 2, 2, 2], &[1, 2, 2, 2]]);

        add_split_with_sizes_default_node(&mut graph, input, &[2, 2], 1, out_list).unwrap();

        let offsets: Vec<(i32, i32, i32)> = graph
            .execute_nodes()
            .iter()
            .map(|node| {
                let params = node.as_copy_channel_offset().unwrap();
                (
                    params.src_channel_offset,
                    params.channel_range,
                    params.dst_channel_offset,
                )
            })
            .collect();
        assert_eq!(offsets, vec![(0, 2, 0), (2, 2, 0)]);
    }

    #[test]
    fn test_validation_order() {
        // Count is checked before the per-output sizes.
        let (mut graph, input, out_list) = split_graph(&[1, 4, 2, 6], &[&[1, 4, 2, 5]]);
        let result = add_split_with_sizes_default_node(&mut graph, input, &[2, 4], 3, out_list);
        assert!(matches!(
            result,
            Err(GraphError::CountMismatch {
                expected: 2,
                got: 1,
                ..
            })
        ));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_size_mismatch_reports_index() {
        let (mut graph, input, out_list) =
            split_graph(&[1, 4, 2, 6], &[&[1, 4, 2, 2], &[1, 4, 2, 3]]);
        let result = add_split_with_sizes_default_node(&mut graph, input, &[2, 4], -1, out_list);
        assert!(matches!(
            result,
            Err(GraphError::SizeMismatch {
                index: 1,
                expected: 4,
                got: 3,
                ..
            })
        ));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_uniform_split_sizes() {
        assert_eq!(uniform_split_sizes(8, 2).unwrap(), vec![2, 2, 2, 2]);
        assert_eq!(uniform_split_sizes(7, 2).unwrap(), vec![2, 2, 2]);
        assert_eq!(uniform_split_sizes(1, 2).unwrap(), Vec::<i64>::new());
        assert!(matches!(
            uniform_split_sizes(8, 0),
            Err(GraphError::InvalidArgument { .. })
        ));
        assert!(matches!(
            uniform_split_sizes(8, -2),
            Err(GraphError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_texel_component() {
        let mut graph = ComputeGraph::default();
        let input = graph.add_tensor(&[2, 3, 4, 5], DType::Float32);
        let t_in = graph.get_tensor(input).unwrap();

        assert_eq!(texel_component(SPLIT_TENSOR, t_in, NchwDim::Width).unwrap(), 0);
        assert_eq!(texel_component(SPLIT_TENSOR, t_in, NchwDim::Height).unwrap(), 1);
        assert_eq!(texel_component(SPLIT_TENSOR, t_in, NchwDim::Batch).unwrap(), 2);

        // The channel axis is reported as the caller sees it.
        let err = texel_component(SPLIT_TENSOR, t_in, NchwDim::Channel).unwrap_err();
        assert_eq!(err.operation(), SPLIT_TENSOR);
        assert!(matches!(
            err,
            GraphError::UnsupportedDimension { dim: 1, ndim: 4, .. }
        ));

        let input = graph.add_tensor(&[3, 4, 5], DType::Float32);
        let t_in = graph.get_tensor(input).unwrap();
        assert!(matches!(
            texel_component(SPLIT_WITH_SIZES_COPY, t_in, NchwDim::Channel),
            Err(GraphError::UnsupportedDimension { dim: 0, ndim: 3, .. })
        ));
    }

    #[test]
    fn test_errors_name_the_calling_operation() {
        let (mut graph, input, out_list) =
            split_graph(&[1, 1, 1, 6], &[&[1, 1, 1, 3], &[1, 1, 1, 2]]);
        let split_size = graph.add_scalar(3i64);
        let dim = graph.add_scalar(-1i64);

        let err = split_tensor(&mut graph, &[input, split_size, dim, out_list]).unwrap_err();
        assert!(matches!(err, GraphError::SizeMismatch { index: 1, .. }));
        assert_eq!(err.operation(), SPLIT_TENSOR);

        let err =
            add_split_with_sizes_default_node(&mut graph, input, &[3, 3], -1, out_list).unwrap_err();
        assert_eq!(err.operation(), SPLIT_WITH_SIZES_COPY);
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_oversized_channel_range_is_rejected() {
        let channels = i32::MAX as usize + 1;
        let (mut graph, input, out_list) =
            split_graph(&[1, channels, 1, 1], &[&[1, channels, 1, 1]]);

        let result =
            add_split_with_sizes_default_node(&mut graph, input, &[channels as i64], 1, out_list);
        let err = result.unwrap_err();
        assert!(matches!(err, GraphError::OutOfBounds { .. }));
        assert_eq!(err.operation(), SPLIT_WITH_SIZES_COPY);
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_oversized_width_split_is_rejected() {
        let width = i32::MAX as usize;
        let (mut graph, input, out_list) =
            split_graph(&[1, 1, 1, width + 1], &[&[1, 1, 1, width], &[1, 1, 1, 1]]);

        let result =
            add_split_with_sizes_default_node(&mut graph, input, &[width as i64, 1], -1, out_list);
        assert!(matches!(result, Err(GraphError::OutOfBounds { .. })));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_entry_point_arity() {
        let (mut graph, input, out_list) = split_graph(&[1, 4, 2, 6], &[&[1, 4, 2, 6]]);
        assert!(matches!(
            split_with_sizes_copy_default(&mut graph, &[input, out_list]),
            Err(GraphError::ArgumentCount {
                expected: 4,
                got: 2,
                ..
            })
        ));
        assert!(matches!(
            split_tensor(&mut graph, &[]),
            Err(GraphError::ArgumentCount { got: 0, .. })
        ));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_register_split_ops() {
        let registry = OperatorRegistry::new();
        register_split_ops(&registry).unwrap();
        assert_eq!(registry.list_ops(), vec![SPLIT_TENSOR, SPLIT_WITH_SIZES_COPY]);
        assert_eq!(
            registry.get_descriptor(SPLIT_TENSOR).unwrap().num_args,
            Some(SPLIT_NUM_ARGS)
        );
    }
}
