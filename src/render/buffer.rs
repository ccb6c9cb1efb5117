use crate::error::LoadError;
use crate::render::device::GpuDevice;
use crate::resource::glb::accessor::{ElementType, ResolvedAccessor};
use crate::resource::glb::range::ByteRange;
use crate::resource::glb::GlbContainer;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BufferKind {
    Vertex,
    Index,
}

impl BufferKind {
    pub fn usages(self) -> wgpu::BufferUsages {
        match self {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        }
    }
}

pub struct GeometryBuffer<B> {
    gpu_buffer: B,
    byte_length: usize,
    kind: BufferKind,
}

impl<B> GeometryBuffer<B> {
    pub fn gpu_buffer(&self) -> &B {
        &self.gpu_buffer
    }

    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }
}

pub struct IndexBuffer<B> {
    buffer: GeometryBuffer<B>,
    format: wgpu::IndexFormat,
    count: u32,
}

impl<B> IndexBuffer<B> {
    pub fn buffer(&self) -> &GeometryBuffer<B> {
        &self.buffer
    }

    pub fn format(&self) -> wgpu::IndexFormat {
        self.format
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Copies a payload range into a new device buffer.
///
/// The range is checked against the payload again here; an out-of-range
/// request fails instead of being clamped.
pub async fn build_buffer<D: GpuDevice>(
    device: &D,
    container: &GlbContainer,
    range: ByteRange,
    kind: BufferKind,
    label: &str,
) -> Result<GeometryBuffer<D::Buffer>, LoadError> {
    let data = container.payload_slice(range, label)?;
    let gpu_buffer = device
        .create_buffer_init(label, data, kind.usages())
        .await?;

    Ok(GeometryBuffer {
        gpu_buffer,
        byte_length: data.len(),
        kind,
    })
}

pub async fn build_index_buffer<D: GpuDevice>(
    device: &D,
    container: &GlbContainer,
    accessor: &ResolvedAccessor,
    label: &str,
) -> Result<IndexBuffer<D::Buffer>, LoadError> {
    let format = accessor.component_type.index_format().ok_or(
        LoadError::InvalidIndexComponentType {
            accessor: accessor.index,
            component_type: accessor.component_type,
        },
    )?;

    if accessor.element_type != ElementType::Scalar {
        return Err(LoadError::UnexpectedAccessorLayout {
            accessor: accessor.index,
            expected: "SCALAR indices",
            found: accessor.element_type.name().to_string(),
        });
    }

    let count = u32::try_from(accessor.count)
        .map_err(|_| LoadError::overflow(format!("the index count of accessor {}", accessor.index)))?;

    let buffer = build_buffer(device, container, accessor.range, BufferKind::Index, label).await?;

    Ok(IndexBuffer {
        buffer,
        format,
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::resource::glb::accessor::resolve_accessor;
    use crate::testing::{encode_glb, triangle_glb, GlbBuilder, RecordingDevice};
    use pollster::block_on;

    #[test]
    fn test_vertex_buffer_scenario() {
        let container = GlbContainer::parse(triangle_glb()).unwrap();
        let device = RecordingDevice::default();

        let accessor = resolve_accessor(container.document(), 0).unwrap();
        assert_eq!(accessor.range, ByteRange::new(0, 36));

        let buffer = block_on(build_buffer(
            &device,
            &container,
            accessor.range,
            BufferKind::Vertex,
            "POSITION",
        ))
        .unwrap();

        assert_eq!(buffer.byte_length(), 36);
        assert_eq!(buffer.kind(), BufferKind::Vertex);
        assert_eq!(buffer.gpu_buffer().contents.len(), 36);
        assert_eq!(buffer.gpu_buffer().contents, container.payload());
        assert_eq!(buffer.gpu_buffer().usage, wgpu::BufferUsages::VERTEX);
    }

    #[test]
    fn test_range_past_payload_is_a_bounds_error() {
        let container = GlbContainer::parse(triangle_glb()).unwrap();
        let device = RecordingDevice::default();

        for range in [ByteRange::new(0, 37), ByteRange::new(36, 1), ByteRange::new(usize::MAX, 2)] {
            let error = block_on(build_buffer(&device, &container, range, BufferKind::Vertex, "test"))
                .err()
                .unwrap();
            assert_eq!(error.kind(), ErrorKind::Bounds);
        }

        assert_eq!(device.allocation_count(), 0);
    }

    #[test]
    fn test_view_past_payload_is_a_bounds_error() {
        let json = r#"{
            "accessors": [{ "bufferView": 0, "byteOffset": 12, "componentType": 5126, "type": "VEC3", "count": 3 }],
            "bufferViews": [{ "byteLength": 48 }]
        }"#;
        let container = GlbContainer::parse(encode_glb(json, &[0; 36])).unwrap();
        let device = RecordingDevice::default();

        let resolved = resolve_accessor(container.document(), 0).unwrap();
        assert_eq!(resolved.range, ByteRange::new(12, 36));

        let error = block_on(build_buffer(
            &device,
            &container,
            resolved.range,
            BufferKind::Vertex,
            "test",
        ))
        .err()
            .unwrap();
        assert!(matches!(
            error,
            LoadError::OutOfBounds {
                offset: 12,
                length: 36,
                limit: 36,
                ..
            }
        ));
    }

    #[test]
    fn test_index_widths() {
        let mut builder = GlbBuilder::default();
        let short_indices = builder.indices_u16(&[0, 1, 2]);
        let int_indices = builder.indices_u32(&[0, 1, 2, 2, 1, 0]);
        let container = GlbContainer::parse(builder.build()).unwrap();
        let device = RecordingDevice::default();

        let accessor = resolve_accessor(container.document(), short_indices).unwrap();
        let buffer = block_on(build_index_buffer(&device, &container, &accessor, "INDICES")).unwrap();
        assert_eq!(buffer.format(), wgpu::IndexFormat::Uint16);
        assert_eq!(buffer.count(), 3);
        assert_eq!(buffer.buffer().byte_length(), 6);
        assert_eq!(buffer.buffer().kind(), BufferKind::Index);
        assert_eq!(buffer.buffer().gpu_buffer().usage, wgpu::BufferUsages::INDEX);

        let accessor = resolve_accessor(container.document(), int_indices).unwrap();
        let buffer = block_on(build_index_buffer(&device, &container, &accessor, "INDICES")).unwrap();
        assert_eq!(buffer.format(), wgpu::IndexFormat::Uint32);
        assert_eq!(buffer.count(), 6);
        assert_eq!(buffer.buffer().byte_length(), 24);
    }

    #[test]
    fn test_index_component_types_outside_unsigned_short_and_int() {
        for (component_type, width) in [(5120, 1), (5121, 1), (5122, 2), (5126, 4)] {
            let mut builder = GlbBuilder::default();
            let accessor = builder.accessor(&vec![0; 3 * width], component_type, "SCALAR", 3);
            let container = GlbContainer::parse(builder.build()).unwrap();
            let device = RecordingDevice::default();

            let resolved = resolve_accessor(container.document(), accessor).unwrap();
            let error = block_on(build_index_buffer(&device, &container, &resolved, "INDICES"))
                .err()
                .unwrap();

            assert!(matches!(error, LoadError::InvalidIndexComponentType { .. }));
            assert_eq!(error.kind(), ErrorKind::Format);
            assert_eq!(device.allocation_count(), 0);
        }
    }

    #[test]
    fn test_non_scalar_indices() {
        let mut builder = GlbBuilder::default();
        let accessor = builder.accessor(&[0; 12], 5123, "VEC3", 2);
        let container = GlbContainer::parse(builder.build()).unwrap();
        let device = RecordingDevice::default();

        let resolved = resolve_accessor(container.document(), accessor).unwrap();
        let error = block_on(build_index_buffer(&device, &container, &resolved, "INDICES"))
            .err()
            .unwrap();
        assert!(matches!(error, LoadError::UnexpectedAccessorLayout { .. }));
    }

    #[test]
    fn test_device_failure() {
        let container = GlbContainer::parse(triangle_glb()).unwrap();
        let device = RecordingDevice::with_allocation_limit(0);

        let error = block_on(build_buffer(
            &device,
            &container,
            ByteRange::new(0, 36),
            BufferKind::Vertex,
            "POSITION",
        ))
        .err()
        .unwrap();
        assert_eq!(error.kind(), ErrorKind::DeviceResource);
    }
}
