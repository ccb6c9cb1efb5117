use crate::error::LoadError;
use crate::resource::glb::document::{BufferView, Document};
use crate::resource::glb::range::ByteRange;

/// Numeric type of a single accessor component.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u32)]
pub enum ComponentType {
    Byte = 5120,
    UnsignedByte = 5121,
    Short = 5122,
    UnsignedShort = 5123,
    UnsignedInt = 5125,
    Float = 5126,
}

impl ComponentType {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            5120 => Some(ComponentType::Byte),
            5121 => Some(ComponentType::UnsignedByte),
            5122 => Some(ComponentType::Short),
            5123 => Some(ComponentType::UnsignedShort),
            5125 => Some(ComponentType::UnsignedInt),
            5126 => Some(ComponentType::Float),
            _ => None,
        }
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn byte_size(self) -> usize {
        match self {
            ComponentType::Byte | ComponentType::UnsignedByte => 1,
            ComponentType::Short | ComponentType::UnsignedShort => 2,
            ComponentType::UnsignedInt | ComponentType::Float => 4,
        }
    }

    /// Index width for index data, `None` for types that cannot index.
    pub fn index_format(self) -> Option<wgpu::IndexFormat> {
        match self {
            ComponentType::UnsignedShort => Some(wgpu::IndexFormat::Uint16),
            ComponentType::UnsignedInt => Some(wgpu::IndexFormat::Uint32),
            ComponentType::Byte
            | ComponentType::UnsignedByte
            | ComponentType::Short
            | ComponentType::Float => None,
        }
    }
}

/// Shape of a single accessor element.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ElementType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementType {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SCALAR" => Some(ElementType::Scalar),
            "VEC2" => Some(ElementType::Vec2),
            "VEC3" => Some(ElementType::Vec3),
            "VEC4" => Some(ElementType::Vec4),
            "MAT2" => Some(ElementType::Mat2),
            "MAT3" => Some(ElementType::Mat3),
            "MAT4" => Some(ElementType::Mat4),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ElementType::Scalar => "SCALAR",
            ElementType::Vec2 => "VEC2",
            ElementType::Vec3 => "VEC3",
            ElementType::Vec4 => "VEC4",
            ElementType::Mat2 => "MAT2",
            ElementType::Mat3 => "MAT3",
            ElementType::Mat4 => "MAT4",
        }
    }

    pub fn component_count(self) -> usize {
        match self {
            ElementType::Scalar => 1,
            ElementType::Vec2 => 2,
            ElementType::Vec3 => 3,
            ElementType::Vec4 | ElementType::Mat2 => 4,
            ElementType::Mat3 => 9,
            ElementType::Mat4 => 16,
        }
    }
}

/// An accessor with its absolute location inside the binary payload.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ResolvedAccessor {
    pub index: usize,
    pub range: ByteRange,
    pub component_type: ComponentType,
    pub element_type: ElementType,
    pub count: usize,
}

impl ResolvedAccessor {
    pub fn element_size(&self) -> usize {
        self.component_type.byte_size() * self.element_type.component_count()
    }

    /// Fails unless the accessor holds `count` elements of the given shape.
    pub fn expect_layout(
        &self,
        element_type: ElementType,
        component_type: ComponentType,
        expected: &'static str,
    ) -> Result<(), LoadError> {
        if self.element_type == element_type && self.component_type == component_type {
            return Ok(());
        }

        Err(LoadError::UnexpectedAccessorLayout {
            accessor: self.index,
            expected,
            found: format!("{} {:?}", self.element_type.name(), self.component_type),
        })
    }
}

/// Computes the absolute payload range of the given accessor.
///
/// The result is checked against the accessor's buffer view; checking the
/// buffer view against the payload is left to the consumer of the range.
pub fn resolve_accessor(
    document: &Document,
    accessor_index: usize,
) -> Result<ResolvedAccessor, LoadError> {
    let accessor = document.accessor(accessor_index)?;

    let component_type = ComponentType::from_code(accessor.component_type).ok_or(
        LoadError::UnknownComponentType {
            accessor: accessor_index,
            code: accessor.component_type,
        },
    )?;

    let element_type =
        ElementType::from_name(&accessor.type_).ok_or_else(|| LoadError::UnknownElementType {
            accessor: accessor_index,
            name: accessor.type_.clone(),
        })?;

    let buffer_view_index = accessor.buffer_view.ok_or(LoadError::MissingBufferView {
        accessor: accessor_index,
    })?;
    let buffer_view = embedded_buffer_view(document, buffer_view_index)?;

    let element_size = component_type.byte_size() * element_type.component_count();

    if let Some(stride) = buffer_view.byte_stride {
        if stride != element_size {
            return Err(LoadError::UnsupportedByteStride {
                buffer_view: buffer_view_index,
                stride,
                element_size,
            });
        }
    }

    let context = format!("accessor {accessor_index}");

    let length = element_size
        .checked_mul(accessor.count)
        .ok_or_else(|| LoadError::overflow(format!("the byte length of {context}")))?;

    let offset = buffer_view
        .byte_offset
        .checked_add(accessor.byte_offset)
        .ok_or_else(|| LoadError::overflow(format!("the byte offset of {context}")))?;

    let view_range = ByteRange::new(buffer_view.byte_offset, buffer_view.byte_length);
    if view_range.end().is_none() {
        return Err(LoadError::overflow(format!(
            "the extent of buffer view {buffer_view_index}"
        )));
    }

    let relative = ByteRange::new(accessor.byte_offset, length);
    relative.check_within(
        buffer_view.byte_length,
        &format!("{context} within buffer view {buffer_view_index}"),
    )?;

    Ok(ResolvedAccessor {
        index: accessor_index,
        range: ByteRange::new(offset, length),
        component_type,
        element_type,
        count: accessor.count,
    })
}

/// Computes the absolute payload range of the given buffer view.
pub fn resolve_buffer_view(
    document: &Document,
    buffer_view_index: usize,
) -> Result<ByteRange, LoadError> {
    let buffer_view = embedded_buffer_view(document, buffer_view_index)?;
    let range = ByteRange::new(buffer_view.byte_offset, buffer_view.byte_length);

    match range.end() {
        Some(_) => Ok(range),
        None => Err(LoadError::overflow(format!(
            "the extent of buffer view {buffer_view_index}"
        ))),
    }
}

/// Looks up a buffer view, rejecting views into anything but the binary chunk.
fn embedded_buffer_view(
    document: &Document,
    buffer_view_index: usize,
) -> Result<&BufferView, LoadError> {
    let buffer_view = document.buffer_view(buffer_view_index)?;

    if buffer_view.buffer != BufferView::EMBEDDED_BUFFER {
        return Err(LoadError::UnsupportedBuffer {
            buffer_view: buffer_view_index,
            buffer: buffer_view.buffer,
        });
    }

    Ok(buffer_view)
}
