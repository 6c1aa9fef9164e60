//! Named uniform values packed by WGSL uniform address-space rules.
//!
//! A [`UniformLayout`] lists the members of a WGSL struct in declaration
//! order and computes their offsets. [`UniformBlock`] holds the bytes for one
//! such struct and lets callers assign members by name, the way `glUniform*`
//! calls address uniforms of a linked program.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// Stored as `u32`, WGSL has no host-shareable `bool`.
    Bool,
    Int,
    UInt,
    Float,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
    Mat4,
}

impl UniformKind {
    pub fn align(self) -> usize {
        match self {
            UniformKind::Bool | UniformKind::Int | UniformKind::UInt | UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 | UniformKind::Vec4 | UniformKind::Mat3 | UniformKind::Mat4 => 16,
        }
    }

    pub fn size(self) -> usize {
        match self {
            UniformKind::Bool | UniformKind::Int | UniformKind::UInt | UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Vec4 => 16,
            // three vec3 columns, each padded to 16 bytes
            UniformKind::Mat3 => 48,
            UniformKind::Mat4 => 64,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat3([[f32; 3]; 3]),
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Bool(_) => UniformKind::Bool,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::UInt(_) => UniformKind::UInt,
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Vec4(_) => UniformKind::Vec4,
            UniformValue::Mat3(_) => UniformKind::Mat3,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    fn write(&self, dst: &mut [u8]) {
        match self {
            UniformValue::Bool(v) => dst[..4].copy_from_slice(bytemuck::bytes_of(&(*v as u32))),
            UniformValue::Int(v) => dst[..4].copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::UInt(v) => dst[..4].copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Float(v) => dst[..4].copy_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Vec2(v) => dst[..8].copy_from_slice(bytemuck::cast_slice(v)),
            UniformValue::Vec3(v) => dst[..12].copy_from_slice(bytemuck::cast_slice(v)),
            UniformValue::Vec4(v) => dst[..16].copy_from_slice(bytemuck::cast_slice(v)),
            UniformValue::Mat3(columns) => {
                for (i, column) in columns.iter().enumerate() {
                    dst[i * 16..i * 16 + 12].copy_from_slice(bytemuck::cast_slice(column));
                }
            }
            UniformValue::Mat4(columns) => dst[..64].copy_from_slice(bytemuck::cast_slice(columns)),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Member {
    name: String,
    kind: UniformKind,
    offset: usize,
}

/// Member offsets of one WGSL uniform struct.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UniformLayout {
    members: Vec<Member>,
    size: usize,
}

fn align_to(value: usize, align: usize) -> usize {
    value.div_ceil(align) * align
}

impl UniformLayout {
    /// Lays out `members` in order. Uniform structs are 16 byte aligned, so
    /// the total size is rounded up to a multiple of 16.
    pub fn new(members: &[(&str, UniformKind)]) -> Self {
        let mut offset = 0;
        let members = members
            .iter()
            .map(|(name, kind)| {
                let member = Member {
                    name: name.to_string(),
                    kind: *kind,
                    offset: align_to(offset, kind.align()),
                };
                offset = member.offset + kind.size();
                member
            })
            .collect();
        Self {
            members,
            size: align_to(offset, 16),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.member(name).map(|m| m.offset)
    }

    pub fn kind_of(&self, name: &str) -> Option<UniformKind> {
        self.member(name).map(|m| m.kind)
    }

    fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Host copy of a uniform struct with a dirty flag for uploading.
#[derive(Clone, Debug)]
pub struct UniformBlock {
    layout: UniformLayout,
    data: Vec<u8>,
    dirty: bool,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout) -> Self {
        let data = vec![0; layout.size()];
        Self {
            layout,
            data,
            dirty: true,
        }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Writes `value` to the member called `name`.
    ///
    /// Unknown names and values of the wrong type are ignored with a warning
    /// and leave the block unchanged. Returns whether the value was written.
    pub fn set(&mut self, name: &str, value: UniformValue) -> bool {
        let Some(member) = self.layout.member(name) else {
            log::warn!("Uniform {name} does not exist");
            return false;
        };
        if member.kind != value.kind() {
            log::warn!(
                "Uniform {name} is a {:?}, ignoring {:?} value",
                member.kind,
                value.kind()
            );
            return false;
        }
        let offset = member.offset;
        value.write(&mut self.data[offset..]);
        self.dirty = true;
        true
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Reads back a scalar `f32` member, mainly for inspection.
    pub fn float(&self, name: &str) -> Option<f32> {
        let member = self.layout.member(name)?;
        (member.kind == UniformKind::Float)
            .then(|| bytemuck::pod_read_unaligned(&self.data[member.offset..member.offset + 4]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_after_vec3_fills_its_padding() {
        let layout = UniformLayout::new(&[("tint", UniformKind::Vec3), ("shininess", UniformKind::Float)]);
        assert_eq!(layout.offset_of("shininess"), Some(12));
        assert_eq!(layout.size(), 16);
    }

    #[test]
    fn mat3_columns_are_padded() {
        let mut block = UniformBlock::new(UniformLayout::new(&[("m", UniformKind::Mat3)]));
        block.set("m", UniformValue::Mat3([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]));
        let floats: &[f32] = bytemuck::cast_slice(block.bytes());
        assert_eq!(floats[4], 4.0);
        assert_eq!(floats[3], 0.0);
        assert_eq!(floats[8], 7.0);
    }
}
