use learn_ngin::{
    data_structures::uniform::{UniformBlock, UniformKind, UniformLayout, UniformValue},
    renderer::{lit_uniforms, marker_uniforms},
};

#[test]
fn lit_params_follow_wgsl_layout() {
    let layout = lit_uniforms();
    assert_eq!(layout.offset_of("tint"), Some(0));
    assert_eq!(layout.offset_of("shininess"), Some(12));
    assert_eq!(layout.offset_of("time"), Some(16));
    assert_eq!(layout.offset_of("use_specular"), Some(20));
    assert_eq!(layout.size(), 32);
    assert_eq!(marker_uniforms().size(), 16);
}

#[test]
fn members_are_aligned_to_their_type() {
    let layout = UniformLayout::new(&[
        ("flag", UniformKind::Bool),
        ("offset", UniformKind::Vec2),
        ("colour", UniformKind::Vec3),
        ("model", UniformKind::Mat4),
        ("normal", UniformKind::Mat3),
        ("count", UniformKind::Int),
    ]);
    assert_eq!(layout.offset_of("flag"), Some(0));
    assert_eq!(layout.offset_of("offset"), Some(8));
    assert_eq!(layout.offset_of("colour"), Some(16));
    assert_eq!(layout.offset_of("model"), Some(32));
    assert_eq!(layout.offset_of("normal"), Some(96));
    assert_eq!(layout.offset_of("count"), Some(144));
    assert_eq!(layout.size(), 160);
    assert_eq!(layout.kind_of("normal"), Some(UniformKind::Mat3));
    assert_eq!(layout.offset_of("missing"), None);
}

#[test]
fn unknown_names_and_wrong_types_are_ignored() {
    let mut block = UniformBlock::new(lit_uniforms());
    assert!(block.set("shininess", UniformValue::Float(32.0)));
    block.mark_clean();

    assert!(!block.set("shine", UniformValue::Float(1.0)));
    assert!(!block.set("shininess", UniformValue::Int(1)));
    assert!(!block.is_dirty());
    assert_eq!(block.float("shininess"), Some(32.0));
}

#[test]
fn bools_are_stored_as_u32() {
    let mut block = UniformBlock::new(lit_uniforms());
    block.set("use_specular", UniformValue::Bool(true));
    let words: &[u32] = bytemuck::cast_slice(block.bytes());
    assert_eq!(words[5], 1);
    block.set("use_specular", UniformValue::Bool(false));
    let words: &[u32] = bytemuck::cast_slice(block.bytes());
    assert_eq!(words[5], 0);
}

#[test]
fn vec3_write_leaves_the_next_member_alone() {
    let mut block = UniformBlock::new(lit_uniforms());
    block.set("shininess", UniformValue::Float(8.0));
    block.set("tint", UniformValue::Vec3([0.1, 0.2, 0.3]));
    assert_eq!(block.float("shininess"), Some(8.0));
    let floats: &[f32] = bytemuck::cast_slice(block.bytes());
    assert_eq!(&floats[..3], &[0.1, 0.2, 0.3]);
}
