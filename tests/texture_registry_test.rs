use std::collections::HashSet;

use learn_ngin::{
    EngineError,
    data_structures::texture::{MAX_TEXTURES, TexKind, TextureRegistry},
};

#[test]
fn thirty_third_texture_is_rejected() {
    let mut registry = TextureRegistry::new();
    for _ in 0..MAX_TEXTURES {
        registry.register().unwrap();
    }
    match registry.register() {
        Err(EngineError::TextureRegistryFull { capacity }) => assert_eq!(capacity, MAX_TEXTURES),
        other => panic!("expected the registry to be full, got {other:?}"),
    }
    assert_eq!(registry.len(), MAX_TEXTURES);
}

#[test]
fn ids_are_unique_and_never_reused() {
    let mut registry = TextureRegistry::new();
    let first: Vec<_> = (0..10).map(|_| registry.register().unwrap()).collect();
    assert!(registry.release(first[3]));
    assert!(!registry.release(first[3]));
    assert!(!registry.contains(first[3]));

    let next = registry.register().unwrap();
    assert!(!first.contains(&next));

    let unique: HashSet<_> = registry.ids().iter().collect();
    assert_eq!(unique.len(), registry.len());
    assert!(registry.ids().iter().all(|id| id.get() != 0));
}

#[test]
fn released_slots_can_be_filled_again() {
    let mut registry = TextureRegistry::new();
    let ids: Vec<_> = (0..MAX_TEXTURES).map(|_| registry.register().unwrap()).collect();
    assert!(registry.register().is_err());

    registry.release(ids[0]);
    assert!(registry.register().is_ok());
    assert!(registry.register().is_err());

    registry.clear();
    assert!(registry.is_empty());
    assert!(registry.register().is_ok());
}

#[test]
fn kinds_map_to_sampler_names() {
    assert_eq!(TexKind::Diffuse.uniform_name(), "texture_diffuse");
    assert_eq!(TexKind::Specular.uniform_name(), "texture_specular");
}
