use super::*;
use crate::resource::test_utils::{png_bytes, test_manager, test_renderer};
use crate::resource::ResourceState;

// ============================================================================
// HANDLES AND FLAGS
// ============================================================================

#[test]
fn test_texture_allocates_and_frees_handle() {
    let renderer = test_renderer();
    let texture = Texture::new(ResourceKey::default(), ResourcePath::new("t.png"), renderer.clone());
    assert!(texture.texture_handle().is_valid());
    assert_eq!(renderer.texture_handle_count(), 1);

    drop(texture);
    assert_eq!(renderer.texture_handle_count(), 0);
}

#[test]
fn test_texture_defaults() {
    let texture = Texture::new(ResourceKey::default(), ResourcePath::new("t.png"), test_renderer());
    assert_eq!(texture.flags(), TextureFlags::empty());
    assert_eq!(texture.atlas_size(), NO_ATLAS);
    assert_eq!(texture.data_reference_count(), 0);
    assert!(texture.data().is_none());
}

#[test]
fn test_set_flag() {
    let mut texture = Texture::new(ResourceKey::default(), ResourcePath::new("t.png"), test_renderer());
    texture.set_flag(TextureFlags::SRGB, true);
    texture.set_flag(TextureFlags::U_CLAMP, true);
    texture.set_flag(TextureFlags::U_CLAMP, false);
    assert_eq!(texture.flags(), TextureFlags::SRGB);
}

// ============================================================================
// LOADING
// ============================================================================

#[test]
fn test_load_decodes_dimensions_and_drops_pixels() {
    let (mut rm, fs) = test_manager();
    fs.insert("textures/rock.png", png_bytes(4, 2));

    let key = rm.load(ResourceType::TEXTURE, "textures/rock.png").unwrap();
    assert_eq!(rm.state(key), Some(ResourceState::Loading));
    rm.flush();

    assert!(rm.is_ready(key));
    let texture = rm.get::<Texture>(key).unwrap();
    assert_eq!((texture.width(), texture.height()), (4, 2));
    assert!(texture.data().is_none());
}

#[test]
fn test_data_reference_retains_pixels() {
    let (mut rm, fs) = test_manager();
    fs.insert("t.png", png_bytes(2, 2));

    let key = rm.load(ResourceType::TEXTURE, "t.png").unwrap();
    rm.get_mut::<Texture>(key).unwrap().add_data_reference();
    rm.flush();

    let texture = rm.get_mut::<Texture>(key).unwrap();
    assert_eq!(texture.data().map(<[u8]>::len), Some(2 * 2 * 4));

    texture.remove_data_reference();
    assert!(texture.data().is_none());

    // unbalanced release is ignored
    texture.remove_data_reference();
    assert_eq!(texture.data_reference_count(), 0);
}

#[test]
fn test_undecodable_texture_fails() {
    let (mut rm, fs) = test_manager();
    fs.insert("broken.png", b"not an image".to_vec());

    let key = rm.load(ResourceType::TEXTURE, "broken.png").unwrap();
    rm.flush();

    assert!(rm.is_failure(key));
    assert!(matches!(rm.last_error(key), Some(Error::Decode { .. })));
}

#[test]
fn test_missing_texture_fails() {
    let (mut rm, _fs) = test_manager();
    let key = rm.load(ResourceType::TEXTURE, "nowhere.png").unwrap();
    rm.flush();

    assert!(rm.is_failure(key));
    assert_eq!(rm.last_error(key), Some(&Error::FileNotFound("nowhere.png".to_string())));
}

#[test]
fn test_eviction_frees_handle() {
    let (mut rm, fs) = test_manager();
    fs.insert("t.png", png_bytes(1, 1));
    let before = rm.renderer().texture_handle_count();

    let key = rm.load(ResourceType::TEXTURE, "t.png").unwrap();
    rm.flush();
    assert_eq!(rm.renderer().texture_handle_count(), before + 1);

    rm.unload(key).unwrap();
    assert_eq!(rm.state(key), Some(ResourceState::Empty));
    assert_eq!(rm.remove_unreferenced(), 1);
    assert_eq!(rm.renderer().texture_handle_count(), before);
}
