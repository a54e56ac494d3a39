use super::*;
use crate::file_system::MemoryFileSystem;
use crate::renderer::{Command, CommandBufferReader};
use crate::resource::test_utils::{png_bytes, test_manager, LIT_SHADER};
use crate::resource::{ResourceState, TextureFlags, DEFAULT_SHADER_PATH};

const MATERIAL_PATH: &str = "materials/rock.mat";

fn setup() -> (ResourceManager, Arc<MemoryFileSystem>) {
    let (rm, fs) = test_manager();
    fs.insert("shaders/lit.shd", LIT_SHADER);
    fs.insert("materials/albedo.png", png_bytes(2, 2));
    fs.insert("textures/normal.png", png_bytes(2, 2));
    fs.insert("textures/detail.png", png_bytes(1, 1));
    (rm, fs)
}

fn load_material(rm: &mut ResourceManager, fs: &MemoryFileSystem, json: &str) -> ResourceKey {
    fs.insert(MATERIAL_PATH, json);
    let key = rm.load(ResourceType::MATERIAL, MATERIAL_PATH).unwrap();
    rm.flush();
    key
}

const LIT_MATERIAL: &str = r#"{
    "shader": "/shaders/lit.shd",
    "texture": { "source": "albedo.png", "srgb": true },
    "uniforms": [
        { "name": "u_roughness", "float_value": 0.5 },
        { "name": "u_tint", "color": [1, 0, 0] }
    ],
    "alpha_ref": 0.5,
    "color": [0.5, 0.5, 0.5],
    "shininess": 8
}"#;

fn material(rm: &ResourceManager, key: ResourceKey) -> &Material {
    rm.get::<Material>(key).unwrap()
}

fn commands(material: &Material) -> Vec<Command> {
    CommandBufferReader::new(material.command_buffer())
        .collect::<Result<Vec<_>>>()
        .unwrap()
}

// ============================================================================
// LOADING
// ============================================================================

#[test]
fn test_material_waits_for_shader_and_textures() {
    let (mut rm, fs) = setup();
    fs.insert(MATERIAL_PATH, LIT_MATERIAL);
    let key = rm.load(ResourceType::MATERIAL, MATERIAL_PATH).unwrap();

    // first pass reads the material and queues its dependencies
    rm.update();
    assert_eq!(rm.state(key), Some(ResourceState::Loading));
    assert_eq!(rm.dependency_count(key), 2);
    assert!(material(&rm, key).shader_instance().is_none());

    rm.update();
    assert!(rm.is_ready(key));

    let m = material(&rm, key);
    assert_eq!(rm.path(m.shader()).map(ResourcePath::as_str), Some("shaders/lit.shd"));
    assert_eq!(m.texture_count(), 1);
    let albedo = m.texture(0).unwrap();
    assert_eq!(rm.path(albedo).map(ResourcePath::as_str), Some("materials/albedo.png"));
    assert!(rm.get::<Texture>(albedo).unwrap().flags().contains(TextureFlags::SRGB));
    assert_eq!(m.color(), Vec3::splat(0.5));
    assert_eq!(m.shininess(), 8.0);
    assert_eq!(m.alpha_ref(), 0.5);
    assert!(m.shader_instance().is_some());
}

#[test]
fn test_defaults_without_optional_fields() {
    let (mut rm, fs) = setup();
    let key = load_material(&mut rm, &fs, r#"{ "shader": "shaders/lit.shd" }"#);
    let m = material(&rm, key);
    assert_eq!(m.color(), Vec3::ONE);
    assert_eq!(m.shininess(), 4.0);
    assert_eq!(m.alpha_ref(), 0.3);
    assert_eq!(m.layer_count(), 1);
    assert_eq!(m.texture_count(), 0);
}

#[test]
fn test_render_state_combines_shader_states_and_alpha_ref() {
    let (mut rm, fs) = setup();
    let key = load_material(&mut rm, &fs, LIT_MATERIAL);
    let state = material(&rm, key).render_state();
    assert!(state.contains(RenderState::CULL_CCW | RenderState::DEPTH_TEST | RenderState::ALPHA_TEST));
    assert_eq!(state.alpha_ref(), 128);
}

#[test]
fn test_default_shader_path_uses_default_shader() {
    let (mut rm, fs) = setup();
    let default_shader = rm.default_shader();
    let json = format!(r#"{{ "shader": "/{}", "texture": {{ "source": "albedo.png" }} }}"#, DEFAULT_SHADER_PATH);
    let key = load_material(&mut rm, &fs, &json);

    assert!(rm.is_ready(key));
    let m = material(&rm, key);
    assert!(m.uses_default_shader());
    assert_eq!(m.shader(), default_shader);
    assert_eq!(rm.ref_count(default_shader), 1);
}

#[test]
fn test_document_defines() {
    let (mut rm, fs) = setup();
    let key = load_material(
        &mut rm,
        &fs,
        r#"{ "shader": "shaders/lit.shd", "defines": ["ALPHA_CUTOUT", "NOT_A_DEFINE", "SKINNED"] }"#,
    );
    assert!(rm.is_ready(key));
    let m = material(&rm, key);
    assert!(m.is_defined(0));
    assert!(m.is_defined(2));
    assert_eq!(m.define_mask(), 0b101);
    assert_eq!(m.shader_instance().unwrap().define_mask(), 0b101);
    assert!(m.has_define(&rm, 0));
    assert!(!m.has_define(&rm, 2));
}

// ============================================================================
// FAILURES
// ============================================================================

#[test]
fn test_missing_shader_fails() {
    let (mut rm, fs) = setup();
    let key = load_material(&mut rm, &fs, r#"{ "texture": { "source": "albedo.png" } }"#);
    assert!(rm.is_failure(key));
    assert_eq!(rm.last_error(key), Some(&Error::MissingShader(MATERIAL_PATH.to_string())));
    assert_eq!(rm.find(ResourceType::TEXTURE, "materials/albedo.png"), None);
}

#[test]
fn test_unknown_texture_key_fails() {
    let (mut rm, fs) = setup();
    let key = load_material(
        &mut rm,
        &fs,
        r#"{ "shader": "shaders/lit.shd", "texture": { "source": "albedo.png", "foo": 1 } }"#,
    );
    assert!(rm.is_failure(key));
    assert!(matches!(rm.last_error(key), Some(Error::MalformedDocument { .. })));
}

#[test]
fn test_failed_load_releases_acquired_textures() {
    let (mut rm, fs) = setup();
    let key = load_material(&mut rm, &fs, r#"{ "shader": "/", "texture": { "source": "albedo.png" } }"#);
    assert!(rm.is_failure(key));

    let albedo = rm.find(ResourceType::TEXTURE, "materials/albedo.png").unwrap();
    assert_eq!(rm.ref_count(albedo), 0);
    assert_eq!(material(&rm, key).texture_count(), 0);
    rm.remove_unreferenced();
    assert_eq!(rm.find(ResourceType::TEXTURE, "materials/albedo.png"), None);
}

#[test]
fn test_too_many_textures_fails() {
    let (mut rm, fs) = setup();
    let textures = vec![r#""texture": { "source": "" }"#; MAX_TEXTURE_COUNT + 1].join(",");
    let key = load_material(&mut rm, &fs, &format!(r#"{{ "shader": "shaders/lit.shd", {} }}"#, textures));
    assert!(matches!(rm.last_error(key), Some(Error::MalformedDocument { .. })));
}

#[test]
fn test_failed_shader_falls_back_to_default_instance() {
    let (mut rm, fs) = setup();
    fs.insert("shaders/broken.shd", "{ not json");
    let key = load_material(&mut rm, &fs, r#"{ "shader": "shaders/broken.shd" }"#);

    assert!(rm.is_failure(key));
    assert!(matches!(rm.last_error(key), Some(Error::DependencyFailure { .. })));
    let m = material(&rm, key);
    assert!(m.shader_instance().is_none());
    let fallback = m.effective_instance(&rm).unwrap();
    let default_first = rm.get::<Shader>(rm.default_shader()).unwrap().first_instance();
    assert!(Arc::ptr_eq(&fallback, &default_first));
}

#[test]
fn test_missing_texture_fails_material() {
    let (mut rm, fs) = setup();
    let key = load_material(
        &mut rm,
        &fs,
        r#"{ "shader": "shaders/lit.shd", "texture": { "source": "nowhere.png" } }"#,
    );
    assert!(rm.is_failure(key));
}

// ============================================================================
// UNIFORM RECONCILIATION
// ============================================================================

#[test]
fn test_uniforms_aligned_with_shader_schema() {
    let (mut rm, fs) = setup();
    let key = load_material(
        &mut rm,
        &fs,
        r#"{
            "shader": "shaders/lit.shd",
            "uniforms": [
                { "name": "u_time", "time": 0 },
                { "name": "u_extra", "float_value": 7 },
                { "name": "u_roughness", "float_value": 0.25 }
            ]
        }"#,
    );

    let m = material(&rm, key);
    let schema: Vec<u64> = rm.get::<Shader>(m.shader()).unwrap().uniforms().iter().map(|u| u.name_hash).collect();
    let hashes: Vec<u64> = m.uniforms().iter().map(|u| u.name_hash).collect();
    assert_eq!(&hashes[..schema.len()], &schema[..]);
    assert_eq!(hashes[schema.len()], uniform_hash("u_extra"));

    assert_eq!(m.uniform("u_roughness"), Some(&UniformValue::Float(0.25)));
    assert_eq!(m.uniform("u_tint"), Some(&UniformValue::Color(Vec3::ZERO)));
    assert_eq!(m.uniform("u_time"), Some(&UniformValue::Time));
}

#[test]
fn test_mismatched_uniform_type_is_converted() {
    let (mut rm, fs) = setup();
    let key = load_material(
        &mut rm,
        &fs,
        r#"{ "shader": "shaders/lit.shd", "uniforms": [ { "name": "u_tint", "vec3": [0, 1, 0] }, { "name": "u_roughness", "int_value": 2 } ] }"#,
    );
    let m = material(&rm, key);
    assert_eq!(m.uniform("u_tint"), Some(&UniformValue::Color(Vec3::Y)));
    assert_eq!(m.uniform("u_roughness"), Some(&UniformValue::Float(2.0)));
}

#[test]
fn test_uniform_value_coercion() {
    assert_eq!(UniformValue::Time.coerce(UniformType::Float), UniformValue::Float(0.0));
    assert_eq!(UniformValue::Float(1.5).coerce(UniformType::Int), UniformValue::Int(1));
    assert_eq!(UniformValue::Color(Vec3::X).coerce(UniformType::Vec3), UniformValue::Vec3(Vec3::X));
    assert_eq!(UniformValue::Int(3).coerce(UniformType::Matrix4), UniformValue::Matrix4(Mat4::ZERO));
}

#[test]
fn test_set_shader_realigns_uniforms() {
    let (mut rm, fs) = setup();
    fs.insert("shaders/other.shd", r#"{ "uniforms": [ { "name": "u_tint", "type": "color" }, { "name": "u_scale", "type": "vec3" } ] }"#);
    let key = load_material(&mut rm, &fs, LIT_MATERIAL);

    let other = rm.load(ResourceType::SHADER, "shaders/other.shd").unwrap();
    rm.flush();
    rm.modify::<Material, _>(key, |m, rm| m.set_shader(rm, Some(other))).unwrap().unwrap();

    assert!(rm.is_ready(key));
    let m = material(&rm, key);
    assert_eq!(m.shader(), other);
    assert_eq!(m.uniforms()[0].name_hash, uniform_hash("u_tint"));
    assert_eq!(m.uniforms()[0].value, UniformValue::Color(Vec3::X));
    assert_eq!(m.uniforms()[1].value, UniformValue::Vec3(Vec3::ZERO));

    // previous shader released by the material
    let lit = rm.find(ResourceType::SHADER, "shaders/lit.shd").unwrap();
    assert_eq!(rm.ref_count(lit), 0);
}

#[test]
fn test_set_shader_to_loading_shader() {
    let (mut rm, fs) = setup();
    fs.insert("shaders/other.shd", r#"{ "render_states": ["wireframe"] }"#);
    let key = load_material(&mut rm, &fs, LIT_MATERIAL);

    rm.modify::<Material, _>(key, |m, rm| m.set_shader_path(rm, "shaders/other.shd")).unwrap().unwrap();
    assert_eq!(rm.state(key), Some(ResourceState::Loading));
    assert!(material(&rm, key).shader_instance().is_none());

    rm.flush();
    assert!(rm.is_ready(key));
    assert!(material(&rm, key).render_state().contains(RenderState::WIREFRAME));
}

#[test]
fn test_set_shader_none_selects_default() {
    let (mut rm, fs) = setup();
    let key = load_material(&mut rm, &fs, LIT_MATERIAL);
    rm.modify::<Material, _>(key, |m, rm| m.set_shader(rm, None)).unwrap().unwrap();

    let m = material(&rm, key);
    assert!(m.uses_default_shader());
    assert!(rm.is_ready(key));
    assert_eq!(rm.ref_count(rm.default_shader()), 1);
}

// ============================================================================
// DEFINES AND TEXTURES
// ============================================================================

#[test]
fn test_set_define_is_idempotent() {
    let (mut rm, fs) = setup();
    let key = load_material(&mut rm, &fs, LIT_MATERIAL);
    let shader = material(&rm, key).shader();
    let resolves = rm.get::<Shader>(shader).unwrap().resolve_count();

    rm.modify::<Material, _>(key, |m, rm| m.set_define(rm, 3, true)).unwrap().unwrap();
    rm.modify::<Material, _>(key, |m, rm| m.set_define(rm, 3, true)).unwrap().unwrap();

    assert_eq!(rm.get::<Shader>(shader).unwrap().resolve_count(), resolves + 1);
    assert_eq!(material(&rm, key).shader_instance().unwrap().define_mask(), 1 << 3);

    rm.modify::<Material, _>(key, |m, rm| m.set_define(rm, 3, false)).unwrap().unwrap();
    assert_eq!(rm.get::<Shader>(shader).unwrap().resolve_count(), resolves + 2);
    assert!(rm.modify::<Material, _>(key, |m, rm| m.set_define(rm, 32, true)).unwrap().is_err());
}

#[test]
fn test_texture_slot_define() {
    let (mut rm, fs) = setup();
    let key = load_material(&mut rm, &fs, LIT_MATERIAL);
    assert!(!material(&rm, key).is_defined(1));

    rm.modify::<Material, _>(key, |m, rm| m.set_texture_path(rm, 1, "/textures/normal.png")).unwrap().unwrap();
    assert_eq!(rm.state(key), Some(ResourceState::Loading));
    rm.flush();

    let m = material(&rm, key);
    assert!(rm.is_ready(key));
    assert_eq!(m.texture_count(), 2);
    assert!(m.is_defined(1));
    assert_eq!(m.shader_instance().unwrap().define_mask(), 0b10);
    assert_eq!(m.texture_uniform(&rm, 1), Some("u_texNormal"));
    assert_eq!(m.texture_by_uniform(&rm, "u_texNormal"), m.texture(1));

    rm.modify::<Material, _>(key, |m, rm| m.set_texture(rm, 1, None)).unwrap().unwrap();
    let m = material(&rm, key);
    assert!(!m.is_defined(1));
    assert_eq!(m.texture_count(), 2);
}

#[test]
fn test_empty_source_keeps_slot_index() {
    let (mut rm, fs) = setup();
    let key = load_material(
        &mut rm,
        &fs,
        r#"{ "shader": "shaders/lit.shd", "texture": { "source": "" }, "texture": { "source": "/textures/normal.png" } }"#,
    );
    let m = material(&rm, key);
    assert_eq!(m.texture_count(), 2);
    assert_eq!(m.texture(0), None);
    assert!(m.texture(1).is_some());
    assert!(m.is_defined(1));
}

#[test]
fn test_replacing_texture_releases_old_and_inherits_atlas() {
    let (mut rm, fs) = setup();
    let key = load_material(
        &mut rm,
        &fs,
        r#"{ "shader": "shaders/lit.shd", "texture": { "source": "albedo.png", "atlas_size": 4 } }"#,
    );
    let albedo = material(&rm, key).texture(0).unwrap();

    let detail = rm.load(ResourceType::TEXTURE, "textures/detail.png").unwrap();
    rm.flush();
    rm.modify::<Material, _>(key, |m, rm| m.set_texture(rm, 0, Some(detail))).unwrap().unwrap();

    assert!(rm.is_ready(key));
    assert_eq!(rm.ref_count(albedo), 0);
    assert_eq!(rm.ref_count(detail), 1);
    assert_eq!(rm.get::<Texture>(detail).unwrap().atlas_size(), 4);
    assert_eq!(material(&rm, key).texture(0), Some(detail));
}

#[test]
fn test_set_texture_out_of_range() {
    let (mut rm, fs) = setup();
    let key = load_material(&mut rm, &fs, LIT_MATERIAL);
    let result = rm.modify::<Material, _>(key, |m, rm| m.set_texture(rm, MAX_TEXTURE_COUNT, None)).unwrap();
    assert!(result.is_err());
}

#[test]
fn test_keep_data_holds_pixels_until_unload() {
    let (mut rm, fs) = setup();
    let key = load_material(
        &mut rm,
        &fs,
        r#"{ "shader": "shaders/lit.shd", "texture": { "source": "albedo.png", "keep_data": true } }"#,
    );
    let albedo = material(&rm, key).texture(0).unwrap();
    assert!(rm.get::<Texture>(albedo).unwrap().data().is_some());

    // another user keeps the texture alive after the material lets go
    rm.load(ResourceType::TEXTURE, "materials/albedo.png").unwrap();
    rm.unload(key).unwrap();
    let texture = rm.get::<Texture>(albedo).unwrap();
    assert_eq!(texture.data_reference_count(), 0);
    assert!(texture.data().is_none());
}

#[test]
fn test_keep_data_on_ready_texture_reloads_pixels() {
    let (mut rm, fs) = setup();
    let first = load_material(&mut rm, &fs, LIT_MATERIAL);
    let albedo = material(&rm, first).texture(0).unwrap();
    assert!(rm.get::<Texture>(albedo).unwrap().data().is_none());

    fs.insert(
        "materials/moss.mat",
        r#"{ "shader": "/shaders/lit.shd", "texture": { "source": "albedo.png", "keep_data": true } }"#,
    );
    let second = rm.load(ResourceType::MATERIAL, "materials/moss.mat").unwrap();
    rm.flush();

    assert_eq!(material(&rm, second).texture(0), Some(albedo));
    let texture = rm.get::<Texture>(albedo).unwrap();
    assert_eq!(texture.data_reference_count(), 1);
    assert_eq!(texture.data().map(<[u8]>::len), Some(2 * 2 * 4));
    assert!(rm.is_ready(first));
    assert!(rm.is_ready(second));
}

#[test]
fn test_unknown_texture_filter_is_ignored() {
    let (mut rm, fs) = setup();
    let key = load_material(
        &mut rm,
        &fs,
        r#"{ "shader": "/shaders/lit.shd", "texture": { "source": "albedo.png", "min_filter": "linear", "mag_filter": "point" } }"#,
    );
    assert!(rm.is_ready(key));
    let albedo = material(&rm, key).texture(0).unwrap();
    assert_eq!(rm.get::<Texture>(albedo).unwrap().flags(), TextureFlags::MAG_POINT);
}

// ============================================================================
// COMMAND BUFFER
// ============================================================================

#[test]
fn test_command_buffer_contents() {
    let (mut rm, fs) = setup();
    let key = load_material(&mut rm, &fs, LIT_MATERIAL);
    let m = material(&rm, key);
    let shader = rm.get::<Shader>(m.shader()).unwrap();
    let albedo = rm.get::<Texture>(m.texture(0).unwrap()).unwrap();

    assert_eq!(
        commands(m),
        vec![
            Command::SetUniform { uniform: shader.uniform(0).unwrap().handle, value: Vec4::new(0.5, 0.0, 0.0, 0.0) },
            Command::SetUniform { uniform: shader.uniform(1).unwrap().handle, value: Vec4::new(1.0, 0.0, 0.0, 0.0) },
            Command::SetTimeUniform { uniform: shader.uniform(2).unwrap().handle },
            Command::SetTexture {
                slot: 0,
                uniform: shader.texture_slot(0).unwrap().uniform_handle,
                texture: albedo.texture_handle(),
            },
            Command::SetTexture {
                slot: 1,
                uniform: shader.texture_slot(1).unwrap().uniform_handle,
                texture: TextureHandle::INVALID,
            },
            Command::SetUniform {
                uniform: rm.renderer().material_color_shininess_uniform(),
                value: Vec4::new(0.5, 0.5, 0.5, 8.0),
            },
            Command::End,
        ]
    );
}

#[test]
fn test_command_buffer_length_stable_across_value_changes() {
    let (mut rm, fs) = setup();
    let key = load_material(&mut rm, &fs, LIT_MATERIAL);
    let length = material(&rm, key).command_buffer().len();
    let before = material(&rm, key).command_buffer().to_vec();

    rm.modify::<Material, _>(key, |m, rm| {
        m.set_color(rm, Vec3::new(0.1, 0.2, 0.3));
        m.set_shininess(rm, 32.0);
        m.set_alpha_ref(rm, 0.6);
        m.set_uniform(rm, "u_roughness", UniformValue::Float(0.75));
    })
    .unwrap();

    let m = material(&rm, key);
    assert_eq!(m.command_buffer().len(), length);
    assert_ne!(m.command_buffer(), &before[..]);
    assert_eq!(m.uniform("u_roughness"), Some(&UniformValue::Float(0.75)));
    assert_eq!(m.render_state().alpha_ref(), 153);

    // binding the empty slot keeps the length too
    rm.modify::<Material, _>(key, |m, rm| m.set_texture_path(rm, 1, "/textures/normal.png")).unwrap().unwrap();
    rm.flush();
    assert_eq!(material(&rm, key).command_buffer().len(), length);
}

#[test]
fn test_matrix_uniform_command() {
    let (mut rm, fs) = setup();
    fs.insert("shaders/skinned.shd", r#"{ "uniforms": [ { "name": "u_bones", "type": "matrix4" }, { "name": "u_layer", "type": "int" } ] }"#);
    let key = load_material(
        &mut rm,
        &fs,
        r#"{ "shader": "shaders/skinned.shd", "uniforms": [
            { "name": "u_bones", "matrix_value": [1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0,0,1] },
            { "name": "u_layer", "int_value": 3 }
        ] }"#,
    );
    let m = material(&rm, key);
    let cmds = commands(m);
    assert!(matches!(cmds[0], Command::SetUniformMatrix { value, .. } if value == Mat4::IDENTITY));
    assert!(matches!(cmds[1], Command::SetUniform { value, .. } if value == Vec4::new(3.0, 0.0, 0.0, 0.0)));
}

// ============================================================================
// UNLOAD AND SAVE
// ============================================================================

#[test]
fn test_unload_releases_dependencies() {
    let (mut rm, fs) = setup();
    let key = load_material(&mut rm, &fs, LIT_MATERIAL);
    let shader = material(&rm, key).shader();
    let albedo = material(&rm, key).texture(0).unwrap();

    rm.unload(key).unwrap();
    assert_eq!(rm.state(key), Some(ResourceState::Empty));
    assert_eq!(rm.ref_count(shader), 0);
    assert_eq!(rm.ref_count(albedo), 0);
    assert!(material(&rm, key).command_buffer().is_empty());

    assert_eq!(rm.remove_unreferenced(), 3);
    assert!(rm.is_ready(rm.default_shader()));
}

#[test]
fn test_save_round_trip() {
    let (mut rm, fs) = setup();
    let key = load_material(
        &mut rm,
        &fs,
        r#"{
            "shader": "/shaders/lit.shd",
            "layer_count": 3,
            "texture": { "source": "albedo.png", "srgb": true, "u_clamp": true, "min_filter": "point" },
            "texture": { "source": "/textures/normal.png", "atlas_size": 2 },
            "defines": ["SKINNED"],
            "uniforms": [ { "name": "u_tint", "color": [0, 0, 1] }, { "name": "u_roughness", "float_value": 0.125 } ],
            "shininess": 16,
            "alpha_ref": 0.25,
            "color": [0.25, 0.5, 1]
        }"#,
    );
    let saved = material(&rm, key).save(&rm).unwrap();

    fs.insert("copies/rock.mat", saved.as_str());
    let copy = rm.load(ResourceType::MATERIAL, "copies/rock.mat").unwrap();
    rm.flush();
    assert!(rm.is_ready(copy));

    let (a, b) = (material(&rm, key), material(&rm, copy));
    assert_eq!(a.shader(), b.shader());
    assert_eq!(a.texture_count(), b.texture_count());
    for slot in 0..a.texture_count() {
        assert_eq!(a.texture(slot), b.texture(slot));
    }
    assert_eq!(a.define_mask(), b.define_mask());
    assert_eq!(a.uniforms(), b.uniforms());
    assert_eq!(a.layer_count(), 3);
    assert_eq!(b.layer_count(), 3);
    assert_eq!(a.shininess(), b.shininess());
    assert_eq!(a.alpha_ref(), b.alpha_ref());
    assert_eq!(a.color(), b.color());
    assert_eq!(a.render_state(), b.render_state());
    assert_eq!(a.command_buffer(), b.command_buffer());

    let normal = a.texture(1).unwrap();
    assert_eq!(rm.ref_count(normal), 2);
    assert_eq!(rm.get::<Texture>(normal).unwrap().atlas_size(), 2);
}

#[test]
fn test_save_writes_every_slot_and_schema_uniforms() {
    let (mut rm, fs) = setup();
    let key = load_material(
        &mut rm,
        &fs,
        r#"{ "shader": "shaders/lit.shd", "texture": { "source": "" }, "texture": { "source": "/textures/normal.png", "keep_data": true } }"#,
    );
    let saved = material(&rm, key).save(&rm).unwrap();
    let document = MaterialDocument::parse(&ResourcePath::new("saved.mat"), saved.as_bytes()).unwrap();

    assert_eq!(document.shader.as_deref(), Some("shaders/lit.shd"));
    assert_eq!(document.layer_count, None);
    assert_eq!(document.textures.len(), 2);
    assert!(document.textures[0].source.is_empty());
    assert_eq!(document.textures[1].source, "/textures/normal.png");
    assert!(document.textures[1].keep_data);
    assert_eq!(document.defines, vec!["NORMAL_MAPPING".to_string()]);
    let names: Vec<_> = document.uniforms.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["u_roughness", "u_tint", "u_time"]);
    assert_eq!(document.uniforms[2].value, Some(UniformEntryValue::Time));
}

#[test]
fn test_save_requires_ready_material() {
    let (mut rm, fs) = setup();
    fs.insert(MATERIAL_PATH, LIT_MATERIAL);
    let key = rm.load(ResourceType::MATERIAL, MATERIAL_PATH).unwrap();
    rm.update();
    assert!(material(&rm, key).save(&rm).is_err());
}
