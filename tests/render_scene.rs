use nalgebra::Vector3;
use potion_scene::core::color::pack_argb;
use potion_scene::io::config::Config;
use potion_scene::pipeline::passes::{post_process_to_buffer, render_main_pass};
use potion_scene::pipeline::renderer::Renderer;
use potion_scene::scene::loader::init_scene_resources;
use potion_scene::scene::manager::SCENE_TEXTURES;

fn small_config(name: &str) -> Config {
    let mut config = Config::from_toml_str(
        r#"
        [render]
        width = 80
        height = 64
        samples = 1
        "#,
    )
    .unwrap();
    config.scene.texture_dir = std::env::temp_dir()
        .join(format!("potion_scene_{name}_no_textures"))
        .to_string_lossy()
        .into_owned();
    config
}

fn render(config: &Config) -> Vec<u32> {
    let mut context = init_scene_resources(config);
    context.scene.render_scene(config.scene.time);

    let mut renderer = Renderer::new(config.render.width, config.render.height, config.render.samples);
    let drawn = render_main_pass(config, &context, &mut renderer);
    assert_eq!(drawn, 42);

    let mut buffer = vec![0u32; config.render.width * config.render.height];
    post_process_to_buffer(&renderer.framebuffer, &mut buffer, config);
    buffer
}

#[test]
fn scene_renders_over_background() {
    let config = small_config("lit");
    let buffer = render(&config);

    let background = pack_argb(Vector3::zeros());
    let covered = buffer.iter().filter(|&&p| p != background).count();
    assert!(covered > buffer.len() / 2, "only {covered} pixels drawn");
}

#[test]
fn lighting_toggle_changes_the_image() {
    let lit = render(&small_config("toggle_lit"));

    let mut unlit_config = small_config("toggle_unlit");
    unlit_config.render.use_lighting = false;
    let unlit = render(&unlit_config);

    assert_ne!(lit, unlit);
}

#[test]
fn same_seed_renders_identically() {
    let first = render(&small_config("seed_a"));
    let second = render(&small_config("seed_b"));
    assert_eq!(first, second);
}

#[test]
fn textured_scene_samples_loaded_textures() {
    let dir = std::env::temp_dir().join(format!("potion_scene_textures_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let fixture = image::RgbImage::from_pixel(4, 4, image::Rgb([0, 255, 0]));
    for (_, file) in SCENE_TEXTURES {
        fixture.save(dir.join(file)).unwrap();
    }

    let mut config = small_config("textured");
    config.scene.texture_dir = dir.to_string_lossy().into_owned();

    let mut context = init_scene_resources(&config);
    assert_eq!(context.scene.textures().len(), SCENE_TEXTURES.len());
    context.scene.render_scene(config.scene.time);
    let draws = context.scene.draws();
    assert_eq!(draws.len(), 42);
    assert_eq!(draws.iter().filter(|d| d.samples_texture()).count(), 31);

    let textured = render(&config);
    let plain = render(&small_config("untextured"));
    assert_ne!(textured, plain);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn writes_png() {
    let config = small_config("png");
    let buffer = render(&config);
    let path = std::env::temp_dir().join("potion_scene_integration.png");
    potion_scene::io::image::save_buffer_to_image(&buffer, config.render.width, config.render.height, &path)
        .unwrap();

    let img = image::open(&path).unwrap();
    assert_eq!(img.width(), 80);
    assert_eq!(img.height(), 64);
    let _ = std::fs::remove_file(&path);
}
