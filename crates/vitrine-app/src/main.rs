use std::path::PathBuf;

use anyhow::{Context, Result};

use vitrine_engine::assets::{DirBundle, read_asset};
use vitrine_engine::core::App;
use vitrine_engine::logging::{LoggingConfig, init_logging};
use vitrine_engine::viewer::{
    AmbientOcclusionOptions, AntiAliasing, BlendMode, ClearOptions, Color, ModelViewer,
    MsaaOptions, ViewerOptions,
};
use vitrine_engine::window::{Runtime, RuntimeConfig};

const MODEL_ASSET: &str = "scene.glb";
const ENVIRONMENT_ASSET: &str = "scene_ibl.ktx";

/// Loads the bundled scene into the viewer once the surface exists.
struct SceneApp {
    bundle: DirBundle,
}

impl App for SceneApp {
    fn on_viewer_ready(&mut self, viewer: &mut ModelViewer<'_>) -> Result<()> {
        let environment = read_asset(&self.bundle, ENVIRONMENT_ASSET)
            .context("loading environment asset")?;
        viewer.load_indirect_light(&environment)?;

        let model = read_asset(&self.bundle, MODEL_ASSET).context("loading model asset")?;
        viewer.load_model_glb(&model)?;
        viewer.transform_to_unit_cube();

        Ok(())
    }
}

fn render_options() -> ViewerOptions {
    ViewerOptions {
        blend_mode: BlendMode::Translucent,
        anti_aliasing: AntiAliasing::Fxaa,
        msaa: MsaaOptions { enabled: true },
        ambient_occlusion: AmbientOcclusionOptions { enabled: true },
        clear: ClearOptions {
            clear: true,
            // Dark slate backdrop behind the model.
            color: Color::from_hsl(192.0, 0.04, 0.24),
        },
    }
}

fn asset_dir() -> PathBuf {
    std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets"))
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let bundle = DirBundle::new(asset_dir());
    log::info!(
        "vitrine starting, assets from {}",
        bundle.root().display()
    );

    Runtime::run(
        RuntimeConfig::new("Vitrine", 960.0, 640.0),
        render_options(),
        SceneApp { bundle },
    )
}
