// tour.rs — the scene graph and the single point of navigation
//
// Scenes are a lookup table keyed by uid; a portal is a logical reference
// resolved at activation time, never a materialized edge. The tour owns the
// one camera, the one hotspot registry and the one picker, and routes every
// interaction through them. Exactly one scene is current; one transition may
// be in flight at a time.

use crate::camera::CameraController;
use crate::config::TourConfig;
use crate::hit_test::Picker;
use crate::hotspot::{HotspotKind, HotspotRegistry};
use crate::scene::{LoadRequest, LoadState, SceneLifecycle};

#[derive(Debug, thiserror::Error)]
pub enum TourError {
    #[error("unknown scene uid \"{0}\"")]
    UnknownScene(String),
}

/// What a resolved click asks the caller to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickAction {
    None,
    /// A portal was activated; decode the destination scene's panorama.
    LoadScene(LoadRequest),
    /// A photo spot was activated; show the inset viewer with this image.
    OpenPhoto { image: String, title: String },
    /// Click with the inset viewer open closes it.
    CloseOverlay,
}

pub struct Tour {
    config: TourConfig,
    lifecycle: SceneLifecycle,
    registry: HotspotRegistry,
    camera: CameraController,
    picker: Picker,
    photo_open: bool,
}

impl Tour {
    pub fn new(config: TourConfig) -> Self {
        let camera = CameraController::new(config.zoom_min, config.zoom_max, config.zoom_speed);
        Self {
            config,
            lifecycle: SceneLifecycle::new(),
            registry: HotspotRegistry::new(),
            camera,
            picker: Picker::new(),
            photo_open: false,
        }
    }

    pub fn config(&self) -> &TourConfig {
        &self.config
    }

    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    pub fn registry(&self) -> &HotspotRegistry {
        &self.registry
    }

    pub fn hovered(&self) -> Option<usize> {
        self.picker.hovered()
    }

    pub fn load_state(&self) -> LoadState {
        self.lifecycle.state()
    }

    pub fn scene_title(&self) -> Option<&str> {
        self.lifecycle.scene().map(|s| s.title.as_str())
    }

    pub fn current_scene_uid(&self) -> Option<&str> {
        self.lifecycle.current_uid()
    }

    pub fn is_photo_open(&self) -> bool {
        self.photo_open
    }

    /// Starts the tour at the configured entry scene.
    pub fn start(&mut self) -> Result<LoadRequest, TourError> {
        let entry = self.config.entry_scene_uid.clone();
        self.load_scene(&entry)
    }

    /// Portal activation. Refused (Ok(None)) while another transition is
    /// still loading; unknown destinations are a configuration error and
    /// leave the current scene untouched.
    pub fn activate_portal(&mut self, dest_uid: &str) -> Result<Option<LoadRequest>, TourError> {
        if self.lifecycle.state() == LoadState::Loading {
            log::warn!("transition to \"{dest_uid}\" ignored: another one is in flight");
            return Ok(None);
        }
        self.load_scene(dest_uid).map(Some)
    }

    fn load_scene(&mut self, uid: &str) -> Result<LoadRequest, TourError> {
        let Some(scene) = self.config.scene(uid) else {
            return Err(TourError::UnknownScene(uid.to_string()));
        };
        let image_path = self.config.asset_path(&scene.image);
        Ok(self.lifecycle.init(
            scene,
            image_path,
            &mut self.registry,
            &mut self.camera,
            &mut self.picker,
        ))
    }

    pub fn image_loaded(&mut self, generation: u64, width: u32, height: u32) -> bool {
        self.lifecycle.image_loaded(
            generation,
            width,
            height,
            &mut self.registry,
            &mut self.camera,
            &mut self.picker,
        )
    }

    pub fn image_failed(&mut self, generation: u64, error: &str) -> bool {
        self.lifecycle.image_failed(generation, error)
    }

    pub fn hover(&mut self, x: f32, y: f32, width: f32, height: f32) -> bool {
        self.picker
            .hover(x, y, width, height, &self.camera, &mut self.registry)
    }

    /// Click resolution. Portal hits resolve their destination through the
    /// owning scene's descriptor (never from a copy stored on the hotspot),
    /// photo hits open the inset overlay and suspend navigation.
    pub fn click(&mut self, x: f32, y: f32, width: f32, height: f32) -> Result<ClickAction, TourError> {
        if self.photo_open {
            self.close_photo();
            return Ok(ClickAction::CloseOverlay);
        }

        let Some(id) =
            self.picker
                .resolve_click(x, y, width, height, &self.camera, &mut self.registry)
        else {
            return Ok(ClickAction::None);
        };

        let hotspot = match self.registry.get(id) {
            Some(h) => h.clone(),
            None => return Ok(ClickAction::None),
        };

        match hotspot.kind {
            HotspotKind::Portal => {
                let Some(dest) = self
                    .config
                    .scene(&hotspot.scene_uid)
                    .and_then(|s| s.transitions.get(hotspot.index))
                    .map(|t| t.to_uid.clone())
                else {
                    return Ok(ClickAction::None);
                };
                match self.activate_portal(&dest)? {
                    Some(request) => Ok(ClickAction::LoadScene(request)),
                    None => Ok(ClickAction::None),
                }
            }
            HotspotKind::Photo => {
                let Some(photo) = self
                    .config
                    .scene(&hotspot.scene_uid)
                    .and_then(|s| s.photos.get(hotspot.index))
                else {
                    return Ok(ClickAction::None);
                };
                let action = ClickAction::OpenPhoto {
                    image: self.config.asset_path(&photo.image),
                    title: photo.title.clone(),
                };
                self.open_photo();
                Ok(action)
            }
        }
    }

    pub fn zoom(&mut self, delta: f32) -> bool {
        self.camera.zoom(delta)
    }

    pub fn rotate_pan(&mut self, angle: f32) -> bool {
        self.camera.rotate_pan(angle)
    }

    pub fn rotate_tilt(&mut self, angle: f32) -> bool {
        self.camera.rotate_tilt(angle)
    }

    /// Opening the inset photo suspends zoom, rotation and hover until it is
    /// closed again.
    fn open_photo(&mut self) {
        self.photo_open = true;
        self.camera.set_enabled(false);
    }

    pub fn close_photo(&mut self) {
        self.photo_open = false;
        self.camera.set_enabled(true);
    }
}
