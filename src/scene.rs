// scene.rs — per-scene load lifecycle
//
// One scene is current at a time. Loading a panorama is asynchronous (the
// event loop decodes images on worker threads), so every `init` bumps a
// generation counter and the eventual completion must present the matching
// generation before it may touch any state. A second `init` issued while the
// first is still in flight simply supersedes it: the stale completion is
// discarded on arrival. There is no hard cancel of a decode in progress.

use crate::camera::CameraController;
use crate::config::SceneConfig;
use crate::geometry;
use crate::hit_test::Picker;
use crate::hotspot::HotspotRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed,
}

/// Handed to the event loop: "decode this image and report back with the
/// generation attached".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub generation: u64,
    pub image: String,
}

#[derive(Debug)]
pub struct SceneLifecycle {
    state: LoadState,
    generation: u64,
    scene: Option<SceneConfig>,
    scene_radius: f32,
}

impl SceneLifecycle {
    pub fn new() -> Self {
        Self {
            state: LoadState::Idle,
            generation: 0,
            scene: None,
            scene_radius: 0.0,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// The descriptor of the scene being loaded or shown.
    pub fn scene(&self) -> Option<&SceneConfig> {
        self.scene.as_ref()
    }

    pub fn current_uid(&self) -> Option<&str> {
        self.scene.as_ref().map(|s| s.uid.as_str())
    }

    pub fn scene_radius(&self) -> f32 {
        self.scene_radius
    }

    /// Tears the previous scene down and starts loading a new one. The
    /// returned request carries the generation the completion must echo.
    pub fn init(
        &mut self,
        scene: &SceneConfig,
        image_path: String,
        registry: &mut HotspotRegistry,
        camera: &mut CameraController,
        picker: &mut Picker,
    ) -> LoadRequest {
        self.clear(registry, camera, picker);

        self.generation += 1;
        self.scene = Some(scene.clone());
        self.state = LoadState::Loading;
        log::info!("loading scene \"{}\" from {}", scene.uid, image_path);

        LoadRequest {
            generation: self.generation,
            image: image_path,
        }
    }

    /// Success path of an image load. A completion whose generation is not
    /// current belongs to a superseded scene and is dropped untouched.
    pub fn image_loaded(
        &mut self,
        generation: u64,
        image_width: u32,
        image_height: u32,
        registry: &mut HotspotRegistry,
        camera: &mut CameraController,
        picker: &mut Picker,
    ) -> bool {
        if !self.completion_is_current(generation) {
            return false;
        }
        let Some(scene) = self.scene.as_ref() else {
            return false;
        };

        self.scene_radius = geometry::scene_radius(image_width as f32);
        let fov = geometry::vertical_fov_deg(
            image_height as f32,
            self.scene_radius,
            geometry::CAMERA_OFFSET,
        );
        let (near, far) = geometry::clip_planes(self.scene_radius);
        camera.configure(fov, near, far);

        registry.rebuild(scene, self.scene_radius);
        picker.reset();

        self.state = LoadState::Ready;
        log::info!(
            "scene \"{}\" ready: radius {:.1}, fov {:.1}°, {} hotspots",
            scene.uid,
            self.scene_radius,
            fov,
            registry.all().len()
        );
        true
    }

    /// Failure path: logged and non-fatal. Hotspots are never populated; the
    /// tour stays navigable through whatever UI triggers another init.
    pub fn image_failed(&mut self, generation: u64, error: &str) -> bool {
        if !self.completion_is_current(generation) {
            return false;
        }

        let uid = self.current_uid().unwrap_or("<none>");
        log::error!("failed to load scene \"{}\": {}", uid, error);
        self.state = LoadState::Failed;
        true
    }

    /// Removes everything belonging to the current scene and resets the
    /// camera; the lifecycle returns to Idle.
    pub fn clear(
        &mut self,
        registry: &mut HotspotRegistry,
        camera: &mut CameraController,
        picker: &mut Picker,
    ) {
        registry.clear();
        picker.reset();
        camera.reset();
        self.scene = None;
        self.scene_radius = 0.0;
        self.state = LoadState::Idle;
    }

    fn completion_is_current(&self, generation: u64) -> bool {
        if generation != self.generation || self.state != LoadState::Loading {
            log::debug!(
                "discarding stale load completion (generation {} vs {})",
                generation,
                self.generation
            );
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlacementPoint, TransitionConfig};

    fn scene(uid: &str, transitions: usize) -> SceneConfig {
        SceneConfig {
            uid: uid.to_string(),
            image: format!("{uid}.jpg"),
            title: uid.to_string(),
            transitions: (0..transitions)
                .map(|i| TransitionConfig {
                    to_uid: format!("dest{i}"),
                    point: PlacementPoint { angle: i as f32, height: 0.0, radius: 1.0 },
                })
                .collect(),
            photos: vec![],
        }
    }

    struct Fixture {
        lifecycle: SceneLifecycle,
        registry: HotspotRegistry,
        camera: CameraController,
        picker: Picker,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                lifecycle: SceneLifecycle::new(),
                registry: HotspotRegistry::new(),
                camera: CameraController::new(1.0, 3.0, 0.02),
                picker: Picker::new(),
            }
        }

        fn init(&mut self, scene: &SceneConfig) -> LoadRequest {
            self.lifecycle.init(
                scene,
                scene.image.clone(),
                &mut self.registry,
                &mut self.camera,
                &mut self.picker,
            )
        }

        fn clear(&mut self) {
            self.lifecycle
                .clear(&mut self.registry, &mut self.camera, &mut self.picker);
        }

        fn loaded(&mut self, generation: u64) -> bool {
            self.lifecycle.image_loaded(
                generation,
                3600,
                1200,
                &mut self.registry,
                &mut self.camera,
                &mut self.picker,
            )
        }
    }

    #[test]
    fn init_enters_loading_without_hotspots() {
        let mut f = Fixture::new();
        let request = f.init(&scene("hall", 2));

        assert_eq!(f.lifecycle.state(), LoadState::Loading);
        assert_eq!(request.image, "hall.jpg");
        assert!(f.registry.is_empty()); // populated only after the image is ready
    }

    #[test]
    fn successful_load_builds_the_scene() {
        let mut f = Fixture::new();
        let request = f.init(&scene("hall", 2));
        assert!(f.loaded(request.generation));

        assert_eq!(f.lifecycle.state(), LoadState::Ready);
        assert_eq!(f.registry.all().len(), 2);
        assert!((f.lifecycle.scene_radius() - 572.9578).abs() < 1e-3);
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut f = Fixture::new();
        let first = f.init(&scene("hall", 2));
        let second = f.init(&scene("room", 1)); // supersedes the first

        // the first scene's decode finishes late: nothing may change
        assert!(!f.loaded(first.generation));
        assert_eq!(f.lifecycle.state(), LoadState::Loading);
        assert!(f.registry.is_empty());

        assert!(f.loaded(second.generation));
        assert_eq!(f.registry.all().len(), 1);
        assert_eq!(f.lifecycle.current_uid(), Some("room"));
    }

    #[test]
    fn completion_after_clear_is_discarded() {
        let mut f = Fixture::new();
        let request = f.init(&scene("hall", 2));
        f.clear();

        assert!(!f.loaded(request.generation));
        assert_eq!(f.lifecycle.state(), LoadState::Idle);
        assert!(f.registry.is_empty());
    }

    #[test]
    fn reload_leaves_no_residue() {
        let mut f = Fixture::new();
        let first = f.init(&scene("hall", 3));
        assert!(f.loaded(first.generation));
        assert_eq!(f.registry.all().len(), 3);

        let second = f.init(&scene("room", 1));
        assert!(f.loaded(second.generation));

        assert_eq!(f.registry.all().len(), 1);
        assert!(f.registry.all().iter().all(|h| h.scene_uid == "room"));
    }

    #[test]
    fn failure_is_recorded_and_non_fatal() {
        let mut f = Fixture::new();
        let request = f.init(&scene("hall", 2));
        assert!(f.lifecycle.image_failed(request.generation, "404"));

        assert_eq!(f.lifecycle.state(), LoadState::Failed);
        assert!(f.registry.is_empty());

        // the lifecycle still accepts a fresh init afterwards
        let retry = f.init(&scene("hall", 2));
        assert!(f.loaded(retry.generation));
        assert_eq!(f.lifecycle.state(), LoadState::Ready);
    }

    #[test]
    fn duplicate_completion_is_ignored() {
        let mut f = Fixture::new();
        let request = f.init(&scene("hall", 1));
        assert!(f.loaded(request.generation));
        assert!(!f.loaded(request.generation)); // already Ready
    }
}
