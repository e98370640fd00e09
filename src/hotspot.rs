// hotspot.rs — interactive markers attached to the loaded scene
//
// A hotspot is either a portal (jumps to another scene) or a photo spot
// (opens an inset image). It carries only its kind, the owning scene uid and
// the index into that scene's descriptor list; the destination uid / photo
// path are resolved through the tour configuration at activation time, so a
// hotspot never holds stale copies of scene data.

use crate::config::SceneConfig;
use crate::geometry::{self, HotspotTransform};

/// Side length of a hotspot quad, panorama pixels.
pub const HOTSPOT_SIZE: f32 = 48.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotspotKind {
    Portal,
    Photo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotspotState {
    Normal,
    Hovered,
}

#[derive(Debug, Clone)]
pub struct Hotspot {
    pub kind: HotspotKind,
    pub scene_uid: String,
    /// Index into the owning scene's transitions (Portal) or photos (Photo).
    pub index: usize,
    pub state: HotspotState,
    pub transform: HotspotTransform,
}

/// Id of a hotspot inside the registry. Valid only until the next rebuild.
pub type HotspotId = usize;

/// The set of hotspots of the currently loaded scene. Owned by the active
/// scene lifecycle; emptied whenever the scene is cleared.
#[derive(Debug, Default)]
pub struct HotspotRegistry {
    hotspots: Vec<Hotspot>,
}

impl HotspotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the previous scene's hotspots and creates one per transition and
    /// one per photo of the given scene, all in the Normal state.
    pub fn rebuild(&mut self, scene: &SceneConfig, scene_radius: f32) {
        self.hotspots.clear();

        for (index, transition) in scene.transitions.iter().enumerate() {
            let p = transition.point;
            self.hotspots.push(Hotspot {
                kind: HotspotKind::Portal,
                scene_uid: scene.uid.clone(),
                index,
                state: HotspotState::Normal,
                transform: geometry::hotspot_transform(p.angle, p.height, p.radius, scene_radius),
            });
        }

        for (index, photo) in scene.photos.iter().enumerate() {
            let p = photo.point;
            self.hotspots.push(Hotspot {
                kind: HotspotKind::Photo,
                scene_uid: scene.uid.clone(),
                index,
                state: HotspotState::Normal,
                transform: geometry::hotspot_transform(p.angle, p.height, p.radius, scene_radius),
            });
        }
    }

    pub fn clear(&mut self) {
        self.hotspots.clear();
    }

    pub fn all(&self) -> &[Hotspot] {
        &self.hotspots
    }

    pub fn get(&self, id: HotspotId) -> Option<&Hotspot> {
        self.hotspots.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.hotspots.is_empty()
    }

    /// Switches the visual state of a hotspot. Returns `true` when the state
    /// actually changed, so callers can skip redundant material swaps.
    pub fn set_state(&mut self, id: HotspotId, state: HotspotState) -> bool {
        match self.hotspots.get_mut(id) {
            Some(hotspot) if hotspot.state != state => {
                hotspot.state = state;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PhotoConfig, PlacementPoint, SceneConfig, TransitionConfig};

    fn scene() -> SceneConfig {
        SceneConfig {
            uid: "hall".to_string(),
            image: "hall.jpg".to_string(),
            title: "Hall".to_string(),
            transitions: vec![
                TransitionConfig {
                    to_uid: "room".to_string(),
                    point: PlacementPoint { angle: 0.0, height: 0.0, radius: 1.0 },
                },
                TransitionConfig {
                    to_uid: "yard".to_string(),
                    point: PlacementPoint { angle: 1.0, height: -50.0, radius: 0.8 },
                },
            ],
            photos: vec![PhotoConfig {
                image: "vase.jpg".to_string(),
                title: "Vase".to_string(),
                point: PlacementPoint { angle: 2.0, height: 30.0, radius: 0.9 },
            }],
        }
    }

    #[test]
    fn rebuild_creates_portals_then_photos() {
        let mut registry = HotspotRegistry::new();
        registry.rebuild(&scene(), 500.0);

        let kinds: Vec<_> = registry.all().iter().map(|h| h.kind).collect();
        assert_eq!(
            kinds,
            vec![HotspotKind::Portal, HotspotKind::Portal, HotspotKind::Photo]
        );
        assert!(registry.all().iter().all(|h| h.state == HotspotState::Normal));
        assert!(registry.all().iter().all(|h| h.scene_uid == "hall"));
        // indices are per descriptor list, not global
        assert_eq!(registry.all()[2].index, 0);
    }

    #[test]
    fn rebuild_replaces_previous_contents() {
        let mut registry = HotspotRegistry::new();
        registry.rebuild(&scene(), 500.0);
        assert_eq!(registry.all().len(), 3);

        let mut other = scene();
        other.uid = "room".to_string();
        other.transitions.truncate(1);
        other.photos.clear();
        registry.rebuild(&other, 400.0);

        assert_eq!(registry.all().len(), 1);
        assert!(registry.all().iter().all(|h| h.scene_uid == "room"));
    }

    #[test]
    fn set_state_reports_actual_changes_only() {
        let mut registry = HotspotRegistry::new();
        registry.rebuild(&scene(), 500.0);

        assert!(registry.set_state(0, HotspotState::Hovered));
        assert!(!registry.set_state(0, HotspotState::Hovered));
        assert!(registry.set_state(0, HotspotState::Normal));
        assert!(!registry.set_state(99, HotspotState::Hovered));
    }
}
