//! The screenplay: ordered scene references and break markers
//!
//! Mutations bump a monotonic revision counter and return the
//! [`ModelEvent`] that describes them, so hosts can forward changes to
//! observers without the model knowing who listens.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::scene::{Scene, SceneChangeKind, SceneHeading, SceneId, SceneParagraph};
use crate::model::ParagraphKind;

/// Stable identifier for screenplay elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// Subtype of a break marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakKind {
    Act,
    Episode,
    Interval,
}

impl BreakKind {
    /// Title text materialized into the flowing document
    pub fn title(&self) -> &'static str {
        match self {
            BreakKind::Act => "ACT",
            BreakKind::Episode => "EPISODE",
            BreakKind::Interval => "INTERVAL",
        }
    }
}

/// What an element refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    Scene(SceneId),
    Break(BreakKind),
}

/// Ordered member of the screenplay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenplayElement {
    pub id: ElementId,
    pub kind: ElementKind,
    /// User-assigned scene number; empty means unnumbered
    #[serde(default)]
    pub scene_number: String,
    #[serde(default)]
    pub omitted: bool,
}

impl ScreenplayElement {
    /// Scene this element refers to, if it is not a break marker
    pub fn scene_id(&self) -> Option<SceneId> {
        match self.kind {
            ElementKind::Scene(id) => Some(id),
            ElementKind::Break(_) => None,
        }
    }
}

/// Change event emitted by a model mutation
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    ElementInserted { id: ElementId, index: usize },
    ElementRemoved { id: ElementId, index: usize },
    ElementMoved { id: ElementId, from: usize, to: usize },
    ActiveSceneChanged,
    CursorMoved,
    SceneReset { scene: SceneId },
    SceneHeadingChanged { scene: SceneId },
    SceneParagraphChanged {
        scene: SceneId,
        paragraph: usize,
        change: SceneChangeKind,
    },
}

/// The structured screenplay model
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Screenplay {
    pub title: String,
    pub author: String,
    elements: Vec<ScreenplayElement>,
    scenes: FxHashMap<SceneId, Scene>,
    active_scene: Option<SceneId>,
    revision: u64,
    next_scene_id: u64,
    next_element_id: u64,
}

impl Screenplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Monotonic modification counter
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    // --- scenes ---

    /// Create a scene owned by this screenplay and return its id
    pub fn add_scene(&mut self, heading: SceneHeading, paragraphs: Vec<SceneParagraph>) -> SceneId {
        let id = SceneId(self.next_scene_id);
        self.next_scene_id += 1;

        let mut scene = Scene::new(id, heading);
        scene.paragraphs = paragraphs;
        self.scenes.insert(id, scene);
        self.bump();
        id
    }

    pub fn scene(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.get(&id)
    }

    /// All elements referencing the given scene, in screenplay order
    pub fn scene_elements(&self, scene: SceneId) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|e| e.scene_id() == Some(scene))
            .map(|e| e.id)
            .collect()
    }

    // --- ordered element list ---

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn element_at(&self, index: usize) -> Option<&ScreenplayElement> {
        self.elements.get(index)
    }

    pub fn element(&self, id: ElementId) -> Option<&ScreenplayElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn index_of_element(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// Insert an element at `index` (clamped to the list length)
    pub fn insert_element(&mut self, kind: ElementKind, index: usize) -> ModelEvent {
        let id = ElementId(self.next_element_id);
        self.next_element_id += 1;

        let index = index.min(self.elements.len());
        self.elements.insert(
            index,
            ScreenplayElement {
                id,
                kind,
                scene_number: String::new(),
                omitted: false,
            },
        );
        self.bump();
        ModelEvent::ElementInserted { id, index }
    }

    pub fn append_element(&mut self, kind: ElementKind) -> ModelEvent {
        self.insert_element(kind, self.elements.len())
    }

    pub fn remove_element(&mut self, index: usize) -> Option<ModelEvent> {
        if index >= self.elements.len() {
            return None;
        }
        let element = self.elements.remove(index);
        self.bump();
        Some(ModelEvent::ElementRemoved {
            id: element.id,
            index,
        })
    }

    /// Move an element to a new index; returns `None` for out-of-range or no-op moves
    pub fn move_element(&mut self, from: usize, to: usize) -> Option<ModelEvent> {
        if from == to || from >= self.elements.len() || to >= self.elements.len() {
            return None;
        }
        let element = self.elements.remove(from);
        let id = element.id;
        self.elements.insert(to, element);
        self.bump();
        Some(ModelEvent::ElementMoved { id, from, to })
    }

    pub fn set_scene_number(&mut self, index: usize, number: impl Into<String>) {
        if let Some(element) = self.elements.get_mut(index) {
            element.scene_number = number.into();
            self.bump();
        }
    }

    pub fn set_omitted(&mut self, index: usize, omitted: bool) -> Option<ModelEvent> {
        let element = self.elements.get_mut(index)?;
        element.omitted = omitted;
        let scene = element.scene_id()?;
        self.bump();
        Some(ModelEvent::SceneReset { scene })
    }

    // --- active scene and cursor ---

    pub fn active_scene(&self) -> Option<SceneId> {
        self.active_scene
    }

    pub fn set_active_scene(&mut self, scene: Option<SceneId>) -> ModelEvent {
        self.active_scene = scene;
        ModelEvent::ActiveSceneChanged
    }

    pub fn set_cursor_position(&mut self, scene: SceneId, position: usize) -> Option<ModelEvent> {
        let scene = self.scenes.get_mut(&scene)?;
        scene.cursor_position = position;
        Some(ModelEvent::CursorMoved)
    }

    // --- per-scene content mutations ---

    /// Replace the whole body of a scene
    pub fn reset_scene(
        &mut self,
        scene: SceneId,
        paragraphs: Vec<SceneParagraph>,
    ) -> Option<ModelEvent> {
        let entry = self.scenes.get_mut(&scene)?;
        entry.paragraphs = paragraphs;
        self.bump();
        Some(ModelEvent::SceneReset { scene })
    }

    pub fn set_heading(&mut self, scene: SceneId, heading: SceneHeading) -> Option<ModelEvent> {
        let entry = self.scenes.get_mut(&scene)?;
        entry.heading = heading;
        self.bump();
        Some(ModelEvent::SceneHeadingChanged { scene })
    }

    pub fn set_paragraph_text(
        &mut self,
        scene: SceneId,
        paragraph: usize,
        text: impl Into<String>,
    ) -> Option<ModelEvent> {
        let entry = self.scenes.get_mut(&scene)?;
        let para = entry.paragraphs.get_mut(paragraph)?;
        para.text = text.into();
        self.bump();
        Some(ModelEvent::SceneParagraphChanged {
            scene,
            paragraph,
            change: SceneChangeKind::TextChange,
        })
    }

    pub fn set_paragraph_kind(
        &mut self,
        scene: SceneId,
        paragraph: usize,
        kind: ParagraphKind,
    ) -> Option<ModelEvent> {
        let entry = self.scenes.get_mut(&scene)?;
        let para = entry.paragraphs.get_mut(paragraph)?;
        para.kind = kind;
        self.bump();
        Some(ModelEvent::SceneParagraphChanged {
            scene,
            paragraph,
            change: SceneChangeKind::KindChange,
        })
    }

    // --- persistence ---

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LocationType, Moment, ParagraphKind};

    fn sample() -> (Screenplay, SceneId) {
        let mut sp = Screenplay::new();
        let scene = sp.add_scene(
            SceneHeading::new(LocationType::Interior, "Cafe", Moment::Day),
            vec![
                SceneParagraph::new(ParagraphKind::Action, "MARY sips her coffee."),
                SceneParagraph::new(ParagraphKind::Character, "MARY"),
                SceneParagraph::new(ParagraphKind::Dialogue, "Cold again."),
            ],
        );
        sp.append_element(ElementKind::Scene(scene));
        (sp, scene)
    }

    #[test]
    fn test_insert_remove_move() {
        let (mut sp, scene) = sample();
        assert_eq!(sp.element_count(), 1);

        let event = sp.insert_element(ElementKind::Break(BreakKind::Act), 0);
        let id = match event {
            ModelEvent::ElementInserted { id, index } => {
                assert_eq!(index, 0);
                id
            }
            other => panic!("unexpected event {:?}", other),
        };
        assert_eq!(sp.element_count(), 2);
        assert_eq!(sp.element_at(0).unwrap().id, id);

        let event = sp.move_element(0, 1).unwrap();
        assert_eq!(event, ModelEvent::ElementMoved { id, from: 0, to: 1 });
        assert_eq!(sp.element_at(1).unwrap().id, id);

        let event = sp.remove_element(1).unwrap();
        assert_eq!(event, ModelEvent::ElementRemoved { id, index: 1 });
        assert_eq!(sp.element_count(), 1);
        assert_eq!(sp.element_at(0).unwrap().scene_id(), Some(scene));
    }

    #[test]
    fn test_revision_is_monotonic() {
        let (mut sp, scene) = sample();
        let r0 = sp.revision();
        sp.set_paragraph_text(scene, 0, "MARY pushes the cup away.").unwrap();
        assert!(sp.revision() > r0);
        let r1 = sp.revision();
        sp.set_heading(scene, SceneHeading::new(LocationType::Exterior, "Street", Moment::Night))
            .unwrap();
        assert!(sp.revision() > r1);
    }

    #[test]
    fn test_paragraph_change_events() {
        let (mut sp, scene) = sample();
        let event = sp.set_paragraph_kind(scene, 1, ParagraphKind::Transition).unwrap();
        assert_eq!(
            event,
            ModelEvent::SceneParagraphChanged {
                scene,
                paragraph: 1,
                change: SceneChangeKind::KindChange,
            }
        );
        assert!(sp.set_paragraph_text(scene, 9, "x").is_none());
    }

    #[test]
    fn test_scene_elements_in_order() {
        let (mut sp, scene) = sample();
        // The same scene can appear more than once in the screenplay.
        sp.append_element(ElementKind::Break(BreakKind::Interval));
        sp.append_element(ElementKind::Scene(scene));

        let ids = sp.scene_elements(scene);
        assert_eq!(ids.len(), 2);
        assert_eq!(sp.index_of_element(ids[0]), Some(0));
        assert_eq!(sp.index_of_element(ids[1]), Some(2));
    }

    #[test]
    fn test_json_round_trip() {
        let (mut sp, scene) = sample();
        sp.title = "Untitled Screenplay".into();
        sp.append_element(ElementKind::Break(BreakKind::Act));
        sp.set_scene_number(0, "1A");

        let json = sp.to_json().unwrap();
        let restored = Screenplay::from_json(&json).unwrap();

        assert_eq!(restored.title, sp.title);
        assert_eq!(restored.element_count(), sp.element_count());
        assert_eq!(restored.element_at(0).unwrap().scene_number, "1A");
        let restored_scene = restored.scene(scene).unwrap();
        assert_eq!(restored_scene.heading.to_heading_text(), "INT. CAFE - DAY");
        assert_eq!(restored_scene.paragraphs[2].kind, ParagraphKind::Dialogue);
    }
}
