//! Scenes, headings and typed paragraphs

use serde::{Deserialize, Serialize};

/// Stable identifier for scenes, assigned by the screenplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct SceneId(pub u64);

/// The paragraph types a screenplay knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParagraphKind {
    Action,
    Character,
    Dialogue,
    Parenthetical,
    Shot,
    Transition,
    /// Scene headings and break titles share this format slot
    Heading,
}

impl ParagraphKind {
    /// All kinds, in format-table order
    pub const ALL: [ParagraphKind; 7] = [
        ParagraphKind::Action,
        ParagraphKind::Character,
        ParagraphKind::Dialogue,
        ParagraphKind::Parenthetical,
        ParagraphKind::Shot,
        ParagraphKind::Transition,
        ParagraphKind::Heading,
    ];
}

impl Default for ParagraphKind {
    fn default() -> Self {
        ParagraphKind::Action
    }
}

/// INT/EXT marker of a scene heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationType {
    Interior,
    Exterior,
    Both,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Interior => "INT.",
            LocationType::Exterior => "EXT.",
            LocationType::Both => "INT./EXT.",
        }
    }
}

/// Time-of-day marker of a scene heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Moment {
    Day,
    Night,
    Morning,
    Afternoon,
    Evening,
    Later,
    Continuous,
}

impl Moment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Moment::Day => "DAY",
            Moment::Night => "NIGHT",
            Moment::Morning => "MORNING",
            Moment::Afternoon => "AFTERNOON",
            Moment::Evening => "EVENING",
            Moment::Later => "LATER",
            Moment::Continuous => "CONTINUOUS",
        }
    }
}

/// Structured scene heading ("INT. CAFE - DAY")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneHeading {
    pub enabled: bool,
    pub location_type: LocationType,
    pub location: String,
    pub moment: Moment,
}

impl Default for SceneHeading {
    fn default() -> Self {
        Self {
            enabled: true,
            location_type: LocationType::Interior,
            location: String::new(),
            moment: Moment::Day,
        }
    }
}

impl SceneHeading {
    pub fn new(location_type: LocationType, location: impl Into<String>, moment: Moment) -> Self {
        Self {
            enabled: true,
            location_type,
            location: location.into(),
            moment,
        }
    }

    /// Render the canonical heading line
    pub fn to_heading_text(&self) -> String {
        format!(
            "{} {} - {}",
            self.location_type.as_str(),
            self.location.to_uppercase(),
            self.moment.as_str()
        )
    }
}

/// One typed paragraph of scene body text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneParagraph {
    pub kind: ParagraphKind,
    pub text: String,
}

impl SceneParagraph {
    pub fn new(kind: ParagraphKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// What changed about a scene paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneChangeKind {
    KindChange,
    TextChange,
}

/// A scene: heading plus ordered body paragraphs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub id: SceneId,
    pub title: String,
    pub heading: SceneHeading,
    pub paragraphs: Vec<SceneParagraph>,
    /// Live edit-cursor offset within the scene body, maintained by the host editor
    #[serde(default)]
    pub cursor_position: usize,
}

impl Scene {
    pub fn new(id: SceneId, heading: SceneHeading) -> Self {
        Self {
            id,
            title: String::new(),
            heading,
            paragraphs: Vec::new(),
            cursor_position: 0,
        }
    }

    pub fn paragraph_count(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn paragraph_at(&self, index: usize) -> Option<&SceneParagraph> {
        self.paragraphs.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_text() {
        let heading = SceneHeading::new(LocationType::Interior, "Cafe", Moment::Night);
        assert_eq!(heading.to_heading_text(), "INT. CAFE - NIGHT");

        let heading = SceneHeading::new(LocationType::Both, "beach house", Moment::Continuous);
        assert_eq!(heading.to_heading_text(), "INT./EXT. BEACH HOUSE - CONTINUOUS");
    }

    #[test]
    fn test_scene_paragraphs() {
        let mut scene = Scene::new(SceneId(1), SceneHeading::default());
        scene
            .paragraphs
            .push(SceneParagraph::new(ParagraphKind::Action, "The door opens."));
        scene
            .paragraphs
            .push(SceneParagraph::new(ParagraphKind::Character, "MARY"));

        assert_eq!(scene.paragraph_count(), 2);
        assert_eq!(scene.paragraph_at(1).unwrap().kind, ParagraphKind::Character);
        assert!(scene.paragraph_at(2).is_none());
    }
}
