//! Structured screenplay model
//!
//! The model is the authoritative source of content. The sync engine only
//! observes it: mutations return [`ModelEvent`] values that the host
//! forwards to the engine.

mod scene;
mod screenplay;

pub use scene::{
    LocationType, Moment, ParagraphKind, Scene, SceneChangeKind, SceneHeading, SceneId,
    SceneParagraph,
};
pub use screenplay::{
    BreakKind, ElementId, ElementKind, ModelEvent, Screenplay, ScreenplayElement,
};
