//! The synchronization engine
//!
//! Owns the flowing document and the segment map, drives full and
//! incremental rebuilds from model events, and keeps page boundaries and
//! the current page fresh through debounced evaluation. Single-threaded
//! and cooperative: the host event loop forwards model events and calls
//! [`SyncEngine::pump`] to fire due timers.

use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::document::{BlockTag, FlowBlock, FlowDocument, FrameId, InsertPos};
use crate::format::ScreenplayFormat;
use crate::layout::DocumentLayout;
use crate::model::{
    ElementId, ElementKind, ModelEvent, ParagraphKind, Scene, SceneChangeKind, SceneId,
    Screenplay, ScreenplayElement,
};
use crate::pagination::{self, PageBoundary, PageBreak};
use crate::render::{self, PrintDevice, PrintError};
use crate::sync::{DebounceTimer, ModificationTracker, SegmentMap};

/// Coalescing window for structural edits
pub const RELOAD_DEBOUNCE: Duration = Duration::from_millis(100);

/// Coalescing window for pagination recomputes
pub const BOUNDARY_DEBOUNCE: Duration = Duration::from_millis(500);

/// Upward notifications, drained by the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    UpdateScheduled,
    UpdateStarted,
    UpdateFinished,
    PageCountChanged(usize),
    CurrentPageChanged(usize),
    PageBoundariesChanged,
}

/// Process-local engine state
#[derive(Debug)]
struct SyncState {
    /// Reentrancy guard; true while a rebuild or incremental op runs
    updating: bool,
    /// One-time setup done (model attached or explicit sync requested)
    ready: bool,
    reload_timer: DebounceTimer,
    boundary_timer: DebounceTimer,
}

/// Screenplay-to-flowing-document synchronization engine
pub struct SyncEngine {
    doc: FlowDocument,
    segments: SegmentMap,
    boundaries: Vec<PageBoundary>,
    page_count: usize,
    current_page: usize,
    sync_enabled: bool,
    scene_numbers: bool,
    /// Listening to model events; dropped while a reload is pending
    hooked: bool,
    active_scene: Option<SceneId>,
    state: SyncState,
    model_tracker: ModificationTracker,
    format_tracker: ModificationTracker,
    /// Stamp for discarding superseded boundary evaluations
    boundary_generation: u64,
    last_now: Instant,
    events: Vec<SyncEvent>,
}

/// Scoped updating flag. Clears on every exit path, so readers never
/// observe a half-built document as quiescent.
struct UpdateScope<'a> {
    engine: &'a mut SyncEngine,
}

impl<'a> UpdateScope<'a> {
    fn begin(engine: &'a mut SyncEngine) -> Option<Self> {
        if engine.state.updating {
            return None;
        }
        engine.set_updating(true);
        Some(Self { engine })
    }
}

impl Deref for UpdateScope<'_> {
    type Target = SyncEngine;

    fn deref(&self) -> &SyncEngine {
        self.engine
    }
}

impl DerefMut for UpdateScope<'_> {
    fn deref_mut(&mut self) -> &mut SyncEngine {
        self.engine
    }
}

impl Drop for UpdateScope<'_> {
    fn drop(&mut self) {
        self.engine.set_updating(false);
    }
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncEngine {
    pub fn new() -> Self {
        Self {
            doc: FlowDocument::new(),
            segments: SegmentMap::new(),
            boundaries: Vec::new(),
            page_count: 0,
            current_page: 0,
            sync_enabled: true,
            scene_numbers: true,
            hooked: false,
            active_scene: None,
            state: SyncState {
                updating: false,
                ready: false,
                reload_timer: DebounceTimer::new(),
                boundary_timer: DebounceTimer::new(),
            },
            model_tracker: ModificationTracker::new(),
            format_tracker: ModificationTracker::new(),
            boundary_generation: 0,
            last_now: Instant::now(),
            events: Vec::new(),
        }
    }

    // --- binding ---

    /// Bind to a structured model; the host passes the same model into
    /// every subsequent call. Schedules the initial load.
    pub fn attach_model(&mut self, now: Instant) {
        self.touch(now);
        self.state.ready = true;
        self.model_tracker.reset();
        self.schedule_reload(now);
    }

    /// Bind to a formatting provider; schedules a full reload rather
    /// than reformatting in place.
    pub fn attach_formatting(&mut self, now: Instant) {
        self.touch(now);
        self.format_tracker.reset();
        self.schedule_reload(now);
    }

    /// Toggle observation of model events. Re-enabling schedules one
    /// reload so a burst of silent edits coalesces into a single rebuild.
    pub fn set_sync_enabled(&mut self, enabled: bool, now: Instant) {
        if self.sync_enabled == enabled {
            return;
        }
        self.sync_enabled = enabled;
        if enabled {
            self.schedule_reload(now);
        } else {
            self.hooked = false;
        }
    }

    /// Toggle scene-number prefixes in headings
    pub fn set_scene_numbers(&mut self, enabled: bool, now: Instant) {
        if self.scene_numbers == enabled {
            return;
        }
        self.scene_numbers = enabled;
        self.model_tracker.reset();
        self.schedule_reload(now);
    }

    // --- readers ---

    pub fn is_updating(&self) -> bool {
        self.state.updating
    }

    pub fn is_sync_enabled(&self) -> bool {
        self.sync_enabled
    }

    pub fn has_scene_numbers(&self) -> bool {
        self.scene_numbers
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn boundaries(&self) -> &[PageBoundary] {
        &self.boundaries
    }

    pub fn document(&self) -> &FlowDocument {
        &self.doc
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segment_for(&self, element: ElementId) -> Option<FrameId> {
        self.segments.get(element)
    }

    /// Drain queued upward notifications
    pub fn drain_events(&mut self) -> Vec<SyncEvent> {
        std::mem::take(&mut self.events)
    }

    // --- scheduling ---

    /// Force an immediate full reload, bypassing the debounce timer
    pub fn sync_now(&mut self, model: &Screenplay, format: Option<&ScreenplayFormat>) {
        self.state.ready = true;
        self.state.reload_timer.stop();
        self.load_screenplay(model, format);
    }

    /// Fire due debounce timers; call from the host event loop
    pub fn pump(&mut self, model: &Screenplay, format: Option<&ScreenplayFormat>, now: Instant) {
        self.touch(now);
        if self.state.reload_timer.take_if_due(now) {
            self.load_screenplay(model, format);
        }
        if self.state.boundary_timer.take_if_due(now) {
            self.evaluate_page_boundaries(model, format);
        }
    }

    /// Provider rules changed; reformatting in place is not attempted
    pub fn on_format_changed(&mut self, now: Instant) {
        self.touch(now);
        self.format_tracker.reset();
        self.schedule_reload(now);
    }

    /// Screen or device-pixel-ratio changed; metrics are stale
    pub fn on_screen_changed(&mut self, now: Instant) {
        self.touch(now);
        self.format_tracker.reset();
        self.schedule_reload(now);
    }

    fn schedule_reload(&mut self, now: Instant) {
        trace!("reload scheduled");
        // Stop listening until the reload runs; a burst of edits arms
        // the timer once and the rebuild reads the final model state.
        self.hooked = false;
        if !self.state.reload_timer.is_armed() {
            self.events.push(SyncEvent::UpdateScheduled);
        }
        self.state.reload_timer.start(now, RELOAD_DEBOUNCE);
    }

    fn schedule_boundary_eval(&mut self) {
        self.boundary_generation += 1;
        self.state.boundary_timer.start(self.last_now, BOUNDARY_DEBOUNCE);
    }

    fn touch(&mut self, now: Instant) {
        self.last_now = now;
    }

    // --- full reload ---

    fn load_screenplay(&mut self, model: &Screenplay, format: Option<&ScreenplayFormat>) {
        if self.state.updating || !self.state.ready {
            return;
        }

        let owned;
        let format = match format {
            Some(f) => f,
            None => {
                owned = ScreenplayFormat::default();
                &owned
            }
        };

        let model_changed = self.model_tracker.is_modified(model.revision());
        let format_changed = self.format_tracker.is_modified(format.revision());
        if !model_changed && !format_changed {
            trace!("reload skipped: nothing modified");
            self.hooked = true;
            return;
        }

        debug!(
            elements = model.element_count(),
            revision = model.revision(),
            "full reload"
        );

        {
            let Some(mut scope) = UpdateScope::begin(self) else {
                return;
            };
            scope.segments.clear();
            scope.doc.clear();

            for index in 0..model.element_count() {
                let Some(element) = model.element_at(index) else {
                    continue;
                };
                scope.materialize(model, element, InsertPos::End);
            }
        }

        self.hooked = true;
        self.active_scene = model.active_scene();
        self.evaluate_current_page(model);
    }

    fn materialize(&mut self, model: &Screenplay, element: &ScreenplayElement, pos: InsertPos) {
        let frame = self.doc.create_frame(pos);
        self.segments.put(element.id, frame);
        let blocks = compose_blocks(model, element, self.scene_numbers);
        self.doc.set_frame_blocks(frame, blocks);
    }

    // --- incremental handlers ---

    /// Feed one model change event into the engine
    pub fn on_model_event(&mut self, model: &Screenplay, event: &ModelEvent, now: Instant) {
        self.touch(now);
        if !self.state.ready || !self.sync_enabled || !self.hooked {
            return;
        }
        trace!(?event, "model event");
        match *event {
            ModelEvent::ElementInserted { id, index } => self.on_element_inserted(model, id, index),
            ModelEvent::ElementRemoved { id, .. } => self.on_element_removed(id),
            ModelEvent::ElementMoved { id, from: _, to } => {
                // Moves are delete + reinsert of the one frame
                self.on_element_removed(id);
                self.on_element_inserted(model, id, to);
            }
            ModelEvent::ActiveSceneChanged => {
                self.active_scene = model.active_scene();
                self.evaluate_current_page(model);
            }
            ModelEvent::CursorMoved => self.evaluate_current_page(model),
            ModelEvent::SceneReset { scene } => self.on_scene_reset(model, scene),
            ModelEvent::SceneHeadingChanged { scene } => self.on_scene_heading_changed(model, scene),
            ModelEvent::SceneParagraphChanged {
                scene,
                paragraph,
                change,
            } => self.on_scene_paragraph_changed(model, scene, paragraph, change),
        }
    }

    fn guarded(&mut self) -> Option<UpdateScope<'_>> {
        if self.state.updating {
            self.force_reload("update already in flight");
            return None;
        }
        UpdateScope::begin(self)
    }

    /// State is suspect; resynchronize from scratch instead of risking a
    /// corrupt segment map.
    fn force_reload(&mut self, why: &'static str) {
        debug!(why, "forcing full reload");
        self.model_tracker.reset();
        let now = self.last_now;
        self.schedule_reload(now);
    }

    fn on_element_inserted(&mut self, model: &Screenplay, id: ElementId, index: usize) {
        let Some(element) = model.element(id) else {
            self.force_reload("inserted element missing from model");
            return;
        };

        let pos = if index + 1 == model.element_count() {
            InsertPos::End
        } else if index > 0 {
            let prev = model
                .element_at(index - 1)
                .and_then(|e| self.segments.get(e.id));
            match prev {
                Some(frame) => InsertPos::After(frame),
                None => {
                    debug_assert!(false, "insert before the screenplay was loaded");
                    self.force_reload("predecessor has no segment");
                    return;
                }
            }
        } else {
            InsertPos::Start
        };

        let Some(mut scope) = self.guarded() else {
            return;
        };
        scope.materialize(model, element, pos);
    }

    fn on_element_removed(&mut self, id: ElementId) {
        let Some(frame) = self.segments.get(id) else {
            debug_assert!(false, "removing an element that was never included in the document");
            self.force_reload("removed element has no segment");
            return;
        };

        let Some(mut scope) = self.guarded() else {
            return;
        };
        scope.segments.remove(id);
        scope.doc.remove_frame(frame);
    }

    fn on_scene_reset(&mut self, model: &Screenplay, scene_id: SceneId) {
        let elements = model.scene_elements(scene_id);

        let Some(mut scope) = self.guarded() else {
            return;
        };
        let mut missing = false;
        for id in elements {
            let Some(element) = model.element(id) else {
                continue;
            };
            match scope.segments.get(id) {
                Some(frame) => {
                    let blocks = compose_blocks(model, element, scope.scene_numbers);
                    scope.doc.set_frame_blocks(frame, blocks);
                }
                None => missing = true,
            }
        }
        drop(scope);

        if missing {
            debug_assert!(false, "updating a scene before it was included in the document");
            self.force_reload("scene reset without segment");
        }
    }

    fn on_scene_heading_changed(&mut self, model: &Screenplay, scene_id: SceneId) {
        let Some(scene) = model.scene(scene_id) else {
            return;
        };
        let elements = model.scene_elements(scene_id);

        let Some(mut scope) = self.guarded() else {
            return;
        };
        for id in elements {
            let Some(element) = model.element(id) else {
                continue;
            };
            let Some(frame) = scope.segments.get(id) else {
                continue;
            };
            let has_heading = scope
                .doc
                .frame(frame)
                .and_then(|f| f.blocks().first())
                .map(|b| b.tag == BlockTag::SceneHeading)
                .unwrap_or(false);

            if scene.heading.enabled {
                let block = FlowBlock::new(
                    BlockTag::SceneHeading,
                    ParagraphKind::Heading,
                    heading_text(scene, element, scope.scene_numbers),
                );
                if has_heading {
                    scope.doc.replace_block(frame, 0, block);
                } else {
                    scope.doc.insert_block(frame, 0, block);
                }
            } else if has_heading {
                scope.doc.remove_block(frame, 0);
                let empty = scope.doc.frame(frame).map(|f| f.is_empty()).unwrap_or(false);
                if empty {
                    scope.doc.insert_block(
                        frame,
                        0,
                        FlowBlock::new(BlockTag::Empty, ParagraphKind::Action, ""),
                    );
                }
            }
        }
    }

    fn on_scene_paragraph_changed(
        &mut self,
        model: &Screenplay,
        scene_id: SceneId,
        paragraph: usize,
        change: SceneChangeKind,
    ) {
        let Some(scene) = model.scene(scene_id) else {
            return;
        };
        let Some(para) = scene.paragraph_at(paragraph) else {
            // Paragraph list drifted structurally; rebuild the frames
            self.on_scene_reset(model, scene_id);
            return;
        };
        trace!(?change, paragraph, "paragraph update");
        let elements = model.scene_elements(scene_id);

        let Some(mut scope) = self.guarded() else {
            return;
        };
        for id in elements {
            let Some(element) = model.element(id) else {
                continue;
            };
            if element.omitted {
                continue;
            }
            let Some(frame) = scope.segments.get(id) else {
                continue;
            };
            let block_index = scope
                .doc
                .frame(frame)
                .and_then(|f| f.blocks().iter().position(|b| b.tag == BlockTag::Paragraph(paragraph)));

            match block_index {
                Some(index) => {
                    let block =
                        FlowBlock::new(BlockTag::Paragraph(paragraph), para.kind, para.text.clone());
                    scope.doc.replace_block(frame, index, block);
                }
                None => {
                    // Paragraph appeared after materialization
                    let blocks = compose_blocks(model, element, scope.scene_numbers);
                    scope.doc.set_frame_blocks(frame, blocks);
                }
            }
        }
    }

    // --- updating flag ---

    fn set_updating(&mut self, updating: bool) {
        if self.state.updating == updating {
            return;
        }
        self.state.updating = updating;
        if updating {
            self.events.push(SyncEvent::UpdateStarted);
        } else {
            self.events.push(SyncEvent::UpdateFinished);
            self.schedule_boundary_eval();
        }
    }

    // --- pagination ---

    fn evaluate_page_boundaries(&mut self, model: &Screenplay, format: Option<&ScreenplayFormat>) {
        if self.state.updating {
            self.schedule_boundary_eval();
            return;
        }

        let owned;
        let format = match format {
            Some(f) => f,
            None => {
                owned = ScreenplayFormat::default();
                &owned
            }
        };

        let generation = self.boundary_generation;
        let layout = DocumentLayout::build(&self.doc, format);
        let boundaries = pagination::recompute_boundaries(
            &layout,
            format.page().content_width(),
            format.page().content_height(),
        );

        // Last-writer-wins: a newer schedule supersedes this result
        if generation != self.boundary_generation {
            trace!("boundary evaluation superseded; discarding");
            return;
        }

        debug!(pages = boundaries.len(), "page boundaries evaluated");
        let changed = boundaries != self.boundaries;
        self.boundaries = boundaries;
        let count = self.boundaries.len();
        self.set_page_count(count);
        if changed {
            self.events.push(SyncEvent::PageBoundariesChanged);
        }
        self.evaluate_current_page(model);
    }

    fn set_page_count(&mut self, count: usize) {
        if self.page_count == count {
            return;
        }
        self.page_count = count;
        self.events.push(SyncEvent::PageCountChanged(count));
    }

    // --- current page ---

    fn evaluate_current_page(&mut self, model: &Screenplay) {
        if self.state.updating {
            return;
        }
        let page = self.compute_current_page(model);
        self.set_current_page(page);
    }

    fn compute_current_page(&self, model: &Screenplay) -> usize {
        let Some(scene_id) = self.active_scene else {
            return 0;
        };
        if self.boundaries.is_empty() || self.doc.is_empty() {
            return 0;
        }
        let Some(scene) = model.scene(scene_id) else {
            return 0;
        };
        let Some(element_id) = model.scene_elements(scene_id).into_iter().next() else {
            return 0;
        };
        let Some(frame) = self.segments.get(element_id) else {
            return 0;
        };
        let Some(range) = self.doc.frame_range(frame) else {
            return 0;
        };

        let body_start = range.first + self.heading_len(frame);
        let offset = (body_start + scene.cursor_position).min(range.last.saturating_sub(1));
        pagination::locate_page(offset, &self.boundaries, self.page_count)
    }

    fn set_current_page(&mut self, page: usize) {
        let page = if page == 0 || self.page_count == 0 {
            0
        } else {
            page.clamp(1, self.page_count)
        };
        if self.current_page == page {
            return;
        }
        self.current_page = page;
        self.events.push(SyncEvent::CurrentPageChanged(page));
    }

    fn heading_len(&self, frame: FrameId) -> usize {
        self.doc
            .frame(frame)
            .and_then(|f| f.blocks().first())
            .filter(|b| b.tag == BlockTag::SceneHeading)
            .map(FlowBlock::len)
            .unwrap_or(0)
    }

    // --- queries ---

    /// Page boundaries falling inside an element's segment, as
    /// (offset within the element, 1-based page number) pairs
    pub fn page_breaks_for(&self, element: ElementId) -> SmallVec<[PageBreak; 4]> {
        if self.state.updating {
            return SmallVec::new();
        }
        let Some(frame) = self.segments.get(element) else {
            return SmallVec::new();
        };
        let Some(range) = self.doc.frame_range(frame) else {
            return SmallVec::new();
        };
        let body_start = range.first + self.heading_len(frame);
        let is_first = self.doc.first_frame() == Some(frame);
        pagination::page_breaks_in(range, body_start, is_first, &self.boundaries)
    }

    /// Hand the materialized document to an external renderer
    pub fn print(
        &self,
        model: &Screenplay,
        format: Option<&ScreenplayFormat>,
        device: &mut dyn PrintDevice,
    ) -> Result<(), PrintError> {
        let owned;
        let format = match format {
            Some(f) => f,
            None => {
                owned = ScreenplayFormat::default();
                &owned
            }
        };
        render::print_document(&self.doc, format, &model.title, &model.author, device)
    }
}

/// Render one element into flow blocks
fn compose_blocks(
    model: &Screenplay,
    element: &ScreenplayElement,
    scene_numbers: bool,
) -> Vec<FlowBlock> {
    match element.kind {
        ElementKind::Break(kind) => vec![FlowBlock::new(
            BlockTag::BreakTitle,
            ParagraphKind::Heading,
            kind.title(),
        )],
        ElementKind::Scene(scene_id) => {
            let Some(scene) = model.scene(scene_id) else {
                return vec![FlowBlock::new(BlockTag::Empty, ParagraphKind::Action, "")];
            };
            let mut blocks = Vec::with_capacity(scene.paragraph_count() + 1);
            if scene.heading.enabled {
                blocks.push(FlowBlock::new(
                    BlockTag::SceneHeading,
                    ParagraphKind::Heading,
                    heading_text(scene, element, scene_numbers),
                ));
            }
            if element.omitted {
                blocks.push(FlowBlock::new(
                    BlockTag::Omitted,
                    ParagraphKind::Action,
                    "[OMITTED]",
                ));
            } else {
                for (index, para) in scene.paragraphs.iter().enumerate() {
                    blocks.push(FlowBlock::new(
                        BlockTag::Paragraph(index),
                        para.kind,
                        para.text.clone(),
                    ));
                }
            }
            if blocks.is_empty() {
                blocks.push(FlowBlock::new(BlockTag::Empty, ParagraphKind::Action, ""));
            }
            blocks
        }
    }
}

fn heading_text(scene: &Scene, element: &ScreenplayElement, scene_numbers: bool) -> String {
    let text = scene.heading.to_heading_text();
    if scene_numbers && !element.scene_number.is_empty() {
        format!("{}. {}", element.scene_number, text)
    } else {
        text
    }
}
