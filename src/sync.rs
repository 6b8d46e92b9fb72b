//! Keeps one widget group consistent: a color control and its hue and
//! brightness sliders.
//!
//! Two directions:
//!
//! - color `input`/`change` → sliders: convert to HSV, remember saturation,
//!   set the slider values, re-render the hue track;
//! - slider `input` → color: combine hue, brightness and the remembered
//!   saturation into a hex value, write it, and re-emit `input` + `change` on
//!   the color control for outside listeners.
//!
//! Writing the color control runs the listeners of the first direction. A
//! per-group suppression flag, raised only for the duration of that write,
//! makes them ignore it.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::color::{hex_eq, hex_to_hsv, hsv_to_hex};
use crate::constants;
use crate::document::{Document, EventKind, NodeId};
use crate::math;
use crate::track;

/// The three elements of a widget group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupElements {
    pub color: NodeId,
    pub hue: NodeId,
    pub brightness: NodeId,
}

struct SyncState {
    key: String,
    elements: GroupElements,
    saturation: Cell<f64>,
    suppress: Cell<bool>,
    /// Slider → color writes performed, for diagnostics.
    writes: Cell<u64>,
}

impl SyncState {
    fn update_sliders(&self, doc: &Document, hex: &str) {
        let Some(hsv) = hex_to_hsv(hex) else {
            trace!(group = %self.key, value = hex, "ignoring invalid color");
            return;
        };
        self.saturation.set(hsv.s);
        doc.set_value(self.elements.hue, hsv.hue_degrees().to_string());
        doc.set_value(
            self.elements.brightness,
            hsv.brightness_percent().to_string(),
        );
        track::apply_hue_track(doc, self.elements.hue, hsv.h);
    }

    fn handle_color_change(&self, doc: &Document) {
        if self.suppress.get() {
            return;
        }
        let hex = doc.value(self.elements.color);
        self.update_sliders(doc, &hex);
    }

    fn update_color_from_sliders(&self, doc: &Document) {
        let hue = parse_number(&doc.value(self.elements.hue));
        let brightness = math::clamp(
            parse_number(&doc.value(self.elements.brightness)) / 100.0,
            0.0,
            1.0,
        );
        let hex = hsv_to_hex(hue, self.saturation.get(), brightness);

        track::apply_hue_track(doc, self.elements.hue, hue);

        if hex_eq(&doc.value(self.elements.color), &hex) {
            return;
        }

        debug!(group = %self.key, color = %hex, "sliders changed color");
        self.suppress.set(true);
        doc.set_value(self.elements.color, hex);
        doc.dispatch(self.elements.color, EventKind::Input);
        doc.dispatch(self.elements.color, EventKind::Change);
        self.suppress.set(false);
        self.writes.set(self.writes.get() + 1);
    }
}

/// Slider values parse as numbers; anything unparseable counts as 0.
fn parse_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Handle to an attached widget group.
///
/// Cloning shares the group's state; the listeners registered on the
/// document keep it alive for as long as the document lives.
#[derive(Clone)]
pub struct GroupSynchronizer {
    state: Rc<SyncState>,
}

impl std::fmt::Debug for GroupSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupSynchronizer")
            .field("key", &self.state.key)
            .field("elements", &self.state.elements)
            .field("saturation", &self.state.saturation.get())
            .finish()
    }
}

impl GroupSynchronizer {
    /// Wire up a group and bring its sliders in line with the color control.
    ///
    /// Registers the listeners, syncs once now, and once more on the next
    /// frame in case the color control is populated after wiring.
    pub fn attach(doc: &Document, key: impl Into<String>, elements: GroupElements) -> Self {
        let state = Rc::new(SyncState {
            key: key.into(),
            elements,
            saturation: Cell::new(constants::INITIAL_SATURATION),
            suppress: Cell::new(false),
            writes: Cell::new(0),
        });

        for slider in [elements.hue, elements.brightness] {
            let s = state.clone();
            doc.add_event_listener(slider, EventKind::Input, move |doc, _| {
                s.update_color_from_sliders(doc);
            });
        }
        for kind in [EventKind::Input, EventKind::Change] {
            let s = state.clone();
            doc.add_event_listener(elements.color, kind, move |doc, _| {
                s.handle_color_change(doc);
            });
        }

        state.handle_color_change(doc);
        let deferred = state.clone();
        doc.request_frame(move |doc| deferred.handle_color_change(doc));

        debug!(group = %state.key, ?elements, "attached hue/brightness group");
        Self { state }
    }

    /// The group key (the color control's id).
    pub fn key(&self) -> &str {
        &self.state.key
    }

    pub fn elements(&self) -> GroupElements {
        self.state.elements
    }

    /// Saturation carried across slider edits.
    pub fn saturation(&self) -> f64 {
        self.state.saturation.get()
    }

    /// Number of color writes made on behalf of the sliders.
    pub fn color_writes(&self) -> u64 {
        self.state.writes.get()
    }

    /// Re-read the color control and update the sliders from it.
    pub fn resync(&self, doc: &Document) {
        self.state.handle_color_change(doc);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ElementSpec;
    use std::cell::RefCell;

    fn group(doc: &Document, color: &str) -> GroupElements {
        GroupElements {
            color: doc.append_new(doc.body(), ElementSpec::new("input").id("c").value(color)),
            hue: doc.append_new(
                doc.body(),
                ElementSpec::new("input").attr("min", "0").attr("max", "360"),
            ),
            brightness: doc.append_new(
                doc.body(),
                ElementSpec::new("input").attr("min", "0").attr("max", "100"),
            ),
        }
    }

    #[test]
    fn attach_syncs_sliders_from_color() {
        let doc = Document::new();
        let els = group(&doc, "#ff8000");
        let sync = GroupSynchronizer::attach(&doc, "c", els);

        assert_eq!(doc.value(els.hue), "30");
        assert_eq!(doc.value(els.brightness), "100");
        assert_eq!(sync.saturation(), 1.0);
        assert!(doc
            .style_property(els.hue, constants::TRACK_BG_PROPERTY)
            .is_some());
    }

    #[test]
    fn hue_edit_writes_color_and_notifies() {
        let doc = Document::new();
        let els = group(&doc, "#ff8000");
        let sync = GroupSynchronizer::attach(&doc, "c", els);
        let seen = Rc::new(RefCell::new(Vec::new()));
        for kind in [EventKind::Input, EventKind::Change] {
            let log = seen.clone();
            doc.add_event_listener(els.color, kind, move |doc, e| {
                log.borrow_mut().push((e.kind, doc.value(e.target)));
            });
        }

        doc.user_input(els.hue, "210");

        assert_eq!(doc.value(els.color), "#0080ff");
        assert_eq!(
            *seen.borrow(),
            vec![
                (EventKind::Input, "#0080ff".to_string()),
                (EventKind::Change, "#0080ff".to_string()),
            ]
        );
        // self-caused notifications do not touch the sliders
        assert_eq!(doc.value(els.hue), "210");
        assert_eq!(sync.color_writes(), 1);
    }

    #[test]
    fn brightness_edit_uses_remembered_saturation() {
        let doc = Document::new();
        let els = group(&doc, "#ff0000");
        GroupSynchronizer::attach(&doc, "c", els);

        doc.user_input(els.brightness, "50");
        assert_eq!(doc.value(els.color), "#800000");
    }

    #[test]
    fn edit_producing_current_color_is_a_no_op() {
        let doc = Document::new();
        let els = group(&doc, "#FF0000");
        let sync = GroupSynchronizer::attach(&doc, "c", els);
        let notified = Rc::new(Cell::new(0));
        let n = notified.clone();
        doc.add_event_listener(els.color, EventKind::Change, move |_, _| n.set(n.get() + 1));
        doc.set_style_property(els.hue, constants::TRACK_BG_PROPERTY, "");

        doc.user_input(els.hue, "0");

        assert_eq!(doc.value(els.color), "#FF0000");
        assert_eq!(notified.get(), 0);
        assert_eq!(sync.color_writes(), 0);
        // the track is redrawn even though the color write was skipped
        assert_eq!(
            doc.style_property(els.hue, constants::TRACK_BG_PROPERTY).as_deref(),
            Some("linear-gradient(90deg, #ff0000 0%, #ff0000 0%, #d8d8d8 0%, #d8d8d8 100%)")
        );
    }

    #[test]
    fn hue_drags_preserve_saturation() {
        let doc = Document::new();
        let els = group(&doc, "#cc6666");
        let sync = GroupSynchronizer::attach(&doc, "c", els);
        let original = hex_to_hsv("#cc6666").unwrap().s;

        for hue in ["40", "95", "180", "275", "330"] {
            doc.user_input(els.hue, hue);
            let s = hex_to_hsv(&doc.value(els.color)).unwrap().s;
            assert!((s - original).abs() < 0.01, "hue {hue}: {s} vs {original}");
        }
        assert_eq!(sync.saturation(), original);
    }

    #[test]
    fn invalid_color_leaves_sliders_alone() {
        let doc = Document::new();
        let els = group(&doc, "#00ff00");
        GroupSynchronizer::attach(&doc, "c", els);

        let track_before = doc.style_property(els.hue, constants::TRACK_BG_PROPERTY);

        doc.user_commit(els.color, "not a color");
        assert_eq!(doc.value(els.hue), "120");
        assert_eq!(doc.value(els.brightness), "100");
        assert_eq!(
            doc.style_property(els.hue, constants::TRACK_BG_PROPERTY),
            track_before
        );

        doc.user_commit(els.color, "#00f");
        assert_eq!(doc.value(els.hue), "240");
        let track = doc
            .style_property(els.hue, constants::TRACK_BG_PROPERTY)
            .unwrap();
        assert!(
            track.starts_with("linear-gradient(90deg, #0000ff 0%, #0000ff 66.66"),
            "{track}"
        );
    }

    #[test]
    fn garbage_slider_values_count_as_zero() {
        let doc = Document::new();
        let els = group(&doc, "#0000ff");
        GroupSynchronizer::attach(&doc, "c", els);

        doc.set_value(els.brightness, "");
        doc.user_input(els.hue, "abc");
        assert_eq!(doc.value(els.color), "#000000");
    }

    #[test]
    fn deferred_resync_picks_up_late_value() {
        let doc = Document::new();
        let els = group(&doc, "");
        GroupSynchronizer::attach(&doc, "c", els);
        assert_eq!(doc.value(els.hue), "");

        // populated after wiring, without events
        doc.set_value(els.color, "#0000ff");
        doc.run_pending();
        assert_eq!(doc.value(els.hue), "240");
        assert_eq!(doc.value(els.brightness), "100");
    }

    #[test]
    fn black_keeps_saturation_zero_until_recolored() {
        let doc = Document::new();
        let els = group(&doc, "#000000");
        let sync = GroupSynchronizer::attach(&doc, "c", els);
        assert_eq!(sync.saturation(), 0.0);

        doc.user_input(els.brightness, "100");
        assert_eq!(doc.value(els.color), "#ffffff");
    }
}
