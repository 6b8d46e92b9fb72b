//! floem views for a widget group's hue and brightness sliders.
//!
//! The views hold no color state of their own: they track the bound
//! element's value signal, and a drag writes the element's value and emits
//! `input` on it, exactly like a user edit of the underlying control. The
//! group's synchronizer does the rest.

use floem::kurbo::{Rect, Shape};
use floem::peniko::{Color, Gradient};
use floem::prelude::*;
use floem::reactive::{create_effect, SignalGet};
use floem::views::Decorators;
use floem::{
    context::{ComputeLayoutCx, EventCx, PaintCx, UpdateCx},
    event::{Event, EventPropagation},
    View, ViewId,
};
use floem_renderer::Renderer;

use crate::color::{hex_to_hsv, hex_to_rgb8, hsv_to_hex};
use crate::constants;
use crate::document::{Document, NodeId, WeakDocument};
use crate::sync::GroupElements;
use crate::track::{self, render_hue_track};

enum SliderUpdate {
    Value(f64),
    BaseColor(u8, u8, u8),
}

enum TrackKind {
    /// Filled with the selected hue up to the thumb.
    Hue,
    /// Black on the left to the group's color at full brightness.
    Brightness { base: (u8, u8, u8) },
}

pub struct RangeSlider {
    id: ViewId,
    doc: WeakDocument,
    node: NodeId,
    held: bool,
    value: f64,
    min: f64,
    max: f64,
    kind: TrackKind,
    size: floem::taffy::prelude::Size<f32>,
}

fn parse_value(raw: &str, fallback: f64) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(fallback)
}

fn rgb8(hex: &str) -> Color {
    let (r, g, b) = hex_to_rgb8(hex).unwrap_or((128, 128, 128));
    Color::rgb8(r, g, b)
}

/// Track the element's value signal and forward changes to the view.
fn track_value(doc: &Document, node: NodeId, id: ViewId, fallback: f64) -> f64 {
    let Some(signal) = doc.value_signal(node) else {
        return fallback;
    };
    create_effect(move |_| {
        let v = parse_value(&signal.get(), fallback);
        id.update_state(SliderUpdate::Value(v));
    });
    parse_value(&signal.get_untracked(), fallback)
}

fn slider_style(slider: RangeSlider) -> RangeSlider {
    slider.style(|s| {
        s.height(constants::SLIDER_HEIGHT)
            .border_radius(constants::THUMB_RADIUS as f32)
            .cursor(floem::style::CursorStyle::Pointer)
    })
}

/// A horizontal hue slider bound to `node`.
pub fn hue_slider(doc: &Document, node: NodeId) -> RangeSlider {
    let id = ViewId::new();
    let (min, max) = track::hue_range(doc, node);
    let value = track_value(doc, node, id, min);

    slider_style(RangeSlider {
        id,
        doc: doc.downgrade(),
        node,
        held: false,
        value,
        min,
        max,
        kind: TrackKind::Hue,
        size: Default::default(),
    })
}

/// A horizontal brightness slider bound to `node`, tinted by `color`.
pub fn brightness_slider(doc: &Document, node: NodeId, color: NodeId) -> RangeSlider {
    let id = ViewId::new();
    let min = track::numeric_attribute(doc, node, "min", 0.0);
    let max = track::numeric_attribute(doc, node, "max", 100.0);
    let value = track_value(doc, node, id, min);

    let base_of = |hex: &str| {
        let full = match hex_to_hsv(hex) {
            Some(hsv) => hsv_to_hex(hsv.h, hsv.s, 1.0),
            None => "#808080".to_string(),
        };
        hex_to_rgb8(&full).unwrap_or((128, 128, 128))
    };
    let base = base_of(&doc.value(color));
    if let Some(signal) = doc.value_signal(color) {
        create_effect(move |_| {
            let (r, g, b) = base_of(&signal.get());
            id.update_state(SliderUpdate::BaseColor(r, g, b));
        });
    }

    slider_style(RangeSlider {
        id,
        doc: doc.downgrade(),
        node,
        held: false,
        value,
        min,
        max,
        kind: TrackKind::Brightness { base },
        size: Default::default(),
    })
}

/// Hue slider, brightness slider and a swatch with the current color.
pub fn group_sliders(doc: &Document, elements: GroupElements) -> impl IntoView {
    let color_signal = doc.value_signal(elements.color);
    let current = move || color_signal.map(|s| s.get()).unwrap_or_default();

    v_stack((
        hue_slider(doc, elements.hue),
        brightness_slider(doc, elements.brightness, elements.color),
        h_stack((
            empty().style(move |st| {
                st.width(32.0)
                    .height(32.0)
                    .border_radius(4.0)
                    .border(1.0)
                    .border_color(Color::rgb8(180, 180, 180))
                    .background(rgb8(&current()))
            }),
            label(move || current()).style(|s| {
                s.font_size(11.0)
                    .font_family("monospace".to_string())
                    .color(Color::rgb8(120, 120, 120))
            }),
        ))
        .style(|st| st.items_center().gap(constants::GAP)),
    ))
    .style(|st| st.gap(constants::GAP).padding(constants::GAP))
}

impl RangeSlider {
    fn fraction(&self) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.value - self.min) / span).clamp(0.0, 1.0)
    }

    fn update_from_pointer(&mut self, x: f64) {
        let w = self.size.width as f64;
        let r = constants::THUMB_RADIUS;
        let usable = w - 2.0 * r;
        if usable > 0.0 {
            let t = ((x - r) / usable).clamp(0.0, 1.0);
            self.value = (self.min + t * (self.max - self.min)).round();
        }
    }

    /// Write the dragged value into the element as a user edit.
    fn commit(&self) {
        // A view can outlive the document it was built from.
        if let Some(doc) = self.doc.upgrade() {
            doc.user_input(self.node, format!("{}", self.value));
        }
    }

    fn paint_track(&self, cx: &mut PaintCx, rect: Rect) {
        let (w, h) = (rect.width(), rect.height());
        match self.kind {
            TrackKind::Hue => {
                // Selected hue up to the thumb, neutral after it
                let track = render_hue_track(self.value, self.min, self.max);
                let split = w * track.fraction();
                cx.fill(&Rect::new(0.0, 0.0, split, h), rgb8(&track.color), 0.0);
                cx.fill(
                    &Rect::new(split, 0.0, w, h),
                    rgb8(constants::TRACK_NEUTRAL),
                    0.0,
                );
            }
            TrackKind::Brightness { base: (r, g, b) } => {
                let gradient = Gradient::new_linear((0.0, h / 2.0), (w, h / 2.0))
                    .with_stops([Color::BLACK, Color::rgb8(r, g, b)]);
                // Paths avoid the renderer's solid-color-only rect fast path.
                let path = rect.to_path(0.1);
                cx.fill(&path, &gradient, 0.0);
            }
        }
    }
}

impl View for RangeSlider {
    fn id(&self) -> ViewId {
        self.id
    }

    fn update(&mut self, _cx: &mut UpdateCx, state: Box<dyn std::any::Any>) {
        if let Ok(update) = state.downcast::<SliderUpdate>() {
            match *update {
                SliderUpdate::Value(val) => self.value = val,
                SliderUpdate::BaseColor(r, g, b) => {
                    if let TrackKind::Brightness { base } = &mut self.kind {
                        *base = (r, g, b);
                    }
                }
            }
            self.id.request_layout();
        }
    }

    fn event_before_children(
        &mut self,
        cx: &mut EventCx,
        event: &Event,
    ) -> EventPropagation {
        match event {
            Event::PointerDown(e) => {
                cx.update_active(self.id());
                self.held = true;
                self.update_from_pointer(e.pos.x);
                self.commit();
                self.id.request_layout();
                EventPropagation::Stop
            }
            Event::PointerMove(e) => {
                if self.held {
                    self.update_from_pointer(e.pos.x);
                    self.commit();
                    self.id.request_layout();
                    EventPropagation::Stop
                } else {
                    EventPropagation::Continue
                }
            }
            Event::PointerUp(_) | Event::FocusLost => {
                self.held = false;
                EventPropagation::Continue
            }
            _ => EventPropagation::Continue,
        }
    }

    fn compute_layout(&mut self, _cx: &mut ComputeLayoutCx) -> Option<Rect> {
        let layout = self.id.get_layout().unwrap_or_default();
        self.size = layout.size;
        None
    }

    fn paint(&mut self, cx: &mut PaintCx) {
        let w = self.size.width as f64;
        let h = self.size.height as f64;
        if w == 0.0 || h == 0.0 {
            return;
        }
        let rect = Rect::new(0.0, 0.0, w, h);
        let rrect = rect.to_rounded_rect(constants::THUMB_RADIUS);

        // Clip to rounded rect for rounded ends
        cx.save();
        cx.clip(&rrect);
        self.paint_track(cx, rect);
        cx.restore();

        // Slider outline
        cx.stroke(
            &rrect,
            Color::rgba8(0, 0, 0, 40),
            &floem::kurbo::Stroke::new(1.0),
        );

        // Thumb (circular ring at the current value, min on the left)
        let radius = constants::THUMB_RADIUS;
        let thumb_x = radius + self.fraction() * (w - 2.0 * radius);
        let thumb_cy = h / 2.0;
        let circle = floem::kurbo::Circle::new((thumb_x, thumb_cy), radius);
        cx.stroke(
            &circle,
            Color::rgba8(0, 0, 0, 80),
            &floem::kurbo::Stroke::new(1.0),
        );
        let inner = floem::kurbo::Circle::new((thumb_x, thumb_cy), radius - 1.5);
        cx.stroke(&inner, Color::WHITE, &floem::kurbo::Stroke::new(2.0));
        let innermost = floem::kurbo::Circle::new((thumb_x, thumb_cy), radius - 3.0);
        cx.stroke(
            &innermost,
            Color::rgba8(0, 0, 0, 80),
            &floem::kurbo::Stroke::new(1.0),
        );
    }
}
