//! Standalone demo: two hue/brightness groups, the second one inserted after
//! discovery has started.

use std::time::Duration;

use floem::action::exec_after;
use floem::prelude::*;
use floem::window::WindowConfig;
use floem_huesync::{group_sliders, Discovery, Document, ElementSpec, GroupElements, NodeId};
use tracing_subscriber::EnvFilter;

fn add_group(doc: &Document, parent: NodeId, key: &str, color: &str) -> GroupElements {
    GroupElements {
        color: doc.append_new(parent, ElementSpec::new("input").id(key).value(color)),
        hue: doc.append_new(
            parent,
            ElementSpec::new("input")
                .class("hue-slider")
                .attr("data-color-input", key)
                .attr("min", "0")
                .attr("max", "360"),
        ),
        brightness: doc.append_new(
            parent,
            ElementSpec::new("input")
                .class("brightness-slider")
                .attr("data-color-input", key)
                .attr("min", "0")
                .attr("max", "100"),
        ),
    }
}

/// Deliver queued insertions and frame callbacks while the window is open.
fn pump(doc: Document) {
    exec_after(Duration::from_millis(16), move |_| {
        doc.run_pending();
        pump(doc);
    });
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let doc = Document::new();
    let hour = add_group(&doc, doc.body(), "hourColor", "#ff8000");
    let discovery = Discovery::start(&doc);

    let section = doc.create_element(ElementSpec::new("div").id("bg-section"));
    let bg = add_group(&doc, section, "bgColor", "#3366cc");
    doc.append_child(doc.body(), section);
    doc.run_pending();
    tracing::info!(groups = ?discovery.keys(), "groups attached");

    floem::Application::new()
        .window(
            move |_| {
                pump(doc.clone());
                v_stack((group_sliders(&doc, hour), group_sliders(&doc, bg)))
                    .style(|s| s.width_full())
                    .on_event_stop(floem::event::EventListener::WindowClosed, |_| {
                        floem::quit_app()
                    })
            },
            Some(
                WindowConfig::default()
                    .size((280.0, 220.0))
                    .title("floem-huesync"),
            ),
        )
        .run();
}
