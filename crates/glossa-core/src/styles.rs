use glossa_config::Config;
use glossa_types::{NodeId, Placement};

use crate::dom::Document;
use crate::namespace::Namespace;

/// Stylesheet for one widget instance. Transition length follows
/// `animation_duration` so the CSS and the deferred removal agree.
pub fn stylesheet(ns: &Namespace, config: &Config) -> String {
    let term = ns.term_class();
    let popup = ns.popup_class();
    let active = ns.popup_active_class();
    let title = ns.popup_part_class("title");
    let definition = ns.popup_part_class("definition");
    let image = ns.popup_part_class("image");
    let link = ns.popup_part_class("link");
    let close = ns.popup_part_class("close");
    let sr_only = ns.sr_only_class();
    let color = &config.highlight_color;
    let ms = config.animation_duration;
    let breakpoint = config.mobile_breakpoint;

    let mut css = format!(
        ".{term} {{ border-bottom: 1px dotted {color}; cursor: help; }}
.{term}:hover, .{term}:focus {{ background: {color}1a; outline: none; }}
.{term}:focus-visible {{ outline: 2px solid {color}; outline-offset: 2px; }}
.{popup} {{ position: fixed; z-index: 10000; max-width: 320px; padding: 12px 16px; background: #fff; border: 1px solid {color}; border-radius: 6px; box-shadow: 0 4px 16px rgba(0, 0, 0, 0.15); opacity: 0; transform: translateY(4px); transition: opacity {ms}ms ease, transform {ms}ms ease; }}
.{popup}.{active} {{ opacity: 1; transform: translateY(0); }}
.{title} {{ margin: 0 0 6px; font-size: 1rem; color: {color}; }}
.{definition} {{ margin: 0; font-size: 0.9rem; line-height: 1.4; }}
.{image} {{ display: block; max-width: 100%; margin-top: 8px; border-radius: 4px; }}
.{link} {{ display: inline-block; margin-top: 8px; color: {color}; }}
.{close} {{ position: absolute; top: 4px; right: 6px; border: none; background: none; font-size: 1.1rem; cursor: pointer; }}
.{sr_only} {{ position: absolute; width: 1px; height: 1px; margin: -1px; padding: 0; overflow: hidden; clip: rect(0, 0, 0, 0); border: 0; }}
@media (max-width: {breakpoint}px) {{ .{popup} {{ left: 10px !important; right: 10px; max-width: none; }} }}
@media (prefers-reduced-motion: reduce) {{ .{popup} {{ transition: none; }} }}
"
    );

    for placement in Placement::ALL {
        let class = ns.popup_placement_class(placement.as_str());
        let origin = match placement {
            Placement::Top => "bottom center",
            Placement::Bottom => "top center",
            Placement::Left => "center right",
            Placement::Right => "center left",
        };
        css.push_str(&format!(".{popup}.{class} {{ transform-origin: {origin}; }}\n"));
    }

    css
}

/// Adds the instance stylesheet to `head`, replacing an earlier copy
pub fn inject(doc: &mut Document, ns: &Namespace, config: &Config) -> NodeId {
    remove(doc, ns);

    let style = doc.create_element("style");
    doc.set_attr(style, "id", &ns.style_id());
    let text = doc.create_text(&stylesheet(ns, config));
    doc.append_child(style, text);
    let head = doc.head();
    doc.append_child(head, style);
    tracing::debug!("Injected stylesheet #{}", ns.style_id());
    style
}

pub fn remove(doc: &mut Document, ns: &Namespace) -> bool {
    match doc.element_by_id(&ns.style_id()) {
        Some(style) => doc.remove(style),
        None => false,
    }
}
