use std::io::{self, Write};

use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table, presets::UTF8_FULL};
use termcolor::{Buffer, Color, ColorSpec, WriteColor};

use crate::{
    core::{
        docking::DockingNode,
        id::{MAX_VIEWERS, WidgetId},
        scene::Scene,
    },
    error::{Error, Result},
};

/// Map a buffer write failure.
fn io_err(e: io::Error) -> Error {
    Error::Internal(e.to_string())
}

/// Traverses the widget tree from `root` and returns a string showing names,
/// cached bounds, per-viewer focus and active states. This is a debug
/// function.
pub fn dump_tree(scene: &Scene, root: WidgetId) -> Result<String> {
    let mut buffer = Buffer::ansi();
    dump_widget(&mut buffer, scene, root, 0)?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Like [`dump_tree`], without color escapes.
pub fn dump_tree_plain(scene: &Scene, root: WidgetId) -> Result<String> {
    let mut buffer = Buffer::no_color();
    dump_widget(&mut buffer, scene, root, 0)?;
    Ok(String::from_utf8_lossy(buffer.as_slice()).into_owned())
}

/// Write an indented, colored label followed by a value.
fn write_field(buffer: &mut Buffer, indent: &str, label: &str, value: &str) -> Result<()> {
    write!(buffer, "{indent}  ").map_err(io_err)?;
    buffer
        .set_color(ColorSpec::new().set_fg(Some(Color::Green)))
        .map_err(io_err)?;
    write!(buffer, "{label}").map_err(io_err)?;
    buffer.reset().map_err(io_err)?;
    writeln!(buffer, " {value}").map_err(io_err)
}

/// Walk a widget subtree and emit formatted debug output.
fn dump_widget(buffer: &mut Buffer, scene: &Scene, id: WidgetId, level: usize) -> Result<()> {
    let w = scene.widget(id)?;
    let indent = "    ".repeat(level);

    write!(buffer, "{indent}").map_err(io_err)?;
    buffer
        .set_color(ColorSpec::new().set_fg(Some(Color::Cyan)).set_bold(true))
        .map_err(io_err)?;
    write!(buffer, "{}", w.name()).map_err(io_err)?;
    buffer.reset().map_err(io_err)?;
    write!(buffer, " ({})", w.kind().name()).map_err(io_err)?;

    let mut indicators = Vec::new();
    for v in 0..MAX_VIEWERS {
        if w.focus_controls(v).is_some_and(|f| f.has_focus) {
            indicators.push((format!("FOCUS{v}"), Color::Magenta));
        }
    }
    if !w.is_visible() {
        indicators.push(("hidden".to_string(), Color::Yellow));
    }
    if w.is_focus_locked() {
        indicators.push(("locked".to_string(), Color::Red));
    }
    for (i, (text, color)) in indicators.iter().enumerate() {
        write!(buffer, "{}", if i == 0 { " " } else { ", " }).map_err(io_err)?;
        buffer
            .set_color(ColorSpec::new().set_fg(Some(*color)))
            .map_err(io_err)?;
        write!(buffer, "{text}").map_err(io_err)?;
        buffer.reset().map_err(io_err)?;
    }
    writeln!(buffer).map_err(io_err)?;

    let r = w.bounds().rect();
    let stale = if w.bounds().is_fully_resolved() { "" } else { " (stale)" };
    write_field(
        buffer,
        &indent,
        "bounds:",
        &format!(
            "l: {}, t: {}, r: {}, b: {}{stale}",
            r.left, r.top, r.right, r.bottom
        ),
    )?;
    for (face, link) in w.docking().iter() {
        let target = match link.target {
            Some(t) => scene.widget(t).map_or_else(|_| "?".to_string(), |t| t.name().to_string()),
            None => "scene".to_string(),
        };
        write_field(
            buffer,
            &indent,
            &format!("dock {face}:"),
            &format!("{target}.{} + {}", link.face, link.padding.value),
        )?;
    }
    for v in 0..MAX_VIEWERS {
        let states = w.states().active(v);
        if !states.is_empty() {
            let names: Vec<_> = states.iter().map(|s| s.name()).collect();
            write_field(buffer, &indent, &format!("states[{v}]:"), &names.join(", "))?;
        }
    }

    for child in w.children() {
        dump_widget(buffer, scene, *child, level + 1)?;
    }
    Ok(())
}

/// A table of the docking stack in evaluation order, with each node's docking
/// target. Faces on a cycle are listed last.
pub fn docking_table(scene: &Scene) -> String {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["#", "widget", "face", "docked to"]);
    let name = |id: WidgetId| {
        scene
            .widget(id)
            .map_or_else(|_| "?".to_string(), |w| w.name().to_string())
    };
    let target = |node: DockingNode| {
        scene
            .widget(node.widget)
            .ok()
            .and_then(|w| w.docking().get(node.face).copied())
            .map_or_else(String::new, |l| {
                let t = l.target.map_or_else(|| "scene".to_string(), name);
                format!("{t}.{}", l.face)
            })
    };
    for (i, node) in scene.docking_stack().nodes().iter().enumerate() {
        table.add_row(vec![
            Cell::new(i).fg(TableColor::Green),
            Cell::new(name(node.widget)),
            Cell::new(node.face),
            Cell::new(target(*node)),
        ]);
    }
    for node in scene.cyclic_nodes() {
        table.add_row(vec![
            Cell::new("cycle").fg(TableColor::Red),
            Cell::new(name(node.widget)),
            Cell::new(node.face),
            Cell::new(target(*node)),
        ]);
    }
    table.to_string()
}
