//! Outline renderer: plain-text rendering for assertions and snapshots.
//!
//! Each element renders to one line such as `slider#volume "Volume" = 3`.
//! Blocks render a header line followed by their children indented by two
//! spaces. Hidden children are prefixed with `~`.

use crate::reconcile::entry::Mounted;
use crate::render::dispatch::Renderer;
use crate::tree::key::StableKey;
use crate::tree::node::{Block, BlockKind, Element, ElementPayload};

/// Renders nodes to indented text.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlineRenderer;

impl Renderer for OutlineRenderer {
    type Output = String;

    fn render_element(&mut self, element: &Element, key: Option<&StableKey>) -> String {
        let mut line = element.payload.type_name().to_owned();
        if let Some(key) = key {
            line.push('#');
            line.push_str(key.as_str());
        }
        if let Some(detail) = element_detail(&element.payload) {
            line.push(' ');
            line.push_str(&detail);
        }
        line
    }

    fn render_block(&mut self, block: &Block, children: &[Mounted<String>]) -> String {
        let mut out = block_header(&block.kind);
        let body = outline_to_string(children);
        for line in body.lines() {
            out.push_str("\n  ");
            out.push_str(line);
        }
        out
    }
}

/// Join mounted outputs, one per line, marking hidden ones with `~`.
pub fn outline_to_string(mounted: &[Mounted<String>]) -> String {
    let mut lines = Vec::new();
    for item in mounted {
        for (i, line) in item.output.lines().enumerate() {
            if i == 0 && !item.is_visible() {
                lines.push(format!("~ {line}"));
            } else {
                lines.push(line.to_owned());
            }
        }
    }
    lines.join("\n")
}

fn block_header(kind: &BlockKind) -> String {
    match kind {
        BlockKind::Column { weight } => format!("column({weight})"),
        BlockKind::Expander { label, expanded } => {
            let state = if *expanded { "open" } else { "closed" };
            format!("expander \"{label}\" {state}")
        }
        BlockKind::Tab { label } => format!("tab \"{label}\""),
        BlockKind::Form { form_id } => format!("form {form_id}"),
        BlockKind::ChatMessage { name } => format!("chat_message {name}"),
        other => other.type_name().to_owned(),
    }
}

fn element_detail(payload: &ElementPayload) -> Option<String> {
    match payload {
        ElementPayload::Text { body } | ElementPayload::Markdown { body } => {
            Some(format!("{:?}", body.lines().next().unwrap_or_default()))
        }
        ElementPayload::Alert { level, body } => Some(format!("{level:?} {body:?}")),
        ElementPayload::Chart { .. } | ElementPayload::Empty => None,
        ElementPayload::Button { label, .. } | ElementPayload::AudioInput { label, .. } => {
            Some(format!("{label:?}"))
        }
        ElementPayload::Checkbox { label, value, .. } => Some(format!("{label:?} = {value}")),
        ElementPayload::Slider { label, value, .. } => Some(format!("{label:?} = {value}")),
        ElementPayload::TextInput { label, value, .. } => Some(format!("{label:?} = {value:?}")),
        ElementPayload::Selectbox { label, options, index, .. } => {
            let selected = index.and_then(|i| options.get(i)).map_or("-", String::as_str);
            Some(format!("{label:?} = {selected}"))
        }
        ElementPayload::DataEditor { columns, rows, .. } => {
            Some(format!("{}x{}", rows.len(), columns.len()))
        }
    }
}
