//! Rendering shared by the link components.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tessera_markup::MarkupWrite;
use tessera_types::Link;

use crate::{ComponentContext, ComponentError};

/// Cycle attribute holding the id path of the link being rendered.
pub const LINK_COMPONENT_ATTRIBUTE: &str = "tessera.active-link";

/// Element a link renders as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// `<a href="url">body</a>`
    #[default]
    Anchor,
    /// `<button type="button" onclick="window.location='url'">body</button>`
    Button,
}

/// Renders a link around the component body.
///
/// `link` is `None` for a disabled link, in which case only the body is
/// written. Links may not nest: the cycle remembers the link being
/// rendered until its body is done.
pub(crate) fn render_link(
    writer: &mut dyn MarkupWrite,
    ctx: &mut ComponentContext<'_>,
    link: Option<Link>,
    anchor: Option<&str>,
    style: LinkStyle,
) -> Result<(), ComponentError> {
    if ctx.cycle_ref().attribute(LINK_COMPONENT_ATTRIBUTE).is_some() {
        return Err(ComponentError::NestedLink {
            path: ctx.id_path().to_string(),
        });
    }
    let path = ctx.id_path().to_string();
    ctx.cycle()
        .set_attribute(LINK_COMPONENT_ATTRIBUTE, Value::String(path));

    let result = write_link(writer, ctx, link, anchor, style);
    ctx.cycle().remove_attribute(LINK_COMPONENT_ATTRIBUTE);
    result
}

fn write_link(
    writer: &mut dyn MarkupWrite,
    ctx: &mut ComponentContext<'_>,
    link: Option<Link>,
    anchor: Option<&str>,
    style: LinkStyle,
) -> Result<(), ComponentError> {
    let Some(link) = link else {
        return ctx.render_body(writer);
    };

    let url = link.url(anchor);
    match style {
        LinkStyle::Anchor => {
            writer.begin("a")?;
            writer.attribute("href", &url)?;
        }
        LinkStyle::Button => {
            writer.begin("button")?;
            writer.attribute("type", "button")?;
            writer.attribute("onclick", &format!("window.location='{url}'"))?;
        }
    }

    {
        let mut body = writer.nested_writer();
        ctx.render_body(&mut body)?;
        body.close()?;
    }
    writer.end()?;
    Ok(())
}
