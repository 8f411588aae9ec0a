//! Rendering: draws the map canvas to a 2D context.
//!
//! This is the only module that touches [`web_sys::CanvasRenderingContext2d`].
//! It reads the engine state and produces pixels; it never mutates anything.
//!
//! Layers, bottom to top: the viewport-fixed sky, the scene overlay image,
//! dashed grid background, entities in z-order, texture overlays, then the
//! selection outlines as a foreground pass so borders are never hidden by
//! overlapping entities.
//!
//! Decoded textures are uploaded once into offscreen canvases held by a
//! [`TextureCache`]; entries unused for a frame are dropped.

use wasm_bindgen::{Clamped, JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::camera;
use crate::engine::EngineCore;
use crate::entity::{Entity, EntityData, PortalRole, SurfaceType, WeaponType};
use crate::geom::{Point, Rect};
use crate::overlay::Overlay;
use crate::scene::Scene;
use crate::texture::{TextureImage, TextureMapping};

/// Grid line color, light gray.
const GRID_COLOR: &str = "rgb(200, 200, 200)";

/// Selection border color, bright pink.
const SELECTION_COLOR: &str = "rgb(255, 20, 147)";

/// Dash segment length in screen pixels.
const DASH_PX: f64 = 4.0;

const OVERLAY_FILL: &str = "rgba(0, 0, 0, 0.7)";
const OVERLAY_INSET: f64 = 10.0;
const OVERLAY_HEIGHT: f64 = 30.0;
const OVERLAY_GAP: f64 = 4.0;
const OVERLAY_FONT_PX: f64 = 12.0;

/// Draw the full frame.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails.
pub fn draw(ctx: &CanvasRenderingContext2d, core: &EngineCore, textures: &mut TextureCache) -> Result<(), JsValue> {
    let camera = &core.camera;
    textures.begin_frame();

    // Layer 1: clear, then the sky in screen space.
    ctx.set_transform(core.dpr, 0.0, 0.0, core.dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, core.viewport_width, core.viewport_height);
    if let Some(sky) = core.sky_image().and_then(|b| b.image.as_ref()) {
        draw_sky(ctx, textures, sky, core.viewport_width, core.viewport_height)?;
    }

    // Layer 2: view transform, overlay image at the scene origin, grid.
    ctx.translate(camera.pan_x, camera.pan_y)?;
    ctx.scale(camera.zoom, camera.zoom)?;
    if let Some(overlay) = core.overlay_image().and_then(|b| b.image.as_ref())
        && let Some(source) = textures.canvas_for(ctx, overlay)?
    {
        ctx.draw_image_with_html_canvas_element(&source, 0.0, 0.0)?;
    }
    draw_grid(ctx, core.visible_rect(), core.config.grid_size, camera.zoom)?;

    // Layer 3: entities, bottom first. Ghosts draw with their reduced opacity.
    let sorted = core.scene.sorted();
    for entity in &sorted {
        draw_entity(ctx, textures, entity, camera.zoom)?;
    }

    // Layer 4: texture overlays.
    for entity in &sorted {
        if let (Some(overlay), Some(mapping)) = (core.overlays.get(&entity.id), entity.texture()) {
            draw_overlay(ctx, entity, overlay, &overlay.lines(mapping), camera.zoom)?;
        }
    }

    // Layer 5: selection outlines on top of everything.
    draw_selection(ctx, &core.scene, camera.zoom)?;
    textures.end_frame();
    Ok(())
}

// =============================================================
// Texture cache
// =============================================================

struct CachedTexture {
    image: TextureImage,
    canvas: HtmlCanvasElement,
    used: bool,
}

/// Offscreen canvases holding uploaded texture pixels, keyed by image identity.
#[derive(Default)]
pub struct TextureCache {
    entries: Vec<CachedTexture>,
}

impl TextureCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn begin_frame(&mut self) {
        for entry in &mut self.entries {
            entry.used = false;
        }
    }

    fn end_frame(&mut self) {
        self.entries.retain(|e| e.used);
    }

    /// Canvas holding `image`, uploading it on first use.
    ///
    /// Returns `Ok(None)` when `ctx` is not attached to a document.
    fn canvas_for(
        &mut self,
        ctx: &CanvasRenderingContext2d,
        image: &TextureImage,
    ) -> Result<Option<HtmlCanvasElement>, JsValue> {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.image.same_as(image)) {
            entry.used = true;
            return Ok(Some(entry.canvas.clone()));
        }
        let Some(canvas) = upload(ctx, image)? else {
            return Ok(None);
        };
        self.entries.push(CachedTexture { image: image.clone(), canvas: canvas.clone(), used: true });
        Ok(Some(canvas))
    }
}

/// Copy decoded pixels into a fresh canvas from `ctx`'s document.
fn upload(ctx: &CanvasRenderingContext2d, image: &TextureImage) -> Result<Option<HtmlCanvasElement>, JsValue> {
    let Some(document) = ctx.canvas().and_then(|c| c.owner_document()) else {
        return Ok(None);
    };
    let canvas = document.create_element("canvas")?.dyn_into::<HtmlCanvasElement>().map_err(JsValue::from)?;
    canvas.set_width(image.width());
    canvas.set_height(image.height());
    let Some(target) = canvas.get_context("2d")? else {
        return Ok(None);
    };
    let target = target.dyn_into::<CanvasRenderingContext2d>().map_err(JsValue::from)?;
    let pixels = image.pixels().as_raw().as_slice();
    let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(pixels), image.width(), image.height())?;
    target.put_image_data(&data, 0.0, 0.0)?;
    Ok(Some(canvas))
}

// =============================================================
// Background
// =============================================================

fn draw_sky(
    ctx: &CanvasRenderingContext2d,
    textures: &mut TextureCache,
    sky: &TextureImage,
    viewport_w: f64,
    viewport_h: f64,
) -> Result<(), JsValue> {
    let Some(source) = textures.canvas_for(ctx, sky)? else {
        return Ok(());
    };
    let r = camera::fit_width(f64::from(sky.width()), f64::from(sky.height()), viewport_w, viewport_h);
    ctx.draw_image_with_html_canvas_element_and_dw_and_dh(&source, r.x, r.y, r.width, r.height)
}

fn draw_grid(ctx: &CanvasRenderingContext2d, visible: Rect, pitch: f64, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    set_dash(ctx, DASH_PX / zoom)?;
    ctx.set_stroke_style_str(GRID_COLOR);
    ctx.set_line_width(1.0 / zoom);
    ctx.begin_path();
    for (from, to) in Scene::grid_lines(visible, pitch) {
        ctx.move_to(from.x, from.y);
        ctx.line_to(to.x, to.y);
    }
    ctx.stroke();
    ctx.restore();
    Ok(())
}

// =============================================================
// Entities
// =============================================================

fn draw_entity(
    ctx: &CanvasRenderingContext2d,
    textures: &mut TextureCache,
    entity: &Entity,
    zoom: f64,
) -> Result<(), JsValue> {
    ctx.save();
    ctx.set_global_alpha(entity.opacity);

    trace(ctx, &entity.scene_outline());
    let textured = match entity.texture() {
        Some(mapping) => fill_texture(ctx, textures, entity, mapping)?,
        None => false,
    };
    if !textured {
        ctx.set_fill_style_str(fill_color(entity));
        ctx.fill();
    }
    ctx.set_stroke_style_str("rgba(0, 0, 0, 0.6)");
    ctx.set_line_width(1.0 / zoom);
    ctx.stroke();

    if entity.shape().is_none() {
        let center = entity.scene_bounds().center();
        ctx.set_fill_style_str("#000000");
        ctx.set_font(&format!("{:.0}px sans-serif", OVERLAY_FONT_PX));
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        ctx.fill_text(entity.kind().name(), center.x, center.y)?;
    }

    ctx.restore();
    Ok(())
}

/// Fill the current path with the entity's texture brush.
///
/// Returns `false` when there is no decoded image to paint, so the caller
/// falls back to the flat fill. The path is already in scene space, so the
/// transform set here only places the pattern, anchored at the local
/// top-left plus the offset and rotated about the local center.
fn fill_texture(
    ctx: &CanvasRenderingContext2d,
    textures: &mut TextureCache,
    entity: &Entity,
    mapping: &TextureMapping,
) -> Result<bool, JsValue> {
    let Some(image) = &mapping.image else {
        return Ok(false);
    };
    let Some(source) = textures.canvas_for(ctx, image)? else {
        return Ok(false);
    };
    let Some(pattern) = ctx.create_pattern_with_html_canvas_element(&source, "repeat")? else {
        return Ok(false);
    };

    let center = entity.local_center();
    let origin = match (entity.local_rect(), entity.triangle_points()) {
        (Some(r), _) => r.top_left(),
        (None, Some(points)) => Rect::bounding(&points).top_left(),
        (None, None) => Point::default(),
    };

    ctx.save();
    ctx.translate(entity.pos.x, entity.pos.y)?;
    if entity.rotation != 0.0 {
        ctx.translate(center.x, center.y)?;
        ctx.rotate(entity.rotation.to_radians())?;
        ctx.translate(-center.x, -center.y)?;
    }
    ctx.translate(center.x, center.y)?;
    ctx.rotate(mapping.rotation.to_radians())?;
    ctx.translate(-center.x, -center.y)?;
    ctx.translate(origin.x + mapping.offset.x, origin.y + mapping.offset.y)?;
    ctx.scale(mapping.scale, mapping.scale)?;
    ctx.set_fill_style_canvas_pattern(&pattern);
    ctx.fill();
    ctx.restore();
    Ok(true)
}

fn fill_color(entity: &Entity) -> &'static str {
    match &entity.data {
        EntityData::Rect(shape) | EntityData::Triangle(shape) => match shape.surface {
            SurfaceType::Static | SurfaceType::Ramp => "#ADD8E6",
            SurfaceType::Wall => "#E20074",
            SurfaceType::Deco => "#00FF00",
            SurfaceType::Death => "#FF0000",
        },
        EntityData::JumpPad(_) => "#FFA500",
        EntityData::Spawn => "#4169E1",
        EntityData::StartLine => "#F5F5F5",
        EntityData::Portal(p) => match p.role {
            PortalRole::Entry => "#8A2BE2",
            PortalRole::Exit => "#00CED1",
        },
        EntityData::Item(item) => match item.weapon {
            WeaponType::Plasma => "#00BFFF",
            WeaponType::Rocket => "#FF8C00",
        },
    }
}

fn draw_overlay(
    ctx: &CanvasRenderingContext2d,
    entity: &Entity,
    overlay: &Overlay,
    lines: &[String],
    zoom: f64,
) -> Result<(), JsValue> {
    if !overlay.is_visible() {
        return Ok(());
    }
    let origin = entity.scene_bounds().top_left() + Point::new(OVERLAY_INSET, OVERLAY_INSET);

    ctx.save();
    ctx.set_font(&format!("{:.0}px sans-serif", OVERLAY_FONT_PX));
    ctx.set_text_align("left");
    ctx.set_text_baseline("middle");
    ctx.set_line_width(1.0 / zoom);

    let mut y = origin.y;
    for line in lines {
        let width = ctx.measure_text(line).map_or(100.0, |m| m.width()) + 2.0 * OVERLAY_INSET;
        ctx.set_fill_style_str(OVERLAY_FILL);
        ctx.fill_rect(origin.x, y, width, OVERLAY_HEIGHT);
        ctx.set_stroke_style_str("#FFFFFF");
        ctx.stroke_rect(origin.x, y, width, OVERLAY_HEIGHT);
        ctx.set_fill_style_str("#FFFFFF");
        ctx.fill_text(line, origin.x + OVERLAY_INSET, y + OVERLAY_HEIGHT / 2.0)?;
        y += OVERLAY_HEIGHT + OVERLAY_GAP;
    }

    ctx.restore();
    Ok(())
}

// =============================================================
// Selection
// =============================================================

fn draw_selection(ctx: &CanvasRenderingContext2d, scene: &Scene, zoom: f64) -> Result<(), JsValue> {
    ctx.save();
    set_dash(ctx, DASH_PX / zoom)?;
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0 / zoom);
    for outline in scene.selection_outlines() {
        trace(ctx, &outline);
        ctx.stroke();
    }
    ctx.set_line_dash(&js_sys::Array::new())?;
    ctx.restore();
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

fn trace(ctx: &CanvasRenderingContext2d, points: &[Point]) {
    ctx.begin_path();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        ctx.move_to(first.x, first.y);
    }
    for p in iter {
        ctx.line_to(p.x, p.y);
    }
    ctx.close_path();
}

fn set_dash(ctx: &CanvasRenderingContext2d, dash: f64) -> Result<(), JsValue> {
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash.into());
    dash_array.push(&dash.into());
    ctx.set_line_dash(&dash_array)
}
