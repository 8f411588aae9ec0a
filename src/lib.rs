//! Scene-editing engine for a grid-based 2D level editor.
//!
//! The crate compiles to WebAssembly and drives a `<canvas>` in the browser.
//! It owns the editable map: placing and snapping entities to the grid,
//! translating pointer, wheel, key and drop events into entity mutations,
//! maintaining the selection and stacking order, and notifying property
//! panels when the entity they display changes. The host JavaScript layer
//! wires DOM events to the engine and reacts to the resulting
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`scene`] | Entity store, selection, z-order, bounds, grid geometry |
//! | [`entity`] | Map entity kinds, attributes and position interception |
//! | [`input`] | Input event types and the gesture state machine |
//! | [`hit`] | Resize zones, triangle vertices and body hits |
//! | [`duplicate`] | Ghost copies for shift-drag duplication |
//! | [`notify`] | Per-entity change notification and panel bindings |
//! | [`overlay`] | Timed texture scale/offset/rotation overlays |
//! | [`texture`] | Texture mapping rules, path resolution and loading |
//! | [`camera`] | Pan/zoom camera and coordinate conversions |
//! | [`render`] | Canvas2D drawing |
//! | [`geom`] | Points, rects and triangle helpers |
//! | [`snap`] | Grid snapping |
//! | [`config`] | Environment-driven editor configuration |
//! | [`consts`] | Shared numeric constants |

pub mod camera;
pub mod config;
pub mod consts;
pub mod duplicate;
pub mod engine;
pub mod entity;
pub mod geom;
pub mod hit;
pub mod input;
pub mod notify;
pub mod overlay;
pub mod render;
pub mod scene;
pub mod snap;
pub mod texture;
