//! Normal appearance streams for markup and shape annotations
//!
//! Each builder returns the content of a form XObject whose BBox is
//! `[0 0 width height]`, so the drawing is relative to the annotation rect.

use crate::annotation::{Rgb, ShapeStyle};
use lopdf::content::{Content, Operation};
use lopdf::Object;

/// Bezier control distance for a quarter circle of radius 1.
const KAPPA: f32 = 0.552_284_8;

/// Graphics state resource name used by highlight appearances.
pub(crate) const MULTIPLY_STATE: &str = "GSMultiply";

fn reals(values: &[f32]) -> Vec<Object> {
    values.iter().map(|v| Object::Real(*v)).collect()
}

fn op(operator: &str, operands: &[f32]) -> Operation {
    Operation::new(operator, reals(operands))
}

fn fill_color(color: Rgb) -> Operation {
    op("rg", &color.components())
}

fn stroke_color(color: Rgb) -> Operation {
    op("RG", &color.components())
}

fn encode(operations: Vec<Operation>) -> Result<Vec<u8>, lopdf::Error> {
    Content { operations }.encode()
}

pub(crate) fn highlight(width: f32, height: f32, color: Rgb) -> Result<Vec<u8>, lopdf::Error> {
    encode(vec![
        Operation::new("q", vec![]),
        Operation::new("gs", vec![Object::Name(MULTIPLY_STATE.as_bytes().to_vec())]),
        fill_color(color),
        op("re", &[0.0, 0.0, width, height]),
        Operation::new("f", vec![]),
        Operation::new("Q", vec![]),
    ])
}

/// Horizontal line across the rect at `fraction` of its height.
fn text_line(width: f32, height: f32, color: Rgb, fraction: f32) -> Result<Vec<u8>, lopdf::Error> {
    let thickness = (height * 0.07).max(1.0);
    let y = (height * fraction).max(thickness / 2.0);
    encode(vec![
        Operation::new("q", vec![]),
        stroke_color(color),
        op("w", &[thickness]),
        op("m", &[0.0, y]),
        op("l", &[width, y]),
        Operation::new("S", vec![]),
        Operation::new("Q", vec![]),
    ])
}

pub(crate) fn underline(width: f32, height: f32, color: Rgb) -> Result<Vec<u8>, lopdf::Error> {
    text_line(width, height, color, 0.1)
}

pub(crate) fn strikeout(width: f32, height: f32, color: Rgb) -> Result<Vec<u8>, lopdf::Error> {
    text_line(width, height, color, 0.5)
}

fn paint_operator(style: &ShapeStyle) -> &'static str {
    match (style.fill.is_some(), style.width > 0.0) {
        (true, true) => "B",
        (true, false) => "f",
        (false, true) => "S",
        (false, false) => "n",
    }
}

fn style_operations(style: &ShapeStyle) -> Vec<Operation> {
    let mut operations = vec![
        Operation::new("q", vec![]),
        stroke_color(style.stroke),
        op("w", &[style.width.max(0.0)]),
    ];
    if let Some(fill) = style.fill {
        operations.push(fill_color(fill));
    }
    operations
}

pub(crate) fn rectangle(
    width: f32,
    height: f32,
    style: &ShapeStyle,
) -> Result<Vec<u8>, lopdf::Error> {
    let inset = style.width.max(0.0) / 2.0;
    let mut operations = style_operations(style);
    operations.push(op(
        "re",
        &[
            inset,
            inset,
            (width - 2.0 * inset).max(0.0),
            (height - 2.0 * inset).max(0.0),
        ],
    ));
    operations.push(Operation::new(paint_operator(style), vec![]));
    operations.push(Operation::new("Q", vec![]));
    encode(operations)
}

/// Ellipse inscribed in the rect, drawn as four Bezier quarter arcs.
pub(crate) fn ellipse(width: f32, height: f32, style: &ShapeStyle) -> Result<Vec<u8>, lopdf::Error> {
    let inset = style.width.max(0.0) / 2.0;
    let rx = ((width / 2.0) - inset).max(0.0);
    let ry = ((height / 2.0) - inset).max(0.0);
    let (cx, cy) = (width / 2.0, height / 2.0);
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);

    let mut operations = style_operations(style);
    operations.push(op("m", &[cx + rx, cy]));
    operations.push(op("c", &[cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry]));
    operations.push(op("c", &[cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy]));
    operations.push(op("c", &[cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry]));
    operations.push(op("c", &[cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy]));
    operations.push(Operation::new("h", vec![]));
    operations.push(Operation::new(paint_operator(style), vec![]));
    operations.push(Operation::new("Q", vec![]));
    encode(operations)
}
