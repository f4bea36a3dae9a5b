//! Freehand whiteboard kept as a vector stroke log.
//!
//! The visible canvas is always `base` followed by the undo history, replayed
//! in order. Strokes that fall off a full history are folded into `base`, so
//! the bound limits how far back undo reaches but never changes what is drawn.

use serde::Serialize;

use crate::errors::AppError;
use crate::models::{BrushRequest, PointerInput, ResizeRequest, TouchInput};

/// Height reserved for the tool bar above the canvas.
pub const TOOLBAR_HEIGHT: u32 = 50;
pub const DEFAULT_COLOR: &str = "#000000";
pub const DEFAULT_BRUSH_SIZE: u32 = 5;
pub const MAX_BRUSH_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Canvas compositing mode for a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Composite {
    SourceOver,
    /// Eraser: clears whatever is underneath
    DestinationOut,
}

/// One pointer-down-to-pointer-up gesture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    pub points: Vec<Point>,
    pub color: String,
    pub line_width: u32,
    pub line_cap: &'static str,
    pub composite: Composite,
}

/// Everything the page needs to repaint the canvas.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasRender {
    pub width: u32,
    pub height: u32,
    pub painting: bool,
    pub eraser: bool,
    pub color: String,
    pub brush_size: u32,
    pub can_undo: bool,
    pub can_redo: bool,
    /// Strokes in paint order, the in-progress stroke last
    pub strokes: Vec<Stroke>,
}

pub struct Whiteboard {
    width: u32,
    height: u32,
    origin: Point,
    eraser: bool,
    color: String,
    brush_size: u32,
    current: Option<Stroke>,
    base: Vec<Stroke>,
    undo: Vec<Stroke>,
    redo: Vec<Stroke>,
    history_limit: usize,
}

impl Whiteboard {
    pub fn new(history_limit: usize) -> Self {
        Self {
            width: 0,
            height: 0,
            origin: Point { x: 0.0, y: 0.0 },
            eraser: false,
            color: DEFAULT_COLOR.to_string(),
            brush_size: DEFAULT_BRUSH_SIZE,
            current: None,
            base: Vec::new(),
            undo: Vec::new(),
            redo: Vec::new(),
            history_limit: history_limit.max(1),
        }
    }

    pub fn is_painting(&self) -> bool {
        self.current.is_some()
    }

    fn to_canvas(&self, input: PointerInput) -> Point {
        Point {
            x: input.client_x - self.origin.x,
            y: input.client_y - self.origin.y,
        }
    }

    /// Begin a stroke with a single dot under the pointer. A stroke still in
    /// progress (its pointer-up never arrived) is finished first.
    pub fn pointer_down(&mut self, input: PointerInput) {
        self.pointer_up();
        let point = self.to_canvas(input);
        let (color, composite) = if self.eraser {
            ("rgba(0,0,0,1)".to_string(), Composite::DestinationOut)
        } else {
            (self.color.clone(), Composite::SourceOver)
        };

        self.current = Some(Stroke {
            points: vec![point],
            color,
            line_width: self.brush_size,
            line_cap: "round",
            composite,
        });
    }

    /// Extend the stroke; ignored while not painting.
    pub fn pointer_move(&mut self, input: PointerInput) {
        let point = self.to_canvas(input);
        if let Some(stroke) = self.current.as_mut() {
            stroke.points.push(point);
        }
    }

    /// Finish the stroke and record it. A new stroke discards redo history.
    ///
    /// Returns `false` when no stroke was in progress.
    pub fn pointer_up(&mut self) -> bool {
        let Some(stroke) = self.current.take() else {
            return false;
        };

        self.redo.clear();
        self.undo.push(stroke);
        if self.undo.len() > self.history_limit {
            let oldest = self.undo.remove(0);
            self.base.push(oldest);
        }
        true
    }

    /// Touch start, mapped onto pointer-down using the first touch point.
    pub fn touch_start(&mut self, touch: &TouchInput) {
        if let Some(first) = touch.touches.first() {
            self.pointer_down(*first);
        }
    }

    pub fn touch_move(&mut self, touch: &TouchInput) {
        if let Some(first) = touch.touches.first() {
            self.pointer_move(*first);
        }
    }

    pub fn touch_end(&mut self) -> bool {
        self.pointer_up()
    }

    pub fn undo(&mut self) -> bool {
        match self.undo.pop() {
            Some(stroke) => {
                self.redo.push(stroke);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(stroke) => {
                self.undo.push(stroke);
                true
            }
            None => false,
        }
    }

    /// Wipe the canvas and both histories.
    pub fn clear(&mut self) {
        self.current = None;
        self.base.clear();
        self.undo.clear();
        self.redo.clear();
    }

    pub fn toggle_eraser(&mut self) -> bool {
        self.eraser = !self.eraser;
        self.eraser
    }

    pub fn set_brush(&mut self, request: &BrushRequest) -> Result<(), AppError> {
        if let Some(color) = &request.color {
            if !is_hex_color(color) {
                return Err(AppError::Validation(format!("Invalid brush color: {}", color)));
            }
        }
        if let Some(size) = request.size {
            if size == 0 || size > MAX_BRUSH_SIZE {
                return Err(AppError::Validation(format!(
                    "Brush size must be between 1 and {}",
                    MAX_BRUSH_SIZE
                )));
            }
        }

        if let Some(color) = &request.color {
            self.color = color.to_lowercase();
        }
        if let Some(size) = request.size {
            self.brush_size = size;
        }
        Ok(())
    }

    /// Fit the canvas to its container. Strokes keep their coordinates, so
    /// anything outside the new bounds is cropped.
    pub fn resize(&mut self, request: &ResizeRequest) {
        self.width = request.container_width;
        self.height = request.container_height.saturating_sub(TOOLBAR_HEIGHT);
        self.origin = Point {
            x: request.left,
            y: request.top,
        };
    }

    pub fn render(&self) -> CanvasRender {
        let strokes = self
            .base
            .iter()
            .chain(self.undo.iter())
            .chain(self.current.iter())
            .cloned()
            .collect();

        CanvasRender {
            width: self.width,
            height: self.height,
            painting: self.is_painting(),
            eraser: self.eraser,
            color: self.color.clone(),
            brush_size: self.brush_size,
            can_undo: !self.undo.is_empty(),
            can_redo: !self.redo.is_empty(),
            strokes,
        }
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(x: f64, y: f64) -> PointerInput {
        PointerInput {
            client_x: x,
            client_y: y,
        }
    }

    fn draw(board: &mut Whiteboard, from: f64) {
        board.pointer_down(at(from, from));
        board.pointer_move(at(from + 1.0, from + 2.0));
        board.pointer_up();
    }

    #[test]
    fn test_stroke_lifecycle() {
        let mut board = Whiteboard::new(10);
        board.pointer_move(at(1.0, 1.0));
        assert!(board.render().strokes.is_empty());

        board.pointer_down(at(5.0, 5.0));
        assert!(board.is_painting());
        board.pointer_move(at(6.0, 7.0));
        assert!(board.pointer_up());
        assert!(!board.is_painting());

        let render = board.render();
        assert_eq!(render.strokes.len(), 1);
        assert_eq!(render.strokes[0].points.len(), 2);
        assert_eq!(render.strokes[0].line_cap, "round");
        assert!(render.can_undo);

        // Pointer-up without a stroke records nothing
        assert!(!board.pointer_up());
        assert_eq!(board.render().strokes.len(), 1);
    }

    #[test]
    fn test_second_pointer_down_keeps_unfinished_stroke() {
        let mut board = Whiteboard::new(10);
        board.pointer_down(at(1.0, 1.0));
        board.pointer_move(at(50.0, 50.0));
        board.pointer_down(at(100.0, 100.0));
        assert!(board.pointer_up());

        let render = board.render();
        assert_eq!(render.strokes.len(), 2);
        assert_eq!(render.strokes[0].points.len(), 2);
        assert_eq!(render.strokes[1].points[0], Point { x: 100.0, y: 100.0 });

        // Each gesture undoes on its own
        assert!(board.undo());
        assert_eq!(board.render().strokes.len(), 1);
    }

    #[test]
    fn test_pointer_is_offset_by_canvas_origin() {
        let mut board = Whiteboard::new(10);
        board.resize(&ResizeRequest {
            container_width: 800,
            container_height: 650,
            left: 100.0,
            top: 40.0,
        });
        board.pointer_down(at(110.0, 60.0));

        let render = board.render();
        assert_eq!(render.height, 600);
        assert_eq!(render.strokes[0].points[0], Point { x: 10.0, y: 20.0 });
    }

    #[test]
    fn test_undo_redo_reproduces_content() {
        let mut board = Whiteboard::new(50);
        for i in 0..5 {
            draw(&mut board, i as f64 * 10.0);
        }
        let after_strokes = board.render().strokes;

        for _ in 0..5 {
            assert!(board.undo());
        }
        assert!(board.render().strokes.is_empty());
        assert!(!board.undo());

        for _ in 0..5 {
            assert!(board.redo());
        }
        assert_eq!(board.render().strokes, after_strokes);
        assert!(!board.redo());
    }

    #[test]
    fn test_new_stroke_discards_redo() {
        let mut board = Whiteboard::new(10);
        draw(&mut board, 0.0);
        draw(&mut board, 10.0);
        board.undo();
        draw(&mut board, 20.0);

        assert!(!board.render().can_redo);
        assert!(!board.redo());
        assert_eq!(board.render().strokes.len(), 2);
    }

    #[test]
    fn test_bounded_history_keeps_content() {
        let mut board = Whiteboard::new(2);
        for i in 0..4 {
            draw(&mut board, i as f64);
        }
        assert_eq!(board.render().strokes.len(), 4);

        assert!(board.undo());
        assert!(board.undo());
        assert!(!board.undo());
        assert_eq!(board.render().strokes.len(), 2);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut board = Whiteboard::new(10);
        draw(&mut board, 0.0);
        draw(&mut board, 1.0);
        board.undo();
        board.clear();

        let render = board.render();
        assert!(render.strokes.is_empty());
        assert!(!render.can_undo);
        assert!(!render.can_redo);
    }

    #[test]
    fn test_eraser_strokes_clear() {
        let mut board = Whiteboard::new(10);
        assert!(board.toggle_eraser());
        board.pointer_down(at(1.0, 1.0));
        board.pointer_up();
        assert!(!board.toggle_eraser());

        let stroke = &board.render().strokes[0];
        assert_eq!(stroke.composite, Composite::DestinationOut);
    }

    #[test]
    fn test_touch_uses_first_point() {
        let mut board = Whiteboard::new(10);
        board.touch_start(&TouchInput {
            touches: vec![at(3.0, 4.0), at(100.0, 100.0)],
        });
        board.touch_move(&TouchInput {
            touches: vec![at(5.0, 6.0)],
        });
        assert!(board.touch_end());

        let points = &board.render().strokes[0].points;
        assert_eq!(points, &vec![Point { x: 3.0, y: 4.0 }, Point { x: 5.0, y: 6.0 }]);

        // A touch event without points is ignored
        board.touch_start(&TouchInput::default());
        assert!(!board.is_painting());
    }

    #[test]
    fn test_brush_validation() {
        let mut board = Whiteboard::new(10);
        board
            .set_brush(&BrushRequest {
                color: Some("#FF8800".to_string()),
                size: Some(12),
            })
            .unwrap();
        board.pointer_down(at(0.0, 0.0));
        let stroke = board.render().strokes[0].clone();
        assert_eq!(stroke.color, "#ff8800");
        assert_eq!(stroke.line_width, 12);

        assert!(board
            .set_brush(&BrushRequest {
                color: Some("orange".to_string()),
                size: None,
            })
            .is_err());
        assert!(board
            .set_brush(&BrushRequest {
                color: None,
                size: Some(0),
            })
            .is_err());
    }

    #[test]
    fn test_resize_keeps_stroke_coordinates() {
        let mut board = Whiteboard::new(10);
        board.resize(&ResizeRequest {
            container_width: 1000,
            container_height: 850,
            left: 0.0,
            top: 0.0,
        });
        board.pointer_down(at(900.0, 700.0));
        board.pointer_up();

        board.resize(&ResizeRequest {
            container_width: 400,
            container_height: 350,
            left: 0.0,
            top: 0.0,
        });
        let render = board.render();
        assert_eq!((render.width, render.height), (400, 300));
        assert_eq!(render.strokes[0].points[0], Point { x: 900.0, y: 700.0 });
    }
}
