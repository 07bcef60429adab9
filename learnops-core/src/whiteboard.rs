//! Character-cell whiteboard shown next to the chat in the room view

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tool {
    #[default]
    Pen,
    Eraser,
}

#[derive(Debug, Clone)]
pub struct Whiteboard {
    width: u16,
    height: u16,
    cells: Vec<bool>,
    cursor: (u16, u16),
    tool: Tool,
    /// When set, moving the cursor applies the tool along the way
    drawing: bool,
}

impl Whiteboard {
    pub fn new(width: u16, height: u16) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            cells: vec![false; width as usize * height as usize],
            cursor: (0, 0),
            tool: Tool::Pen,
            drawing: false,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
    }

    /// Pen down/up; putting the pen down marks the current cell
    pub fn toggle_drawing(&mut self) {
        self.drawing = !self.drawing;
        if self.drawing {
            self.apply();
        }
    }

    /// Move by (dx, dy), clamped to the board
    pub fn move_cursor(&mut self, dx: i32, dy: i32) {
        let x = (self.cursor.0 as i32 + dx).clamp(0, self.width as i32 - 1);
        let y = (self.cursor.1 as i32 + dy).clamp(0, self.height as i32 - 1);
        self.cursor = (x as u16, y as u16);

        if self.drawing {
            self.apply();
        }
    }

    /// Apply the current tool at the cursor
    pub fn apply(&mut self) {
        let idx = self.index(self.cursor.0, self.cursor.1);
        self.cells[idx] = self.tool == Tool::Pen;
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = false);
        self.drawing = false;
    }

    pub fn is_set(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height && self.cells[self.index(x, y)]
    }

    pub fn is_blank(&self) -> bool {
        !self.cells.iter().any(|&c| c)
    }

    /// Board rows as text, `ink` for marked cells and spaces elsewhere
    pub fn rows(&self, ink: char) -> Vec<String> {
        (0..self.height)
            .map(|y| {
                (0..self.width)
                    .map(|x| if self.is_set(x, y) { ink } else { ' ' })
                    .collect()
            })
            .collect()
    }

    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }
}
