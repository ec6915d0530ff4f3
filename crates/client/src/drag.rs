//! Pointer-driven repositioning of floating boxes.

/// Element a pointer press landed on, as far as dragging cares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressTarget {
    Input,
    TextArea,
    Button,
    Select,
    Other,
}

impl PressTarget {
    /// Classifies a DOM tag name, ignoring case.
    pub fn from_tag_name(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "INPUT" => PressTarget::Input,
            "TEXTAREA" => PressTarget::TextArea,
            "BUTTON" => PressTarget::Button,
            "SELECT" => PressTarget::Select,
            _ => PressTarget::Other,
        }
    }

    /// Form controls keep their own pointer behaviour and never start a drag.
    pub fn starts_drag(self) -> bool {
        self == PressTarget::Other
    }
}

/// Top-left corner of a box, in page pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    pub top: f64,
    pub left: f64,
}

/// Drag state of one element.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Drag {
    last_pointer: Option<(f64, f64)>,
}

impl Drag {
    /// Pointer pressed at `(x, y)`. Returns whether a drag started.
    pub fn press(&mut self, target: PressTarget, x: f64, y: f64) -> bool {
        if !target.starts_drag() {
            return false;
        }
        self.last_pointer = Some((x, y));
        true
    }

    /// Pointer moved to `(x, y)`. While dragging, `pos` follows the pointer delta.
    pub fn motion(&mut self, pos: &mut Position, x: f64, y: f64) -> bool {
        let Some((last_x, last_y)) = self.last_pointer else {
            return false;
        };
        pos.left += x - last_x;
        pos.top += y - last_y;
        self.last_pointer = Some((x, y));
        true
    }

    pub fn release(&mut self) {
        self.last_pointer = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.last_pointer.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_controls_do_not_start_drags() {
        let mut drag = Drag::default();
        for tag in ["input", "TEXTAREA", "Button", "select"] {
            assert!(!drag.press(PressTarget::from_tag_name(tag), 0.0, 0.0));
        }
        assert!(!drag.is_dragging());
    }

    #[test]
    fn follows_pointer_until_released() {
        let mut drag = Drag::default();
        let mut pos = Position {
            top: 100.0,
            left: 50.0,
        };

        assert!(drag.press(PressTarget::from_tag_name("h3"), 10.0, 10.0));
        assert!(drag.motion(&mut pos, 15.0, 30.0));
        assert!(drag.motion(&mut pos, 5.0, 30.0));
        assert_eq!(
            pos,
            Position {
                top: 120.0,
                left: 45.0
            }
        );

        drag.release();
        assert!(!drag.motion(&mut pos, 500.0, 500.0));
        assert_eq!(pos.top, 120.0);
    }
}
