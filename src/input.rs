use nalgebra::Point2;

/// Mouse buttons the puzzle reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PointerButton {
    /// Rotates the whole puzzle.
    Primary,
    /// Picks a face and drags it to turn a layer.
    Secondary,
}

/// Input delivered by the windowing layer, in framebuffer pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum InputEvent {
    Pressed {
        button: PointerButton,
        position: Point2<f32>,
    },
    Released {
        button: PointerButton,
        position: Point2<f32>,
    },
    Moved {
        position: Point2<f32>,
    },
    Scramble,
    ToggleAxisIndicator,
}

pub(crate) trait InputHandler {
    /// Applies one event and returns whether the view needs redrawing.
    fn handle_input(&mut self, event: InputEvent) -> bool;
}

/// Which button, if any, is currently held down.
#[derive(Debug, Default)]
pub(crate) struct InputState {
    held: Option<PointerButton>,
}

impl InputState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn held(&self) -> Option<PointerButton> {
        self.held
    }

    /// Pressing any button makes it the held one; releasing any button ends
    /// the drag.
    pub(crate) fn update_button(&mut self, button: PointerButton, pressed: bool) {
        self.held = pressed.then_some(button);
    }
}
