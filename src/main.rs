//! Interactive 2×2×2 pocket cube with a software renderer.
//!
//! Left drag rotates the whole puzzle, right drag across a face turns a
//! layer, `S` scrambles and `D` toggles the turn axis indicator. Frames are
//! rasterized on the CPU and shown through an iced image widget.

use iced::widget::image::Handle;
use iced::widget::mouse_area;
use iced::{Element, Event, Point, Size, Subscription, Task, event, keyboard, mouse, window};
use nalgebra::Point2;

mod app;
mod camera;
mod config;
mod cube;
mod error;
mod input;
mod math;
mod picking;
mod rasterizer;
mod renderer;
mod topology;

use app::App;
use config::Config;
use input::{InputEvent, InputHandler, PointerButton};

/// Window state: the puzzle engine plus the frame currently on screen.
pub(crate) struct PocketCubeApp {
    /// Puzzle, camera, renderer and interaction state.
    app: App,
    /// Last rendered frame, uploaded for the image widget.
    frame: Handle,
    /// Last cursor position over the image, in framebuffer pixels.
    cursor: Point2<f32>,
}

/// Messages that the application can receive
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Message {
    /// A button went down over the puzzle image.
    Pressed(PointerButton),
    /// A button came up anywhere in the window.
    Released(PointerButton),
    CursorMoved(Point),
    Scramble,
    ToggleIndicator,
    /// The next animation frame is due.
    Tick,
}

impl PocketCubeApp {
    /// Wraps the engine and renders its first frame.
    ///
    /// # Arguments
    /// * `app` - Engine holding a freshly built puzzle
    pub(crate) fn new(app: App) -> Self {
        let mut this = Self {
            frame: frame_handle(&app),
            app,
            cursor: Point2::origin(),
        };
        this.redraw();
        this
    }

    pub(crate) fn title(&self) -> String {
        format!("Pocket Cube ({} turns)", self.app.cube().turns_applied())
    }

    fn redraw(&mut self) {
        self.app.render();
        self.frame = frame_handle(&self.app);
    }

    pub(crate) fn update(&mut self, message: Message) -> Task<Message> {
        let event = match message {
            Message::Pressed(button) => InputEvent::Pressed {
                button,
                position: self.cursor,
            },
            Message::Released(button) => InputEvent::Released {
                button,
                position: self.cursor,
            },
            Message::CursorMoved(point) => {
                self.cursor = Point2::new(point.x, point.y);
                InputEvent::Moved {
                    position: self.cursor,
                }
            }
            Message::Scramble => InputEvent::Scramble,
            Message::ToggleIndicator => InputEvent::ToggleAxisIndicator,
            Message::Tick => {
                if self.app.tick() {
                    self.redraw();
                }
                return Task::none();
            }
        };

        if self.app.handle_input(event) {
            self.redraw();
        }
        Task::none()
    }

    /// Presses and motion come from the image itself. Releases are
    /// subscribed to separately, see [`pointer_release`].
    pub(crate) fn view(&self) -> Element<'_, Message> {
        mouse_area(iced::widget::image(self.frame.clone()))
            .on_press(Message::Pressed(PointerButton::Primary))
            .on_right_press(Message::Pressed(PointerButton::Secondary))
            .on_move(Message::CursorMoved)
            .into()
    }

    pub(crate) fn subscription(&self) -> Subscription<Message> {
        let input = Subscription::batch([
            keyboard::on_key_press(key_message),
            event::listen_with(pointer_release),
        ]);

        // Only ask for frames while a layer is turning.
        if self.app.is_turning() {
            Subscription::batch([input, window::frames().map(|_| Message::Tick)])
        } else {
            input
        }
    }
}

/// Maps the scramble and indicator keys, ignoring case.
fn key_message(key: keyboard::Key, _modifiers: keyboard::Modifiers) -> Option<Message> {
    match key.as_ref() {
        keyboard::Key::Character(c) if c.eq_ignore_ascii_case("s") => Some(Message::Scramble),
        keyboard::Key::Character(c) if c.eq_ignore_ascii_case("d") => {
            Some(Message::ToggleIndicator)
        }
        _ => None,
    }
}

/// Reports button releases wherever the cursor is.
///
/// `mouse_area` drops releases outside its bounds, and the image fills the
/// window, so a drag that ends past the edge would otherwise never finish.
fn pointer_release(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
            Some(Message::Released(PointerButton::Primary))
        }
        Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Right)) => {
            Some(Message::Released(PointerButton::Secondary))
        }
        _ => None,
    }
}

fn frame_handle(app: &App) -> Handle {
    let frame = app.frame();
    Handle::from_rgba(frame.width(), frame.height(), frame.as_raw().clone())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::builder().format_timestamp(None).init();

    let config = Config::default();
    let size = Size::new(config.width as f32, config.height as f32);
    log::info!(
        "starting pocket cube at {}x{}, scrambles of {} turns",
        config.width,
        config.height,
        config.scramble_turns
    );

    let state = PocketCubeApp::new(App::new(config)?);
    iced::application(PocketCubeApp::title, PocketCubeApp::update, PocketCubeApp::view)
        .subscription(PocketCubeApp::subscription)
        .window_size(size)
        .resizable(false)
        .run_with(move || (state, Task::none()))?;
    Ok(())
}
