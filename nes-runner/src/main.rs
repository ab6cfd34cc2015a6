//! Windowed NES frontend: winit window, pixels surface, keyboard joypad.
//!
//! Keymap: arrows = D-pad, Z = B, X = A, Right Shift = Select,
//! Enter = Start, Escape = quit.

use std::fs;
use std::process;
use std::sync::Arc;

use log::{error, info, LevelFilter};
use machine_nes::{Button, Console, FRAME_BYTES, FRAME_HEIGHT, FRAME_WIDTH};
use pixels::{Pixels, SurfaceTexture};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

/// Runner configuration.
struct RunnerConfig {
    /// Window title.
    title: String,
    /// Integer scale factor for sharp pixels.
    scale: u32,
}

struct Runner {
    console: Console,
    config: RunnerConfig,
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
}

impl Runner {
    fn new(console: Console, config: RunnerConfig) -> Self {
        Self {
            console,
            config,
            window: None,
            pixels: None,
        }
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool, event_loop: &ActiveEventLoop) {
        let button = match key {
            KeyCode::KeyX => Button::A,
            KeyCode::KeyZ => Button::B,
            KeyCode::ShiftRight => Button::Select,
            KeyCode::Enter => Button::Start,
            KeyCode::ArrowUp => Button::Up,
            KeyCode::ArrowDown => Button::Down,
            KeyCode::ArrowLeft => Button::Left,
            KeyCode::ArrowRight => Button::Right,
            KeyCode::Escape => {
                if pressed {
                    event_loop.exit();
                }
                return;
            }
            _ => return,
        };
        self.console.set_button(button, pressed);
    }
}

impl ApplicationHandler for Runner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let width = FRAME_WIDTH as u32 * self.config.scale;
        let height = FRAME_HEIGHT as u32 * self.config.scale;

        let window = Arc::new(
            event_loop
                .create_window(
                    Window::default_attributes()
                        .with_title(self.config.title.clone())
                        .with_inner_size(LogicalSize::new(width, height)),
                )
                .expect("Failed to create window"),
        );

        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width, size.height, Arc::clone(&window));
        let pixels = Pixels::new(FRAME_WIDTH as u32, FRAME_HEIGHT as u32, surface)
            .expect("Failed to create pixels surface");

        window.request_redraw();
        self.window = Some(window);
        self.pixels = Some(pixels);
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(pixels) = self.pixels.as_mut() {
                    if pixels.resize_surface(size.width, size.height).is_err() {
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(code) = event.physical_key {
                    self.handle_key(code, event.state == ElementState::Pressed, event_loop);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(pixels) = self.pixels.as_mut() {
                    let frame: &mut [u8; FRAME_BYTES] = pixels
                        .frame_mut()
                        .try_into()
                        .expect("pixels frame is 256x240 RGBA");
                    self.console.step_frame(frame);
                    if let Err(e) = pixels.render() {
                        error!("render failed: {e}");
                        event_loop.exit();
                        return;
                    }
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    let rom_path = args[1..].iter().find(|a| !a.starts_with('-'));

    let level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("logger init");

    let Some(rom_path) = rom_path else {
        eprintln!("Usage: nes-runner [-v] <rom.nes>");
        process::exit(1);
    };

    let data = match fs::read(rom_path) {
        Ok(data) => data,
        Err(e) => {
            error!("failed to read {rom_path}: {e}");
            process::exit(1);
        }
    };

    let console = match Console::load(data.as_slice()) {
        Ok(console) => console,
        Err(e) => {
            error!("failed to load {rom_path}: {e}");
            process::exit(1);
        }
    };
    info!("loaded {rom_path}");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut runner = Runner::new(
        console,
        RunnerConfig {
            title: format!("NES - {rom_path}"),
            scale: 3,
        },
    );
    event_loop.run_app(&mut runner).expect("Event loop error");
}
