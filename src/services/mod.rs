pub mod canvas_detector;
pub mod capture;
pub mod controller;
pub mod debug_images;
pub mod draw_order;
pub mod image_planner;
pub mod input_listener;
pub mod manual_pick;
pub mod palette_detector;
pub mod pointer;
pub mod preview;
pub mod run_state;

pub use canvas_detector::{CanvasGeometryDetector, CanvasLayout};
pub use capture::{Frame, ScreenCapture, ScreenshotsCapture};
pub use controller::{CancelReason, Collaborators, ExecutionController, Phase, RunOutcome, Setup};
pub use debug_images::DebugImages;
pub use draw_order::optimize;
pub use image_planner::{ImagePlan, ImagePlanner};
pub use input_listener::{spawn_listener, ListenerChannels, ListenerHandle, PreviewDecision};
pub use manual_pick::{ClickPicker, ManualPick};
pub use palette_detector::{rightmost_swatch, EraserStrategy, PaletteGeometryDetector, PaletteLayout};
pub use pointer::{Pointer, PointerTracker, RdevPointer};
pub use preview::{render_preview, write_preview, KeyConfirmation, PreviewConfirmation};
pub use run_state::{RunPhase, RunState};
