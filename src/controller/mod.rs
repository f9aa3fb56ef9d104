// CONTROLLER: Input, camera control, and the frame loop
pub mod input;
pub mod camera_controller;
pub mod frame_loop;

pub use input::{InputEvent, InputProcessor, InputState, KeyBindings, MouseLook};
pub use camera_controller::CameraController;
pub use frame_loop::{
    DirLightUniform, FrameClock, FrameLoopContext, FramePacket, FrameUniform, MaterialUniform,
    RenderTarget, Viewport,
};
