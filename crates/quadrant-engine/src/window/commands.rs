use winit::window::WindowId;

use super::RuntimeConfig;

/// Requests an app makes from inside a callback.
///
/// They are buffered and applied once the callback returns, in order.
#[derive(Default)]
pub struct RuntimeCtx {
    pub(super) commands: Vec<Command>,
}

impl RuntimeCtx {
    pub fn create_window(&mut self, config: RuntimeConfig) {
        self.commands.push(Command::CreateWindow(config));
    }

    pub fn close_window(&mut self, id: WindowId) {
        self.commands.push(Command::CloseWindow(id));
    }

    /// Needed for windows created with `continuous: false`.
    pub fn request_redraw(&mut self, id: WindowId) {
        self.commands.push(Command::Redraw(id));
    }

    pub fn exit(&mut self) {
        self.commands.push(Command::Exit);
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[derive(Debug)]
pub(super) enum Command {
    CreateWindow(RuntimeConfig),
    CloseWindow(WindowId),
    Redraw(WindowId),
    Exit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_keep_call_order() {
        let mut ctx = RuntimeCtx::default();
        assert!(ctx.is_empty());

        ctx.create_window(RuntimeConfig::default());
        ctx.exit();

        assert!(matches!(ctx.commands[0], Command::CreateWindow(ref c) if c.title == "quadrant"));
        assert!(matches!(ctx.commands[1], Command::Exit));
    }
}
